// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::OnceLock;

const DEFAULT_LANG: &str = "en";

// Mensagens por idioma, indexadas pelo código estável do AppError.
const EN: &[(&str, &str)] = &[
    ("VALIDATION_ERROR", "One or more fields are invalid."),
    ("TENANT_ID_REQUIRED", "The X-Tenant-ID header is required and must be a UUID."),
    ("STAFF_ID_REQUIRED", "A staff member is required for this operation."),
    ("DATE_REQUIRED", "A date is required."),
    ("BRANCH_ID_REQUIRED", "A branch is required."),
    ("STAFF_NOT_FOUND", "Staff member not found."),
    ("ATTENDANCE_NOT_FOUND", "Attendance record not found."),
    ("DUPLICATE_ATTENDANCE", "Attendance has already been recorded for this date."),
    ("ALREADY_CHECKED_IN", "Already checked in today."),
    ("ALREADY_CHECKED_OUT", "Already checked out today."),
    ("NOT_CHECKED_IN", "No check-in found for today."),
    ("FUTURE_DATE", "The date cannot be in the future."),
    ("INVALID_STATUS", "Invalid attendance status."),
    ("INVALID_HALF_DAY_TYPE", "Half-day type must be first_half or second_half."),
    ("REGULARIZATION_NOT_FOUND", "Regularization request not found."),
    ("REGULARIZATION_ALREADY_PROCESSED", "This regularization request has already been processed."),
    ("CANNOT_REGULARIZE_PENDING_REQUEST", "A pending regularization request already exists for this date."),
    ("REASON_REQUIRED", "A reason is required."),
    ("SETTINGS_NOT_FOUND", "Attendance settings not found for this branch."),
    ("INVALID_TOKEN", "Invalid or missing authentication token."),
    ("FORBIDDEN", "You need the '{permission}' permission to perform this action."),
    ("INTERNAL_ERROR", "An unexpected error occurred."),
];

const PT: &[(&str, &str)] = &[
    ("VALIDATION_ERROR", "Um ou mais campos são inválidos."),
    ("TENANT_ID_REQUIRED", "O cabeçalho X-Tenant-ID é obrigatório e deve ser um UUID."),
    ("STAFF_ID_REQUIRED", "Um funcionário é obrigatório para esta operação."),
    ("DATE_REQUIRED", "A data é obrigatória."),
    ("BRANCH_ID_REQUIRED", "A unidade é obrigatória."),
    ("STAFF_NOT_FOUND", "Funcionário não encontrado."),
    ("ATTENDANCE_NOT_FOUND", "Registro de ponto não encontrado."),
    ("DUPLICATE_ATTENDANCE", "Já existe registro de ponto para esta data."),
    ("ALREADY_CHECKED_IN", "Entrada já registrada hoje."),
    ("ALREADY_CHECKED_OUT", "Saída já registrada hoje."),
    ("NOT_CHECKED_IN", "Nenhuma entrada registrada hoje."),
    ("FUTURE_DATE", "A data não pode estar no futuro."),
    ("INVALID_STATUS", "Status de presença inválido."),
    ("INVALID_HALF_DAY_TYPE", "O meio período deve ser first_half ou second_half."),
    ("REGULARIZATION_NOT_FOUND", "Solicitação de regularização não encontrada."),
    ("REGULARIZATION_ALREADY_PROCESSED", "Esta solicitação de regularização já foi processada."),
    ("CANNOT_REGULARIZE_PENDING_REQUEST", "Já existe uma solicitação pendente para esta data."),
    ("REASON_REQUIRED", "O motivo é obrigatório."),
    ("SETTINGS_NOT_FOUND", "Configurações de ponto não encontradas para esta unidade."),
    ("INVALID_TOKEN", "Token de autenticação inválido ou ausente."),
    ("FORBIDDEN", "Você precisa da permissão '{permission}' para realizar esta ação."),
    ("INTERNAL_ERROR", "Ocorreu um erro inesperado."),
];

#[derive(Debug)]
pub struct I18nStore {
    messages: HashMap<&'static str, HashMap<&'static str, &'static str>>,
}

impl I18nStore {
    pub fn new() -> Self {
        let mut messages = HashMap::new();
        messages.insert("en", EN.iter().copied().collect());
        messages.insert("pt", PT.iter().copied().collect());
        Self { messages }
    }

    /// Instância compartilhada para quem não tem o estado da aplicação (extratores).
    pub fn fallback() -> &'static I18nStore {
        static STORE: OnceLock<I18nStore> = OnceLock::new();
        STORE.get_or_init(I18nStore::new)
    }

    // Idioma desconhecido cai para o inglês.
    pub fn translate(&self, lang: &str, code: &str) -> Option<&'static str> {
        self.messages
            .get(lang)
            .and_then(|table| table.get(code))
            .or_else(|| {
                self.messages
                    .get(DEFAULT_LANG)
                    .and_then(|table| table.get(code))
            })
            .copied()
    }
}

impl Default for I18nStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_code_is_translated_in_both_languages() {
        let en: Vec<&str> = EN.iter().map(|(code, _)| *code).collect();
        let pt: Vec<&str> = PT.iter().map(|(code, _)| *code).collect();
        assert_eq!(en, pt);
    }

    #[test]
    fn unknown_code_yields_none() {
        assert!(I18nStore::new().translate("pt", "NO_SUCH_CODE").is_none());
    }
}
