use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::middleware::i18n::Locale;

// Taxonomia fechada de erros do módulo de ponto.
// Cada variante tem um código estável (para o frontend) e um status HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error")]
    ValidationError(#[from] validator::ValidationErrors),

    // --- Identificação obrigatória ---
    #[error("Tenant ID is required")]
    TenantIdRequired,

    #[error("Staff ID is required")]
    StaffIdRequired,

    #[error("Date is required")]
    DateRequired,

    #[error("Branch ID is required")]
    BranchIdRequired,

    // --- Ponto (ledger) ---
    #[error("Staff member not found")]
    StaffNotFound,

    #[error("Attendance record not found")]
    AttendanceNotFound,

    #[error("Attendance already recorded for this date")]
    DuplicateAttendance,

    #[error("Already checked in today")]
    AlreadyCheckedIn,

    #[error("Already checked out today")]
    AlreadyCheckedOut,

    #[error("No check-in found for today")]
    NotCheckedIn,

    #[error("Date cannot be in the future")]
    FutureDate,

    #[error("Invalid attendance status")]
    InvalidStatus,

    #[error("Invalid half-day type")]
    InvalidHalfDayType,

    // --- Regularização ---
    #[error("Regularization request not found")]
    RegularizationNotFound,

    #[error("Regularization request has already been processed")]
    RegularizationAlreadyProcessed,

    #[error("A pending regularization request already exists for this date")]
    CannotRegularizePendingRequest,

    #[error("Reason is required")]
    ReasonRequired,

    // --- Configurações ---
    #[error("Attendance settings not found")]
    SettingsNotFound,

    // --- Autenticação ---
    #[error("Invalid or missing token")]
    InvalidToken,

    #[error("Missing permission '{0}'")]
    Forbidden(&'static str),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::TenantIdRequired => "TENANT_ID_REQUIRED",
            AppError::StaffIdRequired => "STAFF_ID_REQUIRED",
            AppError::DateRequired => "DATE_REQUIRED",
            AppError::BranchIdRequired => "BRANCH_ID_REQUIRED",
            AppError::StaffNotFound => "STAFF_NOT_FOUND",
            AppError::AttendanceNotFound => "ATTENDANCE_NOT_FOUND",
            AppError::DuplicateAttendance => "DUPLICATE_ATTENDANCE",
            AppError::AlreadyCheckedIn => "ALREADY_CHECKED_IN",
            AppError::AlreadyCheckedOut => "ALREADY_CHECKED_OUT",
            AppError::NotCheckedIn => "NOT_CHECKED_IN",
            AppError::FutureDate => "FUTURE_DATE",
            AppError::InvalidStatus => "INVALID_STATUS",
            AppError::InvalidHalfDayType => "INVALID_HALF_DAY_TYPE",
            AppError::RegularizationNotFound => "REGULARIZATION_NOT_FOUND",
            AppError::RegularizationAlreadyProcessed => "REGULARIZATION_ALREADY_PROCESSED",
            AppError::CannotRegularizePendingRequest => "CANNOT_REGULARIZE_PENDING_REQUEST",
            AppError::ReasonRequired => "REASON_REQUIRED",
            AppError::SettingsNotFound => "SETTINGS_NOT_FOUND",
            AppError::InvalidToken => "INVALID_TOKEN",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::TenantIdRequired
            | AppError::StaffIdRequired
            | AppError::DateRequired
            | AppError::BranchIdRequired
            | AppError::FutureDate
            | AppError::InvalidStatus
            | AppError::InvalidHalfDayType
            | AppError::ReasonRequired
            | AppError::NotCheckedIn => StatusCode::BAD_REQUEST,

            AppError::StaffNotFound
            | AppError::AttendanceNotFound
            | AppError::RegularizationNotFound
            | AppError::SettingsNotFound => StatusCode::NOT_FOUND,

            AppError::DuplicateAttendance
            | AppError::AlreadyCheckedIn
            | AppError::AlreadyCheckedOut
            | AppError::RegularizationAlreadyProcessed
            | AppError::CannotRegularizePendingRequest => StatusCode::CONFLICT,

            AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,

            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Converte o erro de domínio na resposta HTTP, já traduzida para o idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, store: &I18nStore) -> ApiError {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O detalhe fica no log, nunca no corpo da resposta.
            tracing::error!(error = ?self, "Erro interno do servidor");
        }

        let message = match self {
            AppError::Forbidden(slug) => store
                .translate(&locale.0, self.code())
                .map(|m| m.replace("{permission}", slug))
                .unwrap_or_else(|| self.to_string()),
            _ => store
                .translate(&locale.0, self.code())
                .map(str::to_string)
                .unwrap_or_else(|| self.to_string()),
        };

        let details = match self {
            AppError::ValidationError(errors) => Some(validation_details(errors)),
            _ => None,
        };

        ApiError {
            status,
            code: self.code(),
            error: message,
            details,
        }
    }
}

// Mapa campo -> mensagens (ou códigos, quando não há mensagem)
fn validation_details(errors: &validator::ValidationErrors) -> Value {
    let mut details = serde_json::Map::new();
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<String> = field_errors
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        details.insert(field.to_string(), json!(messages));
    }
    Value::Object(details)
}

// Resposta de erro que já foi localizada.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "code": self.code, "error": self.error, "details": details }),
            None => json!({ "code": self.code, "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Usado por extratores e middlewares, que não têm acesso ao idioma do cliente.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::fallback())
            .into_response()
    }
}
