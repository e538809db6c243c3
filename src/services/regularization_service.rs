// src/services/regularization_service.rs

use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::{Acquire, Executor, PgConnection, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        pagination::{Page, PageRequest},
    },
    db::{regularization_repo::NewRegularization, AttendanceRepository, RegularizationRepository},
    models::{
        attendance::AttendanceStatus,
        regularization::{
            parse_requested_status, regularized_remarks, RegularizationFilter,
            RegularizationRequest, RejectRegularizationRequest, SubmitRegularizationRequest,
        },
    },
    services::staff_directory::{require_staff, StaffDirectory},
};

#[derive(Debug, Clone)]
pub struct SubmitRegularizationCommand {
    pub staff_id: Uuid,
    pub request_date: NaiveDate,
    pub requested_status: AttendanceStatus,
    pub reason: String,
    pub supporting_document_url: Option<String>,
}

impl SubmitRegularizationCommand {
    /// Ordem: data, data futura, status pedido, motivo, demais regras do payload.
    pub fn parse(
        staff_id: Uuid,
        request: SubmitRegularizationRequest,
        today: NaiveDate,
    ) -> Result<Self, AppError> {
        let request_date = request.request_date.ok_or(AppError::DateRequired)?;
        if request_date > today {
            return Err(AppError::FutureDate);
        }

        let requested_status = parse_requested_status(
            request.requested_status.as_deref().map(str::trim).unwrap_or_default(),
        )?;

        let reason = request
            .reason
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();
        if reason.is_empty() {
            return Err(AppError::ReasonRequired);
        }

        // URL vazia equivale a ausente; normaliza antes de validar
        let supporting_document_url = request
            .supporting_document_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string);

        SubmitRegularizationRequest {
            supporting_document_url: supporting_document_url.clone(),
            ..request
        }
        .validate()?;

        Ok(Self {
            staff_id,
            request_date,
            requested_status,
            reason,
            supporting_document_url,
        })
    }
}

/// Motivo obrigatório na rejeição, checado antes de qualquer acesso ao banco.
pub fn parse_rejection_reason(request: RejectRegularizationRequest) -> Result<String, AppError> {
    request
        .rejection_reason
        .as_deref()
        .map(str::trim)
        .filter(|reason| !reason.is_empty())
        .map(str::to_string)
        .ok_or(AppError::ReasonRequired)
}

#[derive(Clone)]
pub struct RegularizationService {
    repo: RegularizationRepository,
    attendance_repo: AttendanceRepository,
    staff_directory: Arc<dyn StaffDirectory>,
}

impl RegularizationService {
    pub fn new(
        repo: RegularizationRepository,
        attendance_repo: AttendanceRepository,
        staff_directory: Arc<dyn StaffDirectory>,
    ) -> Self {
        Self {
            repo,
            attendance_repo,
            staff_directory,
        }
    }

    pub async fn submit(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        command: SubmitRegularizationCommand,
    ) -> Result<RegularizationRequest, AppError> {
        let staff = require_staff(self.staff_directory.as_ref(), tenant_id, command.staff_id).await?;

        // Pré-checagem amigável; o índice único parcial continua sendo a garantia
        if self
            .repo
            .exists_pending(&mut *conn, tenant_id, staff.id, command.request_date)
            .await?
        {
            return Err(AppError::CannotRegularizePendingRequest);
        }

        // Só referência ao registro do dia, se houver
        let attendance_id = self
            .attendance_repo
            .find_by_staff_and_date(&mut *conn, tenant_id, staff.id, command.request_date)
            .await?
            .map(|record| record.id);

        let request = self
            .repo
            .insert(
                &mut *conn,
                tenant_id,
                &NewRegularization {
                    staff_id: staff.id,
                    request_date: command.request_date,
                    requested_status: command.requested_status,
                    reason: &command.reason,
                    supporting_document_url: command.supporting_document_url.as_deref(),
                    attendance_id,
                },
            )
            .await?;

        tracing::info!(
            %tenant_id,
            staff_id = %request.staff_id,
            regularization_id = %request.id,
            date = %request.request_date,
            requested_status = request.requested_status.as_str(),
            "Regularização solicitada"
        );

        Ok(request)
    }

    /// Aprovação: pedido e registro de ponto mudam juntos ou nenhum muda.
    pub async fn approve<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
        actor: Uuid,
    ) -> Result<RegularizationRequest, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // 1. Trava o pedido até o commit
        let request = self
            .repo
            .lock_by_id(&mut *tx, tenant_id, id)
            .await?
            .ok_or(AppError::RegularizationNotFound)?;
        request.status.ensure_pending()?;

        // 2. Efeito no ponto (cria ou troca status + observação)
        let record = self
            .attendance_repo
            .apply_regularization(
                &mut *tx,
                tenant_id,
                request.staff_id,
                request.request_date,
                request.requested_status,
                &regularized_remarks(&request.reason),
                actor,
            )
            .await?;

        // 3. Fecha o pedido apontando para o registro afetado
        let approved = self
            .repo
            .mark_approved(&mut *tx, tenant_id, request.id, actor, record.id)
            .await?;

        tx.commit().await?;

        tracing::info!(
            %tenant_id,
            regularization_id = %approved.id,
            attendance_id = %record.id,
            reviewed_by = %actor,
            "✅ Regularização aprovada"
        );

        Ok(approved)
    }

    pub async fn reject(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        id: Uuid,
        actor: Uuid,
        rejection_reason: &str,
    ) -> Result<RegularizationRequest, AppError> {
        if rejection_reason.trim().is_empty() {
            return Err(AppError::ReasonRequired);
        }

        let request = self
            .repo
            .find_by_id(&mut *conn, tenant_id, id)
            .await?
            .ok_or(AppError::RegularizationNotFound)?;
        request.status.ensure_pending()?;

        // O UPDATE só pega pedidos ainda pendentes; perdeu a corrida = já processado
        let rejected = self
            .repo
            .mark_rejected(&mut *conn, tenant_id, request.id, actor, rejection_reason.trim())
            .await?;

        tracing::info!(
            %tenant_id,
            regularization_id = %rejected.id,
            reviewed_by = %actor,
            "Regularização rejeitada"
        );

        Ok(rejected)
    }

    pub async fn get<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<RegularizationRequest, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_by_id(executor, tenant_id, id)
            .await?
            .ok_or(AppError::RegularizationNotFound)
    }

    pub async fn list(
        &self,
        conn: &mut PgConnection,
        tenant_id: Uuid,
        filter: &RegularizationFilter,
        page: &PageRequest,
    ) -> Result<Page<RegularizationRequest>, AppError> {
        let rows = self.repo.list(&mut *conn, tenant_id, filter, page).await?;
        let total = self.repo.count(&mut *conn, tenant_id, filter).await?;

        Ok(Page::from_overfetch(rows, page, total, |r| r.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn request() -> SubmitRegularizationRequest {
        SubmitRegularizationRequest {
            request_date: NaiveDate::from_ymd_opt(2026, 3, 9),
            requested_status: Some("present".into()),
            reason: Some("Forgot to punch in".into()),
            supporting_document_url: None,
        }
    }

    #[test]
    fn valid_submission_is_trimmed() {
        let mut req = request();
        req.reason = Some("  Forgot to punch in  ".into());
        req.supporting_document_url = Some("".into());

        let command = SubmitRegularizationCommand::parse(Uuid::new_v4(), req, today()).unwrap();
        assert_eq!(command.reason, "Forgot to punch in");
        assert_eq!(command.requested_status, AttendanceStatus::Present);
        assert_eq!(command.supporting_document_url, None);
    }

    #[test]
    fn blank_document_url_counts_as_absent() {
        for url in ["", "   "] {
            let mut req = request();
            req.supporting_document_url = Some(url.into());
            let command = SubmitRegularizationCommand::parse(Uuid::new_v4(), req, today()).unwrap();
            assert_eq!(command.supporting_document_url, None);
        }

        let mut req = request();
        req.supporting_document_url = Some(" https://files.example.com/note.pdf ".into());
        let command = SubmitRegularizationCommand::parse(Uuid::new_v4(), req, today()).unwrap();
        assert_eq!(
            command.supporting_document_url.as_deref(),
            Some("https://files.example.com/note.pdf")
        );
    }

    #[test]
    fn submission_requires_a_past_or_present_date() {
        let mut req = request();
        req.request_date = None;
        assert!(matches!(
            SubmitRegularizationCommand::parse(Uuid::new_v4(), req, today()),
            Err(AppError::DateRequired)
        ));

        let mut req = request();
        req.request_date = today().succ_opt();
        assert!(matches!(
            SubmitRegularizationCommand::parse(Uuid::new_v4(), req, today()),
            Err(AppError::FutureDate)
        ));

        let mut req = request();
        req.request_date = Some(today());
        assert!(SubmitRegularizationCommand::parse(Uuid::new_v4(), req, today()).is_ok());
    }

    #[test]
    fn submission_only_accepts_present_or_half_day() {
        for status in ["absent", "on_leave", "holiday", ""] {
            let mut req = request();
            req.requested_status = Some(status.into());
            assert!(matches!(
                SubmitRegularizationCommand::parse(Uuid::new_v4(), req, today()),
                Err(AppError::InvalidStatus)
            ));
        }

        let mut req = request();
        req.requested_status = Some("half_day".into());
        let command = SubmitRegularizationCommand::parse(Uuid::new_v4(), req, today()).unwrap();
        assert_eq!(command.requested_status, AttendanceStatus::HalfDay);
    }

    #[test]
    fn submission_requires_reason() {
        for reason in [None, Some(""), Some("   ")] {
            let mut req = request();
            req.reason = reason.map(str::to_string);
            assert!(matches!(
                SubmitRegularizationCommand::parse(Uuid::new_v4(), req, today()),
                Err(AppError::ReasonRequired)
            ));
        }
    }

    #[test]
    fn overlong_reason_and_bad_url_are_validation_errors() {
        let mut req = request();
        req.reason = Some("x".repeat(1001));
        assert!(matches!(
            SubmitRegularizationCommand::parse(Uuid::new_v4(), req, today()),
            Err(AppError::ValidationError(_))
        ));

        let mut req = request();
        req.supporting_document_url = Some("not a url".into());
        assert!(matches!(
            SubmitRegularizationCommand::parse(Uuid::new_v4(), req, today()),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn rejection_reason_is_mandatory() {
        assert!(matches!(
            parse_rejection_reason(RejectRegularizationRequest { rejection_reason: None }),
            Err(AppError::ReasonRequired)
        ));
        assert!(matches!(
            parse_rejection_reason(RejectRegularizationRequest {
                rejection_reason: Some("  ".into())
            }),
            Err(AppError::ReasonRequired)
        ));
        assert_eq!(
            parse_rejection_reason(RejectRegularizationRequest {
                rejection_reason: Some(" No turnstile record ".into())
            })
            .unwrap(),
            "No turnstile record"
        );
    }
}
