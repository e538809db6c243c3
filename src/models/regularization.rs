// src/models/regularization.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::error::AppError;
use crate::models::attendance::AttendanceStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "regularization_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RegularizationStatus {
    Pending,
    Approved,
    Rejected,
}

impl RegularizationStatus {
    /// pending -> approved | rejected. Os dois destinos são terminais.
    pub fn ensure_pending(self) -> Result<(), AppError> {
        match self {
            RegularizationStatus::Pending => Ok(()),
            RegularizationStatus::Approved | RegularizationStatus::Rejected => {
                Err(AppError::RegularizationAlreadyProcessed)
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegularizationRequest {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub staff_id: Uuid,
    #[schema(example = "2026-03-02")]
    pub request_date: NaiveDate,
    pub requested_status: AttendanceStatus,
    #[schema(example = "Esqueci de bater o ponto na entrada")]
    pub reason: String,
    pub supporting_document_url: Option<String>,
    pub status: RegularizationStatus,
    /// Registro de ponto existente na data (só referência).
    pub attendance_id: Option<Uuid>,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRegularizationRequest {
    #[schema(example = "2026-03-02")]
    pub request_date: Option<NaiveDate>,

    #[schema(example = "present")]
    pub requested_status: Option<String>,

    #[validate(length(max = 1000, message = "must be at most 1000 characters"))]
    #[schema(example = "Esqueci de bater o ponto na entrada")]
    pub reason: Option<String>,

    #[validate(url(message = "must be a valid URL"))]
    #[schema(example = "https://files.escola.com/atestado.pdf")]
    pub supporting_document_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectRegularizationRequest {
    #[schema(example = "Sem registro na catraca")]
    pub rejection_reason: Option<String>,
}

/// Só presença integral ou meio período podem ser solicitados.
pub fn parse_requested_status(raw: &str) -> Result<AttendanceStatus, AppError> {
    match raw.parse::<AttendanceStatus>()? {
        status @ (AttendanceStatus::Present | AttendanceStatus::HalfDay) => Ok(status),
        _ => Err(AppError::InvalidStatus),
    }
}

pub fn regularized_remarks(reason: &str) -> String {
    format!("Regularized: {reason}")
}

#[derive(Debug, Clone, Default)]
pub struct RegularizationFilter {
    pub staff_id: Option<Uuid>,
    pub status: Option<RegularizationStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_can_transition() {
        assert!(RegularizationStatus::Pending.ensure_pending().is_ok());
        assert!(matches!(
            RegularizationStatus::Approved.ensure_pending(),
            Err(AppError::RegularizationAlreadyProcessed)
        ));
        assert!(matches!(
            RegularizationStatus::Rejected.ensure_pending(),
            Err(AppError::RegularizationAlreadyProcessed)
        ));
    }

    #[test]
    fn requested_status_is_restricted() {
        assert_eq!(parse_requested_status("present").unwrap(), AttendanceStatus::Present);
        assert_eq!(parse_requested_status("half_day").unwrap(), AttendanceStatus::HalfDay);
        assert!(matches!(parse_requested_status("absent"), Err(AppError::InvalidStatus)));
        assert!(matches!(parse_requested_status("holiday"), Err(AppError::InvalidStatus)));
        assert!(matches!(parse_requested_status("nope"), Err(AppError::InvalidStatus)));
    }

    #[test]
    fn remarks_convention() {
        assert_eq!(regularized_remarks("Forgot to punch"), "Regularized: Forgot to punch");
    }
}
