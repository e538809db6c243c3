// src/models/settings.rs

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSettings {
    #[schema(ignore)] // O tenant vem do header
    pub tenant_id: Uuid,

    pub branch_id: Uuid,

    #[schema(value_type = String, example = "09:00:00")]
    pub work_start_time: NaiveTime,

    #[schema(value_type = String, example = "17:00:00")]
    pub work_end_time: NaiveTime,

    #[schema(example = 15)]
    pub late_threshold_minutes: i32,

    #[schema(example = 4.0)]
    pub half_day_threshold_hours: f64,

    pub allow_self_checkout: bool,

    pub require_regularization_approval: bool,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl AttendanceSettings {
    /// Valores usados quando a unidade ainda não tem configuração salva.
    pub fn defaults(tenant_id: Uuid, branch_id: Uuid) -> Self {
        Self {
            tenant_id,
            branch_id,
            work_start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN),
            work_end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            late_threshold_minutes: 15,
            half_day_threshold_hours: 4.0,
            allow_self_checkout: true,
            require_regularization_approval: true,
            created_at: None,
            updated_at: None,
        }
    }
}

// Resposta do GET: indica se os valores vieram do padrão
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SettingsResponse {
    #[serde(flatten)]
    pub settings: AttendanceSettings,
    pub is_default: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    pub branch_id: Option<Uuid>,

    #[schema(value_type = Option<String>, example = "08:30:00")]
    pub work_start_time: Option<NaiveTime>,

    #[schema(value_type = Option<String>, example = "17:30:00")]
    pub work_end_time: Option<NaiveTime>,

    #[validate(range(min = 0, max = 120, message = "must be between 0 and 120"))]
    #[schema(example = 10)]
    pub late_threshold_minutes: Option<i32>,

    #[validate(range(min = 0.0, max = 12.0, message = "must be between 0 and 12"))]
    #[schema(example = 4.5)]
    pub half_day_threshold_hours: Option<f64>,

    pub allow_self_checkout: Option<bool>,

    pub require_regularization_approval: Option<bool>,
}

impl UpdateSettingsRequest {
    /// Aplica só os campos enviados sobre a configuração atual (ou o padrão).
    pub fn apply(&self, mut base: AttendanceSettings) -> Result<AttendanceSettings, ValidationErrors> {
        if let Some(start) = self.work_start_time {
            base.work_start_time = start;
        }
        if let Some(end) = self.work_end_time {
            base.work_end_time = end;
        }
        if let Some(minutes) = self.late_threshold_minutes {
            base.late_threshold_minutes = minutes;
        }
        if let Some(hours) = self.half_day_threshold_hours {
            base.half_day_threshold_hours = hours;
        }
        if let Some(allow) = self.allow_self_checkout {
            base.allow_self_checkout = allow;
        }
        if let Some(require) = self.require_regularization_approval {
            base.require_regularization_approval = require;
        }

        if base.work_end_time <= base.work_start_time {
            let mut errors = ValidationErrors::new();
            let mut err = ValidationError::new("work_hours");
            err.message = Some("workEndTime must be after workStartTime".into());
            errors.add("workEndTime", err);
            return Err(errors);
        }

        Ok(base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn patch_keeps_unspecified_fields() {
        let base = AttendanceSettings::defaults(Uuid::new_v4(), Uuid::new_v4());
        let patch = UpdateSettingsRequest {
            late_threshold_minutes: Some(5),
            ..Default::default()
        };

        let merged = patch.apply(base.clone()).unwrap();

        assert_eq!(merged.late_threshold_minutes, 5);
        assert_eq!(merged.work_start_time, hm(9, 0));
        assert_eq!(merged.work_end_time, hm(17, 0));
        assert_eq!(merged.half_day_threshold_hours, base.half_day_threshold_hours);
        assert!(merged.require_regularization_approval);
    }

    #[test]
    fn end_before_start_is_rejected() {
        let base = AttendanceSettings::defaults(Uuid::new_v4(), Uuid::new_v4());
        let patch = UpdateSettingsRequest {
            work_start_time: Some(hm(18, 0)),
            ..Default::default()
        };

        let errors = patch.apply(base).unwrap_err();
        assert!(errors.field_errors().contains_key("workEndTime"));
    }

    #[test]
    fn ranges_are_validated() {
        let too_late = UpdateSettingsRequest {
            late_threshold_minutes: Some(121),
            ..Default::default()
        };
        assert!(too_late.validate().is_err());

        let too_long = UpdateSettingsRequest {
            half_day_threshold_hours: Some(12.5),
            ..Default::default()
        };
        assert!(too_long.validate().is_err());

        let fine = UpdateSettingsRequest {
            late_threshold_minutes: Some(120),
            half_day_threshold_hours: Some(0.0),
            ..Default::default()
        };
        assert!(fine.validate().is_ok());
    }
}
