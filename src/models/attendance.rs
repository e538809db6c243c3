// src/models/attendance.rs

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "attendance_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    HalfDay,
    OnLeave,
    Holiday,
}

impl AttendanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
            AttendanceStatus::HalfDay => "half_day",
            AttendanceStatus::OnLeave => "on_leave",
            AttendanceStatus::Holiday => "holiday",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            "half_day" => Ok(AttendanceStatus::HalfDay),
            "on_leave" => Ok(AttendanceStatus::OnLeave),
            "holiday" => Ok(AttendanceStatus::Holiday),
            _ => Err(AppError::InvalidStatus),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "half_day_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HalfDayType {
    FirstHalf,
    SecondHalf,
}

impl FromStr for HalfDayType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first_half" => Ok(HalfDayType::FirstHalf),
            "second_half" => Ok(HalfDayType::SecondHalf),
            _ => Err(AppError::InvalidHalfDayType),
        }
    }
}

/// Lê o meio período vindo da API: ausente ou vazio significa "sem meio período".
pub fn parse_half_day_type(raw: Option<&str>) -> Result<Option<HalfDayType>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some),
    }
}

// --- Registro de ponto ---

/// Um registro por funcionário por dia (UNIQUE tenant_id + staff_id + attendance_date).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub staff_id: Uuid,
    #[schema(example = "2026-03-02")]
    pub attendance_date: NaiveDate,
    pub status: AttendanceStatus,
    pub check_in_time: Option<DateTime<Utc>>,
    pub check_out_time: Option<DateTime<Utc>>,
    pub is_late: bool,
    #[schema(example = 16)]
    pub late_minutes: i32,
    pub half_day_type: Option<HalfDayType>,
    #[schema(example = "Dentista às 8h; saída antecipada")]
    pub remarks: String,
    pub marked_by: Option<Uuid>,
    pub marked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceRecord {
    /// Entrada só é aceita se o registro do dia ainda não tem horário de entrada.
    pub fn ensure_can_check_in(&self) -> Result<(), AppError> {
        if self.check_in_time.is_some() {
            return Err(AppError::AlreadyCheckedIn);
        }
        Ok(())
    }

    pub fn ensure_can_check_out(&self) -> Result<(), AppError> {
        if self.check_in_time.is_none() {
            return Err(AppError::NotCheckedIn);
        }
        if self.check_out_time.is_some() {
            return Err(AppError::AlreadyCheckedOut);
        }
        Ok(())
    }
}

/// Observações do autoatendimento nunca sobrescrevem as anteriores.
pub fn append_remarks(existing: &str, addition: &str) -> String {
    let addition = addition.trim();
    match (existing.is_empty(), addition.is_empty()) {
        (_, true) => existing.to_string(),
        (true, false) => addition.to_string(),
        (false, false) => format!("{existing}; {addition}"),
    }
}

/// Resposta de "ponto de hoje": o registro, ou a indicação de que ainda não foi marcado.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TodayAttendance {
    pub marked: bool,
    pub attendance: Option<AttendanceRecord>,
}

// --- Payloads ---

// Status e meio período chegam como texto cru: valor desconhecido vira
// InvalidStatus / InvalidHalfDayType, e não erro de desserialização.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    #[schema(example = "first_half")]
    pub half_day_type: Option<String>,
    #[schema(example = "Trânsito na avenida principal")]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutRequest {
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    pub staff_id: Option<Uuid>,
    #[schema(example = "2026-03-02")]
    pub attendance_date: Option<NaiveDate>,
    #[schema(example = "present")]
    pub status: Option<String>,
    /// Horário com fuso (RFC 3339); o atraso usa o dia e a hora locais desse fuso.
    #[schema(value_type = Option<String>, example = "2026-03-02T09:16:00-03:00")]
    pub check_in_time: Option<DateTime<FixedOffset>>,
    #[schema(value_type = Option<String>, example = "2026-03-02T17:05:00-03:00")]
    pub check_out_time: Option<DateTime<FixedOffset>>,
    pub half_day_type: Option<String>,
    pub remarks: Option<String>,
}

// --- Filtros de listagem ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum AttendanceSortField {
    #[default]
    AttendanceDate,
    CreatedAt,
}

impl AttendanceSortField {
    // Tupla do keyset, sempre terminando no id
    pub fn key_columns(self) -> &'static [&'static str] {
        match self {
            AttendanceSortField::AttendanceDate => &["attendance_date", "created_at", "id"],
            AttendanceSortField::CreatedAt => &["created_at", "id"],
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceFilter {
    pub staff_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    pub status: Option<AttendanceStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort_by: AttendanceSortField,
    pub sort_order: crate::common::pagination::SortOrder,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AttendanceRecord {
        let now = Utc::now();
        AttendanceRecord {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            staff_id: Uuid::new_v4(),
            attendance_date: now.date_naive(),
            status: AttendanceStatus::Present,
            check_in_time: None,
            check_out_time: None,
            is_late: false,
            late_minutes: 0,
            half_day_type: None,
            remarks: String::new(),
            marked_by: None,
            marked_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn status_parses_known_values_only() {
        assert_eq!("on_leave".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::OnLeave);
        assert_eq!("half_day".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::HalfDay);
        assert!(matches!("late".parse::<AttendanceStatus>(), Err(AppError::InvalidStatus)));
        assert!(matches!("Present".parse::<AttendanceStatus>(), Err(AppError::InvalidStatus)));
    }

    #[test]
    fn half_day_type_accepts_empty_as_none() {
        assert_eq!(parse_half_day_type(None).unwrap(), None);
        assert_eq!(parse_half_day_type(Some("")).unwrap(), None);
        assert_eq!(
            parse_half_day_type(Some("second_half")).unwrap(),
            Some(HalfDayType::SecondHalf)
        );
        assert!(matches!(
            parse_half_day_type(Some("morning")),
            Err(AppError::InvalidHalfDayType)
        ));
    }

    #[test]
    fn pre_created_record_accepts_check_in() {
        let rec = record();
        assert!(rec.ensure_can_check_in().is_ok());
    }

    #[test]
    fn second_check_in_is_rejected() {
        let mut rec = record();
        rec.check_in_time = Some(Utc::now());
        assert!(matches!(rec.ensure_can_check_in(), Err(AppError::AlreadyCheckedIn)));
    }

    #[test]
    fn check_out_requires_check_in_and_happens_once() {
        let mut rec = record();
        assert!(matches!(rec.ensure_can_check_out(), Err(AppError::NotCheckedIn)));

        rec.check_in_time = Some(Utc::now());
        assert!(rec.ensure_can_check_out().is_ok());

        rec.check_out_time = Some(Utc::now());
        assert!(matches!(rec.ensure_can_check_out(), Err(AppError::AlreadyCheckedOut)));
    }

    #[test]
    fn remarks_are_appended_with_separator() {
        assert_eq!(append_remarks("", "late bus"), "late bus");
        assert_eq!(append_remarks("late bus", "left early"), "late bus; left early");
        assert_eq!(append_remarks("late bus", "  "), "late bus");
        assert_eq!(append_remarks("", ""), "");
    }

    #[test]
    fn status_serializes_as_snake_case() {
        let v = serde_json::to_value(AttendanceStatus::OnLeave).unwrap();
        assert_eq!(v, serde_json::json!("on_leave"));
        assert_eq!(AttendanceStatus::HalfDay.as_str(), "half_day");
    }
}
