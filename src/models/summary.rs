// src/models/summary.rs

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{ValidationError, ValidationErrors};

use crate::models::attendance::AttendanceStatus;

/// Linha mínima lida do banco para o resumo mensal.
#[derive(Debug, Clone, FromRow)]
pub struct SummaryRow {
    pub status: AttendanceStatus,
    pub is_late: bool,
    pub late_minutes: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub staff_id: Uuid,
    pub year: i32,
    pub month: u32,
    /// Quantidade de registros encontrados no mês (não é o número de dias do calendário).
    pub total_days: i64,
    pub present_days: i64,
    pub absent_days: i64,
    pub half_days: i64,
    pub leave_days: i64,
    pub holidays: i64,
    pub late_days: i64,
    pub total_late_minutes: i64,
}

impl MonthlySummary {
    pub fn tally(staff_id: Uuid, year: i32, month: u32, rows: &[SummaryRow]) -> Self {
        let mut summary = Self {
            staff_id,
            year,
            month,
            total_days: rows.len() as i64,
            ..Default::default()
        };

        for row in rows {
            match row.status {
                AttendanceStatus::Present => summary.present_days += 1,
                AttendanceStatus::Absent => summary.absent_days += 1,
                AttendanceStatus::HalfDay => summary.half_days += 1,
                AttendanceStatus::OnLeave => summary.leave_days += 1,
                AttendanceStatus::Holiday => summary.holidays += 1,
            }
            if row.is_late {
                summary.late_days += 1;
                summary.total_late_minutes += i64::from(row.late_minutes);
            }
        }

        summary
    }
}

/// Intervalo [primeiro dia do mês, primeiro dia do mês seguinte).
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), ValidationErrors> {
    if !(1..=12).contains(&month) {
        return Err(range_error("month", "month must be between 1 and 12"));
    }

    let start = NaiveDate::from_ymd_opt(year, month, 1);
    let end = start.and_then(|s| {
        if s.month() == 12 {
            NaiveDate::from_ymd_opt(s.year() + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(s.year(), s.month() + 1, 1)
        }
    });

    // Mês válido: só o ano pode estar fora do calendário suportado
    match (start, end) {
        (Some(start), Some(end)) => Ok((start, end)),
        _ => Err(range_error("year", "year is out of the supported range")),
    }
}

fn range_error(field: &'static str, message: &'static str) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let mut err = ValidationError::new("range");
    err.message = Some(message.into());
    errors.add(field, err);
    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: AttendanceStatus, late: Option<i32>) -> SummaryRow {
        SummaryRow {
            status,
            is_late: late.is_some(),
            late_minutes: late.unwrap_or(0),
        }
    }

    #[test]
    fn total_days_counts_records_not_calendar_days() {
        // 3 dias marcados num mês com ~20 dias úteis
        let rows = vec![
            row(AttendanceStatus::Present, None),
            row(AttendanceStatus::Present, Some(16)),
            row(AttendanceStatus::Absent, None),
        ];

        let summary = MonthlySummary::tally(Uuid::nil(), 2026, 3, &rows);

        assert_eq!(summary.total_days, 3);
        assert_eq!(summary.present_days, 2);
        assert_eq!(summary.absent_days, 1);
        assert_eq!(summary.late_days, 1);
        assert_eq!(summary.total_late_minutes, 16);
    }

    #[test]
    fn every_status_has_its_bucket() {
        let rows = vec![
            row(AttendanceStatus::HalfDay, None),
            row(AttendanceStatus::OnLeave, None),
            row(AttendanceStatus::Holiday, None),
            row(AttendanceStatus::Present, Some(20)),
            row(AttendanceStatus::Present, Some(31)),
        ];

        let summary = MonthlySummary::tally(Uuid::nil(), 2026, 1, &rows);

        assert_eq!(summary.half_days, 1);
        assert_eq!(summary.leave_days, 1);
        assert_eq!(summary.holidays, 1);
        assert_eq!(summary.present_days, 2);
        assert_eq!(summary.late_days, 2);
        assert_eq!(summary.total_late_minutes, 51);
    }

    #[test]
    fn empty_month_is_all_zero() {
        let summary = MonthlySummary::tally(Uuid::nil(), 2026, 2, &[]);
        assert_eq!(summary.total_days, 0);
        assert_eq!(summary.late_days, 0);
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (start, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 12, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap());
    }

    #[test]
    fn invalid_month_is_a_validation_error() {
        for month in [0, 13] {
            let errors = month_bounds(2026, month).unwrap_err();
            assert!(errors.field_errors().contains_key("month"));
        }
    }

    #[test]
    fn year_outside_the_calendar_is_reported_on_year() {
        let errors = month_bounds(300_000, 5).unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("year"));
        assert!(!fields.contains_key("month"));

        // Último mês representável: o seguinte já não existe
        assert!(month_bounds(NaiveDate::MAX.year(), 12).unwrap_err().field_errors().contains_key("year"));
    }
}
