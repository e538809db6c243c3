// src/services/lateness.rs

use chrono::{Duration, NaiveDateTime};

use crate::models::settings::AttendanceSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Lateness {
    pub is_late: bool,
    pub late_minutes: i32,
}

impl Lateness {
    pub const ON_TIME: Lateness = Lateness {
        is_late: false,
        late_minutes: 0,
    };

    /// Calcula o atraso de uma entrada (horário local de parede).
    ///
    /// Sem configuração para a unidade, o cálculo fica desligado. O limite é
    /// `início + tolerância`, mas os minutos de atraso contam a partir do início
    /// do expediente, não do limite.
    pub fn compute(check_in: NaiveDateTime, settings: Option<&AttendanceSettings>) -> Self {
        let Some(settings) = settings else {
            return Self::ON_TIME;
        };

        let work_start = check_in.date().and_time(settings.work_start_time);
        let threshold = work_start + Duration::minutes(i64::from(settings.late_threshold_minutes));

        if check_in <= threshold {
            return Self::ON_TIME;
        }

        let minutes = (check_in - work_start).num_minutes();
        Self {
            is_late: true,
            late_minutes: i32::try_from(minutes).unwrap_or(i32::MAX),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use uuid::Uuid;

    fn settings(start: (u32, u32), threshold: i32) -> AttendanceSettings {
        let mut s = AttendanceSettings::defaults(Uuid::new_v4(), Uuid::new_v4());
        s.work_start_time = NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap();
        s.late_threshold_minutes = threshold;
        s
    }

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 2)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn within_grace_period_is_on_time() {
        let s = settings((9, 0), 15);
        assert_eq!(Lateness::compute(at(9, 14, 0), Some(&s)), Lateness::ON_TIME);
        assert_eq!(Lateness::compute(at(8, 30, 0), Some(&s)), Lateness::ON_TIME);
    }

    #[test]
    fn exactly_at_threshold_is_on_time() {
        let s = settings((9, 0), 15);
        assert_eq!(Lateness::compute(at(9, 15, 0), Some(&s)), Lateness::ON_TIME);
    }

    #[test]
    fn late_minutes_count_from_work_start() {
        let s = settings((9, 0), 15);
        let lateness = Lateness::compute(at(9, 16, 0), Some(&s));

        assert!(lateness.is_late);
        assert_eq!(lateness.late_minutes, 16);
    }

    #[test]
    fn partial_minutes_are_floored() {
        let s = settings((9, 0), 15);
        let lateness = Lateness::compute(at(9, 15, 30), Some(&s));

        assert!(lateness.is_late);
        assert_eq!(lateness.late_minutes, 15);
    }

    #[test]
    fn zero_threshold_flags_any_delay() {
        let s = settings((8, 0), 0);
        let lateness = Lateness::compute(at(8, 1, 0), Some(&s));
        assert_eq!(lateness, Lateness { is_late: true, late_minutes: 1 });
    }

    #[test]
    fn missing_settings_disable_lateness() {
        assert_eq!(Lateness::compute(at(23, 59, 0), None), Lateness::ON_TIME);
    }
}
