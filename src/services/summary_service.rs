// src/services/summary_service.rs

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AttendanceRepository,
    models::summary::{month_bounds, MonthlySummary},
};

#[derive(Clone, Default)]
pub struct SummaryService {
    repo: AttendanceRepository,
}

impl SummaryService {
    pub fn new(repo: AttendanceRepository) -> Self {
        Self { repo }
    }

    /// Recalculado a cada chamada; nada é persistido.
    pub async fn monthly_summary<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        staff_id: Uuid,
        year: i32,
        month: u32,
    ) -> Result<MonthlySummary, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let (from, until) = month_bounds(year, month)?;

        let rows = self
            .repo
            .month_rows(executor, tenant_id, staff_id, from, until)
            .await?;

        Ok(MonthlySummary::tally(staff_id, year, month, &rows))
    }
}
