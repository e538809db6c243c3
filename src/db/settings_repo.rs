use sqlx::{Executor, Postgres};
use uuid::Uuid;
use crate::{
    common::error::AppError,
    models::settings::AttendanceSettings,
};

#[derive(Clone, Default)]
pub struct SettingsRepository;

impl SettingsRepository {
    pub fn new() -> Self {
        Self
    }

    // Não existir é um resultado válido (None): quem chama decide o padrão.
    pub async fn find<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        branch_id: Uuid,
    ) -> Result<Option<AttendanceSettings>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let settings = sqlx::query_as::<_, AttendanceSettings>(
            "SELECT * FROM attendance_settings WHERE tenant_id = $1 AND branch_id = $2",
        )
            .bind(tenant_id)
            .bind(branch_id)
            .fetch_optional(executor)
            .await?;

        Ok(settings)
    }

    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        settings: &AttendanceSettings,
    ) -> Result<AttendanceSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // UPSERT (Insert or Update) — uma linha por (tenant, unidade), sem histórico
        let saved = sqlx::query_as::<_, AttendanceSettings>(
            r#"
            INSERT INTO attendance_settings (
                tenant_id, branch_id, work_start_time, work_end_time,
                late_threshold_minutes, half_day_threshold_hours,
                allow_self_checkout, require_regularization_approval
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (tenant_id, branch_id)
            DO UPDATE SET
                work_start_time = EXCLUDED.work_start_time,
                work_end_time = EXCLUDED.work_end_time,
                late_threshold_minutes = EXCLUDED.late_threshold_minutes,
                half_day_threshold_hours = EXCLUDED.half_day_threshold_hours,
                allow_self_checkout = EXCLUDED.allow_self_checkout,
                require_regularization_approval = EXCLUDED.require_regularization_approval,
                updated_at = NOW()
            RETURNING *
            "#,
        )
            .bind(settings.tenant_id)
            .bind(settings.branch_id)
            .bind(settings.work_start_time)
            .bind(settings.work_end_time)
            .bind(settings.late_threshold_minutes)
            .bind(settings.half_day_threshold_hours)
            .bind(settings.allow_self_checkout)
            .bind(settings.require_regularization_approval)
            .fetch_one(executor)
            .await?;

        Ok(saved)
    }
}
