// src/services/settings_service.rs

use async_trait::async_trait;
use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::SettingsRepository,
    models::settings::{AttendanceSettings, UpdateSettingsRequest},
};

/// Fonte das configurações de ponto usadas no cálculo de atraso.
/// `Ok(None)` significa "unidade sem configuração": o atraso fica desligado.
#[async_trait]
pub trait SettingsResolver: Send + Sync {
    async fn resolve(&self, tenant_id: Uuid, branch_id: Uuid) -> Result<Option<AttendanceSettings>, AppError>;
}

#[derive(Clone)]
pub struct SettingsService {
    repo: SettingsRepository,
    pool: PgPool,
}

impl SettingsService {
    pub fn new(repo: SettingsRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn get_settings<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        branch_id: Uuid,
    ) -> Result<AttendanceSettings, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find(executor, tenant_id, branch_id)
            .await?
            .ok_or(AppError::SettingsNotFound)
    }

    pub async fn update_settings<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        branch_id: Uuid,
        patch: &UpdateSettingsRequest,
    ) -> Result<AttendanceSettings, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        // 1. Faixas (tolerância 0–120, meio período 0–12) antes de tocar no banco
        patch.validate()?;

        let mut tx = executor.begin().await?;

        // 2. Mescla o que veio com o que existe (ou com o padrão)
        let base = self
            .repo
            .find(&mut *tx, tenant_id, branch_id)
            .await?
            .unwrap_or_else(|| AttendanceSettings::defaults(tenant_id, branch_id));
        let merged = patch.apply(base)?;

        // 3. Upsert
        let saved = self.repo.upsert(&mut *tx, &merged).await?;
        tx.commit().await?;

        tracing::info!(
            %tenant_id,
            %branch_id,
            work_start = %saved.work_start_time,
            late_threshold = saved.late_threshold_minutes,
            "Configurações de ponto atualizadas"
        );

        Ok(saved)
    }
}

#[async_trait]
impl SettingsResolver for SettingsService {
    async fn resolve(&self, tenant_id: Uuid, branch_id: Uuid) -> Result<Option<AttendanceSettings>, AppError> {
        self.repo.find(&self.pool, tenant_id, branch_id).await
    }
}
