// src/services/staff_directory.rs

use async_trait::async_trait;
use uuid::Uuid;

use crate::{common::error::AppError, models::staff::StaffMember};

/// Diretório de funcionários (colaborador externo).
/// Valida a existência do funcionário e informa a unidade dele.
#[async_trait]
pub trait StaffDirectory: Send + Sync {
    async fn get_by_id(&self, tenant_id: Uuid, staff_id: Uuid) -> Result<Option<StaffMember>, AppError>;
}

/// Busca obrigatória: ausência vira StaffNotFound.
pub async fn require_staff(
    directory: &dyn StaffDirectory,
    tenant_id: Uuid,
    staff_id: Uuid,
) -> Result<StaffMember, AppError> {
    directory
        .get_by_id(tenant_id, staff_id)
        .await?
        .ok_or(AppError::StaffNotFound)
}
