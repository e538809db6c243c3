// src/db/staff_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::staff::StaffMember,
    services::staff_directory::StaffDirectory,
};

// Leitura do diretório de funcionários direto na tabela compartilhada `staff`.
#[derive(Clone)]
pub struct PgStaffDirectory {
    pool: PgPool,
}

impl PgStaffDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffDirectory for PgStaffDirectory {
    async fn get_by_id(&self, tenant_id: Uuid, staff_id: Uuid) -> Result<Option<StaffMember>, AppError> {
        let staff = sqlx::query_as::<_, StaffMember>(
            r#"
            SELECT id, tenant_id, branch_id, department_id, full_name
            FROM staff
            WHERE tenant_id = $1 AND id = $2
            "#,
        )
        .bind(tenant_id)
        .bind(staff_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(staff)
    }
}
