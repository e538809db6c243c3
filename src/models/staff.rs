// src/models/staff.rs

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Visão mínima do diretório de funcionários (serviço externo).
#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub branch_id: Uuid,
    pub department_id: Option<Uuid>,
    pub full_name: String,
}
