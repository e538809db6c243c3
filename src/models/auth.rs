// src/models/auth.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Estrutura de dados ("claims") dentro do JWT.
// A emissão do token é responsabilidade do serviço de identidade.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub sub: Uuid, // Subject (quem age: funcionário ou RH)
    #[serde(default)]
    pub staff_id: Option<Uuid>,
    #[serde(default)]
    pub permissions: Vec<String>,
    pub exp: usize,
    pub iat: usize,
}

// O chamador autenticado, como os handlers o enxergam
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub staff_id: Option<Uuid>,
    pub permissions: Vec<String>,
}

impl CurrentUser {
    pub fn has_permission(&self, slug: &str) -> bool {
        self.permissions.iter().any(|p| p == slug)
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            staff_id: claims.staff_id,
            permissions: claims.permissions,
        }
    }
}
