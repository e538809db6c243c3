// src/middleware/rbac.rs

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{common::error::AppError, models::auth::CurrentUser};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. As permissões vêm no próprio token; não há consulta ao banco.
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .ok_or(AppError::InvalidToken)?;

        let required_perm = T::slug();
        if !user.has_permission(required_perm) {
            tracing::debug!(user_id = %user.id, permission = required_perm, "Permissão negada");
            return Err(AppError::Forbidden(required_perm));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermAttendanceManage;
impl PermissionDef for PermAttendanceManage {
    fn slug() -> &'static str { "attendance:manage" }
}

pub struct PermRegularizationReview;
impl PermissionDef for PermRegularizationReview {
    fn slug() -> &'static str { "regularization:review" }
}

pub struct PermSettingsWrite;
impl PermissionDef for PermSettingsWrite {
    fn slug() -> &'static str { "attendance_settings:write" }
}
