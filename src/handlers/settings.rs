// src/handlers/settings.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        db_utils::get_rls_connection,
        error::{ApiError, AppError},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermSettingsWrite, RequirePermission},
        tenancy::TenantContext,
    },
    models::settings::{AttendanceSettings, SettingsResponse, UpdateSettingsRequest},
};

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SettingsQuery {
    /// Unidade (filial) da escola
    pub branch_id: Option<Uuid>,
}

// GET /api/attendance/settings
#[utoipa::path(
    get,
    path = "/api/attendance/settings",
    tag = "Attendance Settings",
    responses(
        (status = 200, description = "Configuração da unidade (ou o padrão, com isDefault = true)", body = SettingsResponse),
        (status = 400, description = "branchId obrigatório")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola"),
        SettingsQuery
    ),
    security(("api_jwt" = []))
)]
pub async fn get_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<SettingsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let branch_id = query
        .branch_id
        .ok_or(AppError::BranchIdRequired)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Obtém conexão segura com RLS
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    // Sem configuração salva: devolve o padrão em vez do erro
    let response = match app_state
        .settings_service
        .get_settings(&mut *rls_conn, tenant.0, branch_id)
        .await
    {
        Ok(settings) => SettingsResponse {
            settings,
            is_default: false,
        },
        Err(AppError::SettingsNotFound) => SettingsResponse {
            settings: AttendanceSettings::defaults(tenant.0, branch_id),
            is_default: true,
        },
        Err(app_err) => return Err(app_err.to_api_error(&locale, &app_state.i18n_store)),
    };

    Ok((StatusCode::OK, Json(response)))
}

// PUT /api/attendance/settings
#[utoipa::path(
    put,
    path = "/api/attendance/settings",
    tag = "Attendance Settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Configuração salva (upsert)", body = AttendanceSettings),
        (status = 400, description = "Valores fora da faixa ou branchId ausente"),
        (status = 403, description = "Sem a permissão attendance_settings:write")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermSettingsWrite>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let branch_id = payload
        .branch_id
        .ok_or(AppError::BranchIdRequired)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    payload.validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let updated = app_state
        .settings_service
        .update_settings(&mut *rls_conn, tenant.0, branch_id, &payload)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(updated)))
}
