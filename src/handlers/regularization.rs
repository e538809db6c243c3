// src/handlers/regularization.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::{
    common::{
        db_utils::get_rls_connection,
        error::ApiError,
        pagination::{Page, PageRequest},
        time::local_now,
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermRegularizationReview, RequirePermission},
        tenancy::TenantContext,
    },
    models::regularization::{
        RegularizationFilter, RegularizationRequest, RegularizationStatus,
        RejectRegularizationRequest, SubmitRegularizationRequest,
    },
    services::regularization_service::{parse_rejection_reason, SubmitRegularizationCommand},
};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RegularizationListQuery {
    pub staff_id: Option<Uuid>,
    pub status: Option<RegularizationStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub cursor: Option<Uuid>,
    pub limit: Option<i64>,
}

impl RegularizationListQuery {
    fn into_parts(self) -> (RegularizationFilter, PageRequest) {
        (
            RegularizationFilter {
                staff_id: self.staff_id,
                status: self.status,
                date_from: self.date_from,
                date_to: self.date_to,
            },
            PageRequest::new(self.cursor, self.limit),
        )
    }
}

// POST /api/attendance/regularizations
#[utoipa::path(
    post,
    path = "/api/attendance/regularizations",
    tag = "Regularization",
    request_body = SubmitRegularizationRequest,
    responses(
        (status = 201, description = "Pedido de regularização criado", body = RegularizationRequest),
        (status = 400, description = "Data futura, status ou motivo inválidos"),
        (status = 404, description = "Funcionário não encontrado"),
        (status = 409, description = "Já existe pedido pendente para a data")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_regularization(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Json(payload): Json<SubmitRegularizationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = user
        .staff_id()
        .and_then(|staff_id| {
            SubmitRegularizationCommand::parse(staff_id, payload, local_now().date_naive())
        })
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .regularization_service
        .submit(&mut *rls_conn, tenant.0, command)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(request)))
}

// GET /api/attendance/regularizations/me
#[utoipa::path(
    get,
    path = "/api/attendance/regularizations/me",
    tag = "Regularization",
    responses(
        (status = 200, description = "Pedidos do próprio funcionário", body = Page<RegularizationRequest>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola"),
        RegularizationListQuery
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_regularizations(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<RegularizationListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let staff_id = user
        .staff_id()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let (mut filter, page) = query.into_parts();
    filter.staff_id = Some(staff_id);

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state
        .regularization_service
        .list(&mut *rls_conn, tenant.0, &filter, &page)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

// GET /api/attendance/regularizations
#[utoipa::path(
    get,
    path = "/api/attendance/regularizations",
    tag = "Regularization",
    responses(
        (status = 200, description = "Pedidos de regularização (mais recentes primeiro)", body = Page<RegularizationRequest>),
        (status = 403, description = "Sem a permissão regularization:review")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola"),
        RegularizationListQuery
    ),
    security(("api_jwt" = []))
)]
pub async fn list_regularizations(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermRegularizationReview>,
    Query(query): Query<RegularizationListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (filter, page) = query.into_parts();

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state
        .regularization_service
        .list(&mut *rls_conn, tenant.0, &filter, &page)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

// GET /api/attendance/regularizations/{id}
#[utoipa::path(
    get,
    path = "/api/attendance/regularizations/{id}",
    tag = "Regularization",
    responses(
        (status = 200, description = "Pedido de regularização", body = RegularizationRequest),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola"),
        ("id" = Uuid, Path, description = "ID do pedido")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_regularization(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermRegularizationReview>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .regularization_service
        .get(&mut *rls_conn, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(request)))
}

// POST /api/attendance/regularizations/{id}/approve
#[utoipa::path(
    post,
    path = "/api/attendance/regularizations/{id}/approve",
    tag = "Regularization",
    responses(
        (status = 200, description = "Pedido aprovado e ponto ajustado na mesma transação", body = RegularizationRequest),
        (status = 404, description = "Pedido não encontrado"),
        (status = 409, description = "Pedido já processado")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola"),
        ("id" = Uuid, Path, description = "ID do pedido")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_regularization(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermRegularizationReview>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .regularization_service
        .approve(&mut *rls_conn, tenant.0, id, user.0.id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(request)))
}

// POST /api/attendance/regularizations/{id}/reject
#[utoipa::path(
    post,
    path = "/api/attendance/regularizations/{id}/reject",
    tag = "Regularization",
    request_body = RejectRegularizationRequest,
    responses(
        (status = 200, description = "Pedido rejeitado", body = RegularizationRequest),
        (status = 400, description = "Motivo da rejeição obrigatório"),
        (status = 404, description = "Pedido não encontrado"),
        (status = 409, description = "Pedido já processado")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola"),
        ("id" = Uuid, Path, description = "ID do pedido")
    ),
    security(("api_jwt" = []))
)]
pub async fn reject_regularization(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermRegularizationReview>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectRegularizationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let rejection_reason = parse_rejection_reason(payload)
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let request = app_state
        .regularization_service
        .reject(&mut *rls_conn, tenant.0, id, user.0.id, &rejection_reason)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(request)))
}
