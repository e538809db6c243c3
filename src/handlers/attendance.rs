// src/handlers/attendance.rs

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
        pagination::{Page, PageRequest, SortOrder},
        time::local_now,
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermAttendanceManage, RequirePermission},
        tenancy::TenantContext,
    },
    models::{
        attendance::{
            AttendanceFilter, AttendanceRecord, AttendanceSortField, AttendanceStatus,
            CheckInRequest, CheckOutRequest, MarkAttendanceRequest, TodayAttendance,
        },
        summary::MonthlySummary,
    },
    services::attendance_service::{CheckInCommand, CheckOutCommand, MarkAttendanceCommand},
};

// =============================================================================
//  QUERY PARAMS
// =============================================================================

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AttendanceListQuery {
    pub staff_id: Option<Uuid>,
    pub branch_id: Option<Uuid>,
    pub department_id: Option<Uuid>,
    /// present | absent | half_day | on_leave | holiday
    pub status: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub sort_by: Option<AttendanceSortField>,
    pub sort_order: Option<SortOrder>,
    /// Id do último registro da página anterior
    pub cursor: Option<Uuid>,
    /// 1–100 (padrão 20)
    pub limit: Option<i64>,
}

impl AttendanceListQuery {
    fn into_parts(self) -> Result<(AttendanceFilter, PageRequest), crate::common::error::AppError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(raw.parse::<AttendanceStatus>()?),
        };

        let filter = AttendanceFilter {
            staff_id: self.staff_id,
            branch_id: self.branch_id,
            department_id: self.department_id,
            status,
            date_from: self.date_from,
            date_to: self.date_to,
            sort_by: self.sort_by.unwrap_or_default(),
            sort_order: self.sort_order.unwrap_or_default(),
        };

        Ok((filter, PageRequest::new(self.cursor, self.limit)))
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SummaryQuery {
    #[param(example = 2026)]
    pub year: i32,
    #[param(example = 3)]
    pub month: u32,
}

// =============================================================================
//  AUTOATENDIMENTO
// =============================================================================

// POST /api/attendance/check-in
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    tag = "Attendance",
    request_body(content = CheckInRequest, description = "Corpo opcional"),
    responses(
        (status = 201, description = "Entrada registrada", body = AttendanceRecord),
        (status = 400, description = "Funcionário sem perfil ou meio período inválido"),
        (status = 404, description = "Funcionário não encontrado"),
        (status = 409, description = "Entrada já registrada hoje")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_in(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    payload: Option<Json<CheckInRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    // Validação antes de tocar no banco
    let command = user
        .staff_id()
        .and_then(|staff_id| CheckInCommand::parse(staff_id, payload))
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let record = app_state
        .attendance_service
        .check_in(&mut *rls_conn, tenant.0, user.0.id, command, local_now())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(record)))
}

// POST /api/attendance/check-out
#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    tag = "Attendance",
    request_body(content = CheckOutRequest, description = "Corpo opcional"),
    responses(
        (status = 200, description = "Saída registrada", body = AttendanceRecord),
        (status = 400, description = "Entrada ainda não registrada"),
        (status = 409, description = "Saída já registrada hoje")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola")
    ),
    security(("api_jwt" = []))
)]
pub async fn check_out(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    payload: Option<Json<CheckOutRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let staff_id = user
        .staff_id()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    let command = CheckOutCommand::new(staff_id, payload);

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let record = app_state
        .attendance_service
        .check_out(&mut *rls_conn, tenant.0, command, local_now())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(record)))
}

// GET /api/attendance/today
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    tag = "Attendance",
    responses(
        (status = 200, description = "Ponto de hoje (marked = false se ainda não houver registro)", body = TodayAttendance)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_today(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
) -> Result<impl IntoResponse, ApiError> {
    let staff_id = user
        .staff_id()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let attendance = app_state
        .attendance_service
        .get_today(&mut *rls_conn, tenant.0, staff_id, local_now().date_naive())
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((
        StatusCode::OK,
        Json(TodayAttendance {
            marked: attendance.is_some(),
            attendance,
        }),
    ))
}

// GET /api/attendance/me
#[utoipa::path(
    get,
    path = "/api/attendance/me",
    tag = "Attendance",
    responses(
        (status = 200, description = "Histórico do próprio funcionário", body = Page<AttendanceRecord>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola"),
        AttendanceListQuery
    ),
    security(("api_jwt" = []))
)]
pub async fn list_my_attendance(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<AttendanceListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let staff_id = user
        .staff_id()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let (mut filter, page) = query
        .into_parts()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    // Sempre o próprio funcionário, ignorando o que veio na query
    filter.staff_id = Some(staff_id);

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state
        .attendance_service
        .list_attendance(&mut *rls_conn, tenant.0, &filter, &page)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

// GET /api/attendance/me/summary
#[utoipa::path(
    get,
    path = "/api/attendance/me/summary",
    tag = "Attendance",
    responses(
        (status = 200, description = "Resumo mensal do próprio funcionário", body = MonthlySummary),
        (status = 400, description = "Mês inválido")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola"),
        SummaryQuery
    ),
    security(("api_jwt" = []))
)]
pub async fn get_my_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let staff_id = user
        .staff_id()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let summary = app_state
        .summary_service
        .monthly_summary(&mut *rls_conn, tenant.0, staff_id, query.year, query.month)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

// =============================================================================
//  RH
// =============================================================================

// POST /api/attendance/mark
#[utoipa::path(
    post,
    path = "/api/attendance/mark",
    tag = "Attendance",
    request_body = MarkAttendanceRequest,
    responses(
        (status = 200, description = "Registro do dia criado ou sobrescrito", body = AttendanceRecord),
        (status = 400, description = "Dados inválidos ou data futura"),
        (status = 403, description = "Sem a permissão attendance:manage"),
        (status = 404, description = "Funcionário não encontrado")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_attendance(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermAttendanceManage>,
    Json(payload): Json<MarkAttendanceRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let command = MarkAttendanceCommand::parse(payload, local_now().date_naive())
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let record = app_state
        .attendance_service
        .mark_attendance(&mut *rls_conn, tenant.0, user.0.id, command)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(record)))
}

// GET /api/attendance
#[utoipa::path(
    get,
    path = "/api/attendance",
    tag = "Attendance",
    responses(
        (status = 200, description = "Registros de ponto (paginação por cursor)", body = Page<AttendanceRecord>),
        (status = 400, description = "Filtro de status inválido")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola"),
        AttendanceListQuery
    ),
    security(("api_jwt" = []))
)]
pub async fn list_attendance(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermAttendanceManage>,
    Query(query): Query<AttendanceListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let (filter, page) = query
        .into_parts()
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let result = app_state
        .attendance_service
        .list_attendance(&mut *rls_conn, tenant.0, &filter, &page)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(result)))
}

// GET /api/attendance/{id}
#[utoipa::path(
    get,
    path = "/api/attendance/{id}",
    tag = "Attendance",
    responses(
        (status = 200, description = "Registro de ponto", body = AttendanceRecord),
        (status = 404, description = "Registro não encontrado")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola"),
        ("id" = Uuid, Path, description = "ID do registro")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_attendance(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermAttendanceManage>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let record = app_state
        .attendance_service
        .get_by_id(&mut *rls_conn, tenant.0, id)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(record)))
}

// GET /api/attendance/staff/{staff_id}/summary
#[utoipa::path(
    get,
    path = "/api/attendance/staff/{staff_id}/summary",
    tag = "Attendance",
    responses(
        (status = 200, description = "Resumo mensal do funcionário", body = MonthlySummary),
        (status = 400, description = "Mês inválido")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da Escola"),
        ("staff_id" = Uuid, Path, description = "ID do funcionário"),
        SummaryQuery
    ),
    security(("api_jwt" = []))
)]
pub async fn get_staff_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    tenant: TenantContext,
    _perm: RequirePermission<PermAttendanceManage>,
    Path(staff_id): Path<Uuid>,
    Query(query): Query<SummaryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut rls_conn = get_rls_connection(&app_state, &tenant, &user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    let summary = app_state
        .summary_service
        .monthly_summary(&mut *rls_conn, tenant.0, staff_id, query.year, query.month)
        .await
        .map_err(|app_err| app_err.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::OK, Json(summary)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::AppError;

    #[test]
    fn list_query_defaults_to_attendance_date_desc() {
        let (filter, page) = AttendanceListQuery::default().into_parts().unwrap();
        assert_eq!(filter.sort_by, AttendanceSortField::AttendanceDate);
        assert_eq!(filter.sort_order, SortOrder::Desc);
        assert_eq!(filter.status, None);
        assert_eq!(page.limit(), 20);
    }

    #[test]
    fn list_query_rejects_unknown_status() {
        let query = AttendanceListQuery {
            status: Some("late".into()),
            ..Default::default()
        };
        assert!(matches!(query.into_parts(), Err(AppError::InvalidStatus)));
    }

    #[test]
    fn list_query_parses_status_filter() {
        let query = AttendanceListQuery {
            status: Some("on_leave".into()),
            limit: Some(500),
            ..Default::default()
        };
        let (filter, page) = query.into_parts().unwrap();
        assert_eq!(filter.status, Some(AttendanceStatus::OnLeave));
        assert_eq!(page.limit(), 100);
    }
}
