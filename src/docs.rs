// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::common::pagination::SortOrder;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Ponto ---
        handlers::attendance::check_in,
        handlers::attendance::check_out,
        handlers::attendance::get_today,
        handlers::attendance::list_my_attendance,
        handlers::attendance::get_my_summary,
        handlers::attendance::mark_attendance,
        handlers::attendance::list_attendance,
        handlers::attendance::get_attendance,
        handlers::attendance::get_staff_summary,

        // --- Regularização ---
        handlers::regularization::submit_regularization,
        handlers::regularization::list_my_regularizations,
        handlers::regularization::list_regularizations,
        handlers::regularization::get_regularization,
        handlers::regularization::approve_regularization,
        handlers::regularization::reject_regularization,

        // --- Configurações ---
        handlers::settings::get_settings,
        handlers::settings::update_settings,
    ),
    components(
        schemas(
            // --- Ponto ---
            models::attendance::AttendanceStatus,
            models::attendance::HalfDayType,
            models::attendance::AttendanceRecord,
            models::attendance::TodayAttendance,
            models::attendance::AttendanceSortField,
            models::attendance::CheckInRequest,
            models::attendance::CheckOutRequest,
            models::attendance::MarkAttendanceRequest,
            models::summary::MonthlySummary,
            SortOrder,

            // --- Regularização ---
            models::regularization::RegularizationStatus,
            models::regularization::RegularizationRequest,
            models::regularization::SubmitRegularizationRequest,
            models::regularization::RejectRegularizationRequest,

            // --- Configurações ---
            models::settings::AttendanceSettings,
            models::settings::SettingsResponse,
            models::settings::UpdateSettingsRequest,
        )
    ),
    tags(
        (name = "Attendance", description = "Ponto dos funcionários (entrada, saída e marcação do RH)"),
        (name = "Regularization", description = "Pedidos de correção de ponto e revisão do RH"),
        (name = "Attendance Settings", description = "Horário e tolerância por unidade")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
