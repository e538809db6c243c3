// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::{config::AppState, docs::ApiDoc, handlers, middleware::auth::auth_guard};

pub fn router(app_state: AppState) -> Router {
    // Ponto: autoatendimento + RH
    let attendance_routes = Router::new()
        .route("/check-in", post(handlers::attendance::check_in))
        .route("/check-out", post(handlers::attendance::check_out))
        .route("/today", get(handlers::attendance::get_today))
        .route("/me", get(handlers::attendance::list_my_attendance))
        .route("/me/summary", get(handlers::attendance::get_my_summary))
        .route("/mark", post(handlers::attendance::mark_attendance))
        // Aninhado: "/" responde em /api/attendance
        .route("/", get(handlers::attendance::list_attendance))
        .route("/{id}", get(handlers::attendance::get_attendance))
        .route("/staff/{staff_id}/summary", get(handlers::attendance::get_staff_summary))
        // Regularização
        .route(
            "/regularizations",
            post(handlers::regularization::submit_regularization)
                .get(handlers::regularization::list_regularizations),
        )
        .route("/regularizations/me", get(handlers::regularization::list_my_regularizations))
        .route("/regularizations/{id}", get(handlers::regularization::get_regularization))
        .route(
            "/regularizations/{id}/approve",
            post(handlers::regularization::approve_regularization),
        )
        .route(
            "/regularizations/{id}/reject",
            post(handlers::regularization::reject_regularization),
        )
        // Configurações
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/attendance", attendance_routes)
        .with_state(app_state)
}
