// src/web/routes.rs
use crate::{
    state::AppState,
    web::{api_handlers, attendance_handlers, live_handlers, screen_handlers, student_handlers},
};
use axum::{
    routing::{get, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // --- Ecrãs (HTML) ---
    let screen_routes = Router::new()
        .route("/", get(screen_handlers::landing_handler))
        .route("/screen/{id}", get(screen_handlers::screen_handler))
        .route("/back", get(screen_handlers::back_handler));

    // --- Gestão de alunos ---
    let student_routes = Router::new()
        .route("/", post(student_handlers::handle_add_student))
        .route("/import", post(student_handlers::handle_import))
        .route("/{roll}/delete", post(student_handlers::handle_delete_student))
        .route("/{roll}/qr.png", get(student_handlers::handle_qr_png));

    // --- Presenças (manual e QR) ---
    let attendance_routes = Router::new()
        .route("/mark", post(attendance_handlers::handle_mark))
        .route("/scan", post(attendance_handlers::handle_scan))
        .route("/scanner/start", post(attendance_handlers::handle_scanner_start))
        .route("/scanner/stop", post(attendance_handlers::handle_scanner_stop));

    // --- API JSON (só leitura) ---
    let api_routes = Router::new()
        .route("/students", get(api_handlers::list_students))
        .route("/students/{roll}", get(api_handlers::get_student))
        .route("/absentees", get(api_handlers::list_absentees))
        .route("/charts", get(api_handlers::charts))
        .route("/toasts", get(api_handlers::take_toasts));

    Router::new()
        .merge(screen_routes)
        .nest("/students", student_routes)
        .nest("/attendance", attendance_routes)
        .nest("/api", api_routes)
        .route(
            "/absentees/{roll}/alert",
            post(student_handlers::handle_alert_parent),
        )
        .route("/live", get(live_handlers::live_websocket_handler))
        .with_state(app_state)
}
