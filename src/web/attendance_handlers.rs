// src/web/attendance_handlers.rs
use crate::{
    error::AppResult,
    models::{
        attendance::{MarkSource, ScanOutcome},
        navigation::Screen,
    },
    services::toast_service::Toast,
    state::AppState,
    web::json_error,
};
use axum::{
    extract::{Form, Json, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Deserialize, Debug)]
pub struct MarkForm {
    roll_no: String,
    present: bool,
}

#[derive(Deserialize, Debug)]
pub struct ScanRequest {
    code: String,
}

#[derive(Serialize, Debug)]
pub struct ScanResponse {
    #[serde(flatten)]
    outcome: ScanOutcome,
    message: String,
    toasts: Vec<Toast>,
}

#[derive(Serialize, Debug)]
pub struct ScannerResponse {
    running: bool,
    message: String,
    toasts: Vec<Toast>,
}

/// POST /attendance/mark - marcação manual (presente/falta)
pub async fn handle_mark(
    State(state): State<AppState>,
    Form(form): Form<MarkForm>,
) -> AppResult<Redirect> {
    let today = chrono::Local::now().date_naive();
    let mut tracker = state.tracker.lock().await;

    match tracker
        .mark_attendance(form.roll_no.trim(), form.present, MarkSource::Manual, today)
        .await
    {
        Ok(_) => {}
        Err(e) if e.is_user_facing() => {}
        Err(e) => return Err(e),
    }
    // Volta à grelha manual
    Ok(Redirect::to(&format!("{}#manual", Screen::MarkAttendance.path())))
}

/// POST /attendance/scan - texto descodificado pela câmara no browser
pub async fn handle_scan(
    State(state): State<AppState>,
    Json(request): Json<ScanRequest>,
) -> Response {
    let today = chrono::Local::now().date_naive();
    let mut tracker = state.tracker.lock().await;

    let result = tracker.scan(&request.code, Instant::now(), today).await;
    let toasts = tracker.take_toasts();
    match result {
        Ok(outcome) => {
            tracing::debug!("Leitura QR '{}': {:?}", request.code, outcome);
            Json(ScanResponse {
                message: outcome.message(),
                outcome,
                toasts,
            })
            .into_response()
        }
        Err(e) => json_error(e, toasts),
    }
}

/// POST /attendance/scanner/start
pub async fn handle_scanner_start(State(state): State<AppState>) -> Response {
    let mut tracker = state.tracker.lock().await;
    let result = tracker.start_scanner();
    let toasts = tracker.take_toasts();
    match result {
        Ok(()) => {
            tracing::info!("📷 Scanner iniciado.");
            Json(ScannerResponse {
                running: true,
                message: "Scanner started".to_string(),
                toasts,
            })
            .into_response()
        }
        Err(e) => json_error(e, toasts),
    }
}

/// POST /attendance/scanner/stop - idempotente
pub async fn handle_scanner_stop(State(state): State<AppState>) -> Json<ScannerResponse> {
    let mut tracker = state.tracker.lock().await;
    let was_running = tracker.stop_scanner();
    Json(ScannerResponse {
        running: false,
        message: if was_running {
            "Scanner stopped".to_string()
        } else {
            "Scanner already stopped".to_string()
        },
        toasts: Vec::new(),
    })
}
