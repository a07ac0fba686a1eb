// src/web/api_handlers.rs
use crate::{
    models::student::Student,
    services::{
        toast_service::Toast,
        view_service::{self, AbsenteeRow, ChartPeriod, ChartSeries, TodaySummary},
    },
    state::AppState,
    web::json_error,
};
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Default)]
pub struct StudentsQuery {
    q: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ChartsQuery {
    #[serde(default)]
    period: ChartPeriod,
}

#[derive(Serialize, Debug)]
pub struct ChartsResponse {
    today: TodaySummary,
    comparison: ChartSeries,
}

/// GET /api/students - roster completo (ou filtrado com `?q=`)
pub async fn list_students(
    State(state): State<AppState>,
    Query(params): Query<StudentsQuery>,
) -> Json<Vec<Student>> {
    let tracker = state.tracker.lock().await;
    let needle = params.q.map(|q| q.trim().to_lowercase()).unwrap_or_default();
    let students = tracker
        .students()
        .iter()
        .filter(|s| needle.is_empty() || view_service::matches_filter(s, &needle))
        .cloned()
        .collect();
    Json(students)
}

/// GET /api/students/{roll}
pub async fn get_student(State(state): State<AppState>, Path(roll_no): Path<String>) -> Response {
    let tracker = state.tracker.lock().await;
    match tracker.find(&roll_no) {
        Ok(student) => Json(student.clone()).into_response(),
        Err(e) => json_error(e, Vec::new()),
    }
}

/// GET /api/absentees
pub async fn list_absentees(State(state): State<AppState>) -> Json<Vec<AbsenteeRow>> {
    let tracker = state.tracker.lock().await;
    Json(view_service::absentees(
        tracker.students(),
        tracker.absent_streak_threshold(),
    ))
}

/// GET /api/charts?period=today|weekly|monthly
pub async fn charts(
    State(state): State<AppState>,
    Query(params): Query<ChartsQuery>,
) -> Json<ChartsResponse> {
    let tracker = state.tracker.lock().await;
    let today = chrono::Local::now().date_naive();
    Json(ChartsResponse {
        today: view_service::today_summary(tracker.students()),
        comparison: view_service::comparison_series(
            params.period,
            tracker.students(),
            tracker.history(),
            today,
        ),
    })
}

/// GET /api/toasts - entrega (e consome) os toasts pendentes
pub async fn take_toasts(State(state): State<AppState>) -> Json<Vec<Toast>> {
    Json(state.tracker.lock().await.take_toasts())
}
