// src/web/student_handlers.rs
use crate::{
    error::AppResult,
    models::{navigation::Screen, student::NewStudent},
    services::qr_service,
    state::AppState,
};
use axum::{
    extract::{Form, Path, Query, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct ImportForm {
    #[serde(default)]
    csv: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct QrQuery {
    size: Option<u32>,
    #[serde(default)]
    download: bool,
}

/// POST /students - guarda um aluno e mostra o cartão com o QR.
/// Erros de validação/duplicado ficam na fila de toasts.
pub async fn handle_add_student(
    State(state): State<AppState>,
    Form(form): Form<NewStudent>,
) -> AppResult<Redirect> {
    tracing::info!("Tentativa de criar aluno: {}", form.roll_no.trim());
    let mut tracker = state.tracker.lock().await;

    match tracker.add_student(form).await {
        Ok(student) => Ok(Redirect::to(&format!(
            "{}?saved={}",
            Screen::AddStudent.path(),
            urlencoding::encode(&student.roll_no)
        ))),
        Err(e) if e.is_user_facing() => Ok(Redirect::to(&Screen::AddStudent.path())),
        Err(e) => Err(e),
    }
}

/// POST /students/import - texto CSV vindo do formulário
pub async fn handle_import(
    State(state): State<AppState>,
    Form(form): Form<ImportForm>,
) -> AppResult<Redirect> {
    let mut tracker = state.tracker.lock().await;
    if form.csv.trim().is_empty() {
        tracker.toast("Select a CSV file");
        return Ok(Redirect::to(&Screen::AddStudent.path()));
    }

    match tracker.import_csv(&form.csv).await {
        Ok(_) => Ok(Redirect::to(&Screen::AllStudents.path())),
        Err(e) if e.is_user_facing() => Ok(Redirect::to(&Screen::AddStudent.path())),
        Err(e) => Err(e),
    }
}

/// POST /students/{roll}/delete - número desconhecido não é erro
pub async fn handle_delete_student(
    State(state): State<AppState>,
    Path(roll_no): Path<String>,
) -> AppResult<Redirect> {
    let mut tracker = state.tracker.lock().await;
    match tracker.delete_student(&roll_no).await {
        Ok(_) => Ok(Redirect::to(&Screen::AllStudents.path())),
        Err(e) if e.is_user_facing() => Ok(Redirect::to(&Screen::AllStudents.path())),
        Err(e) => Err(e),
    }
}

/// GET /students/{roll}/qr.png - `?download=true` pede o ficheiro `QR_<roll>.png`
pub async fn handle_qr_png(
    State(state): State<AppState>,
    Path(roll_no): Path<String>,
    Query(params): Query<QrQuery>,
) -> AppResult<Response> {
    // Só geramos QR para alunos registados
    state.tracker.lock().await.find(&roll_no)?;

    let size = params.size.unwrap_or(qr_service::PREVIEW_SIZE);
    let png = qr_service::render_qr_png(&roll_no, size)?;

    let mut response = ([(header::CONTENT_TYPE, "image/png")], png).into_response();
    if params.download {
        let disposition = format!(
            "attachment; filename=\"{}\"",
            qr_service::qr_file_name(&roll_no).replace('"', "_")
        );
        let value = HeaderValue::from_str(&disposition)
            .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
        response.headers_mut().insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

/// POST /absentees/{roll}/alert - aviso simulado ao encarregado
pub async fn handle_alert_parent(
    State(state): State<AppState>,
    Path(roll_no): Path<String>,
) -> AppResult<Redirect> {
    let mut tracker = state.tracker.lock().await;
    match tracker.alert_parent(&roll_no) {
        Ok(_) => Ok(Redirect::to(&Screen::AbsentStudents.path())),
        Err(e) if e.is_user_facing() => Ok(Redirect::to(&Screen::AbsentStudents.path())),
        Err(e) => Err(e),
    }
}
