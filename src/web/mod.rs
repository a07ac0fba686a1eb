// src/web/mod.rs
pub mod api_handlers;
pub mod attendance_handlers;
pub mod live_handlers;
pub mod routes;
pub mod screen_handlers;
pub mod student_handlers;

use crate::{
    error::{AppError, AppResult},
    services::toast_service::Toast,
};
use askama::Template;
use axum::{
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Renderiza um template Askama, registando a falha se houver.
pub fn render_page<T: Template>(template: &T, name: &str) -> AppResult<Response> {
    match template.render() {
        Ok(html) => Ok(Html(html).into_response()),
        Err(e) => {
            tracing::error!("Falha ao renderizar template {}: {}", name, e);
            Err(AppError::from(e))
        }
    }
}

/// Corpo JSON de erro para os endpoints chamados por fetch().
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub message: String,
    pub toasts: Vec<Toast>,
}

/// Erros de utilizador viram JSON com status adequado; os restantes seguem
/// para o `IntoResponse` de `AppError`.
pub fn json_error(error: AppError, toasts: Vec<Toast>) -> Response {
    if !error.is_user_facing() {
        return error.into_response();
    }
    let status = error.status();
    tracing::debug!("Resposta JSON de erro: {}", error);
    (
        status,
        Json(JsonError {
            message: error.user_message(),
            toasts,
        }),
    )
        .into_response()
}
