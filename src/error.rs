// src/error.rs
use crate::templates::ErrorPage;
use askama::Template;
use axum::{http::StatusCode, response::Html, response::IntoResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // --- Erros de domínio (viram toasts no handler que os provocou) ---
    /// Campo obrigatório em falta ou vazio.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Roll number already exists: {0}")]
    DuplicateIdentifier(String),

    #[error("Student not found: {0}")]
    NotFound(String),

    /// O armazenamento persistente recusou uma leitura ou escrita.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// O scanner não arrancou, ou chegou uma leitura com o scanner parado.
    #[error("Scanner unavailable: {0}")]
    DeviceUnavailable(String),

    // --- Erros de infraestrutura ---
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    SqlxMigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("QR encoding error: {0}")]
    QrEncoding(#[from] qrcode::types::QrError),

    #[error("Image encoding error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl AppError {
    /// Texto curto mostrado na fila de toasts quando uma ação do utilizador falha.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::DuplicateIdentifier(_) => "Roll number already exists".to_string(),
            AppError::NotFound(roll) => format!("Student not found: {}", roll),
            AppError::StorageUnavailable(_) => "Changes could not be saved".to_string(),
            AppError::DeviceUnavailable(_) => {
                "Camera start failed or no camera available".to_string()
            }
            _ => "An unexpected error occurred".to_string(),
        }
    }

    /// Erros que nascem de uma ação do utilizador e acabam num toast.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::DuplicateIdentifier(_)
                | AppError::NotFound(_)
                | AppError::StorageUnavailable(_)
                | AppError::DeviceUnavailable(_)
        )
    }

    pub(crate) fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateIdentifier(_) => StatusCode::CONFLICT,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DeviceUnavailable(_) | AppError::StorageUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Como converter AppError numa resposta HTTP
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.is_user_facing() {
            tracing::warn!("Request failed: {}", self);
        } else {
            tracing::error!("Request failed: {:?}", self);
        }

        let status = self.status();
        let page = ErrorPage {
            status_code: status.as_u16(),
            message: self.user_message(),
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!("Falha ao renderizar página de erro: {}", e);
                (status, page.message).into_response()
            }
        }
    }
}

// Tipo Result padrão para a aplicação
pub type AppResult<T = ()> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_toast_texts() {
        assert_eq!(
            AppError::DuplicateIdentifier("101".into()).user_message(),
            "Roll number already exists"
        );
        assert_eq!(
            AppError::NotFound("999".into()).user_message(),
            "Student not found: 999"
        );
        assert!(AppError::Validation("Please enter Name and Roll".into()).is_user_facing());
        assert!(!AppError::SessionError("boom".into()).is_user_facing());
    }

    #[tokio::test]
    async fn error_page_escapes_user_text() {
        let response = AppError::NotFound("<b>7</b>".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("Error 404"));
        assert!(!html.contains("<b>7</b>"));
        assert!(html.contains("href=\"/back\""));
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AppError::NotFound("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::DuplicateIdentifier("x".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::DeviceUnavailable("x".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
