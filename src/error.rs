//! Errores visibles por el cliente HTTP.
//!
//! Los fallos de sub-operaciones (variaciones, hashtags) y de entrega de
//! notificaciones nunca llegan aquí: se absorben donde ocurren.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("Petición inválida: {0}")]
    ValidationFailed(String),

    #[error("Error al generar con el modelo: {0:#}")]
    GenerationFailed(anyhow::Error),

    #[error("El servicio de IA no está configurado (falta la credencial del proveedor LLM)")]
    LlmUnavailable,

    #[error("Error de almacenamiento: {0:#}")]
    Storage(anyhow::Error),
}

impl ServiceError {
    pub fn business_not_found(business_id: &str) -> Self {
        Self::NotFound(format!("Negocio no encontrado: {business_id}"))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::LlmUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::GenerationFailed(_) | Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Un cuerpo que no se puede leer como JSON válido es un error de validación.
impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::ValidationFailed(rejection.body_text())
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("{}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn maps_each_variant_to_its_status() {
        assert_eq!(
            ServiceError::business_not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::ValidationFailed("topic".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::GenerationFailed(anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ServiceError::LlmUnavailable.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn generation_failure_message_carries_the_cause() {
        let err = ServiceError::GenerationFailed(anyhow!("respuesta no es JSON"));
        assert!(err.to_string().contains("respuesta no es JSON"));
    }
}
