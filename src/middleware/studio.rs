// src/middleware/studio.rs

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use uuid::Uuid;

use crate::common::error::ApiError;

// O cabeçalho que identifica o estúdio alvo da requisição.
const STUDIO_ID_HEADER: &str = "x-studio-id";

// Extrator do contexto de estúdio (o tenant da requisição).
#[derive(Debug, Clone, Copy)]
pub struct StudioContext(pub Uuid);

impl<S> FromRequestParts<S> for StudioContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header_value = parts.headers.get(STUDIO_ID_HEADER).ok_or(ApiError {
            status: StatusCode::BAD_REQUEST,
            error: "O cabeçalho X-Studio-Id é obrigatório.".to_string(),
            details: None,
        })?;

        let value_str = header_value.to_str().map_err(|_| ApiError {
            status: StatusCode::BAD_REQUEST,
            error: "Cabeçalho X-Studio-Id contém caracteres inválidos.".to_string(),
            details: None,
        })?;

        let studio_id = Uuid::parse_str(value_str).map_err(|_| ApiError {
            status: StatusCode::BAD_REQUEST,
            error: "Cabeçalho X-Studio-Id inválido (não é um UUID).".to_string(),
            details: None,
        })?;

        Ok(StudioContext(studio_id))
    }
}
