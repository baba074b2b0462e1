// src/handlers/studio.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermStudioManage, RequirePermission},
        studio::StudioContext,
    },
    models::studio::{CreateStudioPayload, Studio, TransferOwnershipPayload},
};

// POST /api/studios
#[utoipa::path(
    post,
    path = "/api/studios",
    request_body = CreateStudioPayload,
    responses((status = 201, body = Studio), (status = 409, description = "Slug já em uso")),
    security(("api_jwt" = [])),
    tag = "Studios"
)]
pub async fn create_studio(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
    Json(payload): Json<CreateStudioPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    let studio = app_state
        .studio_service
        .create_studio_with_owner(
            &profile,
            &payload.name,
            &payload.slug,
            payload.address,
            payload.description,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(studio)))
}

// GET /api/studios/by-slug/{slug} (página pública de reservas)
#[utoipa::path(
    get,
    path = "/api/studios/by-slug/{slug}",
    params(("slug" = String, Path, description = "Slug do estúdio")),
    responses((status = 200, body = Studio), (status = 404)),
    tag = "Studios"
)]
pub async fn get_studio_by_slug(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let studio = app_state
        .studio_service
        .find_by_slug(&slug)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(studio))
}

// POST /api/studios/ownership (transferência de posse)
#[utoipa::path(
    post,
    path = "/api/studios/ownership",
    request_body = TransferOwnershipPayload,
    responses((status = 200, body = Studio), (status = 404)),
    security(("api_jwt" = [])),
    tag = "Studios"
)]
pub async fn transfer_ownership(
    State(app_state): State<AppState>,
    studio: StudioContext,
    locale: Locale,
    _guard: RequirePermission<PermStudioManage>,
    Json(payload): Json<TransferOwnershipPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = app_state
        .studio_service
        .transfer_ownership(studio.0, payload.new_owner_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(updated))
}
