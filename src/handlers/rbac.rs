// src/handlers/rbac.rs

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
        i18n::Locale,
        rbac::{PermManageRoles, PermSettingsView, RequirePermission},
        studio::StudioContext,
    },
    models::rbac::{CatalogResponse, StudioRole, UpsertRolePayload},
};

// GET /api/permissions (o catálogo, para montar a tela de cargos)
#[utoipa::path(
    get,
    path = "/api/permissions",
    responses((status = 200, body = CatalogResponse)),
    tag = "RBAC"
)]
pub async fn list_permissions(State(app_state): State<AppState>) -> Json<CatalogResponse> {
    Json(app_state.rbac_service.catalog())
}

// GET /api/studios/roles
#[utoipa::path(
    get,
    path = "/api/studios/roles",
    responses((status = 200, body = [StudioRole])),
    security(("api_jwt" = [])),
    tag = "RBAC"
)]
pub async fn list_roles(
    State(app_state): State<AppState>,
    studio: StudioContext,
    locale: Locale,
    _guard: RequirePermission<PermSettingsView>,
) -> Result<impl IntoResponse, ApiError> {
    let roles = app_state
        .rbac_service
        .list_roles(studio.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(roles))
}

// PUT /api/studios/roles
#[utoipa::path(
    put,
    path = "/api/studios/roles",
    request_body = UpsertRolePayload,
    responses(
        (status = 201, body = StudioRole),
        (status = 409, description = "Cargo protegido"),
        (status = 422, description = "Permissões fora do catálogo")
    ),
    security(("api_jwt" = [])),
    tag = "RBAC"
)]
pub async fn upsert_role(
    State(app_state): State<AppState>,
    studio: StudioContext,
    locale: Locale,
    _guard: RequirePermission<PermManageRoles>,
    Json(payload): Json<UpsertRolePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    let role = app_state
        .rbac_service
        .upsert_role(studio.0, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(role)))
}

// DELETE /api/studios/roles/{role_id}
#[utoipa::path(
    delete,
    path = "/api/studios/roles/{role_id}",
    params(("role_id" = String, Path, description = "Id do cargo")),
    responses(
        (status = 204),
        (status = 409, description = "Cargo protegido"),
        (status = 404, description = "Cargo não encontrado")
    ),
    security(("api_jwt" = [])),
    tag = "RBAC"
)]
pub async fn delete_role(
    State(app_state): State<AppState>,
    studio: StudioContext,
    locale: Locale,
    _guard: RequirePermission<PermManageRoles>,
    Path(role_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .rbac_service
        .delete_role(studio.0, &role_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
