// src/handlers/admin.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermAdminUsers, RequireGlobalPermission},
    },
    models::auth::{GlobalRole, Profile},
};

// O console da plataforma: todas as rotas exigem um token de superAdmin
// verificado (o guardião global decide pelo motor, com os padrões do
// GlobalRole — só superAdmin carrega `admin:manage-users`).

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    #[validate(length(min = 1, message = "O nome de exibição é obrigatório."))]
    pub display_name: String,
    pub global_role: GlobalRole,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserPayload {
    pub display_name: Option<String>,
    pub global_role: Option<GlobalRole>,
}

// GET /api/admin/users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses((status = 200, body = [Profile]), (status = 403)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireGlobalPermission<PermAdminUsers>,
) -> Result<impl IntoResponse, ApiError> {
    let users = app_state
        .admin_service
        .list_users()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(users))
}

// POST /api/admin/users
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = CreateUserPayload,
    responses((status = 201, body = Profile), (status = 409), (status = 403)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn create_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireGlobalPermission<PermAdminUsers>,
    Json(payload): Json<CreateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    let profile = app_state
        .admin_service
        .create_user(
            &payload.email,
            &payload.password,
            &payload.display_name,
            payload.global_role,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(profile)))
}

// PATCH /api/admin/users/{user_id}
#[utoipa::path(
    patch,
    path = "/api/admin/users/{user_id}",
    params(("user_id" = Uuid, Path, description = "Id do usuário")),
    request_body = UpdateUserPayload,
    responses((status = 200, body = Profile), (status = 404), (status = 403)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireGlobalPermission<PermAdminUsers>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = app_state
        .admin_service
        .update_user(user_id, payload.display_name, payload.global_role)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(profile))
}

// POST /api/admin/users/{user_id}/disable
#[utoipa::path(
    post,
    path = "/api/admin/users/{user_id}/disable",
    params(("user_id" = Uuid, Path, description = "Id do usuário")),
    responses((status = 204), (status = 404), (status = 403)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn disable_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireGlobalPermission<PermAdminUsers>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .admin_service
        .disable_user(user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}

// DELETE /api/admin/users/{user_id}
#[utoipa::path(
    delete,
    path = "/api/admin/users/{user_id}",
    params(("user_id" = Uuid, Path, description = "Id do usuário")),
    responses((status = 204), (status = 404), (status = 403)),
    security(("api_jwt" = [])),
    tag = "Admin"
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequireGlobalPermission<PermAdminUsers>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .admin_service
        .delete_user(user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
