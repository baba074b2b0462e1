// src/handlers/staff.rs

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
        rbac::{PermStaffManage, PermStaffView, RequirePermission},
        studio::StudioContext,
    },
    models::membership::StaffRecord,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InviteStaffPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 1, message = "O nome de exibição é obrigatório."))]
    pub display_name: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    #[validate(length(min = 1, message = "O cargo é obrigatório."))]
    pub role_id: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRolePayload {
    #[validate(length(min = 1, message = "O cargo é obrigatório."))]
    pub role_id: String,
}

// GET /api/studios/staff
#[utoipa::path(
    get,
    path = "/api/studios/staff",
    responses((status = 200, body = [StaffRecord])),
    security(("api_jwt" = [])),
    tag = "Staff"
)]
pub async fn list_staff(
    State(app_state): State<AppState>,
    studio: StudioContext,
    locale: Locale,
    _guard: RequirePermission<PermStaffView>,
) -> Result<impl IntoResponse, ApiError> {
    let staff = app_state
        .staff_service
        .list_staff(studio.0)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(staff))
}

// POST /api/studios/staff (cria conta + perfil + vínculos, tudo-ou-nada)
#[utoipa::path(
    post,
    path = "/api/studios/staff",
    request_body = InviteStaffPayload,
    responses((status = 201, body = StaffRecord), (status = 404, description = "Cargo inexistente")),
    security(("api_jwt" = [])),
    tag = "Staff"
)]
pub async fn invite_staff(
    State(app_state): State<AppState>,
    studio: StudioContext,
    locale: Locale,
    _guard: RequirePermission<PermStaffManage>,
    Json(payload): Json<InviteStaffPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    let record = app_state
        .staff_service
        .invite_staff(
            studio.0,
            &payload.email,
            &payload.display_name,
            &payload.password,
            &payload.role_id,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(record)))
}

// PATCH /api/studios/staff/{user_id}
#[utoipa::path(
    patch,
    path = "/api/studios/staff/{user_id}",
    params(("user_id" = Uuid, Path, description = "Id do membro")),
    request_body = ChangeRolePayload,
    responses((status = 200, body = StaffRecord), (status = 403, description = "Sem vínculo")),
    security(("api_jwt" = [])),
    tag = "Staff"
)]
pub async fn change_role(
    State(app_state): State<AppState>,
    studio: StudioContext,
    locale: Locale,
    _guard: RequirePermission<PermStaffManage>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<ChangeRolePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    let record = app_state
        .staff_service
        .change_role(studio.0, user_id, &payload.role_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(record))
}

// DELETE /api/studios/staff/{user_id}
#[utoipa::path(
    delete,
    path = "/api/studios/staff/{user_id}",
    params(("user_id" = Uuid, Path, description = "Id do membro")),
    responses((status = 204), (status = 403, description = "Sem vínculo")),
    security(("api_jwt" = [])),
    tag = "Staff"
)]
pub async fn remove_staff(
    State(app_state): State<AppState>,
    studio: StudioContext,
    locale: Locale,
    _guard: RequirePermission<PermStaffManage>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .staff_service
        .remove_staff(studio.0, user_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
