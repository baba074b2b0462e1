// src/handlers/auth.rs

use axum::{extract::State, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::{AuthResponse, LoginPayload, Profile, RegisterPayload},
    models::studio::Studio,
};

// Handler de registro (público: cria um perfil `customer`)
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterPayload,
    responses((status = 200, body = AuthResponse), (status = 409, description = "E-mail já em uso")),
    tag = "Auth"
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RegisterPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| crate::common::error::AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    let token = app_state
        .auth_service
        .register_customer(&payload.email, &payload.password, &payload.display_name)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(AuthResponse { token }))
}

// Handler de login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginPayload,
    responses((status = 200, body = AuthResponse), (status = 401, description = "Credenciais inválidas")),
    tag = "Auth"
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| crate::common::error::AppError::from(e).to_api_error(&locale, &app_state.i18n_store))?;

    let token = app_state
        .auth_service
        .login(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(AuthResponse { token }))
}

// Handler da rota protegida /me
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses((status = 200, body = Profile)),
    security(("api_jwt" = [])),
    tag = "Users"
)]
pub async fn get_me(AuthenticatedUser(profile): AuthenticatedUser) -> Json<Profile> {
    Json(profile)
}

// Os estúdios do usuário autenticado
#[utoipa::path(
    get,
    path = "/api/users/me/studios",
    responses((status = 200, body = [Studio])),
    security(("api_jwt" = [])),
    tag = "Users"
)]
pub async fn get_my_studios(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(profile): AuthenticatedUser,
) -> Result<impl IntoResponse, ApiError> {
    let studios = app_state
        .studio_service
        .list_user_studios(&profile)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(studios))
}
