// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use std::marker::PhantomData;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::studio::StudioContext,
    models::auth::Profile,
};

/// 1. O Trait que define o que é uma Permissão exigida pela rota
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// 2. O Extractor (Guardião)
// Toda rota privilegiada passa por aqui, e daqui pelo motor de permissões:
// o bypass de superAdmin mora no `can`, nunca na rota.
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // A. Extrai o perfil autenticado
        let profile = parts.extensions.get::<Profile>().cloned().ok_or(ApiError {
            status: StatusCode::UNAUTHORIZED,
            error: "Usuário não autenticado".into(),
            details: None,
        })?;

        // B. Extrai o estúdio alvo
        let studio = StudioContext::from_request_parts(parts, state).await?;

        // C. A permissão exigida pela rota
        let required_perm = T::slug();

        // D. Decide pelo motor
        let allowed = app_state
            .authz_service
            .check(&profile, studio.0, required_perm)
            .await
            .map_err(|_| ApiError {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: "Falha ao verificar permissões".into(),
                details: None,
            })?;

        if !allowed {
            return Err(ApiError {
                status: StatusCode::FORBIDDEN,
                error: format!(
                    "Você precisa da permissão '{}' para realizar esta ação.",
                    required_perm
                ),
                details: None,
            });
        }

        Ok(RequirePermission(PhantomData))
    }
}

/// Guardião das rotas da plataforma (sem estúdio alvo): decide pelo motor
/// com papel efetivo ausente, ou seja, pelos padrões do GlobalRole.
/// Só o superAdmin carrega as permissões `admin:*`.
pub struct RequireGlobalPermission<T>(pub PhantomData<T>);

impl<T, S> FromRequestParts<S> for RequireGlobalPermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let profile = parts.extensions.get::<Profile>().cloned().ok_or(ApiError {
            status: StatusCode::UNAUTHORIZED,
            error: "Usuário não autenticado".into(),
            details: None,
        })?;

        let required_perm = T::slug();
        if !crate::services::authz_service::can(Some(&profile), None, required_perm) {
            return Err(ApiError {
                status: StatusCode::FORBIDDEN,
                error: format!(
                    "Você precisa da permissão '{}' para realizar esta ação.",
                    required_perm
                ),
                details: None,
            });
        }

        Ok(RequireGlobalPermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

pub struct PermStaffView;
impl PermissionDef for PermStaffView {
    fn slug() -> &'static str { "staff:view" }
}

pub struct PermStaffManage;
impl PermissionDef for PermStaffManage {
    fn slug() -> &'static str { "staff:manage" }
}

pub struct PermManageRoles;
impl PermissionDef for PermManageRoles {
    fn slug() -> &'static str { "settings:manage-roles" }
}

pub struct PermSettingsView;
impl PermissionDef for PermSettingsView {
    fn slug() -> &'static str { "settings:view" }
}

pub struct PermStudioManage;
impl PermissionDef for PermStudioManage {
    fn slug() -> &'static str { "studio:manage" }
}

pub struct PermAdminUsers;
impl PermissionDef for PermAdminUsers {
    fn slug() -> &'static str { "admin:manage-users" }
}

pub struct PermAdminStudios;
impl PermissionDef for PermAdminStudios {
    fn slug() -> &'static str { "admin:manage-studios" }
}
