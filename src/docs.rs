// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::get_my_studios,

        // --- Studios ---
        handlers::studio::create_studio,
        handlers::studio::get_studio_by_slug,
        handlers::studio::transfer_ownership,

        // --- RBAC ---
        handlers::rbac::list_permissions,
        handlers::rbac::list_roles,
        handlers::rbac::upsert_role,
        handlers::rbac::delete_role,

        // --- Staff ---
        handlers::staff::list_staff,
        handlers::staff::invite_staff,
        handlers::staff::change_role,
        handlers::staff::remove_staff,

        // --- Admin ---
        handlers::admin::list_users,
        handlers::admin::create_user,
        handlers::admin::update_user,
        handlers::admin::disable_user,
        handlers::admin::delete_user,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::GlobalRole,
            models::auth::Profile,
            models::auth::RegisterPayload,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Studios ---
            models::studio::Studio,
            models::studio::CreateStudioPayload,
            models::studio::TransferOwnershipPayload,

            // --- RBAC ---
            models::rbac::StudioRole,
            models::rbac::EffectiveRole,
            models::rbac::UpsertRolePayload,
            models::rbac::CatalogEntry,
            models::rbac::CatalogGroup,
            models::rbac::CatalogResponse,

            // --- Staff ---
            models::membership::StaffRecord,
            handlers::staff::InviteStaffPayload,
            handlers::staff::ChangeRolePayload,

            // --- Admin ---
            handlers::admin::CreateUserPayload,
            handlers::admin::UpdateUserPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Studios", description = "Gestão de Estúdios"),
        (name = "RBAC", description = "Controle de Acesso (Cargos e Permissões)"),
        (name = "Staff", description = "Gestão da Equipe do Estúdio"),
        (name = "Admin", description = "Console da Plataforma (superAdmin)")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
