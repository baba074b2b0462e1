// src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, patch, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::common::error::AppError;
use crate::config::AppState;
use crate::middleware::auth::auth_middleware;
use crate::models::auth::GlobalRole;

#[tokio::main]
async fn main() {
    // Inicializa o logger.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    bootstrap_superadmin(&app_state).await;

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas do usuário autenticado
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/me/studios", get(handlers::auth::get_my_studios))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    // Rotas do estúdio: criação, posse, cargos e equipe.
    // O estúdio alvo chega pelo cabeçalho X-Studio-Id; cada rota privilegiada
    // declara sua permissão e o motor decide.
    let studio_routes = Router::new()
        .route("/", post(handlers::studio::create_studio))
        .route("/ownership", post(handlers::studio::transfer_ownership))
        .route(
            "/roles",
            get(handlers::rbac::list_roles).put(handlers::rbac::upsert_role),
        )
        .route("/roles/{role_id}", delete(handlers::rbac::delete_role))
        .route(
            "/staff",
            get(handlers::staff::list_staff).post(handlers::staff::invite_staff),
        )
        .route(
            "/staff/{user_id}",
            patch(handlers::staff::change_role).delete(handlers::staff::remove_staff),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ))
        // Página pública de reservas: sem autenticação.
        .route("/by-slug/{slug}", get(handlers::studio::get_studio_by_slug));

    // Console da plataforma (somente superAdmin)
    let admin_routes = Router::new()
        .route(
            "/users",
            get(handlers::admin::list_users).post(handlers::admin::create_user),
        )
        .route(
            "/users/{user_id}",
            patch(handlers::admin::update_user).delete(handlers::admin::delete_user),
        )
        .route("/users/{user_id}/disable", post(handlers::admin::disable_user))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/permissions", get(handlers::rbac::list_permissions))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/studios", studio_routes)
        .nest("/api/admin", admin_routes)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}

// Cria o superAdmin inicial quando as variáveis de bootstrap existem.
// Idempotente: e-mail já registrado é silenciosamente ignorado.
async fn bootstrap_superadmin(app_state: &AppState) {
    let (Ok(email), Ok(password)) = (
        std::env::var("BOOTSTRAP_ADMIN_EMAIL"),
        std::env::var("BOOTSTRAP_ADMIN_PASSWORD"),
    ) else {
        return;
    };

    match app_state
        .admin_service
        .create_user(&email, &password, "Super Admin", GlobalRole::SuperAdmin)
        .await
    {
        Ok(_) => tracing::info!("👑 Superadmin inicial criado: {}", email),
        Err(AppError::EmailAlreadyExists) => {}
        Err(e) => tracing::error!("🔥 Falha ao criar o superadmin inicial: {}", e),
    }
}
