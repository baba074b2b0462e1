// src/config.rs

use std::{env, sync::Arc};

use crate::{
    common::i18n::I18nStore,
    db::store::{DocumentStore, MemoryStore},
    db::{
        AccountRepository, MembershipRepository, ProfileRepository, RoleRepository,
        StudioRepository,
    },
    services::{
        membership_service::MembershipResolver, AdminService, AuthService, AuthzService,
        RbacService, StaffService, StudioService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub authz_service: AuthzService,
    pub rbac_service: RbacService,
    pub studio_service: StudioService,
    pub staff_service: StaffService,
    pub admin_service: AdminService,
    pub i18n_store: I18nStore,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // O armazenamento de documentos por trás da fronteira de capacidade.
        // Em produção entra o cliente do provedor gerenciado; aqui, o
        // armazenamento em memória.
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        tracing::info!("✅ Armazenamento de documentos inicializado!");

        // --- Monta o gráfico de dependências ---
        let account_repo = AccountRepository::new(store.clone());
        let profile_repo = ProfileRepository::new(store.clone());
        let studio_repo = StudioRepository::new(store.clone());
        let role_repo = RoleRepository::new(store.clone());
        let membership_repo = MembershipRepository::new(store.clone());

        let auth_service = AuthService::new(
            account_repo.clone(),
            profile_repo.clone(),
            store.clone(),
            jwt_secret,
        );
        let authz_service = AuthzService::new(
            MembershipResolver::new(membership_repo.clone()),
            role_repo.clone(),
        );
        let rbac_service = RbacService::new(role_repo.clone());
        let studio_service = StudioService::new(
            studio_repo,
            membership_repo.clone(),
            profile_repo.clone(),
            store.clone(),
        );
        let staff_service = StaffService::new(
            account_repo.clone(),
            profile_repo.clone(),
            membership_repo.clone(),
            role_repo,
            store.clone(),
        );
        let admin_service = AdminService::new(account_repo, profile_repo, membership_repo, store);

        Ok(Self {
            auth_service,
            authz_service,
            rbac_service,
            studio_service,
            staff_service,
            admin_service,
            i18n_store: I18nStore::new(),
        })
    }
}
