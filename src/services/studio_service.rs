// src/services/studio_service.rs

use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{DocumentStore, WriteBatch},
    db::{MembershipRepository, ProfileRepository, StudioRepository},
    models::auth::{GlobalRole, Profile},
    models::membership::{MembershipRecord, StaffRecord},
    models::rbac::OWNER_ROLE_ID,
    models::studio::Studio,
    services::rbac_service::RbacService,
};

#[derive(Clone)]
pub struct StudioService {
    studio_repo: StudioRepository,
    membership_repo: MembershipRepository,
    profile_repo: ProfileRepository,
    store: Arc<dyn DocumentStore>,
}

impl StudioService {
    pub fn new(
        studio_repo: StudioRepository,
        membership_repo: MembershipRepository,
        profile_repo: ProfileRepository,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self { studio_repo, membership_repo, profile_repo, store }
    }

    /// Cria um novo estúdio e, atomicamente, provisiona o conjunto padrão de
    /// cargos e registra quem criou como dono — nas duas representações de
    /// vínculo, já em acordo.
    pub async fn create_studio_with_owner(
        &self,
        owner: &Profile,
        name: &str,
        slug: &str,
        address: Option<String>,
        description: Option<String>,
    ) -> Result<Studio, AppError> {
        if !crate::models::studio::is_valid_slug(slug) {
            let mut errors = validator::ValidationErrors::new();
            errors.add(
                "slug",
                validator::ValidationError::new("slug")
                    .with_message("O slug deve conter apenas letras minúsculas, dígitos e hífens.".into()),
            );
            return Err(AppError::ValidationError(errors));
        }

        if self.studio_repo.find_by_slug(slug).await?.is_some() {
            return Err(AppError::SlugAlreadyExists);
        }

        let now = Utc::now();
        let studio = Studio {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            slug: slug.to_owned(),
            owner_id: owner.id,
            address,
            description,
            created_at: now,
            updated_at: now,
        };

        let membership = MembershipRecord {
            user_id: owner.id,
            studio_id: studio.id,
            role_id: OWNER_ROLE_ID.to_string(),
        };
        let staff_record = StaffRecord {
            user_id: owner.id,
            display_name: owner.display_name.clone(),
            email: owner.email.clone(),
            photo_url: owner.photo_url.clone(),
            role_id: OWNER_ROLE_ID.to_string(),
        };

        let mut batch = WriteBatch::new();
        batch.push(StudioRepository::set_op(&studio)?);
        for op in RbacService::default_role_ops(studio.id)? {
            batch.push(op);
        }
        batch.push(MembershipRepository::legacy_set_op(&membership)?);
        batch.push(MembershipRepository::staff_set_op(studio.id, &staff_record)?);

        // Um cliente que cria um estúdio passa a ser dono da plataforma.
        if owner.global_role == GlobalRole::Customer {
            let mut promoted = owner.clone();
            promoted.global_role = GlobalRole::Owner;
            promoted.updated_at = now;
            batch.push(ProfileRepository::set_op(&promoted)?);
        }

        self.store.commit(batch).await?;

        tracing::info!("🏪 Estúdio {} criado ({})", studio.slug, studio.id);
        Ok(studio)
    }

    pub async fn find(&self, studio_id: Uuid) -> Result<Studio, AppError> {
        self.studio_repo.require(studio_id).await
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Studio, AppError> {
        self.studio_repo
            .find_by_slug(slug)
            .await?
            .ok_or(AppError::StudioNotFound)
    }

    /// Os estúdios do usuário, pelo índice plano. superAdmin enxerga todos.
    pub async fn list_user_studios(&self, user: &Profile) -> Result<Vec<Studio>, AppError> {
        if user.global_role == GlobalRole::SuperAdmin {
            return self.studio_repo.list_all().await;
        }
        let memberships = self.membership_repo.list_for_user(user.id).await?;
        let ids: Vec<Uuid> = memberships.iter().map(|m| m.studio_id).collect();
        self.studio_repo.find_many(&ids).await
    }

    /// Transfere a posse. Só troca o ownerId; os registros históricos de
    /// vínculo não são alterados.
    pub async fn transfer_ownership(
        &self,
        studio_id: Uuid,
        new_owner_id: Uuid,
    ) -> Result<Studio, AppError> {
        let mut studio = self.studio_repo.require(studio_id).await?;
        self.profile_repo.require(new_owner_id).await?;

        studio.owner_id = new_owner_id;
        studio.updated_at = Utc::now();
        self.studio_repo.save(&studio).await?;

        tracing::info!("🔑 Posse do estúdio {} transferida para {}", studio.slug, new_owner_id);
        Ok(studio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::MemoryStore;
    use crate::db::RoleRepository;

    fn service(store: Arc<MemoryStore>) -> StudioService {
        StudioService::new(
            StudioRepository::new(store.clone()),
            MembershipRepository::new(store.clone()),
            ProfileRepository::new(store.clone()),
            store,
        )
    }

    fn owner_profile() -> Profile {
        let now = Utc::now();
        Profile {
            id: Uuid::new_v4(),
            email: "dueno@estudio.example".into(),
            display_name: "Dueño".into(),
            photo_url: None,
            global_role: GlobalRole::Owner,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn criacao_provisiona_cargos_e_vinculos_juntos() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let owner = owner_profile();

        let studio = svc
            .create_studio_with_owner(&owner, "Estudio Luna", "estudio-luna", None, None)
            .await
            .unwrap();

        // Cargo owner provisionado.
        let role_repo = RoleRepository::new(store.clone());
        let owner_role = role_repo.find(studio.id, OWNER_ROLE_ID).await.unwrap();
        assert!(owner_role.is_some());

        // As duas representações de vínculo, em acordo.
        let membership_repo = MembershipRepository::new(store);
        let legacy = membership_repo.find_legacy(owner.id, studio.id).await.unwrap().unwrap();
        let staff = membership_repo.find_staff(studio.id, owner.id).await.unwrap().unwrap();
        assert_eq!(legacy.role_id, OWNER_ROLE_ID);
        assert_eq!(staff.role_id, OWNER_ROLE_ID);
        assert_eq!(staff.email, owner.email);
    }

    #[tokio::test]
    async fn slug_duplicado_e_rejeitado() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store);
        let owner = owner_profile();

        svc.create_studio_with_owner(&owner, "Luna", "luna", None, None).await.unwrap();
        let err = svc
            .create_studio_with_owner(&owner, "Luna 2", "luna", None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::SlugAlreadyExists));
    }

    #[tokio::test]
    async fn cliente_que_cria_estudio_vira_dono() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let mut creator = owner_profile();
        creator.global_role = GlobalRole::Customer;
        // O perfil precisa existir para ser promovido.
        ProfileRepository::new(store.clone()).save(&creator).await.unwrap();

        svc.create_studio_with_owner(&creator, "Luna", "luna", None, None).await.unwrap();

        let reloaded = ProfileRepository::new(store).require(creator.id).await.unwrap();
        assert_eq!(reloaded.global_role, GlobalRole::Owner);
    }

    #[tokio::test]
    async fn transferencia_so_troca_o_owner_id() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let owner = owner_profile();
        let studio = svc
            .create_studio_with_owner(&owner, "Luna", "luna", None, None)
            .await
            .unwrap();

        let new_owner = owner_profile();
        ProfileRepository::new(store.clone()).save(&new_owner).await.unwrap();

        let updated = svc.transfer_ownership(studio.id, new_owner.id).await.unwrap();
        assert_eq!(updated.owner_id, new_owner.id);

        // O histórico de vínculos permanece como estava.
        let membership_repo = MembershipRepository::new(store);
        let legacy = membership_repo.find_legacy(owner.id, studio.id).await.unwrap();
        assert!(legacy.is_some());
        let new_owner_legacy = membership_repo.find_legacy(new_owner.id, studio.id).await.unwrap();
        assert!(new_owner_legacy.is_none());
    }
}
