// src/services/admin_service.rs

use bcrypt::hash;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{DocumentStore, WriteBatch},
    db::{AccountRepository, MembershipRepository, ProfileRepository},
    models::auth::{Account, GlobalRole, Profile},
};

// Operações privilegiadas do console da plataforma. Todas exigem um token de
// superAdmin verificado; a checagem acontece na borda HTTP, pelo mesmo motor
// de permissões de sempre.
#[derive(Clone)]
pub struct AdminService {
    account_repo: AccountRepository,
    profile_repo: ProfileRepository,
    membership_repo: MembershipRepository,
    store: Arc<dyn DocumentStore>,
}

impl AdminService {
    pub fn new(
        account_repo: AccountRepository,
        profile_repo: ProfileRepository,
        membership_repo: MembershipRepository,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self { account_repo, profile_repo, membership_repo, store }
    }

    pub async fn list_users(&self) -> Result<Vec<Profile>, AppError> {
        self.profile_repo.list_all().await
    }

    /// Cria um usuário da plataforma com o GlobalRole dado. Conta e perfil
    /// nascem no mesmo lote; o claim `superadmin` acompanha o papel.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        global_role: GlobalRole,
    ) -> Result<Profile, AppError> {
        if self.account_repo.find_by_email(email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        let password_clone = password.to_owned();
        let hashed =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let account = Account {
            user_id,
            email: email.to_owned(),
            password_hash: hashed,
            superadmin: global_role == GlobalRole::SuperAdmin,
            disabled: false,
        };
        let profile = Profile {
            id: user_id,
            email: email.to_owned(),
            display_name: display_name.to_owned(),
            photo_url: None,
            global_role,
            created_at: now,
            updated_at: now,
        };

        let mut batch = WriteBatch::new();
        batch.push(AccountRepository::set_op(&account)?);
        batch.push(ProfileRepository::set_op(&profile)?);
        self.store.commit(batch).await?;

        tracing::info!("👤 Usuário {} criado como {}", email, global_role);
        Ok(profile)
    }

    /// Atualiza nome e/ou GlobalRole. Mudar o papel global é a única via de
    /// mutação do globalRole; o claim `superadmin` da conta é mantido em
    /// sincronia no mesmo lote.
    pub async fn update_user(
        &self,
        user_id: Uuid,
        display_name: Option<String>,
        global_role: Option<GlobalRole>,
    ) -> Result<Profile, AppError> {
        let mut profile = self.profile_repo.require(user_id).await?;
        let mut account = self
            .account_repo
            .find(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if let Some(name) = display_name {
            profile.display_name = name;
        }
        if let Some(role) = global_role {
            profile.global_role = role;
            account.superadmin = role == GlobalRole::SuperAdmin;
        }
        profile.updated_at = Utc::now();

        let mut batch = WriteBatch::new();
        batch.push(ProfileRepository::set_op(&profile)?);
        batch.push(AccountRepository::set_op(&account)?);
        self.store.commit(batch).await?;

        Ok(profile)
    }

    pub async fn disable_user(&self, user_id: Uuid) -> Result<(), AppError> {
        let mut account = self
            .account_repo
            .find(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;
        account.disabled = true;
        self.account_repo.save(&account).await
    }

    /// Remove o usuário e seus registros dependentes (conta, perfil e todos
    /// os vínculos, nas duas representações) num único lote.
    pub async fn delete_user(&self, user_id: Uuid) -> Result<(), AppError> {
        self.profile_repo.require(user_id).await?;
        let memberships = self.membership_repo.list_for_user(user_id).await?;

        let mut batch = WriteBatch::new();
        batch.push(AccountRepository::delete_op(user_id));
        batch.push(ProfileRepository::delete_op(user_id));
        for m in &memberships {
            batch.push(MembershipRepository::legacy_delete_op(user_id, m.studio_id));
            batch.push(MembershipRepository::staff_delete_op(m.studio_id, user_id));
        }
        self.store.commit(batch).await?;

        tracing::info!("🗑️ Usuário {} removido com {} vínculos", user_id, memberships.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::{DocumentStore, MemoryStore};
    use crate::models::membership::{MembershipRecord, StaffRecord};

    fn service(store: Arc<MemoryStore>) -> AdminService {
        AdminService::new(
            AccountRepository::new(store.clone()),
            ProfileRepository::new(store.clone()),
            MembershipRepository::new(store.clone()),
            store,
        )
    }

    #[tokio::test]
    async fn criar_superadmin_marca_o_claim() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());

        let profile = svc
            .create_user("root@plataforma.example", "secreta1", "Root", GlobalRole::SuperAdmin)
            .await
            .unwrap();

        let account = AccountRepository::new(store).find(profile.id).await.unwrap().unwrap();
        assert!(account.superadmin);
    }

    #[tokio::test]
    async fn mudar_o_papel_sincroniza_o_claim() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let profile = svc
            .create_user("ana@estudio.example", "secreta1", "Ana", GlobalRole::Staff)
            .await
            .unwrap();

        svc.update_user(profile.id, None, Some(GlobalRole::SuperAdmin)).await.unwrap();
        let account = AccountRepository::new(store.clone()).find(profile.id).await.unwrap().unwrap();
        assert!(account.superadmin);

        svc.update_user(profile.id, None, Some(GlobalRole::Owner)).await.unwrap();
        let account = AccountRepository::new(store).find(profile.id).await.unwrap().unwrap();
        assert!(!account.superadmin);
    }

    #[tokio::test]
    async fn remocao_leva_junto_os_vinculos() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let profile = svc
            .create_user("bia@estudio.example", "secreta1", "Bia", GlobalRole::Staff)
            .await
            .unwrap();

        let studio_id = Uuid::new_v4();
        let membership_repo = MembershipRepository::new(store.clone());
        let mut batch = WriteBatch::new();
        batch.push(
            MembershipRepository::legacy_set_op(&MembershipRecord {
                user_id: profile.id,
                studio_id,
                role_id: "staff".into(),
            })
            .unwrap(),
        );
        batch.push(
            MembershipRepository::staff_set_op(
                studio_id,
                &StaffRecord {
                    user_id: profile.id,
                    display_name: "Bia".into(),
                    email: "bia@estudio.example".into(),
                    photo_url: None,
                    role_id: "staff".into(),
                },
            )
            .unwrap(),
        );
        store.commit(batch).await.unwrap();

        svc.delete_user(profile.id).await.unwrap();

        assert!(ProfileRepository::new(store.clone()).find(profile.id).await.unwrap().is_none());
        assert!(AccountRepository::new(store).find(profile.id).await.unwrap().is_none());
        assert!(membership_repo.find_legacy(profile.id, studio_id).await.unwrap().is_none());
        assert!(membership_repo.find_staff(studio_id, profile.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn conta_desativada_continua_existindo() {
        let store = Arc::new(MemoryStore::new());
        let svc = service(store.clone());
        let profile = svc
            .create_user("ana@estudio.example", "secreta1", "Ana", GlobalRole::Owner)
            .await
            .unwrap();

        svc.disable_user(profile.id).await.unwrap();
        let account = AccountRepository::new(store).find(profile.id).await.unwrap().unwrap();
        assert!(account.disabled);
    }
}
