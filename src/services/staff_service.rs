// src/services/staff_service.rs

use bcrypt::hash;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{DocumentStore, WriteBatch},
    db::{AccountRepository, MembershipRepository, ProfileRepository, RoleRepository},
    models::auth::{Account, GlobalRole, Profile},
    models::membership::{MembershipRecord, StaffRecord},
};

#[derive(Clone)]
pub struct StaffService {
    account_repo: AccountRepository,
    profile_repo: ProfileRepository,
    membership_repo: MembershipRepository,
    role_repo: RoleRepository,
    store: Arc<dyn DocumentStore>,
}

impl StaffService {
    pub fn new(
        account_repo: AccountRepository,
        profile_repo: ProfileRepository,
        membership_repo: MembershipRepository,
        role_repo: RoleRepository,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self { account_repo, profile_repo, membership_repo, role_repo, store }
    }

    pub async fn list_staff(&self, studio_id: Uuid) -> Result<Vec<StaffRecord>, AppError> {
        self.membership_repo.list_staff(studio_id).await
    }

    /// Convida uma pessoa para a equipe do estúdio. Conta, perfil e as duas
    /// representações de vínculo nascem num único lote: do ponto de vista de
    /// quem chama, tudo-ou-nada.
    pub async fn invite_staff(
        &self,
        studio_id: Uuid,
        email: &str,
        display_name: &str,
        password: &str,
        role_id: &str,
    ) -> Result<StaffRecord, AppError> {
        // O cargo precisa existir antes de qualquer escrita.
        self.role_repo.require(studio_id, role_id).await?;

        let mut batch = WriteBatch::new();

        // Reaproveita a identidade quando o e-mail já tem conta.
        let (user_id, display_name, photo_url) =
            match self.account_repo.find_by_email(email).await? {
                Some(account) => {
                    let mut profile = self
                        .profile_repo
                        .find(account.user_id)
                        .await?
                        .ok_or(AppError::InvalidAccount)?;
                    // Cliente convidado para uma equipe vira staff da
                    // plataforma, no mesmo lote.
                    if profile.global_role == GlobalRole::Customer {
                        profile.global_role = GlobalRole::Staff;
                        profile.updated_at = Utc::now();
                        batch.push(ProfileRepository::set_op(&profile)?);
                    }
                    (account.user_id, profile.display_name, profile.photo_url)
                }
                None => {
                    let password_clone = password.to_owned();
                    let hashed = tokio::task::spawn_blocking(move || {
                        hash(&password_clone, bcrypt::DEFAULT_COST)
                    })
                    .await
                    .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

                    let now = Utc::now();
                    let user_id = Uuid::new_v4();
                    let account = Account {
                        user_id,
                        email: email.to_owned(),
                        password_hash: hashed,
                        superadmin: false,
                        disabled: false,
                    };
                    let profile = Profile {
                        id: user_id,
                        email: email.to_owned(),
                        display_name: display_name.to_owned(),
                        photo_url: None,
                        global_role: GlobalRole::Staff,
                        created_at: now,
                        updated_at: now,
                    };
                    batch.push(AccountRepository::set_op(&account)?);
                    batch.push(ProfileRepository::set_op(&profile)?);
                    (user_id, profile.display_name, None)
                }
            };

        let membership = MembershipRecord {
            user_id,
            studio_id,
            role_id: role_id.to_owned(),
        };
        let staff_record = StaffRecord {
            user_id,
            display_name,
            email: email.to_owned(),
            photo_url,
            role_id: role_id.to_owned(),
        };
        batch.push(MembershipRepository::legacy_set_op(&membership)?);
        batch.push(MembershipRepository::staff_set_op(studio_id, &staff_record)?);

        self.store.commit(batch).await?;

        tracing::info!("👥 {} adicionado à equipe do estúdio {}", email, studio_id);
        Ok(staff_record)
    }

    /// Troca o cargo de um membro, mantendo as duas representações em acordo
    /// no mesmo lote. Exige vínculo explícito.
    pub async fn change_role(
        &self,
        studio_id: Uuid,
        user_id: Uuid,
        role_id: &str,
    ) -> Result<StaffRecord, AppError> {
        self.role_repo.require(studio_id, role_id).await?;

        let staff = self.membership_repo.find_staff(studio_id, user_id).await?;
        let legacy = self.membership_repo.find_legacy(user_id, studio_id).await?;
        if staff.is_none() && legacy.is_none() {
            return Err(AppError::NoMembership);
        }

        // Reconstrói o sub-registro a partir do perfil quando só o legado existe.
        let staff_record = match staff {
            Some(mut record) => {
                record.role_id = role_id.to_owned();
                record
            }
            None => {
                let profile = self.profile_repo.require(user_id).await?;
                StaffRecord {
                    user_id,
                    display_name: profile.display_name,
                    email: profile.email,
                    photo_url: profile.photo_url,
                    role_id: role_id.to_owned(),
                }
            }
        };
        let membership = MembershipRecord {
            user_id,
            studio_id,
            role_id: role_id.to_owned(),
        };

        let mut batch = WriteBatch::new();
        batch.push(MembershipRepository::legacy_set_op(&membership)?);
        batch.push(MembershipRepository::staff_set_op(studio_id, &staff_record)?);
        self.store.commit(batch).await?;

        Ok(staff_record)
    }

    /// Remove um membro da equipe: as duas representações saem no mesmo lote.
    pub async fn remove_staff(&self, studio_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        let staff = self.membership_repo.find_staff(studio_id, user_id).await?;
        let legacy = self.membership_repo.find_legacy(user_id, studio_id).await?;
        if staff.is_none() && legacy.is_none() {
            return Err(AppError::NoMembership);
        }

        let mut batch = WriteBatch::new();
        batch.push(MembershipRepository::legacy_delete_op(user_id, studio_id));
        batch.push(MembershipRepository::staff_delete_op(studio_id, user_id));
        self.store.commit(batch).await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::MemoryStore;
    use crate::models::rbac::StudioRole;

    async fn seeded(store: &Arc<MemoryStore>, studio_id: Uuid) -> StaffService {
        let role_repo = RoleRepository::new(store.clone());
        role_repo
            .save(
                studio_id,
                &StudioRole {
                    id: "recepcion".into(),
                    name: "Recepción".into(),
                    description: None,
                    permissions: vec!["appointments:view".into()],
                },
            )
            .await
            .unwrap();

        StaffService::new(
            AccountRepository::new(store.clone()),
            ProfileRepository::new(store.clone()),
            MembershipRepository::new(store.clone()),
            role_repo,
            store.clone(),
        )
    }

    #[tokio::test]
    async fn convite_cria_conta_perfil_e_os_dois_vinculos() {
        let store = Arc::new(MemoryStore::new());
        let studio_id = Uuid::new_v4();
        let svc = seeded(&store, studio_id).await;

        let record = svc
            .invite_staff(studio_id, "bia@estudio.example", "Bia", "secreta1", "recepcion")
            .await
            .unwrap();

        let account = AccountRepository::new(store.clone())
            .find_by_email("bia@estudio.example")
            .await
            .unwrap()
            .expect("conta criada");
        let profile = ProfileRepository::new(store.clone())
            .require(account.user_id)
            .await
            .unwrap();
        assert_eq!(profile.global_role, GlobalRole::Staff);

        let membership_repo = MembershipRepository::new(store);
        let legacy = membership_repo
            .find_legacy(record.user_id, studio_id)
            .await
            .unwrap()
            .expect("índice legado");
        let staff = membership_repo
            .find_staff(studio_id, record.user_id)
            .await
            .unwrap()
            .expect("sub-registro");
        assert_eq!(legacy.role_id, "recepcion");
        assert_eq!(staff.role_id, "recepcion");
    }

    #[tokio::test]
    async fn convite_com_cargo_inexistente_nao_grava_nada() {
        let store = Arc::new(MemoryStore::new());
        let studio_id = Uuid::new_v4();
        let svc = seeded(&store, studio_id).await;

        let err = svc
            .invite_staff(studio_id, "bia@estudio.example", "Bia", "secreta1", "fantasma")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RoleNotFound(_)));

        let account = AccountRepository::new(store)
            .find_by_email("bia@estudio.example")
            .await
            .unwrap();
        assert!(account.is_none());
    }

    #[tokio::test]
    async fn cliente_convidado_vira_staff_no_mesmo_lote() {
        let store = Arc::new(MemoryStore::new());
        let studio_id = Uuid::new_v4();
        let svc = seeded(&store, studio_id).await;

        // Conta e perfil de cliente pré-existentes.
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        AccountRepository::new(store.clone())
            .save(&Account {
                user_id,
                email: "caro@estudio.example".into(),
                password_hash: "$2b$04$hashfalsoapenasparateste".into(),
                superadmin: false,
                disabled: false,
            })
            .await
            .unwrap();
        ProfileRepository::new(store.clone())
            .save(&Profile {
                id: user_id,
                email: "caro@estudio.example".into(),
                display_name: "Caro".into(),
                photo_url: None,
                global_role: GlobalRole::Customer,
                created_at: now,
                updated_at: now,
            })
            .await
            .unwrap();

        let record = svc
            .invite_staff(studio_id, "caro@estudio.example", "Caro", "secreta1", "recepcion")
            .await
            .unwrap();
        assert_eq!(record.user_id, user_id);

        let profile = ProfileRepository::new(store).require(user_id).await.unwrap();
        assert_eq!(profile.global_role, GlobalRole::Staff);
    }

    #[tokio::test]
    async fn trocar_cargo_mantem_as_representacoes_em_acordo() {
        let store = Arc::new(MemoryStore::new());
        let studio_id = Uuid::new_v4();
        let svc = seeded(&store, studio_id).await;

        let record = svc
            .invite_staff(studio_id, "bia@estudio.example", "Bia", "secreta1", "recepcion")
            .await
            .unwrap();

        // Segundo cargo para a troca.
        RoleRepository::new(store.clone())
            .save(
                studio_id,
                &StudioRole {
                    id: "colorista".into(),
                    name: "Colorista".into(),
                    description: None,
                    permissions: vec!["appointments:view".into()],
                },
            )
            .await
            .unwrap();

        svc.change_role(studio_id, record.user_id, "colorista").await.unwrap();

        let membership_repo = MembershipRepository::new(store);
        let legacy = membership_repo.find_legacy(record.user_id, studio_id).await.unwrap().unwrap();
        let staff = membership_repo.find_staff(studio_id, record.user_id).await.unwrap().unwrap();
        assert_eq!(legacy.role_id, "colorista");
        assert_eq!(staff.role_id, "colorista");
    }

    #[tokio::test]
    async fn remocao_apaga_as_duas_representacoes() {
        let store = Arc::new(MemoryStore::new());
        let studio_id = Uuid::new_v4();
        let svc = seeded(&store, studio_id).await;

        let record = svc
            .invite_staff(studio_id, "bia@estudio.example", "Bia", "secreta1", "recepcion")
            .await
            .unwrap();

        svc.remove_staff(studio_id, record.user_id).await.unwrap();

        let membership_repo = MembershipRepository::new(store);
        assert!(membership_repo.find_legacy(record.user_id, studio_id).await.unwrap().is_none());
        assert!(membership_repo.find_staff(studio_id, record.user_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn operar_sobre_quem_nao_e_membro_da_no_membership() {
        let store = Arc::new(MemoryStore::new());
        let studio_id = Uuid::new_v4();
        let svc = seeded(&store, studio_id).await;

        let err = svc.remove_staff(studio_id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NoMembership));

        let err = svc
            .change_role(studio_id, Uuid::new_v4(), "recepcion")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoMembership));
    }
}
