// src/services/session.rs

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::{MembershipRepository, StudioRepository};
use crate::models::auth::{GlobalRole, Profile};
use crate::models::membership::MembershipRecord;
use crate::models::rbac::EffectiveRole;
use crate::models::studio::Studio;
use crate::services::auth::AuthService;
use crate::services::authz_service::{self, AuthzService};

// ---
// O Gerente de Sessão
// ---
// O único estado mutável de vida longa do cliente: identidade atual, perfil,
// vínculos, estúdio selecionado e papel efetivo. Objeto explícito e
// injetável; os testes constroem sessões isoladas.
//
// Máquina de estados:
//   Unauthenticated -> Loading -> Authenticated/NoStudio
//   NoStudio <-> StudioSelected (set_current_studio)
//   qualquer estado -> Unauthenticated (sign_out, ou falha de carga)

// Persistência do "último estúdio selecionado" do superAdmin. Conveniência,
// não fronteira de segurança; a casca do cliente injeta a implementação real.
pub trait LastStudioStore: Send + Sync {
    fn load(&self, user_id: Uuid) -> Option<Uuid>;
    fn save(&self, user_id: Uuid, studio_id: Uuid);
    fn clear(&self, user_id: Uuid);
}

#[derive(Default)]
pub struct MemoryLastStudioStore {
    inner: std::sync::Mutex<HashMap<Uuid, Uuid>>,
}

impl MemoryLastStudioStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LastStudioStore for MemoryLastStudioStore {
    fn load(&self, user_id: Uuid) -> Option<Uuid> {
        self.inner.lock().ok()?.get(&user_id).copied()
    }

    fn save(&self, user_id: Uuid, studio_id: Uuid) {
        if let Ok(mut map) = self.inner.lock() {
            map.insert(user_id, studio_id);
        }
    }

    fn clear(&self, user_id: Uuid) {
        if let Ok(mut map) = self.inner.lock() {
            map.remove(&user_id);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    Loading,
    NoStudio,
    StudioSelected,
}

// Leitura coerente do estado num único acesso: nunca um par rasgado de
// estúdio novo com papel antigo.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub profile: Option<Profile>,
    pub memberships: Vec<MembershipRecord>,
    pub studio: Option<Studio>,
    pub effective_role: Option<EffectiveRole>,
}

enum SessionState {
    Unauthenticated,
    Loading,
    Authenticated {
        profile: Profile,
        memberships: Vec<MembershipRecord>,
        studio: Option<Studio>,
        effective_role: Option<EffectiveRole>,
    },
}

pub struct SessionManager {
    auth: AuthService,
    authz: AuthzService,
    membership_repo: MembershipRepository,
    studio_repo: StudioRepository,
    last_studio: Arc<dyn LastStudioStore>,
    load_timeout: Duration,
    state: RwLock<SessionState>,
    // Serializa sign-in e trocas de estúdio: nenhum leitor observa estado
    // parcial de uma troca em andamento.
    switch_lock: Mutex<()>,
}

impl SessionManager {
    pub fn new(
        auth: AuthService,
        authz: AuthzService,
        membership_repo: MembershipRepository,
        studio_repo: StudioRepository,
        last_studio: Arc<dyn LastStudioStore>,
        load_timeout: Duration,
    ) -> Self {
        Self {
            auth,
            authz,
            membership_repo,
            studio_repo,
            last_studio,
            load_timeout,
            state: RwLock::new(SessionState::Unauthenticated),
            switch_lock: Mutex::new(()),
        }
    }

    /// Autentica com o token e popula a sessão. Perfil e lista de vínculos
    /// carregam em conjunto; os dois precisam concluir antes de a sessão
    /// responder qualquer `can()`. Falha (inclusive `InvalidAccount` e
    /// estouro do tempo limite) força o retorno a Unauthenticated.
    pub async fn sign_in(&self, token: &str) -> Result<(), AppError> {
        let _guard = self.switch_lock.lock().await;

        *self.state.write().await = SessionState::Loading;

        let loaded = self.load_session(token).await;
        let (profile, memberships) = match loaded {
            Ok(ok) => ok,
            Err(e) => {
                *self.state.write().await = SessionState::Unauthenticated;
                return Err(e);
            }
        };

        let is_superadmin = profile.global_role == GlobalRole::SuperAdmin;
        let user_id = profile.id;

        *self.state.write().await = SessionState::Authenticated {
            profile,
            memberships,
            studio: None,
            effective_role: None,
        };

        // Conveniência do superAdmin: restaura o último estúdio selecionado.
        // Falha aqui não derruba o sign-in.
        if is_superadmin {
            if let Some(studio_id) = self.last_studio.load(user_id) {
                let _ = self.switch_locked(Some(studio_id)).await;
            }
        }

        Ok(())
    }

    async fn load_session(
        &self,
        token: &str,
    ) -> Result<(Profile, Vec<MembershipRecord>), AppError> {
        let claims = self.auth.decode_claims(token)?;

        let loads = async {
            tokio::try_join!(
                self.auth.load_profile_checked(claims.sub),
                self.membership_repo.list_for_user(claims.sub),
            )
        };

        // Carga que nunca resolve não pode travar a UI: tempo limite com
        // erro próprio, distinguível do estado de loading.
        tokio::time::timeout(self.load_timeout, loads)
            .await
            .map_err(|_| AppError::OperationTimedOut)?
    }

    /// Seleciona (ou limpa, com `None`) o estúdio atual, recomputando o
    /// papel efetivo. A operação inteira roda sob o lock de troca e só
    /// publica estúdio e papel juntos, numa única escrita.
    pub async fn set_current_studio(&self, studio_id: Option<Uuid>) -> Result<(), AppError> {
        let _guard = self.switch_lock.lock().await;
        self.switch_locked(studio_id).await
    }

    async fn switch_locked(&self, studio_id: Option<Uuid>) -> Result<(), AppError> {
        let profile = {
            let state = self.state.read().await;
            match &*state {
                SessionState::Authenticated { profile, .. } => profile.clone(),
                _ => return Err(AppError::InvalidToken),
            }
        };

        let Some(target) = studio_id else {
            let mut state = self.state.write().await;
            if let SessionState::Authenticated { studio, effective_role, .. } = &mut *state {
                *studio = None;
                *effective_role = None;
            }
            return Ok(());
        };

        let loads = async {
            tokio::try_join!(
                self.studio_repo.require(target),
                self.authz.resolve_effective_role(&profile, target),
            )
        };
        let (studio, role) = tokio::time::timeout(self.load_timeout, loads)
            .await
            .map_err(|_| AppError::OperationTimedOut)??;

        {
            let mut state = self.state.write().await;
            if let SessionState::Authenticated { studio: s, effective_role: r, .. } = &mut *state {
                *s = Some(studio);
                *r = Some(role);
            }
        }

        if profile.global_role == GlobalRole::SuperAdmin {
            self.last_studio.save(profile.id, target);
        }

        Ok(())
    }

    /// Reavalia o vínculo com o estúdio selecionado. Se o vínculo explícito
    /// de um owner/staff sumiu, a sessão volta para NoStudio; superAdmin e
    /// cliente não dependem de vínculo.
    pub async fn refresh_membership(&self) -> Result<(), AppError> {
        let _guard = self.switch_lock.lock().await;

        let (profile, studio_id) = {
            let state = self.state.read().await;
            match &*state {
                SessionState::Authenticated { profile, studio: Some(studio), .. } => {
                    (profile.clone(), studio.id)
                }
                _ => return Ok(()),
            }
        };

        if matches!(profile.global_role, GlobalRole::Owner | GlobalRole::Staff) {
            match self.authz.resolver().lookup(profile.id, studio_id).await {
                Ok(_) => {}
                Err(AppError::NoMembership) => {
                    let mut state = self.state.write().await;
                    if let SessionState::Authenticated { studio, effective_role, .. } = &mut *state
                    {
                        *studio = None;
                        *effective_role = None;
                    }
                    return Ok(());
                }
                Err(e) => return Err(e),
            }
        }

        self.switch_locked(Some(studio_id)).await
    }

    /// Encerra a sessão: limpa todos os campos e a conveniência persistida
    /// do último estúdio.
    pub async fn sign_out(&self) {
        let _guard = self.switch_lock.lock().await;
        let mut state = self.state.write().await;
        if let SessionState::Authenticated { profile, .. } = &*state {
            self.last_studio.clear(profile.id);
        }
        *state = SessionState::Unauthenticated;
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.read().await;
        match &*state {
            SessionState::Unauthenticated => SessionSnapshot {
                phase: SessionPhase::Unauthenticated,
                profile: None,
                memberships: Vec::new(),
                studio: None,
                effective_role: None,
            },
            SessionState::Loading => SessionSnapshot {
                phase: SessionPhase::Loading,
                profile: None,
                memberships: Vec::new(),
                studio: None,
                effective_role: None,
            },
            SessionState::Authenticated { profile, memberships, studio, effective_role } => {
                SessionSnapshot {
                    phase: if studio.is_some() {
                        SessionPhase::StudioSelected
                    } else {
                        SessionPhase::NoStudio
                    },
                    profile: Some(profile.clone()),
                    memberships: memberships.clone(),
                    studio: studio.clone(),
                    effective_role: effective_role.clone(),
                }
            }
        }
    }

    pub async fn phase(&self) -> SessionPhase {
        self.snapshot().await.phase
    }

    pub async fn current_profile(&self) -> Option<Profile> {
        self.snapshot().await.profile
    }

    pub async fn current_studio(&self) -> Option<Studio> {
        self.snapshot().await.studio
    }

    pub async fn effective_role(&self) -> Option<EffectiveRole> {
        self.snapshot().await.effective_role
    }

    /// Consulta pontual sobre o estado atual da sessão.
    pub async fn can(&self, permission: &str) -> bool {
        let snap = self.snapshot().await;
        authz_service::can(snap.profile.as_ref(), snap.effective_role.as_ref(), permission)
    }

    pub async fn can_any(&self, permission_ids: &[&str]) -> bool {
        let snap = self.snapshot().await;
        authz_service::can_any(snap.profile.as_ref(), snap.effective_role.as_ref(), permission_ids)
    }

    pub async fn can_all(&self, permission_ids: &[&str]) -> bool {
        let snap = self.snapshot().await;
        authz_service::can_all(snap.profile.as_ref(), snap.effective_role.as_ref(), permission_ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::permissions::{default_permissions_for, list_all};
    use crate::db::store::{DocumentStore, MemoryStore, StoreError, WriteBatch};
    use crate::db::{AccountRepository, ProfileRepository, RoleRepository};
    use crate::models::auth::Account;
    use crate::models::rbac::OWNER_ROLE_ID;
    use crate::services::membership_service::MembershipResolver;
    use crate::services::studio_service::StudioService;
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::Value;
    use std::collections::HashSet;

    struct Harness {
        store: Arc<MemoryStore>,
        auth: AuthService,
        session: Arc<SessionManager>,
        last_studio: Arc<MemoryLastStudioStore>,
    }

    fn harness_with_store(store: Arc<dyn DocumentStore>, mem: Arc<MemoryStore>) -> Harness {
        let auth = AuthService::new(
            AccountRepository::new(store.clone()),
            ProfileRepository::new(store.clone()),
            store.clone(),
            "segredo-de-teste".into(),
        );
        let authz = AuthzService::new(
            MembershipResolver::new(MembershipRepository::new(store.clone())),
            RoleRepository::new(store.clone()),
        );
        let last_studio = Arc::new(MemoryLastStudioStore::new());
        let session = Arc::new(SessionManager::new(
            auth.clone(),
            authz,
            MembershipRepository::new(store.clone()),
            StudioRepository::new(store.clone()),
            last_studio.clone(),
            Duration::from_millis(250),
        ));
        Harness { store: mem, auth, session, last_studio }
    }

    fn harness() -> Harness {
        let mem = Arc::new(MemoryStore::new());
        harness_with_store(mem.clone(), mem)
    }

    // Semeia conta + perfil direto no armazenamento e devolve um token válido.
    async fn seed_user(h: &Harness, role: GlobalRole) -> (Profile, String) {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let profile = Profile {
            id: user_id,
            email: format!("{user_id}@estudio.example"),
            display_name: "Teste".into(),
            photo_url: None,
            global_role: role,
            created_at: now,
            updated_at: now,
        };
        let account = Account {
            user_id,
            email: profile.email.clone(),
            password_hash: "$2b$04$hashfalsoapenasparateste".into(),
            superadmin: role == GlobalRole::SuperAdmin,
            disabled: false,
        };
        AccountRepository::new(h.store.clone()).save(&account).await.unwrap();
        ProfileRepository::new(h.store.clone()).save(&profile).await.unwrap();
        let token = h.auth.create_token(&profile, account.superadmin).unwrap();
        (profile, token)
    }

    fn studio_service(h: &Harness) -> StudioService {
        StudioService::new(
            StudioRepository::new(h.store.clone()),
            MembershipRepository::new(h.store.clone()),
            ProfileRepository::new(h.store.clone()),
            h.store.clone(),
        )
    }

    #[tokio::test]
    async fn sign_in_popula_a_sessao() {
        let h = harness();
        let (_profile, token) = seed_user(&h, GlobalRole::Owner).await;

        h.session.sign_in(&token).await.unwrap();

        let snap = h.session.snapshot().await;
        assert_eq!(snap.phase, SessionPhase::NoStudio);
        assert!(snap.profile.is_some());
        assert!(snap.studio.is_none());
    }

    #[tokio::test]
    async fn identidade_sem_perfil_forca_sign_out() {
        let h = harness();
        let (profile, token) = seed_user(&h, GlobalRole::Owner).await;
        h.store.delete(&ProfileRepository::path(profile.id)).await.unwrap();

        let err = h.session.sign_in(&token).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidAccount));
        assert_eq!(h.session.phase().await, SessionPhase::Unauthenticated);
    }

    #[tokio::test]
    async fn superadmin_seleciona_estudio_sem_vinculo_e_recebe_tudo() {
        let h = harness();
        let (_sa, token) = seed_user(&h, GlobalRole::SuperAdmin).await;
        let (owner, _) = seed_user(&h, GlobalRole::Owner).await;
        let studio = studio_service(&h)
            .create_studio_with_owner(&owner, "Luna", "luna", None, None)
            .await
            .unwrap();

        h.session.sign_in(&token).await.unwrap();
        h.session.set_current_studio(Some(studio.id)).await.unwrap();

        let role = h.session.effective_role().await.unwrap();
        let all: HashSet<String> = list_all().into_iter().map(String::from).collect();
        assert_eq!(role.permissions, all);
        assert_eq!(h.session.phase().await, SessionPhase::StudioSelected);
    }

    #[tokio::test]
    async fn owner_bootstrap_sem_documento_de_cargo_cai_no_padrao() {
        // Vínculo legado existe, documento do cargo não: o padrão do
        // GlobalRole responde, em vez de falhar.
        let h = harness();
        let (owner, token) = seed_user(&h, GlobalRole::Owner).await;
        let studio = studio_service(&h)
            .create_studio_with_owner(&owner, "Luna", "luna", None, None)
            .await
            .unwrap();
        h.store
            .delete(&RoleRepository::path(studio.id, OWNER_ROLE_ID))
            .await
            .unwrap();

        h.session.sign_in(&token).await.unwrap();
        h.session.set_current_studio(Some(studio.id)).await.unwrap();

        let role = h.session.effective_role().await.unwrap();
        assert_eq!(role.id, OWNER_ROLE_ID);
        assert_eq!(role.permissions, default_permissions_for(GlobalRole::Owner));
    }

    #[tokio::test]
    async fn cliente_responde_pelo_padrao_global_em_qualquer_estudio() {
        let h = harness();
        let (_c, token) = seed_user(&h, GlobalRole::Customer).await;
        let (owner, _) = seed_user(&h, GlobalRole::Owner).await;
        let studio = studio_service(&h)
            .create_studio_with_owner(&owner, "Luna", "luna", None, None)
            .await
            .unwrap();

        h.session.sign_in(&token).await.unwrap();
        h.session.set_current_studio(Some(studio.id)).await.unwrap();

        assert!(h.session.can("booking:create").await);
        assert!(!h.session.can("services:manage").await);
    }

    #[tokio::test]
    async fn trocas_sequenciais_refletem_o_ultimo_estudio() {
        let h = harness();
        let (owner, token) = seed_user(&h, GlobalRole::Owner).await;
        let svc = studio_service(&h);
        let a = svc.create_studio_with_owner(&owner, "A", "estudio-a", None, None).await.unwrap();
        let b = svc.create_studio_with_owner(&owner, "B", "estudio-b", None, None).await.unwrap();

        h.session.sign_in(&token).await.unwrap();
        h.session.set_current_studio(Some(a.id)).await.unwrap();
        h.session.set_current_studio(Some(b.id)).await.unwrap();

        let snap = h.session.snapshot().await;
        assert_eq!(snap.studio.unwrap().id, b.id);
        // O papel publicado acompanha o estúdio publicado.
        assert_eq!(snap.effective_role.unwrap().id, OWNER_ROLE_ID);
    }

    #[tokio::test]
    async fn trocas_concorrentes_nunca_publicam_par_rasgado() {
        let h = harness();
        let (owner, token) = seed_user(&h, GlobalRole::Owner).await;
        let svc = studio_service(&h);
        let a = svc.create_studio_with_owner(&owner, "A", "estudio-a", None, None).await.unwrap();
        let b = svc.create_studio_with_owner(&owner, "B", "estudio-b", None, None).await.unwrap();

        // Cargos distintos por estúdio para o par ficar detectável.
        let role_repo = RoleRepository::new(h.store.clone());
        let mut role_a = role_repo.require(a.id, OWNER_ROLE_ID).await.unwrap();
        role_a.name = "Dueño A".into();
        role_repo.save(a.id, &role_a).await.unwrap();
        let mut role_b = role_repo.require(b.id, OWNER_ROLE_ID).await.unwrap();
        role_b.name = "Dueño B".into();
        role_repo.save(b.id, &role_b).await.unwrap();

        h.session.sign_in(&token).await.unwrap();

        let s1 = h.session.clone();
        let s2 = h.session.clone();
        let t1 = tokio::spawn(async move { s1.set_current_studio(Some(a.id)).await });
        let t2 = tokio::spawn(async move { s2.set_current_studio(Some(b.id)).await });
        t1.await.unwrap().unwrap();
        t2.await.unwrap().unwrap();

        let snap = h.session.snapshot().await;
        let studio = snap.studio.unwrap();
        let role = snap.effective_role.unwrap();
        let expected = if studio.id == a.id { "Dueño A" } else { "Dueño B" };
        assert_eq!(role.name, expected);
    }

    #[tokio::test]
    async fn staff_removido_volta_para_no_studio_no_refresh() {
        let h = harness();
        let (owner, _) = seed_user(&h, GlobalRole::Owner).await;
        let (staff, token) = seed_user(&h, GlobalRole::Staff).await;
        let studio = studio_service(&h)
            .create_studio_with_owner(&owner, "Luna", "luna", None, None)
            .await
            .unwrap();

        // Vincula o staff nas duas representações.
        let mut batch = WriteBatch::new();
        batch.push(
            MembershipRepository::legacy_set_op(&crate::models::membership::MembershipRecord {
                user_id: staff.id,
                studio_id: studio.id,
                role_id: "staff".into(),
            })
            .unwrap(),
        );
        batch.push(
            MembershipRepository::staff_set_op(
                studio.id,
                &crate::models::membership::StaffRecord {
                    user_id: staff.id,
                    display_name: staff.display_name.clone(),
                    email: staff.email.clone(),
                    photo_url: None,
                    role_id: "staff".into(),
                },
            )
            .unwrap(),
        );
        h.store.commit(batch).await.unwrap();

        h.session.sign_in(&token).await.unwrap();
        h.session.set_current_studio(Some(studio.id)).await.unwrap();
        assert_eq!(h.session.phase().await, SessionPhase::StudioSelected);

        // O vínculo some (remoção pela gestão da equipe).
        let mut batch = WriteBatch::new();
        batch.push(MembershipRepository::legacy_delete_op(staff.id, studio.id));
        batch.push(MembershipRepository::staff_delete_op(studio.id, staff.id));
        h.store.commit(batch).await.unwrap();

        h.session.refresh_membership().await.unwrap();
        assert_eq!(h.session.phase().await, SessionPhase::NoStudio);
    }

    #[tokio::test]
    async fn sign_out_limpa_tudo_inclusive_o_ultimo_estudio() {
        let h = harness();
        let (sa, token) = seed_user(&h, GlobalRole::SuperAdmin).await;
        let (owner, _) = seed_user(&h, GlobalRole::Owner).await;
        let studio = studio_service(&h)
            .create_studio_with_owner(&owner, "Luna", "luna", None, None)
            .await
            .unwrap();

        h.session.sign_in(&token).await.unwrap();
        h.session.set_current_studio(Some(studio.id)).await.unwrap();
        assert_eq!(h.last_studio.load(sa.id), Some(studio.id));

        h.session.sign_out().await;
        assert_eq!(h.session.phase().await, SessionPhase::Unauthenticated);
        assert_eq!(h.last_studio.load(sa.id), None);
    }

    #[tokio::test]
    async fn superadmin_restaura_o_ultimo_estudio_no_sign_in() {
        let h = harness();
        let (_sa, token) = seed_user(&h, GlobalRole::SuperAdmin).await;
        let (owner, _) = seed_user(&h, GlobalRole::Owner).await;
        let studio = studio_service(&h)
            .create_studio_with_owner(&owner, "Luna", "luna", None, None)
            .await
            .unwrap();

        h.session.sign_in(&token).await.unwrap();
        h.session.set_current_studio(Some(studio.id)).await.unwrap();

        // Nova sessão do mesmo processo (sem sign-out): restaura.
        h.session.sign_in(&token).await.unwrap();
        assert_eq!(h.session.phase().await, SessionPhase::StudioSelected);
        assert_eq!(h.session.current_studio().await.unwrap().id, studio.id);
    }

    #[tokio::test]
    async fn carga_lenta_estoura_o_tempo_limite_sem_travar() {
        let mem = Arc::new(MemoryStore::new());
        let slow: Arc<dyn DocumentStore> = Arc::new(SlowStore { inner: mem.clone() });
        let h = harness_with_store(slow, mem);
        let (_owner, token) = seed_user(&h, GlobalRole::Owner).await;

        let err = h.session.sign_in(&token).await.unwrap_err();
        assert!(matches!(err, AppError::OperationTimedOut));
        // Estado de erro explícito, não "loading" para sempre.
        assert_eq!(h.session.phase().await, SessionPhase::Unauthenticated);
    }

    // Dublê que demora mais que o tempo limite da sessão.
    struct SlowStore {
        inner: Arc<MemoryStore>,
    }

    #[async_trait]
    impl DocumentStore for SlowStore {
        async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            self.inner.get(path).await
        }

        async fn set(&self, path: &str, doc: Value) -> Result<(), StoreError> {
            self.inner.set(path, doc).await
        }

        async fn delete(&self, path: &str) -> Result<(), StoreError> {
            self.inner.delete(path).await
        }

        async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            self.inner.list(collection).await
        }

        async fn query_eq(
            &self,
            collection: &str,
            field: &str,
            value: &Value,
        ) -> Result<Vec<Value>, StoreError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            self.inner.query_eq(collection, field, value).await
        }

        async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
            self.inner.commit(batch).await
        }
    }
}
