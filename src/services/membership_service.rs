// src/services/membership_service.rs

use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::MembershipRepository;
use crate::models::auth::{GlobalRole, Profile};
use crate::models::membership::{
    MembershipSource, ResolvedMembership, CUSTOMER_ROLE_ID, DEFAULT_OWNER_ROLE_ID,
    DEFAULT_STAFF_ROLE_ID, SUPER_ADMIN_ROLE_ID,
};

// ---
// O Resolvedor de Vínculos
// ---
// Reconcilia as duas representações históricas (índice plano legado e
// sub-registro de equipe) em exatamente um (roleId, origem) por
// (usuário, estúdio). Somente leitura; no máximo duas consultas por chamada.
#[derive(Clone)]
pub struct MembershipResolver {
    membership_repo: MembershipRepository,
}

impl MembershipResolver {
    pub fn new(membership_repo: MembershipRepository) -> Self {
        Self { membership_repo }
    }

    /// Resolução canônica, na ordem de precedência (cada passo encerra):
    ///   1. superAdmin: papel virtual, sem consulta ao armazenamento.
    ///   2. customer: padrão global de cliente, sem consulta por estúdio.
    ///   3. sub-registro de equipe `studios/{id}/staff/{userId}`.
    ///   4. índice plano legado `memberships/{userId}_{studioId}`.
    ///   5. owner/staff sem registro explícito (bootstrap): padrão do
    ///      GlobalRole sob id sintético, em vez de negar acesso.
    ///
    /// Quando os passos 3 e 4 têm roleIds divergentes, o sub-registro de
    /// equipe vence: é a representação mais nova e o passo 3 encerra antes
    /// da consulta legada.
    ///
    /// Falha do armazenamento propaga como `StorageUnavailable`, nunca é
    /// tratada como ausência de vínculo.
    pub async fn resolve(
        &self,
        profile: &Profile,
        studio_id: Uuid,
    ) -> Result<ResolvedMembership, AppError> {
        match profile.global_role {
            GlobalRole::SuperAdmin => Ok(ResolvedMembership {
                role_id: SUPER_ADMIN_ROLE_ID.to_string(),
                source: MembershipSource::Virtual,
            }),
            GlobalRole::Customer => Ok(ResolvedMembership {
                role_id: CUSTOMER_ROLE_ID.to_string(),
                source: MembershipSource::Virtual,
            }),
            GlobalRole::Owner | GlobalRole::Staff => {
                if let Some(staff) = self.membership_repo.find_staff(studio_id, profile.id).await? {
                    return Ok(ResolvedMembership {
                        role_id: staff.role_id,
                        source: MembershipSource::StaffRecord,
                    });
                }

                if let Some(legacy) =
                    self.membership_repo.find_legacy(profile.id, studio_id).await?
                {
                    return Ok(ResolvedMembership {
                        role_id: legacy.role_id,
                        source: MembershipSource::LegacyMembership,
                    });
                }

                let role_id = match profile.global_role {
                    GlobalRole::Owner => DEFAULT_OWNER_ROLE_ID,
                    _ => DEFAULT_STAFF_ROLE_ID,
                };
                Ok(ResolvedMembership {
                    role_id: role_id.to_string(),
                    source: MembershipSource::GlobalDefault,
                })
            }
        }
    }

    /// Consulta crua, sem o fallback de GlobalRole: `NoMembership` quando
    /// nenhuma das duas representações existe. Usada pelas operações que
    /// exigem um vínculo explícito (troca de cargo, remoção de equipe) e
    /// pela UI para exibir o estado de acesso restrito.
    pub async fn lookup(
        &self,
        user_id: Uuid,
        studio_id: Uuid,
    ) -> Result<ResolvedMembership, AppError> {
        if let Some(staff) = self.membership_repo.find_staff(studio_id, user_id).await? {
            return Ok(ResolvedMembership {
                role_id: staff.role_id,
                source: MembershipSource::StaffRecord,
            });
        }

        if let Some(legacy) = self.membership_repo.find_legacy(user_id, studio_id).await? {
            return Ok(ResolvedMembership {
                role_id: legacy.role_id,
                source: MembershipSource::LegacyMembership,
            });
        }

        Err(AppError::NoMembership)
    }
}
