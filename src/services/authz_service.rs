// src/services/authz_service.rs

use uuid::Uuid;

use crate::common::error::AppError;
use crate::common::permissions;
use crate::db::RoleRepository;
use crate::models::auth::{GlobalRole, Profile};
use crate::models::membership::{MembershipSource, ResolvedMembership};
use crate::models::rbac::{EffectiveRole, StudioRole};
use crate::services::membership_service::MembershipResolver;

// ---
// O Motor de Permissões Efetivas
// ---
// A única autoridade de decisão de permissão, consumida tanto pela UI quanto
// pelas operações privilegiadas do servidor. O bypass de superAdmin mora
// aqui, e somente aqui.

// Nomes de exibição dos papéis sintéticos.
fn synthetic_role_name(role: GlobalRole) -> &'static str {
    match role {
        GlobalRole::SuperAdmin => "Super Admin",
        GlobalRole::Owner => "Propietario",
        GlobalRole::Staff => "Personal",
        GlobalRole::Customer => "Cliente",
    }
}

/// Combina perfil, vínculo resolvido e (quando houver) o documento do cargo
/// no papel autoritativo. Função pura: entradas iguais, saída igual.
///
/// Vínculo explícito cujo documento de cargo não existe (bootstrap) mantém o
/// roleId resolvido e cai para o conjunto padrão do GlobalRole.
pub fn build_effective_role(
    profile: &Profile,
    membership: &ResolvedMembership,
    role_doc: Option<&StudioRole>,
) -> EffectiveRole {
    match membership.source {
        MembershipSource::Virtual | MembershipSource::GlobalDefault => EffectiveRole {
            id: membership.role_id.clone(),
            name: synthetic_role_name(profile.global_role).to_string(),
            permissions: permissions::default_permissions_for(profile.global_role),
        },
        MembershipSource::StaffRecord | MembershipSource::LegacyMembership => match role_doc {
            Some(role) => EffectiveRole {
                id: role.id.clone(),
                name: role.name.clone(),
                permissions: role.permission_set(),
            },
            None => EffectiveRole {
                id: membership.role_id.clone(),
                name: synthetic_role_name(profile.global_role).to_string(),
                permissions: permissions::default_permissions_for(profile.global_role),
            },
        },
    }
}

// ---
// Consultas pontuais
// ---
// Nunca retornam erro: dado ausente degrada para negar. As exceções
// documentadas são o superAdmin (sempre permite) e o canAll vazio
// (verdade vazia, preservada deliberadamente).

/// `true` se o perfil pode executar a permissão dada.
pub fn can(profile: Option<&Profile>, effective: Option<&EffectiveRole>, permission: &str) -> bool {
    // Permissão fora do catálogo é erro de programação: alto em
    // desenvolvimento, negação silenciosa em produção.
    debug_assert!(
        permissions::contains(permission),
        "permissão fora do catálogo: {permission}"
    );

    let Some(profile) = profile else {
        return false;
    };

    match profile.global_role {
        GlobalRole::SuperAdmin => true,
        // Cliente usa o padrão global, independente do papel efetivo passado.
        GlobalRole::Customer => {
            permissions::default_permissions_for(GlobalRole::Customer).contains(permission)
        }
        _ => match effective {
            Some(role) => role.permissions.contains(permission),
            None => permissions::default_permissions_for(profile.global_role).contains(permission),
        },
    }
}

/// OU lógico sobre a lista; lista vazia nega.
pub fn can_any(
    profile: Option<&Profile>,
    effective: Option<&EffectiveRole>,
    permission_ids: &[&str],
) -> bool {
    permission_ids.iter().any(|id| can(profile, effective, id))
}

/// E lógico sobre a lista; lista vazia permite (verdade vazia — quem gateia
/// ação destrutiva precisa passar ao menos uma permissão).
pub fn can_all(
    profile: Option<&Profile>,
    effective: Option<&EffectiveRole>,
    permission_ids: &[&str],
) -> bool {
    permission_ids.iter().all(|id| can(profile, effective, id))
}

/// Açúcar: acesso de leitura a uma seção (`"{section}:view"`).
pub fn can_access(
    profile: Option<&Profile>,
    effective: Option<&EffectiveRole>,
    section: &str,
) -> bool {
    can(profile, effective, &format!("{section}:view"))
}

/// Açúcar: gestão de uma seção (`"{section}:manage"`).
pub fn can_manage(
    profile: Option<&Profile>,
    effective: Option<&EffectiveRole>,
    section: &str,
) -> bool {
    can(profile, effective, &format!("{section}:manage"))
}

// ---
// O serviço que liga resolvedor + cargos
// ---
#[derive(Clone)]
pub struct AuthzService {
    resolver: MembershipResolver,
    role_repo: RoleRepository,
}

impl AuthzService {
    pub fn new(resolver: MembershipResolver, role_repo: RoleRepository) -> Self {
        Self { resolver, role_repo }
    }

    pub fn resolver(&self) -> &MembershipResolver {
        &self.resolver
    }

    /// Resolve o papel autoritativo de (perfil, estúdio): vínculo canônico
    /// (§ resolvedor) + documento do cargo, quando a origem é um registro
    /// explícito. Papéis virtuais e padrões não tocam o armazenamento de
    /// cargos.
    pub async fn resolve_effective_role(
        &self,
        profile: &Profile,
        studio_id: Uuid,
    ) -> Result<EffectiveRole, AppError> {
        let membership = self.resolver.resolve(profile, studio_id).await?;

        let role_doc = match membership.source {
            MembershipSource::StaffRecord | MembershipSource::LegacyMembership => {
                self.role_repo.find(studio_id, &membership.role_id).await?
            }
            _ => None,
        };

        Ok(build_effective_role(profile, &membership, role_doc.as_ref()))
    }

    /// Checagem pontual no caminho do servidor: resolve e decide.
    pub async fn check(
        &self,
        profile: &Profile,
        studio_id: Uuid,
        permission: &str,
    ) -> Result<bool, AppError> {
        // superAdmin nem resolve: o choke point decide direto.
        if profile.global_role == GlobalRole::SuperAdmin {
            return Ok(true);
        }
        let effective = self.resolve_effective_role(profile, studio_id).await?;
        Ok(can(Some(profile), Some(&effective), permission))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::permissions::{default_permissions_for, list_all};
    use crate::models::membership::{DEFAULT_STAFF_ROLE_ID, SUPER_ADMIN_ROLE_ID};
    use chrono::Utc;
    use std::collections::HashSet;

    fn profile(role: GlobalRole) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            email: "p@estudio.example".into(),
            display_name: "P".into(),
            photo_url: None,
            global_role: role,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn role_with(perms: &[&str]) -> EffectiveRole {
        EffectiveRole {
            id: "recepcion".into(),
            name: "Recepción".into(),
            permissions: perms.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn superadmin_permite_todo_o_catalogo() {
        let p = profile(GlobalRole::SuperAdmin);
        let bogus = role_with(&[]);
        for id in list_all() {
            assert!(can(Some(&p), None, id));
            assert!(can(Some(&p), Some(&bogus), id));
        }
    }

    #[test]
    fn sem_perfil_nega_sempre() {
        let r = role_with(&["services:manage"]);
        assert!(!can(None, Some(&r), "services:manage"));
        assert!(!can_any(None, Some(&r), &["services:manage"]));
    }

    #[test]
    fn cliente_ignora_o_papel_efetivo_passado() {
        let p = profile(GlobalRole::Customer);
        let generous = role_with(&["services:manage", "booking:create"]);
        let defaults = default_permissions_for(GlobalRole::Customer);

        for id in list_all() {
            assert_eq!(can(Some(&p), Some(&generous), id), defaults.contains(id));
            assert_eq!(can(Some(&p), None, id), defaults.contains(id));
        }
    }

    #[test]
    fn staff_com_papel_efetivo_consulta_o_conjunto_do_papel() {
        let p = profile(GlobalRole::Staff);
        let r = role_with(&["appointments:view"]);
        assert!(can(Some(&p), Some(&r), "appointments:view"));
        assert!(!can(Some(&p), Some(&r), "services:manage"));
    }

    #[test]
    fn sem_papel_efetivo_cai_no_padrao_do_global_role() {
        // Fallback defensivo: nunca lança.
        let p = profile(GlobalRole::Owner);
        assert!(can(Some(&p), None, "staff:manage"));
        assert!(!can(Some(&p), None, "admin:manage-users"));
    }

    #[test]
    fn can_any_vazio_nega_e_can_all_vazio_permite() {
        let p = profile(GlobalRole::Staff);
        let r = role_with(&["appointments:view"]);
        assert!(!can_any(Some(&p), Some(&r), &[]));
        assert!(can_all(Some(&p), Some(&r), &[]));
        // Vale para qualquer combinação de entradas.
        assert!(!can_any(None, None, &[]));
        assert!(can_all(None, None, &[]));
    }

    #[test]
    fn can_any_e_can_all_compoem_can() {
        let p = profile(GlobalRole::Staff);
        let r = role_with(&["appointments:view", "clients:view"]);
        assert!(can_any(Some(&p), Some(&r), &["services:manage", "clients:view"]));
        assert!(!can_any(Some(&p), Some(&r), &["services:manage", "staff:manage"]));
        assert!(can_all(Some(&p), Some(&r), &["appointments:view", "clients:view"]));
        assert!(!can_all(Some(&p), Some(&r), &["appointments:view", "services:manage"]));
    }

    #[test]
    fn acucar_de_secao_usa_as_convencoes() {
        let p = profile(GlobalRole::Staff);
        let r = role_with(&["services:view", "services:manage"]);
        assert!(can_access(Some(&p), Some(&r), "services"));
        assert!(can_manage(Some(&p), Some(&r), "services"));
        assert!(!can_manage(Some(&p), Some(&r), "staff"));
    }

    #[test]
    fn build_effective_role_e_idempotente() {
        let p = profile(GlobalRole::Owner);
        let membership = ResolvedMembership {
            role_id: "owner".into(),
            source: MembershipSource::StaffRecord,
        };
        let doc = StudioRole {
            id: "owner".into(),
            name: "Propietario".into(),
            description: None,
            permissions: vec!["services:manage".into(), "staff:manage".into()],
        };
        let a = build_effective_role(&p, &membership, Some(&doc));
        let b = build_effective_role(&p, &membership, Some(&doc));
        assert_eq!(a, b);
    }

    #[test]
    fn superadmin_virtual_recebe_o_catalogo_inteiro() {
        let p = profile(GlobalRole::SuperAdmin);
        let membership = ResolvedMembership {
            role_id: SUPER_ADMIN_ROLE_ID.into(),
            source: MembershipSource::Virtual,
        };
        let role = build_effective_role(&p, &membership, None);
        let all: HashSet<String> = list_all().into_iter().map(String::from).collect();
        assert_eq!(role.permissions, all);
    }

    #[test]
    fn vinculo_explicito_sem_documento_de_cargo_cai_no_padrao() {
        // Cenário de bootstrap: membership "owner" existe, documento não.
        let p = profile(GlobalRole::Owner);
        let membership = ResolvedMembership {
            role_id: "owner".into(),
            source: MembershipSource::LegacyMembership,
        };
        let role = build_effective_role(&p, &membership, None);
        assert_eq!(role.id, "owner");
        assert_eq!(role.permissions, default_permissions_for(GlobalRole::Owner));
    }

    #[test]
    fn fallback_de_staff_usa_o_id_sintetico() {
        let p = profile(GlobalRole::Staff);
        let membership = ResolvedMembership {
            role_id: DEFAULT_STAFF_ROLE_ID.into(),
            source: MembershipSource::GlobalDefault,
        };
        let role = build_effective_role(&p, &membership, None);
        assert_eq!(role.id, DEFAULT_STAFF_ROLE_ID);
        assert_eq!(role.permissions, default_permissions_for(GlobalRole::Staff));
    }
}
