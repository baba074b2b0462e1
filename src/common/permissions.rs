// src/common/permissions.rs

use crate::common::error::AppError;
use crate::models::auth::GlobalRole;
use std::collections::HashSet;

// ---
// O Catálogo de Permissões
// ---
// Tabela estática de duas camadas: grupos -> permissões folha, mais algumas
// folhas avulsas. Carregado uma vez e imutável durante toda a vida do processo.
// Todo slug referenciado em qualquer checagem (UI ou servidor) precisa existir aqui.

#[derive(Debug, Clone, Copy)]
pub struct PermissionEntry {
    pub id: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct PermissionGroup {
    pub label: &'static str,
    pub permissions: &'static [PermissionEntry],
}

pub static GROUPS: &[PermissionGroup] = &[
    PermissionGroup {
        label: "Agenda",
        permissions: &[
            PermissionEntry { id: "appointments:view", label: "Ver agenda" },
            PermissionEntry { id: "appointments:manage", label: "Gestionar citas" },
        ],
    },
    PermissionGroup {
        label: "Gestión",
        permissions: &[
            PermissionEntry { id: "services:view", label: "Ver servicios" },
            PermissionEntry { id: "services:manage", label: "Gestionar servicios" },
            PermissionEntry { id: "staff:view", label: "Ver equipo" },
            PermissionEntry { id: "staff:manage", label: "Gestionar equipo" },
            PermissionEntry { id: "clients:view", label: "Ver clientes" },
            PermissionEntry { id: "clients:manage", label: "Gestionar clientes" },
            PermissionEntry { id: "reports:view", label: "Ver reportes" },
        ],
    },
    PermissionGroup {
        label: "Configuración",
        permissions: &[
            PermissionEntry { id: "settings:view", label: "Ver configuración" },
            PermissionEntry { id: "settings:manage", label: "Gestionar configuración" },
            PermissionEntry { id: "settings:manage-roles", label: "Gestionar roles y permisos" },
            PermissionEntry { id: "studio:manage", label: "Gestionar datos del estudio" },
        ],
    },
];

// Folhas avulsas (sem grupo): autoatendimento do cliente e console da plataforma.
pub static STANDALONE: &[PermissionEntry] = &[
    PermissionEntry { id: "booking:create", label: "Reservar citas" },
    PermissionEntry { id: "booking:manage-own", label: "Gestionar mis reservas" },
    PermissionEntry { id: "profile:manage-own", label: "Gestionar mi perfil" },
    PermissionEntry { id: "admin:manage-users", label: "Administrar usuarios de la plataforma" },
    PermissionEntry { id: "admin:manage-studios", label: "Administrar estudios de la plataforma" },
];

/// Todos os slugs do catálogo, achatando os grupos em profundidade,
/// em ordem estável.
pub fn list_all() -> Vec<&'static str> {
    GROUPS
        .iter()
        .flat_map(|g| g.permissions.iter())
        .chain(STANDALONE.iter())
        .map(|p| p.id)
        .collect()
}

/// Rótulo de exibição de um slug.
pub fn label_of(id: &str) -> Result<&'static str, AppError> {
    GROUPS
        .iter()
        .flat_map(|g| g.permissions.iter())
        .chain(STANDALONE.iter())
        .find(|p| p.id == id)
        .map(|p| p.label)
        .ok_or_else(|| AppError::UnknownPermission(id.to_string()))
}

pub fn contains(id: &str) -> bool {
    label_of(id).is_ok()
}

// ---
// Conjuntos padrão por GlobalRole
// ---
// superAdmin recebe o catálogo inteiro, sem enumeração; os demais recebem
// subconjuntos explícitos do arquétipo.

const OWNER_DEFAULTS: &[&str] = &[
    "appointments:view",
    "appointments:manage",
    "services:view",
    "services:manage",
    "staff:view",
    "staff:manage",
    "clients:view",
    "clients:manage",
    "reports:view",
    "settings:view",
    "settings:manage",
    "settings:manage-roles",
    "studio:manage",
];

const STAFF_DEFAULTS: &[&str] = &[
    "appointments:view",
    "appointments:manage",
    "services:view",
    "staff:view",
    "clients:view",
    "clients:manage",
];

const CUSTOMER_DEFAULTS: &[&str] = &[
    "booking:create",
    "booking:manage-own",
    "profile:manage-own",
];

pub fn default_permissions_for(role: GlobalRole) -> HashSet<String> {
    let slugs: Vec<&str> = match role {
        GlobalRole::SuperAdmin => list_all(),
        GlobalRole::Owner => OWNER_DEFAULTS.to_vec(),
        GlobalRole::Staff => STAFF_DEFAULTS.to_vec(),
        GlobalRole::Customer => CUSTOMER_DEFAULTS.to_vec(),
    };
    slugs.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogo_sem_slugs_duplicados() {
        let all = list_all();
        let unique: HashSet<_> = all.iter().collect();
        assert_eq!(all.len(), unique.len());
    }

    #[test]
    fn slugs_seguem_o_formato_area_acao() {
        for id in list_all() {
            let mut parts = id.splitn(2, ':');
            let area = parts.next().unwrap();
            let action = parts.next().expect("slug sem ':'");
            assert!(!area.is_empty() && !action.is_empty(), "slug malformado: {id}");
        }
    }

    #[test]
    fn label_of_resolve_todos_e_rejeita_desconhecido() {
        for id in list_all() {
            assert!(label_of(id).is_ok());
        }
        assert!(matches!(
            label_of("not:a:real:permission"),
            Err(AppError::UnknownPermission(_))
        ));
    }

    #[test]
    fn ordem_do_catalogo_e_estavel() {
        assert_eq!(list_all(), list_all());
        assert_eq!(list_all().first(), Some(&"appointments:view"));
    }

    #[test]
    fn padroes_estao_contidos_no_catalogo() {
        for role in [GlobalRole::Owner, GlobalRole::Staff, GlobalRole::Customer] {
            for id in default_permissions_for(role) {
                assert!(contains(&id), "{id} fora do catálogo para {role:?}");
            }
        }
    }

    #[test]
    fn superadmin_recebe_o_catalogo_inteiro() {
        let all: HashSet<String> = list_all().into_iter().map(String::from).collect();
        assert_eq!(default_permissions_for(GlobalRole::SuperAdmin), all);
    }

    #[test]
    fn cliente_so_tem_autoatendimento() {
        let defaults = default_permissions_for(GlobalRole::Customer);
        assert!(defaults.contains("booking:create"));
        assert!(!defaults.contains("services:manage"));
        assert!(!defaults.contains("admin:manage-users"));
    }
}
