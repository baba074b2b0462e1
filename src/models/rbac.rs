// src/models/rbac.rs

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashSet;
use utoipa::ToSchema;
use validator::Validate;

// O cargo com este id existe em todo estúdio e não pode ser apagado.
pub const OWNER_ROLE_ID: &str = "owner";

// ---
// StudioRole (Cargo por estúdio)
// ---
// Documento `studios/{studioId}/roles/{roleId}`. O id é um slug estável
// ("owner") ou gerado. `permissions` é um subconjunto do catálogo.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudioRole {
    #[schema(example = "owner")]
    pub id: String,

    #[schema(example = "Propietario")]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[schema(example = json!(["services:manage", "staff:manage"]))]
    pub permissions: Vec<String>,
}

impl StudioRole {
    /// O conjunto de permissões do cargo (igualdade independente de ordem).
    pub fn permission_set(&self) -> HashSet<String> {
        self.permissions.iter().cloned().collect()
    }
}

// ---
// EffectiveRole (O resultado do motor de permissões)
// ---
// O papel autoritativo de um (usuário, estúdio). Estrutura fechada:
// `permissions` é sempre um conjunto, nunca um registro aberto.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveRole {
    pub id: String,
    pub name: String,
    pub permissions: HashSet<String>,
}

// ---
// Payloads e respostas
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertRolePayload {
    // Ausente na criação: o serviço gera um id.
    #[schema(example = "recepcion")]
    pub id: Option<String>,

    #[validate(length(min = 1, message = "O nome do cargo é obrigatório."))]
    #[schema(example = "Recepción")]
    pub name: String,

    pub description: Option<String>,

    #[schema(example = json!(["appointments:view", "appointments:manage"]))]
    pub permissions: Vec<String>,
}

// Catálogo agrupado, para a tela de edição de cargos.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[schema(example = "services:manage")]
    pub id: String,
    #[schema(example = "Gestionar servicios")]
    pub label: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogGroup {
    #[schema(example = "Gestión")]
    pub label: String,
    pub permissions: Vec<CatalogEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogResponse {
    pub groups: Vec<CatalogGroup>,
    pub standalone: Vec<CatalogEntry>,
}
