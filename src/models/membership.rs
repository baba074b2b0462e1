// src/models/membership.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Ids sintéticos usados quando não há registro explícito de vínculo.
pub const SUPER_ADMIN_ROLE_ID: &str = "super-admin";
pub const DEFAULT_OWNER_ROLE_ID: &str = "default-owner";
pub const DEFAULT_STAFF_ROLE_ID: &str = "default-staff";
pub const CUSTOMER_ROLE_ID: &str = "customer";

// ---
// 1. MembershipRecord (O índice plano legado)
// ---
// Documento `memberships/{userId}_{studioId}`. Formato preservado
// campo a campo por compatibilidade com os dados existentes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembershipRecord {
    pub user_id: Uuid,
    pub studio_id: Uuid,
    pub role_id: String,
}

impl MembershipRecord {
    /// Id do documento no índice plano: `"{userId}_{studioId}"`.
    pub fn doc_id(user_id: Uuid, studio_id: Uuid) -> String {
        format!("{user_id}_{studio_id}")
    }
}

// ---
// 2. StaffRecord (O sub-registro novo, por estúdio)
// ---
// Documento `studios/{studioId}/staff/{userId}`, com os campos de perfil
// desnormalizados que a listagem de equipe exibe.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StaffRecord {
    pub user_id: Uuid,
    pub display_name: String,
    pub email: String,
    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub role_id: String,
}

// ---
// 3. ResolvedMembership (O fato canônico)
// ---
// Saída do resolvedor: exatamente um (roleId, origem) por (usuário, estúdio).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum MembershipSource {
    /// Sub-registro `studios/{id}/staff/{userId}` (vence quando os dois existem).
    StaffRecord,
    /// Índice plano legado `memberships/{userId}_{studioId}`.
    LegacyMembership,
    /// Sem registro explícito: padrão do GlobalRole (default-owner / default-staff).
    GlobalDefault,
    /// Papel virtual, sem consulta ao armazenamento (superAdmin, customer).
    Virtual,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedMembership {
    pub role_id: String,
    pub source: MembershipSource,
}
