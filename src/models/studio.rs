// src/models/studio.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// Studio (O "Estabelecimento")
// ---
// Documento `studios/{studioId}`. Exatamente um ownerId por vez; a
// transferência de posse é operação privilegiada e não altera o histórico
// de vínculos.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Studio {
    pub id: Uuid,

    #[schema(example = "Estudio Luna")]
    pub name: String,

    // Único e seguro para URL.
    #[schema(example = "estudio-luna")]
    pub slug: String,

    pub owner_id: Uuid,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStudioPayload {
    #[validate(length(min = 1, message = "O nome do estúdio é obrigatório."))]
    pub name: String,

    // Formato verificado por `is_valid_slug` na criação.
    #[validate(length(min = 1, max = 64, message = "O slug é obrigatório."))]
    pub slug: String,

    pub address: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransferOwnershipPayload {
    pub new_owner_id: Uuid,
}

/// Slug: minúsculas, dígitos e hífens, sem hífen nas pontas.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 64
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
