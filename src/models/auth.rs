// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// ---
// 1. GlobalRole (O arquétipo da plataforma)
// ---
// Conjunto fechado. Mutável apenas por operação privilegiada de superAdmin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum GlobalRole {
    SuperAdmin,
    Owner,
    Staff,
    Customer,
}

impl std::fmt::Display for GlobalRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SuperAdmin => write!(f, "superAdmin"),
            Self::Owner => write!(f, "owner"),
            Self::Staff => write!(f, "staff"),
            Self::Customer => write!(f, "customer"),
        }
    }
}

impl std::str::FromStr for GlobalRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superAdmin" => Ok(Self::SuperAdmin),
            "owner" => Ok(Self::Owner),
            "staff" => Ok(Self::Staff),
            "customer" => Ok(Self::Customer),
            _ => Err(format!("GlobalRole desconhecido: {s}")),
        }
    }
}

// ---
// 2. Profile (O registro de identidade da aplicação)
// ---
// Documento `profiles/{userId}`. Criado no registro; nunca apagado enquanto
// ativo (a remoção é ação administrativa que também remove dependentes).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "ana@estudio.example")]
    pub email: String,

    #[schema(example = "Ana Souza")]
    pub display_name: String,

    #[serde(rename = "photoURL", skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,

    pub global_role: GlobalRole,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---
// 3. Account (O lado do provedor de identidade)
// ---
// Documento `accounts/{userId}`. Nunca sai pela API.
// O claim `superadmin` é a marcação assinada que o provedor anexa ao token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub user_id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub superadmin: bool,
    pub disabled: bool,
}

// Estrutura de dados ("claims") dentro do JWT.
// `role` e `superadmin` são os custom claims legíveis por cliente e servidor.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
    pub role: GlobalRole,
    pub superadmin: bool,
}

// ---
// Payloads
// ---

// Registro público: sempre cria um perfil `customer`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
    #[validate(length(min = 1, message = "O nome de exibição é obrigatório."))]
    pub display_name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}
