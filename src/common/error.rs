// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::db::store::StoreError;
use crate::middleware::i18n::Locale;

// Nosso tipo de erro de domínio, com `thiserror` para melhor ergonomia.
// As funções de consulta de permissão (can/can_any/can_all) nunca retornam
// erro: ausência de dado resolve para `false`. Quem retorna estes erros são
// as operações de resolução e de escrita.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Slug já existe")]
    SlugAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    // Identidade existe no provedor mas não há perfil correspondente.
    // Conta inválida: força sign-out, nunca uma sessão meio-inicializada.
    #[error("Conta inválida: identidade sem perfil")]
    InvalidAccount,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Estúdio não encontrado")]
    StudioNotFound,

    #[error("Cargo não encontrado: {0}")]
    RoleNotFound(String),

    #[error("Permissão desconhecida: {0}")]
    UnknownPermission(String),

    // Upsert de cargo referenciando slugs fora do catálogo.
    #[error("Permissões inválidas: {0:?}")]
    InvalidPermission(Vec<String>),

    // O cargo "owner" não pode ser apagado nem renomeado.
    #[error("O cargo \"owner\" é protegido")]
    ProtectedRole,

    // Usuário sem nenhum vínculo com o estúdio alvo. Estado exibível
    // ("acesso restrito"), não um crash.
    #[error("Usuário não é membro deste estúdio")]
    NoMembership,

    // Falha do armazenamento subjacente. Distinto de NoMembership:
    // este é repetível, aquele é definitivo.
    #[error("Armazenamento indisponível: {0}")]
    StorageUnavailable(String),

    #[error("Operação excedeu o tempo limite")]
    OperationTimedOut,

    // Variante genérica para qualquer outro erro inesperado.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(msg) => AppError::StorageUnavailable(msg),
            StoreError::Serialization(msg) => AppError::StorageUnavailable(msg),
        }
    }
}

impl AppError {
    // Chave de tradução usada pelo I18nStore.
    fn i18n_key(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "error.validation",
            AppError::EmailAlreadyExists => "error.email-exists",
            AppError::SlugAlreadyExists => "error.slug-exists",
            AppError::InvalidCredentials => "error.invalid-credentials",
            AppError::InvalidToken => "error.invalid-token",
            AppError::InvalidAccount => "error.invalid-account",
            AppError::UserNotFound => "error.user-not-found",
            AppError::StudioNotFound => "error.studio-not-found",
            AppError::RoleNotFound(_) => "error.role-not-found",
            AppError::UnknownPermission(_) => "error.unknown-permission",
            AppError::InvalidPermission(_) => "error.invalid-permission",
            AppError::ProtectedRole => "error.protected-role",
            AppError::NoMembership => "error.no-membership",
            AppError::StorageUnavailable(_) => "error.storage-unavailable",
            AppError::OperationTimedOut => "error.timeout",
            AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => "error.internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists | AppError::SlugAlreadyExists => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::InvalidAccount => StatusCode::UNAUTHORIZED,
            AppError::UserNotFound
            | AppError::StudioNotFound
            | AppError::RoleNotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnknownPermission(_) | AppError::InvalidPermission(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::ProtectedRole => StatusCode::CONFLICT,
            AppError::NoMembership => StatusCode::FORBIDDEN,
            AppError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::OperationTimedOut => StatusCode::GATEWAY_TIMEOUT,
            AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // Detalhes estruturados que o cliente consegue exibir campo a campo.
    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                Some(json!(details))
            }
            AppError::InvalidPermission(ids) => Some(json!({ "unknownPermissions": ids })),
            AppError::UnknownPermission(id) => Some(json!({ "permission": id })),
            AppError::RoleNotFound(id) => Some(json!({ "roleId": id })),
            _ => None,
        }
    }

    /// Converte para o formato HTTP, traduzindo a mensagem pelo idioma
    /// pedido no Accept-Language.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        if self.status().is_server_error() {
            tracing::error!("🔥 Erro interno: {}", self);
        }
        ApiError {
            status: self.status(),
            error: i18n.translate(&locale.0, self.i18n_key()),
            details: self.details(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Caminho sem Locale/I18nStore: responde com a mensagem padrão.
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("🔥 Erro interno: {}", self);
        }
        let body = Json(json!({ "error": self.to_string(), "details": self.details() }));
        (status, body).into_response()
    }
}

// O formato de erro que sai pela API.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error,
            "details": self.details,
        }));
        (self.status, body).into_response()
    }
}
