// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{DocumentStore, WriteBatch},
    db::{AccountRepository, ProfileRepository},
    models::auth::{Account, Claims, GlobalRole, Profile},
};

// O provedor de identidade, modelado em processo: contas com hash de senha
// e tokens assinados carregando os custom claims `role` e `superadmin`.
#[derive(Clone)]
pub struct AuthService {
    account_repo: AccountRepository,
    profile_repo: ProfileRepository,
    store: Arc<dyn DocumentStore>,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(
        account_repo: AccountRepository,
        profile_repo: ProfileRepository,
        store: Arc<dyn DocumentStore>,
        jwt_secret: String,
    ) -> Self {
        Self { account_repo, profile_repo, store, jwt_secret }
    }

    /// Registro público: cria conta e perfil `customer` num único lote.
    pub async fn register_customer(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<String, AppError> {
        if self.account_repo.find_by_email(email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        // O hashing fica fora do caminho assíncrono.
        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let now = Utc::now();
        let user_id = Uuid::new_v4();

        let account = Account {
            user_id,
            email: email.to_owned(),
            password_hash: hashed_password,
            superadmin: false,
            disabled: false,
        };
        let profile = Profile {
            id: user_id,
            email: email.to_owned(),
            display_name: display_name.to_owned(),
            photo_url: None,
            global_role: GlobalRole::Customer,
            created_at: now,
            updated_at: now,
        };

        // Conta e perfil nascem juntos: tudo-ou-nada.
        let mut batch = WriteBatch::new();
        batch.push(AccountRepository::set_op(&account)?);
        batch.push(ProfileRepository::set_op(&profile)?);
        self.store.commit(batch).await?;

        self.create_token(&profile, account.superadmin)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<String, AppError> {
        let account = self
            .account_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if account.disabled {
            return Err(AppError::InvalidCredentials);
        }

        let password_clone = password.to_owned();
        let password_hash_clone = account.password_hash.clone();
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        // Identidade sem perfil é conta inválida, não uma sessão pela metade.
        let profile = self
            .profile_repo
            .find(account.user_id)
            .await?
            .ok_or(AppError::InvalidAccount)?;

        self.create_token(&profile, account.superadmin)
    }

    /// Decodifica e valida a assinatura/expiração do token.
    pub fn decode_claims(&self, token: &str) -> Result<Claims, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    /// Carrega o perfil do dono do token, distinguindo token revogado
    /// (conta sumiu/desativada) de conta inválida (perfil ausente).
    pub async fn load_profile_checked(&self, user_id: Uuid) -> Result<Profile, AppError> {
        let account = self
            .account_repo
            .find(user_id)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if account.disabled {
            return Err(AppError::InvalidToken);
        }

        self.profile_repo
            .find(user_id)
            .await?
            .ok_or(AppError::InvalidAccount)
    }

    /// Valida o token e devolve o perfil autenticado.
    pub async fn validate_token(&self, token: &str) -> Result<Profile, AppError> {
        let claims = self.decode_claims(token)?;
        self.load_profile_checked(claims.sub).await
    }

    pub fn create_token(&self, profile: &Profile, superadmin: bool) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: profile.id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
            role: profile.global_role,
            superadmin,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
