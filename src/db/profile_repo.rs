// src/db/profile_repo.rs

use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::{decode, encode, DocumentStore, WriteOp};
use crate::models::auth::Profile;

const COLLECTION: &str = "profiles";

// O repositório de perfis, responsável pelos documentos `profiles/{userId}`.
#[derive(Clone)]
pub struct ProfileRepository {
    store: Arc<dyn DocumentStore>,
}

impl ProfileRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn path(user_id: Uuid) -> String {
        format!("{COLLECTION}/{user_id}")
    }

    pub async fn find(&self, user_id: Uuid) -> Result<Option<Profile>, AppError> {
        match self.store.get(&Self::path(user_id)).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn require(&self, user_id: Uuid) -> Result<Profile, AppError> {
        self.find(user_id).await?.ok_or(AppError::UserNotFound)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        let docs = self.store.query_eq(COLLECTION, "email", &json!(email)).await?;
        match docs.into_iter().next() {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Profile>, AppError> {
        let docs = self.store.list(COLLECTION).await?;
        docs.into_iter()
            .map(|doc| decode(doc).map_err(AppError::from))
            .collect()
    }

    pub async fn save(&self, profile: &Profile) -> Result<(), AppError> {
        self.store.set(&Self::path(profile.id), encode(profile)?).await?;
        Ok(())
    }

    pub fn set_op(profile: &Profile) -> Result<WriteOp, AppError> {
        Ok(WriteOp::Set { path: Self::path(profile.id), doc: encode(profile)? })
    }

    pub fn delete_op(user_id: Uuid) -> WriteOp {
        WriteOp::Delete { path: Self::path(user_id) }
    }
}
