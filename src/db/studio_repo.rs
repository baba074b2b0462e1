// src/db/studio_repo.rs

use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::{decode, encode, DocumentStore, WriteOp};
use crate::models::studio::Studio;

const COLLECTION: &str = "studios";

#[derive(Clone)]
pub struct StudioRepository {
    store: Arc<dyn DocumentStore>,
}

impl StudioRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn path(studio_id: Uuid) -> String {
        format!("{COLLECTION}/{studio_id}")
    }

    pub async fn find(&self, studio_id: Uuid) -> Result<Option<Studio>, AppError> {
        match self.store.get(&Self::path(studio_id)).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn require(&self, studio_id: Uuid) -> Result<Studio, AppError> {
        self.find(studio_id).await?.ok_or(AppError::StudioNotFound)
    }

    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Studio>, AppError> {
        let docs = self.store.query_eq(COLLECTION, "slug", &json!(slug)).await?;
        match docs.into_iter().next() {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn find_many(&self, ids: &[Uuid]) -> Result<Vec<Studio>, AppError> {
        let mut studios = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(studio) = self.find(*id).await? {
                studios.push(studio);
            }
        }
        Ok(studios)
    }

    pub async fn list_all(&self) -> Result<Vec<Studio>, AppError> {
        let docs = self.store.list(COLLECTION).await?;
        docs.into_iter()
            .map(|doc| decode(doc).map_err(AppError::from))
            .collect()
    }

    pub async fn save(&self, studio: &Studio) -> Result<(), AppError> {
        self.store.set(&Self::path(studio.id), encode(studio)?).await?;
        Ok(())
    }

    pub fn set_op(studio: &Studio) -> Result<WriteOp, AppError> {
        Ok(WriteOp::Set { path: Self::path(studio.id), doc: encode(studio)? })
    }
}
