// src/db/role_repo.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::{decode, encode, DocumentStore, WriteOp};
use crate::models::rbac::StudioRole;

// Os cargos vivem como subcoleção do estúdio: `studios/{studioId}/roles/{roleId}`.
#[derive(Clone)]
pub struct RoleRepository {
    store: Arc<dyn DocumentStore>,
}

impl RoleRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn collection(studio_id: Uuid) -> String {
        format!("studios/{studio_id}/roles")
    }

    pub fn path(studio_id: Uuid, role_id: &str) -> String {
        format!("studios/{studio_id}/roles/{role_id}")
    }

    pub async fn find(&self, studio_id: Uuid, role_id: &str) -> Result<Option<StudioRole>, AppError> {
        match self.store.get(&Self::path(studio_id, role_id)).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn require(&self, studio_id: Uuid, role_id: &str) -> Result<StudioRole, AppError> {
        self.find(studio_id, role_id)
            .await?
            .ok_or_else(|| AppError::RoleNotFound(role_id.to_string()))
    }

    pub async fn list(&self, studio_id: Uuid) -> Result<Vec<StudioRole>, AppError> {
        let docs = self.store.list(&Self::collection(studio_id)).await?;
        docs.into_iter()
            .map(|doc| decode(doc).map_err(AppError::from))
            .collect()
    }

    pub async fn save(&self, studio_id: Uuid, role: &StudioRole) -> Result<(), AppError> {
        self.store
            .set(&Self::path(studio_id, &role.id), encode(role)?)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, studio_id: Uuid, role_id: &str) -> Result<(), AppError> {
        self.store.delete(&Self::path(studio_id, role_id)).await?;
        Ok(())
    }

    pub fn set_op(studio_id: Uuid, role: &StudioRole) -> Result<WriteOp, AppError> {
        Ok(WriteOp::Set { path: Self::path(studio_id, &role.id), doc: encode(role)? })
    }
}
