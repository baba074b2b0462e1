// src/db/membership_repo.rs

use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::{decode, encode, DocumentStore, WriteOp};
use crate::models::membership::{MembershipRecord, StaffRecord};

const LEGACY_COLLECTION: &str = "memberships";

// As duas representações históricas do vínculo usuário-estúdio:
//   (a) índice plano legado `memberships/{userId}_{studioId}`
//   (b) sub-registro novo `studios/{studioId}/staff/{userId}`
// O repositório lê e escreve as duas; quem decide a precedência é o
// resolvedor de vínculos.
#[derive(Clone)]
pub struct MembershipRepository {
    store: Arc<dyn DocumentStore>,
}

impl MembershipRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn legacy_path(user_id: Uuid, studio_id: Uuid) -> String {
        format!("{LEGACY_COLLECTION}/{}", MembershipRecord::doc_id(user_id, studio_id))
    }

    pub fn staff_collection(studio_id: Uuid) -> String {
        format!("studios/{studio_id}/staff")
    }

    pub fn staff_path(studio_id: Uuid, user_id: Uuid) -> String {
        format!("studios/{studio_id}/staff/{user_id}")
    }

    // --- Índice plano legado ---

    pub async fn find_legacy(
        &self,
        user_id: Uuid,
        studio_id: Uuid,
    ) -> Result<Option<MembershipRecord>, AppError> {
        match self.store.get(&Self::legacy_path(user_id, studio_id)).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    /// Todos os vínculos legados de um usuário (a lista "meus estúdios").
    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<MembershipRecord>, AppError> {
        let docs = self
            .store
            .query_eq(LEGACY_COLLECTION, "userId", &json!(user_id))
            .await?;
        docs.into_iter()
            .map(|doc| decode(doc).map_err(AppError::from))
            .collect()
    }

    pub async fn list_for_studio(&self, studio_id: Uuid) -> Result<Vec<MembershipRecord>, AppError> {
        let docs = self
            .store
            .query_eq(LEGACY_COLLECTION, "studioId", &json!(studio_id))
            .await?;
        docs.into_iter()
            .map(|doc| decode(doc).map_err(AppError::from))
            .collect()
    }

    // --- Sub-registro de equipe ---

    pub async fn find_staff(
        &self,
        studio_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<StaffRecord>, AppError> {
        match self.store.get(&Self::staff_path(studio_id, user_id)).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn list_staff(&self, studio_id: Uuid) -> Result<Vec<StaffRecord>, AppError> {
        let docs = self.store.list(&Self::staff_collection(studio_id)).await?;
        docs.into_iter()
            .map(|doc| decode(doc).map_err(AppError::from))
            .collect()
    }

    // --- Operações para lotes atômicos ---
    // Criação e remoção de vínculo sempre tocam as duas representações
    // dentro de um único lote.

    pub fn legacy_set_op(record: &MembershipRecord) -> Result<WriteOp, AppError> {
        Ok(WriteOp::Set {
            path: Self::legacy_path(record.user_id, record.studio_id),
            doc: encode(record)?,
        })
    }

    pub fn staff_set_op(studio_id: Uuid, record: &StaffRecord) -> Result<WriteOp, AppError> {
        Ok(WriteOp::Set {
            path: Self::staff_path(studio_id, record.user_id),
            doc: encode(record)?,
        })
    }

    pub fn legacy_delete_op(user_id: Uuid, studio_id: Uuid) -> WriteOp {
        WriteOp::Delete { path: Self::legacy_path(user_id, studio_id) }
    }

    pub fn staff_delete_op(studio_id: Uuid, user_id: Uuid) -> WriteOp {
        WriteOp::Delete { path: Self::staff_path(studio_id, user_id) }
    }
}
