// src/db/account_repo.rs

use serde_json::json;
use std::sync::Arc;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::store::{decode, encode, DocumentStore, WriteOp};
use crate::models::auth::Account;

const COLLECTION: &str = "accounts";

// O lado "provedor de identidade": contas com hash de senha e o claim
// assinado `superadmin`. Nunca exposto pela API.
#[derive(Clone)]
pub struct AccountRepository {
    store: Arc<dyn DocumentStore>,
}

impl AccountRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn path(user_id: Uuid) -> String {
        format!("{COLLECTION}/{user_id}")
    }

    pub async fn find(&self, user_id: Uuid) -> Result<Option<Account>, AppError> {
        match self.store.get(&Self::path(user_id)).await? {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AppError> {
        let docs = self.store.query_eq(COLLECTION, "email", &json!(email)).await?;
        match docs.into_iter().next() {
            Some(doc) => Ok(Some(decode(doc)?)),
            None => Ok(None),
        }
    }

    pub async fn save(&self, account: &Account) -> Result<(), AppError> {
        self.store
            .set(&Self::path(account.user_id), encode(account)?)
            .await?;
        Ok(())
    }

    // Operações para compor lotes atômicos.
    pub fn set_op(account: &Account) -> Result<WriteOp, AppError> {
        Ok(WriteOp::Set {
            path: Self::path(account.user_id),
            doc: encode(account)?,
        })
    }

    pub fn delete_op(user_id: Uuid) -> WriteOp {
        WriteOp::Delete { path: Self::path(user_id) }
    }
}
