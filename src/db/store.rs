// src/db/store.rs

use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::RwLock;
use thiserror::Error;

// ---
// A fronteira com o armazenamento de documentos
// ---
// Armazenamento hierárquico coleção/documento, consumido como capacidade
// opaca: leituras e escritas por documento, consultas simples de igualdade
// e escrita em lote atômica. Nenhuma transação além de um único lote.

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("armazenamento indisponível: {0}")]
    Unavailable(String),

    #[error("documento inválido: {0}")]
    Serialization(String),
}

// Uma operação dentro de um lote atômico.
#[derive(Debug, Clone)]
pub enum WriteOp {
    Set { path: String, doc: Value },
    Delete { path: String },
}

// Lote de escrita tudo-ou-nada, do ponto de vista de quem chama.
#[derive(Debug, Default)]
pub struct WriteBatch {
    ops: Vec<WriteOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, path: impl Into<String>, doc: Value) -> &mut Self {
        self.ops.push(WriteOp::Set { path: path.into(), doc });
        self
    }

    pub fn delete(&mut self, path: impl Into<String>) -> &mut Self {
        self.ops.push(WriteOp::Delete { path: path.into() });
        self
    }

    pub fn push(&mut self, op: WriteOp) -> &mut Self {
        self.ops.push(op);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.ops
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Lê um documento pelo caminho completo (ex.: `profiles/{id}`).
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Grava (cria ou substitui) um documento.
    async fn set(&self, path: &str, doc: Value) -> Result<(), StoreError>;

    /// Remove um documento. Remover o inexistente não é erro.
    async fn delete(&self, path: &str) -> Result<(), StoreError>;

    /// Documentos filhos diretos de uma coleção (sem descer em subcoleções).
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    /// Igualdade simples de campo dentro de uma coleção.
    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError>;

    /// Aplica o lote inteiro atomicamente.
    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError>;
}

/// Serializa um modelo para documento.
pub fn encode<T: serde::Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Desserializa um documento para o modelo tipado.
pub fn decode<T: serde::de::DeserializeOwned>(doc: Value) -> Result<T, StoreError> {
    serde_json::from_value(doc).map_err(|e| StoreError::Serialization(e.to_string()))
}

// ---
// MemoryStore
// ---
// Implementação em memória usada em desenvolvimento e nos testes.
// Mapa ordenado por caminho completo; o lock nunca atravessa um await.
#[derive(Debug, Default)]
pub struct MemoryStore {
    docs: RwLock<BTreeMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, BTreeMap<String, Value>>, StoreError> {
        self.docs
            .read()
            .map_err(|_| StoreError::Unavailable("lock envenenado".into()))
    }

    fn write(
        &self,
    ) -> Result<std::sync::RwLockWriteGuard<'_, BTreeMap<String, Value>>, StoreError> {
        self.docs
            .write()
            .map_err(|_| StoreError::Unavailable("lock envenenado".into()))
    }

    // Filho direto de `collection`: o resto do caminho não contém '/'.
    fn is_direct_child(collection: &str, path: &str) -> bool {
        path.strip_prefix(collection)
            .and_then(|rest| rest.strip_prefix('/'))
            .is_some_and(|id| !id.is_empty() && !id.contains('/'))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.read()?.get(path).cloned())
    }

    async fn set(&self, path: &str, doc: Value) -> Result<(), StoreError> {
        self.write()?.insert(path.to_string(), doc);
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        self.write()?.remove(path);
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let prefix = format!("{collection}/");
        let docs = self.read()?;
        Ok(docs
            .range(prefix.clone()..)
            .take_while(|(path, _)| path.starts_with(&prefix))
            .filter(|(path, _)| Self::is_direct_child(collection, path))
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Value>, StoreError> {
        let all = self.list(collection).await?;
        Ok(all
            .into_iter()
            .filter(|doc| doc.get(field) == Some(value))
            .collect())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), StoreError> {
        // Um único write lock cobre o lote inteiro: nenhum leitor observa
        // estado parcial.
        let mut docs = self.write()?;
        for op in batch.into_ops() {
            match op {
                WriteOp::Set { path, doc } => {
                    docs.insert(path, doc);
                }
                WriteOp::Delete { path } => {
                    docs.remove(&path);
                }
            }
        }
        Ok(())
    }
}
