// src/services/rbac_service.rs

use uuid::Uuid;

use crate::common::error::AppError;
use crate::common::permissions;
use crate::db::store::WriteOp;
use crate::db::RoleRepository;
use crate::models::auth::GlobalRole;
use crate::models::rbac::{
    CatalogEntry, CatalogGroup, CatalogResponse, StudioRole, UpsertRolePayload, OWNER_ROLE_ID,
};

#[derive(Clone)]
pub struct RbacService {
    role_repo: RoleRepository,
}

impl RbacService {
    pub fn new(role_repo: RoleRepository) -> Self {
        Self { role_repo }
    }

    /// O catálogo agrupado, para a tela de edição de cargos.
    pub fn catalog(&self) -> CatalogResponse {
        CatalogResponse {
            groups: permissions::GROUPS
                .iter()
                .map(|g| CatalogGroup {
                    label: g.label.to_string(),
                    permissions: g
                        .permissions
                        .iter()
                        .map(|p| CatalogEntry { id: p.id.to_string(), label: p.label.to_string() })
                        .collect(),
                })
                .collect(),
            standalone: permissions::STANDALONE
                .iter()
                .map(|p| CatalogEntry { id: p.id.to_string(), label: p.label.to_string() })
                .collect(),
        }
    }

    pub async fn list_roles(&self, studio_id: Uuid) -> Result<Vec<StudioRole>, AppError> {
        self.role_repo.list(studio_id).await
    }

    /// Cria ou atualiza um cargo do estúdio. Valida tudo ANTES de persistir:
    /// um upsert rejeitado não grava nada.
    pub async fn upsert_role(
        &self,
        studio_id: Uuid,
        payload: UpsertRolePayload,
    ) -> Result<StudioRole, AppError> {
        let unknown: Vec<String> = payload
            .permissions
            .iter()
            .filter(|id| !permissions::contains(id))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(AppError::InvalidPermission(unknown));
        }

        // Deduplica preservando a ordem de chegada.
        let mut seen = std::collections::HashSet::new();
        let perms: Vec<String> = payload
            .permissions
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect();

        let role_id = payload
            .id
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string());

        // O cargo "owner" não pode ser renomeado; o conjunto de permissões
        // segue editável.
        if role_id == OWNER_ROLE_ID {
            let existing = self.role_repo.require(studio_id, OWNER_ROLE_ID).await?;
            if payload.name != existing.name {
                return Err(AppError::ProtectedRole);
            }
        }

        let role = StudioRole {
            id: role_id,
            name: payload.name,
            description: payload.description,
            permissions: perms,
        };
        self.role_repo.save(studio_id, &role).await?;

        Ok(role)
    }

    pub async fn get_role(&self, studio_id: Uuid, role_id: &str) -> Result<StudioRole, AppError> {
        self.role_repo.require(studio_id, role_id).await
    }

    pub async fn delete_role(&self, studio_id: Uuid, role_id: &str) -> Result<(), AppError> {
        if role_id == OWNER_ROLE_ID {
            return Err(AppError::ProtectedRole);
        }
        // Garante que o erro de inexistente saia antes da remoção silenciosa.
        self.role_repo.require(studio_id, role_id).await?;
        self.role_repo.delete(studio_id, role_id).await
    }

    /// Os cargos que todo estúdio recém-criado recebe, como operações para
    /// compor o lote de criação do estúdio.
    pub fn default_role_ops(studio_id: Uuid) -> Result<Vec<WriteOp>, AppError> {
        let owner = StudioRole {
            id: OWNER_ROLE_ID.to_string(),
            name: "Propietario".to_string(),
            description: Some("Acceso completo al estudio (generado automáticamente)".to_string()),
            permissions: permissions::default_permissions_for(GlobalRole::Owner)
                .into_iter()
                .collect(),
        };
        let staff = StudioRole {
            id: "staff".to_string(),
            name: "Personal".to_string(),
            description: Some("Operación diaria del estudio".to_string()),
            permissions: permissions::default_permissions_for(GlobalRole::Staff)
                .into_iter()
                .collect(),
        };
        Ok(vec![
            RoleRepository::set_op(studio_id, &owner)?,
            RoleRepository::set_op(studio_id, &staff)?,
        ])
    }
}
