use crate::{
    entities::{
        access_level::{self, CUSTOMER_LEVEL},
        user,
    },
    errors::ServiceError,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct AccessLevelInput {
    #[validate(length(min = 1, max = 64, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub sys_admin: bool,
    #[serde(default)]
    pub user_mgr: bool,
    #[serde(default)]
    pub stock_mgr: bool,
    #[serde(default)]
    pub order_mgr: bool,
    #[serde(default)]
    pub report: bool,
    #[serde(default)]
    pub dashboard: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAccessLevelRequest {
    #[validate(range(min = 1, max = 999, message = "Level must be between 1 and 999"))]
    pub level: i32,
    #[serde(flatten)]
    #[validate]
    pub access: AccessLevelInput,
}

/// Levels installed by `storefront-admin seed-access-levels`.
pub fn default_levels() -> Vec<(i32, AccessLevelInput)> {
    vec![
        (
            1,
            AccessLevelInput {
                name: "System Administrator".into(),
                sys_admin: true,
                user_mgr: true,
                stock_mgr: true,
                order_mgr: true,
                report: true,
                dashboard: true,
            },
        ),
        (
            2,
            AccessLevelInput {
                name: "Order Manager".into(),
                order_mgr: true,
                dashboard: true,
                ..Default::default()
            },
        ),
        (
            3,
            AccessLevelInput {
                name: "Stock Manager".into(),
                stock_mgr: true,
                dashboard: true,
                ..Default::default()
            },
        ),
        (
            4,
            AccessLevelInput {
                name: "Reporter".into(),
                report: true,
                dashboard: true,
                ..Default::default()
            },
        ),
    ]
}

/// Maintains the permission bags behind route gating.
#[derive(Clone)]
pub struct AccessService {
    db: Arc<DatabaseConnection>,
}

impl AccessService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<access_level::Model>, ServiceError> {
        Ok(access_level::Entity::find()
            .order_by_asc(access_level::Column::Level)
            .all(&*self.db)
            .await?)
    }

    pub async fn get(&self, level: i32) -> Result<access_level::Model, ServiceError> {
        access_level::Entity::find_by_id(level)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Access level {} not found", level)))
    }

    #[instrument(skip(self, request), fields(level = request.level))]
    pub async fn create(
        &self,
        request: CreateAccessLevelRequest,
    ) -> Result<access_level::Model, ServiceError> {
        request.validate()?;
        if access_level::Entity::find_by_id(request.level)
            .one(&*self.db)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!(
                "Access level {} already exists",
                request.level
            )));
        }

        let now = Utc::now();
        let access = request.access;
        let model = access_level::ActiveModel {
            level: Set(request.level),
            name: Set(access.name.trim().to_string()),
            sys_admin: Set(access.sys_admin),
            user_mgr: Set(access.user_mgr),
            stock_mgr: Set(access.stock_mgr),
            order_mgr: Set(access.order_mgr),
            report: Set(access.report),
            dashboard: Set(access.dashboard),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(level = model.level, name = %model.name, "Access level created");
        Ok(model)
    }

    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        level: i32,
        input: AccessLevelInput,
    ) -> Result<access_level::Model, ServiceError> {
        input.validate()?;
        if level == CUSTOMER_LEVEL {
            return Err(ServiceError::InvalidOperation(
                "The customer level cannot be modified".to_string(),
            ));
        }

        let mut active: access_level::ActiveModel = self.get(level).await?.into();
        active.name = Set(input.name.trim().to_string());
        active.sys_admin = Set(input.sys_admin);
        active.user_mgr = Set(input.user_mgr);
        active.stock_mgr = Set(input.stock_mgr);
        active.order_mgr = Set(input.order_mgr);
        active.report = Set(input.report);
        active.dashboard = Set(input.dashboard);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.db).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, level: i32) -> Result<(), ServiceError> {
        if level == CUSTOMER_LEVEL {
            return Err(ServiceError::InvalidOperation(
                "The customer level cannot be deleted".to_string(),
            ));
        }
        let model = self.get(level).await?;

        let holders = user::Entity::find()
            .filter(user::Column::AccessLevel.eq(level))
            .count(&*self.db)
            .await?;
        if holders > 0 {
            return Err(ServiceError::Conflict(format!(
                "Access level {} is assigned to {} user(s)",
                level, holders
            )));
        }

        access_level::Entity::delete_by_id(model.level)
            .exec(&*self.db)
            .await?;
        info!(level, "Access level deleted");
        Ok(())
    }

    /// Inserts the default staff levels that are not present yet.
    #[instrument(skip(self))]
    pub async fn seed_defaults(&self) -> Result<usize, ServiceError> {
        let mut created = 0;
        for (level, access) in default_levels() {
            match self.create(CreateAccessLevelRequest { level, access }).await {
                Ok(_) => created += 1,
                Err(ServiceError::Conflict(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_levels_have_exactly_one_system_admin() {
        let levels = default_levels();
        assert_eq!(levels.iter().filter(|(_, a)| a.sys_admin).count(), 1);
        assert!(levels.iter().all(|(level, _)| *level != CUSTOMER_LEVEL));
    }

    #[test]
    fn customer_level_cannot_be_created() {
        let request = CreateAccessLevelRequest {
            level: 0,
            access: AccessLevelInput {
                name: "Shadow".into(),
                ..Default::default()
            },
        };
        assert!(request.validate().is_err());
    }
}
