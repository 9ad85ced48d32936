use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Permission bag keyed by an integer level. Level 0 is the customer level.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "access_levels")]
#[schema(as = AccessLevel)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub level: i32,
    pub name: String,
    pub sys_admin: bool,
    pub user_mgr: bool,
    pub stock_mgr: bool,
    pub order_mgr: bool,
    pub report: bool,
    pub dashboard: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user::Entity")]
    Users,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// The built-in customer level.
pub const CUSTOMER_LEVEL: i32 = 0;

impl Model {
    pub fn is_customer_level(&self) -> bool {
        self.level == CUSTOMER_LEVEL
    }
}
