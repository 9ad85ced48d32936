use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Single-row store configuration edited from the admin console.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "store_settings")]
#[schema(as = StoreSettings)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: i32,
    pub store_name: String,
    #[sea_orm(nullable)]
    pub contact_phone: Option<String>,
    #[sea_orm(nullable)]
    pub bank_name: Option<String>,
    #[sea_orm(nullable)]
    pub bank_account_name: Option<String>,
    #[sea_orm(nullable)]
    pub bank_account_number: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub shipping_fee: Decimal,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub free_shipping_threshold: Option<Decimal>,
    pub cod_enabled: bool,
    pub low_stock_threshold: i32,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Primary key of the only settings row.
pub const SETTINGS_ROW_ID: i32 = 1;

impl Model {
    /// Shipping fee charged for an order with the given merchandise total.
    pub fn shipping_fee_for(&self, merchandise_total: Decimal) -> Decimal {
        match self.free_shipping_threshold {
            Some(threshold) if merchandise_total >= threshold => Decimal::ZERO,
            _ => self.shipping_fee,
        }
    }
}
