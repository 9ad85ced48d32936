use crate::{
    entities::product,
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_money(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() {
        return Err(ValidationError::new("must_not_be_negative"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 1, max = 64, message = "SKU is required"))]
    pub sku: String,
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(min = 1, max = 32))]
    pub unit: String,
    #[validate(custom = "validate_money")]
    pub price: Decimal,
    #[validate(custom = "validate_money")]
    #[serde(default)]
    pub discount: Decimal,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[validate(url)]
    pub image_url: Option<String>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 32))]
    pub unit: Option<String>,
    #[validate(custom = "validate_money")]
    pub price: Option<Decimal>,
    #[validate(custom = "validate_money")]
    pub discount: Option<Decimal>,
    pub is_active: Option<bool>,
    #[validate(url)]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdjustStockRequest {
    /// Signed change applied to the on-hand quantity
    pub delta: i32,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct ProductQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub category: Option<String>,
    /// Name substring
    pub search: Option<String>,
    #[serde(default)]
    pub include_inactive: bool,
}

/// Product catalog with simple filtering and stock maintenance.
#[derive(Clone)]
pub struct CatalogService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CatalogService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Returns one page of products and the total match count.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        query: &ProductQuery,
        limit: u64,
    ) -> Result<(Vec<product::Model>, u64), ServiceError> {
        let mut condition = Condition::all();
        if !query.include_inactive {
            condition = condition.add(product::Column::IsActive.eq(true));
        }
        if let Some(category) = query.category.as_deref().filter(|c| !c.trim().is_empty()) {
            condition = condition.add(product::Column::Category.eq(category.trim()));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            condition = condition.add(product::Column::Name.contains(search.trim()));
        }

        let paginator = product::Entity::find()
            .filter(condition)
            .order_by_asc(product::Column::Name)
            .paginate(&*self.db, limit);
        let total = paginator.num_items().await?;
        let page = query.page.unwrap_or(1).max(1);
        let items = paginator.fetch_page(page - 1).await?;
        Ok((items, total))
    }

    pub async fn get_product(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    /// Public lookup: inactive products are hidden.
    pub async fn get_active_product(&self, id: Uuid) -> Result<product::Model, ServiceError> {
        let product = self.get_product(id).await?;
        if !product.is_active {
            return Err(ServiceError::NotFound(format!("Product {} not found", id)));
        }
        Ok(product)
    }

    #[instrument(skip(self, request), fields(sku = %request.sku))]
    pub async fn create_product(
        &self,
        request: CreateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request.validate()?;
        if request.discount > request.price {
            return Err(ServiceError::ValidationError(
                "Discount cannot exceed the price".to_string(),
            ));
        }
        let sku = request.sku.trim().to_uppercase();
        if product::Entity::find()
            .filter(product::Column::Sku.eq(sku.as_str()))
            .one(&*self.db)
            .await?
            .is_some()
        {
            return Err(ServiceError::Conflict(format!("SKU {} already exists", sku)));
        }

        let now = Utc::now();
        let product = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            sku: Set(sku),
            name: Set(request.name.trim().to_string()),
            description: Set(request.description),
            category: Set(request.category.trim().to_string()),
            unit: Set(request.unit.trim().to_string()),
            price: Set(request.price),
            discount: Set(request.discount),
            stock_quantity: Set(request.stock_quantity),
            is_active: Set(request.is_active),
            image_url: Set(request.image_url),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product.id))
            .await;
        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self, request))]
    pub async fn update_product(
        &self,
        id: Uuid,
        request: UpdateProductRequest,
    ) -> Result<product::Model, ServiceError> {
        request.validate()?;
        let existing = self.get_product(id).await?;
        let price = request.price.unwrap_or(existing.price);
        let discount = request.discount.unwrap_or(existing.discount);
        if discount > price {
            return Err(ServiceError::ValidationError(
                "Discount cannot exceed the price".to_string(),
            ));
        }

        let mut active: product::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(category) = request.category {
            active.category = Set(category.trim().to_string());
        }
        if let Some(unit) = request.unit {
            active.unit = Set(unit.trim().to_string());
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }
        if let Some(image_url) = request.image_url {
            active.image_url = Set(Some(image_url));
        }
        active.price = Set(price);
        active.discount = Set(discount);
        active.updated_at = Set(Utc::now());
        let product = active.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(product.id))
            .await;
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = product::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Product {} not found", id)));
        }
        self.event_sender
            .send_or_log(Event::ProductDeleted(id))
            .await;
        info!(product_id = %id, "Product deleted");
        Ok(())
    }

    /// Applies a signed stock correction. The result may not go below zero.
    #[instrument(skip(self, request), fields(delta = request.delta))]
    pub async fn adjust_stock(
        &self,
        id: Uuid,
        request: AdjustStockRequest,
    ) -> Result<product::Model, ServiceError> {
        let txn = self.db.begin().await?;
        let existing = product::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))?;

        let old_quantity = existing.stock_quantity;
        let new_quantity = old_quantity
            .checked_add(request.delta)
            .ok_or_else(|| ServiceError::InvalidInput("Stock adjustment overflows".to_string()))?;
        if new_quantity < 0 {
            warn!(product_id = %id, old_quantity, delta = request.delta, "Stock adjustment below zero");
            return Err(ServiceError::InsufficientStock(format!(
                "Only {} unit(s) of {} in stock",
                old_quantity, existing.sku
            )));
        }

        let mut active: product::ActiveModel = existing.into();
        active.stock_quantity = Set(new_quantity);
        active.updated_at = Set(Utc::now());
        let product = active.update(&txn).await?;
        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::StockAdjusted {
                product_id: id,
                old_quantity,
                new_quantity,
            })
            .await;
        info!(product_id = %id, old_quantity, new_quantity, reason = ?request.reason, "Stock adjusted");
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn negative_price_is_rejected() {
        let request = CreateProductRequest {
            sku: "CEM-50".into(),
            name: "Portland cement 50kg".into(),
            description: None,
            category: "cement".into(),
            unit: "bag".into(),
            price: dec!(-1),
            discount: Decimal::ZERO,
            stock_quantity: 10,
            is_active: true,
            image_url: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn product_query_defaults_to_active_only() {
        let query: ProductQuery = serde_json::from_str("{}").expect("empty query parses");
        assert!(!query.include_inactive);
        assert!(query.page.is_none());
    }
}
