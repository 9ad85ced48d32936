use crate::{
    entities::{cart_item, product},
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Upper bound on a single cart line.
pub const MAX_LINE_QUANTITY: i32 = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddToCartRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1, max = 10000, message = "Quantity must be between 1 and 10000"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SetQuantityRequest {
    /// Zero removes the line
    #[validate(range(min = 0, max = 10000))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartLine {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub unit: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub discount: Decimal,
    pub line_total: Decimal,
    pub in_stock: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub total: Decimal,
}

impl CartView {
    fn from_lines(items: Vec<CartLine>) -> Self {
        let subtotal: Decimal = items
            .iter()
            .map(|l| l.unit_price * Decimal::from(l.quantity))
            .sum();
        let discount_total: Decimal = items
            .iter()
            .map(|l| l.discount * Decimal::from(l.quantity))
            .sum();
        let total: Decimal = items.iter().map(|l| l.line_total).sum();
        Self {
            items,
            subtotal,
            discount_total,
            total,
        }
    }
}

fn cart_line(item: &cart_item::Model, product: &product::Model) -> CartLine {
    CartLine {
        product_id: product.id,
        sku: product.sku.clone(),
        name: product.name.clone(),
        unit: product.unit.clone(),
        quantity: item.quantity,
        unit_price: product.price,
        discount: product.discount,
        line_total: product.effective_unit_price() * Decimal::from(item.quantity),
        in_stock: product.stock_quantity >= item.quantity,
        is_active: product.is_active,
    }
}

/// Per-user shopping cart stored as one row per product.
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
}

impl CartService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn view(&self, user_id: Uuid) -> Result<CartView, ServiceError> {
        let rows = cart_item::Entity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .find_also_related(product::Entity)
            .order_by_asc(cart_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let lines = rows
            .iter()
            .filter_map(|(item, product)| product.as_ref().map(|p| cart_line(item, p)))
            .collect();
        Ok(CartView::from_lines(lines))
    }

    /// Adds a product, merging with an existing line for the same product.
    #[instrument(skip(self, request), fields(product_id = %request.product_id))]
    pub async fn add_item(
        &self,
        user_id: Uuid,
        request: AddToCartRequest,
    ) -> Result<CartView, ServiceError> {
        request.validate()?;
        let product = product::Entity::find_by_id(request.product_id)
            .one(&*self.db)
            .await?
            .filter(|p| p.is_active)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", request.product_id))
            })?;

        let now = Utc::now();
        match self.find_line(user_id, product.id).await? {
            Some(existing) => {
                let quantity = existing.quantity + request.quantity;
                if quantity > MAX_LINE_QUANTITY {
                    return Err(ServiceError::InvalidInput(format!(
                        "Quantity cannot exceed {}",
                        MAX_LINE_QUANTITY
                    )));
                }
                let mut active: cart_item::ActiveModel = existing.into();
                active.quantity = Set(quantity);
                active.updated_at = Set(now);
                active.update(&*self.db).await?;
            }
            None => {
                cart_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(user_id),
                    product_id: Set(product.id),
                    quantity: Set(request.quantity),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(&*self.db)
                .await?;
            }
        }

        info!(user_id = %user_id, product_id = %product.id, "Cart item added");
        self.view(user_id).await
    }

    #[instrument(skip(self, request))]
    pub async fn set_quantity(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        request: SetQuantityRequest,
    ) -> Result<CartView, ServiceError> {
        request.validate()?;
        let existing = self.find_line(user_id, product_id).await?.ok_or_else(|| {
            ServiceError::NotFound(format!("Product {} is not in the cart", product_id))
        })?;

        if request.quantity == 0 {
            cart_item::Entity::delete_by_id(existing.id)
                .exec(&*self.db)
                .await?;
        } else {
            let mut active: cart_item::ActiveModel = existing.into();
            active.quantity = Set(request.quantity);
            active.updated_at = Set(Utc::now());
            active.update(&*self.db).await?;
        }
        self.view(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn remove_item(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<CartView, ServiceError> {
        let result = cart_item::Entity::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .exec(&*self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Product {} is not in the cart",
                product_id
            )));
        }
        self.view(user_id).await
    }

    #[instrument(skip(self))]
    pub async fn clear(&self, user_id: Uuid) -> Result<(), ServiceError> {
        cart_item::Entity::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .exec(&*self.db)
            .await?;
        Ok(())
    }

    async fn find_line(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<cart_item::Model>, ServiceError> {
        Ok(cart_item::Entity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .filter(cart_item::Column::ProductId.eq(product_id))
            .one(&*self.db)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn product(price: Decimal, discount: Decimal, stock: i32) -> product::Model {
        let now = Utc::now();
        product::Model {
            id: Uuid::new_v4(),
            sku: "SAND-M3".into(),
            name: "River sand".into(),
            description: None,
            category: "aggregate".into(),
            unit: "m3".into(),
            price,
            discount,
            stock_quantity: stock,
            is_active: true,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn item(product_id: Uuid, quantity: i32) -> cart_item::Model {
        let now = Utc::now();
        cart_item::Model {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            product_id,
            quantity,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn line_totals_apply_per_unit_discount() {
        let sand = product(dec!(450), dec!(50), 100);
        let line = cart_line(&item(sand.id, 3), &sand);
        assert_eq!(line.line_total, dec!(1200));
        assert!(line.in_stock);
    }

    #[test]
    fn cart_totals_sum_lines() {
        let sand = product(dec!(450), dec!(50), 2);
        let cement = product(dec!(150), dec!(0), 100);
        let view = CartView::from_lines(vec![
            cart_line(&item(sand.id, 3), &sand),
            cart_line(&item(cement.id, 10), &cement),
        ]);
        assert_eq!(view.subtotal, dec!(2850));
        assert_eq!(view.discount_total, dec!(150));
        assert_eq!(view.total, dec!(2700));
        assert!(!view.items[0].in_stock);
    }
}
