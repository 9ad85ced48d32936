use crate::{
    entities::{
        cart_item,
        order::{self, OrderStatus, PaymentType, TransactionStatus},
        order_product_detail, product,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::addresses::find_owned,
};
use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub address_id: Uuid,
    pub payment_type: PaymentType,
}

/// Money totals of an order, computed from its line snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub shipping_fee: Decimal,
    pub total_amount: Decimal,
}

/// Sums `(unit_price, discount, quantity)` lines and adds the shipping fee
/// returned by `shipping_for(merchandise_total)`.
pub fn compute_totals(
    lines: &[(Decimal, Decimal, i32)],
    shipping_for: impl Fn(Decimal) -> Decimal,
) -> OrderTotals {
    let mut subtotal = Decimal::ZERO;
    let mut discount_total = Decimal::ZERO;
    for (price, discount, quantity) in lines {
        let quantity = Decimal::from(*quantity);
        subtotal += *price * quantity;
        discount_total += (*discount).min(*price) * quantity;
    }
    let merchandise = subtotal - discount_total;
    let shipping_fee = shipping_for(merchandise);
    OrderTotals {
        subtotal,
        discount_total,
        shipping_fee,
        total_amount: merchandise + shipping_fee,
    }
}

/// Human-facing order reference, e.g. `ORD-20240301-K3Q9ZD`.
pub fn generate_order_number() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(6)
        .map(char::from)
        .collect();
    format!(
        "ORD-{}-{}",
        Utc::now().format("%Y%m%d"),
        suffix.to_uppercase()
    )
}

/// Turns the caller's cart into a pending order.
#[derive(Clone)]
pub struct CheckoutService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    currency: String,
}

impl CheckoutService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            db,
            event_sender,
            currency: currency.into(),
        }
    }

    /// Snapshots the cart into order lines, reserves stock and clears the
    /// cart in one transaction.
    #[instrument(skip(self, request), fields(user_id = %user_id, payment_type = %request.payment_type))]
    pub async fn checkout(
        &self,
        user_id: Uuid,
        request: CheckoutRequest,
    ) -> Result<order::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let settings = super::load_settings(&txn).await?;
        if request.payment_type == PaymentType::CashOnDelivery && !settings.cod_enabled {
            return Err(ServiceError::InvalidOperation(
                "Cash on delivery is currently unavailable".to_string(),
            ));
        }

        let address = find_owned(&txn, user_id, request.address_id).await?;

        let rows = cart_item::Entity::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .find_also_related(product::Entity)
            .order_by_asc(cart_item::Column::CreatedAt)
            .all(&txn)
            .await?;
        if rows.is_empty() {
            return Err(ServiceError::BadRequest("Cart is empty".to_string()));
        }

        let mut lines = Vec::with_capacity(rows.len());
        for (item, product) in rows {
            let product = product.ok_or_else(|| {
                ServiceError::NotFound(format!("Product {} not found", item.product_id))
            })?;
            if !product.is_active {
                return Err(ServiceError::InvalidOperation(format!(
                    "{} is no longer available",
                    product.name
                )));
            }
            if product.stock_quantity < item.quantity {
                return Err(ServiceError::InsufficientStock(format!(
                    "Only {} {} of {} left in stock",
                    product.stock_quantity, product.unit, product.name
                )));
            }
            lines.push((item, product));
        }

        let totals = compute_totals(
            &lines
                .iter()
                .map(|(item, product)| (product.price, product.discount, item.quantity))
                .collect::<Vec<_>>(),
            |merchandise| settings.shipping_fee_for(merchandise),
        );

        let now = Utc::now();
        let order_id = Uuid::new_v4();
        let order = order::ActiveModel {
            id: Set(order_id),
            order_number: Set(generate_order_number()),
            user_id: Set(user_id),
            status: Set(OrderStatus::Pending),
            status_before_cancel: Set(None),
            cancel_reason: Set(None),
            payment_type: Set(request.payment_type),
            transaction_slip: Set(None),
            transaction_status: Set(TransactionStatus::Pending),
            is_payment_checked: Set(false),
            is_confirmed: Set(false),
            shipping_address: Set(address.formatted()),
            shipping_method: Set(None),
            shipping_provider: Set(None),
            shipping_date: Set(None),
            vehicle_type: Set(None),
            driver_name: Set(None),
            driver_phone: Set(None),
            tracking_number: Set(None),
            refund_slip: Set(None),
            is_refunded: Set(false),
            currency: Set(self.currency.clone()),
            subtotal: Set(totals.subtotal),
            discount_total: Set(totals.discount_total),
            shipping_fee: Set(totals.shipping_fee),
            total_amount: Set(totals.total_amount),
            version: Set(1),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        for (item, product) in &lines {
            let discount = product.discount.min(product.price);
            order_product_detail::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(product.id),
                product_name: Set(product.name.clone()),
                sku: Set(product.sku.clone()),
                unit: Set(product.unit.clone()),
                quantity: Set(item.quantity),
                unit_price: Set(product.price),
                discount: Set(discount),
                line_total: Set((product.price - discount) * Decimal::from(item.quantity)),
            }
            .insert(&txn)
            .await?;

            // guarded decrement so a concurrent checkout cannot oversell
            let updated = product::Entity::update_many()
                .col_expr(
                    product::Column::StockQuantity,
                    Expr::col(product::Column::StockQuantity).sub(item.quantity),
                )
                .col_expr(product::Column::UpdatedAt, Expr::value(now))
                .filter(product::Column::Id.eq(product.id))
                .filter(product::Column::StockQuantity.gte(item.quantity))
                .exec(&txn)
                .await?;
            if updated.rows_affected == 0 {
                warn!(product_id = %product.id, "Stock changed during checkout");
                return Err(ServiceError::InsufficientStock(format!(
                    "{} is out of stock",
                    product.name
                )));
            }
        }

        cart_item::Entity::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderCreated {
                order_id,
                order_number: order.order_number.clone(),
                user_id,
            })
            .await;
        info!(order_id = %order_id, order_number = %order.order_number, total = %order.total_amount, "Order placed");
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn totals_include_discount_and_shipping() {
        let totals = compute_totals(
            &[(dec!(150), dec!(10), 4), (dec!(450), dec!(0), 2)],
            |_| dec!(300),
        );
        assert_eq!(totals.subtotal, dec!(1500));
        assert_eq!(totals.discount_total, dec!(40));
        assert_eq!(totals.shipping_fee, dec!(300));
        assert_eq!(totals.total_amount, dec!(1760));
    }

    #[test]
    fn shipping_sees_merchandise_after_discount() {
        let totals = compute_totals(&[(dec!(1000), dec!(100), 1)], |merchandise| {
            if merchandise >= dec!(1000) {
                Decimal::ZERO
            } else {
                dec!(50)
            }
        });
        assert_eq!(totals.shipping_fee, dec!(50));
        assert_eq!(totals.total_amount, dec!(950));
    }

    #[test]
    fn order_numbers_are_dated_and_uppercase() {
        let number = generate_order_number();
        let parts: Vec<&str> = number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }
}
