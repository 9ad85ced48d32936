use crate::{
    entities::{
        order::{self, OrderStatus, PaymentType},
        order_product_detail, product,
    },
    errors::ServiceError,
    services::order_status,
};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseConnection, EntityTrait, Iterable, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, sync::Arc};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

/// Number of products listed in the top sellers panel.
pub const TOP_PRODUCT_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TopProduct {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity_sold: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummary {
    pub total_orders: u64,
    /// One entry per status, zero counts included
    pub orders_by_status: Vec<StatusCount>,
    pub delivered_revenue: Decimal,
    pub awaiting_payment_verification: u64,
    pub pending_cancellation_requests: u64,
    pub low_stock_products: u64,
    pub low_stock_threshold: i32,
    pub top_products: Vec<TopProduct>,
}

/// Folds sold lines into per-product totals, best sellers first.
pub fn rank_top_products(
    lines: impl IntoIterator<Item = order_product_detail::Model>,
    limit: usize,
) -> Vec<TopProduct> {
    let mut totals: HashMap<Uuid, TopProduct> = HashMap::new();
    for line in lines {
        let entry = totals.entry(line.product_id).or_insert_with(|| TopProduct {
            product_id: line.product_id,
            product_name: line.product_name.clone(),
            quantity_sold: 0,
            revenue: Decimal::ZERO,
        });
        entry.quantity_sold += i64::from(line.quantity);
        entry.revenue += line.line_total;
    }

    let mut ranked: Vec<TopProduct> = totals.into_values().collect();
    ranked.sort_by(|a, b| {
        b.quantity_sold
            .cmp(&a.quantity_sold)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    ranked.truncate(limit);
    ranked
}

#[derive(Clone)]
pub struct DashboardService {
    db: Arc<DatabaseConnection>,
}

impl DashboardService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn summary(&self) -> Result<DashboardSummary, ServiceError> {
        let db = &*self.db;

        let grouped: Vec<(OrderStatus, i64)> = order::Entity::find()
            .select_only()
            .column(order::Column::Status)
            .column_as(Expr::col(order::Column::Id).count(), "count")
            .group_by(order::Column::Status)
            .into_tuple()
            .all(db)
            .await?;
        let counts: HashMap<OrderStatus, u64> = grouped
            .into_iter()
            .map(|(status, count)| (status, count.max(0) as u64))
            .collect();
        let orders_by_status: Vec<StatusCount> = OrderStatus::iter()
            .map(|status| StatusCount {
                status,
                count: counts.get(&status).copied().unwrap_or(0),
            })
            .collect();
        let total_orders: u64 = orders_by_status.iter().map(|c| c.count).sum();

        let delivered: Vec<Decimal> = order::Entity::find()
            .select_only()
            .column(order::Column::TotalAmount)
            .filter(order::Column::Status.eq(OrderStatus::Delivered))
            .into_tuple()
            .all(db)
            .await?;
        let delivered_revenue: Decimal = delivered.into_iter().sum();

        let awaiting_payment_verification = order::Entity::find()
            .filter(order::Column::Status.eq(OrderStatus::Pending))
            .filter(order::Column::PaymentType.eq(PaymentType::BankTransfer))
            .all(db)
            .await?
            .iter()
            .filter(|o| order_status::can_verify_payment(o))
            .count() as u64;

        let settings = super::load_settings(db).await?;
        let low_stock_products = product::Entity::find()
            .filter(product::Column::IsActive.eq(true))
            .filter(product::Column::StockQuantity.lte(settings.low_stock_threshold))
            .count(db)
            .await?;

        let top_products = self.top_products(TOP_PRODUCT_LIMIT).await?;

        Ok(DashboardSummary {
            total_orders,
            pending_cancellation_requests: counts
                .get(&OrderStatus::ReqCancel)
                .copied()
                .unwrap_or(0),
            orders_by_status,
            delivered_revenue,
            awaiting_payment_verification,
            low_stock_products,
            low_stock_threshold: settings.low_stock_threshold,
            top_products,
        })
    }

    /// Best sellers by quantity over orders that still count as sales. The
    /// ranking is summed in the database; only the winners' lines are loaded.
    async fn top_products(&self, limit: usize) -> Result<Vec<TopProduct>, ServiceError> {
        let db = &*self.db;
        let excluded: Vec<OrderStatus> = OrderStatus::iter()
            .filter(|status| !order_status::counts_as_sale(*status))
            .collect();
        let sold_quantity = Expr::col((
            order_product_detail::Entity,
            order_product_detail::Column::Quantity,
        ))
        .sum();

        let ranked: Vec<(Uuid, i64)> = order_product_detail::Entity::find()
            .select_only()
            .column(order_product_detail::Column::ProductId)
            .column_as(sold_quantity.clone(), "quantity_sold")
            .inner_join(order::Entity)
            .filter(order::Column::Status.is_not_in(excluded.clone()))
            .group_by(order_product_detail::Column::ProductId)
            .order_by_desc(sold_quantity)
            .limit(limit as u64)
            .into_tuple()
            .all(db)
            .await?;

        if ranked.is_empty() {
            return Ok(Vec::new());
        }

        let product_ids: Vec<Uuid> = ranked.iter().map(|(id, _)| *id).collect();
        let lines = order_product_detail::Entity::find()
            .inner_join(order::Entity)
            .filter(order_product_detail::Column::ProductId.is_in(product_ids))
            .filter(order::Column::Status.is_not_in(excluded))
            .order_by_asc(order_product_detail::Column::ProductName)
            .all(db)
            .await?;

        Ok(rank_top_products(lines, limit))
    }
}
