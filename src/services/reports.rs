use crate::{
    entities::{
        order::{self, OrderStatus, PaymentType},
        product, user,
    },
    errors::ServiceError,
    services::order_status,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Longest range a sales report may cover.
pub const MAX_REPORT_DAYS: i64 = 366;

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct SalesReportQuery {
    /// First day included (UTC)
    pub from: NaiveDate,
    /// Last day included (UTC)
    pub to: NaiveDate,
}

impl SalesReportQuery {
    /// Half-open UTC window `[from 00:00, to + 1 day 00:00)`.
    pub fn window(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), ServiceError> {
        if self.from > self.to {
            return Err(ServiceError::InvalidInput(
                "`from` must not be after `to`".to_string(),
            ));
        }
        if (self.to - self.from).num_days() >= MAX_REPORT_DAYS {
            return Err(ServiceError::InvalidInput(format!(
                "Report range cannot exceed {} days",
                MAX_REPORT_DAYS
            )));
        }
        let start = self.from.and_hms_opt(0, 0, 0).map(|d| d.and_utc());
        let end = self
            .to
            .checked_add_signed(Duration::days(1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|d| d.and_utc());
        match (start, end) {
            (Some(start), Some(end)) => Ok((start, end)),
            _ => Err(ServiceError::InvalidInput("Invalid report range".to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalesReportRow {
    pub order_id: Uuid,
    pub order_number: String,
    pub created_at: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub payment_type: PaymentType,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub discount_total: Decimal,
    pub shipping_fee: Decimal,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaymentTypeTotal {
    pub payment_type: PaymentType,
    pub order_count: u64,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SalesReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub rows: Vec<SalesReportRow>,
    pub totals_by_payment_type: Vec<PaymentTypeTotal>,
    pub grand_total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockReportRow {
    pub product_id: Uuid,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub unit: String,
    pub stock_quantity: i32,
    pub price: Decimal,
    pub is_active: bool,
    pub low_stock: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StockReport {
    pub low_stock_threshold: i32,
    pub rows: Vec<StockReportRow>,
}

/// Totals per payment type, bank transfer first. Types without orders are
/// reported with zero.
pub fn totals_by_payment_type(rows: &[SalesReportRow]) -> Vec<PaymentTypeTotal> {
    [PaymentType::BankTransfer, PaymentType::CashOnDelivery]
        .into_iter()
        .map(|payment_type| {
            let matching = rows.iter().filter(|r| r.payment_type == payment_type);
            PaymentTypeTotal {
                payment_type,
                order_count: matching.clone().count() as u64,
                total_amount: matching.map(|r| r.total_amount).sum(),
            }
        })
        .collect()
}

/// Tabular reports for printing.
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DatabaseConnection>,
}

impl ReportService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// One row per order placed in the range, cancelled and refunded orders
    /// excluded.
    #[instrument(skip(self))]
    pub async fn sales_report(&self, query: &SalesReportQuery) -> Result<SalesReport, ServiceError> {
        let (start, end) = query.window()?;

        let rows: Vec<SalesReportRow> = order::Entity::find()
            .filter(order::Column::CreatedAt.gte(start))
            .filter(order::Column::CreatedAt.lt(end))
            .find_also_related(user::Entity)
            .order_by_asc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?
            .into_iter()
            .filter(|(order, _)| order_status::counts_as_sale(order.status))
            .map(|(order, customer)| SalesReportRow {
                order_id: order.id,
                order_number: order.order_number,
                created_at: order.created_at,
                customer_name: customer.as_ref().map(|c| c.full_name()),
                customer_email: customer.map(|c| c.email),
                payment_type: order.payment_type,
                status: order.status,
                subtotal: order.subtotal,
                discount_total: order.discount_total,
                shipping_fee: order.shipping_fee,
                total_amount: order.total_amount,
            })
            .collect();

        let totals = totals_by_payment_type(&rows);
        let grand_total: Decimal = totals.iter().map(|t| t.total_amount).sum();
        info!(rows = rows.len(), from = %query.from, to = %query.to, "Sales report generated");

        Ok(SalesReport {
            from: query.from,
            to: query.to,
            rows,
            totals_by_payment_type: totals,
            grand_total,
        })
    }

    #[instrument(skip(self))]
    pub async fn stock_report(&self) -> Result<StockReport, ServiceError> {
        let settings = super::load_settings(&*self.db).await?;
        let threshold = settings.low_stock_threshold;

        let rows = product::Entity::find()
            .order_by_asc(product::Column::Category)
            .order_by_asc(product::Column::Name)
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|p| StockReportRow {
                low_stock: p.stock_quantity <= threshold,
                product_id: p.id,
                sku: p.sku,
                name: p.name,
                category: p.category,
                unit: p.unit,
                stock_quantity: p.stock_quantity,
                price: p.price,
                is_active: p.is_active,
            })
            .collect();

        Ok(StockReport {
            low_stock_threshold: threshold,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(payment_type: PaymentType, total: Decimal) -> SalesReportRow {
        SalesReportRow {
            order_id: Uuid::new_v4(),
            order_number: "ORD-20240301-AAAAAA".into(),
            created_at: Utc::now(),
            customer_name: None,
            customer_email: None,
            payment_type,
            status: OrderStatus::Delivered,
            subtotal: total,
            discount_total: Decimal::ZERO,
            shipping_fee: Decimal::ZERO,
            total_amount: total,
        }
    }

    #[test]
    fn totals_are_split_by_payment_type() {
        let totals = totals_by_payment_type(&[
            row(PaymentType::BankTransfer, dec!(1000)),
            row(PaymentType::CashOnDelivery, dec!(250)),
            row(PaymentType::BankTransfer, dec!(500)),
        ]);
        assert_eq!(
            totals,
            vec![
                PaymentTypeTotal {
                    payment_type: PaymentType::BankTransfer,
                    order_count: 2,
                    total_amount: dec!(1500),
                },
                PaymentTypeTotal {
                    payment_type: PaymentType::CashOnDelivery,
                    order_count: 1,
                    total_amount: dec!(250),
                },
            ]
        );
    }

    #[test]
    fn window_is_inclusive_of_last_day() {
        let query = SalesReportQuery {
            from: NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
            to: NaiveDate::from_ymd_opt(2024, 3, 31).expect("valid date"),
        };
        let (start, end) = query.window().expect("valid window");
        assert_eq!(start.to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-04-01T00:00:00+00:00");
    }

    #[test]
    fn reversed_window_is_rejected() {
        let query = SalesReportQuery {
            from: NaiveDate::from_ymd_opt(2024, 3, 2).expect("valid date"),
            to: NaiveDate::from_ymd_opt(2024, 3, 1).expect("valid date"),
        };
        assert!(matches!(query.window(), Err(ServiceError::InvalidInput(_))));
    }

    #[test]
    fn window_ending_on_last_representable_day_is_rejected() {
        let query = SalesReportQuery {
            from: NaiveDate::MAX,
            to: NaiveDate::MAX,
        };
        assert!(matches!(query.window(), Err(ServiceError::InvalidInput(_))));
    }
}
