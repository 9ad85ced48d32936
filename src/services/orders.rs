use crate::{
    entities::{
        order::{self, OrderStatus, PaymentType, TransactionStatus},
        order_product_detail, product,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::order_status::{self, StatusView},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    sea_query::Expr, ActiveValue, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection,
    EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

/// Order with its line items and the engine's view of it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    #[serde(flatten)]
    pub order: order::Model,
    pub items: Vec<order_product_detail::Model>,
    pub status_view: StatusView,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderSummary {
    #[serde(flatten)]
    pub order: order::Model,
    pub status_view: StatusView,
}

impl From<order::Model> for OrderSummary {
    fn from(order: order::Model) -> Self {
        let status_view = order_status::describe(&order);
        Self { order, status_view }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct AdminOrderQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub status: Option<OrderStatus>,
    pub payment_type: Option<PaymentType>,
    /// Order number substring
    pub search: Option<String>,
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UploadSlipRequest {
    /// Reference to the uploaded transfer slip image
    #[validate(length(min = 1, max = 500, message = "Transfer slip is required"))]
    pub transaction_slip: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CancelRequest {
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderIdRequest {
    pub order_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentVerifyRequest {
    pub order_id: Uuid,
    /// Approve or reject the transfer slip
    pub approve: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct ShippingUpdateRequest {
    pub order_id: Uuid,
    #[validate(length(max = 100))]
    pub shipping_method: Option<String>,
    #[validate(length(max = 100))]
    pub shipping_provider: Option<String>,
    pub shipping_date: Option<NaiveDate>,
    #[validate(length(max = 100))]
    pub vehicle_type: Option<String>,
    #[validate(length(max = 200))]
    pub driver_name: Option<String>,
    #[validate(length(max = 20))]
    pub driver_phone: Option<String>,
    #[validate(length(max = 100))]
    pub tracking_number: Option<String>,
}

impl ShippingUpdateRequest {
    fn is_empty(&self) -> bool {
        self.shipping_method.is_none()
            && self.shipping_provider.is_none()
            && self.shipping_date.is_none()
            && self.vehicle_type.is_none()
            && self.driver_name.is_none()
            && self.driver_phone.is_none()
            && self.tracking_number.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AdminCancelRequest {
    pub order_id: Uuid,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ReviewCancelRequest {
    pub order_id: Uuid,
    pub approve: bool,
    #[validate(length(max = 500))]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RefundSlipRequest {
    pub order_id: Uuid,
    #[validate(length(min = 1, max = 500, message = "Refund slip is required"))]
    pub refund_slip: String,
}

fn not_allowed(action: &str, order: &order::Model) -> ServiceError {
    ServiceError::InvalidStatus(format!(
        "cannot {} order {} in status {}",
        action, order.order_number, order.status
    ))
}

/// Empty strings clear an optional text field.
fn optional_text(value: String) -> ActiveValue<Option<String>> {
    let trimmed = value.trim();
    Set(if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    })
}

/// Order reads and every order action. Each action checks the status engine,
/// applies its changes under an optimistic version check and commits in one
/// transaction.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    // ---- reads ----

    #[instrument(skip(self))]
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        page: u64,
        limit: u64,
    ) -> Result<(Vec<OrderSummary>, u64), ServiceError> {
        let paginator = order::Entity::find()
            .filter(order::Column::UserId.eq(user_id))
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db, limit);
        let total = paginator.num_items().await?;
        let orders = paginator.fetch_page(page.max(1) - 1).await?;
        Ok((orders.into_iter().map(OrderSummary::from).collect(), total))
    }

    #[instrument(skip(self))]
    pub async fn get_for_user(
        &self,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<OrderResponse, ServiceError> {
        let order = load(&*self.db, order_id, Some(user_id)).await?;
        self.to_response(&*self.db, order).await
    }

    #[instrument(skip(self))]
    pub async fn list_admin(
        &self,
        query: &AdminOrderQuery,
        limit: u64,
    ) -> Result<(Vec<OrderSummary>, u64), ServiceError> {
        let mut condition = Condition::all();
        if let Some(status) = query.status {
            condition = condition.add(order::Column::Status.eq(status));
        }
        if let Some(payment_type) = query.payment_type {
            condition = condition.add(order::Column::PaymentType.eq(payment_type));
        }
        if let Some(user_id) = query.user_id {
            condition = condition.add(order::Column::UserId.eq(user_id));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            condition = condition.add(order::Column::OrderNumber.contains(search.trim()));
        }

        let paginator = order::Entity::find()
            .filter(condition)
            .order_by_desc(order::Column::CreatedAt)
            .paginate(&*self.db, limit);
        let total = paginator.num_items().await?;
        let page = query.page.unwrap_or(1).max(1);
        let orders = paginator.fetch_page(page - 1).await?;
        Ok((orders.into_iter().map(OrderSummary::from).collect(), total))
    }

    #[instrument(skip(self))]
    pub async fn get_admin(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        let order = load(&*self.db, order_id, None).await?;
        self.to_response(&*self.db, order).await
    }

    async fn to_response<C: ConnectionTrait>(
        &self,
        conn: &C,
        order: order::Model,
    ) -> Result<OrderResponse, ServiceError> {
        let items = order_product_detail::Entity::find()
            .filter(order_product_detail::Column::OrderId.eq(order.id))
            .order_by_asc(order_product_detail::Column::ProductName)
            .all(conn)
            .await?;
        let status_view = order_status::describe(&order);
        Ok(OrderResponse {
            order,
            items,
            status_view,
        })
    }

    // ---- customer actions ----

    #[instrument(skip(self, request))]
    pub async fn upload_slip(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        request: UploadSlipRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;
        let response = self
            .mutate(order_id, Some(user_id), |order| {
                if !order_status::can_upload_slip(order) {
                    return Err(not_allowed("upload a transfer slip for", order));
                }
                Ok(order::ActiveModel {
                    transaction_slip: Set(Some(request.transaction_slip.trim().to_string())),
                    transaction_status: Set(TransactionStatus::Pending),
                    is_payment_checked: Set(false),
                    ..Default::default()
                })
            })
            .await?;
        self.event_sender
            .send_or_log(Event::PaymentSlipUploaded(order_id))
            .await;
        Ok(response)
    }

    /// Customer asks to cancel; the interrupted status is kept for a rejection.
    #[instrument(skip(self, request))]
    pub async fn request_cancel(
        &self,
        user_id: Uuid,
        order_id: Uuid,
        request: CancelRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;
        self.mutate(order_id, Some(user_id), |order| {
            if !order_status::can_request_cancel(order) {
                return Err(not_allowed("request cancellation of", order));
            }
            order_status::ensure_transition(order, OrderStatus::ReqCancel)?;
            Ok(order::ActiveModel {
                status: Set(OrderStatus::ReqCancel),
                status_before_cancel: Set(Some(order.status)),
                cancel_reason: Set(request.reason.clone()),
                ..Default::default()
            })
        })
        .await
    }

    // ---- order manager actions ----

    #[instrument(skip(self, request), fields(order_id = %request.order_id, approve = request.approve))]
    pub async fn verify_payment(
        &self,
        request: PaymentVerifyRequest,
    ) -> Result<OrderResponse, ServiceError> {
        let response = self
            .mutate(request.order_id, None, |order| {
                if !order_status::can_verify_payment(order) {
                    return Err(not_allowed("verify the payment of", order));
                }
                Ok(order::ActiveModel {
                    is_payment_checked: Set(true),
                    transaction_status: Set(if request.approve {
                        TransactionStatus::Confirmed
                    } else {
                        TransactionStatus::Rejected
                    }),
                    ..Default::default()
                })
            })
            .await?;
        self.event_sender
            .send_or_log(Event::PaymentVerified {
                order_id: request.order_id,
                approved: request.approve,
            })
            .await;
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn confirm_order(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        self.mutate(order_id, None, |order| {
            if !order_status::can_confirm_order(order) {
                return Err(not_allowed("confirm", order));
            }
            order_status::ensure_transition(order, OrderStatus::Preparing)?;
            Ok(order::ActiveModel {
                is_confirmed: Set(true),
                status: Set(OrderStatus::Preparing),
                ..Default::default()
            })
        })
        .await
    }

    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn update_shipping(
        &self,
        request: ShippingUpdateRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;
        if request.is_empty() {
            return Err(ServiceError::BadRequest(
                "At least one shipping field is required".to_string(),
            ));
        }
        let order_id = request.order_id;
        let response = self
            .mutate(order_id, None, move |order| {
                if !order_status::can_update_shipping(order) {
                    return Err(not_allowed("update shipping for", order));
                }
                let mut changes = order::ActiveModel::default();
                if let Some(v) = request.shipping_method {
                    changes.shipping_method = optional_text(v);
                }
                if let Some(v) = request.shipping_provider {
                    changes.shipping_provider = optional_text(v);
                }
                if let Some(v) = request.shipping_date {
                    changes.shipping_date = Set(Some(v));
                }
                if let Some(v) = request.vehicle_type {
                    changes.vehicle_type = optional_text(v);
                }
                if let Some(v) = request.driver_name {
                    changes.driver_name = optional_text(v);
                }
                if let Some(v) = request.driver_phone {
                    changes.driver_phone = optional_text(v);
                }
                if let Some(v) = request.tracking_number {
                    changes.tracking_number = optional_text(v);
                }
                Ok(changes)
            })
            .await?;
        self.event_sender
            .send_or_log(Event::ShippingUpdated(order_id))
            .await;
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn confirm_shipped(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        self.mutate(order_id, None, |order| {
            if !order_status::can_confirm_shipped(order) {
                let missing = order_status::missing_shipping_fields(order);
                if order.status == OrderStatus::Preparing && !missing.is_empty() {
                    return Err(ServiceError::InvalidStatus(format!(
                        "order {} is missing shipping details: {}",
                        order.order_number,
                        missing.join(", ")
                    )));
                }
                return Err(not_allowed("ship", order));
            }
            order_status::ensure_transition(order, OrderStatus::Shipped)?;
            Ok(order::ActiveModel {
                status: Set(OrderStatus::Shipped),
                ..Default::default()
            })
        })
        .await
    }

    /// Marks delivery. Cash collected on delivery confirms the transaction.
    #[instrument(skip(self))]
    pub async fn confirm_delivered(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        self.mutate(order_id, None, |order| {
            if !order_status::can_confirm_delivered(order) {
                return Err(not_allowed("deliver", order));
            }
            order_status::ensure_transition(order, OrderStatus::Delivered)?;
            let mut changes = order::ActiveModel {
                status: Set(OrderStatus::Delivered),
                ..Default::default()
            };
            if order.payment_type == PaymentType::CashOnDelivery {
                changes.transaction_status = Set(TransactionStatus::Confirmed);
                changes.is_payment_checked = Set(true);
            }
            Ok(changes)
        })
        .await
    }

    /// Approve sends the order to its cancellation target; reject restores
    /// the status the request interrupted.
    #[instrument(skip(self, request), fields(order_id = %request.order_id, approve = request.approve))]
    pub async fn review_cancel(
        &self,
        request: ReviewCancelRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;
        self.mutate(request.order_id, None, |order| {
            if !order_status::can_review_cancel(order) {
                return Err(not_allowed("review the cancellation of", order));
            }
            let target = if request.approve {
                order_status::cancellation_target(order)
            } else {
                order.status_before_cancel.unwrap_or(OrderStatus::Pending)
            };
            order_status::ensure_transition(order, target)?;
            let mut changes = order::ActiveModel {
                status: Set(target),
                status_before_cancel: Set(None),
                ..Default::default()
            };
            if let Some(reason) = request.reason.clone() {
                changes.cancel_reason = Set(Some(reason));
            }
            Ok(changes)
        })
        .await
    }

    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn cancel(&self, request: AdminCancelRequest) -> Result<OrderResponse, ServiceError> {
        request.validate()?;
        self.mutate(request.order_id, None, |order| {
            if !order_status::can_cancel(order) {
                return Err(not_allowed("cancel", order));
            }
            let target = order_status::cancellation_target(order);
            order_status::ensure_transition(order, target)?;
            let mut changes = order::ActiveModel {
                status: Set(target),
                status_before_cancel: Set(None),
                ..Default::default()
            };
            if let Some(reason) = request.reason.clone() {
                changes.cancel_reason = Set(Some(reason));
            }
            Ok(changes)
        })
        .await
    }

    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn attach_refund_slip(
        &self,
        request: RefundSlipRequest,
    ) -> Result<OrderResponse, ServiceError> {
        request.validate()?;
        let response = self
            .mutate(request.order_id, None, |order| {
                if !order_status::can_attach_refund_slip(order) {
                    return Err(not_allowed("attach a refund slip to", order));
                }
                Ok(order::ActiveModel {
                    refund_slip: Set(Some(request.refund_slip.trim().to_string())),
                    ..Default::default()
                })
            })
            .await?;
        self.event_sender
            .send_or_log(Event::RefundSlipAttached(request.order_id))
            .await;
        Ok(response)
    }

    #[instrument(skip(self))]
    pub async fn complete_refund(&self, order_id: Uuid) -> Result<OrderResponse, ServiceError> {
        self.mutate(order_id, None, |order| {
            if !order_status::can_complete_refund(order) {
                return Err(not_allowed("complete the refund of", order));
            }
            order_status::ensure_transition(order, OrderStatus::Refunded)?;
            Ok(order::ActiveModel {
                status: Set(OrderStatus::Refunded),
                is_refunded: Set(true),
                ..Default::default()
            })
        })
        .await
    }

    /// Loads the order, lets `decide` produce the changed columns, writes them
    /// under the version check and restocks when the order left the fulfillment
    /// path. A status change emits `OrderStatusChanged` after commit.
    async fn mutate<F>(
        &self,
        order_id: Uuid,
        owner: Option<Uuid>,
        decide: F,
    ) -> Result<OrderResponse, ServiceError>
    where
        F: FnOnce(&order::Model) -> Result<order::ActiveModel, ServiceError>,
    {
        let txn = self.db.begin().await?;
        let current = load(&txn, order_id, owner).await?;
        let changes = decide(&current)?;

        let updated = save(&txn, &current, changes).await?;
        let cancelled = updated.status != current.status
            && matches!(updated.status, OrderStatus::Cancelled | OrderStatus::Refunding);
        if cancelled {
            restock(&txn, updated.id).await?;
        }
        let response = self.to_response(&txn, updated).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, order_id = %order_id, "Failed to commit order update");
            ServiceError::DatabaseError(e)
        })?;

        let new_status = response.order.status;
        if new_status != current.status {
            info!(
                order_id = %order_id,
                old_status = %current.status,
                new_status = %new_status,
                "Order status changed"
            );
            self.event_sender
                .send_or_log(Event::OrderStatusChanged {
                    order_id,
                    old_status: current.status.to_string(),
                    new_status: new_status.to_string(),
                })
                .await;
        }
        Ok(response)
    }
}

/// Fetches an order, optionally restricted to its owner. Orders of other users
/// are reported as missing.
async fn load<C: ConnectionTrait>(
    conn: &C,
    order_id: Uuid,
    owner: Option<Uuid>,
) -> Result<order::Model, ServiceError> {
    let mut query = order::Entity::find_by_id(order_id);
    if let Some(owner) = owner {
        query = query.filter(order::Column::UserId.eq(owner));
    }
    query
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", order_id)))
}

/// Writes `changes` only if nobody else bumped the version in between.
async fn save<C: ConnectionTrait>(
    conn: &C,
    current: &order::Model,
    mut changes: order::ActiveModel,
) -> Result<order::Model, ServiceError> {
    changes.version = Set(current.version + 1);
    changes.updated_at = Set(Utc::now());

    let result = order::Entity::update_many()
        .set(changes)
        .filter(order::Column::Id.eq(current.id))
        .filter(order::Column::Version.eq(current.version))
        .exec(conn)
        .await?;
    if result.rows_affected == 0 {
        warn!(order_id = %current.id, version = current.version, "Order modified concurrently");
        return Err(ServiceError::ConcurrentModification(current.id));
    }
    load(conn, current.id, None).await
}

/// Returns the ordered quantities to product stock.
async fn restock<C: ConnectionTrait>(conn: &C, order_id: Uuid) -> Result<(), ServiceError> {
    let lines = order_product_detail::Entity::find()
        .filter(order_product_detail::Column::OrderId.eq(order_id))
        .all(conn)
        .await?;
    let now = Utc::now();
    for line in lines {
        product::Entity::update_many()
            .col_expr(
                product::Column::StockQuantity,
                Expr::col(product::Column::StockQuantity).add(line.quantity),
            )
            .col_expr(product::Column::UpdatedAt, Expr::value(now))
            .filter(product::Column::Id.eq(line.product_id))
            .exec(conn)
            .await?;
    }
    info!(order_id = %order_id, "Order quantities returned to stock");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_text_clears_field() {
        assert_eq!(optional_text("   ".into()), Set(None));
        assert_eq!(
            optional_text(" Kerry Express ".into()),
            Set(Some("Kerry Express".to_string()))
        );
    }

    #[test]
    fn shipping_update_needs_a_field() {
        let request = ShippingUpdateRequest {
            order_id: Uuid::new_v4(),
            ..Default::default()
        };
        assert!(request.is_empty());
        let request = ShippingUpdateRequest {
            driver_name: Some("Anan".into()),
            ..request
        };
        assert!(!request.is_empty());
    }
}
