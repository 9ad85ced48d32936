//! Order status engine.
//!
//! Pure rules over an order snapshot: which review step applies, which
//! actions are enabled and which status transitions are legal. Every
//! mutation in [`crate::services::orders`] goes through [`ensure_transition`]
//! and the `can_*` predicates; nothing else compares statuses.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entities::order::{Model as OrderModel, OrderStatus, PaymentType, TransactionStatus},
    errors::ServiceError,
};

/// Which review panel applies to the order in the admin console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStep {
    PaymentCheck,
    CancellationReview,
    Refund,
}

/// Progress indicator shown for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FulfillmentStep {
    CheckOrder,
    Shipping,
    Shipped,
    Summary,
    Refunding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPhase {
    WaitingPayment,
    AwaitingVerification,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
    UploadSlip,
    VerifyPayment,
    ConfirmOrder,
    UpdateShipping,
    ConfirmShipped,
    ConfirmDelivered,
    RequestCancel,
    ReviewCancel,
    Cancel,
    AttachRefundSlip,
    CompleteRefund,
}

/// Engine verdict attached to order responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusView {
    pub review_step: ReviewStep,
    pub fulfillment_step: FulfillmentStep,
    pub payment_phase: PaymentPhase,
    pub can_cancel: bool,
    pub can_confirm_shipped: bool,
    pub missing_shipping_fields: Vec<String>,
    pub actions: Vec<OrderAction>,
}

pub fn review_step(order: &OrderModel) -> ReviewStep {
    match order.status {
        OrderStatus::Refunding | OrderStatus::Refunded => ReviewStep::Refund,
        OrderStatus::ReqCancel => ReviewStep::CancellationReview,
        _ => ReviewStep::PaymentCheck,
    }
}

pub fn fulfillment_step(order: &OrderModel) -> FulfillmentStep {
    match order.status {
        OrderStatus::Pending => FulfillmentStep::CheckOrder,
        OrderStatus::Preparing => FulfillmentStep::Shipping,
        OrderStatus::ReqCancel => match order.status_before_cancel {
            Some(OrderStatus::Preparing) => FulfillmentStep::Shipping,
            _ => FulfillmentStep::CheckOrder,
        },
        OrderStatus::Shipped => FulfillmentStep::Shipped,
        OrderStatus::Delivered | OrderStatus::Cancelled => FulfillmentStep::Summary,
        OrderStatus::Refunding | OrderStatus::Refunded => FulfillmentStep::Refunding,
    }
}

pub fn payment_phase(order: &OrderModel) -> PaymentPhase {
    match order.payment_type {
        PaymentType::CashOnDelivery => {
            if order.transaction_status == TransactionStatus::Confirmed {
                PaymentPhase::Verified
            } else if order.is_confirmed {
                PaymentPhase::AwaitingVerification
            } else {
                PaymentPhase::WaitingPayment
            }
        }
        PaymentType::BankTransfer => {
            if !has_transfer_slip(order) {
                PaymentPhase::WaitingPayment
            } else if order.transaction_status == TransactionStatus::Rejected {
                PaymentPhase::Rejected
            } else if order.is_payment_checked
                && order.transaction_status == TransactionStatus::Confirmed
            {
                PaymentPhase::Verified
            } else {
                PaymentPhase::AwaitingVerification
            }
        }
    }
}

pub fn has_transfer_slip(order: &OrderModel) -> bool {
    non_empty(order.transaction_slip.as_deref())
}

fn non_empty(value: Option<&str>) -> bool {
    value.map(|v| !v.trim().is_empty()).unwrap_or(false)
}

/// Names of the required shipping fields that are still empty.
/// `tracking_number` is optional.
pub fn missing_shipping_fields(order: &OrderModel) -> Vec<&'static str> {
    let fields = [
        ("shipping_method", non_empty(order.shipping_method.as_deref())),
        (
            "shipping_provider",
            non_empty(order.shipping_provider.as_deref()),
        ),
        ("shipping_date", order.shipping_date.is_some()),
        ("vehicle_type", non_empty(order.vehicle_type.as_deref())),
        ("driver_name", non_empty(order.driver_name.as_deref())),
        ("driver_phone", non_empty(order.driver_phone.as_deref())),
    ];
    fields
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| name)
        .collect()
}

pub fn shipping_details_complete(order: &OrderModel) -> bool {
    missing_shipping_fields(order).is_empty()
}

fn payment_cleared(order: &OrderModel) -> bool {
    match order.payment_type {
        PaymentType::CashOnDelivery => payment_phase(order) != PaymentPhase::WaitingPayment,
        PaymentType::BankTransfer => {
            order.is_payment_checked
                && order.transaction_status == TransactionStatus::Confirmed
                && order.is_confirmed
        }
    }
}

pub fn can_upload_slip(order: &OrderModel) -> bool {
    order.payment_type == PaymentType::BankTransfer
        && order.status == OrderStatus::Pending
        && order.transaction_status != TransactionStatus::Confirmed
}

pub fn can_verify_payment(order: &OrderModel) -> bool {
    order.payment_type == PaymentType::BankTransfer
        && order.status == OrderStatus::Pending
        && has_transfer_slip(order)
        && order.transaction_status == TransactionStatus::Pending
}

pub fn can_confirm_order(order: &OrderModel) -> bool {
    if order.status != OrderStatus::Pending || order.is_confirmed {
        return false;
    }
    match order.payment_type {
        PaymentType::CashOnDelivery => true,
        PaymentType::BankTransfer => {
            order.is_payment_checked && order.transaction_status == TransactionStatus::Confirmed
        }
    }
}

pub fn can_update_shipping(order: &OrderModel) -> bool {
    matches!(order.status, OrderStatus::Preparing | OrderStatus::Shipped)
}

pub fn can_confirm_shipped(order: &OrderModel) -> bool {
    order.status == OrderStatus::Preparing
        && payment_cleared(order)
        && shipping_details_complete(order)
}

pub fn can_confirm_delivered(order: &OrderModel) -> bool {
    order.status == OrderStatus::Shipped
}

pub fn can_request_cancel(order: &OrderModel) -> bool {
    matches!(order.status, OrderStatus::Pending | OrderStatus::Preparing)
}

pub fn can_review_cancel(order: &OrderModel) -> bool {
    order.status == OrderStatus::ReqCancel
}

/// Cancellation is blocked once the goods left the warehouse and in every
/// terminal or refund state.
pub fn can_cancel(order: &OrderModel) -> bool {
    matches!(
        order.status,
        OrderStatus::Pending | OrderStatus::Preparing | OrderStatus::ReqCancel
    )
}

pub fn can_attach_refund_slip(order: &OrderModel) -> bool {
    order.status == OrderStatus::Refunding && !order.is_refunded
}

pub fn can_complete_refund(order: &OrderModel) -> bool {
    order.status == OrderStatus::Refunding
        && non_empty(order.refund_slip.as_deref())
        && !order.is_refunded
}

/// Where a cancellation lands: paid-by-transfer orders go through refund.
pub fn cancellation_target(order: &OrderModel) -> OrderStatus {
    if has_transfer_slip(order) {
        OrderStatus::Refunding
    } else {
        OrderStatus::Cancelled
    }
}

/// Whether an order in this status counts toward sales figures.
pub fn counts_as_sale(status: OrderStatus) -> bool {
    !matches!(
        status,
        OrderStatus::Cancelled | OrderStatus::Refunding | OrderStatus::Refunded
    )
}

/// The transition table.
pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::*;

    match from {
        Pending => matches!(to, Preparing | ReqCancel | Cancelled | Refunding),
        Preparing => matches!(to, Shipped | ReqCancel | Cancelled | Refunding),
        ReqCancel => matches!(to, Pending | Preparing | Cancelled | Refunding),
        Shipped => to == Delivered,
        Refunding => to == Refunded,
        Delivered | Cancelled | Refunded => false,
    }
}

/// Table check plus the refund-before-cancel invariant.
pub fn ensure_transition(order: &OrderModel, to: OrderStatus) -> Result<(), ServiceError> {
    if !is_valid_transition(order.status, to) {
        return Err(ServiceError::InvalidStatus(format!(
            "order {} cannot move from {} to {}",
            order.order_number, order.status, to
        )));
    }
    if to == OrderStatus::Cancelled && has_transfer_slip(order) {
        return Err(ServiceError::InvalidStatus(format!(
            "order {} has a transfer slip and must be refunded before it is cancelled",
            order.order_number
        )));
    }
    Ok(())
}

pub fn available_actions(order: &OrderModel) -> Vec<OrderAction> {
    let checks: [(OrderAction, fn(&OrderModel) -> bool); 11] = [
        (OrderAction::UploadSlip, can_upload_slip),
        (OrderAction::VerifyPayment, can_verify_payment),
        (OrderAction::ConfirmOrder, can_confirm_order),
        (OrderAction::UpdateShipping, can_update_shipping),
        (OrderAction::ConfirmShipped, can_confirm_shipped),
        (OrderAction::ConfirmDelivered, can_confirm_delivered),
        (OrderAction::RequestCancel, can_request_cancel),
        (OrderAction::ReviewCancel, can_review_cancel),
        (OrderAction::Cancel, can_cancel),
        (OrderAction::AttachRefundSlip, can_attach_refund_slip),
        (OrderAction::CompleteRefund, can_complete_refund),
    ];
    checks
        .into_iter()
        .filter(|(_, check)| check(order))
        .map(|(action, _)| action)
        .collect()
}

pub fn describe(order: &OrderModel) -> StatusView {
    StatusView {
        review_step: review_step(order),
        fulfillment_step: fulfillment_step(order),
        payment_phase: payment_phase(order),
        can_cancel: can_cancel(order),
        can_confirm_shipped: can_confirm_shipped(order),
        missing_shipping_fields: missing_shipping_fields(order)
            .into_iter()
            .map(str::to_string)
            .collect(),
        actions: available_actions(order),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, Utc};
    use proptest::prelude::*;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use sea_orm::Iterable;
    use uuid::Uuid;

    fn order(status: OrderStatus, payment_type: PaymentType) -> OrderModel {
        OrderModel {
            id: Uuid::new_v4(),
            order_number: "ORD-20240101-0001".into(),
            user_id: Uuid::new_v4(),
            status,
            status_before_cancel: None,
            cancel_reason: None,
            payment_type,
            transaction_slip: None,
            transaction_status: TransactionStatus::Pending,
            is_payment_checked: false,
            is_confirmed: false,
            shipping_address: "Somchai, 0812345678, 1 Main Rd, Bang Rak, Bangkok 10500".into(),
            shipping_method: None,
            shipping_provider: None,
            shipping_date: None,
            vehicle_type: None,
            driver_name: None,
            driver_phone: None,
            tracking_number: None,
            refund_slip: None,
            is_refunded: false,
            currency: "THB".into(),
            subtotal: Decimal::new(1000, 0),
            discount_total: Decimal::ZERO,
            shipping_fee: Decimal::ZERO,
            total_amount: Decimal::new(1000, 0),
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn verified_transfer(status: OrderStatus) -> OrderModel {
        let mut o = order(status, PaymentType::BankTransfer);
        o.transaction_slip = Some("slips/abc.png".into());
        o.transaction_status = TransactionStatus::Confirmed;
        o.is_payment_checked = true;
        o.is_confirmed = true;
        o
    }

    fn with_shipping(mut o: OrderModel) -> OrderModel {
        o.shipping_method = Some("truck".into());
        o.shipping_provider = Some("own fleet".into());
        o.shipping_date = NaiveDate::from_ymd_opt(2024, 3, 1);
        o.vehicle_type = Some("6-wheel".into());
        o.driver_name = Some("Anan".into());
        o.driver_phone = Some("0899999999".into());
        o
    }

    #[rstest]
    #[case(OrderStatus::Pending, ReviewStep::PaymentCheck)]
    #[case(OrderStatus::Preparing, ReviewStep::PaymentCheck)]
    #[case(OrderStatus::Shipped, ReviewStep::PaymentCheck)]
    #[case(OrderStatus::Delivered, ReviewStep::PaymentCheck)]
    #[case(OrderStatus::Cancelled, ReviewStep::PaymentCheck)]
    #[case(OrderStatus::ReqCancel, ReviewStep::CancellationReview)]
    #[case(OrderStatus::Refunding, ReviewStep::Refund)]
    #[case(OrderStatus::Refunded, ReviewStep::Refund)]
    fn review_step_by_status(#[case] status: OrderStatus, #[case] expected: ReviewStep) {
        assert_eq!(review_step(&order(status, PaymentType::BankTransfer)), expected);
    }

    #[rstest]
    #[case(OrderStatus::Pending, true)]
    #[case(OrderStatus::Preparing, true)]
    #[case(OrderStatus::ReqCancel, true)]
    #[case(OrderStatus::Shipped, false)]
    #[case(OrderStatus::Delivered, false)]
    #[case(OrderStatus::Refunding, false)]
    #[case(OrderStatus::Refunded, false)]
    #[case(OrderStatus::Cancelled, false)]
    fn cancel_allowed_only_before_shipping(#[case] status: OrderStatus, #[case] allowed: bool) {
        assert_eq!(can_cancel(&order(status, PaymentType::CashOnDelivery)), allowed);
    }

    #[test]
    fn cancellation_with_slip_routes_through_refund() {
        let mut o = order(OrderStatus::Pending, PaymentType::BankTransfer);
        assert_eq!(cancellation_target(&o), OrderStatus::Cancelled);

        o.transaction_slip = Some("slips/1.png".into());
        assert_eq!(cancellation_target(&o), OrderStatus::Refunding);
        assert_matches!(
            ensure_transition(&o, OrderStatus::Cancelled),
            Err(ServiceError::InvalidStatus(_))
        );
        assert!(ensure_transition(&o, OrderStatus::Refunding).is_ok());
    }

    #[test]
    fn blank_slip_does_not_count_as_attached() {
        let mut o = order(OrderStatus::Pending, PaymentType::BankTransfer);
        o.transaction_slip = Some("   ".into());
        assert!(!has_transfer_slip(&o));
        assert_eq!(cancellation_target(&o), OrderStatus::Cancelled);
    }

    #[test]
    fn confirm_shipped_needs_all_six_shipping_fields() {
        let mut o = verified_transfer(OrderStatus::Preparing);
        assert!(!can_confirm_shipped(&o));
        assert_eq!(missing_shipping_fields(&o).len(), 6);

        o = with_shipping(o);
        assert!(can_confirm_shipped(&o));

        o.driver_phone = Some(String::new());
        assert!(!can_confirm_shipped(&o));
        assert_eq!(missing_shipping_fields(&o), vec!["driver_phone"]);

        o.driver_phone = Some("0811111111".into());
        o.tracking_number = None;
        assert!(can_confirm_shipped(&o));
    }

    #[test]
    fn confirm_shipped_requires_verified_transfer() {
        let mut o = with_shipping(verified_transfer(OrderStatus::Preparing));
        o.is_payment_checked = false;
        assert!(!can_confirm_shipped(&o));

        o.is_payment_checked = true;
        o.transaction_status = TransactionStatus::Rejected;
        assert!(!can_confirm_shipped(&o));

        o.transaction_status = TransactionStatus::Confirmed;
        o.is_confirmed = false;
        assert!(!can_confirm_shipped(&o));
    }

    #[test]
    fn confirm_shipped_for_cod_requires_confirmation() {
        let mut o = with_shipping(order(OrderStatus::Preparing, PaymentType::CashOnDelivery));
        assert_eq!(payment_phase(&o), PaymentPhase::WaitingPayment);
        assert!(!can_confirm_shipped(&o));

        o.is_confirmed = true;
        assert_eq!(payment_phase(&o), PaymentPhase::AwaitingVerification);
        assert!(can_confirm_shipped(&o));
    }

    #[test]
    fn confirm_shipped_requires_preparing_status() {
        let o = with_shipping(verified_transfer(OrderStatus::Pending));
        assert!(!can_confirm_shipped(&o));
    }

    #[test]
    fn payment_phases_for_transfer() {
        let mut o = order(OrderStatus::Pending, PaymentType::BankTransfer);
        assert_eq!(payment_phase(&o), PaymentPhase::WaitingPayment);

        o.transaction_slip = Some("slips/1.png".into());
        assert_eq!(payment_phase(&o), PaymentPhase::AwaitingVerification);
        assert!(can_verify_payment(&o));

        o.is_payment_checked = true;
        o.transaction_status = TransactionStatus::Rejected;
        assert_eq!(payment_phase(&o), PaymentPhase::Rejected);
        assert!(can_upload_slip(&o));
        assert!(!can_verify_payment(&o));

        o.transaction_status = TransactionStatus::Confirmed;
        assert_eq!(payment_phase(&o), PaymentPhase::Verified);
        assert!(!can_upload_slip(&o));
        assert!(can_confirm_order(&o));
    }

    #[test]
    fn refund_completion_requires_slip_and_refunding_status() {
        let mut o = verified_transfer(OrderStatus::Refunding);
        assert!(can_attach_refund_slip(&o));
        assert!(!can_complete_refund(&o));

        o.refund_slip = Some("refunds/1.png".into());
        assert!(can_complete_refund(&o));

        o.is_refunded = true;
        assert!(!can_complete_refund(&o));

        let mut refunded = verified_transfer(OrderStatus::Refunded);
        refunded.refund_slip = Some("refunds/1.png".into());
        assert!(!can_complete_refund(&refunded));
    }

    #[rstest]
    #[case(None, FulfillmentStep::CheckOrder)]
    #[case(Some(OrderStatus::Pending), FulfillmentStep::CheckOrder)]
    #[case(Some(OrderStatus::Preparing), FulfillmentStep::Shipping)]
    fn cancellation_request_keeps_progress_of_interrupted_step(
        #[case] before: Option<OrderStatus>,
        #[case] expected: FulfillmentStep,
    ) {
        let mut o = order(OrderStatus::ReqCancel, PaymentType::CashOnDelivery);
        o.status_before_cancel = before;
        assert_eq!(fulfillment_step(&o), expected);
    }

    #[test]
    fn available_actions_for_fresh_transfer_order() {
        let o = order(OrderStatus::Pending, PaymentType::BankTransfer);
        assert_eq!(
            available_actions(&o),
            vec![
                OrderAction::UploadSlip,
                OrderAction::RequestCancel,
                OrderAction::Cancel
            ]
        );
    }

    #[test]
    fn describe_reports_missing_fields() {
        let view = describe(&verified_transfer(OrderStatus::Preparing));
        assert_eq!(view.review_step, ReviewStep::PaymentCheck);
        assert_eq!(view.fulfillment_step, FulfillmentStep::Shipping);
        assert!(!view.can_confirm_shipped);
        assert!(view.missing_shipping_fields.contains(&"vehicle_type".to_string()));
        assert!(view.actions.contains(&OrderAction::UpdateShipping));
    }

    #[test]
    fn terminal_states_admit_no_transitions() {
        for from in OrderStatus::iter().filter(|s| s.is_terminal()) {
            for to in OrderStatus::iter() {
                assert!(!is_valid_transition(from, to), "{from} -> {to}");
            }
        }
    }

    #[rstest]
    #[case(OrderStatus::Pending, true)]
    #[case(OrderStatus::ReqCancel, true)]
    #[case(OrderStatus::Delivered, true)]
    #[case(OrderStatus::Cancelled, false)]
    #[case(OrderStatus::Refunding, false)]
    #[case(OrderStatus::Refunded, false)]
    fn sales_exclude_cancelled_and_refunded(#[case] status: OrderStatus, #[case] counted: bool) {
        assert_eq!(counts_as_sale(status), counted);
    }

    fn status_strategy() -> impl Strategy<Value = OrderStatus> {
        prop::sample::select(OrderStatus::iter().collect::<Vec<_>>())
    }

    fn order_strategy() -> impl Strategy<Value = OrderModel> {
        (
            status_strategy(),
            any::<bool>(),
            any::<bool>(),
            prop::sample::select(vec![
                TransactionStatus::Pending,
                TransactionStatus::Confirmed,
                TransactionStatus::Rejected,
            ]),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(status, cod, slip, tx, checked, confirmed)| {
                let payment = if cod {
                    PaymentType::CashOnDelivery
                } else {
                    PaymentType::BankTransfer
                };
                let mut o = order(status, payment);
                if slip && !cod {
                    o.transaction_slip = Some("slips/p.png".into());
                }
                o.transaction_status = tx;
                o.is_payment_checked = checked;
                o.is_confirmed = confirmed;
                o
            })
    }

    proptest! {
        #[test]
        fn cancellation_target_is_always_a_legal_transition(o in order_strategy()) {
            if can_cancel(&o) {
                let target = cancellation_target(&o);
                prop_assert!(ensure_transition(&o, target).is_ok());
            }
        }

        #[test]
        fn no_direct_cancel_with_slip(o in order_strategy()) {
            if has_transfer_slip(&o) {
                prop_assert!(ensure_transition(&o, OrderStatus::Cancelled).is_err());
            }
        }

        #[test]
        fn shipped_and_delivered_never_cancellable(o in order_strategy()) {
            if matches!(o.status, OrderStatus::Shipped | OrderStatus::Delivered) {
                prop_assert!(!can_cancel(&o));
                prop_assert!(!available_actions(&o).contains(&OrderAction::Cancel));
            }
        }

        #[test]
        fn confirm_shipped_without_shipping_details_is_never_enabled(o in order_strategy()) {
            prop_assert!(!can_confirm_shipped(&o));
        }

        #[test]
        fn terminal_orders_expose_no_actions(o in order_strategy()) {
            if o.status.is_terminal() {
                prop_assert!(available_actions(&o).is_empty());
            }
        }
    }
}
