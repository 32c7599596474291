//! Payment processor session types and the single-use local receipts.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::cart::CartLine;
use crate::domain::order::ShippingAddress;

/// Convert a decimal major-unit amount into minor currency units
/// (dollars to cents), rounding half away from zero like the processor
/// expects.
pub fn amount_minor(total: Decimal) -> i64 {
    let cents = (total * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    cents.to_i64().unwrap_or(i64::MAX)
}

/// Client secret for a payment intent, scoped to one order.
#[derive(Clone, Debug, Deserialize)]
pub struct PaymentIntent {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

/// Client secret for a hosted checkout session.
#[derive(Clone, Debug, Deserialize)]
pub struct CheckoutSession {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Open,
    Complete,
}

/// Response of `GET /api/payments/session-status`.
#[derive(Clone, Debug, Deserialize)]
pub struct SessionStatus {
    pub status: SessionState,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default, rename = "orderId")]
    pub order_id: Option<String>,
    #[serde(default, rename = "orderStatus")]
    pub order_status: Option<String>,
    #[serde(default, rename = "paymentStatus")]
    pub payment_status: Option<String>,
}

/// Terminal signal delivered by the third-party payment widget.
#[derive(Clone, Debug, PartialEq)]
pub enum PaymentConfirmation {
    Succeeded { payment_intent_id: String },
    Failed { message: String },
}

/// The `currentOrder` snapshot persisted between checkout and completion.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingOrder {
    #[serde(rename = "orderId")]
    pub order_id: String,
    #[serde(rename = "shippingAddress")]
    pub shipping_address: ShippingAddress,
    #[serde(rename = "orderItems")]
    pub order_items: Vec<CartLine>,
    #[serde(rename = "totalAmount")]
    pub total_amount: Decimal,
}

/// The `paymentSuccess` snapshot written after a confirmed payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    #[serde(rename = "paymentIntentId")]
    pub payment_intent_id: String,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amount_minor_converts_and_rounds() {
        assert_eq!(amount_minor(Decimal::new(2000, 2)), 2000);
        assert_eq!(amount_minor(Decimal::new(1999, 2)), 1999);
        assert_eq!(amount_minor(Decimal::new(10005, 3)), 1001);
        assert_eq!(amount_minor(Decimal::ZERO), 0);
    }

    #[test]
    fn session_status_parses_backend_shape() {
        let status: SessionStatus = serde_json::from_str(
            r#"{"status":"complete","customer_email":"a@b.com","orderId":"o1","orderStatus":"PAID","paymentStatus":"PAID"}"#,
        )
        .unwrap();
        assert_eq!(status.status, SessionState::Complete);
        assert_eq!(status.order_id.as_deref(), Some("o1"));
    }

    #[test]
    fn open_session_state_parses() {
        let status: SessionStatus = serde_json::from_str(r#"{"status":"open"}"#).unwrap();
        assert_eq!(status.status, SessionState::Open);
    }
}
