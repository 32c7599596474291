//! Payment step: create the processor intent for an order and react to the
//! widget's terminal signal.
//!
//! The intent is created at most once per entry into the step; the cart is
//! cleared only on confirmed payment, never on entry or failure.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::api::Backend;
use crate::domain::payment::{amount_minor, PaymentConfirmation, PaymentReceipt};
use crate::storage::Receipts;
use crate::store::CartStore;
use crate::StorefrontError;

/// Navigation can hand over the literal string "undefined" where an order id
/// was never set; it must be treated as absent, not as an id.
const UNDEFINED_ORDER_ID: &str = "undefined";

const INTENT_FAILED_MESSAGE: &str = "Failed to initialize payment. Please try again.";

#[derive(Clone, Debug, PartialEq)]
pub enum PaymentState {
    /// No usable order id; the step should send the user back to checkout.
    MissingOrder,
    Idle,
    Initializing,
    Ready {
        client_secret: String,
    },
    Failed {
        message: String,
    },
    Complete {
        order_id: String,
        payment_intent_id: String,
    },
}

pub struct PaymentFlow {
    backend: Arc<dyn Backend>,
    cart: CartStore,
    receipts: Receipts,
    order_id: Option<String>,
    amount: Decimal,
    state: PaymentState,
    last_error: Option<String>,
}

impl PaymentFlow {
    /// `order_id_param` is the raw route parameter; blank or the literal
    /// "undefined" means there is no order to pay for. The charge amount is
    /// the staged order total, falling back to the live cart total.
    pub fn new(
        backend: Arc<dyn Backend>,
        cart: CartStore,
        receipts: Receipts,
        order_id_param: Option<&str>,
    ) -> Self {
        let order_id = order_id_param
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != UNDEFINED_ORDER_ID)
            .map(str::to_string);
        let amount = receipts
            .pending_order()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to load pending order");
                None
            })
            .map(|pending| pending.total_amount)
            .unwrap_or_else(|| cart.total_price());
        let state = if order_id.is_some() {
            PaymentState::Idle
        } else {
            PaymentState::MissingOrder
        };
        Self {
            backend,
            cart,
            receipts,
            order_id,
            amount,
            state,
            last_error: None,
        }
    }

    pub fn state(&self) -> &PaymentState {
        &self.state
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// The widget's last declined-payment message, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Create the payment intent. Latched: once a secret is held (or the
    /// order id is missing) further calls do nothing, so re-renders and
    /// re-entries never produce duplicate intents.
    pub async fn init(&mut self) -> &PaymentState {
        let order_id = match (&self.state, &self.order_id) {
            (PaymentState::Idle | PaymentState::Failed { .. }, Some(id)) => id.clone(),
            _ => return &self.state,
        };
        self.state = PaymentState::Initializing;
        let minor = amount_minor(self.amount);
        self.state = match self.backend.create_payment_intent(&order_id, minor).await {
            Ok(intent) => {
                info!(%order_id, amount_minor = minor, "payment intent created");
                PaymentState::Ready {
                    client_secret: intent.client_secret,
                }
            }
            Err(e) => {
                warn!(error = %e, %order_id, "payment intent creation failed");
                PaymentState::Failed {
                    message: intent_error_message(&e),
                }
            }
        };
        &self.state
    }

    /// Apply the widget's terminal signal. Success clears the cart and
    /// records the receipt; a decline keeps the secret so the same intent
    /// can be retried with another payment method.
    pub fn confirm(&mut self, confirmation: PaymentConfirmation) -> &PaymentState {
        match confirmation {
            PaymentConfirmation::Succeeded { payment_intent_id } => {
                let Some(order_id) = self.order_id.clone() else {
                    return &self.state;
                };
                self.cart.clear();
                let receipt = PaymentReceipt {
                    payment_intent_id: payment_intent_id.clone(),
                    amount: self.amount,
                    timestamp: Utc::now(),
                };
                if let Err(e) = self.receipts.save_payment_receipt(&receipt) {
                    warn!(error = %e, "failed to persist payment receipt");
                }
                info!(%order_id, %payment_intent_id, "payment confirmed");
                self.last_error = None;
                self.state = PaymentState::Complete {
                    order_id,
                    payment_intent_id,
                };
            }
            PaymentConfirmation::Failed { message } => {
                warn!(%message, "payment declined");
                self.last_error = Some(message);
            }
        }
        &self.state
    }
}

fn intent_error_message(error: &StorefrontError) -> String {
    match error {
        StorefrontError::Backend { message, .. } => message.clone(),
        _ => INTENT_FAILED_MESSAGE.to_string(),
    }
}
