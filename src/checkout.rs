//! Checkout submission: validate the address, post the order, stage the
//! payment handoff.
//!
//! The cart and the entered address are never touched by a failed submit;
//! retrying after an error re-sends an identical payload.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{info, warn};
use validator::{Validate, ValidationErrors};

use crate::api::Backend;
use crate::domain::cart::Cart;
use crate::domain::order::{OrderDraft, OrderItem, ShippingAddress};
use crate::domain::payment::PendingOrder;
use crate::storage::Receipts;
use crate::store::CartStore;
use crate::StorefrontError;

const ORDER_ID_MISSING_MESSAGE: &str =
    "Order was created but no order id was returned. Please try again.";
const ORDER_FAILED_MESSAGE: &str = "Failed to create order. Please try again.";

/// What the caller should do after a submission attempt.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The cart is empty; checkout is not reachable.
    RedirectHome,
    /// The address failed client-side validation; nothing was sent.
    Invalid(ValidationErrors),
    /// The backend rejected the order; cart and address are untouched.
    Failed { message: String },
    /// Order accepted; proceed to payment for this order id.
    PaymentReady { order_id: String },
}

pub struct CheckoutFlow {
    backend: Arc<dyn Backend>,
    cart: CartStore,
    receipts: Receipts,
}

impl CheckoutFlow {
    pub fn new(backend: Arc<dyn Backend>, cart: CartStore, receipts: Receipts) -> Self {
        Self {
            backend,
            cart,
            receipts,
        }
    }

    pub async fn submit(&self, address: &ShippingAddress) -> SubmitOutcome {
        let cart = self.cart.snapshot();
        if cart.is_empty() {
            return SubmitOutcome::RedirectHome;
        }
        if let Err(errors) = address.validate() {
            return SubmitOutcome::Invalid(errors);
        }

        let draft = order_draft(&cart, address);
        match self.backend.create_order(&draft).await {
            Ok(created) => {
                info!(order_id = %created.id, "order created");
                let pending = PendingOrder {
                    order_id: created.id.clone(),
                    shipping_address: address.clone(),
                    order_items: cart.lines().to_vec(),
                    total_amount: cart.total_price(),
                };
                if let Err(e) = self.receipts.save_pending_order(&pending) {
                    // Payment can still proceed from the in-memory state.
                    warn!(error = %e, "failed to persist pending order");
                }
                SubmitOutcome::PaymentReady {
                    order_id: created.id,
                }
            }
            Err(e) => {
                warn!(error = %e, "order creation failed");
                SubmitOutcome::Failed {
                    message: submit_error_message(&e),
                }
            }
        }
    }
}

fn order_draft(cart: &Cart, address: &ShippingAddress) -> OrderDraft {
    OrderDraft {
        shipping_address: address.clone(),
        order_items: cart
            .lines()
            .iter()
            .map(|line| OrderItem {
                product_id: line.product.id.clone(),
                quantity: line.quantity,
                price: line.product.price,
                name: line.product.name.clone(),
            })
            .collect(),
        total_amount: cart.total_price(),
    }
}

fn submit_error_message(error: &StorefrontError) -> String {
    match error {
        StorefrontError::Backend { message, .. } => message.clone(),
        StorefrontError::MalformedResponse(_) => ORDER_ID_MISSING_MESSAGE.to_string(),
        _ => ORDER_FAILED_MESSAGE.to_string(),
    }
}

/// Flatten validation errors into one message per field, first error wins.
/// Keys are the wire field names (`firstName`, `postalCode`, ...), matching
/// the serde renames on [`ShippingAddress`].
pub fn field_messages(errors: &ValidationErrors) -> BTreeMap<String, String> {
    errors
        .field_errors()
        .iter()
        .filter_map(|(field, errors)| {
            let message = errors.first().map(|e| {
                e.message
                    .as_deref()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{field} is invalid"))
            })?;
            Some((field.to_string(), message))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FakeBackend;
    use crate::domain::cart::ProductSnapshot;
    use rust_decimal::Decimal;

    fn address() -> ShippingAddress {
        ShippingAddress {
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane.doe@example.com".into(),
            phone: "+15551234567".into(),
            line_1: "123 Main Street".into(),
            line_2: None,
            city: "New York".into(),
            state: "NY".into(),
            postal_code: "10001".into(),
            country: "United States".into(),
        }
    }

    fn cart_with_socks() -> CartStore {
        let cart = CartStore::new();
        cart.add_item(ProductSnapshot {
            id: "p1".into(),
            name: "Wool Socks".into(),
            price: Decimal::new(1000, 2),
            image: None,
        });
        cart.add_item(ProductSnapshot {
            id: "p1".into(),
            name: "Wool Socks".into(),
            price: Decimal::new(1000, 2),
            image: None,
        });
        cart
    }

    fn flow(backend: FakeBackend) -> (CheckoutFlow, Arc<FakeBackend>, CartStore, Receipts) {
        let backend = Arc::new(backend);
        let cart = cart_with_socks();
        let receipts = Receipts::in_memory();
        (
            CheckoutFlow::new(backend.clone(), cart.clone(), receipts.clone()),
            backend,
            cart,
            receipts,
        )
    }

    #[tokio::test]
    async fn empty_cart_redirects_without_a_request() {
        let backend = Arc::new(FakeBackend::new());
        let flow = CheckoutFlow::new(backend.clone(), CartStore::new(), Receipts::in_memory());
        assert!(matches!(
            flow.submit(&address()).await,
            SubmitOutcome::RedirectHome
        ));
        assert!(backend.calls().order_payloads.is_empty());
    }

    #[tokio::test]
    async fn invalid_address_is_rejected_before_any_request() {
        let (flow, backend, _, _) = flow(FakeBackend::new());
        let mut bad = address();
        bad.email = "not-an-email".into();
        let outcome = flow.submit(&bad).await;
        let SubmitOutcome::Invalid(errors) = outcome else {
            panic!("expected validation failure");
        };
        assert!(field_messages(&errors).contains_key("email"));
        assert!(backend.calls().order_payloads.is_empty());
    }

    #[tokio::test]
    async fn field_messages_use_wire_field_names() {
        let (flow, _, _, _) = flow(FakeBackend::new());
        let mut bad = address();
        bad.first_name = String::new();
        bad.postal_code = "9".repeat(21);
        let SubmitOutcome::Invalid(errors) = flow.submit(&bad).await else {
            panic!("expected validation failure");
        };
        let messages = field_messages(&errors);
        assert_eq!(
            messages.get("firstName").map(String::as_str),
            Some("First name is required")
        );
        assert!(messages.contains_key("postalCode"));
        assert!(!messages.contains_key("first_name"));
    }

    #[tokio::test]
    async fn accepted_order_stages_payment_and_keeps_the_cart() {
        let (flow, backend, cart, receipts) = flow(FakeBackend::new().with_order_id("o42"));
        let outcome = flow.submit(&address()).await;
        let SubmitOutcome::PaymentReady { order_id } = outcome else {
            panic!("expected payment handoff");
        };
        assert_eq!(order_id, "o42");

        let payload = &backend.calls().order_payloads[0];
        assert_eq!(payload["orderItems"][0]["productId"], "p1");
        assert_eq!(payload["orderItems"][0]["quantity"], 2);
        assert_eq!(payload["totalAmount"], 20.0);

        // The cart is only cleared on payment confirmation, not here.
        assert_eq!(cart.unit_count(), 2);
        let pending = receipts.pending_order().unwrap().unwrap();
        assert_eq!(pending.order_id, "o42");
        assert_eq!(pending.total_amount, Decimal::new(2000, 2));
    }

    #[tokio::test]
    async fn backend_rejection_surfaces_its_message() {
        let (flow, _, cart, receipts) =
            flow(FakeBackend::new().with_order_rejection(400, "Product out of stock"));
        let outcome = flow.submit(&address()).await;
        let SubmitOutcome::Failed { message } = outcome else {
            panic!("expected failure");
        };
        assert_eq!(message, "Product out of stock");
        assert_eq!(cart.unit_count(), 2);
        assert!(receipts.pending_order().unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_order_id_is_a_failure_with_a_specific_message() {
        let (flow, _, _, _) = flow(FakeBackend::new().with_missing_order_id());
        let SubmitOutcome::Failed { message } = flow.submit(&address()).await else {
            panic!("expected failure");
        };
        assert_eq!(message, ORDER_ID_MISSING_MESSAGE);
    }

    #[tokio::test]
    async fn retry_after_failure_sends_an_identical_payload() {
        let (flow, backend, _, _) =
            flow(FakeBackend::new().with_order_rejection(503, "Service unavailable"));
        let _ = flow.submit(&address()).await;
        let _ = flow.submit(&address()).await;
        let payloads = backend.calls().order_payloads;
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0], payloads[1]);
    }
}
