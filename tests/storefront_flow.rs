//! Full checkout journey against the in-memory backend double: cart, order
//! submission, payment intent, confirmation and the completion summary.

use std::sync::Arc;

use rust_decimal::Decimal;

use mebius_storefront::api::FakeBackend;
use mebius_storefront::domain::payment::PaymentConfirmation;
use mebius_storefront::storage::Receipts;
use mebius_storefront::{
    CartStore, CheckoutFlow, CompletionView, PaymentFlow, PaymentState, ProductSnapshot,
    ShippingAddress, SubmitOutcome,
};

fn shipping_address() -> ShippingAddress {
    ShippingAddress {
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        email: "jane.doe@example.com".into(),
        phone: "+15551234567".into(),
        line_1: "123 Main Street".into(),
        line_2: Some("Apt 4B".into()),
        city: "New York".into(),
        state: "NY".into(),
        postal_code: "10001".into(),
        country: "United States".into(),
    }
}

fn cart_with_two_socks() -> CartStore {
    let cart = CartStore::new();
    let socks = ProductSnapshot {
        id: "p1".into(),
        name: "Wool Socks".into(),
        price: Decimal::new(1000, 2),
        image: None,
    };
    cart.add_item(socks.clone());
    cart.add_item(socks);
    cart
}

#[tokio::test]
async fn checkout_to_completion_happy_path() {
    let backend = Arc::new(
        FakeBackend::new()
            .with_order_id("o42")
            .with_client_secret("pi_secret_1"),
    );
    let cart = cart_with_two_socks();
    let receipts = Receipts::in_memory();

    // Submit the order.
    let checkout = CheckoutFlow::new(backend.clone(), cart.clone(), receipts.clone());
    let SubmitOutcome::PaymentReady { order_id } = checkout.submit(&shipping_address()).await
    else {
        panic!("expected order to be accepted");
    };
    assert_eq!(order_id, "o42");
    // Submission alone never clears the cart.
    assert_eq!(cart.unit_count(), 2);

    // Enter the payment step and create the intent: minor units of 2 x $10.
    let mut payment = PaymentFlow::new(
        backend.clone(),
        cart.clone(),
        receipts.clone(),
        Some(&order_id),
    );
    assert_eq!(payment.amount(), Decimal::new(2000, 2));
    let PaymentState::Ready { client_secret } = payment.init().await.clone() else {
        panic!("expected a client secret");
    };
    assert_eq!(client_secret, "pi_secret_1");
    assert_eq!(
        backend.calls().payment_intents,
        vec![("o42".to_string(), 2000)]
    );

    // Confirm: the cart empties and the receipt is recorded.
    payment.confirm(PaymentConfirmation::Succeeded {
        payment_intent_id: "pi_1".into(),
    });
    assert!(cart.is_empty());

    // The completion page shows both snapshots, then consumes them.
    let view = CompletionView::load(receipts.clone());
    assert!(view.is_ready());
    assert_eq!(view.order().unwrap().order_id, "o42");
    assert_eq!(view.receipt().unwrap().payment_intent_id, "pi_1");
    view.dismiss();
    assert!(!CompletionView::load(receipts).is_ready());
}

#[tokio::test]
async fn order_without_an_id_blocks_the_payment_handoff() {
    let backend = Arc::new(FakeBackend::new().with_missing_order_id());
    let cart = cart_with_two_socks();
    let checkout = CheckoutFlow::new(backend, cart.clone(), Receipts::in_memory());

    let SubmitOutcome::Failed { message } = checkout.submit(&shipping_address()).await else {
        panic!("expected a failed submission");
    };
    assert!(message.contains("no order id"));
    // The cart survives for a retry.
    assert_eq!(cart.unit_count(), 2);
}

#[tokio::test]
async fn undefined_order_id_param_never_reaches_the_processor() {
    let backend = Arc::new(FakeBackend::new());
    let mut payment = PaymentFlow::new(
        backend.clone(),
        CartStore::new(),
        Receipts::in_memory(),
        Some("undefined"),
    );
    assert_eq!(*payment.state(), PaymentState::MissingOrder);
    payment.init().await;
    assert!(backend.calls().payment_intents.is_empty());
}
