//! Order creation payloads and read-side order snapshots.
//!
//! Wire field names match the backend exactly; the order history types are
//! deliberately tolerant because the backend answers in more than one shape.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Shipping address, validated entirely client-side before submission.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct ShippingAddress {
    #[serde(rename = "firstName")]
    #[validate(length(min = 1, max = 50, message = "First name is required"))]
    pub first_name: String,

    #[serde(rename = "lastName")]
    #[validate(length(min = 1, max = 50, message = "Last name is required"))]
    pub last_name: String,

    #[validate(email(message = "Please enter a valid email address"))]
    pub email: String,

    #[validate(length(min = 1, max = 15, message = "Phone number is required"))]
    pub phone: String,

    #[validate(length(min = 1, max = 100, message = "Address is required"))]
    pub line_1: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub line_2: Option<String>,

    #[validate(length(min = 1, max = 50, message = "City is required"))]
    pub city: String,

    #[validate(length(min = 1, max = 50, message = "State/Province is required"))]
    pub state: String,

    #[serde(rename = "postalCode")]
    #[validate(length(min = 1, max = 20, message = "Postal code is required"))]
    pub postal_code: String,

    #[validate(length(min = 1, max = 50, message = "Country is required"))]
    pub country: String,
}

/// One ordered line as submitted to the backend: identity plus the unit
/// price and display name captured at order time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub name: String,
}

/// Body of `POST /api/orders`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(rename = "shippingAddress")]
    pub shipping_address: ShippingAddress,
    #[serde(rename = "orderItems")]
    pub order_items: Vec<OrderItem>,
    #[serde(rename = "totalAmount")]
    pub total_amount: Decimal,
}

/// Server-assigned identity of a freshly created order.
#[derive(Clone, Debug, PartialEq)]
pub struct CreatedOrder {
    pub id: String,
}

/// Read-only order snapshot from the order-history endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(
        default,
        rename = "shippingAddress",
        skip_serializing_if = "Option::is_none"
    )]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default, rename = "orderItems", alias = "items")]
    pub items: Vec<OrderItem>,
    #[serde(default, rename = "totalAmount", alias = "totalPrice")]
    pub total_amount: Decimal,
    #[serde(default, rename = "orderStatus", alias = "status")]
    pub status: Option<String>,
    #[serde(default, rename = "paymentStatus")]
    pub payment_status: Option<String>,
    #[serde(
        default,
        rename = "createdAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}
