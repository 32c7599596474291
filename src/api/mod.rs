//! Backend boundary.
//!
//! All response-shape polymorphism of the REST backend is normalized here;
//! nothing past this module ever sees a raw payload.

mod fake;
mod http;
pub(crate) mod normalize;

pub use fake::FakeBackend;
pub use http::HttpBackend;

use async_trait::async_trait;

use crate::domain::catalog::{Category, Product, ProductDraft};
use crate::domain::order::{CreatedOrder, Order, OrderDraft};
use crate::domain::payment::{CheckoutSession, PaymentIntent, SessionStatus};
use crate::listing::ProductFilter;
use crate::{Result, StorefrontError};

/// MIME types the image upload accepts.
pub const ALLOWED_IMAGE_TYPES: [&str; 4] =
    ["image/png", "image/jpeg", "image/jpg", "image/webp"];

/// Upload size ceiling: 5 MiB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Pre-signed upload destination for a product image.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct ImageUploadTarget {
    pub url: String,
    #[serde(rename = "publicURL")]
    pub public_url: String,
}

/// Optional bearer-token source. Absence of a session must never block
/// unauthenticated reads, so the token is always optional.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn bearer_token(&self) -> Option<String>;
}

/// No active user session.
pub struct NoAuth;

#[async_trait]
impl TokenProvider for NoAuth {
    async fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// Fixed token, e.g. read from the environment.
pub struct StaticToken(pub String);

#[async_trait]
impl TokenProvider for StaticToken {
    async fn bearer_token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// The REST backend as one trait, so flows and queries can run against the
/// HTTP client or an in-memory double.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_products(&self) -> Result<Vec<Product>>;
    async fn search_products(&self, term: &str) -> Result<Vec<Product>>;
    async fn filtered_products(&self, filter: &ProductFilter) -> Result<Vec<Product>>;
    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn create_product(&self, draft: &ProductDraft) -> Result<Product>;
    async fn request_image_upload(&self, file_type: &str) -> Result<ImageUploadTarget>;
    /// Raw `PUT` of the file body to the pre-signed URL; answers the public URL.
    async fn upload_image(
        &self,
        target: &ImageUploadTarget,
        file_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String>;
    async fn create_order(&self, draft: &OrderDraft) -> Result<CreatedOrder>;
    async fn my_orders(&self) -> Result<Vec<Order>>;
    async fn all_orders(&self) -> Result<Vec<Order>>;
    async fn create_payment_intent(
        &self,
        order_id: &str,
        amount_minor: i64,
    ) -> Result<PaymentIntent>;
    async fn create_checkout_session(&self, order_id: &str) -> Result<CheckoutSession>;
    async fn session_status(&self, session_id: &str) -> Result<SessionStatus>;
}

/// Client-side preflight for image uploads.
pub fn validate_image(file_type: &str, len: usize) -> Result<()> {
    if !ALLOWED_IMAGE_TYPES.contains(&file_type) {
        return Err(StorefrontError::InvalidImage(
            "Only PNG, JPG, JPEG, WEBP files are allowed".into(),
        ));
    }
    if len > MAX_IMAGE_BYTES {
        return Err(StorefrontError::InvalidImage(
            "File size must be <= 5MB".into(),
        ));
    }
    Ok(())
}

/// Two-step image upload: request a target, then push the raw bytes to it.
pub async fn put_image(backend: &dyn Backend, file_type: &str, bytes: Vec<u8>) -> Result<String> {
    validate_image(file_type, bytes.len())?;
    let target = backend.request_image_upload(file_type).await?;
    backend.upload_image(&target, file_type, bytes).await
}
