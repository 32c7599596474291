//! In-memory [`Backend`] double for tests and offline development.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::api::{Backend, ImageUploadTarget};
use crate::domain::catalog::{Category, Product, ProductDraft};
use crate::domain::order::{CreatedOrder, Order, OrderDraft};
use crate::domain::payment::{CheckoutSession, PaymentIntent, SessionState, SessionStatus};
use crate::listing::ProductFilter;
use crate::{Result, StorefrontError};

#[derive(Clone, Debug, Default)]
enum OrderResponse {
    #[default]
    Accept,
    Id(String),
    MissingId,
    Reject {
        status: u16,
        message: String,
    },
}

/// Everything the double has been asked so far.
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    pub list_products: u32,
    pub search_terms: Vec<String>,
    pub filtered: u32,
    pub list_categories: u32,
    pub order_payloads: Vec<Value>,
    pub payment_intents: Vec<(String, i64)>,
    pub checkout_sessions: u32,
    pub session_status: u32,
    pub upload_targets: u32,
    pub uploads: u32,
}

#[derive(Default)]
pub struct FakeBackend {
    products: Vec<Product>,
    categories: Vec<Category>,
    fail_products: bool,
    fail_search: bool,
    fail_filtered: bool,
    order_response: OrderResponse,
    client_secret: Option<String>,
    intent_error: Option<String>,
    session_state: Option<SessionState>,
    calls: Mutex<CallLog>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_products_failure(mut self) -> Self {
        self.fail_products = true;
        self
    }

    pub fn with_search_failure(mut self) -> Self {
        self.fail_search = true;
        self
    }

    pub fn with_filtered_failure(mut self) -> Self {
        self.fail_filtered = true;
        self
    }

    pub fn with_order_id(mut self, id: &str) -> Self {
        self.order_response = OrderResponse::Id(id.to_string());
        self
    }

    /// Order creation succeeds at the HTTP level but the response carries no
    /// extractable id in any known shape.
    pub fn with_missing_order_id(mut self) -> Self {
        self.order_response = OrderResponse::MissingId;
        self
    }

    pub fn with_order_rejection(mut self, status: u16, message: &str) -> Self {
        self.order_response = OrderResponse::Reject {
            status,
            message: message.to_string(),
        };
        self
    }

    pub fn with_client_secret(mut self, secret: &str) -> Self {
        self.client_secret = Some(secret.to_string());
        self
    }

    pub fn with_intent_error(mut self, message: &str) -> Self {
        self.intent_error = Some(message.to_string());
        self
    }

    pub fn with_session_state(mut self, state: SessionState) -> Self {
        self.session_state = Some(state);
        self
    }

    pub fn calls(&self) -> CallLog {
        self.log(|_| {})
    }

    fn log(&self, f: impl FnOnce(&mut CallLog)) -> CallLog {
        let mut calls = match self.calls.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut calls);
        calls.clone()
    }

    fn unreachable_backend() -> StorefrontError {
        StorefrontError::Backend {
            status: 503,
            message: "Service unavailable".into(),
        }
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn list_products(&self) -> Result<Vec<Product>> {
        self.log(|c| c.list_products += 1);
        if self.fail_products {
            return Err(Self::unreachable_backend());
        }
        Ok(self.products.clone())
    }

    async fn search_products(&self, term: &str) -> Result<Vec<Product>> {
        self.log(|c| c.search_terms.push(term.to_string()));
        if self.fail_search {
            return Err(Self::unreachable_backend());
        }
        Ok(self
            .products
            .iter()
            .filter(|p| p.matches_term(term))
            .cloned()
            .collect())
    }

    async fn filtered_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        self.log(|c| c.filtered += 1);
        if self.fail_filtered {
            return Err(Self::unreachable_backend());
        }
        let page = filter.apply(&self.products, &self.categories);
        Ok(page.items)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.log(|c| c.list_categories += 1);
        Ok(self.categories.clone())
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product> {
        Ok(Product {
            id: format!("fake-{}", self.products.len() + 1),
            name: draft.name.clone(),
            description: draft.description.clone(),
            price: draft.price,
            image: Some(draft.image.clone()),
            category_id: Some(draft.category_id.clone()),
            color: None,
            stock: Some(draft.stock),
            created_at: None,
        })
    }

    async fn request_image_upload(&self, _file_type: &str) -> Result<ImageUploadTarget> {
        self.log(|c| c.upload_targets += 1);
        Ok(ImageUploadTarget {
            url: "https://uploads.example.test/put/abc".into(),
            public_url: "https://cdn.example.test/abc".into(),
        })
    }

    async fn upload_image(
        &self,
        target: &ImageUploadTarget,
        _file_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String> {
        self.log(|c| c.uploads += 1);
        Ok(target.public_url.clone())
    }

    async fn create_order(&self, draft: &OrderDraft) -> Result<CreatedOrder> {
        self.log(|c| c.order_payloads.push(serde_json::to_value(draft).unwrap_or_default()));
        match &self.order_response {
            OrderResponse::Accept => Ok(CreatedOrder { id: "order-1".into() }),
            OrderResponse::Id(id) => Ok(CreatedOrder { id: id.clone() }),
            OrderResponse::MissingId => Err(StorefrontError::MalformedResponse(
                "order id missing in creation response".into(),
            )),
            OrderResponse::Reject { status, message } => Err(StorefrontError::Backend {
                status: *status,
                message: message.clone(),
            }),
        }
    }

    async fn my_orders(&self) -> Result<Vec<Order>> {
        Ok(vec![])
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        Ok(vec![])
    }

    async fn create_payment_intent(
        &self,
        order_id: &str,
        amount_minor: i64,
    ) -> Result<PaymentIntent> {
        self.log(|c| c.payment_intents.push((order_id.to_string(), amount_minor)));
        if let Some(message) = &self.intent_error {
            return Err(StorefrontError::Backend {
                status: 500,
                message: message.clone(),
            });
        }
        let secret = self
            .client_secret
            .clone()
            .unwrap_or_else(|| "pi_fake_secret".into());
        Ok(PaymentIntent {
            client_secret: secret,
        })
    }

    async fn create_checkout_session(&self, _order_id: &str) -> Result<CheckoutSession> {
        self.log(|c| c.checkout_sessions += 1);
        let secret = self
            .client_secret
            .clone()
            .unwrap_or_else(|| "cs_fake_secret".into());
        Ok(CheckoutSession {
            client_secret: secret,
        })
    }

    async fn session_status(&self, _session_id: &str) -> Result<SessionStatus> {
        self.log(|c| c.session_status += 1);
        Ok(SessionStatus {
            status: self.session_state.unwrap_or(SessionState::Open),
            customer_email: None,
            order_id: None,
            order_status: None,
            payment_status: None,
        })
    }
}
