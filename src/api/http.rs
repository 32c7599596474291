//! reqwest implementation of [`Backend`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::api::{normalize, Backend, ImageUploadTarget, NoAuth, TokenProvider};
use crate::config::Settings;
use crate::domain::catalog::{Category, Product, ProductDraft};
use crate::domain::order::{CreatedOrder, Order, OrderDraft};
use crate::domain::payment::{CheckoutSession, PaymentIntent, SessionStatus};
use crate::listing::ProductFilter;
use crate::{Result, StorefrontError};

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    token: Arc<dyn TokenProvider>,
}

impl HttpBackend {
    pub fn new(settings: &Settings) -> Result<Self> {
        Self::with_token_provider(settings, Arc::new(NoAuth))
    }

    pub fn with_token_provider(
        settings: &Settings,
        token: Arc<dyn TokenProvider>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: settings.api_base.trim_end_matches('/').to_string(),
            token,
        })
    }

    async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self.http.request(method, format!("{}{path}", self.base_url));
        if let Some(token) = self.token.bearer_token().await {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Send, then parse the body as JSON if there is one. Non-2xx answers
    /// surface the backend's `message` field when present.
    async fn execute(&self, builder: RequestBuilder) -> Result<Value> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        let value = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&body).unwrap_or(Value::Null)
        };
        if !status.is_success() {
            return Err(backend_error(status, &value));
        }
        if value.is_null() && !body.is_empty() {
            return Err(StorefrontError::MalformedResponse(
                "response body is not JSON".into(),
            ));
        }
        Ok(value)
    }

    async fn get(&self, path: &str) -> Result<Value> {
        debug!(path, "GET");
        let builder = self.request(Method::GET, path).await;
        self.execute(builder).await
    }

    async fn get_with_query(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        debug!(path, "GET");
        let builder = self.request(Method::GET, path).await.query(query);
        self.execute(builder).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        debug!(path, "POST");
        let builder = self.request(Method::POST, path).await.json(body);
        self.execute(builder).await
    }
}

fn backend_error(status: StatusCode, value: &Value) -> StorefrontError {
    let message = value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Request failed: {status}"));
    StorefrontError::Backend {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn list_products(&self) -> Result<Vec<Product>> {
        let value = self.get("/api/products").await?;
        normalize::product_list(value)
    }

    async fn search_products(&self, term: &str) -> Result<Vec<Product>> {
        let value = self
            .get_with_query("/api/products/search", &[("search", term.trim().to_string())])
            .await?;
        normalize::product_list(value)
    }

    async fn filtered_products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        let value = self
            .get_with_query("/api/products", &filter.query_pairs())
            .await?;
        normalize::product_list(value)
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let value = self.get("/api/categories").await?;
        normalize::category_list(value)
    }

    async fn create_product(&self, draft: &ProductDraft) -> Result<Product> {
        let value = self
            .post("/api/products", &serde_json::to_value(draft)?)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn request_image_upload(&self, file_type: &str) -> Result<ImageUploadTarget> {
        let body = serde_json::json!({ "fileType": file_type });
        let value = self.post("/api/products/images", &body).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn upload_image(
        &self,
        target: &ImageUploadTarget,
        file_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        let response = self
            .http
            .put(&target.url)
            .header(reqwest::header::CONTENT_TYPE, file_type)
            .body(bytes)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StorefrontError::Backend {
                status: status.as_u16(),
                message: format!("Image upload failed: {status} {text}"),
            });
        }
        Ok(target.public_url.clone())
    }

    async fn create_order(&self, draft: &OrderDraft) -> Result<CreatedOrder> {
        let value = self
            .post("/api/orders", &serde_json::to_value(draft)?)
            .await?;
        let id = normalize::order_id(&value).ok_or_else(|| {
            StorefrontError::MalformedResponse("order id missing in creation response".into())
        })?;
        Ok(CreatedOrder { id })
    }

    async fn my_orders(&self) -> Result<Vec<Order>> {
        let value = self.get("/api/orders/myorders").await?;
        normalize::order_list(value)
    }

    async fn all_orders(&self) -> Result<Vec<Order>> {
        let value = self.get("/api/orders/allorders").await?;
        normalize::order_list(value)
    }

    async fn create_payment_intent(
        &self,
        order_id: &str,
        amount_minor: i64,
    ) -> Result<PaymentIntent> {
        let body = serde_json::json!({ "orderId": order_id, "amount": amount_minor });
        let value = self.post("/api/payments/create-payment-intent", &body).await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn create_checkout_session(&self, order_id: &str) -> Result<CheckoutSession> {
        let body = serde_json::json!({ "orderId": order_id });
        let value = self
            .post("/api/payments/create-checkout-session", &body)
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    async fn session_status(&self, session_id: &str) -> Result<SessionStatus> {
        let value = self
            .get_with_query(
                "/api/payments/session-status",
                &[("session_id", session_id.to_string())],
            )
            .await?;
        Ok(serde_json::from_value(value)?)
    }
}
