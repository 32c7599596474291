//! Mebius Storefront Client
//!
//! Headless client for the Mebius e-commerce backend.
//!
//! ## Features
//! - Catalog browsing with cached, tri-state queries
//! - Debounced product search with local fallback
//! - Observable shopping cart
//! - Checkout and payment-intent orchestration
//! - Single-use order/payment receipts surviving a reload

pub mod api;
pub mod checkout;
pub mod completion;
pub mod config;
pub mod domain;
pub mod listing;
pub mod payment;
pub mod query;
pub mod search;
pub mod storage;
pub mod store;

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum StorefrontError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Backend { status: u16, message: String },

    #[error("invalid JSON in response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unexpected response shape: {0}")]
    MalformedResponse(String),

    #[error("{0}")]
    InvalidImage(String),

    #[error("local storage error: {0}")]
    Storage(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

pub use api::{Backend, HttpBackend, NoAuth, StaticToken, TokenProvider};
pub use checkout::{CheckoutFlow, SubmitOutcome};
pub use completion::CompletionView;
pub use config::Settings;
pub use domain::cart::{Cart, CartLine, ProductSnapshot};
pub use domain::catalog::{Category, Product};
pub use domain::order::{Order, OrderDraft, OrderItem, ShippingAddress};
pub use domain::payment::{PaymentConfirmation, PaymentReceipt, PendingOrder};
pub use listing::{CategoryFilter, ProductFilter, ProductPage, SortOrder};
pub use payment::{PaymentFlow, PaymentState};
pub use query::{CatalogQueries, QueryState, SearchHits, SearchSource};
pub use search::{SearchBox, SearchPhase};
pub use storage::{FileStore, MemoryStore, Receipts, SessionStore};
pub use store::CartStore;
