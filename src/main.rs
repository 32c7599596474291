//! Storefront smoke client: fetch the catalog, exercise the cart, and report.

use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mebius_storefront::{
    CartStore, CatalogQueries, HttpBackend, ProductSnapshot, QueryState, Settings,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env();
    tracing::info!(base_url = %settings.api_base, "connecting to storefront backend");

    let backend = Arc::new(HttpBackend::new(&settings)?);
    let queries = CatalogQueries::new(backend);

    match queries.categories().await {
        QueryState::Ready(categories) => {
            tracing::info!(count = categories.len(), "categories loaded");
        }
        QueryState::Error(message) => tracing::warn!(%message, "failed to load categories"),
        QueryState::Pending => {}
    }

    let products = match queries.products().await {
        QueryState::Ready(products) => {
            tracing::info!(count = products.len(), "products loaded");
            products
        }
        QueryState::Error(message) => {
            anyhow::bail!("failed to load products: {message}");
        }
        QueryState::Pending => return Ok(()),
    };

    let cart = CartStore::new();
    for product in products.iter().take(2) {
        cart.add_item(ProductSnapshot::of(product));
    }
    tracing::info!(
        lines = cart.snapshot().line_count(),
        units = cart.unit_count(),
        total = %cart.total_price(),
        "sample cart built"
    );

    Ok(())
}
