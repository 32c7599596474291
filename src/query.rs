//! Tri-state catalog queries with per-key caching.
//!
//! Every query is observably Pending, Error or Ready; consumers branch on
//! the state, nothing throws past this layer. A cached key is never
//! re-fetched before invalidation, and concurrent callers of the same key
//! collapse onto a single in-flight request.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use crate::api::Backend;
use crate::domain::catalog::{Category, Product};
use crate::listing::ProductFilter;

#[derive(Clone, Debug, PartialEq)]
pub enum QueryState<T> {
    Pending,
    Error(String),
    Ready(T),
}

impl<T> QueryState<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, QueryState::Ready(_))
    }

    pub fn ready(self) -> Option<T> {
        match self {
            QueryState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> QueryState<U> {
        match self {
            QueryState::Pending => QueryState::Pending,
            QueryState::Error(message) => QueryState::Error(message),
            QueryState::Ready(value) => QueryState::Ready(f(value)),
        }
    }
}

#[derive(Clone, Debug, Default)]
enum Slot<T> {
    #[default]
    Empty,
    Failed(String),
    Filled(Arc<T>),
}

impl<T> Slot<T> {
    fn as_state(&self) -> QueryState<Arc<T>> {
        match self {
            Slot::Empty => QueryState::Pending,
            Slot::Failed(message) => QueryState::Error(message.clone()),
            Slot::Filled(value) => QueryState::Ready(value.clone()),
        }
    }
}

struct CachedQuery<T> {
    slot: Mutex<Slot<T>>,
}

impl<T> CachedQuery<T> {
    fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Empty),
        }
    }

    /// Return the cached outcome, fetching once on a miss. The slot lock is
    /// held across the fetch, which is what collapses concurrent callers.
    async fn get_or_fetch<F, Fut>(&self, fetch: F) -> QueryState<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = crate::Result<T>>,
    {
        let mut slot = self.slot.lock().await;
        if let Slot::Empty = *slot {
            *slot = match fetch().await {
                Ok(value) => Slot::Filled(Arc::new(value)),
                Err(e) => Slot::Failed(e.to_string()),
            };
        }
        slot.as_state()
    }

    /// Non-blocking snapshot: Pending while unfetched or in flight.
    fn state(&self) -> QueryState<Arc<T>> {
        match self.slot.try_lock() {
            Ok(slot) => slot.as_state(),
            Err(_) => QueryState::Pending,
        }
    }

    async fn invalidate(&self) {
        *self.slot.lock().await = Slot::Empty;
    }
}

/// Which strategy produced a set of search hits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchSource {
    /// The dedicated search endpoint.
    Search,
    /// The filtered-listing endpoint, after the search endpoint failed.
    Filtered,
    /// Local substring match over the cached catalog; the backend search is
    /// unavailable.
    Local,
}

#[derive(Clone, Debug)]
pub struct SearchHits {
    pub products: Vec<Product>,
    pub source: SearchSource,
}

impl SearchHits {
    pub fn degraded(&self) -> bool {
        self.source == SearchSource::Local
    }
}

pub struct CatalogQueries {
    backend: Arc<dyn Backend>,
    products: CachedQuery<Vec<Product>>,
    categories: CachedQuery<Vec<Category>>,
    filtered: Mutex<HashMap<String, Slot<Vec<Product>>>>,
}

impl CatalogQueries {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            products: CachedQuery::new(),
            categories: CachedQuery::new(),
            filtered: Mutex::new(HashMap::new()),
        }
    }

    pub async fn products(&self) -> QueryState<Arc<Vec<Product>>> {
        self.products
            .get_or_fetch(|| self.backend.list_products())
            .await
    }

    pub fn products_state(&self) -> QueryState<Arc<Vec<Product>>> {
        self.products.state()
    }

    pub async fn categories(&self) -> QueryState<Arc<Vec<Category>>> {
        self.categories
            .get_or_fetch(|| self.backend.list_categories())
            .await
    }

    pub fn categories_state(&self) -> QueryState<Arc<Vec<Category>>> {
        self.categories.state()
    }

    /// Filtered listing, cached per canonical parameter set.
    pub async fn filtered(&self, filter: &ProductFilter) -> QueryState<Arc<Vec<Product>>> {
        let key = filter.cache_key();
        let mut cache = self.filtered.lock().await;
        let slot = cache.entry(key).or_default();
        if let Slot::Empty = slot {
            *slot = match self.backend.filtered_products(filter).await {
                Ok(products) => Slot::Filled(Arc::new(products)),
                Err(e) => Slot::Failed(e.to_string()),
            };
        }
        slot.as_state()
    }

    /// Resolved by filtering the cached full listing; an absent id is
    /// Ready(None), not an error.
    pub async fn product_by_id(&self, id: &str) -> QueryState<Option<Product>> {
        self.products()
            .await
            .map(|products| products.iter().find(|p| p.id == id).cloned())
    }

    /// Search with fallbacks. The caller guarantees the trimmed term length
    /// is at least 2; this layer never surfaces a hard error, the final
    /// fallback is a local substring match over whatever catalog is cached.
    pub async fn search(&self, term: &str) -> SearchHits {
        match self.backend.search_products(term).await {
            Ok(products) => SearchHits {
                products,
                source: SearchSource::Search,
            },
            Err(search_err) => {
                warn!(%search_err, term, "search endpoint failed, trying filtered listing");
                match self
                    .backend
                    .filtered_products(&ProductFilter::with_search(term))
                    .await
                {
                    Ok(products) => SearchHits {
                        products,
                        source: SearchSource::Filtered,
                    },
                    Err(filtered_err) => {
                        warn!(%filtered_err, term, "filtered listing failed, using local match");
                        let products = self
                            .products()
                            .await
                            .ready()
                            .map(|all| {
                                all.iter()
                                    .filter(|p| p.matches_term(term))
                                    .cloned()
                                    .collect()
                            })
                            .unwrap_or_default();
                        SearchHits {
                            products,
                            source: SearchSource::Local,
                        }
                    }
                }
            }
        }
    }

    /// Drop all cached results; the next read re-fetches.
    pub async fn invalidate(&self) {
        self.products.invalidate().await;
        self.categories.invalidate().await;
        self.filtered.lock().await.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::FakeBackend;
    use rust_decimal::Decimal;

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            price: Decimal::new(10, 0),
            image: None,
            category_id: None,
            color: None,
            stock: None,
            created_at: None,
        }
    }

    fn queries_with(backend: FakeBackend) -> (CatalogQueries, Arc<FakeBackend>) {
        let backend = Arc::new(backend);
        (CatalogQueries::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn identical_queries_hit_the_cache() {
        let (queries, backend) =
            queries_with(FakeBackend::new().with_products(vec![product("p1", "Socks")]));
        assert!(queries.products().await.is_ready());
        assert!(queries.products().await.is_ready());
        assert_eq!(backend.calls().list_products, 1);
    }

    #[tokio::test]
    async fn failure_is_an_error_state_until_invalidated() {
        let (queries, backend) = queries_with(FakeBackend::new().with_products_failure());
        assert!(matches!(queries.products().await, QueryState::Error(_)));
        // Still cached: no second request without explicit invalidation.
        assert!(matches!(queries.products().await, QueryState::Error(_)));
        assert_eq!(backend.calls().list_products, 1);
        queries.invalidate().await;
        let _ = queries.products().await;
        assert_eq!(backend.calls().list_products, 2);
    }

    #[tokio::test]
    async fn state_is_pending_before_first_fetch() {
        let (queries, _) = queries_with(FakeBackend::new());
        assert_eq!(queries.products_state(), QueryState::Pending);
    }

    #[tokio::test]
    async fn product_by_id_resolves_from_listing() {
        let (queries, backend) = queries_with(
            FakeBackend::new().with_products(vec![product("p1", "Socks"), product("p2", "Hat")]),
        );
        let found = queries.product_by_id("p2").await;
        assert_eq!(found.ready().flatten().unwrap().name, "Hat");
        let absent = queries.product_by_id("ghost").await;
        assert_eq!(absent, QueryState::Ready(None));
        // Both lookups share the one cached listing fetch.
        assert_eq!(backend.calls().list_products, 1);
    }

    #[tokio::test]
    async fn search_uses_primary_endpoint_when_healthy() {
        let (queries, _) =
            queries_with(FakeBackend::new().with_products(vec![product("p1", "Wool Socks")]));
        let hits = queries.search("sock").await;
        assert_eq!(hits.source, SearchSource::Search);
        assert_eq!(hits.products.len(), 1);
        assert!(!hits.degraded());
    }

    #[tokio::test]
    async fn search_falls_back_to_filtered_listing() {
        let (queries, backend) = queries_with(
            FakeBackend::new()
                .with_products(vec![product("p1", "Wool Socks")])
                .with_search_failure(),
        );
        let hits = queries.search("sock").await;
        assert_eq!(hits.source, SearchSource::Filtered);
        assert_eq!(hits.products.len(), 1);
        assert_eq!(backend.calls().filtered, 1);
    }

    #[tokio::test]
    async fn search_degrades_to_local_match_when_both_endpoints_fail() {
        let (queries, _) = queries_with(
            FakeBackend::new()
                .with_products(vec![product("p1", "Wool Socks"), product("p2", "Hat")])
                .with_search_failure()
                .with_filtered_failure(),
        );
        let hits = queries.search("sock").await;
        assert_eq!(hits.source, SearchSource::Local);
        assert_eq!(hits.products.len(), 1);
        assert!(hits.degraded());
    }

    #[tokio::test]
    async fn filtered_listing_caches_per_parameter_set() {
        let (queries, backend) =
            queries_with(FakeBackend::new().with_products(vec![product("p1", "Socks")]));
        let filter = ProductFilter::with_search("sock");
        assert!(queries.filtered(&filter).await.is_ready());
        assert!(queries.filtered(&filter).await.is_ready());
        assert_eq!(backend.calls().filtered, 1);
        let other = ProductFilter::with_search("hat");
        let _ = queries.filtered(&other).await;
        assert_eq!(backend.calls().filtered, 2);
    }
}
