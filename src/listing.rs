//! Client-side catalog filtering, sorting and pagination.
//!
//! The backend exposes a filtered listing endpoint with the same parameters;
//! `query_pairs` builds its canonical query string, `apply` evaluates the
//! filter locally over the full cached listing.

use crate::domain::catalog::{Category, Product};

/// The "All" pseudo-category means no category filter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    #[default]
    All,
    Slug(String),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    fn as_param(self) -> &'static str {
        match self {
            SortOrder::Newest => "newest",
            SortOrder::PriceAsc => "price-asc",
            SortOrder::PriceDesc => "price-desc",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProductFilter {
    pub category: CategoryFilter,
    /// Category id, when already resolved from the slug.
    pub category_id: Option<String>,
    pub color: Option<String>,
    pub sort: SortOrder,
    pub page: u32,
    pub limit: u32,
    pub search: Option<String>,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            category: CategoryFilter::All,
            category_id: None,
            color: None,
            sort: SortOrder::default(),
            page: 1,
            limit: 20,
            search: None,
        }
    }
}

/// One page of filtered results.
#[derive(Clone, Debug)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total: usize,
    pub page: u32,
    pub total_pages: u32,
}

impl ProductFilter {
    pub fn with_search(term: &str) -> Self {
        Self {
            search: Some(term.trim().to_string()),
            ..Self::default()
        }
    }

    /// Query parameters for `GET /api/products`, omitting no-op values.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(id) = &self.category_id {
            pairs.push(("categoryId", id.clone()));
        }
        if let CategoryFilter::Slug(slug) = &self.category {
            pairs.push(("category", slug.clone()));
        }
        if let Some(color) = &self.color {
            pairs.push(("color", color.clone()));
        }
        pairs.push(("sort", self.sort.as_param().to_string()));
        pairs.push(("page", self.page.max(1).to_string()));
        pairs.push(("limit", self.limit.max(1).to_string()));
        if let Some(search) = self.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                pairs.push(("search", search.to_string()));
            }
        }
        pairs
    }

    /// Canonical cache key for this parameter set.
    pub fn cache_key(&self) -> String {
        self.query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// Evaluate the filter locally over the full product listing.
    pub fn apply(&self, products: &[Product], categories: &[Category]) -> ProductPage {
        let mut items: Vec<Product> = products.to_vec();

        let category_id = self.category_id.clone().or_else(|| match &self.category {
            CategoryFilter::All => None,
            CategoryFilter::Slug(slug) => categories
                .iter()
                .find(|c| &c.slug == slug)
                .map(|c| c.id.clone()),
        });
        if let Some(id) = category_id {
            items.retain(|p| p.category_id.as_deref() == Some(id.as_str()));
        }
        if let Some(color) = &self.color {
            items.retain(|p| p.color.as_deref() == Some(color.as_str()));
        }
        if let Some(term) = self.search.as_deref().map(str::trim) {
            if !term.is_empty() {
                items.retain(|p| p.matches_term(term));
            }
        }

        match self.sort {
            SortOrder::PriceAsc => items.sort_by(|a, b| a.price.cmp(&b.price)),
            SortOrder::PriceDesc => items.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }

        let total = items.len();
        let limit = self.limit.max(1) as usize;
        let page = self.page.max(1);
        let total_pages = total.div_ceil(limit) as u32;
        let items = items
            .into_iter()
            .skip((page as usize - 1) * limit)
            .take(limit)
            .collect();

        ProductPage {
            items,
            total,
            page,
            total_pages,
        }
    }
}
