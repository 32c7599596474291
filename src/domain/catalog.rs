//! Read-only catalog types as served by the backend.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(
        default,
        rename = "categoryId",
        skip_serializing_if = "Option::is_none"
    )]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(
        default,
        rename = "createdAt",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Case-insensitive substring match on name and description, used by the
    /// local search fallback.
    pub fn matches_term(&self, term: &str) -> bool {
        let needle = term.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Admin-only product creation payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(rename = "categoryId")]
    pub category_id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub stock: i64,
    pub price: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_tolerates_minimal_payload() {
        let p: Product = serde_json::from_str(r#"{"_id":"p1","name":"Socks"}"#).unwrap();
        assert_eq!(p.id, "p1");
        assert_eq!(p.price, Decimal::ZERO);
        assert!(p.category_id.is_none());
    }

    #[test]
    fn product_accepts_plain_id_key() {
        let p: Product =
            serde_json::from_str(r#"{"id":"p2","name":"Shoes","price":59.99}"#).unwrap();
        assert_eq!(p.id, "p2");
        assert_eq!(p.price, Decimal::new(5999, 2));
    }

    #[test]
    fn matches_term_is_case_insensitive_over_name_and_description() {
        let p: Product = serde_json::from_str(
            r#"{"_id":"p1","name":"Wool Socks","description":"Warm winter wear"}"#,
        )
        .unwrap();
        assert!(p.matches_term("sock"));
        assert!(p.matches_term("WINTER"));
        assert!(!p.matches_term("jacket"));
    }
}
