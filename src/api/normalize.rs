//! Canonicalization of the backend's polymorphic response shapes.
//!
//! Lists arrive either as bare arrays or wrapped under `data` or `products`;
//! categories under `{success, data}`; a created order's id in one of four
//! nestings. Ambiguity stops here.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{Result, StorefrontError};

fn unwrap_list(value: Value, wrappers: &[&str]) -> Option<Value> {
    if value.is_array() {
        return Some(value);
    }
    if let Value::Object(mut map) = value {
        for key in wrappers {
            if let Some(inner @ Value::Array(_)) = map.remove(*key) {
                return Some(inner);
            }
        }
    }
    None
}

fn parse_list<T: DeserializeOwned>(value: Value, wrappers: &[&str], what: &str) -> Result<Vec<T>> {
    let list = unwrap_list(value, wrappers)
        .ok_or_else(|| StorefrontError::MalformedResponse(format!("{what} list")))?;
    Ok(serde_json::from_value(list)?)
}

pub fn product_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>> {
    parse_list(value, &["data", "products"], "product")
}

pub fn category_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>> {
    parse_list(value, &["data"], "category")
}

pub fn order_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>> {
    parse_list(value, &["data", "orders"], "order")
}

fn id_of(value: &Value) -> Option<String> {
    for key in ["_id", "id"] {
        if let Some(Value::String(id)) = value.get(key) {
            if !id.is_empty() {
                return Some(id.clone());
            }
        }
    }
    None
}

/// Extract the server-assigned order id from a creation response, tolerating
/// a top-level id or one nested under `order` or `data`.
pub fn order_id(value: &Value) -> Option<String> {
    id_of(value)
        .or_else(|| value.get("order").and_then(id_of))
        .or_else(|| value.get("data").and_then(id_of))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::{Category, Product};
    use serde_json::json;

    #[test]
    fn product_list_accepts_all_known_shapes() {
        let bare = json!([{"_id": "p1", "name": "A"}]);
        let wrapped = json!({"data": [{"_id": "p1", "name": "A"}]});
        let alt = json!({"products": [{"_id": "p1", "name": "A"}]});
        for shape in [bare, wrapped, alt] {
            let products: Vec<Product> = product_list(shape).unwrap();
            assert_eq!(products.len(), 1);
            assert_eq!(products[0].id, "p1");
        }
    }

    #[test]
    fn unknown_list_shape_is_a_data_shape_error() {
        let err = product_list::<Product>(json!({"count": 3})).unwrap_err();
        assert!(matches!(err, StorefrontError::MalformedResponse(_)));
    }

    #[test]
    fn category_list_unwraps_success_envelope() {
        let value = json!({"success": true, "data": [{"_id": "c1", "name": "Shoes", "slug": "shoes"}]});
        let categories: Vec<Category> = category_list(value).unwrap();
        assert_eq!(categories[0].slug, "shoes");
    }

    #[test]
    fn order_id_tolerates_every_known_nesting() {
        for shape in [
            json!({"_id": "o1"}),
            json!({"id": "o1"}),
            json!({"order": {"_id": "o1"}}),
            json!({"data": {"id": "o1"}}),
        ] {
            assert_eq!(order_id(&shape).as_deref(), Some("o1"));
        }
    }

    #[test]
    fn missing_order_id_yields_none() {
        assert_eq!(order_id(&json!({"status": "created"})), None);
        assert_eq!(order_id(&json!({"data": {"status": "created"}})), None);
        assert_eq!(order_id(&json!({"_id": ""})), None);
    }
}
