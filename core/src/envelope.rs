//! Response envelopes wrapping a sequence of resources.
//!
//! Item order is whatever the server sent. Nothing here sorts or
//! deduplicates.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fields::Fields;
use crate::{DecodeError, Resource, ResourceType};

/// Result of `POST /search` and `GET /search/similar/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct SearchResult {
    pub results: Vec<Resource>,
    /// Total matches reported by the server, independent of `limit`.
    pub total: u64,
    pub query: String,
}

impl SearchResult {
    /// Decodes a search envelope. `kind` fills in `type` for results that
    /// omit it, e.g. when the search was filtered by type.
    pub fn from_json(value: Value, kind: Option<ResourceType>) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, "a search result")?;
        let results = fields.records("results", |item| Resource::from_json(item, kind))?;
        let total = fields.u64_or("total", 0)?;
        let query = fields.optional_str("query")?.unwrap_or_default();
        Ok(Self {
            results,
            total,
            query,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl TryFrom<Value> for SearchResult {
    type Error = DecodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        SearchResult::from_json(value, None)
    }
}

/// Result of `GET /{type}s`: one page of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct ResourceListResponse {
    pub items: Vec<Resource>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

impl ResourceListResponse {
    pub fn from_json(value: Value, kind: Option<ResourceType>) -> Result<Self, DecodeError> {
        let mut fields = Fields::new(value, "a resource list")?;
        let items = fields.records("items", |item| Resource::from_json(item, kind))?;
        Ok(Self {
            items,
            total: fields.u64_or("total", 0)?,
            page: fields.u64_or("page", 1)?,
            page_size: fields.u64_or("page_size", 20)?,
        })
    }
}

impl TryFrom<Value> for ResourceListResponse {
    type Error = DecodeError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        ResourceListResponse::from_json(value, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_search_preserves_order_and_duplicate_names() {
        let result = SearchResult::from_json(
            json!({
                "results": [
                    {"id": "b", "name": "scraper", "type": "skill"},
                    {"id": "a", "name": "scraper", "type": "agent"}
                ],
                "total": 2,
                "query": "scraper"
            }),
            None,
        )
        .unwrap();

        let ids: Vec<_> = result.results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(result.total, 2);
        assert_eq!(result.query, "scraper");
    }

    #[test]
    fn test_empty_results_keep_server_total() {
        let result = SearchResult::from_json(json!({"results": [], "total": 17}), None).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.total, 17);
        assert_eq!(result.query, "");
    }

    #[test]
    fn test_total_as_string() {
        let result = SearchResult::from_json(json!({"total": "3"}), None).unwrap();
        assert_eq!(result.total, 3);
        assert!(result.results.is_empty());
    }

    #[test]
    fn test_malformed_element_fails_fast() {
        let err = SearchResult::from_json(
            json!({
                "results": [
                    {"id": "a", "name": "ok", "type": "skill"},
                    "garbage",
                    {"id": "c"}
                ],
                "total": 3
            }),
            None,
        )
        .unwrap_err();

        match err {
            DecodeError::Element { field, index, source } => {
                assert_eq!(field, "results");
                assert_eq!(index, 1);
                assert!(matches!(*source, DecodeError::NotAnObject(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_list_defaults_and_kind_fallback() {
        let list = ResourceListResponse::from_json(
            json!({"items": [{"id": "1", "name": "kb"}], "total": 1}),
            Some(ResourceType::Knowledge),
        )
        .unwrap();
        assert_eq!(list.page, 1);
        assert_eq!(list.page_size, 20);
        assert_eq!(list.items[0].kind, ResourceType::Knowledge);
    }

    #[test]
    fn test_results_must_be_a_list() {
        let err = ResourceListResponse::from_json(json!({"items": {"id": "1"}}), None).unwrap_err();
        assert!(matches!(err, DecodeError::WrongType { field: "items", .. }));
    }
}
