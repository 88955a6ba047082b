//! Caller-supplied inputs that shape a request beyond ids and payloads.
//!
//! `ListParams` carries the pagination passthrough for list operations.
//! `RequestOptions` holds the escape hatches: an explicit query object and
//! request-shaping hints for the consumer that executes the descriptor. The
//! builder copies both verbatim and never overwrites them with derived values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pagination parameters for list operations. Absent fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl ListParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    /// Query object holding only the supplied fields.
    ///
    /// `page` and `size` are kept whenever present, zero included. `sort` is
    /// dropped when empty.
    pub fn to_query(&self) -> Map<String, Value> {
        let mut query = Map::new();
        if let Some(page) = self.page {
            query.insert("page".to_string(), Value::from(page));
        }
        if let Some(size) = self.size {
            query.insert("size".to_string(), Value::from(size));
        }
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.is_empty()) {
            query.insert("sort".to_string(), Value::from(sort));
        }
        query
    }
}

/// Request-shaping hints for the consumer that executes a descriptor.
///
/// The builder never reads these; they are copied into the request as given.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestHints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimistic_update: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rollback: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

/// Escape hatches applied by `ResourceBuilder::with_options`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestOptions {
    /// Replaces the derived query object; for create/update it is sent as the
    /// body instead of the encoded payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Map<String, Value>>,
    #[serde(default)]
    pub hints: RequestHints,
}

impl RequestOptions {
    pub fn with_query(mut self, query: Map<String, Value>) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_hints(mut self, hints: RequestHints) -> Self {
        self.hints = hints;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_params_produce_empty_query() {
        assert!(ListParams::new().to_query().is_empty());
    }

    #[test]
    fn only_page_is_sent() {
        let query = ListParams::new().page(2).to_query();
        assert_eq!(Value::Object(query), json!({"page": 2}));
    }

    #[test]
    fn zero_page_and_size_are_kept() {
        let query = ListParams::new().page(0).size(0).to_query();
        assert_eq!(Value::Object(query), json!({"page": 0, "size": 0}));
    }

    #[test]
    fn empty_sort_is_dropped() {
        let query = ListParams::new().size(10).sort("").to_query();
        assert_eq!(Value::Object(query), json!({"size": 10}));
    }

    #[test]
    fn all_fields_are_sent() {
        let query = ListParams::new().page(1).size(25).sort("name,desc").to_query();
        assert_eq!(
            Value::Object(query),
            json!({"page": 1, "size": 25, "sort": "name,desc"})
        );
    }

    #[test]
    fn hints_deserialize_from_camel_case() {
        let hints: RequestHints =
            serde_json::from_value(json!({"queryKey": "agents", "force": true})).unwrap();
        assert_eq!(hints.query_key.as_deref(), Some("agents"));
        assert_eq!(hints.force, Some(true));
        assert!(hints.rollback.is_none());
    }
}
