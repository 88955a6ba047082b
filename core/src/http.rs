//! HTTP descriptor types for the host-does-IO pattern.
//!
//! # Design
//! Builders return `HttpRequest` values describing a call as plain data; the
//! caller (host) executes it and hands the result back as an `HttpResponse`.
//! A request may carry a response transform, a function from raw JSON to the
//! caller's entity type, so the parse step travels with the request instead of
//! living in a per-operation `parse_*` method.
//!
//! Query parameters stay in `query` as a JSON object rather than being baked
//! into `url`. `full_url` renders them for hosts that want a single string.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::options::RequestHints;

/// Function applied to the decoded response body of a request.
pub type Transform<T> = Arc<dyn Fn(Value) -> Result<T> + Send + Sync>;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const APPLICATION_JSON: &str = "application/json";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Produced by `ResourceBuilder` operations. All data fields are public so a
/// host can execute the request; the transform is reachable through
/// `transform`, `apply_transform` and `parse`.
pub struct HttpRequest<T = Value> {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub query: Option<Map<String, Value>>,
    pub hints: RequestHints,
    transform: Option<Transform<T>>,
}

impl<T> HttpRequest<T> {
    pub(crate) fn new(method: HttpMethod, url: String) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: None,
            query: None,
            hints: RequestHints::default(),
            transform: None,
        }
    }

    /// Set a JSON body together with its `Content-Type` header.
    pub(crate) fn with_json_body(mut self, body: String) -> Self {
        self.headers
            .push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
        self.body = Some(body);
        self
    }

    pub(crate) fn with_query(mut self, query: Option<Map<String, Value>>) -> Self {
        self.query = query;
        self
    }

    pub(crate) fn with_hints(mut self, hints: RequestHints) -> Self {
        self.hints = hints;
        self
    }

    pub(crate) fn with_transform(mut self, transform: Transform<T>) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Look up a header value, ignoring ASCII case in the name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn transform(&self) -> Option<&Transform<T>> {
        self.transform.as_ref()
    }

    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }

    /// Run the attached transform on an already decoded body.
    ///
    /// Returns `Ok(None)` when the request carries no transform.
    pub fn apply_transform(&self, value: Value) -> Result<Option<T>> {
        match &self.transform {
            Some(transform) => transform(value).map(Some),
            None => Ok(None),
        }
    }

    /// Check the status of a host-executed response and apply the transform
    /// to its body. An empty body decodes as JSON `null`.
    pub fn parse(&self, response: HttpResponse) -> Result<Option<T>> {
        check_status(&response)?;
        if self.transform.is_none() {
            return Ok(None);
        }
        let value = if response.body.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&response.body)
                .map_err(|e| ApiError::DeserializationError(e.to_string()))?
        };
        self.apply_transform(value)
    }

    /// URL-encoded rendering of `query`, or `None` when there is nothing to
    /// send.
    pub fn query_string(&self) -> Option<String> {
        let query = self.query.as_ref()?;
        let mut parts = Vec::new();
        for (key, value) in query {
            push_pair(&mut parts, key, value);
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("&"))
        }
    }

    /// `url` with the rendered query string appended.
    pub fn full_url(&self) -> String {
        match self.query_string() {
            Some(qs) if self.url.contains('?') => format!("{}&{qs}", self.url),
            Some(qs) => format!("{}?{qs}", self.url),
            None => self.url.clone(),
        }
    }
}

impl<T: Serialize + 'static> HttpRequest<T> {
    /// Re-type the request so its transform yields JSON instead of `T`.
    pub fn into_json(self) -> HttpRequest<Value> {
        let transform = self.transform.map(|inner| -> Transform<Value> {
            Arc::new(move |value: Value| -> Result<Value> {
                let entity = inner(value)?;
                serde_json::to_value(entity)
                    .map_err(|e| ApiError::SerializationError(e.to_string()))
            })
        });
        HttpRequest {
            method: self.method,
            url: self.url,
            headers: self.headers,
            body: self.body,
            query: self.query,
            hints: self.hints,
            transform,
        }
    }
}

impl<T> Clone for HttpRequest<T> {
    fn clone(&self) -> Self {
        Self {
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            query: self.query.clone(),
            hints: self.hints.clone(),
            transform: self.transform.clone(),
        }
    }
}

impl<T> fmt::Debug for HttpRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .field("body", &self.body)
            .field("query", &self.query)
            .field("hints", &self.hints)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by the caller after executing an `HttpRequest`, then passed to
/// `HttpRequest::parse`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<()> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

fn push_pair(parts: &mut Vec<String>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(s) => parts.push(format!(
            "{}={}",
            urlencoding::encode(key),
            urlencoding::encode(s)
        )),
        Value::Array(items) => {
            for item in items {
                push_pair(parts, key, item);
            }
        }
        other => parts.push(format!(
            "{}={}",
            urlencoding::encode(key),
            urlencoding::encode(&other.to_string())
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request_with_query(query: Value) -> HttpRequest {
        let Value::Object(map) = query else {
            panic!("query must be an object");
        };
        HttpRequest::new(HttpMethod::Get, "http://localhost:3000/Agent".to_string())
            .with_query(Some(map))
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse {
            status: 200,
            body: body.to_string(),
        }
    }

    #[test]
    fn method_renders_uppercase() {
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
        assert_eq!(serde_json::to_value(HttpMethod::Put).unwrap(), json!("PUT"));
    }

    #[test]
    fn query_string_encodes_and_repeats_arrays() {
        let req = request_with_query(json!({
            "page": 2,
            "sort": ["name,asc", "id"],
            "q": "a b&c",
            "skip": null
        }));
        assert_eq!(
            req.query_string().as_deref(),
            Some("page=2&q=a%20b%26c&sort=name%2Casc&sort=id")
        );
    }

    #[test]
    fn full_url_without_query_is_url() {
        let req = request_with_query(json!({}));
        assert_eq!(req.query_string(), None);
        assert_eq!(req.full_url(), "http://localhost:3000/Agent");
    }

    #[test]
    fn full_url_appends_query() {
        let req = request_with_query(json!({"size": 5}));
        assert_eq!(req.full_url(), "http://localhost:3000/Agent?size=5");
    }

    #[test]
    fn json_body_sets_content_type() {
        let req: HttpRequest =
            HttpRequest::new(HttpMethod::Post, "u".to_string()).with_json_body("{}".to_string());
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some("{}"));
    }

    #[test]
    fn parse_without_transform_yields_none() {
        let req: HttpRequest<String> = HttpRequest::new(HttpMethod::Delete, "u".to_string());
        assert!(req.parse(ok("")).unwrap().is_none());
    }

    #[test]
    fn parse_maps_not_found() {
        let req: HttpRequest<String> = HttpRequest::new(HttpMethod::Get, "u".to_string());
        let response = HttpResponse {
            status: 404,
            body: String::new(),
        };
        assert!(matches!(req.parse(response), Err(ApiError::NotFound)));
    }

    #[test]
    fn parse_maps_other_failures() {
        let req: HttpRequest<String> = HttpRequest::new(HttpMethod::Get, "u".to_string());
        let response = HttpResponse {
            status: 503,
            body: "unavailable".to_string(),
        };
        let err = req.parse(response).unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 503, .. }));
    }

    #[test]
    fn parse_applies_transform() {
        let req: HttpRequest<String> = HttpRequest::new(HttpMethod::Get, "u".to_string())
            .with_transform(Arc::new(|v: Value| -> Result<String> {
                v["name"]
                    .as_str()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::DeserializationError("no name".to_string()))
            }));
        let out = req.parse(ok(r#"{"name":"scout"}"#)).unwrap();
        assert_eq!(out.as_deref(), Some("scout"));
    }

    #[test]
    fn parse_rejects_bad_json() {
        let req: HttpRequest<Value> = HttpRequest::new(HttpMethod::Get, "u".to_string())
            .with_transform(Arc::new(|v: Value| -> Result<Value> { Ok(v) }));
        let err = req.parse(ok("not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn into_json_keeps_fields_and_retypes_transform() {
        let req: HttpRequest<u32> = HttpRequest::new(HttpMethod::Get, "u".to_string())
            .with_transform(Arc::new(|v: Value| -> Result<u32> {
                Ok(v.as_u64().unwrap_or(0) as u32 + 1)
            }));
        let json_req = req.into_json();
        assert_eq!(json_req.url, "u");
        assert_eq!(json_req.apply_transform(json!(41)).unwrap(), Some(json!(42)));
    }

    #[test]
    fn debug_reports_transform_presence() {
        let req: HttpRequest = HttpRequest::new(HttpMethod::Get, "u".to_string());
        assert!(format!("{req:?}").contains("transform: false"));
    }
}
