//! Stateless request builders for every backend resource.
//!
//! # Design
//! `ResourceClient` holds only the base path. `ResourceBuilder` pairs it with
//! one resource's metadata and produces `HttpRequest` descriptors for the five
//! CRUD operations; the Agent resource adds its action endpoints through an
//! inherent impl on `ResourceBuilder<Agent>`. Required parameters are
//! checked before any URL is formatted, so a failing call never yields a
//! partial request. The caller executes the HTTP round-trip.

use std::fmt;
use std::sync::Arc;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::codec::{json_from_wire, ResourceMeta};
use crate::config::{self, ClientConfig};
use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::options::{ListParams, RequestOptions};
use crate::registry::ResourceRegistry;
use crate::types::{
    ActivationResult, Agent, FileRecord, McpResource, AGENT, FILE_RECORD, MCP_RESOURCE,
};

/// Bytes escaped in a path segment: everything except alphanumerics and
/// `- _ . ! ~ * ' ( )`, matching `encodeURIComponent`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, PATH_SEGMENT).to_string()
}

/// Logical names of the operations that take required parameters, used in
/// missing-parameter errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Delete,
    GetOne,
    Create,
    Update,
    Activate,
    PublishEvent,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Delete => "delete",
            Operation::GetOne => "getOne",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::Activate => "activate",
            Operation::PublishEvent => "publishEvent",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry point holding the base path shared by all resources.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    base_url: Arc<str>,
}

impl ResourceClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: Arc::from(base_url.trim_end_matches('/')),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_path)
    }

    /// Client bound to the process-wide configuration.
    pub fn from_global() -> Self {
        Self::from_config(config::global())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn resource<T>(&self, meta: ResourceMeta<T>) -> ResourceBuilder<T> {
        ResourceBuilder {
            base_url: Arc::clone(&self.base_url),
            meta,
            options: RequestOptions::default(),
        }
    }

    pub fn agent(&self) -> ResourceBuilder<Agent> {
        self.resource(ResourceMeta::json(AGENT))
    }

    pub fn file_records(&self) -> ResourceBuilder<FileRecord> {
        self.resource(ResourceMeta::json(FILE_RECORD))
    }

    pub fn mcp_resources(&self) -> ResourceBuilder<McpResource> {
        self.resource(ResourceMeta::json(MCP_RESOURCE))
    }

    /// Untyped builder for a resource in the built-in registry.
    pub fn by_name(&self, name: &str) -> Result<ResourceBuilder<Value>> {
        self.by_name_in(ResourceRegistry::builtin(), name)
    }

    pub fn by_name_in(
        &self,
        registry: &ResourceRegistry,
        name: &str,
    ) -> Result<ResourceBuilder<Value>> {
        let meta = registry.get(name)?.clone();
        Ok(self.resource(meta))
    }
}

/// Builds request descriptors for one resource. Owns a handle to the
/// client's base path, so it may outlive the client.
#[derive(Debug, Clone)]
pub struct ResourceBuilder<T> {
    base_url: Arc<str>,
    meta: ResourceMeta<T>,
    options: RequestOptions,
}

impl<T: 'static> ResourceBuilder<T> {
    /// Attach caller overrides. They take precedence over derived values.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    pub fn meta(&self) -> &ResourceMeta<T> {
        &self.meta
    }

    pub fn delete(&self, id: Option<&str>) -> Result<HttpRequest<()>> {
        let id = self.require(id, "id", Operation::Delete)?;
        let req = HttpRequest::new(HttpMethod::Delete, self.item_url(id))
            .with_query(self.options.query.clone());
        Ok(self.finish(req))
    }

    pub fn get_one(&self, id: Option<&str>) -> Result<HttpRequest<T>> {
        let id = self.require(id, "id", Operation::GetOne)?;
        let from_wire = self.meta.from_wire_fn();
        let req = HttpRequest::new(HttpMethod::Get, self.item_url(id))
            .with_query(self.options.query.clone())
            .with_transform(Arc::new(move |value: Value| from_wire(value)));
        Ok(self.finish(req))
    }

    /// List request. Only the supplied pagination fields are sent.
    pub fn get_list(&self, params: &ListParams) -> HttpRequest<Vec<T>> {
        let query = match &self.options.query {
            Some(query) => query.clone(),
            None => params.to_query(),
        };
        let from_wire = self.meta.from_wire_fn();
        let req = HttpRequest::new(HttpMethod::Get, self.collection_url())
            .with_query(Some(query))
            .with_transform(Arc::new(move |value: Value| -> Result<Vec<T>> {
                match value {
                    Value::Array(items) => items.into_iter().map(from_wire).collect(),
                    other => Err(ApiError::DeserializationError(format!(
                        "expected a JSON array, got {}",
                        json_kind(&other)
                    ))),
                }
            }));
        self.finish(req)
    }

    pub fn create(&self, payload: Option<&T>) -> Result<HttpRequest<T>> {
        let payload = self.require(payload, self.meta.payload_field(), Operation::Create)?;
        let body = self.encode_body(payload)?;
        let from_wire = self.meta.from_wire_fn();
        let req = HttpRequest::new(HttpMethod::Post, self.collection_url())
            .with_json_body(body)
            .with_transform(Arc::new(move |value: Value| from_wire(value)));
        Ok(self.finish(req))
    }

    pub fn update(&self, id: Option<&str>, payload: Option<&T>) -> Result<HttpRequest<T>> {
        let id = self.require(id, "id", Operation::Update)?;
        let payload = self.require(payload, self.meta.payload_field(), Operation::Update)?;
        let body = self.encode_body(payload)?;
        let from_wire = self.meta.from_wire_fn();
        let req = HttpRequest::new(HttpMethod::Put, self.item_url(id))
            .with_json_body(body)
            .with_transform(Arc::new(move |value: Value| from_wire(value)));
        Ok(self.finish(req))
    }

    fn require<'v, V: ?Sized>(
        &self,
        value: Option<&'v V>,
        parameter: &str,
        operation: Operation,
    ) -> Result<&'v V> {
        value.ok_or_else(|| {
            let operation = format!("{operation}{}", self.meta.name());
            tracing::warn!(parameter, operation = %operation, "missing required parameter");
            ApiError::MissingParameter {
                parameter: parameter.to_string(),
                operation,
            }
        })
    }

    /// An explicit query override is sent in place of the encoded payload.
    fn encode_body(&self, payload: &T) -> Result<String> {
        let wire = match &self.options.query {
            Some(query) => Value::Object(query.clone()),
            None => self.meta.to_wire(payload)?,
        };
        serde_json::to_string(&wire).map_err(|e| ApiError::SerializationError(e.to_string()))
    }

    fn collection_url(&self) -> String {
        format!("{}/{}", self.base_url, self.meta.name())
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url(), encode_segment(id))
    }

    fn finish<R>(&self, req: HttpRequest<R>) -> HttpRequest<R> {
        let req = req.with_hints(self.options.hints.clone());
        tracing::debug!(
            resource = self.meta.name(),
            method = %req.method,
            url = %req.url,
            "built request"
        );
        req
    }
}

impl ResourceBuilder<Agent> {
    /// `POST {base}/Agent/{id}/activate`.
    pub fn activate(&self, id: Option<&str>) -> Result<HttpRequest<ActivationResult>> {
        let id = self.require(id, "id", Operation::Activate)?;
        let url = format!("{}/activate", self.item_url(id));
        let req = HttpRequest::new(HttpMethod::Post, url)
            .with_query(self.options.query.clone())
            .with_transform(Arc::new(|value: Value| {
                json_from_wire::<ActivationResult>(value)
            }));
        Ok(self.finish(req))
    }

    /// `POST {base}/Agent/{id}/event/{event_type}`. The payload is sent as
    /// given, without the Agent codec.
    pub fn publish_event(
        &self,
        id: Option<&str>,
        event_type: Option<&str>,
        payload: Option<&Value>,
    ) -> Result<HttpRequest<()>> {
        let id = self.require(id, "id", Operation::PublishEvent)?;
        let event_type = self.require(event_type, "eventType", Operation::PublishEvent)?;
        let url = format!("{}/event/{}", self.item_url(id), encode_segment(event_type));
        let mut req =
            HttpRequest::new(HttpMethod::Post, url).with_query(self.options.query.clone());
        if let Some(payload) = payload {
            let body = serde_json::to_string(payload)
                .map_err(|e| ApiError::SerializationError(e.to_string()))?;
            req = req.with_json_body(body);
        }
        Ok(self.finish(req))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
