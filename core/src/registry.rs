//! Resource registry: resource name to untyped metadata.
//!
//! Lets callers that only know a resource by name (the C API, generic tools)
//! build requests without a Rust model type. The built-in registry is created
//! once per process and normalizes JSON through the bundled models.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde_json::Value;

use crate::codec::ResourceMeta;
use crate::error::{ApiError, Result};
use crate::types::{Agent, FileRecord, McpResource, AGENT, FILE_RECORD, MCP_RESOURCE};

static BUILTIN: OnceLock<ResourceRegistry> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    entries: BTreeMap<&'static str, ResourceMeta<Value>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the bundled resources.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(ResourceMeta::erased::<Agent>(AGENT));
        registry.register(ResourceMeta::erased::<FileRecord>(FILE_RECORD));
        registry.register(ResourceMeta::erased::<McpResource>(MCP_RESOURCE));
        registry
    }

    /// Process-wide registry of the bundled resources.
    pub fn builtin() -> &'static ResourceRegistry {
        BUILTIN.get_or_init(|| {
            let registry = Self::with_builtin();
            tracing::debug!(
                resources = ?registry.names(),
                "initialized built-in resource registry"
            );
            registry
        })
    }

    /// Add or replace an entry, returning the previous one.
    pub fn register(&mut self, meta: ResourceMeta<Value>) -> Option<ResourceMeta<Value>> {
        self.entries.insert(meta.name(), meta)
    }

    pub fn get(&self, name: &str) -> Result<&ResourceMeta<Value>> {
        self.entries
            .get(name)
            .ok_or_else(|| ApiError::UnknownResource(name.to_string()))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        self.entries.keys().copied().collect()
    }
}
