//! Per-resource metadata: the resource name plus its wire codec.
//!
//! # Design
//! A `ResourceMeta<T>` is all that distinguishes one resource from another.
//! Codecs are plain function pointers so metadata is cheap to clone and can
//! live in a registry. Serde models get their codec from `ResourceMeta::json`;
//! untyped callers use the `Value` constructors.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, Result};

/// Wire JSON to entity.
pub type FromWire<T> = fn(Value) -> Result<T>;

/// Entity to wire JSON.
pub type ToWire<T> = fn(&T) -> Result<Value>;

/// Name and codec of one backend resource.
pub struct ResourceMeta<T> {
    name: &'static str,
    payload_field: String,
    from_wire: FromWire<T>,
    to_wire: ToWire<T>,
}

impl<T> ResourceMeta<T> {
    pub fn new(name: &'static str, from_wire: FromWire<T>, to_wire: ToWire<T>) -> Self {
        Self {
            name,
            payload_field: lower_camel(name),
            from_wire,
            to_wire,
        }
    }

    /// Override the payload parameter name reported in missing-parameter
    /// errors.
    pub fn with_payload_field(mut self, field: impl Into<String>) -> Self {
        self.payload_field = field.into();
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn payload_field(&self) -> &str {
        &self.payload_field
    }

    pub fn from_wire(&self, value: Value) -> Result<T> {
        (self.from_wire)(value)
    }

    pub fn to_wire(&self, entity: &T) -> Result<Value> {
        (self.to_wire)(entity)
    }

    pub(crate) fn from_wire_fn(&self) -> FromWire<T> {
        self.from_wire
    }
}

impl<T: Serialize + DeserializeOwned> ResourceMeta<T> {
    /// Metadata whose codec is the model's serde implementation.
    pub fn json(name: &'static str) -> Self {
        Self::new(name, json_from_wire::<T>, json_to_wire::<T>)
    }
}

impl ResourceMeta<Value> {
    /// Untyped metadata that forwards JSON unchanged.
    pub fn passthrough(name: &'static str) -> Self {
        Self::new(name, passthrough_from_wire, passthrough_to_wire)
    }

    /// Untyped metadata that normalizes JSON through model `M` in both
    /// directions.
    pub fn erased<M: Serialize + DeserializeOwned>(name: &'static str) -> Self {
        Self::new(name, erased_from_wire::<M>, erased_to_wire::<M>)
    }
}

impl<T> Clone for ResourceMeta<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            payload_field: self.payload_field.clone(),
            from_wire: self.from_wire,
            to_wire: self.to_wire,
        }
    }
}

impl<T> fmt::Debug for ResourceMeta<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceMeta")
            .field("name", &self.name)
            .field("payload_field", &self.payload_field)
            .finish_non_exhaustive()
    }
}

pub fn json_from_wire<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

pub fn json_to_wire<T: Serialize>(entity: &T) -> Result<Value> {
    serde_json::to_value(entity).map_err(|e| ApiError::SerializationError(e.to_string()))
}

fn passthrough_from_wire(value: Value) -> Result<Value> {
    Ok(value)
}

fn passthrough_to_wire(value: &Value) -> Result<Value> {
    Ok(value.clone())
}

fn erased_from_wire<M: Serialize + DeserializeOwned>(value: Value) -> Result<Value> {
    let model: M = json_from_wire(value)?;
    json_to_wire(&model)
}

fn erased_to_wire<M: Serialize + DeserializeOwned>(value: &Value) -> Result<Value> {
    let model: M = serde_json::from_value(value.clone())
        .map_err(|e| ApiError::SerializationError(e.to_string()))?;
    json_to_wire(&model)
}

/// `FileRecord` -> `fileRecord`.
fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Agent;
    use serde_json::json;

    #[test]
    fn payload_field_is_lower_camel() {
        assert_eq!(ResourceMeta::<Agent>::json("Agent").payload_field(), "agent");
        assert_eq!(
            ResourceMeta::passthrough("FileRecord").payload_field(),
            "fileRecord"
        );
        assert_eq!(
            ResourceMeta::passthrough("McpResource")
                .with_payload_field("resource")
                .payload_field(),
            "resource"
        );
    }

    #[test]
    fn json_codec_round_trips() {
        let meta = ResourceMeta::<Agent>::json("Agent");
        let agent = Agent {
            id: Some("a-1".to_string()),
            name: "scout".to_string(),
            description: Some("finds things".to_string()),
            status: None,
            model: Some("small".to_string()),
            tags: vec!["search".to_string()],
        };
        let wire = meta.to_wire(&agent).unwrap();
        assert_eq!(meta.from_wire(wire).unwrap(), agent);
    }

    #[test]
    fn json_codec_rejects_wrong_shape() {
        let meta = ResourceMeta::<Agent>::json("Agent");
        let err = meta.from_wire(json!({"id": 7})).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn erased_codec_normalizes_through_model() {
        let meta = ResourceMeta::erased::<Agent>("Agent");
        let wire = meta
            .to_wire(&json!({"name": "scout", "unknownField": 1}))
            .unwrap();
        assert_eq!(wire, json!({"name": "scout"}));
        assert!(meta.to_wire(&json!({"id": "no-name"})).is_err());
    }

    #[test]
    fn passthrough_codec_is_identity() {
        let meta = ResourceMeta::passthrough("Anything");
        let value = json!({"x": [1, 2, 3]});
        assert_eq!(meta.from_wire(value.clone()).unwrap(), value);
        assert_eq!(meta.to_wire(&value).unwrap(), value);
    }
}
