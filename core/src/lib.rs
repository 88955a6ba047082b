//! Request descriptors for a REST backend's resources.
//!
//! # Overview
//! Builds `HttpRequest` values for the conventional CRUD paths of every
//! backend resource, plus the Agent action endpoints, without touching the
//! network (host-does-IO pattern). A request carries the transform that turns
//! the raw response body into the resource's entity type.
//!
//! # Design
//! - One generic `ResourceBuilder` parameterized by `ResourceMeta` (resource
//!   name plus wire codec) replaces a per-resource client.
//! - `ResourceClient` is stateless; it holds only the base path.
//! - Required ids and payloads are `Option`s checked before any URL is built;
//!   absence is reported as `ApiError::MissingParameter`.
//! - `ResourceRegistry` maps resource names to untyped metadata for callers
//!   that do not have a Rust model type.

pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod http;
pub mod options;
pub mod registry;
pub mod types;

pub use client::{Operation, ResourceBuilder, ResourceClient};
pub use codec::ResourceMeta;
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transform};
pub use options::{ListParams, RequestHints, RequestOptions};
pub use registry::ResourceRegistry;
pub use types::{ActivationResult, Agent, FileRecord, McpResource};
