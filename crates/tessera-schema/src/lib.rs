//! # tessera-schema
//!
//! Runtime schema handling for Tessera.
//!
//! This crate provides:
//! - [`SchemaRegistry`]: the `(tenant, blueprint) -> schema` lookup contract
//! - [`DocumentValidator`]: stateless document validation in full and
//!   partial mode, implemented by [`JsonSchemaValidator`]
//! - [`WireSchemas`]: JSON Schemas for the request/response shapes in
//!   `tessera-core`, generated with `schemars`
//!
//! ## Architecture
//!
//! The validator is a capability injected into the entity store rather than
//! a global, so tests run in parallel and alternative dialects can be
//! swapped in. The libSQL-backed registry lives in `tessera-db`.

pub mod catalog;
pub mod error;
pub mod registry;
pub mod validator;

pub use catalog::WireSchemas;
pub use error::SchemaError;
pub use registry::SchemaRegistry;
pub use validator::{DocumentValidator, JsonSchemaValidator, ValidationMode, strip_required};
