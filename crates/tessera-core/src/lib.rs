//! # tessera-core
//!
//! Core types shared across all Tessera crates.
//!
//! This crate provides:
//! - Persisted domain structs (`Blueprint`, `Entity`)
//! - Wire request/response shapes (`CreateEntity`, `UpdateEntity`,
//!   `SearchEntities`, `SearchPage`, `Filter`, ...)
//! - Filter operator and sort enums with their string forms
//! - `FieldError`, the `(fieldPath, message)` pair reported by validation
//! - `TenantContext`, the identity handed in by the auth layer
//! - ID prefix constants
//!
//! Documents (`data`, `schema`) are carried as `serde_json::Value`, which is
//! already a tagged union over object/array/string/number/bool/null.

pub mod entities;
pub mod enums;
pub mod identity;
pub mod ids;
pub mod requests;
pub mod responses;
pub mod validation;
