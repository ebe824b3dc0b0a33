//! ID prefix constants.
//!
//! Row IDs are generated in SQL as `{prefix}-{16 hex chars}`.

/// Prefix for entity row IDs.
pub const PREFIX_ENTITY: &str = "ent";

/// All prefixes handed to the ID generator.
pub const ALL_PREFIXES: &[&str] = &[PREFIX_ENTITY];
