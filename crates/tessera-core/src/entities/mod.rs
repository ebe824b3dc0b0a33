//! Persisted domain structs.
//!
//! Each struct maps to a table in the libSQL database (see
//! `tessera-db/migrations/001_initial.sql`). All derive `Serialize`,
//! `Deserialize`, and `JsonSchema` so they can be returned as-is and
//! exported through the wire-schema catalog.

mod blueprint;
mod entity;

pub use blueprint::Blueprint;
pub use entity::Entity;
