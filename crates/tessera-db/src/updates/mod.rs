//! Update builders for mutations with optional fields.
//!
//! Only `Some` fields produce `SET` clauses in the dynamic `UPDATE`.

pub mod blueprint;
