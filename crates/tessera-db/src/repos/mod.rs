//! Blueprint and entity operations on [`crate::service::TesseraService`].

pub mod blueprint;
pub mod entity;
