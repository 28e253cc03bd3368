//! Database row structs and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the table row, plus any input DTOs used by the repositories.

pub mod admin;
pub mod banner;
pub mod item;
pub mod ownership;
pub mod trade;
pub mod user;
