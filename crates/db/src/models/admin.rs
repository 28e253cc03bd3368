//! Read models for administrative queries.

use serde::Serialize;
use sqlx::FromRow;

/// Row counts across the whole ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, FromRow)]
pub struct GlobalStats {
    pub users: i64,
    pub items: i64,
    pub ownerships: i64,
}
