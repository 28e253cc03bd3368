//! Ledger rows and the inventory read model.

use cardpull_core::ledger::Holding;
use cardpull_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `ownerships` table, keyed by `(user_id, item_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Ownership {
    pub user_id: DbId,
    pub item_id: DbId,
    pub quantity: i32,
    pub quality_tier: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Ownership {
    pub fn holding(&self) -> Holding {
        Holding::new(self.quantity, self.quality_tier)
    }
}

/// One inventory line: an owned item joined with its catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct InventoryEntry {
    pub item_id: DbId,
    pub name: String,
    pub group_label: String,
    pub image_url: Option<String>,
    pub quantity: i32,
    pub quality_tier: i32,
}
