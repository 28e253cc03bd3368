//! Ownership ledger rules.
//!
//! Pure arithmetic over a single holding. The database layer reads the
//! locked row, asks these functions for the new value, and writes it back
//! inside the same transaction.

use serde::{Deserialize, Serialize};

use crate::error::GachaError;

/// Quality tier of a freshly acquired item.
pub const INITIAL_QUALITY_TIER: i32 = 1;

/// Highest reachable quality tier.
pub const MAX_QUALITY_TIER: i32 = 5;

/// Units that must be held before a merge is allowed.
pub const MERGE_MIN_QUANTITY: i32 = 3;

/// Units consumed by one merge (three duplicates fold into one upgraded unit).
pub const MERGE_QUANTITY_COST: i32 = 2;

/// Quantity and tier of one (user, item) row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub quantity: i32,
    pub quality_tier: i32,
}

impl Holding {
    pub fn new(quantity: i32, quality_tier: i32) -> Self {
        Self {
            quantity,
            quality_tier,
        }
    }

    /// A row at zero quantity must be deleted rather than stored.
    pub fn is_empty(&self) -> bool {
        self.quantity <= 0
    }
}

/// Result of applying a merge to `holding`.
///
/// `item_name` is only used for the `NotOwned` message.
pub fn plan_merge(holding: Option<Holding>, item_name: &str) -> Result<Holding, GachaError> {
    let holding = holding
        .filter(|h| !h.is_empty())
        .ok_or_else(|| GachaError::NotOwned(item_name.to_string()))?;
    if holding.quantity < MERGE_MIN_QUANTITY {
        return Err(GachaError::InsufficientQuantity {
            have: holding.quantity,
            need: MERGE_MIN_QUANTITY,
        });
    }
    if holding.quality_tier >= MAX_QUALITY_TIER {
        return Err(GachaError::MaxTierReached(holding.quality_tier));
    }
    Ok(Holding {
        quantity: holding.quantity - MERGE_QUANTITY_COST,
        quality_tier: holding.quality_tier + 1,
    })
}

/// Result of removing `count` units from the source side of a transfer.
///
/// A missing row counts as zero units. The caller deletes the row when the
/// returned holding is empty.
pub fn plan_debit(holding: Option<Holding>, count: i32) -> Result<Holding, GachaError> {
    if count < 1 {
        return Err(GachaError::Validation(format!(
            "Transfer count must be positive, got {count}"
        )));
    }
    let have = holding.map_or(0, |h| h.quantity);
    match holding {
        Some(h) if h.quantity >= count => Ok(Holding {
            quantity: h.quantity - count,
            quality_tier: h.quality_tier,
        }),
        _ => Err(GachaError::InsufficientQuantity { have, need: count }),
    }
}

/// Holding written by an administrative grant of `quantity` units.
///
/// The grant replaces the row outright and resets it to the initial tier.
/// Zero means the row is deleted.
pub fn plan_grant(quantity: i32) -> Result<Holding, GachaError> {
    if quantity < 0 {
        return Err(GachaError::Validation(format!(
            "Granted quantity must not be negative, got {quantity}"
        )));
    }
    Ok(Holding::new(quantity, INITIAL_QUALITY_TIER))
}
