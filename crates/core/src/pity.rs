//! Pity counters: forced rarity escalation after a run of lesser draws.
//!
//! Counters advance only when a draw is committed. Showing candidates never
//! touches them.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GachaError;
use crate::rarity::{Rarity, RarityTable, RarityTier};

/// Default streak length after which a Legendary is guaranteed.
pub const DEFAULT_LEGENDARY_THRESHOLD: i32 = 30;

/// Default streak length after which a Mythic is guaranteed.
pub const DEFAULT_MYTHIC_THRESHOLD: i32 = 100;

/// Pity thresholds. Both must be at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PityConfig {
    pub legendary_threshold: i32,
    pub mythic_threshold: i32,
}

impl PityConfig {
    pub fn new(legendary_threshold: i32, mythic_threshold: i32) -> Result<Self, GachaError> {
        if legendary_threshold < 1 || mythic_threshold < 1 {
            return Err(GachaError::Validation(
                "Pity thresholds must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            legendary_threshold,
            mythic_threshold,
        })
    }
}

impl Default for PityConfig {
    fn default() -> Self {
        Self {
            legendary_threshold: DEFAULT_LEGENDARY_THRESHOLD,
            mythic_threshold: DEFAULT_MYTHIC_THRESHOLD,
        }
    }
}

/// Per-user pity counters, read from storage for the span of one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PityState {
    pub legendary: i32,
    pub mythic: i32,
}

impl PityState {
    pub fn new(legendary: i32, mythic: i32) -> Self {
        Self { legendary, mythic }
    }

    /// The rarity pity forces on the next draw, if any. Mythic wins over
    /// Legendary when both are due.
    pub fn forced_rarity(&self, config: &PityConfig) -> Option<Rarity> {
        if self.mythic >= config.mythic_threshold - 1 {
            Some(Rarity::Mythic)
        } else if self.legendary >= config.legendary_threshold - 1 {
            Some(Rarity::Legendary)
        } else {
            None
        }
    }

    /// Counters after committing a draw of `outcome`.
    pub fn advance(self, outcome: Rarity, config: &PityConfig) -> Self {
        let bump = |value: i32, cap: i32| (value + 1).min(cap);
        match outcome {
            Rarity::Mythic => Self::default(),
            Rarity::Legendary => Self {
                legendary: 0,
                mythic: bump(self.mythic, config.mythic_threshold),
            },
            _ => Self {
                legendary: bump(self.legendary, config.legendary_threshold),
                mythic: bump(self.mythic, config.mythic_threshold),
            },
        }
    }
}

/// Pick the rarity for one candidate: pity first, weighted roll otherwise.
pub fn roll_with_pity<'a, R: Rng + ?Sized>(
    table: &'a RarityTable,
    pity: &PityState,
    config: &PityConfig,
    rng: &mut R,
) -> &'a RarityTier {
    match pity.forced_rarity(config) {
        Some(rarity) => table.tier(rarity),
        None => table.roll(rng),
    }
}
