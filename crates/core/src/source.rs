//! The character source seam.
//!
//! The AniList client and the fixed local pools both implement
//! [`CharacterSource`]; the drawer only ever talks to the trait.

use async_trait::async_trait;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::rarity::{Rarity, RarityTier};

/// One character as returned by a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCharacter {
    pub name: String,
    pub group: String,
    pub image_url: Option<String>,
    /// Pool-specific form label (e.g. `"mega"`), if the pool has forms.
    pub form: Option<String>,
}

impl SourceCharacter {
    pub fn new(name: impl Into<String>, group: impl Into<String>, image_url: Option<String>) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            image_url,
            form: None,
        }
    }
}

/// Inclusive stat ranges for one rarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatRanges {
    pub hp: (i32, i32),
    pub dmg: (i32, i32),
}

/// Battle stats rolled for a candidate. Display-only, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardStats {
    pub hp: i32,
    pub dmg: i32,
}

/// Produces characters for a rarity tier.
#[async_trait]
pub trait CharacterSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch the characters available for `tier`.
    ///
    /// Failures and "no data" both come back as an empty vector; the caller
    /// treats that as a failed candidate.
    async fn fetch(
        &self,
        tier: &RarityTier,
        rng: &mut (dyn RngCore + Send),
    ) -> Vec<SourceCharacter>;

    /// Stat ranges for pools that roll battle stats.
    fn stat_ranges(&self, _rarity: Rarity) -> Option<StatRanges> {
        None
    }
}
