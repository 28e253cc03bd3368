//! Rarity tiers and the weighted rarity roll.
//!
//! The table is an immutable value built once at startup. Tiers are kept in
//! commonality order, Common first. A zero-weight tier is never selected.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::GachaError;

// ---------------------------------------------------------------------------
// Rarity
// ---------------------------------------------------------------------------

/// Outcome class of a draw, ordered from most to least common.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Mythic,
}

impl Rarity {
    /// All rarities in declared (commonality) order.
    pub const ALL: [Rarity; 5] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    /// Short storage key, e.g. `"LEG"`.
    pub fn key(self) -> &'static str {
        match self {
            Rarity::Common => "C",
            Rarity::Rare => "R",
            Rarity::Epic => "EP",
            Rarity::Legendary => "LEG",
            Rarity::Mythic => "MYTH",
        }
    }

    /// Position in [`Rarity::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Rarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Rarity {
    type Err = GachaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rarity::ALL
            .into_iter()
            .find(|r| r.key().eq_ignore_ascii_case(s))
            .ok_or_else(|| GachaError::Validation(format!("Unknown rarity '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Tier metadata
// ---------------------------------------------------------------------------

/// Popularity-rank window used to bias the character fetch toward
/// characters of a given fame tier. Inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankWindow {
    pub low: u32,
    pub high: u32,
}

impl RankWindow {
    pub const fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }
}

/// Display weight class handed to the front-end for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayClass {
    Grey,
    Blue,
    Purple,
    Gold,
    Red,
}

/// One row of the rarity table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RarityTier {
    pub rarity: Rarity,
    pub weight: u32,
    pub rank_window: RankWindow,
    pub display: DisplayClass,
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Immutable weighted catalog of rarity tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RarityTable {
    tiers: Vec<RarityTier>,
    total_weight: u32,
}

impl RarityTable {
    /// Build a table from tiers given in [`Rarity::ALL`] order.
    ///
    /// Every rarity must appear exactly once, in order, and the total
    /// weight must be positive.
    pub fn new(tiers: Vec<RarityTier>) -> Result<Self, GachaError> {
        let in_order = tiers.len() == Rarity::ALL.len()
            && tiers.iter().zip(Rarity::ALL).all(|(t, r)| t.rarity == r);
        if !in_order {
            return Err(GachaError::Validation(
                "Rarity table must list every rarity once, Common first".to_string(),
            ));
        }
        if let Some(bad) = tiers.iter().find(|t| t.rank_window.low > t.rank_window.high) {
            return Err(GachaError::Validation(format!(
                "Rank window for {} is inverted",
                bad.rarity
            )));
        }

        let total_weight = tiers.iter().map(|t| t.weight).sum::<u32>();
        if total_weight == 0 {
            return Err(GachaError::Validation(
                "Rarity weights must sum to a positive total".to_string(),
            ));
        }

        Ok(Self {
            tiers,
            total_weight,
        })
    }

    pub fn tiers(&self) -> &[RarityTier] {
        &self.tiers
    }

    pub fn total_weight(&self) -> u32 {
        self.total_weight
    }

    /// Look up the tier row for a rarity.
    pub fn tier(&self, rarity: Rarity) -> &RarityTier {
        // `new` guarantees one row per rarity at its own index.
        &self.tiers[rarity.index()]
    }

    /// Weighted draw: discrete inverse-CDF over the declared order.
    pub fn roll<R: Rng + ?Sized>(&self, rng: &mut R) -> &RarityTier {
        let mut x = rng.random_range(0..self.total_weight);
        for tier in &self.tiers {
            if x < tier.weight {
                return tier;
            }
            x -= tier.weight;
        }
        &self.tiers[0]
    }
}

impl Default for RarityTable {
    /// The reference 60/25/10/4/1 table.
    fn default() -> Self {
        let tier = |rarity, weight, low, high, display| RarityTier {
            rarity,
            weight,
            rank_window: RankWindow::new(low, high),
            display,
        };
        Self {
            tiers: vec![
                tier(Rarity::Common, 60, 1, 10, DisplayClass::Grey),
                tier(Rarity::Rare, 25, 11, 30, DisplayClass::Blue),
                tier(Rarity::Epic, 10, 31, 80, DisplayClass::Purple),
                tier(Rarity::Legendary, 4, 81, 150, DisplayClass::Gold),
                tier(Rarity::Mythic, 1, 151, 300, DisplayClass::Red),
            ],
            total_weight: 100,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
