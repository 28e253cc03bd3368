//! User rows: identity, lifetime counters, cooldown stamp and pity.

use cardpull_core::pity::PityState;
use cardpull_core::rarity::Rarity;
use cardpull_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct User {
    pub id: DbId,
    pub external_id: String,
    pub display_name: String,
    pub total_draws: i32,
    pub common_count: i32,
    pub rare_count: i32,
    pub epic_count: i32,
    pub legendary_count: i32,
    pub mythic_count: i32,
    pub last_draw_at: Option<Timestamp>,
    pub pity_legendary: i32,
    pub pity_mythic: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn pity(&self) -> PityState {
        PityState::new(self.pity_legendary, self.pity_mythic)
    }

    /// Lifetime committed draws of `rarity`.
    pub fn count_for(&self, rarity: Rarity) -> i32 {
        match rarity {
            Rarity::Common => self.common_count,
            Rarity::Rare => self.rare_count,
            Rarity::Epic => self.epic_count,
            Rarity::Legendary => self.legendary_count,
            Rarity::Mythic => self.mythic_count,
        }
    }
}

/// Read model for the stats query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStats {
    pub user_id: DbId,
    pub total_draws: i32,
    pub per_rarity: Vec<(Rarity, i32)>,
    pub pity: PityState,
}

impl From<&User> for UserStats {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            total_draws: user.total_draws,
            per_rarity: Rarity::ALL.iter().map(|r| (*r, user.count_for(*r))).collect(),
            pity: user.pity(),
        }
    }
}
