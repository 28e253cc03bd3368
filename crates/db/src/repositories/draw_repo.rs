//! Commit of a chosen draw candidate.

use cardpull_core::drawer::Candidate;
use cardpull_core::pity::{PityConfig, PityState};
use cardpull_core::rarity::Rarity;
use cardpull_core::types::DbId;
use serde::Serialize;
use sqlx::PgPool;

use crate::models::item::{Item, NewItem};
use crate::models::ownership::Ownership;
use crate::repositories::{ItemRepo, OwnershipRepo, UserRepo};
use crate::LedgerResult;

/// Outcome of a committed draw.
#[derive(Debug, Clone, Serialize)]
pub struct CommittedDraw {
    pub item: Item,
    pub ownership: Ownership,
    pub rarity: Rarity,
    pub pity: PityState,
    pub total_draws: i32,
}

/// Per-rarity counter column. Fixed set, never user input.
fn counter_column(rarity: Rarity) -> &'static str {
    match rarity {
        Rarity::Common => "common_count",
        Rarity::Rare => "rare_count",
        Rarity::Epic => "epic_count",
        Rarity::Legendary => "legendary_count",
        Rarity::Mythic => "mythic_count",
    }
}

pub struct DrawRepo;

impl DrawRepo {
    /// Persist a chosen candidate for `user_id`.
    ///
    /// In one transaction: lock the user, create the item if absent,
    /// acquire one unit, advance pity from the committed counters, and bump
    /// the lifetime counters. Pity advances exactly once per call.
    pub async fn commit_choice(
        pool: &PgPool,
        user_id: DbId,
        candidate: &Candidate,
        pity_config: &PityConfig,
    ) -> LedgerResult<CommittedDraw> {
        let mut tx = pool.begin().await?;

        let user = UserRepo::lock(&mut tx, user_id).await?;
        let item = ItemRepo::upsert(
            &mut tx,
            &NewItem {
                name: &candidate.name,
                group_label: &candidate.group,
                image_url: candidate.image_url.as_deref(),
            },
        )
        .await?;
        let ownership = OwnershipRepo::acquire(&mut tx, user.id, item.id).await?;

        let pity = user.pity().advance(candidate.rarity, pity_config);
        let column = counter_column(candidate.rarity);
        let query = format!(
            "UPDATE users SET total_draws = total_draws + 1, {column} = {column} + 1, \
             pity_legendary = $2, pity_mythic = $3, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING total_draws"
        );
        let total_draws: i32 = sqlx::query_scalar(&query)
            .bind(user.id)
            .bind(pity.legendary)
            .bind(pity.mythic)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!(
            user_id,
            item_id = item.id,
            rarity = %candidate.rarity,
            quantity = ownership.quantity,
            pity_legendary = pity.legendary,
            pity_mythic = pity.mythic,
            "Draw committed"
        );
        Ok(CommittedDraw {
            item,
            ownership,
            rarity: candidate.rarity,
            pity,
            total_draws,
        })
    }
}
