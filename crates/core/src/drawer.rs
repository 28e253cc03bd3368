//! Candidate drawing with banner bias and bounded reroll.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::banner::BannerBias;
use crate::error::GachaError;
use crate::pity::{roll_with_pity, PityConfig, PityState};
use crate::rarity::{DisplayClass, Rarity, RarityTable, RarityTier};
use crate::source::{CardStats, CharacterSource, SourceCharacter};

/// Hard cap on source calls spent on one candidate.
pub const MAX_FETCH_ATTEMPTS: u32 = 4;

/// A drawn, not yet chosen, card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub rarity: Rarity,
    pub display: DisplayClass,
    pub name: String,
    pub group: String,
    pub image_url: Option<String>,
    pub form: Option<String>,
    pub stats: Option<CardStats>,
    /// Whether the active banner's focus matched this candidate's group.
    pub banner_match: bool,
    /// Source calls spent producing this candidate.
    pub attempts: u32,
}

/// Draw one candidate of the given tier.
///
/// Without a banner the first fetched character is accepted. With a banner,
/// a non-matching character is discarded with probability
/// [`BannerBias::reroll_chance`] while fewer than [`MAX_FETCH_ATTEMPTS`]
/// calls have been made. An empty fetch fails the candidate.
pub async fn draw_candidate<R: RngCore + Send>(
    source: &dyn CharacterSource,
    tier: &RarityTier,
    banner: Option<&BannerBias>,
    rng: &mut R,
) -> Result<Candidate, GachaError> {
    let mut attempts = 0;
    loop {
        let mut pool = source.fetch(tier, rng).await;
        attempts += 1;
        if pool.is_empty() {
            return Err(GachaError::ExternalSourceUnavailable);
        }
        let picked = pool.swap_remove(rng.random_range(0..pool.len()));

        let Some(bias) = banner else {
            return Ok(accept(source, tier, picked, false, attempts, rng));
        };
        if bias.matches(&picked.group) {
            return Ok(accept(source, tier, picked, true, attempts, rng));
        }
        let roll: f64 = rng.random();
        if roll < bias.reroll_chance() && attempts < MAX_FETCH_ATTEMPTS {
            continue;
        }
        return Ok(accept(source, tier, picked, false, attempts, rng));
    }
}

/// Draw `count` candidates against one pity snapshot.
///
/// Every candidate sees the same pity state: counters only move when a
/// choice is committed. Fails as a whole if any single candidate fails.
pub async fn draw_candidates<R: RngCore + Send>(
    source: &dyn CharacterSource,
    table: &RarityTable,
    pity: &PityState,
    pity_config: &PityConfig,
    banner: Option<&BannerBias>,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Candidate>, GachaError> {
    let mut candidates = Vec::with_capacity(count);
    for _ in 0..count {
        let tier = roll_with_pity(table, pity, pity_config, rng);
        candidates.push(draw_candidate(source, tier, banner, rng).await?);
    }
    Ok(candidates)
}

fn accept<R: Rng + ?Sized>(
    source: &dyn CharacterSource,
    tier: &RarityTier,
    picked: SourceCharacter,
    banner_match: bool,
    attempts: u32,
    rng: &mut R,
) -> Candidate {
    let stats = source.stat_ranges(tier.rarity).map(|ranges| CardStats {
        hp: rng.random_range(ranges.hp.0..=ranges.hp.1),
        dmg: rng.random_range(ranges.dmg.0..=ranges.dmg.1),
    });
    Candidate {
        rarity: tier.rarity,
        display: tier.display,
        name: picked.name,
        group: picked.group,
        image_url: picked.image_url,
        form: picked.form,
        stats,
        banner_match,
        attempts,
    }
}
