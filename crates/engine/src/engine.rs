use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use cardpull_anilist::AniListClient;
use cardpull_core::drawer::{draw_candidates, Candidate};
use cardpull_core::error::GachaError;
use cardpull_core::pools::{DuelPool, PocketPool};
use cardpull_core::rarity::RarityTable;
use cardpull_core::session::{cooldown_remaining, DrawSession, CANDIDATES_PER_DRAW};
use cardpull_core::source::CharacterSource;
use cardpull_core::types::{Timestamp, UserRef};
use cardpull_db::models::admin::GlobalStats;
use cardpull_db::models::banner::{Banner, SaveBanner};
use cardpull_db::models::ownership::{InventoryEntry, Ownership};
use cardpull_db::models::trade::{ProposeTrade, Trade};
use cardpull_db::models::user::{User, UserStats};
use cardpull_db::repositories::draw_repo::CommittedDraw;
use cardpull_db::repositories::ownership_repo::{DEFAULT_INVENTORY_LIMIT, MAX_INVENTORY_LIMIT};
use cardpull_db::repositories::{
    AdminRepo, BannerRepo, DrawRepo, ItemRepo, OwnershipRepo, TradeRepo, UserRepo,
};
use cardpull_db::{DbPool, LedgerResult};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::sessions::SessionStore;

// ---------------------------------------------------------------------------
// Draw pools
// ---------------------------------------------------------------------------

/// Which catalog a draw pulls from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawPool {
    /// Popular anime characters from the external source.
    #[default]
    Anime,
    /// Fixed duel-monster catalog.
    Duel,
    /// Fixed pocket-creature catalog.
    Pocket,
}

impl DrawPool {
    pub fn as_str(self) -> &'static str {
        match self {
            DrawPool::Anime => "anime",
            DrawPool::Duel => "duel",
            DrawPool::Pocket => "pocket",
        }
    }
}

impl fmt::Display for DrawPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DrawPool {
    type Err = GachaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anime" => Ok(DrawPool::Anime),
            "duel" => Ok(DrawPool::Duel),
            "pocket" => Ok(DrawPool::Pocket),
            other => Err(GachaError::Validation(format!("Unknown draw pool '{other}'"))),
        }
    }
}

/// Candidates on offer, as handed to the front-end.
#[derive(Debug, Clone, Serialize)]
pub struct DrawOffer {
    pub session_id: Uuid,
    pub pool: DrawPool,
    pub candidates: Vec<Candidate>,
    pub banner_name: Option<String>,
    pub deadline: Timestamp,
}

fn require_admin(is_admin: bool, action: &str) -> Result<(), GachaError> {
    if is_admin {
        Ok(())
    } else {
        Err(GachaError::NotAuthorized(format!("{action} requires admin")))
    }
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Entry point for every front-end operation.
pub struct GachaEngine {
    pool: DbPool,
    config: EngineConfig,
    table: RarityTable,
    anime: Arc<dyn CharacterSource>,
    duel: DuelPool,
    pocket: PocketPool,
    sessions: SessionStore,
}

impl GachaEngine {
    pub fn new(
        pool: DbPool,
        config: EngineConfig,
        table: RarityTable,
        anime: Arc<dyn CharacterSource>,
    ) -> Self {
        Self {
            pool,
            config,
            table,
            anime,
            duel: DuelPool,
            pocket: PocketPool,
            sessions: SessionStore::new(),
        }
    }

    /// Engine backed by the AniList client configured in `config`.
    pub fn with_anilist(pool: DbPool, config: EngineConfig) -> Self {
        let client = AniListClient::new(config.anilist_url.clone(), config.anilist_per_page);
        Self::new(pool, config, RarityTable::default(), Arc::new(client))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    fn source(&self, pool: DrawPool) -> &dyn CharacterSource {
        match pool {
            DrawPool::Anime => self.anime.as_ref(),
            DrawPool::Duel => &self.duel,
            DrawPool::Pocket => &self.pocket,
        }
    }

    async fn resolve_user(&self, user: &UserRef) -> LedgerResult<User> {
        Ok(UserRepo::get_or_create(&self.pool, user).await?)
    }

    // ---- draws ----

    /// Claim the cooldown slot and present three candidates.
    ///
    /// The cooldown is consumed before any source call and is not refunded
    /// if drawing fails.
    pub async fn start_draw(&self, user: &UserRef, pool: DrawPool) -> LedgerResult<DrawOffer> {
        let user = self.resolve_user(user).await?;
        let now = Utc::now();
        let cutoff = now - self.config.cooldown();

        let Some(claimed) =
            UserRepo::try_claim_draw_slot(&self.pool, user.id, now, cutoff).await?
        else {
            let last = UserRepo::find_by_id(&self.pool, user.id)
                .await?
                .and_then(|u| u.last_draw_at)
                .or(user.last_draw_at);
            let remaining_secs =
                cooldown_remaining(last, now, self.config.cooldown_secs).unwrap_or(1);
            tracing::debug!(user_id = user.id, remaining_secs, "Draw rejected by cooldown");
            return Err(GachaError::CooldownActive { remaining_secs }.into());
        };

        let banner = BannerRepo::active(&self.pool).await?;
        let bias = banner.as_ref().map(Banner::bias);
        let pity = claimed.pity();

        let mut rng = StdRng::from_os_rng();
        let candidates = match draw_candidates(
            self.source(pool),
            &self.table,
            &pity,
            &self.config.pity,
            bias.as_ref(),
            CANDIDATES_PER_DRAW,
            &mut rng,
        )
        .await
        {
            Ok(candidates) => candidates,
            Err(e) => {
                tracing::warn!(
                    user_id = user.id,
                    pool = %pool,
                    source = self.source(pool).name(),
                    error = %e,
                    "Draw failed, cooldown consumed"
                );
                return Err(e.into());
            }
        };

        let session = DrawSession::open(
            user.id,
            candidates,
            banner.map(|b| b.name),
            Utc::now(),
            self.config.choice_timeout(),
        )?;
        let offer = DrawOffer {
            session_id: session.id,
            pool,
            candidates: session.candidates.clone(),
            banner_name: session.banner_name.clone(),
            deadline: session.deadline,
        };
        self.sessions.insert(session).await;

        tracing::info!(
            user_id = user.id,
            session_id = %offer.session_id,
            pool = %pool,
            banner = offer.banner_name.as_deref().unwrap_or("-"),
            "Draw offered"
        );
        Ok(offer)
    }

    /// Commit the candidate at `index` for the user who started the draw.
    pub async fn confirm_choice(
        &self,
        session_id: Uuid,
        caller: &UserRef,
        index: usize,
    ) -> LedgerResult<CommittedDraw> {
        let caller = self.resolve_user(caller).await?;
        let candidate = self
            .sessions
            .take_choice(session_id, caller.id, index, Utc::now())
            .await?;

        match DrawRepo::commit_choice(&self.pool, caller.id, &candidate, &self.config.pity).await {
            Ok(committed) => Ok(committed),
            Err(e) => {
                tracing::error!(
                    user_id = caller.id,
                    session_id = %session_id,
                    error = %e,
                    "Failed to commit draw, session discarded"
                );
                Err(e)
            }
        }
    }

    /// Discard an open session. Nothing is persisted.
    pub async fn expire(&self, session_id: Uuid) -> LedgerResult<()> {
        self.sessions.expire(session_id).await?;
        tracing::debug!(session_id = %session_id, "Draw session expired");
        Ok(())
    }

    /// Discard every session past its deadline.
    pub async fn expire_overdue(&self) -> usize {
        self.sessions.expire_overdue(Utc::now()).await
    }

    // ---- ledger ----

    pub async fn merge(&self, user: &UserRef, item_name: &str) -> LedgerResult<Ownership> {
        let user = self.resolve_user(user).await?;
        OwnershipRepo::merge(&self.pool, user.id, item_name.trim()).await
    }

    /// Owned items, most duplicated first. `limit` defaults to 20 and is
    /// capped at 100.
    pub async fn inventory(
        &self,
        user: &UserRef,
        limit: Option<i64>,
    ) -> LedgerResult<Vec<InventoryEntry>> {
        let user = self.resolve_user(user).await?;
        let limit = limit
            .unwrap_or(DEFAULT_INVENTORY_LIMIT)
            .clamp(1, MAX_INVENTORY_LIMIT);
        Ok(OwnershipRepo::list_inventory(&self.pool, user.id, limit).await?)
    }

    pub async fn stats(&self, user: &UserRef) -> LedgerResult<UserStats> {
        let user = self.resolve_user(user).await?;
        Ok(UserStats::from(&user))
    }

    pub async fn search_item_names(&self, fragment: &str) -> LedgerResult<Vec<String>> {
        Ok(ItemRepo::search_names(&self.pool, fragment.trim()).await?)
    }

    // ---- trades ----

    pub async fn propose_trade(
        &self,
        proposer: &UserRef,
        recipient: &UserRef,
        give_item_name: &str,
        requested_item_name: Option<&str>,
    ) -> LedgerResult<Trade> {
        let proposer = self.resolve_user(proposer).await?;
        let recipient = self.resolve_user(recipient).await?;
        let requested = requested_item_name
            .map(str::trim)
            .filter(|s| !s.is_empty());
        TradeRepo::propose(
            &self.pool,
            &ProposeTrade {
                proposer_id: proposer.id,
                recipient_id: recipient.id,
                give_item_name: give_item_name.trim(),
                requested_item_name: requested,
            },
        )
        .await
    }

    pub async fn accept_trade(&self, trade_id: Uuid, caller: &UserRef) -> LedgerResult<Trade> {
        let caller = self.resolve_user(caller).await?;
        TradeRepo::accept(&self.pool, trade_id, caller.id).await
    }

    pub async fn cancel_trade(&self, trade_id: Uuid, caller: &UserRef) -> LedgerResult<Trade> {
        let caller = self.resolve_user(caller).await?;
        TradeRepo::cancel(&self.pool, trade_id, caller.id).await
    }

    /// Pending proposals addressed to `user`, newest first.
    pub async fn pending_trades(&self, user: &UserRef) -> LedgerResult<Vec<Trade>> {
        let user = self.resolve_user(user).await?;
        Ok(TradeRepo::list_pending_for(&self.pool, user.id).await?)
    }

    pub async fn get_trade(&self, trade_id: Uuid) -> LedgerResult<Trade> {
        TradeRepo::find_by_id(&self.pool, trade_id)
            .await?
            .ok_or_else(|| GachaError::TradeNotFound(trade_id).into())
    }

    // ---- banners ----

    pub async fn upsert_banner(&self, is_admin: bool, input: &SaveBanner) -> LedgerResult<Banner> {
        require_admin(is_admin, "Saving a banner")?;
        BannerRepo::upsert(&self.pool, input).await
    }

    /// Returns whether a banner by that name existed.
    pub async fn remove_banner(&self, is_admin: bool, name: &str) -> LedgerResult<bool> {
        require_admin(is_admin, "Removing a banner")?;
        Ok(BannerRepo::remove(&self.pool, name.trim()).await?)
    }

    pub async fn set_active_banner(&self, is_admin: bool, name: &str) -> LedgerResult<Banner> {
        require_admin(is_admin, "Activating a banner")?;
        BannerRepo::set_active(&self.pool, name.trim()).await
    }

    pub async fn clear_active_banner(&self, is_admin: bool) -> LedgerResult<()> {
        require_admin(is_admin, "Clearing the active banner")?;
        Ok(BannerRepo::clear_active(&self.pool).await?)
    }

    pub async fn list_banners(&self) -> LedgerResult<Vec<Banner>> {
        Ok(BannerRepo::list(&self.pool).await?)
    }

    pub async fn active_banner(&self) -> LedgerResult<Option<Banner>> {
        Ok(BannerRepo::active(&self.pool).await?)
    }

    // ---- admin ----

    /// Wipe all gacha data. Open sessions are dropped too.
    pub async fn admin_reset(&self, is_admin: bool) -> LedgerResult<()> {
        require_admin(is_admin, "Resetting all data")?;
        AdminRepo::reset_all(&self.pool).await?;
        let dropped = self.sessions.clear().await;
        tracing::warn!(dropped_sessions = dropped, "Admin reset complete");
        Ok(())
    }

    pub async fn admin_stats(&self, is_admin: bool) -> LedgerResult<GlobalStats> {
        require_admin(is_admin, "Reading global stats")?;
        Ok(AdminRepo::global_stats(&self.pool).await?)
    }

    /// Set `target`'s holding of an existing catalog item to exactly
    /// `quantity` units at tier 1. Zero removes the holding.
    pub async fn admin_give(
        &self,
        is_admin: bool,
        target: &UserRef,
        item_name: &str,
        quantity: i32,
    ) -> LedgerResult<Option<Ownership>> {
        require_admin(is_admin, "Granting items")?;
        let target = self.resolve_user(target).await?;
        let row = OwnershipRepo::grant(&self.pool, target.id, item_name.trim(), quantity).await?;
        tracing::warn!(user_id = target.id, item = %item_name.trim(), quantity, "Admin grant");
        Ok(row)
    }
}
