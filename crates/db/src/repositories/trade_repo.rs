//! Repository for the `trades` table.
//!
//! Proposals carry no escrow: the offered item stays with the proposer
//! until acceptance, which re-checks the holding under a row lock.

use cardpull_core::error::GachaError;
use cardpull_core::trade::{check_accept, check_cancel, validate_proposal, TradeStatus};
use cardpull_core::types::DbId;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::trade::{ProposeTrade, Trade};
use crate::repositories::OwnershipRepo;
use crate::{LedgerError, LedgerResult};

const COLUMNS: &str = "id, proposer_id, recipient_id, give_item_id, requested_item_name, \
    status, created_at, updated_at";

/// Units moved by an accepted trade.
const TRADE_UNITS: i32 = 1;

pub struct TradeRepo;

impl TradeRepo {
    /// Record a `PENDING` proposal. The proposer must currently own the
    /// offered item.
    pub async fn propose(pool: &PgPool, input: &ProposeTrade<'_>) -> LedgerResult<Trade> {
        validate_proposal(input.proposer_id, input.recipient_id, input.give_item_name)?;

        let mut conn = pool.acquire().await?;
        let owned = OwnershipRepo::find_by_item_name(
            &mut conn,
            input.proposer_id,
            input.give_item_name,
            false,
        )
        .await?
        .ok_or_else(|| GachaError::NotOwned(input.give_item_name.to_string()))?;

        let query = format!(
            "INSERT INTO trades (id, proposer_id, recipient_id, give_item_id, requested_item_name, status) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        let trade = sqlx::query_as::<_, Trade>(&query)
            .bind(Uuid::now_v7())
            .bind(input.proposer_id)
            .bind(input.recipient_id)
            .bind(owned.item_id)
            .bind(input.requested_item_name)
            .bind(TradeStatus::Pending.as_str())
            .fetch_one(&mut *conn)
            .await?;

        tracing::info!(
            trade_id = %trade.id,
            proposer_id = trade.proposer_id,
            recipient_id = trade.recipient_id,
            give_item_id = trade.give_item_id,
            "Trade proposed"
        );
        Ok(trade)
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Trade>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM trades WHERE id = $1");
        sqlx::query_as::<_, Trade>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    async fn lock(conn: &mut PgConnection, id: Uuid) -> LedgerResult<Trade> {
        let query = format!("SELECT {COLUMNS} FROM trades WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, Trade>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or(LedgerError::Domain(GachaError::TradeNotFound(id)))
    }

    async fn set_status(
        conn: &mut PgConnection,
        id: Uuid,
        status: TradeStatus,
    ) -> Result<Trade, sqlx::Error> {
        let query = format!(
            "UPDATE trades SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Trade>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_one(conn)
            .await
    }

    /// Withdraw a pending proposal. Only the proposer may cancel.
    pub async fn cancel(pool: &PgPool, id: Uuid, caller_id: DbId) -> LedgerResult<Trade> {
        let mut tx = pool.begin().await?;
        let trade = Self::lock(&mut tx, id).await?;
        check_cancel(trade.status()?, trade.proposer_id, caller_id)?;
        let trade = Self::set_status(&mut tx, id, TradeStatus::Canceled).await?;
        tx.commit().await?;

        tracing::info!(trade_id = %id, caller_id, "Trade canceled");
        Ok(trade)
    }

    /// Accept a pending proposal: move one unit of the offered item from
    /// proposer to recipient and mark the trade `ACCEPTED`, atomically.
    ///
    /// If the proposer no longer holds the item the trade stays `PENDING`
    /// and [`GachaError::StaleOffer`] is returned.
    pub async fn accept(pool: &PgPool, id: Uuid, caller_id: DbId) -> LedgerResult<Trade> {
        let mut tx = pool.begin().await?;
        let trade = Self::lock(&mut tx, id).await?;
        check_accept(trade.status()?, trade.recipient_id, caller_id)?;

        match OwnershipRepo::transfer_within(
            &mut tx,
            trade.proposer_id,
            trade.recipient_id,
            trade.give_item_id,
            TRADE_UNITS,
        )
        .await
        {
            Ok(()) => {}
            Err(LedgerError::Domain(GachaError::InsufficientQuantity { .. })) => {
                tracing::warn!(trade_id = %id, "Offered item no longer held by proposer");
                return Err(GachaError::StaleOffer.into());
            }
            Err(e) => return Err(e),
        }

        let trade = Self::set_status(&mut tx, id, TradeStatus::Accepted).await?;
        tx.commit().await?;

        tracing::info!(
            trade_id = %id,
            proposer_id = trade.proposer_id,
            recipient_id = trade.recipient_id,
            item_id = trade.give_item_id,
            "Trade accepted"
        );
        Ok(trade)
    }

    /// Pending proposals addressed to `recipient_id`, newest first.
    pub async fn list_pending_for(
        pool: &PgPool,
        recipient_id: DbId,
    ) -> Result<Vec<Trade>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM trades \
             WHERE recipient_id = $1 AND status = $2 \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Trade>(&query)
            .bind(recipient_id)
            .bind(TradeStatus::Pending.as_str())
            .fetch_all(pool)
            .await
    }
}
