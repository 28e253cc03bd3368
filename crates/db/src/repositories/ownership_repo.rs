//! Repository for the `ownerships` ledger.
//!
//! Every mutation that reads a quantity locks the row first
//! (`SELECT ... FOR UPDATE`), so concurrent operations on the same row
//! serialize and always apply against the latest committed quantity.

use cardpull_core::error::GachaError;
use cardpull_core::ledger::{plan_debit, plan_grant, plan_merge, Holding, INITIAL_QUALITY_TIER};
use cardpull_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::ownership::{InventoryEntry, Ownership};
use crate::repositories::ItemRepo;
use crate::LedgerResult;

const COLUMNS: &str = "user_id, item_id, quantity, quality_tier, created_at, updated_at";

/// Default number of inventory lines returned.
pub const DEFAULT_INVENTORY_LIMIT: i64 = 20;

/// Upper bound on inventory lines per request.
pub const MAX_INVENTORY_LIMIT: i64 = 100;

pub struct OwnershipRepo;

impl OwnershipRepo {
    /// Add `count` units of `item_id` to `user_id`.
    ///
    /// Inserts at the initial quality tier when absent, otherwise adds to
    /// the existing quantity and keeps its tier.
    pub async fn credit(
        conn: &mut PgConnection,
        user_id: DbId,
        item_id: DbId,
        count: i32,
    ) -> Result<Ownership, sqlx::Error> {
        let query = format!(
            "INSERT INTO ownerships (user_id, item_id, quantity, quality_tier) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (user_id, item_id) DO UPDATE \
             SET quantity = ownerships.quantity + EXCLUDED.quantity, updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ownership>(&query)
            .bind(user_id)
            .bind(item_id)
            .bind(count)
            .bind(INITIAL_QUALITY_TIER)
            .fetch_one(conn)
            .await
    }

    /// Acquire one unit: insert `(qty 1, tier 1)` or `qty += 1`.
    pub async fn acquire(
        conn: &mut PgConnection,
        user_id: DbId,
        item_id: DbId,
    ) -> Result<Ownership, sqlx::Error> {
        Self::credit(conn, user_id, item_id, 1).await
    }

    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        item_id: DbId,
    ) -> Result<Option<Ownership>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM ownerships WHERE user_id = $1 AND item_id = $2");
        sqlx::query_as::<_, Ownership>(&query)
            .bind(user_id)
            .bind(item_id)
            .fetch_optional(pool)
            .await
    }

    /// Lock the existing rows of `item_id` held by any of `user_ids`.
    ///
    /// Rows are locked in ascending `user_id` order, so two transactions
    /// locking the same pair from opposite ends cannot deadlock.
    async fn lock_holders(
        conn: &mut PgConnection,
        item_id: DbId,
        user_ids: &[DbId],
    ) -> Result<Vec<Ownership>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM ownerships \
             WHERE item_id = $1 AND user_id = ANY($2) \
             ORDER BY user_id ASC FOR UPDATE"
        );
        sqlx::query_as::<_, Ownership>(&query)
            .bind(item_id)
            .bind(user_ids)
            .fetch_all(conn)
            .await
    }

    /// Find a user's holding of an item by name.
    ///
    /// Names are not unique across groups; the oldest matching item wins.
    /// With `for_update` the ownership row is locked.
    pub async fn find_by_item_name(
        conn: &mut PgConnection,
        user_id: DbId,
        item_name: &str,
        for_update: bool,
    ) -> Result<Option<Ownership>, sqlx::Error> {
        let lock = if for_update { "FOR UPDATE OF o" } else { "" };
        let query = format!(
            "SELECT o.user_id, o.item_id, o.quantity, o.quality_tier, o.created_at, o.updated_at \
             FROM ownerships o JOIN items i ON i.id = o.item_id \
             WHERE o.user_id = $1 AND i.name = $2 AND o.quantity > 0 \
             ORDER BY o.item_id ASC LIMIT 1 {lock}"
        );
        sqlx::query_as::<_, Ownership>(&query)
            .bind(user_id)
            .bind(item_name)
            .fetch_optional(conn)
            .await
    }

    /// Write a new holding for an existing row, deleting it when empty.
    async fn store(
        conn: &mut PgConnection,
        user_id: DbId,
        item_id: DbId,
        holding: Holding,
    ) -> Result<Option<Ownership>, sqlx::Error> {
        if holding.is_empty() {
            sqlx::query("DELETE FROM ownerships WHERE user_id = $1 AND item_id = $2")
                .bind(user_id)
                .bind(item_id)
                .execute(conn)
                .await?;
            return Ok(None);
        }
        let query = format!(
            "UPDATE ownerships SET quantity = $3, quality_tier = $4, updated_at = NOW() \
             WHERE user_id = $1 AND item_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Ownership>(&query)
            .bind(user_id)
            .bind(item_id)
            .bind(holding.quantity)
            .bind(holding.quality_tier)
            .fetch_optional(conn)
            .await
    }

    /// Merge three duplicates of `item_name` into one unit of the next tier.
    pub async fn merge(pool: &PgPool, user_id: DbId, item_name: &str) -> LedgerResult<Ownership> {
        let mut tx = pool.begin().await?;

        let current = Self::find_by_item_name(&mut tx, user_id, item_name, true).await?;
        let item_id = current.as_ref().map(|o| o.item_id);
        let merged = plan_merge(current.map(|o| o.holding()), item_name)?;
        let item_id = item_id.ok_or_else(|| GachaError::NotOwned(item_name.to_string()))?;

        let row = Self::store(&mut tx, user_id, item_id, merged)
            .await?
            .ok_or(sqlx::Error::RowNotFound)?;
        tx.commit().await?;

        tracing::info!(
            user_id,
            item_id,
            quantity = row.quantity,
            quality_tier = row.quality_tier,
            "Merged ownership"
        );
        Ok(row)
    }

    /// Move `count` units of `item_id` between users inside the caller's
    /// transaction.
    ///
    /// The destination is credited as a fresh acquisition; the quality tier
    /// does not travel with the unit. Both rows are locked up front.
    pub async fn transfer_within(
        conn: &mut PgConnection,
        from_user_id: DbId,
        to_user_id: DbId,
        item_id: DbId,
        count: i32,
    ) -> LedgerResult<()> {
        let source = Self::lock_holders(&mut *conn, item_id, &[from_user_id, to_user_id])
            .await?
            .into_iter()
            .find(|o| o.user_id == from_user_id);
        let remaining = plan_debit(source.map(|o| o.holding()), count)?;
        Self::store(&mut *conn, from_user_id, item_id, remaining).await?;
        Self::credit(&mut *conn, to_user_id, item_id, count).await?;
        Ok(())
    }

    /// Atomic standalone transfer: both sides update or neither does.
    pub async fn transfer(
        pool: &PgPool,
        from_user_id: DbId,
        to_user_id: DbId,
        item_id: DbId,
        count: i32,
    ) -> LedgerResult<()> {
        let mut tx = pool.begin().await?;
        Self::transfer_within(&mut tx, from_user_id, to_user_id, item_id, count).await?;
        tx.commit().await?;
        tracing::info!(from_user_id, to_user_id, item_id, count, "Transferred ownership");
        Ok(())
    }

    /// Set a user's holding of `item_name` to exactly `quantity` units at
    /// the initial tier, creating or deleting the row as needed.
    ///
    /// The item must already exist in the catalog. Returns `None` when the
    /// row was removed.
    pub async fn grant(
        pool: &PgPool,
        user_id: DbId,
        item_name: &str,
        quantity: i32,
    ) -> LedgerResult<Option<Ownership>> {
        let holding = plan_grant(quantity)?;
        let mut tx = pool.begin().await?;
        let item = ItemRepo::find_by_name(&mut tx, item_name)
            .await?
            .ok_or_else(|| GachaError::UnknownItem(item_name.to_string()))?;

        let row = if holding.is_empty() {
            Self::store(&mut tx, user_id, item.id, holding).await?
        } else {
            let query = format!(
                "INSERT INTO ownerships (user_id, item_id, quantity, quality_tier) \
                 VALUES ($1, $2, $3, $4) \
                 ON CONFLICT (user_id, item_id) DO UPDATE \
                 SET quantity = EXCLUDED.quantity, \
                     quality_tier = EXCLUDED.quality_tier, \
                     updated_at = NOW() \
                 RETURNING {COLUMNS}"
            );
            let row = sqlx::query_as::<_, Ownership>(&query)
                .bind(user_id)
                .bind(item.id)
                .bind(holding.quantity)
                .bind(holding.quality_tier)
                .fetch_one(&mut *tx)
                .await?;
            Some(row)
        };
        tx.commit().await?;

        tracing::info!(user_id, item_id = item.id, quantity, "Granted ownership");
        Ok(row)
    }

    /// Owned items ordered by quantity (desc) then name.
    pub async fn list_inventory(
        pool: &PgPool,
        user_id: DbId,
        limit: i64,
    ) -> Result<Vec<InventoryEntry>, sqlx::Error> {
        sqlx::query_as::<_, InventoryEntry>(
            "SELECT i.id AS item_id, i.name, i.group_label, i.image_url, \
                    o.quantity, o.quality_tier \
             FROM ownerships o JOIN items i ON i.id = o.item_id \
             WHERE o.user_id = $1 \
             ORDER BY o.quantity DESC, i.name ASC \
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
