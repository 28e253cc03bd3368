//! Repository for the `users` table.

use cardpull_core::types::{DbId, Timestamp, UserRef};
use sqlx::{PgConnection, PgPool};

use crate::models::user::User;

/// Column list for users queries.
const COLUMNS: &str = "id, external_id, display_name, total_draws, \
    common_count, rare_count, epic_count, legendary_count, mythic_count, \
    last_draw_at, pity_legendary, pity_mythic, created_at, updated_at";

pub struct UserRepo;

impl UserRepo {
    /// Fetch the user for `user_ref`, creating it on first interaction.
    ///
    /// The display name is refreshed on every call.
    pub async fn get_or_create(pool: &PgPool, user_ref: &UserRef) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (external_id, display_name) \
             VALUES ($1, $2) \
             ON CONFLICT (external_id) DO UPDATE \
             SET display_name = EXCLUDED.display_name \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&user_ref.id)
            .bind(&user_ref.display_name)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_external_id(
        pool: &PgPool,
        external_id: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE external_id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(external_id)
            .fetch_optional(pool)
            .await
    }

    /// Lock a user row for the rest of the caller's transaction.
    pub async fn lock(conn: &mut PgConnection, id: DbId) -> Result<User, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_one(conn)
            .await
    }

    /// Claim the draw slot: stamp `last_draw_at = now` only if the previous
    /// stamp is at or before `cutoff`.
    ///
    /// Check and stamp are one statement, so two overlapping requests from
    /// the same user cannot both win. Returns the updated row, or `None`
    /// when the cooldown is still running.
    pub async fn try_claim_draw_slot(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
        cutoff: Timestamp,
    ) -> Result<Option<User>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET last_draw_at = $2, updated_at = NOW() \
             WHERE id = $1 AND (last_draw_at IS NULL OR last_draw_at <= $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .bind(now)
            .bind(cutoff)
            .fetch_optional(pool)
            .await
    }
}
