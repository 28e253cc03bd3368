//! Repository for `banners` and the single-row `banner_state` pointer.

use cardpull_core::banner::validate_banner;
use cardpull_core::error::GachaError;
use sqlx::PgPool;

use crate::models::banner::{Banner, SaveBanner};
use crate::LedgerResult;

const COLUMNS: &str = "name, focus_labels, bonus_percent, created_at, updated_at";

pub struct BannerRepo;

impl BannerRepo {
    /// Create or replace a banner by name.
    pub async fn upsert(pool: &PgPool, input: &SaveBanner) -> LedgerResult<Banner> {
        let name = input.name.trim();
        let labels: Vec<String> = input
            .focus_labels
            .iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        validate_banner(name, &labels, input.bonus_percent)?;

        let query = format!(
            "INSERT INTO banners (name, focus_labels, bonus_percent) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (name) DO UPDATE \
             SET focus_labels = EXCLUDED.focus_labels, \
                 bonus_percent = EXCLUDED.bonus_percent, \
                 updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        let banner = sqlx::query_as::<_, Banner>(&query)
            .bind(name)
            .bind(&labels)
            .bind(input.bonus_percent)
            .fetch_one(pool)
            .await?;

        tracing::info!(banner = %banner.name, bonus = banner.bonus_percent, "Banner saved");
        Ok(banner)
    }

    pub async fn find_by_name(pool: &PgPool, name: &str) -> Result<Option<Banner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM banners WHERE name = $1");
        sqlx::query_as::<_, Banner>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<Banner>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM banners ORDER BY name ASC");
        sqlx::query_as::<_, Banner>(&query).fetch_all(pool).await
    }

    /// Delete a banner. If it was active the pointer is cleared in the same
    /// transaction. Removing a missing name is a no-op; returns whether a
    /// banner was deleted.
    pub async fn remove(pool: &PgPool, name: &str) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query(
            "UPDATE banner_state SET active_banner_name = NULL, updated_at = NOW() \
             WHERE active_banner_name = $1",
        )
        .bind(name)
        .execute(&mut *tx)
        .await?;
        let result = sqlx::query("DELETE FROM banners WHERE name = $1")
            .bind(name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let removed = result.rows_affected() > 0;
        tracing::info!(banner = %name, removed, "Banner removed");
        Ok(removed)
    }

    /// Point the active banner at `name`, which must exist.
    pub async fn set_active(pool: &PgPool, name: &str) -> LedgerResult<Banner> {
        let banner = Self::find_by_name(pool, name)
            .await?
            .ok_or_else(|| GachaError::UnknownBanner(name.to_string()))?;
        sqlx::query(
            "UPDATE banner_state SET active_banner_name = $1, updated_at = NOW() WHERE id",
        )
        .bind(&banner.name)
        .execute(pool)
        .await?;

        tracing::info!(banner = %banner.name, "Active banner set");
        Ok(banner)
    }

    pub async fn clear_active(pool: &PgPool) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE banner_state SET active_banner_name = NULL, updated_at = NOW() WHERE id",
        )
        .execute(pool)
        .await?;
        tracing::info!("Active banner cleared");
        Ok(())
    }

    /// The active banner, if one is set.
    pub async fn active(pool: &PgPool) -> Result<Option<Banner>, sqlx::Error> {
        sqlx::query_as::<_, Banner>(
            "SELECT b.name, b.focus_labels, b.bonus_percent, b.created_at, b.updated_at \
             FROM banner_state s JOIN banners b ON b.name = s.active_banner_name \
             WHERE s.id",
        )
        .fetch_optional(pool)
        .await
    }
}
