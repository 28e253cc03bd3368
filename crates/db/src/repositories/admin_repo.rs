//! Administrative maintenance.

use sqlx::PgPool;

use crate::models::admin::GlobalStats;

pub struct AdminRepo;

impl AdminRepo {
    /// Count users, catalog items and ownership rows.
    pub async fn global_stats(pool: &PgPool) -> Result<GlobalStats, sqlx::Error> {
        sqlx::query_as::<_, GlobalStats>(
            "SELECT (SELECT COUNT(*) FROM users) AS users, \
                    (SELECT COUNT(*) FROM items) AS items, \
                    (SELECT COUNT(*) FROM ownerships) AS ownerships",
        )
        .fetch_one(pool)
        .await
    }

    /// Wipe users, items, ownerships, trades and banners.
    ///
    /// All or nothing. The `banner_state` row itself survives with its
    /// pointer cleared.
    pub async fn reset_all(pool: &PgPool) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query("UPDATE banner_state SET active_banner_name = NULL, updated_at = NOW()")
            .execute(&mut *tx)
            .await?;
        for table in ["trades", "ownerships", "items", "users", "banners"] {
            let result = sqlx::query(&format!("DELETE FROM {table}"))
                .execute(&mut *tx)
                .await?;
            tracing::debug!(table, rows = result.rows_affected(), "Cleared table");
        }
        tx.commit().await?;
        tracing::warn!("All gacha data reset");
        Ok(())
    }
}
