//! Repository for the `items` catalog.

use sqlx::{PgConnection, PgPool};

use crate::models::item::{Item, NewItem};

const COLUMNS: &str = "id, name, group_label, image_url, created_at";

/// Maximum rows returned by a name search.
pub const SEARCH_LIMIT: i64 = 25;

pub struct ItemRepo;

impl ItemRepo {
    /// Resolve `(name, group_label)` to its item row, inserting it if absent.
    ///
    /// The no-op `DO UPDATE` makes `RETURNING` yield the existing row on
    /// conflict. The image of an existing item is never overwritten.
    pub async fn upsert(conn: &mut PgConnection, input: &NewItem<'_>) -> Result<Item, sqlx::Error> {
        let query = format!(
            "INSERT INTO items (name, group_label, image_url) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (name, group_label) DO UPDATE SET name = items.name \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Item>(&query)
            .bind(input.name)
            .bind(input.group_label)
            .bind(input.image_url)
            .fetch_one(conn)
            .await
    }

    /// The oldest item called `name`, across all groups.
    pub async fn find_by_name(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<Item>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE name = $1 ORDER BY id ASC LIMIT 1");
        sqlx::query_as::<_, Item>(&query)
            .bind(name)
            .fetch_optional(conn)
            .await
    }

    /// Distinct item names containing `fragment`, case-insensitive.
    pub async fn search_names(pool: &PgPool, fragment: &str) -> Result<Vec<String>, sqlx::Error> {
        let pattern = format!("%{}%", escape_like(fragment));
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT name FROM items \
             WHERE name ILIKE $1 ESCAPE '\\' \
             ORDER BY name LIMIT $2",
        )
        .bind(pattern)
        .bind(SEARCH_LIMIT)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}

/// Escape `%`, `_` and `\` so user input matches literally in `LIKE`.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
