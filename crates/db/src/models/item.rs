use cardpull_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `items` table. Unique on `(name, group_label)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Item {
    pub id: DbId,
    pub name: String,
    pub group_label: String,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
}

/// Input for the create-if-absent upsert.
#[derive(Debug, Clone)]
pub struct NewItem<'a> {
    pub name: &'a str,
    pub group_label: &'a str,
    pub image_url: Option<&'a str>,
}
