use cardpull_core::error::GachaError;
use cardpull_core::trade::TradeStatus;
use cardpull_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A row from the `trades` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Trade {
    pub id: Uuid,
    pub proposer_id: DbId,
    pub recipient_id: DbId,
    pub give_item_id: DbId,
    pub requested_item_name: Option<String>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Trade {
    pub fn status(&self) -> Result<TradeStatus, GachaError> {
        self.status.parse()
    }
}

/// Input for a new trade proposal.
#[derive(Debug, Clone)]
pub struct ProposeTrade<'a> {
    pub proposer_id: DbId,
    pub recipient_id: DbId,
    pub give_item_name: &'a str,
    pub requested_item_name: Option<&'a str>,
}
