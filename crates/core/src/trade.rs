//! Trade proposal state machine.
//!
//! `PENDING -> ACCEPTED` or `PENDING -> CANCELED`; terminal states are final.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GachaError;
use crate::types::DbId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeStatus {
    Pending,
    Accepted,
    Canceled,
}

impl TradeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TradeStatus::Pending => "PENDING",
            TradeStatus::Accepted => "ACCEPTED",
            TradeStatus::Canceled => "CANCELED",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, TradeStatus::Pending)
    }
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeStatus {
    type Err = GachaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(TradeStatus::Pending),
            "ACCEPTED" => Ok(TradeStatus::Accepted),
            "CANCELED" => Ok(TradeStatus::Canceled),
            other => Err(GachaError::Validation(format!(
                "Unknown trade status '{other}'"
            ))),
        }
    }
}

fn require_pending(status: TradeStatus) -> Result<(), GachaError> {
    if status.is_terminal() {
        return Err(GachaError::InvalidState(format!(
            "Trade is already {status}"
        )));
    }
    Ok(())
}

/// Check that `caller` may cancel a trade proposed by `proposer_id`.
pub fn check_cancel(status: TradeStatus, proposer_id: DbId, caller_id: DbId) -> Result<(), GachaError> {
    if caller_id != proposer_id {
        return Err(GachaError::NotAuthorized(
            "Only the proposer can cancel a trade".to_string(),
        ));
    }
    require_pending(status)
}

/// Check that `caller` may accept a trade addressed to `recipient_id`.
///
/// Holdings are re-validated separately by the ledger inside the accept
/// transaction.
pub fn check_accept(status: TradeStatus, recipient_id: DbId, caller_id: DbId) -> Result<(), GachaError> {
    if caller_id != recipient_id {
        return Err(GachaError::NotAuthorized(
            "Only the recipient can accept a trade".to_string(),
        ));
    }
    require_pending(status)
}

/// Validate a proposal before the database is touched.
pub fn validate_proposal(proposer_id: DbId, recipient_id: DbId, give_item_name: &str) -> Result<(), GachaError> {
    if proposer_id == recipient_id {
        return Err(GachaError::Validation(
            "Cannot propose a trade to yourself".to_string(),
        ));
    }
    if give_item_name.trim().is_empty() {
        return Err(GachaError::Validation(
            "Offered item name must not be empty".to_string(),
        ));
    }
    Ok(())
}
