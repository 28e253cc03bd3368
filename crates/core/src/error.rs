use uuid::Uuid;

/// Domain errors surfaced to the front-end.
///
/// Every variant is recoverable; the caller renders each one as a distinct
/// message. Storage failures are not part of this enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GachaError {
    #[error("Draw cooldown active: {remaining_secs}s remaining")]
    CooldownActive { remaining_secs: i64 },

    #[error("Character source unavailable")]
    ExternalSourceUnavailable,

    #[error("Draw session expired")]
    SessionExpired,

    #[error("Draw session not found")]
    SessionNotFound,

    #[error("Invalid choice index {0}")]
    InvalidChoice(usize),

    #[error("Item not owned: {0}")]
    NotOwned(String),

    #[error("Insufficient quantity: have {have}, need {need}")]
    InsufficientQuantity { have: i32, need: i32 },

    #[error("Item already at max quality tier {0}")]
    MaxTierReached(i32),

    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Offer is stale: the proposer no longer holds the offered item")]
    StaleOffer,

    #[error("Unknown item: {0}")]
    UnknownItem(String),

    #[error("Unknown banner: {0}")]
    UnknownBanner(String),

    #[error("Trade not found: {0}")]
    TradeNotFound(Uuid),

    #[error("Validation failed: {0}")]
    Validation(String),
}
