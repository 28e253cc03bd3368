//! Domain core of the draw-and-ledger engine.
//!
//! Pure rules with no storage or network access: rarity rolls, pity,
//! banner bias, candidate drawing over the [`source::CharacterSource`]
//! seam, ledger arithmetic, and the trade and draw-session state machines.

pub mod banner;
pub mod drawer;
pub mod error;
pub mod ledger;
pub mod pity;
pub mod pools;
pub mod rarity;
pub mod session;
pub mod source;
pub mod trade;
pub mod types;
