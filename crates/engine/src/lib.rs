//! The gacha service the front-end calls.
//!
//! [`GachaEngine`] ties the pure domain in `cardpull-core` to storage in
//! `cardpull-db` and the character sources. It owns the in-memory draw
//! sessions; everything else lives in Postgres.

pub mod config;
pub mod engine;
pub mod reaper;
pub mod sessions;

pub use config::EngineConfig;
pub use engine::{DrawOffer, DrawPool, GachaEngine};
pub use sessions::SessionStore;
