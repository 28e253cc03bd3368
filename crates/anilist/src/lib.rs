//! AniList GraphQL client.
//!
//! Characters are listed by favourites, so a page number is a popularity
//! band: low pages hold the most favourited characters. Each rarity maps to
//! a page window and a fetch picks one page at random inside it.

pub mod api;

pub use api::{AniListClient, AniListError, DEFAULT_ANILIST_URL, DEFAULT_PER_PAGE};
