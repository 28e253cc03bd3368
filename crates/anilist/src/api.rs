//! HTTP client for the AniList GraphQL endpoint, exposed to the drawer as a
//! [`CharacterSource`].

use async_trait::async_trait;
use cardpull_core::rarity::{RankWindow, RarityTier};
use cardpull_core::source::{CharacterSource, SourceCharacter};
use rand::{Rng, RngCore};
use serde::Deserialize;

/// Public AniList GraphQL endpoint.
pub const DEFAULT_ANILIST_URL: &str = "https://graphql.anilist.co";

/// Characters requested per page.
pub const DEFAULT_PER_PAGE: u32 = 50;

/// Group label used when a character has no media title at all.
const UNKNOWN_GROUP: &str = "Unknown";

const CHARACTERS_QUERY: &str = r#"
query ($page: Int, $perPage: Int) {
  Page(page: $page, perPage: $perPage) {
    characters(sort: FAVOURITES_DESC) {
      name { full }
      image { large }
      media(perPage: 1) { nodes { title { romaji english native } } }
    }
  }
}"#;

/// Errors from the AniList API layer.
#[derive(Debug, thiserror::Error)]
pub enum AniListError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// AniList returned a non-2xx status code.
    #[error("AniList API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The GraphQL layer reported errors alongside (or instead of) data.
    #[error("AniList GraphQL error: {0}")]
    GraphQl(String),
}

// ---------------------------------------------------------------------------
// Wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    data: Option<PageData>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct PageData {
    #[serde(rename = "Page")]
    page: Option<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    #[serde(default)]
    characters: Vec<CharacterNode>,
}

#[derive(Debug, Deserialize)]
struct CharacterNode {
    name: Option<CharacterName>,
    image: Option<CharacterImage>,
    media: Option<MediaConnection>,
}

#[derive(Debug, Deserialize)]
struct CharacterName {
    full: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CharacterImage {
    large: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MediaConnection {
    #[serde(default)]
    nodes: Vec<MediaNode>,
}

#[derive(Debug, Deserialize)]
struct MediaNode {
    title: Option<MediaTitle>,
}

#[derive(Debug, Default, Deserialize)]
struct MediaTitle {
    romaji: Option<String>,
    english: Option<String>,
    native: Option<String>,
}

impl MediaTitle {
    /// First non-empty of romaji, english, native.
    fn best(&self) -> Option<&str> {
        [&self.romaji, &self.english, &self.native]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

impl CharacterNode {
    /// Convert to a source character. Nodes without a name are dropped.
    fn into_character(self) -> Option<SourceCharacter> {
        let name = self.name?.full.filter(|n| !n.trim().is_empty())?;
        let group = self
            .media
            .and_then(|m| m.nodes.into_iter().next())
            .and_then(|n| n.title)
            .and_then(|t| t.best().map(str::to_string))
            .unwrap_or_else(|| UNKNOWN_GROUP.to_string());
        let image_url = self.image.and_then(|i| i.large);
        Some(SourceCharacter::new(name, group, image_url))
    }
}

fn into_characters(response: GraphQlResponse) -> Result<Vec<SourceCharacter>, AniListError> {
    if response.data.is_none() && !response.errors.is_empty() {
        let messages: Vec<_> = response.errors.into_iter().map(|e| e.message).collect();
        return Err(AniListError::GraphQl(messages.join("; ")));
    }
    Ok(response
        .data
        .and_then(|d| d.page)
        .map(|p| p.characters)
        .unwrap_or_default()
        .into_iter()
        .filter_map(CharacterNode::into_character)
        .collect())
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for the AniList GraphQL API.
pub struct AniListClient {
    client: reqwest::Client,
    api_url: String,
    per_page: u32,
}

impl AniListClient {
    /// * `api_url` - GraphQL endpoint, normally [`DEFAULT_ANILIST_URL`].
    pub fn new(api_url: String, per_page: u32) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, per_page)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, api_url: String, per_page: u32) -> Self {
        Self {
            client,
            api_url,
            per_page: per_page.max(1),
        }
    }

    /// Fetch one page of characters ordered by favourites.
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<SourceCharacter>, AniListError> {
        let body = serde_json::json!({
            "query": CHARACTERS_QUERY,
            "variables": { "page": page, "perPage": self.per_page },
        });

        let response = self
            .client
            .post(&self.api_url)
            .json(&body)
            .send()
            .await?;

        let parsed: GraphQlResponse = Self::parse_response(response).await?;
        into_characters(parsed)
    }

    // ---- private helpers ----

    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, AniListError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AniListError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AniListError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Uniform page inside the window, bounds inclusive.
fn pick_page<R: Rng + ?Sized>(window: RankWindow, rng: &mut R) -> u32 {
    rng.random_range(window.low..=window.high)
}

#[async_trait]
impl CharacterSource for AniListClient {
    fn name(&self) -> &'static str {
        "anilist"
    }

    async fn fetch(
        &self,
        tier: &RarityTier,
        rng: &mut (dyn RngCore + Send),
    ) -> Vec<SourceCharacter> {
        let page = pick_page(tier.rank_window, rng);
        match self.fetch_page(page).await {
            Ok(characters) => {
                tracing::debug!(
                    rarity = %tier.rarity,
                    page,
                    count = characters.len(),
                    "Fetched AniList page"
                );
                characters
            }
            Err(e) => {
                tracing::warn!(rarity = %tier.rarity, page, error = %e, "AniList fetch failed");
                Vec::new()
            }
        }
    }
}
