//! Reaction GIF lookup
//!
//! Queries the Tenor search API and picks one result at random. Any failure
//! serves a random entry from a static fallback list instead.

#[path = "gif_tests.rs"]
mod gif_tests;

use rand::seq::IndexedRandom;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::MediaConfig;
use crate::errors::GifLookupError;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    #[serde(default)]
    media_formats: MediaFormats,
}

#[derive(Debug, Default, Deserialize)]
struct MediaFormats {
    gif: Option<MediaObject>,
}

#[derive(Debug, Deserialize)]
struct MediaObject {
    url: String,
}

pub struct GifSelector {
    http: HttpClient,
    api_key: Option<String>,
    base_url: String,
    limit: u32,
    fallback_gifs: Vec<String>,
}

impl GifSelector {
    pub fn new(http: HttpClient, config: &MediaConfig) -> Self {
        Self {
            http,
            api_key: config.tenor_key().map(str::to_string),
            base_url: config.tenor_base_url.clone(),
            limit: config.result_limit,
            fallback_gifs: config.fallback_gifs.clone(),
        }
    }

    pub fn has_backend(&self) -> bool {
        self.api_key.is_some()
    }

    /// Pick a GIF for `search_query`.
    ///
    /// Returns `None` only when the search fails and the fallback list is empty.
    pub async fn select(&self, search_query: &str) -> Option<String> {
        match self.search(search_query).await {
            Ok(url) => {
                debug!(query = search_query, url = %url, "GIF search hit");
                Some(url)
            }
            Err(GifLookupError::MissingCredential) => self.fallback(),
            Err(e) => {
                warn!(query = search_query, error = %e, "GIF search failed, using fallback list");
                self.fallback()
            }
        }
    }

    async fn search(&self, search_query: &str) -> Result<String, GifLookupError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(GifLookupError::MissingCredential)?;
        let limit = self.limit.to_string();

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", search_query),
                ("key", api_key),
                ("limit", limit.as_str()),
                ("media_filter", "gif"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GifLookupError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| GifLookupError::Malformed(e.to_string()))?;

        let chosen = parsed
            .results
            .choose(&mut rand::rng())
            .ok_or(GifLookupError::NoResults)?;

        chosen
            .media_formats
            .gif
            .as_ref()
            .map(|gif| gif.url.clone())
            .filter(|url| !url.is_empty())
            .ok_or_else(|| GifLookupError::Malformed("result has no gif url".to_string()))
    }

    fn fallback(&self) -> Option<String> {
        self.fallback_gifs.choose(&mut rand::rng()).cloned()
    }
}
