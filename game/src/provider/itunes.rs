//! Preview lookup through the public iTunes Search API. No key required.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{PreviewLookup, ProviderError};

const SEARCH_URL: &str = "https://itunes.apple.com/search";
const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);
const CLIP_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Clone)]
pub struct ItunesSearch {
    client: Client,
}

impl Default for ItunesSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl ItunesSearch {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    #[serde(default)]
    result_count: usize,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResult {
    preview_url: Option<String>,
}

fn first_preview(response: SearchResponse) -> Option<String> {
    if response.result_count == 0 {
        return None;
    }
    response
        .results
        .into_iter()
        .next()
        .and_then(|result| result.preview_url)
        .filter(|url| !url.is_empty())
}

#[async_trait]
impl PreviewLookup for ItunesSearch {
    async fn lookup(&self, artist: &str, song_title: &str) -> Result<Option<String>, ProviderError> {
        let term = format!("{artist} {song_title}");
        let response = self
            .client
            .get(SEARCH_URL)
            .query(&[
                ("term", term.as_str()),
                ("media", "music"),
                ("entity", "song"),
                ("limit", "1"),
            ])
            .timeout(LOOKUP_TIMEOUT)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                message: "iTunes search failed".to_string(),
            });
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Malformed(format!("iTunes search: {err}")))?;
        Ok(first_preview(parsed))
    }

    async fn fetch_clip(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        let bytes = self
            .client
            .get(url)
            .timeout(CLIP_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}
