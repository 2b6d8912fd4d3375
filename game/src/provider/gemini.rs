//! Trivia generation through the Gemini REST API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use super::{ProviderError, TriviaSource};
use crate::question::Question;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: Option<String>,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// A missing key is only reported when a batch is requested.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            model: DEFAULT_MODEL.to_string(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Reads the key from `GEMINI_API_KEY`, falling back to `API_KEY`.
    pub fn from_env() -> Self {
        let key = ["GEMINI_API_KEY", "API_KEY"]
            .into_iter()
            .find_map(|name| std::env::var(name).ok().filter(|v| !v.trim().is_empty()));
        Self::new(key)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    async fn send_request(&self, body: &GenerateContentRequest) -> Result<String, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingApiKey)?;
        let url = format!("{}/{}:generateContent", self.base_url, self.model);

        // The key travels as a header so it never ends up in a URL.
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read Gemini error body".to_string());
            return Err(map_http_error(status, body_text));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| ProviderError::Malformed(format!("Gemini response: {err}")))?;

        extract_text_response(parsed)
    }
}

#[async_trait]
impl TriviaSource for GeminiClient {
    async fn generate(
        &self,
        artists: &[&'static str],
        count: usize,
    ) -> Result<Vec<Question>, ProviderError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt(artists, count),
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        };
        let text = self.send_request(&request).await?;
        parse_questions(&text)
    }
}

pub fn prompt(artists: &[&str], count: usize) -> String {
    format!(
        "Generate a trivia quiz with exactly {count} questions.\n\
         Each question must ask for the release year of a song based on the provided list of \
         artists/series: {artists}.\n\
         \n\
         Rules:\n\
         1. If the artist is a musician/band, choose a popular song by them.\n\
         2. If the artist is a Manga or Anime series (e.g., Naruto, One Piece), choose a popular \
         Opening (OP) or Ending (ED) theme song from that series.\n   \
         - CRITICAL: The 'artist' field in the JSON output must be the name of the Anime/Manga \
         Series (e.g. \"Naruto\"), NOT the singer.\n   \
         - The 'songTitle' should be the name of the track.\n\
         3. Provide 4 numerical year options.\n\
         4. Provide a lyrics snippet (in the original language of the song).\n\
         5. Provide the Album name and exact Release Date (YYYY-MM-DD).\n\
         6. Ensure the selection is diverse (mix of Genres, Countries, and Anime).\n\
         \n\
         The output must strictly follow the JSON schema provided.",
        artists = artists.join(", "),
    )
}

fn response_schema() -> Value {
    const FIELDS: [&str; 7] = [
        "artist",
        "songTitle",
        "correctYear",
        "options",
        "lyricsSnippet",
        "album",
        "releaseDate",
    ];
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "artist": { "type": "STRING", "description": "Artist Name or Anime Series Name" },
                "songTitle": { "type": "STRING" },
                "correctYear": { "type": "INTEGER" },
                "options": {
                    "type": "ARRAY",
                    "items": { "type": "INTEGER" },
                    "description": "List of 4 unique years, including the correct one."
                },
                "lyricsSnippet": {
                    "type": "STRING",
                    "description": "A short memorable excerpt of lyrics."
                },
                "album": { "type": "STRING", "description": "The album name or Single." },
                "releaseDate": { "type": "STRING", "description": "Full release date YYYY-MM-DD" }
            },
            "required": FIELDS,
            "propertyOrdering": FIELDS
        }
    })
}

/// Decodes the JSON array the model returns.
pub fn parse_questions(text: &str) -> Result<Vec<Question>, ProviderError> {
    serde_json::from_str::<Vec<Question>>(text.trim())
        .map_err(|err| ProviderError::Malformed(format!("question JSON: {err}")))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text_response(response: GenerateContentResponse) -> Result<String, ProviderError> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .ok_or_else(|| ProviderError::Malformed("Gemini returned no text candidates".into()))
}

fn map_http_error(status: StatusCode, body: String) -> ProviderError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or_else(|_| body.clone());

    ProviderError::Status {
        status: status.as_u16(),
        message,
    }
}
