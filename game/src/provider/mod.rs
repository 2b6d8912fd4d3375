//! Question batches: generated trivia enriched with preview clip references.

pub mod gemini;
pub mod itunes;

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::question::{Difficulty, Question};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("generation API key is missing (set GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),
    #[error("service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("expected {expected} usable questions, got {got}")]
    ShortBatch { expected: usize, got: usize },
}

/// Transport errors drop their URL, which may carry user input such as search terms.
impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::Http(err.without_url())
    }
}

/// Produces the questions of one batch, in order.
#[async_trait]
pub trait QuestionProvider: Send + Sync {
    async fn request_questions(&self, difficulty: Difficulty) -> Result<Vec<Question>, ProviderError>;
}

/// Text generation half of a batch: raw questions about `artists`, not yet validated.
#[async_trait]
pub trait TriviaSource: Send + Sync {
    async fn generate(
        &self,
        artists: &[&'static str],
        count: usize,
    ) -> Result<Vec<Question>, ProviderError>;
}

/// Preview clip search and download.
#[async_trait]
pub trait PreviewLookup: Send + Sync {
    /// URL of a short preview of the song, if the catalogue has one.
    async fn lookup(&self, artist: &str, song_title: &str) -> Result<Option<String>, ProviderError>;

    async fn fetch_clip(&self, url: &str) -> Result<Vec<u8>, ProviderError>;
}

/// Composes a [`TriviaSource`] with a [`PreviewLookup`] into a [`QuestionProvider`].
///
/// Malformed questions are dropped, extras are cut, options are shuffled and every
/// question's preview is looked up concurrently. A failed lookup only leaves that question
/// without a preview.
pub struct QuizGenerator<S> {
    source: S,
    previews: Arc<dyn PreviewLookup>,
}

impl<S: TriviaSource> QuizGenerator<S> {
    pub fn new(source: S, previews: Arc<dyn PreviewLookup>) -> Self {
        Self { source, previews }
    }

    async fn resolve_preview(&self, question: &Question) -> Option<String> {
        match self.previews.lookup(&question.artist, &question.song_title).await {
            Ok(Some(url)) => Some(url),
            Ok(None) => {
                debug!(artist = %question.artist, title = %question.song_title, "no preview found");
                None
            }
            Err(err) => {
                warn!(artist = %question.artist, title = %question.song_title, %err, "preview lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl<S: TriviaSource> QuestionProvider for QuizGenerator<S> {
    async fn request_questions(&self, difficulty: Difficulty) -> Result<Vec<Question>, ProviderError> {
        let expected = difficulty.config().question_count;
        let artists = {
            let mut rng = rand::thread_rng();
            difficulty.sample_artists(&mut rng)
        };
        info!(%difficulty, artists = artists.len(), "requesting question batch");

        let mut questions = self.source.generate(&artists, expected).await?;
        questions.retain(|q| match q.validate() {
            Ok(()) => true,
            Err(defect) => {
                warn!(artist = %q.artist, title = %q.song_title, %defect, "dropping malformed question");
                false
            }
        });
        if questions.len() < expected {
            return Err(ProviderError::ShortBatch {
                expected,
                got: questions.len(),
            });
        }
        questions.truncate(expected);

        {
            let mut rng = rand::thread_rng();
            for question in &mut questions {
                question.shuffle_options(&mut rng);
            }
        }

        let previews = join_all(questions.iter().map(|q| self.resolve_preview(q))).await;
        for (question, preview) in questions.iter_mut().zip(previews) {
            question.audio_url = preview;
        }
        Ok(questions)
    }
}
