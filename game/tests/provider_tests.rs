use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use beat_timeline::provider::{
    PreviewLookup, ProviderError, QuestionProvider, QuizGenerator, TriviaSource,
};
use beat_timeline::question::{Difficulty, Question, Year};

fn question(artist: &str, correct_year: Year) -> Question {
    Question {
        artist: artist.to_string(),
        song_title: format!("{artist} song"),
        correct_year,
        options: vec![correct_year - 2, correct_year - 1, correct_year, correct_year + 1],
        lyrics_snippet: "la la la".to_string(),
        album: "Album".to_string(),
        release_date: correct_year.to_string(),
        audio_url: None,
    }
}

struct FakeSource {
    questions: Vec<Question>,
    artists_seen: Arc<AtomicUsize>,
}

#[async_trait]
impl TriviaSource for FakeSource {
    async fn generate(
        &self,
        artists: &[&'static str],
        _count: usize,
    ) -> Result<Vec<Question>, ProviderError> {
        self.artists_seen.store(artists.len(), Ordering::SeqCst);
        Ok(self.questions.clone())
    }
}

/// Artists containing "miss" have no preview, "broken" fails the lookup.
struct FakePreviews;

#[async_trait]
impl PreviewLookup for FakePreviews {
    async fn lookup(&self, artist: &str, _song_title: &str) -> Result<Option<String>, ProviderError> {
        if artist.contains("broken") {
            return Err(ProviderError::Status {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        if artist.contains("miss") {
            return Ok(None);
        }
        Ok(Some(format!("https://previews.test/{artist}.m4a")))
    }

    async fn fetch_clip(&self, _url: &str) -> Result<Vec<u8>, ProviderError> {
        Ok(Vec::new())
    }
}

fn generator(questions: Vec<Question>) -> QuizGenerator<FakeSource> {
    generator_counting(questions, Arc::default())
}

fn generator_counting(
    questions: Vec<Question>,
    artists_seen: Arc<AtomicUsize>,
) -> QuizGenerator<FakeSource> {
    let source = FakeSource {
        questions,
        artists_seen,
    };
    QuizGenerator::new(source, Arc::new(FakePreviews))
}

fn option_set(q: &Question) -> BTreeSet<Year> {
    q.options.iter().copied().collect()
}

#[tokio::test]
async fn extra_questions_are_cut_and_malformed_ones_dropped() {
    let mut raw: Vec<Question> = (0..12).map(|i| question(&format!("artist{i}"), 1980 + i)).collect();
    raw[0].options.pop();
    raw[3].options = vec![1999, 1999, 2000, 2001];

    let batch = generator(raw.clone())
        .request_questions(Difficulty::Easy)
        .await
        .expect("batch");

    assert_eq!(batch.len(), 10);
    assert!(batch.iter().all(|q| q.validate().is_ok()));
    let artists: Vec<&str> = batch.iter().map(|q| q.artist.as_str()).collect();
    assert!(!artists.contains(&"artist0"));
    assert!(!artists.contains(&"artist3"));
    assert_eq!(artists.first(), Some(&"artist1"));
    assert_eq!(artists.last(), Some(&"artist11"));
}

#[tokio::test]
async fn shuffling_keeps_each_option_set() {
    let raw: Vec<Question> = (0..10).map(|i| question(&format!("a{i}"), 2000 + i)).collect();
    let batch = generator(raw.clone())
        .request_questions(Difficulty::Easy)
        .await
        .expect("batch");

    for (shuffled, original) in batch.iter().zip(&raw) {
        assert_eq!(option_set(shuffled), option_set(original));
        assert_eq!(shuffled.correct_year, original.correct_year);
    }
}

#[tokio::test]
async fn previews_are_attached_and_failures_leave_none() {
    let mut raw = vec![question("hit", 1990), question("miss", 1991), question("broken", 1992)];
    raw.extend((3..10).map(|i| question(&format!("hit{i}"), 1990 + i)));
    let batch = generator(raw)
        .request_questions(Difficulty::Easy)
        .await
        .expect("lookup failures never fail the batch");

    let urls: Vec<Option<&str>> = batch.iter().map(|q| q.audio_url.as_deref()).collect();
    assert_eq!(urls[0], Some("https://previews.test/hit.m4a"));
    assert_eq!(urls[1], None);
    assert_eq!(urls[2], None);
    assert_eq!(urls[3], Some("https://previews.test/hit3.m4a"));
}

#[tokio::test]
async fn too_few_usable_questions_is_a_short_batch() {
    let mut raw: Vec<Question> = (0..10).map(|i| question(&format!("a{i}"), 1970 + i)).collect();
    raw[4].correct_year = 1800;

    let err = generator(raw)
        .request_questions(Difficulty::Easy)
        .await
        .expect_err("nine usable questions cannot make an easy batch");
    assert!(matches!(
        err,
        ProviderError::ShortBatch {
            expected: 10,
            got: 9
        }
    ));
}

#[tokio::test]
async fn sampled_artist_count_follows_the_tier() {
    for difficulty in Difficulty::ALL {
        let config = difficulty.config();
        let raw: Vec<Question> = (0..config.question_count)
            .map(|i| question(&format!("a{i}"), 1960 + i as Year))
            .collect();
        let artists_seen = Arc::new(AtomicUsize::new(0));
        generator_counting(raw, Arc::clone(&artists_seen))
            .request_questions(difficulty)
            .await
            .expect("batch");
        let expected = config.artists_sampled.min(config.pool.len());
        assert_eq!(artists_seen.load(Ordering::SeqCst), expected, "{difficulty}");
    }
}
