use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;

use beat_timeline::audio::{AudioController, MusicChannel, PreviewClip};
use beat_timeline::i18n::Language;
use beat_timeline::leaderboard::LeaderboardStore;
use beat_timeline::player::Player;
use beat_timeline::provider::{PreviewLookup, ProviderError, QuestionProvider};
use beat_timeline::question::{Difficulty, Question, Year};
use beat_timeline::runtime::{Runtime, Services, Signal};
use beat_timeline::session::{QuizLogic, RoundPhase, Screen, SessionEvent};

fn question(index: usize, with_preview: bool) -> Question {
    let year = 1980 + index as Year;
    Question {
        artist: format!("Artist {index}"),
        song_title: format!("Song {index}"),
        correct_year: year,
        options: vec![year - 1, year, year + 1, year + 2],
        lyrics_snippet: "na na na".to_string(),
        album: "Album".to_string(),
        release_date: year.to_string(),
        audio_url: with_preview.then(|| format!("https://clips.test/{index}.m4a")),
    }
}

struct FakeProvider {
    calls: AtomicUsize,
    fail: bool,
    with_previews: bool,
}

impl FakeProvider {
    fn ok() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: false,
            with_previews: false,
        }
    }
}

#[async_trait]
impl QuestionProvider for FakeProvider {
    async fn request_questions(&self, difficulty: Difficulty) -> Result<Vec<Question>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ProviderError::MissingApiKey);
        }
        Ok((0..difficulty.config().question_count)
            .map(|i| question(i, self.with_previews))
            .collect())
    }
}

struct FakePreviews;

#[async_trait]
impl PreviewLookup for FakePreviews {
    async fn lookup(&self, _artist: &str, _song_title: &str) -> Result<Option<String>, ProviderError> {
        Ok(None)
    }

    async fn fetch_clip(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        Ok(url.as_bytes().to_vec())
    }
}

struct Harness {
    runtime: Runtime,
    signals: UnboundedReceiver<Signal>,
    provider: Arc<FakeProvider>,
    _dir: tempfile::TempDir,
}

fn harness(provider: FakeProvider) -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let provider = Arc::new(provider);
    let services = Services {
        questions: provider.clone(),
        previews: Arc::new(FakePreviews),
        leaderboard: LeaderboardStore::at(dir.path().join("leaderboard.json")),
        audio: AudioController::silent(),
    };
    let (runtime, signals) = Runtime::new(QuizLogic::new(Difficulty::Easy, Language::En), services);
    Harness {
        runtime,
        signals,
        provider,
        _dir: dir,
    }
}

fn player() -> Player {
    Player::new("Grace", "Hopper", "grace@example.com", "0611223344").expect("valid player")
}

impl Harness {
    async fn next_signal(&mut self) {
        let signal = self.signals.recv().await.expect("runtime keeps a sender");
        self.runtime.handle_signal(signal);
    }

    async fn start_game(&mut self) {
        self.runtime.dispatch(SessionEvent::Play);
        self.runtime.dispatch(SessionEvent::Register(player()));
        self.next_signal().await;
        assert!(matches!(self.runtime.session().screen(), Screen::Playing(_)));
    }

    fn correct_year(&self) -> Year {
        self.runtime
            .session()
            .round()
            .and_then(|round| round.quiz.current_question())
            .map(|q| q.correct_year)
            .expect("question on screen")
    }
}

#[tokio::test(start_paused = true)]
async fn full_easy_game_is_saved_then_shows_results_after_the_delay() {
    let mut h = harness(FakeProvider::ok());
    h.start_game().await;

    for i in 0..10 {
        let correct = h.correct_year();
        let pick = if i < 6 { correct } else { correct + 2 };
        h.runtime.dispatch(SessionEvent::SelectYear(pick));
        h.runtime.dispatch(SessionEvent::Next);
    }

    let round = h.runtime.session().round().expect("waiting on the finish delay");
    assert_eq!(round.phase, RoundPhase::Completing);
    let saved = h.runtime.leaderboard().read();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].score, 40);
    assert_eq!(saved[0].first_name, "Grace");

    h.next_signal().await;
    match h.runtime.session().screen() {
        Screen::Finished(quiz) => assert_eq!(quiz.score(), 40),
        other => panic!("expected Finished, got {other:?}"),
    }
    assert_eq!(h.runtime.audio().channel(), &MusicChannel::Silent);
    assert_eq!(h.provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn batch_arriving_after_back_is_ignored() {
    let mut h = harness(FakeProvider::ok());
    h.runtime.dispatch(SessionEvent::Play);
    h.runtime.dispatch(SessionEvent::Register(player()));
    h.runtime.dispatch(SessionEvent::Back);

    h.next_signal().await;
    assert_eq!(h.runtime.session().screen(), &Screen::Start);
    assert!(!h.runtime.timer_armed());
}

#[tokio::test(start_paused = true)]
async fn generation_failure_lands_on_the_error_screen() {
    let mut h = harness(FakeProvider {
        fail: true,
        ..FakeProvider::ok()
    });
    h.runtime.dispatch(SessionEvent::Play);
    h.runtime.dispatch(SessionEvent::Register(player()));
    h.next_signal().await;
    assert!(matches!(h.runtime.session().screen(), Screen::Error { .. }));
    assert!(h.runtime.leaderboard().read().is_empty());
}

#[tokio::test(start_paused = true)]
async fn questions_without_previews_play_the_ambient_loop() {
    let mut h = harness(FakeProvider::ok());
    h.start_game().await;
    assert_eq!(h.runtime.audio().channel(), &MusicChannel::Ambient);
}

#[tokio::test(start_paused = true)]
async fn clip_for_the_current_question_starts_the_preview() {
    let mut h = harness(FakeProvider {
        with_previews: true,
        ..FakeProvider::ok()
    });
    h.start_game().await;
    assert_eq!(h.runtime.audio().channel(), &MusicChannel::Silent);

    h.next_signal().await;
    assert_eq!(
        h.runtime.audio().channel(),
        &MusicChannel::Preview {
            url: "https://clips.test/0.m4a".to_string(),
            paused: false
        }
    );
    assert_eq!(h.runtime.toggle_preview(), Some(false));
}

#[tokio::test(start_paused = true)]
async fn clip_for_a_question_no_longer_on_screen_is_dropped() {
    let mut h = harness(FakeProvider::ok());
    h.start_game().await;
    let stale = PreviewClip {
        url: "https://clips.test/old.m4a".to_string(),
        bytes: vec![1, 2, 3],
    };

    h.runtime.handle_signal(Signal::Clip {
        token: 1,
        index: 4,
        clip: Some(stale.clone()),
    });
    h.runtime.handle_signal(Signal::Clip {
        token: 7,
        index: 0,
        clip: Some(stale),
    });
    assert_eq!(h.runtime.audio().channel(), &MusicChannel::Ambient);
}

#[tokio::test(start_paused = true)]
async fn countdown_is_armed_per_question_and_disarmed_on_reveal() {
    let mut h = harness(FakeProvider::ok());
    assert!(!h.runtime.timer_armed());
    h.start_game().await;
    assert!(h.runtime.timer_armed());
    let first = h.runtime.timer_generation();

    let correct = h.correct_year();
    h.runtime.dispatch(SessionEvent::SelectYear(correct));
    assert!(!h.runtime.timer_armed());

    h.runtime.dispatch(SessionEvent::Next);
    assert!(h.runtime.timer_armed());
    assert!(h.runtime.timer_generation() > first);

    for _ in 0..15 {
        h.runtime.dispatch(SessionEvent::Tick);
    }
    assert!(!h.runtime.timer_armed());
    let round = h.runtime.session().round().expect("playing");
    assert_eq!(
        round.phase,
        RoundPhase::Revealed {
            selected: None,
            correct: false
        }
    );
}

#[tokio::test(start_paused = true)]
async fn mute_toggle_is_reported_by_the_audio_controller() {
    let mut h = harness(FakeProvider::ok());
    assert!(h.runtime.toggle_mute());
    assert!(h.runtime.audio().muted());
    assert!(!h.runtime.toggle_mute());
}
