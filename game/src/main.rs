use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use beat_timeline::audio::{AudioBackend, AudioController, NullBackend, RodioBackend};
use beat_timeline::i18n::Language;
use beat_timeline::leaderboard::LeaderboardStore;
use beat_timeline::provider::gemini::GeminiClient;
use beat_timeline::provider::itunes::ItunesSearch;
use beat_timeline::provider::{PreviewLookup, QuizGenerator};
use beat_timeline::question::Difficulty;
use beat_timeline::round_timer::TICK;
use beat_timeline::runtime::{Runtime, Services};
use beat_timeline::session::{QuizLogic, SessionEvent};
use beat_timeline::settings::{LiveSettings, PlayerSettings, SettingsStore};
use beat_timeline::terminal::{Flow, TerminalUi, render_countdown};

/// Guess-the-release-year music quiz in the terminal.
#[derive(Parser, Debug)]
#[command(name = "beat-timeline")]
#[command(version)]
struct Args {
    /// Difficulty tier for this run (easy, medium, hard)
    #[arg(short, long)]
    difficulty: Option<Difficulty>,

    /// Display language (en, fr)
    #[arg(short, long)]
    language: Option<Language>,

    /// Start muted
    #[arg(long)]
    mute: bool,

    /// Never open an audio device
    #[arg(long)]
    no_audio: bool,

    /// Generation model name
    #[arg(long)]
    model: Option<String>,

    /// Settings file (defaults to the XDG config directory)
    #[arg(long, env = "BEAT_TIMELINE_SETTINGS_PATH")]
    settings: Option<PathBuf>,

    /// Leaderboard file (defaults to the XDG data directory)
    #[arg(long, env = "BEAT_TIMELINE_LEADERBOARD_PATH")]
    leaderboard: Option<PathBuf>,
}

enum Redraw {
    Full,
    Countdown,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout belongs to the game screen.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "beat_timeline=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let settings_store = args
        .settings
        .clone()
        .map(SettingsStore::at)
        .unwrap_or_else(SettingsStore::from_env);
    let mut stored = settings_store.load();
    let mut settings = stored.clone();
    if let Some(difficulty) = args.difficulty {
        settings.difficulty = difficulty;
    }
    if let Some(language) = args.language {
        settings.language = language;
    }
    if args.mute {
        settings.audio.muted = true;
    }
    info!(path = %settings_store.path().display(), "settings loaded");

    let backend: Box<dyn AudioBackend> = if args.no_audio {
        Box::new(NullBackend)
    } else {
        match RodioBackend::new() {
            Ok(backend) => Box::new(backend),
            Err(err) => {
                warn!(%err, "audio output unavailable; continuing without sound");
                Box::new(NullBackend)
            }
        }
    };

    let mut gemini = GeminiClient::from_env();
    if let Some(model) = args.model {
        gemini = gemini.with_model(model);
    }
    if !gemini.has_api_key() {
        warn!("GEMINI_API_KEY is not set; question generation will fail");
    }
    let previews: Arc<dyn PreviewLookup> = Arc::new(ItunesSearch::new());
    let leaderboard = args
        .leaderboard
        .map(LeaderboardStore::at)
        .unwrap_or_else(LeaderboardStore::from_env);
    info!(path = %leaderboard.path().display(), model = gemini.model(), "starting");

    let services = Services {
        questions: Arc::new(QuizGenerator::new(gemini, Arc::clone(&previews))),
        previews,
        leaderboard,
        audio: AudioController::new(backend, settings.audio),
    };
    let (mut runtime, mut signals) =
        Runtime::new(QuizLogic::new(settings.difficulty, settings.language), services);
    let mut ui = TerminalUi::default();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = interval_at(Instant::now() + TICK, TICK);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut timer_generation = runtime.timer_generation();
    let mut live = settings.live();

    print!("{}", ui.render(&runtime));
    loop {
        if runtime.timer_generation() != timer_generation {
            timer_generation = runtime.timer_generation();
            ticker.reset();
        }

        let redraw = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => match ui.handle_line(&mut runtime, &line) {
                    Flow::Quit => break,
                    Flow::Continue => Redraw::Full,
                },
                None => break,
            },
            Some(signal) = signals.recv() => {
                runtime.handle_signal(signal);
                Redraw::Full
            },
            _ = ticker.tick(), if runtime.timer_armed() => {
                runtime.dispatch(SessionEvent::Tick);
                if runtime.timer_armed() { Redraw::Countdown } else { Redraw::Full }
            },
        };

        live = persist_settings(&settings_store, &mut stored, live, &runtime);

        match redraw {
            Redraw::Full => print!("{}", ui.render(&runtime)),
            Redraw::Countdown => {
                if let Some(timer) = runtime.session().round().and_then(|r| r.timer()) {
                    println!("{}", render_countdown(timer));
                }
            }
        }
    }

    runtime.shutdown();
    Ok(())
}

/// Saves language, difficulty and mute changes made in-game on top of the stored settings.
fn persist_settings(
    store: &SettingsStore,
    stored: &mut PlayerSettings,
    live: LiveSettings,
    runtime: &Runtime,
) -> LiveSettings {
    let session = runtime.session();
    let now = LiveSettings {
        language: session.language(),
        difficulty: session.difficulty(),
        muted: runtime.audio().muted(),
    };
    if stored.absorb(live, now) {
        if let Err(err) = store.save(stored) {
            warn!(path = %store.path().display(), %err, "failed to save settings");
        }
    }
    now
}
