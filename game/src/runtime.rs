//! Executes session effects against the injected services.
//!
//! The runtime is single threaded: async work (question batches, clip downloads, the finish
//! delay) runs on spawned tasks that report back through an unbounded channel, and the
//! driver feeds those signals back in with [`Runtime::handle_signal`].

use std::sync::Arc;

use engine::HeadlessRunner;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::audio::{AudioController, PreviewClip};
use crate::leaderboard::LeaderboardStore;
use crate::provider::{PreviewLookup, QuestionProvider};
use crate::session::{QuizLogic, Session, SessionEffect, SessionEvent};

/// Messages delivered back to the runtime by background tasks.
#[derive(Debug)]
pub enum Signal {
    Session(SessionEvent),
    /// Preview download for question `index` of batch `token` finished.
    Clip {
        token: u64,
        index: usize,
        clip: Option<PreviewClip>,
    },
}

/// Collaborators constructed once at start-up.
pub struct Services {
    pub questions: Arc<dyn QuestionProvider>,
    pub previews: Arc<dyn PreviewLookup>,
    pub leaderboard: LeaderboardStore,
    pub audio: AudioController,
}

pub struct Runtime {
    runner: HeadlessRunner<QuizLogic>,
    services: Services,
    tx: UnboundedSender<Signal>,
    timer_armed: bool,
    timer_generation: u64,
}

impl Runtime {
    pub fn new(logic: QuizLogic, services: Services) -> (Self, UnboundedReceiver<Signal>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let runtime = Self {
            runner: HeadlessRunner::new(logic),
            services,
            tx,
            timer_armed: false,
            timer_generation: 0,
        };
        (runtime, rx)
    }

    pub fn session(&self) -> &Session {
        self.runner.state()
    }

    pub fn runner(&self) -> &HeadlessRunner<QuizLogic> {
        &self.runner
    }

    pub fn audio(&self) -> &AudioController {
        &self.services.audio
    }

    pub fn leaderboard(&self) -> &LeaderboardStore {
        &self.services.leaderboard
    }

    /// Whether the countdown should be ticking.
    pub fn timer_armed(&self) -> bool {
        self.timer_armed
    }

    /// Changes every time the countdown is armed, so the driver knows to restart its ticker.
    pub fn timer_generation(&self) -> u64 {
        self.timer_generation
    }

    pub fn dispatch(&mut self, event: SessionEvent) {
        let effects = self.runner.step(event);
        for effect in effects {
            self.apply(effect);
        }
    }

    pub fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Session(event) => self.dispatch(event),
            Signal::Clip { token, index, clip } => {
                let current = self
                    .session()
                    .round()
                    .is_some_and(|round| round.is_current(token, index));
                if current {
                    self.services.audio.start_question(clip.as_ref());
                } else {
                    debug!(token, index, "dropping preview for a question no longer on screen");
                }
            }
        }
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.services.audio.toggle_mute()
    }

    pub fn toggle_preview(&mut self) -> Option<bool> {
        self.services.audio.toggle_preview()
    }

    /// Silences all music before exit.
    pub fn shutdown(&mut self) {
        self.timer_armed = false;
        self.services.audio.stop_all();
    }

    fn apply(&mut self, effect: SessionEffect) {
        match effect {
            SessionEffect::RequestQuestions { token, difficulty } => {
                let provider = Arc::clone(&self.services.questions);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = provider
                        .request_questions(difficulty)
                        .await
                        .map_err(|err| err.to_string());
                    let _ = tx.send(Signal::Session(SessionEvent::QuestionsLoaded { token, result }));
                });
            }
            SessionEffect::SubmitScore { player, score } => {
                self.services.leaderboard.write(&player, score);
            }
            SessionEffect::ScheduleFinish { token, after } => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(Signal::Session(SessionEvent::FinishDue { token }));
                });
            }
            SessionEffect::ArmTimer => {
                self.timer_armed = true;
                self.timer_generation += 1;
            }
            SessionEffect::DisarmTimer => {
                self.timer_armed = false;
            }
            SessionEffect::QuestionAudio {
                token,
                index,
                preview,
            } => {
                self.services.audio.stop_all();
                match preview {
                    None => self.services.audio.start_question(None),
                    Some(url) => {
                        let previews = Arc::clone(&self.services.previews);
                        let tx = self.tx.clone();
                        tokio::spawn(async move {
                            let clip = match previews.fetch_clip(&url).await {
                                Ok(bytes) => Some(PreviewClip { url, bytes }),
                                Err(err) => {
                                    warn!(%url, %err, "failed to download preview");
                                    None
                                }
                            };
                            let _ = tx.send(Signal::Clip { token, index, clip });
                        });
                    }
                }
            }
            SessionEffect::StopMusic => self.services.audio.stop_all(),
            SessionEffect::Cue(cue) => self.services.audio.cue(cue),
        }
    }
}
