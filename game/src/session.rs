//! The quiz session state machine.
//!
//! Every state change goes through [`Session::handle`], a pure transition that returns the
//! next session plus the side effects (requests, timers, audio, persistence) the runtime has
//! to carry out. Async results come back in as events tagged with the request token they
//! answer, so late responses can be told apart from current ones.

use std::time::Duration;

use engine::{GameLogic, Transition};
use tracing::{debug, warn};

use crate::i18n::{self, Language};
use crate::player::Player;
use crate::question::{Difficulty, Question, Year};
use crate::round_timer::QuestionTimer;
use crate::scoring::{self, ChartPoint, Rating};
use crate::sfx::Cue;

/// Pause between the last answer and the result screen.
pub const FINISH_DELAY: Duration = Duration::from_millis(500);

/// Score, questions and per-question outcomes of one run.
///
/// The current question index is the number of recorded outcomes, so it can never drift
/// from the history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    questions: Vec<Question>,
    score: i32,
    history: Vec<bool>,
}

impl Quiz {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            score: 0,
            history: Vec::new(),
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn history(&self) -> &[bool] {
        &self.history
    }

    pub fn current_index(&self) -> usize {
        self.history.len()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index())
    }

    pub fn is_complete(&self) -> bool {
        self.current_index() >= self.questions.len()
    }

    /// True while the current question is the final one.
    pub fn is_last_question(&self) -> bool {
        self.current_index() + 1 >= self.questions.len()
    }

    /// Scores the current question and moves past it. Ignored once every question is answered.
    pub fn record(&mut self, correct: bool) -> bool {
        if self.is_complete() {
            return false;
        }
        self.score += scoring::points(correct);
        self.history.push(correct);
        true
    }

    pub fn chart(&self) -> Vec<ChartPoint> {
        scoring::chart_points(&self.history)
    }

    pub fn rating(&self) -> Rating {
        Rating::for_score(self.score, self.questions.len())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    /// Waiting for a pick while the countdown runs.
    Asking { timer: QuestionTimer },
    /// Answer shown. `selected` is `None` when the countdown ran out.
    Revealed { selected: Option<Year>, correct: bool },
    /// Final answer recorded, result screen pending.
    Completing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Round {
    pub token: u64,
    pub difficulty: Difficulty,
    pub quiz: Quiz,
    pub phase: RoundPhase,
}

impl Round {
    fn new(token: u64, difficulty: Difficulty, quiz: Quiz) -> Self {
        Self {
            token,
            difficulty,
            quiz,
            phase: RoundPhase::Asking {
                timer: QuestionTimer::new(difficulty.config().timer_seconds),
            },
        }
    }

    /// Whether `(token, index)` still names the question on screen.
    pub fn is_current(&self, token: u64, index: usize) -> bool {
        self.token == token
            && self.quiz.current_index() == index
            && self.phase != RoundPhase::Completing
    }

    pub fn timer(&self) -> Option<&QuestionTimer> {
        match &self.phase {
            RoundPhase::Asking { timer } => Some(timer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Start,
    Register,
    Loading { token: u64, difficulty: Difficulty },
    Playing(Round),
    Finished(Quiz),
    Error { message: String },
    /// Side view; `back` is restored when it closes.
    Leaderboard { back: Box<Screen> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Play,
    SetDifficulty(Difficulty),
    SetLanguage(Language),
    Register(Player),
    QuestionsLoaded {
        token: u64,
        result: Result<Vec<Question>, String>,
    },
    SelectYear(Year),
    Tick,
    Next,
    FinishDue { token: u64 },
    Restart,
    ShowLeaderboard,
    Back,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    RequestQuestions { token: u64, difficulty: Difficulty },
    SubmitScore { player: Player, score: i32 },
    ScheduleFinish { token: u64, after: Duration },
    ArmTimer,
    DisarmTimer,
    /// A new question is on screen; play its preview or fall back to the ambient loop.
    QuestionAudio {
        token: u64,
        index: usize,
        preview: Option<String>,
    },
    StopMusic,
    Cue(Cue),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    screen: Screen,
    difficulty: Difficulty,
    language: Language,
    player: Option<Player>,
    next_token: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Difficulty::default(), Language::default())
    }
}

impl Session {
    pub fn new(difficulty: Difficulty, language: Language) -> Self {
        Self {
            screen: Screen::Start,
            difficulty,
            language,
            player: None,
            next_token: 1,
        }
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn round(&self) -> Option<&Round> {
        match &self.screen {
            Screen::Playing(round) => Some(round),
            _ => None,
        }
    }

    /// Pure transition function for the whole session.
    ///
    /// Events that make no sense in the current screen leave the session untouched and
    /// produce no effects.
    pub fn handle(mut self, event: SessionEvent) -> (Session, Vec<SessionEffect>) {
        let mut effects = Vec::new();
        let screen = std::mem::replace(&mut self.screen, Screen::Start);
        self.screen = self.transition(screen, event, &mut effects);
        (self, effects)
    }

    fn transition(
        &mut self,
        screen: Screen,
        event: SessionEvent,
        fx: &mut Vec<SessionEffect>,
    ) -> Screen {
        use SessionEvent as E;

        match (screen, event) {
            (Screen::Start, E::Play) => {
                fx.push(SessionEffect::Cue(Cue::Start));
                Screen::Register
            }
            (Screen::Start, E::SetDifficulty(difficulty)) => {
                self.difficulty = difficulty;
                fx.push(SessionEffect::Cue(Cue::Click));
                Screen::Start
            }
            (Screen::Start, E::SetLanguage(language)) => {
                self.language = language;
                fx.push(SessionEffect::Cue(Cue::Click));
                Screen::Start
            }

            (screen @ (Screen::Start | Screen::Register | Screen::Finished(_)), E::ShowLeaderboard) => {
                fx.push(SessionEffect::Cue(Cue::Click));
                Screen::Leaderboard {
                    back: Box::new(screen),
                }
            }
            (Screen::Leaderboard { back }, E::Back) => {
                fx.push(SessionEffect::Cue(Cue::Click));
                *back
            }

            (Screen::Register, E::Register(player)) => {
                self.player = Some(player);
                fx.push(SessionEffect::Cue(Cue::Click));
                self.request_questions(fx)
            }

            (Screen::Loading { token, difficulty }, E::QuestionsLoaded { token: got, result })
                if got == token =>
            {
                self.questions_loaded(token, difficulty, result, fx)
            }
            (screen, E::QuestionsLoaded { token, .. }) => {
                debug!(token, "ignoring stale question batch");
                screen
            }

            (Screen::Playing(round), event @ (E::Tick | E::SelectYear(_) | E::Next | E::FinishDue { .. })) => {
                self.play(round, event, fx)
            }

            (Screen::Finished(_), E::Restart) => {
                fx.push(SessionEffect::Cue(Cue::Click));
                self.request_questions(fx)
            }
            (Screen::Error { .. }, E::Restart) => {
                fx.push(SessionEffect::Cue(Cue::Click));
                Screen::Start
            }
            (
                Screen::Register | Screen::Loading { .. } | Screen::Error { .. } | Screen::Finished(_),
                E::Back,
            ) => {
                fx.push(SessionEffect::Cue(Cue::Click));
                Screen::Start
            }

            (screen, _) => screen,
        }
    }

    fn request_questions(&mut self, fx: &mut Vec<SessionEffect>) -> Screen {
        let token = self.next_token;
        self.next_token += 1;
        fx.push(SessionEffect::RequestQuestions {
            token,
            difficulty: self.difficulty,
        });
        Screen::Loading {
            token,
            difficulty: self.difficulty,
        }
    }

    fn questions_loaded(
        &mut self,
        token: u64,
        difficulty: Difficulty,
        result: Result<Vec<Question>, String>,
        fx: &mut Vec<SessionEffect>,
    ) -> Screen {
        let expected = difficulty.config().question_count;
        match result {
            Ok(questions) if questions.len() == expected => {
                let round = Round::new(token, difficulty, Quiz::new(questions));
                Self::question_started(&round, fx);
                Screen::Playing(round)
            }
            Ok(questions) => {
                warn!(expected, got = questions.len(), "question batch has the wrong length");
                self.error_screen()
            }
            Err(err) => {
                warn!(%err, "question generation failed");
                self.error_screen()
            }
        }
    }

    fn error_screen(&self) -> Screen {
        Screen::Error {
            message: i18n::lookup(self.language).error.msg.to_string(),
        }
    }

    fn question_started(round: &Round, fx: &mut Vec<SessionEffect>) {
        fx.push(SessionEffect::ArmTimer);
        fx.push(SessionEffect::QuestionAudio {
            token: round.token,
            index: round.quiz.current_index(),
            preview: round
                .quiz
                .current_question()
                .and_then(|q| q.audio_url.clone()),
        });
    }

    fn play(&mut self, mut round: Round, event: SessionEvent, fx: &mut Vec<SessionEffect>) -> Screen {
        use SessionEvent as E;

        match (round.phase, event) {
            (RoundPhase::Asking { mut timer }, E::Tick) => {
                if timer.tick() {
                    round.phase = RoundPhase::Revealed {
                        selected: None,
                        correct: false,
                    };
                    fx.push(SessionEffect::DisarmTimer);
                    fx.push(SessionEffect::Cue(Cue::Incorrect));
                } else {
                    round.phase = RoundPhase::Asking { timer };
                }
            }
            (RoundPhase::Asking { .. }, E::SelectYear(year)) => {
                let Some(question) = round.quiz.current_question() else {
                    return Screen::Playing(round);
                };
                if !question.options.contains(&year) {
                    debug!(year, "ignoring a year that is not one of the options");
                    return Screen::Playing(round);
                }
                let correct = question.is_correct(year);
                round.phase = RoundPhase::Revealed {
                    selected: Some(year),
                    correct,
                };
                fx.push(SessionEffect::DisarmTimer);
                fx.push(SessionEffect::Cue(if correct { Cue::Correct } else { Cue::Incorrect }));
            }
            (RoundPhase::Revealed { correct, .. }, E::Next) => {
                round.quiz.record(correct);
                fx.push(SessionEffect::Cue(Cue::Click));
                if round.quiz.is_complete() {
                    round.phase = RoundPhase::Completing;
                    match &self.player {
                        Some(player) => fx.push(SessionEffect::SubmitScore {
                            player: player.clone(),
                            score: round.quiz.score(),
                        }),
                        None => warn!("quiz finished without a registered player; score not saved"),
                    }
                    fx.push(SessionEffect::ScheduleFinish {
                        token: round.token,
                        after: FINISH_DELAY,
                    });
                } else {
                    round.phase = RoundPhase::Asking {
                        timer: QuestionTimer::new(round.difficulty.config().timer_seconds),
                    };
                    Self::question_started(&round, fx);
                }
            }
            (RoundPhase::Completing, E::FinishDue { token }) if token == round.token => {
                let cue = if round.quiz.score() > 0 {
                    Cue::Victory
                } else {
                    Cue::Incorrect
                };
                fx.push(SessionEffect::StopMusic);
                fx.push(SessionEffect::Cue(cue));
                return Screen::Finished(round.quiz);
            }
            (_, E::FinishDue { token }) => {
                debug!(token, "ignoring stale finish");
            }
            _ => {}
        }
        Screen::Playing(round)
    }
}

/// [`Session`] as an engine game, so a [`engine::HeadlessRunner`] can drive and record it.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizLogic {
    difficulty: Difficulty,
    language: Language,
}

impl QuizLogic {
    pub fn new(difficulty: Difficulty, language: Language) -> Self {
        Self {
            difficulty,
            language,
        }
    }
}

impl GameLogic for QuizLogic {
    type State = Session;
    type Input = SessionEvent;
    type Effect = SessionEffect;

    fn initial_state(&self) -> Self::State {
        Session::new(self.difficulty, self.language)
    }

    fn step(&self, state: &Self::State, input: Self::Input) -> Transition<Session, SessionEffect> {
        let (state, effects) = state.clone().handle(input);
        Transition { state, effects }
    }
}
