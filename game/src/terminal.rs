//! Line-oriented terminal front end: renders the current screen and turns typed lines into
//! session events.

use std::fmt::Write as _;

use crate::i18n::{self, Language, Strings};
use crate::leaderboard::{LeaderboardEntry, medal};
use crate::player::{Player, RegistrationError};
use crate::question::{Difficulty, OPTION_COUNT, Year};
use crate::round_timer::{QuestionTimer, Urgency};
use crate::runtime::Runtime;
use crate::scoring::{self, ChartGeometry, ChartPoint};
use crate::session::{Quiz, Round, RoundPhase, Screen, SessionEvent};

const CHART_ROWS: usize = 8;
const RULE: &str = "────────────────────────────────────────";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Mute,
    Leaderboard,
    Back,
    Quit,
    Play,
    SetDifficulty(Difficulty),
    SetLanguage(Language),
    /// 1-based option position.
    Option(usize),
    Year(Year),
    TogglePreview,
    Next,
    Restart,
    /// Free text typed into the registration form.
    Text(String),
    Invalid(String),
}

/// Interprets one input line in the context of `screen`.
pub fn parse_command(screen: &Screen, line: &str) -> Command {
    let line = line.trim();
    match line {
        "/mute" => return Command::Mute,
        "/leaderboard" => return Command::Leaderboard,
        "/back" => return Command::Back,
        "/quit" => return Command::Quit,
        _ => {}
    }

    match screen {
        Screen::Start => {
            let mut words = line.split_whitespace();
            match (words.next(), words.next()) {
                (Some("p" | "play"), None) => Command::Play,
                (Some("l"), None) => Command::Leaderboard,
                (Some("d"), Some(tier)) => tier
                    .parse()
                    .map(Command::SetDifficulty)
                    .unwrap_or_else(Command::Invalid),
                (Some("lang"), Some(code)) => code
                    .parse()
                    .map(Command::SetLanguage)
                    .unwrap_or_else(Command::Invalid),
                _ => Command::Invalid(format!("unknown command `{line}`")),
            }
        }
        Screen::Register => Command::Text(line.to_string()),
        Screen::Playing(_) => match line {
            "" | "n" => Command::Next,
            "p" => Command::TogglePreview,
            _ => match line.parse::<usize>() {
                Ok(n) if (1..=OPTION_COUNT).contains(&n) => Command::Option(n),
                Ok(year) => Year::try_from(year)
                    .map(Command::Year)
                    .unwrap_or_else(|_| Command::Invalid(format!("`{line}` is not a year"))),
                Err(_) => Command::Invalid(format!("unknown command `{line}`")),
            },
        },
        Screen::Finished(_) => match line {
            "r" => Command::Restart,
            "l" => Command::Leaderboard,
            _ => Command::Invalid(format!("unknown command `{line}`")),
        },
        Screen::Error { .. } => match line {
            "" | "r" => Command::Restart,
            _ => Command::Invalid(format!("unknown command `{line}`")),
        },
        Screen::Leaderboard { .. } if line.is_empty() => Command::Back,
        Screen::Loading { .. } | Screen::Leaderboard { .. } => {
            Command::Invalid(format!("unknown command `{line}`"))
        }
    }
}

/// Collects the four registration fields one line at a time.
#[derive(Debug, Default, Clone)]
pub struct RegistrationForm {
    values: Vec<String>,
}

impl RegistrationForm {
    const FIELDS: usize = 4;

    pub fn prompt(&self, strings: &Strings) -> &'static str {
        let r = &strings.register;
        match self.values.len() {
            0 => r.first_name,
            1 => r.last_name,
            2 => r.email,
            _ => r.phone,
        }
    }

    pub fn filled(&self) -> usize {
        self.values.len()
    }

    /// Stores the next field. Once all fields are in, validates them and clears the form.
    pub fn push(&mut self, value: &str) -> Option<Result<Player, RegistrationError>> {
        self.values.push(value.to_string());
        if self.values.len() < Self::FIELDS {
            return None;
        }
        let values = std::mem::take(&mut self.values);
        Some(Player::new(&values[0], &values[1], &values[2], &values[3]))
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Terminal state that lives outside the session: the half-filled form and the last notice.
#[derive(Debug, Default)]
pub struct TerminalUi {
    form: RegistrationForm,
    notice: Option<String>,
}

impl TerminalUi {
    pub fn handle_line(&mut self, runtime: &mut Runtime, line: &str) -> Flow {
        self.notice = None;
        let command = parse_command(runtime.session().screen(), line);
        let event = match command {
            Command::Quit => return Flow::Quit,
            Command::Mute => {
                runtime.toggle_mute();
                None
            }
            Command::TogglePreview => {
                if runtime.toggle_preview().is_none() {
                    let t = i18n::lookup(runtime.session().language());
                    self.notice = Some(t.quiz.no_preview.to_string());
                }
                None
            }
            Command::Leaderboard => Some(SessionEvent::ShowLeaderboard),
            Command::Back => {
                self.form.clear();
                Some(SessionEvent::Back)
            }
            Command::Play => {
                self.form.clear();
                Some(SessionEvent::Play)
            }
            Command::SetDifficulty(difficulty) => Some(SessionEvent::SetDifficulty(difficulty)),
            Command::SetLanguage(language) => Some(SessionEvent::SetLanguage(language)),
            Command::Option(position) => runtime
                .session()
                .round()
                .and_then(|round| round.quiz.current_question())
                .and_then(|q| q.option(position - 1))
                .map(SessionEvent::SelectYear),
            Command::Year(year) => Some(SessionEvent::SelectYear(year)),
            Command::Next => Some(SessionEvent::Next),
            Command::Restart => Some(SessionEvent::Restart),
            Command::Text(value) => match self.form.push(&value) {
                None => None,
                Some(Ok(player)) => Some(SessionEvent::Register(player)),
                Some(Err(err)) => {
                    self.notice = Some(err.to_string());
                    None
                }
            },
            Command::Invalid(message) => {
                self.notice = Some(message);
                None
            }
        };
        if let Some(event) = event {
            runtime.dispatch(event);
        }
        Flow::Continue
    }

    pub fn render(&self, runtime: &Runtime) -> String {
        let session = runtime.session();
        let t = i18n::lookup(session.language());
        let mut out = String::new();
        let _ = writeln!(out, "{RULE}");
        let _ = writeln!(
            out,
            "{}  [{}] [{}]{}",
            t.start.title,
            session.language(),
            t.difficulty(session.difficulty()),
            if runtime.audio().muted() { "  🔇" } else { "  🔊" }
        );
        let _ = writeln!(out, "{RULE}");

        match session.screen() {
            Screen::Start => render_start(&mut out, t, session.difficulty()),
            Screen::Register => {
                let _ = writeln!(out, "{}", t.register.title);
                let _ = writeln!(out, "{}", t.register.subtitle);
                let _ = writeln!(
                    out,
                    "({}/4) {}:",
                    self.form.filled() + 1,
                    self.form.prompt(t)
                );
            }
            Screen::Loading { .. } => {
                match session.player() {
                    Some(player) => {
                        let _ = writeln!(out, "{} {}...", t.loading.preparing, player.first_name());
                    }
                    None => {
                        let _ = writeln!(out, "{}", t.loading.archives);
                    }
                }
                let _ = writeln!(out, "({})", t.loading.cancel_hint);
            }
            Screen::Playing(round) => render_round(&mut out, t, round, runtime.audio().is_preview_playing()),
            Screen::Finished(quiz) => {
                render_result(&mut out, t, quiz, session.player().map(Player::first_name))
            }
            Screen::Error { message } => {
                let _ = writeln!(out, "{}", t.error.oops);
                let _ = writeln!(out, "{message}");
                let _ = writeln!(out, "[r] {}", t.error.retry);
            }
            Screen::Leaderboard { .. } => {
                render_leaderboard(&mut out, t, &runtime.leaderboard().read())
            }
        }

        if let Some(notice) = &self.notice {
            let _ = writeln!(out, "! {notice}");
        }
        out
    }
}

fn render_start(out: &mut String, t: &Strings, current: Difficulty) {
    let _ = writeln!(out, "{}", t.start.subtitle);
    let _ = writeln!(out, "{} {}", t.start.artists, t.start.more);
    let _ = writeln!(out);
    let tiers: Vec<String> = Difficulty::ALL
        .iter()
        .map(|&d| {
            let label = t.difficulty(d);
            if d == current {
                format!("[{label}]")
            } else {
                label.to_string()
            }
        })
        .collect();
    let _ = writeln!(out, "{}: {}", t.start.difficulty, tiers.join("  "));
    let _ = writeln!(out);
    let _ = writeln!(out, "[p] {}   [l] {}", t.start.start_btn, t.start.leaderboard_btn);
    let _ = writeln!(out, "d <easy|medium|hard>   lang <en|fr>   /mute   /quit");
    let _ = writeln!(out, "{}", t.start.footer);
}

pub fn render_countdown(timer: &QuestionTimer) -> String {
    let marker = match timer.urgency() {
        Urgency::Calm => "",
        Urgency::Warning => " !",
        Urgency::Critical => " !!",
    };
    format!("⏱ {}s{marker}", timer.remaining())
}

fn render_round(out: &mut String, t: &Strings, round: &Round, preview_playing: bool) {
    let quiz = &round.quiz;
    let Some(question) = quiz.current_question() else {
        return;
    };
    let q = &t.quiz;
    let _ = write!(
        out,
        "{} {}/{}   {}: {}",
        q.question,
        quiz.current_index() + 1,
        quiz.question_count(),
        q.score,
        quiz.score()
    );
    if let Some(timer) = round.timer() {
        let _ = write!(out, "   {}", render_countdown(timer));
    }
    let _ = writeln!(out);
    let _ = writeln!(out);
    let _ = writeln!(out, "♪ \"{}\" {} {}", question.song_title, q.by, question.artist);
    if question.audio_url.is_some() {
        let status = if preview_playing {
            q.preview_playing
        } else {
            q.preview_paused
        };
        let _ = writeln!(out, "  {status} [p]");
    }
    let _ = writeln!(out);

    let (selected, revealed, correct) = match round.phase {
        RoundPhase::Asking { .. } => (None, false, false),
        RoundPhase::Revealed { selected, correct } => (selected, true, correct),
        RoundPhase::Completing => (None, true, false),
    };
    for (i, year) in question.options.iter().enumerate() {
        let mark = if !revealed {
            " "
        } else if *year == question.correct_year {
            "✓"
        } else if Some(*year) == selected {
            "✗"
        } else {
            " "
        };
        let _ = writeln!(out, "  {mark} [{}] {year}", i + 1);
    }

    if revealed {
        let _ = writeln!(out);
        if selected.is_none() && round.phase != RoundPhase::Completing {
            let _ = writeln!(out, "{}", q.time_up);
        } else if round.phase != RoundPhase::Completing {
            let verdict = if correct { t.result.correct } else { t.result.incorrect };
            let _ = writeln!(out, "{verdict}");
        }
        let _ = writeln!(out, "{}: {}", q.album, question.album);
        let _ = writeln!(out, "{}: {}", q.release_date, question.release_date);
        let _ = writeln!(out, "{}: \"{}\"", q.lyrics_reveal, question.lyrics_snippet);
        if round.phase != RoundPhase::Completing {
            let next = if quiz.is_last_question() {
                q.finish_quiz
            } else {
                q.next_question
            };
            let _ = writeln!(out, "[n] {next}");
        }
    } else {
        let _ = writeln!(out, "{}", q.answer_hint);
    }
}

fn render_result(out: &mut String, t: &Strings, quiz: &Quiz, first_name: Option<&str>) {
    let (headline, sub) = t.rating(quiz.rating());
    let _ = writeln!(out, "{headline}");
    let _ = writeln!(out, "{sub}");
    if let Some(name) = first_name {
        let _ = writeln!(out, "{}, {name}!", t.result.well_played);
    }
    let _ = writeln!(
        out,
        "{}: {} / {}",
        t.quiz.score,
        quiz.score(),
        scoring::max_score(quiz.question_count())
    );
    let right = quiz.history().iter().filter(|&&c| c).count();
    let wrong = quiz.history().len() - right;
    let _ = writeln!(
        out,
        "{}: {right}   {}: {wrong}",
        t.result.correct, t.result.incorrect
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", t.result.performance);
    out.push_str(&render_chart(&quiz.chart()));
    let _ = writeln!(out);
    let _ = writeln!(out, "[r] {}   [l] {}", t.result.play_again, t.result.leaderboard);
}

/// Plots the chart series on a character grid, one column per point.
pub fn render_chart(points: &[ChartPoint]) -> String {
    let columns = points.len().max(2);
    let geometry = ChartGeometry {
        width: (columns - 1) as f32,
        height: (CHART_ROWS - 1) as f32,
        padding: 0.0,
    };
    let mut grid = vec![vec![' '; columns]; CHART_ROWS];
    for ((x, y), point) in geometry.project(points).into_iter().zip(points) {
        let col = (x.round() as usize).min(columns - 1);
        let row = (y.round() as usize).min(CHART_ROWS - 1);
        grid[row][col] = match point.correct {
            None => '○',
            Some(true) => '●',
            Some(false) => '✗',
        };
    }

    let mut out = String::new();
    for row in grid {
        let line: String = row.into_iter().collect();
        let _ = writeln!(out, "│{}", line.trim_end());
    }
    let _ = writeln!(out, "└{}", "─".repeat(columns));
    out
}

fn render_leaderboard(out: &mut String, t: &Strings, entries: &[LeaderboardEntry]) {
    let l = &t.leaderboard;
    let _ = writeln!(out, "{}", l.title);
    if entries.is_empty() {
        let _ = writeln!(out, "{}", l.empty);
    } else {
        let _ = writeln!(out, "{:<6} {:<28} {:>6}  {}", l.rank, l.player, l.score, l.date);
        for (rank, entry) in entries.iter().enumerate() {
            let badge = medal(rank).map_or_else(|| format!("#{}", rank + 1), str::to_string);
            let name = format!("{} {}", entry.first_name, entry.last_name);
            let _ = writeln!(out, "{badge:<6} {name:<28} {:>6}  {}", entry.score, entry.date);
        }
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[Enter] {}", l.back);
}
