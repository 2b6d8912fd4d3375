use beat_timeline::i18n::{self, Language};
use beat_timeline::player::Player;
use beat_timeline::question::{Difficulty, Question, Year};
use beat_timeline::scoring::{self, Rating};
use beat_timeline::session::{
    FINISH_DELAY, RoundPhase, Screen, Session, SessionEffect, SessionEvent,
};
use beat_timeline::sfx::Cue;

fn question(correct_year: Year) -> Question {
    Question {
        artist: "Stromae".to_string(),
        song_title: "Alors on danse".to_string(),
        correct_year,
        options: vec![correct_year - 1, correct_year, correct_year + 1, correct_year + 2],
        lyrics_snippet: "Alors on danse".to_string(),
        album: "Cheese".to_string(),
        release_date: format!("{correct_year}-09-28"),
        audio_url: None,
    }
}

fn batch(count: usize) -> Vec<Question> {
    (0..count).map(|i| question(1990 + i as Year)).collect()
}

fn player() -> Player {
    Player::new("Ada", "Lovelace", "ada@example.com", "0123456789").expect("valid player")
}

fn step(session: Session, event: SessionEvent, log: &mut Vec<SessionEffect>) -> Session {
    let (session, effects) = session.handle(event);
    log.extend(effects);
    assert_aggregate_invariants(&session);
    session
}

fn assert_aggregate_invariants(session: &Session) {
    let quiz = match session.screen() {
        Screen::Playing(round) => &round.quiz,
        Screen::Finished(quiz) => quiz,
        _ => return,
    };
    assert_eq!(quiz.history().len(), quiz.current_index());
    assert_eq!(quiz.score(), scoring::total(quiz.history()));
    assert!(quiz.current_index() <= quiz.question_count());
}

fn playing(difficulty: Difficulty) -> Session {
    let mut log = Vec::new();
    let session = step(Session::new(difficulty, Language::En), SessionEvent::Play, &mut log);
    let session = step(session, SessionEvent::Register(player()), &mut log);
    step(
        session,
        SessionEvent::QuestionsLoaded {
            token: 1,
            result: Ok(batch(difficulty.config().question_count)),
        },
        &mut log,
    )
}

fn current_correct_year(session: &Session) -> Year {
    session
        .round()
        .and_then(|round| round.quiz.current_question())
        .map(|q| q.correct_year)
        .expect("a question should be on screen")
}

#[test]
fn easy_game_with_six_right_and_four_wrong_scores_forty() {
    let mut session = playing(Difficulty::Easy);
    let mut log = Vec::new();

    for i in 0..10 {
        let correct = current_correct_year(&session);
        let pick = if i < 6 { correct } else { correct + 1 };
        session = step(session, SessionEvent::SelectYear(pick), &mut log);
        session = step(session, SessionEvent::Next, &mut log);
    }

    let submissions: Vec<_> = log
        .iter()
        .filter_map(|e| match e {
            SessionEffect::SubmitScore { player, score } => Some((player.clone(), *score)),
            _ => None,
        })
        .collect();
    assert_eq!(submissions, vec![(player(), 40)]);
    assert!(log.contains(&SessionEffect::ScheduleFinish {
        token: 1,
        after: FINISH_DELAY
    }));

    let round = session.round().expect("still on the quiz until the delay passes");
    assert_eq!(round.phase, RoundPhase::Completing);

    let (session, effects) = session.handle(SessionEvent::FinishDue { token: 1 });
    match session.screen() {
        Screen::Finished(quiz) => {
            assert_eq!(quiz.score(), 40);
            assert_eq!(quiz.history().len(), 10);
            assert_eq!(quiz.rating(), Rating::Casual);
        }
        other => panic!("expected Finished, got {other:?}"),
    }
    assert_eq!(
        effects,
        vec![SessionEffect::StopMusic, SessionEffect::Cue(Cue::Victory)]
    );
}

#[test]
fn timeout_reveals_as_incorrect_without_advancing() {
    let mut session = playing(Difficulty::Easy);
    let mut log = Vec::new();
    for _ in 0..14 {
        session = step(session, SessionEvent::Tick, &mut log);
    }
    assert!(log.is_empty(), "no effects before the countdown runs out");

    session = step(session, SessionEvent::Tick, &mut log);
    let round = session.round().expect("playing");
    assert_eq!(
        round.phase,
        RoundPhase::Revealed {
            selected: None,
            correct: false
        }
    );
    assert_eq!(round.quiz.current_index(), 0);
    assert_eq!(
        log,
        vec![SessionEffect::DisarmTimer, SessionEffect::Cue(Cue::Incorrect)]
    );

    // A late pick after the timeout does not change the outcome.
    let before = session.clone();
    let (session, effects) = session.handle(SessionEvent::SelectYear(current_correct_year(&before)));
    assert_eq!(session, before);
    assert!(effects.is_empty());

    let (session, _) = session.handle(SessionEvent::Next);
    let round = session.round().expect("playing");
    assert_eq!(round.quiz.score(), -5);
    assert_eq!(round.quiz.current_index(), 1);
    assert_eq!(round.timer().map(|t| t.remaining()), Some(15));
}

#[test]
fn second_submission_for_the_same_question_is_ignored() {
    let session = playing(Difficulty::Medium);
    let correct = current_correct_year(&session);
    let (session, _) = session.handle(SessionEvent::SelectYear(correct + 1));
    let before = session.clone();
    let (session, effects) = session.handle(SessionEvent::SelectYear(correct));
    assert_eq!(session, before);
    assert!(effects.is_empty());
}

#[test]
fn next_before_answering_does_nothing() {
    let session = playing(Difficulty::Hard);
    let before = session.clone();
    let (session, effects) = session.handle(SessionEvent::Next);
    assert_eq!(session, before);
    assert!(effects.is_empty());
}

#[test]
fn new_question_rearms_timer_and_requests_its_audio() {
    let session = playing(Difficulty::Easy);
    let correct = current_correct_year(&session);
    let (session, _) = session.handle(SessionEvent::SelectYear(correct));
    let (_, effects) = session.handle(SessionEvent::Next);
    assert_eq!(
        effects,
        vec![
            SessionEffect::Cue(Cue::Click),
            SessionEffect::ArmTimer,
            SessionEffect::QuestionAudio {
                token: 1,
                index: 1,
                preview: None
            },
        ]
    );
}

#[test]
fn batch_of_the_wrong_length_never_enters_playing() {
    for count in [0, 9, 11] {
        let (session, _) = Session::new(Difficulty::Easy, Language::En).handle(SessionEvent::Play);
        let (session, _) = session.handle(SessionEvent::Register(player()));
        let (session, effects) = session.handle(SessionEvent::QuestionsLoaded {
            token: 1,
            result: Ok(batch(count)),
        });
        assert!(
            matches!(session.screen(), Screen::Error { .. }),
            "{count} questions should be rejected"
        );
        assert!(effects.is_empty());
    }
}

#[test]
fn generation_failure_shows_localized_message_and_retries_from_start() {
    let (session, _) = Session::new(Difficulty::Medium, Language::Fr).handle(SessionEvent::Play);
    let (session, _) = session.handle(SessionEvent::Register(player()));
    let (session, _) = session.handle(SessionEvent::QuestionsLoaded {
        token: 1,
        result: Err("network down".to_string()),
    });
    assert_eq!(
        session.screen(),
        &Screen::Error {
            message: i18n::lookup(Language::Fr).error.msg.to_string()
        }
    );

    let (session, effects) = session.handle(SessionEvent::Restart);
    assert_eq!(session.screen(), &Screen::Start);
    assert_eq!(effects, vec![SessionEffect::Cue(Cue::Click)]);
}

#[test]
fn response_for_a_cancelled_request_is_ignored() {
    let (session, _) = Session::new(Difficulty::Easy, Language::En).handle(SessionEvent::Play);
    let (session, _) = session.handle(SessionEvent::Register(player()));
    let (session, _) = session.handle(SessionEvent::Back);
    assert_eq!(session.screen(), &Screen::Start);

    let (session, _) = session.handle(SessionEvent::Play);
    let (session, effects) = session.handle(SessionEvent::Register(player()));
    assert!(effects.contains(&SessionEffect::RequestQuestions {
        token: 2,
        difficulty: Difficulty::Easy
    }));

    let (session, effects) = session.handle(SessionEvent::QuestionsLoaded {
        token: 1,
        result: Ok(batch(10)),
    });
    assert_eq!(
        session.screen(),
        &Screen::Loading {
            token: 2,
            difficulty: Difficulty::Easy
        }
    );
    assert!(effects.is_empty());

    let (session, _) = session.handle(SessionEvent::QuestionsLoaded {
        token: 2,
        result: Ok(batch(10)),
    });
    assert_eq!(session.round().map(|r| r.token), Some(2));
}

#[test]
fn restart_keeps_the_player_and_requests_a_fresh_batch() {
    let mut session = playing(Difficulty::Easy);
    for _ in 0..10 {
        let correct = current_correct_year(&session);
        let (next, _) = session.handle(SessionEvent::SelectYear(correct));
        let (next, _) = next.handle(SessionEvent::Next);
        session = next;
    }
    let (session, effects) = session.handle(SessionEvent::FinishDue { token: 1 });
    assert!(effects.contains(&SessionEffect::Cue(Cue::Victory)));
    assert!(matches!(session.screen(), Screen::Finished(q) if q.rating() == Rating::Legend));

    let (session, effects) = session.handle(SessionEvent::Restart);
    assert_eq!(session.player(), Some(&player()));
    assert_eq!(
        session.screen(),
        &Screen::Loading {
            token: 2,
            difficulty: Difficulty::Easy
        }
    );
    assert!(effects.contains(&SessionEffect::RequestQuestions {
        token: 2,
        difficulty: Difficulty::Easy
    }));
}

#[test]
fn all_wrong_finishes_with_the_incorrect_cue() {
    let mut session = playing(Difficulty::Easy);
    for _ in 0..10 {
        let correct = current_correct_year(&session);
        let (next, _) = session.handle(SessionEvent::SelectYear(correct + 2));
        let (next, _) = next.handle(SessionEvent::Next);
        session = next;
    }
    let (session, effects) = session.handle(SessionEvent::FinishDue { token: 1 });
    assert!(effects.contains(&SessionEffect::Cue(Cue::Incorrect)));
    match session.screen() {
        Screen::Finished(quiz) => {
            assert_eq!(quiz.score(), -50);
            assert_eq!(quiz.rating(), Rating::Ouch);
        }
        other => panic!("expected Finished, got {other:?}"),
    }
}

#[test]
fn leaderboard_from_finished_returns_to_the_result() {
    let mut session = playing(Difficulty::Easy);
    for _ in 0..10 {
        let correct = current_correct_year(&session);
        let (next, _) = session.handle(SessionEvent::SelectYear(correct));
        let (next, _) = next.handle(SessionEvent::Next);
        session = next;
    }
    let (finished, _) = session.handle(SessionEvent::FinishDue { token: 1 });
    let (viewing, _) = finished.clone().handle(SessionEvent::ShowLeaderboard);
    assert!(matches!(viewing.screen(), Screen::Leaderboard { .. }));
    let (back, _) = viewing.handle(SessionEvent::Back);
    assert_eq!(back.screen(), finished.screen());
}
