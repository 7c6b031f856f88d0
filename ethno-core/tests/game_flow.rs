//! End-to-end tests of the game flows against a real on-disk catalog:
//! standalone quizzes, marathon/blitz runs, and match pairs.

use ethno_core::{
    ActiveGame, Category, Engine, EngineConfig, EngineError, GameKind, Grade, QuizPayload,
    RunProgress, SelectOutcome, SlotKind,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const CHAT: i64 = 1001;

fn record(name: &str) -> String {
    format!("=START= {{{name} / {name}.png / 1800g}} ===\nОписание {name}.\n=END= {{{name}}} ===\n")
}

fn write_list(root: &Path, entity: &str, category: Category, names: &[&str]) {
    let dir = root.join(entity).join(category.dir_name());
    fs::create_dir_all(&dir).expect("category dir");
    let content: String = names.iter().map(|n| record(n)).collect();
    fs::write(dir.join("list.txt"), content).expect("list file");
}

/// Five entities, cuisine plus events, enough for every game.
fn full_store() -> TempDir {
    let tmp = TempDir::new().expect("temp dir");
    write_list(tmp.path(), "even", Category::Cuisine, &["Кэчэ"]);
    write_list(tmp.path(), "evenk", Category::Cuisine, &["Туктэ"]);
    write_list(tmp.path(), "russian", Category::Cuisine, &["Щи", "Каша"]);
    write_list(tmp.path(), "sakha", Category::Cuisine, &["Строганина"]);
    write_list(tmp.path(), "yukagir", Category::Events, &["Шахадьибэ"]);
    tmp
}

fn engine_over(tmp: &TempDir, seed: u64) -> Engine {
    Engine::new(EngineConfig::new(tmp.path()).with_rng_seed(seed)).expect("engine")
}

/// Index of a correct (or incorrect) button for the given payload.
fn option_index(payload: &QuizPayload, want_correct: bool) -> usize {
    (0..payload.option_count())
        .find(|&i| payload.is_correct(i) == Some(want_correct))
        .expect("such an option exists")
}

fn active_quiz(engine: &Engine) -> QuizPayload {
    match engine.active_game(CHAT) {
        Some(ActiveGame::Quiz(payload)) => payload,
        other => panic!("expected an active quiz, got {other:?}"),
    }
}

#[test]
fn test_marathon_all_correct_is_excellent() {
    let tmp = full_store();
    let mut engine = engine_over(&tmp, 3);

    engine.start_game(CHAT, GameKind::Marathon).expect("start marathon");

    for question in 0..10 {
        let payload = active_quiz(&engine);
        let outcome = engine
            .submit_answer(CHAT, option_index(&payload, true))
            .expect("answer accepted");
        assert!(outcome.correct, "question {question} answered correctly");

        match outcome.progress.expect("run in progress") {
            RunProgress::Next { question_number, score, total_questions, .. } => {
                assert!(question < 9);
                assert_eq!(question_number, question as u32 + 2);
                assert_eq!(score, (question as u32 + 1) * 10);
                assert_eq!(total_questions, 10);
            }
            RunProgress::Complete(summary) => {
                assert_eq!(question, 9);
                assert_eq!(summary.score, 100);
                assert_eq!(summary.max_score, 100);
                assert_eq!(summary.correct_answers, 10);
                assert_eq!(summary.grade, Some(Grade::Excellent));
            }
        }
    }

    // run is torn down after completion
    assert!(engine.active_game(CHAT).is_none());
    assert!(engine.run_status(CHAT).is_none());
}

#[test]
fn test_marathon_all_wrong_is_lowest_band() {
    let tmp = full_store();
    let mut engine = engine_over(&tmp, 5);

    engine.start_game(CHAT, GameKind::Marathon).expect("start marathon");

    let mut last = None;
    for _ in 0..10 {
        let payload = active_quiz(&engine);
        let outcome = engine
            .submit_answer(CHAT, option_index(&payload, false))
            .expect("answer accepted");
        assert!(!outcome.correct);
        last = outcome.progress;
    }

    match last.expect("final progress") {
        RunProgress::Complete(summary) => {
            assert_eq!(summary.score, 0);
            assert_eq!(summary.correct_answers, 0);
            assert_eq!(summary.grade, Some(Grade::NeedsPractice));
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

#[test]
fn test_blitz_is_five_questions_at_twenty_points() {
    let tmp = full_store();
    let mut engine = engine_over(&tmp, 8);

    engine.start_game(CHAT, GameKind::Blitz).expect("start blitz");

    let mut completed = None;
    for _ in 0..5 {
        let payload = active_quiz(&engine);
        let outcome = engine
            .submit_answer(CHAT, option_index(&payload, true))
            .expect("answer accepted");
        if let Some(RunProgress::Complete(summary)) = outcome.progress {
            completed = Some(summary);
        }
    }

    let summary = completed.expect("blitz completed after five answers");
    assert_eq!(summary.total_questions, 5);
    assert_eq!(summary.score, 100);
    assert_eq!(summary.max_score, 100);
    assert_eq!(summary.grade, None, "blitz has no grade banding");
}

#[test]
fn test_standalone_quiz_ends_after_one_question() {
    let tmp = full_store();
    let mut engine = engine_over(&tmp, 13);

    engine.start_game(CHAT, GameKind::EntityQuiz).expect("start quiz");
    let payload = active_quiz(&engine);
    let outcome = engine
        .submit_answer(CHAT, option_index(&payload, true))
        .expect("answer accepted");

    assert!(outcome.correct);
    assert!(outcome.progress.is_none());
    assert!(engine.active_game(CHAT).is_none());

    // the button is now stale
    assert_eq!(engine.submit_answer(CHAT, 0), Err(EngineError::NotFound));
}

#[test]
fn test_dish_quiz_uses_cuisine_only() {
    let tmp = full_store();
    let mut engine = engine_over(&tmp, 21);

    let game = engine.start_game(CHAT, GameKind::DishQuiz).expect("start quiz");
    match game {
        ActiveGame::Quiz(QuizPayload::Dish { options, correct, .. }) => {
            assert!(options.contains(&correct));
            let cuisine_names = ["Кэчэ", "Туктэ", "Щи", "Каша", "Строганина"];
            for option in &options {
                assert!(cuisine_names.contains(&option.as_str()));
            }
        }
        other => panic!("expected a dish quiz, got {other:?}"),
    }
}

#[test]
fn test_out_of_range_answer_keeps_the_question() {
    let tmp = full_store();
    let mut engine = engine_over(&tmp, 34);

    engine.start_game(CHAT, GameKind::EntityQuiz).expect("start quiz");
    assert_eq!(engine.submit_answer(CHAT, 99), Err(EngineError::NotFound));
    // the question is still answerable
    let payload = active_quiz(&engine);
    let outcome = engine
        .submit_answer(CHAT, option_index(&payload, true))
        .expect("answer accepted");
    assert!(outcome.correct);
}

#[test]
fn test_empty_catalog_refuses_every_game() {
    let tmp = TempDir::new().expect("temp dir");
    let mut engine = engine_over(&tmp, 1);

    for kind in [
        GameKind::EntityQuiz,
        GameKind::DishQuiz,
        GameKind::Marathon,
        GameKind::Blitz,
        GameKind::MatchPairs,
    ] {
        assert_eq!(
            engine.start_game(CHAT, kind),
            Err(EngineError::InsufficientData),
            "{kind:?} must refuse an empty catalog"
        );
    }
    assert!(engine.run_status(CHAT).is_none(), "no run was entered");
}

#[test]
fn test_dish_quiz_needs_cuisine_items() {
    let tmp = TempDir::new().expect("temp dir");
    write_list(tmp.path(), "yukagir", Category::Events, &["Шахадьибэ"]);
    let mut engine = engine_over(&tmp, 2);

    assert_eq!(
        engine.start_game(CHAT, GameKind::DishQuiz),
        Err(EngineError::InsufficientData)
    );
    // the generic entity quiz still works off the events item
    assert!(engine.start_game(CHAT, GameKind::EntityQuiz).is_ok());
}

#[test]
fn test_match_pairs_full_protocol() {
    let tmp = full_store();
    let mut engine = engine_over(&tmp, 55);

    let game = engine.start_game(CHAT, GameKind::MatchPairs).expect("start game");
    let entries = match game {
        ActiveGame::Pairs(game) => game.entries().to_vec(),
        other => panic!("expected match pairs, got {other:?}"),
    };
    let mut entities: Vec<&str> = entries.iter().map(|e| e.entity.as_str()).collect();
    entities.sort();
    entities.dedup();
    assert_eq!(entities.len(), 4, "board spans four distinct entities");

    // entity slot picked before any item is a no-op
    let noop = engine
        .select_match_slot(CHAT, SlotKind::Entity, 0)
        .expect("slot in range");
    assert_eq!(noop.outcome, SelectOutcome::NoPending);
    assert_eq!(noop.matches_found, 0);

    for i in 0..4 {
        let picked = engine
            .select_match_slot(CHAT, SlotKind::Item, i)
            .expect("slot in range");
        assert_eq!(picked.outcome, SelectOutcome::ItemPicked);

        // distinct entities, so the matching slot is the item's own index
        let outcome = engine
            .select_match_slot(CHAT, SlotKind::Entity, i)
            .expect("slot in range");
        assert_eq!(outcome.matches_found, i + 1);
        if i == 3 {
            assert_eq!(outcome.outcome, SelectOutcome::Complete);
        } else {
            assert_eq!(outcome.outcome, SelectOutcome::Matched);
        }
    }

    assert!(engine.active_game(CHAT).is_none(), "board cleared on completion");
    assert_eq!(
        engine.select_match_slot(CHAT, SlotKind::Item, 0),
        Err(EngineError::NotFound)
    );
}

#[test]
fn test_sessions_are_independent() {
    let tmp = full_store();
    let mut engine = engine_over(&tmp, 89);

    engine.start_game(1, GameKind::EntityQuiz).expect("chat 1");
    engine.start_game(2, GameKind::MatchPairs).expect("chat 2");

    assert!(matches!(engine.active_game(1), Some(ActiveGame::Quiz(_))));
    assert!(matches!(engine.active_game(2), Some(ActiveGame::Pairs(_))));

    engine.reset_session(1);
    assert!(engine.active_game(1).is_none());
    assert!(engine.active_game(2).is_some());
}
