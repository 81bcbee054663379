//! Quiz engine behavior against scripted fact providers.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::json;

use mapstation_atlas::WorldAtlas;
use mapstation_common::{CountryFacts, CountryShape, NO_CAPITAL};
use mapstation_core::{GameState, QuizEngine, ScriptedFactProvider};

fn atlas(names: &[&str]) -> Arc<WorldAtlas> {
    let shapes = names
        .iter()
        .enumerate()
        .map(|(i, name)| CountryShape {
            id: i.to_string(),
            name: name.to_string(),
            boundary: json!({}),
        })
        .collect();
    Arc::new(WorldAtlas::from_shapes(shapes))
}

fn facts(capital: &str, flag: &str) -> CountryFacts {
    CountryFacts {
        capital: capital.to_string(),
        population: 1_000_000,
        language: "Testish".to_string(),
        fact: "A fact.".to_string(),
        description: "A description.".to_string(),
        gdp: 1.0e9,
        flag_emoji: flag.to_string(),
        states: Vec::new(),
    }
}

const COUNTRIES: [&str; 4] = ["France", "Japan", "Peru", "Kenya"];

fn provider_with_all_countries() -> ScriptedFactProvider {
    let mut provider = ScriptedFactProvider::new();
    for (i, name) in COUNTRIES.iter().enumerate() {
        provider = provider.with_facts(name, facts(&format!("{name} City"), &format!("F{i}")));
    }
    provider
}

fn capital_pool() -> Vec<String> {
    ["Paris", "Lima", "Oslo", "Cairo", "Quito", "Hanoi"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn capital_engine(provider: Arc<ScriptedFactProvider>) -> QuizEngine {
    QuizEngine::capital(provider, atlas(&COUNTRIES), capital_pool())
}

// -------------------------------------------------------------------------
// Happy path
// -------------------------------------------------------------------------

#[tokio::test]
async fn capital_quiz_plays_a_full_round() {
    let provider = Arc::new(provider_with_all_countries());
    let engine = capital_engine(provider.clone());

    engine.start().await;
    let session = engine.session().await;
    assert_eq!(session.state, GameState::Playing);
    assert_eq!(session.score, 0);
    assert_eq!(session.questions_asked, 0);

    let question = session.question.expect("a live question");
    assert!(COUNTRIES.contains(&question.subject.as_str()));
    assert_eq!(question.options.len(), 4);
    assert!(question.options.contains(&question.correct_answer));

    engine.answer(&question.correct_answer).await;
    let session = engine.session().await;
    assert_eq!(session.state, GameState::Answered);
    assert_eq!(session.score, 1);
    assert_eq!(session.questions_asked, 1);
    assert_eq!(session.selected_answer.as_deref(), Some(question.correct_answer.as_str()));
    // question data is retained through the answered state
    assert!(session.question.is_some());

    engine.next_question().await;
    let session = engine.session().await;
    assert_eq!(session.state, GameState::Playing);
    assert_eq!(session.score, 1);

    let question = session.question.expect("a second question");
    let wrong = question
        .options
        .iter()
        .find(|o| **o != question.correct_answer)
        .unwrap();
    engine.answer(wrong).await;
    let session = engine.session().await;
    assert_eq!(session.score, 1);
    assert_eq!(session.questions_asked, 2);
    assert!(session.score <= session.questions_asked);
}

#[tokio::test]
async fn options_are_unique_case_insensitively() {
    let provider = Arc::new(provider_with_all_countries());
    // pool with folded duplicates and a collision with every capital
    let pool = ["PARIS", "paris", "Lima", "lima", "Oslo", "Cairo", "Quito"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let engine = QuizEngine::capital(provider, atlas(&COUNTRIES), pool);

    for _ in 0..10 {
        engine.start().await;
        let session = engine.session().await;
        let question = session.question.expect("a live question");
        let folded: HashSet<String> = question
            .options
            .iter()
            .map(|o| o.to_lowercase())
            .collect();
        assert_eq!(folded.len(), 4, "options: {:?}", question.options);
    }
}

#[tokio::test]
async fn answer_is_compared_case_sensitively() {
    let provider = Arc::new(provider_with_all_countries());
    let engine = capital_engine(provider);

    engine.start().await;
    let question = engine.session().await.question.unwrap();
    engine.answer(&question.correct_answer.to_lowercase()).await;

    // capitals are scripted as "<Country> City", so the folded form
    // never matches exactly: answered, not scored
    let session = engine.session().await;
    assert_eq!(session.state, GameState::Answered);
    assert_eq!(session.score, 0);
    assert_eq!(session.questions_asked, 1);
}

#[tokio::test]
async fn start_resets_the_session_counters() {
    let provider = Arc::new(provider_with_all_countries());
    let engine = capital_engine(provider);

    engine.start().await;
    let question = engine.session().await.question.unwrap();
    engine.answer(&question.correct_answer).await;
    assert_eq!(engine.session().await.score, 1);

    engine.start().await;
    let session = engine.session().await;
    assert_eq!(session.score, 0);
    assert_eq!(session.questions_asked, 0);
    assert_eq!(session.state, GameState::Playing);
    assert!(session.selected_answer.is_none());
}

// -------------------------------------------------------------------------
// State machine guards
// -------------------------------------------------------------------------

#[tokio::test]
async fn answer_outside_playing_is_a_noop() {
    let provider = Arc::new(provider_with_all_countries());
    let engine = capital_engine(provider);

    // idle: nothing happens
    engine.answer("Paris").await;
    let session = engine.session().await;
    assert_eq!(session.state, GameState::Idle);
    assert_eq!(session.questions_asked, 0);

    // answered: a second answer is ignored
    engine.start().await;
    let question = engine.session().await.question.unwrap();
    engine.answer(&question.correct_answer).await;
    engine.answer(&question.correct_answer).await;
    let session = engine.session().await;
    assert_eq!(session.score, 1);
    assert_eq!(session.questions_asked, 1);
}

#[tokio::test]
async fn next_question_requires_an_answered_state() {
    let provider = Arc::new(provider_with_all_countries());
    let engine = capital_engine(provider.clone());

    engine.start().await;
    let before = engine.session().await;
    let calls_before = provider.call_count();

    // playing: next_question is ignored, the live question stays
    engine.next_question().await;
    let after = engine.session().await;
    assert_eq!(after, before);
    assert_eq!(provider.call_count(), calls_before);
}

#[tokio::test]
async fn questions_asked_counts_completed_answers() {
    let provider = Arc::new(provider_with_all_countries());
    let engine = capital_engine(provider);

    engine.start().await;
    for expected in 1..=3u32 {
        let question = engine.session().await.question.unwrap();
        engine.answer(&question.correct_answer).await;
        let session = engine.session().await;
        assert_eq!(session.questions_asked, expected);
        assert!(session.score <= session.questions_asked);
        engine.next_question().await;
    }
}

// -------------------------------------------------------------------------
// Failure handling
// -------------------------------------------------------------------------

#[tokio::test]
async fn ten_fetch_failures_exhaust_the_budget() {
    let provider = Arc::new(ScriptedFactProvider::failing());
    let engine = QuizEngine::capital(provider.clone(), atlas(&COUNTRIES), capital_pool());

    engine.start().await;
    let session = engine.session().await;
    assert_eq!(session.state, GameState::Idle);
    assert!(session.error.is_some());
    assert_eq!(session.score, 0);
    assert_eq!(session.questions_asked, 0);
    assert!(session.question.is_none());
    assert_eq!(provider.call_count(), 10);
}

#[tokio::test]
async fn missing_fact_sheets_also_exhaust_the_budget() {
    // Ok(None) from the provider must behave exactly like an error
    let provider = Arc::new(ScriptedFactProvider::new());
    let engine = QuizEngine::capital(provider.clone(), atlas(&COUNTRIES), capital_pool());

    engine.start().await;
    let session = engine.session().await;
    assert_eq!(session.state, GameState::Idle);
    assert!(session.error.is_some());
    assert_eq!(provider.call_count(), 10);
}

#[tokio::test]
async fn sentinel_capitals_are_unusable() {
    let mut provider = ScriptedFactProvider::new();
    for name in COUNTRIES {
        provider = provider.with_facts(name, facts(NO_CAPITAL, "🏳️"));
    }
    let engine = QuizEngine::capital(Arc::new(provider), atlas(&COUNTRIES), capital_pool());

    engine.start().await;
    let session = engine.session().await;
    assert_eq!(session.state, GameState::Idle);
    assert!(session.error.is_some());
}

#[tokio::test]
async fn a_small_capital_pool_never_reaches_playing() {
    let provider = Arc::new(provider_with_all_countries());
    let pool = vec!["Paris".to_string(), "Lima".to_string()];
    let engine = QuizEngine::capital(provider.clone(), atlas(&COUNTRIES), pool);

    engine.start().await;
    let session = engine.session().await;
    assert_eq!(session.state, GameState::Idle);
    assert!(session.error.is_some());
    assert_eq!(session.questions_asked, 0);
    // every attempt fetched facts, then failed on the distractor pool
    assert_eq!(provider.call_count(), 10);
}

#[tokio::test]
async fn an_empty_atlas_fails_without_fetching() {
    let provider = Arc::new(provider_with_all_countries());
    let engine = QuizEngine::capital(provider.clone(), Arc::new(WorldAtlas::empty()), capital_pool());

    engine.start().await;
    let session = engine.session().await;
    assert_eq!(session.state, GameState::Idle);
    assert!(session.error.is_some());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn restart_after_an_exhausted_error_is_allowed() {
    let provider = Arc::new(ScriptedFactProvider::failing());
    let engine = QuizEngine::capital(provider.clone(), atlas(&COUNTRIES), capital_pool());

    engine.start().await;
    assert_eq!(engine.session().await.state, GameState::Idle);

    engine.start().await;
    assert_eq!(engine.session().await.state, GameState::Idle);
    assert_eq!(provider.call_count(), 20);
}

// -------------------------------------------------------------------------
// Flag quiz
// -------------------------------------------------------------------------

#[tokio::test]
async fn flag_quiz_prompts_with_the_glyph_and_offers_country_names() {
    let names = ["France", "Japan", "Peru", "Kenya", "Chile", "Ghana"];
    let mut provider = ScriptedFactProvider::new();
    for (i, name) in names.iter().enumerate() {
        provider = provider.with_facts(name, facts(&format!("{name} City"), &format!("F{i}")));
    }
    let shapes = atlas(&names);
    let engine = QuizEngine::flag(Arc::new(provider), shapes.clone());

    engine.start().await;
    let session = engine.session().await;
    assert_eq!(session.state, GameState::Playing);

    let question = session.question.unwrap();
    // the glyph is the prompt, not an option
    let atlas_names = shapes.names();
    assert!(!atlas_names.contains(&question.subject));
    assert!(question.subject.starts_with('F') && question.subject.len() == 2);
    for option in &question.options {
        assert!(atlas_names.contains(option), "{option} is not a country name");
    }
    assert!(atlas_names.contains(&question.correct_answer));
}

#[tokio::test]
async fn flag_quiz_rejects_fact_sheets_without_a_glyph() {
    let names = ["France", "Japan", "Peru", "Kenya", "Chile"];
    let mut provider = ScriptedFactProvider::new();
    for name in names {
        provider = provider.with_facts(name, facts(&format!("{name} City"), ""));
    }
    let engine = QuizEngine::flag(Arc::new(provider), atlas(&names));

    engine.start().await;
    let session = engine.session().await;
    assert_eq!(session.state, GameState::Idle);
    assert!(session.error.is_some());
}
