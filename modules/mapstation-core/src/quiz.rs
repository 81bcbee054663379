// Quiz engine: question/answer state machine layered on the fact provider.
//
// Two instances run in production, one per question kind. Each owns its
// session; nothing is shared with the selection controller.

use std::collections::HashSet;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use mapstation_atlas::WorldAtlas;
use mapstation_common::CountryFacts;

use crate::facts::FactProvider;

/// Attempt budget for finding a country with a usable fact sheet.
const MAX_ATTEMPTS: u32 = 10;
/// Incorrect options shown alongside the correct one.
const DISTRACTOR_COUNT: usize = 3;

const EXHAUSTED_MESSAGE: &str = "Could not generate a new question. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizKind {
    Capital,
    Flag,
}

impl QuizKind {
    /// Whether a fact sheet can back a question of this kind.
    fn usable(&self, facts: &CountryFacts) -> bool {
        match self {
            QuizKind::Capital => facts.has_usable_capital(),
            QuizKind::Flag => facts.has_flag(),
        }
    }
}

impl std::fmt::Display for QuizKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuizKind::Capital => write!(f, "capital"),
            QuizKind::Flag => write!(f, "flag"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    #[default]
    Idle,
    Loading,
    Playing,
    Answered,
}

/// One question: the prompt subject (country name for the capital quiz,
/// flag glyph for the flag quiz) and four shuffled answer options.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub subject: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSession {
    pub state: GameState,
    pub score: u32,
    pub questions_asked: u32,
    pub question: Option<QuizQuestion>,
    pub selected_answer: Option<String>,
    pub error: Option<String>,
}

pub struct QuizEngine {
    kind: QuizKind,
    provider: Arc<dyn FactProvider>,
    atlas: Arc<WorldAtlas>,
    distractor_pool: Vec<String>,
    session: RwLock<QuizSession>,
}

impl QuizEngine {
    /// Capital quiz: distractors come from the preloaded capital list.
    pub fn capital(
        provider: Arc<dyn FactProvider>,
        atlas: Arc<WorldAtlas>,
        capitals: Vec<String>,
    ) -> Self {
        Self {
            kind: QuizKind::Capital,
            provider,
            atlas,
            distractor_pool: capitals,
            session: RwLock::new(QuizSession::default()),
        }
    }

    /// Flag quiz: the glyph is the prompt and the player picks among
    /// country names, so the distractor pool is the atlas name list.
    pub fn flag(provider: Arc<dyn FactProvider>, atlas: Arc<WorldAtlas>) -> Self {
        let distractor_pool = atlas.names();
        Self {
            kind: QuizKind::Flag,
            provider,
            atlas,
            distractor_pool,
            session: RwLock::new(QuizSession::default()),
        }
    }

    /// Reset score and question count, then generate the first question.
    pub async fn start(&self) {
        {
            let mut session = self.session.write().await;
            if session.state == GameState::Loading {
                return;
            }
            *session = QuizSession {
                state: GameState::Loading,
                ..QuizSession::default()
            };
        }
        self.generate().await;
    }

    /// Advance from an answered question to a fresh one. Score and question
    /// count carry over.
    pub async fn next_question(&self) {
        {
            let mut session = self.session.write().await;
            if session.state != GameState::Answered {
                return;
            }
            session.state = GameState::Loading;
            session.question = None;
            session.selected_answer = None;
            session.error = None;
        }
        self.generate().await;
    }

    /// Record the player's choice. Accepted only while a question is live.
    pub async fn answer(&self, choice: &str) {
        let mut session = self.session.write().await;
        if session.state != GameState::Playing {
            return;
        }
        let Some(question) = session.question.clone() else {
            return;
        };
        session.selected_answer = Some(choice.to_string());
        if choice == question.correct_answer {
            session.score += 1;
        }
        session.questions_asked += 1;
        session.state = GameState::Answered;
    }

    pub async fn session(&self) -> QuizSession {
        self.session.read().await.clone()
    }

    /// Try up to MAX_ATTEMPTS random countries for a usable fact sheet,
    /// then build the question. Individual fetch failures are swallowed
    /// and count against the budget; exhausting it drops the session back
    /// to idle with a retryable error.
    async fn generate(&self) {
        let mut outcome = None;
        for attempt in 1..=MAX_ATTEMPTS {
            let Some(shape) = self.atlas.random_shape() else {
                warn!(quiz = %self.kind, "atlas is empty; cannot pick a country");
                break;
            };
            match self.provider.country_facts(&shape.name).await {
                Ok(Some(facts)) if self.kind.usable(&facts) => {
                    if let Some(question) = self.build_question(&shape.name, &facts) {
                        outcome = Some(question);
                        break;
                    }
                    debug!(
                        attempt,
                        quiz = %self.kind,
                        country = %shape.name,
                        "distractor pool cannot fill a question"
                    );
                }
                Ok(_) => debug!(
                    attempt,
                    quiz = %self.kind,
                    country = %shape.name,
                    "fact sheet unusable for this quiz"
                ),
                Err(e) => warn!(
                    attempt,
                    quiz = %self.kind,
                    country = %shape.name,
                    error = %e,
                    "fact fetch failed during question generation"
                ),
            }
        }

        let mut session = self.session.write().await;
        match outcome {
            Some(question) => {
                session.question = Some(question);
                session.state = GameState::Playing;
            }
            None => {
                session.error = Some(EXHAUSTED_MESSAGE.to_string());
                session.state = GameState::Idle;
            }
        }
    }

    fn build_question(&self, country: &str, facts: &CountryFacts) -> Option<QuizQuestion> {
        let (subject, correct_answer) = match self.kind {
            QuizKind::Capital => (country.to_string(), facts.capital.clone()),
            QuizKind::Flag => (facts.flag_emoji.clone(), country.to_string()),
        };
        let mut options = sample_distractors(&self.distractor_pool, &correct_answer)?;
        options.push(correct_answer.clone());
        shuffle_options(&mut options);
        Some(QuizQuestion {
            subject,
            options,
            correct_answer,
        })
    }
}

/// Uniformly sample DISTRACTOR_COUNT entries from `pool`, rejecting
/// case-insensitive duplicates of the correct answer or of each other.
/// Returns `None` when the pool cannot fill the count, so a too-small
/// pool resolves through the exhausted-attempts path instead of looping.
fn sample_distractors(pool: &[String], correct: &str) -> Option<Vec<String>> {
    let correct_folded = correct.to_lowercase();
    let viable: HashSet<String> = pool
        .iter()
        .map(|entry| entry.to_lowercase())
        .filter(|folded| *folded != correct_folded)
        .collect();
    if viable.len() < DISTRACTOR_COUNT {
        return None;
    }

    let mut rng = rand::rng();
    let mut seen = HashSet::from([correct_folded]);
    let mut chosen = Vec::with_capacity(DISTRACTOR_COUNT);
    while chosen.len() < DISTRACTOR_COUNT {
        let pick = &pool[rng.random_range(0..pool.len())];
        if seen.insert(pick.to_lowercase()) {
            chosen.push(pick.clone());
        }
    }
    Some(chosen)
}

/// Fisher-Yates shuffle of the option list.
fn shuffle_options(options: &mut [String]) {
    options.shuffle(&mut rand::rng());
}
