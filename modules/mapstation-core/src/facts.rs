// Country facts: trait boundary + Gemini implementation.
//
// The rest of the system calls FactProvider without knowing about Gemini
// or any specific backend. Production wires in GeminiFactProvider; tests
// use ScriptedFactProvider.

use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use gemini_client::Gemini;
use mapstation_common::CountryFacts;

/// External source of structured per-country data.
#[async_trait]
pub trait FactProvider: Send + Sync {
    /// Fact sheet for one country. Fails soft: callers must treat `Err`
    /// and `Ok(None)` identically.
    async fn country_facts(&self, name: &str) -> Result<Option<CountryFacts>>;

    /// Capital-city names for the capital quiz distractor pool.
    /// Called once at startup.
    async fn capital_list(&self) -> Result<Option<Vec<String>>>;
}

// ---------------------------------------------------------------------------
// GeminiFactProvider (production)
// ---------------------------------------------------------------------------

const FACTS_SYSTEM_PROMPT: &str =
    "You are a geography reference. Answer with accurate, current data only.";

/// Production provider backed by the Gemini structured-output API.
pub struct GeminiFactProvider {
    agent: Gemini,
}

impl GeminiFactProvider {
    pub fn new(agent: Gemini) -> Self {
        Self { agent }
    }
}

#[async_trait]
impl FactProvider for GeminiFactProvider {
    async fn country_facts(&self, name: &str) -> Result<Option<CountryFacts>> {
        debug!(country = name, "fetching country facts");
        let facts: CountryFacts = self
            .agent
            .extract(FACTS_SYSTEM_PROMPT, country_prompt(name))
            .await?;
        Ok(Some(facts))
    }

    async fn capital_list(&self) -> Result<Option<Vec<String>>> {
        #[derive(Deserialize, JsonSchema)]
        struct CapitalList {
            /// A list of world capital cities.
            capitals: Vec<String>,
        }

        let list: CapitalList = self
            .agent
            .extract(
                FACTS_SYSTEM_PROMPT,
                "Provide a JSON list of 100 diverse world capitals.",
            )
            .await?;
        Ok(Some(list.capitals))
    }
}

/// The per-country prompt. Antarctica gets a dedicated prompt because it
/// has no capital, permanent population, or national GDP: those fields
/// must come back as sentinels ("N/A", 0), not be omitted.
fn country_prompt(name: &str) -> String {
    if name.eq_ignore_ascii_case("antarctica") {
        return "Provide a summary for Antarctica. For its states, list the countries \
                with territorial claims. Since it has no official capital, permanent \
                population, or national GDP, use \"N/A\" for the capital and 0 for \
                population and GDP. For the language, list the official languages of \
                the Antarctic Treaty. Provide the flag of the Antarctic Treaty as a \
                single emoji, a short description, and an interesting fact."
            .to_string();
    }
    format!(
        "Provide a summary for {name}. Include its capital city, population, primary \
         language(s), a brief, interesting fact, a short description, its GDP in USD, \
         its flag as a single emoji, and a list of its states or major administrative \
         divisions."
    )
}

// ---------------------------------------------------------------------------
// ScriptedFactProvider (for tests)
// ---------------------------------------------------------------------------

/// One scripted outcome for a country lookup.
#[derive(Debug, Clone)]
pub enum ScriptedOutcome {
    Facts(CountryFacts),
    Missing,
    Fail(String),
}

/// Deterministic provider for tests: per-country scripted outcomes,
/// recorded calls, no network.
pub struct ScriptedFactProvider {
    outcomes: Mutex<HashMap<String, ScriptedOutcome>>,
    default_outcome: ScriptedOutcome,
    capitals: Option<Vec<String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFactProvider {
    /// Unscripted lookups resolve to `Ok(None)`.
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(HashMap::new()),
            default_outcome: ScriptedOutcome::Missing,
            capitals: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Unscripted lookups resolve to an error.
    pub fn failing() -> Self {
        Self {
            default_outcome: ScriptedOutcome::Fail("scripted failure".to_string()),
            ..Self::new()
        }
    }

    pub fn with_facts(self, name: &str, facts: CountryFacts) -> Self {
        self.outcomes
            .lock()
            .unwrap()
            .insert(name.to_string(), ScriptedOutcome::Facts(facts));
        self
    }

    pub fn with_failure(self, name: &str) -> Self {
        self.outcomes.lock().unwrap().insert(
            name.to_string(),
            ScriptedOutcome::Fail(format!("scripted failure for {name}")),
        );
        self
    }

    pub fn with_capitals(mut self, capitals: Vec<String>) -> Self {
        self.capitals = Some(capitals);
        self
    }

    /// Country names passed to `country_facts`, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl Default for ScriptedFactProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FactProvider for ScriptedFactProvider {
    async fn country_facts(&self, name: &str) -> Result<Option<CountryFacts>> {
        self.calls.lock().unwrap().push(name.to_string());
        let outcome = self
            .outcomes
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.default_outcome.clone());
        match outcome {
            ScriptedOutcome::Facts(facts) => Ok(Some(facts)),
            ScriptedOutcome::Missing => Ok(None),
            ScriptedOutcome::Fail(message) => Err(anyhow::anyhow!(message)),
        }
    }

    async fn capital_list(&self) -> Result<Option<Vec<String>>> {
        Ok(self.capitals.clone())
    }
}
