use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Sentinel capital for territories that have none (e.g. Antarctica).
/// Inapplicable fields carry sentinels, never omissions.
pub const NO_CAPITAL: &str = "N/A";

// --- Country facts ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StateInfo {
    /// The name of the state or administrative division.
    pub name: String,
}

/// Structured fact sheet for one country, as returned by the fact provider.
///
/// The same type doubles as the schema contract sent to the AI service and
/// as the JSON payload served to the info panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountryFacts {
    /// The capital city of the country.
    pub capital: String,
    /// The estimated total population of the country.
    pub population: u64,
    /// The primary official or most widely spoken language(s).
    pub language: String,
    /// A brief, interesting, and unique fact about the country.
    pub fact: String,
    /// A short, one-paragraph overview of the country.
    pub description: String,
    /// The Gross Domestic Product (GDP) of the country in USD.
    pub gdp: f64,
    /// A single emoji character representing the country's flag.
    pub flag_emoji: String,
    /// The country's states, provinces, or major administrative divisions.
    /// Empty when the country has none.
    pub states: Vec<StateInfo>,
}

impl CountryFacts {
    /// True when the fact sheet names a real capital rather than the sentinel.
    pub fn has_usable_capital(&self) -> bool {
        !self.capital.is_empty() && self.capital != NO_CAPITAL
    }

    /// True when the fact sheet carries a flag glyph.
    pub fn has_flag(&self) -> bool {
        !self.flag_emoji.is_empty()
    }
}

// --- Map geometry ---

/// One country boundary record from the atlas topology.
///
/// `boundary` is the raw per-country TopoJSON geometry, passed through to
/// the renderer untouched. Loaded once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryShape {
    pub id: String,
    pub name: String,
    pub boundary: serde_json::Value,
}

// --- Selection ---

/// The currently selected country. At most one active at a time;
/// replaced wholesale on each new click, never partially updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub name: String,
    pub id: String,
}

// --- Views ---

/// The three mutually exclusive right-hand panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActiveView {
    Info,
    CapitalQuiz,
    FlagQuiz,
}

impl std::fmt::Display for ActiveView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActiveView::Info => write!(f, "info"),
            ActiveView::CapitalQuiz => write!(f, "capitalQuiz"),
            ActiveView::FlagQuiz => write!(f, "flagQuiz"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn antarctica() -> CountryFacts {
        CountryFacts {
            capital: NO_CAPITAL.to_string(),
            population: 0,
            language: "English, French, Russian, Spanish".to_string(),
            fact: "Antarctica has no permanent residents.".to_string(),
            description: "The southernmost continent, governed by treaty.".to_string(),
            gdp: 0.0,
            flag_emoji: "🏳️".to_string(),
            states: vec![StateInfo {
                name: "Australian Antarctic Territory".to_string(),
            }],
        }
    }

    #[test]
    fn sentinel_capital_is_not_usable() {
        let facts = antarctica();
        assert!(!facts.has_usable_capital());
        assert!(facts.has_flag());
    }

    #[test]
    fn empty_capital_is_not_usable() {
        let facts = CountryFacts {
            capital: String::new(),
            ..antarctica()
        };
        assert!(!facts.has_usable_capital());
    }

    #[test]
    fn sentinels_serialize_literally() {
        let value = serde_json::to_value(antarctica()).unwrap();
        assert_eq!(value["capital"], json!("N/A"));
        assert_eq!(value["population"], json!(0));
        assert_eq!(value["gdp"], json!(0.0));
    }

    #[test]
    fn facts_use_camel_case_on_the_wire() {
        let parsed: CountryFacts = serde_json::from_value(json!({
            "capital": "Paris",
            "population": 68_000_000u64,
            "language": "French",
            "fact": "France spans twelve time zones.",
            "description": "A western European republic.",
            "gdp": 3.1e12,
            "flagEmoji": "🇫🇷",
            "states": [{"name": "Île-de-France"}]
        }))
        .unwrap();
        assert_eq!(parsed.flag_emoji, "🇫🇷");
        assert!(parsed.has_usable_capital());
    }

    #[test]
    fn active_view_round_trips_camel_case() {
        assert_eq!(
            serde_json::to_value(ActiveView::CapitalQuiz).unwrap(),
            json!("capitalQuiz")
        );
        let view: ActiveView = serde_json::from_value(json!("flagQuiz")).unwrap();
        assert_eq!(view, ActiveView::FlagQuiz);
    }
}
