//! Search domain models.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumIter, EnumString};

use crate::listing::Listing;

/// Backend strategy used to answer a search.
///
/// Modes are mutually exclusive and only select the backend variant; the
/// request/response contract is the same for all of them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum SearchMode {
    /// Natural language translated to SQL by the database.
    #[default]
    #[serde(rename = "nl2sql")]
    #[strum(serialize = "nl2sql")]
    Nl2Sql,
    /// Text-embedding similarity over descriptions.
    #[serde(rename = "semantic")]
    #[strum(serialize = "semantic")]
    Semantic,
    /// Multimodal-embedding similarity over listing images.
    #[serde(rename = "visual")]
    #[strum(serialize = "visual")]
    Visual,
    /// Fully managed search service.
    #[serde(rename = "vertex_search")]
    #[strum(serialize = "vertex_search")]
    VertexSearch,
}

impl SearchMode {
    /// Short label for mode toggles.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Nl2Sql => "AlloyDB NL",
            Self::Semantic => "Semantic",
            Self::Visual => "Visual",
            Self::VertexSearch => "Vertex AI Search",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Nl2Sql => "Builder Mode: AlloyDB generates precise SQL queries for filters.",
            Self::Semantic => "Builder Mode: Search by meaning/vibe in descriptions.",
            Self::Visual => "Builder Mode: Search by visual aesthetics (pixels).",
            Self::VertexSearch => {
                "Managed Mode: Fully managed 'Black Box' search service (Agent Builder)."
            }
        }
    }
}

/// Explanatory artifacts returned alongside search results.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Query text generated by the backend (usually SQL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub natural_language_answer: Option<String>,
    /// Raw preview of the rows the backend produced, as sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_preview: Option<Value>,
}

const GENERATED_QUERY_KEYS: &[&str] = &["sql", "generated_sql", "generated_query", "query"];
const EXPLANATION_KEYS: &[&str] = &["explanation", "query_explanation", "sql_explanation"];
const ANSWER_KEYS: &[&str] = &["nl_answer", "natural_language_answer", "answer"];
const PREVIEW_KEYS: &[&str] = &["result_preview", "results", "rows"];

impl Diagnostics {
    /// Extracts diagnostics from a free-form details object.
    ///
    /// The search endpoint's `details` and the chat endpoint's `tool_details`
    /// do not share a schema, so several key spellings are accepted. Unknown
    /// keys are ignored and a non-object value yields empty diagnostics.
    pub fn from_details(details: &Value) -> Self {
        let Some(map) = details.as_object() else {
            return Self::default();
        };
        let text = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
        };
        Self {
            generated_query: text(GENERATED_QUERY_KEYS),
            explanation: text(EXPLANATION_KEYS),
            natural_language_answer: text(ANSWER_KEYS),
            result_preview: PREVIEW_KEYS
                .iter()
                .find_map(|k| map.get(*k))
                .filter(|v| !v.is_null())
                .cloned(),
        }
    }

    /// Fills fields that are still empty from `other`.
    pub fn merge_missing(mut self, other: Diagnostics) -> Self {
        self.generated_query = self.generated_query.or(other.generated_query);
        self.explanation = self.explanation.or(other.explanation);
        self.natural_language_answer = self
            .natural_language_answer
            .or(other.natural_language_answer);
        self.result_preview = self.result_preview.or(other.result_preview);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.generated_query.is_none()
            && self.explanation.is_none()
            && self.natural_language_answer.is_none()
            && self.result_preview.is_none()
    }
}

/// Outcome of one search call.
///
/// Zero listings together with a generated query is a valid "no matches"
/// answer, not a failure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub listings: Vec<Listing>,
    pub diagnostics: Diagnostics,
    /// Cities the backend knows about, offered when nothing matched.
    #[serde(default)]
    pub available_cities: Vec<String>,
    /// Raw `details` object, kept for shells that render it verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}
