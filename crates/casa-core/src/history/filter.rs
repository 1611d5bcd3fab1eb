//! History filter rows and predicate assembly.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// Column of the prompt history table a filter applies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum HistoryColumn {
    #[default]
    UserPrompt,
    QueryTemplateUsed,
    QueryTemplateId,
    QueryExplanation,
    /// Any other column name, passed through as typed.
    Other(String),
}

impl HistoryColumn {
    pub const KNOWN: [HistoryColumn; 4] = [
        HistoryColumn::UserPrompt,
        HistoryColumn::QueryTemplateUsed,
        HistoryColumn::QueryTemplateId,
        HistoryColumn::QueryExplanation,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            Self::UserPrompt => "user_prompt",
            Self::QueryTemplateUsed => "query_template_used",
            Self::QueryTemplateId => "query_template_id",
            Self::QueryExplanation => "query_explanation",
            Self::Other(name) => name,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::UserPrompt => "User Prompt",
            Self::QueryTemplateUsed => "Template Used",
            Self::QueryTemplateId => "Template ID",
            Self::QueryExplanation => "Explanation",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for HistoryColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryColumn {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::KNOWN
            .into_iter()
            .find(|c| c.as_str() == s)
            .unwrap_or_else(|| Self::Other(s.to_string())))
    }
}

impl Serialize for HistoryColumn {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HistoryColumn {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(name.parse().unwrap_or_default())
    }
}

/// Comparison applied between a column and the filter value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    /// Case-insensitive substring match.
    #[default]
    Contains,
}

impl FilterOperator {
    /// SQL spelling of the operator.
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::Contains => "ILIKE",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "is not",
            Self::Contains => "contains",
        }
    }
}

/// Boolean connective placed before a filter that has a predecessor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum JoinOperator {
    #[default]
    And,
    Or,
}

/// One user-entered filter row.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HistoryFilter {
    pub column: HistoryColumn,
    pub operator: FilterOperator,
    pub value: String,
    /// Ignored for the first filter that contributes to the predicate.
    #[serde(default)]
    pub join: JoinOperator,
}

impl HistoryFilter {
    pub fn new(column: HistoryColumn, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            column,
            operator,
            value: value.into(),
            join: JoinOperator::And,
        }
    }

    pub fn joined_with(mut self, join: JoinOperator) -> Self {
        self.join = join;
        self
    }

    pub fn has_value(&self) -> bool {
        !self.value.trim().is_empty()
    }

    /// Quoted SQL literal for the value; `contains` adds `%` wildcards.
    fn literal(&self) -> String {
        let escaped = self.value.replace('\'', "''");
        match self.operator {
            FilterOperator::Contains => format!("'%{escaped}%'"),
            FilterOperator::Equals | FilterOperator::NotEquals => format!("'{escaped}'"),
        }
    }
}

/// Assembles the predicate fragment sent to the history endpoint.
///
/// Filters with a blank value are dropped together with their join keyword.
/// Values are wrapped in single quotes, and a single quote inside a value is
/// doubled (`d'Annecy` becomes `'d''Annecy'`) so the literal stays closed.
/// Nothing else is validated.
///
/// Conditions are concatenated without parentheses, so `AND`/`OR` are
/// evaluated with the backend's usual precedence rather than grouped as
/// entered. An empty string means "no filter".
pub fn assemble_predicate(filters: &[HistoryFilter]) -> String {
    filters
        .iter()
        .filter(|f| f.has_value())
        .enumerate()
        .map(|(i, f)| {
            let condition = format!("{} {} {}", f.column, f.operator.sql(), f.literal());
            if i == 0 {
                condition
            } else {
                format!(" {} {}", f.join, condition)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str) -> HistoryColumn {
        name.parse().unwrap()
    }

    #[test]
    fn test_empty_valued_filter_is_dropped_with_its_join() {
        let filters = vec![
            HistoryFilter::new(column("city"), FilterOperator::Equals, "Geneva"),
            HistoryFilter::new(column("price"), FilterOperator::Contains, "")
                .joined_with(JoinOperator::And),
        ];
        assert_eq!(assemble_predicate(&filters), "city = 'Geneva'");
    }

    #[test]
    fn test_first_contributing_filter_has_no_join() {
        let filters = vec![
            HistoryFilter::new(HistoryColumn::UserPrompt, FilterOperator::Contains, "   "),
            HistoryFilter::new(HistoryColumn::QueryExplanation, FilterOperator::Contains, "price")
                .joined_with(JoinOperator::Or),
        ];
        assert_eq!(assemble_predicate(&filters), "query_explanation ILIKE '%price%'");
    }

    #[test]
    fn test_joins_are_concatenated_left_to_right() {
        let filters = vec![
            HistoryFilter::new(HistoryColumn::UserPrompt, FilterOperator::Contains, "studio"),
            HistoryFilter::new(HistoryColumn::QueryTemplateId, FilterOperator::NotEquals, "3")
                .joined_with(JoinOperator::Or),
            HistoryFilter::new(HistoryColumn::QueryTemplateUsed, FilterOperator::Equals, "true")
                .joined_with(JoinOperator::And),
        ];
        assert_eq!(
            assemble_predicate(&filters),
            "user_prompt ILIKE '%studio%' OR query_template_id != '3' AND query_template_used = 'true'"
        );
    }

    #[test]
    fn test_no_values_yields_empty_predicate() {
        assert_eq!(assemble_predicate(&[]), "");
        assert_eq!(assemble_predicate(&[HistoryFilter::default()]), "");
    }

    #[test]
    fn test_single_quotes_are_doubled() {
        let filters = vec![HistoryFilter::new(
            HistoryColumn::UserPrompt,
            FilterOperator::Equals,
            "Lac d'Annecy",
        )];
        assert_eq!(assemble_predicate(&filters), "user_prompt = 'Lac d''Annecy'");
    }

    #[test]
    fn test_parse_names() {
        assert_eq!(column("query_template_id"), HistoryColumn::QueryTemplateId);
        assert_eq!(column("city"), HistoryColumn::Other("city".into()));
        assert_eq!("not_equals".parse::<FilterOperator>().unwrap(), FilterOperator::NotEquals);
        assert_eq!("or".parse::<JoinOperator>().unwrap(), JoinOperator::Or);
        assert_eq!(JoinOperator::And.to_string(), "AND");
    }
}
