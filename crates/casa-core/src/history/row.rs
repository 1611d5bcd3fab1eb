//! History records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Maximum number of rows the backend returns for one history query.
pub const HISTORY_ROW_LIMIT: usize = 1000;

/// One logged prompt together with how the backend answered it.
///
/// Columns other than the four well-known ones are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryRow {
    #[serde(default)]
    pub user_prompt: Option<String>,
    #[serde(default)]
    pub query_template_used: Option<bool>,
    #[serde(default)]
    pub query_template_id: Option<Value>,
    #[serde(default)]
    pub query_explanation: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HistoryRow {
    /// `true`, `false`, or `-` when the backend did not record it.
    pub fn template_used_label(&self) -> &'static str {
        match self.query_template_used {
            Some(true) => "true",
            Some(false) => "false",
            None => "-",
        }
    }

    pub fn template_id_label(&self) -> String {
        match &self.query_template_id {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_keeps_unknown_columns() {
        let row: HistoryRow = serde_json::from_str(
            r#"{"user_prompt": "cheap studio", "query_template_used": true,
                "query_template_id": 12, "query_explanation": "price filter",
                "created_at": "2024-05-01"}"#,
        )
        .unwrap();
        assert_eq!(row.user_prompt.as_deref(), Some("cheap studio"));
        assert_eq!(row.template_used_label(), "true");
        assert_eq!(row.template_id_label(), "12");
        assert_eq!(row.extra.get("created_at"), Some(&Value::from("2024-05-01")));
    }

    #[test]
    fn test_row_labels_for_missing_values() {
        let row = HistoryRow::default();
        assert_eq!(row.template_used_label(), "-");
        assert_eq!(row.template_id_label(), "");
    }
}
