//! Search history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One past search of the signed-in user.
///
/// The server may key entries by integer or UUID; either is kept as text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Server identifier, if sent.
    #[serde(default, deserialize_with = "id_as_text")]
    pub id: Option<String>,
    /// The text that was searched.
    pub query: String,
    /// Snapshot of the filters used, as sent when recording.
    #[serde(default)]
    pub filters: Value,
    /// When the search ran.
    #[serde(alias = "created_at")]
    pub timestamp: DateTime<Utc>,
    /// How many results the search produced.
    #[serde(default, alias = "results_count")]
    pub result_count: u64,
}

fn id_as_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

/// Body of the history endpoint: a bare list or a wrapped one.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum HistoryBody {
    List(Vec<HistoryEntry>),
    Wrapped {
        #[serde(alias = "results")]
        history: Vec<HistoryEntry>,
    },
}

impl HistoryBody {
    /// Returns the entries newest first.
    pub(crate) fn into_newest_first(self) -> Vec<HistoryEntry> {
        let mut entries = match self {
            Self::List(entries) | Self::Wrapped { history: entries } => entries,
        };
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }
}
