use serde::{Deserialize, Serialize};

/// One row of the aggregate task-count leaderboard.
///
/// Read-only and ephemeral: rows are replaced wholesale on every successful
/// fetch and carry no identity beyond what the response provides. The
/// source data may omit any of the identifying fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardRow {
    /// User identifier, when the aggregator knows it
    #[serde(default)]
    pub uid: Option<String>,
    /// Account email, when present
    #[serde(default)]
    pub email: Option<String>,
    /// Display name, when present
    #[serde(default, rename = "displayName")]
    pub display_name: Option<String>,
    /// Number of tasks attributed to this user
    pub count: u64,
}

impl LeaderboardRow {
    /// Stable-enough key for list rendering: uid, else email, else the
    /// row's position in the response.
    pub fn key(&self, index: usize) -> String {
        self.uid
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| index.to_string())
    }

    /// Label shown for the row: display name, else email, else uid,
    /// else "Unknown".
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .or(self.uid.as_deref())
            .unwrap_or("Unknown")
    }
}

/// Wire shape of the leaderboard endpoint.
///
/// The service answers with either a bare array of rows or an object with
/// a `top` array; both normalize to the same ordered row sequence.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LeaderboardResponse {
    /// Bare `Row[]` body
    Rows(Vec<LeaderboardRow>),
    /// `{ "top": Row[] }` body; a missing `top` field means no rows
    Wrapped {
        /// The ranked rows
        #[serde(default)]
        top: Vec<LeaderboardRow>,
    },
}

impl LeaderboardResponse {
    /// Collapse both response shapes into the ordered row sequence.
    pub fn into_rows(self) -> Vec<LeaderboardRow> {
        match self {
            LeaderboardResponse::Rows(rows) => rows,
            LeaderboardResponse::Wrapped { top } => top,
        }
    }
}
