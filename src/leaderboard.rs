//! Leaderboard viewer: one idempotent read of the aggregate task counts.
//!
//! Fetch failures are absorbed into viewer state rather than surfaced as
//! errors: the previously loaded rows stay visible under a persistent
//! banner with a fixed retry instruction, and the user retries explicitly.

use crate::error::{Result, TaskLinkError};
use crate::models::{LeaderboardResponse, LeaderboardRow};

/// Fixed leaderboard endpoint; override with
/// [`leaderboard_url`](crate::TaskLinkClientBuilder::leaderboard_url) on
/// the client builder.
pub const DEFAULT_LEADERBOARD_URL: &str =
    "https://todolist-backend-oakw.onrender.com/leaderboard";

/// Banner text shown when a fetch fails.
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load leaderboard. Pull to refresh to retry.";

/// Fetches and holds the aggregate per-user task counts.
///
/// Rows are replaced wholesale on every successful fetch. There is no
/// request sequencing or cancellation; refreshes are serialized by the
/// `&mut self` receiver, and the last completed fetch wins.
pub struct LeaderboardViewer {
    http_client: reqwest::Client,
    url: String,
    rows: Vec<LeaderboardRow>,
    error: Option<String>,
    loading: bool,
}

impl LeaderboardViewer {
    /// Create a viewer over an existing HTTP client.
    pub fn new(http_client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http_client,
            url: url.into(),
            rows: Vec::new(),
            error: None,
            loading: false,
        }
    }

    /// Create a standalone viewer for the given endpoint.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self::new(reqwest::Client::new(), url)
    }

    /// Issue one GET and fold the outcome into the viewer state.
    ///
    /// Called on activation and on explicit user-triggered refresh. Never
    /// returns an error: failures become the error banner.
    pub async fn refresh(&mut self) {
        self.loading = true;
        let outcome = self.fetch_rows().await;
        self.ingest(outcome);
        self.loading = false;
    }

    async fn fetch_rows(&self) -> Result<Vec<LeaderboardRow>> {
        log::debug!("[LEADERBOARD] Fetching from url={}", self.url);
        let response = self.http_client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TaskLinkError::Server {
                status_code: status.as_u16(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let parsed: LeaderboardResponse = response.json().await?;
        Ok(parsed.into_rows())
    }

    /// Fold a fetch outcome into the viewer state.
    ///
    /// Success replaces the rows and clears the banner; failure keeps the
    /// previously loaded rows visible and sets the banner.
    fn ingest(&mut self, outcome: Result<Vec<LeaderboardRow>>) {
        match outcome {
            Ok(rows) => {
                log::debug!("[LEADERBOARD] Loaded {} rows", rows.len());
                self.rows = rows;
                self.error = None;
            }
            Err(e) => {
                log::warn!("[LEADERBOARD] Fetch failed: {}", e);
                self.error = Some(LOAD_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// The currently displayed rows, in response order.
    pub fn rows(&self) -> &[LeaderboardRow] {
        &self.rows
    }

    /// Rows paired with their 1-based rank.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &LeaderboardRow)> {
        self.rows.iter().enumerate().map(|(i, row)| (i + 1, row))
    }

    /// The error banner, when the last fetch failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// True while a refresh is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }
}
