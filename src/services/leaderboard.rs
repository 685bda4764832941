//! Leaderboard operations.

use serde_json::json;

use crate::client::{ApiRequest, PlayforgeClient};
use crate::errors::{ApiError, ApiResult, ErrorKind};
use crate::services::render_path;

pub(crate) const ENTRIES_PATH: &str = "/v1/leaderboards/{board_id}/entries";
pub(crate) const SUBMIT_PATH: &str = "/v1/leaderboards/{board_id}/scores";

/// Leaderboard endpoints.
pub struct LeaderboardService<'a> {
    client: &'a PlayforgeClient,
}

impl<'a> LeaderboardService<'a> {
    pub(crate) fn new(client: &'a PlayforgeClient) -> Self {
        Self { client }
    }

    /// Fetches a page of entries for a board.
    pub async fn entries(&self, board_id: &str, limit: u32, offset: u32) -> ApiResult {
        let template = self
            .client
            .config()
            .path_template("leaderboard.entries", ENTRIES_PATH);
        let path = format!(
            "{}?limit={limit}&offset={offset}",
            self.rendered(template, board_id)?
        );
        self.client.execute(ApiRequest::get(path)).await
    }

    /// Submits a score to a board.
    pub async fn submit_score(&self, board_id: &str, score: i64) -> ApiResult {
        let template = self
            .client
            .config()
            .path_template("leaderboard.submit", SUBMIT_PATH);
        let path = self.rendered(template, board_id)?;
        self.client
            .execute(ApiRequest::post(path).with_body(json!({"score": score})))
            .await
    }

    fn rendered(&self, template: &str, board_id: &str) -> Result<String, ApiError> {
        if board_id.is_empty() {
            return Err(ApiError::new(
                ErrorKind::ValidationError,
                "board_id must not be empty",
            ));
        }
        Ok(render_path(template, &[("board_id", board_id)]))
    }
}
