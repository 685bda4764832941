//! Remote game configuration.

use crate::client::{ApiRequest, PlayforgeClient};
use crate::errors::ApiResult;

pub(crate) const FETCH_PATH: &str = "/v1/config";

/// Game configuration endpoint.
pub struct GameConfigService<'a> {
    client: &'a PlayforgeClient,
}

impl<'a> GameConfigService<'a> {
    pub(crate) fn new(client: &'a PlayforgeClient) -> Self {
        Self { client }
    }

    /// Fetches the current remote configuration for the project.
    pub async fn fetch(&self) -> ApiResult {
        let path = self
            .client
            .config()
            .path_template("game_config.fetch", FETCH_PATH)
            .to_string();
        self.client.execute(ApiRequest::get(path)).await
    }
}
