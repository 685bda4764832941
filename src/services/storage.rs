//! Key-value storage operations.

use serde_json::json;

use crate::client::{ApiRequest, PlayforgeClient};
use crate::errors::{ApiError, ApiResult, ErrorKind};
use crate::services::render_path;

pub(crate) const GET_PATH: &str = "/v1/storage/{key}";
pub(crate) const SET_PATH: &str = "/v1/storage/{key}";
pub(crate) const DELETE_PATH: &str = "/v1/storage/{key}";

/// Key-value storage endpoints.
pub struct StorageService<'a> {
    client: &'a PlayforgeClient,
}

impl<'a> StorageService<'a> {
    pub(crate) fn new(client: &'a PlayforgeClient) -> Self {
        Self { client }
    }

    /// Reads the value stored under `key`.
    pub async fn get_value(&self, key: &str) -> ApiResult {
        let path = self.path("storage.get", GET_PATH, key)?;
        self.client.execute(ApiRequest::get(path)).await
    }

    /// Writes `value` under `key`.
    pub async fn set_value(&self, key: &str, value: serde_json::Value) -> ApiResult {
        let path = self.path("storage.set", SET_PATH, key)?;
        self.client
            .execute(ApiRequest::put(path).with_body(json!({ "value": value })))
            .await
    }

    /// Deletes the value stored under `key`.
    pub async fn delete_value(&self, key: &str) -> ApiResult {
        let path = self.path("storage.delete", DELETE_PATH, key)?;
        self.client.execute(ApiRequest::delete(path)).await
    }

    fn path(&self, endpoint: &str, default: &str, key: &str) -> Result<String, ApiError> {
        if key.is_empty() {
            return Err(ApiError::new(
                ErrorKind::ValidationError,
                "storage key must not be empty",
            ));
        }
        let template = self.client.config().path_template(endpoint, default);
        Ok(render_path(template, &[("key", key)]))
    }
}
