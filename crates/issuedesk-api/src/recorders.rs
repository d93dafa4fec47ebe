// Video recorder endpoints

use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::envelope::{unwrap_list, unwrap_single};
use crate::error::Error;

const LIST_KEYS: &[&str] = &["video_recorders", "videoRecorders"];
const SINGLE_KEYS: &[&str] = &["video_recorder", "videoRecorder"];

impl ApiClient {
    /// `GET /video-recorders -> {video_recorders: [...]}`
    pub async fn list_recorders(&self) -> Result<Vec<Value>, Error> {
        debug!("listing video recorders");
        let body = self.fetch("video-recorders").await?;
        Ok(unwrap_list(body, LIST_KEYS))
    }

    /// `GET /video-recorders/{id}`
    pub async fn get_recorder(&self, id: &str) -> Result<Value, Error> {
        let body = self.fetch(&format!("video-recorders/{id}")).await?;
        Ok(unwrap_single(body, SINGLE_KEYS))
    }

    /// `POST /video-recorders`
    pub async fn create_recorder(&self, payload: &Value) -> Result<Value, Error> {
        debug!("creating video recorder");
        let body = self.post("video-recorders", payload).await?;
        Ok(unwrap_single(body, SINGLE_KEYS))
    }

    /// `PUT /video-recorders/{id}`
    pub async fn update_recorder(&self, id: &str, payload: &Value) -> Result<Value, Error> {
        debug!(id, "updating video recorder");
        let body = self.put(&format!("video-recorders/{id}"), payload).await?;
        Ok(unwrap_single(body, SINGLE_KEYS))
    }

    /// `DELETE /video-recorders/{id}`
    pub async fn delete_recorder(&self, id: &str) -> Result<Value, Error> {
        debug!(id, "deleting video recorder");
        self.delete(&format!("video-recorders/{id}")).await
    }
}
