// Issuance endpoints
//
// Issue and return are the only mutations with business meaning; the
// server validates them and owns the resulting state. History deletion is
// a record purge.

use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::client::ApiClient;
use crate::envelope::unwrap_list;
use crate::error::Error;

const LIST_KEYS: &[&str] = &["issues"];

/// Query parameters for `GET /issues/history`.
///
/// Unset fields are omitted from the query string. Dates are sent as
/// `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_recorder_id: Option<String>,
    #[serde(rename = "dateFrom", skip_serializing_if = "Option::is_none")]
    pub date_from: Option<String>,
    #[serde(rename = "dateTo", skip_serializing_if = "Option::is_none")]
    pub date_to: Option<String>,
}

impl HistoryQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        [
            ("employee_id", &self.employee_id),
            ("video_recorder_id", &self.video_recorder_id),
            ("dateFrom", &self.date_from),
            ("dateTo", &self.date_to),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.clone().map(|v| (k, v)))
        .collect()
    }
}

impl ApiClient {
    /// Hand a recorder to an employee.
    ///
    /// `POST /issues/issue {employee_id, video_recorder_id}`. Ids are sent
    /// with their original JSON type.
    pub async fn issue(&self, employee_id: &Value, recorder_id: &Value) -> Result<Value, Error> {
        debug!(%employee_id, %recorder_id, "issuing recorder");
        self.post(
            "issues/issue",
            &json!({
                "employee_id": employee_id,
                "video_recorder_id": recorder_id,
            }),
        )
        .await
    }

    /// Take a recorder back from an employee.
    ///
    /// `POST /issues/return {employee_id, video_recorder_id}`
    pub async fn return_recorder(
        &self,
        employee_id: &Value,
        recorder_id: &Value,
    ) -> Result<Value, Error> {
        debug!(%employee_id, %recorder_id, "returning recorder");
        self.post(
            "issues/return",
            &json!({
                "employee_id": employee_id,
                "video_recorder_id": recorder_id,
            }),
        )
        .await
    }

    /// Open issuance records only.
    ///
    /// `GET /issues/active -> {issues: [...]}`
    pub async fn list_active_issues(&self) -> Result<Vec<Value>, Error> {
        debug!("listing active issues");
        let body = self.fetch("issues/active").await?;
        Ok(unwrap_list(body, LIST_KEYS))
    }

    /// Full issuance history, optionally filtered server-side.
    ///
    /// `GET /issues/history?employee_id&video_recorder_id&dateFrom&dateTo`
    pub async fn list_issue_history(&self, query: &HistoryQuery) -> Result<Vec<Value>, Error> {
        debug!(?query, "listing issue history");
        let body = self
            .fetch_with_params("issues/history", &query.params())
            .await?;
        Ok(unwrap_list(body, LIST_KEYS))
    }

    /// `DELETE /issues/{id}`
    pub async fn delete_issue(&self, id: &str) -> Result<Value, Error> {
        debug!(id, "deleting issue record");
        self.delete(&format!("issues/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_params_skip_unset_fields() {
        let q = HistoryQuery {
            employee_id: Some("3".into()),
            date_to: Some("2024-01-31".into()),
            ..Default::default()
        };
        assert_eq!(
            q.params(),
            vec![
                ("employee_id", "3".to_owned()),
                ("dateTo", "2024-01-31".to_owned()),
            ]
        );
    }

    #[test]
    fn empty_history_query_has_no_params() {
        assert!(HistoryQuery::default().params().is_empty());
    }
}
