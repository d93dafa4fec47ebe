// Employee endpoints

use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::envelope::{unwrap_list, unwrap_single};
use crate::error::Error;

const LIST_KEYS: &[&str] = &["employees"];
const SINGLE_KEYS: &[&str] = &["employee"];

impl ApiClient {
    /// `GET /employees -> {employees: [...]}`
    pub async fn list_employees(&self) -> Result<Vec<Value>, Error> {
        debug!("listing employees");
        let body = self.fetch("employees").await?;
        Ok(unwrap_list(body, LIST_KEYS))
    }

    /// `GET /employees/{id}`
    pub async fn get_employee(&self, id: &str) -> Result<Value, Error> {
        let body = self.fetch(&format!("employees/{id}")).await?;
        Ok(unwrap_single(body, SINGLE_KEYS))
    }

    /// `POST /employees`
    pub async fn create_employee(&self, payload: &Value) -> Result<Value, Error> {
        debug!("creating employee");
        let body = self.post("employees", payload).await?;
        Ok(unwrap_single(body, SINGLE_KEYS))
    }

    /// `PUT /employees/{id}`
    pub async fn update_employee(&self, id: &str, payload: &Value) -> Result<Value, Error> {
        debug!(id, "updating employee");
        let body = self.put(&format!("employees/{id}"), payload).await?;
        Ok(unwrap_single(body, SINGLE_KEYS))
    }

    /// `DELETE /employees/{id}`
    pub async fn delete_employee(&self, id: &str) -> Result<Value, Error> {
        debug!(id, "deleting employee");
        self.delete(&format!("employees/{id}")).await
    }
}
