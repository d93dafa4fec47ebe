// REST API HTTP client
//
// Wraps `reqwest::Client` with base-URL joining, bearer token attachment,
// `401` eviction and error-body parsing. Endpoint groups (auth, employees,
// video recorders, issues) are implemented as inherent methods in separate
// files to keep this module focused on transport mechanics.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::session::Session;
use crate::transport::TransportConfig;

/// Error body shape. The server uses `message`; some handlers use `detail`.
#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<Value>,
    #[serde(default)]
    detail: Option<Value>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        [self.message, self.detail]
            .into_iter()
            .flatten()
            .find_map(|v| match v {
                Value::String(s) if !s.is_empty() => Some(s),
                Value::Null | Value::String(_) => None,
                other => Some(other.to_string()),
            })
    }
}

/// Async client for the issuance REST API.
///
/// Every request carries `Authorization: Bearer <token>` when the shared
/// [`Session`] holds one. A `401` evicts the session before the error is
/// returned; transport failures never touch it.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Arc<Session>,
    timeout: Duration,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from a base URL (e.g. `http://host:5000/api`).
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        session: Arc<Session>,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            session,
            timeout: transport.timeout,
        })
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        base_url: &str,
        session: Arc<Session>,
    ) -> Result<Self, Error> {
        Ok(Self {
            http,
            base_url: Self::normalize_base_url(base_url)?,
            session,
            timeout: crate::transport::DEFAULT_TIMEOUT,
        })
    }

    /// Ensure the base path ends with `/` so relative joins append.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// The API base URL (always ends with `/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The session this client authenticates with.
    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"employees/5"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    /// `GET` a path and return the parsed JSON body.
    pub async fn fetch(&self, path: &str) -> Result<Value, Error> {
        self.fetch_with_params(path, &[]).await
    }

    /// `GET` a path with query parameters.
    pub async fn fetch_with_params(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("GET {url} params={params:?}");
        let builder = self.http.get(url).query(params);
        self.send(builder).await
    }

    /// `POST` a JSON body.
    pub async fn post<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");
        let builder = self.http.post(url).json(body);
        self.send(builder).await
    }

    /// `PUT` a JSON body.
    pub async fn put<B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("PUT {url}");
        let builder = self.http.put(url).json(body);
        self.send(builder).await
    }

    /// `DELETE` a path. An empty success body yields `Value::Null`.
    pub async fn delete(&self, path: &str) -> Result<Value, Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");
        let builder = self.http.delete(url);
        self.send(builder).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<Value, Error> {
        let builder = match self.session.bearer() {
            Some(bearer) => {
                trace!("attaching bearer token");
                builder.header(reqwest::header::AUTHORIZATION, bearer)
            }
            None => builder,
        };

        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        self.handle_response(resp).await
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout: self.timeout,
            }
        } else {
            Error::Transport(err)
        }
    }

    async fn handle_response(&self, resp: reqwest::Response) -> Result<Value, Error> {
        let status = resp.status();
        if !status.is_success() {
            return Err(self.parse_error(status, resp).await);
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&raw)
            .ok()
            .and_then(ErrorBody::into_message);

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.session.evict();
            return Error::Unauthorized { message };
        }

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::with_client(reqwest::Client::new(), base, Arc::new(Session::new())).unwrap()
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let c = client("http://10.0.0.1:5000/api");
        assert_eq!(c.base_url().as_str(), "http://10.0.0.1:5000/api/");
    }

    #[test]
    fn url_joins_relative_paths() {
        let c = client("http://10.0.0.1:5000/api/");
        assert_eq!(
            c.url("/issues/active").unwrap().as_str(),
            "http://10.0.0.1:5000/api/issues/active"
        );
        assert_eq!(
            c.url("employees/5").unwrap().as_str(),
            "http://10.0.0.1:5000/api/employees/5"
        );
    }

    #[test]
    fn error_body_prefers_message_then_detail() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message": "", "detail": "Not found"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Not found"));

        let body: ErrorBody = serde_json::from_str(r#"{"message": "Busy"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Busy"));

        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.into_message().is_none());
    }
}
