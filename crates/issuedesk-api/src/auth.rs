// Authentication endpoints
//
// `POST /auth/login` issues a bearer token that begins the shared session;
// `GET /auth/me` reports who the token belongs to.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;

impl ApiClient {
    /// Log in with username/password and begin the session.
    ///
    /// `POST /auth/login {username, password} -> {access_token}`
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<(), Error> {
        debug!(username, "logging in");
        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let resp = self.post("auth/login", &body).await?;
        let token = resp
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::UnexpectedShape("login response has no access_token".into()))?;

        self.session().begin(SecretString::from(token.to_owned()));
        debug!("login successful");
        Ok(())
    }

    /// Fetch the authenticated user and cache it on the session.
    ///
    /// `GET /auth/me -> user`
    pub async fn me(&self) -> Result<Value, Error> {
        if !self.session().is_active() {
            return Err(Error::NoSession);
        }
        let user = self.fetch("auth/me").await?;
        self.session().set_user(user.clone());
        Ok(user)
    }

    /// Register a new operator account.
    ///
    /// `POST /auth/register` with a snake_case payload.
    pub async fn register(&self, payload: &Value) -> Result<Value, Error> {
        debug!("registering user");
        self.post("auth/register", payload).await
    }

    /// End the session locally. The server keeps no logout endpoint.
    pub fn logout(&self) {
        debug!("logging out");
        self.session().end();
    }
}
