// ── Controller abstraction ──
//
// Session lifecycle, snapshot refresh, and command routing for one
// issuance server. Mutations are gated against the latest snapshot,
// sent, and followed by a full refresh; nothing is patched locally.

use std::sync::Arc;

use chrono::Utc;
use secrecy::SecretString;
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use issuedesk_api::{ApiClient, Session, TlsMode, TransportConfig};

use crate::command::{Command, CommandResult, DeleteOutcome, RegisterRequest};
use crate::config::{ControllerConfig, TlsVerification};
use crate::convert::Normalizer;
use crate::error::CoreError;
use crate::gate::{self, HistoryFilter, InvariantViolation};
use crate::model::{Device, Employee, EntityId, IssuanceRecord, User};
use crate::store::{DataStore, Snapshot};

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Operations are expected
/// to be serialized by the caller; the controller itself holds no lock
/// across a request.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    client: ApiClient,
    normalizer: Normalizer,
    store: DataStore,
}

fn tls_mode(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

fn to_payload<T: serde::Serialize>(request: &T) -> Result<Value, CoreError> {
    serde_json::to_value(request)
        .map_err(|e| CoreError::Internal(format!("failed to encode request: {e}")))
}

impl Controller {
    /// Create a controller. Does not talk to the server; call
    /// [`connect()`](Self::connect) or [`login()`](Self::login).
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig::default()
            .with_timeout(config.timeout)
            .with_tls(tls_mode(&config.tls));

        let session = Arc::new(match config.auth.token() {
            Some(token) => Session::with_token(token.clone()),
            None => Session::new(),
        });

        let client = ApiClient::new(config.url.as_str(), &transport, session)?;
        let normalizer = Normalizer::new(client.base_url().clone());

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                normalizer,
                store: DataStore::new(),
            }),
        })
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.inner.normalizer
    }

    // ── Session lifecycle ────────────────────────────────────────

    /// Establish a session from the configured credentials.
    ///
    /// A stored token is validated first. If the server rejects it the
    /// token is discarded and configured credentials (if any) are used to
    /// log in again. If the server cannot be reached, the token is kept
    /// and the network error is returned.
    pub async fn connect(&self) -> Result<User, CoreError> {
        let mut rejected = None;

        if self.session().is_active() {
            match self.fetch_current_user().await {
                Ok(user) => {
                    debug!(user = %user.display_name(), "stored session accepted");
                    return Ok(user);
                }
                Err(e) if e.requires_login() => {
                    warn!(error = %e, "stored session rejected by server");
                    rejected = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        match self.inner.config.auth.login() {
            Some((username, password)) => self.login(username, password).await,
            None => Err(rejected.unwrap_or(CoreError::NotLoggedIn)),
        }
    }

    /// Log in and fetch the authenticated user.
    pub async fn login(&self, username: &str, password: &SecretString) -> Result<User, CoreError> {
        self.inner
            .client
            .login(username, password)
            .await
            .map_err(|e| match e {
                issuedesk_api::Error::Unauthorized { message } => CoreError::AuthenticationFailed {
                    message: message.unwrap_or_else(|| "invalid username or password".into()),
                },
                other => other.into(),
            })?;
        let user = self.fetch_current_user().await?;
        info!(user = %user.display_name(), "logged in");
        Ok(user)
    }

    /// Resume a previously issued token and check it with the server.
    ///
    /// A rejected token is evicted; a network failure leaves it in place.
    pub async fn resume(&self, token: SecretString) -> Result<User, CoreError> {
        self.session().begin(token);
        self.fetch_current_user().await
    }

    /// End the session and forget the cached snapshot.
    pub fn logout(&self) {
        self.inner.client.logout();
        self.inner.store.invalidate();
        info!("logged out");
    }

    /// The user cached by the last successful `auth/me`.
    pub fn current_user(&self) -> Option<User> {
        self.session()
            .user()
            .and_then(|raw| self.inner.normalizer.user(&raw))
    }

    /// Ask the server who the session belongs to.
    pub async fn fetch_current_user(&self) -> Result<User, CoreError> {
        let raw = self.inner.client.me().await?;
        self.inner
            .normalizer
            .user(&raw)
            .ok_or_else(|| CoreError::Internal("auth/me returned a user without an id".into()))
    }

    pub fn session(&self) -> &Arc<Session> {
        self.inner.client.session()
    }

    /// Register a new operator account.
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), CoreError> {
        request.validate()?;
        self.inner.client.register(&to_payload(request)?).await?;
        info!(username = %request.username, "account registered");
        Ok(())
    }

    // ── Snapshot ─────────────────────────────────────────────────

    /// Fetch employees, recorders and open records together and publish
    /// a new snapshot.
    ///
    /// On failure the cached snapshot is dropped so no later gate check
    /// runs against state older than the last mutation.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        let client = &self.inner.client;
        let fetched = tokio::try_join!(
            client.list_employees(),
            client.list_recorders(),
            client.list_active_issues(),
        );
        let (employees, recorders, active) = match fetched {
            Ok(lists) => lists,
            Err(e) => {
                self.inner.store.invalidate();
                return Err(e.into());
            }
        };

        let n = &self.inner.normalizer;
        let employees_norm = n.employees(&employees);
        let devices_norm = n.devices(&recorders);
        let active_norm = n.issuances(&active);

        let skipped = (employees.len() - employees_norm.len())
            + (recorders.len() - devices_norm.len())
            + (active.len() - active_norm.len());
        if skipped > 0 {
            debug!(skipped, "dropped records without an id");
        }

        let snapshot = Snapshot::new(employees_norm, devices_norm, active_norm, Utc::now());

        for violation in gate::audit(&snapshot) {
            warn!(%violation, "server state violates issuance invariant");
        }

        debug!(
            employees = snapshot.employees.len(),
            recorders = snapshot.devices.len(),
            open = snapshot.open_records.len(),
            "snapshot refreshed"
        );
        Ok(self.inner.store.replace(snapshot))
    }

    /// The cached snapshot, fetching one if there is none.
    pub async fn snapshot(&self) -> Result<Arc<Snapshot>, CoreError> {
        match self.inner.store.current() {
            Some(snapshot) => Ok(snapshot),
            None => self.refresh().await,
        }
    }

    pub fn cached_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.inner.store.current()
    }

    /// Subscribe to snapshot replacements. `None` means invalidated.
    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<Snapshot>>> {
        self.inner.store.subscribe()
    }

    /// Check the current snapshot against the issuance invariants.
    pub async fn audit(&self) -> Result<Vec<InvariantViolation>, CoreError> {
        Ok(gate::audit(&*self.snapshot().await?))
    }

    // ── Reads ────────────────────────────────────────────────────

    pub async fn get_employee(&self, id: &EntityId) -> Result<Employee, CoreError> {
        let key = id.to_string();
        let raw = self
            .inner
            .client
            .get_employee(&key)
            .await
            .map_err(|e| CoreError::from(e).or_not_found("Employee", &key))?;
        self.inner
            .normalizer
            .employee(&raw)
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "Employee".into(),
                identifier: key,
            })
    }

    pub async fn get_recorder(&self, id: &EntityId) -> Result<Device, CoreError> {
        let key = id.to_string();
        let raw = self
            .inner
            .client
            .get_recorder(&key)
            .await
            .map_err(|e| CoreError::from(e).or_not_found("Recorder", &key))?;
        self.inner
            .normalizer
            .device(&raw)
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "Recorder".into(),
                identifier: key,
            })
    }

    /// Issuance history, filtered by the server and then locally.
    ///
    /// The local pass enforces the inclusive date range on calendar dates
    /// and keeps the server's ordering.
    pub async fn history(&self, filter: &HistoryFilter) -> Result<Vec<IssuanceRecord>, CoreError> {
        let raw = self
            .inner
            .client
            .list_issue_history(&filter.to_query())
            .await?;
        let records = self.inner.normalizer.issuances(&raw);
        for violation in gate::audit_records(&records) {
            warn!(%violation, "history record violates issuance invariant");
        }
        Ok(gate::partition_history(&records, filter))
    }

    // ── Command execution ────────────────────────────────────────

    /// Execute a mutating command.
    ///
    /// Gate and validation failures return before anything is sent. Once
    /// a request has reached the server (accepted or rejected) the
    /// snapshot is refreshed; a failed refresh leaves no snapshot cached.
    /// A timeout or dropped connection may still have been applied
    /// server-side, so it also drops the cached snapshot.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let name = cmd.name();
        debug!(command = name, "executing command");

        let result = self.apply(cmd).await;

        let reached_server = match &result {
            Ok(_) => true,
            Err(e) => matches!(e, CoreError::Rejected { .. } | CoreError::NotFound { .. }),
        };
        if reached_server {
            if let Err(e) = self.refresh().await {
                warn!(command = name, error = %e, "refresh after command failed");
            }
        } else if let Err(e) = &result {
            if e.is_network() {
                warn!(command = name, error = %e, "command outcome unknown, dropping snapshot");
                self.inner.store.invalidate();
            } else if e.requires_login() {
                self.inner.store.invalidate();
            }
        }
        result
    }

    /// Issue a recorder and return the snapshot fetched afterwards.
    pub async fn issue(
        &self,
        employee_id: EntityId,
        device_id: EntityId,
    ) -> Result<Arc<Snapshot>, CoreError> {
        self.execute(Command::Issue {
            employee_id,
            device_id,
        })
        .await?;
        self.snapshot().await
    }

    /// Return a recorder and return the snapshot fetched afterwards.
    pub async fn return_device(
        &self,
        employee_id: EntityId,
        device_id: EntityId,
    ) -> Result<Arc<Snapshot>, CoreError> {
        self.execute(Command::Return {
            employee_id,
            device_id,
        })
        .await?;
        self.snapshot().await
    }

    pub async fn delete_issue(&self, id: EntityId) -> Result<(), CoreError> {
        self.execute(Command::DeleteIssue { id }).await?;
        Ok(())
    }

    /// Delete history records one by one; failures do not stop the rest.
    pub async fn delete_issues(&self, ids: Vec<EntityId>) -> Result<Vec<DeleteOutcome>, CoreError> {
        match self.execute(Command::DeleteIssues { ids }).await? {
            CommandResult::Deleted(outcomes) => Ok(outcomes),
            _ => Ok(Vec::new()),
        }
    }

    #[allow(clippy::too_many_lines)]
    async fn apply(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        let client = &self.inner.client;
        let n = &self.inner.normalizer;

        match cmd {
            // ── Issuance ─────────────────────────────────────────
            Command::Issue {
                employee_id,
                device_id,
            } => {
                let snapshot = self.snapshot().await?;
                gate::can_issue(&snapshot, &employee_id, &device_id)?;
                client
                    .issue(&employee_id.to_wire(), &device_id.to_wire())
                    .await?;
                info!(%employee_id, %device_id, "recorder issued");
                Ok(CommandResult::Ok)
            }
            Command::Return {
                employee_id,
                device_id,
            } => {
                let snapshot = self.snapshot().await?;
                gate::can_return(&snapshot, &employee_id, &device_id)?;
                client
                    .return_recorder(&employee_id.to_wire(), &device_id.to_wire())
                    .await?;
                info!(%employee_id, %device_id, "recorder returned");
                Ok(CommandResult::Ok)
            }
            Command::DeleteIssue { id } => {
                let key = id.to_string();
                client
                    .delete_issue(&key)
                    .await
                    .map_err(|e| CoreError::from(e).or_not_found("Issuance record", &key))?;
                info!(%id, "issuance record deleted");
                Ok(CommandResult::Ok)
            }
            Command::DeleteIssues { ids } => {
                let mut outcomes = Vec::with_capacity(ids.len());
                for id in ids {
                    match client.delete_issue(&id.to_string()).await {
                        Ok(_) => outcomes.push(DeleteOutcome::succeeded(id)),
                        Err(e) => {
                            let e = CoreError::from(e);
                            warn!(%id, error = %e, "failed to delete issuance record");
                            outcomes.push(DeleteOutcome::failed(id, e.to_string()));
                        }
                    }
                }
                let deleted = outcomes.iter().filter(|o| o.success).count();
                info!(deleted, failed = outcomes.len() - deleted, "bulk delete finished");
                Ok(CommandResult::Deleted(outcomes))
            }

            // ── Employees ────────────────────────────────────────
            Command::CreateEmployee(req) => {
                req.validate()?;
                let raw = client.create_employee(&to_payload(&req)?).await?;
                info!(name = %req.full_name, "employee created");
                Ok(CommandResult::Employee(n.employee(&raw)))
            }
            Command::UpdateEmployee { id, update } => {
                update.validate()?;
                let key = id.to_string();
                let raw = client
                    .update_employee(&key, &to_payload(&update)?)
                    .await
                    .map_err(|e| CoreError::from(e).or_not_found("Employee", &key))?;
                info!(%id, "employee updated");
                Ok(CommandResult::Employee(n.employee(&raw)))
            }
            Command::DeleteEmployee { id } => {
                let key = id.to_string();
                client
                    .delete_employee(&key)
                    .await
                    .map_err(|e| CoreError::from(e).or_not_found("Employee", &key))?;
                info!(%id, "employee deleted");
                Ok(CommandResult::Ok)
            }

            // ── Video recorders ──────────────────────────────────
            Command::CreateRecorder(req) => {
                req.validate()?;
                let raw = client.create_recorder(&to_payload(&req)?).await?;
                info!(number = %req.number, "recorder created");
                Ok(CommandResult::Recorder(n.device(&raw)))
            }
            Command::UpdateRecorder { id, update } => {
                update.validate()?;
                let key = id.to_string();
                let raw = client
                    .update_recorder(&key, &to_payload(&update)?)
                    .await
                    .map_err(|e| CoreError::from(e).or_not_found("Recorder", &key))?;
                info!(%id, "recorder updated");
                Ok(CommandResult::Recorder(n.device(&raw)))
            }
            Command::DeleteRecorder { id } => {
                let key = id.to_string();
                client
                    .delete_recorder(&key)
                    .await
                    .map_err(|e| CoreError::from(e).or_not_found("Recorder", &key))?;
                info!(%id, "recorder deleted");
                Ok(CommandResult::Ok)
            }
        }
    }
}
