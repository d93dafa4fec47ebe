// issuedesk-api: async transport for the video recorder issuance REST API.
//
// Everything here speaks raw wire JSON. Field naming, defaults and domain
// types live in `issuedesk-core`; this crate only knows paths, the bearer
// session, envelopes, and how the server reports failure.

pub mod client;
pub mod envelope;
pub mod error;
pub mod session;
pub mod transport;

mod auth;
mod employees;
mod issues;
mod recorders;

pub use client::ApiClient;
pub use error::Error;
pub use issues::HistoryQuery;
pub use session::Session;
pub use transport::{TlsMode, TransportConfig};
