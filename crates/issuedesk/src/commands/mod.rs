//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod audit;
pub mod auth;
pub mod config_cmd;
pub mod employees;
pub mod history;
pub mod issues;
pub mod recorders;
pub mod util;

use issuedesk_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command, then persist whatever happened to
/// the session (new token, eviction, logout).
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    profile: &str,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let stored = controller.session().token();
    let result = route(cmd, controller, global).await;
    util::sync_stored_token(controller, profile, stored.as_ref());
    result
}

async fn route(cmd: Command, controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login => auth::login(controller, global).await,
        Command::Logout => auth::logout(controller, global),
        Command::Whoami => auth::whoami(controller, global).await,
        Command::Register(args) => auth::register(controller, args, global).await,
        Command::Employees(args) => employees::handle(controller, args, global).await,
        Command::Recorders(args) => recorders::handle(controller, args, global).await,
        Command::Issue(args) => issues::issue(controller, args, global).await,
        Command::Return(args) => issues::return_device(controller, args, global).await,
        Command::Active => issues::active(controller, global).await,
        Command::History(args) => history::handle(controller, args, global).await,
        Command::Audit => audit::handle(controller, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
