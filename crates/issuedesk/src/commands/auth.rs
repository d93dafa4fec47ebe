//! Session and account handlers.

use dialoguer::Input;
use secrecy::{ExposeSecret, SecretString};

use issuedesk_core::{Controller, EntityId, RegisterRequest, User};

use crate::cli::{GlobalOpts, RegisterArgs};
use crate::error::CliError;
use crate::output;

use super::util;

fn detail(u: &User) -> String {
    [
        format!("ID:       {}", u.id),
        format!("Username: {}", u.username.as_deref().unwrap_or("-")),
        format!("Name:     {}", u.full_name.as_deref().unwrap_or("-")),
        format!("Role:     {}", u.role.as_deref().unwrap_or("-")),
    ]
    .join("\n")
}

fn render_user(user: &User, global: &GlobalOpts) {
    let out = output::render_single(&global.output, user, detail, |u| {
        u.username.clone().unwrap_or_else(|| u.id.to_string())
    });
    output::print_output(&out, global.quiet);
}

/// Credentials from the profile chain, else interactive prompts.
fn login_credentials(
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(String, SecretString), CliError> {
    if let Some((username, password)) = controller.config().auth.login() {
        return Ok((username.to_owned(), password.clone()));
    }
    let username = match global.username {
        Some(ref u) => u.clone(),
        None => Input::new()
            .with_prompt("Username")
            .interact_text()
            .map_err(util::prompt_err)?,
    };
    let password = util::prompt_password("Password: ")?;
    Ok((username, password))
}

pub async fn login(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let (username, password) = login_credentials(controller, global)?;
    let spinner = output::spinner(global, "Logging in");
    let result = controller.login(&username, &password).await;
    spinner.finish_and_clear();
    let user = result?;

    output::notice(
        &format!("Logged in as {}", user.display_name()),
        global.quiet,
    );
    Ok(())
}

pub fn logout(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    controller.logout();
    output::notice("Logged out", global.quiet);
    Ok(())
}

pub async fn whoami(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    let user = util::establish(controller).await?;
    render_user(&user, global);
    Ok(())
}

pub async fn register(
    controller: &Controller,
    args: RegisterArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let password = util::prompt_password("Password for the new account: ")?;
    let repeat = util::prompt_password("Repeat password: ")?;
    if password.expose_secret() != repeat.expose_secret() {
        return Err(CliError::Validation {
            field: "password".into(),
            reason: "passwords do not match".into(),
        });
    }

    let request = RegisterRequest {
        username: args.login,
        password,
        last_name: args.last_name,
        first_name: args.first_name,
        middle_name: args.middle_name,
        role_id: EntityId::from(args.role_id),
    };
    controller.register(&request).await?;
    output::notice(
        &format!("Account '{}' registered", request.username),
        global.quiet,
    );
    Ok(())
}
