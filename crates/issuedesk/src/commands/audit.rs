//! Report issuance invariant violations in the server's current state.

use tabled::Tabled;

use issuedesk_core::{Controller, InvariantViolation};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::util;

#[derive(Tabled)]
struct ViolationRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Detail")]
    detail: String,
}

pub async fn handle(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    util::establish(controller).await?;
    let violations = controller.audit().await?;

    if violations.is_empty() && matches!(global.output, OutputFormat::Table) {
        output::notice("No inconsistencies found", global.quiet);
        return Ok(());
    }

    let out = output::render_list(
        &global.output,
        &violations,
        |v: &InvariantViolation| ViolationRow {
            kind: v.kind(),
            detail: v.to_string(),
        },
        ToString::to_string,
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
