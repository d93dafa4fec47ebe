//! Issue, return and active-issuance handlers.

use tabled::Tabled;

use issuedesk_core::{Controller, IssuanceRecord, Snapshot};

use crate::cli::{GlobalOpts, IssuanceArgs};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct IssuanceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Employee")]
    employee: String,
    #[tabled(rename = "Recorder")]
    recorder: String,
    #[tabled(rename = "Issued")]
    issued: String,
    #[tabled(rename = "By")]
    issued_by: String,
    #[tabled(rename = "Returned")]
    returned: String,
}

fn or_dash<T: ToString>(value: Option<&T>) -> String {
    value.map_or_else(|| "-".into(), ToString::to_string)
}

impl From<&IssuanceRecord> for IssuanceRow {
    fn from(r: &IssuanceRecord) -> Self {
        Self {
            id: r.id.to_string(),
            employee: r
                .employee_name
                .clone()
                .unwrap_or_else(|| or_dash(r.employee_id.as_ref())),
            recorder: r.device_label(),
            issued: or_dash(r.issue_date.as_ref()),
            issued_by: r.issued_by_username.clone().unwrap_or_default(),
            returned: or_dash(r.return_date.as_ref()),
        }
    }
}

fn open_record_line(snapshot: &Snapshot, args: &IssuanceArgs) -> String {
    let employee = util::resolve_employee(snapshot, &args.employee);
    snapshot.open_record_for_employee(&employee).map_or_else(
        || format!("Recorder issued to employee {employee}"),
        |r| {
            format!(
                "Issued {} to {}",
                r.device_label(),
                r.employee_name.as_deref().unwrap_or(&args.employee)
            )
        },
    )
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn issue(
    controller: &Controller,
    args: IssuanceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::establish(controller).await?;
    let snapshot = controller.snapshot().await?;
    let employee = util::resolve_employee(&snapshot, &args.employee);
    let recorder = util::resolve_recorder(&snapshot, &args.recorder);

    let spinner = output::spinner(global, "Issuing");
    let result = controller.issue(employee, recorder).await;
    spinner.finish_and_clear();

    let after = result?;
    output::notice(&open_record_line(&after, &args), global.quiet);
    Ok(())
}

pub async fn return_device(
    controller: &Controller,
    args: IssuanceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::establish(controller).await?;
    let snapshot = controller.snapshot().await?;
    let employee = util::resolve_employee(&snapshot, &args.employee);
    let recorder = util::resolve_recorder(&snapshot, &args.recorder);

    let spinner = output::spinner(global, "Returning");
    let result = controller.return_device(employee, recorder).await;
    spinner.finish_and_clear();

    result?;
    output::notice(
        &format!("Recorder {} returned by {}", args.recorder, args.employee),
        global.quiet,
    );
    Ok(())
}

pub async fn active(controller: &Controller, global: &GlobalOpts) -> Result<(), CliError> {
    util::establish(controller).await?;
    let snapshot = controller.snapshot().await?;
    let out = output::render_list(
        &global.output,
        &snapshot.open_records,
        |r: &IssuanceRecord| IssuanceRow::from(r),
        |r| r.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
