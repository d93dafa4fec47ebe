//! Video recorder command handlers.

use std::collections::HashSet;

use tabled::Tabled;

use issuedesk_core::{
    Command as CoreCommand, CommandResult, Controller, CreateRecorderRequest, Device,
    DeviceStatus, EntityId, Snapshot, UpdateRecorderRequest, gate, query,
};

use crate::cli::{GlobalOpts, RecordersArgs, RecordersCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RecorderRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Holder")]
    holder: String,
}

fn holder(snapshot: &Snapshot, d: &Device) -> String {
    snapshot
        .open_record_for_device(&d.id)
        .map(|r| {
            r.employee_name
                .clone()
                .or_else(|| r.employee_id.as_ref().map(|id| format!("#{id}")))
                .unwrap_or_default()
        })
        .unwrap_or_default()
}

fn row(snapshot: &Snapshot, d: &Device, color: bool) -> RecorderRow {
    RecorderRow {
        id: d.id.to_string(),
        number: d.number.clone().unwrap_or_default(),
        status: d
            .status
            .as_ref()
            .map(|s| output::paint_status(s.as_str(), color))
            .unwrap_or_default(),
        holder: holder(snapshot, d),
    }
}

fn detail(d: &Device) -> String {
    [
        format!("ID:      {}", d.id),
        format!("Number:  {}", d.number.as_deref().unwrap_or("-")),
        format!(
            "Status:  {}",
            d.status.as_ref().map_or("-", DeviceStatus::as_str)
        ),
        format!(
            "Created: {}",
            d.created_at
                .as_ref()
                .map_or_else(|| "-".into(), ToString::to_string)
        ),
    ]
    .join("\n")
}

fn print_recorder(device: &Device, global: &GlobalOpts) {
    let out = output::render_single(&global.output, device, detail, |d| d.id.to_string());
    output::print_output(&out, global.quiet);
}

fn print_result(result: CommandResult, fallback: &str, global: &GlobalOpts) {
    match result {
        CommandResult::Recorder(Some(device)) => print_recorder(&device, global),
        _ => output::notice(fallback, global.quiet),
    }
}

/// Recorders matching `search`, then the status or availability filter.
fn select<'a>(
    snapshot: &'a Snapshot,
    search: Option<&str>,
    status: Option<&DeviceStatus>,
    available: bool,
) -> Vec<&'a Device> {
    let mut selected = query::search_devices(&snapshot.devices, search.unwrap_or(""));
    if let Some(status) = status {
        selected = query::devices_with_status(selected, status);
    }
    if available {
        let free: HashSet<&EntityId> = gate::available_devices(snapshot)
            .into_iter()
            .filter(|d| d.is_available())
            .map(|d| &d.id)
            .collect();
        selected.retain(|d| free.contains(&d.id));
    }
    selected
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: RecordersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::establish(controller).await?;

    match args.command {
        RecordersCommand::List {
            search,
            status,
            available,
        } => {
            let snapshot = controller.snapshot().await?;
            let status = status.map(|s| DeviceStatus::from_wire(&s));
            let selected: Vec<Device> =
                select(&snapshot, search.as_deref(), status.as_ref(), available)
                    .into_iter()
                    .cloned()
                    .collect();
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &selected,
                |d| row(&snapshot, d, color),
                |d| d.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RecordersCommand::Get { recorder } => {
            let snapshot = controller.snapshot().await?;
            let id = util::resolve_recorder(&snapshot, &recorder);
            let found = controller.get_recorder(&id).await?;
            print_recorder(&found, global);
            Ok(())
        }

        RecordersCommand::Create { number } => {
            let result = controller
                .execute(CoreCommand::CreateRecorder(CreateRecorderRequest::new(
                    number,
                )))
                .await?;
            print_result(result, "Recorder created", global);
            Ok(())
        }

        RecordersCommand::Update {
            recorder,
            number,
            status,
        } => {
            let snapshot = controller.snapshot().await?;
            let id = util::resolve_recorder(&snapshot, &recorder);
            let update = UpdateRecorderRequest {
                number,
                status: status.map(|s| DeviceStatus::from_wire(&s)),
            };
            let result = controller
                .execute(CoreCommand::UpdateRecorder { id, update })
                .await?;
            print_result(result, "Recorder updated", global);
            Ok(())
        }

        RecordersCommand::Delete { recorder } => {
            let snapshot = controller.snapshot().await?;
            let id = util::resolve_recorder(&snapshot, &recorder);
            let label = snapshot
                .device(&id)
                .map_or_else(|| recorder.clone(), Device::label);
            if !util::confirm(&format!("Delete recorder {label}?"), global.yes)? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeleteRecorder { id })
                .await?;
            output::notice("Recorder deleted", global.quiet);
            Ok(())
        }
    }
}
