//! Issuance history handlers: list, delete by id, purge by filter.

use tabled::Tabled;

use issuedesk_core::{Controller, DeleteOutcome, EntityId, HistoryFilter, IssuanceRecord, Snapshot};

use crate::cli::{GlobalOpts, HistoryArgs, HistoryCommand, HistoryFilterArgs};
use crate::error::CliError;
use crate::output;

use super::issues::IssuanceRow;
use super::util;

#[derive(Tabled)]
struct OutcomeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Error")]
    error: String,
}

fn build_filter(snapshot: &Snapshot, args: &HistoryFilterArgs) -> Result<HistoryFilter, CliError> {
    let filter = HistoryFilter {
        employee_id: args
            .employee
            .as_deref()
            .map(|e| util::resolve_employee(snapshot, e)),
        device_id: args
            .recorder
            .as_deref()
            .map(|r| util::resolve_recorder(snapshot, r)),
        date_from: args
            .from
            .as_deref()
            .map(|d| util::parse_date("from", d))
            .transpose()?,
        date_to: args
            .to
            .as_deref()
            .map(|d| util::parse_date("to", d))
            .transpose()?,
    };
    if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
        if from > to {
            return Err(CliError::Validation {
                field: "from".into(),
                reason: format!("{from} is after {to}"),
            });
        }
    }
    Ok(filter)
}

/// Print the per-item report and fail if any item failed.
fn report(outcomes: &[DeleteOutcome], global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        outcomes,
        |o| OutcomeRow {
            id: o.id.to_string(),
            result: output::paint_outcome(o.success, color),
            error: o.error.clone().unwrap_or_default(),
        },
        |o| format!("{}\t{}", o.id, if o.success { "deleted" } else { "failed" }),
    );
    output::print_output(&out, global.quiet);

    let failed = outcomes.iter().filter(|o| !o.success).count();
    if failed == 0 {
        Ok(())
    } else {
        Err(CliError::PartialFailure {
            failed,
            total: outcomes.len(),
        })
    }
}

pub async fn handle(
    controller: &Controller,
    args: HistoryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::establish(controller).await?;

    match args.command {
        HistoryCommand::List(filter_args) => {
            let snapshot = controller.snapshot().await?;
            let filter = build_filter(&snapshot, &filter_args)?;
            let records = controller.history(&filter).await?;
            let out = output::render_list(
                &global.output,
                &records,
                |r: &IssuanceRecord| IssuanceRow::from(r),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        HistoryCommand::Delete { ids } => {
            let ids: Vec<EntityId> = ids.iter().map(|id| EntityId::from(id.as_str())).collect();
            let prompt = match ids.as_slice() {
                [id] => format!("Delete issuance record {id}?"),
                _ => format!("Delete {} issuance records?", ids.len()),
            };
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }

            if let [id] = ids.as_slice() {
                controller.delete_issue(id.clone()).await?;
                output::notice("Issuance record deleted", global.quiet);
                return Ok(());
            }
            let outcomes = controller.delete_issues(ids).await?;
            report(&outcomes, global)
        }

        HistoryCommand::Purge(filter_args) => {
            let snapshot = controller.snapshot().await?;
            let filter = build_filter(&snapshot, &filter_args)?;
            let records = controller.history(&filter).await?;
            if records.is_empty() {
                output::notice("No matching records", global.quiet);
                return Ok(());
            }

            let open = records.iter().filter(|r| r.is_open()).count();
            let mut prompt = format!("Delete {} issuance records?", records.len());
            if open > 0 {
                prompt = format!("{prompt} {open} of them are still open.");
            }
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }

            let ids = records.into_iter().map(|r| r.id).collect();
            let spinner = output::spinner(global, "Deleting");
            let outcomes = controller.delete_issues(ids).await;
            spinner.finish_and_clear();
            report(&outcomes?, global)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, Utc};

    use super::*;
    use issuedesk_core::Employee;

    fn filter_args(from: Option<&str>, to: Option<&str>) -> HistoryFilterArgs {
        HistoryFilterArgs {
            employee: Some("A001".into()),
            recorder: None,
            from: from.map(Into::into),
            to: to.map(Into::into),
        }
    }

    fn snapshot() -> Snapshot {
        let mut e = Employee::new(4);
        e.employee_number = Some("A001".into());
        Snapshot::new(vec![e], Vec::new(), Vec::new(), Utc::now())
    }

    #[test]
    fn filter_resolves_numbers_and_dates() {
        let filter =
            build_filter(&snapshot(), &filter_args(Some("2024-01-01"), Some("2024-01-31"))).unwrap();
        assert_eq!(filter.employee_id, Some(EntityId::from(4)));
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(filter.date_to, NaiveDate::from_ymd_opt(2024, 1, 31));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let err =
            build_filter(&snapshot(), &filter_args(Some("2024-02-01"), Some("2024-01-01")))
                .unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
