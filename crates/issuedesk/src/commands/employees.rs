//! Employee command handlers.

use std::collections::HashSet;

use tabled::Tabled;

use issuedesk_core::{
    Command as CoreCommand, CommandResult, Controller, CreateEmployeeRequest, Employee, EntityId,
    Snapshot, UpdateEmployeeRequest, gate, query,
};

use crate::cli::{EmployeesArgs, EmployeesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct EmployeeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Holding")]
    holding: String,
}

fn row(snapshot: &Snapshot, e: &Employee) -> EmployeeRow {
    EmployeeRow {
        id: e.id.to_string(),
        name: e.full_name.clone().unwrap_or_default(),
        position: e.position.clone().unwrap_or_default(),
        number: e.employee_number.clone().unwrap_or_default(),
        holding: snapshot
            .open_record_for_employee(&e.id)
            .map(issuedesk_core::IssuanceRecord::device_label)
            .unwrap_or_default(),
    }
}

fn detail(controller: &Controller, e: &Employee) -> String {
    [
        format!("ID:       {}", e.id),
        format!("Name:     {}", e.full_name.as_deref().unwrap_or("-")),
        format!("Position: {}", e.position.as_deref().unwrap_or("-")),
        format!("Number:   {}", e.employee_number.as_deref().unwrap_or("-")),
        format!(
            "Created:  {}",
            e.created_at
                .as_ref()
                .map_or_else(|| "-".into(), ToString::to_string)
        ),
        format!("Photo:    {}", controller.normalizer().photo_url(e)),
    ]
    .join("\n")
}

fn print_employee(controller: &Controller, employee: &Employee, global: &GlobalOpts) {
    let out = output::render_single(
        &global.output,
        employee,
        |e| detail(controller, e),
        |e| e.id.to_string(),
    );
    output::print_output(&out, global.quiet);
}

fn print_result(
    controller: &Controller,
    result: CommandResult,
    fallback: &str,
    global: &GlobalOpts,
) {
    match result {
        CommandResult::Employee(Some(employee)) => print_employee(controller, &employee, global),
        _ => output::notice(fallback, global.quiet),
    }
}

/// Employees matching `search`, narrowed to non-holders when asked.
fn select<'a>(snapshot: &'a Snapshot, search: Option<&str>, unencumbered: bool) -> Vec<&'a Employee> {
    let mut selected = query::search_employees(&snapshot.employees, search.unwrap_or(""));
    if unencumbered {
        let free: HashSet<&EntityId> = gate::unencumbered_employees(snapshot)
            .into_iter()
            .map(|e| &e.id)
            .collect();
        selected.retain(|e| free.contains(&e.id));
    }
    selected
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: EmployeesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    util::establish(controller).await?;

    match args.command {
        EmployeesCommand::List {
            search,
            unencumbered,
        } => {
            let snapshot = controller.snapshot().await?;
            let selected: Vec<Employee> = select(&snapshot, search.as_deref(), unencumbered)
                .into_iter()
                .cloned()
                .collect();
            let out = output::render_list(
                &global.output,
                &selected,
                |e| row(&snapshot, e),
                |e| e.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        EmployeesCommand::Get { employee } => {
            let snapshot = controller.snapshot().await?;
            let id = util::resolve_employee(&snapshot, &employee);
            let found = controller.get_employee(&id).await?;
            print_employee(controller, &found, global);
            Ok(())
        }

        EmployeesCommand::Create {
            name,
            position,
            number,
        } => {
            let request = CreateEmployeeRequest {
                full_name: name,
                position,
                employee_number: number,
            };
            let result = controller
                .execute(CoreCommand::CreateEmployee(request))
                .await?;
            print_result(controller, result, "Employee created", global);
            Ok(())
        }

        EmployeesCommand::Update {
            employee,
            name,
            position,
            number,
        } => {
            let snapshot = controller.snapshot().await?;
            let id = util::resolve_employee(&snapshot, &employee);
            let update = UpdateEmployeeRequest {
                full_name: name,
                position,
                employee_number: number,
            };
            let result = controller
                .execute(CoreCommand::UpdateEmployee { id, update })
                .await?;
            print_result(controller, result, "Employee updated", global);
            Ok(())
        }

        EmployeesCommand::Delete { employee } => {
            let snapshot = controller.snapshot().await?;
            let id = util::resolve_employee(&snapshot, &employee);
            let label = snapshot
                .employee(&id)
                .map_or_else(|| employee.clone(), Employee::label);
            if !util::confirm(&format!("Delete employee {label}?"), global.yes)? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeleteEmployee { id })
                .await?;
            output::notice("Employee deleted", global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use issuedesk_core::IssuanceRecord;

    fn named(id: i64, name: &str) -> Employee {
        let mut e = Employee::new(id);
        e.full_name = Some(name.into());
        e
    }

    #[test]
    fn unencumbered_drops_holders() {
        let mut open = IssuanceRecord::new(100);
        open.employee_id = Some(EntityId::from(1));
        open.device_id = Some(EntityId::from(10));
        let snapshot = Snapshot::new(
            vec![named(1, "Anna"), named(2, "Boris"), named(3, "Anton")],
            Vec::new(),
            vec![open],
            Utc::now(),
        );

        let ids: Vec<String> = select(&snapshot, Some("an"), true)
            .iter()
            .map(|e| e.id.to_string())
            .collect();
        assert_eq!(ids, vec!["3"]);

        assert_eq!(select(&snapshot, None, false).len(), 3);
        assert_eq!(row(&snapshot, &snapshot.employees[0]).holding, "#10");
    }
}
