// ── Free-text search ──
//
// Linear scans over a snapshot's lists. Matching is a case-insensitive
// substring test; a blank query matches everything.

use crate::model::{Device, DeviceStatus, Employee};

fn needle(query: &str) -> Option<String> {
    let q = query.trim();
    (!q.is_empty()).then(|| q.to_lowercase())
}

fn contains(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

/// Employees whose full name, position or personnel number contains `query`.
pub fn search_employees<'a>(employees: &'a [Employee], query: &str) -> Vec<&'a Employee> {
    let Some(q) = needle(query) else {
        return employees.iter().collect();
    };
    employees
        .iter()
        .filter(|e| {
            contains(e.full_name.as_deref(), &q)
                || contains(e.position.as_deref(), &q)
                || contains(e.employee_number.as_deref(), &q)
        })
        .collect()
}

/// Recorders whose number contains `query`.
pub fn search_devices<'a>(devices: &'a [Device], query: &str) -> Vec<&'a Device> {
    let Some(q) = needle(query) else {
        return devices.iter().collect();
    };
    devices
        .iter()
        .filter(|d| contains(d.number.as_deref(), &q))
        .collect()
}

/// Narrow a list of recorders to one status.
pub fn devices_with_status<'a>(
    devices: impl IntoIterator<Item = &'a Device>,
    status: &DeviceStatus,
) -> Vec<&'a Device> {
    devices
        .into_iter()
        .filter(|d| d.status.as_ref() == Some(status))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EntityId;

    fn employee(id: i64, name: &str, position: &str, number: &str) -> Employee {
        let mut e = Employee::new(id);
        e.full_name = Some(name.into());
        e.position = Some(position.into());
        e.employee_number = Some(number.into());
        e
    }

    fn staff() -> Vec<Employee> {
        vec![
            employee(1, "Иванов Иван", "Инспектор", "A001"),
            employee(2, "Petrov Petr", "Driver", "B002"),
            Employee::new(3),
        ]
    }

    #[test]
    fn blank_query_matches_all() {
        assert_eq!(search_employees(&staff(), "   ").len(), 3);
    }

    #[test]
    fn search_is_case_insensitive_across_scripts() {
        let staff = staff();
        let hits = search_employees(&staff, "иванов");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, EntityId::from(1));

        let hits = search_employees(&staff, "DRIVER");
        assert_eq!(hits[0].id, EntityId::from(2));
    }

    #[test]
    fn search_by_personnel_number() {
        let staff = staff();
        assert_eq!(search_employees(&staff, "b00")[0].id, EntityId::from(2));
    }

    #[test]
    fn device_search_and_status() {
        let mut a = Device::new(1);
        a.number = Some("VR-001".into());
        a.status = Some(DeviceStatus::Available);
        let mut b = Device::new(2);
        b.number = Some("VR-002".into());
        b.status = Some(DeviceStatus::Issued);
        let devices = vec![a, b, Device::new(3)];

        assert_eq!(search_devices(&devices, "vr-").len(), 2);
        assert_eq!(search_devices(&devices, "002")[0].id, EntityId::from(2));

        let issued = devices_with_status(&devices, &DeviceStatus::Issued);
        assert_eq!(issued.len(), 1);
        assert_eq!(issued[0].id, EntityId::from(2));
    }
}
