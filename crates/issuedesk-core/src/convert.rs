// ── Wire-to-domain normalization ──
//
// The server is inconsistent about key spelling: snake_case, camelCase,
// and a few legacy fallbacks (`serialNumber`, `name`, `login`) all show
// up, sometimes within one response. Each record kind has a field table
// listing the accepted spellings in precedence order. Reading walks the
// table and remembers which spelling matched and the value it held;
// writing emits each unchanged field under that same spelling with that
// same value, so canonical records round-trip exactly.

use serde_json::{Map, Value};
use strum::{Display, EnumString};
use url::Url;

use crate::model::{
    Device, DeviceStatus, Employee, EntityId, IssuanceRecord, Timestamp, User, WireOrigin,
};

// ── Field tables ───────────────────────────────────────────────────

/// One canonical field and its accepted wire spellings, most preferred first.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub keys: &'static [&'static str],
}

const fn field(name: &'static str, keys: &'static [&'static str]) -> FieldSpec {
    FieldSpec { name, keys }
}

const ID: FieldSpec = field("id", &["id"]);

pub mod employee_fields {
    use super::{FieldSpec, field};

    pub const FULL_NAME: FieldSpec = field("fullName", &["full_name", "fullName"]);
    pub const POSITION: FieldSpec = field("position", &["position"]);
    pub const EMPLOYEE_NUMBER: FieldSpec =
        field("employeeNumber", &["employee_number", "employeeNumber"]);
    pub const PHOTO_URL: FieldSpec = field("photoUrl", &["photo_url", "photoUrl"]);
    pub const CREATED_AT: FieldSpec = field("createdAt", &["created_at", "createdAt"]);
}

pub mod device_fields {
    use super::{FieldSpec, field};

    pub const NUMBER: FieldSpec = field("number", &["number", "serialNumber", "name"]);
    pub const STATUS: FieldSpec = field("status", &["status"]);
    pub const CREATED_AT: FieldSpec = field("createdAt", &["created_at", "createdAt"]);
}

pub mod issuance_fields {
    use super::{FieldSpec, field};

    pub const EMPLOYEE_ID: FieldSpec = field("employeeId", &["employee_id", "employeeId"]);
    pub const EMPLOYEE_NAME: FieldSpec =
        field("employeeName", &["employee_name", "employeeName"]);
    pub const DEVICE_ID: FieldSpec =
        field("videoRecorderId", &["video_recorder_id", "videoRecorderId"]);
    pub const DEVICE_NUMBER: FieldSpec = field(
        "videoRecorderNumber",
        &["video_recorder_number", "videoRecorderNumber"],
    );
    pub const ISSUE_DATE: FieldSpec = field("issueDate", &["issue_date", "issueDate"]);
    pub const RETURN_DATE: FieldSpec = field("returnDate", &["return_date", "returnDate"]);
    pub const ISSUED_BY_USER_ID: FieldSpec =
        field("issuedByUserId", &["issued_by_user_id", "issuedByUserId"]);
    pub const ISSUED_BY_USERNAME: FieldSpec =
        field("issuedByUsername", &["issued_by_username", "issuedByUsername"]);
    pub const RETURNED_BY_USER_ID: FieldSpec =
        field("returnedByUserId", &["returned_by_user_id", "returnedByUserId"]);
    pub const RETURNED_BY_USERNAME: FieldSpec = field(
        "returnedByUsername",
        &["returned_by_username", "returnedByUsername"],
    );
}

pub mod user_fields {
    use super::{FieldSpec, field};

    pub const USERNAME: FieldSpec = field("username", &["username", "login"]);
    pub const FULL_NAME: FieldSpec = field("fullName", &["fullName", "full_name"]);
    pub const ROLE: FieldSpec = field("role", &["role_name", "role"]);
    pub const ROLE_ID: FieldSpec = field("roleId", &["role_id", "roleId"]);
    pub const CREATED_AT: FieldSpec = field("createdAt", &["createdAt", "created_at"]);
    pub const LAST_NAME: FieldSpec = field("lastName", &["last_name", "lastName"]);
    pub const FIRST_NAME: FieldSpec = field("firstName", &["first_name", "firstName"]);
    pub const MIDDLE_NAME: FieldSpec = field("middleName", &["middle_name", "middleName"]);
}

// ── Record kinds ───────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum RecordKind {
    Employee,
    #[strum(to_string = "video_recorder", serialize = "recorder", serialize = "device")]
    Device,
    #[strum(to_string = "issuance", serialize = "issue")]
    Issuance,
}

/// A normalized record of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum CanonicalRecord {
    Employee(Employee),
    Device(Device),
    Issuance(IssuanceRecord),
}

impl CanonicalRecord {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Employee(_) => RecordKind::Employee,
            Self::Device(_) => RecordKind::Device,
            Self::Issuance(_) => RecordKind::Issuance,
        }
    }

    pub fn id(&self) -> &EntityId {
        match self {
            Self::Employee(e) => &e.id,
            Self::Device(d) => &d.id,
            Self::Issuance(r) => &r.id,
        }
    }

    /// Serialize back to wire JSON under the spellings the record arrived with.
    pub fn to_wire(&self) -> Value {
        match self {
            Self::Employee(e) => employee_to_wire(e),
            Self::Device(d) => device_to_wire(d),
            Self::Issuance(r) => issuance_to_wire(r),
        }
    }
}

// ── Reading ────────────────────────────────────────────────────────

/// Walks a wire object against field specs, recording matched spellings.
struct WireReader<'a> {
    obj: &'a Map<String, Value>,
    origin: WireOrigin,
}

impl<'a> WireReader<'a> {
    fn new(obj: &'a Map<String, Value>) -> Self {
        Self {
            obj,
            origin: WireOrigin::default(),
        }
    }

    /// First non-null value among the spec's keys. When every present key
    /// is null, the first present key is still recorded so the null
    /// round-trips under the same spelling.
    fn pick(&mut self, spec: FieldSpec) -> Option<&'a Value> {
        let mut first_present = None;
        for key in spec.keys {
            match self.obj.get(*key) {
                Some(Value::Null) => {
                    first_present.get_or_insert(*key);
                }
                Some(value) => {
                    self.origin.record(*key, value);
                    return Some(value);
                }
                None => {}
            }
        }
        if let Some(key) = first_present {
            self.origin.record(key, &Value::Null);
        }
        None
    }

    fn string(&mut self, spec: FieldSpec) -> Option<String> {
        self.pick(spec).and_then(wire_text)
    }

    fn id(&mut self, spec: FieldSpec) -> Option<EntityId> {
        self.pick(spec).and_then(EntityId::from_wire)
    }

    fn timestamp(&mut self, spec: FieldSpec) -> Option<Timestamp> {
        self.pick(spec).and_then(Timestamp::from_wire)
    }
}

/// Text content of a scalar wire value. Numbers and booleans are
/// accepted where the server is expected to send text.
fn wire_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn wire_status(value: &Value) -> Option<DeviceStatus> {
    wire_text(value).map(|s| DeviceStatus::from_wire(&s))
}

/// Reader over an object body plus its id, or `None` for null,
/// non-objects and id-less records.
fn reader_with_id(raw: &Value) -> Option<(WireReader<'_>, EntityId)> {
    let mut r = WireReader::new(raw.as_object()?);
    let id = r.id(ID)?;
    Some((r, id))
}

/// Converts server JSON to canonical records and derives URLs that
/// depend on the API base.
#[derive(Debug, Clone)]
pub struct Normalizer {
    api_base: Url,
}

impl Normalizer {
    pub fn new(api_base: Url) -> Self {
        Self { api_base }
    }

    pub fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Normalize a raw record of the given kind.
    pub fn to_canonical(&self, kind: RecordKind, raw: &Value) -> Option<CanonicalRecord> {
        match kind {
            RecordKind::Employee => self.employee(raw).map(CanonicalRecord::Employee),
            RecordKind::Device => self.device(raw).map(CanonicalRecord::Device),
            RecordKind::Issuance => self.issuance(raw).map(CanonicalRecord::Issuance),
        }
    }

    #[allow(clippy::unused_self)]
    pub fn employee(&self, raw: &Value) -> Option<Employee> {
        use employee_fields as f;
        let (mut r, id) = reader_with_id(raw)?;
        Some(Employee {
            id,
            full_name: r.string(f::FULL_NAME),
            position: r.string(f::POSITION),
            employee_number: r.string(f::EMPLOYEE_NUMBER),
            photo_url: r.string(f::PHOTO_URL),
            created_at: r.timestamp(f::CREATED_AT),
            origin: r.origin,
        })
    }

    #[allow(clippy::unused_self)]
    pub fn device(&self, raw: &Value) -> Option<Device> {
        use device_fields as f;
        let (mut r, id) = reader_with_id(raw)?;
        Some(Device {
            id,
            number: r.string(f::NUMBER),
            status: r.pick(f::STATUS).and_then(wire_status),
            created_at: r.timestamp(f::CREATED_AT),
            origin: r.origin,
        })
    }

    #[allow(clippy::unused_self)]
    pub fn issuance(&self, raw: &Value) -> Option<IssuanceRecord> {
        use issuance_fields as f;
        let (mut r, id) = reader_with_id(raw)?;
        Some(IssuanceRecord {
            id,
            employee_id: r.id(f::EMPLOYEE_ID),
            employee_name: r.string(f::EMPLOYEE_NAME),
            device_id: r.id(f::DEVICE_ID),
            device_number: r.string(f::DEVICE_NUMBER),
            issue_date: r.timestamp(f::ISSUE_DATE),
            return_date: r.timestamp(f::RETURN_DATE),
            issued_by_user_id: r.id(f::ISSUED_BY_USER_ID),
            issued_by_username: r.string(f::ISSUED_BY_USERNAME),
            returned_by_user_id: r.id(f::RETURNED_BY_USER_ID),
            returned_by_username: r.string(f::RETURNED_BY_USERNAME),
            origin: r.origin,
        })
    }

    /// Normalize the `auth/me` payload. A missing full name is composed
    /// from `last first middle`.
    #[allow(clippy::unused_self)]
    pub fn user(&self, raw: &Value) -> Option<User> {
        use user_fields as f;
        let (mut r, id) = reader_with_id(raw)?;

        let full_name = r
            .string(f::FULL_NAME)
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                let parts: Vec<String> = [f::LAST_NAME, f::FIRST_NAME, f::MIDDLE_NAME]
                    .into_iter()
                    .filter_map(|spec| r.string(spec))
                    .filter(|s| !s.trim().is_empty())
                    .collect();
                (!parts.is_empty()).then(|| parts.join(" "))
            });

        Some(User {
            id,
            username: r.string(f::USERNAME),
            full_name,
            role: r.string(f::ROLE),
            role_id: r.id(f::ROLE_ID),
            created_at: r.timestamp(f::CREATED_AT),
        })
    }

    /// Normalize a list, dropping entries that are not usable records.
    pub fn employees(&self, raw: &[Value]) -> Vec<Employee> {
        raw.iter().filter_map(|v| self.employee(v)).collect()
    }

    pub fn devices(&self, raw: &[Value]) -> Vec<Device> {
        raw.iter().filter_map(|v| self.device(v)).collect()
    }

    pub fn issuances(&self, raw: &[Value]) -> Vec<IssuanceRecord> {
        raw.iter().filter_map(|v| self.issuance(v)).collect()
    }

    /// The employee's photo URL: the stored one, or `{api}/employees/{id}/photo`.
    ///
    /// Derived on demand; never stored on the record or sent to the server.
    pub fn photo_url(&self, employee: &Employee) -> String {
        if let Some(url) = employee.photo_url.as_deref().filter(|u| !u.is_empty()) {
            return url.to_owned();
        }
        let base = self.api_base.as_str().trim_end_matches('/');
        format!("{base}/employees/{}/photo", employee.id)
    }
}

// ── Writing ────────────────────────────────────────────────────────

struct WireWriter<'a> {
    map: Map<String, Value>,
    origin: &'a WireOrigin,
}

impl<'a> WireWriter<'a> {
    fn new(origin: &'a WireOrigin) -> Self {
        Self {
            map: Map::new(),
            origin,
        }
    }

    /// Emit a field under its original spelling. When reading the raw
    /// wire value again would still give `current`, the raw value is
    /// written back untouched; otherwise `current` is rendered fresh.
    /// Fields that were absent on the wire are emitted under the
    /// preferred spelling only when set.
    fn put<T: PartialEq>(
        &mut self,
        spec: FieldSpec,
        current: Option<&T>,
        read: impl Fn(&Value) -> Option<T>,
        render: impl Fn(&T) -> Value,
    ) {
        match self.origin.entry_for(spec.keys) {
            Some((key, raw)) => {
                let value = if read(raw).as_ref() == current {
                    raw.clone()
                } else {
                    current.map_or(Value::Null, &render)
                };
                self.map.insert(key.to_owned(), value);
            }
            None => {
                if let Some(value) = current {
                    self.map.insert(spec.keys[0].to_owned(), render(value));
                }
            }
        }
    }

    fn text(&mut self, spec: FieldSpec, current: Option<&String>) {
        self.put(spec, current, wire_text, |s| Value::String(s.clone()));
    }

    fn id(&mut self, spec: FieldSpec, current: Option<&EntityId>) {
        self.put(spec, current, EntityId::from_wire, EntityId::to_wire);
    }

    fn timestamp(&mut self, spec: FieldSpec, current: Option<&Timestamp>) {
        self.put(spec, current, Timestamp::from_wire, |t| t.raw().clone());
    }

    fn finish(self) -> Value {
        Value::Object(self.map)
    }
}

pub fn employee_to_wire(e: &Employee) -> Value {
    use employee_fields as f;
    let mut w = WireWriter::new(&e.origin);
    w.id(ID, Some(&e.id));
    w.text(f::FULL_NAME, e.full_name.as_ref());
    w.text(f::POSITION, e.position.as_ref());
    w.text(f::EMPLOYEE_NUMBER, e.employee_number.as_ref());
    w.text(f::PHOTO_URL, e.photo_url.as_ref());
    w.timestamp(f::CREATED_AT, e.created_at.as_ref());
    w.finish()
}

pub fn device_to_wire(d: &Device) -> Value {
    use device_fields as f;
    let mut w = WireWriter::new(&d.origin);
    w.id(ID, Some(&d.id));
    w.text(f::NUMBER, d.number.as_ref());
    w.put(f::STATUS, d.status.as_ref(), wire_status, |s| {
        Value::String(s.as_str().to_owned())
    });
    w.timestamp(f::CREATED_AT, d.created_at.as_ref());
    w.finish()
}

pub fn issuance_to_wire(r: &IssuanceRecord) -> Value {
    use issuance_fields as f;
    let mut w = WireWriter::new(&r.origin);
    w.id(ID, Some(&r.id));
    w.id(f::EMPLOYEE_ID, r.employee_id.as_ref());
    w.text(f::EMPLOYEE_NAME, r.employee_name.as_ref());
    w.id(f::DEVICE_ID, r.device_id.as_ref());
    w.text(f::DEVICE_NUMBER, r.device_number.as_ref());
    w.timestamp(f::ISSUE_DATE, r.issue_date.as_ref());
    w.timestamp(f::RETURN_DATE, r.return_date.as_ref());
    w.id(f::ISSUED_BY_USER_ID, r.issued_by_user_id.as_ref());
    w.text(f::ISSUED_BY_USERNAME, r.issued_by_username.as_ref());
    w.id(f::RETURNED_BY_USER_ID, r.returned_by_user_id.as_ref());
    w.text(f::RETURNED_BY_USERNAME, r.returned_by_username.as_ref());
    w.finish()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn normalizer() -> Normalizer {
        Normalizer::new(Url::parse("http://158.160.9.21:5000/api/").unwrap())
    }

    #[test]
    fn employee_snake_and_camel_agree() {
        let n = normalizer();
        let snake = n
            .employee(&json!({"id": 1, "full_name": "Иванов Иван", "employee_number": "A001"}))
            .unwrap();
        let camel = n
            .employee(&json!({"id": 1, "fullName": "Иванов Иван", "employeeNumber": "A001"}))
            .unwrap();
        assert_eq!(snake.full_name, camel.full_name);
        assert_eq!(snake.employee_number, camel.employee_number);
    }

    #[test]
    fn snake_wins_over_camel() {
        let e = normalizer()
            .employee(&json!({"id": 1, "full_name": "Snake", "fullName": "Camel"}))
            .unwrap();
        assert_eq!(e.full_name.as_deref(), Some("Snake"));
    }

    #[test]
    fn null_snake_falls_through_to_camel() {
        let e = normalizer()
            .employee(&json!({"id": 1, "full_name": null, "fullName": "Camel"}))
            .unwrap();
        assert_eq!(e.full_name.as_deref(), Some("Camel"));
    }

    #[test]
    fn device_number_fallbacks() {
        let n = normalizer();
        let serial = n.device(&json!({"id": 1, "serialNumber": "SN-1"})).unwrap();
        let named = n.device(&json!({"id": 2, "name": "Cam 2"})).unwrap();
        assert_eq!(serial.number.as_deref(), Some("SN-1"));
        assert_eq!(named.number.as_deref(), Some("Cam 2"));
    }

    #[test]
    fn missing_status_is_none() {
        let d = normalizer().device(&json!({"id": 1, "number": "VR-1"})).unwrap();
        assert!(d.status.is_none());
        assert!(!d.is_available());
    }

    #[test]
    fn null_input_and_missing_id_yield_none() {
        let n = normalizer();
        assert!(n.employee(&Value::Null).is_none());
        assert!(n.device(&json!("VR-1")).is_none());
        assert!(n.issuance(&json!({"employee_id": 1})).is_none());
    }

    #[test]
    fn employee_round_trips_mixed_spellings() {
        let raw = json!({
            "id": 3,
            "fullName": "Petrov Petr",
            "employee_number": "B002",
            "position": null,
            "createdAt": "2024-01-15T10:30:00Z"
        });
        let record = normalizer().to_canonical(RecordKind::Employee, &raw).unwrap();
        assert_eq!(record.to_wire(), raw);
    }

    #[test]
    fn issuance_round_trips_with_null_return() {
        let raw = json!({
            "id": "77",
            "employeeId": 1,
            "employee_name": "Иванов Иван",
            "video_recorder_id": 10,
            "videoRecorderNumber": "VR-10",
            "issue_date": "2024-01-15T10:30:00",
            "return_date": null,
            "issued_by_username": "operator"
        });
        let record = normalizer().issuance(&raw).unwrap();
        assert!(record.is_open());
        assert_eq!(issuance_to_wire(&record), raw);
    }

    #[test]
    fn device_round_trips_unknown_status() {
        let raw = json!({"id": 4, "serialNumber": "SN-4", "status": "repair"});
        let record = normalizer().device(&raw).unwrap();
        assert_eq!(device_to_wire(&record), raw);
    }

    #[test]
    fn device_round_trips_numeric_number() {
        let raw = json!({"id": 4, "number": 101, "status": "available"});
        let record = normalizer().to_canonical(RecordKind::Device, &raw).unwrap();
        let CanonicalRecord::Device(device) = &record else {
            panic!("expected a device");
        };
        assert_eq!(device.number.as_deref(), Some("101"));
        assert_eq!(record.to_wire(), raw);
    }

    #[test]
    fn employee_round_trips_numeric_number_and_blank_date() {
        let raw = json!({"id": 1, "employee_number": 123_456, "created_at": ""});
        let record = normalizer().to_canonical(RecordKind::Employee, &raw).unwrap();
        let CanonicalRecord::Employee(employee) = &record else {
            panic!("expected an employee");
        };
        assert_eq!(employee.employee_number.as_deref(), Some("123456"));
        assert!(employee.created_at.is_none());
        assert_eq!(record.to_wire(), raw);
    }

    #[test]
    fn status_spelling_is_kept() {
        let raw = json!({"id": 2, "number": "VR-2", "status": "Available"});
        let record = normalizer().device(&raw).unwrap();
        assert!(record.is_available());
        assert_eq!(device_to_wire(&record), raw);
    }

    #[test]
    fn edited_fields_are_written_fresh() {
        let raw = json!({"id": 4, "number": 101, "createdAt": "2024-01-15"});
        let mut record = normalizer().device(&raw).unwrap();
        record.number = Some("102".into());
        record.created_at = None;
        assert_eq!(
            device_to_wire(&record),
            json!({"id": 4, "number": "102", "createdAt": null})
        );
        assert_eq!(record.origin().key_for(device_fields::CREATED_AT.keys), Some("createdAt"));
    }

    #[test]
    fn fresh_record_uses_preferred_spellings() {
        let mut e = Employee::new(5);
        e.full_name = Some("Sidorov".into());
        assert_eq!(employee_to_wire(&e), json!({"id": 5, "full_name": "Sidorov"}));
    }

    #[test]
    fn photo_url_is_derived_but_not_stored() {
        let n = normalizer();
        let e = n.employee(&json!({"id": 9, "full_name": "X"})).unwrap();
        assert_eq!(n.photo_url(&e), "http://158.160.9.21:5000/api/employees/9/photo");
        assert!(e.photo_url.is_none());
        assert!(employee_to_wire(&e).get("photo_url").is_none());
    }

    #[test]
    fn stored_photo_url_wins() {
        let n = normalizer();
        let e = n
            .employee(&json!({"id": 9, "photoUrl": "https://cdn/x.jpg"}))
            .unwrap();
        assert_eq!(n.photo_url(&e), "https://cdn/x.jpg");
    }

    #[test]
    fn user_name_composed_from_parts() {
        let u = normalizer()
            .user(&json!({
                "id": 1,
                "login": "ivanov",
                "last_name": "Иванов",
                "firstName": "Иван",
                "middle_name": "",
                "role_name": "admin",
                "role_id": 1
            }))
            .unwrap();
        assert_eq!(u.full_name.as_deref(), Some("Иванов Иван"));
        assert_eq!(u.username.as_deref(), Some("ivanov"));
        assert!(u.is_admin());
        assert!(!u.is_operator());
    }

    #[test]
    fn record_kind_parses_aliases() {
        assert_eq!("recorder".parse::<RecordKind>().unwrap(), RecordKind::Device);
        assert_eq!(RecordKind::Issuance.to_string(), "issuance");
    }
}
