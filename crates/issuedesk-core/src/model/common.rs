// ── Shared model plumbing ──

use serde_json::Value;

/// Wire keys a record was read from, one per field that was present,
/// together with the value each key carried.
///
/// The server mixes snake_case and camelCase (sometimes per record), and
/// is loose about JSON types (numbers where text is expected, `""` for a
/// missing date). A record remembers both the spelling and the raw value
/// it arrived with and writes itself back the same way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireOrigin {
    fields: Vec<(&'static str, Value)>,
}

impl WireOrigin {
    pub(crate) fn record(&mut self, key: &'static str, raw: &Value) {
        if !self.fields.iter().any(|(k, _)| *k == key) {
            self.fields.push((key, raw.clone()));
        }
    }

    /// The key that supplied a field, given that field's candidate keys.
    pub fn key_for(&self, candidates: &[&'static str]) -> Option<&'static str> {
        self.entry_for(candidates).map(|(key, _)| key)
    }

    /// The key that supplied a field and the value it held on the wire.
    pub fn entry_for(&self, candidates: &[&'static str]) -> Option<(&'static str, &Value)> {
        self.fields
            .iter()
            .find(|(k, _)| candidates.contains(k))
            .map(|(k, v)| (*k, v))
    }
}
