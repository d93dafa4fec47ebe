// Response envelope unwrapping
//
// The server wraps collections as `{ "<key>": [...] }` and single records
// as `{ "<key>": {...} }`, but some deployments answer with the bare
// array/object instead. Both shapes are accepted; the wrapped key is tried
// first, in the order given.

use serde_json::Value;

/// Extract the list under the first matching key, or the body itself when
/// it is already an array. Anything else yields an empty list.
pub fn unwrap_list(body: Value, keys: &[&str]) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => keys
            .iter()
            .find_map(|k| match map.remove(*k) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Extract the record under the first matching key, or the body itself.
pub fn unwrap_single(body: Value, keys: &[&str]) -> Value {
    match body {
        Value::Object(mut map) => {
            for key in keys {
                if let Some(inner @ Value::Object(_)) = map.remove(*key) {
                    return inner;
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_from_wrapped_key() {
        let body = json!({"employees": [{"id": 1}, {"id": 2}]});
        assert_eq!(unwrap_list(body, &["employees"]).len(), 2);
    }

    #[test]
    fn list_from_second_key() {
        let body = json!({"videoRecorders": [{"id": 1}]});
        let list = unwrap_list(body, &["video_recorders", "videoRecorders"]);
        assert_eq!(list, vec![json!({"id": 1})]);
    }

    #[test]
    fn list_from_bare_array() {
        let body = json!([{"id": 1}]);
        assert_eq!(unwrap_list(body, &["issues"]).len(), 1);
    }

    #[test]
    fn list_from_unexpected_shape_is_empty() {
        assert!(unwrap_list(json!({"issues": null}), &["issues"]).is_empty());
        assert!(unwrap_list(json!("nope"), &["issues"]).is_empty());
    }

    #[test]
    fn single_unwraps_or_passes_through() {
        let wrapped = json!({"employee": {"id": 7}});
        assert_eq!(unwrap_single(wrapped, &["employee"]), json!({"id": 7}));

        let bare = json!({"id": 8, "full_name": "X"});
        assert_eq!(unwrap_single(bare.clone(), &["employee"]), bare);
    }
}
