use serde::{Deserialize, Serialize};

/// Query-string parameters accepted by every list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListQuery {
    /// Page size.
    pub limit: usize,
    /// Number of matches to skip.
    pub offset: usize,
    /// Field to sort by (registry order when absent).
    pub sort: Option<String>,
    /// Full-text search string, routed to the search engine.
    pub q: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self { limit: 50, offset: 0, sort: None, q: None }
    }
}

/// One page of a listing plus the total match count.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T: Serialize> Page<T> {
    pub fn new(items: Vec<T>, total: usize) -> Self {
        Self { items, total }
    }
}

/// Random 32-hex-char identifier (UUIDv4 without dashes).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Current UTC time as an RFC 3339 string.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Apply an RFC 7386 JSON merge patch to `target` in place.
///
/// A `null` removes the key, a nested object merges recursively, and
/// any other value replaces what was there. A non-object patch (or a
/// non-object target) replaces the target wholesale.
pub fn merge_patch(target: &mut serde_json::Value, patch: &serde_json::Value) {
    use serde_json::Value;

    match (target, patch) {
        (Value::Object(fields), Value::Object(changes)) => {
            for (key, change) in changes {
                match change {
                    Value::Null => {
                        fields.remove(key);
                    }
                    Value::Object(_) => {
                        let slot = fields
                            .entry(key.clone())
                            .or_insert(Value::Object(serde_json::Map::new()));
                        merge_patch(slot, change);
                    }
                    scalar => {
                        fields.insert(key.clone(), scalar.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ids_are_dashless_and_distinct() {
        let (a, b) = (new_id(), new_id());
        assert_eq!(a.len(), 32);
        assert!(!a.contains('-'));
        assert_ne!(a, b);
    }

    #[test]
    fn timestamps_are_rfc3339() {
        assert!(now_rfc3339().contains('T'));
    }

    #[test]
    fn list_query_defaults_apply_per_field() {
        let q: ListQuery = serde_json::from_str(r#"{"offset": 10}"#).unwrap();
        assert_eq!(q.limit, 50);
        assert_eq!(q.offset, 10);
        assert!(q.sort.is_none());
    }

    #[test]
    fn patch_removes_merges_and_replaces() {
        let mut doc = json!({"name": "JUKI", "status": "Idle", "spec": {"rpm": 4000}});
        merge_patch(
            &mut doc,
            &json!({"status": null, "spec": {"needle": "DBx1"}, "line": "L-2"}),
        );
        assert_eq!(
            doc,
            json!({"name": "JUKI", "spec": {"rpm": 4000, "needle": "DBx1"}, "line": "L-2"})
        );
    }

    #[test]
    fn non_object_target_is_replaced() {
        let mut doc = json!("scalar");
        merge_patch(&mut doc, &json!({"a": 1}));
        assert_eq!(doc, json!({"a": 1}));
    }
}
