use serde_json::Value;
use shared_types::{DataLayerObject, GTM_START_EVENT};

use crate::error::Result;

/// The page's analytics event queue.
///
/// Injected into the orchestrator instead of being looked up globally, so a
/// plain `Vec` can stand in for the browser array.
pub trait DataLayer {
    /// Make sure a queue exists, keeping anything already queued.
    fn ensure(&mut self) -> Result<()> {
        Ok(())
    }

    fn push(&mut self, entry: Value) -> Result<()>;
}

impl DataLayer for Vec<Value> {
    fn push(&mut self, entry: Value) -> Result<()> {
        Vec::push(self, entry);
        Ok(())
    }
}

/// Marker the analytics snippet expects at the head of the queue.
pub fn gtm_start_marker(now_millis: i64) -> Value {
    serde_json::json!({
        "gtm.start": now_millis,
        "event": GTM_START_EVENT,
    })
}

/// Fold new properties into the previous snapshot.
///
/// An empty previous snapshot is seeded entirely by `next`. Otherwise the key
/// set of `previous` is kept: keys present in `next` (explicit nulls included)
/// overwrite, the rest carry forward, and keys only in `next` are dropped.
pub fn merge_data_layer_props(
    previous: &DataLayerObject,
    next: &DataLayerObject,
) -> DataLayerObject {
    if previous.is_empty() {
        return next.clone();
    }

    previous
        .iter()
        .map(|(key, old)| {
            let value = next.get(key).unwrap_or(old).clone();
            (key.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> DataLayerObject {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_first_merge_is_seeded_by_new_props() {
        let merged = merge_data_layer_props(
            &DataLayerObject::new(),
            &object(json!({"b": null, "c": 3})),
        );
        assert_eq!(Value::Object(merged), json!({"b": null, "c": 3}));
    }

    #[test]
    fn test_later_merge_keeps_previous_key_set() {
        let merged = merge_data_layer_props(
            &object(json!({"a": 1, "b": 2})),
            &object(json!({"b": null, "c": 3})),
        );
        assert_eq!(Value::Object(merged), json!({"a": 1, "b": null}));
    }

    #[test]
    fn test_merge_with_no_new_props_carries_everything_forward() {
        let previous = object(json!({"page": "home", "user": {"id": 7}}));
        let merged = merge_data_layer_props(&previous, &DataLayerObject::new());
        assert_eq!(merged, previous);
    }

    #[test]
    fn test_start_marker_shape() {
        let marker = gtm_start_marker(1_700_000_000_000);
        assert_eq!(marker["event"], "gtm.js");
        assert_eq!(marker["gtm.start"], 1_700_000_000_000i64);
    }

    #[test]
    fn test_vec_queue_appends_in_order() {
        let mut queue: Vec<Value> = Vec::new();
        DataLayer::ensure(&mut queue).unwrap();
        DataLayer::push(&mut queue, json!({"event": "one"})).unwrap();
        DataLayer::push(&mut queue, json!({"event": "two"})).unwrap();
        assert_eq!(queue, vec![json!({"event": "one"}), json!({"event": "two"})]);
    }
}
