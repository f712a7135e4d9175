//! Item callback for JSON values

use atomic_diff_core::ItemCallback;
use serde_json::Value;

/// Identifies JSON items by the value at a JSON pointer.
///
/// Items without that field are identified by their whole value.
#[derive(Debug, Clone)]
pub struct JsonCallback {
    pointer: String,
}

impl JsonCallback {
    /// `id` is accepted as shorthand for `/id`
    pub fn new(key: &str) -> Self {
        let pointer = if key.is_empty() || key.starts_with('/') {
            key.to_string()
        } else {
            format!("/{}", key)
        };
        Self { pointer }
    }

    pub fn identity<'v>(&self, item: &'v Value) -> &'v Value {
        item.pointer(&self.pointer).unwrap_or(item)
    }
}

impl ItemCallback<Value> for JsonCallback {
    /// Top-level fields whose values differ
    type Payload = Vec<String>;

    fn are_items_the_same(&self, old_item: &Value, new_item: &Value) -> bool {
        self.identity(old_item) == self.identity(new_item)
    }

    fn are_contents_the_same(&self, old_item: &Value, new_item: &Value) -> bool {
        old_item == new_item
    }

    fn change_payload(&self, old_item: &Value, new_item: &Value) -> Option<Vec<String>> {
        let (Value::Object(old_fields), Value::Object(new_fields)) = (old_item, new_item) else {
            return None;
        };
        let mut fields: Vec<String> = old_fields
            .keys()
            .chain(new_fields.keys())
            .filter(|field| old_fields.get(*field) != new_fields.get(*field))
            .cloned()
            .collect();
        fields.sort();
        fields.dedup();
        Some(fields)
    }
}
