use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Directory record after normalization.
///
/// Every optional field is an empty string when the source omitted it, so
/// lowercasing and substring search never have to deal with a missing value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CanonicalRecord {
    pub id: String,
    pub name: String,
    /// School the character belongs to.
    pub category: String,
    /// Damage type.
    pub subtype: String,
    /// Birthday, display only.
    pub meta_text: String,
    pub image_url: String,
    pub category_image_url: String,
}

impl CanonicalRecord {
    /// Record with only a name; handy for fixtures and detail lookups.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Key used to deduplicate records across pages: `id` when present, else `name`.
    pub fn identity_key(&self) -> &str {
        if self.id.is_empty() {
            &self.name
        } else {
            &self.id
        }
    }
}

/// Read a text-ish field: strings pass through, numbers and booleans are
/// stringified, anything else becomes empty.
fn text_field(raw: &Value, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// First non-empty value among `keys`.
fn first_non_empty(raw: &Value, keys: &[&str]) -> String {
    keys.iter()
        .map(|key| text_field(raw, key))
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}

/// Map one raw API record into a [`CanonicalRecord`].
///
/// Total over any JSON input: a non-object yields an all-empty record.
pub fn normalize_record(raw: &Value) -> CanonicalRecord {
    CanonicalRecord {
        id: first_non_empty(raw, &["_id", "id"]),
        name: text_field(raw, "name"),
        category: text_field(raw, "school"),
        subtype: text_field(raw, "damageType"),
        meta_text: text_field(raw, "birthday"),
        image_url: first_non_empty(raw, &["photoUrl", "image"]),
        category_image_url: text_field(raw, "imageSchool"),
    }
}

/// Normalize a list of raw records, preserving order.
pub fn normalize_records(raw: &[Value]) -> Vec<CanonicalRecord> {
    raw.iter().map(normalize_record).collect()
}
