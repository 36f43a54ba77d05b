//! Storage Field-Name Codec
//!
//! Record fields are stored under a fixed namespace prefix so they cannot
//! collide with keys written by other components sharing the content store.
//! The public boundary of this layer never shows the prefix.

use crate::models::FieldMap;

/// Namespace prefix carried by every stored field name
pub const META_PREFIX: &str = "_perfmon_";

/// Storage name for a single public field name
pub fn prefixed_key(name: &str) -> String {
    format!("{}{}", META_PREFIX, name)
}

/// Public name for a single storage key, or `None` for a foreign key
pub fn public_key(key: &str) -> Option<&str> {
    key.strip_prefix(META_PREFIX)
}

/// Map public field names to storage field names
pub fn add_prefix(fields: &FieldMap) -> FieldMap {
    fields
        .iter()
        .map(|(name, value)| (prefixed_key(name), value.clone()))
        .collect()
}

/// Map storage field names back to public names
///
/// Keys without the prefix belong to someone else and are dropped.
pub fn strip_prefix(fields: &FieldMap) -> FieldMap {
    fields
        .iter()
        .filter_map(|(key, value)| public_key(key).map(|name| (name.to_string(), value.clone())))
        .collect()
}
