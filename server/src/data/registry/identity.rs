//! Sample identity derivation

use std::collections::BTreeMap;
use std::fmt::Write;

/// Derive the storage key for a metric from its name and label set.
///
/// The label map iterates in sorted key order, so two descriptors that
/// differ only in label insertion order produce the same identity. The
/// serialization is collision-free for distinct name + label-set pairs
/// short of pathological label values, which is all the registry needs.
pub fn identity(name: &str, labels: &BTreeMap<String, String>) -> String {
    if labels.is_empty() {
        return name.to_string();
    }

    let mut key = String::with_capacity(name.len() + 16 * labels.len());
    key.push_str(name);
    key.push('{');
    for (i, (label, value)) in labels.iter().enumerate() {
        if i > 0 {
            key.push(',');
        }
        let _ = write!(key, "{}=\"{}\"", label, value);
    }
    key.push('}');
    key
}
