use std::collections::BTreeMap;

use crate::interpreter::value::core::Value;

/// The attribute mapping attached to vectors and lists.
///
/// Attribute names are arbitrary; the core interprets only the reserved
/// names `names`, `class`, `row.names` and `dim`. A `BTreeMap` keeps the
/// iteration order of `attributes()` deterministic.
pub type Attributes = BTreeMap<String, Value>;

/// Reads the `names` attribute of a value as plain strings.
///
/// Returns `None` when the value has no `names` attribute or it is not a
/// character vector. NA names come back as `None` entries.
#[must_use]
pub fn names_of(value: &Value) -> Option<Vec<Option<String>>> {
    match value.get_attr("names")? {
        Value::Char(cv) => Some(cv.data.clone()),
        _ => None,
    }
}

/// Looks up `name` in the `names` attribute of `value` and returns the
/// first matching position.
#[must_use]
pub fn name_position(value: &Value, name: &str) -> Option<usize> {
    let names = names_of(value)?;
    names.iter()
         .position(|n| n.as_deref() == Some(name))
}
