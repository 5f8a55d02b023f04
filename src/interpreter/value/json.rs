use serde_json::{json, Map};

use crate::interpreter::value::{attrs::names_of, core::PromiseState, core::Value};

/// Converts a runtime value into a `serde_json::Value` for host interop.
///
/// Scalar atomic vectors become JSON primitives, longer vectors become
/// arrays, NA becomes `null`, and lists with unique non-empty `names`
/// become objects (arrays otherwise). Unforced promises render as the
/// string `"<promise>"`; callables render as their printed form.
///
/// # Example
/// ```
/// use vectra::{to_json, Context};
///
/// let ctx = Context::new();
/// let out = ctx.eval_source("list(a = 1, b = c(2, 3))").unwrap();
/// let j = to_json(&out.value);
/// assert_eq!(j["a"], serde_json::json!(1));
/// assert_eq!(j["b"][1], serde_json::json!(3));
/// ```
#[must_use]
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Logical(v) => scalar_or_array(&v.data, |b| json!(b)),
        Value::Int(v) => scalar_or_array(&v.data, |i| json!(i)),
        Value::Double(v) => scalar_or_array(&v.data, |d| {
                               serde_json::Number::from_f64(*d).map_or(serde_json::Value::Null,
                                                                       serde_json::Value::Number)
                           }),
        Value::Char(v) => scalar_or_array(&v.data, |s| json!(s)),
        Value::List(v) => {
            if let Some(keys) = object_keys(value, v.data.len()) {
                let mut obj = Map::new();
                for (key, elem) in keys.into_iter().zip(v.data.iter()) {
                    obj.insert(key, to_json(elem));
                }
                return serde_json::Value::Object(obj);
            }
            serde_json::Value::Array(v.data.iter().map(to_json).collect())
        },
        Value::Expr(e) => json!(e.expr.to_string()),
        Value::Promise(p) => match &*p.state.borrow() {
            PromiseState::Done(Ok(v)) => to_json(v),
            _ => json!("<promise>"),
        },
        Value::Dots(d) => {
            let mut obj = Map::new();
            for (i, arg) in d.args.iter().enumerate() {
                let key = arg.name
                             .clone()
                             .unwrap_or_else(|| format!("..{}", i + 1));
                obj.insert(key, to_json(&arg.value));
            }
            serde_json::Value::Object(obj)
        },
        other => json!(other.to_string()),
    }
}

/// Renders a slice of optional elements as a scalar when length 1, an
/// array otherwise; NA elements map to `null`.
fn scalar_or_array<T>(data: &[Option<T>],
                      f: impl Fn(&T) -> serde_json::Value)
                      -> serde_json::Value {
    let one = |e: &Option<T>| e.as_ref().map_or(serde_json::Value::Null, &f);
    if data.len() == 1 {
        return one(&data[0]);
    }
    serde_json::Value::Array(data.iter().map(one).collect())
}

/// The object keys for a list, provided its `names` are complete, unique
/// and non-empty.
fn object_keys(value: &Value, len: usize) -> Option<Vec<String>> {
    let names = names_of(value)?;
    if names.len() != len {
        return None;
    }
    let mut keys = Vec::with_capacity(len);
    for name in names {
        match name {
            Some(n) if !n.is_empty() && !keys.contains(&n) => keys.push(n),
            _ => return None,
        }
    }
    Some(keys)
}
