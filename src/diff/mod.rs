use std::collections::BTreeSet;

use serde_json::{Map, Value};

/// Returns the sorted, de-duplicated field paths where `before` and `after`
/// differ, or `None` when the two trees are equal.
///
/// Paths use `.key` for mapping children and `[i]` for list elements. Lists
/// of different length are reported once at the list's own path.
pub fn change_paths(before: &Value, after: &Value) -> Option<Vec<String>> {
    let mut out = Vec::new();
    diff_value("", before, after, &mut out);
    if out.is_empty() {
        return None;
    }
    out.sort();
    out.dedup();
    Some(out)
}

fn diff_value(path: &str, before: &Value, after: &Value, out: &mut Vec<String>) {
    if values_equal(before, after) {
        return;
    }

    match (before, after) {
        (Value::Object(b), Value::Object(a)) => diff_maps(path, b, a, out),
        (Value::Array(b), Value::Array(a)) => {
            if b.len() != a.len() {
                push_leaf(path, out);
                return;
            }
            for (i, (bv, av)) in b.iter().zip(a).enumerate() {
                diff_value(&format!("{path}[{i}]"), bv, av, out);
            }
        }
        _ => push_leaf(path, out),
    }
}

fn diff_maps(path: &str, before: &Map<String, Value>, after: &Map<String, Value>, out: &mut Vec<String>) {
    let keys: BTreeSet<&str> = before
        .keys()
        .chain(after.keys())
        .map(String::as_str)
        .collect();

    for key in keys {
        let child = if path.is_empty() {
            key.to_string()
        } else {
            format!("{path}.{key}")
        };
        match (before.get(key), after.get(key)) {
            (Some(bv), Some(av)) => diff_value(&child, bv, av, out),
            _ => out.push(child),
        }
    }
}

// The root itself has no name to report.
fn push_leaf(path: &str, out: &mut Vec<String>) {
    if !path.is_empty() {
        out.push(path.to_string());
    }
}

/// Deep equality where numbers compare by value, so `1` and `1.0` match.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x
                    .iter()
                    .all(|(k, xv)| y.get(k).is_some_and(|yv| values_equal(xv, yv)))
        }
        _ => a == b,
    }
}
