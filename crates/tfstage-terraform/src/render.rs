// crates/tfstage-terraform/src/render.rs
// ============================================================================
// Module: Output Rendering
// Description: Renders `terraform output -json` values as flat strings.
// Purpose: Give expectations a stable textual form for lists and maps.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Values render the way Go's `%v` verb prints decoded JSON, which is the
//! form expectation tables are written in:
//! - strings verbatim, numbers and booleans as literals
//! - lists as `[a b]`
//! - objects as `map[k:v]` with sorted keys
//! - a top-level `null` as the empty string, nested `null` as `<nil>`
//!
//! The top-level case departs from `%v`, which prints `<nil>`: an output set
//! to `null` counts as unset, so `empty` passes on it and `notempty` fails.

use std::fmt::Write;

use serde_json::Value;

/// Renders a decoded output value.
#[must_use]
pub fn render_output(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        other => {
            let mut out = String::new();
            render_nested(&mut out, other);
            out
        }
    }
}

/// Renders a value inside a list or map.
fn render_nested(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("<nil>"),
        Value::Bool(flag) => {
            let _ = write!(out, "{flag}");
        }
        Value::Number(number) => {
            let _ = write!(out, "{number}");
        }
        Value::String(text) => out.push_str(text),
        Value::Array(items) => {
            out.push('[');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    out.push(' ');
                }
                render_nested(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push_str("map[");
            for (index, key) in keys.into_iter().enumerate() {
                if index > 0 {
                    out.push(' ');
                }
                out.push_str(key);
                out.push(':');
                if let Some(item) = map.get(key) {
                    render_nested(out, item);
                }
            }
            out.push(']');
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::render_output;

    #[test]
    fn scalars_render_as_literals() {
        assert_eq!(render_output(&json!("10.0.0.0/16")), "10.0.0.0/16");
        assert_eq!(render_output(&json!(true)), "true");
        assert_eq!(render_output(&json!(42)), "42");
        assert_eq!(render_output(&json!("")), "");
        assert_eq!(render_output(&json!(null)), "");
    }

    #[test]
    fn lists_render_space_separated() {
        assert_eq!(
            render_output(&json!(["10.0.10.0/24", "10.0.11.0/24"])),
            "[10.0.10.0/24 10.0.11.0/24]"
        );
        assert_eq!(render_output(&json!([])), "[]");
        assert_eq!(render_output(&json!([null, 1])), "[<nil> 1]");
    }

    #[test]
    fn maps_render_with_sorted_keys() {
        assert_eq!(
            render_output(&json!({"zone": "b", "az": ["a", "c"], "count": 2})),
            "map[az:[a c] count:2 zone:b]"
        );
    }
}
