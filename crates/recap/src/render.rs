// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! YAML rendering of the output tree
//!
//! The encoders return typed trees serialized to `serde_json::Value`; this
//! module walks that value and writes block-style YAML. Field order is
//! preserved as serialized. Strings are double-quoted only when they would
//! otherwise be ambiguous to a YAML reader.

use serde_json::Value;

const INDENT: &str = "  ";

/// Render a value tree as block-style YAML
#[must_use]
pub fn to_yaml(value: &Value) -> String {
    let mut out = String::new();
    match value {
        Value::Object(map) => render_mapping(map, 0, &mut out),
        Value::Array(seq) => render_sequence(seq, 0, &mut out),
        other => {
            out.push_str(&scalar(other));
            out.push('\n');
        }
    }
    out
}

fn render_mapping(map: &serde_json::Map<String, Value>, indent: usize, out: &mut String) {
    let pad = INDENT.repeat(indent);
    for (key, value) in map {
        render_entry(key, value, &pad, indent, out);
    }
}

fn render_entry(key: &str, value: &Value, lead: &str, indent: usize, out: &mut String) {
    let key = format_string(key);
    match value {
        Value::Object(map) if map.is_empty() => {
            out.push_str(&format!("{lead}{key}: {{}}\n"));
        }
        Value::Object(map) => {
            out.push_str(&format!("{lead}{key}:\n"));
            render_mapping(map, indent + 1, out);
        }
        Value::Array(seq) if seq.is_empty() => {
            out.push_str(&format!("{lead}{key}: []\n"));
        }
        Value::Array(seq) => {
            out.push_str(&format!("{lead}{key}:\n"));
            render_sequence(seq, indent + 1, out);
        }
        other => {
            out.push_str(&format!("{lead}{key}: {}\n", scalar(other)));
        }
    }
}

fn render_sequence(seq: &[Value], indent: usize, out: &mut String) {
    let pad = INDENT.repeat(indent);
    for item in seq {
        match item {
            Value::Object(map) if !map.is_empty() => {
                // First key shares the dash line, the rest align under it
                for (i, (key, value)) in map.iter().enumerate() {
                    let lead = if i == 0 {
                        format!("{pad}- ")
                    } else {
                        format!("{pad}  ")
                    };
                    render_entry(key, value, &lead, indent + 1, out);
                }
            }
            Value::Array(inner) if !inner.is_empty() => {
                out.push_str(&format!("{pad}-\n"));
                render_sequence(inner, indent + 1, out);
            }
            other => {
                out.push_str(&format!("{pad}- {}\n", scalar(other)));
            }
        }
    }
}

fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "~".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format_string(s),
        Value::Object(_) => "{}".to_string(),
        Value::Array(_) => "[]".to_string(),
    }
}

fn format_string(s: &str) -> String {
    if needs_quoting(s) {
        let mut quoted = String::with_capacity(s.len() + 2);
        quoted.push('"');
        for c in s.chars() {
            match c {
                '\\' => quoted.push_str("\\\\"),
                '"' => quoted.push_str("\\\""),
                '\n' => quoted.push_str("\\n"),
                '\r' => quoted.push_str("\\r"),
                '\t' => quoted.push_str("\\t"),
                _ => quoted.push(c),
            }
        }
        quoted.push('"');
        quoted
    } else {
        s.to_string()
    }
}

fn needs_quoting(s: &str) -> bool {
    if s.is_empty() {
        return true;
    }

    // Reserved words and anything numeric-looking
    let lower = s.to_lowercase();
    if matches!(
        lower.as_str(),
        "true" | "false" | "null" | "~" | "yes" | "no" | "on" | "off"
    ) || s.parse::<f64>().is_ok()
    {
        return true;
    }

    if s.starts_with(|c: char| {
        matches!(
            c,
            ' ' | '-' | '?' | ':' | ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|'
                | '>' | '\'' | '"' | '%' | '@' | '`'
        )
    }) {
        return true;
    }

    s.ends_with(' ')
        || s.ends_with(':')
        || s.contains(": ")
        || s.contains(" #")
        || s.contains('\n')
        || s.contains('"')
        || s.contains('\\')
}
