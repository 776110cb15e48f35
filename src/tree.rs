/*!
# Tree Rendering

Renders a mapping as a tree of boxes drawn with box-drawing characters.

Every entry gets a box. Non-empty mappings show their key and nest their
children underneath; sequences list their items (without the key); any other
value shows as `key: value`.

```
use jsondig::tree;
use serde_json::json;

let rendered = tree::render(&json!({"A": {"n": 1}}));
assert_eq!(
    rendered,
    "┌─────┐\n\
     │  A  │\n\
     └─────┘\n    \
     └────────┐\n    \
     │  n: 1  │\n    \
     └────────┘"
);
```
*/
use serde_json::{Map, Value};

/// Renders `value` as a box tree. Non-mapping values render as plain text.
#[must_use]
pub fn render(value: &Value) -> String {
    match value {
        Value::Object(map) => render_entries(map, "", 0),
        scalar => text(scalar),
    }
}

/// Display text of a value: strings unquoted, everything else as compact JSON.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_entries(
    map: &Map<String, Value>,
    prefix: &str,
    level: usize,
) -> String {
    let mut lines: Vec<String> = Vec::new();

    for (i, (key, value)) in map.iter().enumerate() {
        let is_last = i + 1 == map.len();
        let nested = value.as_object().filter(|m| !m.is_empty());

        let child_extension = if is_last { "    " } else { "│   " };
        let corner = match (level, i, is_last) {
            (0, 0, _) => '┌',
            (0, _, _) | (_, _, true) => '└',
            _ => '├',
        };

        let content = match value {
            _ if nested.is_some() => vec![format!(" {key} ")],
            Value::Array(items) if items.is_empty() => {
                vec!["  (empty list)".to_string()]
            }
            Value::Array(items) => items
                .iter()
                .map(|item| format!("  - {}    ", text(item)))
                .collect(),
            leaf if key.is_empty() => vec![format!(" {} ", text(leaf))],
            leaf => vec![format!(" {key}: {} ", text(leaf))],
        };

        let width = content
            .iter()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        let bar = "─".repeat(width);
        let bottom_corner = if level == 0 { '└' } else { corner };

        lines.push(format!("{prefix}{corner}─{bar}─┐"));
        for line in &content {
            let pad = width - line.chars().count();
            lines.push(format!("{prefix}│ {line}{:pad$} │", ""));
        }
        lines.push(format!("{prefix}{bottom_corner}─{bar}─┘"));

        if let Some(children) = nested {
            let child_prefix = format!("{prefix}{child_extension}");
            let subtree = render_entries(children, &child_prefix, level + 1);
            if !subtree.is_empty() {
                lines.push(subtree);
            }
        }
    }

    lines.join("\n")
}
