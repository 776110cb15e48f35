//! Miscellaneous utility functions.

use anyhow::Context as _;
use colored::Colorize;
use serde_json::{Map, Value};
use std::io::Write;
use std::io::{self, ErrorKind};

/// Returns a copy of the mapping keeping only the listed keys. Non-mapping
/// values are returned unchanged.
#[must_use]
pub fn with_keys<S: AsRef<str>>(value: &Value, keys: &[S]) -> Value {
    filter_keys(value, |key| keys.iter().any(|k| k.as_ref() == key))
}

/// Returns a copy of the mapping without the listed keys. Non-mapping values
/// are returned unchanged.
#[must_use]
pub fn without_keys<S: AsRef<str>>(value: &Value, keys: &[S]) -> Value {
    filter_keys(value, |key| keys.iter().all(|k| k.as_ref() != key))
}

fn filter_keys(value: &Value, keep: impl Fn(&str) -> bool) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(key, _)| keep(key))
                .map(|(key, val)| (key.clone(), val.clone()))
                .collect::<Map<String, Value>>(),
        ),
        other => other.clone(),
    }
}

// =============================================================================
// Colorized JSON Output
// =============================================================================

/// Write a query result as colorized JSON followed by a newline.
/// Silently returns `Ok(())` on broken pipe so that piping to tools like
/// `less` or `head` exits cleanly.
///
/// # Errors
///
/// Returns an error if writing to `writer` fails.
pub fn write_colored_result<W: Write>(
    writer: &mut W,
    value: &Value,
    pretty: bool,
) -> anyhow::Result<()> {
    let result = (|| -> io::Result<()> {
        write_colored_json(writer, value, 0, pretty)?;
        writeln!(writer)?;
        Ok(())
    })();

    match result {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::BrokenPipe => Ok(()),
        Err(err) => Err(err).context("write colorized JSON to stdout"),
    }
}

/// Recursively write a JSON value with syntax highlighting.
fn write_colored_json<W: Write>(
    writer: &mut W,
    value: &Value,
    indent: usize,
    pretty: bool,
) -> io::Result<()> {
    let layout = Layout { indent, pretty };

    match value {
        Value::Null => write!(writer, "{}", "null".red().dimmed()),
        Value::Bool(b) => {
            write!(writer, "{}", b.to_string().yellow().bold())
        }
        Value::Number(n) => write!(writer, "{}", n.to_string().yellow()),
        // Display of a string value is its quoted, escaped JSON form
        Value::String(_) => write!(writer, "{}", value.to_string().green()),
        Value::Array(arr) => {
            layout.write_container(writer, ('[', ']'), arr, |w, item| {
                write_colored_json(w, item, layout.inner(), pretty)
            })
        }
        Value::Object(obj) => {
            let colon = if pretty { ": " } else { ":" };
            layout.write_container(writer, ('{', '}'), obj, |w, (key, val)| {
                let quoted_key = Value::String(key.clone()).to_string();
                write!(w, "{}{colon}", quoted_key.cyan())?;
                write_colored_json(w, val, layout.inner(), pretty)
            })
        }
    }
}

/// Indentation state for one level of a container.
#[derive(Clone, Copy)]
struct Layout {
    indent: usize,
    pretty: bool,
}

impl Layout {
    const fn inner(self) -> usize {
        self.indent + 2
    }

    /// Writes `items` between `delimiters`, separated by commas. In pretty
    /// mode each item sits on its own line one level deeper, and the closing
    /// delimiter returns to this level unless the container is empty.
    fn write_container<W, I>(
        self,
        writer: &mut W,
        (open, close): (char, char),
        items: I,
        mut write_item: impl FnMut(&mut W, I::Item) -> io::Result<()>,
    ) -> io::Result<()>
    where
        W: Write,
        I: IntoIterator,
    {
        write!(writer, "{open}")?;
        let mut empty = true;
        for item in items {
            if !empty {
                write!(writer, ",")?;
            }
            empty = false;
            self.newline(writer, self.inner())?;
            write_item(writer, item)?;
        }
        if !empty {
            self.newline(writer, self.indent)?;
        }
        write!(writer, "{close}")
    }

    fn newline<W: Write>(self, writer: &mut W, width: usize) -> io::Result<()> {
        if self.pretty {
            writeln!(writer)?;
            write!(writer, "{:width$}", "")?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render_plain(value: &Value, pretty: bool) -> String {
        colored::control::set_override(false);
        let mut out = Vec::new();
        write_colored_result(&mut out, value, pretty).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn keep_listed_keys() {
        let doc = json!({"a": 1, "b": 2, "c": 3});
        assert_eq!(with_keys(&doc, &["c", "a", "zz"]), json!({"a": 1, "c": 3}));
    }

    #[test]
    fn drop_listed_keys() {
        let doc = json!({"a": 1, "b": 2, "c": 3});
        assert_eq!(without_keys(&doc, &["b"]), json!({"a": 1, "c": 3}));
    }

    #[test]
    fn key_filters_ignore_non_mappings() {
        let doc = json!([1, 2]);
        assert_eq!(with_keys(&doc, &["a"]), doc);
        assert_eq!(without_keys(&doc, &["a"]), doc);
    }

    #[test]
    fn compact_output_is_valid_json() {
        let value = json!({"k": ["x\"y", 1.5, null, true]});
        let out = render_plain(&value, false);
        assert_eq!(out, "{\"k\":[\"x\\\"y\",1.5,null,true]}\n");
    }

    #[test]
    fn pretty_output_matches_serde() {
        let value = json!({"a": [1, {"b": "c"}], "e": {}, "f": []});
        let out = render_plain(&value, true);
        assert_eq!(
            out.trim_end(),
            serde_json::to_string_pretty(&value).unwrap()
        );
    }
}
