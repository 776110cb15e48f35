//! # Path Query Language
//!
//! A small slash-delimited path language for pulling values out of
//! JSON-shaped documents, with support for:
//! - Plain key lookups, e.g. "servers/web-1/ip"
//! - Resetting to the document root with an empty segment, e.g. "/version"
//! - Fanning out over all keys `{*}`, all elements `[*]`, or the keys matching
//!   a pattern `{R:(^web)}`
//! - A named formatter applied to the collected result, e.g. "SumFromList"

pub mod engine;
pub mod formatter;
pub mod parser;
pub mod segment;

use serde_json::Value;

/// Evaluates a raw path expression against `document` in one call.
///
/// Equivalent to parsing the expression into a [`PathQuery`] and calling
/// [`PathQuery::evaluate`].
///
/// # Examples
///
/// ```
/// use jsondig::path::evaluate;
/// use serde_json::json;
///
/// let doc = json!([{"y": 5}, {"y": 9}]);
/// let ys = evaluate(&doc, "[*]/y", &json!(0), &["Highest"])
///     .expect("Invalid path");
/// assert_eq!(ys, json!(9));
/// ```
///
/// # Errors
///
/// Returns a [`PathParseError`] if the expression cannot be parsed.
pub fn evaluate<S: AsRef<str>>(
    document: &Value,
    path: &str,
    default: &Value,
    formatters: &[S],
) -> Result<Value, PathParseError> {
    let query = PathQuery::parse(path)?;
    Ok(query.evaluate(document, default, formatters))
}

// Re-exports
pub use engine::*;
pub use formatter::*;
pub use parser::*;
pub use segment::*;
