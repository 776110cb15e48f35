/*!
# Path Parser

Parser for converting raw path expressions into [`PathQuery`] objects.

## Examples

This module exposes the public API method [`parse_path`], which splits a path
expression on `/` and classifies every segment:

```rust
use jsondig::path::{parser, Segment};
let query = parser::parse_path("/servers/{R:(^web)(^db)}/ip")
    .expect("Invalid path");
assert_eq!(
    query.segments()[2],
    Segment::KeyPattern(vec!["^web".to_string(), "^db".to_string()])
);
```

Macro detection is a prefix test, so trailing text after a wildcard marker is
tolerated:

```rust
use jsondig::path::{parser, Segment};
let query = parser::parse_path("[*]ignored/name").expect("Invalid path");
assert_eq!(query.segments()[0], Segment::IndexWildcard);
```

## See Also

- [`PathQuery`]: The parsed form of a path expression.
- [`PathParseError`]: The error type for failed parses.
*/

use pest::Parser;
use pest_derive::Parser;
use regex::Regex;
use std::error::Error;
use std::fmt;
use std::sync::LazyLock;

use crate::path::{PathQuery, Segment};

/// Parser for turning raw path expressions into [`PathQuery`] objects.
#[derive(Parser)]
#[grammar = "path/grammar/path.pest"]
pub struct PathExpressionParser;

/// Extracts the pattern group of a key pattern macro. Greedy, so for
/// "{R:(a)(b)}" the group is "a)(b".
static PATTERN_GROUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\{R:\((.+)?\)\}").expect("hardcoded pattern group regex")
});

/// Represents errors that can occur while parsing a path expression.
#[derive(Debug, Clone)]
pub enum PathParseError {
    /// Unexpected token encountered during parsing.
    UnexpectedToken(String),
    /// The input ended unexpectedly.
    UnexpectedEndOfInput,
}

impl Error for PathParseError {}

impl fmt::Display for PathParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken(token) => {
                write!(f, "Unexpected token: {token}")
            }
            Self::UnexpectedEndOfInput => {
                write!(f, "Unexpected end of input")
            }
        }
    }
}

/// Parse a raw path expression into a [`PathQuery`].
///
/// # Errors
///
/// Returns a [`PathParseError`] describing how the parsing failed.
pub fn parse_path(input: &str) -> Result<PathQuery, PathParseError> {
    let mut pairs = PathExpressionParser::parse(Rule::path, input)
        .map_err(|e| PathParseError::UnexpectedToken(e.to_string()))?;

    let path = pairs.next().ok_or(PathParseError::UnexpectedEndOfInput)?;

    let segments = path
        .into_inner()
        .filter(|pair| pair.as_rule() != Rule::EOI)
        .map(parse_segment)
        .collect::<Result<Vec<Segment>, _>>()?;

    let query = PathQuery::new(segments);
    log::debug!("Parsed path `{input}` into {:?}", query.segments());

    Ok(query)
}

/// Classify a single segment pair.
fn parse_segment(
    pair: pest::iterators::Pair<Rule>,
) -> Result<Segment, PathParseError> {
    match pair.as_rule() {
        Rule::literal => {
            let key = pair.as_str();
            if key.is_empty() {
                Ok(Segment::Root)
            } else {
                Ok(Segment::literal(key))
            }
        }
        Rule::key_wildcard => Ok(Segment::KeyWildcard),
        Rule::index_wildcard => Ok(Segment::IndexWildcard),
        Rule::key_pattern => {
            Ok(Segment::KeyPattern(extract_patterns(pair.as_str())))
        }
        rule => Err(PathParseError::UnexpectedToken(format!(
            "Expected segment, got {rule:?}"
        ))),
    }
}

/// Pull the pattern alternatives out of a key pattern segment. A segment with
/// no parse-able group yields no patterns.
fn extract_patterns(segment: &str) -> Vec<String> {
    PATTERN_GROUP
        .captures(segment)
        .and_then(|caps| caps.get(1))
        .map(|group| split_alternatives(group.as_str()))
        .unwrap_or_default()
}

/// Split a captured group such as "^a)(^b" at every `)(` whose `)` closes
/// nothing opened inside the group. Balanced inner groups are left alone.
fn split_alternatives(group: &str) -> Vec<String> {
    let mut alternatives = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut escaped = false;
    let mut chars = group.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '(' => depth += 1,
            ')' if depth > 0 => depth -= 1,
            ')' => {
                if let Some(&(j, '(')) = chars.peek() {
                    alternatives.push(&group[start..i]);
                    chars.next();
                    start = j + 1;
                }
            }
            _ => {}
        }
    }
    alternatives.push(&group[start..]);

    alternatives
        .into_iter()
        .filter(|alt| !alt.is_empty())
        .map(str::to_string)
        .collect()
}
