/*!
# Path Segments

Defines the classified form of a path expression: an ordered list of
[`Segment`]s wrapped in a [`PathQuery`].

# Examples

A path expression is parsed from a raw string:

```
use jsondig::path::{PathQuery, Segment};
let query: PathQuery = "/users/{*}/name".parse().expect("Invalid path");
assert_eq!(
    query.segments(),
    &[
        Segment::Root,
        Segment::literal("users"),
        Segment::KeyWildcard,
        Segment::literal("name"),
    ]
);
```

The [`Display`] implementation renders the canonical form of the expression:

```
use jsondig::path::PathQuery;
let query: PathQuery = "a/[*]/{R:(^id)}".parse().expect("Invalid path");
assert_eq!("a/[*]/{R:(^id)}", query.to_string());
```
*/
use serde::Serialize;
use std::{fmt::Display, str::FromStr};

use super::{PathParseError, parse_path};

/// Marker of the key wildcard macro.
pub const KEY_WILDCARD: &str = "{*}";
/// Marker of the index wildcard macro.
pub const INDEX_WILDCARD: &str = "[*]";
/// Opening marker of the key pattern macro.
pub const KEY_PATTERN: &str = "{R:(";

/// One step of a path expression.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Segment {
    /// Empty segment, e.g. the one produced by a leading "/". Resets the
    /// current node to the document root.
    Root,
    /// Plain mapping key lookup, e.g. "foo"
    Literal(String),
    /// Fan out over every key of the current mapping: "{*}"
    KeyWildcard,
    /// Fan out over every element of the current sequence: "\[*\]"
    IndexWildcard,
    /// Fan out over every key of the current mapping matching any of the
    /// patterns, e.g. "{R:(^foo)}". Matching is case-insensitive and anchored
    /// at the start of the key.
    ///
    /// An empty list means the macro had no usable pattern group.
    KeyPattern(Vec<String>),
}

impl Segment {
    /// Helper for ergonomic construction of literal segments
    pub fn literal<T: Into<String>>(key: T) -> Self {
        Self::Literal(key.into())
    }

    /// Whether the segment fans out into several branches.
    #[must_use]
    pub const fn is_macro(&self) -> bool {
        matches!(
            self,
            Self::KeyWildcard | Self::IndexWildcard | Self::KeyPattern(_)
        )
    }
}

impl Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Root => Ok(()),
            Self::Literal(key) => write!(f, "{key}"),
            Self::KeyWildcard => write!(f, "{KEY_WILDCARD}"),
            Self::IndexWildcard => write!(f, "{INDEX_WILDCARD}"),
            Self::KeyPattern(patterns) => {
                write!(f, "{{R:")?;
                if patterns.is_empty() {
                    write!(f, "()")?;
                }
                for pattern in patterns {
                    write!(f, "({pattern})")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A parsed path expression.
#[derive(Debug, PartialEq, Eq, Clone, Serialize)]
pub struct PathQuery {
    /// Segments in evaluation order. Never empty: the empty expression is a
    /// single [`Segment::Root`].
    segments: Vec<Segment>,
}

impl PathQuery {
    /// Creates a query from already classified segments. An empty list is
    /// normalized to a single [`Segment::Root`].
    #[must_use]
    pub fn new(segments: Vec<Segment>) -> Self {
        if segments.is_empty() {
            Self { segments: vec![Segment::Root] }
        } else {
            Self { segments }
        }
    }

    /// Parses a raw path expression.
    ///
    /// # Errors
    ///
    /// Returns a [`PathParseError`] if the expression cannot be tokenized.
    pub fn parse(input: &str) -> Result<Self, PathParseError> {
        parse_path(input)
    }

    /// The classified segments, in evaluation order.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Number of macro segments in the expression.
    #[must_use]
    pub fn fan_out_points(&self) -> usize {
        self.segments.iter().filter(|s| s.is_macro()).count()
    }
}

impl Display for PathQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for PathQuery {
    type Err = PathParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_path(s)
    }
}
