/*!
# Path Evaluation

Recursive evaluator for [`PathQuery`] objects.

Segments are consumed left to right. Literal segments navigate one mapping key
down, while macro segments fan out: every branch evaluates the remaining
segments from one key or element, and the branch results are collected, in
enumeration order, into one [`Accumulator`] owned by that fan-out point. The
first formatter named by the caller is applied once to the final result.

Traversal stops with the caller's default value as soon as a literal lookup
misses or lands on an empty mapping.
*/
use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::path::formatter::apply_first;
use crate::path::{PathQuery, Segment};

/// Ordered collection of fan-out branch results.
///
/// A branch that produced a sequence is spliced in element-wise (one level
/// only); anything else is appended as is.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Accumulator {
    items: Vec<Value>,
}

impl Accumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Adds one branch result.
    pub fn absorb(&mut self, value: Value) {
        match value {
            Value::Array(items) => self.items.extend(items),
            other => self.items.push(other),
        }
    }

    /// Number of collected values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing has been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The collected values as a sequence.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Array(self.items)
    }
}

/// Outcome of walking the remaining segments from some node.
#[derive(Debug)]
enum Walk {
    /// Traversal reached the end of the path.
    Found(Value),
    /// Traversal hit a dead end; the caller's default stands in.
    Default,
}

/// State shared by every branch of one top-level evaluation.
struct Evaluator<'a> {
    /// The document the path is evaluated against. Root segments reset here.
    root: &'a Value,
    /// Value produced by dead ends.
    default: &'a Value,
    segments: &'a [Segment],
    /// Compiled key patterns, one entry per segment (empty for non-patterns).
    matchers: Vec<Vec<Regex>>,
}

impl<'a> Evaluator<'a> {
    fn new(
        root: &'a Value,
        default: &'a Value,
        segments: &'a [Segment],
    ) -> Self {
        let matchers = segments
            .iter()
            .map(|segment| match segment {
                Segment::KeyPattern(patterns) => {
                    patterns.iter().filter_map(|p| compile_pattern(p)).collect()
                }
                _ => Vec::new(),
            })
            .collect();

        Self { root, default, segments, matchers }
    }

    /// Walks `self.segments[start..]` beginning at `node`.
    fn walk(&self, node: &'a Value, start: usize) -> Walk {
        let mut current = node;

        for (i, segment) in self.segments.iter().enumerate().skip(start) {
            let terminal = i + 1 == self.segments.len();

            match segment {
                Segment::Root => {
                    current = self.root;
                    if terminal {
                        return Walk::Found(current.clone());
                    }
                }
                Segment::Literal(key) => match descend(current, key) {
                    None => return Walk::Default,
                    Some(value) if terminal => {
                        return Walk::Found(value.clone());
                    }
                    Some(value) => current = value,
                },
                // A terminal wildcard returns the node itself, unenumerated
                Segment::KeyWildcard | Segment::IndexWildcard if terminal => {
                    return Walk::Found(current.clone());
                }
                Segment::KeyWildcard => {
                    let mut results = Accumulator::new();
                    for (key, value) in entries(current) {
                        results.absorb(self.key_branch(key, value, i + 1));
                    }
                    return Walk::Found(results.into_value());
                }
                Segment::IndexWildcard => {
                    let mut results = Accumulator::new();
                    for (idx, element) in elements(current).iter().enumerate() {
                        log::trace!("Branching on element [{idx}]");
                        let branch = self.walk(element, i + 1);
                        results.absorb(self.resolve(branch));
                    }
                    return Walk::Found(results.into_value());
                }
                Segment::KeyPattern(_) => {
                    let matchers = &self.matchers[i];
                    let mut results = Accumulator::new();
                    for (key, value) in entries(current) {
                        if matchers.iter().any(|re| re.is_match(key)) {
                            results.absorb(self.key_branch(key, value, i + 1));
                        }
                    }
                    return Walk::Found(results.into_value());
                }
            }
        }

        // Only reachable for a query without segments
        Walk::Found(self.root.clone())
    }

    /// Evaluates the segments from `start` against the value of one mapping
    /// entry, as if the key itself were the first segment.
    fn key_branch(&self, key: &str, value: &'a Value, start: usize) -> Value {
        log::trace!("Branching on key `{key}`");
        let branch = if is_empty_mapping(value) {
            Walk::Default
        } else if start >= self.segments.len() {
            Walk::Found(value.clone())
        } else {
            self.walk(value, start)
        };
        self.resolve(branch)
    }

    fn resolve(&self, walk: Walk) -> Value {
        match walk {
            Walk::Found(value) => value,
            Walk::Default => self.default.clone(),
        }
    }
}

impl PathQuery {
    /// Evaluates the query against `document`.
    ///
    /// Returns the navigated value, the collected fan-out results, or
    /// `default` when traversal hits a dead end. Only the first entry of
    /// `formatters` is considered; it is applied to found values but never to
    /// `default`.
    ///
    /// # Examples
    ///
    /// ```
    /// use jsondig::path::PathQuery;
    /// use serde_json::json;
    ///
    /// let doc = json!({"b": {"x": 1}, "c": {"x": 2}});
    /// let query: PathQuery = "{*}/x".parse().expect("Invalid path");
    /// assert_eq!(query.evaluate::<&str>(&doc, &json!(0), &[]), json!([1, 2]));
    /// assert_eq!(query.evaluate(&doc, &json!(0), &["SumFromList"]), json!(3));
    /// ```
    #[must_use]
    pub fn evaluate<S: AsRef<str>>(
        &self,
        document: &Value,
        default: &Value,
        formatters: &[S],
    ) -> Value {
        let evaluator = Evaluator::new(document, default, self.segments());

        match evaluator.walk(document, 0) {
            Walk::Found(value) => apply_first(value, formatters),
            Walk::Default => {
                log::debug!("Path `{self}` hit a dead end, using default");
                default.clone()
            }
        }
    }
}

/// Compiles one key pattern, case-insensitive and anchored at the start of
/// the key. Invalid patterns are skipped.
///
/// The pattern must compile on its own before it is wrapped, otherwise an
/// unbalanced `)` could close the anchoring group early.
fn compile_pattern(pattern: &str) -> Option<Regex> {
    let build = |source: &str| {
        RegexBuilder::new(source).case_insensitive(true).build()
    };

    build(pattern)
        .and_then(|_| build(&format!("^(?:{pattern})")))
        .inspect_err(|err| {
            log::warn!("Skipping invalid key pattern `{pattern}`: {err}");
        })
        .ok()
}

/// Looks up `key` in a mapping node. Missing keys, non-mapping nodes and empty
/// mapping values are all dead ends.
fn descend<'a>(node: &'a Value, key: &str) -> Option<&'a Value> {
    node.as_object()
        .and_then(|map| map.get(key))
        .filter(|value| !is_empty_mapping(value))
}

fn is_empty_mapping(value: &Value) -> bool {
    value.as_object().is_some_and(serde_json::Map::is_empty)
}

/// Entries of a mapping node in the mapping's own order; nothing otherwise.
fn entries(node: &Value) -> impl Iterator<Item = (&String, &Value)> {
    if !node.is_object() {
        log::debug!("Key fan-out over a non-mapping node yields nothing");
    }
    node.as_object().into_iter().flatten()
}

/// Elements of a sequence node; nothing otherwise.
fn elements(node: &Value) -> &[Value] {
    node.as_array().map_or(&[], Vec::as_slice)
}
