/*!
# Result Formatters

Named post-processing transforms applied to the final result of a query.

Formatters only act on sequences; any other value is returned unchanged. A
formatter that cannot handle the elements it is given (e.g. comparing a string
with a number) also returns its input unchanged, so formatting never aborts a
query.

```
use jsondig::path::Formatter;
use serde_json::json;

assert_eq!(Formatter::SumFromList.apply(json!([1, 2, 3])), json!(6));
assert_eq!(Formatter::Highest.apply(json!(["a", 1])), json!(["a", 1]));
```
*/
use serde_json::{Number, Value};
use std::{cmp::Ordering, collections::HashSet, fmt};

/// The registered formatters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formatter {
    /// Maximum element. An empty sequence stays empty.
    Highest,
    /// Distinct elements, first occurrence kept.
    Unique,
    /// Elements that are non-null and strictly greater than zero.
    WithoutZerosAndNulls,
    /// Arithmetic mean, always a float.
    AverageFromList,
    /// Arithmetic sum. Integer if every element is an integer.
    SumFromList,
}

impl Formatter {
    /// Name to formatter lookup table.
    pub const REGISTRY: [(&'static str, Self); 5] = [
        ("Highest", Self::Highest),
        ("Unique", Self::Unique),
        ("WithoutZerosAndNulls", Self::WithoutZerosAndNulls),
        ("AverageFromList", Self::AverageFromList),
        ("SumFromList", Self::SumFromList),
    ];

    /// Looks up a formatter by its exact (case-sensitive) name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::REGISTRY
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, formatter)| *formatter)
    }

    /// The registered name of the formatter.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Highest => "Highest",
            Self::Unique => "Unique",
            Self::WithoutZerosAndNulls => "WithoutZerosAndNulls",
            Self::AverageFromList => "AverageFromList",
            Self::SumFromList => "SumFromList",
        }
    }

    /// Applies the formatter. Non-sequences, and sequences the formatter
    /// fails on, are returned unchanged.
    #[must_use]
    pub fn apply(self, value: Value) -> Value {
        let Value::Array(items) = &value else {
            return value;
        };

        let result = match self {
            Self::Highest => highest(items),
            Self::Unique => unique(items),
            Self::WithoutZerosAndNulls => without_zeros_and_nulls(items),
            Self::AverageFromList => average(items),
            Self::SumFromList => sum(items).and_then(Num::into_value),
        };

        match result {
            Ok(formatted) => formatted,
            Err(err) => {
                log::warn!("{} left result unchanged: {err}", self.name());
                value
            }
        }
    }
}

impl fmt::Display for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Applies the formatter named by the *first* entry of `names`. Later entries
/// are never consulted, and an unregistered first name leaves the value as is.
#[must_use]
pub fn apply_first<S: AsRef<str>>(value: Value, names: &[S]) -> Value {
    let Some(first) = names.first() else {
        return value;
    };
    if names.len() > 1 {
        log::debug!(
            "Only the first of {} formatters is applied: {}",
            names.len(),
            first.as_ref()
        );
    }
    match Formatter::from_name(first.as_ref()) {
        Some(formatter) => formatter.apply(value),
        None => {
            log::debug!("Formatter `{}` is not registered", first.as_ref());
            value
        }
    }
}

/// Why a formatter gave up on its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FormatError {
    /// Two elements have no ordering between them.
    Incomparable,
    /// An element cannot be de-duplicated (sequence or mapping).
    Unhashable,
    /// An element is not a number.
    NonNumeric,
    /// Mean of zero elements.
    EmptyList,
    /// The numeric result is not representable in JSON.
    NonFinite,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incomparable => write!(f, "elements cannot be compared"),
            Self::Unhashable => write!(f, "elements cannot be de-duplicated"),
            Self::NonNumeric => write!(f, "non-numeric element"),
            Self::EmptyList => write!(f, "empty sequence"),
            Self::NonFinite => write!(f, "result is not a finite number"),
        }
    }
}

/// Numeric view of a JSON scalar. Booleans count as 0 and 1.
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i128),
    Float(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Self::Int(i128::from(*b))),
            Value::Number(n) => n
                .as_i64()
                .map(i128::from)
                .or_else(|| n.as_u64().map(i128::from))
                .map(Self::Int)
                .or_else(|| n.as_f64().map(Self::Float)),
            _ => None,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    const fn as_f64(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    fn compare(self, other: Self) -> Result<Ordering, FormatError> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Ok(a.cmp(&b)),
            (a, b) => a
                .as_f64()
                .partial_cmp(&b.as_f64())
                .ok_or(FormatError::Incomparable),
        }
    }

    fn plus(self, other: Self) -> Self {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => a.checked_add(b).map_or_else(
                || Self::Float(self.as_f64() + other.as_f64()),
                Self::Int,
            ),
            (a, b) => Self::Float(a.as_f64() + b.as_f64()),
        }
    }

    fn into_value(self) -> Result<Value, FormatError> {
        match self {
            Self::Int(i) => {
                if let Ok(small) = i64::try_from(i) {
                    Ok(Value::from(small))
                } else if let Ok(big) = u64::try_from(i) {
                    Ok(Value::from(big))
                } else {
                    Self::Float(self.as_f64()).into_value()
                }
            }
            Self::Float(f) => Number::from_f64(f)
                .map(Value::Number)
                .ok_or(FormatError::NonFinite),
        }
    }
}

/// Loose equality: numbers (and booleans) compare by numeric value.
fn loosely_equal(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (Num::of(a), Num::of(b)) {
        return matches!(x.compare(y), Ok(Ordering::Equal));
    }
    match (a, b) {
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len()
                && xs.iter().zip(ys).all(|(x, y)| loosely_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs.iter().all(|(k, x)| {
                    ys.get(k).is_some_and(|y| loosely_equal(x, y))
                })
        }
        _ => a == b,
    }
}

/// Ordering between numbers, between strings, and lexicographically between
/// sequences. Anything else is incomparable.
fn compare(a: &Value, b: &Value) -> Result<Ordering, FormatError> {
    if let (Some(x), Some(y)) = (Num::of(a), Num::of(b)) {
        return x.compare(y);
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        (Value::Array(xs), Value::Array(ys)) => {
            for (x, y) in xs.iter().zip(ys) {
                if !loosely_equal(x, y) {
                    return compare(x, y);
                }
            }
            Ok(xs.len().cmp(&ys.len()))
        }
        _ => Err(FormatError::Incomparable),
    }
}

fn highest(items: &[Value]) -> Result<Value, FormatError> {
    let Some((first, rest)) = items.split_first() else {
        return Ok(Value::Array(vec![]));
    };
    let mut best = first;
    for item in rest {
        if compare(item, best)? == Ordering::Greater {
            best = item;
        }
    }
    Ok(best.clone())
}

/// Hashable identity of a scalar; integral floats collapse onto integers.
#[derive(Debug, PartialEq, Eq, Hash)]
enum UniqueKey<'a> {
    Null,
    Int(i128),
    Float(u64),
    Str(&'a str),
}

impl<'a> UniqueKey<'a> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn of(value: &'a Value) -> Result<Self, FormatError> {
        match value {
            Value::Null => Ok(Self::Null),
            Value::String(s) => Ok(Self::Str(s)),
            Value::Array(_) | Value::Object(_) => Err(FormatError::Unhashable),
            Value::Bool(_) | Value::Number(_) => {
                match Num::of(value).ok_or(FormatError::Unhashable)? {
                    Num::Int(i) => Ok(Self::Int(i)),
                    Num::Float(f)
                        if f.fract() == 0.0 && f.abs() < i128::MAX as f64 =>
                    {
                        Ok(Self::Int(f as i128))
                    }
                    Num::Float(f) => Ok(Self::Float(f.to_bits())),
                }
            }
        }
    }
}

fn unique(items: &[Value]) -> Result<Value, FormatError> {
    let mut seen = HashSet::with_capacity(items.len());
    let mut distinct = Vec::with_capacity(items.len());
    for item in items {
        if seen.insert(UniqueKey::of(item)?) {
            distinct.push(item.clone());
        }
    }
    Ok(Value::Array(distinct))
}

fn without_zeros_and_nulls(items: &[Value]) -> Result<Value, FormatError> {
    let mut kept = Vec::with_capacity(items.len());
    for item in items {
        if item.is_null() {
            continue;
        }
        let n = Num::of(item).ok_or(FormatError::Incomparable)?;
        if n.compare(Num::Int(0))? == Ordering::Greater {
            kept.push(item.clone());
        }
    }
    Ok(Value::Array(kept))
}

fn sum(items: &[Value]) -> Result<Num, FormatError> {
    items.iter().try_fold(Num::Int(0), |total, item| {
        Num::of(item).map(|n| total.plus(n)).ok_or(FormatError::NonNumeric)
    })
}

#[allow(clippy::cast_precision_loss)]
fn average(items: &[Value]) -> Result<Value, FormatError> {
    if items.is_empty() {
        return Err(FormatError::EmptyList);
    }
    let mean = sum(items)?.as_f64() / items.len() as f64;
    Num::Float(mean).into_value()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registry_names_round_trip() {
        for (name, formatter) in Formatter::REGISTRY {
            assert_eq!(Formatter::from_name(name), Some(formatter));
            assert_eq!(formatter.name(), name);
        }
        assert_eq!(Formatter::from_name("highest"), None);
    }

    #[test]
    fn non_sequences_pass_through() {
        for (_, formatter) in Formatter::REGISTRY {
            assert_eq!(formatter.apply(json!(7)), json!(7));
            assert_eq!(formatter.apply(json!({"a": 1})), json!({"a": 1}));
            assert_eq!(formatter.apply(json!("text")), json!("text"));
        }
    }

    #[test]
    fn highest_numbers() {
        assert_eq!(Formatter::Highest.apply(json!([3, 9.5, 2])), json!(9.5));
        assert_eq!(Formatter::Highest.apply(json!([-1, -7])), json!(-1));
    }

    #[test]
    fn highest_strings() {
        assert_eq!(
            Formatter::Highest.apply(json!(["apple", "pear", "fig"])),
            json!("pear")
        );
    }

    #[test]
    fn highest_empty_stays_empty() {
        assert_eq!(Formatter::Highest.apply(json!([])), json!([]));
    }

    #[test]
    fn highest_mixed_types_unchanged() {
        let mixed = json!([1, "two", null]);
        assert_eq!(Formatter::Highest.apply(mixed.clone()), mixed);
    }

    #[test]
    fn highest_nested_sequences() {
        assert_eq!(
            Formatter::Highest.apply(json!([[1, 2], [1, 3], [0, 9]])),
            json!([1, 3])
        );
    }

    #[test]
    fn unique_keeps_first_occurrence() {
        assert_eq!(
            Formatter::Unique.apply(json!([3, 3, 5, "a", "a", null, null])),
            json!([3, 5, "a", null])
        );
    }

    #[test]
    fn unique_integral_float_equals_integer() {
        assert_eq!(
            Formatter::Unique.apply(json!([1, 1.0, 2.5])),
            json!([1, 2.5])
        );
    }

    #[test]
    fn unique_unhashable_unchanged() {
        let nested = json!([[1], [1]]);
        assert_eq!(Formatter::Unique.apply(nested.clone()), nested);
    }

    #[test]
    fn without_zeros_and_nulls() {
        assert_eq!(
            Formatter::WithoutZerosAndNulls.apply(json!([0, 1, null, -2, 3.5])),
            json!([1, 3.5])
        );
    }

    #[test]
    fn without_zeros_and_nulls_strings_unchanged() {
        let strings = json!(["a", 1]);
        assert_eq!(
            Formatter::WithoutZerosAndNulls.apply(strings.clone()),
            strings
        );
    }

    #[test]
    fn sum_integers_stays_integer() {
        assert_eq!(Formatter::SumFromList.apply(json!([1, 2, 3])), json!(6));
    }

    #[test]
    fn sum_with_float() {
        assert_eq!(Formatter::SumFromList.apply(json!([1, 0.5])), json!(1.5));
    }

    #[test]
    fn sum_empty_is_zero() {
        assert_eq!(Formatter::SumFromList.apply(json!([])), json!(0));
    }

    #[test]
    fn sum_non_numeric_unchanged() {
        let words = json!(["a", "b"]);
        assert_eq!(Formatter::SumFromList.apply(words.clone()), words);
    }

    #[test]
    fn average_is_float() {
        assert_eq!(
            Formatter::AverageFromList.apply(json!([1, 2, 3])),
            json!(2.0)
        );
    }

    #[test]
    fn average_empty_unchanged() {
        assert_eq!(Formatter::AverageFromList.apply(json!([])), json!([]));
    }

    #[test]
    fn first_formatter_wins() {
        let value = json!([1, 2, 3]);
        assert_eq!(
            apply_first(value.clone(), &["SumFromList", "Highest"]),
            json!(6)
        );
        assert_eq!(
            apply_first(value.clone(), &["Highest", "SumFromList"]),
            json!(3)
        );
    }

    #[test]
    fn unknown_first_formatter_passes_through() {
        let value = json!([1, 2, 3]);
        assert_eq!(apply_first(value.clone(), &["Nope", "SumFromList"]), value);
        assert_eq!(apply_first::<&str>(value.clone(), &[]), value);
    }
}
