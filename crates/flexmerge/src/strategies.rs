//! Built-in merge strategies.
//!
//! Sequence strategies combine two arrays, mapping strategies combine two
//! objects. Every strategy takes its inputs by value and returns a fresh
//! result, so callers decide what gets cloned.
//!
//! Only [`MappingStrategy::Deep`] recurses. It walks nested mappings and hands
//! nested sequence pairs to whichever sequence strategy is configured. The
//! other mapping strategies work on the top level they are given and ignore
//! the sequence strategy.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::MergeError;
use crate::types::{Mapping, Sequence, StrategyKind};

/// A closed set of strategies addressable by name.
pub trait BuiltinStrategy: Copy + fmt::Debug + Send + Sync + 'static {
    /// Namespace the strategies live in.
    const KIND: StrategyKind;

    /// Every built-in, in declaration order.
    fn all() -> &'static [Self];

    fn as_str(&self) -> &'static str;

    fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|s| s.as_str() == name)
    }
}

/// Built-in sequence strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SequenceStrategy {
    /// Left followed by right.
    #[default]
    Append,
    /// Right followed by left.
    Prepend,
    /// Left then right, dropping repeated values.
    Unique,
    /// Right only.
    Replace,
    /// Left only.
    Keep,
}

impl SequenceStrategy {
    pub fn apply(self, left: Sequence, right: Sequence) -> Sequence {
        match self {
            SequenceStrategy::Append => append_sequences(left, right),
            SequenceStrategy::Prepend => prepend_sequences(left, right),
            SequenceStrategy::Unique => unique_sequences(left, right),
            SequenceStrategy::Replace => right,
            SequenceStrategy::Keep => left,
        }
    }
}

impl BuiltinStrategy for SequenceStrategy {
    const KIND: StrategyKind = StrategyKind::Sequence;

    fn all() -> &'static [Self] {
        &[
            SequenceStrategy::Append,
            SequenceStrategy::Prepend,
            SequenceStrategy::Unique,
            SequenceStrategy::Replace,
            SequenceStrategy::Keep,
        ]
    }

    fn as_str(&self) -> &'static str {
        match self {
            SequenceStrategy::Append => "append",
            SequenceStrategy::Prepend => "prepend",
            SequenceStrategy::Unique => "unique",
            SequenceStrategy::Replace => "replace",
            SequenceStrategy::Keep => "keep",
        }
    }
}

/// Built-in mapping strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MappingStrategy {
    /// Recursive merge, nested sequences go to the sequence strategy.
    #[default]
    Deep,
    /// One-level overwrite of left's keys by right's.
    Shallow,
    /// Right only.
    Replace,
    /// Left only.
    Keep,
}

impl MappingStrategy {
    /// Combine two mappings. `sequences` is consulted by `Deep` only.
    pub fn apply(
        self,
        left: Mapping,
        right: Mapping,
        sequences: &dyn Fn(Sequence, Sequence) -> Sequence,
    ) -> Mapping {
        match self {
            MappingStrategy::Deep => deep_merge_mappings(left, right, sequences),
            MappingStrategy::Shallow => shallow_merge_mappings(left, right),
            MappingStrategy::Replace => right,
            MappingStrategy::Keep => left,
        }
    }
}

impl BuiltinStrategy for MappingStrategy {
    const KIND: StrategyKind = StrategyKind::Mapping;

    fn all() -> &'static [Self] {
        &[
            MappingStrategy::Deep,
            MappingStrategy::Shallow,
            MappingStrategy::Replace,
            MappingStrategy::Keep,
        ]
    }

    fn as_str(&self) -> &'static str {
        match self {
            MappingStrategy::Deep => "deep",
            MappingStrategy::Shallow => "shallow",
            MappingStrategy::Replace => "replace",
            MappingStrategy::Keep => "keep",
        }
    }
}

macro_rules! impl_name_traits {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = MergeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty>::from_name(s).ok_or_else(|| MergeError::UnknownStrategy {
                    kind: <$ty>::KIND,
                    name: s.to_string(),
                })
            }
        }
    };
}

impl_name_traits!(SequenceStrategy);
impl_name_traits!(MappingStrategy);

// ──────────────────────────────────────────────────────────────
// Sequence strategies
// ──────────────────────────────────────────────────────────────

pub fn append_sequences(mut left: Sequence, right: Sequence) -> Sequence {
    left.extend(right);
    left
}

pub fn prepend_sequences(left: Sequence, mut right: Sequence) -> Sequence {
    right.extend(left);
    right
}

/// Concatenate and drop repeats, keeping the first occurrence of each value.
///
/// Numbers compare by numeric value, so `1` and `1.0` are the same element.
/// Scalars are tracked in a hash set. Sequences and mappings have no hashable
/// projection and are checked against the accepted result linearly with
/// [`values_equal`], which is quadratic in the number of such elements but
/// agrees with the hashed path.
pub fn unique_sequences(left: Sequence, right: Sequence) -> Sequence {
    let mut result: Sequence = Vec::with_capacity(left.len() + right.len());
    let mut seen: HashSet<ScalarKey> = HashSet::new();

    for item in left.into_iter().chain(right) {
        let fresh = match ScalarKey::of(&item) {
            Some(key) => seen.insert(key),
            None => !result.iter().any(|accepted| values_equal(accepted, &item)),
        };
        if fresh {
            result.push(item);
        }
    }

    result
}

/// Structural equality where numbers compare by value at any depth.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => NumberKey::of(l) == NumberKey::of(r),
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(key, a)| r.get(key).is_some_and(|b| values_equal(a, b)))
        }
        _ => left == right,
    }
}

/// Hashable projection of a scalar, consistent with [`values_equal`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ScalarKey {
    Null,
    Bool(bool),
    Number(NumberKey),
    String(String),
}

impl ScalarKey {
    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(ScalarKey::Null),
            Value::Bool(b) => Some(ScalarKey::Bool(*b)),
            Value::Number(n) => Some(ScalarKey::Number(NumberKey::of(n))),
            Value::String(s) => Some(ScalarKey::String(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

/// Integers, and floats with no fractional part, share the exact integer key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NumberKey {
    Int(i128),
    Float(u64),
}

impl NumberKey {
    fn of(n: &Number) -> Self {
        if let Some(u) = n.as_u64() {
            return NumberKey::Int(i128::from(u));
        }
        if let Some(i) = n.as_i64() {
            return NumberKey::Int(i128::from(i));
        }
        let f = n.as_f64().unwrap_or_default();
        // Every integral f64 in this range converts to i128 exactly.
        if f.fract() == 0.0 && f.abs() < 1e36 {
            return NumberKey::Int(f as i128);
        }
        NumberKey::Float(f.to_bits())
    }
}

// ──────────────────────────────────────────────────────────────
// Mapping strategies
// ──────────────────────────────────────────────────────────────

/// Recursively merge `right` into `left`.
///
/// Keys only in `right` are appended. For shared keys, two mappings recurse,
/// two sequences go to `sequences`, and any other pairing takes the right
/// value. Shared keys keep their position from `left`.
pub fn deep_merge_mappings(
    mut left: Mapping,
    right: Mapping,
    sequences: &dyn Fn(Sequence, Sequence) -> Sequence,
) -> Mapping {
    for (key, right_value) in right {
        match left.get_mut(&key) {
            Some(slot) => {
                let left_value = slot.take();
                *slot = merge_values(left_value, right_value, sequences);
            }
            None => {
                left.insert(key, right_value);
            }
        }
    }
    left
}

fn merge_values(
    left: Value,
    right: Value,
    sequences: &dyn Fn(Sequence, Sequence) -> Sequence,
) -> Value {
    match (left, right) {
        (Value::Object(l), Value::Object(r)) => {
            Value::Object(deep_merge_mappings(l, r, sequences))
        }
        (Value::Array(l), Value::Array(r)) => Value::Array(sequences(l, r)),
        (_, right) => right,
    }
}

/// Overwrite `left`'s top-level keys with `right`'s; nothing nested is merged.
pub fn shallow_merge_mappings(mut left: Mapping, right: Mapping) -> Mapping {
    for (key, value) in right {
        left.insert(key, value);
    }
    left
}
