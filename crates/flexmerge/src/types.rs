//! Core value types for the merge engine.
//!
//! Documents are modelled as `serde_json::Value` with three structural kinds:
//! - **Mapping**: insertion-ordered string keys to values (`Value::Object`)
//! - **Sequence**: ordered values, duplicates allowed (`Value::Array`)
//! - **Scalar**: everything else, only ever replaced wholesale

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// An insertion-ordered mapping from string keys to values.
pub type Mapping = serde_json::Map<String, Value>;

/// An ordered list of values.
pub type Sequence = Vec<Value>;

/// A caller-supplied sequence combiner.
pub type SequenceFn = Arc<dyn Fn(Sequence, Sequence) -> Sequence + Send + Sync>;

/// A caller-supplied mapping combiner.
pub type MappingFn = Arc<dyn Fn(Mapping, Mapping) -> Mapping + Send + Sync>;

/// The shape of a value as seen by the merge engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Boolean,
    Number,
    String,
    Sequence,
    Mapping,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Sequence,
            Value::Object(_) => ValueKind::Mapping,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two independent strategy namespaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Sequence,
    Mapping,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Sequence => "sequence",
            StrategyKind::Mapping => "mapping",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
