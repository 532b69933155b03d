//! Error types for the merge engine.

use crate::types::{StrategyKind, ValueKind};

/// Errors raised by merge configuration and top-level merges.
///
/// Both variants signal caller misuse. A failing merge returns before any
/// result is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// A top-level argument was not a mapping.
    #[error("argument {index} is not a mapping: found {found}")]
    InvalidArgumentType { index: usize, found: ValueKind },

    /// A strategy name matched neither the built-in nor the custom table.
    #[error("unknown {kind} strategy: {name}")]
    UnknownStrategy { kind: StrategyKind, name: String },
}

/// Convenience alias for merge results.
pub type MergeResult<T> = Result<T, MergeError>;
