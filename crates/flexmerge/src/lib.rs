//! # flexmerge
//!
//! Structural merging of nested JSON-like documents.
//!
//! Any number of mappings are folded left to right into one result. Two
//! pluggable strategies decide how conflicts are combined:
//!
//! - **Sequence strategy**: `append` (default), `prepend`, `unique`,
//!   `replace`, `keep`
//! - **Mapping strategy**: `deep` (default), `shallow`, `replace`, `keep`
//!
//! Only `deep` recurses: nested mappings are merged key by key, nested
//! sequences go to the sequence strategy, and any other pairing (including a
//! type mismatch) takes the right-hand value. Custom strategies can be
//! registered by name on a [`Merger`] or supplied directly as functions.
//!
//! Inputs are never modified; the result shares no data with them.
//!
//! ## Example
//!
//! ```rust
//! use flexmerge::Merger;
//! use serde_json::json;
//!
//! let merger = Merger::new().sequences("unique").unwrap();
//! let merged = merger
//!     .merge(&[
//!         json!({"tags": ["a", "b"], "db": {"host": "localhost"}}),
//!         json!({"tags": ["b", "c"], "db": {"port": 5432}}),
//!     ])
//!     .unwrap();
//!
//! assert_eq!(
//!     serde_json::Value::Object(merged),
//!     json!({"tags": ["a", "b", "c"], "db": {"host": "localhost", "port": 5432}})
//! );
//! ```

pub mod config;
pub mod error;
pub mod merger;
pub mod registry;
pub mod strategies;
pub mod types;

// Re-export primary public API
pub use config::MergeSettings;
pub use error::{MergeError, MergeResult};
pub use merger::{merge, merge_shallow, merge_unique, merge_with, Merger};
pub use registry::{MappingChoice, SequenceChoice, StrategyChoice, StrategyRegistry};
pub use strategies::{BuiltinStrategy, MappingStrategy, SequenceStrategy};
pub use types::{Mapping, MappingFn, Sequence, SequenceFn, StrategyKind, ValueKind};
