//! The merge configuration and the N-ary fold.
//!
//! A [`Merger`] holds the active sequence and mapping strategies plus the
//! custom strategies registered on it. [`Merger::merge`] validates that every
//! argument is a mapping, clones the first one as the accumulator, and folds
//! the rest into it left to right with the mapping strategy.

use std::fmt;

use serde_json::Value;

use crate::error::{MergeError, MergeResult};
use crate::registry::{
    MappingChoice, MappingRegistry, SequenceChoice, SequenceRegistry, Selection,
};
use crate::strategies::{MappingStrategy, SequenceStrategy};
use crate::types::{Mapping, MappingFn, Sequence, SequenceFn, ValueKind};

/// A reusable merge configuration.
///
/// Defaults to the `append` sequence strategy and the `deep` mapping strategy.
/// Cloning copies the active selection and the custom tables; custom
/// functions are shared between the copies, not duplicated.
#[derive(Clone, Debug)]
pub struct Merger {
    sequence_strategy: Selection<SequenceStrategy, SequenceFn>,
    mapping_strategy: Selection<MappingStrategy, MappingFn>,
    sequence_registry: SequenceRegistry,
    mapping_registry: MappingRegistry,
}

impl Merger {
    pub fn new() -> Self {
        Self {
            sequence_strategy: Selection::builtin(SequenceStrategy::default()),
            mapping_strategy: Selection::builtin(MappingStrategy::default()),
            sequence_registry: SequenceRegistry::new(),
            mapping_registry: MappingRegistry::new(),
        }
    }

    /// Builder form of [`set_sequence_strategy`](Self::set_sequence_strategy).
    pub fn sequences(mut self, choice: impl Into<SequenceChoice>) -> MergeResult<Self> {
        self.set_sequence_strategy(choice)?;
        Ok(self)
    }

    /// Builder form of [`set_mapping_strategy`](Self::set_mapping_strategy).
    pub fn mappings(mut self, choice: impl Into<MappingChoice>) -> MergeResult<Self> {
        self.set_mapping_strategy(choice)?;
        Ok(self)
    }

    /// Select the sequence strategy by name, built-in, or function.
    ///
    /// Names are resolved now, so re-registering a custom name later does not
    /// change this selection.
    pub fn set_sequence_strategy(
        &mut self,
        choice: impl Into<SequenceChoice>,
    ) -> MergeResult<&mut Self> {
        self.sequence_strategy = self.sequence_registry.resolve(choice.into())?;
        Ok(self)
    }

    /// Select the mapping strategy by name, built-in, or function.
    pub fn set_mapping_strategy(
        &mut self,
        choice: impl Into<MappingChoice>,
    ) -> MergeResult<&mut Self> {
        self.mapping_strategy = self.mapping_registry.resolve(choice.into())?;
        Ok(self)
    }

    pub fn register_sequence_strategy<G>(&mut self, name: impl Into<String>, f: G) -> &mut Self
    where
        G: Fn(Sequence, Sequence) -> Sequence + Send + Sync + 'static,
    {
        self.sequence_registry.register(name, std::sync::Arc::new(f));
        self
    }

    pub fn register_mapping_strategy<G>(&mut self, name: impl Into<String>, f: G) -> &mut Self
    where
        G: Fn(Mapping, Mapping) -> Mapping + Send + Sync + 'static,
    {
        self.mapping_registry.register(name, std::sync::Arc::new(f));
        self
    }

    pub fn sequence_registry(&self) -> &SequenceRegistry {
        &self.sequence_registry
    }

    /// Name of the active sequence strategy, `None` if supplied directly.
    pub fn sequence_strategy_name(&self) -> Option<&str> {
        self.sequence_strategy.name()
    }

    /// Name of the active mapping strategy, `None` if supplied directly.
    pub fn mapping_strategy_name(&self) -> Option<&str> {
        self.mapping_strategy.name()
    }

    /// Merge any number of values, each of which must be a mapping.
    ///
    /// All arguments are checked before any merging happens. No input is
    /// modified and the result shares nothing with the inputs.
    pub fn merge(&self, values: &[Value]) -> MergeResult<Mapping> {
        let mut mappings = Vec::with_capacity(values.len());
        for (index, value) in values.iter().enumerate() {
            match value {
                Value::Object(mapping) => mappings.push(mapping),
                other => {
                    return Err(MergeError::InvalidArgumentType {
                        index,
                        found: ValueKind::of(other),
                    })
                }
            }
        }
        Ok(self.merge_mappings(mappings))
    }

    /// Merge mappings the caller already holds as [`Mapping`]s.
    pub fn merge_mappings<'a, I>(&self, mappings: I) -> Mapping
    where
        I: IntoIterator<Item = &'a Mapping>,
    {
        let mut iter = mappings.into_iter();
        let Some(first) = iter.next() else {
            return Mapping::new();
        };

        let mut result = first.clone();
        let mut count = 1usize;
        for next in iter {
            result = self.merge_pair(result, next.clone());
            count += 1;
        }

        tracing::debug!(
            count,
            sequences = self.sequence_strategy.display_name(),
            mappings = self.mapping_strategy.display_name(),
            "merged mappings"
        );
        result
    }

    /// Combine two mappings with the active strategies.
    pub fn merge_pair(&self, left: Mapping, right: Mapping) -> Mapping {
        let sequences = |l: Sequence, r: Sequence| self.sequence_strategy.apply(l, r);
        self.mapping_strategy.apply(left, right, &sequences)
    }

    /// Human-readable summary of the active strategies.
    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl Default for Merger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Merger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Merger(sequences='{}', mappings='{}')",
            self.sequence_strategy.display_name(),
            self.mapping_strategy.display_name()
        )
    }
}

/// Merge with the default `append` / `deep` strategies.
pub fn merge(values: &[Value]) -> MergeResult<Mapping> {
    Merger::new().merge(values)
}

/// Merge with built-in strategies chosen by name.
pub fn merge_with(values: &[Value], sequences: &str, mappings: &str) -> MergeResult<Mapping> {
    Merger::new()
        .sequences(sequences)?
        .mappings(mappings)?
        .merge(values)
}

/// Merge with `unique` sequences and `deep` mappings.
pub fn merge_unique(values: &[Value]) -> MergeResult<Mapping> {
    Merger::new().sequences(SequenceStrategy::Unique)?.merge(values)
}

/// Merge with `shallow` mappings.
pub fn merge_shallow(values: &[Value]) -> MergeResult<Mapping> {
    Merger::new().mappings(MappingStrategy::Shallow)?.merge(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Mapping {
        match value {
            Value::Object(m) => m,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_defaults() {
        let merger = Merger::new();
        assert_eq!(merger.sequence_strategy_name(), Some("append"));
        assert_eq!(merger.mapping_strategy_name(), Some("deep"));
        assert_eq!(merger.describe(), "Merger(sequences='append', mappings='deep')");
    }

    #[test]
    fn test_merge_zero() {
        assert_eq!(Merger::new().merge(&[]).unwrap(), Mapping::new());
    }

    #[test]
    fn test_merge_single_is_copy() {
        let input = json!({"a": 1, "b": [1, 2], "c": {"d": true}});
        let result = Merger::new().merge(&[input.clone()]).unwrap();
        assert_eq!(Value::Object(result), input);
    }

    #[test]
    fn test_scalar_and_sequence_merge() {
        let result = Merger::new()
            .merge(&[json!({"a": 1, "list": [1, 2]}), json!({"a": 2, "list": [3, 4]})])
            .unwrap();
        assert_eq!(Value::Object(result), json!({"a": 2, "list": [1, 2, 3, 4]}));
    }

    #[test]
    fn test_unique_sequences() {
        let merger = Merger::new().sequences("unique").unwrap();
        let result = merger
            .merge(&[json!({"list": [1, 2, 3]}), json!({"list": [2, 3, 4]})])
            .unwrap();
        assert_eq!(Value::Object(result), json!({"list": [1, 2, 3, 4]}));
    }

    #[test]
    fn test_prepend_and_replace_sequences() {
        let inputs = [json!({"l": [1, 2]}), json!({"l": [3]})];

        let result = Merger::new().sequences("prepend").unwrap().merge(&inputs).unwrap();
        assert_eq!(result["l"], json!([3, 1, 2]));

        let result = Merger::new().sequences("replace").unwrap().merge(&inputs).unwrap();
        assert_eq!(result["l"], json!([3]));

        let result = Merger::new().sequences("keep").unwrap().merge(&inputs).unwrap();
        assert_eq!(result["l"], json!([1, 2]));
    }

    #[test]
    fn test_shallow_mappings() {
        let merger = Merger::new().mappings("shallow").unwrap();
        let result = merger
            .merge(&[json!({"nested": {"a": 1}}), json!({"nested": {"b": 2}})])
            .unwrap();
        assert_eq!(Value::Object(result), json!({"nested": {"b": 2}}));
    }

    #[test]
    fn test_replace_and_keep_mappings() {
        let inputs = [json!({"a": 1}), json!({"b": 2}), json!({"c": 3})];

        let result = Merger::new().mappings("replace").unwrap().merge(&inputs).unwrap();
        assert_eq!(Value::Object(result), json!({"c": 3}));

        let result = Merger::new().mappings("keep").unwrap().merge(&inputs).unwrap();
        assert_eq!(Value::Object(result), json!({"a": 1}));
    }

    #[test]
    fn test_multiple_left_to_right() {
        let result = Merger::new()
            .merge(&[json!({"a": 1}), json!({"b": 2}), json!({"c": 3}), json!({"a": 4})])
            .unwrap();
        assert_eq!(Value::Object(result), json!({"a": 4, "b": 2, "c": 3}));
    }

    #[test]
    fn test_unknown_strategy() {
        let err = Merger::new().sequences("bogus").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("sequence"));
        assert!(msg.contains("bogus"));

        let err = Merger::new().mappings("bogus").unwrap_err();
        assert!(err.to_string().contains("mapping"));
    }

    #[test]
    fn test_failed_setter_keeps_previous_selection() {
        let mut merger = Merger::new();
        merger.set_sequence_strategy("unique").unwrap();
        assert!(merger.set_sequence_strategy("bogus").is_err());
        assert_eq!(merger.sequence_strategy_name(), Some("unique"));
    }

    #[test]
    fn test_invalid_argument() {
        let err = Merger::new().merge(&[json!("not a mapping")]).unwrap_err();
        assert_eq!(
            err,
            MergeError::InvalidArgumentType {
                index: 0,
                found: ValueKind::String
            }
        );
        assert!(err.to_string().contains("argument 0"));

        let err = Merger::new().merge(&[json!({"a": 1}), json!(null)]).unwrap_err();
        assert!(matches!(err, MergeError::InvalidArgumentType { index: 1, .. }));
    }

    #[test]
    fn test_validation_reports_first_bad_argument() {
        let err = Merger::new()
            .merge(&[json!({}), json!([1]), json!(3)])
            .unwrap_err();
        assert_eq!(
            err,
            MergeError::InvalidArgumentType {
                index: 1,
                found: ValueKind::Sequence
            }
        );
    }

    #[test]
    fn test_custom_strategies_by_name() {
        let mut merger = Merger::new();
        merger.register_sequence_strategy("sorted_unique", |l: Sequence, r: Sequence| {
            let mut numbers: Vec<i64> = l.iter().chain(&r).filter_map(Value::as_i64).collect();
            numbers.sort_unstable();
            numbers.dedup();
            numbers.into_iter().map(Value::from).collect()
        });
        merger.register_mapping_strategy("conditional", |l: Mapping, r: Mapping| {
            let mergeable = |m: &Mapping| m.get("mergeable") == Some(&Value::Bool(true));
            if mergeable(&l) && mergeable(&r) {
                let mut out = l;
                out.extend(r);
                out
            } else {
                l
            }
        });

        merger.set_sequence_strategy("sorted_unique").unwrap();
        let result = merger
            .merge(&[json!({"n": [3, 1, 2]}), json!({"n": [2, 4, 1]})])
            .unwrap();
        assert_eq!(result["n"], json!([1, 2, 3, 4]));

        merger.set_mapping_strategy("conditional").unwrap();
        let result = merger
            .merge(&[
                json!({"mergeable": true, "a": 1}),
                json!({"mergeable": true, "b": 2}),
            ])
            .unwrap();
        assert_eq!(Value::Object(result), json!({"mergeable": true, "a": 1, "b": 2}));

        let result = merger
            .merge(&[json!({"mergeable": true, "a": 1}), json!({"mergeable": false, "c": 3})])
            .unwrap();
        assert_eq!(Value::Object(result), json!({"mergeable": true, "a": 1}));
        assert_eq!(
            merger.describe(),
            "Merger(sequences='sorted_unique', mappings='conditional')"
        );
    }

    #[test]
    fn test_custom_mapping_strategy_does_not_receive_sequence_strategy() {
        let merger = Merger::new()
            .mappings(MappingChoice::direct(|l, _r| l))
            .unwrap();
        let result = merger
            .merge(&[json!({"l": [1]}), json!({"l": [2]})])
            .unwrap();
        assert_eq!(result["l"], json!([1]));
        assert_eq!(merger.describe(), "Merger(sequences='append', mappings='custom')");
    }

    #[test]
    fn test_direct_sequence_function() {
        let merger = Merger::new()
            .sequences(SequenceChoice::direct(|_l, r| r))
            .unwrap();
        assert_eq!(merger.sequence_strategy_name(), None);
        let result = merger
            .merge(&[json!({"x": {"l": [1]}}), json!({"x": {"l": [2]}})])
            .unwrap();
        assert_eq!(Value::Object(result), json!({"x": {"l": [2]}}));
    }

    #[test]
    fn test_clone_carries_selection_and_registry() {
        let mut merger = Merger::new();
        merger.register_sequence_strategy("second", |_l: Sequence, r: Sequence| r);
        merger.set_sequence_strategy("second").unwrap();
        merger.set_mapping_strategy(MappingStrategy::Deep).unwrap();

        let copy = merger.clone();
        assert_eq!(copy.describe(), merger.describe());
        assert!(copy.sequence_registry().contains("second"));

        // The copy's table is independent of later registrations.
        merger.register_sequence_strategy("third", |l: Sequence, _r: Sequence| l);
        assert!(!copy.sequence_registry().contains("third"));

        let result = copy.merge(&[json!({"l": [1]}), json!({"l": [2]})]).unwrap();
        assert_eq!(result["l"], json!([2]));
    }

    #[test]
    fn test_clone_selection_is_independent() {
        let mut merger = Merger::new();
        let mut copy = merger.clone();

        copy.set_sequence_strategy("unique").unwrap();
        assert_eq!(merger.sequence_strategy_name(), Some("append"));
        assert_eq!(copy.sequence_strategy_name(), Some("unique"));

        merger.set_mapping_strategy("shallow").unwrap();
        assert_eq!(copy.mapping_strategy_name(), Some("deep"));
        assert_eq!(merger.describe(), "Merger(sequences='append', mappings='shallow')");
        assert_eq!(copy.describe(), "Merger(sequences='unique', mappings='deep')");
    }

    #[test]
    fn test_no_aliasing_with_inputs() {
        let mut a = json!({"nested": {"list": [1]}});
        let b = json!({"nested": {"list": [2]}});
        let result = Merger::new().merge(&[a.clone(), b.clone()]).unwrap();

        a["nested"]["list"] = json!([]);
        a["extra"] = json!(true);
        assert_eq!(result["nested"]["list"], json!([1, 2]));
        assert!(!result.contains_key("extra"));
    }

    #[test]
    fn test_merge_mappings_typed() {
        let a = obj(json!({"a": {"x": 1}}));
        let b = obj(json!({"a": {"y": 2}}));
        let result = Merger::new().merge_mappings([&a, &b]);
        assert_eq!(Value::Object(result), json!({"a": {"x": 1, "y": 2}}));
        assert_eq!(a, obj(json!({"a": {"x": 1}})));
    }

    #[test]
    fn test_convenience_functions() {
        let d1 = json!({"a": 1, "list": [1, 2], "nested": {"x": 1}});
        let d2 = json!({"b": 2, "list": [3, 4], "nested": {"y": 2}});

        let result = merge(&[d1.clone(), d2.clone()]).unwrap();
        assert_eq!(
            Value::Object(result),
            json!({"a": 1, "list": [1, 2, 3, 4], "nested": {"x": 1, "y": 2}, "b": 2})
        );

        let result = merge_shallow(&[d1.clone(), d2.clone()]).unwrap();
        assert_eq!(
            Value::Object(result),
            json!({"a": 1, "list": [3, 4], "nested": {"y": 2}, "b": 2})
        );

        let t1 = json!({"tags": ["python", "web"], "config": {"debug": true}});
        let t2 = json!({"tags": ["web", "api"], "config": {"port": 8000}});
        let result = merge_unique(&[t1, t2]).unwrap();
        assert_eq!(
            Value::Object(result),
            json!({"tags": ["python", "web", "api"], "config": {"debug": true, "port": 8000}})
        );

        assert!(merge_with(&[d1, d2], "unique", "nope").is_err());
    }

    #[test]
    fn test_convenience_functions_empty_and_errors() {
        for f in [merge, merge_unique, merge_shallow] {
            assert_eq!(f(&[]).unwrap(), Mapping::new());
            assert_eq!(f(&[json!({})]).unwrap(), Mapping::new());
            assert_eq!(f(&[json!({}), json!({})]).unwrap(), Mapping::new());
        }
        assert!(merge(&[json!("not_a_dict")]).is_err());
        assert!(merge_unique(&[json!({"a": 1}), json!("not_a_dict")]).is_err());
        assert!(merge_shallow(&[json!(null), json!({"a": 1})]).is_err());
    }
}
