//! Named strategy lookup.
//!
//! Each strategy kind has two tables: the built-in enum, which is fixed, and
//! a custom table owned by one [`Merger`](crate::Merger). Name lookups try the
//! built-in table first, so a custom strategy registered under a built-in name
//! is stored but never selected by that name.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{MergeError, MergeResult};
use crate::strategies::{BuiltinStrategy, MappingStrategy, SequenceStrategy};
use crate::types::{Mapping, MappingFn, Sequence, SequenceFn, StrategyKind};

/// How a caller picks a strategy: by name, by built-in, or with a function.
#[derive(Clone)]
pub enum StrategyChoice<B, F> {
    ByName(String),
    Builtin(B),
    Direct(F),
}

pub type SequenceChoice = StrategyChoice<SequenceStrategy, SequenceFn>;
pub type MappingChoice = StrategyChoice<MappingStrategy, MappingFn>;

impl<B, F> From<&str> for StrategyChoice<B, F> {
    fn from(name: &str) -> Self {
        StrategyChoice::ByName(name.to_string())
    }
}

impl<B, F> From<String> for StrategyChoice<B, F> {
    fn from(name: String) -> Self {
        StrategyChoice::ByName(name)
    }
}

impl<F> From<SequenceStrategy> for StrategyChoice<SequenceStrategy, F> {
    fn from(strategy: SequenceStrategy) -> Self {
        StrategyChoice::Builtin(strategy)
    }
}

impl<F> From<MappingStrategy> for StrategyChoice<MappingStrategy, F> {
    fn from(strategy: MappingStrategy) -> Self {
        StrategyChoice::Builtin(strategy)
    }
}

impl SequenceChoice {
    /// Select an unregistered sequence function.
    pub fn direct<G>(f: G) -> Self
    where
        G: Fn(Sequence, Sequence) -> Sequence + Send + Sync + 'static,
    {
        StrategyChoice::Direct(Arc::new(f))
    }
}

impl MappingChoice {
    /// Select an unregistered mapping function.
    pub fn direct<G>(f: G) -> Self
    where
        G: Fn(Mapping, Mapping) -> Mapping + Send + Sync + 'static,
    {
        StrategyChoice::Direct(Arc::new(f))
    }
}

/// A strategy after name resolution.
#[derive(Clone)]
pub enum Resolved<B, F> {
    Builtin(B),
    Custom(F),
}

/// The active strategy together with the name it was chosen by.
///
/// Functions have no stable identity to look a name back up from, so the name
/// travels with the selection. `None` means the function was supplied
/// directly.
#[derive(Clone)]
pub struct Selection<B, F> {
    name: Option<String>,
    strategy: Resolved<B, F>,
}

impl<B: BuiltinStrategy, F> Selection<B, F> {
    pub fn builtin(strategy: B) -> Self {
        Self {
            name: Some(strategy.as_str().to_string()),
            strategy: Resolved::Builtin(strategy),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The name, or `custom` for a directly supplied function.
    pub fn display_name(&self) -> &str {
        self.name().unwrap_or("custom")
    }

    pub fn strategy(&self) -> &Resolved<B, F> {
        &self.strategy
    }
}

impl Selection<SequenceStrategy, SequenceFn> {
    pub fn apply(&self, left: Sequence, right: Sequence) -> Sequence {
        match &self.strategy {
            Resolved::Builtin(builtin) => builtin.apply(left, right),
            Resolved::Custom(f) => f(left, right),
        }
    }
}

impl Selection<MappingStrategy, MappingFn> {
    /// Combine two mappings; only the built-in `deep` strategy uses `sequences`.
    pub fn apply(
        &self,
        left: Mapping,
        right: Mapping,
        sequences: &dyn Fn(Sequence, Sequence) -> Sequence,
    ) -> Mapping {
        match &self.strategy {
            Resolved::Builtin(builtin) => builtin.apply(left, right, sequences),
            Resolved::Custom(f) => f(left, right),
        }
    }
}

impl<B: BuiltinStrategy, F> fmt::Debug for Selection<B, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selection")
            .field("kind", &B::KIND)
            .field("name", &self.display_name())
            .finish()
    }
}

/// Custom strategies of one kind, keyed by name.
pub struct StrategyRegistry<B, F> {
    custom: HashMap<String, F>,
    _builtin: PhantomData<B>,
}

pub type SequenceRegistry = StrategyRegistry<SequenceStrategy, SequenceFn>;
pub type MappingRegistry = StrategyRegistry<MappingStrategy, MappingFn>;

impl<B: BuiltinStrategy, F: Clone> StrategyRegistry<B, F> {
    pub fn new() -> Self {
        Self {
            custom: HashMap::new(),
            _builtin: PhantomData,
        }
    }

    /// Store `f` under `name`, replacing any custom entry with that name.
    pub fn register(&mut self, name: impl Into<String>, f: F) {
        let name = name.into();
        if B::from_name(&name).is_some() {
            tracing::warn!(
                kind = %B::KIND,
                name = %name,
                "custom strategy is shadowed by a built-in and cannot be selected by name"
            );
        }
        if self.custom.insert(name.clone(), f).is_some() {
            tracing::debug!(kind = %B::KIND, name = %name, "replaced custom strategy");
        }
    }

    /// Look a name up, built-ins first.
    pub fn lookup(&self, name: &str) -> Option<Resolved<B, F>> {
        if let Some(builtin) = B::from_name(name) {
            return Some(Resolved::Builtin(builtin));
        }
        self.custom.get(name).cloned().map(Resolved::Custom)
    }

    /// Turn a caller's choice into the active selection.
    pub fn resolve(&self, choice: StrategyChoice<B, F>) -> MergeResult<Selection<B, F>> {
        match choice {
            StrategyChoice::Builtin(builtin) => Ok(Selection::builtin(builtin)),
            StrategyChoice::Direct(f) => Ok(Selection {
                name: None,
                strategy: Resolved::Custom(f),
            }),
            StrategyChoice::ByName(name) => match self.lookup(&name) {
                Some(strategy) => Ok(Selection {
                    name: Some(name),
                    strategy,
                }),
                None => Err(MergeError::UnknownStrategy {
                    kind: B::KIND,
                    name,
                }),
            },
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.custom.contains_key(name)
    }

    /// Registered custom names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.custom.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.custom.is_empty()
    }
}

impl<B: BuiltinStrategy, F: Clone> Default for StrategyRegistry<B, F> {
    fn default() -> Self {
        Self::new()
    }
}

// Shallow: the function handles are shared with the copy.
impl<B, F: Clone> Clone for StrategyRegistry<B, F> {
    fn clone(&self) -> Self {
        Self {
            custom: self.custom.clone(),
            _builtin: PhantomData,
        }
    }
}

impl<B: BuiltinStrategy, F: Clone> fmt::Debug for StrategyRegistry<B, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("kind", &B::KIND)
            .field("custom", &self.names())
            .finish()
    }
}
