//! Finite transition systems (the plant).
//!
//! States are named, labeled with atomic propositions, and connected by an
//! explicit successor relation. The system controls which successor is taken;
//! the environment is modelled separately by the [`Specification`][crate::spec::Specification].

use std::collections::{BTreeSet, HashMap};

use crate::error::SpecError;
use crate::types::StateId;

/// A finite transition system (Kripke structure) with named states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionSystem {
    /// State names, indexed by `StateId`
    names: Vec<String>,
    index: HashMap<String, StateId>,
    /// Initial states: I(s)
    initial: BTreeSet<StateId>,
    /// Successor sets: T(s, s')
    successors: Vec<BTreeSet<StateId>>,
    /// Atomic propositions true in each state
    labels: Vec<BTreeSet<String>>,
    /// All declared atomic propositions
    propositions: BTreeSet<String>,
}

impl TransitionSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a state with a fresh name.
    pub fn add_state(&mut self, name: impl Into<String>) -> Result<StateId, SpecError> {
        let name = name.into();
        if self.index.contains_key(&name) {
            return Err(SpecError::DuplicateState { name });
        }
        let id = StateId::new(self.names.len());
        self.index.insert(name.clone(), id);
        self.names.push(name);
        self.successors.push(BTreeSet::new());
        self.labels.push(BTreeSet::new());
        Ok(id)
    }

    pub fn add_states<S: Into<String>>(&mut self, names: impl IntoIterator<Item = S>) -> Result<Vec<StateId>, SpecError> {
        names.into_iter().map(|name| self.add_state(name)).collect()
    }

    /// Looks up a state by name.
    pub fn state(&self, name: &str) -> Result<StateId, SpecError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| SpecError::UnknownState { name: name.to_string() })
    }

    pub fn name(&self, id: StateId) -> &str {
        &self.names[id.index()]
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All states, in insertion order.
    pub fn states(&self) -> impl Iterator<Item = StateId> {
        (0..self.names.len()).map(StateId::new)
    }

    /// Marks a state as initial.
    pub fn add_initial(&mut self, name: &str) -> Result<(), SpecError> {
        let id = self.state(name)?;
        self.initial.insert(id);
        Ok(())
    }

    pub fn initial(&self) -> impl Iterator<Item = StateId> + '_ {
        self.initial.iter().copied()
    }

    pub fn is_initial(&self, id: StateId) -> bool {
        self.initial.contains(&id)
    }

    pub fn add_transition(&mut self, from: &str, to: &str) -> Result<(), SpecError> {
        let from = self.state(from)?;
        let to = self.state(to)?;
        self.successors[from.index()].insert(to);
        Ok(())
    }

    pub fn successors(&self, id: StateId) -> impl Iterator<Item = StateId> + '_ {
        self.successors[id.index()].iter().copied()
    }

    /// Declares an atomic proposition without attaching it to any state.
    pub fn add_proposition(&mut self, prop: impl Into<String>) {
        self.propositions.insert(prop.into());
    }

    /// Labels a state with an atomic proposition (declaring it if needed).
    pub fn add_label(&mut self, state: &str, prop: impl Into<String>) -> Result<(), SpecError> {
        let id = self.state(state)?;
        let prop = prop.into();
        self.propositions.insert(prop.clone());
        self.labels[id.index()].insert(prop);
        Ok(())
    }

    pub fn labels(&self, id: StateId) -> &BTreeSet<String> {
        &self.labels[id.index()]
    }

    pub fn has_label(&self, id: StateId, prop: &str) -> bool {
        self.labels[id.index()].contains(prop)
    }

    /// All declared atomic propositions, sorted by name.
    pub fn propositions(&self) -> &BTreeSet<String> {
        &self.propositions
    }
}
