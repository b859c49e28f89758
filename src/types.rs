//! Type-safe identifiers for plant states and machine states.
//!
//! Plant states, game states and transducer states are all stored in dense
//! vectors. The newtypes below keep the three index spaces apart so that a
//! machine state can never be used where a plant state is expected.
use std::fmt;

/// A value of a finite-domain variable.
///
/// Booleans are encoded as `0` (false) and `1` (true).
pub type Value = i64;

/// Converts a boolean into its [`Value`] encoding.
pub fn value_of(b: bool) -> Value {
    b as Value
}

/// A state of a [`TransitionSystem`][crate::transition::TransitionSystem] (0-indexed).
///
/// State IDs are assigned in insertion order and never change.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StateId(u32);

impl StateId {
    /// Creates a new state identifier with the given index.
    pub fn new(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "State index overflows u32");
        StateId(index as u32)
    }

    /// Returns the raw index as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

impl From<StateId> for usize {
    fn from(id: StateId) -> Self {
        id.index()
    }
}

/// A state of a synthesized [`Machine`][crate::machine::Machine] (0-indexed).
///
/// # Invariants
///
/// - `NodeId(0)` is always the synthetic initial state
/// - All other nodes are reachable from the initial state
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// The synthetic initial node of every machine.
    pub const INIT: NodeId = NodeId(0);

    /// Creates a new node identifier with the given index.
    pub fn new(index: usize) -> Self {
        assert!(index <= u32::MAX as usize, "Node index overflows u32");
        NodeId(index as u32)
    }

    /// Returns the raw index as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Checks if this is the synthetic initial node.
    pub fn is_init(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_init() {
            write!(f, "Sinit")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<NodeId> for usize {
    fn from(id: NodeId) -> Self {
        id.index()
    }
}
