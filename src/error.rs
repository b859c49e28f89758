//! Error types.
//!
//! An unrealizable specification is a synthesis
//! [`Outcome`][crate::synth::Outcome], not an error.

use num_bigint::BigUint;
use thiserror::Error;

use crate::domain::Valuation;
use crate::types::NodeId;

/// Malformed or self-contradictory synthesis input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    #[error("Variable '{name}' is declared as both environment and system variable")]
    VariableCollision { name: String },

    #[error("Variable '{name}' is declared more than once")]
    DuplicateVariable { name: String },

    #[error("Variable '{name}' shadows an atomic proposition of the transition system")]
    ShadowedProposition { name: String },

    #[error("Name '{name}' is reserved for the plant location port")]
    ReservedName { name: String },

    #[error("Variable '{name}' has an empty domain")]
    EmptyDomain { name: String },

    #[error("Undeclared name '{name}' in formula `{formula}`")]
    UndeclaredName { name: String, formula: String },

    #[error("Nested next operator in formula `{formula}`")]
    NestedNext { formula: String },

    #[error("{class} formula `{formula}` may not use the next operator")]
    UnexpectedNext { class: &'static str, formula: String },

    #[error("{class} formula `{formula}` may not read '{name}'")]
    ForbiddenRead {
        class: &'static str,
        formula: String,
        name: String,
    },

    #[error("Duplicate state '{name}' in transition system")]
    DuplicateState { name: String },

    #[error("Unknown state '{name}' in transition system")]
    UnknownState { name: String },

    #[error("Transition system has no initial states")]
    NoInitialStates,

    #[error("Initial conditions are jointly unsatisfiable with the initial states")]
    UnsatisfiableInit,

    #[error("Game has {size} candidate states, exceeding the limit of {limit}")]
    StateSpaceTooLarge { size: BigUint, limit: u64 },
}

/// Internal inconsistency detected while extracting a strategy.
///
/// A correct winning region never produces this.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No admissible response from winning game state {state} while pursuing goal {goal}")]
pub struct ExtractionError {
    pub state: usize,
    pub goal: usize,
}

/// Why a synthesis run stopped before converging.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum Interrupt {
    #[error("cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// Failure of a synthesis run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SynthesisError {
    #[error(transparent)]
    Spec(#[from] SpecError),

    #[error("Synthesis interrupted: {0}")]
    Timeout(#[from] Interrupt),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

/// Failure while executing a machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("Unknown machine state {0}")]
    UnknownState(NodeId),

    #[error("Input ({input}) is not admissible in state {state}")]
    UndefinedInput { state: NodeId, input: Valuation },
}
