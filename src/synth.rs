//! One-call synthesis pipeline.
//!
//! [`synthesize`] runs every phase in order:
//!
//! 1. [`GameGraph::build`] validates the input and explores the product game;
//! 2. [`FixpointSolver::solve`] computes the winning region;
//! 3. [`WinningRegion::initial_choices`] decides realizability;
//! 4. [`StrategyExtractor::extract`] fixes one response per environment move;
//! 5. [`Machine::new`] builds the transducer, minimized on request.

use std::time::Instant;

use log::info;

use crate::config::{SynthesisConfig, Watchdog};
use crate::error::SynthesisError;
use crate::game::GameGraph;
use crate::machine::Machine;
use crate::solver::{FixpointSolver, WinningRegion};
use crate::spec::Specification;
use crate::strategy::StrategyExtractor;
use crate::symbolic::{ExplicitSet, SymbolicSet};
use crate::transition::TransitionSystem;

/// Result of a completed synthesis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Realizable(Machine),
    Unrealizable,
}

impl Outcome {
    pub fn is_realizable(&self) -> bool {
        matches!(self, Outcome::Realizable(_))
    }

    pub fn machine(&self) -> Option<&Machine> {
        match self {
            Outcome::Realizable(machine) => Some(machine),
            Outcome::Unrealizable => None,
        }
    }

    pub fn into_machine(self) -> Option<Machine> {
        match self {
            Outcome::Realizable(machine) => Some(machine),
            Outcome::Unrealizable => None,
        }
    }
}

/// Synthesizes a transducer controlling `ts` so that `spec` holds.
///
/// # Examples
///
/// ```
/// use gr1_rs::config::SynthesisConfig;
/// use gr1_rs::expr::Expr;
/// use gr1_rs::spec::Specification;
/// use gr1_rs::synth::synthesize;
/// use gr1_rs::transition::TransitionSystem;
///
/// let mut ts = TransitionSystem::new();
/// ts.add_states(["left", "right"]).unwrap();
/// ts.add_initial("left").unwrap();
/// ts.add_transition("left", "right").unwrap();
/// ts.add_transition("right", "right").unwrap();
/// ts.add_label("left", "start").unwrap();
///
/// // `start` can never be revisited.
/// let spec = Specification::new().with_sys_prog(Expr::var("start"));
/// let outcome = synthesize(&ts, &spec, &SynthesisConfig::default()).unwrap();
/// assert!(!outcome.is_realizable());
/// ```
pub fn synthesize(ts: &TransitionSystem, spec: &Specification, config: &SynthesisConfig) -> Result<Outcome, SynthesisError> {
    let start = Instant::now();
    let watchdog = config.watchdog();

    let game = GameGraph::<ExplicitSet>::build_watched(ts, spec, config, &watchdog)?;
    let region = FixpointSolver::new(&game, config)
        .with_watchdog(watchdog.clone())
        .solve()?;
    info!(
        "Winning region: {} of {} game states after {} outer iterations",
        region.winning().len(),
        game.num_states(),
        region.outer_iterations()
    );

    let outcome = realize(&game, &region, config, watchdog)?;
    info!(
        "Synthesis finished in {:.3?}: {}",
        start.elapsed(),
        if outcome.is_realizable() { "realizable" } else { "unrealizable" }
    );
    Ok(outcome)
}

fn realize(
    game: &GameGraph<ExplicitSet>,
    region: &WinningRegion<ExplicitSet>,
    config: &SynthesisConfig,
    watchdog: Watchdog,
) -> Result<Outcome, SynthesisError> {
    let Some(initial) = region.initial_choices(game) else {
        return Ok(Outcome::Unrealizable);
    };
    let strategy = StrategyExtractor::new(game, region)
        .with_watchdog(watchdog)
        .extract(&initial)?;
    let machine = Machine::new(game, &strategy);
    Ok(Outcome::Realizable(if config.minimize { machine.minimize() } else { machine }))
}
