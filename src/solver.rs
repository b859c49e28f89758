//! The GR(1) nested fixpoint.
//!
//! ```text
//! Z := states
//! repeat
//!     for each system goal j:
//!         Y := ∅
//!         repeat
//!             start := Z ∩ ((J^s_j ∩ cpre(Z)) ∪ cpre(Y))
//!             X_i   := νX. start ∪ (Z ∖ J^e_i ∩ cpre(X))     for each environment goal i
//!             Y     := ∪_i X_i                              (one layer)
//!         until Y is stable
//!     Z := ∩_j Y_j
//! until Z is stable
//! ```
//!
//! Every set is kept inside the current `Z`, so all approximants shrink (or
//! grow, for `Y`) monotonically and the layers of the converged outer iteration
//! lie inside the winning region. Those layers are what strategy extraction
//! uses to make progress toward each goal.
//!
//! The per-goal least fixpoints only read the game and the current `Z`, so
//! they can run on scoped worker threads.

use std::collections::HashSet;
use std::thread;

use log::{debug, info, warn};

use crate::config::{SynthesisConfig, Watchdog};
use crate::error::{Interrupt, SynthesisError};
use crate::game::{GameGraph, GameState};
use crate::spec::InitMode;
use crate::symbolic::SymbolicSet;
use crate::types::{StateId, Value};

/// One iteration of the least fixpoint for a system goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer<S> {
    /// `Y` after this iteration.
    pub y: S,
    /// The per-environment-goal greatest fixpoints whose union is `y`.
    pub xs: Vec<S>,
}

/// The winning region and the approximant history of every outer iteration.
///
/// Layers are keyed by `(outer iteration, goal, inner iteration)`. Strategy
/// extraction only reads the converged (last) outer iteration, see
/// [`layers`][WinningRegion::layers].
#[derive(Debug, Clone)]
pub struct WinningRegion<S> {
    winning: S,
    /// Outer iteration -> goal -> layers.
    history: Vec<Vec<Vec<Layer<S>>>>,
}

impl<S: SymbolicSet> WinningRegion<S> {
    /// The winning game states.
    pub fn winning(&self) -> &S {
        &self.winning
    }

    pub fn contains(&self, g: usize) -> bool {
        self.winning.contains(g)
    }

    pub fn num_goals(&self) -> usize {
        self.converged().len()
    }

    /// Layers of `goal` in the converged outer iteration.
    pub fn layers(&self, goal: usize) -> &[Layer<S>] {
        &self.converged()[goal]
    }

    /// Layers of `goal` in outer iteration `outer` (0-based).
    pub fn layers_at(&self, outer: usize, goal: usize) -> Option<&[Layer<S>]> {
        self.history.get(outer)?.get(goal).map(Vec::as_slice)
    }

    pub fn outer_iterations(&self) -> usize {
        self.history.len()
    }

    fn converged(&self) -> &[Vec<Layer<S>>] {
        match self.history.last() {
            Some(goals) => goals,
            None => &[],
        }
    }

    /// Index of the first layer of `goal` containing `g`.
    pub fn rank(&self, goal: usize, g: usize) -> Option<usize> {
        self.layers(goal).iter().position(|layer| layer.y.contains(g))
    }

    /// Picks the initial game states according to the initialization mode.
    ///
    /// Returns one winning initial state per environment initial valuation
    /// (in the order of [`GameGraph::env_initial`]), or `None` when the
    /// specification is unrealizable.
    pub fn initial_choices(&self, game: &GameGraph<S>) -> Option<Vec<usize>> {
        let env_initial: Vec<&[Value]> = game.env_initial().collect();
        match game.init_mode() {
            InitMode::ExistsSysForallEnv => {
                let mut seen: HashSet<(StateId, &[Value])> = HashSet::new();
                let candidates: Vec<(StateId, &[Value])> = game
                    .initial()
                    .iter()
                    .map(|&g| (game.location(g), game.sys_values(g)))
                    .filter(|&key| seen.insert(key))
                    .collect();
                candidates.into_iter().find_map(|(location, sys)| {
                    env_initial
                        .iter()
                        .map(|env| {
                            let state = GameState {
                                location,
                                values: [*env, sys].concat(),
                            };
                            game.find(&state).filter(|&g| game.is_initial(g) && self.contains(g))
                        })
                        .collect::<Option<Vec<usize>>>()
                })
            }
            InitMode::ForallEnvExistsSys => env_initial
                .iter()
                .map(|env| {
                    game.initial()
                        .iter()
                        .copied()
                        .find(|&g| game.env_values(g) == *env && self.contains(g))
                })
                .collect(),
        }
    }

    pub fn is_realizable(&self, game: &GameGraph<S>) -> bool {
        self.initial_choices(game).is_some()
    }
}

/// Result of one per-goal least fixpoint.
struct GoalFixpoint<S> {
    y: S,
    layers: Vec<Layer<S>>,
}

/// Computes the winning region of a [`GameGraph`].
pub struct FixpointSolver<'a, S: SymbolicSet> {
    game: &'a GameGraph<S>,
    config: &'a SynthesisConfig,
    watchdog: Watchdog,
}

impl<'a, S: SymbolicSet> FixpointSolver<'a, S> {
    /// Creates a solver whose deadline starts now.
    pub fn new(game: &'a GameGraph<S>, config: &'a SynthesisConfig) -> Self {
        Self {
            game,
            config,
            watchdog: config.watchdog(),
        }
    }

    /// Uses the watchdog of an enclosing run instead.
    pub fn with_watchdog(mut self, watchdog: Watchdog) -> Self {
        self.watchdog = watchdog;
        self
    }

    /// Controllable predecessor: game states from which the system can force
    /// the next game state into `target` in one round.
    pub fn cpre(&self, target: &S) -> S {
        let game = self.game;
        let forced = if game.is_moore() {
            // ∃ commitment ∀ environment move
            target.complement().pre_image(game.env_relation()).complement().pre_image(game.sys_relation())
        } else {
            // ∀ environment move ∃ response
            target.pre_image(game.sys_relation()).complement().pre_image(game.env_relation()).complement()
        };
        game.states().intersect(&forced)
    }

    /// Environment-forced predecessor: game states from which the environment
    /// can force the next game state into `target` in one round.
    pub fn upre(&self, target: &S) -> S {
        self.game.states().minus(&self.cpre(&target.complement()))
    }

    /// Runs the nested fixpoint to convergence.
    pub fn solve(&self) -> Result<WinningRegion<S>, SynthesisError> {
        let watchdog = &self.watchdog;
        let num_goals = self.game.sys_goals().len();
        let mut z = self.game.states().clone();
        let mut history = Vec::new();
        let mut outer = 0;

        loop {
            outer += 1;
            self.interruptible(watchdog)?;
            let cpre_z = self.cpre(&z);

            let results: Vec<Result<GoalFixpoint<S>, Interrupt>> = if self.config.parallel && num_goals > 1 {
                thread::scope(|scope| {
                    let handles: Vec<_> = (0..num_goals)
                        .map(|j| {
                            let (z, cpre_z) = (&z, &cpre_z);
                            scope.spawn(move || self.least_fixpoint(j, z, cpre_z, watchdog))
                        })
                        .collect();
                    handles
                        .into_iter()
                        .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
                        .collect()
                })
            } else {
                (0..num_goals)
                    .map(|j| self.least_fixpoint(j, &z, &cpre_z, watchdog))
                    .collect()
            };

            let mut goals = Vec::with_capacity(num_goals);
            for result in results {
                goals.push(result.map_err(|interrupt| self.interrupted(interrupt))?);
            }

            let next = goals.iter().fold(z.clone(), |acc, goal| acc.intersect(&goal.y));
            debug!("Outer iteration {}: |Z| = {}", outer, next.len());
            history.push(goals.into_iter().map(|goal| goal.layers).collect());

            if next == z {
                info!(
                    "Fixpoint converged after {} outer iterations: {} of {} game states winning",
                    outer,
                    z.len(),
                    self.game.num_states()
                );
                return Ok(WinningRegion { winning: z, history });
            }
            z = next;
        }
    }

    fn interruptible(&self, watchdog: &Watchdog) -> Result<(), SynthesisError> {
        watchdog.check().map_err(|interrupt| self.interrupted(interrupt))
    }

    fn interrupted(&self, interrupt: Interrupt) -> SynthesisError {
        warn!("Fixpoint computation interrupted: {}", interrupt);
        SynthesisError::Timeout(interrupt)
    }

    /// μY for system goal `j`, recording every layer.
    fn least_fixpoint(&self, j: usize, z: &S, cpre_z: &S, watchdog: &Watchdog) -> Result<GoalFixpoint<S>, Interrupt> {
        let reached = z.intersect(&self.game.sys_goals()[j]).intersect(cpre_z);
        let mut y = S::empty(self.game.domain());
        let mut layers = Vec::new();

        loop {
            watchdog.check()?;
            let start = reached.union(&self.cpre(&y)).intersect(z);
            let xs = self
                .game
                .env_goals()
                .iter()
                .map(|justice| self.greatest_fixpoint(z, &start, justice, watchdog))
                .collect::<Result<Vec<S>, Interrupt>>()?;
            let next = xs.iter().fold(S::empty(self.game.domain()), |acc, x| acc.union(x));

            if next == y {
                debug!("Goal {}: converged with {} layers, |Y| = {}", j, layers.len(), y.len());
                return Ok(GoalFixpoint { y, layers });
            }
            debug!("Goal {}: layer {} has {} states", j, layers.len(), next.len());
            layers.push(Layer { y: next.clone(), xs });
            y = next;
        }
    }

    /// νX. start ∪ (Z ∖ J^e_i ∩ cpre(X)), starting from `Z`.
    fn greatest_fixpoint(&self, z: &S, start: &S, justice: &S, watchdog: &Watchdog) -> Result<S, Interrupt> {
        let violating = z.minus(justice);
        let mut x = z.clone();
        loop {
            watchdog.check()?;
            let next = start.union(&violating.intersect(&self.cpre(&x)));
            if next == x {
                return Ok(x);
            }
            x = next;
        }
    }
}
