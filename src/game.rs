//! The two-player game graph.
//!
//! A game state pairs a plant location with a full valuation of the
//! environment and system variables. One round of the game is split into two
//! half-moves through *intermediate* nodes:
//!
//! - **Mealy**: the environment picks its next values (an intermediate per
//!   admissible move), then the system responds with a plant successor and
//!   next system values satisfying `sys_safe`.
//! - **Moore**: the system commits to a plant successor and next system values
//!   (an intermediate per commitment that is safe against *every* admissible
//!   environment move), then the environment picks.
//!
//! Game states and intermediates share one node domain: states are `0..n`,
//! intermediates are `n..n+m`. Only states reachable from the initial game
//! states through safe moves are built; unsafe edges never exist.

use std::collections::{HashMap, HashSet, VecDeque};

use log::{debug, info, warn};
use num_bigint::BigUint;

use crate::bitset::BitSet;
use crate::config::{SynthesisConfig, Watchdog};
use crate::domain::{Valuation, Variable};
use crate::error::{SpecError, SynthesisError};
use crate::expr::{Compiled, Frame};
use crate::spec::{CompiledSpec, InitMode, Layout, Specification};
use crate::symbolic::SymbolicSet;
use crate::transition::TransitionSystem;
use crate::types::{StateId, Value};

/// A plant location together with the values of all variables (environment first).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GameState {
    pub location: StateId,
    pub values: Vec<Value>,
}

/// The first half-move of a round.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Move {
    /// Mealy: the environment's next values.
    Env(Vec<Value>),
    /// Moore: the system's next location and values.
    Commit { location: StateId, sys: Vec<Value> },
}

#[derive(Debug, Clone)]
struct Intermediate {
    source: usize,
    mv: Move,
    outcomes: Vec<usize>,
}

/// The explored game graph, generic over the set representation.
#[derive(Debug)]
pub struct GameGraph<S: SymbolicSet> {
    layout: Layout,
    moore: bool,
    init_mode: InitMode,
    locations: Vec<String>,

    states: Vec<GameState>,
    index: HashMap<GameState, usize>,
    /// Per state: intermediates (local indices) of the first half-move.
    choices: Vec<Vec<usize>>,
    /// Per state: admissible environment moves (indices into `env_table`).
    admissible: Vec<Vec<usize>>,
    intermediates: Vec<Intermediate>,
    env_table: Vec<Vec<Value>>,

    /// Environment initial values `E0` (indices into `env_table`).
    env_initial: Vec<usize>,
    /// Initial game states, ordered by (location, system values, environment values).
    initial: Vec<usize>,

    all_states: S,
    env_goals: Vec<S>,
    sys_goals: Vec<S>,
    env_relation: S::Relation,
    sys_relation: S::Relation,
}

/// Every valuation of `vars`, in lexicographic order of their domains.
fn valuations(vars: &[Variable]) -> Vec<Vec<Value>> {
    let mut result = vec![Vec::with_capacity(vars.len())];
    for var in vars {
        let values = var.domain.to_vec();
        result = result
            .into_iter()
            .flat_map(|prefix| {
                values.iter().map(move |&v| {
                    let mut next = prefix.clone();
                    next.push(v);
                    next
                })
            })
            .collect();
    }
    result
}

fn all_hold(formulas: &[Compiled], current: Frame<'_>, next: Option<Frame<'_>>) -> bool {
    formulas.iter().all(|f| f.holds(current, next))
}

#[derive(Default)]
struct Product {
    states: Vec<GameState>,
    index: HashMap<GameState, usize>,
}

impl Product {
    fn intern(&mut self, state: GameState) -> usize {
        if let Some(&id) = self.index.get(&state) {
            return id;
        }
        let id = self.states.len();
        self.index.insert(state.clone(), id);
        self.states.push(state);
        id
    }
}

impl<S: SymbolicSet> GameGraph<S> {
    /// Validates the inputs and explores the game graph.
    pub fn build(ts: &TransitionSystem, spec: &Specification, config: &SynthesisConfig) -> Result<Self, SynthesisError> {
        Self::build_watched(ts, spec, config, &config.watchdog())
    }

    /// Like [`build`][GameGraph::build], checking `watchdog` between explored states.
    pub fn build_watched(
        ts: &TransitionSystem,
        spec: &Specification,
        config: &SynthesisConfig,
        watchdog: &Watchdog,
    ) -> Result<Self, SynthesisError> {
        let compiled = spec.compile(ts)?;
        if ts.initial().next().is_none() {
            return Err(SpecError::NoInitialStates.into());
        }

        let mut size = BigUint::from(ts.len());
        for var in compiled.layout.vars() {
            size *= BigUint::from(var.domain.size());
        }
        if size > BigUint::from(config.max_game_states) {
            return Err(SpecError::StateSpaceTooLarge {
                size,
                limit: config.max_game_states,
            }
            .into());
        }

        Self::explore(ts, compiled, watchdog)
    }

    fn explore(ts: &TransitionSystem, spec: CompiledSpec, watchdog: &Watchdog) -> Result<Self, SynthesisError> {
        let layout = &spec.layout;
        let num_env = layout.num_env();
        let num_sys = layout.sys_vars().len();

        let props: Vec<BitSet> = ts
            .states()
            .map(|s| ts.labels(s).iter().filter_map(|p| layout.prop_index(p)).collect())
            .collect();
        let env_table = valuations(layout.env_vars());
        let sys_table = valuations(layout.sys_vars());
        let no_props = BitSet::default();
        let no_sys: Vec<Value> = vec![0; num_sys];

        // E0: env_init reads environment variables only.
        let env_initial: Vec<usize> = env_table
            .iter()
            .enumerate()
            .filter(|(_, e)| {
                let candidate = [e.as_slice(), no_sys.as_slice()].concat();
                all_hold(&spec.env_init, Frame { values: &candidate, props: &no_props }, None)
            })
            .map(|(i, _)| i)
            .collect();
        debug!("{} of {} environment valuations satisfy env_init", env_initial.len(), env_table.len());

        let mut product = Product::default();
        let mut initial = Vec::new();
        for location in ts.initial() {
            for sys in &sys_table {
                for &e in &env_initial {
                    let values = [env_table[e].as_slice(), sys.as_slice()].concat();
                    let frame = Frame {
                        values: &values,
                        props: &props[location.index()],
                    };
                    if all_hold(&spec.sys_init, frame, None) {
                        initial.push(product.intern(GameState { location, values }));
                    }
                }
            }
        }
        if initial.is_empty() {
            return Err(SpecError::UnsatisfiableInit.into());
        }
        debug!("{} initial game states", initial.len());

        let mut choices: Vec<Vec<usize>> = Vec::new();
        let mut admissible: Vec<Vec<usize>> = Vec::new();
        let mut intermediates: Vec<Intermediate> = Vec::new();

        // States are numbered in discovery order, so scanning by id is a BFS.
        let mut queue: VecDeque<usize> = (0..product.states.len()).collect();
        while let Some(g) = queue.pop_front() {
            if let Err(interrupt) = watchdog.check() {
                warn!("Game exploration interrupted after {} states: {}", g, interrupt);
                return Err(interrupt.into());
            }
            let current = product.states[g].clone();
            let current_frame = Frame {
                values: &current.values,
                props: &props[current.location.index()],
            };
            let sys_now = &current.values[num_env..];

            let env_moves: Vec<usize> = (0..env_table.len())
                .filter(|&e| {
                    let candidate = [env_table[e].as_slice(), sys_now].concat();
                    let next = Frame {
                        values: &candidate,
                        props: current_frame.props,
                    };
                    all_hold(&spec.env_safe, current_frame, Some(next))
                })
                .collect();

            let mut local = Vec::new();
            let before = product.states.len();
            if !spec.moore {
                for &e in &env_moves {
                    let mut outcomes = Vec::new();
                    for location in ts.successors(current.location) {
                        for sys in &sys_table {
                            let values = [env_table[e].as_slice(), sys.as_slice()].concat();
                            let next = Frame {
                                values: &values,
                                props: &props[location.index()],
                            };
                            if all_hold(&spec.sys_safe, current_frame, Some(next)) {
                                outcomes.push(product.intern(GameState { location, values }));
                            }
                        }
                    }
                    local.push(intermediates.len());
                    intermediates.push(Intermediate {
                        source: g,
                        mv: Move::Env(env_table[e].clone()),
                        outcomes,
                    });
                }
            } else {
                for location in ts.successors(current.location) {
                    for sys in &sys_table {
                        let targets: Vec<Vec<Value>> = env_moves
                            .iter()
                            .map(|&e| [env_table[e].as_slice(), sys.as_slice()].concat())
                            .collect();
                        let safe = targets.iter().all(|values| {
                            let next = Frame {
                                values,
                                props: &props[location.index()],
                            };
                            all_hold(&spec.sys_safe, current_frame, Some(next))
                        });
                        if !safe {
                            continue;
                        }
                        let outcomes = targets
                            .into_iter()
                            .map(|values| product.intern(GameState { location, values }))
                            .collect();
                        local.push(intermediates.len());
                        intermediates.push(Intermediate {
                            source: g,
                            mv: Move::Commit {
                                location,
                                sys: sys.clone(),
                            },
                            outcomes,
                        });
                    }
                }
            }
            queue.extend(before..product.states.len());
            choices.push(local);
            admissible.push(env_moves);
        }

        let n = product.states.len();
        let m = intermediates.len();
        let domain = n + m;
        let entered: HashSet<StateId> = product.states.iter().map(|state| state.location).collect();
        if entered.len() < ts.len() {
            debug!("{} plant states never entered the game", ts.len() - entered.len());
        }
        info!(
            "Game graph: {} states, {} intermediates ({} semantics)",
            n,
            m,
            if spec.moore { "Moore" } else { "Mealy" }
        );

        let frame_of = |g: usize| {
            let state = &product.states[g];
            Frame {
                values: &state.values,
                props: &props[state.location.index()],
            }
        };
        let goal_sets = |formulas: &[Compiled]| -> Vec<S> {
            if formulas.is_empty() {
                return vec![S::from_nodes(domain, 0..n)];
            }
            formulas
                .iter()
                .map(|f| S::from_nodes(domain, (0..n).filter(|&g| f.holds(frame_of(g), None))))
                .collect()
        };
        let env_goals = goal_sets(&spec.env_prog);
        let sys_goals = goal_sets(&spec.sys_prog);
        debug!("{} environment goals, {} system goals", env_goals.len(), sys_goals.len());

        let first_half = choices
            .iter()
            .enumerate()
            .flat_map(|(g, local)| local.iter().map(move |&k| (g, n + k)));
        let second_half = intermediates
            .iter()
            .enumerate()
            .flat_map(|(k, inter)| inter.outcomes.iter().map(move |&o| (n + k, o)));
        let (env_relation, sys_relation) = if spec.moore {
            let sys = S::relation(domain, first_half);
            let env = S::relation(domain, second_half);
            (env, sys)
        } else {
            let env = S::relation(domain, first_half);
            let sys = S::relation(domain, second_half);
            (env, sys)
        };

        Ok(GameGraph {
            all_states: S::from_nodes(domain, 0..n),
            env_goals,
            sys_goals,
            env_relation,
            sys_relation,
            locations: ts.states().map(|s| ts.name(s).to_string()).collect(),
            moore: spec.moore,
            init_mode: spec.init_mode,
            layout: spec.layout,
            states: product.states,
            index: product.index,
            choices,
            admissible,
            intermediates,
            env_table,
            env_initial,
            initial,
        })
    }

    pub fn is_moore(&self) -> bool {
        self.moore
    }

    pub fn init_mode(&self) -> InitMode {
        self.init_mode
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Names of the plant locations, indexed by `StateId`.
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_intermediates(&self) -> usize {
        self.intermediates.len()
    }

    /// Size of the shared node domain (states and intermediates).
    pub fn domain(&self) -> usize {
        self.states.len() + self.intermediates.len()
    }

    pub fn state(&self, g: usize) -> &GameState {
        &self.states[g]
    }

    /// Looks up the id of a game state, if it was explored.
    pub fn find(&self, state: &GameState) -> Option<usize> {
        self.index.get(state).copied()
    }

    pub fn location(&self, g: usize) -> StateId {
        self.states[g].location
    }

    pub fn env_values(&self, g: usize) -> &[Value] {
        &self.states[g].values[..self.layout.num_env()]
    }

    pub fn sys_values(&self, g: usize) -> &[Value] {
        &self.states[g].values[self.layout.num_env()..]
    }

    /// Full valuation of a game state (environment and system variables).
    pub fn valuation(&self, g: usize) -> Valuation {
        self.layout
            .vars()
            .iter()
            .zip(&self.states[g].values)
            .map(|(var, &v)| (var.name.as_str(), v))
            .collect()
    }

    /// Names environment values.
    pub fn env_valuation(&self, values: &[Value]) -> Valuation {
        self.layout
            .env_vars()
            .iter()
            .zip(values)
            .map(|(var, &v)| (var.name.as_str(), v))
            .collect()
    }

    /// Names system values.
    pub fn sys_valuation(&self, values: &[Value]) -> Valuation {
        self.layout
            .sys_vars()
            .iter()
            .zip(values)
            .map(|(var, &v)| (var.name.as_str(), v))
            .collect()
    }

    /// Intermediate nodes of the first half-move from state `g`.
    pub fn choices(&self, g: usize) -> impl Iterator<Item = usize> + '_ {
        let n = self.states.len();
        self.choices[g].iter().map(move |&k| n + k)
    }

    /// Game states reachable from intermediate node `node` in the second half-move.
    pub fn outcomes(&self, node: usize) -> &[usize] {
        &self.intermediate(node).outcomes
    }

    /// The first half-move an intermediate node stands for.
    pub fn move_of(&self, node: usize) -> &Move {
        &self.intermediate(node).mv
    }

    /// The game state an intermediate node leaves from.
    pub fn source_of(&self, node: usize) -> usize {
        self.intermediate(node).source
    }

    fn intermediate(&self, node: usize) -> &Intermediate {
        let n = self.states.len();
        assert!(node >= n, "Node {} is a game state, not an intermediate", node);
        &self.intermediates[node - n]
    }

    /// Admissible environment moves from state `g`, in domain order.
    pub fn env_moves(&self, g: usize) -> impl Iterator<Item = &[Value]> + '_ {
        self.admissible[g].iter().map(|&e| self.env_table[e].as_slice())
    }

    /// Environment values satisfying `env_init`.
    pub fn env_initial(&self) -> impl Iterator<Item = &[Value]> + '_ {
        self.env_initial.iter().map(|&e| self.env_table[e].as_slice())
    }

    /// Initial game states, in increasing id order.
    pub fn initial(&self) -> &[usize] {
        &self.initial
    }

    pub fn is_initial(&self, g: usize) -> bool {
        self.initial.binary_search(&g).is_ok()
    }

    /// All game states (no intermediates).
    pub fn states(&self) -> &S {
        &self.all_states
    }

    pub fn env_goals(&self) -> &[S] {
        &self.env_goals
    }

    pub fn sys_goals(&self) -> &[S] {
        &self.sys_goals
    }

    /// Edges controlled by the environment.
    pub fn env_relation(&self) -> &S::Relation {
        &self.env_relation
    }

    /// Edges controlled by the system.
    pub fn sys_relation(&self) -> &S::Relation {
        &self.sys_relation
    }
}
