//! Synthesized transducers.
//!
//! A [`Machine`] is the executable form of a winning strategy. Its states are
//! the `(game state, goal)` nodes the strategy reaches plus the synthetic
//! initial node [`NodeId::INIT`]. Each transition is labeled with a full
//! input valuation (the environment variables) and produces a full output
//! valuation (the system variables and the [`LOCATION_PORT`] holding the plant
//! state index).
//!
//! With Moore semantics every transition leaving a node carries the same
//! output. The one exception is the initial node under
//! [`InitMode::ForallEnvExistsSys`][crate::spec::InitMode::ForallEnvExistsSys],
//! where the initial system values may depend on the initial environment values.
//!
//! Inputs that are not admissible environment moves are rejected with
//! [`MachineError::UndefinedInput`]; the machine never produces an output for them.
//!
//! # Examples
//!
//! ```
//! use gr1_rs::config::SynthesisConfig;
//! use gr1_rs::domain::{Domain, Valuation};
//! use gr1_rs::expr::Expr;
//! use gr1_rs::machine::UniformInputs;
//! use gr1_rs::spec::Specification;
//! use gr1_rs::synth::{synthesize, Outcome};
//! use gr1_rs::transition::TransitionSystem;
//! use gr1_rs::types::NodeId;
//!
//! let mut ts = TransitionSystem::new();
//! ts.add_states(["idle", "busy"]).unwrap();
//! ts.add_initial("idle").unwrap();
//! ts.add_transition("idle", "busy").unwrap();
//! ts.add_transition("busy", "idle").unwrap();
//!
//! // Echo the request bit.
//! let spec = Specification::new()
//!     .with_env_var("req", Domain::Boolean)
//!     .with_sys_var("ack", Domain::Boolean)
//!     .with_sys_safe(Expr::var("ack").next().iff(Expr::var("req").next()));
//!
//! let Outcome::Realizable(machine) = synthesize(&ts, &spec, &SynthesisConfig::default()).unwrap() else {
//!     panic!("expected a machine");
//! };
//! let (first, _) = machine.step(NodeId::INIT, &Valuation::new().with("req", 0)).unwrap();
//! let (next, output) = machine.step(first, &Valuation::new().with("req", 1)).unwrap();
//! assert_eq!(output.get("ack"), Some(1));
//! assert!(!next.is_init());
//!
//! let trace: Vec<_> = machine.simulate(NodeId::INIT, 5, UniformInputs::new(42)).unwrap().iter().collect();
//! assert_eq!(trace.len(), 5);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::domain::{Domain, Valuation};
use crate::error::{MachineError, SpecError};
use crate::game::GameGraph;
use crate::spec::LOCATION_PORT;
use crate::strategy::Strategy;
use crate::symbolic::SymbolicSet;
use crate::transition::TransitionSystem;
use crate::types::{NodeId, StateId, Value};

/// Output semantics of a machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MachineKind {
    /// Output depends on the state and the current input.
    Mealy,
    /// Output depends on the state only.
    Moore,
}

impl fmt::Display for MachineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineKind::Mealy => write!(f, "Mealy"),
            MachineKind::Moore => write!(f, "Moore"),
        }
    }
}

/// An input or output port.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Port {
    pub name: String,
    pub domain: Domain,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.domain)
    }
}

/// What a machine state stands for.
///
/// The initial node has no location, goal or values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MachineState {
    pub location: Option<StateId>,
    pub goal: Option<usize>,
    /// Environment values of the underlying game state.
    pub env: Valuation,
    /// System values of the underlying game state.
    pub sys: Valuation,
}

impl MachineState {
    /// Environment and system values together with the location port.
    pub fn valuation(&self) -> Valuation {
        let mut valuation: Valuation = self.env.iter().chain(self.sys.iter()).collect();
        if let Some(location) = self.location {
            valuation.set(LOCATION_PORT, location.index() as Value);
        }
        valuation
    }
}

/// A labeled machine transition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Transition {
    pub from: NodeId,
    pub to: NodeId,
    pub input: Valuation,
    pub output: Valuation,
}

/// A finite-state transducer implementing a winning strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    kind: MachineKind,
    inputs: Vec<Port>,
    outputs: Vec<Port>,
    states: Vec<MachineState>,
    /// Outgoing transitions per node, in input order.
    edges: Vec<Vec<Transition>>,
    /// Plant location names, indexed by `StateId`.
    locations: Vec<String>,
}

impl Machine {
    /// Builds the machine of a strategy.
    ///
    /// Node ids follow the strategy's discovery order, after [`NodeId::INIT`].
    pub fn new<S: SymbolicSet>(game: &GameGraph<S>, strategy: &Strategy) -> Self {
        let layout = game.layout();
        let inputs: Vec<Port> = layout
            .env_vars()
            .iter()
            .map(|v| Port {
                name: v.name.clone(),
                domain: v.domain.clone(),
            })
            .collect();
        let mut outputs: Vec<Port> = layout
            .sys_vars()
            .iter()
            .map(|v| Port {
                name: v.name.clone(),
                domain: v.domain.clone(),
            })
            .collect();
        outputs.push(Port {
            name: LOCATION_PORT.to_string(),
            domain: Domain::range(0, game.locations().len() as Value - 1),
        });

        let ids: HashMap<(usize, usize), NodeId> = strategy
            .nodes()
            .iter()
            .enumerate()
            .map(|(i, &node)| (node, NodeId::new(i + 1)))
            .collect();

        let output_of = |g: usize| {
            let mut output = game.sys_valuation(game.sys_values(g));
            output.set(LOCATION_PORT, game.location(g).index() as Value);
            output
        };

        let mut states = vec![MachineState {
            location: None,
            goal: None,
            env: Valuation::new(),
            sys: Valuation::new(),
        }];
        let mut edges = vec![strategy
            .initial()
            .iter()
            .map(|&g| Transition {
                from: NodeId::INIT,
                to: ids[&(g, 0)],
                input: game.env_valuation(game.env_values(g)),
                output: output_of(g),
            })
            .collect::<Vec<_>>()];

        for &(g, j) in strategy.nodes() {
            let from = ids[&(g, j)];
            states.push(MachineState {
                location: Some(game.location(g)),
                goal: Some(j),
                env: game.env_valuation(game.env_values(g)),
                sys: game.sys_valuation(game.sys_values(g)),
            });
            let transitions = match strategy.decision(g, j) {
                Some(decision) => decision
                    .responses
                    .iter()
                    .map(|response| Transition {
                        from,
                        to: ids[&(response.target, decision.next_goal)],
                        input: game.env_valuation(game.env_values(response.target)),
                        output: output_of(response.target),
                    })
                    .collect(),
                None => Vec::new(),
            };
            edges.push(transitions);
        }

        let machine = Machine {
            kind: if game.is_moore() { MachineKind::Moore } else { MachineKind::Mealy },
            inputs,
            outputs,
            states,
            edges,
            locations: game.locations().to_vec(),
        };
        info!(
            "{} machine: {} states, {} transitions",
            machine.kind,
            machine.num_states(),
            machine.num_transitions()
        );
        machine
    }

    pub fn kind(&self) -> MachineKind {
        self.kind
    }

    /// Input ports (environment variables).
    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    /// Output ports (system variables, then the location port).
    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    pub fn initial(&self) -> NodeId {
        NodeId::INIT
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_transitions(&self) -> usize {
        self.edges.iter().map(Vec::len).sum()
    }

    /// All state ids, starting with [`NodeId::INIT`].
    pub fn states(&self) -> impl Iterator<Item = NodeId> {
        (0..self.states.len()).map(NodeId::new)
    }

    pub fn state(&self, id: NodeId) -> Result<&MachineState, MachineError> {
        self.states.get(id.index()).ok_or(MachineError::UnknownState(id))
    }

    /// All transitions, grouped by source state.
    pub fn transitions(&self) -> impl Iterator<Item = &Transition> {
        self.edges.iter().flatten()
    }

    pub fn transitions_from(&self, id: NodeId) -> Result<&[Transition], MachineError> {
        self.edges
            .get(id.index())
            .map(Vec::as_slice)
            .ok_or(MachineError::UnknownState(id))
    }

    /// Inputs the machine responds to in state `id`.
    pub fn admissible_inputs(&self, id: NodeId) -> Result<impl Iterator<Item = &Valuation>, MachineError> {
        Ok(self.transitions_from(id)?.iter().map(|t| &t.input))
    }

    /// Name of the plant location with the given index.
    pub fn location_name(&self, location: StateId) -> Option<&str> {
        self.locations.get(location.index()).map(String::as_str)
    }

    /// Performs one step: returns the next state and the output.
    pub fn step(&self, current: NodeId, input: &Valuation) -> Result<(NodeId, Valuation), MachineError> {
        self.transitions_from(current)?
            .iter()
            .find(|t| t.input == *input)
            .map(|t| (t.to, t.output.clone()))
            .ok_or_else(|| MachineError::UndefinedInput {
                state: current,
                input: input.clone(),
            })
    }

    /// The state reached from `current` on `input`.
    pub fn next_state(&self, current: NodeId, input: &Valuation) -> Result<NodeId, MachineError> {
        self.step(current, input).map(|(next, _)| next)
    }

    /// States whose environment, system and location values agree with `partial`.
    pub fn find_states<'a>(&'a self, partial: &'a Valuation) -> impl Iterator<Item = NodeId> + 'a {
        self.states
            .iter()
            .enumerate()
            .skip(1)
            .filter(move |(_, state)| state.valuation().matches(partial))
            .map(|(i, _)| NodeId::new(i))
    }

    /// The first state matching `partial`, if any.
    pub fn find_state(&self, partial: &Valuation) -> Option<NodeId> {
        self.find_states(partial).next()
    }

    /// Lazily simulates `steps` steps from `start`, drawing inputs from `policy`.
    pub fn simulate<P: InputPolicy + Clone>(
        &self,
        start: NodeId,
        steps: usize,
        policy: P,
    ) -> Result<Simulation<'_, P>, MachineError> {
        self.state(start)?;
        Ok(Simulation {
            machine: self,
            start,
            steps,
            policy,
        })
    }

    /// Merges bisimilar states.
    ///
    /// States start out grouped by location and system values (the initial node
    /// alone), and groups are split until every member has the same labeled
    /// transitions into the same groups. The result has the same input/output
    /// behavior; each merged state keeps the data of its smallest member.
    pub fn minimize(&self) -> Machine {
        let n = self.states.len();
        let mut initial_blocks: HashMap<(Option<StateId>, &Valuation), usize> = HashMap::new();
        let mut block: Vec<usize> = Vec::with_capacity(n);
        for (i, state) in self.states.iter().enumerate() {
            let key = if i == 0 { (None, &state.sys) } else { (state.location, &state.sys) };
            let next = initial_blocks.len();
            block.push(*initial_blocks.entry(key).or_insert(next));
        }
        let mut num_blocks = initial_blocks.len();

        loop {
            let mut signatures: HashMap<(usize, Vec<(&Valuation, &Valuation, usize)>), usize> = HashMap::new();
            let mut refined = Vec::with_capacity(n);
            for (i, transitions) in self.edges.iter().enumerate() {
                let mut signature: Vec<_> = transitions.iter().map(|t| (&t.input, &t.output, block[t.to.index()])).collect();
                signature.sort();
                let next = signatures.len();
                refined.push(*signatures.entry((block[i], signature)).or_insert(next));
            }
            block = refined;
            if signatures.len() == num_blocks {
                break;
            }
            num_blocks = signatures.len();
        }

        let mut states = Vec::with_capacity(num_blocks);
        let mut edges = Vec::with_capacity(num_blocks);
        for (i, &b) in block.iter().enumerate() {
            if b == states.len() {
                states.push(self.states[i].clone());
                let from = NodeId::new(b);
                edges.push(
                    self.edges[i]
                        .iter()
                        .map(|t| Transition {
                            from,
                            to: NodeId::new(block[t.to.index()]),
                            input: t.input.clone(),
                            output: t.output.clone(),
                        })
                        .collect(),
                );
            }
        }

        info!("Minimized machine: {} -> {} states", n, states.len());
        Machine {
            kind: self.kind,
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            states,
            edges,
            locations: self.locations.clone(),
        }
    }

    /// Reinterprets the machine as a plant.
    ///
    /// Every distinct (location, system values) pair of the machine becomes a
    /// plant state labeled like its location in `plant`; machine transitions
    /// become plant transitions, and the targets of the initial node become the
    /// initial states. Synthesizing the original specification against the
    /// result succeeds whenever it succeeded against `plant`.
    pub fn to_transition_system(&self, plant: &TransitionSystem) -> Result<TransitionSystem, SpecError> {
        let mut ts = TransitionSystem::new();
        for prop in plant.propositions() {
            ts.add_proposition(prop.clone());
        }

        let mut names: BTreeMap<(StateId, &Valuation), String> = BTreeMap::new();
        let mut node_names: Vec<Option<String>> = Vec::with_capacity(self.states.len());
        for state in &self.states {
            let Some(location) = state.location else {
                node_names.push(None);
                continue;
            };
            let key = (location, &state.sys);
            let name = match names.get(&key) {
                Some(name) => name.clone(),
                None => {
                    let base = plant.name(location);
                    let name = if state.sys.is_empty() {
                        base.to_string()
                    } else {
                        format!("{}[{}]", base, state.sys)
                    };
                    ts.add_state(name.clone())?;
                    for prop in plant.labels(location) {
                        ts.add_label(&name, prop.clone())?;
                    }
                    names.insert(key, name.clone());
                    name
                }
            };
            node_names.push(Some(name));
        }

        for (i, transitions) in self.edges.iter().enumerate() {
            for t in transitions {
                let Some(target) = &node_names[t.to.index()] else { continue };
                match &node_names[i] {
                    Some(source) => ts.add_transition(source, target)?,
                    None => ts.add_initial(target)?,
                }
            }
        }
        Ok(ts)
    }
}

impl fmt::Display for Machine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} machine with {} states", self.kind, self.num_states())?;
        write!(f, "inputs:")?;
        for port in &self.inputs {
            write!(f, " [{}]", port)?;
        }
        writeln!(f)?;
        write!(f, "outputs:")?;
        for port in &self.outputs {
            write!(f, " [{}]", port)?;
        }
        writeln!(f)?;
        writeln!(f, "states:")?;
        for (i, state) in self.states.iter().enumerate() {
            let id = NodeId::new(i);
            match (state.location, state.goal) {
                (Some(location), Some(goal)) => {
                    let name = self.location_name(location).unwrap_or("?");
                    writeln!(f, "  {}: {} goal {} ({})", id, name, goal, state.valuation())?;
                }
                _ => writeln!(f, "  {}", id)?,
            }
        }
        writeln!(f, "transitions:")?;
        for t in self.transitions() {
            writeln!(f, "  {} -> {} [{} / {}]", t.from, t.to, t.input, t.output)?;
        }
        Ok(())
    }
}

/// Chooses an input among the admissible ones during simulation.
pub trait InputPolicy {
    /// Returns an index into `inputs` (never empty). An out-of-range index ends the trace.
    fn choose(&mut self, state: NodeId, inputs: &[&Valuation]) -> usize;
}

impl<F> InputPolicy for F
where
    F: FnMut(NodeId, &[&Valuation]) -> usize,
{
    fn choose(&mut self, state: NodeId, inputs: &[&Valuation]) -> usize {
        self(state, inputs)
    }
}

/// Uniformly random admissible inputs from a seeded ChaCha8 generator.
#[derive(Debug, Clone)]
pub struct UniformInputs {
    rng: ChaCha8Rng,
}

impl UniformInputs {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl InputPolicy for UniformInputs {
    fn choose(&mut self, _state: NodeId, inputs: &[&Valuation]) -> usize {
        self.rng.gen_range(0..inputs.len())
    }
}

/// One simulated step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimStep {
    /// State reached by the step.
    pub state: NodeId,
    pub input: Valuation,
    pub output: Valuation,
}

/// A restartable simulation: every call to [`iter`][Simulation::iter] replays
/// from the start with a fresh copy of the policy.
#[derive(Debug, Clone)]
pub struct Simulation<'m, P> {
    machine: &'m Machine,
    start: NodeId,
    steps: usize,
    policy: P,
}

impl<'m, P: InputPolicy + Clone> Simulation<'m, P> {
    pub fn iter(&self) -> SimulationIter<'m, P> {
        SimulationIter {
            machine: self.machine,
            current: self.start,
            remaining: self.steps,
            policy: self.policy.clone(),
        }
    }
}

impl<'a, 'm, P: InputPolicy + Clone> IntoIterator for &'a Simulation<'m, P> {
    type Item = SimStep;
    type IntoIter = SimulationIter<'m, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the steps of a [`Simulation`].
#[derive(Debug, Clone)]
pub struct SimulationIter<'m, P> {
    machine: &'m Machine,
    current: NodeId,
    remaining: usize,
    policy: P,
}

impl<P: InputPolicy> Iterator for SimulationIter<'_, P> {
    type Item = SimStep;

    fn next(&mut self) -> Option<SimStep> {
        if self.remaining == 0 {
            return None;
        }
        let transitions = self.machine.edges.get(self.current.index())?;
        if transitions.is_empty() {
            return None;
        }
        let inputs: Vec<&Valuation> = transitions.iter().map(|t| &t.input).collect();
        let transition = transitions.get(self.policy.choose(self.current, &inputs))?;
        self.current = transition.to;
        self.remaining -= 1;
        Some(SimStep {
            state: transition.to,
            input: transition.input.clone(),
            output: transition.output.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use test_log::test;

    use crate::config::SynthesisConfig;
    use crate::domain::Domain;
    use crate::expr::Expr;
    use crate::spec::Specification;
    use crate::synth::{synthesize, Outcome};

    fn ring() -> TransitionSystem {
        let mut ts = TransitionSystem::new();
        ts.add_states(["r0", "r1", "r2"]).unwrap();
        ts.add_initial("r0").unwrap();
        for (a, b) in [("r0", "r1"), ("r1", "r2"), ("r2", "r0"), ("r0", "r0"), ("r1", "r1"), ("r2", "r2")] {
            ts.add_transition(a, b).unwrap();
        }
        ts.add_label("r2", "top").unwrap();
        ts
    }

    /// Echo `req` into `ack`, and keep visiting `top`.
    fn echo(moore: bool) -> Specification {
        let spec = Specification::new()
            .with_env_var("req", Domain::Boolean)
            .with_sys_var("ack", Domain::Boolean)
            .with_sys_prog(Expr::var("top"));
        if moore {
            spec.with_sys_safe(Expr::var("ack").next().iff(Expr::var("req")))
                .with_moore(true)
        } else {
            spec.with_sys_safe(Expr::var("ack").next().iff(Expr::var("req").next()))
        }
    }

    fn machine(spec: &Specification) -> Machine {
        match synthesize(&ring(), spec, &SynthesisConfig::default()).unwrap() {
            Outcome::Realizable(machine) => machine,
            Outcome::Unrealizable => panic!("expected a realizable specification"),
        }
    }

    #[test]
    fn test_ports_and_initial() {
        let m = machine(&echo(false));
        assert_eq!(m.kind(), MachineKind::Mealy);
        assert_eq!(m.inputs().len(), 1);
        assert_eq!(m.outputs().iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), vec!["ack", "loc"]);
        assert_eq!(m.outputs()[1].domain, Domain::range(0, 2));
        assert_eq!(m.initial(), NodeId::INIT);
        assert_eq!(m.admissible_inputs(NodeId::INIT).unwrap().count(), 2);
        assert!(m.state(NodeId::INIT).unwrap().location.is_none());
    }

    #[test]
    fn test_step_and_undefined_input() {
        let m = machine(&echo(false));
        let (next, out) = m.step(NodeId::INIT, &Valuation::new().with("req", 1)).unwrap();
        assert_eq!(out.get("loc"), Some(0));
        let (next, out) = m.step(next, &Valuation::new().with("req", 0)).unwrap();
        assert_eq!(out.get("ack"), Some(0));
        let (next, out) = m.step(next, &Valuation::new().with("req", 1)).unwrap();
        assert_eq!(out.get("ack"), Some(1));

        let bad = Valuation::new().with("req", 7);
        assert_eq!(
            m.step(next, &bad),
            Err(MachineError::UndefinedInput { state: next, input: bad.clone() })
        );
        let unknown = NodeId::new(10_000);
        assert_eq!(m.step(unknown, &bad), Err(MachineError::UnknownState(unknown)));
    }

    #[test]
    fn test_moore_outputs_do_not_depend_on_input() {
        let m = machine(&echo(true));
        assert_eq!(m.kind(), MachineKind::Moore);
        for id in m.states().skip(1) {
            let transitions = m.transitions_from(id).unwrap();
            assert!(!transitions.is_empty());
            assert!(transitions.iter().all(|t| t.output == transitions[0].output));
        }
    }

    #[test]
    fn test_simulation_is_restartable() {
        let m = machine(&echo(false));
        let sim = m.simulate(NodeId::INIT, 20, UniformInputs::new(7)).unwrap();
        let first: Vec<_> = sim.iter().collect();
        let second: Vec<_> = (&sim).into_iter().collect();
        assert_eq!(first.len(), 20);
        assert_eq!(first, second);
        // The first step only fixes the initial state.
        for step in first.iter().skip(1) {
            assert_eq!(step.output.get("ack"), step.input.get("req"));
        }
    }

    #[test]
    fn test_injected_policy() {
        let m = machine(&echo(false));
        let always_last = |_: NodeId, inputs: &[&Valuation]| inputs.len() - 1;
        let trace: Vec<_> = m.simulate(NodeId::INIT, 6, always_last).unwrap().iter().collect();
        assert!(trace.iter().all(|s| s.input.get("req") == Some(1)));
        assert!(m.simulate(NodeId::new(999), 3, always_last).is_err());
    }

    #[test]
    fn test_find_states() {
        let m = machine(&echo(false));
        let at_top = Valuation::new().with("loc", 2);
        let found: Vec<_> = m.find_states(&at_top).collect();
        assert!(!found.is_empty());
        for id in &found {
            assert_eq!(m.state(*id).unwrap().location, Some(StateId::new(2)));
        }
        assert_eq!(m.find_state(&at_top), found.first().copied());
        assert_eq!(m.find_state(&Valuation::new().with("loc", 9)), None);

        let (next, _) = m.step(NodeId::INIT, &Valuation::new().with("req", 0)).unwrap();
        assert_eq!(m.next_state(NodeId::INIT, &Valuation::new().with("req", 0)), Ok(next));
    }

    #[test]
    fn test_minimize_preserves_behavior() {
        let m = machine(&echo(false));
        let small = m.minimize();
        assert!(small.num_states() <= m.num_states());
        assert_eq!(small.minimize(), small);

        // Same outputs along the same input sequence.
        let inputs = [1, 0, 0, 1, 1, 1, 0, 1, 0, 0];
        let (mut a, mut b) = (NodeId::INIT, NodeId::INIT);
        for req in inputs {
            let input = Valuation::new().with("req", req);
            let (na, oa) = m.step(a, &input).unwrap();
            let (nb, ob) = small.step(b, &input).unwrap();
            assert_eq!(oa, ob);
            a = na;
            b = nb;
        }
    }

    #[test]
    fn test_display_dump() {
        let m = machine(&echo(false));
        let dump = m.to_string();
        assert!(dump.starts_with("Mealy machine with"));
        assert!(dump.contains("inputs: [req: boolean]"));
        assert!(dump.contains("outputs: [ack: boolean] [loc: {0..2}]"));
        assert!(dump.contains("Sinit -> 1 [req:0 / ack:0, loc:0]"));
    }

    #[test]
    fn test_machine_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Machine>();
    }
}
