//! Behavioural properties of synthesized machines.

use gr1_rs::config::SynthesisConfig;
use gr1_rs::domain::{Domain, Valuation};
use gr1_rs::expr::Expr;
use gr1_rs::machine::{Machine, UniformInputs};
use gr1_rs::spec::{InitMode, Specification};
use gr1_rs::synth::{synthesize, Outcome};
use gr1_rs::transition::TransitionSystem;
use gr1_rs::types::NodeId;

/// A 3×3 grid with self-loops; `c0` is the start, `c2` and `c6` are corners,
/// `c4` is the centre.
fn grid() -> TransitionSystem {
    let mut ts = TransitionSystem::new();
    let names: Vec<String> = (0..9).map(|i| format!("c{}", i)).collect();
    ts.add_states(names.iter().cloned()).unwrap();
    ts.add_initial("c0").unwrap();
    for i in 0..9 {
        ts.add_transition(&names[i], &names[i]).unwrap();
        if i % 3 < 2 {
            ts.add_transition(&names[i], &names[i + 1]).unwrap();
            ts.add_transition(&names[i + 1], &names[i]).unwrap();
        }
        if i < 6 {
            ts.add_transition(&names[i], &names[i + 3]).unwrap();
            ts.add_transition(&names[i + 3], &names[i]).unwrap();
        }
    }
    ts.add_label("c2", "north").unwrap();
    ts.add_label("c6", "south").unwrap();
    ts.add_label("c4", "centre").unwrap();
    ts
}

/// Patrol both corners; never cross the centre while the environment signals `alarm`.
fn patrol() -> Specification {
    Specification::new()
        .with_env_var("alarm", Domain::Boolean)
        .with_env_prog(Expr::var("alarm").not())
        .with_sys_var("light", Domain::Boolean)
        .with_sys_safe(Expr::var("alarm").next().implies(Expr::var("centre").next().not()))
        .with_sys_safe(Expr::var("light").next().iff(Expr::var("alarm").next()))
        .with_sys_prog(Expr::var("north"))
        .with_sys_prog(Expr::var("south"))
}

fn machine(ts: &TransitionSystem, spec: &Specification) -> Machine {
    match synthesize(ts, spec, &SynthesisConfig::default()).unwrap() {
        Outcome::Realizable(machine) => machine,
        Outcome::Unrealizable => panic!("expected a realizable specification"),
    }
}

fn location(output: &Valuation) -> usize {
    output.get("loc").unwrap() as usize
}

// ─── Determinism ───────────────────────────────────────────────────────────────

#[test]
fn repeated_synthesis_is_identical() {
    let a = machine(&grid(), &patrol());
    let b = machine(&grid(), &patrol());
    assert_eq!(a, b);
    assert_eq!(a.to_string(), b.to_string());
}

#[test]
fn parallel_and_sequential_agree() {
    let parallel = synthesize(&grid(), &patrol(), &SynthesisConfig::default().with_parallel(true)).unwrap();
    let sequential = synthesize(&grid(), &patrol(), &SynthesisConfig::default().with_parallel(false)).unwrap();
    assert_eq!(parallel, sequential);
}

#[test]
fn seeded_simulation_is_reproducible() {
    let m = machine(&grid(), &patrol());
    let a: Vec<_> = m.simulate(NodeId::INIT, 50, UniformInputs::new(3)).unwrap().iter().collect();
    let b: Vec<_> = m.simulate(NodeId::INIT, 50, UniformInputs::new(3)).unwrap().iter().collect();
    assert_eq!(a, b);
}

// ─── Safety ────────────────────────────────────────────────────────────────────

#[test]
fn every_transition_is_safe() {
    let ts = grid();
    let m = machine(&ts, &patrol());
    let centre = ts.state("c4").unwrap().index();
    for t in m.transitions() {
        if t.input.get("alarm") == Some(1) && !t.from.is_init() {
            assert_ne!(location(&t.output), centre);
        }
        if !t.from.is_init() {
            assert_eq!(t.output.get("light"), t.input.get("alarm"));
        }
    }
}

#[test]
fn every_input_is_answered() {
    let m = machine(&grid(), &patrol());
    for id in m.states() {
        let inputs: Vec<_> = m.admissible_inputs(id).unwrap().cloned().collect();
        assert_eq!(inputs.len(), 2, "state {}", id);
        for input in &inputs {
            assert!(m.step(id, input).is_ok());
        }
    }
}

// ─── Progress ──────────────────────────────────────────────────────────────────

#[test]
fn goals_recur_on_every_run() {
    // Without environment cooperation only `light` could be blocked, not the patrol:
    // every window longer than the machine visits both corners.
    let ts = grid();
    let spec = Specification::new()
        .with_env_var("alarm", Domain::Boolean)
        .with_sys_var("light", Domain::Boolean)
        .with_sys_safe(Expr::var("light").next().iff(Expr::var("alarm").next()))
        .with_sys_prog(Expr::var("north"))
        .with_sys_prog(Expr::var("south"));
    let m = machine(&ts, &spec);
    let north = ts.state("c2").unwrap().index();
    let south = ts.state("c6").unwrap().index();
    let window = m.num_states() + 1;

    for seed in 0..5 {
        let trace: Vec<_> = m
            .simulate(NodeId::INIT, 4 * window, UniformInputs::new(seed))
            .unwrap()
            .iter()
            .collect();
        assert_eq!(trace.len(), 4 * window);
        for chunk in trace.windows(window) {
            assert!(chunk.iter().any(|s| location(&s.output) == north));
            assert!(chunk.iter().any(|s| location(&s.output) == south));
        }
    }
}

// ─── Monotonicity ──────────────────────────────────────────────────────────────

fn stubborn() -> (TransitionSystem, Specification) {
    let mut ts = TransitionSystem::new();
    ts.add_states(["p", "q"]).unwrap();
    ts.add_initial("p").unwrap();
    for (a, b) in [("p", "p"), ("p", "q"), ("q", "p"), ("q", "q")] {
        ts.add_transition(a, b).unwrap();
    }
    ts.add_label("q", "goal").unwrap();
    let spec = Specification::new()
        .with_env_var("block", Domain::Boolean)
        .with_sys_safe(Expr::var("block").next().implies(Expr::var("goal").next().not()))
        .with_sys_prog(Expr::var("goal"));
    (ts, spec)
}

#[test]
fn stronger_assumptions_preserve_realizability() {
    let (ts, spec) = stubborn();
    let config = SynthesisConfig::default();
    assert_eq!(synthesize(&ts, &spec, &config).unwrap(), Outcome::Unrealizable);

    let assumed = spec.with_env_prog(Expr::var("block").not());
    assert!(synthesize(&ts, &assumed, &config).unwrap().is_realizable());

    let stronger = assumed.with_env_safe(Expr::var("block").implies(Expr::var("block").next().not()));
    assert!(synthesize(&ts, &stronger, &config).unwrap().is_realizable());
}

#[test]
fn weaker_guarantees_preserve_realizability() {
    let config = SynthesisConfig::default();
    assert!(synthesize(&grid(), &patrol(), &config).unwrap().is_realizable());

    let weaker = Specification::new()
        .with_env_var("alarm", Domain::Boolean)
        .with_env_prog(Expr::var("alarm").not())
        .with_sys_var("light", Domain::Boolean)
        .with_sys_safe(Expr::var("alarm").next().implies(Expr::var("centre").next().not()))
        .with_sys_prog(Expr::var("north"));
    assert!(synthesize(&grid(), &weaker, &config).unwrap().is_realizable());
}

// ─── Re-synthesis ──────────────────────────────────────────────────────────────

#[test]
fn machine_as_plant_is_realizable_again() {
    let ts = grid();
    let spec = patrol();
    let m = machine(&ts, &spec);

    let plant = m.to_transition_system(&ts).unwrap();
    assert_eq!(plant.propositions(), ts.propositions());
    assert!(plant.initial().count() >= 1);
    assert!(synthesize(&plant, &spec, &SynthesisConfig::default()).unwrap().is_realizable());
}

#[test]
fn machine_as_plant_keeps_labels() {
    let ts = grid();
    let m = machine(&ts, &patrol());
    let plant = m.to_transition_system(&ts).unwrap();
    for s in plant.states() {
        let base = plant.name(s).split('[').next().unwrap();
        let original = ts.state(base).unwrap();
        assert_eq!(plant.labels(s), ts.labels(original));
    }
}

// ─── Initialization modes ──────────────────────────────────────────────────────

#[test]
fn forall_env_exists_sys_can_react_initially() {
    let mut ts = TransitionSystem::new();
    ts.add_states(["x"]).unwrap();
    ts.add_initial("x").unwrap();
    ts.add_transition("x", "x").unwrap();

    // The initial `copy` must equal the initial `bit`.
    let spec = Specification::new()
        .with_env_var("bit", Domain::Boolean)
        .with_sys_var("copy", Domain::Boolean)
        .with_sys_init(Expr::var("copy").iff(Expr::var("bit")));
    let config = SynthesisConfig::default();

    let exists_first = spec.clone().with_init_mode(InitMode::ExistsSysForallEnv);
    assert_eq!(synthesize(&ts, &exists_first, &config).unwrap(), Outcome::Unrealizable);

    let forall_first = spec.with_init_mode(InitMode::ForallEnvExistsSys);
    let m = synthesize(&ts, &forall_first, &config).unwrap().into_machine().unwrap();
    for t in m.transitions_from(NodeId::INIT).unwrap() {
        assert_eq!(t.output.get("copy"), t.input.get("bit"));
    }
}
