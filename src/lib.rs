//! # gr1-rs: GR(1) reactive synthesis in Rust
//!
//! **`gr1-rs`** turns a finite transition system (the *plant*) and a GR(1)
//! specification into a finite-state *transducer*: a Mealy or Moore machine
//! that reads the environment's moves and answers with the system's, such that
//! the specification holds against every environment behaviour allowed by the
//! environment assumptions.
//!
//! ## What is GR(1)?
//!
//! A GR(1) specification is an implication `assumptions -> guarantees`, where
//! each side consists of
//!
//! - *initial* conditions on the first state,
//! - *safety* conditions relating a state to its successor (using `Next`),
//! - *progress* (justice) goals that must hold infinitely often.
//!
//! Synthesis is a two-player game between the environment and the system. The
//! winning region is the greatest fixpoint of a three-level nested fixpoint
//! over controllable predecessors, and a winning strategy is read off the
//! approximants recorded along the way.
//!
//! ## Basic Usage
//!
//! ```rust
//! use gr1_rs::config::SynthesisConfig;
//! use gr1_rs::domain::{Domain, Valuation};
//! use gr1_rs::expr::Expr;
//! use gr1_rs::spec::Specification;
//! use gr1_rs::synth::{synthesize, Outcome};
//! use gr1_rs::transition::TransitionSystem;
//! use gr1_rs::types::NodeId;
//!
//! // 1. Describe the plant
//! let mut ts = TransitionSystem::new();
//! ts.add_states(["home", "road", "work"]).unwrap();
//! ts.add_initial("home").unwrap();
//! for (a, b) in [("home", "road"), ("road", "home"), ("road", "work"), ("work", "road"), ("road", "road")] {
//!     ts.add_transition(a, b).unwrap();
//! }
//! ts.add_label("home", "home").unwrap();
//! ts.add_label("work", "work").unwrap();
//!
//! // 2. Visit home and work forever, but never move while `stop` is raised
//! let spec = Specification::new()
//!     .with_env_var("stop", Domain::Boolean)
//!     .with_env_prog(Expr::var("stop").not())
//!     .with_sys_var("moving", Domain::Boolean)
//!     .with_sys_safe(Expr::var("moving").next().iff(Expr::var("stop").next().not()))
//!     .with_sys_prog(Expr::var("home"))
//!     .with_sys_prog(Expr::var("work"));
//!
//! // 3. Synthesize and run the machine
//! let outcome = synthesize(&ts, &spec, &SynthesisConfig::default()).unwrap();
//! let Outcome::Realizable(machine) = outcome else { panic!("unrealizable") };
//! let (state, output) = machine.step(NodeId::INIT, &Valuation::new().with("stop", 0)).unwrap();
//! assert_eq!(output.get("loc"), Some(0));
//! assert!(!state.is_init());
//! ```
//!
//! ## Core Components
//!
//! - **[`transition`]** and **[`spec`]**: the inputs, built with builder methods.
//! - **[`game`]**: the product game graph of plant and variable valuations.
//! - **[`solver`]**: the GR(1) fixpoint over any [`SymbolicSet`][crate::symbolic::SymbolicSet].
//! - **[`strategy`]**: deterministic strategy extraction from the approximants.
//! - **[`machine`]**: the resulting transducer, with stepping, simulation and minimization.
//! - **[`synth`]**: the one-call [`synthesize`][crate::synth::synthesize] pipeline.
//! - **[`dot`]**: Graphviz export of machines.

pub mod bitset;
pub mod config;
pub mod domain;
pub mod dot;
pub mod error;
pub mod expr;
pub mod game;
pub mod machine;
pub mod solver;
pub mod spec;
pub mod strategy;
pub mod symbolic;
pub mod synth;
pub mod transition;
pub mod types;
