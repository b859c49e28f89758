//! Synthesizes a parking controller for a car on a 2×3 grid.
//!
//! ```text
//! s3 - s4 - s5 (lot)
//! |    |    |
//! s0 - s1 - s2
//! (home)
//! ```
//!
//! The car must return home infinitely often and, whenever the environment
//! raises `park`, eventually reach the lot.

use std::path::PathBuf;

use clap::Parser;
use log::info;

use gr1_rs::config::SynthesisConfig;
use gr1_rs::domain::Domain;
use gr1_rs::expr::Expr;
use gr1_rs::machine::UniformInputs;
use gr1_rs::spec::{InitMode, Specification};
use gr1_rs::synth::{synthesize, Outcome};
use gr1_rs::transition::TransitionSystem;
use gr1_rs::types::{NodeId, StateId};

#[derive(Debug, Parser)]
#[command(author, version)]
struct Cli {
    /// Number of simulated steps.
    #[arg(value_name = "INT", default_value = "10")]
    steps: usize,

    /// Seed of the simulated environment.
    #[clap(long, value_name = "INT", default_value = "0")]
    seed: u64,

    /// Use Mealy semantics instead of Moore.
    #[clap(long)]
    mealy: bool,

    /// Merge bisimilar machine states.
    #[clap(long)]
    minimize: bool,

    /// Write the machine in DOT format to this file.
    #[clap(long, value_name = "FILE")]
    dot: Option<PathBuf>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    simplelog::TermLogger::init(
        simplelog::LevelFilter::Info,
        simplelog::Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )?;

    let time_total = std::time::Instant::now();

    let args = Cli::parse();
    println!("args = {:?}", args);

    let mut ts = TransitionSystem::new();
    ts.add_states(["s0", "s1", "s2", "s3", "s4", "s5"])?;
    ts.add_initial("s0")?;
    for s in ["s0", "s1", "s2", "s3", "s4", "s5"] {
        ts.add_transition(s, s)?;
    }
    for (a, b) in [("s0", "s1"), ("s0", "s3"), ("s1", "s2"), ("s1", "s4"), ("s2", "s5"), ("s3", "s4"), ("s4", "s5")] {
        ts.add_transition(a, b)?;
        ts.add_transition(b, a)?;
    }
    ts.add_label("s0", "home")?;
    ts.add_label("s5", "lot")?;

    // X0reach is false while a parking request is pending.
    let reach = || Expr::var("X0reach");
    let spec = Specification::new()
        .with_env_var("park", Domain::Boolean)
        .with_env_prog(Expr::var("park").not())
        .with_sys_var("X0reach", Domain::Boolean)
        .with_sys_init(reach())
        .with_sys_safe(
            reach()
                .next()
                .iff(Expr::var("lot"))
                .or(reach().and(Expr::var("park").not())),
        )
        .with_sys_prog(Expr::var("home"))
        .with_sys_prog(reach())
        .with_moore(!args.mealy)
        .with_init_mode(InitMode::ExistsSysForallEnv);

    for formula in spec.sys_safe() {
        info!("sys_safe: {}", formula);
    }

    let config = SynthesisConfig::default().with_minimize(args.minimize);
    let machine = match synthesize(&ts, &spec, &config)? {
        Outcome::Realizable(machine) => machine,
        Outcome::Unrealizable => {
            println!("Specification is unrealizable");
            return Ok(());
        }
    };
    println!("{}", machine);

    if let Some(path) = &args.dot {
        std::fs::write(path, machine.to_dot()?)?;
        println!("Wrote DOT to {}", path.display());
    }

    println!("Simulating {} steps (seed = {}):", args.steps, args.seed);
    let simulation = machine.simulate(NodeId::INIT, args.steps, UniformInputs::new(args.seed))?;
    for (i, step) in simulation.iter().enumerate() {
        let location = step
            .output
            .get("loc")
            .and_then(|loc| machine.location_name(StateId::new(loc as usize)))
            .unwrap_or("?");
        println!("{:>3}: {} [{}] -> {} / {}", i, step.state, step.input, location, step.output);
    }

    let time_total = time_total.elapsed();
    println!("Done in {:.3} s", time_total.as_secs_f64());

    Ok(())
}
