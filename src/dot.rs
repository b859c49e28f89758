//! Machine to DOT (Graphviz) conversion.
//!
//! # DOT Format
//!
//! The generated DOT output follows these conventions:
//! - **Initial node** (`Sinit`) is rendered as a point at the top (source rank)
//! - **States** are rendered as circles, labeled with their id and plant location
//! - **Edges** are labeled `input / output`; for Moore machines the output is
//!   printed once inside the state instead
//!
//! # Examples
//!
//! ```
//! use gr1_rs::config::SynthesisConfig;
//! use gr1_rs::expr::Expr;
//! use gr1_rs::spec::Specification;
//! use gr1_rs::synth::{synthesize, Outcome};
//! use gr1_rs::transition::TransitionSystem;
//!
//! let mut ts = TransitionSystem::new();
//! ts.add_states(["a", "b"]).unwrap();
//! ts.add_initial("a").unwrap();
//! ts.add_transition("a", "b").unwrap();
//! ts.add_transition("b", "a").unwrap();
//!
//! let outcome = synthesize(&ts, &Specification::new(), &SynthesisConfig::default()).unwrap();
//! if let Outcome::Realizable(machine) = outcome {
//!     let dot = machine.to_dot().unwrap();
//!     // Write to file and render with: dot -Tpng machine.dot -o machine.png
//!     assert!(dot.starts_with("digraph {"));
//! }
//! ```

use std::fmt::Write as _;

use crate::domain::Valuation;
use crate::machine::{Machine, MachineKind};
use crate::spec::LOCATION_PORT;

/// Configuration options for DOT output generation.
///
/// # Examples
///
/// ```
/// use gr1_rs::dot::DotConfig;
///
/// let config = DotConfig {
///     horizontal: true,
///     ..DotConfig::default()
/// };
/// assert_eq!(config.state_shape, "circle");
/// ```
#[derive(Debug, Clone)]
pub struct DotConfig {
    /// Shape for machine states (default: "circle")
    pub state_shape: &'static str,
    /// Shape for the initial node (default: "point")
    pub init_shape: &'static str,
    /// Lay the graph out left to right (default: false)
    pub horizontal: bool,
    /// Print system values inside states (default: true)
    pub show_valuations: bool,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            state_shape: "circle",
            init_shape: "point",
            horizontal: false,
            show_valuations: true,
        }
    }
}

/// Escapes a label for use inside double quotes.
fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Output without the location port, which is already shown in the state.
fn visible_output(output: &Valuation) -> Valuation {
    output.iter().filter(|(name, _)| *name != LOCATION_PORT).collect()
}

impl Machine {
    /// Converts the machine to DOT (Graphviz) format.
    pub fn to_dot(&self) -> Result<String, std::fmt::Error> {
        self.to_dot_with_config(&DotConfig::default())
    }

    /// Converts the machine to DOT format with custom configuration.
    ///
    /// ```
    /// use gr1_rs::config::SynthesisConfig;
    /// use gr1_rs::dot::DotConfig;
    /// use gr1_rs::spec::Specification;
    /// use gr1_rs::synth::{synthesize, Outcome};
    /// use gr1_rs::transition::TransitionSystem;
    ///
    /// let mut ts = TransitionSystem::new();
    /// ts.add_states(["a"]).unwrap();
    /// ts.add_initial("a").unwrap();
    /// ts.add_transition("a", "a").unwrap();
    ///
    /// let Outcome::Realizable(machine) = synthesize(&ts, &Specification::new(), &SynthesisConfig::default()).unwrap() else {
    ///     unreachable!()
    /// };
    /// let config = DotConfig {
    ///     state_shape: "box",
    ///     ..DotConfig::default()
    /// };
    /// assert!(machine.to_dot_with_config(&config).unwrap().contains("shape=box"));
    /// ```
    pub fn to_dot_with_config(&self, config: &DotConfig) -> Result<String, std::fmt::Error> {
        let moore = self.kind() == MachineKind::Moore;

        let mut dot = String::new();
        writeln!(dot, "digraph {{")?;
        if config.horizontal {
            writeln!(dot, "rankdir=LR;")?;
        }
        writeln!(dot, "node [shape={}];", config.state_shape)?;

        writeln!(dot, "{{ rank=source")?;
        writeln!(dot, "init [shape={}, label=\"\"];", config.init_shape)?;
        writeln!(dot, "}}")?;

        for id in self.states().skip(1) {
            let state = self.state(id).map_err(|_| std::fmt::Error)?;
            let mut label = id.to_string();
            if let Some(name) = state.location.and_then(|location| self.location_name(location)) {
                write!(label, "\\n{}", escape(name))?;
            }
            if config.show_valuations && !state.sys.is_empty() {
                write!(label, "\\n{}", escape(&state.sys.to_string()))?;
            }
            writeln!(dot, "{} [label=\"{}\"];", id.index(), label)?;
        }

        for t in self.transitions() {
            let from = if t.from.is_init() { "init".to_string() } else { t.from.index().to_string() };
            let label = if moore && !t.from.is_init() {
                t.input.to_string()
            } else {
                format!("{} / {}", t.input, visible_output(&t.output))
            };
            writeln!(dot, "{} -> {} [label=\"{}\"];", from, t.to.index(), escape(&label))?;
        }

        writeln!(dot, "}}")?;
        Ok(dot)
    }
}
