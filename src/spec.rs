//! GR(1) specifications.
//!
//! A [`Specification`] partitions the variables between the environment and
//! the system and holds the six formula classes of a GR(1) game:
//!
//! | class      | meaning                                   | `X` allowed |
//! |------------|-------------------------------------------|-------------|
//! | `env_init` | initial environment values                | no          |
//! | `env_safe` | admissible environment moves              | env vars    |
//! | `env_prog` | environment justice, holds infinitely often | no        |
//! | `sys_init` | initial system values                     | no          |
//! | `sys_safe` | admissible system responses               | yes         |
//! | `sys_prog` | system goals, achieved infinitely often   | no          |
//!
//! Formulas may reference environment variables, system variables, and the
//! atomic propositions of the plant. Validation happens when the
//! specification is compiled against a plant ([`Specification::compile`]).

use std::collections::{HashMap, HashSet};

use crate::domain::{Domain, Variable};
use crate::error::SpecError;
use crate::expr::{Compiled, Expr, Read, Scope, Slot};
use crate::transition::TransitionSystem;

/// The name of the output port carrying the plant location.
pub const LOCATION_PORT: &str = "loc";

/// How initial values are quantified when deciding realizability.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum InitMode {
    /// ∃ system initial values (and plant state) ∀ environment initial values.
    #[default]
    ExistsSysForallEnv,
    /// ∀ environment initial values ∃ system initial values (and plant state).
    ForallEnvExistsSys,
}

/// A GR(1) specification.
///
/// # Examples
///
/// ```
/// use gr1_rs::domain::Domain;
/// use gr1_rs::expr::Expr;
/// use gr1_rs::spec::Specification;
///
/// let spec = Specification::new()
///     .with_env_var("req", Domain::Boolean)
///     .with_sys_var("grant", Domain::Boolean)
///     .with_sys_safe(Expr::var("req").next().implies(Expr::var("grant").next()))
///     .with_sys_prog(Expr::var("grant"));
/// assert_eq!(spec.sys_vars().len(), 1);
/// assert!(!spec.is_moore());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Specification {
    env_vars: Vec<Variable>,
    sys_vars: Vec<Variable>,
    env_init: Vec<Expr>,
    env_safe: Vec<Expr>,
    env_prog: Vec<Expr>,
    sys_init: Vec<Expr>,
    sys_safe: Vec<Expr>,
    sys_prog: Vec<Expr>,
    moore: bool,
    init_mode: InitMode,
}

impl Specification {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_env_var(mut self, name: impl Into<String>, domain: Domain) -> Self {
        self.env_vars.push(Variable::new(name, domain));
        self
    }

    pub fn with_sys_var(mut self, name: impl Into<String>, domain: Domain) -> Self {
        self.sys_vars.push(Variable::new(name, domain));
        self
    }

    pub fn with_env_init(mut self, formula: Expr) -> Self {
        self.env_init.push(formula);
        self
    }

    pub fn with_env_safe(mut self, formula: Expr) -> Self {
        self.env_safe.push(formula);
        self
    }

    pub fn with_env_prog(mut self, formula: Expr) -> Self {
        self.env_prog.push(formula);
        self
    }

    pub fn with_sys_init(mut self, formula: Expr) -> Self {
        self.sys_init.push(formula);
        self
    }

    pub fn with_sys_safe(mut self, formula: Expr) -> Self {
        self.sys_safe.push(formula);
        self
    }

    pub fn with_sys_prog(mut self, formula: Expr) -> Self {
        self.sys_prog.push(formula);
        self
    }

    /// Selects Moore semantics: the system commits before seeing the environment's move.
    pub fn with_moore(mut self, moore: bool) -> Self {
        self.moore = moore;
        self
    }

    pub fn with_init_mode(mut self, init_mode: InitMode) -> Self {
        self.init_mode = init_mode;
        self
    }

    pub fn env_vars(&self) -> &[Variable] {
        &self.env_vars
    }

    pub fn sys_vars(&self) -> &[Variable] {
        &self.sys_vars
    }

    pub fn env_init(&self) -> &[Expr] {
        &self.env_init
    }

    pub fn env_safe(&self) -> &[Expr] {
        &self.env_safe
    }

    pub fn env_prog(&self) -> &[Expr] {
        &self.env_prog
    }

    pub fn sys_init(&self) -> &[Expr] {
        &self.sys_init
    }

    pub fn sys_safe(&self) -> &[Expr] {
        &self.sys_safe
    }

    pub fn sys_prog(&self) -> &[Expr] {
        &self.sys_prog
    }

    pub fn is_moore(&self) -> bool {
        self.moore
    }

    pub fn init_mode(&self) -> InitMode {
        self.init_mode
    }

    /// Checks the variable declarations against the plant's propositions.
    pub fn validate(&self, ts: &TransitionSystem) -> Result<(), SpecError> {
        let env_names: HashSet<&str> = self.env_vars.iter().map(|v| v.name.as_str()).collect();
        let mut seen_env = HashSet::new();
        for var in &self.env_vars {
            if !seen_env.insert(var.name.as_str()) {
                return Err(SpecError::DuplicateVariable { name: var.name.clone() });
            }
        }
        let mut seen_sys = HashSet::new();
        for var in &self.sys_vars {
            if env_names.contains(var.name.as_str()) {
                return Err(SpecError::VariableCollision { name: var.name.clone() });
            }
            if !seen_sys.insert(var.name.as_str()) {
                return Err(SpecError::DuplicateVariable { name: var.name.clone() });
            }
        }
        for var in self.env_vars.iter().chain(&self.sys_vars) {
            if var.name == LOCATION_PORT {
                return Err(SpecError::ReservedName { name: var.name.clone() });
            }
            if ts.propositions().contains(&var.name) {
                return Err(SpecError::ShadowedProposition { name: var.name.clone() });
            }
            if var.domain.is_empty() {
                return Err(SpecError::EmptyDomain { name: var.name.clone() });
            }
        }
        Ok(())
    }

    /// Validates the specification and compiles every formula against the plant.
    pub fn compile(&self, ts: &TransitionSystem) -> Result<CompiledSpec, SpecError> {
        self.validate(ts)?;
        let layout = Layout::new(self, ts);

        let env_init = layout.compile_class(&self.env_init, FormulaClass::EnvInit)?;
        let env_safe = layout.compile_class(&self.env_safe, FormulaClass::EnvSafe)?;
        let env_prog = layout.compile_class(&self.env_prog, FormulaClass::EnvProg)?;
        let sys_init = layout.compile_class(&self.sys_init, FormulaClass::SysInit)?;
        let sys_safe = layout.compile_class(&self.sys_safe, FormulaClass::SysSafe)?;
        let sys_prog = layout.compile_class(&self.sys_prog, FormulaClass::SysProg)?;

        Ok(CompiledSpec {
            layout,
            env_init,
            env_safe,
            env_prog,
            sys_init,
            sys_safe,
            sys_prog,
            moore: self.moore,
            init_mode: self.init_mode,
        })
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum FormulaClass {
    EnvInit,
    EnvSafe,
    EnvProg,
    SysInit,
    SysSafe,
    SysProg,
}

impl FormulaClass {
    fn name(self) -> &'static str {
        match self {
            FormulaClass::EnvInit => "env_init",
            FormulaClass::EnvSafe => "env_safe",
            FormulaClass::EnvProg => "env_prog",
            FormulaClass::SysInit => "sys_init",
            FormulaClass::SysSafe => "sys_safe",
            FormulaClass::SysProg => "sys_prog",
        }
    }

    fn allows_next(self) -> bool {
        matches!(self, FormulaClass::EnvSafe | FormulaClass::SysSafe)
    }
}

/// Variable and proposition indexing shared by every compiled formula.
///
/// Environment variables come first, then system variables.
/// Propositions are indexed in sorted name order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    vars: Vec<Variable>,
    num_env: usize,
    props: Vec<String>,
    index: HashMap<String, Slot>,
}

impl Layout {
    fn new(spec: &Specification, ts: &TransitionSystem) -> Self {
        let vars: Vec<Variable> = spec.env_vars.iter().chain(&spec.sys_vars).cloned().collect();
        let props: Vec<String> = ts.propositions().iter().cloned().collect();
        let mut index = HashMap::new();
        for (i, var) in vars.iter().enumerate() {
            index.insert(var.name.clone(), Slot::Var(i));
        }
        for (p, prop) in props.iter().enumerate() {
            index.insert(prop.clone(), Slot::Prop(p));
        }
        Layout {
            vars,
            num_env: spec.env_vars.len(),
            props,
            index,
        }
    }

    /// All variables, environment first.
    pub fn vars(&self) -> &[Variable] {
        &self.vars
    }

    pub fn env_vars(&self) -> &[Variable] {
        &self.vars[..self.num_env]
    }

    pub fn sys_vars(&self) -> &[Variable] {
        &self.vars[self.num_env..]
    }

    pub fn num_env(&self) -> usize {
        self.num_env
    }

    pub fn props(&self) -> &[String] {
        &self.props
    }

    pub fn prop_index(&self, name: &str) -> Option<usize> {
        match self.index.get(name) {
            Some(Slot::Prop(p)) => Some(*p),
            _ => None,
        }
    }

    fn slot_name(&self, slot: Slot) -> &str {
        match slot {
            Slot::Var(i) => &self.vars[i].name,
            Slot::Prop(p) => &self.props[p],
        }
    }

    fn is_env(&self, slot: Slot) -> bool {
        matches!(slot, Slot::Var(i) if i < self.num_env)
    }

    fn compile_class(&self, formulas: &[Expr], class: FormulaClass) -> Result<Vec<Compiled>, SpecError> {
        formulas.iter().map(|f| self.compile_formula(f, class)).collect()
    }

    fn compile_formula(&self, formula: &Expr, class: FormulaClass) -> Result<Compiled, SpecError> {
        let compiled = Compiled::new(formula, self)?;
        if compiled.reads_next() && !class.allows_next() {
            return Err(SpecError::UnexpectedNext {
                class: class.name(),
                formula: compiled.source().to_string(),
            });
        }
        let forbidden = |read: &Read| match class {
            FormulaClass::EnvInit => !self.is_env(read.slot),
            FormulaClass::EnvSafe => read.next && !self.is_env(read.slot),
            _ => false,
        };
        if let Some(read) = compiled.reads().iter().find(|r| forbidden(r)) {
            let name = self.slot_name(read.slot);
            return Err(SpecError::ForbiddenRead {
                class: class.name(),
                formula: compiled.source().to_string(),
                name: if read.next { format!("X({})", name) } else { name.to_string() },
            });
        }
        Ok(compiled)
    }
}

impl Scope for Layout {
    fn resolve(&self, name: &str) -> Option<Slot> {
        self.index.get(name).copied()
    }
}

/// A validated specification with every formula compiled against one plant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledSpec {
    pub layout: Layout,
    pub env_init: Vec<Compiled>,
    pub env_safe: Vec<Compiled>,
    pub env_prog: Vec<Compiled>,
    pub sys_init: Vec<Compiled>,
    pub sys_safe: Vec<Compiled>,
    pub sys_prog: Vec<Compiled>,
    pub moore: bool,
    pub init_mode: InitMode,
}
