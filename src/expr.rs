//! Structured formulas over variables and atomic propositions.
//!
//! Formulas are built as [`Expr`] trees (no text parsing is involved) and
//! compiled against a [`Scope`] into a flat arena ([`Compiled`]) whose nodes are
//! topologically sorted: every operand precedes its operator, so evaluation is a
//! single forward pass.
//!
//! All values are integers; boolean results are `0` or `1` and any non-zero
//! value counts as true.

use std::fmt;

use crate::bitset::BitSet;
use crate::error::SpecError;
use crate::types::{value_of, Value};

/// Comparison operators.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CmpOp {
    fn apply(self, a: Value, b: Value) -> bool {
        match self {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            CmpOp::Lt => a < b,
            CmpOp::Le => a <= b,
            CmpOp::Gt => a > b,
            CmpOp::Ge => a >= b,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
        }
    }
}

/// Formula abstract syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Integer (or boolean) constant
    Const(Value),
    /// Variable or atomic proposition, by name
    Ref(String),
    /// Value at the next step: X φ
    Next(Box<Expr>),
    /// Negation
    Not(Box<Expr>),
    /// Conjunction
    And(Box<Expr>, Box<Expr>),
    /// Disjunction
    Or(Box<Expr>, Box<Expr>),
    /// Implication
    Implies(Box<Expr>, Box<Expr>),
    /// Equivalence
    Iff(Box<Expr>, Box<Expr>),
    /// Integer comparison
    Cmp(CmpOp, Box<Expr>, Box<Expr>),
    /// Integer addition
    Add(Box<Expr>, Box<Expr>),
    /// Integer subtraction
    Sub(Box<Expr>, Box<Expr>),
}

impl Expr {
    pub fn tt() -> Self {
        Expr::Const(1)
    }

    pub fn ff() -> Self {
        Expr::Const(0)
    }

    pub fn int(value: Value) -> Self {
        Expr::Const(value)
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::Ref(name.into())
    }

    pub fn next(self) -> Self {
        Expr::Next(Box::new(self))
    }

    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    pub fn and(self, other: Self) -> Self {
        Expr::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Self) -> Self {
        Expr::Or(Box::new(self), Box::new(other))
    }

    pub fn implies(self, other: Self) -> Self {
        Expr::Implies(Box::new(self), Box::new(other))
    }

    pub fn iff(self, other: Self) -> Self {
        Expr::Iff(Box::new(self), Box::new(other))
    }

    pub fn equals(self, other: Self) -> Self {
        Expr::Cmp(CmpOp::Eq, Box::new(self), Box::new(other))
    }

    pub fn not_equals(self, other: Self) -> Self {
        Expr::Cmp(CmpOp::Ne, Box::new(self), Box::new(other))
    }

    pub fn less(self, other: Self) -> Self {
        Expr::Cmp(CmpOp::Lt, Box::new(self), Box::new(other))
    }

    pub fn less_eq(self, other: Self) -> Self {
        Expr::Cmp(CmpOp::Le, Box::new(self), Box::new(other))
    }

    pub fn greater(self, other: Self) -> Self {
        Expr::Cmp(CmpOp::Gt, Box::new(self), Box::new(other))
    }

    pub fn greater_eq(self, other: Self) -> Self {
        Expr::Cmp(CmpOp::Ge, Box::new(self), Box::new(other))
    }

    pub fn plus(self, other: Self) -> Self {
        Expr::Add(Box::new(self), Box::new(other))
    }

    pub fn minus(self, other: Self) -> Self {
        Expr::Sub(Box::new(self), Box::new(other))
    }

    /// Conjunction of all formulas (`true` when empty).
    pub fn all(exprs: impl IntoIterator<Item = Expr>) -> Self {
        exprs.into_iter().reduce(Expr::and).unwrap_or_else(Expr::tt)
    }

    /// Disjunction of all formulas (`false` when empty).
    pub fn any(exprs: impl IntoIterator<Item = Expr>) -> Self {
        exprs.into_iter().reduce(Expr::or).unwrap_or_else(Expr::ff)
    }

    /// Returns true if the formula mentions `X` anywhere.
    pub fn is_temporal(&self) -> bool {
        match self {
            Expr::Const(_) | Expr::Ref(_) => false,
            Expr::Next(_) => true,
            Expr::Not(a) => a.is_temporal(),
            Expr::And(a, b)
            | Expr::Or(a, b)
            | Expr::Implies(a, b)
            | Expr::Iff(a, b)
            | Expr::Cmp(_, a, b)
            | Expr::Add(a, b)
            | Expr::Sub(a, b) => a.is_temporal() || b.is_temporal(),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(v) => write!(f, "{}", v),
            Expr::Ref(name) => write!(f, "{}", name),
            Expr::Next(a) => write!(f, "X({})", a),
            Expr::Not(a) => write!(f, "!{}", a),
            Expr::And(a, b) => write!(f, "({} && {})", a, b),
            Expr::Or(a, b) => write!(f, "({} || {})", a, b),
            Expr::Implies(a, b) => write!(f, "({} -> {})", a, b),
            Expr::Iff(a, b) => write!(f, "({} <-> {})", a, b),
            Expr::Cmp(op, a, b) => write!(f, "({} {} {})", a, op.symbol(), b),
            Expr::Add(a, b) => write!(f, "({} + {})", a, b),
            Expr::Sub(a, b) => write!(f, "({} - {})", a, b),
        }
    }
}

/// What a name resolves to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    /// Index into the game's variable vector.
    Var(usize),
    /// Index into the plant's proposition table.
    Prop(usize),
}

/// Name resolution for compilation.
pub trait Scope {
    fn resolve(&self, name: &str) -> Option<Slot>;
}

/// A single read performed by a compiled formula.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Read {
    pub slot: Slot,
    pub next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Op {
    Const(Value),
    Load(Read),
    Not(usize),
    And(usize, usize),
    Or(usize, usize),
    Implies(usize, usize),
    Iff(usize, usize),
    Cmp(CmpOp, usize, usize),
    Add(usize, usize),
    Sub(usize, usize),
}

/// One step's worth of data a formula is evaluated on.
#[derive(Debug, Copy, Clone)]
pub struct Frame<'a> {
    /// Values of all variables, indexed as resolved by the [`Scope`].
    pub values: &'a [Value],
    /// Propositions true in the current plant state.
    pub props: &'a BitSet,
}

/// A formula compiled into a topologically sorted arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    /// Operands always precede their operator; the root is last.
    ops: Vec<Op>,
    reads: Vec<Read>,
    source: String,
}

impl Compiled {
    /// Compiles `expr`, resolving every name through `scope`.
    pub fn new(expr: &Expr, scope: &impl Scope) -> Result<Self, SpecError> {
        let mut compiled = Compiled {
            ops: Vec::new(),
            reads: Vec::new(),
            source: expr.to_string(),
        };
        compiled.emit(expr, false, scope)?;
        Ok(compiled)
    }

    fn push(&mut self, op: Op) -> usize {
        self.ops.push(op);
        self.ops.len() - 1
    }

    fn emit(&mut self, expr: &Expr, in_next: bool, scope: &impl Scope) -> Result<usize, SpecError> {
        let op = match expr {
            Expr::Const(v) => Op::Const(*v),
            Expr::Ref(name) => {
                let slot = scope.resolve(name).ok_or_else(|| SpecError::UndeclaredName {
                    name: name.clone(),
                    formula: self.source.clone(),
                })?;
                let read = Read { slot, next: in_next };
                if !self.reads.contains(&read) {
                    self.reads.push(read);
                }
                Op::Load(read)
            }
            Expr::Next(a) => {
                if in_next {
                    return Err(SpecError::NestedNext {
                        formula: self.source.clone(),
                    });
                }
                return self.emit(a, true, scope);
            }
            Expr::Not(a) => Op::Not(self.emit(a, in_next, scope)?),
            Expr::And(a, b) => Op::And(self.emit(a, in_next, scope)?, self.emit(b, in_next, scope)?),
            Expr::Or(a, b) => Op::Or(self.emit(a, in_next, scope)?, self.emit(b, in_next, scope)?),
            Expr::Implies(a, b) => Op::Implies(self.emit(a, in_next, scope)?, self.emit(b, in_next, scope)?),
            Expr::Iff(a, b) => Op::Iff(self.emit(a, in_next, scope)?, self.emit(b, in_next, scope)?),
            Expr::Cmp(op, a, b) => Op::Cmp(*op, self.emit(a, in_next, scope)?, self.emit(b, in_next, scope)?),
            Expr::Add(a, b) => Op::Add(self.emit(a, in_next, scope)?, self.emit(b, in_next, scope)?),
            Expr::Sub(a, b) => Op::Sub(self.emit(a, in_next, scope)?, self.emit(b, in_next, scope)?),
        };
        Ok(self.push(op))
    }

    /// Every distinct read the formula performs.
    pub fn reads(&self) -> &[Read] {
        &self.reads
    }

    /// Returns true if the formula reads any next-step value.
    pub fn reads_next(&self) -> bool {
        self.reads.iter().any(|r| r.next)
    }

    /// The formula this arena was compiled from, as text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluates the formula.
    ///
    /// # Panics
    ///
    /// Panics if the formula reads a next-step value and `next` is `None`.
    pub fn eval(&self, current: Frame<'_>, next: Option<Frame<'_>>) -> Value {
        let mut results: Vec<Value> = Vec::with_capacity(self.ops.len());
        for op in &self.ops {
            let value = match *op {
                Op::Const(v) => v,
                Op::Load(read) => {
                    let frame = if read.next {
                        next.unwrap_or_else(|| panic!("formula `{}` needs a next-step frame", self.source))
                    } else {
                        current
                    };
                    match read.slot {
                        Slot::Var(i) => frame.values[i],
                        Slot::Prop(p) => value_of(frame.props.contains(p)),
                    }
                }
                Op::Not(a) => value_of(results[a] == 0),
                Op::And(a, b) => value_of(results[a] != 0 && results[b] != 0),
                Op::Or(a, b) => value_of(results[a] != 0 || results[b] != 0),
                Op::Implies(a, b) => value_of(results[a] == 0 || results[b] != 0),
                Op::Iff(a, b) => value_of((results[a] != 0) == (results[b] != 0)),
                Op::Cmp(op, a, b) => value_of(op.apply(results[a], results[b])),
                Op::Add(a, b) => results[a].wrapping_add(results[b]),
                Op::Sub(a, b) => results[a].wrapping_sub(results[b]),
            };
            results.push(value);
        }
        results.last().copied().unwrap_or(1)
    }

    /// Evaluates the formula as a predicate.
    pub fn holds(&self, current: Frame<'_>, next: Option<Frame<'_>>) -> bool {
        self.eval(current, next) != 0
    }
}
