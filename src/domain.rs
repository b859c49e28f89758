//! Finite variable domains and valuations.

use std::collections::BTreeMap;
use std::fmt;

use crate::types::Value;

/// The finite set of values a variable may take.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Domain {
    /// `{0, 1}`, printed as `boolean`.
    Boolean,
    /// Inclusive integer range `lo..=hi`.
    Range { lo: Value, hi: Value },
    /// Explicit set of integers (kept sorted and deduplicated).
    Values(Vec<Value>),
}

impl Domain {
    pub fn range(lo: Value, hi: Value) -> Self {
        Domain::Range { lo, hi }
    }

    pub fn values(values: impl IntoIterator<Item = Value>) -> Self {
        let mut values: Vec<Value> = values.into_iter().collect();
        values.sort_unstable();
        values.dedup();
        Domain::Values(values)
    }

    /// Number of values in the domain.
    pub fn size(&self) -> u64 {
        match self {
            Domain::Boolean => 2,
            Domain::Range { lo, hi } => {
                if hi < lo {
                    0
                } else {
                    (*hi as i128 - *lo as i128 + 1) as u64
                }
            }
            Domain::Values(values) => values.len() as u64,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn contains(&self, value: Value) -> bool {
        match self {
            Domain::Boolean => value == 0 || value == 1,
            Domain::Range { lo, hi } => *lo <= value && value <= *hi,
            Domain::Values(values) => values.binary_search(&value).is_ok(),
        }
    }

    /// All values of the domain, in increasing order.
    pub fn to_vec(&self) -> Vec<Value> {
        match self {
            Domain::Boolean => vec![0, 1],
            Domain::Range { lo, hi } => (*lo..=*hi).collect(),
            Domain::Values(values) => values.clone(),
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Domain::Boolean => write!(f, "boolean"),
            Domain::Range { lo, hi } => write!(f, "{{{}..{}}}", lo, hi),
            Domain::Values(values) => {
                write!(f, "{{")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// A named finite-domain variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    pub name: String,
    pub domain: Domain,
}

impl Variable {
    pub fn new(name: impl Into<String>, domain: Domain) -> Self {
        Variable {
            name: name.into(),
            domain,
        }
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Variable::new(name, Domain::Boolean)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.domain)
    }
}

/// An assignment of values to variable names.
///
/// Ordered by name so that printing and comparison are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Valuation(BTreeMap<String, Value>);

impl Valuation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.0.insert(name.into(), value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Value)> {
        self.0.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// Returns true if every entry of `partial` is present in `self` with the same value.
    pub fn matches(&self, partial: &Valuation) -> bool {
        partial.iter().all(|(name, value)| self.get(name) == Some(value))
    }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Valuation {
    fn from_iter<I: IntoIterator<Item = (S, Value)>>(iter: I) -> Self {
        Valuation(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl fmt::Display for Valuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}:{}", name, value)?;
        }
        Ok(())
    }
}
