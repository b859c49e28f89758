//! Set representations the fixpoint solver is written against.
//!
//! The solver only needs a handful of set operations over a fixed finite
//! domain of game nodes, plus the one-step predecessor under a relation.
//! [`SymbolicSet`] captures exactly that; [`ExplicitSet`] implements it with a
//! bitset per set and predecessor lists per relation. A decision-diagram
//! backend would implement the same trait.

use std::fmt;

use crate::bitset::BitSet;

/// A set of game nodes drawn from a fixed domain `0..domain`.
pub trait SymbolicSet: Clone + PartialEq + fmt::Debug + Send + Sync {
    /// Representation of a binary relation over the domain.
    type Relation: fmt::Debug + Send + Sync;

    /// Builds a relation from `(source, target)` edges.
    fn relation<I>(domain: usize, edges: I) -> Self::Relation
    where
        I: IntoIterator<Item = (usize, usize)>;

    fn empty(domain: usize) -> Self;

    fn full(domain: usize) -> Self;

    fn from_nodes<I>(domain: usize, nodes: I) -> Self
    where
        I: IntoIterator<Item = usize>;

    fn union(&self, other: &Self) -> Self;

    fn intersect(&self, other: &Self) -> Self;

    /// Complement relative to the domain.
    fn complement(&self) -> Self;

    fn minus(&self, other: &Self) -> Self {
        self.intersect(&other.complement())
    }

    /// Nodes with at least one successor in `self` under `relation`.
    fn pre_image(&self, relation: &Self::Relation) -> Self;

    fn contains(&self, node: usize) -> bool;

    fn is_empty(&self) -> bool;

    fn is_subset(&self, other: &Self) -> bool {
        self.minus(other).is_empty()
    }

    /// Number of nodes in the set.
    fn len(&self) -> usize;

    /// Members in increasing order.
    fn nodes(&self) -> Vec<usize>;
}

/// Explicit set: one bit per game node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitSet {
    domain: usize,
    bits: BitSet,
}

/// Explicit relation, stored as predecessor lists indexed by target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitRelation {
    preds: Vec<Vec<usize>>,
}

impl ExplicitRelation {
    pub fn predecessors(&self, node: usize) -> &[usize] {
        self.preds.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn num_edges(&self) -> usize {
        self.preds.iter().map(Vec::len).sum()
    }
}

impl ExplicitSet {
    pub fn domain(&self) -> usize {
        self.domain
    }

    pub fn bits(&self) -> &BitSet {
        &self.bits
    }
}

impl SymbolicSet for ExplicitSet {
    type Relation = ExplicitRelation;

    fn relation<I>(domain: usize, edges: I) -> ExplicitRelation
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut preds = vec![Vec::new(); domain];
        for (source, target) in edges {
            assert!(source < domain && target < domain, "Edge ({}, {}) outside domain {}", source, target, domain);
            preds[target].push(source);
        }
        for list in &mut preds {
            list.sort_unstable();
            list.dedup();
        }
        ExplicitRelation { preds }
    }

    fn empty(domain: usize) -> Self {
        ExplicitSet {
            domain,
            bits: BitSet::new(domain),
        }
    }

    fn full(domain: usize) -> Self {
        ExplicitSet {
            domain,
            bits: BitSet::full(domain),
        }
    }

    fn from_nodes<I>(domain: usize, nodes: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        let mut set = Self::empty(domain);
        for node in nodes {
            debug_assert!(node < domain);
            set.bits.insert(node);
        }
        set
    }

    fn union(&self, other: &Self) -> Self {
        debug_assert_eq!(self.domain, other.domain);
        let mut bits = self.bits.clone();
        bits.union_with(&other.bits);
        ExplicitSet { domain: self.domain, bits }
    }

    fn intersect(&self, other: &Self) -> Self {
        debug_assert_eq!(self.domain, other.domain);
        let mut bits = self.bits.clone();
        bits.intersect_with(&other.bits);
        ExplicitSet { domain: self.domain, bits }
    }

    fn complement(&self) -> Self {
        let mut bits = self.bits.clone();
        bits.complement_within(self.domain);
        ExplicitSet { domain: self.domain, bits }
    }

    fn minus(&self, other: &Self) -> Self {
        let mut bits = self.bits.clone();
        bits.difference_with(&other.bits);
        ExplicitSet { domain: self.domain, bits }
    }

    fn pre_image(&self, relation: &ExplicitRelation) -> Self {
        let mut result = Self::empty(self.domain);
        for target in self.bits.iter() {
            for &source in relation.predecessors(target) {
                result.bits.insert(source);
            }
        }
        result
    }

    fn contains(&self, node: usize) -> bool {
        self.bits.contains(node)
    }

    fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    fn is_subset(&self, other: &Self) -> bool {
        self.bits.is_subset(&other.bits)
    }

    fn len(&self) -> usize {
        self.bits.len()
    }

    fn nodes(&self) -> Vec<usize> {
        self.bits.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_algebra() {
        let a = ExplicitSet::from_nodes(6, [0, 1, 2]);
        let b = ExplicitSet::from_nodes(6, [2, 3]);
        assert_eq!(a.union(&b).nodes(), vec![0, 1, 2, 3]);
        assert_eq!(a.intersect(&b).nodes(), vec![2]);
        assert_eq!(a.minus(&b).nodes(), vec![0, 1]);
        assert_eq!(a.complement().nodes(), vec![3, 4, 5]);
        assert!(a.intersect(&b).is_subset(&a));
        assert!(!b.is_subset(&a));
        assert_eq!(ExplicitSet::full(6).len(), 6);
        assert!(ExplicitSet::empty(6).is_empty());
    }

    #[test]
    fn test_pre_image() {
        // 0 -> 1, 1 -> 2, 3 -> 2, 2 -> 2
        let rel = ExplicitSet::relation(4, [(0, 1), (1, 2), (3, 2), (2, 2)]);
        assert_eq!(rel.num_edges(), 4);
        let target = ExplicitSet::from_nodes(4, [2]);
        assert_eq!(target.pre_image(&rel).nodes(), vec![1, 2, 3]);
        let target = ExplicitSet::from_nodes(4, [1]);
        assert_eq!(target.pre_image(&rel).nodes(), vec![0]);
        assert!(ExplicitSet::from_nodes(4, [0]).pre_image(&rel).is_empty());
    }
}
