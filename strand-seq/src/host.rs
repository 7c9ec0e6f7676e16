//! Host Contract
//!
//! The sequence solver is driven entirely by an enclosing DPLL(T) host:
//! the host owns the e-graph, the SAT trail, and justification lifetimes.
//! [`Host`] is the slice of that machinery the core consumes. Every
//! callback of the core receives the host handle; the core keeps no
//! global state.

use rustc_hash::FxHashMap;
use strand_core::ast::{TermId, TermManager};
use strand_core::literal::Lit;

/// Identifier of an e-node in the host's congruence closure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ENodeId(pub u32);

/// A pair of e-nodes whose owners the host currently believes equal.
pub type EPair = (ENodeId, ENodeId);

/// What a justification justifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JustificationKind {
    /// A literal propagation.
    Propagation,
    /// An equality propagation.
    EqPropagation,
    /// A refutation of the current assignment.
    Conflict,
}

/// Antecedents handed to the host for proof and conflict analysis.
#[derive(Debug, Clone)]
pub struct Justification {
    /// What is being justified.
    pub kind: JustificationKind,
    /// Antecedent literals.
    pub lits: Vec<Lit>,
    /// Antecedent equalities.
    pub eqs: Vec<EPair>,
}

impl Justification {
    /// Justification for a literal propagation.
    pub fn propagation(lits: Vec<Lit>, eqs: Vec<EPair>) -> Self {
        Self {
            kind: JustificationKind::Propagation,
            lits,
            eqs,
        }
    }

    /// Justification for an equality propagation.
    pub fn eq_propagation(lits: Vec<Lit>, eqs: Vec<EPair>) -> Self {
        Self {
            kind: JustificationKind::EqPropagation,
            lits,
            eqs,
        }
    }

    /// Justification for a conflict.
    pub fn conflict(eqs: Vec<EPair>) -> Self {
        Self {
            kind: JustificationKind::Conflict,
            lits: Vec::new(),
            eqs,
        }
    }
}

/// The host solver as seen from the sequence core.
pub trait Host {
    /// Ensure `t` has an e-node and return it.
    fn internalize(&mut self, tm: &mut TermManager, t: TermId) -> ENodeId;

    /// E-node of an already internalized term.
    fn enode(&self, t: TermId) -> Option<ENodeId>;

    /// Current equivalence-class representative of `n`.
    fn root(&self, n: ENodeId) -> ENodeId;

    /// The term an e-node was created for.
    fn owner(&self, n: ENodeId) -> TermId;

    /// Literal of a Boolean atom, internalizing it if needed.
    fn literal(&mut self, tm: &mut TermManager, atom: TermId) -> Lit;

    /// Propose a case-split equality. Returns whether a new split was
    /// created.
    fn assume_eq(&mut self, a: ENodeId, b: ENodeId) -> bool;

    /// Propagate a literal.
    fn assign(&mut self, lit: Lit, justification: Justification);

    /// Propagate an equality between two e-nodes.
    fn assign_eq(&mut self, a: ENodeId, b: ENodeId, justification: Justification);

    /// Report a refutation of the current assignment.
    fn set_conflict(&mut self, justification: Justification);

    /// Install a theory axiom clause.
    fn mk_th_axiom(&mut self, lits: &[Lit]);

    /// Whether the host is already in a conflicting state.
    fn inconsistent(&self) -> bool;
}

/// Statistics sink filled by `collect_statistics`.
#[derive(Debug, Default)]
pub struct Statistics {
    entries: FxHashMap<&'static str, u64>,
}

impl Statistics {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `value` to the named counter.
    pub fn update(&mut self, name: &'static str, value: u64) {
        *self.entries.entry(name).or_insert(0) += value;
    }

    /// Read a counter; absent counters are zero.
    pub fn get(&self, name: &str) -> u64 {
        self.entries.get(name).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistics_accumulate() {
        let mut st = Statistics::new();
        st.update("seq num splits", 2);
        st.update("seq num splits", 3);
        assert_eq!(st.get("seq num splits"), 5);
        assert_eq!(st.get("absent"), 0);
    }

    #[test]
    fn test_justification_kinds() {
        let j = Justification::conflict(vec![(ENodeId(0), ENodeId(1))]);
        assert_eq!(j.kind, JustificationKind::Conflict);
        assert!(j.lits.is_empty());
        assert_eq!(j.eqs.len(), 1);
    }
}
