//! Model Construction
//!
//! After a successful final check the host asks for concrete values.
//! `mk_value` canonizes an e-node's owner in model-completion mode: when
//! expansion reaches a free sequence variable, the fresh-value oracle
//! assigns it an unused string and records the assignment in the solution
//! map under the empty dependency. Completion mode is never active during
//! search.

use crate::host::{ENodeId, Host};
use crate::solver::SeqSolver;
use strand_core::ast::{SortId, TermId, TermManager};
use strand_core::error::{Result, StrandError};

/// Fresh-value oracle for sequence sorts.
#[derive(Debug, Default)]
pub struct SeqFactory {
    counter: u32,
}

impl SeqFactory {
    /// Create a factory with no values handed out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce a string value not handed out before. Only the string
    /// sort has concrete values here; other sorts are left to their own
    /// theories.
    pub fn get_fresh_value(&mut self, tm: &mut TermManager, sort: SortId) -> Result<TermId> {
        if sort != tm.sorts.string_sort() {
            return Err(StrandError::Unsupported(format!(
                "fresh value for sort {sort:?}"
            )));
        }
        let name = format!("!{}", self.counter);
        self.counter += 1;
        Ok(tm.mk_string_lit(&name))
    }
}

/// Collects the value terms handed to the host's model builder.
#[derive(Debug, Default)]
pub struct ModelGenerator {
    trail: Vec<TermId>,
}

impl ModelGenerator {
    /// Create an empty generator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep a value term alive for the model.
    pub fn add_trail(&mut self, t: TermId) {
        self.trail.push(t);
    }

    /// Value terms recorded so far.
    pub fn values(&self) -> &[TermId] {
        &self.trail
    }
}

impl SeqSolver {
    /// Install a fresh value factory for sequence sorts.
    pub fn init_model(&mut self, _mg: &mut ModelGenerator) {
        self.factory = SeqFactory::new();
    }

    /// Concrete value of an e-node's owner under the current solution
    /// map, completing free variables from the factory.
    pub fn mk_value<H: Host>(
        &mut self,
        tm: &mut TermManager,
        host: &H,
        n: ENodeId,
        mg: &mut ModelGenerator,
    ) -> TermId {
        let e = host.owner(n);
        let saved = self.model_completion;
        self.model_completion = true;
        let mut dep = None;
        let value = self.canonize(tm, e, &mut dep);
        self.model_completion = saved;
        mg.add_trail(value);
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_values_are_distinct() {
        let mut tm = TermManager::new();
        let mut factory = SeqFactory::new();
        let sort = tm.sorts.string_sort();
        let v1 = factory.get_fresh_value(&mut tm, sort).unwrap();
        let v2 = factory.get_fresh_value(&mut tm, sort).unwrap();
        assert_ne!(v1, v2);
    }

    #[test]
    fn test_non_string_sort_is_unsupported() {
        let mut tm = TermManager::new();
        let mut factory = SeqFactory::new();
        let int_sort = tm.sorts.int_sort;
        assert!(factory.get_fresh_value(&mut tm, int_sort).is_err());
    }

    #[test]
    fn test_model_completion_assigns_free_variable() {
        let mut tm = TermManager::new();
        let mut solver = SeqSolver::new();
        let sort = tm.sorts.string_sort();
        let x = tm.mk_var("x", sort);
        solver.model_completion = true;
        let mut dep = None;
        let v = solver.canonize(&mut tm, x, &mut dep);
        solver.model_completion = false;
        assert!(tm.str_value(v).is_some());
        // recorded in the solution map: a second canonize agrees
        let mut dep2 = None;
        let v2 = solver.canonize(&mut tm, x, &mut dep2);
        assert_eq!(v, v2);
    }
}
