//! Undo Trail
//!
//! Every backtrackable mutation of the solver pushes one tagged inverse
//! record. `pop_scope` replays records LIFO down to the mark saved at the
//! matching push. One trail serves all sub-stores; the solver dispatches
//! each record to the store it belongs to.

use crate::deps::Dep;
use strand_core::ast::TermId;

/// Tagged inverse of a single mutation.
#[derive(Debug, Clone)]
pub enum UndoOp {
    /// A solution-map entry was inserted for a fresh key.
    SolutionInserted {
        /// The key to remove.
        key: TermId,
    },
    /// A solution-map entry replaced a previous one.
    SolutionOverwritten {
        /// The key to restore.
        key: TermId,
        /// Previous replacement.
        rep: TermId,
        /// Previous witness.
        dep: Dep,
    },
    /// An exclusion pair was inserted.
    ExclusionInserted {
        /// Lower-id member.
        a: TermId,
        /// Higher-id member.
        b: TermId,
    },
    /// An atom was appended to the inequation list.
    IneqPushed,
    /// A formula was appended to the axiom queue.
    AxiomPushed,
    /// Saved axiom-queue cursor.
    AxiomsHead {
        /// Cursor value to restore.
        prev: usize,
    },
    /// Saved incompleteness flag.
    Incomplete {
        /// Flag value to restore.
        prev: bool,
    },
    /// A concatenation was marked as having its length axiom emitted.
    LenConcatSeen {
        /// The concatenation term to unmark.
        term: TermId,
    },
}

/// The solver's single undo trail.
#[derive(Debug, Default)]
pub struct Trail {
    ops: Vec<UndoOp>,
}

impl Trail {
    /// Create an empty trail.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an inverse.
    pub fn push(&mut self, op: UndoOp) {
        self.ops.push(op);
    }

    /// Pop the most recent inverse, if any.
    pub fn pop(&mut self) -> Option<UndoOp> {
        self.ops.pop()
    }

    /// Number of records, for scope marks.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the trail is empty.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
