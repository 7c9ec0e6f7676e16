//! Solution Map
//!
//! Backtrackable mapping from a solved term to its replacement and the
//! dependency witnessing the solution. `find` follows chains to the
//! terminal replacement, joining the witnesses of every edge it crosses;
//! a walk of two or more hops installs a compressed edge for the original
//! key under the joined witness. Compression only shortens chains, never
//! changes what a key resolves to.
//!
//! Acyclicity is the caller's obligation (occurs-check before `update`);
//! `find` asserts it by bounding the hop count.

use crate::deps::{Dep, DepManager};
use crate::trail::{Trail, UndoOp};
use rustc_hash::FxHashMap;
use strand_core::ast::TermId;

/// Backtrackable term-to-replacement map.
#[derive(Debug, Default)]
pub struct SolutionMap {
    map: FxHashMap<TermId, (TermId, Dep)>,
}

impl SolutionMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `e` has a replacement.
    pub fn contains(&self, e: TermId) -> bool {
        self.map.contains_key(&e)
    }

    /// Number of solved terms.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Record that `e` rewrites to `r` under `dep`, trailing the inverse.
    pub fn update(&mut self, e: TermId, r: TermId, dep: Dep, trail: &mut Trail) {
        match self.map.insert(e, (r, dep)) {
            Some((prev_rep, prev_dep)) => trail.push(UndoOp::SolutionOverwritten {
                key: e,
                rep: prev_rep,
                dep: prev_dep,
            }),
            None => trail.push(UndoOp::SolutionInserted { key: e }),
        }
    }

    /// Resolve `e` to its terminal replacement and the joined witness of
    /// the chain. Compresses the original key after two or more hops.
    pub fn find(&mut self, e: TermId, dm: &mut DepManager, trail: &mut Trail) -> (TermId, Dep) {
        let mut dep: Dep = None;
        let mut result = e;
        let mut hops = 0usize;
        while let Some(&(r, d)) = self.map.get(&result) {
            dep = dm.join(dep, d);
            result = r;
            hops += 1;
            assert!(hops <= self.map.len(), "solution map cycle at {e:?}");
        }
        if hops > 1 {
            // path compression for the original key only
            self.update(e, result, dep, trail);
        }
        (result, dep)
    }

    /// Inverse of an insert, driven by trail replay.
    pub(crate) fn undo_insert(&mut self, key: TermId) {
        let removed = self.map.remove(&key);
        debug_assert!(removed.is_some(), "undo of absent solution entry");
    }

    /// Inverse of an overwrite, driven by trail replay.
    pub(crate) fn undo_overwrite(&mut self, key: TermId, rep: TermId, dep: Dep) {
        self.map.insert(key, (rep, dep));
    }

    /// Iterate entries for diagnostics.
    pub fn iter(&self) -> impl Iterator<Item = (TermId, TermId)> + '_ {
        self.map.iter().map(|(&k, &(r, _))| (k, r))
    }
}
