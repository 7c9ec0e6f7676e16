//! Invariants of the dependency manager, the solution map, and the
//! equation frames.

use proptest::prelude::*;
use strand_core::ast::TermId;
use strand_seq::deps::DepManager;
use strand_seq::equations::Equations;
use strand_seq::host::ENodeId;
use strand_seq::solution::SolutionMap;
use strand_seq::trail::Trail;

proptest! {
    /// Join order never changes the linearized content, and joining a
    /// dependency with itself is observationally the identity.
    #[test]
    fn dep_join_laws(pairs in proptest::collection::vec((0u32..8, 0u32..8), 1..6)) {
        let mut dm = DepManager::new();
        let deps: Vec<_> = pairs
            .iter()
            .map(|&(a, b)| dm.leaf((ENodeId(a), ENodeId(b))))
            .collect();
        let mut forward = None;
        for &d in &deps {
            forward = dm.join(forward, d);
        }
        let mut backward = None;
        for &d in deps.iter().rev() {
            backward = dm.join(d, backward);
        }
        let mut l1 = Vec::new();
        dm.linearize(forward, &mut l1);
        l1.sort();
        l1.dedup();
        let mut l2 = Vec::new();
        dm.linearize(backward, &mut l2);
        l2.sort();
        l2.dedup();
        prop_assert_eq!(l1, l2);
        prop_assert_eq!(dm.join(forward, forward), forward);
    }

    /// Every leaf joined in is recoverable from the linearization.
    #[test]
    fn dep_linearize_is_complete(pairs in proptest::collection::vec((0u32..8, 8u32..16), 1..6)) {
        let mut dm = DepManager::new();
        let mut acc = None;
        for &(a, b) in &pairs {
            let leaf = dm.leaf((ENodeId(a), ENodeId(b)));
            acc = dm.join(acc, leaf);
        }
        let mut out = Vec::new();
        dm.linearize(acc, &mut out);
        for &(a, b) in &pairs {
            prop_assert!(out.contains(&(ENodeId(a), ENodeId(b))));
        }
    }

    /// `find` lands outside the map's domain on acyclic chains, however
    /// the entries were written or overwritten.
    #[test]
    fn solution_find_lands_outside_domain(
        edges in proptest::collection::vec((0u32..16, 16u32..32), 0..12)
    ) {
        let mut rep = SolutionMap::new();
        let mut dm = DepManager::new();
        let mut trail = Trail::new();
        for &(k, v) in &edges {
            rep.update(TermId::new(k), TermId::new(v), None, &mut trail);
        }
        for &(k, _) in &edges {
            let (r, _) = rep.find(TermId::new(k), &mut dm, &mut trail);
            prop_assert!(!rep.contains(r));
        }
    }

    /// Popping a frame restores the pending equations exactly, whatever
    /// was pushed or compacted in between.
    #[test]
    fn equation_frames_restore(
        base in proptest::collection::vec((0u32..8, 0u32..8), 0..5),
        inner in proptest::collection::vec((0u32..8, 0u32..8), 0..5)
    ) {
        let mut store = Equations::new();
        for &(l, r) in &base {
            store.push(TermId::new(l), TermId::new(r), None);
        }
        let snapshot: Vec<_> = store.iter().collect();
        store.push_frame();
        for &(l, r) in &inner {
            store.push(TermId::new(l), TermId::new(r), None);
        }
        if !store.is_empty() {
            store.swap_remove(0);
        }
        store.pop_frame();
        let restored: Vec<_> = store.iter().collect();
        prop_assert_eq!(restored, snapshot);
    }
}
