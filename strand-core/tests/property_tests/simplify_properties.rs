//! Rewriter properties: idempotence and agreement with concrete string
//! semantics on ground terms.

use num_bigint::BigInt;
use proptest::prelude::*;
use strand_core::ast::{TermId, TermManager};

#[derive(Debug, Clone)]
enum Piece {
    Lit(String),
    Var(u8),
    Empty,
}

fn piece() -> impl Strategy<Value = Piece> {
    prop_oneof![
        "[abc]{0,3}".prop_map(Piece::Lit),
        (0u8..4).prop_map(Piece::Var),
        Just(Piece::Empty),
    ]
}

fn build(tm: &mut TermManager, pieces: &[Piece]) -> TermId {
    let sort = tm.sorts.string_sort();
    let mut t = tm.mk_seq_empty(sort);
    for p in pieces {
        let atom = match p {
            Piece::Lit(s) => tm.mk_string_lit(s),
            Piece::Var(i) => {
                let name = format!("v{i}");
                tm.mk_var(&name, sort)
            }
            Piece::Empty => tm.mk_seq_empty(sort),
        };
        t = tm.mk_str_concat(t, atom);
    }
    t
}

proptest! {
    /// A second rewrite never changes the result.
    #[test]
    fn simplify_idempotent(pieces in proptest::collection::vec(piece(), 0..6)) {
        let mut tm = TermManager::new();
        let t = build(&mut tm, &pieces);
        let once = tm.simplify(t);
        let twice = tm.simplify(once);
        prop_assert_eq!(once, twice);
    }

    /// Ground concatenations fold to the concrete concatenation.
    #[test]
    fn ground_concat_folds(lits in proptest::collection::vec("[abc]{0,3}", 0..6)) {
        let mut tm = TermManager::new();
        let pieces: Vec<Piece> = lits.iter().cloned().map(Piece::Lit).collect();
        let t = build(&mut tm, &pieces);
        let r = tm.simplify(t);
        let expect: String = lits.concat();
        prop_assert_eq!(tm.seq_as_string(r), Some(expect));
    }

    /// Length of a ground term folds to its character count.
    #[test]
    fn ground_length_folds(lit in "[abc]{0,5}") {
        let mut tm = TermManager::new();
        let t = tm.mk_string_lit(&lit);
        let len = tm.mk_str_len(t);
        let r = tm.simplify(len);
        prop_assert_eq!(tm.int_value(r).cloned(), Some(BigInt::from(lit.chars().count())));
    }

    /// Ground predicate folding agrees with concrete string semantics.
    #[test]
    fn ground_predicates_fold(a in "[ab]{0,3}", b in "[ab]{0,4}") {
        let mut tm = TermManager::new();
        let la = tm.mk_string_lit(&a);
        let lb = tm.mk_string_lit(&b);
        let p = tm.mk_str_prefixof(la, lb);
        let p = tm.simplify(p);
        prop_assert_eq!(tm.kind(p) == &strand_core::ast::TermKind::True, b.starts_with(&a));
        let c = tm.mk_str_contains(la, lb);
        let c = tm.simplify(c);
        prop_assert_eq!(tm.kind(c) == &strand_core::ast::TermKind::True, b.contains(&a));
    }
}
