//! Structural Equality Reducer
//!
//! `reduce_eq` takes a canonized equation between two sequence terms and
//! either refutes it from term structure alone or replaces it with zero
//! or more strictly simpler subproblems. Both sides are viewed as lists
//! of concatenation atoms; the reducer peels identical atoms and common
//! literal characters from both ends, extracts element equalities from
//! unit atoms, and refutes on a literal mismatch or when the minimum
//! possible length of one side exceeds the maximum of the other.

use smallvec::SmallVec;
use std::collections::VecDeque;
use strand_core::ast::{TermId, TermKind, TermManager};

/// Outcome of reducing one equation.
#[derive(Debug, PartialEq, Eq)]
pub enum Reduction {
    /// The equation is unsatisfiable from structure alone.
    Unsat,
    /// Equivalent list of subproblems; empty means the equation holds.
    Subproblems(Vec<(TermId, TermId)>),
}

fn atoms_of(tm: &TermManager, t: TermId) -> VecDeque<TermId> {
    let mut flat: SmallVec<[TermId; 8]> = SmallVec::new();
    tm.concat_atoms(t, &mut flat);
    flat.into_iter()
        .filter(|&a| !matches!(tm.kind(a), TermKind::SeqEmpty))
        .collect()
}

fn lit_of(tm: &TermManager, t: TermId) -> Option<String> {
    tm.str_value(t).map(str::to_string)
}

/// Minimum and maximum number of elements an atom list can denote.
fn length_bounds(tm: &TermManager, atoms: &VecDeque<TermId>) -> (usize, Option<usize>) {
    let mut min = 0usize;
    let mut max = Some(0usize);
    for &a in atoms {
        match tm.kind(a) {
            TermKind::StringLit(s) => {
                let n = s.chars().count();
                min += n;
                max = max.map(|m| m + n);
            }
            TermKind::SeqUnit(_) => {
                min += 1;
                max = max.map(|m| m + 1);
            }
            _ => max = None,
        }
    }
    (min, max)
}

fn rebuild(tm: &mut TermManager, atoms: &VecDeque<TermId>, sort: strand_core::ast::SortId) -> TermId {
    let mut iter = atoms.iter().rev();
    match iter.next() {
        None => tm.mk_seq_empty(sort),
        Some(&last) => {
            let mut acc = last;
            for &a in iter {
                acc = tm.mk_str_concat(a, acc);
            }
            acc
        }
    }
}

fn drop_chars_front(s: &str, n: usize) -> String {
    s.chars().skip(n).collect()
}

fn drop_chars_back(s: &str, n: usize) -> String {
    let total = s.chars().count();
    s.chars().take(total - n).collect()
}

/// Peel at the front of both lists. Returns `Some(true)` on progress,
/// `Some(false)` when stuck, `None` on refutation.
fn peel_front(
    tm: &mut TermManager,
    ls: &mut VecDeque<TermId>,
    rs: &mut VecDeque<TermId>,
    out: &mut Vec<(TermId, TermId)>,
) -> Option<bool> {
    let (&a, &b) = match (ls.front(), rs.front()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Some(false),
    };
    if a == b {
        ls.pop_front();
        rs.pop_front();
        return Some(true);
    }
    match (lit_of(tm, a), lit_of(tm, b)) {
        (Some(la), Some(lb)) => {
            let common = la
                .chars()
                .zip(lb.chars())
                .take_while(|(x, y)| x == y)
                .count();
            if common == 0 {
                return None;
            }
            ls.pop_front();
            rs.pop_front();
            let la_rest = drop_chars_front(&la, common);
            let lb_rest = drop_chars_front(&lb, common);
            if !la_rest.is_empty() {
                ls.push_front(tm.mk_string_lit(&la_rest));
            }
            if !lb_rest.is_empty() {
                rs.push_front(tm.mk_string_lit(&lb_rest));
            }
            Some(true)
        }
        (la, lb) => {
            let ka = tm.kind(a).clone();
            let kb = tm.kind(b).clone();
            match (ka, kb, la, lb) {
                (TermKind::SeqUnit(x), TermKind::SeqUnit(y), _, _) => {
                    out.push((x, y));
                    ls.pop_front();
                    rs.pop_front();
                    Some(true)
                }
                (TermKind::SeqUnit(x), _, _, Some(lb)) => {
                    let c = lb.chars().next().expect("empty literal atom");
                    let cv = tm.mk_char(c);
                    out.push((x, cv));
                    ls.pop_front();
                    rs.pop_front();
                    let rest = drop_chars_front(&lb, 1);
                    if !rest.is_empty() {
                        rs.push_front(tm.mk_string_lit(&rest));
                    }
                    Some(true)
                }
                (_, TermKind::SeqUnit(y), Some(la), _) => {
                    let c = la.chars().next().expect("empty literal atom");
                    let cv = tm.mk_char(c);
                    out.push((cv, y));
                    ls.pop_front();
                    rs.pop_front();
                    let rest = drop_chars_front(&la, 1);
                    if !rest.is_empty() {
                        ls.push_front(tm.mk_string_lit(&rest));
                    }
                    Some(true)
                }
                _ => Some(false),
            }
        }
    }
}

/// Peel at the back of both lists; mirror of `peel_front`.
fn peel_back(
    tm: &mut TermManager,
    ls: &mut VecDeque<TermId>,
    rs: &mut VecDeque<TermId>,
    out: &mut Vec<(TermId, TermId)>,
) -> Option<bool> {
    let (&a, &b) = match (ls.back(), rs.back()) {
        (Some(a), Some(b)) => (a, b),
        _ => return Some(false),
    };
    if a == b {
        ls.pop_back();
        rs.pop_back();
        return Some(true);
    }
    match (lit_of(tm, a), lit_of(tm, b)) {
        (Some(la), Some(lb)) => {
            let common = la
                .chars()
                .rev()
                .zip(lb.chars().rev())
                .take_while(|(x, y)| x == y)
                .count();
            if common == 0 {
                return None;
            }
            ls.pop_back();
            rs.pop_back();
            let la_rest = drop_chars_back(&la, common);
            let lb_rest = drop_chars_back(&lb, common);
            if !la_rest.is_empty() {
                ls.push_back(tm.mk_string_lit(&la_rest));
            }
            if !lb_rest.is_empty() {
                rs.push_back(tm.mk_string_lit(&lb_rest));
            }
            Some(true)
        }
        (la, lb) => {
            let ka = tm.kind(a).clone();
            let kb = tm.kind(b).clone();
            match (ka, kb, la, lb) {
                (TermKind::SeqUnit(x), TermKind::SeqUnit(y), _, _) => {
                    out.push((x, y));
                    ls.pop_back();
                    rs.pop_back();
                    Some(true)
                }
                (TermKind::SeqUnit(x), _, _, Some(lb)) => {
                    let c = lb.chars().last().expect("empty literal atom");
                    let cv = tm.mk_char(c);
                    out.push((x, cv));
                    ls.pop_back();
                    rs.pop_back();
                    let rest = drop_chars_back(&lb, 1);
                    if !rest.is_empty() {
                        rs.push_back(tm.mk_string_lit(&rest));
                    }
                    Some(true)
                }
                (_, TermKind::SeqUnit(y), Some(la), _) => {
                    let c = la.chars().last().expect("empty literal atom");
                    let cv = tm.mk_char(c);
                    out.push((cv, y));
                    ls.pop_back();
                    rs.pop_back();
                    let rest = drop_chars_back(&la, 1);
                    if !rest.is_empty() {
                        ls.push_back(tm.mk_string_lit(&rest));
                    }
                    Some(true)
                }
                _ => Some(false),
            }
        }
    }
}

/// Reduce the canonized equation `l = r` to subproblems or a refutation.
pub(crate) fn reduce_eq(tm: &mut TermManager, l: TermId, r: TermId) -> Reduction {
    // non-sequence equations (element equalities extracted earlier) pass
    // through, except for ground mismatches
    if !tm.sorts.is_seq(tm.sort(l)) {
        if l != r
            && matches!(
                (tm.kind(l), tm.kind(r)),
                (TermKind::CharConst(_), TermKind::CharConst(_))
                    | (TermKind::IntConst(_), TermKind::IntConst(_))
            )
        {
            return Reduction::Unsat;
        }
        return Reduction::Subproblems(vec![(l, r)]);
    }

    let sort = tm.sort(l);
    let mut ls = atoms_of(tm, l);
    let mut rs = atoms_of(tm, r);
    let mut out: Vec<(TermId, TermId)> = Vec::new();

    loop {
        match peel_front(tm, &mut ls, &mut rs, &mut out) {
            None => return Reduction::Unsat,
            Some(true) => continue,
            Some(false) => {}
        }
        match peel_back(tm, &mut ls, &mut rs, &mut out) {
            None => return Reduction::Unsat,
            Some(true) => continue,
            Some(false) => break,
        }
    }

    let (lmin, lmax) = length_bounds(tm, &ls);
    let (rmin, rmax) = length_bounds(tm, &rs);
    if lmax.is_some_and(|m| m < rmin) || rmax.is_some_and(|m| m < lmin) {
        return Reduction::Unsat;
    }

    if !(ls.is_empty() && rs.is_empty()) {
        let lhs = rebuild(tm, &ls, sort);
        let rhs = rebuild(tm, &rs, sort);
        out.push((lhs, rhs));
    }
    Reduction::Subproblems(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> TermManager {
        TermManager::new()
    }

    fn strvar(tm: &mut TermManager, name: &str) -> TermId {
        let s = tm.sorts.string_sort();
        tm.mk_var(name, s)
    }

    #[test]
    fn test_peels_common_literal_suffix() {
        // x ++ "a" = "ba"  ~>  x = "b"
        let mut tm = setup();
        let x = strvar(&mut tm, "x");
        let a = tm.mk_string_lit("a");
        let l = tm.mk_str_concat(x, a);
        let r = tm.mk_string_lit("ba");
        let b = tm.mk_string_lit("b");
        assert_eq!(reduce_eq(&mut tm, l, r), Reduction::Subproblems(vec![(x, b)]));
    }

    #[test]
    fn test_peels_common_prefix_atom() {
        // "a" ++ x ++ y = "a" ++ z  ~>  x ++ y = z
        let mut tm = setup();
        let x = strvar(&mut tm, "x");
        let y = strvar(&mut tm, "y");
        let z = strvar(&mut tm, "z");
        let a = tm.mk_string_lit("a");
        let xy = tm.mk_str_concat(x, y);
        let l = tm.mk_str_concat(a, xy);
        let r = tm.mk_str_concat(a, z);
        assert_eq!(
            reduce_eq(&mut tm, l, r),
            Reduction::Subproblems(vec![(xy, z)])
        );
    }

    #[test]
    fn test_literal_mismatch_refutes() {
        // "ab" ++ x = "ba"  is impossible
        let mut tm = setup();
        let x = strvar(&mut tm, "x");
        let ab = tm.mk_string_lit("ab");
        let l = tm.mk_str_concat(ab, x);
        let r = tm.mk_string_lit("ba");
        assert_eq!(reduce_eq(&mut tm, l, r), Reduction::Unsat);
    }

    #[test]
    fn test_length_bound_refutes() {
        // "ab" ++ x = "a"  is impossible: min length 2 > 1
        let mut tm = setup();
        let x = strvar(&mut tm, "x");
        let ab = tm.mk_string_lit("ab");
        let l = tm.mk_str_concat(ab, x);
        let r = tm.mk_string_lit("a");
        assert_eq!(reduce_eq(&mut tm, l, r), Reduction::Unsat);
    }

    #[test]
    fn test_empty_vs_nonempty_literal_refutes() {
        let mut tm = setup();
        let sort = tm.sorts.string_sort();
        let e = tm.mk_seq_empty(sort);
        let a = tm.mk_string_lit("a");
        assert_eq!(reduce_eq(&mut tm, e, a), Reduction::Unsat);
    }

    #[test]
    fn test_empty_vs_variables_stays_open() {
        // "" = x ++ y is satisfiable; keeps one subproblem
        let mut tm = setup();
        let sort = tm.sorts.string_sort();
        let e = tm.mk_seq_empty(sort);
        let x = strvar(&mut tm, "x");
        let y = strvar(&mut tm, "y");
        let xy = tm.mk_str_concat(x, y);
        match reduce_eq(&mut tm, e, xy) {
            Reduction::Subproblems(ps) => {
                assert_eq!(ps.len(), 1);
                assert!(matches!(tm.kind(ps[0].0), TermKind::SeqEmpty));
                assert_eq!(ps[0].1, xy);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_ground_equal_discharges() {
        // "ab" = "a" ++ "b" after canonization both are "ab"; here feed
        // the already-equal form: identical atoms cancel to nothing
        let mut tm = setup();
        let ab = tm.mk_string_lit("ab");
        assert_eq!(reduce_eq(&mut tm, ab, ab), Reduction::Subproblems(vec![]));
    }

    #[test]
    fn test_unit_heads_extract_element_equality() {
        let mut tm = setup();
        let char_sort = tm.sorts.char_sort;
        let c = tm.mk_var("c", char_sort);
        let d = tm.mk_var("d", char_sort);
        let uc = tm.mk_seq_unit(c);
        let ud = tm.mk_seq_unit(d);
        let x = strvar(&mut tm, "x");
        let l = tm.mk_str_concat(uc, x);
        let r = tm.mk_str_concat(ud, x);
        assert_eq!(
            reduce_eq(&mut tm, l, r),
            Reduction::Subproblems(vec![(c, d)])
        );
    }

    #[test]
    fn test_unit_vs_literal_extracts_char() {
        let mut tm = setup();
        let char_sort = tm.sorts.char_sort;
        let c = tm.mk_var("c", char_sort);
        let uc = tm.mk_seq_unit(c);
        let r = tm.mk_string_lit("a");
        let a_char = tm.mk_char('a');
        assert_eq!(
            reduce_eq(&mut tm, uc, r),
            Reduction::Subproblems(vec![(c, a_char)])
        );
    }

    #[test]
    fn test_char_constant_clash_refutes() {
        let mut tm = setup();
        let a = tm.mk_char('a');
        let b = tm.mk_char('b');
        assert_eq!(reduce_eq(&mut tm, a, b), Reduction::Unsat);
    }

    #[test]
    fn test_stuck_equation_comes_back_unchanged() {
        let mut tm = setup();
        let x = strvar(&mut tm, "x");
        let y = strvar(&mut tm, "y");
        let xy = tm.mk_str_concat(x, y);
        let ab = tm.mk_string_lit("ab");
        assert_eq!(
            reduce_eq(&mut tm, xy, ab),
            Reduction::Subproblems(vec![(xy, ab)])
        );
    }
}
