//! Term Rewriter
//!
//! [`TermManager::simplify`] brings a term to rewriter-normal form:
//! concatenations are flattened right-nested with literal pieces merged
//! and empties dropped, ground applications of the sequence operations
//! are folded to constants, and integer/boolean structure is folded.
//! The empty string literal normalizes to the empty-sequence constant so
//! that equal ground sequences always share one id.
//!
//! Results are cached; terms are immutable, so the cache never
//! invalidates.

use crate::ast::{SortId, TermId, TermKind, TermManager};
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};
use smallvec::SmallVec;

impl TermManager {
    /// Rewrite `t` to normal form. Idempotent.
    pub fn simplify(&mut self, t: TermId) -> TermId {
        if let Some(&r) = self.simplify_cache.get(&t) {
            return r;
        }
        let r = self.simplify_rec(t);
        self.simplify_cache.insert(t, r);
        r
    }

    fn simplify_rec(&mut self, t: TermId) -> TermId {
        let kind = self.kind(t).clone();
        match kind {
            TermKind::True
            | TermKind::False
            | TermKind::IntConst(_)
            | TermKind::CharConst(_)
            | TermKind::SeqEmpty
            | TermKind::ReAll
            | TermKind::Var(_)
            | TermKind::Skolem { .. } => t,
            TermKind::StringLit(s) => {
                if s.is_empty() {
                    let sort = self.sorts.string_sort();
                    self.mk_seq_empty(sort)
                } else {
                    t
                }
            }
            TermKind::Not(a) => {
                let a = self.simplify(a);
                match self.kind(a) {
                    TermKind::True => self.mk_false(),
                    TermKind::False => self.mk_true(),
                    TermKind::Not(b) => *b,
                    _ => self.mk_not(a),
                }
            }
            TermKind::And(args) => self.simplify_connective(args, true),
            TermKind::Or(args) => self.simplify_connective(args, false),
            TermKind::Eq(a, b) => {
                let a = self.simplify(a);
                let b = self.simplify(b);
                if a == b {
                    return self.mk_true();
                }
                if self.ground_distinct(a, b) {
                    return self.mk_false();
                }
                self.mk_eq(a, b)
            }
            TermKind::Add(args) => {
                let args: Vec<TermId> = args.into_iter().map(|a| self.simplify(a)).collect();
                self.fold_add(&args)
            }
            TermKind::Sub(a, b) => {
                let a = self.simplify(a);
                let b = self.simplify(b);
                if a == b {
                    return self.mk_int(BigInt::ZERO);
                }
                match (self.int_value(a), self.int_value(b)) {
                    (Some(x), Some(y)) => {
                        let n = x - y;
                        self.mk_int(n)
                    }
                    (_, Some(y)) if y.is_zero() => a,
                    _ => self.mk_sub(a, b),
                }
            }
            TermKind::Ge(a, b) => {
                let a = self.simplify(a);
                let b = self.simplify(b);
                if a == b {
                    return self.mk_true();
                }
                match (self.int_value(a), self.int_value(b)) {
                    (Some(x), Some(y)) => {
                        let v = x >= y;
                        self.mk_bool(v)
                    }
                    _ => self.mk_ge(a, b),
                }
            }
            TermKind::Le(a, b) => {
                let a = self.simplify(a);
                let b = self.simplify(b);
                if a == b {
                    return self.mk_true();
                }
                match (self.int_value(a), self.int_value(b)) {
                    (Some(x), Some(y)) => {
                        let v = x <= y;
                        self.mk_bool(v)
                    }
                    _ => self.mk_le(a, b),
                }
            }
            TermKind::SeqUnit(e) => {
                let e = self.simplify(e);
                match self.kind(e) {
                    TermKind::CharConst(c) => {
                        let s = c.to_string();
                        self.mk_string_lit(&s)
                    }
                    _ => self.mk_seq_unit(e),
                }
            }
            TermKind::StrConcat(a, b) => {
                let sort = self.sort(t);
                let a = self.simplify(a);
                let b = self.simplify(b);
                self.fold_concat(a, b, sort)
            }
            TermKind::StrLen(x) => {
                let x = self.simplify(x);
                self.fold_len(x)
            }
            TermKind::StrPrefixOf(a, b) => {
                let a = self.simplify(a);
                let b = self.simplify(b);
                if a == b || matches!(self.kind(a), TermKind::SeqEmpty) {
                    return self.mk_true();
                }
                match (self.seq_as_string(a), self.seq_as_string(b)) {
                    (Some(x), Some(y)) => {
                        let v = y.starts_with(&x);
                        self.mk_bool(v)
                    }
                    _ => self.mk_str_prefixof(a, b),
                }
            }
            TermKind::StrSuffixOf(a, b) => {
                let a = self.simplify(a);
                let b = self.simplify(b);
                if a == b || matches!(self.kind(a), TermKind::SeqEmpty) {
                    return self.mk_true();
                }
                match (self.seq_as_string(a), self.seq_as_string(b)) {
                    (Some(x), Some(y)) => {
                        let v = y.ends_with(&x);
                        self.mk_bool(v)
                    }
                    _ => self.mk_str_suffixof(a, b),
                }
            }
            TermKind::StrContains(a, b) => {
                let a = self.simplify(a);
                let b = self.simplify(b);
                if a == b || matches!(self.kind(a), TermKind::SeqEmpty) {
                    return self.mk_true();
                }
                match (self.seq_as_string(a), self.seq_as_string(b)) {
                    (Some(x), Some(y)) => {
                        let v = y.contains(&x);
                        self.mk_bool(v)
                    }
                    _ => self.mk_str_contains(a, b),
                }
            }
            TermKind::StrIndexOf(s, t2) => {
                let s = self.simplify(s);
                let t2 = self.simplify(t2);
                if matches!(self.kind(s), TermKind::SeqEmpty) {
                    return self.mk_int(BigInt::ZERO);
                }
                match (self.seq_as_string(s), self.seq_as_string(t2)) {
                    (Some(pat), Some(hay)) => {
                        let n = match hay.find(&pat) {
                            Some(byte) => BigInt::from(hay[..byte].chars().count()),
                            None => BigInt::from(-1),
                        };
                        self.mk_int(n)
                    }
                    _ => self.mk_str_indexof(s, t2),
                }
            }
            TermKind::StrReplace(a, s, rep) => {
                let a = self.simplify(a);
                let s = self.simplify(s);
                let rep = self.simplify(rep);
                if let (Some(hay), Some(pat)) = (self.seq_as_string(a), self.seq_as_string(s)) {
                    if !hay.contains(&pat) {
                        return a;
                    }
                    if let Some(r) = self.seq_as_string(rep) {
                        let folded = hay.replacen(&pat, &r, 1);
                        return self.mk_ground_seq(&folded);
                    }
                }
                self.mk_str_replace(a, s, rep)
            }
            TermKind::StrSubstr(s, i, l) => {
                let sort = self.sort(t);
                let s = self.simplify(s);
                let i = self.simplify(i);
                let l = self.simplify(l);
                if let (Some(hay), Some(iv), Some(lv)) = (
                    self.seq_as_string(s),
                    self.int_value(i).and_then(|n| n.to_i64()),
                    self.int_value(l).and_then(|n| n.to_i64()),
                ) {
                    return self.fold_substr(&hay, iv, lv, s, sort);
                }
                self.mk_str_substr(s, i, l)
            }
            TermKind::StrInRe(s, re) => {
                let s = self.simplify(s);
                self.mk_str_in_re(s, re)
            }
        }
    }

    fn simplify_connective(&mut self, args: Vec<TermId>, conj: bool) -> TermId {
        let mut kept = Vec::with_capacity(args.len());
        for a in args {
            let a = self.simplify(a);
            match self.kind(a) {
                TermKind::True if conj => {}
                TermKind::False if !conj => {}
                TermKind::True => return self.mk_true(),
                TermKind::False => return self.mk_false(),
                _ => kept.push(a),
            }
        }
        match kept.len() {
            0 => self.mk_bool(conj),
            1 => kept[0],
            _ => {
                if conj {
                    self.mk_and(kept)
                } else {
                    self.mk_or(kept)
                }
            }
        }
    }

    fn ground_distinct(&self, a: TermId, b: TermId) -> bool {
        debug_assert_ne!(a, b);
        match (self.kind(a), self.kind(b)) {
            (TermKind::IntConst(_), TermKind::IntConst(_)) => true,
            (TermKind::CharConst(_), TermKind::CharConst(_)) => true,
            (TermKind::True | TermKind::False, TermKind::True | TermKind::False) => true,
            _ => match (self.seq_as_string(a), self.seq_as_string(b)) {
                (Some(x), Some(y)) => x != y,
                _ => false,
            },
        }
    }

    fn fold_add(&mut self, args: &[TermId]) -> TermId {
        let mut acc = BigInt::ZERO;
        let mut rest: Vec<TermId> = Vec::new();
        for &a in args {
            match self.kind(a) {
                TermKind::IntConst(n) => acc += n,
                TermKind::Add(inner) => {
                    // one level is enough: children are already simplified
                    let inner = inner.clone();
                    for b in inner {
                        match self.kind(b) {
                            TermKind::IntConst(n) => acc += n,
                            _ => rest.push(b),
                        }
                    }
                }
                _ => rest.push(a),
            }
        }
        if rest.is_empty() {
            return self.mk_int(acc);
        }
        if !acc.is_zero() {
            rest.push(self.mk_int(acc));
        }
        if rest.len() == 1 { rest[0] } else { self.mk_add(rest) }
    }

    fn fold_concat(&mut self, a: TermId, b: TermId, sort: SortId) -> TermId {
        let mut atoms: SmallVec<[TermId; 8]> = SmallVec::new();
        self.concat_atoms(a, &mut atoms);
        self.concat_atoms(b, &mut atoms);

        let string_sort = self.sorts.string_sort();
        let mut pieces: SmallVec<[TermId; 8]> = SmallVec::new();
        let mut pending = String::new();
        for &atom in &atoms {
            if matches!(self.kind(atom), TermKind::SeqEmpty) {
                continue;
            }
            if sort == string_sort {
                if let Some(s) = self.seq_as_string(atom) {
                    pending.push_str(&s);
                    continue;
                }
            }
            if !pending.is_empty() {
                let lit = self.mk_string_lit(&std::mem::take(&mut pending));
                pieces.push(lit);
            }
            pieces.push(atom);
        }
        if !pending.is_empty() {
            let lit = self.mk_string_lit(&pending);
            pieces.push(lit);
        }

        match pieces.len() {
            0 => self.mk_seq_empty(sort),
            1 => pieces[0],
            _ => {
                let mut acc = *pieces.last().expect("nonempty");
                for &p in pieces.iter().rev().skip(1) {
                    acc = self.mk_str_concat(p, acc);
                }
                acc
            }
        }
    }

    fn fold_len(&mut self, x: TermId) -> TermId {
        if let Some(s) = self.seq_as_string(x) {
            return self.mk_int(BigInt::from(s.chars().count()));
        }
        match self.kind(x) {
            TermKind::SeqUnit(_) => self.mk_int(BigInt::from(1)),
            TermKind::StrConcat(_, _) => {
                let mut atoms: SmallVec<[TermId; 8]> = SmallVec::new();
                self.concat_atoms(x, &mut atoms);
                let lens: Vec<TermId> = atoms
                    .iter()
                    .map(|&a| {
                        let l = self.mk_str_len(a);
                        self.simplify(l)
                    })
                    .collect();
                self.fold_add(&lens)
            }
            _ => self.mk_str_len(x),
        }
    }

    fn fold_substr(&mut self, hay: &str, i: i64, l: i64, s: TermId, sort: SortId) -> TermId {
        let n = hay.chars().count() as i64;
        if i < 0 {
            return s;
        }
        if i >= n {
            return self.mk_seq_empty(sort);
        }
        let take = l.clamp(0, n - i) as usize;
        let out: String = hay.chars().skip(i as usize).take(take).collect();
        self.mk_ground_seq(&out)
    }

    fn mk_ground_seq(&mut self, s: &str) -> TermId {
        if s.is_empty() {
            let sort = self.sorts.string_sort();
            self.mk_seq_empty(sort)
        } else {
            self.mk_string_lit(s)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strvar(tm: &mut TermManager, name: &str) -> TermId {
        let s = tm.sorts.string_sort();
        tm.mk_var(name, s)
    }

    #[test]
    fn test_concat_folds_literals() {
        let mut tm = TermManager::new();
        let a = tm.mk_string_lit("ab");
        let b = tm.mk_string_lit("cd");
        let cat = tm.mk_str_concat(a, b);
        let r = tm.simplify(cat);
        assert_eq!(tm.str_value(r), Some("abcd"));
    }

    #[test]
    fn test_concat_drops_empty_and_merges_around_vars() {
        let mut tm = TermManager::new();
        let sort = tm.sorts.string_sort();
        let x = strvar(&mut tm, "x");
        let e = tm.mk_seq_empty(sort);
        let a = tm.mk_string_lit("a");
        let b = tm.mk_string_lit("b");
        // a ++ "" ++ b ++ x  ==>  "ab" ++ x
        let t1 = tm.mk_str_concat(b, x);
        let t2 = tm.mk_str_concat(e, t1);
        let t3 = tm.mk_str_concat(a, t2);
        let r = tm.simplify(t3);
        match tm.kind(r) {
            TermKind::StrConcat(l, rr) => {
                assert_eq!(tm.str_value(*l), Some("ab"));
                assert_eq!(*rr, x);
            }
            k => panic!("unexpected shape {k:?}"),
        }
    }

    #[test]
    fn test_empty_literal_normalizes() {
        let mut tm = TermManager::new();
        let lit = tm.mk_string_lit("");
        let r = tm.simplify(lit);
        assert!(matches!(tm.kind(r), TermKind::SeqEmpty));
    }

    #[test]
    fn test_unit_of_char_becomes_literal() {
        let mut tm = TermManager::new();
        let c = tm.mk_char('z');
        let u = tm.mk_seq_unit(c);
        let r = tm.simplify(u);
        assert_eq!(tm.str_value(r), Some("z"));
    }

    #[test]
    fn test_len_folds() {
        let mut tm = TermManager::new();
        let a = tm.mk_string_lit("abc");
        let l = tm.mk_str_len(a);
        let r = tm.simplify(l);
        assert_eq!(tm.int_value(r), Some(&BigInt::from(3)));
    }

    #[test]
    fn test_len_distributes_over_concat() {
        let mut tm = TermManager::new();
        let x = strvar(&mut tm, "x");
        let a = tm.mk_string_lit("ab");
        let cat = tm.mk_str_concat(a, x);
        let l = tm.mk_str_len(cat);
        let r = tm.simplify(l);
        // 2 + len(x), as an Add with the constant folded in
        match tm.kind(r) {
            TermKind::Add(args) => {
                assert_eq!(args.len(), 2);
                assert!(args.iter().any(|&t| tm.int_value(t) == Some(&BigInt::from(2))));
            }
            k => panic!("unexpected shape {k:?}"),
        }
    }

    #[test]
    fn test_predicates_fold_on_ground() {
        let mut tm = TermManager::new();
        let a = tm.mk_string_lit("ab");
        let b = tm.mk_string_lit("abc");
        let p = tm.mk_str_prefixof(a, b);
        let p = tm.simplify(p);
        assert!(matches!(tm.kind(p), TermKind::True));
        let s = tm.mk_str_suffixof(a, b);
        let s = tm.simplify(s);
        assert!(matches!(tm.kind(s), TermKind::False));
        let c = tm.mk_str_contains(a, b);
        let c = tm.simplify(c);
        assert!(matches!(tm.kind(c), TermKind::True));
    }

    #[test]
    fn test_indexof_folds_leftmost() {
        let mut tm = TermManager::new();
        let pat = tm.mk_string_lit("b");
        let hay = tm.mk_string_lit("abab");
        let i = tm.mk_str_indexof(pat, hay);
        let r = tm.simplify(i);
        assert_eq!(tm.int_value(r), Some(&BigInt::from(1)));
        let missing = tm.mk_string_lit("z");
        let j = tm.mk_str_indexof(missing, hay);
        let j = tm.simplify(j);
        assert_eq!(tm.int_value(j).cloned(), Some(BigInt::from(-1)));
    }

    #[test]
    fn test_replace_folds_first_occurrence() {
        let mut tm = TermManager::new();
        let a = tm.mk_string_lit("aXa");
        let s = tm.mk_string_lit("X");
        let t = tm.mk_string_lit("YZ");
        let r = tm.mk_str_replace(a, s, t);
        let folded = tm.simplify(r);
        assert_eq!(tm.str_value(folded), Some("aYZa"));
    }

    #[test]
    fn test_replace_no_match_ignores_replacement() {
        let mut tm = TermManager::new();
        let a = tm.mk_string_lit("ab");
        let s = tm.mk_string_lit("z");
        let t = strvar(&mut tm, "t");
        let r = tm.mk_str_replace(a, s, t);
        let folded = tm.simplify(r);
        assert_eq!(folded, a);
    }

    #[test]
    fn test_substr_boundaries() {
        let mut tm = TermManager::new();
        let s = tm.mk_string_lit("abcde");
        let cases: &[(i64, i64, &str)] = &[(1, 3, "bcd"), (0, 99, "abcde"), (4, 1, "e"), (2, 0, "")];
        for &(i, l, expect) in cases {
            let iv = tm.mk_int(BigInt::from(i));
            let lv = tm.mk_int(BigInt::from(l));
            let e = tm.mk_str_substr(s, iv, lv);
            let r = tm.simplify(e);
            assert_eq!(tm.seq_as_string(r).as_deref(), Some(expect), "substr({i},{l})");
        }
        // out of range on the right yields the empty sequence
        let iv = tm.mk_int(BigInt::from(9));
        let lv = tm.mk_int(BigInt::from(1));
        let e = tm.mk_str_substr(s, iv, lv);
        let e2 = tm.simplify(e);
        assert!(matches!(tm.kind(e2), TermKind::SeqEmpty));
        // negative start yields the sequence itself
        let iv = tm.mk_int(BigInt::from(-1));
        let e = tm.mk_str_substr(s, iv, lv);
        assert_eq!(tm.simplify(e), s);
    }

    #[test]
    fn test_arith_folds() {
        let mut tm = TermManager::new();
        let one = tm.mk_int(BigInt::from(1));
        let two = tm.mk_int(BigInt::from(2));
        let sum = tm.mk_add(vec![one, two]);
        let sum = tm.simplify(sum);
        assert_eq!(tm.int_value(sum).cloned(), Some(BigInt::from(3)));
        let ge = tm.mk_ge(two, one);
        let ge = tm.simplify(ge);
        assert!(matches!(tm.kind(ge), TermKind::True));
        let sub = tm.mk_sub(two, two);
        let sub = tm.simplify(sub);
        assert_eq!(tm.int_value(sub).cloned(), Some(BigInt::ZERO));
    }

    #[test]
    fn test_eq_folds_ground_sequences() {
        let mut tm = TermManager::new();
        let a = tm.mk_string_lit("ab");
        let b = tm.mk_string_lit("a");
        let c = tm.mk_string_lit("b");
        let bc = tm.mk_str_concat(b, c);
        let eq = tm.mk_eq(a, bc);
        let eq = tm.simplify(eq);
        assert!(matches!(tm.kind(eq), TermKind::True));
        let d = tm.mk_string_lit("ba");
        let eq2 = tm.mk_eq(a, d);
        let eq2 = tm.simplify(eq2);
        assert!(matches!(tm.kind(eq2), TermKind::False));
    }

    #[test]
    fn test_simplify_idempotent() {
        let mut tm = TermManager::new();
        let x = strvar(&mut tm, "x");
        let a = tm.mk_string_lit("ab");
        let e = tm.mk_string_lit("");
        let cat = tm.mk_str_concat(a, e);
        let cat2 = tm.mk_str_concat(cat, x);
        let len = tm.mk_str_len(cat2);
        let once = tm.simplify(len);
        let twice = tm.simplify(once);
        assert_eq!(once, twice);
    }
}
