//! Axiom Factory
//!
//! Reduction lemmas that tie the compound sequence operations back to
//! concatenation equalities and length arithmetic. Lemmas are queued when
//! a term becomes relevant and flushed to the host on each propagation
//! tick; the queue and its cursor are scope-tracked, so backtracking
//! forgets exactly the lemmas of the popped levels.
//!
//! Leftmost-match semantics of `contains`/`indexof`/`replace` come from
//! the tightest-prefix constraint: the occurrence context `x` admits no
//! earlier occurrence of the pattern.

use crate::host::Host;
use crate::solver::SeqSolver;
use crate::trail::UndoOp;
use num_bigint::BigInt;
use strand_core::ast::{SkolemTag, TermId, TermKind, TermManager};
use tracing::trace;

impl SeqSolver {
    pub(crate) fn create_axiom(&mut self, fml: TermId) {
        self.trail.push(UndoOp::AxiomPushed);
        self.axioms.push(fml);
    }

    /// Whether un-asserted axioms are queued.
    pub fn can_propagate(&self) -> bool {
        self.axioms_head < self.axioms.len()
    }

    /// Flush queued axioms to the host, advancing the cursor.
    pub fn propagate<H: Host>(&mut self, tm: &mut TermManager, host: &mut H) {
        while self.axioms_head < self.axioms.len() && !host.inconsistent() {
            let fml = self.axioms[self.axioms_head];
            self.assert_axiom(tm, host, fml);
            self.axioms_head += 1;
        }
    }

    fn assert_axiom<H: Host>(&mut self, tm: &mut TermManager, host: &mut H, fml: TermId) {
        let e = tm.simplify(fml);
        if matches!(tm.kind(e), TermKind::True) {
            return;
        }
        trace!(axiom = %tm.display(e), "asserting");
        let lit = host.literal(tm, e);
        host.mk_th_axiom(&[lit]);
    }

    /// `s = s1 ⌢ c`, `|c| = 1`, and `s` does not occur in `x ⌢ s1`: the
    /// occurrence of `s` witnessed after `x` is the leftmost one.
    pub(crate) fn tightest_prefix(&mut self, tm: &mut TermManager, s: TermId, x: TermId) -> TermId {
        let sort = tm.sort(s);
        let s1 = tm.mk_skolem(SkolemTag::First, &[s], sort);
        let c = tm.mk_skolem(SkolemTag::Last, &[s], sort);
        let s1c = tm.mk_str_concat(s1, c);
        let eq_split = tm.mk_eq(s, s1c);
        let len_c = tm.mk_str_len(c);
        let one = tm.mk_int(BigInt::from(1));
        let eq_len = tm.mk_eq(len_c, one);
        let xs1 = tm.mk_str_concat(x, s1);
        let cont = tm.mk_str_contains(s, xs1);
        let ncont = tm.mk_not(cont);
        tm.mk_and(vec![eq_split, eq_len, ncont])
    }

    /// `|x| >= 0`; `|x| = 0` iff `x = ε`; `|x|` equals its normal form.
    pub(crate) fn add_len_axiom(&mut self, tm: &mut TermManager, n: TermId) {
        let x = match tm.kind(n) {
            TermKind::StrLen(x) => *x,
            _ => unreachable!("length axiom on non-length term"),
        };
        let zero = tm.mk_int(BigInt::ZERO);
        let sort = tm.sort(x);
        let empty = tm.mk_seq_empty(sort);
        let eq_zero = tm.mk_eq(zero, n);
        let eq_empty = tm.mk_eq(x, empty);
        let fml = tm.mk_ge(n, zero);
        self.create_axiom(fml);
        let n_eq_zero = tm.mk_not(eq_zero);
        let fml = tm.mk_or(vec![n_eq_zero, eq_empty]);
        self.create_axiom(fml);
        let n_eq_empty = tm.mk_not(eq_empty);
        let fml = tm.mk_or(vec![n_eq_empty, eq_zero]);
        self.create_axiom(fml);
        let nr = tm.simplify(n);
        if nr != n {
            let fml = tm.mk_eq(n, nr);
            self.create_axiom(fml);
        }
    }

    /// `|a ⌢ b| = |a| + |b|`.
    pub(crate) fn add_len_concat_axiom(&mut self, tm: &mut TermManager, c: TermId) {
        let (a, b) = match tm.kind(c) {
            TermKind::StrConcat(a, b) => (*a, *b),
            _ => unreachable!("length-of-concat axiom on non-concat term"),
        };
        let la = tm.mk_str_len(a);
        let lb = tm.mk_str_len(b);
        let lc = tm.mk_str_len(c);
        let sum = tm.mk_add(vec![la, lb]);
        let fml = tm.mk_eq(sum, lc);
        self.create_axiom(fml);
    }

    /// Reduction of `i = indexof(s, t)`:
    /// no occurrence forces `i = -1`, an empty pattern forces `i = 0`,
    /// and otherwise `t = x ⌢ s ⌢ y` with `x` the tightest prefix.
    pub(crate) fn add_indexof_axiom(&mut self, tm: &mut TermManager, i: TermId) {
        let (s, t) = match tm.kind(i) {
            TermKind::StrIndexOf(s, t) => (*s, *t),
            _ => unreachable!("indexof axiom on non-indexof term"),
        };
        let sort = tm.sort(s);
        let x = tm.mk_skolem(SkolemTag::ContainsLeft, &[s, t], sort);
        let y = tm.mk_skolem(SkolemTag::ContainsRight, &[s, t], sort);
        let empty = tm.mk_seq_empty(sort);
        let eq_empty = tm.mk_eq(s, empty);
        let cnt = tm.mk_str_contains(s, t);
        let minus_one = tm.mk_int(BigInt::from(-1));
        let zero = tm.mk_int(BigInt::ZERO);

        let i_neg = tm.mk_eq(i, minus_one);
        let fml = tm.mk_or(vec![cnt, i_neg]);
        self.create_axiom(fml);

        let ncnt = tm.mk_not(cnt);
        let n_eq_empty = tm.mk_not(eq_empty);
        let i_zero = tm.mk_eq(i, zero);
        let fml = tm.mk_or(vec![ncnt, n_eq_empty, i_zero]);
        self.create_axiom(fml);

        let xs = tm.mk_str_concat(x, s);
        let xsy = tm.mk_str_concat(xs, y);
        let t_split = tm.mk_eq(t, xsy);
        let fml = tm.mk_or(vec![ncnt, eq_empty, t_split]);
        self.create_axiom(fml);

        let tp = self.tightest_prefix(tm, s, x);
        let fml = tm.mk_or(vec![ncnt, eq_empty, tp]);
        self.create_axiom(fml);
    }

    /// Reduction of `r = replace(a, s, t)`: with an occurrence,
    /// `a = x ⌢ s ⌢ y` and `r = x ⌢ t ⌢ y` at the leftmost match;
    /// without one, `r = a`.
    pub(crate) fn add_replace_axiom(&mut self, tm: &mut TermManager, r: TermId) {
        let (a, s, t) = match tm.kind(r) {
            TermKind::StrReplace(a, s, t) => (*a, *s, *t),
            _ => unreachable!("replace axiom on non-replace term"),
        };
        let sort = tm.sort(a);
        let cnt = tm.mk_str_contains(s, a);
        let x = tm.mk_skolem(SkolemTag::ContainsLeft, &[s, a], sort);
        let y = tm.mk_skolem(SkolemTag::ContainsRight, &[s, a], sort);
        let ncnt = tm.mk_not(cnt);

        let xs = tm.mk_str_concat(x, s);
        let xsy = tm.mk_str_concat(xs, y);
        let a_split = tm.mk_eq(a, xsy);
        let fml = tm.mk_or(vec![ncnt, a_split]);
        self.create_axiom(fml);

        let xt = tm.mk_str_concat(x, t);
        let xty = tm.mk_str_concat(xt, y);
        let r_split = tm.mk_eq(r, xty);
        let fml = tm.mk_or(vec![ncnt, r_split]);
        self.create_axiom(fml);

        let tp = self.tightest_prefix(tm, s, x);
        let fml = tm.mk_or(vec![ncnt, tp]);
        self.create_axiom(fml);

        let r_id = tm.mk_eq(r, a);
        let fml = tm.mk_or(vec![cnt, r_id]);
        self.create_axiom(fml);
    }

    /// Boundary reduction of `e = extract(s, i, l)`: a negative start
    /// yields `s`, a start past the end yields `ε`, and in range the
    /// prefix before `e` has length `i` while `|e|` follows `l` clamped
    /// to the remaining length.
    pub(crate) fn add_extract_axiom(&mut self, tm: &mut TermManager, e: TermId) {
        let (s, i, l) = match tm.kind(e) {
            TermKind::StrSubstr(s, i, l) => (*s, *i, *l),
            _ => unreachable!("extract axiom on non-extract term"),
        };
        let sort = tm.sort(s);
        let zero = tm.mk_int(BigInt::ZERO);
        let len_s = tm.mk_str_len(s);
        let empty = tm.mk_seq_empty(sort);
        let i_ge_0 = tm.mk_ge(i, zero);
        let i_past = tm.mk_ge(i, len_s);

        let e_is_s = tm.mk_eq(e, s);
        let fml = tm.mk_or(vec![i_ge_0, e_is_s]);
        self.create_axiom(fml);

        let n_i_past = tm.mk_not(i_past);
        let e_is_empty = tm.mk_eq(e, empty);
        let fml = tm.mk_or(vec![n_i_past, e_is_empty]);
        self.create_axiom(fml);

        let n_i_ge_0 = tm.mk_not(i_ge_0);
        let x = tm.mk_skolem(SkolemTag::Left, &[s, i], sort);
        let xe = tm.mk_str_concat(x, e);
        let pre = tm.mk_str_prefixof(xe, s);
        let fml = tm.mk_or(vec![n_i_ge_0, i_past, pre]);
        self.create_axiom(fml);

        let len_x = tm.mk_str_len(x);
        let x_at = tm.mk_eq(len_x, i);
        let fml = tm.mk_or(vec![n_i_ge_0, i_past, x_at]);
        self.create_axiom(fml);

        let len_e = tm.mk_str_len(e);
        let rem = tm.mk_sub(len_s, i);
        let l_ge_rem = tm.mk_ge(l, rem);
        let n_l_ge_rem = tm.mk_not(l_ge_rem);
        let l_ge_0 = tm.mk_ge(l, zero);
        let n_l_ge_0 = tm.mk_not(l_ge_0);

        let e_rem = tm.mk_eq(len_e, rem);
        let fml = tm.mk_or(vec![n_i_ge_0, i_past, n_l_ge_rem, e_rem]);
        self.create_axiom(fml);

        let e_l = tm.mk_eq(len_e, l);
        let fml = tm.mk_or(vec![n_i_ge_0, i_past, n_l_ge_0, l_ge_rem, e_l]);
        self.create_axiom(fml);

        let e_zero = tm.mk_eq(len_e, zero);
        let fml = tm.mk_or(vec![n_i_ge_0, i_past, l_ge_0, e_zero]);
        self.create_axiom(fml);
    }
}
