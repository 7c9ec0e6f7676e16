//! Sequence Theory Solver
//!
//! The driver around the backtrackable stores: canonization against the
//! solution map, structural simplification and unit solving of pending
//! equations, alignment branching when simplification saturates, negative
//! constraint checking, and the final-check protocol with the host.
//!
//! All mutable state is scope-stacked. Every mutation either goes through
//! the typed undo trail or is copy-on-push (the equation frames), so a
//! `pop_scope` restores the observable state of every store exactly.

use crate::deps::{Dep, DepManager};
use crate::equations::Equations;
use crate::exclusion::ExclusionTable;
use crate::host::{ENodeId, EPair, Host, Justification, Statistics};
use crate::model::SeqFactory;
use crate::simplify::{Reduction, reduce_eq};
use crate::solution::SolutionMap;
use crate::trail::{Trail, UndoOp};
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::fmt::Write as _;
use strand_core::ast::{SkolemTag, TermId, TermKind, TermManager};
use strand_core::literal::Lit;
use tracing::{debug, trace};

/// Verdict of a final check, reported back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinalCheckStatus {
    /// Work was done (propagation, split, or conflict); call again.
    Continue,
    /// The solver cannot decide the remaining constraints.
    GiveUp,
    /// The sequence constraints are satisfied.
    Done,
}

/// Outcome of one driver step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    Progress,
    NoProgress,
    Conflict,
}

/// Counters reported through `collect_statistics`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeqStats {
    /// Case-split equalities proposed to the host.
    pub num_splits: u64,
    /// Pending equations consumed by simplification or solving.
    pub num_reductions: u64,
}

#[derive(Debug)]
struct Scope {
    trail_mark: usize,
    dep_mark: usize,
}

/// The sequence theory core.
#[derive(Debug)]
pub struct SeqSolver {
    pub(crate) dm: DepManager,
    pub(crate) rep: SolutionMap,
    pub(crate) exclude: ExclusionTable,
    pub(crate) eqs: Equations,
    pub(crate) ineqs: Vec<TermId>,
    pub(crate) axioms: Vec<TermId>,
    pub(crate) axioms_head: usize,
    pub(crate) len_concat_seen: FxHashSet<TermId>,
    branch_head: usize,
    pub(crate) incomplete: bool,
    pub(crate) model_completion: bool,
    pub(crate) factory: SeqFactory,
    pub(crate) trail: Trail,
    scopes: Vec<Scope>,
    stats: SeqStats,
}

impl SeqSolver {
    /// Create a solver at base scope.
    pub fn new() -> Self {
        Self {
            dm: DepManager::new(),
            rep: SolutionMap::new(),
            exclude: ExclusionTable::new(),
            eqs: Equations::new(),
            ineqs: Vec::new(),
            axioms: Vec::new(),
            axioms_head: 0,
            len_concat_seen: FxHashSet::default(),
            branch_head: 0,
            incomplete: false,
            model_completion: false,
            factory: SeqFactory::new(),
            trail: Trail::new(),
            scopes: Vec::new(),
            stats: SeqStats::default(),
        }
    }

    /// Whether the solver has seen a construct outside its fragment.
    pub fn is_incomplete(&self) -> bool {
        self.incomplete
    }

    /// Number of pending equations in the current scope.
    pub fn pending_eqs(&self) -> usize {
        self.eqs.len()
    }

    /// Current scope depth.
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    /// Statistics snapshot.
    pub fn stats(&self) -> SeqStats {
        self.stats
    }

    /// Report counters into the host's sink.
    pub fn collect_statistics(&self, st: &mut Statistics) {
        st.update("seq num splits", self.stats.num_splits);
        st.update("seq num reductions", self.stats.num_reductions);
    }

    /// Resolve a term through the solution map.
    pub fn find_solution(&mut self, e: TermId) -> TermId {
        self.rep.find(e, &mut self.dm, &mut self.trail).0
    }

    // ------------------------------------------------------------------
    // term classification

    pub(crate) fn is_var(tm: &TermManager, t: TermId) -> bool {
        matches!(tm.kind(t), TermKind::Var(_) | TermKind::Skolem { .. })
    }

    /// Left/right split selectors are transparent for occurrence checks.
    fn strip_selectors(tm: &TermManager, mut t: TermId) -> TermId {
        loop {
            match tm.kind(t) {
                TermKind::Skolem {
                    tag: SkolemTag::Left | SkolemTag::Right,
                    args,
                } => t = args[0],
                _ => return t,
            }
        }
    }

    /// Whether `a` occurs in `b` under concatenation and split selectors.
    pub(crate) fn occurs(tm: &TermManager, a: TermId, b: TermId) -> bool {
        debug_assert!(Self::is_var(tm, a));
        let a = Self::strip_selectors(tm, a);
        Self::occurs_stripped(tm, a, b)
    }

    fn occurs_stripped(tm: &TermManager, a: TermId, b: TermId) -> bool {
        match tm.kind(b) {
            TermKind::StrConcat(x, y) => {
                let (x, y) = (*x, *y);
                Self::occurs_stripped(tm, a, x) || Self::occurs_stripped(tm, a, y)
            }
            _ => a == Self::strip_selectors(tm, b),
        }
    }

    // ------------------------------------------------------------------
    // canonization

    /// Normal form of `e` under the current solution map and the
    /// rewriter, joining every witness crossed into `dep`.
    pub fn canonize(&mut self, tm: &mut TermManager, e: TermId, dep: &mut Dep) -> TermId {
        let expanded = self.expand(tm, e, dep);
        tm.simplify(expanded)
    }

    fn expand(&mut self, tm: &mut TermManager, e: TermId, dep: &mut Dep) -> TermId {
        let (e, d) = self.rep.find(e, &mut self.dm, &mut self.trail);
        *dep = self.dm.join(*dep, d);
        let kind = tm.kind(e).clone();
        match kind {
            TermKind::StrConcat(a, b) => {
                let a = self.expand(tm, a, dep);
                let b = self.expand(tm, b, dep);
                tm.mk_str_concat(a, b)
            }
            TermKind::SeqEmpty | TermKind::StringLit(_) => e,
            TermKind::Eq(a, b) => {
                let a = self.expand(tm, a, dep);
                let b = self.expand(tm, b, dep);
                tm.mk_eq(a, b)
            }
            TermKind::StrPrefixOf(a, b) => {
                let a = self.expand(tm, a, dep);
                let b = self.expand(tm, b, dep);
                tm.mk_str_prefixof(a, b)
            }
            TermKind::StrSuffixOf(a, b) => {
                let a = self.expand(tm, a, dep);
                let b = self.expand(tm, b, dep);
                tm.mk_str_suffixof(a, b)
            }
            TermKind::StrContains(a, b) => {
                let a = self.expand(tm, a, dep);
                let b = self.expand(tm, b, dep);
                tm.mk_str_contains(a, b)
            }
            _ => {
                if self.model_completion && Self::is_var(tm, e) {
                    let sort = tm.sort(e);
                    if let Ok(val) = self.factory.get_fresh_value(tm, sort) {
                        self.rep.update(e, val, None, &mut self.trail);
                        return val;
                    }
                }
                e
            }
        }
    }

    // ------------------------------------------------------------------
    // propagation to the host

    fn linearized(&self, dep: Dep) -> Vec<EPair> {
        let mut pairs = Vec::new();
        self.dm.linearize(dep, &mut pairs);
        pairs
    }

    fn propagate_lit<H: Host>(&mut self, host: &mut H, dep: Dep, lit: Lit) {
        let eqs = self.linearized(dep);
        host.assign(lit, Justification::propagation(Vec::new(), eqs));
    }

    fn propagate_eq<H: Host>(&mut self, host: &mut H, dep: Dep, n1: ENodeId, n2: ENodeId) {
        let eqs = self.linearized(dep);
        host.assign_eq(n1, n2, Justification::eq_propagation(Vec::new(), eqs));
    }

    fn propagate_eq_from_lit<H: Host>(
        &mut self,
        tm: &mut TermManager,
        host: &mut H,
        lit: Lit,
        e1: TermId,
        e2: TermId,
    ) {
        let n1 = host.internalize(tm, e1);
        let n2 = host.internalize(tm, e2);
        host.assign_eq(n1, n2, Justification::eq_propagation(vec![lit], Vec::new()));
    }

    pub(crate) fn set_conflict_deps<H: Host>(&mut self, host: &mut H, dep: Dep) {
        let eqs = self.linearized(dep);
        host.set_conflict(Justification::conflict(eqs));
    }

    // ------------------------------------------------------------------
    // simplification and unit solving

    fn simplify_eq<H: Host>(
        &mut self,
        tm: &mut TermManager,
        host: &mut H,
        l: TermId,
        r: TermId,
        dep: Dep,
    ) -> bool {
        let mut deps = dep;
        let lh = self.canonize(tm, l, &mut deps);
        let rh = self.canonize(tm, r, &mut deps);
        match reduce_eq(tm, lh, rh) {
            Reduction::Unsat => {
                trace!(lhs = %tm.display(lh), rhs = %tm.display(rh), "equation refuted");
                self.set_conflict_deps(host, deps);
                true
            }
            Reduction::Subproblems(pairs) => {
                if pairs.len() == 1 && pairs[0] == (l, r) {
                    return false;
                }
                for &(a, b) in &pairs {
                    self.eqs.push(a, b, deps);
                }
                true
            }
        }
    }

    fn solve_unit_eq<H: Host>(
        &mut self,
        tm: &mut TermManager,
        host: &mut H,
        l: TermId,
        r: TermId,
        dep: Dep,
    ) -> bool {
        let mut deps = dep;
        let lh = self.canonize(tm, l, &mut deps);
        let rh = self.canonize(tm, r, &mut deps);
        if lh == rh {
            return true;
        }
        if Self::is_var(tm, lh) && !Self::occurs(tm, lh, rh) {
            self.add_solution(tm, host, lh, rh, deps);
            return true;
        }
        if Self::is_var(tm, rh) && !Self::occurs(tm, rh, lh) {
            self.add_solution(tm, host, rh, lh, deps);
            return true;
        }
        false
    }

    fn add_solution<H: Host>(
        &mut self,
        tm: &mut TermManager,
        host: &mut H,
        l: TermId,
        r: TermId,
        deps: Dep,
    ) {
        assert!(!Self::occurs(tm, l, r), "occurs-check inversion");
        trace!(var = %tm.display(l), value = %tm.display(r), "solution");
        self.rep.update(l, r, deps, &mut self.trail);
        if let (Some(n1), Some(n2)) = (host.enode(l), host.enode(r)) {
            self.propagate_eq(host, deps, n1, n2);
        }
    }

    fn pre_process_eqs<H: Host>(
        &mut self,
        tm: &mut TermManager,
        host: &mut H,
        simplify: bool,
    ) -> bool {
        let mut change = false;
        let mut i = 0;
        while !host.inconsistent() && i < self.eqs.len() {
            let (l, r, d) = self.eqs.get(i);
            let consumed = if simplify {
                self.simplify_eq(tm, host, l, r, d)
            } else {
                self.solve_unit_eq(tm, host, l, r, d)
            };
            if consumed {
                if self.eqs.swap_remove(i) {
                    self.stats.num_reductions += 1;
                }
                change = true;
            } else {
                i += 1;
            }
        }
        change
    }

    fn simplify_eqs<H: Host>(&mut self, tm: &mut TermManager, host: &mut H) -> bool {
        self.pre_process_eqs(tm, host, true)
    }

    fn solve_basic_eqs<H: Host>(&mut self, tm: &mut TermManager, host: &mut H) -> bool {
        self.pre_process_eqs(tm, host, false)
    }

    pub(crate) fn simplify_and_solve_eqs<H: Host>(
        &mut self,
        tm: &mut TermManager,
        host: &mut H,
    ) -> Step {
        let mut change = self.simplify_eqs(tm, host);
        while !host.inconsistent() && self.solve_basic_eqs(tm, host) {
            self.simplify_eqs(tm, host);
            change = true;
        }
        if host.inconsistent() {
            Step::Conflict
        } else if change {
            Step::Progress
        } else {
            Step::NoProgress
        }
    }

    // ------------------------------------------------------------------
    // negative constraints

    pub(crate) fn check_ineqs<H: Host>(&mut self, tm: &mut TermManager, host: &mut H) -> Step {
        for i in 0..self.ineqs.len() {
            let a = self.ineqs[i];
            let mut deps: Dep = None;
            let b = self.canonize(tm, a, &mut deps);
            if matches!(tm.kind(b), TermKind::True) {
                trace!(atom = %tm.display(a), "negated constraint evaluates to true");
                let lit = host.literal(tm, a);
                self.propagate_lit(host, deps, lit);
                return Step::Conflict;
            }
        }
        Step::NoProgress
    }

    // ------------------------------------------------------------------
    // branching

    pub(crate) fn branch_variable<H: Host>(
        &mut self,
        tm: &mut TermManager,
        host: &mut H,
    ) -> Step {
        let sz = self.eqs.len();
        if sz == 0 {
            return Step::NoProgress;
        }
        for i in 0..sz {
            let k = (i + self.branch_head) % sz;
            let (l, r, _) = self.eqs.get(k);
            trace!(lhs = %tm.display(l), rhs = %tm.display(r), "branch candidate scan");
            let mut ls: SmallVec<[TermId; 8]> = SmallVec::new();
            tm.concat_atoms(l, &mut ls);
            let mut rs: SmallVec<[TermId; 8]> = SmallVec::new();
            tm.concat_atoms(r, &mut rs);
            if !ls.is_empty() && self.find_branch_candidate(tm, host, ls[0], &rs) {
                self.branch_head = k;
                return Step::Progress;
            }
            if !rs.is_empty() && self.find_branch_candidate(tm, host, rs[0], &ls) {
                self.branch_head = k;
                return Step::Progress;
            }
        }
        Step::NoProgress
    }

    fn find_branch_candidate<H: Host>(
        &mut self,
        tm: &mut TermManager,
        host: &mut H,
        l: TermId,
        rs: &[TermId],
    ) -> bool {
        if !Self::is_var(tm, l) {
            return false;
        }
        let sort = tm.sort(l);
        let mut v0 = tm.mk_seq_empty(sort);
        if self.assume_equality(tm, host, l, v0) {
            return true;
        }
        for (j, &rj) in rs.iter().enumerate() {
            if Self::occurs(tm, l, rj) {
                return false;
            }
            if let Some(s) = tm.str_value(rj).map(str::to_string) {
                let chars: Vec<char> = s.chars().collect();
                for k in 1..chars.len() {
                    let prefix: String = chars[..k].iter().collect();
                    let lit = tm.mk_string_lit(&prefix);
                    let v = tm.mk_str_concat(v0, lit);
                    if self.assume_equality(tm, host, l, v) {
                        return true;
                    }
                }
            }
            v0 = if j == 0 {
                rs[0]
            } else {
                tm.mk_str_concat(v0, rj)
            };
            if self.assume_equality(tm, host, l, v0) {
                return true;
            }
        }
        false
    }

    fn assume_equality<H: Host>(
        &mut self,
        tm: &mut TermManager,
        host: &mut H,
        l: TermId,
        r: TermId,
    ) -> bool {
        let r = tm.simplify(r);
        if self.exclude.contains(l, r) {
            return false;
        }
        debug!(lhs = %tm.display(l), rhs = %tm.display(r), "assume equality");
        let n1 = host.internalize(tm, l);
        let n2 = host.internalize(tm, r);
        host.assume_eq(n1, n2);
        self.stats.num_splits += 1;
        true
    }

    /// Reserved for a heavier case-split enumeration. Callers must not
    /// rely on it for completeness.
    pub(crate) fn split_variable(&mut self) -> bool {
        false
    }

    // ------------------------------------------------------------------
    // final check

    /// Decide the sequence constraints under the host's current
    /// assignment.
    pub fn final_check<H: Host>(&mut self, tm: &mut TermManager, host: &mut H) -> FinalCheckStatus {
        debug!(pending = self.eqs.len(), ineqs = self.ineqs.len(), "seq final check");
        if let Step::Conflict = self.check_ineqs(tm, host) {
            return FinalCheckStatus::Continue;
        }
        match self.simplify_and_solve_eqs(tm, host) {
            Step::Progress | Step::Conflict => return FinalCheckStatus::Continue,
            Step::NoProgress => {}
        }
        if host.inconsistent() {
            return FinalCheckStatus::Continue;
        }
        if let Step::Progress = self.branch_variable(tm, host) {
            return FinalCheckStatus::Continue;
        }
        if self.split_variable() {
            return FinalCheckStatus::Continue;
        }
        if !self.eqs.is_empty() || self.incomplete {
            return FinalCheckStatus::GiveUp;
        }
        FinalCheckStatus::Done
    }

    // ------------------------------------------------------------------
    // event handlers

    /// The host merged two sequence-sorted classes.
    pub fn new_eq_eh<H: Host>(
        &mut self,
        tm: &mut TermManager,
        host: &mut H,
        n1: ENodeId,
        n2: ENodeId,
    ) {
        if n1 == n2 {
            return;
        }
        let t1 = host.owner(n1);
        let t2 = host.owner(n2);
        let dep = self.dm.leaf((n1, n2));
        self.eqs.push(t1, t2, dep);
        self.new_eq_len_concat(tm, t1, t2);
        self.new_eq_len_concat(tm, t2, t1);
    }

    fn new_eq_len_concat(&mut self, tm: &mut TermManager, t1: TermId, t2: TermId) {
        if !tm.sorts.is_seq(tm.sort(t1)) {
            return;
        }
        if !matches!(tm.kind(t2), TermKind::StrConcat(_, _)) {
            return;
        }
        if !self.len_concat_seen.insert(t2) {
            return;
        }
        self.trail.push(UndoOp::LenConcatSeen { term: t2 });
        self.add_len_concat_axiom(tm, t2);
    }

    /// The host separated two sequence-sorted classes.
    pub fn new_diseq_eh<H: Host>(
        &mut self,
        tm: &mut TermManager,
        host: &mut H,
        n1: ENodeId,
        n2: ENodeId,
    ) {
        let t1 = host.owner(n1);
        let t2 = host.owner(n2);
        let atom = tm.mk_eq(t1, t2);
        self.trail.push(UndoOp::IneqPushed);
        self.ineqs.push(atom);
        self.exclude.add(t1, t2, &mut self.trail);
    }

    /// A sequence predicate atom was assigned a truth value.
    pub fn assign_eh<H: Host>(
        &mut self,
        tm: &mut TermManager,
        host: &mut H,
        lit: Lit,
        atom: TermId,
        is_true: bool,
    ) {
        if !is_true {
            self.trail.push(UndoOp::IneqPushed);
            self.ineqs.push(atom);
            return;
        }
        let kind = tm.kind(atom).clone();
        match kind {
            TermKind::StrPrefixOf(a, b) => {
                let sort = tm.sort(a);
                let sk = tm.mk_skolem(SkolemTag::Prefix, &[a, b], sort);
                let f = tm.mk_str_concat(a, sk);
                self.propagate_eq_from_lit(tm, host, lit, f, b);
            }
            TermKind::StrSuffixOf(a, b) => {
                let sort = tm.sort(a);
                let sk = tm.mk_skolem(SkolemTag::Suffix, &[a, b], sort);
                let f = tm.mk_str_concat(sk, a);
                self.propagate_eq_from_lit(tm, host, lit, f, b);
            }
            TermKind::StrContains(a, b) => {
                let sort = tm.sort(a);
                let left = tm.mk_skolem(SkolemTag::ContainsLeft, &[a, b], sort);
                let right = tm.mk_skolem(SkolemTag::ContainsRight, &[a, b], sort);
                let la = tm.mk_str_concat(left, a);
                let f = tm.mk_str_concat(la, right);
                self.propagate_eq_from_lit(tm, host, lit, f, b);
            }
            TermKind::StrInRe(_, _) => self.set_incomplete(),
            _ => unreachable!("asserted sequence atom has unexpected shape"),
        }
    }

    /// A term of the sequence fragment was internalized.
    pub fn internalize_term<H: Host>(&mut self, tm: &mut TermManager, host: &mut H, t: TermId) {
        host.internalize(tm, t);
        match tm.kind(t) {
            TermKind::StrInRe(_, _) => self.set_incomplete(),
            TermKind::StringLit(_)
            | TermKind::SeqEmpty
            | TermKind::SeqUnit(_)
            | TermKind::StrConcat(_, _)
            | TermKind::StrLen(_)
            | TermKind::StrPrefixOf(_, _)
            | TermKind::StrSuffixOf(_, _)
            | TermKind::StrContains(_, _)
            | TermKind::StrIndexOf(_, _)
            | TermKind::StrReplace(_, _, _)
            | TermKind::StrSubstr(_, _, _)
            | TermKind::Var(_)
            | TermKind::Skolem { .. } => {}
            _ => {
                if tm.sorts.is_seq(tm.sort(t)) {
                    self.set_incomplete();
                }
            }
        }
    }

    /// The host marked a term relevant; emit its reduction axioms.
    pub fn relevant_eh(&mut self, tm: &mut TermManager, t: TermId) {
        let kind = tm.kind(t).clone();
        match kind {
            TermKind::StrLen(x) => {
                self.add_len_axiom(tm, t);
                if matches!(tm.kind(x), TermKind::StrConcat(_, _))
                    && self.len_concat_seen.insert(x)
                {
                    self.trail.push(UndoOp::LenConcatSeen { term: x });
                    self.add_len_concat_axiom(tm, x);
                }
            }
            TermKind::StrIndexOf(_, _) => self.add_indexof_axiom(tm, t),
            TermKind::StrReplace(_, _, _) => self.add_replace_axiom(tm, t),
            TermKind::StrSubstr(_, _, _) => self.add_extract_axiom(tm, t),
            TermKind::StrInRe(_, _) => self.set_incomplete(),
            _ => {}
        }
    }

    pub(crate) fn set_incomplete(&mut self) {
        if !self.incomplete {
            self.trail.push(UndoOp::Incomplete { prev: false });
            self.incomplete = true;
        }
    }

    // ------------------------------------------------------------------
    // scopes

    /// Enter a host decision level.
    pub fn push_scope(&mut self) {
        self.scopes.push(Scope {
            trail_mark: self.trail.len(),
            dep_mark: self.dm.mark(),
        });
        let prev = self.axioms_head;
        self.trail.push(UndoOp::AxiomsHead { prev });
        self.eqs.push_frame();
    }

    /// Undo the top `k` decision levels.
    pub fn pop_scope(&mut self, k: usize) {
        for _ in 0..k {
            let scope = self.scopes.pop().expect("scope stack underflow");
            while self.trail.len() > scope.trail_mark {
                match self.trail.pop().expect("trail shorter than scope mark") {
                    UndoOp::SolutionInserted { key } => self.rep.undo_insert(key),
                    UndoOp::SolutionOverwritten { key, rep, dep } => {
                        self.rep.undo_overwrite(key, rep, dep);
                    }
                    UndoOp::ExclusionInserted { a, b } => self.exclude.undo_insert(a, b),
                    UndoOp::IneqPushed => {
                        self.ineqs.pop();
                    }
                    UndoOp::AxiomPushed => {
                        self.axioms.pop();
                    }
                    UndoOp::AxiomsHead { prev } => self.axioms_head = prev,
                    UndoOp::Incomplete { prev } => self.incomplete = prev,
                    UndoOp::LenConcatSeen { term } => {
                        self.len_concat_seen.remove(&term);
                    }
                }
            }
            self.dm.truncate(scope.dep_mark);
            self.eqs.pop_frame();
        }
    }

    /// The host restarted its search. Pending state is scope-guarded
    /// already, so nothing is truncated here.
    pub fn restart_eh(&mut self) {}

    // ------------------------------------------------------------------
    // diagnostics

    /// Render the solver state for debugging.
    pub fn dump(&self, tm: &TermManager) -> String {
        let mut out = String::new();
        if !self.eqs.is_empty() {
            let _ = writeln!(out, "Equations:");
            for (l, r) in self.eqs.iter() {
                let _ = writeln!(out, "  {} = {}", tm.display(l), tm.display(r));
            }
        }
        if !self.ineqs.is_empty() {
            let _ = writeln!(out, "Negative constraints:");
            for &a in &self.ineqs {
                let _ = writeln!(out, "  {}", tm.display(a));
            }
        }
        if !self.rep.is_empty() {
            let _ = writeln!(out, "Solved equations:");
            for (k, r) in self.rep.iter() {
                let _ = writeln!(out, "  {} |-> {}", tm.display(k), tm.display(r));
            }
        }
        for (a, b) in self.exclude.iter() {
            let _ = writeln!(out, "{} != {}", tm.display(a), tm.display(b));
        }
        out
    }
}

impl Default for SeqSolver {
    fn default() -> Self {
        Self::new()
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
    fn test_canonize_follows_solution_chain() {
        let mut tm = TermManager::new();
        let mut solver = SeqSolver::new();
        let x = strvar(&mut tm, "x");
        let y = strvar(&mut tm, "y");
        let ab = tm.mk_string_lit("ab");
        solver.rep.update(x, y, None, &mut solver.trail);
        solver.rep.update(y, ab, None, &mut solver.trail);
        let c = tm.mk_string_lit("c");
        let xc = tm.mk_str_concat(x, c);
        let mut dep = None;
        let r = solver.canonize(&mut tm, xc, &mut dep);
        assert_eq!(tm.str_value(r), Some("abc"));
    }

    #[test]
    fn test_canonize_idempotent() {
        let mut tm = TermManager::new();
        let mut solver = SeqSolver::new();
        let x = strvar(&mut tm, "x");
        let a = tm.mk_string_lit("a");
        solver.rep.update(x, a, None, &mut solver.trail);
        let y = strvar(&mut tm, "y");
        let xy = tm.mk_str_concat(x, y);
        let mut dep = None;
        let once = solver.canonize(&mut tm, xy, &mut dep);
        let mut dep2 = None;
        let twice = solver.canonize(&mut tm, once, &mut dep2);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_occurs_through_concat_and_selectors() {
        let mut tm = TermManager::new();
        let sort = tm.sorts.string_sort();
        let x = strvar(&mut tm, "x");
        let y = strvar(&mut tm, "y");
        let a = tm.mk_string_lit("a");
        let ya = tm.mk_str_concat(y, a);
        let yx = tm.mk_str_concat(ya, x);
        assert!(SeqSolver::occurs(&tm, x, yx));
        assert!(!SeqSolver::occurs(&tm, x, ya));
        // selectors are transparent on both sides
        let left_x = tm.mk_skolem(SkolemTag::Left, &[x], sort);
        assert!(SeqSolver::occurs(&tm, left_x, yx));
        let right_y = tm.mk_skolem(SkolemTag::Right, &[y], sort);
        let cat = tm.mk_str_concat(right_y, a);
        assert!(SeqSolver::occurs(&tm, y, cat));
        // a non-selector skolem is its own entity
        let sk = tm.mk_skolem(SkolemTag::Prefix, &[x, y], sort);
        assert!(!SeqSolver::occurs(&tm, sk, yx));
    }

    #[test]
    fn test_scope_reversibility() {
        let mut tm = TermManager::new();
        let mut solver = SeqSolver::new();
        let x = strvar(&mut tm, "x");
        let y = strvar(&mut tm, "y");
        let a = tm.mk_string_lit("a");
        solver.rep.update(x, a, None, &mut solver.trail);

        solver.push_scope();
        solver.rep.update(y, a, None, &mut solver.trail);
        solver.rep.update(x, y, None, &mut solver.trail);
        solver.exclude.add(x, y, &mut solver.trail);
        solver.trail.push(UndoOp::IneqPushed);
        let eq_atom = tm.mk_eq(x, y);
        solver.ineqs.push(eq_atom);
        solver.set_incomplete();
        solver.eqs.push(x, y, None);
        assert_eq!(solver.pending_eqs(), 1);
        assert!(solver.is_incomplete());

        solver.pop_scope(1);
        assert_eq!(solver.scope_depth(), 0);
        assert!(!solver.is_incomplete());
        assert_eq!(solver.pending_eqs(), 0);
        assert!(solver.ineqs.is_empty());
        assert!(!solver.exclude.contains(x, y));
        assert!(!solver.rep.contains(y));
        assert_eq!(solver.find_solution(x), a);
    }

    #[test]
    fn test_axioms_head_restored_on_pop() {
        let mut tm = TermManager::new();
        let mut solver = SeqSolver::new();
        let x = strvar(&mut tm, "x");
        let len = tm.mk_str_len(x);
        solver.push_scope();
        solver.add_len_axiom(&mut tm, len);
        assert!(!solver.axioms.is_empty());
        solver.axioms_head = solver.axioms.len();
        solver.pop_scope(1);
        assert_eq!(solver.axioms_head, 0);
        assert!(solver.axioms.is_empty());
    }

    #[test]
    fn test_incompleteness_from_regex() {
        let mut tm = TermManager::new();
        let mut solver = SeqSolver::new();
        let x = strvar(&mut tm, "x");
        let re = tm.mk_re_all();
        let inre = tm.mk_str_in_re(x, re);
        solver.relevant_eh(&mut tm, inre);
        assert!(solver.is_incomplete());
    }
}
