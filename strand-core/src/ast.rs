//! Term and Sort Universe
//!
//! Hash-consed terms addressed by [`TermId`], owned by a [`TermManager`].
//! Two structurally equal terms always share one id, so downstream code
//! compares ids instead of trees. [`TermKind`] is the single tagged view
//! of a term's shape; all consumers pattern-match on it.
//!
//! The sequence fragment follows SMT-LIB QF_S with the argument orders of
//! the native sequence solver:
//!
//! - `str_prefixof(a, b)` holds when `a` is a prefix of `b`
//! - `str_contains(a, b)` holds when `a` occurs somewhere in `b`
//! - `str_indexof(s, t)` is the position of the first occurrence of `s`
//!   in `t`, or -1
//! - `str_replace(a, s, t)` is `a` with its first occurrence of `s`
//!   replaced by `t`
//! - `str_substr(s, i, l)` extracts `l` elements of `s` starting at `i`

use lasso::{Rodeo, Spur};
use num_bigint::BigInt;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;

/// Identifier of an interned sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortId(pub u32);

impl SortId {
    /// Create a sort id from a raw index.
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Shape of a sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKind {
    /// Booleans.
    Bool,
    /// Unbounded integers.
    Int,
    /// Sequence elements (code units).
    Char,
    /// Finite sequences over an element sort.
    Seq(SortId),
    /// Regular languages over an element sort.
    RegLan(SortId),
}

/// Interner for sorts, with the common sorts pre-built.
#[derive(Debug)]
pub struct SortStore {
    kinds: Vec<SortKind>,
    table: FxHashMap<SortKind, SortId>,
    /// The Boolean sort.
    pub bool_sort: SortId,
    /// The integer sort.
    pub int_sort: SortId,
    /// The character (code unit) sort.
    pub char_sort: SortId,
    string_sort: SortId,
}

impl SortStore {
    fn new() -> Self {
        let mut store = Self {
            kinds: Vec::new(),
            table: FxHashMap::default(),
            bool_sort: SortId(0),
            int_sort: SortId(0),
            char_sort: SortId(0),
            string_sort: SortId(0),
        };
        store.bool_sort = store.intern(SortKind::Bool);
        store.int_sort = store.intern(SortKind::Int);
        store.char_sort = store.intern(SortKind::Char);
        store.string_sort = store.intern(SortKind::Seq(store.char_sort));
        store
    }

    /// Intern a sort kind, returning its stable id.
    pub fn intern(&mut self, kind: SortKind) -> SortId {
        if let Some(&id) = self.table.get(&kind) {
            return id;
        }
        let id = SortId(u32::try_from(self.kinds.len()).expect("sort table overflow"));
        self.kinds.push(kind);
        self.table.insert(kind, id);
        id
    }

    /// The string sort, `Seq Char`.
    pub fn string_sort(&self) -> SortId {
        self.string_sort
    }

    /// The sequence sort over `elem`.
    pub fn seq(&mut self, elem: SortId) -> SortId {
        self.intern(SortKind::Seq(elem))
    }

    /// The regular-language sort over `elem`.
    pub fn reglan(&mut self, elem: SortId) -> SortId {
        self.intern(SortKind::RegLan(elem))
    }

    /// Look up a sort's kind.
    pub fn get(&self, id: SortId) -> SortKind {
        self.kinds[id.0 as usize]
    }

    /// Whether `id` is a sequence sort.
    pub fn is_seq(&self, id: SortId) -> bool {
        matches!(self.get(id), SortKind::Seq(_))
    }

    /// Element sort of a sequence sort.
    pub fn elem(&self, id: SortId) -> Option<SortId> {
        match self.get(id) {
            SortKind::Seq(e) => Some(e),
            _ => None,
        }
    }
}

/// Identifier of an interned term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(pub u32);

impl TermId {
    /// Create a term id from a raw index.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Symbolic tag of a skolem term, for stable naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkolemTag {
    /// Witness of `prefixof(a, b)`: the remainder of `b` past `a`.
    Prefix,
    /// Witness of `suffixof(a, b)`: the remainder of `b` before `a`.
    Suffix,
    /// Left split selector.
    Left,
    /// Right split selector.
    Right,
    /// Context to the left of a `contains` occurrence.
    ContainsLeft,
    /// Context to the right of a `contains` occurrence.
    ContainsRight,
    /// All but the last element of a pattern.
    First,
    /// The last element of a pattern.
    Last,
}

impl fmt::Display for SkolemTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SkolemTag::Prefix => "prefix",
            SkolemTag::Suffix => "suffix",
            SkolemTag::Left => "left",
            SkolemTag::Right => "right",
            SkolemTag::ContainsLeft => "contains_left",
            SkolemTag::ContainsRight => "contains_right",
            SkolemTag::First => "first",
            SkolemTag::Last => "last",
        };
        write!(f, "{name}")
    }
}

/// Shape of a term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermKind {
    /// Boolean true.
    True,
    /// Boolean false.
    False,
    /// Negation.
    Not(TermId),
    /// N-ary conjunction.
    And(Vec<TermId>),
    /// N-ary disjunction.
    Or(Vec<TermId>),
    /// Equality between two terms of the same sort.
    Eq(TermId, TermId),
    /// Integer constant.
    IntConst(BigInt),
    /// N-ary integer addition.
    Add(Vec<TermId>),
    /// Integer subtraction.
    Sub(TermId, TermId),
    /// Greater-or-equal on integers.
    Ge(TermId, TermId),
    /// Less-or-equal on integers.
    Le(TermId, TermId),
    /// Character constant.
    CharConst(char),
    /// String literal.
    StringLit(String),
    /// The empty sequence of the term's sort.
    SeqEmpty,
    /// Singleton sequence.
    SeqUnit(TermId),
    /// Binary concatenation; n-ary uses are right-nested and flattened by
    /// the rewriter.
    StrConcat(TermId, TermId),
    /// Sequence length.
    StrLen(TermId),
    /// `a` is a prefix of `b`.
    StrPrefixOf(TermId, TermId),
    /// `a` is a suffix of `b`.
    StrSuffixOf(TermId, TermId),
    /// `a` occurs in `b`.
    StrContains(TermId, TermId),
    /// Position of the first occurrence of `s` in `t`.
    StrIndexOf(TermId, TermId),
    /// `a` with the first occurrence of `s` replaced by `t`.
    StrReplace(TermId, TermId, TermId),
    /// Extraction of `l` elements of `s` starting at `i`.
    StrSubstr(TermId, TermId, TermId),
    /// Regular-language membership.
    StrInRe(TermId, TermId),
    /// The universal regular language.
    ReAll,
    /// Uninterpreted constant with an interned name.
    Var(Spur),
    /// Skolem constant identified by tag and source arguments.
    Skolem {
        /// Symbolic tag.
        tag: SkolemTag,
        /// Source arguments the skolem was introduced for.
        args: SmallVec<[TermId; 2]>,
    },
}

/// An interned term: shape plus sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Term {
    /// Shape.
    pub kind: TermKind,
    /// Sort.
    pub sort: SortId,
}

/// Owner of all terms and sorts.
#[derive(Debug)]
pub struct TermManager {
    terms: Vec<Term>,
    table: FxHashMap<Term, TermId>,
    names: Rodeo,
    pub(crate) simplify_cache: FxHashMap<TermId, TermId>,
    /// Sort interner.
    pub sorts: SortStore,
}

impl TermManager {
    /// Create an empty term manager.
    pub fn new() -> Self {
        Self {
            terms: Vec::new(),
            table: FxHashMap::default(),
            names: Rodeo::default(),
            simplify_cache: FxHashMap::default(),
            sorts: SortStore::new(),
        }
    }

    fn intern(&mut self, kind: TermKind, sort: SortId) -> TermId {
        let term = Term { kind, sort };
        if let Some(&id) = self.table.get(&term) {
            return id;
        }
        let id = TermId(u32::try_from(self.terms.len()).expect("term table overflow"));
        self.terms.push(term.clone());
        self.table.insert(term, id);
        id
    }

    /// Look up a term by id.
    pub fn get(&self, id: TermId) -> Option<&Term> {
        self.terms.get(id.index())
    }

    /// Shape of `id`. Panics on a foreign id.
    pub fn kind(&self, id: TermId) -> &TermKind {
        &self.terms[id.index()].kind
    }

    /// Sort of `id`. Panics on a foreign id.
    pub fn sort(&self, id: TermId) -> SortId {
        self.terms[id.index()].sort
    }

    /// Number of interned terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether no terms have been interned.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Boolean true.
    pub fn mk_true(&mut self) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::True, sort)
    }

    /// Boolean false.
    pub fn mk_false(&mut self) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::False, sort)
    }

    /// Boolean constant.
    pub fn mk_bool(&mut self, b: bool) -> TermId {
        if b { self.mk_true() } else { self.mk_false() }
    }

    /// Negation.
    pub fn mk_not(&mut self, a: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::Not(a), sort)
    }

    /// Conjunction.
    pub fn mk_and(&mut self, args: Vec<TermId>) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::And(args), sort)
    }

    /// Disjunction.
    pub fn mk_or(&mut self, args: Vec<TermId>) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::Or(args), sort)
    }

    /// Equality. Identical sides collapse to true.
    pub fn mk_eq(&mut self, a: TermId, b: TermId) -> TermId {
        assert_eq!(self.sort(a), self.sort(b), "mk_eq across sorts");
        if a == b {
            return self.mk_true();
        }
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::Eq(a, b), sort)
    }

    /// Integer constant.
    pub fn mk_int(&mut self, n: BigInt) -> TermId {
        let sort = self.sorts.int_sort;
        self.intern(TermKind::IntConst(n), sort)
    }

    /// Integer addition.
    pub fn mk_add(&mut self, args: Vec<TermId>) -> TermId {
        let sort = self.sorts.int_sort;
        self.intern(TermKind::Add(args), sort)
    }

    /// Integer subtraction.
    pub fn mk_sub(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.int_sort;
        self.intern(TermKind::Sub(a, b), sort)
    }

    /// Greater-or-equal.
    pub fn mk_ge(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::Ge(a, b), sort)
    }

    /// Less-or-equal.
    pub fn mk_le(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::Le(a, b), sort)
    }

    /// Uninterpreted constant.
    pub fn mk_var(&mut self, name: &str, sort: SortId) -> TermId {
        let spur = self.names.get_or_intern(name);
        self.intern(TermKind::Var(spur), sort)
    }

    /// Character constant.
    pub fn mk_char(&mut self, c: char) -> TermId {
        let sort = self.sorts.char_sort;
        self.intern(TermKind::CharConst(c), sort)
    }

    /// String literal.
    pub fn mk_string_lit(&mut self, s: &str) -> TermId {
        let sort = self.sorts.string_sort();
        self.intern(TermKind::StringLit(s.to_string()), sort)
    }

    /// Empty sequence of the given sequence sort.
    pub fn mk_seq_empty(&mut self, sort: SortId) -> TermId {
        assert!(self.sorts.is_seq(sort), "mk_seq_empty on non-sequence sort");
        self.intern(TermKind::SeqEmpty, sort)
    }

    /// Singleton sequence of an element.
    pub fn mk_seq_unit(&mut self, elem: TermId) -> TermId {
        let elem_sort = self.sort(elem);
        let sort = self.sorts.seq(elem_sort);
        self.intern(TermKind::SeqUnit(elem), sort)
    }

    /// Concatenation of two sequences of the same sort.
    pub fn mk_str_concat(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sort(a);
        assert_eq!(sort, self.sort(b), "mk_str_concat across sorts");
        self.intern(TermKind::StrConcat(a, b), sort)
    }

    /// Sequence length.
    pub fn mk_str_len(&mut self, a: TermId) -> TermId {
        let sort = self.sorts.int_sort;
        self.intern(TermKind::StrLen(a), sort)
    }

    /// `a` is a prefix of `b`.
    pub fn mk_str_prefixof(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::StrPrefixOf(a, b), sort)
    }

    /// `a` is a suffix of `b`.
    pub fn mk_str_suffixof(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::StrSuffixOf(a, b), sort)
    }

    /// `a` occurs in `b`.
    pub fn mk_str_contains(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::StrContains(a, b), sort)
    }

    /// Position of the first occurrence of `s` in `t`, or -1.
    pub fn mk_str_indexof(&mut self, s: TermId, t: TermId) -> TermId {
        let sort = self.sorts.int_sort;
        self.intern(TermKind::StrIndexOf(s, t), sort)
    }

    /// `a` with the first occurrence of `s` replaced by `t`.
    pub fn mk_str_replace(&mut self, a: TermId, s: TermId, t: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::StrReplace(a, s, t), sort)
    }

    /// Extraction of `l` elements of `s` starting at `i`.
    pub fn mk_str_substr(&mut self, s: TermId, i: TermId, l: TermId) -> TermId {
        let sort = self.sort(s);
        self.intern(TermKind::StrSubstr(s, i, l), sort)
    }

    /// Regular-language membership.
    pub fn mk_str_in_re(&mut self, s: TermId, re: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::StrInRe(s, re), sort)
    }

    /// The universal regular language over strings.
    pub fn mk_re_all(&mut self) -> TermId {
        let char_sort = self.sorts.char_sort;
        let sort = self.sorts.reglan(char_sort);
        self.intern(TermKind::ReAll, sort)
    }

    /// Skolem constant for `(tag, args)`, of the given sort.
    pub fn mk_skolem(&mut self, tag: SkolemTag, args: &[TermId], sort: SortId) -> TermId {
        self.intern(
            TermKind::Skolem {
                tag,
                args: SmallVec::from_slice(args),
            },
            sort,
        )
    }

    /// Name of a variable term.
    pub fn var_name(&self, id: TermId) -> Option<&str> {
        match self.kind(id) {
            TermKind::Var(spur) => Some(self.names.resolve(spur)),
            _ => None,
        }
    }

    /// Integer value of a constant term.
    pub fn int_value(&self, id: TermId) -> Option<&BigInt> {
        match self.kind(id) {
            TermKind::IntConst(n) => Some(n),
            _ => None,
        }
    }

    /// String value of a literal term.
    pub fn str_value(&self, id: TermId) -> Option<&str> {
        match self.kind(id) {
            TermKind::StringLit(s) => Some(s),
            _ => None,
        }
    }

    /// Concrete string denoted by a ground sequence term, if any.
    pub fn seq_as_string(&self, id: TermId) -> Option<String> {
        match self.kind(id) {
            TermKind::SeqEmpty => Some(String::new()),
            TermKind::StringLit(s) => Some(s.clone()),
            TermKind::SeqUnit(e) => match self.kind(*e) {
                TermKind::CharConst(c) => Some(c.to_string()),
                _ => None,
            },
            TermKind::StrConcat(a, b) => {
                let mut s = self.seq_as_string(*a)?;
                s.push_str(&self.seq_as_string(*b)?);
                Some(s)
            }
            _ => None,
        }
    }

    /// Flatten a concatenation tree into its atom list.
    pub fn concat_atoms(&self, id: TermId, out: &mut SmallVec<[TermId; 8]>) {
        match self.kind(id) {
            TermKind::StrConcat(a, b) => {
                self.concat_atoms(*a, out);
                self.concat_atoms(*b, out);
            }
            _ => out.push(id),
        }
    }

    /// Render a term for diagnostics.
    pub fn display(&self, id: TermId) -> String {
        match self.kind(id) {
            TermKind::True => "true".to_string(),
            TermKind::False => "false".to_string(),
            TermKind::Not(a) => format!("(not {})", self.display(*a)),
            TermKind::And(args) => self.display_nary("and", args),
            TermKind::Or(args) => self.display_nary("or", args),
            TermKind::Eq(a, b) => format!("(= {} {})", self.display(*a), self.display(*b)),
            TermKind::IntConst(n) => n.to_string(),
            TermKind::Add(args) => self.display_nary("+", args),
            TermKind::Sub(a, b) => format!("(- {} {})", self.display(*a), self.display(*b)),
            TermKind::Ge(a, b) => format!("(>= {} {})", self.display(*a), self.display(*b)),
            TermKind::Le(a, b) => format!("(<= {} {})", self.display(*a), self.display(*b)),
            TermKind::CharConst(c) => format!("'{c}'"),
            TermKind::StringLit(s) => format!("{s:?}"),
            TermKind::SeqEmpty => "\"\"".to_string(),
            TermKind::SeqUnit(e) => format!("(seq.unit {})", self.display(*e)),
            TermKind::StrConcat(a, b) => {
                format!("(str.++ {} {})", self.display(*a), self.display(*b))
            }
            TermKind::StrLen(a) => format!("(str.len {})", self.display(*a)),
            TermKind::StrPrefixOf(a, b) => {
                format!("(str.prefixof {} {})", self.display(*a), self.display(*b))
            }
            TermKind::StrSuffixOf(a, b) => {
                format!("(str.suffixof {} {})", self.display(*a), self.display(*b))
            }
            TermKind::StrContains(a, b) => {
                format!("(str.occurs-in {} {})", self.display(*a), self.display(*b))
            }
            TermKind::StrIndexOf(s, t) => {
                format!("(str.indexof {} {})", self.display(*s), self.display(*t))
            }
            TermKind::StrReplace(a, s, t) => format!(
                "(str.replace {} {} {})",
                self.display(*a),
                self.display(*s),
                self.display(*t)
            ),
            TermKind::StrSubstr(s, i, l) => format!(
                "(str.substr {} {} {})",
                self.display(*s),
                self.display(*i),
                self.display(*l)
            ),
            TermKind::StrInRe(s, re) => {
                format!("(str.in_re {} {})", self.display(*s), self.display(*re))
            }
            TermKind::ReAll => "re.all".to_string(),
            TermKind::Var(spur) => self.names.resolve(spur).to_string(),
            TermKind::Skolem { tag, args } => {
                let mut out = format!("(sk!{tag}");
                for &a in args {
                    out.push(' ');
                    out.push_str(&self.display(a));
                }
                out.push(')');
                out
            }
        }
    }

    fn display_nary(&self, op: &str, args: &[TermId]) -> String {
        let mut out = format!("({op}");
        for &a in args {
            out.push(' ');
            out.push_str(&self.display(a));
        }
        out.push(')');
        out
    }
}

impl Default for TermManager {
    fn default() -> Self {
        Self::new()
    }
}
