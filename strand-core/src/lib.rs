//! Strand Core - AST, Sorts, and Rewriting for the Strand Sequence Solver
//!
//! This crate provides the term substrate the sequence theory solver works
//! over:
//! - Hash-consed terms with stable [`TermId`](ast::TermId) references
//! - A sort interner with the sequence, character, integer, and Boolean
//!   sorts
//! - The term rewriter ([`TermManager::simplify`](ast::TermManager)) used
//!   for canonicalization
//! - SAT-style literals for the theory/host interface
//!
//! # Examples
//!
//! ## Creating terms
//!
//! ```
//! use strand_core::ast::TermManager;
//!
//! let mut tm = TermManager::new();
//! let x = tm.mk_var("x", tm.sorts.string_sort());
//! let lit = tm.mk_string_lit("ab");
//! let cat = tm.mk_str_concat(x, lit);
//! let len = tm.mk_str_len(cat);
//! assert_eq!(tm.sort(len), tm.sorts.int_sort);
//! ```
//!
//! ## Rewriting
//!
//! ```
//! use strand_core::ast::TermManager;
//!
//! let mut tm = TermManager::new();
//! let a = tm.mk_string_lit("ab");
//! let b = tm.mk_string_lit("c");
//! let cat = tm.mk_str_concat(a, b);
//! let folded = tm.simplify(cat);
//! assert_eq!(tm.str_value(folded), Some("abc"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
pub mod error;
pub mod literal;
mod simplify;

pub use ast::{SkolemTag, SortId, SortKind, Term, TermId, TermKind, TermManager};
pub use error::{Result, StrandError};
pub use literal::{Lit, Var};
