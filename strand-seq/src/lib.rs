//! Strand Sequence Theory
//!
//! A theory solver for finite sequences (strings) that plugs into a
//! DPLL(T) host. It decides equalities and disequalities over
//! concatenations, literals, and variables, and lazily reduces the
//! compound operations to that core:
//!
//! - **Equation solving**: canonization against a backtrackable solution
//!   map, structural peeling of concatenations, variable elimination with
//!   an occurs-check
//! - **Branching**: alignment guesses between the leftmost segments of an
//!   unsolved equation, proposed to the host as case-split equalities
//! - **Axioms**: reduction lemmas for `length`, `prefix`, `suffix`,
//!   `contains`, `indexof`, `replace`, and `extract`, with
//!   tightest-prefix constraints enforcing leftmost matches
//! - **Explanations**: every derived fact carries the set of host
//!   equalities it was computed under, reported back on conflicts
//!
//! Regular-expression membership is outside the fragment; encountering it
//! makes the final check answer "give up" instead of "done".
//!
//! ```smt2
//! (declare-const x String)
//! (assert (= (str.++ x "a") "ba"))
//! (check-sat)   ; sat, x = "b"
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod axioms;
pub mod deps;
pub mod equations;
pub mod exclusion;
pub mod host;
pub mod model;
mod simplify;
pub mod solution;
pub mod solver;
pub mod trail;

pub use deps::{Dep, DepId, DepManager};
pub use equations::Equations;
pub use exclusion::ExclusionTable;
pub use host::{ENodeId, EPair, Host, Justification, JustificationKind, Statistics};
pub use model::{ModelGenerator, SeqFactory};
pub use solution::SolutionMap;
pub use solver::{FinalCheckStatus, SeqSolver, SeqStats};
