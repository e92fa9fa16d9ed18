//! # nyx-bdd: a complement-edged ROBDD engine
//!
//! **`nyx-bdd`** represents Boolean functions as Reduced Ordered Binary
//! Decision Diagrams with complement edges: shared, canonical DAGs in
//! which equality of functions is equality of node ids and negation is a
//! single bit flip.
//!
//! ## What is a BDD?
//!
//! A Binary Decision Diagram encodes a Boolean function as a DAG of
//! Shannon decompositions under a fixed variable order. The
//! representation is **canonical** --- for a given order, every function
//! has exactly one diagram --- which turns equivalence, satisfiability
//! and tautology checks into pointer comparisons.
//!
//! ## Key features
//!
//! - **Manager-centric architecture**: all state lives in a
//!   [`BddMgr`][bdd::BddMgr]; callers hold refcounted
//!   [`Bdd`][bdd::Bdd] handles with the usual algebraic operators.
//! - **Hash consing**: one unique table per level guarantees that any
//!   `(index, hi, lo)` triple exists at most once.
//! - **Complement edges**: negation costs nothing and halves the node
//!   count; the `hi` edge of every stored node is kept positive to keep
//!   the form canonical.
//! - **Memoization**: per-operator direct-mapped computed caches for
//!   AND, XOR, restrict, ITE and the relational product.
//! - **Garbage collection**: a mark-sweep collector driven by external
//!   reference counts reclaims the intermediates operators leave behind.
//! - **Dynamic reordering**: Rudell sifting shrinks the diagram by
//!   in-place adjacent level exchanges, preserving every live handle.
//!
//! ## Basic usage
//!
//! ```rust
//! use nyx_bdd::bdd::BddMgr;
//!
//! let mgr = BddMgr::new();
//!
//! // Variables are positive integers.
//! let x1 = mgr.lit(1);
//! let x2 = mgr.lit(2);
//!
//! // f = x1 AND (NOT x2)
//! let f = &x1 * &!&x2;
//!
//! assert!(!f.is_zero()); // satisfiable
//! assert!(!f.is_one());  // not a tautology
//!
//! // A satisfying cube, and the check that it lands inside f.
//! let cube = f.one_cube();
//! assert!(cube <= f);
//! ```
//!
//! ## Core components
//!
//! - **[`bdd`]**: the manager, the handle type and [`BddFnSet`][bdd::BddFnSet].
//! - **[`interval`]**: incompletely specified functions as `[min, max]`
//!   pairs.
//! - **[`dnf`]**: prime-irredundant cover extraction (Minato-Morreale).
//! - **[`decomp`]**: conjunctive and XOR decomposition.

pub mod arena;
pub mod bdd;
pub mod cache;
pub mod decomp;
pub mod dnf;
pub mod interval;
pub mod node;
pub mod reference;
pub mod subtable;
pub mod types;
pub mod utils;

mod calc;
mod cubes;
mod engine;
mod gc;
mod reorder;

pub use bdd::{Bdd, BddFnSet, BddMgr};
pub use engine::BddConfig;
pub use types::{Op, Var};
