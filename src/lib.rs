//! Pool, query and goal solver for RPM-style dependency resolution.
//!
//! The crate is built around three layers, leaf-first:
//!
//! - [`pool::Pool`] is the interned object store: strings, [`reldep::Reldep`]s,
//!   [`solvable::Solvable`]s and [`solvable::Repository`] objects, plus the
//!   whatprovides index that drives resolution.
//! - [`query::PackageQuery`] (and its advisory analogue, [`advisory::AdvisoryQuery`])
//!   is a composable boolean filter over the pool that always yields a
//!   [`solvmap::SolvableSet`].
//! - [`goal::Goal`] turns user-supplied intents (install, remove, upgrade, ...) into a
//!   job stream for the CDCL SAT solver in [`solver`], then maps the solver's
//!   decisions back into a [`transaction::Transaction`] or, on failure, a
//!   [`problem::Problem`] report.
//!
//! The solver itself is a CDCL (conflict-driven clause learning) SAT solver in the
//! style of MiniSat, with a clause model chosen to mirror libsolv's rule set
//! (`Requires`, `Conflicts`, `Obsoletes`, `ForbidMultipleInstances`, `Lock`). See
//! [`solver`] for the clause construction and [`solver::clause`] for the literal
//! representation.

#![warn(missing_docs)]

pub mod advisory;
pub mod config;
pub mod error;
pub mod goal;
mod internal;
pub mod job;
pub mod pool;
pub mod problem;
pub mod query;
pub mod reldep;
pub mod solvable;
pub mod solver;
pub mod solvmap;
pub mod transaction;

pub use advisory::AdvisoryQuery;
pub use config::{GoalConfig, MultilibPolicy};
pub use error::{GoalError, PoolError};
pub use goal::{Goal, GoalSettings, Reason, ResolveLogEntry};
pub use internal::id::{ReldepId, RepoId, SolvableId, StringId};
pub use job::{Job, JobAction};
pub use pool::Pool;
pub use query::{CmpType, PackageQuery};
pub use reldep::{CmpFlag, Reldep, RichOp};
pub use solvable::{PackageData, RepoScope, Repository};
pub use solver::Solver;
pub use solvmap::SolvableSet;
pub use transaction::{Transaction, TransactionStep, TransactionStepKind};
