//! Error taxonomy for the pool, query and goal layers.
//!
//! Programming errors (bad ids, unsupported comparators, cross-pool mixing, querying
//! an unresolved goal) are represented as distinct enum variants rather than a single
//! opaque string, so callers can match on the specific mistake during development;
//! they are expected to be fatal and are not meant to be recovered from at runtime.

use crate::problem::Problem;
use thiserror::Error;

/// Errors raised directly by pool and reldep operations.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("invalid id: {0}")]
    BadId(String),

    #[error("malformed reldep expression: {0}")]
    BadReldep(String),

    #[error("comparator not supported for this filter: {0:?}")]
    UnsupportedCmp(String),

    #[error("package sets originate from different pools")]
    DifferentBase,

    #[error("failed to write solver debug data: {0}")]
    DebugWriteFailed(String),
}

/// Errors raised by [`crate::goal::Goal`] operations.
#[derive(Debug, Error)]
pub enum GoalError {
    #[error("goal has not been resolved yet")]
    NotResolved,

    #[error("solver produced no transaction and reported no problems")]
    NoSolution,

    #[error("goal could not be resolved: {problems} problem(s) reported")]
    SolverError { problems: Problem },
}
