//! The job stream the [`crate::goal::Goal`] hands to the solver.
//!
//! libsolv encodes a job as a `(flag_word, selector_id)` pair pushed onto an
//! [`crate::internal::idqueue::IdQueue`], with the action, selector kind and modifier
//! bits all packed into one word. This crate renders the same idea as a plain Rust
//! enum instead of a bitfield: there is no wire format to economize for, and matching
//! on `JobAction` is both safer and easier to read than unpacking flag bits. The
//! solver and [`crate::goal::private`] driver consume `Job` values directly; nothing
//! downstream of the goal ever re-encodes a job into a flag word.

use crate::internal::id::SolvableId;

/// What a [`Job`] asks the solver to do with the solvables its selector matches.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum JobAction {
    /// Install (or keep installed) every matched solvable.
    Install,
    /// Erase every matched solvable.
    Erase,
    /// Update matched installed solvables to the best available candidate.
    Update,
    /// Synchronize matched solvables to exactly the best available candidate,
    /// erasing any installed one the available set doesn't also contain.
    DistUpgrade,
    /// Permit more than one candidate of this selector's name to be installed at
    /// once (set on every provider of an installonly reldep).
    Multiversion,
    /// Lock the matched solvable: no other same-name variant may ever be chosen.
    Lock,
    /// Allow the matched installed solvable to be uninstalled to satisfy the goal,
    /// even though it wasn't otherwise asked to be removed.
    AllowUninstall,
    /// Mark the matched solvable as user-installed (as opposed to pulled in purely
    /// as a dependency), for `Reason` attribution and `filter_unneeded`.
    UserInstalled,
    /// Exclude the matched solvable from other packages' weak dependencies.
    ExcludeFromWeak,
}

/// A job modifier orthogonal to the action/selector pair.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Default)]
pub struct JobFlags {
    /// A failure to satisfy this job is a warning, not a hard solver error.
    pub weak: bool,
    /// Prefer the highest available evr (maps to the solver's `FORCEBEST`).
    pub force_best: bool,
    /// When erasing, also drop now-unneeded dependencies (`clean_requirements_on_remove`).
    pub clean_deps: bool,
}

/// What a [`Job`]'s selector matches against.
#[derive(Debug, Clone)]
pub enum Selector {
    /// A single, already-resolved solvable.
    Solvable(SolvableId),
    /// Every solvable providing a reldep (a name, optionally versioned).
    Provides(crate::internal::id::ReldepId),
    /// An explicit, caller-built set of solvables (e.g. a resolved `PackageQuery`).
    Set(crate::solvmap::SolvableSet),
}

/// One entry in the job stream handed to [`crate::solver::Solver::solve`].
#[derive(Debug, Clone)]
pub struct Job {
    /// What to do with the matched solvables.
    pub action: JobAction,
    /// Which solvables are matched.
    pub selector: Selector,
    /// Modifiers orthogonal to the action.
    pub flags: JobFlags,
}

impl Job {
    /// Builds a job with default (non-weak, non-forcebest, non-cleandeps) flags.
    pub fn new(action: JobAction, selector: Selector) -> Self {
        Self {
            action,
            selector,
            flags: JobFlags::default(),
        }
    }

    /// Builder-style setter for [`JobFlags::weak`].
    pub fn weak(mut self, weak: bool) -> Self {
        self.flags.weak = weak;
        self
    }

    /// Builder-style setter for [`JobFlags::force_best`].
    pub fn force_best(mut self, force_best: bool) -> Self {
        self.flags.force_best = force_best;
        self
    }

    /// Builder-style setter for [`JobFlags::clean_deps`].
    pub fn clean_deps(mut self, clean_deps: bool) -> Self {
        self.flags.clean_deps = clean_deps;
        self
    }
}
