//! The atomic package record and the repository that owns it.

use crate::internal::id::{ReldepId, RepoId, StringId};

/// Whether a [`Repository`] holds the system's currently installed packages or
/// packages available to be installed from elsewhere. Exactly zero or one repository
/// in a [`crate::pool::Pool`] may carry the `Installed` scope.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RepoScope {
    Available,
    Installed,
}

/// A named container of solvables with a priority (higher wins ties between
/// available repositories) and a disabled flag (disabled repositories are invisible
/// to queries and the solver even though their solvables remain interned).
#[derive(Debug, Clone)]
pub struct Repository {
    pub(crate) id: RepoId,
    pub name: String,
    pub priority: i32,
    pub disabled: bool,
    pub scope: RepoScope,
}

impl Repository {
    pub(crate) fn new(id: RepoId, name: impl Into<String>, scope: RepoScope) -> Self {
        Self {
            id,
            name: name.into(),
            priority: 0,
            disabled: false,
            scope,
        }
    }

    pub fn id(&self) -> RepoId {
        self.id
    }

    pub fn is_installed(&self) -> bool {
        self.scope == RepoScope::Installed
    }
}

/// All the typed edges a package solvable carries to other reldeps. Kept as a
/// separate struct (rather than inlined in [`PackageData`]) so solver code that only
/// needs the edges can borrow just this piece.
#[derive(Debug, Clone, Default)]
pub struct DependencyEdges {
    pub provides: Vec<ReldepId>,
    pub requires: Vec<ReldepId>,
    pub conflicts: Vec<ReldepId>,
    pub obsoletes: Vec<ReldepId>,
    pub recommends: Vec<ReldepId>,
    pub suggests: Vec<ReldepId>,
    pub supplements: Vec<ReldepId>,
    pub enhances: Vec<ReldepId>,
}

/// The data carried by a package solvable (as opposed to the synthetic root
/// solvable, see [`SolvableKind::Root`]).
#[derive(Debug, Clone)]
pub struct PackageData {
    pub repo: RepoId,
    pub name: StringId,
    pub evr: StringId,
    pub arch: StringId,
    pub vendor: StringId,
    pub edges: DependencyEdges,
    pub files: Vec<StringId>,
    pub sourcerpm: Option<StringId>,
    pub location: Option<StringId>,
    pub summary: Option<StringId>,
    pub description: Option<StringId>,
    pub url: Option<StringId>,
    pub buildtime: u64,
}

/// Distinguishes the synthetic root solvable (id 0, used to seed the SAT search with
/// the user's job install-requirements) from a real package.
#[derive(Debug, Clone)]
pub(crate) enum SolvableKind {
    Root { install_requires: Vec<ReldepId> },
    Package(PackageData),
}

/// A single entry in a [`crate::pool::Pool`]'s solvable arena.
#[derive(Debug, Clone)]
pub struct Solvable {
    pub(crate) kind: SolvableKind,
}

impl Solvable {
    pub(crate) fn new_root() -> Self {
        Self {
            kind: SolvableKind::Root {
                install_requires: Vec::new(),
            },
        }
    }

    pub(crate) fn new_package(data: PackageData) -> Self {
        Self {
            kind: SolvableKind::Package(data),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self.kind, SolvableKind::Root { .. })
    }

    /// Panics if called on the root solvable; every public accessor routes through
    /// here after the caller has already excluded the root id.
    pub fn package(&self) -> &PackageData {
        match &self.kind {
            SolvableKind::Package(data) => data,
            SolvableKind::Root { .. } => panic!("root solvable has no package data"),
        }
    }

    pub(crate) fn package_mut(&mut self) -> &mut PackageData {
        match &mut self.kind {
            SolvableKind::Package(data) => data,
            SolvableKind::Root { .. } => panic!("root solvable has no package data"),
        }
    }

    pub(crate) fn root_requires_mut(&mut self) -> &mut Vec<ReldepId> {
        match &mut self.kind {
            SolvableKind::Root { install_requires } => install_requires,
            SolvableKind::Package(_) => panic!("not the root solvable"),
        }
    }
}
