//! Types describing why a goal could not be resolved.
//!
//! The solver never leaks its internal clause/rule ids to callers; [`RuleKind`] is the
//! fixed, closed vocabulary every internal rule gets translated into before it reaches
//! a [`Problem`].

use crate::internal::id::{ReldepId, SolvableId};
use std::fmt;

/// The fixed enumeration of reasons the solver can cite for a decision it could not
/// make. Mirrors libsolv's `SOLVER_RULE_*` constants, flattened into the subset this
/// crate's clause model can actually produce.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum RuleKind {
    DistUpgrade,
    InfArch,
    Update,
    Job,
    JobUnsupported,
    JobNothingProvidesDep,
    JobUnknownPackage,
    JobProvidedBySystem,
    Pkg,
    Best1,
    Best2,
    PkgNotInstallable1,
    PkgNotInstallable2,
    PkgNotInstallable3,
    PkgNothingProvidesDep,
    PkgSameName,
    PkgConflicts,
    PkgObsoletes,
    PkgInstalledObsoletes,
    PkgImplicitObsoletes,
    PkgRequires,
    PkgSelfConflict,
    YumObsoletes,
    Unknown,
}

/// One rule-info tuple: a reason, the solvable it concerns, an optional second
/// solvable it relates to, an optional reldep it concerns, and free text for rules
/// the fixed vocabulary can't fully capture (`RuleKind::Unknown`).
#[derive(Debug, Clone)]
pub struct RuleInfo {
    pub kind: RuleKind,
    pub source: Option<SolvableId>,
    pub related: Option<SolvableId>,
    pub dep: Option<ReldepId>,
    pub detail: Option<String>,
}

impl RuleInfo {
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            source: None,
            related: None,
            dep: None,
            detail: None,
        }
    }

    pub fn with_source(mut self, id: SolvableId) -> Self {
        self.source = Some(id);
        self
    }

    pub fn with_related(mut self, id: SolvableId) -> Self {
        self.related = Some(id);
        self
    }

    pub fn with_dep(mut self, id: ReldepId) -> Self {
        self.dep = Some(id);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// A single alternative explanation for why the goal failed: a flat, deduplicated list
/// of rule-info tuples. A goal can report several alternative `Problem`s (e.g. "either
/// drop the request for A, or drop the request for B").
#[derive(Debug, Clone, Default)]
pub struct Problem {
    pub rules: Vec<RuleInfo>,
}

impl Problem {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn push(&mut self, rule: RuleInfo) {
        self.rules.push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} rule(s)", self.rules.len())
    }
}

/// A human-readable rendering of a [`Problem`], resolving ids through the supplied
/// pool. Produced for callers that want to print a report rather than walk the
/// structured rule list themselves.
pub fn describe(problem: &Problem, pool: &crate::pool::Pool) -> String {
    let mut lines = Vec::new();
    for rule in &problem.rules {
        let source = rule.source.map(|id| pool.full_nevra(id));
        let related = rule.related.map(|id| pool.full_nevra(id));
        let line = match rule.kind {
            RuleKind::PkgConflicts => format!(
                "package {} conflicts with {}",
                source.unwrap_or_default(),
                related.unwrap_or_default()
            ),
            RuleKind::PkgRequires => format!(
                "nothing provides a dependency of {}",
                source.unwrap_or_default()
            ),
            RuleKind::PkgNothingProvidesDep | RuleKind::JobNothingProvidesDep => {
                "nothing provides the requested dependency".to_string()
            }
            RuleKind::JobUnknownPackage => "no package matches the request".to_string(),
            RuleKind::PkgSameName => format!(
                "package {} conflicts with {} because both have the same name",
                source.unwrap_or_default(),
                related.unwrap_or_default()
            ),
            RuleKind::PkgObsoletes | RuleKind::PkgInstalledObsoletes | RuleKind::PkgImplicitObsoletes => {
                format!(
                    "package {} is obsoleted by {}",
                    related.unwrap_or_default(),
                    source.unwrap_or_default()
                )
            }
            RuleKind::Unknown => rule.detail.clone().unwrap_or_else(|| "unknown problem".to_string()),
            _ => rule
                .detail
                .clone()
                .unwrap_or_else(|| format!("{:?}", rule.kind)),
        };
        lines.push(line);
    }
    lines.join("\n")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::internal::arena::ArenaId;

    #[test]
    fn problem_starts_empty() {
        let p = Problem::new();
        assert!(p.is_empty());
    }

    #[test]
    fn rule_info_builder() {
        let rule = RuleInfo::new(RuleKind::PkgConflicts)
            .with_source(SolvableId::from_usize(1))
            .with_related(SolvableId::from_usize(2));
        assert_eq!(rule.kind, RuleKind::PkgConflicts);
        assert!(rule.source.is_some());
        assert!(rule.related.is_some());
    }
}
