//! The composable boolean query engine: [`PackageQuery`] filters a
//! [`crate::solvmap::SolvableSet`] along every package attribute, always yielding a
//! reproducible subset of the pool.

mod leaves;

use crate::internal::id::{ReldepId, SolvableId, StringId};
use crate::pool::nevra::{Nevra, NevraForm, DEFAULT_NEVRA_FORMS};
use crate::pool::Pool;
use crate::solvable::DependencyEdges;
use crate::solvmap::SolvableSet;
use std::cmp::Ordering;

/// The comparison semantics a text- or evr-valued filter applies.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CmpOp {
    Eq,
    Neq,
    Gt,
    Lt,
    Gte,
    Lte,
    IEq,
    IGlob,
    Glob,
    Contains,
    IContains,
    IExact,
    Regex,
    IRegex,
}

/// A comparator together with the composable `NOT` bit (SPEC_FULL.md §4.2). Filters
/// XOR `not` off, run their positive match into a temporary set, then either subtract
/// it from (negated) or intersect it with (non-negated) the query's current state.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct CmpType {
    pub op: CmpOp,
    pub not: bool,
}

macro_rules! cmp_const {
    ($name:ident, $op:expr) => {
        pub const $name: CmpType = CmpType { op: $op, not: false };
    };
}

impl CmpType {
    cmp_const!(EQ, CmpOp::Eq);
    cmp_const!(NEQ, CmpOp::Neq);
    cmp_const!(GT, CmpOp::Gt);
    cmp_const!(LT, CmpOp::Lt);
    cmp_const!(GTE, CmpOp::Gte);
    cmp_const!(LTE, CmpOp::Lte);
    cmp_const!(IEQ, CmpOp::IEq);
    cmp_const!(IGLOB, CmpOp::IGlob);
    cmp_const!(GLOB, CmpOp::Glob);
    cmp_const!(CONTAINS, CmpOp::Contains);
    cmp_const!(ICONTAINS, CmpOp::IContains);
    cmp_const!(IEXACT, CmpOp::IExact);
    cmp_const!(REGEX, CmpOp::Regex);
    cmp_const!(IREGEX, CmpOp::IRegex);

    /// Returns the same comparator with the `NOT` bit flipped.
    pub fn negate(self) -> CmpType {
        CmpType { op: self.op, not: !self.not }
    }
}

fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Evaluates a single (non-evr) text comparator. Never errors: an unparsable regex
/// simply matches nothing, matching the "closed tagged set" dispatch design note.
pub(crate) fn text_matches(op: CmpOp, haystack: &str, pattern: &str) -> bool {
    match op {
        CmpOp::Eq => haystack == pattern,
        CmpOp::Neq => haystack != pattern,
        CmpOp::IEq | CmpOp::IExact => haystack.eq_ignore_ascii_case(pattern),
        CmpOp::Gt => haystack > pattern,
        CmpOp::Lt => haystack < pattern,
        CmpOp::Gte => haystack >= pattern,
        CmpOp::Lte => haystack <= pattern,
        CmpOp::Contains => haystack.contains(pattern),
        CmpOp::IContains => haystack.to_lowercase().contains(&pattern.to_lowercase()),
        CmpOp::Glob => {
            if !has_glob_meta(pattern) {
                haystack == pattern
            } else {
                glob::Pattern::new(pattern).map(|p| p.matches(haystack)).unwrap_or(false)
            }
        }
        CmpOp::IGlob => {
            if !has_glob_meta(pattern) {
                haystack.eq_ignore_ascii_case(pattern)
            } else {
                glob::Pattern::new(&pattern.to_lowercase())
                    .map(|p| p.matches(&haystack.to_lowercase()))
                    .unwrap_or(false)
            }
        }
        CmpOp::Regex => regex::Regex::new(pattern).map(|re| re.is_match(haystack)).unwrap_or(false),
        CmpOp::IRegex => regex::Regex::new(&format!("(?i){pattern}"))
            .map(|re| re.is_match(haystack))
            .unwrap_or(false),
    }
}

/// Evaluates a relational (ordering-based) comparator, as used by `filter_evr`. Text
/// comparators (`GLOB`, `CONTAINS`, `REGEX`, ...) aren't meaningful against a numeric
/// ordering and are rejected with [`crate::error::PoolError::UnsupportedCmp`].
fn ordering_matches(op: CmpOp, ordering: Ordering) -> Result<bool, crate::error::PoolError> {
    Ok(match op {
        CmpOp::Eq | CmpOp::IEq | CmpOp::IExact => ordering == Ordering::Equal,
        CmpOp::Neq => ordering != Ordering::Equal,
        CmpOp::Gt => ordering == Ordering::Greater,
        CmpOp::Lt => ordering == Ordering::Less,
        CmpOp::Gte => ordering != Ordering::Less,
        CmpOp::Lte => ordering != Ordering::Greater,
        other => {
            return Err(crate::error::PoolError::UnsupportedCmp(format!("{other:?} on an evr comparison")));
        }
    })
}

/// Which excludes a freshly constructed [`PackageQuery`] respects.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExcludeMode {
    /// Start from the pool's considered mask (regular excludes respected).
    ApplyExcludes,
    /// Start from every solvable, ignoring all excludes.
    IgnoreExcludes,
    /// Like `IgnoreExcludes`, but still honors regular (non-modular) excludes.
    IgnoreRegularExcludes,
    /// Like `IgnoreExcludes`, but still honors modular excludes.
    IgnoreModularExcludes,
}

/// Caller settings for [`PackageQuery::resolve_pkg_spec`] (SPEC_FULL.md §4.2.2).
#[derive(Debug, Clone)]
pub struct SpecSettings {
    pub with_nevra: bool,
    pub with_provides: bool,
    pub with_filenames: bool,
    pub with_binaries: bool,
    pub expand_globs: bool,
    pub ignore_case: bool,
    pub nevra_forms: Vec<NevraForm>,
}

impl Default for SpecSettings {
    fn default() -> Self {
        Self {
            with_nevra: true,
            with_provides: true,
            with_filenames: true,
            with_binaries: true,
            expand_globs: true,
            ignore_case: false,
            nevra_forms: DEFAULT_NEVRA_FORMS.to_vec(),
        }
    }
}

/// A package set plus the chain of filter operations that produced it.
pub struct PackageQuery<'p> {
    pool: &'p Pool,
    set: SolvableSet,
}

impl<'p> Clone for PackageQuery<'p> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool,
            set: self.set.clone(),
        }
    }
}

impl<'p> PackageQuery<'p> {
    /// Constructs a query starting from the pool's considered mask, or every
    /// solvable if no considered mask is active.
    pub fn new(pool: &'p Pool) -> Self {
        Self::with_mode(pool, ExcludeMode::ApplyExcludes)
    }

    /// Constructs a query using the given [`ExcludeMode`].
    pub fn with_mode(pool: &'p Pool, mode: ExcludeMode) -> Self {
        let set = match mode {
            ExcludeMode::ApplyExcludes => pool
                .considered()
                .cloned()
                .unwrap_or_else(|| SolvableSet::full(pool.nsolvables())),
            ExcludeMode::IgnoreExcludes | ExcludeMode::IgnoreRegularExcludes | ExcludeMode::IgnoreModularExcludes => {
                SolvableSet::full(pool.nsolvables())
            }
        };
        let mut set = set;
        set.grow_to(pool.nsolvables());
        // id 0 is the synthetic root solvable; it is never a query result.
        set.remove(crate::internal::id::SolvableId::root());
        Self { pool, set }
    }

    /// An explicitly empty query.
    pub fn empty(pool: &'p Pool) -> Self {
        Self {
            pool,
            set: SolvableSet::empty(pool.nsolvables()),
        }
    }

    /// Builds a query directly from a pre-computed set (e.g. one returned by another
    /// query, or the union of several).
    pub fn from_set(pool: &'p Pool, set: SolvableSet) -> Self {
        Self { pool, set }
    }

    /// The pool this query is drawn from.
    pub fn pool(&self) -> &'p Pool {
        self.pool
    }

    /// The current matched set, as a plain bitmap.
    pub fn set(&self) -> &SolvableSet {
        &self.set
    }

    /// Whether `id` is currently matched.
    pub fn contains(&self, id: SolvableId) -> bool {
        self.set.contains(id)
    }

    /// Number of currently matched solvables.
    pub fn len(&self) -> usize {
        self.set.size()
    }

    /// Whether no solvables are currently matched.
    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Iterates over currently matched ids in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = SolvableId> + '_ {
        self.set.iter()
    }

    /// Sorted by (name, evr, arch) ascending, then by id to break ties.
    pub fn to_sorted_vector(&self) -> Vec<SolvableId> {
        let mut v: Vec<SolvableId> = self.set.iter().collect();
        v.sort_by(|&a, &b| {
            let pa = self.pool.solvable(a).package();
            let pb = self.pool.solvable(b).package();
            self.pool
                .lookup_string(pa.name)
                .cmp(self.pool.lookup_string(pb.name))
                .then_with(|| self.pool.evrcmp(pa.evr, pb.evr))
                .then_with(|| self.pool.lookup_string(pa.arch).cmp(self.pool.lookup_string(pb.arch)))
                .then(a.cmp(&b))
        });
        v
    }

    /// In-place union with `other`. Panics (via [`SolvableSet`]) if the sets have
    /// incompatible sizes; callers combining queries from different pools should
    /// check `DifferentBase` themselves, as ids are meaningless across pools.
    pub fn union_with(&mut self, other: &PackageQuery<'p>) -> &mut Self {
        self.set.union_with(&other.set);
        self
    }

    /// In-place intersection with `other`.
    pub fn intersect_with(&mut self, other: &PackageQuery<'p>) -> &mut Self {
        self.set.intersect_with(&other.set);
        self
    }

    /// In-place difference: removes every id also present in `other`.
    pub fn difference_with(&mut self, other: &PackageQuery<'p>) -> &mut Self {
        self.set.difference_with(&other.set);
        self
    }

    fn apply(&mut self, cmp: CmpType, mut predicate: impl FnMut(&Pool, SolvableId) -> bool) {
        let mut matched = SolvableSet::empty(self.pool.nsolvables());
        for id in self.set.iter() {
            if predicate(self.pool, id) {
                matched.add(id);
            }
        }
        if cmp.not {
            self.set.difference_with(&matched);
        } else {
            self.set.intersect_with(&matched);
        }
    }

    fn apply_fallible(
        &mut self,
        cmp: CmpType,
        mut predicate: impl FnMut(&Pool, SolvableId) -> Result<bool, crate::error::PoolError>,
    ) -> Result<(), crate::error::PoolError> {
        let mut matched = SolvableSet::empty(self.pool.nsolvables());
        for id in self.set.iter() {
            if predicate(self.pool, id)? {
                matched.add(id);
            }
        }
        if cmp.not {
            self.set.difference_with(&matched);
        } else {
            self.set.intersect_with(&matched);
        }
        Ok(())
    }

    // ----- basic string filters --------------------------------------------

    /// Matches on the solvable's name.
    pub fn filter_name<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.apply(cmp, |pool, id| {
            let name = pool.lookup_string(pool.solvable(id).package().name);
            patterns.iter().any(|p| text_matches(cmp.op, name, p))
        });
        self
    }

    /// Matches on the solvable's arch.
    pub fn filter_arch<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.apply(cmp, |pool, id| {
            let arch = pool.lookup_string(pool.solvable(id).package().arch);
            patterns.iter().any(|p| text_matches(cmp.op, arch, p))
        });
        self
    }

    /// Matches on the solvable's vendor.
    pub fn filter_vendor<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.apply(cmp, |pool, id| {
            let vendor = pool.lookup_string(pool.solvable(id).package().vendor);
            patterns.iter().any(|p| text_matches(cmp.op, vendor, p))
        });
        self
    }

    /// Matches on the epoch component of the solvable's evr (empty string if unset).
    pub fn filter_epoch<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.apply(cmp, |pool, id| {
            let n = pool.nevra_of(id);
            let epoch = n.epoch.unwrap_or_default();
            patterns.iter().any(|p| text_matches(cmp.op, &epoch, p))
        });
        self
    }

    /// Matches on the version component of the solvable's evr.
    pub fn filter_version<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.apply(cmp, |pool, id| {
            let n = pool.nevra_of(id);
            let version = n.version.unwrap_or_default();
            patterns.iter().any(|p| text_matches(cmp.op, &version, p))
        });
        self
    }

    /// Matches on the release component of the solvable's evr.
    pub fn filter_release<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.apply(cmp, |pool, id| {
            let n = pool.nevra_of(id);
            let release = n.release.unwrap_or_default();
            patterns.iter().any(|p| text_matches(cmp.op, &release, p))
        });
        self
    }

    /// Numeric evr comparison via [`crate::pool::evr::evrcmp`]. A pattern that omits
    /// its release component (e.g. `"2.0"` rather than `"2.0-3"`) is compared with
    /// [`crate::pool::evr::evrcmp_without_release`] instead, so a caller asking for
    /// `version >= 2.0` isn't tripped up by a release suffix they never mentioned.
    /// Errors on a comparator that isn't a relational one (see [`ordering_matches`]).
    pub fn filter_evr<'a>(
        &mut self,
        patterns: impl IntoIterator<Item = &'a str>,
        cmp: CmpType,
    ) -> Result<&mut Self, crate::error::PoolError> {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.apply_fallible(cmp, |pool, id| {
            let evr = pool.lookup_string(pool.solvable(id).package().evr);
            for p in &patterns {
                let ordering = if crate::pool::evr::Evr::parse(p).release.is_some() {
                    crate::pool::evr::evrcmp(evr, p)
                } else {
                    crate::pool::evr::evrcmp_without_release(evr, p)
                };
                if ordering_matches(cmp.op, ordering)? {
                    return Ok(true);
                }
            }
            Ok(false)
        })?;
        Ok(self)
    }

    /// Matches a (possibly partial) [`Nevra`]; unset fields are wildcards.
    pub fn filter_nevra(&mut self, patterns: impl IntoIterator<Item = Nevra>, cmp: CmpType) -> &mut Self {
        let patterns: Vec<Nevra> = patterns.into_iter().collect();
        self.apply(cmp, |pool, id| {
            let candidate = pool.nevra_of(id);
            patterns.iter().any(|pattern| nevra_matches(cmp.op, &candidate, pattern))
        });
        self
    }

    /// Matches on the source rpm filename, if any.
    pub fn filter_sourcerpm<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.apply(cmp, |pool, id| match pool.solvable(id).package().sourcerpm {
            Some(sid) => patterns.iter().any(|p| text_matches(cmp.op, pool.lookup_string(sid), p)),
            None => false,
        });
        self
    }

    /// Matches on any path in the solvable's file list.
    pub fn filter_file<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.apply(cmp, |pool, id| {
            pool.solvable(id)
                .package()
                .files
                .iter()
                .any(|&fid| patterns.iter().any(|p| text_matches(cmp.op, pool.lookup_string(fid), p)))
        });
        self
    }

    /// Matches on the description text.
    pub fn filter_description<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.apply(cmp, |pool, id| match pool.solvable(id).package().description {
            Some(sid) => patterns.iter().any(|p| text_matches(cmp.op, pool.lookup_string(sid), p)),
            None => false,
        });
        self
    }

    /// Matches on the summary text.
    pub fn filter_summary<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.apply(cmp, |pool, id| match pool.solvable(id).package().summary {
            Some(sid) => patterns.iter().any(|p| text_matches(cmp.op, pool.lookup_string(sid), p)),
            None => false,
        });
        self
    }

    /// Matches on the upstream/project url.
    pub fn filter_url<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.apply(cmp, |pool, id| match pool.solvable(id).package().url {
            Some(sid) => patterns.iter().any(|p| text_matches(cmp.op, pool.lookup_string(sid), p)),
            None => false,
        });
        self
    }

    /// Exact match on the package's relative repository location (its URL path).
    pub fn filter_location<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.apply(cmp, |pool, id| match pool.solvable(id).package().location {
            Some(sid) => patterns.iter().any(|p| text_matches(cmp.op, pool.lookup_string(sid), p)),
            None => false,
        });
        self
    }

    /// Matches on the name of the owning repository.
    pub fn filter_repo_id<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.apply(cmp, |pool, id| {
            let repo = pool.repo(pool.solvable(id).package().repo);
            patterns.iter().any(|p| text_matches(cmp.op, &repo.name, p))
        });
        self
    }

    /// Alias for [`Self::filter_repo_id`] kept for naming symmetry with the spec's
    /// "from repo" job modifier.
    pub fn filter_from_repo_id<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        self.filter_repo_id(patterns, cmp)
    }

    // ----- reldep-edge filters ----------------------------------------------

    fn filter_edges<'a>(
        &mut self,
        patterns: impl IntoIterator<Item = &'a str>,
        cmp: CmpType,
        edges: impl Fn(&DependencyEdges) -> &[ReldepId],
    ) -> &mut Self {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.apply(cmp, |pool, id| {
            edges(&pool.solvable(id).package().edges).iter().any(|&rid| {
                let Ok(reldep) = pool.resolve_reldep(rid) else {
                    return false;
                };
                let Some(name_id) = reldep.name() else {
                    return false;
                };
                let name = pool.lookup_string(name_id);
                patterns.iter().any(|p| text_matches(cmp.op, name, p))
            })
        });
        self
    }

    pub fn filter_requires<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        self.filter_edges(patterns, cmp, |e| &e.requires)
    }

    pub fn filter_recommends<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        self.filter_edges(patterns, cmp, |e| &e.recommends)
    }

    pub fn filter_suggests<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        self.filter_edges(patterns, cmp, |e| &e.suggests)
    }

    pub fn filter_supplements<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        self.filter_edges(patterns, cmp, |e| &e.supplements)
    }

    pub fn filter_enhances<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        self.filter_edges(patterns, cmp, |e| &e.enhances)
    }

    pub fn filter_conflicts<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        self.filter_edges(patterns, cmp, |e| &e.conflicts)
    }

    pub fn filter_obsoletes<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        self.filter_edges(patterns, cmp, |e| &e.obsoletes)
    }

    /// Matches against the whatprovides set: a solvable matches if it is among the
    /// providers of any reldep whose name matches `patterns`. Requires the pool's
    /// whatprovides index to be clean (see [`crate::pool::Pool::make_provides_ready`]).
    pub fn filter_provides<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        self.filter_edges(patterns, cmp, |e| &e.provides)
    }

    // ----- installed/available partition ------------------------------------

    /// Keeps only solvables in the installed repository.
    pub fn filter_installed(&mut self) -> &mut Self {
        self.apply(CmpType::EQ, |pool, id| {
            pool.installed_repo().is_some_and(|r| pool.solvable(id).package().repo == r.id())
        });
        self
    }

    /// Keeps only solvables not in the installed repository.
    pub fn filter_available(&mut self) -> &mut Self {
        self.apply(CmpType::EQ, |pool, id| {
            !pool.installed_repo().is_some_and(|r| pool.solvable(id).package().repo == r.id())
        });
        self
    }

    // ----- upgrade / downgrade ----------------------------------------------

    /// Keeps candidates that would upgrade something installed (see SPEC_FULL §4.2.1).
    pub fn filter_upgrades(&mut self) -> &mut Self {
        self.apply(CmpType::EQ, |pool, id| pool.what_upgrades(id).is_some());
        self
    }

    /// Keeps candidates that would downgrade something installed.
    pub fn filter_downgrades(&mut self) -> &mut Self {
        self.apply(CmpType::EQ, |pool, id| pool.what_downgrades(id).is_some());
        self
    }

    /// Keeps installed ids for which an available candidate that upgrades them
    /// exists.
    pub fn filter_upgradable(&mut self) -> &mut Self {
        self.apply(CmpType::EQ, |pool, id| {
            let name = pool.solvable(id).package().name;
            pool.packages_named(name).iter().any(|&c| pool.what_upgrades(c) == Some(id))
        });
        self
    }

    /// Keeps installed ids for which an available candidate that downgrades them
    /// exists.
    pub fn filter_downgradable(&mut self) -> &mut Self {
        self.apply(CmpType::EQ, |pool, id| {
            let name = pool.solvable(id).package().name;
            pool.packages_named(name).iter().any(|&c| pool.what_downgrades(c) == Some(id))
        });
        self
    }

    // ----- latest/earliest evr ----------------------------------------------

    /// Within each (name, arch) group keep the first (`n > 0`) or drop the first
    /// (`n < 0`, i.e. keep all but the highest `|n|`) distinct evrs, ranked
    /// descending.
    pub fn filter_latest_evr(&mut self, n: i32) -> &mut Self {
        self.filter_rank_evr(n, false, true)
    }

    /// Symmetric to [`Self::filter_latest_evr`], ranked ascending.
    pub fn filter_earliest_evr(&mut self, n: i32) -> &mut Self {
        self.filter_rank_evr(n, false, false)
    }

    /// Like [`Self::filter_latest_evr`] but groups by name only, ignoring arch.
    pub fn filter_latest_evr_any_arch(&mut self, n: i32) -> &mut Self {
        self.filter_rank_evr(n, true, true)
    }

    /// Like [`Self::filter_earliest_evr`] but groups by name only, ignoring arch.
    pub fn filter_earliest_evr_any_arch(&mut self, n: i32) -> &mut Self {
        self.filter_rank_evr(n, true, false)
    }

    fn filter_rank_evr(&mut self, n: i32, any_arch: bool, descending: bool) -> &mut Self {
        use std::collections::HashMap;
        let pool = self.pool;
        let mut groups: HashMap<(StringId, Option<StringId>), Vec<SolvableId>> = HashMap::new();
        for id in self.set.iter() {
            let pkg = pool.solvable(id).package();
            let key = (pkg.name, if any_arch { None } else { Some(pkg.arch) });
            groups.entry(key).or_default().push(id);
        }

        let mut keep = SolvableSet::empty(pool.nsolvables());
        for ids in groups.into_values() {
            let mut by_evr: HashMap<StringId, Vec<SolvableId>> = HashMap::new();
            for id in ids {
                by_evr.entry(pool.solvable(id).package().evr).or_default().push(id);
            }
            let mut evrs: Vec<StringId> = by_evr.keys().copied().collect();
            evrs.sort_by(|&a, &b| {
                let ord = pool.evrcmp(a, b);
                if descending {
                    ord.reverse()
                } else {
                    ord
                }
            });

            let selected: Vec<StringId> = if n >= 0 {
                evrs.into_iter().take(n as usize).collect()
            } else {
                evrs.into_iter().skip(n.unsigned_abs() as usize).collect()
            };
            for evr in selected {
                for id in &by_evr[&evr] {
                    keep.add(*id);
                }
            }
        }
        self.set.intersect_with(&keep);
        self
    }

    // ----- repo priority, duplicates, extras --------------------------------

    /// Among available solvables, keeps only those from the highest-priority
    /// repository per (name, arch).
    pub fn filter_priority(&mut self) -> &mut Self {
        use std::collections::HashMap;
        let pool = self.pool;
        let mut best_priority: HashMap<(StringId, StringId), i32> = HashMap::new();
        for id in self.set.iter() {
            let pkg = pool.solvable(id).package();
            if pool.installed_repo().is_some_and(|r| pkg.repo == r.id()) {
                continue;
            }
            let priority = pool.repo(pkg.repo).priority;
            let key = (pkg.name, pkg.arch);
            let slot = best_priority.entry(key).or_insert(priority);
            if priority > *slot {
                *slot = priority;
            }
        }
        self.apply(CmpType::EQ, |pool, id| {
            let pkg = pool.solvable(id).package();
            if pool.installed_repo().is_some_and(|r| pkg.repo == r.id()) {
                return true;
            }
            let priority = pool.repo(pkg.repo).priority;
            best_priority.get(&(pkg.name, pkg.arch)) == Some(&priority)
        });
        self
    }

    /// Keeps installed ids whose (name, arch) has more than one installed evr.
    pub fn filter_duplicates(&mut self) -> &mut Self {
        use std::collections::HashMap;
        let pool = self.pool;
        let mut counts: HashMap<(StringId, StringId), u32> = HashMap::new();
        for id in self.set.iter() {
            let pkg = pool.solvable(id).package();
            if !pool.installed_repo().is_some_and(|r| pkg.repo == r.id()) {
                continue;
            }
            *counts.entry((pkg.name, pkg.arch)).or_insert(0) += 1;
        }
        self.apply(CmpType::EQ, |pool, id| {
            let pkg = pool.solvable(id).package();
            pool.installed_repo().is_some_and(|r| pkg.repo == r.id())
                && counts.get(&(pkg.name, pkg.arch)).copied().unwrap_or(0) > 1
        });
        self
    }

    /// Keeps installed packages with no equivalent (name, arch) in the available set.
    pub fn filter_extras(&mut self) -> &mut Self {
        use std::collections::HashSet;
        let pool = self.pool;
        let mut available: HashSet<(StringId, StringId)> = HashSet::new();
        for id in pool.all_package_ids() {
            let pkg = pool.solvable(id).package();
            if !pool.installed_repo().is_some_and(|r| pkg.repo == r.id()) {
                available.insert((pkg.name, pkg.arch));
            }
        }
        self.apply(CmpType::EQ, |pool, id| {
            let pkg = pool.solvable(id).package();
            pool.installed_repo().is_some_and(|r| pkg.repo == r.id()) && !available.contains(&(pkg.name, pkg.arch))
        });
        self
    }

    /// Subtracts a caller-supplied versionlock-excluded set (SPEC_FULL §6).
    pub fn filter_versionlock(&mut self, excluded: &SolvableSet) -> &mut Self {
        self.set.difference_with(excluded);
        self
    }

    /// Union of a hardcoded "core" package name list with the packages named by any
    /// reboot-suggested advisory in `advisories`.
    pub fn filter_reboot_suggested(&mut self, advisories: &crate::advisory::AdvisoryQuery<'_>) -> &mut Self {
        const CORE_NAMES: &[&str] = &["kernel", "kernel-core", "kernel-modules", "glibc", "systemd", "dbus", "linux-firmware"];
        let mut reboot_set = SolvableSet::empty(self.pool.nsolvables());
        for advisory in advisories.advisories() {
            if advisory.reboot_suggested {
                for pkg in &advisory.packages {
                    if let Some(name_id) = self.pool.find_string(&pkg.name) {
                        for &id in self.pool.packages_named(name_id) {
                            reboot_set.add_grow(id);
                        }
                    }
                }
            }
        }
        self.apply(CmpType::EQ, |pool, id| {
            let name = pool.lookup_string(pool.solvable(id).package().name);
            CORE_NAMES.contains(&name) || reboot_set.contains(id)
        });
        self
    }

    /// Keeps packages that appear among the advisory packages of any advisory in
    /// `advisories`.
    pub fn filter_advisories(&mut self, advisories: &crate::advisory::AdvisoryQuery<'_>) -> &mut Self {
        let advisory_set = advisories.get_solvables();
        self.set.intersect_with(&advisory_set);
        self
    }

    /// Filters down to the leaves of the requires (and, if `install_weak_deps`,
    /// recommends) graph induced by the currently matched solvables: the strongly
    /// connected components with no incoming edge from outside the component. See
    /// [`leaves::compute_leaves`] for the Kosaraju SCC implementation.
    pub fn filter_leaves(&mut self, install_weak_deps: bool) -> &mut Self {
        let keep = leaves::compute_leaves(self.pool, &self.set, install_weak_deps);
        self.set.intersect_with(&keep);
        self
    }

    /// Like [`Self::filter_leaves`] but returns each leaf component separately
    /// instead of their flattened union, without mutating the query.
    pub fn leaves_grouped(&self, install_weak_deps: bool) -> Vec<Vec<SolvableId>> {
        leaves::compute_leaf_groups(self.pool, &self.set, install_weak_deps)
    }

    /// Installed solvables unreachable, via requires edges, from `user_installed`.
    /// A simplified stand-in for "a transient solver call with USERINSTALLED
    /// markers" (see SPEC_FULL §4.2 and DESIGN.md): computes the dependency closure
    /// of the user-installed roots and keeps whatever installed package falls
    /// outside it.
    pub fn filter_unneeded(&mut self, user_installed: &SolvableSet) -> &mut Self {
        let needed = leaves::dependency_closure(self.pool, user_installed);
        self.apply(CmpType::EQ, |pool, id| {
            pool.installed_repo().is_some_and(|r| pool.solvable(id).package().repo == r.id()) && !needed.contains(id)
        });
        self
    }

    // ----- spec resolution (SPEC_FULL §4.2.2) -------------------------------

    /// Resolves a user-supplied package spec against the query's current state,
    /// narrowing it in place. Returns whether anything matched, and (best-effort)
    /// the parsed nevra that matched.
    pub fn resolve_pkg_spec(&mut self, spec: &str, settings: &SpecSettings) -> (bool, Nevra) {
        let glob_cmp = match (settings.expand_globs && has_glob_meta(spec), settings.ignore_case) {
            (true, true) => CmpType::IGLOB,
            (true, false) => CmpType::GLOB,
            (false, true) => CmpType::IEQ,
            (false, false) => CmpType::EQ,
        };

        if settings.with_nevra {
            for &form in &settings.nevra_forms {
                let Some(nevra) = Nevra::parse_as(spec, form) else {
                    continue;
                };
                let mut candidate = self.clone();
                candidate.filter_nevra([nevra.clone()], glob_cmp);
                if !candidate.is_empty() {
                    self.set = candidate.set;
                    return (true, nevra);
                }
            }
        }

        if settings.with_provides {
            if let Ok(reldep_id) = self.pool_parse_reldep(spec) {
                if let Some(reldep_id) = reldep_id {
                    let mut candidate = self.clone();
                    candidate.filter_provides_reldep(reldep_id);
                    if !candidate.is_empty() {
                        self.set = candidate.set;
                        return (true, Nevra::default());
                    }
                }
            }
        }

        let looks_like_path = spec.starts_with('/');
        if settings.with_filenames && looks_like_path {
            let mut candidate = self.clone();
            candidate.filter_file([spec], glob_cmp);
            if !candidate.is_empty() {
                self.set = candidate.set;
                return (true, Nevra::default());
            }
        }

        if settings.with_binaries && !looks_like_path {
            for prefix in ["/usr/bin/", "/usr/sbin/"] {
                let path = format!("{prefix}{spec}");
                if let Ok(Some(reldep_id)) = self.pool_parse_reldep(&path) {
                    let mut candidate = self.clone();
                    candidate.filter_provides_reldep(reldep_id);
                    if !candidate.is_empty() {
                        self.set = candidate.set;
                        return (true, Nevra::default());
                    }
                }
                let mut candidate = self.clone();
                candidate.filter_file([path.as_str()], CmpType::EQ);
                if !candidate.is_empty() {
                    self.set = candidate.set;
                    return (true, Nevra::default());
                }
            }
        }

        self.set = SolvableSet::empty(self.pool.nsolvables());
        (false, Nevra::default())
    }

    /// Resolves `spec` to an already-interned reldep id, read-only: `Pool::parse_rich_reldep`
    /// needs `&mut Pool` to intern new strings, which a read-only query can't obtain, so
    /// this matches against names/reldeps some solvable already interned (via its own
    /// requires/provides/etc. edges) rather than allocating new ones for `spec`.
    fn pool_parse_reldep(&self, spec: &str) -> Result<Option<ReldepId>, crate::error::PoolError> {
        Ok(self.pool.find_rich_reldep(spec))
    }

    /// Matches solvables providing `reldep_id` directly (bypassing the name-string
    /// dispatch `filter_provides` uses), for callers that already hold a `ReldepId`.
    pub fn filter_provides_reldep(&mut self, reldep_id: ReldepId) -> &mut Self {
        let providers = self.pool.whatprovides_reldep(reldep_id).unwrap_or_default();
        let mut matched = SolvableSet::empty(self.pool.nsolvables());
        for id in providers {
            matched.add(id);
        }
        self.set.intersect_with(&matched);
        self
    }
}

fn nevra_matches(op: CmpOp, candidate: &Nevra, pattern: &Nevra) -> bool {
    let field_matches = |value: &Option<String>, pattern: &Option<String>| match pattern {
        None => true,
        Some(p) => value.as_deref().is_some_and(|v| text_matches(op, v, p)),
    };
    field_matches(&candidate.name, &pattern.name)
        && field_matches(&candidate.epoch, &pattern.epoch)
        && field_matches(&candidate.version, &pattern.version)
        && field_matches(&candidate.release, &pattern.release)
        && field_matches(&candidate.arch, &pattern.arch)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pool::RepoScope;
    use crate::solvable::PackageData;

    fn add_pkg(pool: &mut Pool, repo: crate::internal::id::RepoId, name: &str, evr: &str, arch: &str) -> SolvableId {
        let name_id = pool.intern_string(name);
        let evr_id = pool.intern_string(evr);
        let arch_id = pool.intern_string(arch);
        let vendor_id = pool.intern_string("vendor");
        pool.add_solvable(
            repo,
            PackageData {
                repo,
                name: name_id,
                evr: evr_id,
                arch: arch_id,
                vendor: vendor_id,
                edges: DependencyEdges::default(),
                files: Vec::new(),
                sourcerpm: None,
                location: None,
                summary: None,
                description: None,
                url: None,
                buildtime: 0,
            },
        )
    }

    #[test]
    fn filter_name_glob() {
        let mut pool = Pool::new();
        let repo = pool.new_repo("available", RepoScope::Available);
        add_pkg(&mut pool, repo, "gcc", "13.2.1-1", "x86_64");
        add_pkg(&mut pool, repo, "gcc-c++", "13.2.1-1", "x86_64");
        add_pkg(&mut pool, repo, "gdb", "14.1-1", "x86_64");

        let mut q = PackageQuery::new(&pool);
        q.filter_name(["gcc*"], CmpType::GLOB);
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn filter_latest_evr_per_arch() {
        let mut pool = Pool::new();
        let repo = pool.new_repo("available", RepoScope::Available);
        add_pkg(&mut pool, repo, "foo", "1-1", "x86_64");
        add_pkg(&mut pool, repo, "foo", "2-1", "x86_64");
        add_pkg(&mut pool, repo, "foo", "1-1", "i686");
        add_pkg(&mut pool, repo, "foo", "3-1", "i686");

        let mut q = PackageQuery::new(&pool);
        q.filter_latest_evr(1);
        assert_eq!(q.len(), 2);

        let mut q = PackageQuery::new(&pool);
        q.filter_latest_evr_any_arch(1);
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn complementarity_of_eq_and_neq() {
        let mut pool = Pool::new();
        let repo = pool.new_repo("available", RepoScope::Available);
        add_pkg(&mut pool, repo, "foo", "1-1", "x86_64");
        add_pkg(&mut pool, repo, "bar", "1-1", "x86_64");

        let mut eq = PackageQuery::new(&pool);
        eq.filter_name(["foo"], CmpType::EQ);
        let mut neq = PackageQuery::new(&pool);
        neq.filter_name(["foo"], CmpType::NEQ);

        assert!(eq.set.is_disjoint(&neq.set));
        let mut union = eq.clone();
        union.union_with(&neq);
        assert_eq!(union.len(), 2);
    }

    #[test]
    fn filter_priority_keeps_highest() {
        let mut pool = Pool::new();
        let low = pool.new_repo("base", RepoScope::Available);
        let high = pool.new_repo("updates", RepoScope::Available);
        pool.repo_mut(high).priority = 10;
        add_pkg(&mut pool, low, "foo", "1-1", "x86_64");
        add_pkg(&mut pool, high, "foo", "1-1", "x86_64");

        let mut q = PackageQuery::new(&pool);
        q.filter_priority();
        assert_eq!(q.len(), 1);
        let id = q.iter().next().unwrap();
        assert_eq!(pool.repo(pool.solvable(id).package().repo).name, "updates");
    }

    #[test]
    fn filter_evr_without_release_ignores_release_suffix() {
        let mut pool = Pool::new();
        let repo = pool.new_repo("available", RepoScope::Available);
        add_pkg(&mut pool, repo, "foo", "2.0-3", "x86_64");

        let mut q = PackageQuery::new(&pool);
        q.filter_evr(["2.0"], CmpType::EQ).unwrap();
        assert_eq!(q.len(), 1, "release-less pattern should match regardless of the package's release");

        let mut q = PackageQuery::new(&pool);
        q.filter_evr(["2.0-3"], CmpType::EQ).unwrap();
        assert_eq!(q.len(), 1);

        let mut q = PackageQuery::new(&pool);
        q.filter_evr(["2.0-9"], CmpType::EQ).unwrap();
        assert_eq!(q.len(), 0, "release-bearing pattern must match the release exactly");
    }
}
