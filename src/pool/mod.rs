//! The interned object store: strings, reldeps, solvables, repositories, and the
//! provides index that drives resolution.

pub mod evr;
pub mod nevra;

use crate::advisory::Advisory;
use crate::error::PoolError;
use crate::internal::arena::{Arena, ArenaId};
use crate::internal::id::{ReldepId, RepoId, SolvableId, StringId};
use crate::internal::mapping::Mapping;
use crate::reldep::{parse as parse_rich, CmpFlag, ParsedNode, Reldep};
use crate::solvable::{DependencyEdges, PackageData, RepoScope, Repository, Solvable};
use crate::solvmap::SolvableSet;
use std::collections::{HashMap, HashSet};

/// The source-arch suffix convention shared with the RPM build system: a source
/// package's arch is always `"src"` or `"nosrc"`, and such packages never interoperate
/// with binary-arch packages in upgrade/downgrade or dependency resolution.
fn is_source_arch(arch: &str) -> bool {
    arch == "src" || arch == "nosrc"
}

/// Whether two archs are allowed to satisfy the same (name-based) upgrade/downgrade
/// relationship. `noarch` is compatible with anything; a source arch is compatible
/// only with another source arch.
pub fn arch_compatible(a: &str, b: &str) -> bool {
    if is_source_arch(a) || is_source_arch(b) {
        return is_source_arch(a) && is_source_arch(b);
    }
    a == b || a == "noarch" || b == "noarch"
}

/// Owns every interned object in the system: strings, reldeps, solvables and
/// repositories. All cross-references in the rest of the crate are `(pool, id)`
/// pairs; nothing outside the `Pool` owns a `Solvable` directly.
pub struct Pool {
    solvables: Arena<SolvableId, Solvable>,

    strings: Arena<StringId, String>,
    strings_to_ids: HashMap<String, StringId>,

    reldeps: Arena<ReldepId, Reldep>,
    reldeps_to_ids: HashMap<Reldep, ReldepId>,

    repos: Vec<Repository>,
    installed_repo: Option<RepoId>,

    packages_by_name: Mapping<StringId, Vec<SolvableId>>,

    whatprovides: Mapping<ReldepId, Vec<SolvableId>>,
    whatprovides_dirty: bool,

    /// Providers indexed by name rather than by exact reldep id, each paired with the
    /// evr to compare against a versioned requirement on that name (the explicit
    /// provide's own evr, or the solvable's own evr for an unversioned/self provide).
    /// Built alongside `whatprovides`; used by `whatprovides_reldep` to evaluate
    /// `Reldep::Versioned` comparators that no single interned reldep id can answer.
    provides_by_name: Mapping<StringId, Vec<(SolvableId, StringId)>>,

    considered: Option<SolvableSet>,

    installonly_names: HashSet<StringId>,
    allow_vendor_change: bool,

    advisories: Vec<Advisory>,
}

impl Default for Pool {
    fn default() -> Self {
        let solvables = Arena::new();
        solvables.alloc(Solvable::new_root());

        let strings = Arena::new();
        // string id 0 is reserved for "no string"
        strings.alloc(String::new());
        let mut strings_to_ids = HashMap::new();
        strings_to_ids.insert(String::new(), StringId::NONE);

        Self {
            solvables,
            strings,
            strings_to_ids,
            reldeps: Arena::new(),
            reldeps_to_ids: HashMap::new(),
            repos: Vec::new(),
            installed_repo: None,
            packages_by_name: Mapping::new(),
            whatprovides: Mapping::new(),
            whatprovides_dirty: true,
            provides_by_name: Mapping::new(),
            considered: None,
            installonly_names: HashSet::new(),
            allow_vendor_change: false,
            advisories: Vec::new(),
        }
    }
}

impl Pool {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- strings -----------------------------------------------------

    /// Interns `s`, returning the existing id if it was already known.
    pub fn intern_string(&mut self, s: &str) -> StringId {
        if let Some(&id) = self.strings_to_ids.get(s) {
            return id;
        }
        let id = self.strings.alloc(s.to_string());
        self.strings_to_ids.insert(s.to_string(), id);
        id
    }

    /// Returns the string for `id`. Panics if `id` was never interned in this pool.
    pub fn lookup_string(&self, id: StringId) -> &str {
        if id.is_none() {
            return "";
        }
        &self.strings[id]
    }

    /// Looks up `s` without interning it; `None` if it was never interned.
    pub fn find_string(&self, s: &str) -> Option<StringId> {
        self.strings_to_ids.get(s).copied()
    }

    // ----- advisories ------------------------------------------------------

    /// Registers an advisory, returning its index.
    pub fn add_advisory(&mut self, advisory: Advisory) -> usize {
        self.advisories.push(advisory);
        self.advisories.len() - 1
    }

    /// All advisories currently registered, in insertion order.
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    // ----- reldeps -------------------------------------------------------

    /// Interns a plain or versioned reldep. `evr` is ignored (and should be
    /// `StringId::NONE`) when `cmp` is `None`.
    pub fn intern_reldep(&mut self, name: StringId, cmp: Option<CmpFlag>, evr: StringId) -> ReldepId {
        let reldep = match cmp {
            Some(cmp) => Reldep::Versioned { name, cmp, evr },
            None => Reldep::Simple { name },
        };
        self.intern_reldep_value(reldep)
    }

    fn intern_reldep_value(&mut self, reldep: Reldep) -> ReldepId {
        if let Some(&id) = self.reldeps_to_ids.get(&reldep) {
            return id;
        }
        let id = self.reldeps.alloc(reldep.clone());
        self.reldeps_to_ids.insert(reldep, id);
        self.whatprovides_dirty = true;
        id
    }

    /// Parses and interns a rich boolean reldep expression (see [`crate::reldep`]).
    pub fn parse_rich_reldep(&mut self, text: &str) -> Result<ReldepId, PoolError> {
        let node = parse_rich(text, |s| Some(self.intern_string(s))).map_err(PoolError::BadReldep)?;
        Ok(self.intern_parsed_node(node))
    }

    /// Like [`Self::parse_rich_reldep`], but read-only: resolves `text` against
    /// already-interned strings and reldeps instead of allocating new ones. Returns
    /// `None` if any name/evr in `text` was never interned, or if the resulting
    /// reldep (a specific versioned comparator, or a rich combination) was never
    /// itself interned by some solvable's edges. Used by
    /// [`crate::query::PackageQuery::resolve_pkg_spec`], which only borrows the pool
    /// immutably.
    pub(crate) fn find_rich_reldep(&self, text: &str) -> Option<ReldepId> {
        let node = parse_rich(text, |s| self.find_string(s)).ok()?;
        self.find_parsed_node(&node)
    }

    fn find_parsed_node(&self, node: &ParsedNode) -> Option<ReldepId> {
        match node {
            ParsedNode::Simple(name) => self.intern_reldep_value_readonly(Reldep::Simple { name: *name }),
            ParsedNode::Versioned(name, cmp, evr) => {
                self.intern_reldep_value_readonly(Reldep::Versioned { name: *name, cmp: *cmp, evr: *evr })
            }
            ParsedNode::Rich(op, left, right) => {
                let left = self.find_parsed_node(left)?;
                let right = self.find_parsed_node(right)?;
                self.intern_reldep_value_readonly(Reldep::Rich { op: *op, left, right })
            }
        }
    }

    fn intern_parsed_node(&mut self, node: ParsedNode) -> ReldepId {
        match node {
            ParsedNode::Simple(name) => self.intern_reldep_value(Reldep::Simple { name }),
            ParsedNode::Versioned(name, cmp, evr) => {
                self.intern_reldep_value(Reldep::Versioned { name, cmp, evr })
            }
            ParsedNode::Rich(op, left, right) => {
                let left = self.intern_parsed_node(*left);
                let right = self.intern_parsed_node(*right);
                self.intern_reldep_value(Reldep::Rich { op, left, right })
            }
        }
    }

    pub fn resolve_reldep(&self, id: ReldepId) -> Result<&Reldep, PoolError> {
        if id.to_usize() >= self.reldeps.len() {
            return Err(PoolError::BadId(format!("reldep id {}", id.to_usize())));
        }
        Ok(&self.reldeps[id])
    }

    // ----- evr -------------------------------------------------------------

    /// Compares two interned evr strings using the RPM EVR algorithm (see
    /// [`evr::evrcmp`]). This is the sole authority used for version ordering
    /// anywhere in the crate.
    pub fn evrcmp(&self, a: StringId, b: StringId) -> std::cmp::Ordering {
        evr::evrcmp(self.lookup_string(a), self.lookup_string(b))
    }

    // ----- repositories --------------------------------------------------

    pub fn new_repo(&mut self, name: impl Into<String>, scope: RepoScope) -> RepoId {
        let id = RepoId::new(self.repos.len() as u32);
        if scope == RepoScope::Installed {
            assert!(
                self.installed_repo.is_none(),
                "a pool may have at most one installed repository"
            );
            self.installed_repo = Some(id);
        }
        self.repos.push(Repository::new(id, name, scope));
        id
    }

    pub fn repo(&self, id: RepoId) -> &Repository {
        &self.repos[id.index()]
    }

    pub fn repo_mut(&mut self, id: RepoId) -> &mut Repository {
        &mut self.repos[id.index()]
    }

    pub fn repos(&self) -> impl Iterator<Item = &Repository> {
        self.repos.iter()
    }

    pub fn installed_repo(&self) -> Option<&Repository> {
        self.installed_repo.map(|id| self.repo(id))
    }

    // ----- solvables -------------------------------------------------------

    pub fn add_solvable(&mut self, repo: RepoId, data: PackageData) -> SolvableId {
        let name = data.name;
        let id = self.solvables.alloc(Solvable::new_package(data));
        if self.packages_by_name.get(name).is_none() {
            self.packages_by_name.insert(name, Vec::new());
        }
        self.packages_by_name.get_mut(name).unwrap().push(id);
        let _ = repo;
        self.whatprovides_dirty = true;
        if let Some(considered) = &mut self.considered {
            considered.grow_to(self.solvables.len());
        }
        id
    }

    pub fn nsolvables(&self) -> usize {
        self.solvables.len()
    }

    pub fn solvable(&self, id: SolvableId) -> &Solvable {
        &self.solvables[id]
    }

    pub(crate) fn solvable_mut(&mut self, id: SolvableId) -> &mut Solvable {
        &mut self.solvables[id]
    }

    pub fn all_package_ids(&self) -> impl Iterator<Item = SolvableId> + '_ {
        (1..self.solvables.len()).map(SolvableId::from_usize)
    }

    pub fn packages_named(&self, name: StringId) -> &[SolvableId] {
        self.packages_by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn root_mut(&mut self) -> &mut Solvable {
        &mut self.solvables[SolvableId::root()]
    }

    // ----- nevra -------------------------------------------------------

    pub fn full_nevra(&self, id: SolvableId) -> String {
        let pkg = self.solvable(id).package();
        let n = self.solvable_nevra(pkg);
        n.full_nevra()
    }

    pub fn nevra_without_epoch(&self, id: SolvableId) -> String {
        let pkg = self.solvable(id).package();
        let n = self.solvable_nevra(pkg);
        n.nevra_without_epoch()
    }

    /// The parsed [`nevra::Nevra`] of a solvable, for use by filters that match on
    /// individual nevra components.
    pub fn nevra_of(&self, id: SolvableId) -> nevra::Nevra {
        self.solvable_nevra(self.solvable(id).package())
    }

    fn solvable_nevra(&self, pkg: &PackageData) -> nevra::Nevra {
        let evr_text = self.lookup_string(pkg.evr);
        let evr = evr::Evr::parse(evr_text);
        nevra::Nevra {
            name: Some(self.lookup_string(pkg.name).to_string()),
            epoch: evr.epoch.map(str::to_string),
            version: Some(evr.version.to_string()),
            release: evr.release.map(str::to_string),
            arch: Some(self.lookup_string(pkg.arch).to_string()),
        }
    }

    // ----- provides index --------------------------------------------------

    pub fn mark_provides_dirty(&mut self) {
        self.whatprovides_dirty = true;
    }

    /// Rebuilds the whatprovides index if it is dirty. Called automatically before
    /// every solve; queries that use `filter_provides` must call it explicitly.
    pub fn make_provides_ready(&mut self) {
        if !self.whatprovides_dirty {
            return;
        }

        let mut index: HashMap<ReldepId, Vec<SolvableId>> = HashMap::new();
        let mut by_name: HashMap<StringId, Vec<(SolvableId, StringId)>> = HashMap::new();
        for solvable_id in self.all_package_ids() {
            if let Some(considered) = &self.considered {
                if !considered.contains(solvable_id) {
                    continue;
                }
            }
            let pkg = self.solvable(solvable_id).package();
            if self.repo(pkg.repo).disabled {
                continue;
            }
            let own_evr = pkg.evr;
            let provides = pkg.edges.provides.clone();
            for reldep_id in provides {
                index.entry(reldep_id).or_default().push(solvable_id);
                if let Ok(reldep) = self.resolve_reldep(reldep_id) {
                    // a versioned provide (`Provides: foo = 2.0`) is matched against
                    // its own evr; an unversioned provide of a foreign name implicitly
                    // carries the providing package's own evr, matching libsolv.
                    let (name, evr) = match reldep {
                        Reldep::Simple { name } => (*name, own_evr),
                        Reldep::Versioned { name, evr, .. } => (*name, *evr),
                        Reldep::Rich { .. } => continue,
                    };
                    by_name.entry(name).or_default().push((solvable_id, evr));
                }
            }
        }

        // also: every solvable provides its own name unversioned, matching libsolv's
        // implicit "name provides itself" rule
        for solvable_id in self.all_package_ids() {
            let pkg = self.solvable(solvable_id).package();
            let name = pkg.name;
            let self_provide = self.intern_reldep_value_readonly(Reldep::Simple { name });
            if let Some(reldep_id) = self_provide {
                index.entry(reldep_id).or_default().push(solvable_id);
            }
            by_name.entry(name).or_default().push((solvable_id, pkg.evr));
        }

        let mut mapping = Mapping::new();
        for (reldep_id, mut solvables) in index {
            solvables.sort_unstable();
            solvables.dedup();
            mapping.insert(reldep_id, solvables);
        }
        self.whatprovides = mapping;

        let mut by_name_mapping = Mapping::new();
        for (name, mut providers) in by_name {
            providers.sort_unstable_by_key(|(id, _)| *id);
            providers.dedup();
            by_name_mapping.insert(name, providers);
        }
        self.provides_by_name = by_name_mapping;

        self.whatprovides_dirty = false;
    }

    /// Providers of `name`, each paired with the evr to compare a versioned
    /// requirement's comparator against. Populated by [`Self::make_provides_ready`].
    fn providers_by_name(&self, name: StringId) -> &[(SolvableId, StringId)] {
        debug_assert!(!self.whatprovides_dirty, "whatprovides index is dirty");
        self.provides_by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn intern_reldep_value_readonly(&self, reldep: Reldep) -> Option<ReldepId> {
        self.reldeps_to_ids.get(&reldep).copied()
    }

    /// Returns the ids of solvables satisfying `reldep_id`. The provides index must
    /// be clean (see [`Self::make_provides_ready`]); in debug builds an inconsistent
    /// call panics rather than silently returning a stale answer.
    pub fn whatprovides(&self, reldep_id: ReldepId) -> &[SolvableId] {
        debug_assert!(!self.whatprovides_dirty, "whatprovides index is dirty");
        self.whatprovides.get(reldep_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Resolves a (possibly rich) reldep to the solvable ids that satisfy it,
    /// evaluating boolean combinators over the plain provides index and, for a
    /// versioned comparator, [`Self::evrcmp`] against each same-name provider's evr.
    pub fn whatprovides_reldep(&self, reldep_id: ReldepId) -> Result<Vec<SolvableId>, PoolError> {
        let reldep = self.resolve_reldep(reldep_id)?;
        Ok(match reldep {
            Reldep::Simple { .. } => self.whatprovides(reldep_id).to_vec(),
            Reldep::Versioned { name, cmp, evr } => {
                let mut matched: Vec<SolvableId> = self
                    .providers_by_name(*name)
                    .iter()
                    .filter(|(_, provider_evr)| cmp.accepts(self.evrcmp(*provider_evr, *evr)))
                    .map(|(id, _)| *id)
                    .collect();
                matched.sort_unstable();
                matched.dedup();
                matched
            }
            Reldep::Rich { op, left, right } => {
                let mut a = self.whatprovides_reldep(*left)?;
                let b = self.whatprovides_reldep(*right)?;
                use crate::reldep::RichOp::*;
                match op {
                    And | With => {
                        a.retain(|s| b.contains(s));
                        a
                    }
                    Or => {
                        a.extend(b);
                        a.sort_unstable();
                        a.dedup();
                        a
                    }
                    Unless | Without => {
                        a.retain(|s| !b.contains(s));
                        a
                    }
                    If => a,
                }
            }
        })
    }

    // ----- considered mask -----------------------------------------------

    pub fn set_considered(&mut self, set: Option<SolvableSet>) {
        self.considered = set;
        self.whatprovides_dirty = true;
    }

    pub fn considered(&self) -> Option<&SolvableSet> {
        self.considered.as_ref()
    }

    // ----- installonly / vendor change policy -----------------------------

    pub fn set_installonly(&mut self, names: impl IntoIterator<Item = StringId>) {
        self.installonly_names = names.into_iter().collect();
    }

    pub fn is_installonly_name(&self, name: StringId) -> bool {
        self.installonly_names.contains(&name)
    }

    pub fn set_allow_vendor_change(&mut self, allow: bool) {
        self.allow_vendor_change = allow;
    }

    pub fn allow_vendor_change(&self) -> bool {
        self.allow_vendor_change
    }

    // ----- upgrade / downgrade predicates (see SPEC_FULL §4.2.1) -----------

    /// The installed solvable that `candidate` would upgrade, or `None` if no
    /// installed solvable with the same name and a compatible, strictly lower evr
    /// exists, or if any installed solvable with that name already has an evr >=
    /// `candidate`'s (to avoid claiming an upgrade that's already present).
    pub fn what_upgrades(&self, candidate: SolvableId) -> Option<SolvableId> {
        let candidate_pkg = self.solvable(candidate).package();
        let installed_repo = self.installed_repo?;
        let mut best: Option<SolvableId> = None;
        for &installed_id in self.packages_named(candidate_pkg.name) {
            let installed_pkg = self.solvable(installed_id).package();
            if installed_pkg.repo != installed_repo.id() {
                continue;
            }
            if !arch_compatible(
                self.lookup_string(installed_pkg.arch),
                self.lookup_string(candidate_pkg.arch),
            ) {
                continue;
            }
            let cmp = self.evrcmp(installed_pkg.evr, candidate_pkg.evr);
            if cmp == std::cmp::Ordering::Greater || cmp == std::cmp::Ordering::Equal {
                return None;
            }
            best = match best {
                None => Some(installed_id),
                Some(current) => {
                    let current_evr = self.solvable(current).package().evr;
                    if self.evrcmp(installed_pkg.evr, current_evr) == std::cmp::Ordering::Greater {
                        Some(installed_id)
                    } else {
                        Some(current)
                    }
                }
            };
        }
        best
    }

    /// Symmetric to [`Self::what_upgrades`]: requires the *same* arch (not merely
    /// compatible) and returns the installed solvable with the minimum evr strictly
    /// greater than `candidate`'s, or `None` if any installed solvable with that name
    /// has evr <= `candidate`'s.
    pub fn what_downgrades(&self, candidate: SolvableId) -> Option<SolvableId> {
        let candidate_pkg = self.solvable(candidate).package();
        let installed_repo = self.installed_repo?;
        let mut best: Option<SolvableId> = None;
        for &installed_id in self.packages_named(candidate_pkg.name) {
            let installed_pkg = self.solvable(installed_id).package();
            if installed_pkg.repo != installed_repo.id() {
                continue;
            }
            if installed_pkg.arch != candidate_pkg.arch {
                continue;
            }
            let cmp = self.evrcmp(installed_pkg.evr, candidate_pkg.evr);
            if cmp == std::cmp::Ordering::Less || cmp == std::cmp::Ordering::Equal {
                return None;
            }
            best = match best {
                None => Some(installed_id),
                Some(current) => {
                    let current_evr = self.solvable(current).package().evr;
                    if self.evrcmp(installed_pkg.evr, current_evr) == std::cmp::Ordering::Less {
                        Some(installed_id)
                    } else {
                        Some(current)
                    }
                }
            };
        }
        best
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::solvable::DependencyEdges;

    fn add_pkg(pool: &mut Pool, repo: RepoId, name: &str, evr: &str, arch: &str) -> SolvableId {
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
    fn interning_is_stable() {
        let mut pool = Pool::new();
        let a = pool.intern_string("foo");
        let b = pool.intern_string("foo");
        assert_eq!(a, b);
    }

    #[test]
    fn full_nevra_format() {
        let mut pool = Pool::new();
        let repo = pool.new_repo("available", RepoScope::Available);
        let id = add_pkg(&mut pool, repo, "foo", "1:2.0-3", "x86_64");
        assert_eq!(pool.full_nevra(id), "foo-1:2.0-3.x86_64");
        assert_eq!(pool.nevra_without_epoch(id), "foo-2.0-3.x86_64");
    }

    #[test]
    fn what_upgrades_picks_latest_compatible() {
        let mut pool = Pool::new();
        let installed = pool.new_repo("installed", RepoScope::Installed);
        let available = pool.new_repo("available", RepoScope::Available);
        add_pkg(&mut pool, installed, "foo", "1.0-1", "x86_64");
        let v2 = add_pkg(&mut pool, available, "foo", "1.1-1", "x86_64");
        assert!(pool.what_upgrades(v2).is_some());
    }

    #[test]
    fn what_upgrades_none_when_already_present() {
        let mut pool = Pool::new();
        let installed = pool.new_repo("installed", RepoScope::Installed);
        let available = pool.new_repo("available", RepoScope::Available);
        add_pkg(&mut pool, installed, "foo", "2.0-1", "x86_64");
        let older = add_pkg(&mut pool, available, "foo", "1.0-1", "x86_64");
        assert!(pool.what_upgrades(older).is_none());
    }

    #[test]
    fn noarch_is_upgrade_compatible_with_any_arch() {
        assert!(arch_compatible("noarch", "x86_64"));
        assert!(arch_compatible("x86_64", "noarch"));
        assert!(!arch_compatible("x86_64", "aarch64"));
    }

    #[test]
    fn source_arch_is_isolated() {
        assert!(!arch_compatible("src", "x86_64"));
        assert!(arch_compatible("src", "src"));
    }

    #[test]
    fn whatprovides_includes_self_provide() {
        let mut pool = Pool::new();
        let repo = pool.new_repo("available", RepoScope::Available);
        let id = add_pkg(&mut pool, repo, "foo", "1.0-1", "x86_64");
        pool.make_provides_ready();
        let name = pool.intern_string("foo");
        let reldep = pool.intern_reldep(name, None, StringId::NONE);
        assert!(pool.whatprovides(reldep).contains(&id));
    }

    #[test]
    fn whatprovides_reldep_evaluates_versioned_comparator_against_self_evr() {
        let mut pool = Pool::new();
        let repo = pool.new_repo("available", RepoScope::Available);
        let old = add_pkg(&mut pool, repo, "lib", "1.0-1", "x86_64");
        let new = add_pkg(&mut pool, repo, "lib", "2.0-1", "x86_64");
        pool.make_provides_ready();

        let name = pool.intern_string("lib");
        let evr_1_0 = pool.intern_string("1.0-1");
        let requires_ge_1_0 = pool.intern_reldep(name, Some(CmpFlag::GE), evr_1_0);
        let mut providers = pool.whatprovides_reldep(requires_ge_1_0).unwrap();
        providers.sort_unstable();
        let mut expected = vec![old, new];
        expected.sort_unstable();
        assert_eq!(providers, expected);

        let requires_lt_1_0 = pool.intern_reldep(name, Some(CmpFlag::LT), evr_1_0);
        assert!(pool.whatprovides_reldep(requires_lt_1_0).unwrap().is_empty());

        let evr_2_0 = pool.intern_string("2.0-1");
        let requires_eq_2_0 = pool.intern_reldep(name, Some(CmpFlag::EQ), evr_2_0);
        assert_eq!(pool.whatprovides_reldep(requires_eq_2_0).unwrap(), vec![new]);
    }
}
