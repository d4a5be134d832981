//! User-facing intent buffer and resolver (SPEC_FULL.md §4.4).
//!
//! A [`Goal`] accumulates install/remove/upgrade/... intents as opaque spec strings,
//! already-resolved solvable ids, or caller-built package sets. [`Goal::resolve`]
//! turns the whole buffer into a single job stream for [`crate::solver::Solver`] in
//! one shot, since per SPEC_FULL.md §5 "the solver receives all jobs together" -
//! earlier specs can shadow later ones' diagnostics but never their decisions. The
//! spec-to-job translation and the solver's decisions-to-[`Transaction`] mapping
//! lives in the private [`private::GoalPrivate`] driver; `Goal` itself only owns the
//! spec buffer and the last resolve's output.

mod private;

use crate::error::GoalError;
use crate::internal::id::SolvableId;
use crate::pool::nevra::{NevraForm, DEFAULT_NEVRA_FORMS};
use crate::pool::Pool;
use crate::problem::Problem;
use crate::query::SpecSettings;
use crate::solvmap::SolvableSet;
use crate::transaction::Transaction;
use crate::GoalConfig;
use std::collections::HashMap;

/// What a buffered spec selects. Built via `impl Into<Target>` so callers can pass a
/// `&str`, a [`SolvableId`], or a [`SolvableSet`] directly to `add_install` and
/// friends, matching the spec's "spec | pkg | set" overload set.
#[derive(Debug, Clone)]
pub enum Target {
    /// An opaque spec string, resolved against the pool at `resolve()` time.
    Spec(String),
    /// An already-resolved solvable.
    Pkg(SolvableId),
    /// A caller-built package set, e.g. the result of a [`crate::query::PackageQuery`].
    Set(SolvableSet),
    /// Every installed solvable; used by `add_upgrade_all`/`add_distro_sync_all`.
    AllInstalled,
}

impl From<&str> for Target {
    fn from(spec: &str) -> Self {
        Target::Spec(spec.to_string())
    }
}

impl From<String> for Target {
    fn from(spec: String) -> Self {
        Target::Spec(spec)
    }
}

impl From<SolvableId> for Target {
    fn from(id: SolvableId) -> Self {
        Target::Pkg(id)
    }
}

impl From<SolvableSet> for Target {
    fn from(set: SolvableSet) -> Self {
        Target::Set(set)
    }
}

/// Per-spec resolution settings (SPEC_FULL.md §4.4).
#[derive(Debug, Clone)]
pub struct GoalSettings {
    /// If `true`, a spec that fails to resolve is a hard [`GoalError`]; otherwise it
    /// becomes a [`ResolveLogEntry`] and the rest of the buffered specs still run.
    pub strict: bool,
    /// Prefer the highest available evr (`SOLVER_FORCEBEST`).
    pub best: bool,
    /// For `add_remove`: also drop now-unneeded dependencies.
    pub clean_requirements_on_remove: bool,
    /// Restrict candidates to these repository names.
    pub to_repo_ids: Vec<String>,
    /// Restrict the installed side of the match to these repository names.
    pub from_repo_ids: Vec<String>,
    /// Nevra forms tried, in order, when resolving a spec string.
    pub nevra_forms: Vec<NevraForm>,
    pub ignore_case: bool,
    pub expand_globs: bool,
    pub with_nevra: bool,
    pub with_provides: bool,
    pub with_filenames: bool,
    pub with_binaries: bool,
}

impl Default for GoalSettings {
    fn default() -> Self {
        Self {
            strict: true,
            best: false,
            clean_requirements_on_remove: true,
            to_repo_ids: Vec::new(),
            from_repo_ids: Vec::new(),
            nevra_forms: DEFAULT_NEVRA_FORMS.to_vec(),
            ignore_case: false,
            expand_globs: true,
            with_nevra: true,
            with_provides: true,
            with_filenames: true,
            with_binaries: true,
        }
    }
}

impl GoalSettings {
    fn spec_settings(&self) -> SpecSettings {
        SpecSettings {
            with_nevra: self.with_nevra,
            with_provides: self.with_provides,
            with_filenames: self.with_filenames,
            with_binaries: self.with_binaries,
            expand_globs: self.expand_globs,
            ignore_case: self.ignore_case,
            nevra_forms: self.nevra_forms.clone(),
        }
    }
}

/// What the system inspector found for the currently running kernel. Kept as a
/// three-way enum rather than a sentinel integer so the two sentinels the design
/// notes call out - "not set" and "`uname` failed" - can never collapse into each
/// other by accident (SPEC_FULL.md Design Notes, open question).
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum RunningKernel {
    /// No running kernel has been supplied to this goal.
    #[default]
    Unset,
    /// The caller tried and failed to identify the running kernel.
    Unknown,
    /// The installed solvable matching the running kernel.
    Solvable(SolvableId),
}

/// Why the solver settled a transaction step the way it did (SPEC_FULL.md §4.5).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Reason {
    /// Explicitly requested by a buffered spec.
    User,
    /// Pulled in as part of a group/environment (comps) job.
    Group,
    /// Pulled in only via a recommends/supplements augmentation pass.
    WeakDependency,
    /// Pulled in to satisfy a hard `requires` edge.
    Dependency,
    /// Scheduled for removal by `clean_requirements_on_remove`.
    Clean,
}

/// A diagnostic for a single buffered spec that didn't resolve the way the caller
/// expected (SPEC_FULL.md §7). When `strict` is `false` for that spec, this replaces
/// what would otherwise be a hard [`GoalError::ResolveSpec`]-shaped failure.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ResolveLogEntry {
    NotFound { spec: String },
    NotInstalled { spec: String },
    AlreadyInstalled { spec: String },
    NotAvailable { spec: String },
    InstalledInDifferentVersion { spec: String },
    NotFoundInRepositories { spec: String },
    InstalledForDifferentArchitecture { spec: String },
    InstalledIsLowestVersion { spec: String },
}

/// The action a buffered spec asks for. Kept private: callers express intent
/// through the `add_*` methods, never by constructing this directly.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Intent {
    Install,
    Remove,
    Upgrade,
    Downgrade,
    DistroSync,
    Reinstall,
    InstallOrReinstall,
    ProvideInstall,
}

#[derive(Debug, Clone)]
pub(crate) struct BufferedSpec {
    pub(crate) intent: Intent,
    pub(crate) target: Target,
    pub(crate) settings: GoalSettings,
}

/// Accumulates user intents and resolves them into a [`Transaction`].
///
/// A `Goal` owns its spec buffer and, after a successful [`Goal::resolve`], the
/// resulting transaction; it does not own the [`Pool`] it resolves against (multiple
/// queries and goals may share one pool within a single thread, per SPEC_FULL.md §5).
/// Resolving again discards the previous resolve's transaction, log and reasons.
pub struct Goal {
    config: GoalConfig,
    specs: Vec<BufferedSpec>,
    running_kernel: RunningKernel,
    protected_packages: Vec<String>,
    transaction: Option<Transaction>,
    problems: Option<Problem>,
    resolve_log: Vec<ResolveLogEntry>,
    reasons: HashMap<SolvableId, Reason>,
    user_installed: Option<SolvableSet>,
}

impl Goal {
    /// Builds an empty goal against the given external configuration.
    pub fn new(config: GoalConfig) -> Self {
        let protected_packages = config.protected_packages.clone();
        Self {
            config,
            specs: Vec::new(),
            running_kernel: RunningKernel::Unset,
            protected_packages,
            transaction: None,
            problems: None,
            resolve_log: Vec::new(),
            reasons: HashMap::new(),
            user_installed: None,
        }
    }

    /// The configuration this goal was built with.
    pub fn config(&self) -> &GoalConfig {
        &self.config
    }

    /// Supplies the running kernel's identity (SPEC_FULL.md §6 "system inspector").
    /// Consulted during `resolve()` only when `config.protect_running_kernel` is set.
    pub fn set_running_kernel(&mut self, kernel: RunningKernel) {
        self.running_kernel = kernel;
    }

    /// Adds package names that must never be scheduled for removal, on top of
    /// whatever `config.protected_packages` already names.
    pub fn add_protected_packages(&mut self, names: impl IntoIterator<Item = impl Into<String>>) {
        self.protected_packages.extend(names.into_iter().map(Into::into));
    }

    fn push(&mut self, intent: Intent, target: impl Into<Target>, settings: GoalSettings) {
        self.specs.push(BufferedSpec {
            intent,
            target: target.into(),
            settings,
        });
    }

    /// Buffers an install intent for `target` (a spec string, a resolved solvable,
    /// or a pre-built package set).
    pub fn add_install(&mut self, target: impl Into<Target>, settings: GoalSettings) {
        self.push(Intent::Install, target, settings);
    }

    /// Buffers a removal intent.
    pub fn add_remove(&mut self, target: impl Into<Target>, settings: GoalSettings) {
        self.push(Intent::Remove, target, settings);
    }

    /// Buffers an upgrade intent for the matched candidates.
    pub fn add_upgrade(&mut self, target: impl Into<Target>, settings: GoalSettings) {
        self.push(Intent::Upgrade, target, settings);
    }

    /// Buffers an upgrade intent over every installed solvable.
    pub fn add_upgrade_all(&mut self, settings: GoalSettings) {
        self.push(Intent::Upgrade, Target::AllInstalled, settings);
    }

    /// Buffers a downgrade intent. Unlike a plain install, this bypasses
    /// `config.allow_downgrade`.
    pub fn add_downgrade(&mut self, target: impl Into<Target>, settings: GoalSettings) {
        self.push(Intent::Downgrade, target, settings);
    }

    /// Buffers a distribution-synchronization intent: the matched installed
    /// solvables are synced exactly to the best available candidate, erasing any
    /// installed one the available set doesn't also contain.
    pub fn add_distro_sync(&mut self, target: impl Into<Target>, settings: GoalSettings) {
        self.push(Intent::DistroSync, target, settings);
    }

    /// Buffers a distribution-synchronization intent over every installed solvable.
    pub fn add_distro_sync_all(&mut self, settings: GoalSettings) {
        self.push(Intent::DistroSync, Target::AllInstalled, settings);
    }

    /// Buffers a reinstall intent: the matched, already-installed solvables are
    /// re-applied even though the solver would otherwise see them as unchanged.
    pub fn add_reinstall(&mut self, target: impl Into<Target>, settings: GoalSettings) {
        self.push(Intent::Reinstall, target, settings);
    }

    /// Like `add_install`, but a spec that matches an already-installed nevra is
    /// reinstalled rather than treated as a no-op.
    pub fn add_install_or_reinstall(&mut self, target: impl Into<Target>, settings: GoalSettings) {
        self.push(Intent::InstallOrReinstall, target, settings);
    }

    /// Installs whatever provides `reldep_spec` - a plain or versioned reldep
    /// string, parsed the same way a package's `Requires:` entry would be.
    pub fn add_provide_install(&mut self, reldep_spec: impl Into<String>) {
        self.push(Intent::ProvideInstall, Target::Spec(reldep_spec.into()), GoalSettings::default());
    }

    /// Resolves the buffered specs into a [`Transaction`] (SPEC_FULL.md §4.4
    /// `resolve`). Resets any previous resolve's output first; `resolve()` never
    /// panics or returns a Rust error on an unsatisfiable goal - that comes back as
    /// [`GoalError::SolverError`] with the problem report attached, per SPEC_FULL.md
    /// §7's "resolution errors are returned as a problem report" propagation policy.
    pub fn resolve(&mut self, pool: &mut Pool, allow_erasing: bool) -> Result<&Transaction, GoalError> {
        self.transaction = None;
        self.problems = None;
        self.resolve_log.clear();
        self.reasons.clear();
        self.user_installed = None;

        let driver = private::GoalPrivate::new(&self.config, self.running_kernel, &self.protected_packages);
        match driver.resolve(pool, &self.specs, allow_erasing) {
            Ok(outcome) => {
                self.resolve_log = outcome.log;
                self.reasons = outcome.reasons;
                self.user_installed = Some(outcome.user_installed);
                self.transaction = Some(outcome.transaction);
                Ok(self.transaction.as_ref().expect("just set"))
            }
            Err(private::GoalFailure::Solver { problem, log }) => {
                self.resolve_log = log;
                self.problems = Some(problem.clone());
                Err(GoalError::SolverError { problems: problem })
            }
        }
    }

    /// The last successful resolve's transaction.
    pub fn transaction(&self) -> Result<&Transaction, GoalError> {
        self.transaction.as_ref().ok_or(GoalError::NotResolved)
    }

    /// Per-spec diagnostics accumulated by the last `resolve()` call.
    pub fn resolve_log(&self) -> &[ResolveLogEntry] {
        &self.resolve_log
    }

    /// The problem report from the last failed `resolve()` call, if any.
    pub fn problems(&self) -> Option<&Problem> {
        self.problems.as_ref()
    }

    /// The solvables marked user-installed by the last resolve (SPEC_FULL.md §4.4
    /// step 9); the input [`crate::query::PackageQuery::filter_unneeded`] expects.
    pub fn user_installed(&self) -> Result<&SolvableSet, GoalError> {
        self.user_installed.as_ref().ok_or(GoalError::NotResolved)
    }

    /// Why `id` ended up in (or out of) the last resolve's transaction.
    pub fn reason(&self, id: SolvableId) -> Result<Reason, GoalError> {
        if self.transaction.is_none() {
            return Err(GoalError::NotResolved);
        }
        Ok(self.reasons.get(&id).copied().unwrap_or(Reason::Dependency))
    }

    /// Writes a testcase-format dump of the last resolve's transaction or problems
    /// into `dir`. `dir` must be empty or clearable: any files already in it are
    /// removed first (SPEC_FULL.md §6).
    pub fn write_debugdata(&self, dir: impl AsRef<std::path::Path>) -> Result<(), crate::error::PoolError> {
        private::write_debugdata(dir.as_ref(), self.transaction.as_ref(), self.problems.as_ref())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::solvable::{DependencyEdges, PackageData, RepoScope};

    fn add_pkg(pool: &mut Pool, repo: crate::internal::id::RepoId, name: &str, evr: &str) -> SolvableId {
        let name_id = pool.intern_string(name);
        let evr_id = pool.intern_string(evr);
        let arch_id = pool.intern_string("x86_64");
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
    fn install_of_already_installed_is_a_no_op_warning() {
        let mut pool = Pool::new();
        let installed = pool.new_repo("installed", RepoScope::Installed);
        let available = pool.new_repo("available", RepoScope::Available);
        add_pkg(&mut pool, installed, "foo", "1.0-1");
        add_pkg(&mut pool, available, "foo", "1.0-1");

        let mut goal = Goal::new(GoalConfig::default());
        goal.add_install("foo", GoalSettings::default());
        let tx = goal.resolve(&mut pool, false).unwrap();
        assert!(tx.is_empty());
        assert!(goal
            .resolve_log()
            .iter()
            .any(|e| matches!(e, ResolveLogEntry::AlreadyInstalled { spec } if spec == "foo")));
    }

    #[test]
    fn upgrade_picks_the_latest() {
        let mut pool = Pool::new();
        let installed = pool.new_repo("installed", RepoScope::Installed);
        let available = pool.new_repo("available", RepoScope::Available);
        add_pkg(&mut pool, installed, "foo", "1.0-1");
        add_pkg(&mut pool, available, "foo", "1.0-1");
        add_pkg(&mut pool, available, "foo", "1.1-1");
        let latest = add_pkg(&mut pool, available, "foo", "1.2-1");

        let mut goal = Goal::new(GoalConfig::default());
        goal.add_upgrade("foo", GoalSettings::default());
        let tx = goal.resolve(&mut pool, false).unwrap();
        assert!(tx.upgrades().any(|id| id == latest));
    }

    #[test]
    fn unsatisfiable_requirement_surfaces_as_a_problem() {
        let mut pool = Pool::new();
        let available = pool.new_repo("available", RepoScope::Available);

        let missing_name = pool.intern_string("nonexistent");
        let requires = pool.intern_reldep(missing_name, None, crate::internal::id::StringId::NONE);
        let mut edges = DependencyEdges::default();
        edges.requires.push(requires);
        let name = pool.intern_string("app");
        let evr = pool.intern_string("1.0-1");
        let arch = pool.intern_string("x86_64");
        let vendor = pool.intern_string("vendor");
        pool.add_solvable(
            available,
            PackageData {
                repo: available,
                name,
                evr,
                arch,
                vendor,
                edges,
                files: Vec::new(),
                sourcerpm: None,
                location: None,
                summary: None,
                description: None,
                url: None,
                buildtime: 0,
            },
        );

        let mut goal = Goal::new(GoalConfig::default());
        goal.add_install("app", GoalSettings::default());
        let err = goal.resolve(&mut pool, false).unwrap_err();
        assert!(matches!(err, GoalError::SolverError { .. }));
        assert!(goal.problems().is_some_and(|p| !p.is_empty()));
    }

    #[test]
    fn versioned_requires_on_the_same_name_conflict() {
        use crate::reldep::CmpFlag;

        let mut pool = Pool::new();
        let installed = pool.new_repo("installed", RepoScope::Installed);
        let available = pool.new_repo("available", RepoScope::Available);

        let lib_name = pool.intern_string("lib");
        let one = pool.intern_string("1");
        let two = pool.intern_string("2");

        let a_requires_lib_1 = pool.intern_reldep(lib_name, Some(CmpFlag::EQ), one);
        let mut a_edges = DependencyEdges::default();
        a_edges.requires.push(a_requires_lib_1);
        let a_name = pool.intern_string("a");
        let a_evr = pool.intern_string("1.0-1");
        let a_arch = pool.intern_string("x86_64");
        let vendor = pool.intern_string("vendor");
        pool.add_solvable(
            installed,
            PackageData {
                repo: installed,
                name: a_name,
                evr: a_evr,
                arch: a_arch,
                vendor,
                edges: a_edges,
                files: Vec::new(),
                sourcerpm: None,
                location: None,
                summary: None,
                description: None,
                url: None,
                buildtime: 0,
            },
        );

        add_pkg(&mut pool, installed, "lib", "1");
        add_pkg(&mut pool, available, "lib", "2");

        let b_requires_lib_2 = pool.intern_reldep(lib_name, Some(CmpFlag::EQ), two);
        let mut b_edges = DependencyEdges::default();
        b_edges.requires.push(b_requires_lib_2);
        let b_name = pool.intern_string("b");
        let b_evr = pool.intern_string("1.0-1");
        pool.add_solvable(
            available,
            PackageData {
                repo: available,
                name: b_name,
                evr: b_evr,
                arch: a_arch,
                vendor,
                edges: b_edges,
                files: Vec::new(),
                sourcerpm: None,
                location: None,
                summary: None,
                description: None,
                url: None,
                buildtime: 0,
            },
        );

        let mut goal = Goal::new(GoalConfig::default());
        goal.add_install("b", GoalSettings::default());
        let err = goal.resolve(&mut pool, false).unwrap_err();
        assert!(matches!(err, GoalError::SolverError { .. }));
        assert!(goal.problems().is_some_and(|p| !p.is_empty()));
    }

    #[test]
    fn installonly_limit_erases_the_least_preferred_kernel() {
        let mut pool = Pool::new();
        let installed = pool.new_repo("installed", RepoScope::Installed);
        let available = pool.new_repo("available", RepoScope::Available);
        let kernel1 = add_pkg(&mut pool, installed, "kernel", "1");
        let kernel2 = add_pkg(&mut pool, installed, "kernel", "2");
        let kernel3 = add_pkg(&mut pool, available, "kernel", "3");

        let mut config = GoalConfig::default();
        config.installonlypkgs = vec!["kernel".to_string()];
        config.installonly_limit = 2;

        let mut goal = Goal::new(config);
        goal.set_running_kernel(RunningKernel::Solvable(kernel1));
        goal.add_install("kernel", GoalSettings::default());
        let tx = goal.resolve(&mut pool, false).unwrap();

        assert!(tx.installs().any(|id| id == kernel3));
        assert!(tx.erasures().any(|id| id == kernel2));
        assert!(!tx.erasures().any(|id| id == kernel1));
    }
}
