//! The private solver driver (SPEC_FULL.md §4.5): translates buffered specs into a
//! job stream, invokes [`crate::solver::Solver`], and maps its decisions back into a
//! [`Transaction`] or [`Problem`] report. Split out from [`super::Goal`] so the public
//! surface - the spec buffer and its accessors - stays free of the job-translation
//! mechanics; nothing here is reachable from outside the crate.

use super::{BufferedSpec, Intent, Reason, ResolveLogEntry, RunningKernel, Target};
use crate::config::{GoalConfig, MultilibPolicy};
use crate::internal::id::{RepoId, SolvableId, StringId};
use crate::job::{Job, JobAction, Selector};
use itertools::Itertools;
use crate::pool::nevra::{Nevra, NevraForm};
use crate::pool::Pool;
use crate::problem::{Problem, RuleInfo, RuleKind};
use crate::query::{CmpType, PackageQuery};
use crate::solvmap::SolvableSet;
use crate::solver::Solver;
use crate::transaction::{Transaction, TransactionStepKind};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::Path;

pub(super) struct ResolveOutput {
    pub(super) transaction: Transaction,
    pub(super) log: Vec<ResolveLogEntry>,
    pub(super) reasons: HashMap<SolvableId, Reason>,
    pub(super) user_installed: SolvableSet,
}

pub(super) enum GoalFailure {
    Solver { problem: Problem, log: Vec<ResolveLogEntry> },
}

pub(super) struct GoalPrivate<'a> {
    config: &'a GoalConfig,
    running_kernel: RunningKernel,
    protected_packages: &'a [String],
}

impl<'a> GoalPrivate<'a> {
    pub(super) fn new(config: &'a GoalConfig, running_kernel: RunningKernel, protected_packages: &'a [String]) -> Self {
        Self {
            config,
            running_kernel,
            protected_packages,
        }
    }

    /// SPEC_FULL.md §4.4 `resolve`, steps 1-11.
    pub(super) fn resolve(
        &self,
        pool: &mut Pool,
        specs: &[BufferedSpec],
        allow_erasing: bool,
    ) -> Result<ResolveOutput, GoalFailure> {
        // Steps 1-2: reset happens in `Goal::resolve`; recompute installonly names and
        // the provides index here, since both can have gone stale since the last solve.
        let installonly_names: Vec<StringId> = self.config.installonlypkgs.iter().map(|n| pool.intern_string(n)).collect();
        pool.set_installonly(installonly_names);
        pool.set_allow_vendor_change(self.config.allow_vendor_change);
        pool.make_provides_ready();

        let mut log = Vec::new();
        let mut jobs = Vec::new();
        let mut user_installed = SolvableSet::empty(pool.nsolvables());
        let mut reinstall_requested = Vec::new();

        // Step 3-4: translate every buffered spec into one or more jobs.
        for spec in specs {
            self.translate_spec(pool, spec, &mut jobs, &mut log, &mut user_installed, &mut reinstall_requested);
        }

        // Step 9: mark user-installed solvables, as a real job the solver could one
        // day read, not just an internal side channel.
        if !user_installed.is_empty() {
            jobs.push(Job::new(JobAction::UserInstalled, Selector::Set(user_installed.clone())));
        }

        // Step 6: protected packages and the running kernel.
        let protected = self.protected_set(pool);

        // Step 8: allow erasing any non-protected installed solvable.
        if allow_erasing {
            if let Some(installed) = pool.installed_repo() {
                let installed_id = installed.id();
                for id in pool.all_package_ids() {
                    if pool.solvable(id).package().repo == installed_id && !protected.contains(id) {
                        jobs.push(Job::new(JobAction::AllowUninstall, Selector::Solvable(id)));
                    }
                }
            }
        }

        if self.config.protect_running_kernel {
            if let RunningKernel::Solvable(id) = self.running_kernel {
                jobs.push(Job::new(JobAction::Lock, Selector::Solvable(id)));
            }
        }

        let solver = Solver::new();
        let transaction = match solver.solve(pool, self.config, &jobs) {
            Ok(tx) => tx,
            Err(problem) => return Err(GoalFailure::Solver { problem, log }),
        };

        // Step 10: trim installonly overflows and re-solve if needed.
        let transaction = self.trim_installonly(pool, &mut jobs, transaction).map_err(|problem| GoalFailure::Solver {
            problem,
            log: log.clone(),
        })?;

        // SPEC_FULL.md §4.5.1: best-effort weak-dependency augmentation.
        let (mut transaction, weak_installed) = if self.config.install_weak_deps {
            self.augment_weak_deps(pool, &jobs, transaction)
        } else {
            (transaction, HashSet::new())
        };

        // Reinstall is modeled at the goal layer: re-applying an already-satisfied
        // install job is a no-op for the hard clause set, so synthesize the step here.
        self.synthesize_reinstalls(pool, &reinstall_requested, &mut transaction);

        // Step 11: classify + protected-package check.
        if let Some(problem) = self.check_protected(pool, &transaction, &protected) {
            return Err(GoalFailure::Solver { problem, log });
        }

        let clean_targets = Self::clean_deps_targets(&jobs);
        let reasons = self.attribute_reasons(&transaction, &user_installed, &weak_installed, &clean_targets);

        Ok(ResolveOutput {
            transaction,
            log,
            reasons,
            user_installed,
        })
    }

    fn scoped_query<'p>(&self, pool: &'p Pool, settings: &super::GoalSettings) -> PackageQuery<'p> {
        let mut query = PackageQuery::new(pool);
        if !settings.to_repo_ids.is_empty() {
            query.filter_repo_id(settings.to_repo_ids.iter().map(String::as_str), CmpType::EQ);
        }
        if !settings.from_repo_ids.is_empty() {
            query.filter_from_repo_id(settings.from_repo_ids.iter().map(String::as_str), CmpType::EQ);
        }
        query
    }

    /// Parses `text` as a reldep and matches it against `whatprovides_reldep`, for
    /// specs [`crate::query::PackageQuery::resolve_pkg_spec`] can't resolve itself
    /// since it only borrows the pool immutably and can't intern a new reldep string.
    fn try_provides_fallback(&self, pool: &mut Pool, text: &str, settings: &super::GoalSettings) -> Option<SolvableSet> {
        if !settings.with_provides {
            return None;
        }
        let reldep_id = pool.parse_rich_reldep(text).ok()?;
        pool.make_provides_ready();
        let providers = pool.whatprovides_reldep(reldep_id).ok()?;
        if providers.is_empty() {
            return None;
        }
        let mut set = SolvableSet::empty(pool.nsolvables());
        for id in providers {
            set.add_grow(id);
        }
        Some(set)
    }

    fn is_already_satisfied(&self, pool: &Pool, set: &SolvableSet) -> bool {
        let Some(installed) = pool.installed_repo() else {
            return false;
        };
        !set.is_empty()
            && set.iter().all(|id| {
                let pkg = pool.solvable(id).package();
                pool.packages_named(pkg.name).iter().any(|&other| {
                    let other_pkg = pool.solvable(other).package();
                    other_pkg.repo == installed.id() && other_pkg.arch == pkg.arch && pool.evrcmp(other_pkg.evr, pkg.evr) == Ordering::Equal
                })
            })
    }

    fn translate_spec(
        &self,
        pool: &mut Pool,
        spec: &BufferedSpec,
        jobs: &mut Vec<Job>,
        log: &mut Vec<ResolveLogEntry>,
        user_installed: &mut SolvableSet,
        reinstall_requested: &mut Vec<SolvableId>,
    ) {
        match &spec.target {
            Target::Pkg(id) => {
                if matches!(spec.intent, Intent::Install | Intent::Reinstall | Intent::InstallOrReinstall) {
                    user_installed.add_grow(*id);
                }
                if matches!(spec.intent, Intent::Reinstall | Intent::InstallOrReinstall) {
                    reinstall_requested.push(*id);
                }
                let mut set = SolvableSet::empty(pool.nsolvables());
                set.add_grow(*id);
                self.split_and_push(pool, spec, set, jobs);
            }
            Target::Set(set) => {
                if matches!(spec.intent, Intent::Install | Intent::Reinstall | Intent::InstallOrReinstall) {
                    for id in set.iter() {
                        user_installed.add_grow(id);
                    }
                }
                if matches!(spec.intent, Intent::Reinstall | Intent::InstallOrReinstall) {
                    reinstall_requested.extend(set.iter());
                }
                self.split_and_push(pool, spec, set.clone(), jobs);
            }
            Target::AllInstalled => {
                let mut query = self.scoped_query(pool, &spec.settings);
                query.filter_installed();
                let set = query.set().clone();
                self.split_and_push(pool, spec, set, jobs);
            }
            Target::Spec(text) => {
                if spec.intent == Intent::ProvideInstall {
                    match pool.parse_rich_reldep(text) {
                        Ok(reldep_id) => {
                            pool.make_provides_ready();
                            let providers = pool.whatprovides_reldep(reldep_id).unwrap_or_default();
                            for id in &providers {
                                user_installed.add_grow(*id);
                            }
                            jobs.push(Job::new(JobAction::Install, Selector::Provides(reldep_id)));
                        }
                        Err(_) => log.push(ResolveLogEntry::NotFound { spec: text.clone() }),
                    }
                    return;
                }

                let matched_set = {
                    let mut query = self.scoped_query(pool, &spec.settings);
                    let (matched, _nevra) = query.resolve_pkg_spec(text, &spec.settings.spec_settings());
                    matched.then(|| query.set().clone())
                };
                let matched_set = matched_set.or_else(|| self.try_provides_fallback(pool, text, &spec.settings));

                let Some(set) = matched_set else {
                    log.push(self.not_found_entry(pool, spec.intent, text));
                    return;
                };

                if matches!(spec.intent, Intent::Install | Intent::InstallOrReinstall) && self.is_already_satisfied(pool, &set) {
                    log.push(ResolveLogEntry::AlreadyInstalled { spec: text.clone() });
                }
                if spec.intent == Intent::Remove {
                    let Some(installed) = pool.installed_repo() else {
                        log.push(ResolveLogEntry::NotInstalled { spec: text.clone() });
                        return;
                    };
                    if !set.iter().any(|id| pool.solvable(id).package().repo == installed.id()) {
                        log.push(ResolveLogEntry::NotInstalled { spec: text.clone() });
                        return;
                    }
                }

                if matches!(spec.intent, Intent::Install | Intent::Reinstall | Intent::InstallOrReinstall) {
                    for id in set.iter() {
                        user_installed.add_grow(id);
                    }
                }
                if matches!(spec.intent, Intent::Reinstall | Intent::InstallOrReinstall) {
                    reinstall_requested.extend(set.iter());
                }

                self.split_and_push(pool, spec, set, jobs);
            }
        }
    }

    fn not_found_entry(&self, pool: &Pool, intent: Intent, spec: &str) -> ResolveLogEntry {
        let name_id = Nevra::parse_as(spec, NevraForm::N)
            .and_then(|n| n.name)
            .and_then(|n| pool.find_string(&n));
        let Some(name_id) = name_id else {
            return ResolveLogEntry::NotFound { spec: spec.to_string() };
        };

        let installed_repo = pool.installed_repo().map(|r| r.id());
        let candidates = pool.packages_named(name_id);
        let any_installed = candidates.iter().any(|&id| Some(pool.solvable(id).package().repo) == installed_repo);
        let any_available = candidates.iter().any(|&id| Some(pool.solvable(id).package().repo) != installed_repo);

        match intent {
            Intent::Remove if !any_installed => ResolveLogEntry::NotInstalled { spec: spec.to_string() },
            _ if any_installed && !any_available => ResolveLogEntry::NotAvailable { spec: spec.to_string() },
            _ if !any_installed && any_available => ResolveLogEntry::NotFoundInRepositories { spec: spec.to_string() },
            _ if any_installed && any_available => ResolveLogEntry::InstalledInDifferentVersion { spec: spec.to_string() },
            _ => ResolveLogEntry::NotFound { spec: spec.to_string() },
        }
    }

    /// SPEC_FULL.md §4.4 step 4: split a matched set into one or more install jobs
    /// along `multilib_policy`, or translate every other intent to its job action.
    fn split_and_push(&self, pool: &Pool, spec: &BufferedSpec, set: SolvableSet, jobs: &mut Vec<Job>) {
        if set.is_empty() {
            return;
        }
        match spec.intent {
            Intent::Install | Intent::InstallOrReinstall => {
                let set = if self.config.allow_downgrade { set } else { self.drop_downgrades(pool, set) };
                self.push_install_groups(pool, &spec.settings, &set, jobs);
            }
            Intent::Remove => {
                for id in set.iter() {
                    jobs.push(Job::new(JobAction::Erase, Selector::Solvable(id)).clean_deps(spec.settings.clean_requirements_on_remove));
                }
            }
            Intent::Upgrade => {
                jobs.push(Job::new(JobAction::Update, Selector::Set(set)).force_best(spec.settings.best));
            }
            Intent::Downgrade => {
                jobs.push(Job::new(JobAction::Install, Selector::Set(set)));
            }
            Intent::DistroSync => {
                jobs.push(Job::new(JobAction::DistUpgrade, Selector::Set(set)).force_best(spec.settings.best));
            }
            Intent::Reinstall => {
                for id in set.iter() {
                    jobs.push(Job::new(JobAction::Install, Selector::Solvable(id)).force_best(spec.settings.best));
                }
            }
            Intent::ProvideInstall => unreachable!("handled in translate_spec"),
        }
    }

    /// Drops candidates that would downgrade something installed, honoring
    /// `config.allow_downgrade == false` for plain install/install-or-reinstall jobs
    /// (`add_downgrade` bypasses this by construction: it never calls this helper).
    fn drop_downgrades(&self, pool: &Pool, set: SolvableSet) -> SolvableSet {
        let mut query = PackageQuery::from_set(pool, set);
        let downgrades = {
            let mut d = query.clone();
            d.filter_downgrades();
            d.set().clone()
        };
        query.difference_with(&PackageQuery::from_set(pool, downgrades));
        query.set().clone()
    }

    fn push_install_groups(&self, pool: &Pool, settings: &super::GoalSettings, set: &SolvableSet, jobs: &mut Vec<Job>) {
        match self.config.multilib_policy {
            MultilibPolicy::All => {
                let groups: HashMap<(StringId, StringId), Vec<SolvableId>> =
                    set.iter().into_group_map_by(|&id| {
                        let pkg = pool.solvable(id).package();
                        (pkg.name, pkg.arch)
                    });
                for ids in groups.into_values() {
                    let mut group = SolvableSet::empty(pool.nsolvables());
                    for id in ids {
                        group.add(id);
                    }
                    jobs.push(Job::new(JobAction::Install, Selector::Set(group)).force_best(settings.best));
                }
            }
            MultilibPolicy::Best => {
                let by_name: HashMap<StringId, Vec<SolvableId>> = set.iter().into_group_map_by(|&id| pool.solvable(id).package().name);
                for ids in by_name.into_values() {
                    let best_evr = ids.iter().map(|&id| pool.solvable(id).package().evr).max_by(|&a, &b| pool.evrcmp(a, b));
                    let mut group = SolvableSet::empty(pool.nsolvables());
                    for id in ids {
                        if Some(pool.solvable(id).package().evr) == best_evr {
                            group.add(id);
                        }
                    }
                    jobs.push(Job::new(JobAction::Install, Selector::Set(group)).force_best(settings.best));
                }
            }
        }
    }

    fn protected_set(&self, pool: &Pool) -> SolvableSet {
        let mut set = SolvableSet::empty(pool.nsolvables());
        for name in self.protected_packages {
            if let Some(name_id) = pool.find_string(name) {
                for &id in pool.packages_named(name_id) {
                    set.add_grow(id);
                }
            }
        }
        if self.config.protect_running_kernel {
            if let RunningKernel::Solvable(id) = self.running_kernel {
                set.add_grow(id);
            }
        }
        set
    }

    fn check_protected(&self, pool: &Pool, tx: &Transaction, protected: &SolvableSet) -> Option<Problem> {
        let violators: Vec<SolvableId> = tx.erasures().filter(|id| protected.contains(*id)).collect();
        if violators.is_empty() {
            return None;
        }
        let mut problem = Problem::new();
        for id in violators {
            problem.push(
                RuleInfo::new(RuleKind::Job)
                    .with_source(id)
                    .with_detail(format!("{} is protected and cannot be removed", pool.full_nevra(id))),
            );
        }
        Some(problem)
    }

    /// SPEC_FULL.md §4.4 step 10: if an installonly name ended up with more
    /// coexisting solvables than `installonly_limit` allows, erase the least
    /// preferred ones and re-solve.
    fn trim_installonly(&self, pool: &mut Pool, jobs: &mut Vec<Job>, transaction: Transaction) -> Result<Transaction, Problem> {
        let limit = self.config.installonly_limit as usize;
        if limit == 0 {
            return Ok(transaction);
        }

        let installed_repo = pool.installed_repo().map(|r| r.id());
        let ends_up_installed = |id: SolvableId| -> bool {
            let is_change = transaction.steps.iter().find(|s| s.solvable == id).map(|s| s.kind);
            match is_change {
                Some(TransactionStepKind::Erase) | Some(TransactionStepKind::Obsoleted) => false,
                Some(_) => true,
                None => Some(pool.solvable(id).package().repo) == installed_repo,
            }
        };

        let mut by_name: HashMap<StringId, Vec<SolvableId>> = HashMap::new();
        for id in pool.all_package_ids() {
            let name = pool.solvable(id).package().name;
            if !pool.is_installonly_name(name) || !ends_up_installed(id) {
                continue;
            }
            by_name.entry(name).or_default().push(id);
        }

        let mut extra_erase_ids = Vec::new();
        for ids in by_name.values() {
            if ids.len() <= limit {
                continue;
            }
            let mut ranked = ids.clone();
            ranked.sort_by(|&a, &b| self.installonly_rank(pool, installed_repo, a, b));
            extra_erase_ids.extend_from_slice(&ranked[limit..]);
        }

        if extra_erase_ids.is_empty() {
            return Ok(transaction);
        }

        for id in extra_erase_ids {
            jobs.push(Job::new(JobAction::Erase, Selector::Solvable(id)));
        }
        Solver::new().solve(pool, self.config, jobs)
    }

    /// Ascending = most preferred to keep. The running kernel always wins; ties
    /// break on evr (descending - newer preferred), then on whether the candidate
    /// is already installed.
    fn installonly_rank(&self, pool: &Pool, installed_repo: Option<RepoId>, a: SolvableId, b: SolvableId) -> Ordering {
        let a_running = self.running_kernel == RunningKernel::Solvable(a);
        let b_running = self.running_kernel == RunningKernel::Solvable(b);
        b_running.cmp(&a_running).then_with(|| {
            let pkg_a = pool.solvable(a).package();
            let pkg_b = pool.solvable(b).package();
            pool.evrcmp(pkg_b.evr, pkg_a.evr).then_with(|| {
                let a_installed = Some(pkg_a.repo) == installed_repo;
                let b_installed = Some(pkg_b.repo) == installed_repo;
                b_installed.cmp(&a_installed)
            })
        })
    }

    /// SPEC_FULL.md §4.5.1: recommends/supplements are never hard clauses, so a
    /// missing one never makes the goal unsatisfiable. After the hard search
    /// succeeds, try installing each weak candidate of every newly-installed
    /// solvable on top of the jobs already accepted; keep it if the re-solve still
    /// succeeds, drop it otherwise. Returns the accepted transaction together with
    /// the ids that were only pulled in through this weak pass, so
    /// [`Self::attribute_reasons`] can report them as `Reason::WeakDependency`
    /// instead of the plain `Dependency` a hard-clause pull would get.
    fn augment_weak_deps(&self, pool: &mut Pool, base_jobs: &[Job], transaction: Transaction) -> (Transaction, HashSet<SolvableId>) {
        let mut candidates = Vec::new();
        for id in transaction.installs().chain(transaction.upgrades()).chain(transaction.downgrades()) {
            let edges = pool.solvable(id).package().edges.clone();
            for &dep in &edges.recommends {
                candidates.extend(pool.whatprovides_reldep(dep).unwrap_or_default());
            }
        }
        let candidates: Vec<SolvableId> = candidates.into_iter().unique().collect();

        let mut accepted_jobs = base_jobs.to_vec();
        let mut best = transaction;
        let mut weak_installed = HashSet::new();
        for id in candidates {
            if best.steps.iter().any(|s| s.solvable == id) {
                continue;
            }
            let mut trial_jobs = accepted_jobs.clone();
            trial_jobs.push(Job::new(JobAction::Install, Selector::Solvable(id)).weak(true));
            if let Ok(retried) = Solver::new().solve(pool, self.config, &trial_jobs) {
                accepted_jobs = trial_jobs;
                best = retried;
                weak_installed.insert(id);
            }
        }
        (best, weak_installed)
    }

    /// Reinstall isn't a distinct solver clause: asking for an already-satisfied
    /// install is a no-op for the hard clause set, so the base solve produces no
    /// transaction step at all for it. Synthesize the `Reinstall` step here for
    /// every explicitly requested id that stayed installed.
    fn synthesize_reinstalls(&self, pool: &Pool, requested: &[SolvableId], transaction: &mut Transaction) {
        let Some(installed_repo) = pool.installed_repo().map(|r| r.id()) else {
            return;
        };
        for &id in requested {
            if pool.solvable(id).package().repo == installed_repo && !transaction.steps.iter().any(|s| s.solvable == id) {
                transaction.push(id, TransactionStepKind::Reinstall);
            }
        }
    }

    /// The ids targeted by an `Erase` job with `clean_deps` set, gathered from the
    /// final job stream. `Group` is still out of reach (it needs a comps/environment
    /// group reason the goal layer never threads through), but `User`/`Dependency`/
    /// `WeakDependency`/`Clean` (SPEC_FULL.md §4.5) are all recoverable from jobs the
    /// goal itself built.
    fn clean_deps_targets(jobs: &[Job]) -> HashSet<SolvableId> {
        let mut targets = HashSet::new();
        for job in jobs {
            if job.action != JobAction::Erase || !job.flags.clean_deps {
                continue;
            }
            match &job.selector {
                Selector::Solvable(id) => {
                    targets.insert(*id);
                }
                Selector::Set(set) => targets.extend(set.iter()),
                Selector::Provides(_) => {}
            }
        }
        targets
    }

    /// A scoped-down attribution: the solver keeps no per-decision clause provenance,
    /// so `Group` (SPEC_FULL.md §4.5) stays out of reach. `User`/`WeakDependency`/
    /// `Clean` are recovered from the goal-layer side channels that know about them;
    /// everything else defaults to `Dependency`.
    fn attribute_reasons(
        &self,
        tx: &Transaction,
        user_installed: &SolvableSet,
        weak_installed: &HashSet<SolvableId>,
        clean_targets: &HashSet<SolvableId>,
    ) -> HashMap<SolvableId, Reason> {
        tx.steps
            .iter()
            .map(|step| {
                let reason = if clean_targets.contains(&step.solvable) && step.kind == TransactionStepKind::Erase {
                    Reason::Clean
                } else if weak_installed.contains(&step.solvable) {
                    Reason::WeakDependency
                } else if user_installed.contains(step.solvable) {
                    Reason::User
                } else {
                    Reason::Dependency
                };
                (step.solvable, reason)
            })
            .collect()
    }
}

/// SPEC_FULL.md §6: writes a testcase-format dump into `dir`, clearing any files
/// already there first.
pub(super) fn write_debugdata(dir: &Path, transaction: Option<&Transaction>, problems: Option<&Problem>) -> Result<(), crate::error::PoolError> {
    use std::fs;

    let io_err = |e: std::io::Error| crate::error::PoolError::DebugWriteFailed(e.to_string());
    fs::create_dir_all(dir).map_err(io_err)?;
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.path().is_file() {
            fs::remove_file(entry.path()).map_err(io_err)?;
        }
    }

    let mut out = String::new();
    if let Some(tx) = transaction {
        out.push_str("# transaction\n");
        for step in &tx.steps {
            out.push_str(&format!("{:?} {:?}\n", step.kind, step.solvable));
        }
    }
    if let Some(problem) = problems {
        out.push_str("# problems\n");
        for rule in &problem.rules {
            out.push_str(&format!("{:?}\n", rule.kind));
        }
    }
    fs::write(dir.join("testcase.txt"), out).map_err(io_err)
}
