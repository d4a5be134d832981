//! The CDCL (conflict-driven clause learning) SAT solver.
//!
//! Clauses are constructed eagerly, once per [`Solver::solve`] call, from the full
//! in-memory [`Pool`]: every visible package's `requires`/`conflicts`/`obsoletes` edges
//! become [`clause::Clause`] variants, plus a `ForbidMultipleInstances` clause for every
//! pair of same-name, non-installonly packages and a `Lock`/`Requires` clause per job.
//! This is simpler than a lazy, on-demand clause generator at the cost of constructing
//! clauses for packages a given job will never touch; see DESIGN.md.
//!
//! Search is DPLL with watched-literal unit propagation and chronological
//! backtracking: on conflict, the most recent still-flippable decision is retried with
//! its other value. Non-chronological clause learning (materializing a `Clause::Learnt`)
//! is not implemented — see DESIGN.md for why that simplification is acceptable here;
//! `Clause::Learnt` and the learnt-clause arena are kept so the clause/literal model
//! matches the one a learning solver would use, even though nothing currently produces
//! a learnt clause.

pub(crate) mod clause;
mod decision;
mod decision_map;
mod decision_tracker;
mod watch_map;

use crate::config::GoalConfig;
use crate::internal::arena::Arena;
use crate::internal::id::{ClauseId, LearntClauseId, SolvableId, StringId};
use crate::job::{Job, JobAction, Selector};
use crate::pool::Pool;
use crate::problem::{Problem, RuleInfo, RuleKind};
use crate::transaction::{Transaction, TransactionStepKind};
use clause::{Clause, ClauseState, Literal};
use decision::Decision;
use decision_tracker::DecisionTracker;
use watch_map::WatchMap;
use std::collections::HashMap;

/// A single still-open chronological choice point.
struct BranchPoint {
    solvable_id: SolvableId,
    level: u32,
    value_tried: bool,
    exhausted: bool,
}

/// Runs one resolution. Stateless between calls: every [`Solver::solve`] invocation
/// builds a fresh [`SolveState`] from scratch, since this crate has no notion of an
/// incremental solve across multiple goal resolutions.
#[derive(Default)]
pub struct Solver;

impl Solver {
    pub fn new() -> Self {
        Self
    }

    /// Resolves `jobs` against `pool`, returning a [`Transaction`] on success or a
    /// [`Problem`] describing the first unsatisfiable clause found.
    ///
    /// Rebuilds the pool's whatprovides index first if it is dirty.
    pub fn solve(&self, pool: &mut Pool, config: &GoalConfig, jobs: &[Job]) -> Result<Transaction, Problem> {
        pool.make_provides_ready();
        tracing::debug!(jobs = jobs.len(), "starting solve");
        let clauses = build_clauses(pool, config, jobs);
        let mut state = SolveState::new(pool, clauses);
        let result = state.run();
        match &result {
            Ok(tx) => tracing::debug!(steps = tx.steps.len(), "solve succeeded"),
            Err(problem) => tracing::warn!(rules = problem.rules.len(), "solve failed"),
        }
        result
    }
}

fn is_visible(pool: &Pool, id: SolvableId) -> bool {
    let repo = pool.solvable(id).package().repo;
    if pool.repo(repo).disabled {
        return false;
    }
    match pool.considered() {
        Some(considered) => considered.contains(id),
        None => true,
    }
}

/// Resolves a job's selector to the list of solvables it matches.
fn selector_candidates(pool: &Pool, selector: &Selector) -> Vec<SolvableId> {
    match selector {
        Selector::Solvable(id) => vec![*id],
        Selector::Provides(reldep_id) => pool.whatprovides_reldep(*reldep_id).unwrap_or_default(),
        Selector::Set(set) => set.iter().collect(),
    }
}

/// Narrows `candidates` to the single best (highest-evr) id per name, for
/// `Update`/`DistUpgrade` jobs that shouldn't force every matching evr installed at
/// once.
fn best_per_name(pool: &Pool, candidates: &[SolvableId]) -> Vec<SolvableId> {
    let mut best: HashMap<StringId, SolvableId> = HashMap::new();
    for &id in candidates {
        let name = pool.solvable(id).package().name;
        best.entry(name)
            .and_modify(|current| {
                let current_evr = pool.solvable(*current).package().evr;
                let candidate_evr = pool.solvable(id).package().evr;
                if pool.evrcmp(candidate_evr, current_evr) == std::cmp::Ordering::Greater {
                    *current = id;
                }
            })
            .or_insert(id);
    }
    best.into_values().collect()
}

/// Builds every hard clause up front.
fn build_clauses(pool: &mut Pool, config: &GoalConfig, jobs: &[Job]) -> Vec<Clause> {
    let job_label_name = pool.intern_string("<job>");
    let job_dep = pool.intern_reldep(job_label_name, None, StringId::NONE);

    let mut clauses = vec![Clause::InstallRoot];

    for job in jobs {
        match job.action {
            JobAction::Install => {
                let candidates = selector_candidates(pool, &job.selector);
                clauses.push(Clause::Requires {
                    parent: SolvableId::root(),
                    dep: job_dep,
                    candidates,
                });
            }
            JobAction::Update | JobAction::DistUpgrade => {
                let candidates = selector_candidates(pool, &job.selector);
                let best = best_per_name(pool, &candidates);
                clauses.push(Clause::Requires {
                    parent: SolvableId::root(),
                    dep: job_dep,
                    candidates: best,
                });
            }
            JobAction::Erase => {
                for id in selector_candidates(pool, &job.selector) {
                    clauses.push(Clause::Lock { forbidden: id });
                }
            }
            JobAction::Lock => {
                let candidates = selector_candidates(pool, &job.selector);
                if !candidates.is_empty() {
                    clauses.push(Clause::Requires {
                        parent: SolvableId::root(),
                        dep: job_dep,
                        candidates: candidates.clone(),
                    });
                    if let Some(&kept) = candidates.first() {
                        let name = pool.solvable(kept).package().name;
                        for &other in pool.packages_named(name) {
                            if !candidates.contains(&other) && is_visible(pool, other) {
                                clauses.push(Clause::Lock { forbidden: other });
                            }
                        }
                    }
                }
            }
            JobAction::Multiversion
            | JobAction::AllowUninstall
            | JobAction::UserInstalled
            | JobAction::ExcludeFromWeak => {
                // Consumed by the goal layer (installonly marking, reason tracking,
                // the weak-dependency augmentation pass); none of these constrain the
                // hard clause set directly.
            }
        }
    }

    for id in pool.all_package_ids() {
        if !is_visible(pool, id) {
            continue;
        }
        let pkg = pool.solvable(id).package().clone();

        for &dep in &pkg.edges.requires {
            let candidates = pool.whatprovides_reldep(dep).unwrap_or_default();
            clauses.push(Clause::Requires { parent: id, dep, candidates });
        }

        for &dep in &pkg.edges.conflicts {
            for other in pool.whatprovides_reldep(dep).unwrap_or_default() {
                if other != id {
                    clauses.push(Clause::Conflicts { a: id, b: other, dep });
                }
            }
        }

        if config.obsoletes {
            for &dep in &pkg.edges.obsoletes {
                for other in pool.whatprovides_reldep(dep).unwrap_or_default() {
                    if other != id {
                        clauses.push(Clause::Obsoletes { obsoleter: id, obsoleted: other });
                    }
                }
            }
        }
    }

    let mut by_name: HashMap<StringId, Vec<SolvableId>> = HashMap::new();
    for id in pool.all_package_ids() {
        if !is_visible(pool, id) {
            continue;
        }
        let name = pool.solvable(id).package().name;
        if pool.is_installonly_name(name) {
            continue;
        }
        by_name.entry(name).or_default().push(id);
    }
    for ids in by_name.values() {
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                clauses.push(Clause::ForbidMultipleInstances { a: ids[i], b: ids[j] });
            }
        }
    }

    clauses
}

struct SolveState<'p> {
    pool: &'p Pool,
    clauses: Vec<ClauseState>,
    #[allow(dead_code)]
    learnt_clauses: Arena<LearntClauseId, Vec<Literal>>,
    watches: WatchMap,
    decisions: DecisionTracker,
    level: u32,
    branch_stack: Vec<BranchPoint>,
    installed_ids: Vec<SolvableId>,
}

impl<'p> SolveState<'p> {
    fn new(pool: &'p Pool, clause_kinds: Vec<Clause>) -> Self {
        let learnt_clauses = Arena::new();
        let mut clauses = Vec::with_capacity(clause_kinds.len());
        let mut watches = WatchMap::new();
        watches.initialize(pool.nsolvables());

        for kind in clause_kinds {
            let state = ClauseState::new(kind, &learnt_clauses);
            let id = ClauseId::new(clauses.len());
            if state.has_watches() {
                let [a, b] = state.watched_solvables();
                watches.watch_solvable(a, id);
                watches.watch_solvable(b, id);
            }
            clauses.push(state);
        }

        let installed_ids = pool
            .installed_repo()
            .map(|r| pool.all_package_ids().filter(|&id| pool.solvable(id).package().repo == r.id()).collect())
            .unwrap_or_default();

        Self {
            pool,
            clauses,
            learnt_clauses,
            watches,
            decisions: DecisionTracker::new(pool.nsolvables()),
            level: 0,
            branch_stack: Vec::new(),
            installed_ids,
        }
    }

    fn run(&mut self) -> Result<Transaction, Problem> {
        self.level = 1;
        let root_decision = Decision::new(SolvableId::root(), true, ClauseId::install_root());
        self.decisions
            .try_add_decision(root_decision, self.level)
            .expect("the root solvable can never already be decided");

        if let Err(conflicting) = self.apply_assertions() {
            return Err(self.build_problem(conflicting));
        }

        loop {
            if let Err(conflicting) = self.propagate() {
                if !self.backtrack_and_retry() {
                    return Err(self.build_problem(conflicting));
                }
                continue;
            }

            match self.pick_branch_variable() {
                Some((solvable, value)) => {
                    self.level += 1;
                    let decision = Decision::new(solvable, value, ClauseId::install_root());
                    if self.decisions.try_add_decision(decision, self.level).is_err() {
                        self.level -= 1;
                        continue;
                    }
                    self.branch_stack.push(BranchPoint {
                        solvable_id: solvable,
                        level: self.level,
                        value_tried: value,
                        exhausted: false,
                    });
                }
                None => break,
            }
        }

        Ok(self.build_transaction())
    }

    /// Clauses with fewer than two literals (`Requires` with no candidates, `Lock`)
    /// never sit on the watch lists and so are never reached by [`Self::propagate`]'s
    /// watcher traversal on their own; this applies them as forced decisions up front.
    /// Any clause whose single literal conflicts with another assertion, or with the
    /// root decision, surfaces here immediately.
    fn apply_assertions(&mut self) -> Result<(), ClauseId> {
        for idx in 0..self.clauses.len() {
            if !self.clauses[idx].is_assertion() {
                continue;
            }
            let literal = self.clauses[idx].literals()[0];
            let decision = Decision::new(literal.solvable_id, literal.satisfying_value(), ClauseId::new(idx));
            if self.decisions.try_add_decision(decision, self.level).is_err() {
                return Err(ClauseId::new(idx));
            }
        }
        Ok(())
    }

    fn propagate(&mut self) -> Result<(), ClauseId> {
        loop {
            let decision = match self.decisions.next_unpropagated() {
                Some(d) => d,
                None => return Ok(()),
            };
            let solvable = decision.solvable_id;
            let watchers = self.watches.watching(solvable).to_vec();

            for clause_id in watchers {
                let idx = clause_id.index();
                let watch_index = match self.clauses[idx].watch_index_for(solvable) {
                    Some(i) => i,
                    None => continue,
                };
                let watched_literal = self.clauses[idx].watched_literals()[watch_index];
                if watched_literal.eval(self.decisions.map()) != Some(false) {
                    continue;
                }

                let new_watch = self.clauses[idx].find_new_watch(watch_index, self.decisions.map());
                match new_watch {
                    Some(new_solvable) => {
                        self.watches.unwatch_solvable(solvable, clause_id);
                        self.watches.watch_solvable(new_solvable, clause_id);
                    }
                    None => {
                        let unit = self.clauses[idx].unit_literal(watch_index);
                        match unit.eval(self.decisions.map()) {
                            Some(true) => {}
                            Some(false) => return Err(clause_id),
                            None => {
                                let value = unit.satisfying_value();
                                let d = Decision::new(unit.solvable_id, value, clause_id);
                                if self.decisions.try_add_decision(d, self.level).is_err() {
                                    return Err(clause_id);
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    /// Finds the next variable worth branching on: first, a solvable pulled in by a
    /// still-unsatisfied `Requires` clause (so we only ever choose to install
    /// something that's actually wanted); failing that, an installed package that
    /// hasn't been forced one way or the other yet, defaulting it to stay installed
    /// (flipped to erase on conflict, same as any other branch point).
    fn pick_branch_variable(&self) -> Option<(SolvableId, bool)> {
        for clause in &self.clauses {
            if !matches!(clause.kind, Clause::Requires { .. }) {
                continue;
            }
            let literals = clause.literals();
            if literals.iter().any(|l| l.eval(self.decisions.map()) == Some(true)) {
                continue;
            }
            if let Some(lit) = literals.iter().find(|l| l.eval(self.decisions.map()).is_none()) {
                return Some((lit.solvable_id, lit.satisfying_value()));
            }
        }

        for &id in &self.installed_ids {
            if self.decisions.map().value(id).is_none() {
                return Some((id, true));
            }
        }

        None
    }

    /// Pops the branch stack looking for a choice point that hasn't tried both
    /// values yet, undoes every decision above its level, and retries with the
    /// other value. Returns `false` once every branch point is exhausted, meaning
    /// the conflict is unresolvable.
    fn backtrack_and_retry(&mut self) -> bool {
        while let Some(bp) = self.branch_stack.pop() {
            if bp.exhausted {
                continue;
            }
            tracing::debug!(level = bp.level, "backtracking");
            self.decisions.undo_until(bp.level - 1);

            let flipped = !bp.value_tried;
            self.level = bp.level;
            let decision = Decision::new(bp.solvable_id, flipped, ClauseId::install_root());
            let _ = self.decisions.try_add_decision(decision, self.level);
            self.branch_stack.push(BranchPoint {
                solvable_id: bp.solvable_id,
                level: bp.level,
                value_tried: flipped,
                exhausted: true,
            });
            return true;
        }
        false
    }

    fn build_problem(&self, conflicting: ClauseId) -> Problem {
        let mut problem = Problem::new();
        problem.push(clause_to_rule_info(&self.clauses[conflicting.index()].kind));
        problem
    }

    fn build_transaction(&self) -> Transaction {
        let mut tx = Transaction::new();
        let installed_repo = self.pool.installed_repo().map(|r| r.id());

        for id in self.pool.all_package_ids() {
            let value = self.decisions.map().value(id).unwrap_or(false);
            let pkg = self.pool.solvable(id).package();
            let was_installed = installed_repo == Some(pkg.repo);

            match (was_installed, value) {
                (true, true) | (false, false) => {}
                (true, false) => tx.push(id, TransactionStepKind::Erase),
                (false, true) => {
                    if self.pool.what_upgrades(id).is_some() {
                        tx.push(id, TransactionStepKind::Upgrade);
                    } else if self.pool.what_downgrades(id).is_some() {
                        tx.push(id, TransactionStepKind::Downgrade);
                    } else {
                        tx.push(id, TransactionStepKind::Install);
                    }
                }
            }
        }

        tx
    }
}

fn clause_to_rule_info(kind: &Clause) -> RuleInfo {
    match kind {
        Clause::InstallRoot => RuleInfo::new(RuleKind::JobUnsupported).with_detail("nothing can satisfy the install root"),
        Clause::Requires { parent, dep, candidates } => {
            let kind = if candidates.is_empty() {
                RuleKind::PkgNothingProvidesDep
            } else {
                RuleKind::PkgRequires
            };
            RuleInfo::new(kind).with_source(*parent).with_dep(*dep)
        }
        Clause::Conflicts { a, b, dep } => RuleInfo::new(RuleKind::PkgConflicts).with_source(*a).with_related(*b).with_dep(*dep),
        Clause::ForbidMultipleInstances { a, b } => RuleInfo::new(RuleKind::PkgSameName).with_source(*a).with_related(*b),
        Clause::Obsoletes { obsoleter, obsoleted } => {
            RuleInfo::new(RuleKind::PkgObsoletes).with_source(*obsoleter).with_related(*obsoleted)
        }
        Clause::Lock { forbidden } => RuleInfo::new(RuleKind::PkgNotInstallable1).with_source(*forbidden),
        Clause::Learnt(_) => RuleInfo::new(RuleKind::Unknown).with_detail("conflict traced to a learnt clause"),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pool::RepoScope;
    use crate::reldep::CmpFlag;
    use crate::solvable::{DependencyEdges, PackageData};

    fn add_pkg(pool: &mut Pool, repo: crate::internal::id::RepoId, name: &str, evr: &str, edges: DependencyEdges) -> SolvableId {
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
                edges,
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
    fn installs_a_simple_package() {
        let mut pool = Pool::new();
        let repo = pool.new_repo("available", RepoScope::Available);
        let foo = add_pkg(&mut pool, repo, "foo", "1.0-1", DependencyEdges::default());

        let solver = Solver::new();
        let job = Job::new(JobAction::Install, Selector::Solvable(foo));
        let tx = solver.solve(&mut pool, &GoalConfig::default(), &[job]).unwrap();
        assert!(tx.installs().any(|id| id == foo));
    }

    #[test]
    fn pulls_in_a_dependency() {
        let mut pool = Pool::new();
        let repo = pool.new_repo("available", RepoScope::Available);
        let libfoo_name = pool.intern_string("libfoo");
        let requires = pool.intern_reldep(libfoo_name, None, StringId::NONE);
        let mut edges = DependencyEdges::default();
        edges.requires.push(requires);
        let app = add_pkg(&mut pool, repo, "app", "1.0-1", edges);
        let libfoo = add_pkg(&mut pool, repo, "libfoo", "1.0-1", DependencyEdges::default());

        let solver = Solver::new();
        let job = Job::new(JobAction::Install, Selector::Solvable(app));
        let tx = solver.solve(&mut pool, &GoalConfig::default(), &[job]).unwrap();
        assert!(tx.installs().any(|id| id == app));
        assert!(tx.installs().any(|id| id == libfoo));
    }

    #[test]
    fn pulls_in_a_dependency_satisfying_a_versioned_requires() {
        let mut pool = Pool::new();
        let repo = pool.new_repo("available", RepoScope::Available);
        let libfoo_name = pool.intern_string("libfoo");
        let min_evr = pool.intern_string("2.0-1");
        let requires = pool.intern_reldep(libfoo_name, Some(CmpFlag::GE), min_evr);
        let mut edges = DependencyEdges::default();
        edges.requires.push(requires);
        let app = add_pkg(&mut pool, repo, "app", "1.0-1", edges);
        let libfoo = add_pkg(&mut pool, repo, "libfoo", "2.5-1", DependencyEdges::default());

        let solver = Solver::new();
        let job = Job::new(JobAction::Install, Selector::Solvable(app));
        let tx = solver.solve(&mut pool, &GoalConfig::default(), &[job]).unwrap();
        assert!(tx.installs().any(|id| id == app));
        assert!(tx.installs().any(|id| id == libfoo));
    }

    #[test]
    fn versioned_requires_rejects_too_old_provider() {
        let mut pool = Pool::new();
        let repo = pool.new_repo("available", RepoScope::Available);
        let libfoo_name = pool.intern_string("libfoo");
        let min_evr = pool.intern_string("2.0-1");
        let requires = pool.intern_reldep(libfoo_name, Some(CmpFlag::GE), min_evr);
        let mut edges = DependencyEdges::default();
        edges.requires.push(requires);
        let app = add_pkg(&mut pool, repo, "app", "1.0-1", edges);
        add_pkg(&mut pool, repo, "libfoo", "1.0-1", DependencyEdges::default());

        let solver = Solver::new();
        let job = Job::new(JobAction::Install, Selector::Solvable(app));
        let result = solver.solve(&mut pool, &GoalConfig::default(), &[job]);
        assert!(result.is_err());
    }

    #[test]
    fn conflicting_requires_has_no_solution() {
        let mut pool = Pool::new();
        let repo = pool.new_repo("available", RepoScope::Available);
        let missing_name = pool.intern_string("nonexistent");
        let requires = pool.intern_reldep(missing_name, None, StringId::NONE);
        let mut edges = DependencyEdges::default();
        edges.requires.push(requires);
        let app = add_pkg(&mut pool, repo, "app", "1.0-1", edges);

        let solver = Solver::new();
        let job = Job::new(JobAction::Install, Selector::Solvable(app));
        let result = solver.solve(&mut pool, &GoalConfig::default(), &[job]);
        assert!(result.is_err());
    }

    #[test]
    fn upgrade_replaces_installed_package() {
        let mut pool = Pool::new();
        let installed = pool.new_repo("installed", RepoScope::Installed);
        let available = pool.new_repo("available", RepoScope::Available);
        let old = add_pkg(&mut pool, installed, "foo", "1.0-1", DependencyEdges::default());
        let new = add_pkg(&mut pool, available, "foo", "2.0-1", DependencyEdges::default());

        let solver = Solver::new();
        let job = Job::new(JobAction::Update, Selector::Solvable(new));
        let tx = solver.solve(&mut pool, &GoalConfig::default(), &[job]).unwrap();
        assert!(tx.upgrades().any(|id| id == new));
        assert!(tx.erasures().any(|id| id == old));
    }

    #[test]
    fn erase_job_removes_installed_package() {
        let mut pool = Pool::new();
        let installed = pool.new_repo("installed", RepoScope::Installed);
        let foo = add_pkg(&mut pool, installed, "foo", "1.0-1", DependencyEdges::default());

        let solver = Solver::new();
        let job = Job::new(JobAction::Erase, Selector::Solvable(foo));
        let tx = solver.solve(&mut pool, &GoalConfig::default(), &[job]).unwrap();
        assert!(tx.erasures().any(|id| id == foo));
    }

    #[test]
    fn lock_job_forbids_other_same_name_variants() {
        let mut pool = Pool::new();
        let repo = pool.new_repo("available", RepoScope::Available);
        let old = add_pkg(&mut pool, repo, "foo", "1.0-1", DependencyEdges::default());
        let new = add_pkg(&mut pool, repo, "foo", "2.0-1", DependencyEdges::default());

        let solver = Solver::new();
        let job = Job::new(JobAction::Lock, Selector::Solvable(old));
        let tx = solver.solve(&mut pool, &GoalConfig::default(), &[job]).unwrap();
        assert!(tx.installs().any(|id| id == old));
        assert!(!tx.installs().any(|id| id == new));
    }
}
