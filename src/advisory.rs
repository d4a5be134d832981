//! Errata/advisory records and the query engine over them.
//!
//! An [`Advisory`] lives in its own flat `Vec` inside [`crate::pool::Pool`] (unlike a
//! package solvable it is never a SAT search variable, so it doesn't need an
//! [`crate::internal::arena::Arena`]-interned id); [`AdvisoryQuery`] is the advisory
//! analogue of [`crate::query::PackageQuery`], filtering that list down to an id
//! subset instead of a [`crate::solvmap::SolvableSet`].

use crate::pool::Pool;
use crate::query::{text_matches, CmpType};
use crate::solvmap::SolvableSet;

/// The kind of change an advisory documents.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum AdvisoryType {
    /// Fixes a functional bug.
    Bugfix,
    /// Adds or improves a feature.
    Enhancement,
    /// Fixes a security issue.
    Security,
    /// Introduces a package that didn't previously exist in the distribution.
    NewPackage,
}

/// Severity of a security advisory; `None` for non-security advisories.
#[derive(Debug, Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Not a security advisory.
    None,
    Low,
    Moderate,
    Important,
    Critical,
}

/// The kind of external tracker a [`Reference`] points at.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ReferenceType {
    Cve,
    Bugzilla,
    Other(String),
}

/// A link from an advisory to an external bug or CVE tracker.
#[derive(Debug, Clone)]
pub struct Reference {
    pub rtype: ReferenceType,
    pub id: String,
    pub title: String,
    pub url: String,
}

/// The nevra of a package an advisory updates. Advisory packages are not solvables:
/// an advisory may reference nevras that were never loaded into any repository.
#[derive(Debug, Clone)]
pub struct AdvisoryPackage {
    pub name: String,
    pub epoch: Option<String>,
    pub version: String,
    pub release: String,
    pub arch: String,
}

/// An errata/advisory record, as loaded by the (external) advisory store.
#[derive(Debug, Clone)]
pub struct Advisory {
    pub name: String,
    pub atype: AdvisoryType,
    pub severity: Severity,
    pub buildtime: u64,
    pub title: String,
    pub vendor: String,
    pub rights: String,
    pub status: String,
    pub message: String,
    pub description: String,
    pub references: Vec<Reference>,
    pub packages: Vec<AdvisoryPackage>,
    /// Whether this advisory is tagged by its loader as recommending a reboot.
    pub reboot_suggested: bool,
}

impl Advisory {
    /// Whether any of this advisory's packages can upgrade something currently
    /// installed (see SPEC_FULL.md §4.3). An advisory with no installed counterpart
    /// (e.g. for software not present on the system) is not applicable.
    pub fn is_applicable(&self, pool: &Pool) -> bool {
        self.packages.iter().any(|pkg| advisory_package_upgrades_something(pool, pkg))
    }
}

fn advisory_package_upgrades_something(pool: &Pool, pkg: &AdvisoryPackage) -> bool {
    let Some(name_id) = pool.find_string(&pkg.name) else {
        return false;
    };
    let Some(installed) = pool.installed_repo() else {
        return false;
    };
    let evr = nevra_evr(pkg);
    pool.packages_named(name_id).iter().any(|&id| {
        let data = pool.solvable(id).package();
        data.repo == installed.id()
            && crate::pool::arch_compatible(pool.lookup_string(data.arch), &pkg.arch)
            && crate::pool::evr::evrcmp(pool.lookup_string(data.evr), &evr) == std::cmp::Ordering::Less
    })
}

fn nevra_evr(pkg: &AdvisoryPackage) -> String {
    let mut evr = String::new();
    if let Some(epoch) = &pkg.epoch {
        evr.push_str(epoch);
        evr.push(':');
    }
    evr.push_str(&pkg.version);
    evr.push('-');
    evr.push_str(&pkg.release);
    evr
}

/// A package set, filter-chain pair over the advisory list, mirroring
/// [`crate::query::PackageQuery`]'s shape.
pub struct AdvisoryQuery<'p> {
    pool: &'p Pool,
    ids: Vec<usize>,
}

impl<'p> AdvisoryQuery<'p> {
    /// A query starting from every advisory in the pool.
    pub fn new(pool: &'p Pool) -> Self {
        Self {
            ids: (0..pool.advisories().len()).collect(),
            pool,
        }
    }

    /// An explicitly empty query.
    pub fn empty(pool: &'p Pool) -> Self {
        Self { ids: Vec::new(), pool }
    }

    fn retain(&mut self, cmp: CmpType, mut matches: impl FnMut(&Advisory) -> bool) {
        let positive: Vec<usize> = self
            .ids
            .iter()
            .copied()
            .filter(|&i| matches(&self.pool.advisories()[i]))
            .collect();
        if cmp.not {
            self.ids.retain(|i| !positive.contains(i));
        } else {
            self.ids = positive;
        }
    }

    /// Keeps advisories whose name matches any of `patterns`.
    pub fn filter_name<'a>(&mut self, patterns: impl IntoIterator<Item = &'a str>, cmp: CmpType) -> &mut Self {
        let patterns: Vec<&str> = patterns.into_iter().collect();
        self.retain(cmp, |a| patterns.iter().any(|p| text_matches(cmp.op, &a.name, p)));
        self
    }

    /// Keeps advisories of the given type.
    pub fn filter_type(&mut self, atype: AdvisoryType, cmp: CmpType) -> &mut Self {
        self.retain(cmp, |a| a.atype == atype);
        self
    }

    /// Keeps advisories at or above the given severity.
    pub fn filter_severity(&mut self, severity: Severity, cmp: CmpType) -> &mut Self {
        self.retain(cmp, |a| a.severity >= severity);
        self
    }

    /// Keeps advisories carrying a reference of `rtype` whose id matches `pattern`.
    pub fn filter_reference(&mut self, rtype: &ReferenceType, pattern: &str, cmp: CmpType) -> &mut Self {
        let rtype = rtype.clone();
        self.retain(cmp, |a| {
            a.references
                .iter()
                .any(|r| r.rtype == rtype && text_matches(cmp.op, &r.id, pattern))
        });
        self
    }

    /// Keeps advisories that reference a package also present in `packages`.
    pub fn filter_packages(&mut self, packages: &crate::query::PackageQuery<'_>) -> &mut Self {
        let pool = self.pool;
        self.retain(CmpType::EQ, |a| {
            a.packages.iter().any(|pkg| {
                pool.find_string(&pkg.name)
                    .map(|name_id| {
                        pool.packages_named(name_id)
                            .iter()
                            .any(|&id| packages.contains(id) && pool.lookup_string(pool.solvable(id).package().arch) == pkg.arch)
                    })
                    .unwrap_or(false)
            })
        });
        self
    }

    /// Keeps only advisories with at least one package applicable to the pool's
    /// installed set (see [`Advisory::is_applicable`]).
    pub fn filter_applicable(&mut self) -> &mut Self {
        let pool = self.pool;
        self.retain(CmpType::EQ, |a| a.is_applicable(pool));
        self
    }

    /// The advisories currently matched.
    pub fn advisories(&self) -> impl Iterator<Item = &'p Advisory> + '_ {
        let pool = self.pool;
        self.ids.iter().map(move |&i| &pool.advisories()[i])
    }

    /// The union of solvables named by any matched advisory's packages.
    pub fn get_solvables(&self) -> SolvableSet {
        let mut set = SolvableSet::empty(self.pool.nsolvables());
        for advisory in self.advisories() {
            for pkg in &advisory.packages {
                if let Some(name_id) = self.pool.find_string(&pkg.name) {
                    for &id in self.pool.packages_named(name_id) {
                        if self.pool.lookup_string(self.pool.solvable(id).package().arch) == pkg.arch {
                            set.add_grow(id);
                        }
                    }
                }
            }
        }
        set
    }

    /// Number of advisories currently matched.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether no advisories are currently matched.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn advisory(name: &str, atype: AdvisoryType, severity: Severity) -> Advisory {
        Advisory {
            name: name.to_string(),
            atype,
            severity,
            buildtime: 0,
            title: String::new(),
            vendor: String::new(),
            rights: String::new(),
            status: String::new(),
            message: String::new(),
            description: String::new(),
            references: Vec::new(),
            packages: Vec::new(),
            reboot_suggested: false,
        }
    }

    #[test]
    fn filter_name_and_type() {
        let mut pool = Pool::new();
        pool.add_advisory(advisory("RHSA-2024:0001", AdvisoryType::Security, Severity::Important));
        pool.add_advisory(advisory("RHBA-2024:0002", AdvisoryType::Bugfix, Severity::None));

        let mut q = AdvisoryQuery::new(&pool);
        q.filter_type(AdvisoryType::Security, CmpType::EQ);
        assert_eq!(q.len(), 1);
        assert_eq!(q.advisories().next().unwrap().name, "RHSA-2024:0001");
    }

    #[test]
    fn filter_severity_is_at_least() {
        let mut pool = Pool::new();
        pool.add_advisory(advisory("a", AdvisoryType::Security, Severity::Low));
        pool.add_advisory(advisory("b", AdvisoryType::Security, Severity::Critical));

        let mut q = AdvisoryQuery::new(&pool);
        q.filter_severity(Severity::Important, CmpType::EQ);
        assert_eq!(q.len(), 1);
    }
}
