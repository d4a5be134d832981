//! Caller-supplied configuration consumed by [`crate::goal::Goal`].
//!
//! This struct carries no I/O of its own; parsing an on-disk configuration file into
//! one of these is the embedding application's job.

/// How multilib name groups are handled during `add_install`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum MultilibPolicy {
    /// Install every (name, arch) candidate in the matched group.
    All,
    /// Install only the highest-evr candidate per name.
    #[default]
    Best,
}

#[derive(Debug, Clone)]
pub struct GoalConfig {
    pub multilib_policy: MultilibPolicy,
    /// Package names whose multiple versions may coexist (e.g. `kernel`).
    pub installonlypkgs: Vec<String>,
    /// Maximum number of coexisting installonly versions per name; `0` means
    /// unlimited.
    pub installonly_limit: u32,
    /// Honor package splits expressed via `obsoletes`.
    pub obsoletes: bool,
    /// Never schedule the currently running kernel for removal.
    pub protect_running_kernel: bool,
    /// Package names that must never be scheduled for removal.
    pub protected_packages: Vec<String>,
    pub allow_vendor_change: bool,
    /// Whether an install/upgrade job may resolve to a lower evr than what's already
    /// installed. `add_downgrade` bypasses this explicitly regardless of its value.
    pub allow_downgrade: bool,
    /// Attempt to install recommends/supplements as a best-effort augmentation pass.
    pub install_weak_deps: bool,
    /// Prefer the highest available evr (`SOLVER_FORCEBEST`).
    pub best: bool,
    pub clean_requirements_on_remove: bool,
}

impl Default for GoalConfig {
    fn default() -> Self {
        Self {
            multilib_policy: MultilibPolicy::default(),
            installonlypkgs: vec!["kernel".to_string(), "kernel-core".to_string()],
            installonly_limit: 3,
            obsoletes: true,
            protect_running_kernel: true,
            protected_packages: vec!["glibc".to_string(), "rpm".to_string()],
            allow_vendor_change: true,
            allow_downgrade: false,
            install_weak_deps: true,
            best: false,
            clean_requirements_on_remove: true,
        }
    }
}
