//! Incremental compilation workspace
//!
//! The workspace owns the current [`Solution`]. Edits never mutate a snapshot:
//! callers fork the current solution, and [`Workspace::try_apply_changes`]
//! installs the fork only if no other change landed in between. Compilations
//! are computed lazily per snapshot and shared by forks for projects the edit
//! did not touch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

mod handle;
mod solution;

pub use handle::DocumentHandle;
pub use solution::{Project, ProjectId, Solution};

use crate::references::DefaultReferences;

/// Counters for compilations performed by a workspace
#[derive(Debug, Default)]
pub struct CompilationStats {
    total: AtomicU64,
    failed: AtomicU64,
}

impl CompilationStats {
    fn record(
        &self,
        failed: bool,
    ) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if failed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn total_compilations(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }

    pub fn failed_compilations(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn successful_compilations(&self) -> u64 {
        self.total_compilations() - self.failed_compilations()
    }
}

/// Summary of the workspace state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceSummary {
    pub version: u64,
    pub project_count: usize,
    pub total_compilations: u64,
    pub failed_compilations: u64,
}

/// Mutable holder of the current solution
#[derive(Debug)]
pub struct Workspace {
    current: RwLock<Arc<Solution>>,
    next_project: AtomicU64,
    defaults: Arc<DefaultReferences>,
    stats: Arc<CompilationStats>,
}

impl Workspace {
    pub fn new(defaults: Arc<DefaultReferences>) -> Self {
        let stats = Arc::new(CompilationStats::default());
        Self {
            current: RwLock::new(Arc::new(Solution::empty(Arc::clone(&stats)))),
            next_project: AtomicU64::new(1),
            defaults,
            stats,
        }
    }

    /// The Default Reference Set applied to new projects
    pub fn defaults(&self) -> &Arc<DefaultReferences> {
        &self.defaults
    }

    pub fn current_solution(&self) -> Arc<Solution> {
        Arc::clone(&self.current.read())
    }

    /// Allocate an id for a project about to be added
    pub fn new_project_id(&self) -> ProjectId {
        ProjectId(self.next_project.fetch_add(1, Ordering::Relaxed))
    }

    /// Install `solution` if it was forked from the current version
    ///
    /// Returns `false` and leaves the workspace untouched when another change
    /// was applied since the fork was taken.
    pub fn try_apply_changes(
        &self,
        mut solution: Solution,
    ) -> bool {
        let mut current = self.current.write();
        if solution.version() != current.version() {
            debug!(
                "Rejected changes based on version {} (current {})",
                solution.version(),
                current.version()
            );
            return false;
        }
        solution.set_version(current.version() + 1);
        trace!("Applied solution version {}", solution.version());
        *current = Arc::new(solution);
        true
    }

    /// Handle for `id` in the current solution
    pub fn document(
        &self,
        id: ProjectId,
    ) -> DocumentHandle {
        DocumentHandle::new(self.current_solution(), id)
    }

    pub fn stats(&self) -> &CompilationStats {
        &self.stats
    }

    pub fn summary(&self) -> WorkspaceSummary {
        let solution = self.current_solution();
        WorkspaceSummary {
            version: solution.version(),
            project_count: solution.project_count(),
            total_compilations: self.stats.total_compilations(),
            failed_compilations: self.stats.failed_compilations(),
        }
    }
}
