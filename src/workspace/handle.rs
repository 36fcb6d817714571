//! Handles to a document inside a solution snapshot

use std::sync::Arc;

use super::solution::{Project, ProjectId, Solution};
use crate::frontend::Compilation;
use crate::util::diagnostic::Diagnostic;

/// A project pinned to one solution snapshot
///
/// The handle never changes after creation. An edit produces a new snapshot
/// and therefore a new handle; holders of an old handle keep seeing the text
/// and compilation of their snapshot.
#[derive(Debug, Clone)]
pub struct DocumentHandle {
    solution: Arc<Solution>,
    id: ProjectId,
}

impl DocumentHandle {
    pub fn new(
        solution: Arc<Solution>,
        id: ProjectId,
    ) -> Self {
        Self { solution, id }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn solution(&self) -> &Arc<Solution> {
        &self.solution
    }

    /// The project, or `None` if the snapshot does not contain it
    pub fn project(&self) -> Option<&Arc<Project>> {
        self.solution.project(self.id)
    }

    pub fn text(&self) -> &str {
        self.project().map(|p| p.text()).unwrap_or_default()
    }

    /// The dependency edge of this document
    pub fn project_reference(&self) -> Option<ProjectId> {
        self.project().and_then(|p| p.project_reference())
    }

    pub fn compilation(&self) -> Option<Arc<Compilation>> {
        self.solution.compilation(self.id)
    }

    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.compilation()
            .map(|c| c.diagnostics().cloned().collect())
            .unwrap_or_default()
    }

    /// Predecessor documents oldest first, excluding this one
    pub fn predecessors(&self) -> Vec<DocumentHandle> {
        let mut chain = self.solution.chain(self.id);
        chain.pop();
        chain
            .into_iter()
            .map(|id| DocumentHandle::new(Arc::clone(&self.solution), id))
            .collect()
    }
}
