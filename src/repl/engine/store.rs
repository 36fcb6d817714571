//! Submission store
//!
//! Maps line identifiers to their current [`SourceUnit`]. The first request
//! for a line creates its project; later requests replace the project's text.
//! Neither path fails: compilation problems surface later, as diagnostics of
//! the unit's compilation.

use std::sync::Arc;

use tracing::{debug, warn};

use super::chain::ChainBuilder;
use super::shard::ShardedMap;
use super::LineId;
use crate::frontend::Compilation;
use crate::references::Reference;
use crate::workspace::{DocumentHandle, ProjectId, Solution, Workspace};

/// Edit attempts before falling back to whatever state is current
const MAX_APPLY_ATTEMPTS: usize = 3;

/// One line's code and its compiled handle
#[derive(Debug, Clone)]
pub struct SourceUnit {
    line_id: LineId,
    handle: DocumentHandle,
}

impl SourceUnit {
    pub fn line_id(&self) -> LineId {
        self.line_id
    }

    /// Code as seen by the handle's snapshot
    pub fn code(&self) -> &str {
        self.handle.text()
    }

    pub fn handle(&self) -> &DocumentHandle {
        &self.handle
    }

    pub fn project_id(&self) -> ProjectId {
        self.handle.id()
    }

    pub fn compilation(&self) -> Option<Arc<Compilation>> {
        self.handle.compilation()
    }

    /// Whether the unit has a dependency edge
    pub fn has_predecessor(&self) -> bool {
        self.handle.project_reference().is_some()
    }
}

/// Concurrent line-id to unit mapping over a shared workspace
pub struct SubmissionStore {
    units: ShardedMap<LineId, SourceUnit>,
    workspace: Arc<Workspace>,
    chain: ChainBuilder,
}

impl SubmissionStore {
    pub fn new(workspace: Arc<Workspace>) -> Self {
        let chain = ChainBuilder::new(Arc::clone(workspace.defaults()));
        Self {
            units: ShardedMap::new(),
            workspace,
            chain,
        }
    }

    pub fn workspace(&self) -> &Arc<Workspace> {
        &self.workspace
    }

    pub fn chain_builder(&self) -> &ChainBuilder {
        &self.chain
    }

    pub fn get(
        &self,
        line_id: LineId,
    ) -> Option<SourceUnit> {
        self.units.get(&line_id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Every stored unit ordered by line id
    pub fn lines(&self) -> Vec<SourceUnit> {
        let mut units: Vec<SourceUnit> = self.units.entries().into_iter().map(|(_, u)| u).collect();
        units.sort_by_key(SourceUnit::line_id);
        units
    }

    /// Create the unit for an unseen line or replace the text of a known one
    ///
    /// References accumulate: `extra_references` are added to whatever the
    /// line already has and are never removed.
    pub fn create_or_update(
        &self,
        line_id: LineId,
        code: &str,
        extra_references: &[Reference],
    ) -> SourceUnit {
        // read the predecessor before taking this line's shard lock
        let predecessor = line_id
            .predecessor()
            .and_then(|p| self.units.get(&p))
            .map(|unit| unit.project_id());

        self.units.upsert_with(line_id, |existing| match existing {
            Some(unit) => self.update(unit, code, extra_references),
            None => self.create(line_id, code, predecessor, extra_references),
        })
    }

    fn create(
        &self,
        line_id: LineId,
        code: &str,
        predecessor: Option<ProjectId>,
        extra_references: &[Reference],
    ) -> SourceUnit {
        let id = self.workspace.new_project_id();
        // a rejected apply means another change landed, so this loop always makes progress
        loop {
            let base = self.workspace.current_solution();
            let project = self
                .chain
                .line_project(id, line_id, code, predecessor, extra_references);
            if self.workspace.try_apply_changes(base.with_project(project)) {
                break;
            }
        }
        debug!(
            "Created line {} as project {} (predecessor: {:?})",
            line_id, id, predecessor
        );

        SourceUnit {
            line_id,
            handle: self.workspace.document(id),
        }
    }

    fn update(
        &self,
        unit: &SourceUnit,
        code: &str,
        extra_references: &[Reference],
    ) -> SourceUnit {
        self.update_with(unit, code, extra_references, |fork| {
            self.workspace.try_apply_changes(fork)
        })
    }

    /// Edit `unit`, installing each attempted fork through `apply`
    pub(super) fn update_with(
        &self,
        unit: &SourceUnit,
        code: &str,
        extra_references: &[Reference],
        mut apply: impl FnMut(Solution) -> bool,
    ) -> SourceUnit {
        let id = unit.project_id();
        let mut applied = false;

        for attempt in 1..=MAX_APPLY_ATTEMPTS {
            let base = self.workspace.current_solution();
            let Some(project) = base.project(id) else {
                break;
            };
            let unchanged = project.text() == code
                && extra_references
                    .iter()
                    .all(|r| project.references().contains(r));
            if unchanged {
                applied = true;
                break;
            }
            let Some(fork) = base.with_document_text(id, code, extra_references) else {
                break;
            };
            if apply(fork) {
                applied = true;
                break;
            }
            debug!("Edit of line {} lost a race (attempt {})", unit.line_id, attempt);
        }

        if applied {
            debug!("Updated line {} ({} bytes)", unit.line_id, code.len());
        } else {
            warn!(
                "Could not apply edit to line {}, continuing with the current state",
                unit.line_id
            );
        }

        // requery regardless of the outcome so the handle matches the latest snapshot
        SourceUnit {
            line_id: unit.line_id,
            handle: self.workspace.document(id),
        }
    }
}
