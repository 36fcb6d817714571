//! Dependency chain construction
//!
//! Every line becomes its own project. A line's project references the
//! project of the line directly before it, which is how declarations flow
//! down the chain.

use std::sync::Arc;

use super::LineId;
use crate::frontend::parser::SourceKind;
use crate::references::{DefaultReferences, Reference};
use crate::workspace::{Project, ProjectId};

/// Builds line projects with the shared Default Reference Set
#[derive(Debug, Clone)]
pub struct ChainBuilder {
    defaults: Arc<DefaultReferences>,
}

impl ChainBuilder {
    pub fn new(defaults: Arc<DefaultReferences>) -> Self {
        Self { defaults }
    }

    pub fn defaults(&self) -> &Arc<DefaultReferences> {
        &self.defaults
    }

    /// Script project for a newly seen line
    pub fn line_project(
        &self,
        id: ProjectId,
        line_id: LineId,
        code: &str,
        predecessor: Option<ProjectId>,
        extra_references: &[Reference],
    ) -> Project {
        Project::new(
            id,
            format!("Submission{}", line_id),
            code,
            SourceKind::Script,
            Arc::clone(&self.defaults),
            predecessor,
        )
        .with_references(extra_references)
    }

    /// Throwaway regular project sharing a line's dependency edge
    pub fn synthetic_project(
        &self,
        id: ProjectId,
        text: String,
        predecessor: Option<ProjectId>,
        references: impl IntoIterator<Item = Reference>,
    ) -> Project {
        let references: Vec<Reference> = references.into_iter().collect();
        Project::new(
            id,
            "Completion",
            text,
            SourceKind::Regular,
            Arc::clone(&self.defaults),
            predecessor,
        )
        .with_references(&references)
    }
}
