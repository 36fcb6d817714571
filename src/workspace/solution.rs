//! Immutable solution snapshots

use std::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use indexmap::IndexSet;
use once_cell::sync::OnceCell;
use serde::Serialize;

use super::CompilationStats;
use crate::frontend::parser::SourceKind;
use crate::frontend::semantic::BindContext;
use crate::frontend::Compilation;
use crate::references::{DefaultReferences, Reference};

/// Identity of a project inside a workspace; stable across edits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProjectId(pub u64);

impl fmt::Display for ProjectId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One compilation unit: a single document plus its references
#[derive(Debug)]
pub struct Project {
    id: ProjectId,
    name: String,
    text: Arc<str>,
    kind: SourceKind,
    references: IndexSet<Reference>,
    defaults: Arc<DefaultReferences>,
    /// Dependency edge to the predecessor project
    project_reference: Option<ProjectId>,
    compilation: OnceCell<Arc<Compilation>>,
}

impl Project {
    pub fn new(
        id: ProjectId,
        name: impl Into<String>,
        text: impl Into<Arc<str>>,
        kind: SourceKind,
        defaults: Arc<DefaultReferences>,
        project_reference: Option<ProjectId>,
    ) -> Self {
        let references = defaults.references.iter().cloned().collect();
        Self {
            id,
            name: name.into(),
            text: text.into(),
            kind,
            references,
            defaults,
            project_reference,
            compilation: OnceCell::new(),
        }
    }

    /// Add references on top of the defaults
    pub fn with_references<'r>(
        mut self,
        references: impl IntoIterator<Item = &'r Reference>,
    ) -> Self {
        self.references.extend(references.into_iter().cloned());
        self
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }

    pub fn references(&self) -> &IndexSet<Reference> {
        &self.references
    }

    pub fn project_reference(&self) -> Option<ProjectId> {
        self.project_reference
    }

    /// Compilation if it has already been computed in this snapshot
    pub fn cached_compilation(&self) -> Option<&Arc<Compilation>> {
        self.compilation.get()
    }

    /// Copy with an empty compilation cache
    fn fork(&self) -> Project {
        Project {
            id: self.id,
            name: self.name.clone(),
            text: Arc::clone(&self.text),
            kind: self.kind,
            references: self.references.clone(),
            defaults: Arc::clone(&self.defaults),
            project_reference: self.project_reference,
            compilation: OnceCell::new(),
        }
    }
}

/// A consistent set of projects at one version
///
/// Snapshots are never mutated. Every `with_*` method returns a fork whose
/// base version is this snapshot's version; the workspace only accepts the
/// fork while that version is still current.
#[derive(Debug, Clone)]
pub struct Solution {
    version: u64,
    projects: HashMap<ProjectId, Arc<Project>>,
    /// Reverse dependency edges
    dependents: HashMap<ProjectId, Vec<ProjectId>>,
    stats: Arc<CompilationStats>,
}

impl Solution {
    pub(super) fn empty(stats: Arc<CompilationStats>) -> Self {
        Self {
            version: 0,
            projects: HashMap::new(),
            dependents: HashMap::new(),
            stats,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub(super) fn set_version(
        &mut self,
        version: u64,
    ) {
        self.version = version;
    }

    pub fn project(
        &self,
        id: ProjectId,
    ) -> Option<&Arc<Project>> {
        self.projects.get(&id)
    }

    pub fn contains(
        &self,
        id: ProjectId,
    ) -> bool {
        self.projects.contains_key(&id)
    }

    pub fn project_count(&self) -> usize {
        self.projects.len()
    }

    /// Projects that reference `id` directly
    pub fn dependents_of(
        &self,
        id: ProjectId,
    ) -> &[ProjectId] {
        self.dependents.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Fork with `project` added
    ///
    /// A project reference to a project missing from this snapshot is dropped.
    pub fn with_project(
        &self,
        mut project: Project,
    ) -> Solution {
        let mut fork = self.clone();
        if let Some(target) = project.project_reference {
            if self.contains(target) {
                fork.dependents.entry(target).or_default().push(project.id);
            } else {
                project.project_reference = None;
            }
        }
        fork.projects.insert(project.id, Arc::new(project));
        fork
    }

    /// Fork with a project's document text replaced and `references` added to
    /// its accumulated set; `None` if the project is unknown
    pub fn with_document_text(
        &self,
        id: ProjectId,
        text: &str,
        references: &[Reference],
    ) -> Option<Solution> {
        let current = self.projects.get(&id)?;
        let mut edited = current.fork();
        edited.text = Arc::from(text);
        edited.references.extend(references.iter().cloned());

        let mut fork = self.clone();
        fork.projects.insert(id, Arc::new(edited));
        fork.invalidate_dependents(id);
        Some(fork)
    }

    /// Drop cached compilations of every transitive dependent of `id`
    fn invalidate_dependents(
        &mut self,
        id: ProjectId,
    ) {
        let mut pending: Vec<ProjectId> = self.dependents_of(id).to_vec();
        let mut seen = IndexSet::new();
        while let Some(next) = pending.pop() {
            if !seen.insert(next) {
                continue;
            }
            if let Some(project) = self.projects.get(&next) {
                let fresh = Arc::new(project.fork());
                self.projects.insert(next, fresh);
            }
            pending.extend_from_slice(self.dependents_of(next));
        }
    }

    /// Project ids along the dependency edges, oldest first, ending with `id`
    pub fn chain(
        &self,
        id: ProjectId,
    ) -> Vec<ProjectId> {
        let mut chain = Vec::new();
        let mut next = Some(id);
        while let Some(current) = next {
            let Some(project) = self.projects.get(&current) else {
                break;
            };
            chain.push(current);
            next = project.project_reference;
        }
        chain.reverse();
        chain
    }

    /// Compilation of `id` in this snapshot, computing it and any missing
    /// predecessor compilations oldest first
    pub fn compilation(
        &self,
        id: ProjectId,
    ) -> Option<Arc<Compilation>> {
        let project = self.projects.get(&id)?;
        if let Some(done) = project.cached_compilation() {
            return Some(Arc::clone(done));
        }

        // walk back to the nearest cached ancestor
        let mut pending = vec![Arc::clone(project)];
        let mut parent: Option<Arc<Compilation>> = None;
        let mut next = project.project_reference;
        while let Some(current) = next {
            let Some(ancestor) = self.projects.get(&current) else {
                break;
            };
            if let Some(done) = ancestor.cached_compilation() {
                parent = Some(Arc::clone(done));
                break;
            }
            pending.push(Arc::clone(ancestor));
            next = ancestor.project_reference;
        }

        for project in pending.into_iter().rev() {
            let compiled = project
                .compilation
                .get_or_init(|| self.compile_project(&project, parent.as_deref()));
            parent = Some(Arc::clone(compiled));
        }
        parent
    }

    fn compile_project(
        &self,
        project: &Project,
        parent: Option<&Compilation>,
    ) -> Arc<Compilation> {
        let compilation = Compilation::compile(
            &project.text,
            project.kind,
            BindContext {
                parent: parent.map(|p| Arc::clone(p.globals())),
                references: &project.references,
                implicit_usings: &project.defaults.usings,
            },
        );
        self.stats.record(compilation.has_errors());
        Arc::new(compilation)
    }
}
