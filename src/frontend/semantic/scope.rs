//! Chain globals and imported library types

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use super::types::Type;
use crate::references::{LibraryType, Reference, CATALOG};

/// Declarations exported by one line, linked to its predecessor's
///
/// Lookups walk the parent chain, so a line sees everything declared by the
/// lines before it; a nearer declaration shadows an older one.
#[derive(Debug, Default)]
pub struct Globals {
    parent: Option<Arc<Globals>>,
    variables: IndexMap<String, Type>,
    /// Usings of this line and every predecessor
    usings: IndexSet<String>,
    /// References of this line and every predecessor
    references: IndexSet<Reference>,
}

impl Globals {
    pub fn new(
        parent: Option<Arc<Globals>>,
        variables: IndexMap<String, Type>,
        usings: IndexSet<String>,
        references: IndexSet<Reference>,
    ) -> Self {
        let (mut all_usings, mut all_references) = match &parent {
            Some(p) => (p.usings.clone(), p.references.clone()),
            None => Default::default(),
        };
        all_usings.extend(usings);
        all_references.extend(references);
        Self {
            parent,
            variables,
            usings: all_usings,
            references: all_references,
        }
    }

    pub fn parent(&self) -> Option<&Arc<Globals>> {
        self.parent.as_ref()
    }

    /// This scope followed by its ancestors, nearest first
    pub fn chain(&self) -> impl Iterator<Item = &Globals> {
        std::iter::successors(Some(self), |g| g.parent.as_deref())
    }

    /// Variables declared by this line only
    pub fn own_variables(&self) -> &IndexMap<String, Type> {
        &self.variables
    }

    /// Type of the nearest visible global named `name`
    pub fn lookup(
        &self,
        name: &str,
    ) -> Option<Type> {
        self.chain().find_map(|g| g.variables.get(name).copied())
    }

    /// Every visible global, nearest declaration first
    pub fn visible_variables(&self) -> IndexMap<&str, Type> {
        let mut visible = IndexMap::new();
        for scope in self.chain() {
            for (name, ty) in scope.variables.iter().rev() {
                visible.entry(name.as_str()).or_insert(*ty);
            }
        }
        visible
    }

    /// References accumulated along the chain, oldest first
    pub fn references(&self) -> &IndexSet<Reference> {
        &self.references
    }

    /// Namespaces imported along the chain, oldest first
    pub fn usings(&self) -> &IndexSet<String> {
        &self.usings
    }

    pub fn depth(&self) -> usize {
        self.chain().count()
    }
}

impl Drop for Globals {
    // unlink iteratively so dropping a long chain cannot overflow the stack
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(parent) = next {
            match Arc::try_unwrap(parent) {
                Ok(mut globals) => next = globals.parent.take(),
                Err(_) => break,
            }
        }
    }
}

/// What a name or dotted prefix refers to when it is not a variable
#[derive(Debug, Clone, Copy)]
pub enum Import {
    Type(&'static LibraryType),
    Namespace(&'static str),
}

/// Library types reachable from a line
#[derive(Debug, Default)]
pub struct Imports {
    namespaces: IndexSet<&'static str>,
    /// Types reachable by simple name through `using`
    types: IndexMap<&'static str, &'static LibraryType>,
    /// Every type of every referenced library
    all_types: Vec<&'static LibraryType>,
}

impl Imports {
    pub fn new<'r>(
        references: impl IntoIterator<Item = &'r Reference> + Clone,
        usings: &IndexSet<&str>,
    ) -> Self {
        let catalog: &'static crate::references::Catalog = &CATALOG;
        let namespaces = catalog.namespaces_for(references.clone());

        let mut types = IndexMap::new();
        let mut all_types = Vec::new();
        for lib in catalog.libraries_for(references) {
            for ty in &lib.types {
                if usings.contains(ty.namespace) {
                    types.entry(ty.name).or_insert(ty);
                }
                all_types.push(ty);
            }
        }

        Self {
            namespaces,
            types,
            all_types,
        }
    }

    pub fn has_namespace(
        &self,
        namespace: &str,
    ) -> bool {
        self.namespaces.contains(namespace)
    }

    /// Resolve a simple name: imported types first, then root namespaces
    pub fn resolve(
        &self,
        name: &str,
    ) -> Option<Import> {
        if let Some(ty) = self.types.get(name) {
            return Some(Import::Type(*ty));
        }
        self.namespaces
            .get(name)
            .filter(|ns| !ns.contains('.'))
            .map(|ns| Import::Namespace(*ns))
    }

    /// Resolve `namespace.name`
    pub fn resolve_in(
        &self,
        namespace: &str,
        name: &str,
    ) -> Option<Import> {
        if let Some(ty) = self
            .all_types
            .iter()
            .find(|t| t.namespace == namespace && t.name == name)
        {
            return Some(Import::Type(*ty));
        }
        let qualified = format!("{}.{}", namespace, name);
        self.namespaces
            .get(qualified.as_str())
            .map(|ns| Import::Namespace(*ns))
    }

    /// Types reachable by simple name
    pub fn imported_types(&self) -> impl Iterator<Item = &'static LibraryType> + '_ {
        self.types.values().copied()
    }

    /// Root namespaces (no dot)
    pub fn root_namespaces(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.namespaces.iter().copied().filter(|ns| !ns.contains('.'))
    }

    /// Types and child namespaces directly inside `namespace`
    pub fn namespace_members(
        &self,
        namespace: &str,
    ) -> Vec<Import> {
        let mut members: Vec<Import> = self
            .namespaces
            .iter()
            .filter(|ns| {
                ns.strip_prefix(namespace)
                    .and_then(|rest| rest.strip_prefix('.'))
                    .is_some_and(|rest| !rest.contains('.'))
            })
            .map(|ns| Import::Namespace(*ns))
            .collect();
        members.extend(
            self.all_types
                .iter()
                .filter(|t| t.namespace == namespace)
                .map(|t| Import::Type(*t)),
        );
        members
    }
}
