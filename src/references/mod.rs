//! Reference catalog
//!
//! Libraries a line can reference, the static types they contribute, the
//! packages that can be installed, and the Default Reference Set applied to
//! every new line.

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::frontend::semantic::Type;
use crate::runtime::{EvaluationLogger, RuntimeError, Value};
use crate::util::config::ReferenceConfig;

mod humanize;
mod library;
pub mod package;

pub use package::{CatalogInstaller, InstalledPackage, PackageError, PackageInstaller, PackageSpec};

/// Name of a referenced library
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Reference(String);

impl Reference {
    pub fn new(name: impl Into<String>) -> Self {
        Reference(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Reference {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Context handed to library functions
pub struct CallContext<'a> {
    pub logger: &'a dyn EvaluationLogger,
}

/// Native implementation of a library member; instance members receive the
/// receiver as the first argument
pub type Builtin = fn(&CallContext<'_>, &[Value]) -> Result<Value, RuntimeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberKind {
    Method,
    Property,
    Field,
}

/// A static or instance member of a library type
#[derive(Clone, Copy)]
pub struct Member {
    pub name: &'static str,
    pub kind: MemberKind,
    pub params: &'static [Type],
    pub ret: Type,
    pub invoke: Builtin,
}

impl fmt::Debug for Member {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "Member({})", self.signature())
    }
}

impl Member {
    /// `double Pow(double, double)`, `int Length`
    pub fn signature(&self) -> String {
        match self.kind {
            MemberKind::Method => format!(
                "{} {}({})",
                self.ret,
                self.name,
                self.params
                    .iter()
                    .map(|p| p.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            MemberKind::Property | MemberKind::Field => format!("{} {}", self.ret, self.name),
        }
    }
}

/// A static type exported by a library
#[derive(Debug)]
pub struct LibraryType {
    pub name: &'static str,
    pub namespace: &'static str,
    pub members: Vec<Member>,
}

impl LibraryType {
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    pub fn members_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Member> + 'a {
        self.members.iter().filter(move |m| m.name == name)
    }

    /// Member names in declaration order, overloads collapsed
    pub fn member_names(&self) -> IndexMap<&'static str, &Member> {
        let mut names = IndexMap::new();
        for member in &self.members {
            names.entry(member.name).or_insert(member);
        }
        names
    }
}

/// A referenceable library
#[derive(Debug)]
pub struct Library {
    pub name: &'static str,
    pub namespace: &'static str,
    pub types: Vec<LibraryType>,
}

/// An installable package and the libraries it brings in
#[derive(Debug)]
pub struct PackageInfo {
    pub name: &'static str,
    pub versions: &'static [&'static str],
    pub libraries: &'static [&'static str],
}

/// Everything that can be referenced
#[derive(Debug)]
pub struct Catalog {
    libraries: IndexMap<&'static str, Library>,
    packages: IndexMap<&'static str, PackageInfo>,
}

/// The built-in catalog
pub static CATALOG: Lazy<Catalog> = Lazy::new(|| {
    let mut catalog = Catalog {
        libraries: IndexMap::new(),
        packages: IndexMap::new(),
    };
    for lib in library::builtin_libraries() {
        catalog.libraries.insert(lib.name, lib);
    }
    catalog.packages.insert(
        "Humanizer",
        PackageInfo {
            name: "Humanizer",
            versions: &["2.14.1", "2.13.14"],
            libraries: &["Humanizer"],
        },
    );
    catalog
});

impl Catalog {
    pub fn library(
        &self,
        name: &str,
    ) -> Option<&Library> {
        self.libraries.get(name)
    }

    /// Package lookup; package ids are case-insensitive
    pub fn package(
        &self,
        name: &str,
    ) -> Option<&PackageInfo> {
        self.packages
            .values()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn library_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.libraries.keys().copied()
    }

    /// Libraries named by `references`, skipping unknown names
    pub fn libraries_for<'r>(
        &self,
        references: impl IntoIterator<Item = &'r Reference>,
    ) -> Vec<&Library> {
        references
            .into_iter()
            .filter_map(|r| self.libraries.get(r.name()))
            .collect()
    }

    /// Namespaces contributed by `references`, including every dotted prefix
    pub fn namespaces_for<'r>(
        &self,
        references: impl IntoIterator<Item = &'r Reference>,
    ) -> IndexSet<&'static str> {
        let mut namespaces = IndexSet::new();
        for lib in self.libraries_for(references) {
            let ns = lib.namespace;
            for (i, c) in ns.char_indices() {
                if c == '.' {
                    namespaces.insert(&ns[..i]);
                }
            }
            namespaces.insert(ns);
        }
        namespaces
    }

    /// Resolve a `#r` target to the references it adds
    pub fn resolve_target(
        &self,
        target: &str,
    ) -> Result<Vec<Reference>, ReferenceError> {
        if PackageSpec::is_package_target(target) {
            let spec = PackageSpec::parse(target)?;
            let package = self
                .package(&spec.name)
                .ok_or_else(|| ReferenceError::UnknownPackage(spec.name.clone()))?;
            if let Some(version) = &spec.version {
                if !package.versions.contains(&version.as_str()) {
                    return Err(ReferenceError::UnknownVersion {
                        package: package.name.to_string(),
                        version: version.clone(),
                    });
                }
            }
            return Ok(package.libraries.iter().map(|l| Reference::new(*l)).collect());
        }

        let name = target.trim();
        match self.library(name) {
            Some(lib) => Ok(vec![Reference::new(lib.name)]),
            None => Err(ReferenceError::UnknownLibrary(name.to_string())),
        }
    }
}

/// Reference resolution failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("library '{0}' was not found")]
    UnknownLibrary(String),

    #[error("package '{0}' was not found")]
    UnknownPackage(String),

    #[error("package '{package}' has no version '{version}'")]
    UnknownVersion { package: String, version: String },

    #[error("invalid package reference '{0}', expected \"nuget: Name[, Version]\"")]
    InvalidSpec(String),
}

/// Members available on values of `ty`
pub fn instance_members(ty: Type) -> &'static [Member] {
    match ty {
        Type::String => &library::STRING_MEMBERS,
        Type::Int | Type::Double | Type::Bool => &library::VALUE_MEMBERS,
        Type::Void | Type::Object | Type::Error => &[],
    }
}

/// Pick the overload for `args`: an exact match wins over one that needs
/// implicit conversions, and declaration order breaks ties
pub fn select_overload<'a>(
    candidates: impl IntoIterator<Item = &'a Member>,
    args: &[Type],
) -> Option<&'a Member> {
    let methods: Vec<&Member> = candidates
        .into_iter()
        .filter(|m| m.kind == MemberKind::Method && m.params.len() == args.len())
        .collect();
    let exact = methods.iter().find(|m| {
        m.params
            .iter()
            .zip(args)
            .all(|(p, a)| p.matches_exactly(*a) || (*p == Type::Object && *a != Type::Void))
    });
    exact
        .or_else(|| {
            methods
                .iter()
                .find(|m| m.params.iter().zip(args).all(|(p, a)| p.accepts(*a)))
        })
        .copied()
}

/// References and implicit usings applied to every new line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultReferences {
    pub references: Vec<Reference>,
    pub usings: Vec<String>,
}

static BUILTIN_DEFAULTS: Lazy<Arc<DefaultReferences>> = Lazy::new(|| {
    Arc::new(DefaultReferences {
        references: vec![
            Reference::new("System.Runtime"),
            Reference::new("System.Console"),
        ],
        usings: vec!["System".to_string()],
    })
});

impl DefaultReferences {
    /// The built-in set, computed once
    pub fn builtin() -> Arc<DefaultReferences> {
        Arc::clone(&BUILTIN_DEFAULTS)
    }

    /// The built-in set extended by user configuration; unknown libraries
    /// are skipped with a warning
    pub fn with_config(config: &ReferenceConfig) -> Arc<DefaultReferences> {
        if config.extra.is_empty() && config.usings.is_empty() {
            return Self::builtin();
        }

        let mut references: IndexSet<Reference> = BUILTIN_DEFAULTS.references.iter().cloned().collect();
        for name in &config.extra {
            match CATALOG.library(name) {
                Some(lib) => {
                    references.insert(Reference::new(lib.name));
                }
                None => warn!("Ignoring unknown default reference '{}'", name),
            }
        }
        let mut usings: IndexSet<String> = BUILTIN_DEFAULTS.usings.iter().cloned().collect();
        usings.extend(config.usings.iter().cloned());

        Arc::new(DefaultReferences {
            references: references.into_iter().collect(),
            usings: usings.into_iter().collect(),
        })
    }
}

#[cfg(test)]
mod tests;
