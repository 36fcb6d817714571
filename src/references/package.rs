//! Package references (`#r "nuget: Name, Version"`)

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use super::{Reference, ReferenceError, CATALOG};

static PACKAGE_SPEC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*nuget:\s*([A-Za-z0-9_.\-]+)\s*(?:,\s*([0-9A-Za-z.\-+]+)\s*)?$")
        .expect("package spec pattern is valid")
});

/// A parsed package reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub version: Option<String>,
}

impl PackageSpec {
    /// Whether a `#r` target names a package rather than a library
    pub fn is_package_target(target: &str) -> bool {
        target.trim_start().starts_with("nuget:")
    }

    pub fn parse(target: &str) -> Result<Self, ReferenceError> {
        let caps = PACKAGE_SPEC
            .captures(target)
            .ok_or_else(|| ReferenceError::InvalidSpec(target.to_string()))?;
        Ok(PackageSpec {
            name: caps[1].to_string(),
            version: caps.get(2).map(|m| m.as_str().to_string()),
        })
    }
}

/// Outcome of a successful installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
    pub references: Vec<Reference>,
}

#[derive(Debug, Error)]
pub enum PackageError {
    #[error(transparent)]
    Resolve(#[from] ReferenceError),

    #[error("package source unavailable: {0}")]
    SourceUnavailable(String),
}

/// Installs packages and reports the references they add
pub trait PackageInstaller: Send + Sync {
    fn install(
        &self,
        spec: &PackageSpec,
    ) -> Result<InstalledPackage, PackageError>;
}

/// Installer backed by the built-in catalog; never touches the network
#[derive(Debug, Default, Clone, Copy)]
pub struct CatalogInstaller;

impl PackageInstaller for CatalogInstaller {
    fn install(
        &self,
        spec: &PackageSpec,
    ) -> Result<InstalledPackage, PackageError> {
        let package = CATALOG
            .package(&spec.name)
            .ok_or_else(|| ReferenceError::UnknownPackage(spec.name.clone()))?;
        let version = match &spec.version {
            Some(v) if package.versions.contains(&v.as_str()) => v.clone(),
            Some(v) => {
                return Err(ReferenceError::UnknownVersion {
                    package: package.name.to_string(),
                    version: v.clone(),
                }
                .into())
            }
            None => package.versions[0].to_string(),
        };
        debug!("Installed package {} {}", package.name, version);

        Ok(InstalledPackage {
            name: package.name.to_string(),
            version,
            references: package.libraries.iter().map(|l| Reference::new(*l)).collect(),
        })
    }
}
