//! Catalog, package, and overload selection tests

use crate::frontend::semantic::Type;
use crate::references::humanize::{ordinal, words};
use crate::references::*;
use crate::util::config::ReferenceConfig;

#[test]
fn test_catalog_lists_builtin_libraries() {
    let names: Vec<_> = CATALOG.library_names().collect();
    assert_eq!(
        names,
        vec!["System.Runtime", "System.Console", "System.Text", "Humanizer"]
    );
}

#[test]
fn test_namespaces_include_dotted_prefixes() {
    let refs = [Reference::new("System.Text")];
    let namespaces = CATALOG.namespaces_for(refs.iter());
    assert!(namespaces.contains("System"));
    assert!(namespaces.contains("System.Text"));
}

#[test]
fn test_unknown_references_are_skipped() {
    let refs = [Reference::new("Nope"), Reference::new("System.Console")];
    let libs = CATALOG.libraries_for(refs.iter());
    assert_eq!(libs.len(), 1);
    assert_eq!(libs[0].name, "System.Console");
}

#[test]
fn test_resolve_library_target() {
    assert_eq!(
        CATALOG.resolve_target("System.Text"),
        Ok(vec![Reference::new("System.Text")])
    );
    assert!(matches!(
        CATALOG.resolve_target("Missing.Library"),
        Err(ReferenceError::UnknownLibrary(_))
    ));
}

#[test]
fn test_resolve_package_target() {
    assert_eq!(
        CATALOG.resolve_target("nuget: humanizer, 2.14.1"),
        Ok(vec![Reference::new("Humanizer")])
    );
    assert!(matches!(
        CATALOG.resolve_target("nuget: Humanizer, 9.9.9"),
        Err(ReferenceError::UnknownVersion { .. })
    ));
    assert!(matches!(
        CATALOG.resolve_target("nuget: NotAPackage"),
        Err(ReferenceError::UnknownPackage(_))
    ));
}

#[test]
fn test_package_spec_parse() {
    let spec = PackageSpec::parse("nuget: Humanizer, 2.14.1").unwrap();
    assert_eq!(spec.name, "Humanizer");
    assert_eq!(spec.version.as_deref(), Some("2.14.1"));

    let spec = PackageSpec::parse("nuget:Humanizer").unwrap();
    assert_eq!(spec.version, None);

    assert!(PackageSpec::parse("nuget:").is_err());
    assert!(PackageSpec::is_package_target("  nuget: X"));
    assert!(!PackageSpec::is_package_target("System.Text"));
}

#[test]
fn test_catalog_installer_defaults_to_latest() {
    let spec = PackageSpec::parse("nuget: Humanizer").unwrap();
    let installed = CatalogInstaller.install(&spec).unwrap();
    assert_eq!(installed.version, "2.14.1");
    assert_eq!(installed.references, vec![Reference::new("Humanizer")]);
}

#[test]
fn test_catalog_installer_rejects_unknown_package() {
    let spec = PackageSpec::parse("nuget: Left.Pad").unwrap();
    let err = CatalogInstaller.install(&spec).unwrap_err();
    assert!(matches!(
        err,
        PackageError::Resolve(ReferenceError::UnknownPackage(_))
    ));
}

#[test]
fn test_select_overload_prefers_exact_match() {
    let math = CATALOG
        .library("System.Runtime")
        .and_then(|l| l.types.iter().find(|t| t.name == "Math"))
        .unwrap();

    let abs = select_overload(math.members_named("Abs"), &[Type::Int]).unwrap();
    assert_eq!(abs.ret, Type::Int);

    let abs = select_overload(math.members_named("Abs"), &[Type::Double]).unwrap();
    assert_eq!(abs.ret, Type::Double);

    let max = select_overload(math.members_named("Max"), &[Type::Int, Type::Double]).unwrap();
    assert_eq!(max.ret, Type::Double);

    assert!(select_overload(math.members_named("Max"), &[Type::String, Type::Int]).is_none());
    assert!(select_overload(math.members_named("Max"), &[Type::Int]).is_none());
}

#[test]
fn test_member_signature() {
    let names: Vec<String> = instance_members(Type::String)
        .iter()
        .filter(|m| m.name == "Length" || m.name == "Substring")
        .map(Member::signature)
        .collect();
    assert_eq!(names, vec!["int Length", "string Substring(int, int)"]);
}

#[test]
fn test_instance_members_by_type() {
    assert!(instance_members(Type::Void).is_empty());
    assert_eq!(instance_members(Type::Int).len(), 1);
    assert!(instance_members(Type::String).len() > 5);
}

#[test]
fn test_default_references() {
    let defaults = DefaultReferences::builtin();
    assert!(defaults.references.contains(&Reference::new("System.Runtime")));
    assert_eq!(defaults.usings, vec!["System".to_string()]);
}

#[test]
fn test_default_references_with_config() {
    let config = ReferenceConfig {
        extra: vec!["System.Text".to_string(), "Bogus".to_string()],
        usings: vec!["System.Text".to_string()],
    };
    let defaults = DefaultReferences::with_config(&config);
    assert_eq!(defaults.references.len(), 3);
    assert!(defaults.references.contains(&Reference::new("System.Text")));
    assert!(!defaults.references.contains(&Reference::new("Bogus")));
    assert_eq!(defaults.usings, vec!["System".to_string(), "System.Text".to_string()]);
}

#[test]
fn test_ordinal() {
    assert_eq!(ordinal(1), "1st");
    assert_eq!(ordinal(2), "2nd");
    assert_eq!(ordinal(3), "3rd");
    assert_eq!(ordinal(11), "11th");
    assert_eq!(ordinal(112), "112th");
    assert_eq!(ordinal(21), "21st");
}

#[test]
fn test_words() {
    assert_eq!(words(0), "zero");
    assert_eq!(words(42), "forty-two");
    assert_eq!(words(100), "one hundred");
    assert_eq!(words(1001), "one thousand and one");
    assert_eq!(words(-5), "minus five");
}
