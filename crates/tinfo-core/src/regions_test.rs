use std::io::Write;
use std::path::Path;

use super::*;
use crate::targets::TargetKind;

fn write_yaml(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(contents.as_bytes()).expect("write yaml");
    file
}

#[test]
fn builtin_contains_original_whitelist() {
    let catalog = RegionCatalog::builtin();
    let names: Vec<&str> = catalog.names().collect();
    assert_eq!(
        names,
        vec!["Toronto", "Thailand", "Philippines", "UK", "Australia"]
    );
}

#[test]
fn find_is_case_insensitive() {
    let catalog = RegionCatalog::builtin();
    assert_eq!(catalog.find("toronto").unwrap().name, "Toronto");
    assert_eq!(catalog.find(" uk ").unwrap().name, "UK");
    assert!(catalog.find("Mars").is_none());
}

#[test]
fn toronto_targets_list_hashtags_then_accounts() {
    let catalog = RegionCatalog::builtin();
    let targets = catalog.find(DEFAULT_REGION).unwrap().targets();
    assert_eq!(targets.len(), 6);
    assert_eq!(targets[0], Target::hashtag("torontojobs"));
    assert_eq!(targets[4].kind, TargetKind::Account);
    assert_eq!(targets[5], Target::account("torontolife"));
}

#[test]
fn missing_file_yields_builtin_catalog() {
    let catalog = load_regions(Path::new("/definitely/not/here/regions.yaml")).unwrap();
    assert!(catalog.find("Thailand").is_some());
}

#[test]
fn file_overrides_and_extends_builtin() {
    let file = write_yaml(
        "regions:\n  - name: toronto\n    hashtags: [tojobs]\n  - name: Vancouver\n    accounts: [dailyhive]\n",
    );
    let catalog = load_regions(file.path()).unwrap();

    let toronto = catalog.find("Toronto").unwrap();
    assert_eq!(toronto.targets(), vec![Target::hashtag("tojobs")]);

    let vancouver = catalog.find("vancouver").unwrap();
    assert_eq!(vancouver.targets(), vec![Target::account("dailyhive")]);
}

#[test]
fn file_with_empty_region_fails_validation() {
    let file = write_yaml("regions:\n  - name: Nowhere\n");
    let err = load_regions(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("Nowhere")));
}

#[test]
fn file_with_duplicate_names_fails_validation() {
    let file = write_yaml(
        "regions:\n  - name: Osaka\n    hashtags: [a]\n  - name: OSAKA\n    hashtags: [b]\n",
    );
    let err = load_regions(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(ref m) if m.contains("duplicate")));
}

#[test]
fn malformed_yaml_is_parse_error() {
    let file = write_yaml("regions: [ this is : not valid");
    let err = load_regions(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::RegionsFileParse(_)));
}
