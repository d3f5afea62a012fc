//! Integration tests for the `sbem-compose` binary.

use assert_cmd::Command;
use predicates::prelude::*;
use sbem_compose::test_utils::fixtures::FileFixture;
use std::path::Path;
use tempfile::TempDir;

/// The binary run inside `dir`, isolated from user-level config.
fn sbem(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("sbem-compose").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("SBEM_COMPOSE_CONFIG")
        .env_remove("RUST_LOG");
    cmd
}

/// A directory holding the zone library, selector trees and config.
fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    for fixture in [
        FileFixture::zone_library(),
        FileFixture::zone_tree(),
        FileFixture::unresolvable_zone_tree(),
        FileFixture::config(),
    ] {
        fixture.write_to(temp.path()).unwrap();
    }
    temp
}

#[test]
fn test_graph_prints_zone_hierarchy() {
    let temp = TempDir::new().unwrap();
    sbem(temp.path())
        .arg("graph")
        .assert()
        .success()
        .stdout(predicate::str::contains("root (Zone)"))
        .stdout(predicate::str::contains("├── Operations (Operations)"))
        .stdout(predicate::str::contains("HeatingSchedule (Year)"))
        .stdout(predicate::str::contains("24 nested fields"));
}

#[test]
fn test_graph_unknown_component_suggests_name() {
    let temp = TempDir::new().unwrap();
    sbem(temp.path())
        .args(["graph", "--component", "Lightning"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("did you mean 'Lighting'"));
}

#[test]
fn test_template_for_component() {
    let temp = TempDir::new().unwrap();
    sbem(temp.path())
        .args(["template", "--component", "Lighting"])
        .assert()
        .success()
        .stdout(predicate::str::contains("source_field_1"))
        .stdout(predicate::str::contains("Schedule:"));

    sbem(temp.path())
        .args(["template", "--component", "HVAC", "--grouping"])
        .assert()
        .success()
        .stdout(predicate::str::contains("children:"));
}

#[test]
fn test_validate_resolvable_tree() {
    let temp = project();
    sbem(temp.path())
        .args(["validate", "tree.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("tree.yaml can resolve"));
}

#[test]
fn test_validate_lists_every_unresolvable_path() {
    let temp = project();
    sbem(temp.path())
        .args(["validate", "broken_tree.yaml"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Operations:NodeNotSpecified"))
        .stdout(predicate::str::contains("Envelope:Assemblies:NodeNotSpecified"))
        .stdout(predicate::str::contains("Envelope:Window:NoSelectorSpecified"))
        .stderr(predicate::str::contains("cannot be resolved"));
}

#[test]
fn test_validate_json_report() {
    let temp = project();
    sbem(temp.path())
        .args(["validate", "broken_tree.yaml", "--format", "json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"valid\": false"));
}

#[test]
fn test_validate_rejects_unknown_fields_from_config() {
    let temp = project();
    std::fs::write(temp.path().join("typo.yaml"), "Operatons: {}\n").unwrap();
    sbem(temp.path())
        .args(["validate", "typo.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("did you mean 'Operations'"));
}

#[test]
fn test_resolve_with_config_and_context_flag() {
    let temp = project();
    sbem(temp.path())
        .args(["resolve", "tree.yaml", "--context", "lighting_type=led"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Name: office_led"))
        .stdout(predicate::str::contains("PowerDensity: 4.5"))
        .stdout(predicate::str::contains("Name: double_clear"));
}

#[test]
fn test_resolve_missing_context_field() {
    let temp = project();
    sbem(temp.path())
        .args(["resolve", "tree.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("lighting_type"))
        .stderr(predicate::str::contains("--context"));
}

#[test]
fn test_resolve_json_with_explicit_library() {
    let temp = TempDir::new().unwrap();
    FileFixture::zone_library().write_to(temp.path()).unwrap();
    std::fs::write(temp.path().join("zone.json"), r#"{"selector": {"source_fields": ["typology"]}}"#).unwrap();
    std::fs::write(temp.path().join("context.yaml"), "typology: office\n").unwrap();

    sbem(temp.path())
        .args([
            "-q",
            "resolve",
            "zone.json",
            "--library",
            "library.yaml",
            "--context-file",
            "context.yaml",
            "--format",
            "json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{"))
        .stdout(predicate::str::contains("\"Name\": \"office\""));
}

#[test]
fn test_resolve_requires_a_library() {
    let temp = TempDir::new().unwrap();
    FileFixture::zone_tree().write_to(temp.path()).unwrap();
    sbem(temp.path())
        .args(["resolve", "tree.yaml", "--context", "typology=office"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No component library given"));
}

#[test]
fn test_resolve_unknown_record() {
    let temp = project();
    sbem(temp.path())
        .args(["resolve", "tree.yaml", "--context", "typology=school", "--context", "lighting_type=led"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No Lighting record named 'school_led'"));
}
