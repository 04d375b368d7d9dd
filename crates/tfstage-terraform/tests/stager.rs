// crates/tfstage-terraform/tests/stager.rs
// ============================================================================
// Module: Module Stager Tests
// Description: Temporary copies of module trees.
// ============================================================================
//! ## Overview
//! Validates the copy layout and the entries that are left behind.

#![cfg(unix)]
#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod support;

use tfstage_core::CaseName;
use tfstage_core::ModuleStager;
use tfstage_core::ToolError;
use tfstage_terraform::TempModuleStager;

#[test]
fn copies_whole_root_and_returns_example_path() {
    let source = tempfile::tempdir().unwrap();
    let root = source.path().join("terraform-aws-vpc");
    support::write_module_tree(&root);
    let run_root = tempfile::tempdir().unwrap();

    let stager = TempModuleStager::with_run_root(run_root.path());
    let working_dir = stager
        .copy_module_to_temp(&CaseName::new("complete-vpc"), &root, "examples/complete-vpc")
        .unwrap();

    assert!(working_dir.starts_with(run_root.path().canonicalize().unwrap()));
    assert!(working_dir.ends_with("terraform-aws-vpc/examples/complete-vpc"));
    assert!(working_dir.join("main.tf").is_file());
    assert!(working_dir.join("fixtures.us-west-2.tfvars").is_file());
    assert!(working_dir.join("../../main.tf").is_file());
    assert!(working_dir.join(".terraform-version").is_file());
    assert!(working_dir.join(".terraform.lock.hcl").is_file());
    assert!(!working_dir.join(".terraform").exists());
    assert!(!working_dir.join("terraform.tfstate").exists());
    assert!(!working_dir.join("terraform.tfstate.backup").exists());
    assert!(!working_dir.join("../../.git").exists());
    assert!(root.join("examples/complete-vpc/terraform.tfstate").is_file());
}

#[test]
fn each_copy_gets_a_fresh_directory() {
    let source = tempfile::tempdir().unwrap();
    let root = source.path().join("module");
    support::write_module_tree(&root);
    let run_root = tempfile::tempdir().unwrap();
    let stager = TempModuleStager::with_run_root(run_root.path());
    let case = CaseName::new("complete-vpc");

    let first = stager.copy_module_to_temp(&case, &root, "examples/complete-vpc").unwrap();
    let second = stager.copy_module_to_temp(&case, &root, "examples/complete-vpc").unwrap();
    assert_ne!(first, second);
}

#[test]
fn run_root_inside_module_is_not_recopied() {
    let source = tempfile::tempdir().unwrap();
    let root = source.path().join("module");
    support::write_module_tree(&root);
    let run_root = root.join("runs");

    let stager = TempModuleStager::with_run_root(&run_root);
    let working_dir = stager
        .copy_module_to_temp(&CaseName::new("nested"), &root, "examples/complete-vpc")
        .unwrap();
    let copy_root = working_dir.parent().unwrap().parent().unwrap();
    let nested = std::fs::read_dir(copy_root.join("runs")).unwrap().count();
    assert_eq!(nested, 0);
}

#[test]
fn missing_example_folder_is_a_copy_error() {
    let source = tempfile::tempdir().unwrap();
    let root = source.path().join("module");
    support::write_module_tree(&root);
    let stager = TempModuleStager::with_run_root(source.path().join("runs"));

    let err = stager
        .copy_module_to_temp(&CaseName::new("vpc"), &root, "examples/missing")
        .unwrap_err();
    assert!(matches!(err, ToolError::Copy(message) if message.contains("examples/missing")));
}

#[test]
fn absolute_or_parent_example_folder_never_returns_the_source() {
    let source = tempfile::tempdir().unwrap();
    let root = source.path().join("module");
    support::write_module_tree(&root);
    let run_root = source.path().join("runs");
    let stager = TempModuleStager::with_run_root(&run_root);
    let case = CaseName::new("complete-vpc");
    let absolute = root.join("examples/complete-vpc").canonicalize().unwrap();

    for example in [absolute.display().to_string(), "../module/examples/complete-vpc".to_string()] {
        let err = stager.copy_module_to_temp(&case, &root, &example).unwrap_err();
        assert!(
            matches!(&err, ToolError::Copy(message) if message.contains("must be relative")),
            "{err}"
        );
    }
    assert!(!root.join("examples/complete-vpc/.test-data").exists());
    assert!(!run_root.exists());
}
