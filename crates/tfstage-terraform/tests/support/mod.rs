// crates/tfstage-terraform/tests/support/mod.rs
// ============================================================================
// Module: Terraform Driver Test Support
// Description: Scripted fake terraform binary and module fixtures.
// Purpose: Exercise the CLI protocol without cloud access.
// Dependencies: tempfile
// ============================================================================

//! ## Overview
//! The fake binary is a POSIX shell script. It appends every invocation to
//! `$FAKE_TF_LOG`, checks that `-var-file` arguments exist in its working
//! directory, and serves the `complete-vpc` outputs. Behavior switches:
//! - `FAKE_TF_FLAKY_MARK`: the first apply fails with a retryable registry
//!   error and creates this file; later applies succeed.
//! - `FAKE_TF_FAIL_APPLY`: apply fails with a non-retryable error.
//! - `FAKE_TF_DRIFT`: plan reports pending changes.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

use std::collections::BTreeMap;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::path::PathBuf;

/// Fake terraform script body.
const FAKE_TERRAFORM: &str = r#"#!/bin/sh
echo "$*" >> "$FAKE_TF_LOG"
for arg in "$@"; do
  case "$arg" in
    -var-file=*)
      file="${arg#-var-file=}"
      if [ ! -f "$file" ]; then
        echo "Error: Failed to read variables file $file" >&2
        exit 1
      fi
      ;;
  esac
done
case "$1" in
  init)
    echo "Terraform has been successfully initialized!"
    ;;
  apply)
    if [ -n "$FAKE_TF_FAIL_APPLY" ]; then
      echo "Error: Invalid provider configuration" >&2
      exit 1
    fi
    if [ -n "$FAKE_TF_FLAKY_MARK" ] && [ ! -f "$FAKE_TF_FLAKY_MARK" ]; then
      touch "$FAKE_TF_FLAKY_MARK"
      echo "Error: Failed to query available provider packages: registry service is unreachable" >&2
      exit 1
    fi
    echo "Apply complete! Resources: 12 added, 0 changed, 0 destroyed."
    ;;
  plan)
    if [ -n "$FAKE_TF_DRIFT" ]; then
      echo "Plan: 1 to add, 0 to change, 0 to destroy."
    else
      echo "No changes. Your infrastructure matches the configuration."
    fi
    ;;
  destroy)
    echo "Destroy complete! Resources: 12 destroyed."
    ;;
  output)
    case "$4" in
      vpc_cidr_block) echo '"10.0.0.0/16"' ;;
      vpc_enable_dns_hostnames) echo 'true' ;;
      private_subnets_cidr_blocks) echo '["10.0.10.0/24","10.0.11.0/24"]' ;;
      public_subnets_cidr_blocks) echo '["10.0.0.0/24","10.0.1.0/24"]' ;;
      vpc_flow_log_cloudwatch_iam_role_arn) echo '""' ;;
      vpc_flow_log_destination_arn) echo '"arn:aws:s3:::global-flow-logs-us-west-2"' ;;
      vpc_flow_log_destination_type) echo '"s3"' ;;
      vpc_flow_log_id) echo '"fl-0a1b2c3d4e5f"' ;;
      *)
        echo "Error: Output \"$4\" not found" >&2
        exit 1
        ;;
    esac
    ;;
  *)
    echo "unexpected command $1" >&2
    exit 2
    ;;
esac
"#;

/// Writes the fake terraform script into `dir` and returns its path.
pub fn install_fake_terraform(dir: &Path) -> PathBuf {
    let path = dir.join("terraform");
    fs::write(&path, FAKE_TERRAFORM).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Builds a module tree shaped like a Terraform module repository.
pub fn write_module_tree(root: &Path) {
    let example = root.join("examples").join("complete-vpc");
    fs::create_dir_all(example.join(".terraform").join("providers")).unwrap();
    fs::create_dir_all(root.join(".git")).unwrap();
    fs::write(root.join("main.tf"), "resource \"aws_vpc\" \"this\" {}\n").unwrap();
    fs::write(root.join(".git").join("HEAD"), "ref: refs/heads/main\n").unwrap();
    fs::write(example.join("main.tf"), "module \"vpc\" { source = \"../../\" }\n").unwrap();
    fs::write(example.join("fixtures.us-west-2.tfvars"), "region = \"us-west-2\"\n").unwrap();
    fs::write(example.join(".terraform-version"), "1.9.0\n").unwrap();
    fs::write(example.join(".terraform.lock.hcl"), "# lock\n").unwrap();
    fs::write(example.join("terraform.tfstate"), "{}\n").unwrap();
    fs::write(example.join("terraform.tfstate.backup"), "{}\n").unwrap();
    fs::write(example.join(".terraform").join("providers").join("aws"), "binary\n").unwrap();
}

/// Returns the environment handed to the fake binary.
pub fn fake_env(log: &Path) -> BTreeMap<String, String> {
    BTreeMap::from([("FAKE_TF_LOG".to_string(), log.display().to_string())])
}

/// Reads the invocation log, one entry per call.
pub fn read_log(log: &Path) -> Vec<String> {
    fs::read_to_string(log)
        .map(|contents| contents.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
