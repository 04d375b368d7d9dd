// crates/tfstage-terraform/src/args.rs
// ============================================================================
// Module: Terraform Arguments
// Description: Command-line arguments for each Terraform verb.
// Purpose: Keep flag layout in one place so it can be tested without a binary.
// Dependencies: tfstage-core
// ============================================================================

//! ## Overview
//! Every verb runs non-interactively (`-input=false`). Variable files and
//! inline variables are appended in order to the verbs that read them;
//! `output` always requests JSON without color.

use tfstage_core::ProvisioningOptions;

/// Arguments for `terraform init`.
#[must_use]
pub fn init_args(options: &ProvisioningOptions) -> Vec<String> {
    let mut args = vec!["init".to_string(), format!("-upgrade={}", options.upgrade)];
    args.push("-input=false".to_string());
    push_color(&mut args, options);
    args
}

/// Arguments for `terraform apply`.
#[must_use]
pub fn apply_args(options: &ProvisioningOptions) -> Vec<String> {
    let mut args = vec!["apply".to_string(), "-input=false".to_string(), "-auto-approve".to_string()];
    push_color(&mut args, options);
    push_variables(&mut args, options);
    args
}

/// Arguments for `terraform plan`.
#[must_use]
pub fn plan_args(options: &ProvisioningOptions) -> Vec<String> {
    let mut args = vec!["plan".to_string(), "-input=false".to_string(), "-lock=false".to_string()];
    push_color(&mut args, options);
    push_variables(&mut args, options);
    args
}

/// Arguments for `terraform destroy`.
#[must_use]
pub fn destroy_args(options: &ProvisioningOptions) -> Vec<String> {
    let mut args =
        vec!["destroy".to_string(), "-auto-approve".to_string(), "-input=false".to_string()];
    push_color(&mut args, options);
    push_variables(&mut args, options);
    args
}

/// Arguments for `terraform output` of a single named value.
#[must_use]
pub fn output_args(name: &str) -> Vec<String> {
    vec!["output".to_string(), "-no-color".to_string(), "-json".to_string(), name.to_string()]
}

/// Appends `-no-color` when requested.
fn push_color(args: &mut Vec<String>, options: &ProvisioningOptions) {
    if options.no_color {
        args.push("-no-color".to_string());
    }
}

/// Appends `-var-file` and `-var` flags in order.
fn push_variables(args: &mut Vec<String>, options: &ProvisioningOptions) {
    for file in &options.var_files {
        args.push(format!("-var-file={file}"));
    }
    for (key, value) in &options.vars {
        args.push("-var".to_string());
        args.push(format!("{key}={value}"));
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
