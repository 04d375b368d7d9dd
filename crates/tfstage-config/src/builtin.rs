// crates/tfstage-config/src/builtin.rs
// ============================================================================
// Module: Built-In Tables
// Description: Case and expectation tables for the complete-vpc example.
// Purpose: Run the standard suite without a config file.
// Dependencies: tfstage-core
// ============================================================================

//! ## Overview
//! The `complete-vpc` suite copies the module repository one level above the
//! current directory and checks the example's eight outputs in `us-west-2`.

use std::collections::BTreeMap;

use tfstage_core::AssertType;
use tfstage_core::EXAMPLE_FOLDER_KEY;
use tfstage_core::OutputExpectation;
use tfstage_core::ROOT_FOLDER_KEY;
use tfstage_core::TestCase;

use crate::config::PlanConfig;
use crate::config::RetryConfig;
use crate::config::SuiteConfig;
use crate::config::TerraformConfig;
use crate::config::WorkspaceConfig;

/// Name of the built-in case.
pub const COMPLETE_VPC_CASE: &str = "complete-vpc";

impl SuiteConfig {
    /// Returns the built-in `complete-vpc` suite.
    #[must_use]
    pub fn complete_vpc() -> Self {
        Self {
            terraform: TerraformConfig::default(),
            retry: RetryConfig::default(),
            plan: PlanConfig::default(),
            workspace: WorkspaceConfig::default(),
            cases: complete_vpc_cases(),
            outputs: complete_vpc_outputs(),
            source_dir: None,
        }
    }
}

/// Returns the built-in case table.
#[must_use]
pub fn complete_vpc_cases() -> Vec<TestCase> {
    let values = BTreeMap::from([
        (ROOT_FOLDER_KEY.to_string(), "../".to_string()),
        (EXAMPLE_FOLDER_KEY.to_string(), "examples/complete-vpc".to_string()),
    ]);
    vec![TestCase::new(COMPLETE_VPC_CASE, "us-west-2", values)]
}

/// Returns the built-in expectation table.
#[must_use]
pub fn complete_vpc_outputs() -> Vec<OutputExpectation> {
    vec![
        OutputExpectation::new("vpc_cidr_block", "10.0.0.0/16", AssertType::Equal),
        OutputExpectation::new("vpc_enable_dns_hostnames", "true", AssertType::Equal),
        OutputExpectation::new(
            "private_subnets_cidr_blocks",
            "[10.0.10.0/24 10.0.11.0/24]",
            AssertType::Equal,
        ),
        OutputExpectation::new(
            "public_subnets_cidr_blocks",
            "[10.0.0.0/24 10.0.1.0/24]",
            AssertType::Equal,
        ),
        OutputExpectation::new("vpc_flow_log_cloudwatch_iam_role_arn", "", AssertType::Empty),
        OutputExpectation::new(
            "vpc_flow_log_destination_arn",
            "arn:aws:s3:::global-flow-logs-us-west-2",
            AssertType::Equal,
        ),
        OutputExpectation::new("vpc_flow_log_destination_type", "s3", AssertType::Equal),
        OutputExpectation::new("vpc_flow_log_id", "fl-09a6aa603a2f0312d", AssertType::NotEmpty),
    ]
}
