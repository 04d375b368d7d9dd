// crates/tfstage-config/src/lib.rs
// ============================================================================
// Module: tfstage Config Library
// Description: Suite configuration model, validation, and built-in tables.
// Purpose: Single source of truth for tfstage.toml semantics.
// Dependencies: tfstage-core, regex, serde, toml
// ============================================================================

//! ## Overview
//! A suite config names the case table, the expectation table, and how the
//! Terraform binary is invoked. Configs are loaded from TOML, overlaid with
//! environment overrides, and validated fail-closed before any case runs.
//! [`SuiteConfig::complete_vpc`] provides the built-in `complete-vpc` tables.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod builtin;
pub mod config;
pub mod env;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::ConfigError;
pub use config::PlanConfig;
pub use config::RetryConfig;
pub use config::SuiteConfig;
pub use config::TerraformConfig;
pub use config::WorkspaceConfig;
pub use env::EnvOverrides;
pub use env::HarnessEnv;
