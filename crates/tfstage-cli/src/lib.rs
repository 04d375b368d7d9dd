// crates/tfstage-cli/src/lib.rs
// ============================================================================
// Module: tfstage CLI Library
// Description: Shared helpers for the tfstage command-line interface.
// Purpose: Wire config into harness services and render suite reports.
// Dependencies: tfstage-config, tfstage-core, tfstage-terraform
// ============================================================================

//! ## Overview
//! The binary entry point (`src/main.rs`) parses arguments and delegates to
//! these helpers: [`harness`] turns a validated [`tfstage_config::SuiteConfig`]
//! into a ready [`tfstage_core::CaseLifecycle`], and [`report`] renders the
//! resulting reports for humans.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Service wiring from suite configuration.
pub mod harness;
/// Text rendering for case and suite reports.
pub mod report;
