// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Run directories, suite wiring, and the tfstage binary driver.
// Dependencies: system-tests, tfstage-cli, tfstage-config, tfstage-core
// ============================================================================

//! ## Overview
//! Invariants:
//! - Live suites skip with a recorded summary when no module root is set.
//! - Every run directory ends with `summary.json` and `summary.md`.

#![allow(dead_code, reason = "Each test binary uses a different subset of the helpers.")]

pub mod artifacts;
pub mod cli;
pub mod harness;
