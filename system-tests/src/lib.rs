// system-tests/src/lib.rs
// ============================================================================
// Module: tfstage System Tests Library
// Description: Settings shared by the live system-test binaries.
// Purpose: Locate the module checkout and binaries for live runs.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The live suites in `system-tests/tests` provision real infrastructure
//! through a real `terraform` binary, so they only build with the
//! `system-tests` feature. This library holds the settings they share.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod settings;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use settings::SettingsError;
pub use settings::SystemTestEnv;
pub use settings::SystemTestSettings;
