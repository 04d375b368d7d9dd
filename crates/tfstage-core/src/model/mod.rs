// crates/tfstage-core/src/model/mod.rs
// ============================================================================
// Module: tfstage Model
// Description: Declarative data types driving a harness run.
// Purpose: Group case tables, expectations, options, and identifiers.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The model is plain declarative data: test cases, output expectations, and
//! the provisioning options persisted between stages. Values are immutable once
//! constructed and carry no behavior beyond validation and derivation.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod case;
pub mod expectation;
pub mod identifiers;
pub mod options;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use case::EXAMPLE_FOLDER_KEY;
pub use case::ROOT_FOLDER_KEY;
pub use case::TestCase;
pub use case::TestCaseError;
pub use case::is_contained_relative;
pub use expectation::AssertType;
pub use expectation::AssertTypeError;
pub use expectation::OutputExpectation;
pub use identifiers::CaseName;
pub use identifiers::Stage;
pub use identifiers::StageParseError;
pub use options::DEFAULT_MAX_RETRIES;
pub use options::DEFAULT_RETRYABLE_ERRORS;
pub use options::DEFAULT_TIME_BETWEEN_RETRIES;
pub use options::ProvisioningOptions;
pub use options::RetryPolicy;
