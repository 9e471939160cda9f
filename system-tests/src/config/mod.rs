// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Centralized configuration for CloudBar live suites.
// Purpose: Provide typed access to backend, credential, and selector settings.
// Dependencies: cloudbar-client, dotenvy
// ============================================================================

//! ## Overview
//! Harness configuration is read from environment variables, optionally
//! seeded from a `.env` file, and mapped into a small typed structure.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::DEFAULT_HQ_USER_NAME;
pub use env::HarnessConfig;
pub use env::HarnessEnv;
pub use env::read_env_strict;
