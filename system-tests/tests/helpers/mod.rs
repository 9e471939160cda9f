// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for CloudBar live suites.
// Purpose: Provide harness setup, case selection, and resource fixtures.
// Dependencies: system-tests, cloudbar-client, cloudbar-resources
// ============================================================================

//! ## Overview
//! Shared helpers for CloudBar live suites.
//! Invariants:
//! - Tracing is installed once per test binary.
//! - Fixtures delete what they created, even when a suite fails early.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod fixture;
pub mod harness;
