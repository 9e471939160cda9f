// system-tests/src/lib.rs
// ============================================================================
// Module: CloudBar System Tests Library
// Description: Shared configuration for live conformance suites.
// Purpose: Provide typed harness settings to the system-test binaries.
// Dependencies: cloudbar-client, dotenvy
// ============================================================================

//! ## Overview
//! This crate hosts the harness configuration used by the live suites in
//! `system-tests/tests`. Suites are compiled only with the `system-tests`
//! feature because they create and delete records on a real backend.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
