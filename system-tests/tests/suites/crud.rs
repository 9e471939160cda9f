// system-tests/tests/suites/crud.rs
// ============================================================================
// Module: CRUD Conformance Tests
// Description: List, detail, create, update, and delete cases for every kind.
// Purpose: Verify responses against the schema and written state against reads.
// Dependencies: system-tests helpers, cloudbar-resources, cloudbar-schema
// ============================================================================

//! ## Overview
//! Each case runs over every [`ResourceKind`] and reports all failing kinds
//! together. Created records are held in fixtures so they are deleted even
//! when a later step fails.
//! Invariants:
//! - Corporation detail reads and schemas go through the user detail path.
//! - Hard-deleted kinds read back 404; soft-deleted kinds read back inactive.

use cloudbar_resources::ResourceKind;
use cloudbar_resources::new_endpoint;
use cloudbar_schema::Requirement;
use cloudbar_schema::SchemaDocument;
use cloudbar_schema::matches;
use helpers::fixture::Fixture;
use helpers::harness::Harness;
use serde_json::Value;

use crate::helpers;

/// Result type shared by the cases.
type CaseResult = Result<(), Box<dyn std::error::Error>>;

/// Turns collected failures into a case error.
fn report(case_id: &str, failures: &[String]) -> CaseResult {
    if failures.is_empty() {
        return Ok(());
    }
    Err(format!("{case_id} failed for: {}", failures.join("; ")).into())
}

/// Verifies a detail read of `id` against the schema and, when given, the
/// expected state.
fn check_detail(
    harness: &Harness,
    document: &SchemaDocument,
    kind: ResourceKind,
    id: &str,
    expected: Option<&Value>,
) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut failures = Vec::new();
    let detail = kind.read_detail(&harness.client, id)?;
    if !kind.detail_schema().verify(document, &detail.json()?, Requirement::Partial) {
        failures.push(format!("{kind} detail schema"));
    }
    if let Some(expected) = expected
        && !matches(expected, &detail.json_at("/data")?)
    {
        failures.push(format!("{kind} detail data"));
    }
    Ok(failures)
}

#[test]
fn c100_list_responses_match_schema() -> CaseResult {
    let Some(harness) = Harness::for_case("C100")? else {
        return Ok(());
    };
    let document = harness.client.schema_document()?;
    let mut failures = Vec::new();
    for kind in ResourceKind::ALL {
        let response = kind.read_list(&harness.client)?;
        if !kind.list_schema().verify(&document, &response.json()?, Requirement::Partial) {
            failures.push(format!("{kind} list schema"));
        }
    }
    report("C100", &failures)
}

#[test]
fn c101_detail_responses_match_schema() -> CaseResult {
    let Some(harness) = Harness::for_case("C101")? else {
        return Ok(());
    };
    let document = harness.client.schema_document()?;
    let mut failures = Vec::new();
    for kind in ResourceKind::ALL {
        let Some(id) = kind.random_resource_id(&harness.client)? else {
            failures.push(format!("{kind} has no records to read"));
            continue;
        };
        failures.extend(check_detail(&harness, &document, kind, &id, None)?);
    }
    report("C101", &failures)
}

#[test]
fn c102_created_resources_read_back() -> CaseResult {
    let Some(harness) = Harness::for_case("C102")? else {
        return Ok(());
    };
    let document = harness.client.schema_document()?;
    let defaults = harness.defaults();
    let mut failures = Vec::new();
    for kind in ResourceKind::ALL {
        let fixture = Fixture::create(&harness.client, new_endpoint(kind, &defaults))?;
        let created = fixture.create_response().json()?;
        if !kind.create_schema().verify(&document, &created, Requirement::Partial) {
            failures.push(format!("{kind} create schema"));
        }
        let expected = Value::Object(fixture.info_data().clone());
        failures.extend(check_detail(&harness, &document, kind, &fixture.id()?, Some(&expected))?);
    }
    report("C102", &failures)
}

#[test]
fn c103_updated_resources_read_back() -> CaseResult {
    let Some(harness) = Harness::for_case("C103")? else {
        return Ok(());
    };
    let document = harness.client.schema_document()?;
    let defaults = harness.defaults();
    let mut failures = Vec::new();
    for kind in ResourceKind::ALL {
        let mut fixture = Fixture::create(&harness.client, new_endpoint(kind, &defaults))?;
        fixture.update(&harness.client)?;
        let id = fixture.id()?;
        let expected = Value::Object(fixture.info_data().clone());
        failures.extend(check_detail(&harness, &document, kind, &id, Some(&expected))?);

        let once = kind.read_detail(&harness.client, &id)?.json_at("/data")?;
        fixture.execute_update(&harness.client)?;
        let twice = kind.read_detail(&harness.client, &id)?.json_at("/data")?;
        if once != twice {
            failures.push(format!("{kind} changed when the same update was resent"));
        }
    }
    report("C103", &failures)
}

#[test]
fn c104_deleted_resources_reach_terminal_state() -> CaseResult {
    let Some(harness) = Harness::for_case("C104")? else {
        return Ok(());
    };
    let defaults = harness.defaults();
    let mut failures = Vec::new();
    for kind in ResourceKind::ALL {
        let mut fixture = Fixture::create(&harness.client, new_endpoint(kind, &defaults))?;
        let id = fixture.id()?;
        fixture.delete()?;
        if !kind.confirm_deleted(&harness.client, &id)? {
            failures.push(format!("{kind} {id} not terminal after delete"));
        }
    }
    report("C104", &failures)
}
