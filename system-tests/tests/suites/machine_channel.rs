// system-tests/tests/suites/machine_channel.rs
// ============================================================================
// Module: Machine Channel Smoke Tests
// Description: Read-only check of the machine channel listing.
// Purpose: Confirm the backend is reachable and its schema is current.
// Dependencies: system-tests helpers, cloudbar-client, cloudbar-schema
// ============================================================================

//! Machine channel smoke coverage for the live backend.

use cloudbar_client::ApiPath;
use cloudbar_client::Method;
use cloudbar_client::PathParams;
use cloudbar_client::RequestOptions;
use cloudbar_client::ResponseCode;
use cloudbar_schema::Requirement;
use helpers::harness::Harness;

use crate::helpers;

#[test]
fn c6858_machine_channel_list_matches_schema() -> Result<(), Box<dyn std::error::Error>> {
    let Some(harness) = Harness::for_case("C6858")? else {
        return Ok(());
    };
    let path = ApiPath::MachineChannel.resolve(&PathParams::new())?;
    let response =
        harness.client.call(&path, Method::Get, ResponseCode::Ok, &RequestOptions::new())?;

    let document = harness.client.schema_document()?;
    let schema = ApiPath::MachineChannel.response_schema(Method::Get, ResponseCode::Ok);
    if !schema.verify_text(&document, response.text(), Requirement::Partial) {
        return Err(format!("{schema} rejected the machine channel list").into());
    }
    Ok(())
}
