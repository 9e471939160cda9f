// system-tests/tests/suites/drink_setting.rs
// ============================================================================
// Module: Drink Setting Tests
// Description: Corporation, location, machine, and menu chain ending in settings.
// Purpose: Verify a location's drink settings for an assigned menu.
// Dependencies: system-tests helpers, cloudbar-resources, cloudbar-schema
// ============================================================================

//! ## Overview
//! Each step's identity is the next step's input, so the chain runs in strict
//! order. Fixtures drop in reverse, returning the machine before its location
//! and corporation are removed.

use cloudbar_client::ApiPath;
use cloudbar_client::Method;
use cloudbar_client::ResponseCode;
use cloudbar_resources::Corporation;
use cloudbar_resources::Location;
use cloudbar_resources::Machine;
use cloudbar_resources::Menu;
use cloudbar_schema::Requirement;
use helpers::fixture::Fixture;
use helpers::harness::Harness;
use tracing::info;

use crate::helpers;

#[test]
fn c200_drink_settings_match_schema_with_all_fields() -> Result<(), Box<dyn std::error::Error>> {
    let Some(harness) = Harness::for_case("C200")? else {
        return Ok(());
    };
    let client = &harness.client;

    let corporation = Fixture::create(client, Box::new(Corporation::new()))?;
    let mut owned = Location::new(harness.config.hq_user_name.as_str());
    owned.set_user_name(corporation.id()?);
    let location = Fixture::create(client, Box::new(owned))?;
    let menu = Fixture::create(client, Box::new(Menu::new()))?;
    let machine = Fixture::create(client, Box::new(Machine::new()))?;

    machine.install_to_location(client, &location.id()?)?;
    menu.assign_to_machines(client, &[machine.id()?.as_str()])?;
    let response = location.get_drink_settings(client, &menu.id()?)?;
    info!(location = %location.id()?, menu = %menu.id()?, "drink settings read");

    let document = client.schema_document()?;
    let schema = ApiPath::LocationDrinkSettings.response_schema(Method::Get, ResponseCode::Ok);
    if !schema.verify(&document, &response.json()?, Requirement::All) {
        return Err(format!("{schema} rejected the drink settings response").into());
    }
    Ok(())
}
