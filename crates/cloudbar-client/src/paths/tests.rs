// crates/cloudbar-client/src/paths/tests.rs
// ============================================================================
// Module: API Path Catalog Tests
// Description: Unit tests for template parsing and resolution.
// Purpose: Ensure resolution is all-or-nothing and names missing parameters.
// Dependencies: cloudbar-client
// ============================================================================

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    reason = "Test-only assertions use unwrap/expect for clarity."
)]

use std::collections::BTreeSet;

use super::ApiPath;
use super::PathParams;
use super::PathTemplate;
use super::TokenKind;
use crate::error::PathError;
use crate::http::Method;
use crate::http::ResponseCode;

#[test]
fn location_detail_without_full_code_names_exactly_that_parameter() {
    let err = ApiPath::LocationDetail.resolve(&PathParams::new()).unwrap_err();
    let expected: BTreeSet<String> = ["full_code".to_string()].into();
    assert_eq!(err.missing(), &expected);
    assert!(err.to_string().contains("{full_code}"));
}

#[test]
fn resolution_substitutes_and_carries_token_kind() {
    let resolved = ApiPath::LocationDrinkSettings.resolve_with(&[("full_code", "QLY0001")]).unwrap();
    assert_eq!(resolved.path, "/locations/QLY0001/drink-settings");
    assert_eq!(resolved.token_kind, TokenKind::UserToken);
    assert_eq!(resolved.api_path, ApiPath::LocationDrinkSettings);
}

#[test]
fn extra_parameters_are_ignored() {
    let resolved =
        ApiPath::MenuList.resolve_with(&[("id", "unused"), ("full_code", "unused")]).unwrap();
    assert_eq!(resolved.path, "/menus");
}

#[test]
fn every_missing_placeholder_is_reported() {
    let template = PathTemplate::new("/a/{first}/b/{second}");
    let err = template.substitute(&PathParams::new()).unwrap_err();
    let PathError::MissingParameters {
        template: raw,
        missing,
    } = err;
    assert_eq!(raw, "/a/{first}/b/{second}");
    assert_eq!(missing.into_iter().collect::<Vec<_>>(), vec!["first", "second"]);
}

#[test]
fn unmatched_brace_is_literal() {
    let template = PathTemplate::new("/odd/{open");
    assert!(template.required_params().is_empty());
    assert_eq!(template.substitute(&PathParams::new()).unwrap(), "/odd/{open");
}

#[test]
fn catalog_placeholders_match_templates() {
    assert_eq!(ApiPath::ALL.len(), 30);
    for path in ApiPath::ALL {
        let params: PathParams = path
            .required_params()
            .into_iter()
            .map(|name| (name.to_string(), format!("<{name}>")))
            .collect();
        let resolved = path.resolve(&params).unwrap();
        assert!(!resolved.path.contains('{'), "{}", resolved.path);
    }
    assert_eq!(ApiPath::UserListByType.required_params(), ["type"].into());
    assert_eq!(ApiPath::MachineDelete.required_params(), ["serial_num"].into());
}

#[test]
fn response_schema_uses_template_and_lower_case_method() {
    let schema = ApiPath::MenuDetail.response_schema(Method::Get, ResponseCode::Ok);
    assert_eq!(schema.to_string(), "/menus/{id}[get](200)");
}
