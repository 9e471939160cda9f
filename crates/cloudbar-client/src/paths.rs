// crates/cloudbar-client/src/paths.rs
// ============================================================================
// Module: API Path Catalog
// Description: Static endpoint catalog and template resolution.
// Purpose: Bind logical endpoints to concrete request paths.
// Dependencies: cloudbar-schema
// ============================================================================

//! ## Overview
//! [`ApiPath`] names every endpoint the harness calls, with its URL template
//! and the credential kind it needs. [`ApiPath::resolve`] is a pure function
//! that substitutes `{name}` placeholders and fails with
//! [`PathError::MissingParameters`] when any placeholder is unbound.
//! Invariants:
//! - Resolution never performs a partial substitution.
//! - Extra bound parameters are ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use cloudbar_schema::ResponseSchema;

use crate::error::PathError;
use crate::http::Method;
use crate::http::ResponseCode;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Credential class an endpoint requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Bearer obtained by user login.
    UserToken,
    /// Bearer obtained by machine login.
    MachineToken,
}

/// Bound path parameters keyed by placeholder name.
pub type PathParams = BTreeMap<String, String>;

/// URL template with `{name}` placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathTemplate(&'static str);

impl PathTemplate {
    /// Wraps a template string.
    #[must_use]
    pub const fn new(template: &'static str) -> Self {
        Self(template)
    }

    /// Returns the raw template.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }

    /// Returns the placeholder names in the template.
    #[must_use]
    pub fn required_params(self) -> BTreeSet<&'static str> {
        pieces(self.0)
            .filter_map(|piece| match piece {
                Piece::Param(name) => Some(name),
                Piece::Literal(_) => None,
            })
            .collect()
    }

    /// Substitutes every placeholder from `params`.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::MissingParameters`] naming every unbound placeholder.
    pub fn substitute(self, params: &PathParams) -> Result<String, PathError> {
        let missing: BTreeSet<String> = self
            .required_params()
            .into_iter()
            .filter(|name| !params.contains_key(*name))
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(PathError::MissingParameters {
                template: self.0.to_string(),
                missing,
            });
        }
        let mut out = String::with_capacity(self.0.len());
        for piece in pieces(self.0) {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Param(name) => {
                    if let Some(value) = params.get(name) {
                        out.push_str(value);
                    }
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Fully substituted request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Endpoint the path was resolved from.
    pub api_path: ApiPath,
    /// Concrete request path.
    pub path: String,
    /// Credential class for the call.
    pub token_kind: TokenKind,
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Logical API endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiPath {
    /// Machine channel listing.
    MachineChannel,
    /// Location listing and creation.
    LocationList,
    /// One location by full code.
    LocationDetail,
    /// Drink settings of a location.
    LocationDrinkSettings,
    /// User listing and creation.
    UserList,
    /// User update by user name.
    UserUpdate,
    /// One user by user name.
    UserDetail,
    /// Users filtered by type.
    UserListByType,
    /// Corporation creation.
    CorpList,
    /// One corporation by user name.
    CorpDetail,
    /// Machine listing.
    MachineList,
    /// One machine by serial number.
    MachineDetail,
    /// Factory import of a machine.
    MachineImport,
    /// Machine registration with a public key.
    MachineRegister,
    /// Machine attribute edit.
    MachineEdit,
    /// Machine login with a signed token.
    MachineLogin,
    /// Machine ownership transfer.
    MachineTransfer,
    /// Internal machine hard delete.
    MachineDelete,
    /// Flavor class type reference data.
    FlavorClassType,
    /// Flavor vendor listing.
    FlavorVendors,
    /// Flavor listing and creation.
    FlavorList,
    /// One flavor by sku.
    FlavorDetail,
    /// Drink category listing.
    DrinkCategory,
    /// Drink listing and creation.
    DrinkList,
    /// One drink by sku.
    DrinkDetail,
    /// Internal drink hard delete.
    DrinkDelete,
    /// Menu listing and creation.
    MenuList,
    /// One menu by id.
    MenuDetail,
    /// Drinks assignable to a machine model's pumps.
    MenuPump,
    /// Batch menu assignment to machines.
    MenuBatch,
}

impl ApiPath {
    /// Every endpoint in catalog order.
    pub const ALL: [Self; 30] = [
        Self::MachineChannel,
        Self::LocationList,
        Self::LocationDetail,
        Self::LocationDrinkSettings,
        Self::UserList,
        Self::UserUpdate,
        Self::UserDetail,
        Self::UserListByType,
        Self::CorpList,
        Self::CorpDetail,
        Self::MachineList,
        Self::MachineDetail,
        Self::MachineImport,
        Self::MachineRegister,
        Self::MachineEdit,
        Self::MachineLogin,
        Self::MachineTransfer,
        Self::MachineDelete,
        Self::FlavorClassType,
        Self::FlavorVendors,
        Self::FlavorList,
        Self::FlavorDetail,
        Self::DrinkCategory,
        Self::DrinkList,
        Self::DrinkDetail,
        Self::DrinkDelete,
        Self::MenuList,
        Self::MenuDetail,
        Self::MenuPump,
        Self::MenuBatch,
    ];

    /// Returns the URL template.
    #[must_use]
    pub const fn template(self) -> PathTemplate {
        PathTemplate::new(match self {
            Self::MachineChannel => "/machine-channels",
            Self::LocationList => "/locations",
            Self::LocationDetail => "/locations/{full_code}",
            Self::LocationDrinkSettings => "/locations/{full_code}/drink-settings",
            Self::UserList => "/users",
            Self::UserUpdate => "/users/{user_name}",
            Self::UserDetail => "/user/{user_name}",
            Self::UserListByType => "/user/type/{type}",
            Self::CorpList => "/corporations",
            Self::CorpDetail => "/corporations/{user_name}",
            Self::MachineList => "/machines",
            Self::MachineDetail => "/machines/{serial_num}",
            Self::MachineImport => "/user/machine/import/factory",
            Self::MachineRegister => "/machine/register",
            Self::MachineEdit => "/user/machine/edit",
            Self::MachineLogin => "/machine/login",
            Self::MachineTransfer => "/user/machine/transfer",
            Self::MachineDelete => "/internal/machines/{serial_num}",
            Self::FlavorClassType => "/ref/flavor_class_type",
            Self::FlavorVendors => "/flavor-vendors",
            Self::FlavorList => "/flavors",
            Self::FlavorDetail => "/flavors/{sku}",
            Self::DrinkCategory => "/drink-categories",
            Self::DrinkList => "/drinks",
            Self::DrinkDetail => "/drinks/{sku}",
            Self::DrinkDelete => "/internal/drinks/{sku}",
            Self::MenuList => "/menus",
            Self::MenuDetail => "/menus/{id}",
            Self::MenuPump => "/menu/pump",
            Self::MenuBatch => "/menu/batch",
        })
    }

    /// Returns the credential class the endpoint requires.
    #[must_use]
    pub const fn token_kind(self) -> TokenKind {
        TokenKind::UserToken
    }

    /// Returns the placeholder names of the template.
    #[must_use]
    pub fn required_params(self) -> BTreeSet<&'static str> {
        self.template().required_params()
    }

    /// Binds parameters into a concrete path.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::MissingParameters`] naming every unbound placeholder.
    pub fn resolve(self, params: &PathParams) -> Result<ResolvedPath, PathError> {
        Ok(ResolvedPath {
            api_path: self,
            path: self.template().substitute(params)?,
            token_kind: self.token_kind(),
        })
    }

    /// Binds `(name, value)` pairs into a concrete path.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::MissingParameters`] naming every unbound placeholder.
    pub fn resolve_with(self, pairs: &[(&str, &str)]) -> Result<ResolvedPath, PathError> {
        let params: PathParams =
            pairs.iter().map(|(name, value)| ((*name).to_string(), (*value).to_string())).collect();
        self.resolve(&params)
    }

    /// Names the documented response schema for `method` and `code`.
    #[must_use]
    pub fn response_schema(self, method: Method, code: ResponseCode) -> ResponseSchema {
        ResponseSchema::new(self.template().as_str(), method.as_str(), code.as_u16())
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.template().as_str())
    }
}

// ============================================================================
// SECTION: Template Parsing
// ============================================================================

/// Template fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    /// Text copied verbatim.
    Literal(&'a str),
    /// Placeholder name.
    Param(&'a str),
}

/// Splits a template into literal and placeholder fragments. An unmatched
/// `{` is kept as literal text.
fn pieces(template: &str) -> impl Iterator<Item = Piece<'_>> {
    let mut rest = template;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        if let Some(body) = rest.strip_prefix('{')
            && let Some(end) = body.find('}')
        {
            let name = &body[..end];
            rest = &body[end + 1..];
            return Some(Piece::Param(name));
        }
        let split = rest
            .char_indices()
            .skip(1)
            .find(|(_, ch)| *ch == '{')
            .map_or(rest.len(), |(idx, _)| idx);
        let (literal, tail) = rest.split_at(split);
        rest = tail;
        Some(Piece::Literal(literal))
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests;
