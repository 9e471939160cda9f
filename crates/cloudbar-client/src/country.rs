// crates/cloudbar-client/src/country.rs
// ============================================================================
// Module: Countries
// Description: Markets the platform serves.
// Purpose: Provide country codes and display names for payloads and queries.
// Dependencies: none
// ============================================================================

//! ## Overview
//! The backend keys drinks and pump projections by country display name.

// ============================================================================
// SECTION: Country
// ============================================================================

/// Served market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Country {
    /// United States.
    Us,
    /// Australia.
    Au,
    /// Taiwan.
    Tw,
    /// Japan.
    Jp,
    /// Thailand.
    Th,
    /// Canada.
    Ca,
    /// Singapore.
    Sg,
    /// South Korea.
    Kr,
    /// Spain.
    Es,
}

impl Country {
    /// Every served market.
    pub const ALL: [Self; 9] =
        [Self::Us, Self::Au, Self::Tw, Self::Jp, Self::Th, Self::Ca, Self::Sg, Self::Kr, Self::Es];

    /// Returns the two-letter code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Us => "US",
            Self::Au => "AU",
            Self::Tw => "TW",
            Self::Jp => "JP",
            Self::Th => "TH",
            Self::Ca => "CA",
            Self::Sg => "SG",
            Self::Kr => "KR",
            Self::Es => "ES",
        }
    }

    /// Returns the display name the backend stores.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Us => "United States",
            Self::Au => "Australia",
            Self::Tw => "Taiwan",
            Self::Jp => "Japan",
            Self::Th => "Thailand",
            Self::Ca => "Canada",
            Self::Sg => "Singapore",
            Self::Kr => "South Korea",
            Self::Es => "Spain",
        }
    }
}
