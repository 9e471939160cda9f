// crates/cloudbar-resources/src/random.rs
// ============================================================================
// Module: Random Data
// Description: Random strings and picks for payload generation.
// Purpose: Produce unique, schema-conformant field values.
// Dependencies: cloudbar-client, rand
// ============================================================================

//! ## Overview
//! Payload builders draw names, codes, and flags from here. Nothing is seeded;
//! every run produces fresh values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use cloudbar_client::Country;
use rand::Rng;
use rand::seq::SliceRandom;

// ============================================================================
// SECTION: Character Classes
// ============================================================================

/// Lower-case ASCII letters.
const LOWER: &str = "abcdefghijklmnopqrstuvwxyz";
/// Upper-case ASCII letters.
const UPPER: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// ASCII letters.
const LETTER: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
/// ASCII digits.
const NUMBER: &str = "0123456789";
/// Printable ASCII, whitespace included.
const ALL: &str = "0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ\
!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~ \t\n\r\x0b\x0c";

/// Alphabet for [`random_string`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    /// `a-z`.
    Lower,
    /// `A-Z`.
    Upper,
    /// `a-zA-Z`.
    Letter,
    /// `0-9`.
    Number,
    /// Printable ASCII including whitespace.
    All,
}

impl CharClass {
    /// Returns the alphabet.
    #[must_use]
    pub const fn alphabet(self) -> &'static str {
        match self {
            Self::Lower => LOWER,
            Self::Upper => UPPER,
            Self::Letter => LETTER,
            Self::Number => NUMBER,
            Self::All => ALL,
        }
    }
}

// ============================================================================
// SECTION: Generators
// ============================================================================

/// Returns `len` characters drawn uniformly from `class`.
#[must_use]
pub fn random_string(len: usize, class: CharClass) -> String {
    let alphabet = class.alphabet().as_bytes();
    let mut rng = rand::thread_rng();
    (0..len).filter_map(|_| alphabet.choose(&mut rng).map(|byte| char::from(*byte))).collect()
}

/// Returns a fair coin flip.
#[must_use]
pub fn random_bool() -> bool {
    rand::thread_rng().gen_bool(0.5)
}

/// Returns a uniformly chosen element, or `None` for an empty slice.
#[must_use]
pub fn pick<T>(items: &[T]) -> Option<&T> {
    items.choose(&mut rand::thread_rng())
}

/// Returns a uniformly chosen market.
#[must_use]
pub fn random_country() -> Country {
    pick(&Country::ALL).copied().unwrap_or(Country::Us)
}

/// Returns an integer in `low..=high`.
#[must_use]
pub fn random_in(low: u64, high: u64) -> u64 {
    rand::thread_rng().gen_range(low..=high)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
