// card-controls-core/src/core/control_type.rs
// ============================================================================
// Module: Control Type Taxonomy
// Description: Control-type enum, categories, and wire-name round-tripping.
// Purpose: Categorize controls and parse the gateway's string-encoded types.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! Control types fall into three disjoint categories: a single whole-card
//! global block, channel-based transaction restrictions, and merchant-category
//! restrictions. The remote document stores types as free-text strings, so
//! parsing is an explicit fallible operation; unrecognized strings surface a
//! tagged error instead of silently defaulting to a category.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Control Type
// ============================================================================

/// Named spending restriction applicable to a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ControlType {
    /// Placeholder for an unset or unrecognized control type.
    ///
    /// # Invariants
    /// - Never accepted by request builders; categorizes to
    ///   [`ControlCategory::Unknown`], not to a real category.
    #[serde(rename = "CT_UNSPECIFIED")]
    Unspecified,
    /// Whole-card block.
    #[serde(rename = "GCT_GLOBAL")]
    GlobalBlock,
    /// ATM cash withdrawals.
    #[serde(rename = "TCT_ATM_WITHDRAW")]
    AtmWithdraw,
    /// Card-not-present e-commerce purchases.
    #[serde(rename = "TCT_E_COMMERCE")]
    ECommerce,
    /// Contactless tap-to-pay purchases.
    #[serde(rename = "TCT_CONTACTLESS")]
    Contactless,
    /// Transactions acquired outside the issuing country.
    #[serde(rename = "TCT_CROSS_BORDER")]
    CrossBorder,
    /// Recurring automatic payments.
    #[serde(rename = "TCT_AUTO_PAY")]
    AutoPay,
    /// In-person point-of-sale purchases.
    #[serde(rename = "TCT_BRICK_AND_MORTAR")]
    BrickAndMortar,
    /// Alcohol merchants.
    #[serde(rename = "MCT_ALCOHOL")]
    Alcohol,
    /// Adult entertainment merchants.
    #[serde(rename = "MCT_ADULT_ENTERTAINMENT")]
    AdultEntertainment,
    /// Airline and airfare merchants.
    #[serde(rename = "MCT_AIRFARE")]
    Airfare,
    /// Gambling merchants. Carries the impulse-delay sub-state.
    #[serde(rename = "MCT_GAMBLING")]
    Gambling,
}

/// All concrete control types, in declaration order.
pub const ALL_CONTROL_TYPES: [ControlType; 11] = [
    ControlType::GlobalBlock,
    ControlType::AtmWithdraw,
    ControlType::ECommerce,
    ControlType::Contactless,
    ControlType::CrossBorder,
    ControlType::AutoPay,
    ControlType::BrickAndMortar,
    ControlType::Alcohol,
    ControlType::AdultEntertainment,
    ControlType::Airfare,
    ControlType::Gambling,
];

impl ControlType {
    /// Returns the stable wire name stored in remote documents.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Unspecified => "CT_UNSPECIFIED",
            Self::GlobalBlock => "GCT_GLOBAL",
            Self::AtmWithdraw => "TCT_ATM_WITHDRAW",
            Self::ECommerce => "TCT_E_COMMERCE",
            Self::Contactless => "TCT_CONTACTLESS",
            Self::CrossBorder => "TCT_CROSS_BORDER",
            Self::AutoPay => "TCT_AUTO_PAY",
            Self::BrickAndMortar => "TCT_BRICK_AND_MORTAR",
            Self::Alcohol => "MCT_ALCOHOL",
            Self::AdultEntertainment => "MCT_ADULT_ENTERTAINMENT",
            Self::Airfare => "MCT_AIRFARE",
            Self::Gambling => "MCT_GAMBLING",
        }
    }

    /// Returns the category this control type belongs to.
    ///
    /// Total over all variants. [`ControlType::Unspecified`] maps to
    /// [`ControlCategory::Unknown`]; callers must treat unknown as ineligible
    /// rather than folding it into a real category.
    #[must_use]
    pub const fn category(self) -> ControlCategory {
        match self {
            Self::Unspecified => ControlCategory::Unknown,
            Self::GlobalBlock => ControlCategory::Global,
            Self::AtmWithdraw
            | Self::ECommerce
            | Self::Contactless
            | Self::CrossBorder
            | Self::AutoPay
            | Self::BrickAndMortar => ControlCategory::Transaction,
            Self::Alcohol | Self::AdultEntertainment | Self::Airfare | Self::Gambling => {
                ControlCategory::Merchant
            }
        }
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ============================================================================
// SECTION: Control Category
// ============================================================================

/// Disjoint control-type categories mirroring the remote document's lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlCategory {
    /// Whole-card block.
    Global,
    /// Channel-based transaction restriction.
    Transaction,
    /// Merchant-category restriction.
    Merchant,
    /// Unrecognized or unset control type.
    Unknown,
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Error returned when a stored control-type string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown control type: {0}")]
pub struct UnknownControlTypeError(pub String);

/// Parses a wire-name string back into a [`ControlType`].
///
/// The remote document stores control types as free text, so this is the
/// single round-trip point between stored strings and the enum. Unrecognized
/// strings (including `"CT_UNSPECIFIED"` itself) are an error; callers decide
/// whether to skip or surface them.
///
/// # Errors
///
/// Returns [`UnknownControlTypeError`] when the string names no concrete
/// control type.
pub fn parse_control_type(value: &str) -> Result<ControlType, UnknownControlTypeError> {
    ALL_CONTROL_TYPES
        .into_iter()
        .find(|control_type| control_type.wire_name() == value)
        .ok_or_else(|| UnknownControlTypeError(value.to_string()))
}
