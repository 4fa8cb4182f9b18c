// card-controls-core/src/core/document.rs
// ============================================================================
// Module: Control Document Shapes
// Description: Remote control-document and control-entry wire structures.
// Purpose: Model the gateway-owned document and its lookup helpers.
// Dependencies: crate::core::{control_type, identifiers}, serde
// ============================================================================

//! ## Overview
//! The control document is the remote aggregate record of all controls set
//! for a card's account. It is owned by the gateway: fetched per call,
//! mutated via explicit create/delete requests, never cached locally. A
//! document may hold multiple entries of the same type contributed by
//! different owners; lookup helpers treat "any enabled entry of this type"
//! as sufficient.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::control_type::ControlCategory;
use crate::core::control_type::ControlType;
use crate::core::control_type::parse_control_type;
use crate::core::identifiers::DocumentId;

// ============================================================================
// SECTION: Control Entry
// ============================================================================

/// One raw control record inside the remote document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlEntry {
    /// String-encoded control type as stored by the gateway.
    pub control_type: String,
    /// Whether the control is currently active.
    pub is_enabled: bool,
    /// Persona that contributed this entry, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    /// Whether matching transactions are declined outright.
    #[serde(default)]
    pub should_decline_all: bool,
    /// Whether the owner is alerted on declines. Absent for global entries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should_alert_on_decline: Option<bool>,
    /// Impulse-delay window start, `YYYY/MM/DD hh:mm:ss`. Gambling only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impulse_delay_start: Option<String>,
    /// Impulse-delay window end, `YYYY/MM/DD hh:mm:ss`. Gambling only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impulse_delay_end: Option<String>,
    /// Remaining countdown, `hh:mm:ss`; `"00:00:00"` once expired.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impulse_delay_remaining: Option<String>,
    /// Configured delay period, `HH:MM`. Gambling only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impulse_delay_period: Option<String>,
}

impl ControlEntry {
    /// Returns true when this entry is enabled and its stored type string
    /// parses to the requested control type.
    #[must_use]
    pub fn is_enabled_as(&self, control_type: ControlType) -> bool {
        self.is_enabled && parse_control_type(&self.control_type) == Ok(control_type)
    }
}

// ============================================================================
// SECTION: Control Document
// ============================================================================

/// Sentinel document identifier denoting an unenrolled card account.
pub const NOT_ENROLLED: &str = "NOT_ENROLLED";

/// Remote aggregate of all controls set for a card's account.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlDocument {
    /// Gateway-assigned document identifier.
    pub document_id: DocumentId,
    /// Whole-card block entries.
    #[serde(default)]
    pub global_controls: Vec<ControlEntry>,
    /// Channel-based transaction restriction entries.
    #[serde(default)]
    pub transaction_controls: Vec<ControlEntry>,
    /// Merchant-category restriction entries.
    #[serde(default)]
    pub merchant_controls: Vec<ControlEntry>,
}

impl ControlDocument {
    /// Creates an empty document with the given identifier.
    #[must_use]
    pub fn empty(document_id: DocumentId) -> Self {
        Self {
            document_id,
            global_controls: Vec::new(),
            transaction_controls: Vec::new(),
            merchant_controls: Vec::new(),
        }
    }

    /// Returns true when the account behind this document is enrolled.
    #[must_use]
    pub fn is_enrolled(&self) -> bool {
        self.document_id.as_str() != NOT_ENROLLED
    }

    /// Returns true when the document holds no entries in any category.
    #[must_use]
    pub fn has_no_entries(&self) -> bool {
        self.global_controls.is_empty()
            && self.transaction_controls.is_empty()
            && self.merchant_controls.is_empty()
    }

    /// Returns the entry list backing the given category, or an empty slice
    /// for [`ControlCategory::Unknown`].
    #[must_use]
    pub fn entries_for(&self, category: ControlCategory) -> &[ControlEntry] {
        match category {
            ControlCategory::Global => &self.global_controls,
            ControlCategory::Transaction => &self.transaction_controls,
            ControlCategory::Merchant => &self.merchant_controls,
            ControlCategory::Unknown => &[],
        }
    }

    /// Returns the first enabled global entry, irrespective of its stored
    /// type string.
    #[must_use]
    pub fn first_enabled_global(&self) -> Option<&ControlEntry> {
        self.global_controls.iter().find(|entry| entry.is_enabled)
    }
}

// ============================================================================
// SECTION: Lookup
// ============================================================================

/// Finds the first enabled entry matching a control type.
///
/// Global lookups match any enabled global entry irrespective of the stored
/// type string; transaction and merchant lookups require the stored string to
/// parse back to the requested type. Disabled entries never match.
#[must_use]
pub fn find_control_by_type(
    document: &ControlDocument,
    control_type: ControlType,
) -> Option<&ControlEntry> {
    match control_type.category() {
        ControlCategory::Global => document.first_enabled_global(),
        ControlCategory::Transaction => document
            .transaction_controls
            .iter()
            .find(|entry| entry.is_enabled_as(control_type)),
        ControlCategory::Merchant => document
            .merchant_controls
            .iter()
            .find(|entry| entry.is_enabled_as(control_type)),
        ControlCategory::Unknown => None,
    }
}
