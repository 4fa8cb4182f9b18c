// card-controls-core/src/runtime/request.rs
// ============================================================================
// Module: Control Request Building
// Description: Category-split create and delete request construction.
// Purpose: Turn requested control types into gateway payloads under admission.
// Dependencies: crate::core, crate::runtime::gate, serde, thiserror
// ============================================================================

//! ## Overview
//! Create requests stamp every entry with the acting persona and the decline
//! and alert policy, after an admission check against the control-type gate;
//! the first gated-off type aborts the whole batch. Delete requests copy the
//! literal entries already present in the existing document, and "nothing to
//! delete" is a normal outcome rather than an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::control_type::ControlCategory;
use crate::core::control_type::ControlType;
use crate::core::delay::COOLDOWN_PERIOD_ENCODED;
use crate::core::document::ControlDocument;
use crate::core::document::ControlEntry;
use crate::core::document::find_control_by_type;
use crate::core::identifiers::PersonaId;
use crate::runtime::gate::AdmissionGate;

// ============================================================================
// SECTION: Control Request
// ============================================================================

/// Category-split create or delete payload sent to the gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlRequest {
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

impl ControlRequest {
    /// Returns true when the request carries no entries in any category.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.global_controls.is_empty()
            && self.transaction_controls.is_empty()
            && self.merchant_controls.is_empty()
    }

    /// Returns the entry list for the given category, or an empty slice for
    /// [`ControlCategory::Unknown`].
    #[must_use]
    pub fn entries_for(&self, category: ControlCategory) -> &[ControlEntry] {
        match category {
            ControlCategory::Global => &self.global_controls,
            ControlCategory::Transaction => &self.transaction_controls,
            ControlCategory::Merchant => &self.merchant_controls,
            ControlCategory::Unknown => &[],
        }
    }

    /// Pushes an entry into the list backing the given category.
    fn push(&mut self, category: ControlCategory, entry: ControlEntry) {
        match category {
            ControlCategory::Global => self.global_controls.push(entry),
            ControlCategory::Transaction => self.transaction_controls.push(entry),
            ControlCategory::Merchant => self.merchant_controls.push(entry),
            ControlCategory::Unknown => {}
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Request building errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestBuildError {
    /// A requested control type is gated off.
    #[error("control type is not currently available: {0}")]
    FeatureDisabled(String),
    /// A requested control type cannot be built into a request.
    #[error("control type cannot be requested: {0}")]
    Unsupported(String),
}

// ============================================================================
// SECTION: Create Requests
// ============================================================================

/// Builds a create request for the given control types.
///
/// Admission is checked for every type before any entry is built, in request
/// order, so the first gated-off type wins and no partial request escapes.
/// Entries are stamped enabled with decline-all; transaction and merchant
/// entries additionally alert on decline and all entries carry the acting
/// persona as owner.
///
/// # Errors
///
/// Returns [`RequestBuildError::FeatureDisabled`] naming the first gated-off
/// type, or [`RequestBuildError::Unsupported`] for
/// [`ControlType::Unspecified`].
pub fn build_create_request(
    types: &[ControlType],
    persona: &PersonaId,
    gate: &dyn AdmissionGate,
) -> Result<ControlRequest, RequestBuildError> {
    for control_type in types {
        if control_type.category() == ControlCategory::Unknown {
            return Err(RequestBuildError::Unsupported(control_type.wire_name().to_string()));
        }
        if !gate.enabled(control_type.wire_name()) {
            return Err(RequestBuildError::FeatureDisabled(control_type.wire_name().to_string()));
        }
    }
    let mut request = ControlRequest::default();
    for control_type in types {
        request.push(control_type.category(), create_entry(*control_type, persona));
    }
    Ok(request)
}

/// Builds the gambling re-apply request issued when a removal is deferred.
///
/// The period is forcibly reset to the fixed cooldown so a remove call can
/// never shorten the impulse timer. The re-apply is system-initiated and is
/// not admission-checked: gating off gambling must not break the cooldown.
#[must_use]
pub fn build_gambling_reapply_request(persona: &PersonaId) -> ControlRequest {
    let mut entry = create_entry(ControlType::Gambling, persona);
    entry.impulse_delay_period = Some(COOLDOWN_PERIOD_ENCODED.to_string());
    let mut request = ControlRequest::default();
    request.push(ControlCategory::Merchant, entry);
    request
}

/// Stamps one create entry for a control type.
fn create_entry(control_type: ControlType, persona: &PersonaId) -> ControlEntry {
    ControlEntry {
        control_type: control_type.wire_name().to_string(),
        is_enabled: true,
        owner_id: Some(persona.as_str().to_string()),
        should_decline_all: true,
        should_alert_on_decline: match control_type.category() {
            ControlCategory::Global | ControlCategory::Unknown => None,
            ControlCategory::Transaction | ControlCategory::Merchant => Some(true),
        },
        impulse_delay_start: None,
        impulse_delay_end: None,
        impulse_delay_remaining: None,
        impulse_delay_period: None,
    }
}

// ============================================================================
// SECTION: Delete Requests
// ============================================================================

/// Builds a delete request by locating existing enabled entries.
///
/// For each requested type, the first enabled matching entry in the existing
/// document is copied literally into the payload (global: first enabled
/// global entry irrespective of its stored type string). Returns `None` when
/// none of the requested types are found enabled; this is the normal
/// "nothing to delete" outcome, not an error.
#[must_use]
pub fn build_delete_request(
    types: &[ControlType],
    document: &ControlDocument,
) -> Option<ControlRequest> {
    let mut request = ControlRequest::default();
    for control_type in types {
        if let Some(entry) = find_control_by_type(document, *control_type) {
            request.push(control_type.category(), entry.clone());
        }
    }
    if request.is_empty() { None } else { Some(request) }
}
