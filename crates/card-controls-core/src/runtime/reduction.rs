// card-controls-core/src/runtime/reduction.rs
// ============================================================================
// Module: Control Document Reduction
// Description: Reduce a raw remote document into the deduplicated client view.
// Purpose: Collapse redundant gateway entries to at most one control per type.
// Dependencies: crate::core, serde, time, tracing
// ============================================================================

//! ## Overview
//! The remote document may hold several entries of one control type
//! contributed by different owners. Reduction ignores ownership and keeps the
//! first enabled entry per type; any enabled global entry collapses to a
//! single whole-card block. Gambling controls additionally carry their parsed
//! impulse-delay start and period. The emitted order is unspecified and
//! consumers must not depend on it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use time::Duration;
use time::OffsetDateTime;

use crate::core::control_type::ControlType;
use crate::core::control_type::parse_control_type;
use crate::core::delay::parse_delay_period;
use crate::core::delay::parse_delay_start;
use crate::core::document::ControlDocument;
use crate::core::document::ControlEntry;
use crate::core::identifiers::CardToken;

// ============================================================================
// SECTION: Client View
// ============================================================================

/// One deduplicated, client-facing control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardControl {
    /// The control type.
    pub control_type: ControlType,
    /// Absolute impulse-delay start. Populated for gambling only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(with = "time::serde::rfc3339::option")]
    pub impulse_delay_start: Option<OffsetDateTime>,
    /// Configured impulse-delay period. Populated for gambling only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impulse_delay_period: Option<Duration>,
}

impl CardControl {
    /// Creates a control with no delay metadata.
    #[must_use]
    pub const fn plain(control_type: ControlType) -> Self {
        Self {
            control_type,
            impulse_delay_start: None,
            impulse_delay_period: None,
        }
    }
}

/// Reduced view of one card's controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardControlSet {
    /// The card this view belongs to.
    pub card_token: CardToken,
    /// At most one control per control type; order unspecified.
    pub controls: Vec<CardControl>,
}

impl CardControlSet {
    /// Creates an empty view for a card.
    #[must_use]
    pub const fn empty(card_token: CardToken) -> Self {
        Self {
            card_token,
            controls: Vec::new(),
        }
    }

    /// Returns the control of the given type, when present.
    #[must_use]
    pub fn control(&self, control_type: ControlType) -> Option<&CardControl> {
        self.controls.iter().find(|control| control.control_type == control_type)
    }
}

// ============================================================================
// SECTION: Reduction
// ============================================================================

/// Reduces a remote document into the deduplicated client view.
///
/// A missing document reduces to an empty view, not an error. Disabled
/// entries, entries whose stored type string does not parse, and duplicate
/// types after the first enabled entry are all skipped.
#[must_use]
pub fn reduce_document(document: Option<&ControlDocument>, card_token: &CardToken) -> CardControlSet {
    let Some(document) = document else {
        return CardControlSet::empty(card_token.clone());
    };
    let mut seen: BTreeSet<&'static str> = BTreeSet::new();
    let mut controls = Vec::new();

    // Any enabled global entry collapses to exactly one whole-card block,
    // irrespective of how many entries exist or what type strings they carry.
    if document.first_enabled_global().is_some() {
        seen.insert(ControlType::GlobalBlock.wire_name());
        controls.push(CardControl::plain(ControlType::GlobalBlock));
    }

    for entry in document.transaction_controls.iter().chain(&document.merchant_controls) {
        if let Some(control) = reduce_entry(entry, &mut seen) {
            controls.push(control);
        }
    }

    CardControlSet {
        card_token: card_token.clone(),
        controls,
    }
}

/// Reduces one raw entry, tracking already-emitted types.
fn reduce_entry(entry: &ControlEntry, seen: &mut BTreeSet<&'static str>) -> Option<CardControl> {
    if !entry.is_enabled {
        return None;
    }
    let control_type = match parse_control_type(&entry.control_type) {
        Ok(control_type) => control_type,
        Err(err) => {
            tracing::warn!(error = %err, "skipping entry with unparseable control type");
            return None;
        }
    };
    // First-enabled-wins; later duplicates are discarded, not merged.
    if !seen.insert(control_type.wire_name()) {
        return None;
    }
    let mut control = CardControl::plain(control_type);
    if control_type == ControlType::Gambling {
        control.impulse_delay_start =
            entry.impulse_delay_start.as_deref().and_then(parse_delay_start);
        control.impulse_delay_period =
            entry.impulse_delay_period.as_deref().and_then(parse_delay_period);
    }
    Some(control)
}
