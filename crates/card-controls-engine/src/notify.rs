// card-controls-engine/src/notify.rs
// ============================================================================
// Module: Notification Composition
// Description: Push-notification title and body composition.
// Purpose: Compose owner-facing notifications keyed off control mutations.
// Dependencies: card-controls-core, serde
// ============================================================================

//! ## Overview
//! When a persona other than the card owner mutates controls, the owner is
//! notified. Composition is a pure function of the control type and the
//! mutation direction; delivery happens through the dispatcher interface as
//! a detached side effect.

// ============================================================================
// SECTION: Imports
// ============================================================================

use card_controls_core::ControlType;
use serde::Deserialize;
use serde::Serialize;

use crate::interfaces::ControlAction;

// ============================================================================
// SECTION: Notification Content
// ============================================================================

/// Composed push-notification payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationContent {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
}

/// Composes the owner notification for one control mutation.
#[must_use]
pub fn compose_notification(
    control_type: ControlType,
    action: ControlAction,
) -> NotificationContent {
    let title = match action {
        ControlAction::Applied => "Card control turned on".to_string(),
        ControlAction::Removed => "Card control turned off".to_string(),
    };
    let label = control_label(control_type);
    let body = match action {
        ControlAction::Applied => {
            format!("A block on {label} was turned on for your card.")
        }
        ControlAction::Removed => {
            format!("A block on {label} was turned off for your card.")
        }
    };
    NotificationContent {
        title,
        body,
    }
}

/// Human-readable label for a control type.
const fn control_label(control_type: ControlType) -> &'static str {
    match control_type {
        ControlType::Unspecified => "this card",
        ControlType::GlobalBlock => "all transactions",
        ControlType::AtmWithdraw => "ATM withdrawals",
        ControlType::ECommerce => "online purchases",
        ControlType::Contactless => "contactless payments",
        ControlType::CrossBorder => "cross-border transactions",
        ControlType::AutoPay => "automatic payments",
        ControlType::BrickAndMortar => "in-store purchases",
        ControlType::Alcohol => "alcohol merchants",
        ControlType::AdultEntertainment => "adult entertainment merchants",
        ControlType::Airfare => "airfare merchants",
        ControlType::Gambling => "gambling merchants",
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
