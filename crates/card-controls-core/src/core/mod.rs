// card-controls-core/src/core/mod.rs
// ============================================================================
// Module: Card Controls Core Types
// Description: Canonical control-type, document, and delay structures.
// Purpose: Provide stable, serializable types for the control gateway surface.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Core types define the control-type taxonomy, the remote control-document
//! wire shapes, and the gambling impulse-delay model. These types are the
//! canonical source of truth for any derived API surfaces.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod control_type;
pub mod delay;
pub mod document;
pub mod identifiers;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use control_type::ALL_CONTROL_TYPES;
pub use control_type::ControlCategory;
pub use control_type::ControlType;
pub use control_type::UnknownControlTypeError;
pub use control_type::parse_control_type;
pub use delay::COOLDOWN_PERIOD;
pub use delay::COOLDOWN_PERIOD_ENCODED;
pub use delay::DelayState;
pub use delay::ImpulseDelay;
pub use delay::ZERO_REMAINING;
pub use delay::parse_delay_period;
pub use delay::parse_delay_start;
pub use document::ControlDocument;
pub use document::ControlEntry;
pub use document::NOT_ENROLLED;
pub use document::find_control_by_type;
pub use identifiers::AccountNumber;
pub use identifiers::CardToken;
pub use identifiers::DocumentId;
pub use identifiers::PersonaId;
