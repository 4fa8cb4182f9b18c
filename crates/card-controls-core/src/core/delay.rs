// card-controls-core/src/core/delay.rs
// ============================================================================
// Module: Gambling Impulse Delay
// Description: Impulse-delay state machine and temporal field parsing.
// Purpose: Decide whether a gambling control may be removed or must cool down.
// Dependencies: crate::core::document, time, tracing
// ============================================================================

//! ## Overview
//! The gambling control carries a cooldown that deters impulsive re-enabling:
//! removal is deferred while a delay window is counting down. A delay exists
//! only when the gateway recorded all four delay fields; a missing or partial
//! set of fields means no delay was ever applied, which callers must
//! distinguish from an active delay. Unparseable temporal values degrade to
//! `None` with a diagnostic, never to an error.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use time::Duration;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::macros::format_description;

use crate::core::document::ControlEntry;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Remaining-countdown sentinel meaning the delay window has fully elapsed.
pub const ZERO_REMAINING: &str = "00:00:00";

/// Cooldown applied when a removal is deferred: the impulse timer restarts
/// at this fixed period regardless of the previously configured one.
pub const COOLDOWN_PERIOD: Duration = Duration::hours(48);

/// Gateway encoding (`HH:MM`) of [`COOLDOWN_PERIOD`].
pub const COOLDOWN_PERIOD_ENCODED: &str = "48:00";

// ============================================================================
// SECTION: Delay State
// ============================================================================

/// Impulse-delay sub-state of a gambling control entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayState {
    /// No delay has ever been applied; all four delay fields were never set.
    NoDelay,
    /// A delay window is counting down; removal must be deferred.
    Active,
    /// The delay window has elapsed; removal may proceed.
    Expired,
}

impl DelayState {
    /// Returns true when an existing delay window permits removal.
    ///
    /// This is false for [`DelayState::NoDelay`]: no window exists to bypass.
    /// Callers allowing removal must therefore branch on
    /// [`DelayState::blocks_removal`] rather than on this accessor alone.
    #[must_use]
    pub const fn can_bypass(self) -> bool {
        matches!(self, Self::Expired)
    }

    /// Returns true when removal of the control must be deferred.
    #[must_use]
    pub const fn blocks_removal(self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Raw impulse-delay window recorded by the gateway.
///
/// # Invariants
/// - Present only when the gateway recorded all four fields; a partial field
///   set means the delay does not exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImpulseDelay {
    /// Window start, `YYYY/MM/DD hh:mm:ss`.
    pub start: String,
    /// Window end, `YYYY/MM/DD hh:mm:ss`.
    pub end: String,
    /// Remaining countdown, `hh:mm:ss`.
    pub remaining: String,
    /// Configured period, `HH:MM`.
    pub period: String,
}

impl ImpulseDelay {
    /// Extracts the delay window from an entry when all four fields exist.
    #[must_use]
    pub fn from_entry(entry: &ControlEntry) -> Option<Self> {
        Some(Self {
            start: entry.impulse_delay_start.clone()?,
            end: entry.impulse_delay_end.clone()?,
            remaining: entry.impulse_delay_remaining.clone()?,
            period: entry.impulse_delay_period.clone()?,
        })
    }

    /// Returns true when the remaining countdown has reached zero.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining == ZERO_REMAINING
    }

    /// Classifies the entry's delay sub-state.
    #[must_use]
    pub fn state_of(entry: &ControlEntry) -> DelayState {
        Self::from_entry(entry).map_or(DelayState::NoDelay, |delay| {
            if delay.is_expired() {
                DelayState::Expired
            } else {
                DelayState::Active
            }
        })
    }
}

// ============================================================================
// SECTION: Temporal Parsing
// ============================================================================

/// Parses a delay start timestamp into an absolute UTC instant.
///
/// The gateway emits `YYYY/MM/DD hh:mm:ss`, with dashes observed in older
/// documents; dashes are normalized to slashes before parsing. Unparseable
/// values yield `None` and a diagnostic.
#[must_use]
pub fn parse_delay_start(value: &str) -> Option<OffsetDateTime> {
    let format = format_description!("[year]/[month]/[day] [hour]:[minute]:[second]");
    let normalized = value.replace('-', "/");
    match PrimitiveDateTime::parse(&normalized, format) {
        Ok(parsed) => Some(parsed.assume_utc()),
        Err(err) => {
            tracing::warn!(value, error = %err, "unparseable impulse-delay start");
            None
        }
    }
}

/// Parses a delay period into a duration.
///
/// The gateway encodes periods as `HH:MM`, reinterpreted here as an
/// `HHhMMm` duration. Unparseable values yield `None` and a diagnostic.
#[must_use]
pub fn parse_delay_period(value: &str) -> Option<Duration> {
    let parsed = value.split_once(':').and_then(|(hours, minutes)| {
        Some((hours.parse::<i64>().ok()?, minutes.parse::<i64>().ok()?))
    });
    match parsed {
        Some((hours, minutes)) if hours >= 0 && (0..60).contains(&minutes) => {
            Some(Duration::hours(hours) + Duration::minutes(minutes))
        }
        _ => {
            tracing::warn!(value, "unparseable impulse-delay period");
            None
        }
    }
}
