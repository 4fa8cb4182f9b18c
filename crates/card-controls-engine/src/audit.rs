// card-controls-engine/src/audit.rs
// ============================================================================
// Module: Control Audit Logging
// Description: Structured audit records for mutating control operations.
// Purpose: Emit validated audit lines without hard logging dependencies.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Every mutating call publishes an audit record regardless of its outcome.
//! Records are validated before publish; a validation failure is logged and
//! never blocks the publish attempt. Sinks are intentionally lightweight so
//! deployments can route records to their preferred pipeline without
//! redesign.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Audit Record
// ============================================================================

/// Audit record published after every mutating control operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlAuditRecord {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Operation name (method admission key).
    pub operation: &'static str,
    /// The card the operation targeted.
    pub card_token: String,
    /// Last four digits of the account number, when resolved.
    pub last_four: Option<String>,
    /// Account numbers linked to the card, when resolved.
    pub account_numbers: Vec<String>,
    /// Requested control types, as wire names.
    pub control_types: Vec<String>,
    /// Outcome label: `SUCCESS` or the failure reason code.
    pub outcome: &'static str,
}

/// Inputs required to construct an audit record.
pub struct ControlAuditRecordParams {
    /// Operation name (method admission key).
    pub operation: &'static str,
    /// The card the operation targeted.
    pub card_token: String,
    /// Last four digits of the account number, when resolved.
    pub last_four: Option<String>,
    /// Account numbers linked to the card, when resolved.
    pub account_numbers: Vec<String>,
    /// Requested control types, as wire names.
    pub control_types: Vec<String>,
    /// Outcome label: `SUCCESS` or the failure reason code.
    pub outcome: &'static str,
}

/// Audit record validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuditValidationError {
    /// The record names no card.
    #[error("audit record is missing a card token")]
    MissingCardToken,
    /// The last-four digits are not four ASCII digits.
    #[error("audit record last-four is malformed: {0}")]
    MalformedLastFour(String),
}

impl ControlAuditRecord {
    /// Creates a new audit record with a consistent timestamp.
    #[must_use]
    pub fn new(params: ControlAuditRecordParams) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "control_mutation",
            timestamp_ms,
            operation: params.operation,
            card_token: params.card_token,
            last_four: params.last_four,
            account_numbers: params.account_numbers,
            control_types: params.control_types,
            outcome: params.outcome,
        }
    }

    /// Validates the record before publish.
    ///
    /// # Errors
    ///
    /// Returns [`AuditValidationError`] describing the first malformed field.
    pub fn validate(&self) -> Result<(), AuditValidationError> {
        if self.card_token.is_empty() {
            return Err(AuditValidationError::MissingCardToken);
        }
        if let Some(last_four) = &self.last_four
            && (last_four.len() != 4 || !last_four.bytes().all(|digit| digit.is_ascii_digit()))
        {
            return Err(AuditValidationError::MalformedLastFour(last_four.clone()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for control mutation records.
pub trait AuditSink: Send + Sync {
    /// Records an audit event.
    fn record(&self, record: &ControlAuditRecord);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record(&self, record: &ControlAuditRecord) {
        if let Ok(payload) = serde_json::to_string(record) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _record: &ControlAuditRecord) {}
}

/// Audit sink that retains records in memory. For tests and local demos.
#[derive(Default)]
pub struct MemoryAuditSink {
    /// Recorded events protected by a mutex.
    records: Mutex<Vec<ControlAuditRecord>>,
}

impl MemoryAuditSink {
    /// Creates an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded events.
    #[must_use]
    pub fn records(&self) -> Vec<ControlAuditRecord> {
        self.records.lock().map_or_else(|_| Vec::new(), |guard| guard.clone())
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, record: &ControlAuditRecord) {
        if let Ok(mut guard) = self.records.lock() {
            guard.push(record.clone());
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
