// card-controls-engine/src/interfaces.rs
// ============================================================================
// Module: Collaborator Interfaces
// Description: Backend-agnostic interfaces for the engine's collaborators.
// Purpose: Define the contract surfaces consumed by the reconciliation flows.
// Dependencies: card-controls-core, async-trait, serde, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how the engine integrates with card entitlement,
//! eligibility, the card-number vault, the remote control-document gateway,
//! and event/notification publishing, without embedding backend details.
//! Implementations must fail closed on missing or invalid data; the engine
//! performs no retries on their behalf.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use card_controls_core::AccountNumber;
use card_controls_core::CardToken;
use card_controls_core::ControlDocument;
use card_controls_core::ControlRequest;
use card_controls_core::ControlType;
use card_controls_core::DocumentId;
use card_controls_core::PersonaId;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::notify::NotificationContent;

// ============================================================================
// SECTION: Entitlement Verifier
// ============================================================================

/// Card account information returned by the entitlement service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitledCard {
    /// The entitled card token.
    pub card_token: CardToken,
    /// Persona that owns the card.
    pub owner: PersonaId,
    /// Account numbers linked to the card.
    pub account_numbers: Vec<String>,
}

/// Entitlement verification errors.
#[derive(Debug, Error)]
pub enum EntitlementError {
    /// The card is not entitled to the requesting persona.
    #[error("card is not entitled to the requesting persona: {0}")]
    NotEntitled(String),
    /// The entitlement service reported an error.
    #[error("entitlement check failed: {0}")]
    Unavailable(String),
}

/// Ownership and entitlement verification.
#[async_trait]
pub trait EntitlementVerifier: Send + Sync {
    /// Resolves the entitled card for the acting persona and operation.
    ///
    /// # Errors
    ///
    /// Returns [`EntitlementError`] when the card is not entitled or the
    /// check cannot be performed.
    async fn entitled_card(
        &self,
        card_token: &CardToken,
        operation: &str,
    ) -> Result<EntitledCard, EntitlementError>;
}

// ============================================================================
// SECTION: Eligibility Checker
// ============================================================================

/// Eligibility check errors.
#[derive(Debug, Error)]
pub enum EligibilityError {
    /// The action is not eligible for this card.
    #[error("action not eligible for card: {0}")]
    Denied(String),
    /// The eligibility service reported an error.
    #[error("eligibility check failed: {0}")]
    Unavailable(String),
}

/// Fine-grained action eligibility.
#[async_trait]
pub trait EligibilityChecker: Send + Sync {
    /// Checks whether the action may be performed against the card.
    ///
    /// # Errors
    ///
    /// Returns [`EligibilityError`] when the action is denied or the check
    /// cannot be performed.
    async fn can(&self, action: &str, card_token: &CardToken) -> Result<(), EligibilityError>;
}

// ============================================================================
// SECTION: Card Vault
// ============================================================================

/// Card vault errors.
#[derive(Debug, Error)]
pub enum VaultError {
    /// The card token or number is malformed.
    #[error("malformed card number: {0}")]
    Malformed(String),
    /// The vault reported an error.
    #[error("card vault unavailable: {0}")]
    Unavailable(String),
}

/// Token-to-number resolution through the card vault.
#[async_trait]
pub trait CardVault: Send + Sync {
    /// Resolves one card token into its plaintext account number.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError`] when resolution fails.
    async fn decode_card_number(&self, card_token: &CardToken)
    -> Result<AccountNumber, VaultError>;

    /// Resolves a batch of card tokens, preserving input order.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError`] when any resolution fails.
    async fn decode_card_numbers(
        &self,
        card_tokens: &[CardToken],
    ) -> Result<Vec<AccountNumber>, VaultError>;
}

// ============================================================================
// SECTION: Control Gateway
// ============================================================================

/// Remote control-document gateway errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The gateway holds no document or resource for the request.
    #[error("control document not found")]
    NotFound,
    /// The gateway reported an error.
    #[error("control gateway unavailable: {0}")]
    Unavailable(String),
}

/// Remote control-document gateway.
///
/// The document is owned by the gateway: the engine fetches it per call,
/// mutates it through explicit requests, and never caches it.
#[async_trait]
pub trait ControlGateway: Send + Sync {
    /// Fetches the control document for an account.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the fetch fails.
    async fn list_control_documents(
        &self,
        pan: &AccountNumber,
    ) -> Result<ControlDocument, GatewayError>;

    /// Creates controls on a document and returns the resulting document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the create fails.
    async fn create_controls(
        &self,
        document_id: &DocumentId,
        request: &ControlRequest,
    ) -> Result<ControlDocument, GatewayError>;

    /// Updates controls on a document and returns the resulting document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the update fails.
    async fn update_controls(
        &self,
        document_id: &DocumentId,
        request: &ControlRequest,
    ) -> Result<ControlDocument, GatewayError>;

    /// Deletes controls from a document and returns the resulting document.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the delete fails.
    async fn delete_controls(
        &self,
        document_id: &DocumentId,
        request: &ControlRequest,
    ) -> Result<ControlDocument, GatewayError>;

    /// Enrolls an account and returns its new document identifier.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when registration fails.
    async fn registration(&self, pan: &AccountNumber) -> Result<DocumentId, GatewayError>;

    /// Moves an enrollment from an old account number to a new one.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError`] when the replacement fails.
    async fn replace(
        &self,
        old_pan: &AccountNumber,
        new_pan: &AccountNumber,
    ) -> Result<bool, GatewayError>;
}

// ============================================================================
// SECTION: Event Publisher
// ============================================================================

/// Direction of a control mutation, as published to downstream consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAction {
    /// Controls were applied or re-applied.
    Applied,
    /// Controls were removed.
    Removed,
}

/// Control mutation event emitted after a successful gateway call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlEvent {
    /// The mutated card.
    pub card_token: CardToken,
    /// Control types named by the request.
    pub control_types: Vec<ControlType>,
    /// Mutation direction.
    pub action: ControlAction,
}

/// Event publishing errors.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The publisher reported an error.
    #[error("event publish failed: {0}")]
    Failed(String),
}

/// Fire-and-forget event emission.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publishes a control mutation event.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when publishing fails; callers treat this as
    /// best-effort and never fail the primary operation.
    async fn publish(&self, event: ControlEvent) -> Result<(), PublishError>;
}

// ============================================================================
// SECTION: Notification Dispatcher
// ============================================================================

/// Notification dispatch errors.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// The dispatcher reported an error.
    #[error("notification dispatch failed: {0}")]
    Failed(String),
}

/// Persona-targeted push notification delivery.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Delivers a composed notification to a persona.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when delivery fails; callers treat this as
    /// best-effort and never fail the primary operation.
    async fn dispatch(
        &self,
        persona: &PersonaId,
        content: NotificationContent,
    ) -> Result<(), NotifyError>;
}
