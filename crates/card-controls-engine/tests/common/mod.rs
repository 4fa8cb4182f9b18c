// crates/card-controls-engine/tests/common/mod.rs
// ============================================================================
// Module: Common Test Fixtures
// Description: Mock collaborators and harness for engine workflow tests.
// Purpose: Provide deterministic collaborator doubles for end-to-end tests.
// Dependencies: card-controls-core, card-controls-engine
// ============================================================================

//! ## Overview
//! This module provides in-memory mock collaborators recording every call,
//! plus a harness builder wiring them into an engine. The gateway mock keeps
//! one document per account number and applies create/update/delete requests
//! structurally, so tests can assert both the returned views and the calls
//! the gateway actually recorded.

#![allow(dead_code, reason = "Shared test helpers may be unused in some cases.")]
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::unwrap_in_result,
    reason = "Test fixtures favor direct unwraps for setup clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use card_controls_core::AccountNumber;
use card_controls_core::CardToken;
use card_controls_core::ControlDocument;
use card_controls_core::ControlRequest;
use card_controls_core::DocumentId;
use card_controls_core::NOT_ENROLLED;
use card_controls_core::PersonaId;
use card_controls_engine::CardVault;
use card_controls_engine::Collaborators;
use card_controls_engine::ControlEvent;
use card_controls_engine::ControlGateway;
use card_controls_engine::ControlsEngine;
use card_controls_engine::EligibilityChecker;
use card_controls_engine::EligibilityError;
use card_controls_engine::EngineConfig;
use card_controls_engine::EntitledCard;
use card_controls_engine::EntitlementError;
use card_controls_engine::EntitlementVerifier;
use card_controls_engine::EventPublisher;
use card_controls_engine::GatewayError;
use card_controls_engine::MemoryAuditSink;
use card_controls_engine::NotificationContent;
use card_controls_engine::NotificationDispatcher;
use card_controls_engine::NotifyError;
use card_controls_engine::PublishError;
use card_controls_engine::VaultError;

// ============================================================================
// SECTION: Entitlements
// ============================================================================

/// Entitlement verifier backed by a static card map.
pub struct StaticEntitlements {
    /// Entitled cards keyed by token.
    cards: BTreeMap<String, EntitledCard>,
}

#[async_trait]
impl EntitlementVerifier for StaticEntitlements {
    async fn entitled_card(
        &self,
        card_token: &CardToken,
        _operation: &str,
    ) -> Result<EntitledCard, EntitlementError> {
        self.cards
            .get(card_token.as_str())
            .cloned()
            .ok_or_else(|| EntitlementError::NotEntitled(card_token.to_string()))
    }
}

// ============================================================================
// SECTION: Eligibility
// ============================================================================

/// Eligibility checker denying a static set of cards.
pub struct StaticEligibility {
    /// Card tokens that fail every eligibility check.
    denied: BTreeSet<String>,
}

#[async_trait]
impl EligibilityChecker for StaticEligibility {
    async fn can(&self, _action: &str, card_token: &CardToken) -> Result<(), EligibilityError> {
        if self.denied.contains(card_token.as_str()) {
            return Err(EligibilityError::Denied(card_token.to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Vault
// ============================================================================

/// Card vault backed by a static token-to-number map.
pub struct StaticVault {
    /// Account numbers keyed by card token.
    numbers: BTreeMap<String, String>,
}

#[async_trait]
impl CardVault for StaticVault {
    async fn decode_card_number(
        &self,
        card_token: &CardToken,
    ) -> Result<AccountNumber, VaultError> {
        self.numbers
            .get(card_token.as_str())
            .map(|pan| AccountNumber::new(pan.clone()))
            .ok_or_else(|| VaultError::Malformed(card_token.to_string()))
    }

    async fn decode_card_numbers(
        &self,
        card_tokens: &[CardToken],
    ) -> Result<Vec<AccountNumber>, VaultError> {
        let mut numbers = Vec::with_capacity(card_tokens.len());
        for card_token in card_tokens {
            numbers.push(self.decode_card_number(card_token).await?);
        }
        Ok(numbers)
    }
}

// ============================================================================
// SECTION: Gateway
// ============================================================================

/// Gateway calls recorded by the mock, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    /// Document fetch.
    List,
    /// Controls created.
    Create,
    /// Controls updated.
    Update,
    /// Controls deleted.
    Delete,
    /// Account enrolled.
    Registration,
    /// Enrollment moved between accounts.
    Replace,
}

/// Mutable mock gateway state.
#[derive(Default)]
struct GatewayState {
    /// Documents keyed by account number.
    documents: BTreeMap<String, ControlDocument>,
    /// Account numbers keyed by document identifier.
    accounts_by_id: BTreeMap<String, String>,
    /// Recorded calls in order.
    calls: Vec<GatewayCall>,
    /// Account numbers whose document fetch fails.
    fail_list: BTreeSet<String>,
    /// Monotonic document id counter for registrations.
    next_id: usize,
}

/// In-memory control gateway applying requests structurally.
#[derive(Default)]
pub struct MockGateway {
    /// State protected by a mutex.
    state: Mutex<GatewayState>,
}

impl MockGateway {
    /// Seeds a document for an account number.
    pub fn seed_document(&self, pan: &str, document: ControlDocument) {
        let mut state = self.state.lock().unwrap();
        state
            .accounts_by_id
            .insert(document.document_id.as_str().to_string(), pan.to_string());
        state.documents.insert(pan.to_string(), document);
    }

    /// Makes document fetches fail for an account number.
    pub fn fail_list_for(&self, pan: &str) {
        self.state.lock().unwrap().fail_list.insert(pan.to_string());
    }

    /// Returns all recorded calls in order.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Returns the number of recorded calls of one kind.
    pub fn call_count(&self, call: &GatewayCall) -> usize {
        self.calls().iter().filter(|recorded| *recorded == call).count()
    }

    /// Returns the current document for an account number.
    pub fn document(&self, pan: &str) -> Option<ControlDocument> {
        self.state.lock().unwrap().documents.get(pan).cloned()
    }

    /// Applies a mutation to the document behind a document id.
    fn mutate(
        &self,
        call: GatewayCall,
        document_id: &DocumentId,
        apply: impl FnOnce(&mut ControlDocument),
    ) -> Result<ControlDocument, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        let pan = state
            .accounts_by_id
            .get(document_id.as_str())
            .cloned()
            .ok_or(GatewayError::NotFound)?;
        let document = state.documents.get_mut(&pan).ok_or(GatewayError::NotFound)?;
        apply(document);
        Ok(document.clone())
    }
}

#[async_trait]
impl ControlGateway for MockGateway {
    async fn list_control_documents(
        &self,
        pan: &AccountNumber,
    ) -> Result<ControlDocument, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::List);
        if state.fail_list.contains(pan.as_str()) {
            return Err(GatewayError::Unavailable("gateway offline".to_string()));
        }
        Ok(state
            .documents
            .get(pan.as_str())
            .cloned()
            .unwrap_or_else(|| ControlDocument::empty(DocumentId::new(NOT_ENROLLED))))
    }

    async fn create_controls(
        &self,
        document_id: &DocumentId,
        request: &ControlRequest,
    ) -> Result<ControlDocument, GatewayError> {
        let request = request.clone();
        self.mutate(GatewayCall::Create, document_id, move |document| {
            document.global_controls.extend(request.global_controls);
            document.transaction_controls.extend(request.transaction_controls);
            document.merchant_controls.extend(request.merchant_controls);
        })
    }

    async fn update_controls(
        &self,
        document_id: &DocumentId,
        request: &ControlRequest,
    ) -> Result<ControlDocument, GatewayError> {
        let request = request.clone();
        self.mutate(GatewayCall::Update, document_id, move |document| {
            document.global_controls.extend(request.global_controls);
            document.transaction_controls.extend(request.transaction_controls);
            document.merchant_controls.extend(request.merchant_controls);
        })
    }

    async fn delete_controls(
        &self,
        document_id: &DocumentId,
        request: &ControlRequest,
    ) -> Result<ControlDocument, GatewayError> {
        let request = request.clone();
        self.mutate(GatewayCall::Delete, document_id, move |document| {
            document.global_controls.retain(|entry| !request.global_controls.contains(entry));
            document
                .transaction_controls
                .retain(|entry| !request.transaction_controls.contains(entry));
            document.merchant_controls.retain(|entry| !request.merchant_controls.contains(entry));
        })
    }

    async fn registration(&self, pan: &AccountNumber) -> Result<DocumentId, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::Registration);
        state.next_id += 1;
        let document_id = DocumentId::new(format!("doc-{}", state.next_id));
        state.accounts_by_id.insert(document_id.as_str().to_string(), pan.as_str().to_string());
        state.documents.insert(pan.as_str().to_string(), ControlDocument::empty(document_id.clone()));
        Ok(document_id)
    }

    async fn replace(
        &self,
        old_pan: &AccountNumber,
        new_pan: &AccountNumber,
    ) -> Result<bool, GatewayError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(GatewayCall::Replace);
        let Some(document) = state.documents.remove(old_pan.as_str()) else {
            return Ok(false);
        };
        state
            .accounts_by_id
            .insert(document.document_id.as_str().to_string(), new_pan.as_str().to_string());
        state.documents.insert(new_pan.as_str().to_string(), document);
        Ok(true)
    }
}

// ============================================================================
// SECTION: Events And Notifications
// ============================================================================

/// Event publisher retaining every published event.
#[derive(Default)]
pub struct MockEvents {
    /// Published events in order.
    events: Mutex<Vec<ControlEvent>>,
}

impl MockEvents {
    /// Returns all published events.
    pub fn published(&self) -> Vec<ControlEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for MockEvents {
    async fn publish(&self, event: ControlEvent) -> Result<(), PublishError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Notification dispatcher retaining every delivery.
#[derive(Default)]
pub struct MockNotifications {
    /// Deliveries as (persona, content) pairs.
    sent: Mutex<Vec<(PersonaId, NotificationContent)>>,
}

impl MockNotifications {
    /// Returns all deliveries.
    pub fn sent(&self) -> Vec<(PersonaId, NotificationContent)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationDispatcher for MockNotifications {
    async fn dispatch(
        &self,
        persona: &PersonaId,
        content: NotificationContent,
    ) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push((persona.clone(), content));
        Ok(())
    }
}

// ============================================================================
// SECTION: Harness
// ============================================================================

/// Engine plus handles to every mock collaborator.
pub struct Harness {
    /// The engine under test.
    pub engine: ControlsEngine,
    /// Gateway mock.
    pub gateway: Arc<MockGateway>,
    /// Event publisher mock.
    pub events: Arc<MockEvents>,
    /// Notification dispatcher mock.
    pub notifications: Arc<MockNotifications>,
    /// In-memory audit sink.
    pub audit: Arc<MemoryAuditSink>,
}

/// Builder assembling a harness from static fixtures.
#[derive(Default)]
pub struct HarnessBuilder {
    /// Entitled cards keyed by token.
    entitled: BTreeMap<String, EntitledCard>,
    /// Card tokens failing eligibility.
    ineligible: BTreeSet<String>,
    /// Account numbers keyed by card token.
    numbers: BTreeMap<String, String>,
    /// Seeded documents as (pan, document) pairs.
    documents: Vec<(String, ControlDocument)>,
    /// Account numbers whose fetch fails.
    failing_pans: Vec<String>,
    /// Engine configuration override.
    config: Option<EngineConfig>,
}

impl HarnessBuilder {
    /// Creates an empty builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entitled card with its owner persona.
    pub fn entitle(mut self, token: &str, owner: &str) -> Self {
        self.entitled.insert(
            token.to_string(),
            EntitledCard {
                card_token: CardToken::new(token),
                owner: PersonaId::new(owner),
                account_numbers: vec![format!("acct-{token}")],
            },
        );
        self
    }

    /// Marks a card as failing every eligibility check.
    pub fn deny_eligibility(mut self, token: &str) -> Self {
        self.ineligible.insert(token.to_string());
        self
    }

    /// Maps a card token to its account number.
    pub fn number(mut self, token: &str, pan: &str) -> Self {
        self.numbers.insert(token.to_string(), pan.to_string());
        self
    }

    /// Seeds a gateway document for an account number.
    pub fn document(mut self, pan: &str, document: ControlDocument) -> Self {
        self.documents.push((pan.to_string(), document));
        self
    }

    /// Makes document fetches fail for an account number.
    pub fn fail_list_for(mut self, pan: &str) -> Self {
        self.failing_pans.push(pan.to_string());
        self
    }

    /// Overrides the engine configuration.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Builds the engine and returns it with its mock handles.
    pub fn build(self) -> Harness {
        let gateway = Arc::new(MockGateway::default());
        for (pan, document) in self.documents {
            gateway.seed_document(&pan, document);
        }
        for pan in self.failing_pans {
            gateway.fail_list_for(&pan);
        }
        let events = Arc::new(MockEvents::default());
        let notifications = Arc::new(MockNotifications::default());
        let audit = Arc::new(MemoryAuditSink::new());
        let collaborators = Collaborators {
            entitlements: Arc::new(StaticEntitlements {
                cards: self.entitled,
            }),
            eligibility: Arc::new(StaticEligibility {
                denied: self.ineligible,
            }),
            vault: Arc::new(StaticVault {
                numbers: self.numbers,
            }),
            gateway: Arc::clone(&gateway) as Arc<dyn ControlGateway>,
            events: Arc::clone(&events) as Arc<dyn EventPublisher>,
            notifications: Arc::clone(&notifications) as Arc<dyn NotificationDispatcher>,
            audit: Arc::clone(&audit) as Arc<dyn card_controls_engine::AuditSink>,
        };
        let config = self.config.unwrap_or_default();
        let engine = ControlsEngine::from_config(collaborators, &config).unwrap();
        Harness {
            engine,
            gateway,
            events,
            notifications,
            audit,
        }
    }
}
