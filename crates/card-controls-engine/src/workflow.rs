// card-controls-engine/src/workflow.rs
// ============================================================================
// Module: Control Reconciliation Workflow
// Description: Per-card orchestration for set, remove, query, and replace.
// Purpose: Reconcile requested control changes against the remote document.
// Dependencies: card-controls-core, crate::{audit, config, detach, interfaces}
// ============================================================================

//! ## Overview
//! The engine is the single canonical execution path for control mutations.
//! Each operation is admission-checked, verifies ownership, fetches the
//! remote document, computes the required change, applies it, and returns
//! the reduced client view. Secondary side effects (event publication, owner
//! notifications, the gambling re-apply) run detached from the request so
//! they survive the response being returned; their failures never affect the
//! primary outcome.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use card_controls_core::CardControlSet;
use card_controls_core::CardToken;
use card_controls_core::ControlDocument;
use card_controls_core::ControlRequest;
use card_controls_core::ControlType;
use card_controls_core::DocumentId;
use card_controls_core::FeatureGate;
use card_controls_core::ImpulseDelay;
use card_controls_core::PersonaId;
use card_controls_core::RequestBuildError;
use card_controls_core::build_create_request;
use card_controls_core::build_delete_request;
use card_controls_core::build_gambling_reapply_request;
use card_controls_core::find_control_by_type;
use card_controls_core::reduce_document;
use thiserror::Error;

use crate::audit::AuditSink;
use crate::audit::ControlAuditRecord;
use crate::audit::ControlAuditRecordParams;
use crate::config::ConfigError;
use crate::config::EngineConfig;
use crate::config::METHOD_QUERY_CONTROLS;
use crate::config::METHOD_REMOVE_CONTROLS;
use crate::config::METHOD_REPLACE_CARD;
use crate::config::METHOD_SET_CONTROLS;
use crate::detach::DetachedTasks;
use crate::interfaces::CardVault;
use crate::interfaces::ControlAction;
use crate::interfaces::ControlEvent;
use crate::interfaces::ControlGateway;
use crate::interfaces::EligibilityChecker;
use crate::interfaces::EntitlementError;
use crate::interfaces::EntitlementVerifier;
use crate::interfaces::EventPublisher;
use crate::interfaces::GatewayError;
use crate::interfaces::NotificationDispatcher;
use crate::interfaces::NotifyError;
use crate::interfaces::VaultError;
use crate::notify::NotificationContent;
use crate::notify::compose_notification;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Stable operation message for set failures.
pub(crate) const MSG_BLOCK_FAILED: &str = "block failed";

/// Stable operation message for remove failures.
pub(crate) const MSG_REMOVE_FAILED: &str = "remove failed";

/// Stable operation message for query failures.
pub(crate) const MSG_QUERY_FAILED: &str = "query failed";

/// Stable operation message for listing failures.
pub(crate) const MSG_LIST_FAILED: &str = "list failed";

/// Stable operation message for replace failures.
pub(crate) const MSG_REPLACE_FAILED: &str = "replace failed";

/// Control workflow errors.
///
/// Every variant is terminal; this engine performs no retries. Downstream
/// failures carry the original cause and a stable operation message.
#[derive(Debug, Error)]
pub enum ControlsError {
    /// The request shape is invalid.
    #[error("invalid request: {0}")]
    Validation(String),
    /// The gateway holds no document or resource for the request.
    #[error("control document not found")]
    NotFound,
    /// The named method or control type is gated off.
    #[error("feature is not currently available: {0}")]
    FeatureDisabled(String),
    /// The requested controls are already in place.
    #[error("control already exists")]
    AlreadyExists,
    /// A collaborator failed; the original cause is chained.
    #[error("{message}")]
    Downstream {
        /// Stable operation-specific message.
        message: &'static str,
        /// Original collaborator failure.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ControlsError {
    /// Returns the stable structured reason code for this error.
    #[must_use]
    pub const fn reason_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::NotFound => "NOT_FOUND",
            Self::FeatureDisabled(_) => "FEATURE_DISABLED",
            Self::AlreadyExists => "ALREADY_EXISTS",
            Self::Downstream {
                ..
            } => "DOWNSTREAM_FAILED",
        }
    }

    /// Wraps a collaborator failure with a stable operation message.
    pub(crate) fn downstream(
        message: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Downstream {
            message,
            source: Box::new(source),
        }
    }
}

/// Maps an entitlement failure into the workflow taxonomy.
pub(crate) fn entitlement_error(message: &'static str, err: EntitlementError) -> ControlsError {
    match err {
        EntitlementError::NotEntitled(_) => ControlsError::NotFound,
        EntitlementError::Unavailable(_) => ControlsError::downstream(message, err),
    }
}

/// Maps a vault failure into the workflow taxonomy.
pub(crate) fn vault_error(message: &'static str, err: VaultError) -> ControlsError {
    match err {
        VaultError::Malformed(_) => ControlsError::Validation(err.to_string()),
        VaultError::Unavailable(_) => ControlsError::downstream(message, err),
    }
}

/// Maps a gateway failure into the workflow taxonomy.
pub(crate) fn gateway_error(message: &'static str, err: GatewayError) -> ControlsError {
    match err {
        GatewayError::NotFound => ControlsError::NotFound,
        GatewayError::Unavailable(_) => ControlsError::downstream(message, err),
    }
}

// ============================================================================
// SECTION: Collaborators
// ============================================================================

/// External collaborators consumed by the engine.
#[derive(Clone)]
pub struct Collaborators {
    /// Ownership and entitlement verification.
    pub entitlements: Arc<dyn EntitlementVerifier>,
    /// Fine-grained action eligibility.
    pub eligibility: Arc<dyn EligibilityChecker>,
    /// Token-to-number resolution.
    pub vault: Arc<dyn CardVault>,
    /// Remote control-document gateway.
    pub gateway: Arc<dyn ControlGateway>,
    /// Control mutation event publisher.
    pub events: Arc<dyn EventPublisher>,
    /// Owner push-notification delivery.
    pub notifications: Arc<dyn NotificationDispatcher>,
    /// Audit record sink.
    pub audit: Arc<dyn AuditSink>,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Facts gathered along a mutation for the trailing audit record.
#[derive(Default)]
struct AuditFacts {
    /// Last four digits of the resolved account number.
    last_four: Option<String>,
    /// Account numbers linked to the entitled card.
    account_numbers: Vec<String>,
}

/// Control reconciliation engine.
#[derive(Clone)]
pub struct ControlsEngine {
    /// Ownership and entitlement verification.
    entitlements: Arc<dyn EntitlementVerifier>,
    /// Fine-grained action eligibility.
    pub(crate) eligibility: Arc<dyn EligibilityChecker>,
    /// Token-to-number resolution.
    vault: Arc<dyn CardVault>,
    /// Remote control-document gateway.
    gateway: Arc<dyn ControlGateway>,
    /// Control mutation event publisher.
    events: Arc<dyn EventPublisher>,
    /// Owner push-notification delivery.
    notifications: Arc<dyn NotificationDispatcher>,
    /// Audit record sink.
    audit: Arc<dyn AuditSink>,
    /// RPC-method admission gate.
    method_gate: Arc<FeatureGate>,
    /// Control-type admission gate.
    control_gate: Arc<FeatureGate>,
    /// Detached side-effect spawner.
    detached: DetachedTasks,
}

impl ControlsEngine {
    /// Builds an engine from validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when the configuration fails validation.
    pub fn from_config(
        collaborators: Collaborators,
        config: &EngineConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let method_gate = Arc::new(FeatureGate::new(
            config.methods.iter().map(|(key, value)| (key.clone(), *value)),
        ));
        let control_gate = Arc::new(FeatureGate::new(
            config.control_types.iter().map(|(key, value)| (key.clone(), *value)),
        ));
        let detached = DetachedTasks::new(Duration::from_millis(config.detached_task_timeout_ms));
        Ok(Self {
            entitlements: collaborators.entitlements,
            eligibility: collaborators.eligibility,
            vault: collaborators.vault,
            gateway: collaborators.gateway,
            events: collaborators.events,
            notifications: collaborators.notifications,
            audit: collaborators.audit,
            method_gate,
            control_gate,
            detached,
        })
    }

    /// Returns the RPC-method admission gate for runtime flag updates.
    #[must_use]
    pub const fn method_gate(&self) -> &Arc<FeatureGate> {
        &self.method_gate
    }

    /// Returns the control-type admission gate for runtime flag updates.
    #[must_use]
    pub const fn control_gate(&self) -> &Arc<FeatureGate> {
        &self.control_gate
    }

    /// Returns the detached side-effect spawner.
    #[must_use]
    pub const fn detached(&self) -> &DetachedTasks {
        &self.detached
    }

    /// Applies the requested controls to a card.
    ///
    /// Bootstraps enrollment when the account is unenrolled, rejects
    /// requests structurally identical to the stored document, and returns
    /// the reduced view of the gateway's resulting document.
    ///
    /// # Errors
    ///
    /// Returns [`ControlsError`] on the first failing step; see the variant
    /// taxonomy for terminal semantics.
    pub async fn set_controls(
        &self,
        card_token: &CardToken,
        persona: &PersonaId,
        types: &[ControlType],
    ) -> Result<CardControlSet, ControlsError> {
        let mut facts = AuditFacts::default();
        let result = self.set_controls_inner(card_token, persona, types, &mut facts).await;
        self.publish_audit(METHOD_SET_CONTROLS, card_token, types, &facts, &result);
        result
    }

    /// Set workflow body; audit publication happens in the wrapper.
    async fn set_controls_inner(
        &self,
        card_token: &CardToken,
        persona: &PersonaId,
        types: &[ControlType],
        facts: &mut AuditFacts,
    ) -> Result<CardControlSet, ControlsError> {
        self.ensure_method(METHOD_SET_CONTROLS)?;
        if types.is_empty() {
            return Err(ControlsError::Validation("no control types requested".to_string()));
        }
        let entitled = self
            .entitlements
            .entitled_card(card_token, METHOD_SET_CONTROLS)
            .await
            .map_err(|err| entitlement_error(MSG_BLOCK_FAILED, err))?;
        facts.account_numbers.clone_from(&entitled.account_numbers);
        let pan = self
            .vault
            .decode_card_number(card_token)
            .await
            .map_err(|err| vault_error(MSG_BLOCK_FAILED, err))?;
        facts.last_four = Some(pan.last_four().to_string());
        let mut document = self
            .gateway
            .list_control_documents(&pan)
            .await
            .map_err(|err| gateway_error(MSG_BLOCK_FAILED, err))?;
        if !document.is_enrolled() {
            let document_id = self
                .gateway
                .registration(&pan)
                .await
                .map_err(|err| gateway_error(MSG_BLOCK_FAILED, err))?;
            document = ControlDocument::empty(document_id);
        }
        let request =
            build_create_request(types, persona, self.control_gate.as_ref()).map_err(|err| {
                match err {
                    RequestBuildError::FeatureDisabled(name) => ControlsError::FeatureDisabled(name),
                    RequestBuildError::Unsupported(name) => {
                        ControlsError::Validation(format!("control type cannot be requested: {name}"))
                    }
                }
            })?;
        if request_matches_existing(&document, &request) {
            return Err(ControlsError::AlreadyExists);
        }
        let updated = if document.has_no_entries() {
            self.gateway.create_controls(&document.document_id, &request).await
        } else {
            self.gateway.update_controls(&document.document_id, &request).await
        }
        .map_err(|err| gateway_error(MSG_BLOCK_FAILED, err))?;
        self.spawn_side_effects(card_token, types, ControlAction::Applied, &entitled.owner, persona);
        Ok(reduce_document(Some(&updated), card_token))
    }

    /// Removes the requested controls from a card.
    ///
    /// An unenrolled account short-circuits to an empty response, and an
    /// active gambling impulse delay converts the gambling portion of the
    /// request into a detached cooldown re-apply instead of a delete.
    ///
    /// # Errors
    ///
    /// Returns [`ControlsError`] on the first failing step. "Nothing to
    /// delete" is a success that returns the current view unchanged.
    pub async fn remove_controls(
        &self,
        card_token: &CardToken,
        persona: &PersonaId,
        types: &[ControlType],
    ) -> Result<CardControlSet, ControlsError> {
        let mut facts = AuditFacts::default();
        let result = self.remove_controls_inner(card_token, persona, types, &mut facts).await;
        self.publish_audit(METHOD_REMOVE_CONTROLS, card_token, types, &facts, &result);
        result
    }

    /// Remove workflow body; audit publication happens in the wrapper.
    async fn remove_controls_inner(
        &self,
        card_token: &CardToken,
        persona: &PersonaId,
        types: &[ControlType],
        facts: &mut AuditFacts,
    ) -> Result<CardControlSet, ControlsError> {
        self.ensure_method(METHOD_REMOVE_CONTROLS)?;
        if types.is_empty() {
            return Err(ControlsError::Validation("no control types requested".to_string()));
        }
        let entitled = self
            .entitlements
            .entitled_card(card_token, METHOD_REMOVE_CONTROLS)
            .await
            .map_err(|err| entitlement_error(MSG_REMOVE_FAILED, err))?;
        facts.account_numbers.clone_from(&entitled.account_numbers);
        let pan = self
            .vault
            .decode_card_number(card_token)
            .await
            .map_err(|err| vault_error(MSG_REMOVE_FAILED, err))?;
        facts.last_four = Some(pan.last_four().to_string());
        let document = self
            .gateway
            .list_control_documents(&pan)
            .await
            .map_err(|err| gateway_error(MSG_REMOVE_FAILED, err))?;
        if !document.is_enrolled() {
            // Unenrolled accounts have nothing to remove.
            return Ok(CardControlSet::empty(card_token.clone()));
        }
        let mut delete_types = types.to_vec();
        if types.contains(&ControlType::Gambling)
            && let Some(entry) = find_control_by_type(&document, ControlType::Gambling)
            && ImpulseDelay::state_of(entry).blocks_removal()
        {
            // An active delay cannot be bypassed through a remove call: the
            // impulse timer restarts instead of the control being deleted.
            self.spawn_gambling_reapply(&document.document_id, persona);
            delete_types.retain(|control_type| *control_type != ControlType::Gambling);
        }
        let Some(request) = build_delete_request(&delete_types, &document) else {
            // Nothing to delete; hand back the current view unchanged.
            return Ok(reduce_document(Some(&document), card_token));
        };
        let updated = self
            .gateway
            .delete_controls(&document.document_id, &request)
            .await
            .map_err(|err| gateway_error(MSG_REMOVE_FAILED, err))?;
        self.spawn_side_effects(
            card_token,
            &delete_types,
            ControlAction::Removed,
            &entitled.owner,
            persona,
        );
        Ok(reduce_document(Some(&updated), card_token))
    }

    /// Returns the reduced view of one card's controls.
    ///
    /// # Errors
    ///
    /// Returns [`ControlsError`] when ownership verification, resolution, or
    /// the document fetch fails.
    pub async fn query_controls(
        &self,
        card_token: &CardToken,
    ) -> Result<CardControlSet, ControlsError> {
        self.ensure_method(METHOD_QUERY_CONTROLS)?;
        self.entitlements
            .entitled_card(card_token, METHOD_QUERY_CONTROLS)
            .await
            .map_err(|err| entitlement_error(MSG_QUERY_FAILED, err))?;
        let pan = self
            .vault
            .decode_card_number(card_token)
            .await
            .map_err(|err| vault_error(MSG_QUERY_FAILED, err))?;
        let document = self
            .gateway
            .list_control_documents(&pan)
            .await
            .map_err(|err| gateway_error(MSG_QUERY_FAILED, err))?;
        if !document.is_enrolled() {
            return Ok(CardControlSet::empty(card_token.clone()));
        }
        Ok(reduce_document(Some(&document), card_token))
    }

    /// Moves an enrollment from a replaced card to its successor.
    ///
    /// # Errors
    ///
    /// Returns [`ControlsError::NotFound`] when the gateway reports no
    /// enrollment to move, or the usual taxonomy on earlier steps.
    pub async fn replace_card(
        &self,
        old_token: &CardToken,
        new_token: &CardToken,
    ) -> Result<(), ControlsError> {
        let mut facts = AuditFacts::default();
        let result = self.replace_card_inner(old_token, new_token, &mut facts).await;
        self.publish_audit(METHOD_REPLACE_CARD, old_token, &[], &facts, &result);
        result
    }

    /// Replace workflow body; audit publication happens in the wrapper.
    async fn replace_card_inner(
        &self,
        old_token: &CardToken,
        new_token: &CardToken,
        facts: &mut AuditFacts,
    ) -> Result<(), ControlsError> {
        self.ensure_method(METHOD_REPLACE_CARD)?;
        let entitled = self
            .entitlements
            .entitled_card(old_token, METHOD_REPLACE_CARD)
            .await
            .map_err(|err| entitlement_error(MSG_REPLACE_FAILED, err))?;
        facts.account_numbers.clone_from(&entitled.account_numbers);
        let pans = self
            .vault
            .decode_card_numbers(&[old_token.clone(), new_token.clone()])
            .await
            .map_err(|err| vault_error(MSG_REPLACE_FAILED, err))?;
        let (Some(old_pan), Some(new_pan)) = (pans.first(), pans.get(1)) else {
            return Err(ControlsError::downstream(
                MSG_REPLACE_FAILED,
                VaultError::Malformed("batch decode returned too few numbers".to_string()),
            ));
        };
        facts.last_four = Some(old_pan.last_four().to_string());
        let moved = self
            .gateway
            .replace(old_pan, new_pan)
            .await
            .map_err(|err| gateway_error(MSG_REPLACE_FAILED, err))?;
        if !moved {
            return Err(ControlsError::NotFound);
        }
        Ok(())
    }

    /// Checks the RPC-method admission gate for an operation.
    pub(crate) fn ensure_method(&self, method: &'static str) -> Result<(), ControlsError> {
        if self.method_gate.enabled(method) {
            Ok(())
        } else {
            Err(ControlsError::FeatureDisabled(method.to_string()))
        }
    }

    /// Resolves a card token and fetches its document; listing-path helper.
    pub(crate) async fn resolve_and_fetch(
        &self,
        card_token: &CardToken,
    ) -> Result<ControlDocument, ControlsError> {
        let pan = self
            .vault
            .decode_card_number(card_token)
            .await
            .map_err(|err| vault_error(MSG_LIST_FAILED, err))?;
        self.gateway
            .list_control_documents(&pan)
            .await
            .map_err(|err| gateway_error(MSG_LIST_FAILED, err))
    }

    /// Verifies entitlement for the listing path.
    pub(crate) async fn verify_entitled(
        &self,
        card_token: &CardToken,
        operation: &str,
    ) -> Result<(), ControlsError> {
        self.entitlements
            .entitled_card(card_token, operation)
            .await
            .map(|_| ())
            .map_err(|err| entitlement_error(MSG_LIST_FAILED, err))
    }

    /// Spawns the detached gambling cooldown re-apply.
    fn spawn_gambling_reapply(&self, document_id: &DocumentId, persona: &PersonaId) {
        let gateway = Arc::clone(&self.gateway);
        let document_id = document_id.clone();
        let request = build_gambling_reapply_request(persona);
        self.detached.spawn("gambling-reapply", async move {
            gateway.create_controls(&document_id, &request).await.map(|_document| ())
        });
    }

    /// Spawns the detached post-mutation side effects.
    fn spawn_side_effects(
        &self,
        card_token: &CardToken,
        types: &[ControlType],
        action: ControlAction,
        owner: &PersonaId,
        actor: &PersonaId,
    ) {
        let event = ControlEvent {
            card_token: card_token.clone(),
            control_types: types.to_vec(),
            action,
        };
        let events = Arc::clone(&self.events);
        self.detached.spawn("event-publish", async move { events.publish(event).await });
        if owner != actor {
            let notifications = Arc::clone(&self.notifications);
            let owner = owner.clone();
            let contents: Vec<NotificationContent> = types
                .iter()
                .map(|control_type| compose_notification(*control_type, action))
                .collect();
            self.detached.spawn("owner-notification", async move {
                for content in contents {
                    notifications.dispatch(&owner, content).await?;
                }
                Ok::<(), NotifyError>(())
            });
        }
    }

    /// Publishes the trailing audit record for a mutating call.
    fn publish_audit<T>(
        &self,
        operation: &'static str,
        card_token: &CardToken,
        types: &[ControlType],
        facts: &AuditFacts,
        result: &Result<T, ControlsError>,
    ) {
        let outcome = match result {
            Ok(_) => "SUCCESS",
            Err(err) => err.reason_code(),
        };
        let record = ControlAuditRecord::new(ControlAuditRecordParams {
            operation,
            card_token: card_token.as_str().to_string(),
            last_four: facts.last_four.clone(),
            account_numbers: facts.account_numbers.clone(),
            control_types: types.iter().map(|t| t.wire_name().to_string()).collect(),
            outcome,
        });
        if let Err(err) = record.validate() {
            tracing::warn!(error = %err, "audit record failed validation");
        }
        self.audit.record(&record);
    }
}

// ============================================================================
// SECTION: Diff
// ============================================================================

/// Change-detection check between the stored document and a create request.
///
/// Each category compares the existing document's full entry list against
/// only the newly built entries, not a merge. This is a heuristic: additive
/// changes on a category with other stored entries always read as a change.
/// All three categories equal means nothing would change and the set is a
/// hard [`ControlsError::AlreadyExists`], distinguishable from success.
fn request_matches_existing(document: &ControlDocument, request: &ControlRequest) -> bool {
    document.global_controls == request.global_controls
        && document.transaction_controls == request.transaction_controls
        && document.merchant_controls == request.merchant_controls
}
