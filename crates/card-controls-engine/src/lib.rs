// card-controls-engine/src/lib.rs
// ============================================================================
// Module: Card Controls Engine Library
// Description: Async orchestration surface for the card controls engine.
// Purpose: Expose the reconciliation workflows and collaborator interfaces.
// Dependencies: card-controls-core, async-trait, tokio
// ============================================================================

//! ## Overview
//! The engine crate orchestrates per-card control reconciliation against the
//! remote control-document gateway: set, remove, query, replace, and the
//! concurrent multi-card listing. External systems plug in through explicit
//! async interfaces; side effects run as detached tasks decoupled from the
//! triggering request. Transport scaffolding is deliberately out of scope.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod aggregator;
pub mod audit;
pub mod config;
pub mod detach;
pub mod interfaces;
pub mod notify;
pub mod workflow;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::AuditValidationError;
pub use audit::ControlAuditRecord;
pub use audit::ControlAuditRecordParams;
pub use audit::MemoryAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use config::ALL_METHODS;
pub use config::ConfigError;
pub use config::EngineConfig;
pub use config::METHOD_LIST_CONTROLS;
pub use config::METHOD_QUERY_CONTROLS;
pub use config::METHOD_REMOVE_CONTROLS;
pub use config::METHOD_REPLACE_CARD;
pub use config::METHOD_SET_CONTROLS;
pub use detach::DetachedTasks;
pub use interfaces::CardVault;
pub use interfaces::ControlAction;
pub use interfaces::ControlEvent;
pub use interfaces::ControlGateway;
pub use interfaces::EligibilityChecker;
pub use interfaces::EligibilityError;
pub use interfaces::EntitledCard;
pub use interfaces::EntitlementError;
pub use interfaces::EntitlementVerifier;
pub use interfaces::EventPublisher;
pub use interfaces::GatewayError;
pub use interfaces::NotificationDispatcher;
pub use interfaces::NotifyError;
pub use interfaces::PublishError;
pub use interfaces::VaultError;
pub use notify::NotificationContent;
pub use notify::compose_notification;
pub use workflow::Collaborators;
pub use workflow::ControlsEngine;
pub use workflow::ControlsError;
