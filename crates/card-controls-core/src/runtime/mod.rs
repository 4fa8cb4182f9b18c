// card-controls-core/src/runtime/mod.rs
// ============================================================================
// Module: Card Controls Runtime Helpers
// Description: Feature gate, document reduction, and request building.
// Purpose: Provide the pure reconciliation steps invoked by the engine crate.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! Runtime helpers implement the per-call reconciliation steps: admission
//! gating, reduction of a raw remote document into the deduplicated client
//! view, and construction of category-split create/delete requests.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod gate;
pub mod reduction;
pub mod request;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use gate::AdmissionGate;
pub use gate::AllowAllGate;
pub use gate::FeatureGate;
pub use gate::FeatureGateError;
pub use reduction::CardControl;
pub use reduction::CardControlSet;
pub use reduction::reduce_document;
pub use request::ControlRequest;
pub use request::RequestBuildError;
pub use request::build_create_request;
pub use request::build_delete_request;
pub use request::build_gambling_reapply_request;
