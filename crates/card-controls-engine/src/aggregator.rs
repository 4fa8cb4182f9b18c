// card-controls-engine/src/aggregator.rs
// ============================================================================
// Module: Multi-Card Fan-Out Aggregation
// Description: Concurrent per-card listing with partial-failure tolerance.
// Purpose: Aggregate reduced control views across all of a persona's cards.
// Dependencies: card-controls-core, crate::workflow, tokio, tracing
// ============================================================================

//! ## Overview
//! Listing fans out one task per card; concurrency is bounded only by the
//! size of the entitlement set. Each task independently checks eligibility
//! and ownership, resolves the card number, and fetches and reduces the
//! document. Cards failing eligibility or ownership are excluded from the
//! aggregate (logged, never surfaced); cards whose document fetch fails
//! still contribute a token-only entry, distinguishing "no data" from "not
//! mine to query". The join is index-stable over explicit result slots; the
//! merged aggregate is unordered.

// ============================================================================
// SECTION: Imports
// ============================================================================

use card_controls_core::CardControlSet;
use card_controls_core::CardToken;
use card_controls_core::reduce_document;

use crate::config::METHOD_LIST_CONTROLS;
use crate::workflow::ControlsEngine;
use crate::workflow::ControlsError;

// ============================================================================
// SECTION: Fan-Out Listing
// ============================================================================

impl ControlsEngine {
    /// Lists reduced control views across the given cards concurrently.
    ///
    /// Per-card failures never abort the aggregate; consumers must not
    /// assume any ordering across cards.
    ///
    /// # Errors
    ///
    /// Returns [`ControlsError::FeatureDisabled`] when the listing method is
    /// gated off. Per-card failures are absorbed per the partial-listing
    /// policy.
    pub async fn list_controls(
        &self,
        card_tokens: &[CardToken],
    ) -> Result<Vec<CardControlSet>, ControlsError> {
        self.ensure_method(METHOD_LIST_CONTROLS)?;
        let mut handles = Vec::with_capacity(card_tokens.len());
        for card_token in card_tokens {
            let engine = self.clone();
            let card_token = card_token.clone();
            handles.push(tokio::spawn(async move { engine.list_one_card(card_token).await }));
        }
        // Index-stable join: one slot per spawned card, awaited in spawn
        // order, so a slow card never reorders or starves the others' slots.
        let mut slots: Vec<Option<CardControlSet>> = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(slot) => slots.push(slot),
                Err(err) => {
                    tracing::warn!(error = %err, "card listing task did not complete");
                    slots.push(None);
                }
            }
        }
        Ok(slots.into_iter().flatten().collect())
    }

    /// Produces zero or one listing entry for a single card.
    async fn list_one_card(&self, card_token: CardToken) -> Option<CardControlSet> {
        if let Err(err) = self.eligibility.can(METHOD_LIST_CONTROLS, &card_token).await {
            tracing::info!(card = %card_token, error = %err, "card excluded from listing");
            return None;
        }
        if let Err(err) = self.verify_entitled(&card_token, METHOD_LIST_CONTROLS).await {
            tracing::info!(card = %card_token, error = %err, "card excluded from listing");
            return None;
        }
        match self.resolve_and_fetch(&card_token).await {
            Ok(document) if document.is_enrolled() => {
                Some(reduce_document(Some(&document), &card_token))
            }
            Ok(_) => Some(CardControlSet::empty(card_token)),
            Err(err) => {
                // A fetch failure still yields a token-only entry: the card
                // is the caller's, it just has no data right now.
                tracing::warn!(card = %card_token, error = %err, "document fetch failed for listing");
                Some(CardControlSet::empty(card_token))
            }
        }
    }
}
