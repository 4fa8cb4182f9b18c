// crates/card-controls-engine/tests/list_controls.rs
// ============================================================================
// Module: List Controls Tests
// Description: End-to-end tests for the multi-card fan-out listing.
// Purpose: Validate partial-failure tolerance and per-card independence.
// Dependencies: card-controls-core, card-controls-engine
// ============================================================================
//! ## Overview
//! Exercises the concurrent listing: ineligible and unowned cards are
//! silently excluded, fetch failures contribute token-only entries, and the
//! aggregate never fails over a single card.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

mod common;

use std::collections::BTreeMap;

use card_controls_core::CardControlSet;
use card_controls_core::CardToken;
use card_controls_core::ControlDocument;
use card_controls_core::ControlEntry;
use card_controls_core::ControlType;
use card_controls_core::DocumentId;
use card_controls_engine::ControlsError;
use common::HarnessBuilder;

fn entry(control_type: &str) -> ControlEntry {
    ControlEntry {
        control_type: control_type.to_string(),
        is_enabled: true,
        ..ControlEntry::default()
    }
}

fn document(id: &str, merchant: Vec<ControlEntry>) -> ControlDocument {
    ControlDocument {
        document_id: DocumentId::new(id),
        merchant_controls: merchant,
        ..ControlDocument::default()
    }
}

fn entry_for<'a>(aggregate: &'a [CardControlSet], token: &str) -> Option<&'a CardControlSet> {
    aggregate.iter().find(|set| set.card_token.as_str() == token)
}

#[tokio::test]
async fn ineligible_cards_are_silently_excluded() {
    let harness = HarnessBuilder::new()
        .entitle("card-1", "owner-1")
        .entitle("card-2", "owner-1")
        .number("card-1", "4111111111111111")
        .number("card-2", "4222222222222222")
        .document("4111111111111111", document("doc-1", vec![entry("MCT_GAMBLING")]))
        .document("4222222222222222", document("doc-2", vec![entry("MCT_ALCOHOL")]))
        .deny_eligibility("card-2")
        .build();

    let aggregate = harness
        .engine
        .list_controls(&[CardToken::new("card-1"), CardToken::new("card-2")])
        .await
        .unwrap();

    assert_eq!(aggregate.len(), 1);
    let survivor = entry_for(&aggregate, "card-1").unwrap();
    assert!(survivor.control(ControlType::Gambling).is_some());
    assert!(entry_for(&aggregate, "card-2").is_none());
}

#[tokio::test]
async fn unowned_cards_are_silently_excluded() {
    let harness = HarnessBuilder::new()
        .entitle("card-1", "owner-1")
        .number("card-1", "4111111111111111")
        .number("card-9", "4999999999999999")
        .document("4111111111111111", document("doc-1", vec![entry("MCT_GAMBLING")]))
        .build();

    let aggregate = harness
        .engine
        .list_controls(&[CardToken::new("card-1"), CardToken::new("card-9")])
        .await
        .unwrap();
    assert_eq!(aggregate.len(), 1);
    assert!(entry_for(&aggregate, "card-1").is_some());
}

#[tokio::test]
async fn fetch_failures_contribute_token_only_entries() {
    let harness = HarnessBuilder::new()
        .entitle("card-1", "owner-1")
        .entitle("card-2", "owner-1")
        .number("card-1", "4111111111111111")
        .number("card-2", "4222222222222222")
        .document("4111111111111111", document("doc-1", vec![entry("MCT_GAMBLING")]))
        .fail_list_for("4222222222222222")
        .build();

    let aggregate = harness
        .engine
        .list_controls(&[CardToken::new("card-1"), CardToken::new("card-2")])
        .await
        .unwrap();

    // Both cards are present: "no data" is distinct from "not mine".
    assert_eq!(aggregate.len(), 2);
    let failed = entry_for(&aggregate, "card-2").unwrap();
    assert!(failed.controls.is_empty());
    let healthy = entry_for(&aggregate, "card-1").unwrap();
    assert_eq!(healthy.controls.len(), 1);
}

#[tokio::test]
async fn unenrolled_cards_contribute_empty_entries() {
    let harness = HarnessBuilder::new()
        .entitle("card-1", "owner-1")
        .number("card-1", "4111111111111111")
        .build();
    let aggregate = harness.engine.list_controls(&[CardToken::new("card-1")]).await.unwrap();
    assert_eq!(aggregate.len(), 1);
    assert!(aggregate[0].controls.is_empty());
}

#[tokio::test]
async fn listing_an_empty_card_set_yields_an_empty_aggregate() {
    let harness = HarnessBuilder::new().build();
    let aggregate = harness.engine.list_controls(&[]).await.unwrap();
    assert!(aggregate.is_empty());
}

#[tokio::test]
async fn gated_off_listing_fails_before_any_fan_out() {
    let harness = HarnessBuilder::new()
        .entitle("card-1", "owner-1")
        .number("card-1", "4111111111111111")
        .build();
    let updates = BTreeMap::from([("listControls".to_string(), false)]);
    harness.engine.method_gate().set(&updates).unwrap();

    let result = harness.engine.list_controls(&[CardToken::new("card-1")]).await;
    assert!(matches!(result, Err(ControlsError::FeatureDisabled(_))));
    assert!(harness.gateway.calls().is_empty());
}

#[tokio::test]
async fn many_cards_reduce_independently() {
    let mut builder = HarnessBuilder::new();
    let mut tokens = Vec::new();
    for index in 0..8 {
        let token = format!("card-{index}");
        let pan = format!("400000000000000{index}");
        builder = builder
            .entitle(&token, "owner-1")
            .number(&token, &pan)
            .document(&pan, document(&format!("doc-{index}"), vec![entry("MCT_AIRFARE")]));
        tokens.push(CardToken::new(token));
    }
    let harness = builder.build();

    let aggregate = harness.engine.list_controls(&tokens).await.unwrap();
    assert_eq!(aggregate.len(), 8);
    for set in &aggregate {
        assert!(set.control(ControlType::Airfare).is_some());
    }
}
