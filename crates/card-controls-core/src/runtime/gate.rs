// card-controls-core/src/runtime/gate.rs
// ============================================================================
// Module: Feature Admission Gate
// Description: Concurrency-safe, atomically swapped boolean flag store.
// Purpose: Decide at request time whether a method or control type may run.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! The feature gate holds a registered set of named boolean flags. Lookups
//! are fail-closed: unregistered keys read as disabled. Updates validate
//! every key against the registered set and replace the live map whole, so
//! readers never observe a partial update. The live map is copy-on-write:
//! readers clone an `Arc` under a momentary read guard and consult flags
//! lock-free afterwards; a dedicated writer mutex serializes concurrent
//! writers, each of which computes the next snapshot from the latest one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::RwLock;

use thiserror::Error;

// ============================================================================
// SECTION: Admission Gate Trait
// ============================================================================

/// Injectable admission-context seam consulted at request time.
///
/// Request builders and workflows take this trait instead of a concrete gate
/// so tests can construct isolated instances instead of mutating shared
/// process state.
pub trait AdmissionGate: Send + Sync {
    /// Returns the current value of a flag, or false for unknown keys.
    fn enabled(&self, key: &str) -> bool;
}

/// Admission gate that allows everything. For tests and standalone demos.
pub struct AllowAllGate;

impl AdmissionGate for AllowAllGate {
    fn enabled(&self, _key: &str) -> bool {
        true
    }
}

// ============================================================================
// SECTION: Feature Gate
// ============================================================================

/// Feature gate errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureGateError {
    /// An update named a key outside the registered flag set.
    #[error("unregistered feature flag: {0}")]
    UnregisteredKey(String),
    /// A gate lock was poisoned by a panicking holder.
    #[error("feature gate lock poisoned")]
    Poisoned,
}

/// Registered boolean flag store with copy-on-write snapshot swapping.
///
/// # Invariants
/// - The registered key set is fixed at construction; [`FeatureGate::set`]
///   never adds or removes keys.
/// - Readers observe either the previous snapshot or the next one, never a
///   mixture.
pub struct FeatureGate {
    /// Live flag snapshot; the lock guards only the pointer swap.
    live: RwLock<Arc<BTreeMap<String, bool>>>,
    /// Serializes writers so each computes its snapshot from the latest.
    writer: Mutex<()>,
}

impl FeatureGate {
    /// Creates a gate with the given registered flags and initial values.
    #[must_use]
    pub fn new(flags: impl IntoIterator<Item = (String, bool)>) -> Self {
        Self {
            live: RwLock::new(Arc::new(flags.into_iter().collect())),
            writer: Mutex::new(()),
        }
    }

    /// Returns the current snapshot of all flags.
    ///
    /// A poisoned lock degrades to an empty snapshot, which reads as
    /// everything-disabled (fail-closed).
    #[must_use]
    pub fn snapshot(&self) -> Arc<BTreeMap<String, bool>> {
        self.live.read().map_or_else(|_| Arc::new(BTreeMap::new()), |guard| Arc::clone(&guard))
    }

    /// Returns the current value of a flag, or false for unregistered keys.
    #[must_use]
    pub fn enabled(&self, key: &str) -> bool {
        self.snapshot().get(key).copied().unwrap_or(false)
    }

    /// Applies the updates atomically and swaps in the resulting snapshot.
    ///
    /// Every key must already be registered; otherwise the whole call fails
    /// with no partial update and the previous snapshot stays live.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureGateError::UnregisteredKey`] naming the first
    /// offending key, or [`FeatureGateError::Poisoned`] when a gate lock was
    /// poisoned.
    pub fn set(&self, updates: &BTreeMap<String, bool>) -> Result<(), FeatureGateError> {
        let _writer = self.writer.lock().map_err(|_| FeatureGateError::Poisoned)?;
        let current = self.snapshot();
        if let Some(key) = updates.keys().find(|key| !current.contains_key(key.as_str())) {
            return Err(FeatureGateError::UnregisteredKey(key.clone()));
        }
        let mut next = (*current).clone();
        for (key, value) in updates {
            next.insert(key.clone(), *value);
        }
        let mut guard = self.live.write().map_err(|_| FeatureGateError::Poisoned)?;
        *guard = Arc::new(next);
        Ok(())
    }
}

impl AdmissionGate for FeatureGate {
    fn enabled(&self, key: &str) -> bool {
        Self::enabled(self, key)
    }
}
