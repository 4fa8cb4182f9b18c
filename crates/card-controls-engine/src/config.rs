// card-controls-engine/src/config.rs
// ============================================================================
// Module: Engine Configuration
// Description: Feature-flag registration and engine tunables.
// Purpose: Validate and load the admission flag maps consumed by the engine.
// Dependencies: card-controls-core, serde, toml, thiserror
// ============================================================================

//! ## Overview
//! Configuration registers the two admission namespaces (RPC methods and
//! control types) with their initial values and carries engine tunables.
//! Validation rejects flag names outside the known sets before any gate is
//! constructed, so a typo cannot silently register a dead flag.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use card_controls_core::ALL_CONTROL_TYPES;
use card_controls_core::parse_control_type;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Method Keys
// ============================================================================

/// Admission key for the set-controls operation.
pub const METHOD_SET_CONTROLS: &str = "setControls";

/// Admission key for the remove-controls operation.
pub const METHOD_REMOVE_CONTROLS: &str = "removeControls";

/// Admission key for the single-card query operation.
pub const METHOD_QUERY_CONTROLS: &str = "queryControls";

/// Admission key for the multi-card listing operation.
pub const METHOD_LIST_CONTROLS: &str = "listControls";

/// Admission key for the card replacement operation.
pub const METHOD_REPLACE_CARD: &str = "replaceCard";

/// All gateable method keys.
pub const ALL_METHODS: [&str; 5] = [
    METHOD_SET_CONTROLS,
    METHOD_REMOVE_CONTROLS,
    METHOD_QUERY_CONTROLS,
    METHOD_LIST_CONTROLS,
    METHOD_REPLACE_CARD,
];

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Default bound for detached side-effect tasks, in milliseconds.
const DEFAULT_DETACHED_TASK_TIMEOUT_MS: u64 = 5_000;

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct EngineConfig {
    /// Initial RPC-method admission flags.
    pub methods: BTreeMap<String, bool>,
    /// Initial control-type admission flags, keyed by wire name.
    pub control_types: BTreeMap<String, bool>,
    /// Timeout bound for detached side-effect tasks, in milliseconds.
    pub detached_task_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            methods: ALL_METHODS.into_iter().map(|method| (method.to_string(), true)).collect(),
            control_types: ALL_CONTROL_TYPES
                .into_iter()
                .map(|control_type| (control_type.wire_name().to_string(), true))
                .collect(),
            detached_task_timeout_ms: DEFAULT_DETACHED_TASK_TIMEOUT_MS,
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A method flag names no known method.
    #[error("unknown method flag: {0}")]
    UnknownMethod(String),
    /// A control-type flag names no known control type.
    #[error("unknown control type flag: {0}")]
    UnknownControlType(String),
    /// The detached-task timeout must be positive.
    #[error("detached_task_timeout_ms must be greater than zero")]
    ZeroTimeout,
    /// The configuration document could not be parsed.
    #[error("invalid engine config: {0}")]
    Parse(String),
}

impl EngineConfig {
    /// Validates every flag name against the known sets.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the first offending flag.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for method in self.methods.keys() {
            if !ALL_METHODS.contains(&method.as_str()) {
                return Err(ConfigError::UnknownMethod(method.clone()));
            }
        }
        for control_type in self.control_types.keys() {
            if parse_control_type(control_type).is_err() {
                return Err(ConfigError::UnknownControlType(control_type.clone()));
            }
        }
        if self.detached_task_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    /// Parses a TOML document into a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
