// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for diagnostics operations and argument extraction
//!
//! Configuration errors are fatal and surface to the code that declares or
//! registers something. Usage errors are caller bugs. A value that cannot be
//! extracted from a payload is not an error at all: it is `None`.

use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, DiagnosticsError>;

/// Top-level error for the crate
#[derive(Debug, Error)]
pub enum DiagnosticsError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("usage error: {0}")]
    Usage(#[from] UsageError),
}

/// Mistakes in declarations, registrations, or payload/adapter metadata
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("type '{type_name}' does not declare a listener name")]
    MissingListenerName { type_name: String },

    #[error("an item of type '{type_name}' is already stored")]
    DuplicateItem { type_name: String },

    #[error("the item of type '{item_type}' is not assignable to '{target_type}'")]
    NotAssignable {
        item_type: String,
        target_type: String,
    },

    #[error("payload of type '{payload_type}' has no field{} of type '{target_type}'", property_suffix(.property))]
    NoMatchingField {
        payload_type: String,
        target_type: String,
        property: Option<String>,
    },

    #[error("adapter '{adapter_type}' requires '{source_path}' for field '{field}', but '{payload_type}' does not provide it")]
    RequiredFieldUnresolved {
        adapter_type: String,
        field: String,
        source_path: String,
        payload_type: String,
    },

    #[error("adapter '{adapter_type}' declares an empty list of candidate payload types")]
    EmptyCandidates { adapter_type: String },

    #[error("field '{field}' of '{payload_type}' cannot be adapted: it has no nested shape")]
    NotReflectable { payload_type: String, field: String },

    #[error("invalid diagnostics configuration: {message}")]
    InvalidConfig { message: String },
}

/// Caller bugs: misuse of an operation or a registration API
#[derive(Debug, Error)]
pub enum UsageError {
    #[error("operation '{operation}' was already disposed")]
    Disposed { operation: String },

    #[error("event name cannot be empty")]
    EmptyEventName,

    #[error("operation name cannot be empty")]
    EmptyOperationName,
}

fn property_suffix(property: &Option<String>) -> String {
    match property {
        Some(name) => format!(" named '{}'", name),
        None => String::new(),
    }
}

impl DiagnosticsError {
    /// True when the error is a configuration problem
    pub fn is_configuration(&self) -> bool {
        matches!(self, DiagnosticsError::Configuration(_))
    }

    /// True when the error is a caller bug
    pub fn is_usage(&self) -> bool {
        matches!(self, DiagnosticsError::Usage(_))
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
