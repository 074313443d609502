#![forbid(unsafe_code)]

//! Error model shared by the Rapid crates.
//!
//! Only loading paths (configuration files, the preference store) and
//! collaborator callbacks surface errors. The router and the search engine
//! recover locally: they log and fall back rather than propagate.

use std::io;

use thiserror::Error;

use crate::id::EntityId;

/// Failure reported by an external collaborator (OSM API, QA service,
/// geocoder).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The remote request could not be completed.
    #[error("request failed: {0}")]
    Request(String),
    /// The remote service answered but has no such object.
    #[error("not found: {0}")]
    NotFound(String),
    /// The service is not configured in this session.
    #[error("service unavailable")]
    Unavailable,
}

/// Lookup failure against a graph snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("entity {0} not found in graph")]
    MissingEntity(EntityId),
}

/// Errors from the durable preference store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("store file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported store file version: {found} (expected {expected})")]
    Version { found: u64, expected: u64 },
}

/// Errors that can occur when loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error reading config: {0}")]
    Io(#[from] io::Error),
    #[error("TOML parse error: {0}")]
    Toml(String),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    /// The file parsed but failed validation; every problem is listed.
    #[error("invalid config: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::EntityKind;

    #[test]
    fn missing_entity_names_the_id() {
        let err = GraphError::MissingEntity(EntityId::new(EntityKind::Way, 42));
        assert_eq!(err.to_string(), "entity w42 not found in graph");
    }

    #[test]
    fn invalid_config_joins_problems() {
        let err = ConfigError::Invalid(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "invalid config: a; b");
    }

    #[test]
    fn io_errors_convert() {
        let err: StoreError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
