use thiserror::Error;

use crate::domain::document::{DocumentKind, DocumentStatus};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid coverage range for policy `{policy_id}`: {reason}")]
    InvalidDateRange { policy_id: String, reason: String },
    #[error("invalid {kind:?} transition from {from:?} using {event}")]
    InvalidDocumentTransition { kind: DocumentKind, from: DocumentStatus, event: &'static str },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("snapshot failure: {0}")]
    Snapshot(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Stable machine-readable class used in operator output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(_) => "domain_validation",
            Self::Snapshot(_) => "snapshot",
            Self::Configuration(_) => "config_validation",
        }
    }
}
