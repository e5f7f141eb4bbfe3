//! World-level error type

use crate::composition::CompositionError;
use crate::config::ConfigError;
use crate::descriptor::DescriptorError;
use crate::simulant::{InvalidAddress, PropertyError};
use crate::store::StoreError;

/// Errors produced by world operations
#[derive(thiserror::Error, Debug)]
pub enum WorldError {
    /// State store failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Facet composition failure
    #[error("Composition error: {0}")]
    Composition(#[from] CompositionError),

    /// Property access failure
    #[error("Property error: {0}")]
    Property(#[from] PropertyError),

    /// Malformed simulant address
    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] InvalidAddress),

    /// Descriptor file failure
    #[error("Descriptor error: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Configuration or overlay file failure
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl WorldError {
    /// Whether the error reports programmer misuse rather than bad content
    ///
    /// Duplicate creation, orphaned children, malformed addresses and writes
    /// to immutable properties leave nothing sensible to continue with.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::AlreadyExists(_) | StoreError::MissingParent(_))
                | Self::InvalidAddress(_)
                | Self::Property(PropertyError::Immutable(_))
        )
    }

    /// Whether the error reports a missing simulant or property
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Store(StoreError::NotFound(_)) | Self::Property(PropertyError::NotFound(_)))
    }
}
