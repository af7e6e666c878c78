//! View-level errors

use crate::state::ViewState;
use confstore_core::{ApiError, StorageError, ValidationError};

/// Failure of a view operation
///
/// Validation and remote failures have already been reported through the
/// [`Notifier`](crate::ui::Notifier) by the time a view returns them. The
/// remaining variants go back to the caller unreported, and
/// [`ViewError::Unmounted`] has no one left to report to.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    /// Rejected before any remote call
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Config API call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Attachment store call failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Another operation of this view is still in flight
    #[error("another operation is in progress ({0})")]
    Busy(ViewState),

    /// The state table has no such edge
    #[error("illegal view transition: {from} -> {to}")]
    IllegalTransition { from: ViewState, to: ViewState },

    /// Operation needs a loaded item
    #[error("nothing loaded")]
    NotLoaded,

    /// The view went away while the call was in flight
    #[error("view unmounted")]
    Unmounted,
}

impl ViewError {
    /// Whether a remote collaborator produced this error
    #[inline]
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Api(_) | Self::Storage(_))
    }

    /// Whether this was caught by pre-flight validation
    #[inline]
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert!(ViewError::from(ApiError::Unauthenticated).is_remote());
        assert!(ViewError::from(StorageError::Upload("x".into())).is_remote());
        assert!(ViewError::from(ValidationError::EmptyContent).is_validation());
        assert!(!ViewError::Unmounted.is_remote());
    }

    #[test]
    fn validation_message_passes_through() {
        let err = ViewError::from(ValidationError::AttachmentTooLarge {
            size: 10_000_000,
            limit: 5_000_000,
        });
        assert_eq!(err.to_string(), "Please pick a file smaller than 5 MB.");
    }
}
