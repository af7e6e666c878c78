//! View state machine
//!
//! One value per mounted view replaces a set of independent loading flags,
//! so combinations like "saving while deleting" cannot be represented.
//!
//! ```text
//! Idle ──► Loading ──► Loaded ──► Saving | Deleting | RollingBack ──► Loaded
//!   │          │          ▲
//!   │          └─► Failed ┘ (via Loading)
//!   └─► Saving ──► Idle | Failed ──► Saving
//! ```

use crate::error::ViewError;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Loaded,
    Saving,
    Deleting,
    RollingBack,
    /// Last load or submit failed; carries the reported reason
    Failed(String),
}

impl ViewState {
    /// A remote call is in flight
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Loading | Self::Saving | Self::Deleting | Self::RollingBack
        )
    }

    /// Whether the table has an edge `self -> to`
    #[must_use]
    pub fn can_transition_to(&self, to: &ViewState) -> bool {
        matches!(
            (self, to),
            (Self::Idle, Self::Loading | Self::Saving | Self::Failed(_))
                | (Self::Loading, Self::Loaded | Self::Failed(_))
                | (
                    Self::Loaded,
                    Self::Loading | Self::Saving | Self::Deleting | Self::RollingBack
                )
                | (Self::Saving, Self::Idle | Self::Loaded | Self::Failed(_))
                | (Self::Deleting | Self::RollingBack, Self::Loaded)
                | (Self::Failed(_), Self::Loading | Self::Saving)
        )
    }

    /// Move along an edge of the table
    ///
    /// # Errors
    /// `ViewError::IllegalTransition` when there is no such edge
    pub fn transition_to(&mut self, to: ViewState) -> Result<(), ViewError> {
        if self.can_transition_to(&to) {
            tracing::trace!(from = %self, to = %to, "view transition");
            *self = to;
            Ok(())
        } else {
            Err(ViewError::IllegalTransition {
                from: self.clone(),
                to,
            })
        }
    }

    /// Start an in-flight operation
    ///
    /// # Errors
    /// `ViewError::Busy` if another operation is in flight,
    /// `ViewError::IllegalTransition` if `op` cannot start from here
    pub fn begin(&mut self, op: ViewState) -> Result<(), ViewError> {
        if self.is_busy() {
            return Err(ViewError::Busy(self.clone()));
        }
        self.transition_to(op)
    }
}

impl std::fmt::Display for ViewState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Loading => f.write_str("loading"),
            Self::Loaded => f.write_str("loaded"),
            Self::Saving => f.write_str("saving"),
            Self::Deleting => f.write_str("deleting"),
            Self::RollingBack => f.write_str("rolling back"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}
