use thiserror::Error;

use crate::selection::SelectionItem;
use crate::timeline::{ClipId, TrackId};

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("clip not found: {0}")]
    ClipNotFound(ClipId),

    #[error("track not found: {0}")]
    TrackNotFound(TrackId),

    #[error("clip {clip} is not on track {track}")]
    ClipNotOnTrack { clip: ClipId, track: TrackId },

    #[error("clip {clip} cannot be placed on track {track}")]
    IncompatibleTrack { clip: ClipId, track: TrackId },

    #[error("invalid span: start {start}, duration {duration} is negative")]
    NegativeDuration { start: i64, duration: i64 },

    #[error("selection change vetoed for {0:?}")]
    SelectionVetoed(SelectionItem),

    #[error("selection operation cancelled at {0:?}")]
    SelectionCancelled(SelectionItem),

    #[error("unsupported config version {found} (supported: {supported})")]
    UnsupportedConfigVersion {
        found: semver::Version,
        supported: semver::Version,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// True for a veto that must abort the whole batch, not just one item.
    pub fn is_cancel_all(&self) -> bool {
        matches!(self, CoreError::SelectionCancelled(_))
    }

    pub fn is_veto(&self) -> bool {
        matches!(
            self,
            CoreError::SelectionVetoed(_) | CoreError::SelectionCancelled(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
