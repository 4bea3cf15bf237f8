//! Video catalog trait for the external catalog collaborator.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::id::{UserId, VideoId};
use crate::types::video::VideoDescriptor;

/// Direction of adjacent-video resolution in a parent's catalog ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjacentDirection {
    /// The video after the current one.
    Next,
    /// The video before the current one.
    Previous,
}

/// Trait for the video catalog the relay consults.
///
/// The catalog owns video records, per-parent playlist ordering, and
/// authorization. The relay trusts whatever it gets back and never
/// caches or persists catalog data.
#[async_trait]
pub trait VideoCatalog: Send + Sync + std::fmt::Debug + 'static {
    /// Whether the given parent may control playback of the video.
    async fn authorize(&self, parent_id: UserId, video_id: &VideoId) -> AppResult<bool>;

    /// Resolve a playable descriptor for a video.
    async fn descriptor(&self, video_id: &VideoId) -> AppResult<Option<VideoDescriptor>>;

    /// Resolve the video adjacent to `current` in the parent's catalog
    /// ordering, with cyclic wrap-around at either end.
    ///
    /// Returns `None` when the parent's catalog is empty.
    async fn adjacent(
        &self,
        parent_id: UserId,
        current: &VideoId,
        direction: AdjacentDirection,
    ) -> AppResult<Option<(VideoId, VideoDescriptor)>>;

    /// Increment the play counter for a video.
    ///
    /// Callers treat this as fire-and-forget; a failure must never block
    /// or fail a relay transition.
    async fn record_play(&self, video_id: &VideoId) -> AppResult<()>;
}
