//! In-memory video library implementing the catalog trait.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use famcast_core::result::AppResult;
use famcast_core::traits::catalog::{AdjacentDirection, VideoCatalog};
use famcast_core::types::id::{UserId, VideoId};
use famcast_core::types::video::VideoDescriptor;

#[derive(Debug)]
struct VideoRecord {
    owner: UserId,
    descriptor: VideoDescriptor,
    plays: AtomicU64,
}

/// Per-parent ordered video store.
///
/// The playlist ordering is insertion order per owner; adjacent-video
/// resolution wraps cyclically at either end.
#[derive(Debug, Default)]
pub struct VideoLibrary {
    /// Video id → record.
    videos: DashMap<VideoId, VideoRecord>,
    /// Owner → playlist ordering.
    playlists: DashMap<UserId, Vec<VideoId>>,
}

impl VideoLibrary {
    /// Creates an empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a video to a parent's playlist, in order of insertion.
    pub fn add_video(&self, owner: UserId, video_id: VideoId, descriptor: VideoDescriptor) {
        self.videos.insert(
            video_id.clone(),
            VideoRecord {
                owner,
                descriptor,
                plays: AtomicU64::new(0),
            },
        );
        self.playlists.entry(owner).or_default().push(video_id);
    }

    /// Current play count for a video, if known.
    pub fn play_count(&self, video_id: &VideoId) -> Option<u64> {
        self.videos
            .get(video_id)
            .map(|record| record.plays.load(Ordering::SeqCst))
    }

    /// Number of videos across all playlists.
    pub fn video_count(&self) -> usize {
        self.videos.len()
    }
}

#[async_trait]
impl VideoCatalog for VideoLibrary {
    async fn authorize(&self, parent_id: UserId, video_id: &VideoId) -> AppResult<bool> {
        Ok(self
            .videos
            .get(video_id)
            .map(|record| record.owner == parent_id)
            .unwrap_or(false))
    }

    async fn descriptor(&self, video_id: &VideoId) -> AppResult<Option<VideoDescriptor>> {
        Ok(self
            .videos
            .get(video_id)
            .map(|record| record.descriptor.clone()))
    }

    async fn adjacent(
        &self,
        parent_id: UserId,
        current: &VideoId,
        direction: AdjacentDirection,
    ) -> AppResult<Option<(VideoId, VideoDescriptor)>> {
        let Some(playlist) = self.playlists.get(&parent_id) else {
            return Ok(None);
        };
        if playlist.is_empty() {
            return Ok(None);
        }

        let len = playlist.len();
        // An unknown current video starts the cycle from the edge.
        let target = match (playlist.iter().position(|v| v == current), direction) {
            (Some(i), AdjacentDirection::Next) => (i + 1) % len,
            (Some(i), AdjacentDirection::Previous) => (i + len - 1) % len,
            (None, AdjacentDirection::Next) => 0,
            (None, AdjacentDirection::Previous) => len - 1,
        };
        let video_id = playlist[target].clone();
        drop(playlist);

        let descriptor = self
            .videos
            .get(&video_id)
            .map(|record| record.descriptor.clone());
        Ok(descriptor.map(|d| (video_id, d)))
    }

    async fn record_play(&self, video_id: &VideoId) -> AppResult<()> {
        if let Some(record) = self.videos.get(video_id) {
            record.plays.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(title: &str) -> VideoDescriptor {
        VideoDescriptor {
            title: title.to_string(),
            playable_url: format!("https://videos.test/{title}.mp4"),
            duration_seconds: 90.0,
        }
    }

    fn seeded_library(owner: UserId) -> VideoLibrary {
        let library = VideoLibrary::new();
        for id in ["v1", "v2", "v3"] {
            library.add_video(owner, VideoId::new(id), descriptor(id));
        }
        library
    }

    #[tokio::test]
    async fn test_authorize_by_ownership() {
        let owner = UserId::new();
        let library = seeded_library(owner);

        assert!(library.authorize(owner, &VideoId::new("v1")).await.unwrap());
        assert!(
            !library
                .authorize(UserId::new(), &VideoId::new("v1"))
                .await
                .unwrap()
        );
        assert!(
            !library
                .authorize(owner, &VideoId::new("missing"))
                .await
                .unwrap()
        );
    }

    #[tokio::test]
    async fn test_adjacent_wraps_cyclically() {
        let owner = UserId::new();
        let library = seeded_library(owner);

        let (next, _) = library
            .adjacent(owner, &VideoId::new("v3"), AdjacentDirection::Next)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(next.as_str(), "v1");

        let (previous, _) = library
            .adjacent(owner, &VideoId::new("v1"), AdjacentDirection::Previous)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(previous.as_str(), "v3");
    }

    #[tokio::test]
    async fn test_adjacent_on_empty_playlist_is_none() {
        let library = VideoLibrary::new();
        let result = library
            .adjacent(UserId::new(), &VideoId::new("v1"), AdjacentDirection::Next)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_play_counter() {
        let owner = UserId::new();
        let library = seeded_library(owner);
        let v1 = VideoId::new("v1");

        assert_eq!(library.play_count(&v1), Some(0));
        library.record_play(&v1).await.unwrap();
        library.record_play(&v1).await.unwrap();
        assert_eq!(library.play_count(&v1), Some(2));
    }
}
