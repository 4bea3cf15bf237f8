//! Per-channel playback state machine, from the parent's perspective.

use famcast_core::types::id::VideoId;

/// Playback phase of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackPhase {
    /// No active video.
    #[default]
    Idle,
    /// A video is playing.
    Playing,
    /// The active video is paused.
    Paused,
}

/// Playback state tracked for one channel.
///
/// Long-lived, no terminal state. Only parent-issued commands mutate
/// it; the child's acknowledgment/status lane never does.
#[derive(Debug, Clone, Default)]
pub struct ChannelPlayback {
    /// Current phase.
    pub phase: PlaybackPhase,
    /// The active video, if any.
    pub video: Option<VideoId>,
}

impl ChannelPlayback {
    /// Fresh idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `video` is the currently active video.
    pub fn is_current(&self, video: &VideoId) -> bool {
        self.video.as_ref() == Some(video)
    }

    /// Whether a `play` for `video` is a resume of the paused video
    /// rather than the introduction of new media.
    pub fn is_resume(&self, video: &VideoId) -> bool {
        self.phase == PlaybackPhase::Paused && self.is_current(video)
    }

    /// Start playing new media.
    pub fn start(&mut self, video: VideoId) {
        self.phase = PlaybackPhase::Playing;
        self.video = Some(video);
    }

    /// Resume the paused video.
    pub fn resume(&mut self) {
        self.phase = PlaybackPhase::Playing;
    }

    /// Pause, only meaningful while playing.
    pub fn pause(&mut self) {
        if self.phase == PlaybackPhase::Playing {
            self.phase = PlaybackPhase::Paused;
        }
    }

    /// Stop and clear the active video.
    pub fn stop(&mut self) {
        self.phase = PlaybackPhase::Idle;
        self.video = None;
    }
}
