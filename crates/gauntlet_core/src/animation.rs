//! Animation playback contract
//!
//! Abilities ask for a clip and get a playback token back; completion comes
//! back later as an [`AnimationEvent`] carrying that token.

use serde::{Deserialize, Serialize};

/// Notify name marking the end of a death sequence
pub const RESPAWN_NOTIFY: &str = "respawn";

/// Token identifying one playback of a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlaybackId(pub u64);

/// Something that happened during playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationEvent {
    /// A playback finished or was cut short by another clip
    Ended {
        /// Which playback
        playback: PlaybackId,
        /// True when another clip replaced it before the end
        interrupted: bool,
    },
    /// A named marker inside the clip was reached
    Notify {
        /// Which playback
        playback: PlaybackId,
        /// Marker name
        name: String,
    },
}

impl AnimationEvent {
    /// Playback this event belongs to
    pub fn playback(&self) -> PlaybackId {
        match self {
            Self::Ended { playback, .. } | Self::Notify { playback, .. } => *playback,
        }
    }
}

/// Plays clips on one character
pub trait AnimationController {
    /// Start a clip. `None` if the clip is unknown.
    fn play(&mut self, clip: &str) -> Option<PlaybackId>;

    /// Stop every playback without reporting completion
    fn stop_all(&mut self);

    /// Whether a playback is still running
    fn is_playing(&self, playback: PlaybackId) -> bool;
}
