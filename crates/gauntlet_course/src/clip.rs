//! Clip playback for headless characters
//!
//! Clips are timelines with named markers. Playing a clip over another
//! interrupts the older one; events are collected and handed out by
//! [`ClipPlayer::advance`].

use gauntlet_core::animation::{AnimationController, AnimationEvent, PlaybackId, RESPAWN_NOTIFY};
use gauntlet_core::config::{at_least, Validate};
use gauntlet_core::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Named marker inside a clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipNotify {
    pub name: String,
    /// Seconds from the start of the clip
    pub time: f32,
}

/// Clip timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipDef {
    /// Length in seconds
    pub duration: f32,
    #[serde(default)]
    pub notifies: Vec<ClipNotify>,
}

impl ClipDef {
    /// Clip without markers
    pub fn new(duration: f32) -> Self {
        Self {
            duration,
            notifies: Vec::new(),
        }
    }

    /// Add a marker
    pub fn with_notify(mut self, name: impl Into<String>, time: f32) -> Self {
        self.notifies.push(ClipNotify {
            name: name.into(),
            time,
        });
        self
    }
}

impl Validate for ClipDef {
    fn validated(mut self) -> Result<Self> {
        self.duration = at_least("clip.duration", self.duration, 0.0)?;
        for notify in &mut self.notifies {
            notify.time = at_least("clip.notify.time", notify.time, 0.0)?.min(self.duration);
        }
        self.notifies.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(self)
    }
}

/// Clip library keyed by name
pub type ClipLibrary = HashMap<String, ClipDef>;

/// Clips every character ships with: dash, slide and a death clip whose
/// respawn marker sits before the end
pub fn standard_clips() -> ClipLibrary {
    let mut clips = ClipLibrary::new();
    clips.insert("AM_Dash".to_string(), ClipDef::new(0.5));
    clips.insert("AM_Slide".to_string(), ClipDef::new(0.8));
    clips.insert(
        "AM_Death".to_string(),
        ClipDef::new(2.0).with_notify(RESPAWN_NOTIFY, 1.5),
    );
    clips
}

#[derive(Debug, Clone)]
struct Playing {
    id: PlaybackId,
    clip: String,
    elapsed: f32,
    next_notify: usize,
}

/// One character's animation slot
#[derive(Debug, Clone)]
pub struct ClipPlayer {
    library: ClipLibrary,
    current: Option<Playing>,
    pending: Vec<AnimationEvent>,
    next_id: u64,
}

impl ClipPlayer {
    /// Player over `library`
    pub fn new(library: ClipLibrary) -> Self {
        Self {
            library,
            current: None,
            pending: Vec::new(),
            next_id: 1,
        }
    }

    /// Name of the clip playing, if any
    pub fn current_clip(&self) -> Option<&str> {
        self.current.as_ref().map(|playing| playing.clip.as_str())
    }

    /// Move the timeline forward and return everything that happened since
    /// the last call, oldest first
    pub fn advance(&mut self, dt: f32) -> Vec<AnimationEvent> {
        let mut events = std::mem::take(&mut self.pending);
        let Some(mut playing) = self.current.take() else {
            return events;
        };
        let Some(def) = self.library.get(&playing.clip) else {
            return events;
        };

        playing.elapsed += dt.max(0.0);
        while let Some(notify) = def.notifies.get(playing.next_notify) {
            if notify.time > playing.elapsed {
                break;
            }
            events.push(AnimationEvent::Notify {
                playback: playing.id,
                name: notify.name.clone(),
            });
            playing.next_notify += 1;
        }

        if playing.elapsed >= def.duration {
            events.push(AnimationEvent::Ended {
                playback: playing.id,
                interrupted: false,
            });
        } else {
            self.current = Some(playing);
        }
        events
    }
}

impl Default for ClipPlayer {
    fn default() -> Self {
        Self::new(standard_clips())
    }
}

impl AnimationController for ClipPlayer {
    fn play(&mut self, clip: &str) -> Option<PlaybackId> {
        if !self.library.contains_key(clip) {
            return None;
        }
        if let Some(previous) = self.current.take() {
            self.pending.push(AnimationEvent::Ended {
                playback: previous.id,
                interrupted: true,
            });
        }
        let id = PlaybackId(self.next_id);
        self.next_id += 1;
        self.current = Some(Playing {
            id,
            clip: clip.to_string(),
            elapsed: 0.0,
            next_notify: 0,
        });
        Some(id)
    }

    fn stop_all(&mut self) {
        self.current = None;
        self.pending.clear();
    }

    fn is_playing(&self, playback: PlaybackId) -> bool {
        self.current.as_ref().is_some_and(|playing| playing.id == playback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_then_end() {
        let mut player = ClipPlayer::default();
        let death = player.play("AM_Death").unwrap();

        assert!(player.advance(1.0).is_empty());
        assert_eq!(
            player.advance(0.5),
            vec![AnimationEvent::Notify {
                playback: death,
                name: RESPAWN_NOTIFY.to_string()
            }]
        );
        assert!(player.is_playing(death));
        assert_eq!(
            player.advance(0.5),
            vec![AnimationEvent::Ended {
                playback: death,
                interrupted: false
            }]
        );
        assert!(!player.is_playing(death));
        assert!(player.advance(1.0).is_empty());
    }

    #[test]
    fn test_replacing_a_clip_interrupts_it() {
        let mut player = ClipPlayer::default();
        let dash = player.play("AM_Dash").unwrap();
        let slide = player.play("AM_Slide").unwrap();
        assert_ne!(dash, slide);
        assert_eq!(player.current_clip(), Some("AM_Slide"));

        let events = player.advance(0.1);
        assert_eq!(
            events,
            vec![AnimationEvent::Ended {
                playback: dash,
                interrupted: true
            }]
        );
    }

    #[test]
    fn test_unknown_clip_and_stop() {
        let mut player = ClipPlayer::default();
        assert_eq!(player.play("AM_Cartwheel"), None);

        let dash = player.play("AM_Dash").unwrap();
        player.stop_all();
        assert!(!player.is_playing(dash));
        assert!(player.advance(1.0).is_empty());
    }

    #[test]
    fn test_notify_times_clamped_and_sorted() {
        let clip = ClipDef::new(1.0)
            .with_notify("late", 5.0)
            .with_notify("early", 0.2)
            .validated()
            .unwrap();
        assert_eq!(clip.notifies[0].name, "early");
        assert_eq!(clip.notifies[1].time, 1.0);
    }
}
