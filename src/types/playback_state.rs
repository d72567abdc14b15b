use crate::ops::time_format::{duration_known, progress_fraction, remaining_time};
use crate::types::media::MediaEvent;

/// Playback as last reported by the media element. Only notifications move it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Paused,
    Playing,
}

impl PlaybackState {
    pub fn on_event(self, event: &MediaEvent) -> Self {
        match event {
            MediaEvent::Play => PlaybackState::Playing,
            MediaEvent::Pause => PlaybackState::Paused,
            _ => self,
        }
    }

    pub fn is_playing(self) -> bool {
        self == PlaybackState::Playing
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TimeState {
    pub current_time: f64, // seconds
    pub duration: f64,     // 0.0 until metadata loads
}

impl TimeState {
    pub fn duration_known(&self) -> bool {
        duration_known(self.duration)
    }

    pub fn progress(&self) -> f64 {
        progress_fraction(self.current_time, self.duration)
    }

    pub fn remaining(&self) -> f64 {
        remaining_time(self.current_time, self.duration)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeState {
    pub volume: f64,
}

impl Default for VolumeState {
    fn default() -> Self {
        Self { volume: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleState {
    pub scale: f32,
}

impl Default for ScaleState {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

/// Everything one mounted widget shows. Dropped with the widget.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerState {
    pub playback: PlaybackState,
    pub time: TimeState,
    pub volume: VolumeState,
    pub scale: ScaleState,
    pub hovered: bool,
}

impl PlayerState {
    pub fn new(initial_volume: f64) -> Self {
        Self {
            volume: VolumeState {
                volume: initial_volume,
            },
            ..Self::default()
        }
    }

    pub fn apply(&mut self, event: &MediaEvent) {
        match *event {
            MediaEvent::TimeUpdate { current_time } => self.time.current_time = current_time,
            MediaEvent::LoadedMetadata { duration } => self.time.duration = duration,
            MediaEvent::Play | MediaEvent::Pause => {
                self.playback = self.playback.on_event(event);
            }
        }
    }
}
