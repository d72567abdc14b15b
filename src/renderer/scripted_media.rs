//! In-memory media element driven by tests.

use crate::types::events::EventTarget;
use crate::types::media::{MediaElement, MediaEvent, MediaEvents};

pub struct ScriptedMedia {
    pub paused: bool,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f64,
    /// When set, play requests are swallowed the way a blocked autoplay would be.
    pub reject_play: bool,
    pub play_requests: usize,
    pub pause_requests: usize,
    ended: bool,
    events: MediaEvents,
}

impl ScriptedMedia {
    pub fn new() -> Self {
        Self {
            paused: true,
            current_time: 0.0,
            duration: f64::NAN,
            volume: 1.0,
            reject_play: false,
            play_requests: 0,
            pause_requests: 0,
            ended: false,
            events: EventTarget::shared(),
        }
    }

    fn emit(&self, event: MediaEvent) {
        self.events.borrow_mut().dispatch(&event);
    }

    pub fn load_metadata(&mut self, duration: f64) {
        self.duration = duration;
        self.emit(MediaEvent::LoadedMetadata { duration });
    }

    pub fn advance_to(&mut self, seconds: f64) {
        self.current_time = seconds;
        self.emit(MediaEvent::TimeUpdate {
            current_time: seconds,
        });
    }

    /// Playback stopping on its own, without a request from the widget.
    pub fn end_of_stream(&mut self) {
        self.advance_to(self.duration);
        self.ended = true;
        self.paused = true;
        self.emit(MediaEvent::Pause);
    }

    pub fn listener_count(&self) -> usize {
        self.events.borrow().listener_count()
    }
}

impl MediaElement for ScriptedMedia {
    fn play(&mut self) {
        self.play_requests += 1;
        if self.reject_play {
            return;
        }
        if self.ended {
            self.set_current_time(0.0);
        }
        self.paused = false;
        self.emit(MediaEvent::Play);
    }

    fn pause(&mut self) {
        self.pause_requests += 1;
        self.paused = true;
        self.emit(MediaEvent::Pause);
    }

    fn is_paused(&self) -> bool {
        self.paused
    }

    fn ended(&self) -> bool {
        self.ended
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.ended = false;
        self.advance_to(seconds);
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    fn events(&self) -> MediaEvents {
        self.events.clone()
    }
}
