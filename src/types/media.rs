use std::cell::RefCell;
use std::rc::Rc;

use crate::types::events::{EventTarget, Notification};

/// Notifications a media element raises about its own playback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MediaEvent {
    /// The playback position moved.
    TimeUpdate { current_time: f64 },
    /// The duration became known, or changed.
    LoadedMetadata { duration: f64 },
    /// Playback actually started.
    Play,
    /// Playback actually stopped, including at end of stream.
    Pause,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaEventKind {
    TimeUpdate,
    LoadedMetadata,
    Play,
    Pause,
}

impl MediaEventKind {
    pub const ALL: [MediaEventKind; 4] = [
        MediaEventKind::TimeUpdate,
        MediaEventKind::LoadedMetadata,
        MediaEventKind::Play,
        MediaEventKind::Pause,
    ];
}

impl Notification for MediaEvent {
    type Kind = MediaEventKind;

    fn kind(&self) -> MediaEventKind {
        match self {
            MediaEvent::TimeUpdate { .. } => MediaEventKind::TimeUpdate,
            MediaEvent::LoadedMetadata { .. } => MediaEventKind::LoadedMetadata,
            MediaEvent::Play => MediaEventKind::Play,
            MediaEvent::Pause => MediaEventKind::Pause,
        }
    }
}

pub type MediaEvents = Rc<RefCell<EventTarget<MediaEvent>>>;

#[derive(Debug, Clone)]
pub struct VideoFrame {
    pub data: Vec<u8>, // RGBA, tightly packed
    pub width: u32,
    pub height: u32,
    pub timestamp: f64,
    pub frame_number: u64,
}

/// A playable element supplied by the host. The widget only issues requests
/// and listens; every state change is reported back through [`MediaElement::events`].
pub trait MediaElement {
    /// Requests playback. Success is signalled by a [`MediaEvent::Play`].
    /// Once the media has ended, playback restarts from 0.
    fn play(&mut self);
    /// Requests a pause. Success is signalled by a [`MediaEvent::Pause`].
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    /// True after end of stream, until the next seek or play.
    fn ended(&self) -> bool;
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// NaN until the metadata is loaded.
    fn duration(&self) -> f64;
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
    fn events(&self) -> MediaEvents;

    /// Gives the element a chance to deliver pending notifications. Called once per UI frame.
    fn pump(&mut self) {}

    /// The newest decoded frame, if one arrived since the last call.
    fn take_frame(&mut self) -> Option<VideoFrame> {
        None
    }
}

pub type SharedMedia = Rc<RefCell<dyn MediaElement>>;
