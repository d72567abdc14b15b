use std::cell::RefCell;
use std::rc::Rc;

use crate::types::events::{EventTarget, Notification};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEvent {
    pub width: f32,
}

impl Notification for ResizeEvent {
    type Kind = ();

    fn kind(&self) {}
}

/// The container the player lives in. The host reports its rendered width every
/// frame; listeners only hear about actual changes.
pub struct Viewport {
    width: f32,
    events: Rc<RefCell<EventTarget<ResizeEvent>>>,
}

impl Viewport {
    pub fn new(width: f32) -> Self {
        Self {
            width,
            events: EventTarget::shared(),
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn events(&self) -> Rc<RefCell<EventTarget<ResizeEvent>>> {
        self.events.clone()
    }

    /// Records the current rendered width, notifying listeners when it changed.
    pub fn observe_width(&mut self, width: f32) {
        if width == self.width {
            return;
        }
        log::debug!("viewport resized {} -> {}", self.width, width);
        self.width = width;
        self.events.borrow_mut().dispatch(&ResizeEvent { width });
    }
}
