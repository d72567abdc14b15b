use std::cell::RefCell;
use std::rc::Weak;

use crate::types::events::{EventTarget, Subscription};
use crate::types::playback_state::PlayerState;
use crate::types::viewport::{ResizeEvent, Viewport};

/// Keeps the player's scale factor equal to container width / reference width.
#[derive(Debug, Clone, Copy)]
pub struct FrameScaler {
    reference_width: f32,
}

impl FrameScaler {
    pub fn new(reference_width: f32) -> Self {
        Self { reference_width }
    }

    /// Unclamped: a zero-width container yields a zero scale.
    pub fn scale_for(&self, width: f32) -> f32 {
        width / self.reference_width
    }

    /// Applies the current width, then follows every resize until the returned
    /// subscription is dropped.
    pub fn mount(
        &self,
        viewport: &Viewport,
        state: Weak<RefCell<PlayerState>>,
    ) -> Subscription<ResizeEvent> {
        let scaler = *self;
        apply_scale(&state, scaler.scale_for(viewport.width()));
        EventTarget::subscribe(&viewport.events(), (), move |event: &ResizeEvent| {
            apply_scale(&state, scaler.scale_for(event.width));
        })
    }
}

fn apply_scale(state: &Weak<RefCell<PlayerState>>, scale: f32) {
    let Some(state) = state.upgrade() else {
        return;
    };
    match state.try_borrow_mut() {
        Ok(mut state) => state.scale.scale = scale,
        Err(_) => log::warn!("skipped scale update to {}: player state busy", scale),
    }
}
