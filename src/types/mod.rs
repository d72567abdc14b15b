pub mod events;
pub mod media;
pub mod playback_state;
pub mod settings;
pub mod viewport;
