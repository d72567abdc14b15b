pub mod error;
pub mod ops;
pub mod renderer;
pub mod types;
pub mod ui;

pub use error::PlayerError;
pub use types::media::{MediaElement, MediaEvent, SharedMedia};
pub use types::settings::PlayerSettings;
pub use types::viewport::Viewport;
pub use ui::video_player::PlayerWidget;
