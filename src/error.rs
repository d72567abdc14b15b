use gstreamer as gst;

/// Errors raised while building the player. Widget operations themselves never fail.
#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error("GStreamer initialisation failed: {0}")]
    GstInit(#[from] gst::glib::Error),

    #[error("failed to build media pipeline: {0}")]
    Pipeline(#[from] gst::glib::BoolError),

    #[error("media pipeline refused state {state:?}")]
    StateChange { state: gst::State },

    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid settings: {0}")]
    Settings(#[from] serde_json::Error),

    #[error("UI failed: {0}")]
    Ui(String),
}
