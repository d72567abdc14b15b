pub mod app;
pub mod controls;
pub mod frame_scaler;
pub mod video_player;
