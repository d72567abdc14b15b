use crate::error::PlayerError;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub const DEFAULT_SOURCE: &str = "https://www.w3schools.com/html/mov_bbb.mp4";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    /// URI or local path of the media to play.
    pub source_uri: String,
    /// Local image painted until the first frame is decoded.
    pub poster_path: Option<String>,
    /// Design width the frame is laid out in; the scale factor is relative to it.
    pub reference_width: f32,
    pub reference_height: f32,
    pub initial_volume: f64,
    pub autoplay: bool,
    pub time_update_interval_ms: u64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            source_uri: DEFAULT_SOURCE.to_string(),
            poster_path: None,
            reference_width: 1840.0,
            reference_height: 1121.0,
            initial_volume: 1.0,
            autoplay: false,
            time_update_interval_ms: 250,
        }
    }
}

impl PlayerSettings {
    /// Save the settings to a JSON file at the given path.
    pub fn save_to_file(&self, path: &Path) -> Result<(), PlayerError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Load settings from a JSON file. Missing fields fall back to their defaults.
    pub fn load_from_file(path: &Path) -> Result<PlayerSettings, PlayerError> {
        let mut file = File::open(path)?;
        let mut json = String::new();
        file.read_to_string(&mut json)?;
        let settings: PlayerSettings = serde_json::from_str(&json)?;
        log::info!("loaded player settings from {}", path.display());
        Ok(settings.sanitized())
    }

    /// Clamps the volume to [0, 1] and replaces reference dimensions that are
    /// not finite and positive with the defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = PlayerSettings::default();
        if !(self.reference_width.is_finite() && self.reference_width > 0.0) {
            log::warn!(
                "invalid reference width {}, using {}",
                self.reference_width,
                defaults.reference_width
            );
            self.reference_width = defaults.reference_width;
        }
        if !(self.reference_height.is_finite() && self.reference_height > 0.0) {
            log::warn!(
                "invalid reference height {}, using {}",
                self.reference_height,
                defaults.reference_height
            );
            self.reference_height = defaults.reference_height;
        }
        if self.initial_volume.is_nan() {
            log::warn!("invalid initial volume, using {}", defaults.initial_volume);
            self.initial_volume = defaults.initial_volume;
        }
        self.initial_volume = self.initial_volume.clamp(0.0, 1.0);
        self
    }
}
