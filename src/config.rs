//! Runtime settings. There is no settings file: change behavior by editing
//! the constants below and rebuilding.

use minifb::Key;

pub const CAMERA_INDEX: u32 = 0;
/// Requested capture size; the camera may pick the closest it supports.
pub const CAPTURE_WIDTH: u32 = 640;
pub const CAPTURE_HEIGHT: u32 = 480;
pub const WINDOW_TITLE: &str = "Air Canvas";
pub const QUIT_KEY: Key = Key::Q;
pub const BRUSH_SIZE: i32 = 10;
pub const ERASER_SIZE: i32 = 30;
/// Hand landmark model used with the `onnx` feature.
pub const MODEL_PATH: &str = "models/hand_landmark.onnx";
/// Hands scoring below this presence are dropped.
pub const MIN_PRESENCE: f32 = 0.7;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub camera_index: u32,
    pub width: u32,
    pub height: u32,
    pub window_title: &'static str,
    pub quit_key: Key,
    pub brush_size: i32,
    pub eraser_size: i32,
    pub detector: DetectorConfig,
}

// Only the model-backed detector reads these.
#[cfg_attr(not(feature = "onnx"), allow(dead_code))]
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    pub model_path: &'static str,
    pub min_presence: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            camera_index: CAMERA_INDEX,
            width: CAPTURE_WIDTH,
            height: CAPTURE_HEIGHT,
            window_title: WINDOW_TITLE,
            quit_key: QUIT_KEY,
            brush_size: BRUSH_SIZE,
            eraser_size: ERASER_SIZE,
            detector: DetectorConfig::default(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: MODEL_PATH,
            min_presence: MIN_PRESENCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_drawing_constants() {
        let cfg = Config::default();
        assert_eq!((cfg.brush_size, cfg.eraser_size), (10, 30));
        assert_eq!(cfg.quit_key, Key::Q);
        assert_eq!(cfg.camera_index, 0);
        assert_eq!(cfg.detector.min_presence, 0.7);
    }
}
