use std::time::Duration;

use crate::raster::CropRect;

pub const APP_NAME: &str = "Crop Flicker";
pub const WINDOW_SIZE: [f32; 2] = [680.0, 680.0];
pub const PROMPT: &str = "Drop an image here";

/// Fixed geometry and cadence. Nothing here is editable at runtime.
#[derive(Clone, Copy, Debug)]
pub struct FlickerConfig {
    pub left: CropRect,
    pub right: CropRect,
    pub period: Duration,
}

impl FlickerConfig {
    pub const LEFT: CropRect = CropRect::new(150, 50, 600, 600);
    pub const RIGHT: CropRect = CropRect::new(608, 50, 600, 600);
    pub const PERIOD: Duration = Duration::from_millis(200);
}

impl Default for FlickerConfig {
    fn default() -> Self {
        Self {
            left: Self::LEFT,
            right: Self::RIGHT,
            period: Self::PERIOD,
        }
    }
}
