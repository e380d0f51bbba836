use std::sync::Arc;

use crate::config::FlickerConfig;
use crate::raster::{self, CropRect, RasterImage};
use crate::toggle::{Side, Toggler};

/// Everything the window shows, kept apart from egui so it can be tested.
///
/// Any mutation that changes what should be on screen sets `dirty`; the
/// renderer consumes it with [`FlickerState::take_dirty`] and re-derives the
/// frame from scratch, so recomputation is idempotent.
pub struct FlickerState {
    config: FlickerConfig,
    image: Option<Arc<RasterImage>>,
    toggler: Toggler,
    dragging: bool,
    dirty: bool,
}

impl FlickerState {
    pub fn new(config: FlickerConfig) -> Self {
        Self {
            config,
            image: None,
            toggler: Toggler::default(),
            dragging: false,
            dirty: false,
        }
    }

    #[cfg(test)]
    pub fn image(&self) -> Option<&RasterImage> {
        self.image.as_deref()
    }

    #[cfg(test)]
    pub fn side(&self) -> Side {
        self.toggler.side()
    }

    pub fn active_rect(&self) -> CropRect {
        match self.toggler.side() {
            Side::Left => self.config.left,
            Side::Right => self.config.right,
        }
    }

    /// Replaces the current image. The previous one is released once no
    /// frame holds it anymore.
    pub fn publish(&mut self, image: RasterImage) {
        for (name, rect) in [("left", self.config.left), ("right", self.config.right)] {
            if !rect.fits_within(&image) {
                log::warn!(
                    "{name} crop {rect:?} does not fit a {}x{} image; nothing will be shown for it",
                    image.width(),
                    image.height()
                );
            }
        }
        self.image = Some(Arc::new(image));
        self.dirty = true;
    }

    pub fn advance(&mut self, ticks: usize) {
        if ticks == 0 {
            return;
        }
        self.toggler.advance(ticks);
        self.dirty = true;
    }

    pub fn set_dragging(&mut self, dragging: bool) {
        self.dragging = dragging;
    }

    pub fn overlay_visible(&self) -> bool {
        self.dragging || self.image.is_none()
    }

    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// The active crop of the current image, or `None` before the first
    /// publish or when the crop falls outside the image.
    pub fn current_frame(&self) -> Option<RasterImage> {
        let image = self.image.as_deref()?;
        let rect = self.active_rect();
        rect.fits_within(image).then(|| raster::extract(image, rect))
    }
}
