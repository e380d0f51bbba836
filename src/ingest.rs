use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use eframe::egui;
use image::{ImageFormat, ImageReader};
use thiserror::Error;

use crate::raster::{RasterError, RasterImage};

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("dropped file carries neither a path nor bytes")]
    NoContent,
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("decoded image is unusable: {0}")]
    Raster(#[from] RasterError),
}

/// One file handed over by a drop gesture.
#[derive(Clone, Debug)]
pub struct DroppedImage {
    pub name: String,
    pub media_type: Option<String>,
    pub path: Option<PathBuf>,
    pub bytes: Option<Arc<[u8]>>,
}

impl From<&egui::DroppedFile> for DroppedImage {
    fn from(file: &egui::DroppedFile) -> Self {
        Self {
            name: file.name.clone(),
            media_type: media_type_of(&file.mime, &file.name, file.path.as_deref()),
            path: file.path.clone(),
            bytes: file.bytes.clone(),
        }
    }
}

impl DroppedImage {
    pub fn is_image(&self) -> bool {
        self.media_type.as_deref().is_some_and(is_image_media_type)
    }

    /// Human-readable label for logs.
    pub fn label(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None if !self.name.is_empty() => self.name.clone(),
            None => "<unnamed>".to_owned(),
        }
    }
}

/// The platform MIME type when it reports one, otherwise a guess from the
/// file extension. Native drops usually arrive without a MIME type.
pub fn media_type_of(mime: &str, name: &str, path: Option<&Path>) -> Option<String> {
    if !mime.is_empty() {
        return Some(mime.to_owned());
    }
    let guess_from = path.unwrap_or_else(|| Path::new(name));
    ImageFormat::from_path(guess_from)
        .ok()
        .map(|format| format.to_mime_type().to_owned())
}

pub fn is_image_media_type(media_type: &str) -> bool {
    media_type.starts_with("image/")
}

/// Decodes at natural resolution. In-memory bytes take priority over the path.
pub fn decode(file: &DroppedImage) -> Result<RasterImage, IngestError> {
    let decoded = if let Some(bytes) = &file.bytes {
        image::load_from_memory(bytes)?
    } else if let Some(path) = &file.path {
        // The reader owns the file handle and closes it when decode returns.
        ImageReader::open(path)?.with_guessed_format()?.decode()?
    } else {
        return Err(IngestError::NoContent);
    };

    Ok(RasterImage::try_from(decoded.into_rgba8())?)
}

struct Decoded {
    id: u64,
    label: String,
    result: Result<RasterImage, IngestError>,
}

/// Runs decodes off the UI thread and hands back finished rasters.
///
/// Each accepted drop gets its own worker. Results are applied in completion
/// order, so the last decode to finish wins even if it was dropped first.
pub struct Ingestor {
    tx: Sender<Decoded>,
    rx: Receiver<Decoded>,
    wake: Arc<dyn Fn() + Send + Sync>,
    next_id: u64,
}

impl Ingestor {
    /// `wake` is called from the worker once a result is queued.
    pub fn new(wake: impl Fn() + Send + Sync + 'static) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            wake: Arc::new(wake),
            next_id: 0,
        }
    }

    /// Starts decoding `file`. Returns `false` when the file is ignored.
    pub fn submit(&mut self, file: DroppedImage) -> bool {
        let label = file.label();
        if !file.is_image() {
            log::debug!(
                "ignoring {label}: media type {:?} is not an image",
                file.media_type
            );
            return false;
        }

        let id = self.next_id;
        self.next_id += 1;

        let tx = self.tx.clone();
        let wake = Arc::clone(&self.wake);
        let spawned = thread::Builder::new()
            .name(format!("decode-{id}"))
            .spawn(move || {
                let result = decode(&file);
                let _ = tx.send(Decoded {
                    id,
                    label: file.label(),
                    result,
                });
                wake();
            });

        match spawned {
            Ok(_) => {
                log::debug!("decode #{id} started for {label}");
                true
            }
            Err(e) => {
                log::warn!("could not start decoding {label}: {e}");
                false
            }
        }
    }

    /// Drains finished decodes and returns the last successful one, if any.
    pub fn poll(&mut self) -> Option<RasterImage> {
        let mut latest = None;
        for decoded in self.rx.try_iter() {
            match decoded.result {
                Ok(image) => {
                    log::info!(
                        "decode #{} finished: {} ({}x{})",
                        decoded.id,
                        decoded.label,
                        image.width(),
                        image.height()
                    );
                    latest = Some(image);
                }
                Err(e) => log::warn!("decode #{} failed for {}: {e}", decoded.id, decoded.label),
            }
        }
        latest
    }
}
