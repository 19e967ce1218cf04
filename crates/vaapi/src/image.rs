//! CPU-side image wrapper.
//!
//! An [`Image`] is either allocated explicitly (a get/put target or overlay
//! source) or derived from a surface. Dropping it destroys the backend image
//! object only; a derived image never owns the surface storage it maps.

use tracing::{debug, warn};
use vs_common::{Resolution, VideoFormat};

use crate::backend::{ImageDescriptor, VaId, INVALID_ID};
use crate::display::Display;
use crate::error::{SurfaceError, SurfaceResult};
use crate::format;

pub struct Image {
    display: Display,
    desc: ImageDescriptor,
    format: VideoFormat,
}

impl Image {
    /// Allocate an image of `format` at `width` x `height`.
    pub fn new(
        display: &Display,
        format: VideoFormat,
        width: u32,
        height: u32,
    ) -> SurfaceResult<Self> {
        let va_format =
            format::video_format_to_va(format).ok_or(SurfaceError::UnsupportedFormat(format))?;

        let desc = {
            let va = display.lock();
            va.create_image(&va_format, width, height)?
        };
        debug!(image = desc.id, %format, width, height, "Created image");
        Self::from_descriptor(display, desc)
    }

    /// Wrap a backend image record.
    ///
    /// Fails when the record lacks an image id or a buffer id. In the latter
    /// case the image object is destroyed before returning.
    pub fn from_descriptor(display: &Display, desc: ImageDescriptor) -> SurfaceResult<Self> {
        if desc.id == INVALID_ID {
            return Err(SurfaceError::InvalidDerivedImage { missing: "image" });
        }
        if desc.buf == INVALID_ID {
            let result = {
                let va = display.lock();
                va.destroy_image(desc.id)
            };
            if let Err(e) = result {
                warn!(image = desc.id, error = %e, "Failed to destroy incomplete image");
            }
            return Err(SurfaceError::InvalidDerivedImage { missing: "buffer" });
        }

        let format = format::va_to_video_format(&desc.format).unwrap_or(VideoFormat::Encoded);
        Ok(Self {
            display: display.clone(),
            desc,
            format,
        })
    }

    pub fn id(&self) -> VaId {
        self.desc.id
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn size(&self) -> Resolution {
        Resolution::new(self.desc.width, self.desc.height)
    }

    pub fn format(&self) -> VideoFormat {
        self.format
    }

    pub fn descriptor(&self) -> &ImageDescriptor {
        &self.desc
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    /// Copy pixel data into the image buffer.
    ///
    /// `data` must cover the image's full data size; extra bytes are ignored.
    pub fn upload(&self, data: &[u8]) -> SurfaceResult<()> {
        let expected = self.desc.data_size as usize;
        if data.len() < expected {
            return Err(SurfaceError::TruncatedData {
                expected,
                actual: data.len(),
            });
        }
        let va = self.display.lock();
        va.upload_image(&self.desc, &data[..expected])?;
        Ok(())
    }
}

impl Drop for Image {
    fn drop(&mut self) {
        let result = {
            let va = self.display.lock();
            va.destroy_image(self.desc.id)
        };
        match result {
            Ok(()) => debug!(image = self.desc.id, "Destroyed image"),
            Err(e) => warn!(image = self.desc.id, error = %e, "Failed to destroy image"),
        }
    }
}

impl std::fmt::Debug for Image {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Image")
            .field("id", &self.desc.id)
            .field("format", &self.format)
            .field("width", &self.desc.width)
            .field("height", &self.desc.height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::software::{BackendCall, SoftwareBackend};

    fn setup() -> (Arc<SoftwareBackend>, Display) {
        let backend = Arc::new(SoftwareBackend::new());
        let display = Display::new(backend.clone());
        (backend, display)
    }

    #[test]
    fn create_and_drop() {
        let (backend, display) = setup();
        let image = Image::new(&display, VideoFormat::Bgra, 16, 8).unwrap();
        assert_eq!(image.size(), Resolution::new(16, 8));
        assert_eq!(image.format(), VideoFormat::Bgra);
        assert_eq!(backend.live_images(), 1);

        let id = image.id();
        drop(image);
        assert_eq!(backend.live_images(), 0);
        assert!(backend.calls().contains(&BackendCall::DestroyImage { image: id }));
    }

    #[test]
    fn unsupported_format_issues_no_call() {
        let (backend, display) = setup();
        let err = Image::new(&display, VideoFormat::Encoded, 16, 16).unwrap_err();
        assert!(matches!(err, SurfaceError::UnsupportedFormat(VideoFormat::Encoded)));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn missing_buffer_destroys_image() {
        let (backend, display) = setup();
        let desc = ImageDescriptor {
            id: 99,
            ..Default::default()
        };
        let err = Image::from_descriptor(&display, desc).unwrap_err();
        assert!(matches!(err, SurfaceError::InvalidDerivedImage { missing: "buffer" }));
        assert!(backend.calls().contains(&BackendCall::DestroyImage { image: 99 }));
    }

    #[test]
    fn missing_image_id_is_rejected() {
        let (backend, display) = setup();
        let err = Image::from_descriptor(&display, ImageDescriptor::default()).unwrap_err();
        assert!(matches!(err, SurfaceError::InvalidDerivedImage { missing: "image" }));
        assert!(backend.calls().is_empty());
    }

    #[test]
    fn upload_checks_length() {
        let (backend, display) = setup();
        let image = Image::new(&display, VideoFormat::Rgba, 2, 2).unwrap();
        let err = image.upload(&[0u8; 4]).unwrap_err();
        assert!(matches!(err, SurfaceError::TruncatedData { expected: 16, actual: 4 }));

        let pixels: Vec<u8> = (0..16).collect();
        image.upload(&pixels).unwrap();
        assert_eq!(backend.image_data(image.id()), Some(pixels));
    }
}
