//! Overlay subpictures.

use std::sync::Arc;

use bitflags::bitflags;
use tracing::{debug, warn};
use vs_common::{Rectangle, Resolution};

use crate::backend::VaId;
use crate::display::Display;
use crate::error::SurfaceResult;
use crate::image::Image;

bitflags! {
    /// Rendering options applied when a subpicture is associated.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SubpictureFlags: u32 {
        /// Pixels matching the chroma key are transparent.
        const CHROMA_KEY = 1;
        /// Apply the subpicture's global alpha.
        const GLOBAL_ALPHA = 2;
        /// Destination rectangle is in screen, not surface, coordinates.
        const SCREEN_COORDS = 4;
    }
}

/// A backend subpicture and the image it displays.
///
/// Shared through `Arc`: every surface the subpicture is associated with
/// holds one reference until it is deassociated.
pub struct Subpicture {
    display: Display,
    id: VaId,
    flags: SubpictureFlags,
    global_alpha: f32,
    // Dropped after the subpicture object is destroyed.
    image: Image,
}

impl Subpicture {
    pub fn new(image: Image, flags: SubpictureFlags) -> SurfaceResult<Arc<Self>> {
        Self::with_global_alpha(image, flags, 1.0)
    }

    /// Create a subpicture and, if `flags` has `GLOBAL_ALPHA`, set its alpha.
    pub fn with_global_alpha(
        image: Image,
        flags: SubpictureFlags,
        global_alpha: f32,
    ) -> SurfaceResult<Arc<Self>> {
        let display = image.display().clone();
        let id = {
            let va = display.lock();
            va.create_subpicture(image.id())?
        };
        let subpicture = Self {
            display,
            id,
            flags,
            global_alpha,
            image,
        };

        if flags.contains(SubpictureFlags::GLOBAL_ALPHA) {
            let va = subpicture.display.lock();
            va.set_subpicture_global_alpha(id, global_alpha)?;
        }

        debug!(subpicture = id, image = subpicture.image.id(), ?flags, "Created subpicture");
        Ok(Arc::new(subpicture))
    }

    pub fn id(&self) -> VaId {
        self.id
    }

    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn flags(&self) -> SubpictureFlags {
        self.flags
    }

    pub fn global_alpha(&self) -> f32 {
        self.global_alpha
    }

    pub fn size(&self) -> Resolution {
        self.image.size()
    }

    /// Rectangle covering the whole source image.
    pub fn full_rect(&self) -> Rectangle {
        Rectangle::from_size(self.image.size())
    }
}

impl Drop for Subpicture {
    fn drop(&mut self) {
        let result = {
            let va = self.display.lock();
            va.destroy_subpicture(self.id)
        };
        match result {
            Ok(()) => debug!(subpicture = self.id, "Destroyed subpicture"),
            Err(e) => warn!(subpicture = self.id, error = %e, "Failed to destroy subpicture"),
        }
    }
}

impl std::fmt::Debug for Subpicture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subpicture")
            .field("id", &self.id)
            .field("image", &self.image.id())
            .field("flags", &self.flags)
            .field("global_alpha", &self.global_alpha)
            .finish()
    }
}
