//! CPU access to surface pixels: zero-copy derive and full-frame get/put.

use tracing::debug;
use vs_common::Rectangle;

use super::Surface;
use crate::backend::INVALID_ID;
use crate::error::{SurfaceError, SurfaceResult};
use crate::image::Image;

impl Surface {
    /// Map the surface storage as an image without copying.
    ///
    /// Not every driver/format combination supports this. Dropping the
    /// returned image leaves the surface storage intact.
    pub fn derive_image(&self) -> SurfaceResult<Image> {
        self.ensure_allocated()?;
        let desc = {
            let va = self.display.lock();
            va.derive_image(self.id)?
        };
        let image = Image::from_descriptor(&self.display, desc)?;
        debug!(surface = self.id, image = image.id(), "Derived image");
        Ok(image)
    }

    /// Copy the whole surface into `image`. Sizes must match exactly.
    pub fn get_image(&self, image: &Image) -> SurfaceResult<()> {
        self.check_transfer_target(image)?;
        let va = self.display.lock();
        va.get_image(self.id, Rectangle::from_size(self.size()), image.id())?;
        Ok(())
    }

    /// Copy the whole of `image` into the surface. Sizes must match exactly.
    pub fn put_image(&self, image: &Image) -> SurfaceResult<()> {
        self.check_transfer_target(image)?;
        let rect = Rectangle::from_size(self.size());
        let va = self.display.lock();
        va.put_image(self.id, image.id(), rect, rect)?;
        Ok(())
    }

    fn check_transfer_target(&self, image: &Image) -> SurfaceResult<()> {
        self.ensure_allocated()?;
        if image.id() == INVALID_ID {
            return Err(SurfaceError::InvalidImage);
        }
        if image.size() != self.size() {
            return Err(SurfaceError::SizeMismatch {
                surface: self.size(),
                image: image.size(),
            });
        }
        Ok(())
    }

    pub(super) fn ensure_allocated(&self) -> SurfaceResult<()> {
        if self.id == INVALID_ID {
            Err(SurfaceError::InvalidSurface)
        } else {
            Ok(())
        }
    }
}
