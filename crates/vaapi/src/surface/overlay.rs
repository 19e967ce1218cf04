//! Subpicture overlays on a surface.
//!
//! The overlay set is ordered by association time, which is also the order
//! the backend composites in. Each member holds one `Arc` reference to its
//! subpicture. Membership changes and backend calls stay paired:
//!
//! - associate adds a member only after the backend call succeeds
//! - deassociate drops the member first, then asks the backend; what a
//!   backend failure means for the caller is the display's
//!   [`DeassociatePolicy`]

use std::sync::Arc;

use tracing::{debug, warn};
use vs_common::{DeassociatePolicy, Rectangle};

use super::Surface;
use crate::composition::{OverlayComposition, OverlayRectangle};
use crate::error::{SurfaceResult, VaError};
use crate::format;
use crate::subpicture::Subpicture;

/// Subpictures currently associated with a surface.
#[derive(Default)]
pub(super) struct OverlaySet {
    entries: Vec<Arc<Subpicture>>,
}

impl OverlaySet {
    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    fn contains(&self, subpicture: &Arc<Subpicture>) -> bool {
        self.entries.iter().any(|s| Arc::ptr_eq(s, subpicture))
    }

    /// Remove `subpicture`, handing back the reference the set held.
    fn take(&mut self, subpicture: &Arc<Subpicture>) -> Option<Arc<Subpicture>> {
        let pos = self.entries.iter().position(|s| Arc::ptr_eq(s, subpicture))?;
        Some(self.entries.remove(pos))
    }

    fn push(&mut self, subpicture: Arc<Subpicture>) {
        self.entries.push(subpicture);
    }

    fn drain(&mut self) -> Vec<Arc<Subpicture>> {
        std::mem::take(&mut self.entries)
    }
}

/// Destination for a composition rectangle: `y`, `width` and `height` are
/// limited to the surface, `x` is kept as is.
fn clamp_render_rect(render: Rectangle, surface_width: u32, surface_height: u32) -> Rectangle {
    Rectangle {
        x: render.x,
        y: render.y.min(surface_height.min(i32::MAX as u32) as i32),
        width: render.width.min(surface_width),
        height: render.height.min(surface_height),
    }
}

impl Surface {
    /// Number of subpictures currently associated.
    pub fn subpicture_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn has_subpicture(&self, subpicture: &Arc<Subpicture>) -> bool {
        self.overlays.contains(subpicture)
    }

    /// Ids of the associated subpictures, in composition order.
    pub fn subpicture_ids(&self) -> Vec<crate::backend::VaId> {
        self.overlays.entries.iter().map(|s| s.id()).collect()
    }

    /// Associate `subpicture` with the surface.
    ///
    /// `src` defaults to the whole subpicture image, `dst` to the whole
    /// surface. A subpicture that is already associated is deassociated
    /// first, so the new rectangles replace the old binding.
    pub fn associate_subpicture(
        &mut self,
        subpicture: &Arc<Subpicture>,
        src: Option<Rectangle>,
        dst: Option<Rectangle>,
    ) -> SurfaceResult<()> {
        self.ensure_allocated()?;

        if self.overlays.contains(subpicture) {
            self.deassociate_subpicture(subpicture)?;
        }

        let src = src.unwrap_or_else(|| subpicture.full_rect());
        let dst = dst.unwrap_or_else(|| Rectangle::from_size(self.size()));
        let flags = format::subpicture_flags_to_va(subpicture.flags());
        {
            let va = self.display.lock();
            va.associate_subpicture(subpicture.id(), self.id, src, dst, flags)?;
        }

        debug!(
            surface = self.id,
            subpicture = subpicture.id(),
            %src,
            %dst,
            "Associated subpicture"
        );
        self.overlays.push(Arc::clone(subpicture));
        Ok(())
    }

    /// Deassociate `subpicture`. Succeeds without a backend call when it is
    /// not associated with this surface.
    pub fn deassociate_subpicture(&mut self, subpicture: &Arc<Subpicture>) -> SurfaceResult<()> {
        let Some(held) = self.overlays.take(subpicture) else {
            debug!(
                surface = self.id,
                subpicture = subpicture.id(),
                "Subpicture not associated, nothing to do"
            );
            return Ok(());
        };

        let result = self.deassociate_backend(&held);
        drop(held);

        match (result, self.display.config().deassociate_policy) {
            (Ok(()), _) => Ok(()),
            (Err(e), DeassociatePolicy::ReportFailure) => Err(e.into()),
            (Err(e), DeassociatePolicy::IgnoreFailure) => {
                warn!(
                    surface = self.id,
                    subpicture = subpicture.id(),
                    error = %e,
                    "Deassociation failed, subpicture dropped anyway"
                );
                Ok(())
            }
        }
    }

    /// Replace all overlays with the rectangles of `composition`.
    ///
    /// With `propagate_context` and a live parent context, the whole
    /// operation is handed to the context instead. `None` only clears.
    /// The first rectangle that cannot be associated aborts the rebuild;
    /// rectangles before it stay associated.
    pub fn set_subpictures_from_composition(
        &mut self,
        composition: Option<&OverlayComposition>,
        propagate_context: bool,
    ) -> SurfaceResult<()> {
        if propagate_context {
            if let Some(context) = self.parent_context() {
                return context.apply_composition(composition);
            }
        }

        self.destroy_subpictures();

        let Some(composition) = composition else {
            return Ok(());
        };

        for (index, rect) in composition.iter().enumerate() {
            if let Err(e) = self.add_overlay_rectangle(rect) {
                warn!(surface = self.id, index, error = %e, "Could not render overlay rectangle");
                return Err(e);
            }
        }
        Ok(())
    }

    fn add_overlay_rectangle(&mut self, rect: &OverlayRectangle) -> SurfaceResult<()> {
        let subpicture = rect.to_subpicture(&self.display)?;
        let dst = clamp_render_rect(rect.render_rectangle(), self.width, self.height);
        self.associate_subpicture(&subpicture, None, Some(dst))
    }

    /// Deassociate and release every overlay. Failures are logged only.
    pub(super) fn destroy_subpictures(&mut self) {
        for subpicture in self.overlays.drain() {
            if let Err(e) = self.deassociate_backend(&subpicture) {
                warn!(
                    surface = self.id,
                    subpicture = subpicture.id(),
                    error = %e,
                    "Failed to deassociate subpicture"
                );
            }
        }
    }

    fn deassociate_backend(&self, subpicture: &Subpicture) -> Result<(), VaError> {
        let va = self.display.lock();
        va.deassociate_subpicture(subpicture.id(), self.id)
    }
}
