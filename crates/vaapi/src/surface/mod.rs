//! VA surfaces.
//!
//! A [`Surface`] owns one backend surface allocation on a shared
//! [`Display`]. Its operations are split by concern:
//!
//! - [`alloc`]: the three creation strategies
//! - [`snapshot`]: derive / get / put image
//! - [`overlay`]: subpicture association and composition
//! - [`status`]: sync and status query
//!
//! # Teardown
//!
//! Dropping a surface runs [`Surface::teardown`], which always completes in
//! this order:
//!
//! 1. every overlay is deassociated and its reference released
//! 2. the parent context link is cleared
//! 3. the backend surface is destroyed under the display lock
//! 4. the external buffer proxy reference is released
//!
//! Failures in any step are logged and never propagated.

mod alloc;
mod overlay;
mod snapshot;
mod status;

use std::sync::{Arc, OnceLock, Weak};

use tracing::{debug, warn};
use vs_common::{ChromaType, Resolution, VideoFormat};

use crate::backend::{VaId, INVALID_ID};
use crate::buffer_proxy::BufferProxy;
use crate::context::ParentContext;
use crate::display::Display;

pub use self::alloc::AllocFlags;
pub use self::status::SurfaceStatus;

use self::overlay::OverlaySet;

/// A hardware video surface.
pub struct Surface {
    display: Display,
    id: VaId,
    /// Unset until committed at creation or resolved on first query.
    format: OnceLock<VideoFormat>,
    chroma_type: ChromaType,
    width: u32,
    height: u32,
    extbuf_proxy: Option<Arc<BufferProxy>>,
    parent_context: Option<Weak<dyn ParentContext>>,
    overlays: OverlaySet,
}

impl Surface {
    /// Backend surface id, or [`INVALID_ID`] once destroyed.
    pub fn id(&self) -> VaId {
        self.id
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn chroma_type(&self) -> ChromaType {
        self.chroma_type
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    /// Pixel format of the surface.
    ///
    /// Surfaces created from a chroma type alone resolve their format on the
    /// first call by deriving an image. When that fails the format is
    /// [`VideoFormat::Encoded`] from then on.
    pub fn format(&self) -> VideoFormat {
        *self.format.get_or_init(|| self.resolve_format())
    }

    fn resolve_format(&self) -> VideoFormat {
        match self.derive_image() {
            Ok(image) => image.format(),
            Err(e) => {
                debug!(surface = self.id, error = %e, "Could not resolve surface format");
                VideoFormat::Encoded
            }
        }
    }

    /// External buffer memory this surface wraps, if any.
    pub fn buffer_proxy(&self) -> Option<&Arc<BufferProxy>> {
        self.extbuf_proxy.as_ref()
    }

    /// Parent context, if one is set and still alive.
    pub fn parent_context(&self) -> Option<Arc<dyn ParentContext>> {
        self.parent_context.as_ref().and_then(Weak::upgrade)
    }

    /// Link the surface to a context, or clear the link with `None`.
    ///
    /// The link is weak; it never keeps the context alive.
    pub fn set_parent_context(&mut self, context: Option<&Arc<dyn ParentContext>>) {
        self.parent_context = context.map(Arc::downgrade);
    }

    /// Release everything the surface holds. Idempotent.
    fn teardown(&mut self) {
        debug!(surface = self.id, "Destroying surface");

        self.destroy_subpictures();
        self.parent_context = None;

        if self.id != INVALID_ID {
            let result = {
                let va = self.display.lock();
                va.destroy_surface(self.id)
            };
            match result {
                Ok(()) => self.id = INVALID_ID,
                Err(e) => warn!(surface = self.id, error = %e, "Failed to destroy surface"),
            }
        }

        self.extbuf_proxy = None;
    }
}

impl Drop for Surface {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("id", &self.id)
            .field("format", &self.format.get())
            .field("chroma_type", &self.chroma_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("overlays", &self.overlays.len())
            .field("external", &self.extbuf_proxy.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::OverlayComposition;
    use crate::error::SurfaceResult;
    use crate::image::Image;
    use crate::software::{BackendCall, Operation, SoftwareBackend};
    use crate::subpicture::{Subpicture, SubpictureFlags};

    struct TestContext;

    impl ParentContext for TestContext {
        fn id(&self) -> crate::context::ContextId {
            5
        }

        fn apply_composition(&self, _: Option<&OverlayComposition>) -> SurfaceResult<()> {
            Ok(())
        }
    }

    fn setup() -> (Arc<SoftwareBackend>, Display) {
        let backend = Arc::new(SoftwareBackend::new());
        let display = Display::new(backend.clone());
        (backend, display)
    }

    fn subpicture(display: &Display) -> Arc<Subpicture> {
        let image = Image::new(display, VideoFormat::Bgra, 8, 8).unwrap();
        Subpicture::new(image, SubpictureFlags::empty()).unwrap()
    }

    // ── Format resolution ──

    #[test]
    fn implicit_format_resolves_lazily() {
        let (backend, display) = setup();
        let surface = Surface::new(&display, ChromaType::Yuv420, 32, 32).unwrap();
        assert_eq!(backend.count(Operation::DeriveImage), 0);

        assert_eq!(surface.format(), VideoFormat::Nv12);
        assert_eq!(backend.count(Operation::DeriveImage), 1);
        assert_eq!(backend.live_images(), 0);

        // Cached after the first query.
        assert_eq!(surface.format(), VideoFormat::Nv12);
        assert_eq!(backend.count(Operation::DeriveImage), 1);
    }

    #[test]
    fn unresolvable_format_falls_back_to_encoded() {
        let (backend, display) = setup();
        backend.set_derive_supported(false);
        let surface = Surface::new(&display, ChromaType::Yuv420, 32, 32).unwrap();
        assert_eq!(surface.format(), VideoFormat::Encoded);

        backend.set_derive_supported(true);
        assert_eq!(surface.format(), VideoFormat::Encoded);
    }

    // ── Parent context ──

    #[test]
    fn parent_context_is_weak() {
        let (_backend, display) = setup();
        let mut surface = Surface::new(&display, ChromaType::Yuv420, 16, 16).unwrap();
        assert!(surface.parent_context().is_none());

        let context: Arc<dyn ParentContext> = Arc::new(TestContext);
        surface.set_parent_context(Some(&context));
        assert_eq!(surface.parent_context().map(|c| c.id()), Some(5));
        assert_eq!(Arc::strong_count(&context), 1);

        drop(context);
        assert!(surface.parent_context().is_none());
    }

    #[test]
    fn clearing_parent_context() {
        let (_backend, display) = setup();
        let mut surface = Surface::new(&display, ChromaType::Yuv420, 16, 16).unwrap();
        let context: Arc<dyn ParentContext> = Arc::new(TestContext);
        surface.set_parent_context(Some(&context));
        surface.set_parent_context(None);
        assert!(surface.parent_context().is_none());
    }

    // ── Teardown ──

    #[test]
    fn teardown_order() {
        let (backend, display) = setup();
        let mut surface = Surface::new(&display, ChromaType::Yuv420, 64, 64).unwrap();
        let a = subpicture(&display);
        let b = subpicture(&display);
        surface.associate_subpicture(&a, None, None).unwrap();
        surface.associate_subpicture(&b, None, None).unwrap();
        let (a_id, b_id, surface_id) = (a.id(), b.id(), surface.id());
        drop(a);
        drop(b);

        backend.clear_calls();
        drop(surface);

        let ops: Vec<BackendCall> = backend
            .calls()
            .into_iter()
            .filter(|c| {
                matches!(
                    c,
                    BackendCall::DeassociateSubpicture { .. }
                        | BackendCall::DestroySubpicture { .. }
                        | BackendCall::DestroySurface { .. }
                )
            })
            .collect();
        assert_eq!(
            ops,
            vec![
                BackendCall::DeassociateSubpicture { subpicture: a_id, surface: surface_id },
                BackendCall::DestroySubpicture { subpicture: a_id },
                BackendCall::DeassociateSubpicture { subpicture: b_id, surface: surface_id },
                BackendCall::DestroySubpicture { subpicture: b_id },
                BackendCall::DestroySurface { surface: surface_id },
            ]
        );
        assert_eq!(backend.live_surfaces(), 0);
        assert_eq!(backend.live_subpictures(), 0);
    }

    #[test]
    fn teardown_survives_backend_failures() {
        let (backend, display) = setup();
        let mut surface = Surface::new(&display, ChromaType::Yuv420, 16, 16).unwrap();
        let sub = subpicture(&display);
        surface.associate_subpicture(&sub, None, None).unwrap();

        backend.fail_always(Operation::DeassociateSubpicture);
        backend.fail_always(Operation::DestroySurface);
        drop(surface);

        assert_eq!(backend.count(Operation::DestroySurface), 1);
        assert_eq!(Arc::strong_count(&sub), 1);
    }

    #[test]
    fn debug_output() {
        let (_backend, display) = setup();
        let surface = Surface::new(&display, ChromaType::Yuv420, 16, 16).unwrap();
        let s = format!("{surface:?}");
        assert!(s.contains("Surface"));
        assert!(s.contains("Yuv420"));
    }
}
