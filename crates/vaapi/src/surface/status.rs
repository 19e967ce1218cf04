//! Completion of asynchronous work on a surface.

use bitflags::bitflags;
use tracing::trace;

use super::Surface;
use crate::error::SurfaceResult;
use crate::format;

bitflags! {
    /// What the hardware is currently doing with a surface.
    ///
    /// An empty set means idle: nothing pending.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SurfaceStatus: u32 {
        const IDLE = 0;
        /// Rendering into the surface is still in progress.
        const RENDERING = 1;
        /// The surface is being displayed.
        const DISPLAYING = 2;
        /// The surface was skipped for display.
        const SKIPPED = 4;
    }
}

impl SurfaceStatus {
    pub fn is_idle(self) -> bool {
        self.is_empty()
    }
}

impl Surface {
    /// Block until all pending operations on the surface have completed.
    ///
    /// There is no timeout. Poll [`query_status`](Self::query_status) for a
    /// bounded wait.
    pub fn sync(&self) -> SurfaceResult<()> {
        self.ensure_allocated()?;
        let va = self.display.lock();
        va.sync_surface(self.id)?;
        trace!(surface = self.id, "Surface synced");
        Ok(())
    }

    /// Current status, without blocking.
    pub fn query_status(&self) -> SurfaceResult<SurfaceStatus> {
        self.ensure_allocated()?;
        let bits = {
            let va = self.display.lock();
            va.query_surface_status(self.id)?
        };
        Ok(format::surface_status_from_va(bits))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::display::Display;
    use crate::error::SurfaceError;
    use crate::software::{Operation, SoftwareBackend};
    use vs_common::ChromaType;

    fn setup() -> (Arc<SoftwareBackend>, Display) {
        let backend = Arc::new(SoftwareBackend::new());
        let display = Display::new(backend.clone());
        (backend, display)
    }

    #[test]
    fn sync_completes_pending_renders() {
        let (backend, display) = setup();
        let surface = Surface::new(&display, ChromaType::Yuv420, 16, 16).unwrap();
        assert!(surface.query_status().unwrap().is_idle());

        backend.submit_render(surface.id());
        assert_eq!(surface.query_status().unwrap(), SurfaceStatus::RENDERING);

        surface.sync().unwrap();
        assert!(surface.query_status().unwrap().is_idle());
        assert!(!display.is_locked());
    }

    #[test]
    fn displaying_is_reported() {
        let (backend, display) = setup();
        let surface = Surface::new(&display, ChromaType::Yuv420, 16, 16).unwrap();
        backend.set_displaying(surface.id(), true);
        assert!(surface.query_status().unwrap().contains(SurfaceStatus::DISPLAYING));
    }

    #[test]
    fn query_failure_is_distinct_from_idle() {
        let (backend, display) = setup();
        let surface = Surface::new(&display, ChromaType::Yuv420, 16, 16).unwrap();
        backend.fail_next(Operation::QuerySurfaceStatus);
        assert!(matches!(surface.query_status(), Err(SurfaceError::Backend(_))));
    }

    #[test]
    fn sync_failure_is_reported() {
        let (backend, display) = setup();
        let surface = Surface::new(&display, ChromaType::Yuv420, 16, 16).unwrap();
        backend.fail_next(Operation::SyncSurface);
        assert!(surface.sync().is_err());
        assert!(surface.sync().is_ok());
    }
}
