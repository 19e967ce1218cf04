//! Surface creation strategies.
//!
//! Every strategy negotiates formats first, issues exactly one backend
//! allocation under the display lock, and commits metadata only when that
//! call succeeds. Committed dimensions are the ones the backend granted.

use std::sync::{Arc, OnceLock};

use bitflags::bitflags;
use tracing::{debug, error};
use vs_common::{ChromaType, VideoFormat, VideoInfo};

use super::overlay::OverlaySet;
use super::Surface;
use crate::backend::{ExternalBufferDescriptor, SurfaceAttrib, SurfaceRequest, VaId, INVALID_ID};
use crate::buffer_proxy::BufferProxy;
use crate::display::Display;
use crate::error::{SurfaceError, SurfaceResult};
use crate::ffi;
use crate::format;

bitflags! {
    /// Layout constraints for explicit-format allocation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AllocFlags: u32 {
        /// Untiled storage. The driver places planes where the
        /// descriptor says instead of choosing a tiled layout.
        const LINEAR_STORAGE = 1;
        /// Plane strides must match the requested layout.
        const FIXED_STRIDES = 2;
        /// Plane offsets must match the requested layout.
        const FIXED_OFFSETS = 4;
    }
}

impl Surface {
    /// A surface with no backend allocation yet.
    fn empty(display: &Display) -> Self {
        Self {
            display: display.clone(),
            id: INVALID_ID,
            format: OnceLock::new(),
            chroma_type: ChromaType::Yuv420,
            width: 0,
            height: 0,
            extbuf_proxy: None,
            parent_context: None,
            overlays: OverlaySet::default(),
        }
    }

    /// Allocate a surface of `chroma_type`; the driver picks the format.
    pub fn new(
        display: &Display,
        chroma_type: ChromaType,
        width: u32,
        height: u32,
    ) -> SurfaceResult<Self> {
        let mut surface = Self::empty(display);
        surface.create(chroma_type, width, height)?;
        Ok(surface)
    }

    /// Allocate a surface holding `info.format`, optionally pinning its layout.
    pub fn new_full(display: &Display, info: &VideoInfo, flags: AllocFlags) -> SurfaceResult<Self> {
        let mut surface = Self::empty(display);
        surface.create_full(info, flags)?;
        Ok(surface)
    }

    /// Allocate a surface holding `format` with the driver's default layout.
    pub fn new_with_format(
        display: &Display,
        format: VideoFormat,
        width: u32,
        height: u32,
    ) -> SurfaceResult<Self> {
        let info = VideoInfo::new(format, width, height).ok_or(SurfaceError::LayoutOverflow {
            format,
            width,
            height,
        })?;
        Self::new_full(display, &info, AllocFlags::empty())
    }

    /// Wrap external buffer memory laid out as `info`.
    ///
    /// The surface takes its reference to `proxy` before anything is
    /// validated; on failure it is released together with the half-built
    /// surface.
    pub fn new_from_buffer_proxy(
        display: &Display,
        proxy: Arc<BufferProxy>,
        info: &VideoInfo,
    ) -> SurfaceResult<Self> {
        let mut surface = Self::empty(display);
        surface.create_from_buffer_proxy(proxy, info)?;
        Ok(surface)
    }

    fn create(&mut self, chroma_type: ChromaType, width: u32, height: u32) -> SurfaceResult<()> {
        let rt_format = format::negotiate_chroma(chroma_type)?;
        let mut request = SurfaceRequest::new(rt_format, width, height);
        let id = self.allocate(&mut request)?;
        self.commit(id, None, chroma_type, &request);
        Ok(())
    }

    fn create_full(&mut self, info: &VideoInfo, flags: AllocFlags) -> SurfaceResult<()> {
        let negotiated = format::negotiate_format(info.format)?;
        let fourcc = negotiated.image_format.fourcc;

        let mut request = SurfaceRequest::new(negotiated.rt_format, info.width, info.height)
            .with_attrib(SurfaceAttrib::PixelFormat(fourcc));

        if !flags.is_empty() {
            // Pins layout only; the driver still allocates the memory.
            let planes = (info.n_planes as usize).min(4);
            let mut extbuf = ExternalBufferDescriptor {
                pixel_format: fourcc,
                width: info.width,
                height: info.height,
                num_planes: info.n_planes,
                flags: 0,
                ..Default::default()
            };
            if flags.contains(AllocFlags::FIXED_STRIDES) {
                extbuf.pitches[..planes].copy_from_slice(&info.strides[..planes]);
            }
            if flags.contains(AllocFlags::FIXED_OFFSETS) {
                extbuf.offsets[..planes].copy_from_slice(&info.offsets[..planes]);
            }
            request = request
                .with_attrib(SurfaceAttrib::MemoryType(ffi::VA_SURFACE_ATTRIB_MEM_TYPE_VA))
                .with_attrib(SurfaceAttrib::ExternalBuffers(extbuf));
        }

        let id = self.allocate(&mut request)?;
        self.commit(id, Some(info.format), negotiated.chroma, &request);
        Ok(())
    }

    fn create_from_buffer_proxy(
        &mut self,
        proxy: Arc<BufferProxy>,
        info: &VideoInfo,
    ) -> SurfaceResult<()> {
        let handle = proxy.handle();
        let data_size = proxy.size();
        let memory_type = format::buffer_memory_type_to_va(proxy.memory_type());
        self.extbuf_proxy = Some(proxy);

        let negotiated = format::negotiate_format(info.format)?;
        let data_size =
            u32::try_from(data_size).map_err(|_| SurfaceError::BufferTooLarge { size: data_size })?;

        let planes = (info.n_planes as usize).min(4);
        let mut extbuf = ExternalBufferDescriptor {
            pixel_format: negotiated.image_format.fourcc,
            width: info.width,
            height: info.height,
            data_size,
            num_planes: info.n_planes,
            buffers: vec![handle],
            flags: 0,
            ..Default::default()
        };
        extbuf.pitches[..planes].copy_from_slice(&info.strides[..planes]);
        extbuf.offsets[..planes].copy_from_slice(&info.offsets[..planes]);

        let mut request = SurfaceRequest::new(negotiated.rt_format, info.width, info.height)
            .with_attrib(SurfaceAttrib::ExternalBuffers(extbuf))
            .with_attrib(SurfaceAttrib::MemoryType(memory_type));

        let id = self.allocate(&mut request)?;
        self.commit(id, Some(info.format), negotiated.chroma, &request);
        Ok(())
    }

    /// The single backend allocation call of every strategy.
    fn allocate(&self, request: &mut SurfaceRequest) -> SurfaceResult<VaId> {
        let result = {
            let va = self.display.lock();
            va.create_surface(request)
        };
        result.map_err(|e| {
            error!(
                width = request.width,
                height = request.height,
                error = %e,
                "Surface allocation failed"
            );
            e.into()
        })
    }

    fn commit(
        &mut self,
        id: VaId,
        format: Option<VideoFormat>,
        chroma_type: ChromaType,
        request: &SurfaceRequest,
    ) {
        if let Some(format) = format {
            // Only reachable on a fresh surface, so the cell is empty.
            let _ = self.format.set(format);
        }
        self.chroma_type = chroma_type;
        self.width = request.width;
        self.height = request.height;
        self.id = id;
        debug!(
            surface = id,
            chroma = %chroma_type,
            width = self.width,
            height = self.height,
            "Created surface"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer_proxy::BufferMemoryType;
    use crate::software::{BackendCall, Operation, SoftwareBackend};
    use vs_common::Resolution;

    fn setup() -> (Arc<SoftwareBackend>, Display) {
        let backend = Arc::new(SoftwareBackend::new());
        let display = Display::new(backend.clone());
        (backend, display)
    }

    fn last_create(backend: &SoftwareBackend) -> Option<BackendCall> {
        backend
            .calls()
            .into_iter()
            .rev()
            .find(|c| c.operation() == Operation::CreateSurface)
    }

    // ── Implicit format ──

    #[test]
    fn implicit_format_has_no_attribs() {
        let (backend, display) = setup();
        let surface = Surface::new(&display, ChromaType::Yuv422, 48, 32).unwrap();
        assert_eq!(surface.chroma_type(), ChromaType::Yuv422);
        assert_eq!(surface.size(), Resolution::new(48, 32));
        assert_eq!(
            last_create(&backend),
            Some(BackendCall::CreateSurface {
                rt_format: ffi::VA_RT_FORMAT_YUV422,
                width: 48,
                height: 32,
                attribs: vec![],
            })
        );
    }

    #[test]
    fn unsupported_chroma_makes_no_backend_call() {
        let (backend, display) = setup();
        let err = Surface::new(&display, ChromaType::Yuv410, 64, 64).unwrap_err();
        assert!(matches!(err, SurfaceError::UnsupportedChromaType(ChromaType::Yuv410)));
        assert!(backend.calls().is_empty());
        assert_eq!(backend.live_surfaces(), 0);
    }

    #[test]
    fn backend_failure_is_wrapped() {
        let (backend, display) = setup();
        backend.fail_next_with(Operation::CreateSurface, ffi::VA_STATUS_ERROR_ALLOCATION_FAILED);
        let err = Surface::new(&display, ChromaType::Yuv420, 64, 64).unwrap_err();
        assert_eq!(err.va_kind(), Some(crate::error::VaErrorKind::AllocationFailed));
        assert_eq!(backend.live_surfaces(), 0);
        assert_eq!(backend.count(Operation::DestroySurface), 0);
    }

    #[test]
    fn granted_dimensions_are_committed() {
        let (backend, display) = setup();
        backend.set_size_alignment(16);
        let surface = Surface::new(&display, ChromaType::Yuv420, 100, 50).unwrap();
        assert_eq!(surface.size(), Resolution::new(112, 64));
    }

    // ── Explicit format ──

    #[test]
    fn explicit_format_without_flags() {
        let (backend, display) = setup();
        let surface = Surface::new_with_format(&display, VideoFormat::Bgra, 40, 30).unwrap();
        assert_eq!(surface.format(), VideoFormat::Bgra);
        assert_eq!(surface.chroma_type(), ChromaType::Rgb32);
        assert_eq!(
            last_create(&backend),
            Some(BackendCall::CreateSurface {
                rt_format: ffi::VA_RT_FORMAT_RGB32,
                width: 40,
                height: 30,
                attribs: vec![SurfaceAttrib::PixelFormat(ffi::VA_FOURCC_BGRA)],
            })
        );
        // Format was committed, not derived.
        assert_eq!(backend.count(Operation::DeriveImage), 0);
    }

    #[test]
    fn fixed_layout_pins_strides_and_offsets() {
        let (backend, display) = setup();
        let info = VideoInfo::new(VideoFormat::Nv12, 64, 64)
            .unwrap()
            .with_plane(0, 128, 0)
            .with_plane(1, 128, 128 * 64);
        let _surface = Surface::new_full(
            &display,
            &info,
            AllocFlags::FIXED_STRIDES | AllocFlags::FIXED_OFFSETS | AllocFlags::LINEAR_STORAGE,
        )
        .unwrap();

        let Some(BackendCall::CreateSurface { attribs, .. }) = last_create(&backend) else {
            panic!("no allocation recorded");
        };
        assert_eq!(attribs[0], SurfaceAttrib::PixelFormat(ffi::VA_FOURCC_NV12));
        assert_eq!(attribs[1], SurfaceAttrib::MemoryType(ffi::VA_SURFACE_ATTRIB_MEM_TYPE_VA));
        let SurfaceAttrib::ExternalBuffers(desc) = &attribs[2] else {
            panic!("missing external buffer descriptor");
        };
        assert_eq!(desc.num_planes, 2);
        assert_eq!(&desc.pitches[..2], &[128, 128]);
        assert_eq!(&desc.offsets[..2], &[0, 128 * 64]);
        assert_eq!(desc.flags, 0);
        assert!(desc.buffers.is_empty());
    }

    #[test]
    fn strides_only_leaves_offsets_unpinned() {
        let (backend, display) = setup();
        let info = VideoInfo::new(VideoFormat::Nv12, 64, 64).unwrap();
        let _surface = Surface::new_full(&display, &info, AllocFlags::FIXED_STRIDES).unwrap();
        let Some(BackendCall::CreateSurface { attribs, .. }) = last_create(&backend) else {
            panic!("no allocation recorded");
        };
        let SurfaceAttrib::ExternalBuffers(desc) = &attribs[2] else {
            panic!("missing external buffer descriptor");
        };
        assert_eq!(&desc.pitches[..2], &[64, 64]);
        assert_eq!(desc.offsets, [0; 4]);
        // Tiling would let the driver realign the pinned pitches.
        assert_eq!(desc.flags, 0);
    }

    #[test]
    fn pinned_layout_never_requests_tiling() {
        let (backend, display) = setup();
        let info = VideoInfo::new(VideoFormat::Nv12, 64, 64).unwrap();
        for flags in [
            AllocFlags::FIXED_STRIDES,
            AllocFlags::FIXED_OFFSETS,
            AllocFlags::FIXED_STRIDES | AllocFlags::FIXED_OFFSETS,
            AllocFlags::LINEAR_STORAGE,
        ] {
            let _surface = Surface::new_full(&display, &info, flags).unwrap();
            let Some(BackendCall::CreateSurface { attribs, .. }) = last_create(&backend) else {
                panic!("no allocation recorded");
            };
            let SurfaceAttrib::ExternalBuffers(desc) = &attribs[2] else {
                panic!("missing external buffer descriptor");
            };
            assert_eq!(desc.flags, 0, "{flags:?}");
        }
    }

    #[test]
    fn oversized_layout_makes_no_backend_call() {
        let (backend, display) = setup();
        let err = Surface::new_with_format(&display, VideoFormat::Y444, 50000, 50000).unwrap_err();
        assert!(matches!(
            err,
            SurfaceError::LayoutOverflow { format: VideoFormat::Y444, width: 50000, height: 50000 }
        ));
        assert!(backend.calls().is_empty());
        assert_eq!(backend.live_surfaces(), 0);
    }

    #[test]
    fn unsupported_format_makes_no_backend_call() {
        let (backend, display) = setup();
        let err = Surface::new_with_format(&display, VideoFormat::Encoded, 64, 64).unwrap_err();
        assert!(matches!(err, SurfaceError::UnsupportedFormat(VideoFormat::Encoded)));
        assert!(backend.calls().is_empty());
    }

    // ── External buffer ──

    #[test]
    fn buffer_proxy_descriptor() {
        let (backend, display) = setup();
        let info = VideoInfo::new(VideoFormat::Nv12, 64, 32).unwrap();
        let proxy = BufferProxy::new(17, info.size, BufferMemoryType::DmaBuf);
        let surface = Surface::new_from_buffer_proxy(&display, proxy.clone(), &info).unwrap();
        assert_eq!(Arc::strong_count(&proxy), 2);
        assert_eq!(surface.format(), VideoFormat::Nv12);
        assert_eq!(surface.size(), Resolution::new(64, 32));

        let Some(BackendCall::CreateSurface { attribs, .. }) = last_create(&backend) else {
            panic!("no allocation recorded");
        };
        let SurfaceAttrib::ExternalBuffers(desc) = &attribs[0] else {
            panic!("missing external buffer descriptor");
        };
        assert_eq!(desc.buffers, vec![17]);
        assert_eq!(desc.data_size as usize, info.size);
        assert_eq!(&desc.pitches[..2], &[64, 64]);
        assert_eq!(desc.offsets[1], 64 * 32);
        assert_eq!(
            attribs[1],
            SurfaceAttrib::MemoryType(ffi::VA_SURFACE_ATTRIB_MEM_TYPE_DRM_PRIME)
        );

        drop(surface);
        assert_eq!(Arc::strong_count(&proxy), 1);
    }

    #[test]
    fn buffer_proxy_reference_released_on_failure() {
        let (backend, display) = setup();
        let proxy = BufferProxy::new(3, 1024, BufferMemoryType::GemBuf);

        let info = VideoInfo::new(VideoFormat::Encoded, 16, 16).unwrap();
        assert!(Surface::new_from_buffer_proxy(&display, proxy.clone(), &info).is_err());
        assert_eq!(Arc::strong_count(&proxy), 1);

        backend.fail_next(Operation::CreateSurface);
        let info = VideoInfo::new(VideoFormat::Nv12, 16, 16).unwrap();
        assert!(Surface::new_from_buffer_proxy(&display, proxy.clone(), &info).is_err());
        assert_eq!(Arc::strong_count(&proxy), 1);
        assert_eq!(backend.count(Operation::DestroySurface), 0);
    }

    #[test]
    fn oversized_buffer_proxy_is_rejected() {
        let (backend, display) = setup();
        let size = u32::MAX as usize + 1;
        let proxy = BufferProxy::new(9, size, BufferMemoryType::DmaBuf);
        let info = VideoInfo::new(VideoFormat::Nv12, 64, 64).unwrap();

        let err = Surface::new_from_buffer_proxy(&display, proxy.clone(), &info).unwrap_err();
        assert!(matches!(err, SurfaceError::BufferTooLarge { size: s } if s == size));
        assert_eq!(backend.count(Operation::CreateSurface), 0);
        assert_eq!(Arc::strong_count(&proxy), 1);
    }
}
