//! In-memory VA backend.
//!
//! [`SoftwareBackend`] emulates the surface, image and subpicture entry
//! points of a VA driver without any hardware. Pixel storage is plain
//! `Vec<u8>` in the default layout of each format; derived images alias the
//! storage of their surface.
//!
//! Every call is appended to a call log before it runs, so callers can assert
//! on the exact sequence of backend operations. Failures can be injected per
//! operation, one-shot or persistent.
//!
//! # Limitations
//!
//! - get/put transfers are full-frame only and require matching fourccs.
//! - YUV 4:1:1 and RGB16 surfaces are refused, as several real drivers do.

use std::collections::HashMap;

use parking_lot::Mutex;
use tracing::trace;
use vs_common::{Rectangle, VideoFormat, VideoInfo};

use crate::backend::{
    ExternalBufferDescriptor, ImageDescriptor, ImageFormat, SurfaceAttrib, SurfaceRequest,
    VaBackend, VaId, INVALID_ID,
};
use crate::error::VaError;
use crate::ffi::{self, VAStatus};
use crate::format;

// ---------------------------------------------------------------------------
// Call log and failure injection
// ---------------------------------------------------------------------------

/// Backend operations that can be made to fail.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateSurface,
    DestroySurface,
    DeriveImage,
    CreateImage,
    DestroyImage,
    UploadImage,
    GetImage,
    PutImage,
    CreateSubpicture,
    DestroySubpicture,
    SetGlobalAlpha,
    AssociateSubpicture,
    DeassociateSubpicture,
    SyncSurface,
    QuerySurfaceStatus,
}

/// One recorded backend call, with its arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCall {
    CreateSurface {
        rt_format: u32,
        width: u32,
        height: u32,
        attribs: Vec<SurfaceAttrib>,
    },
    DestroySurface {
        surface: VaId,
    },
    DeriveImage {
        surface: VaId,
    },
    CreateImage {
        fourcc: u32,
        width: u32,
        height: u32,
    },
    DestroyImage {
        image: VaId,
    },
    UploadImage {
        image: VaId,
        len: usize,
    },
    GetImage {
        surface: VaId,
        region: Rectangle,
        image: VaId,
    },
    PutImage {
        surface: VaId,
        image: VaId,
        src: Rectangle,
        dst: Rectangle,
    },
    CreateSubpicture {
        image: VaId,
    },
    DestroySubpicture {
        subpicture: VaId,
    },
    /// Alpha in thousandths, so the log stays `Eq`.
    SetGlobalAlpha {
        subpicture: VaId,
        alpha_milli: u32,
    },
    AssociateSubpicture {
        subpicture: VaId,
        surface: VaId,
        src: Rectangle,
        dst: Rectangle,
        flags: u32,
    },
    DeassociateSubpicture {
        subpicture: VaId,
        surface: VaId,
    },
    SyncSurface {
        surface: VaId,
    },
    QuerySurfaceStatus {
        surface: VaId,
    },
}

impl BackendCall {
    pub fn operation(&self) -> Operation {
        match self {
            Self::CreateSurface { .. } => Operation::CreateSurface,
            Self::DestroySurface { .. } => Operation::DestroySurface,
            Self::DeriveImage { .. } => Operation::DeriveImage,
            Self::CreateImage { .. } => Operation::CreateImage,
            Self::DestroyImage { .. } => Operation::DestroyImage,
            Self::UploadImage { .. } => Operation::UploadImage,
            Self::GetImage { .. } => Operation::GetImage,
            Self::PutImage { .. } => Operation::PutImage,
            Self::CreateSubpicture { .. } => Operation::CreateSubpicture,
            Self::DestroySubpicture { .. } => Operation::DestroySubpicture,
            Self::SetGlobalAlpha { .. } => Operation::SetGlobalAlpha,
            Self::AssociateSubpicture { .. } => Operation::AssociateSubpicture,
            Self::DeassociateSubpicture { .. } => Operation::DeassociateSubpicture,
            Self::SyncSurface { .. } => Operation::SyncSurface,
            Self::QuerySurfaceStatus { .. } => Operation::QuerySurfaceStatus,
        }
    }
}

/// How a derived image record comes back broken, for exercising validation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeriveDefect {
    /// No image is created; the record carries no ids.
    MissingImage,
    /// An image is created but the record carries no buffer id.
    MissingBuffer,
}

/// A live subpicture binding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Association {
    pub subpicture: VaId,
    pub surface: VaId,
    pub src: Rectangle,
    pub dst: Rectangle,
    pub flags: u32,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

struct SurfaceState {
    fourcc: u32,
    width: u32,
    height: u32,
    data: Vec<u8>,
    pending_renders: u32,
    displaying: bool,
}

struct ImageState {
    desc: ImageDescriptor,
    /// Own storage, or `None` when the image aliases a surface.
    data: Option<Vec<u8>>,
    derived_from: Option<VaId>,
}

struct State {
    next_id: VaId,
    surfaces: HashMap<VaId, SurfaceState>,
    images: HashMap<VaId, ImageState>,
    subpictures: HashMap<VaId, VaId>,
    associations: Vec<Association>,
    calls: Vec<BackendCall>,
    fail_next: HashMap<Operation, VAStatus>,
    fail_always: HashMap<Operation, VAStatus>,
    derive_supported: bool,
    derive_defect: Option<DeriveDefect>,
    size_alignment: u32,
}

impl State {
    fn alloc_id(&mut self) -> VaId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Record the call, then apply any injected failure.
    fn enter(&mut self, call: BackendCall, name: &'static str) -> Result<(), VaError> {
        let op = call.operation();
        trace!(?call, "software backend call");
        self.calls.push(call);
        if let Some(status) = self.fail_next.remove(&op) {
            return Err(VaError::new(name, status));
        }
        if let Some(&status) = self.fail_always.get(&op) {
            return Err(VaError::new(name, status));
        }
        Ok(())
    }

    fn image_bytes(&self, image: VaId) -> Option<&[u8]> {
        let state = self.images.get(&image)?;
        match (&state.data, state.derived_from) {
            (Some(data), _) => Some(data),
            (None, Some(surface)) => self.surfaces.get(&surface).map(|s| s.data.as_slice()),
            (None, None) => None,
        }
    }

    fn image_bytes_mut(&mut self, image: VaId) -> Option<&mut Vec<u8>> {
        let state = self.images.get_mut(&image)?;
        match (&mut state.data, state.derived_from) {
            (Some(data), _) => Some(data),
            (None, Some(surface)) => self.surfaces.get_mut(&surface).map(|s| &mut s.data),
            (None, None) => None,
        }
    }
}

fn err(name: &'static str, status: VAStatus) -> VaError {
    VaError::new(name, status)
}

/// Fourcc a surface holds when allocated without a pixel format attribute.
fn default_fourcc(rt_format: u32) -> Option<u32> {
    let fourcc = match rt_format {
        ffi::VA_RT_FORMAT_YUV420 => ffi::VA_FOURCC_NV12,
        ffi::VA_RT_FORMAT_YUV422 => ffi::VA_FOURCC_YUY2,
        ffi::VA_RT_FORMAT_YUV444 => ffi::VA_FOURCC_444P,
        ffi::VA_RT_FORMAT_YUV400 => ffi::VA_FOURCC_Y800,
        ffi::VA_RT_FORMAT_YUV420_10 => ffi::VA_FOURCC_P010,
        ffi::VA_RT_FORMAT_RGB32 => ffi::VA_FOURCC_BGRA,
        _ => return None,
    };
    Some(fourcc)
}

fn layout(fourcc: u32, width: u32, height: u32) -> Option<(VideoFormat, VideoInfo)> {
    let video = format::va_to_video_format(&ImageFormat::yuv(fourcc, 0))?;
    Some((video, VideoInfo::new(video, width, height)?))
}

fn align_up(v: u32, align: u32) -> u32 {
    v.div_ceil(align) * align
}

fn descriptor_for(
    id: VaId,
    buf: VaId,
    fourcc: u32,
    width: u32,
    height: u32,
) -> Option<ImageDescriptor> {
    let (video, info) = layout(fourcc, width, height)?;
    let format = format::video_format_to_va(video)?;
    let mut pitches = [0u32; 3];
    let mut offsets = [0u32; 3];
    pitches.copy_from_slice(&info.strides[..3]);
    offsets.copy_from_slice(&info.offsets[..3]);
    Some(ImageDescriptor {
        id,
        buf,
        format,
        width,
        height,
        data_size: info.size as u32,
        num_planes: info.n_planes,
        pitches,
        offsets,
    })
}

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// In-memory VA backend with a call log and failure injection.
pub struct SoftwareBackend {
    state: Mutex<State>,
}

impl Default for SoftwareBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                surfaces: HashMap::new(),
                images: HashMap::new(),
                subpictures: HashMap::new(),
                associations: Vec::new(),
                calls: Vec::new(),
                fail_next: HashMap::new(),
                fail_always: HashMap::new(),
                derive_supported: true,
                derive_defect: None,
                size_alignment: 1,
            }),
        }
    }

    // -- Failure injection --

    /// Fail the next call of `op` with `VA_STATUS_ERROR_OPERATION_FAILED`.
    pub fn fail_next(&self, op: Operation) {
        self.fail_next_with(op, ffi::VA_STATUS_ERROR_OPERATION_FAILED);
    }

    pub fn fail_next_with(&self, op: Operation, status: VAStatus) {
        self.state.lock().fail_next.insert(op, status);
    }

    /// Fail every call of `op` until [`clear_failures`](Self::clear_failures).
    pub fn fail_always(&self, op: Operation) {
        self.state
            .lock()
            .fail_always
            .insert(op, ffi::VA_STATUS_ERROR_OPERATION_FAILED);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.lock();
        state.fail_next.clear();
        state.fail_always.clear();
    }

    // -- Behavior toggles --

    /// Whether `derive_image` succeeds at all (some drivers cannot derive).
    pub fn set_derive_supported(&self, supported: bool) {
        self.state.lock().derive_supported = supported;
    }

    pub fn set_derive_defect(&self, defect: Option<DeriveDefect>) {
        self.state.lock().derive_defect = defect;
    }

    /// Round granted surface dimensions up to a multiple of `alignment`,
    /// unless an external buffer descriptor fixes them.
    pub fn set_size_alignment(&self, alignment: u32) {
        self.state.lock().size_alignment = alignment.max(1);
    }

    // -- Inspection --

    pub fn calls(&self) -> Vec<BackendCall> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Number of recorded calls of `op`.
    pub fn count(&self, op: Operation) -> usize {
        self.state
            .lock()
            .calls
            .iter()
            .filter(|c| c.operation() == op)
            .count()
    }

    pub fn live_surfaces(&self) -> usize {
        self.state.lock().surfaces.len()
    }

    pub fn live_images(&self) -> usize {
        self.state.lock().images.len()
    }

    pub fn live_subpictures(&self) -> usize {
        self.state.lock().subpictures.len()
    }

    /// Bindings on `surface`, in association order.
    pub fn associations(&self, surface: VaId) -> Vec<Association> {
        self.state
            .lock()
            .associations
            .iter()
            .filter(|a| a.surface == surface)
            .copied()
            .collect()
    }

    pub fn image_data(&self, image: VaId) -> Option<Vec<u8>> {
        self.state.lock().image_bytes(image).map(<[u8]>::to_vec)
    }

    pub fn surface_data(&self, surface: VaId) -> Option<Vec<u8>> {
        self.state.lock().surfaces.get(&surface).map(|s| s.data.clone())
    }

    /// Fill surface storage, as a decoder would. Returns `false` for an
    /// unknown surface.
    pub fn fill_surface(&self, surface: VaId, value: u8) -> bool {
        match self.state.lock().surfaces.get_mut(&surface) {
            Some(s) => {
                s.data.fill(value);
                true
            }
            None => false,
        }
    }

    /// Queue a render on the surface; it completes on the next sync.
    pub fn submit_render(&self, surface: VaId) -> bool {
        match self.state.lock().surfaces.get_mut(&surface) {
            Some(s) => {
                s.pending_renders += 1;
                true
            }
            None => false,
        }
    }

    pub fn set_displaying(&self, surface: VaId, displaying: bool) -> bool {
        match self.state.lock().surfaces.get_mut(&surface) {
            Some(s) => {
                s.displaying = displaying;
                true
            }
            None => false,
        }
    }
}

impl VaBackend for SoftwareBackend {
    fn name(&self) -> &'static str {
        "software"
    }

    fn create_surface(&self, request: &mut SurfaceRequest) -> Result<VaId, VaError> {
        const OP: &str = "vaCreateSurfaces";
        let mut state = self.state.lock();
        state.enter(
            BackendCall::CreateSurface {
                rt_format: request.rt_format,
                width: request.width,
                height: request.height,
                attribs: request.attribs.clone(),
            },
            OP,
        )?;

        if request.width == 0 || request.height == 0 {
            return Err(err(OP, ffi::VA_STATUS_ERROR_INVALID_PARAMETER));
        }
        let default = default_fourcc(request.rt_format)
            .ok_or_else(|| err(OP, ffi::VA_STATUS_ERROR_UNSUPPORTED_RT_FORMAT))?;

        let fourcc = match request.pixel_format() {
            Some(fourcc) => {
                let video = format::va_to_video_format(&ImageFormat::yuv(fourcc, 0))
                    .ok_or_else(|| err(OP, ffi::VA_STATUS_ERROR_ATTR_NOT_SUPPORTED))?;
                let rt = video.chroma_type().and_then(format::chroma_type_to_va);
                if rt != Some(request.rt_format) {
                    return Err(err(OP, ffi::VA_STATUS_ERROR_UNSUPPORTED_RT_FORMAT));
                }
                fourcc
            }
            None => default,
        };

        match request.memory_type() {
            None
            | Some(ffi::VA_SURFACE_ATTRIB_MEM_TYPE_VA)
            | Some(ffi::VA_SURFACE_ATTRIB_MEM_TYPE_DRM_PRIME)
            | Some(ffi::VA_SURFACE_ATTRIB_MEM_TYPE_KERNEL_DRM) => {}
            Some(_) => return Err(err(OP, ffi::VA_STATUS_ERROR_UNSUPPORTED_MEMORY_TYPE)),
        }

        let alignment = state.size_alignment;
        let (width, height, data_size) = match request.external_buffers() {
            Some(ExternalBufferDescriptor {
                width,
                height,
                data_size,
                ..
            }) if *width != 0 && *height != 0 => (*width, *height, *data_size as usize),
            _ => (
                align_up(request.width, alignment),
                align_up(request.height, alignment),
                0,
            ),
        };

        let layout_size = layout(fourcc, width, height).map_or(0, |(_, info)| info.size);
        let data = vec![0u8; layout_size.max(data_size)];

        request.width = width;
        request.height = height;
        if let Some(desc) = request.external_buffers_mut() {
            desc.width = width;
            desc.height = height;
        }

        let id = state.alloc_id();
        state.surfaces.insert(
            id,
            SurfaceState {
                fourcc,
                width,
                height,
                data,
                pending_renders: 0,
                displaying: false,
            },
        );
        Ok(id)
    }

    fn destroy_surface(&self, surface: VaId) -> Result<(), VaError> {
        const OP: &str = "vaDestroySurfaces";
        let mut state = self.state.lock();
        state.enter(BackendCall::DestroySurface { surface }, OP)?;
        state
            .surfaces
            .remove(&surface)
            .ok_or_else(|| err(OP, ffi::VA_STATUS_ERROR_INVALID_SURFACE))?;
        state.associations.retain(|a| a.surface != surface);
        Ok(())
    }

    fn derive_image(&self, surface: VaId) -> Result<ImageDescriptor, VaError> {
        const OP: &str = "vaDeriveImage";
        let mut state = self.state.lock();
        state.enter(BackendCall::DeriveImage { surface }, OP)?;
        if !state.derive_supported {
            return Err(err(OP, ffi::VA_STATUS_ERROR_OPERATION_FAILED));
        }
        let (fourcc, width, height) = state
            .surfaces
            .get(&surface)
            .map(|s| (s.fourcc, s.width, s.height))
            .ok_or_else(|| err(OP, ffi::VA_STATUS_ERROR_INVALID_SURFACE))?;

        if state.derive_defect == Some(DeriveDefect::MissingImage) {
            return Ok(ImageDescriptor::default());
        }

        let id = state.alloc_id();
        let buf = state.alloc_id();
        let mut desc = descriptor_for(id, buf, fourcc, width, height)
            .ok_or_else(|| err(OP, ffi::VA_STATUS_ERROR_OPERATION_FAILED))?;
        if state.derive_defect == Some(DeriveDefect::MissingBuffer) {
            desc.buf = INVALID_ID;
        }
        state.images.insert(
            id,
            ImageState {
                desc,
                data: None,
                derived_from: Some(surface),
            },
        );
        Ok(desc)
    }

    fn create_image(
        &self,
        format: &ImageFormat,
        width: u32,
        height: u32,
    ) -> Result<ImageDescriptor, VaError> {
        const OP: &str = "vaCreateImage";
        let mut state = self.state.lock();
        state.enter(
            BackendCall::CreateImage {
                fourcc: format.fourcc,
                width,
                height,
            },
            OP,
        )?;
        if width == 0 || height == 0 {
            return Err(err(OP, ffi::VA_STATUS_ERROR_INVALID_PARAMETER));
        }
        let id = state.alloc_id();
        let buf = state.alloc_id();
        let desc = descriptor_for(id, buf, format.fourcc, width, height)
            .ok_or_else(|| err(OP, ffi::VA_STATUS_ERROR_INVALID_IMAGE_FORMAT))?;
        state.images.insert(
            id,
            ImageState {
                desc,
                data: Some(vec![0u8; desc.data_size as usize]),
                derived_from: None,
            },
        );
        Ok(desc)
    }

    fn destroy_image(&self, image: VaId) -> Result<(), VaError> {
        const OP: &str = "vaDestroyImage";
        let mut state = self.state.lock();
        state.enter(BackendCall::DestroyImage { image }, OP)?;
        if state.subpictures.values().any(|&img| img == image) {
            return Err(err(OP, ffi::VA_STATUS_ERROR_OPERATION_FAILED));
        }
        state
            .images
            .remove(&image)
            .map(|_| ())
            .ok_or_else(|| err(OP, ffi::VA_STATUS_ERROR_INVALID_IMAGE))
    }

    fn upload_image(&self, image: &ImageDescriptor, data: &[u8]) -> Result<(), VaError> {
        const OP: &str = "vaMapBuffer";
        let mut state = self.state.lock();
        state.enter(
            BackendCall::UploadImage {
                image: image.id,
                len: data.len(),
            },
            OP,
        )?;
        let dest = state
            .image_bytes_mut(image.id)
            .ok_or_else(|| err(OP, ffi::VA_STATUS_ERROR_INVALID_IMAGE))?;
        let n = data.len().min(dest.len());
        dest[..n].copy_from_slice(&data[..n]);
        Ok(())
    }

    fn get_image(&self, surface: VaId, region: Rectangle, image: VaId) -> Result<(), VaError> {
        const OP: &str = "vaGetImage";
        let mut state = self.state.lock();
        state.enter(
            BackendCall::GetImage {
                surface,
                region,
                image,
            },
            OP,
        )?;
        let src = state
            .surfaces
            .get(&surface)
            .ok_or_else(|| err(OP, ffi::VA_STATUS_ERROR_INVALID_SURFACE))?;
        let img = state
            .images
            .get(&image)
            .ok_or_else(|| err(OP, ffi::VA_STATUS_ERROR_INVALID_IMAGE))?;
        let full = Rectangle::new(0, 0, src.width, src.height);
        if region != full || img.desc.width != src.width || img.desc.height != src.height {
            return Err(err(OP, ffi::VA_STATUS_ERROR_INVALID_PARAMETER));
        }
        if img.desc.format.fourcc != src.fourcc {
            return Err(err(OP, ffi::VA_STATUS_ERROR_INVALID_IMAGE_FORMAT));
        }
        let pixels = src.data.clone();
        if let Some(dest) = state.image_bytes_mut(image) {
            let n = pixels.len().min(dest.len());
            dest[..n].copy_from_slice(&pixels[..n]);
        }
        Ok(())
    }

    fn put_image(
        &self,
        surface: VaId,
        image: VaId,
        src: Rectangle,
        dst: Rectangle,
    ) -> Result<(), VaError> {
        const OP: &str = "vaPutImage";
        let mut state = self.state.lock();
        state.enter(
            BackendCall::PutImage {
                surface,
                image,
                src,
                dst,
            },
            OP,
        )?;
        let (width, height, fourcc) = state
            .surfaces
            .get(&surface)
            .map(|s| (s.width, s.height, s.fourcc))
            .ok_or_else(|| err(OP, ffi::VA_STATUS_ERROR_INVALID_SURFACE))?;
        let img = state
            .images
            .get(&image)
            .map(|i| i.desc)
            .ok_or_else(|| err(OP, ffi::VA_STATUS_ERROR_INVALID_IMAGE))?;
        if src != Rectangle::new(0, 0, img.width, img.height)
            || dst != Rectangle::new(0, 0, width, height)
            || src.size() != dst.size()
        {
            return Err(err(OP, ffi::VA_STATUS_ERROR_INVALID_PARAMETER));
        }
        if img.format.fourcc != fourcc {
            return Err(err(OP, ffi::VA_STATUS_ERROR_INVALID_IMAGE_FORMAT));
        }
        let pixels = state.image_bytes(image).map(<[u8]>::to_vec).unwrap_or_default();
        if let Some(target) = state.surfaces.get_mut(&surface) {
            let n = pixels.len().min(target.data.len());
            target.data[..n].copy_from_slice(&pixels[..n]);
        }
        Ok(())
    }

    fn create_subpicture(&self, image: VaId) -> Result<VaId, VaError> {
        const OP: &str = "vaCreateSubpicture";
        let mut state = self.state.lock();
        state.enter(BackendCall::CreateSubpicture { image }, OP)?;
        if !state.images.contains_key(&image) {
            return Err(err(OP, ffi::VA_STATUS_ERROR_INVALID_IMAGE));
        }
        let id = state.alloc_id();
        state.subpictures.insert(id, image);
        Ok(id)
    }

    fn destroy_subpicture(&self, subpicture: VaId) -> Result<(), VaError> {
        const OP: &str = "vaDestroySubpicture";
        let mut state = self.state.lock();
        state.enter(BackendCall::DestroySubpicture { subpicture }, OP)?;
        state
            .subpictures
            .remove(&subpicture)
            .ok_or_else(|| err(OP, ffi::VA_STATUS_ERROR_INVALID_SUBPICTURE))?;
        state.associations.retain(|a| a.subpicture != subpicture);
        Ok(())
    }

    fn set_subpicture_global_alpha(&self, subpicture: VaId, alpha: f32) -> Result<(), VaError> {
        const OP: &str = "vaSetSubpictureGlobalAlpha";
        let mut state = self.state.lock();
        state.enter(
            BackendCall::SetGlobalAlpha {
                subpicture,
                alpha_milli: (alpha.clamp(0.0, 1.0) * 1000.0).round() as u32,
            },
            OP,
        )?;
        if !state.subpictures.contains_key(&subpicture) {
            return Err(err(OP, ffi::VA_STATUS_ERROR_INVALID_SUBPICTURE));
        }
        Ok(())
    }

    fn associate_subpicture(
        &self,
        subpicture: VaId,
        surface: VaId,
        src: Rectangle,
        dst: Rectangle,
        flags: u32,
    ) -> Result<(), VaError> {
        const OP: &str = "vaAssociateSubpicture";
        let mut state = self.state.lock();
        state.enter(
            BackendCall::AssociateSubpicture {
                subpicture,
                surface,
                src,
                dst,
                flags,
            },
            OP,
        )?;
        if !state.subpictures.contains_key(&subpicture) {
            return Err(err(OP, ffi::VA_STATUS_ERROR_INVALID_SUBPICTURE));
        }
        if !state.surfaces.contains_key(&surface) {
            return Err(err(OP, ffi::VA_STATUS_ERROR_INVALID_SURFACE));
        }
        let binding = Association {
            subpicture,
            surface,
            src,
            dst,
            flags,
        };
        match state
            .associations
            .iter_mut()
            .find(|a| a.subpicture == subpicture && a.surface == surface)
        {
            Some(existing) => *existing = binding,
            None => state.associations.push(binding),
        }
        Ok(())
    }

    fn deassociate_subpicture(&self, subpicture: VaId, surface: VaId) -> Result<(), VaError> {
        const OP: &str = "vaDeassociateSubpicture";
        let mut state = self.state.lock();
        state.enter(
            BackendCall::DeassociateSubpicture {
                subpicture,
                surface,
            },
            OP,
        )?;
        if !state.subpictures.contains_key(&subpicture) {
            return Err(err(OP, ffi::VA_STATUS_ERROR_INVALID_SUBPICTURE));
        }
        state
            .associations
            .retain(|a| !(a.subpicture == subpicture && a.surface == surface));
        Ok(())
    }

    fn sync_surface(&self, surface: VaId) -> Result<(), VaError> {
        const OP: &str = "vaSyncSurface";
        let mut state = self.state.lock();
        state.enter(BackendCall::SyncSurface { surface }, OP)?;
        let s = state
            .surfaces
            .get_mut(&surface)
            .ok_or_else(|| err(OP, ffi::VA_STATUS_ERROR_INVALID_SURFACE))?;
        s.pending_renders = 0;
        Ok(())
    }

    fn query_surface_status(&self, surface: VaId) -> Result<u32, VaError> {
        const OP: &str = "vaQuerySurfaceStatus";
        let mut state = self.state.lock();
        state.enter(BackendCall::QuerySurfaceStatus { surface }, OP)?;
        let s = state
            .surfaces
            .get(&surface)
            .ok_or_else(|| err(OP, ffi::VA_STATUS_ERROR_INVALID_SURFACE))?;
        let mut bits = 0;
        if s.pending_renders > 0 {
            bits |= ffi::VASurfaceRendering;
        }
        if s.displaying {
            bits |= ffi::VASurfaceDisplaying;
        }
        if bits == 0 {
            bits = ffi::VASurfaceReady;
        }
        Ok(bits)
    }
}

impl std::fmt::Debug for SoftwareBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("SoftwareBackend")
            .field("surfaces", &state.surfaces.len())
            .field("images", &state.images.len())
            .field("subpictures", &state.subpictures.len())
            .field("calls", &state.calls.len())
            .finish()
    }
}
