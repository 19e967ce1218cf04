//! Backend abstraction: the VA entry points a surface needs, in Rust types.
//!
//! [`NativeBackend`](crate::native::NativeBackend) forwards to libva;
//! [`SoftwareBackend`](crate::software::SoftwareBackend) emulates it in memory.
//! Implementations are never called concurrently for one display: every call
//! is made while holding the display lock (see [`crate::display`]).

use vs_common::Rectangle;

use crate::error::VaError;
use crate::ffi;

/// Backend object id (surface, image, buffer, subpicture).
pub type VaId = u32;

/// The "no object" sentinel.
pub const INVALID_ID: VaId = ffi::VA_INVALID_ID;

// ---------------------------------------------------------------------------
// Surface allocation request
// ---------------------------------------------------------------------------

/// Layout (and optionally memory) description handed to the driver with a
/// surface allocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExternalBufferDescriptor {
    pub pixel_format: u32,
    pub width: u32,
    pub height: u32,
    pub data_size: u32,
    pub num_planes: u32,
    pub pitches: [u32; 4],
    pub offsets: [u32; 4],
    /// Backing buffer handles. Empty when the descriptor only pins layout.
    pub buffers: Vec<usize>,
    /// `VA_SURFACE_EXTBUF_DESC_*` flags.
    pub flags: u32,
}

/// One surface attribute in an allocation request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SurfaceAttrib {
    /// Backend fourcc.
    PixelFormat(u32),
    /// `VA_SURFACE_ATTRIB_MEM_TYPE_*`.
    MemoryType(u32),
    ExternalBuffers(ExternalBufferDescriptor),
}

/// A surface allocation request.
///
/// The backend writes back the dimensions it actually granted into `width`
/// and `height` (and into any external buffer descriptor).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SurfaceRequest {
    pub rt_format: u32,
    pub width: u32,
    pub height: u32,
    pub attribs: Vec<SurfaceAttrib>,
}

impl SurfaceRequest {
    pub fn new(rt_format: u32, width: u32, height: u32) -> Self {
        Self {
            rt_format,
            width,
            height,
            attribs: Vec::new(),
        }
    }

    pub fn with_attrib(mut self, attrib: SurfaceAttrib) -> Self {
        self.attribs.push(attrib);
        self
    }

    /// Requested pixel format attribute, if any.
    pub fn pixel_format(&self) -> Option<u32> {
        self.attribs.iter().find_map(|a| match a {
            SurfaceAttrib::PixelFormat(fourcc) => Some(*fourcc),
            _ => None,
        })
    }

    /// Requested memory type attribute, if any.
    pub fn memory_type(&self) -> Option<u32> {
        self.attribs.iter().find_map(|a| match a {
            SurfaceAttrib::MemoryType(mem) => Some(*mem),
            _ => None,
        })
    }

    pub fn external_buffers(&self) -> Option<&ExternalBufferDescriptor> {
        self.attribs.iter().find_map(|a| match a {
            SurfaceAttrib::ExternalBuffers(desc) => Some(desc),
            _ => None,
        })
    }

    pub fn external_buffers_mut(&mut self) -> Option<&mut ExternalBufferDescriptor> {
        self.attribs.iter_mut().find_map(|a| match a {
            SurfaceAttrib::ExternalBuffers(desc) => Some(desc),
            _ => None,
        })
    }
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Backend image format record.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ImageFormat {
    pub fourcc: u32,
    pub byte_order: u32,
    pub bits_per_pixel: u32,
    pub depth: u32,
    pub red_mask: u32,
    pub green_mask: u32,
    pub blue_mask: u32,
    pub alpha_mask: u32,
}

impl ImageFormat {
    /// YUV format record (no depth or masks).
    pub const fn yuv(fourcc: u32, bits_per_pixel: u32) -> Self {
        Self {
            fourcc,
            byte_order: ffi::VA_LSB_FIRST,
            bits_per_pixel,
            depth: 0,
            red_mask: 0,
            green_mask: 0,
            blue_mask: 0,
            alpha_mask: 0,
        }
    }

    /// 32-bit RGB format record.
    pub const fn rgb32(fourcc: u32, depth: u32, masks: [u32; 4]) -> Self {
        Self {
            fourcc,
            byte_order: ffi::VA_LSB_FIRST,
            bits_per_pixel: 32,
            depth,
            red_mask: masks[0],
            green_mask: masks[1],
            blue_mask: masks[2],
            alpha_mask: masks[3],
        }
    }
}

impl From<ffi::VAImageFormat> for ImageFormat {
    fn from(f: ffi::VAImageFormat) -> Self {
        Self {
            fourcc: f.fourcc,
            byte_order: f.byte_order,
            bits_per_pixel: f.bits_per_pixel,
            depth: f.depth,
            red_mask: f.red_mask,
            green_mask: f.green_mask,
            blue_mask: f.blue_mask,
            alpha_mask: f.alpha_mask,
        }
    }
}

impl From<ImageFormat> for ffi::VAImageFormat {
    fn from(f: ImageFormat) -> Self {
        Self {
            fourcc: f.fourcc,
            byte_order: f.byte_order,
            bits_per_pixel: f.bits_per_pixel,
            depth: f.depth,
            red_mask: f.red_mask,
            green_mask: f.green_mask,
            blue_mask: f.blue_mask,
            alpha_mask: f.alpha_mask,
            va_reserved: [0; 4],
        }
    }
}

/// Backend image record, as returned by derive/create.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ImageDescriptor {
    pub id: VaId,
    /// Data buffer backing the image.
    pub buf: VaId,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub data_size: u32,
    pub num_planes: u32,
    pub pitches: [u32; 3],
    pub offsets: [u32; 3],
}

impl Default for ImageDescriptor {
    fn default() -> Self {
        Self {
            id: INVALID_ID,
            buf: INVALID_ID,
            format: ImageFormat::default(),
            width: 0,
            height: 0,
            data_size: 0,
            num_planes: 0,
            pitches: [0; 3],
            offsets: [0; 3],
        }
    }
}

impl From<ffi::VAImage> for ImageDescriptor {
    fn from(image: ffi::VAImage) -> Self {
        Self {
            id: image.image_id,
            buf: image.buf,
            format: image.format.into(),
            width: image.width as u32,
            height: image.height as u32,
            data_size: image.data_size,
            num_planes: image.num_planes,
            pitches: image.pitches,
            offsets: image.offsets,
        }
    }
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Surface, image and subpicture entry points of a VA driver.
///
/// Each method corresponds to one backend call. Callers hold the display lock
/// for exactly the duration of one method call.
pub trait VaBackend: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    /// Allocate one surface. On success, `request.width`/`height` hold the
    /// granted dimensions.
    fn create_surface(&self, request: &mut SurfaceRequest) -> Result<VaId, VaError>;

    fn destroy_surface(&self, surface: VaId) -> Result<(), VaError>;

    /// Expose the surface storage as an image, without copying.
    fn derive_image(&self, surface: VaId) -> Result<ImageDescriptor, VaError>;

    fn create_image(
        &self,
        format: &ImageFormat,
        width: u32,
        height: u32,
    ) -> Result<ImageDescriptor, VaError>;

    fn destroy_image(&self, image: VaId) -> Result<(), VaError>;

    /// Copy `data` into the image buffer (map, copy, unmap).
    fn upload_image(&self, image: &ImageDescriptor, data: &[u8]) -> Result<(), VaError>;

    /// Copy `region` of the surface into the image.
    fn get_image(&self, surface: VaId, region: Rectangle, image: VaId) -> Result<(), VaError>;

    /// Copy `src` of the image into `dst` of the surface.
    fn put_image(
        &self,
        surface: VaId,
        image: VaId,
        src: Rectangle,
        dst: Rectangle,
    ) -> Result<(), VaError>;

    fn create_subpicture(&self, image: VaId) -> Result<VaId, VaError>;

    fn destroy_subpicture(&self, subpicture: VaId) -> Result<(), VaError>;

    fn set_subpicture_global_alpha(&self, subpicture: VaId, alpha: f32) -> Result<(), VaError>;

    /// Bind a subpicture to a surface. `flags` are `VA_SUBPICTURE_*` bits.
    fn associate_subpicture(
        &self,
        subpicture: VaId,
        surface: VaId,
        src: Rectangle,
        dst: Rectangle,
        flags: u32,
    ) -> Result<(), VaError>;

    fn deassociate_subpicture(&self, subpicture: VaId, surface: VaId) -> Result<(), VaError>;

    /// Block until all pending operations on the surface complete.
    fn sync_surface(&self, surface: VaId) -> Result<(), VaError>;

    /// Raw `VASurfaceStatus` bits.
    fn query_surface_status(&self, surface: VaId) -> Result<u32, VaError>;
}
