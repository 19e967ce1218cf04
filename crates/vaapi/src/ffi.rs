//! Raw FFI bindings for libva (`va.h`, `va_drm.h`).
//!
//! These bindings are loaded dynamically at runtime via `libloading`.
//! They cover the surface, image, and subpicture entry points this crate
//! needs, plus display initialization through the DRM backend.
//!
//! Reference: libva 2.x — `va/va.h`, `va/va_drm.h`.

#![allow(non_camel_case_types, non_snake_case, non_upper_case_globals)]

use std::ffi::{c_char, c_float, c_int, c_uint, c_void, CStr};
use std::path::Path;

use libloading::Library;
use tracing::{debug, info};

use crate::error::LoadError;

// ---------------------------------------------------------------------------
// Basic types
// ---------------------------------------------------------------------------

/// Opaque VA display handle.
pub type VADisplay = *mut c_void;

/// VA API return type.
pub type VAStatus = c_int;

/// Generic VA object id (surface, image, buffer, subpicture).
pub type VAGenericID = c_uint;
pub type VASurfaceID = VAGenericID;
pub type VAImageID = VAGenericID;
pub type VABufferID = VAGenericID;
pub type VASubpictureID = VAGenericID;

/// Sentinel for "no object".
pub const VA_INVALID_ID: VAGenericID = 0xffff_ffff;
pub const VA_INVALID_SURFACE: VASurfaceID = VA_INVALID_ID;

// ---------------------------------------------------------------------------
// Status codes
// ---------------------------------------------------------------------------

pub const VA_STATUS_SUCCESS: VAStatus = 0x0000_0000;
pub const VA_STATUS_ERROR_OPERATION_FAILED: VAStatus = 0x0000_0001;
pub const VA_STATUS_ERROR_ALLOCATION_FAILED: VAStatus = 0x0000_0002;
pub const VA_STATUS_ERROR_INVALID_DISPLAY: VAStatus = 0x0000_0003;
pub const VA_STATUS_ERROR_INVALID_CONFIG: VAStatus = 0x0000_0004;
pub const VA_STATUS_ERROR_INVALID_CONTEXT: VAStatus = 0x0000_0005;
pub const VA_STATUS_ERROR_INVALID_SURFACE: VAStatus = 0x0000_0006;
pub const VA_STATUS_ERROR_INVALID_BUFFER: VAStatus = 0x0000_0007;
pub const VA_STATUS_ERROR_INVALID_IMAGE: VAStatus = 0x0000_0008;
pub const VA_STATUS_ERROR_INVALID_SUBPICTURE: VAStatus = 0x0000_0009;
pub const VA_STATUS_ERROR_ATTR_NOT_SUPPORTED: VAStatus = 0x0000_000a;
pub const VA_STATUS_ERROR_MAX_NUM_EXCEEDED: VAStatus = 0x0000_000b;
pub const VA_STATUS_ERROR_UNSUPPORTED_RT_FORMAT: VAStatus = 0x0000_000e;
pub const VA_STATUS_ERROR_SURFACE_BUSY: VAStatus = 0x0000_0010;
pub const VA_STATUS_ERROR_FLAG_NOT_SUPPORTED: VAStatus = 0x0000_0011;
pub const VA_STATUS_ERROR_INVALID_PARAMETER: VAStatus = 0x0000_0012;
pub const VA_STATUS_ERROR_RESOLUTION_NOT_SUPPORTED: VAStatus = 0x0000_0013;
pub const VA_STATUS_ERROR_UNIMPLEMENTED: VAStatus = 0x0000_0014;
pub const VA_STATUS_ERROR_SURFACE_IN_DISPLAYING: VAStatus = 0x0000_0015;
pub const VA_STATUS_ERROR_INVALID_IMAGE_FORMAT: VAStatus = 0x0000_0016;
pub const VA_STATUS_ERROR_INVALID_VALUE: VAStatus = 0x0000_0019;
pub const VA_STATUS_ERROR_HW_BUSY: VAStatus = 0x0000_0022;
pub const VA_STATUS_ERROR_UNSUPPORTED_MEMORY_TYPE: VAStatus = 0x0000_0024;
pub const VA_STATUS_ERROR_UNKNOWN: VAStatus = 0xffff_ffff_u32 as VAStatus;

// ---------------------------------------------------------------------------
// Render-target (chroma) formats
// ---------------------------------------------------------------------------

pub const VA_RT_FORMAT_YUV420: c_uint = 0x0000_0001;
pub const VA_RT_FORMAT_YUV422: c_uint = 0x0000_0002;
pub const VA_RT_FORMAT_YUV444: c_uint = 0x0000_0004;
pub const VA_RT_FORMAT_YUV411: c_uint = 0x0000_0008;
pub const VA_RT_FORMAT_YUV400: c_uint = 0x0000_0010;
pub const VA_RT_FORMAT_YUV420_10: c_uint = 0x0000_0100;
pub const VA_RT_FORMAT_RGB16: c_uint = 0x0001_0000;
pub const VA_RT_FORMAT_RGB32: c_uint = 0x0002_0000;

// ---------------------------------------------------------------------------
// FourCC codes
// ---------------------------------------------------------------------------

/// Pack four ASCII bytes into a VA fourcc.
pub const fn va_fourcc(a: u8, b: u8, c: u8, d: u8) -> u32 {
    (a as u32) | ((b as u32) << 8) | ((c as u32) << 16) | ((d as u32) << 24)
}

pub const VA_FOURCC_NV12: u32 = va_fourcc(b'N', b'V', b'1', b'2');
pub const VA_FOURCC_YV12: u32 = va_fourcc(b'Y', b'V', b'1', b'2');
pub const VA_FOURCC_I420: u32 = va_fourcc(b'I', b'4', b'2', b'0');
pub const VA_FOURCC_P010: u32 = va_fourcc(b'P', b'0', b'1', b'0');
pub const VA_FOURCC_YUY2: u32 = va_fourcc(b'Y', b'U', b'Y', b'2');
pub const VA_FOURCC_UYVY: u32 = va_fourcc(b'U', b'Y', b'V', b'Y');
pub const VA_FOURCC_AYUV: u32 = va_fourcc(b'A', b'Y', b'U', b'V');
pub const VA_FOURCC_444P: u32 = va_fourcc(b'4', b'4', b'4', b'P');
pub const VA_FOURCC_Y800: u32 = va_fourcc(b'Y', b'8', b'0', b'0');
pub const VA_FOURCC_RGBA: u32 = va_fourcc(b'R', b'G', b'B', b'A');
pub const VA_FOURCC_BGRA: u32 = va_fourcc(b'B', b'G', b'R', b'A');
pub const VA_FOURCC_ARGB: u32 = va_fourcc(b'A', b'R', b'G', b'B');
pub const VA_FOURCC_ABGR: u32 = va_fourcc(b'A', b'B', b'G', b'R');
pub const VA_FOURCC_RGBX: u32 = va_fourcc(b'R', b'G', b'B', b'X');
pub const VA_FOURCC_BGRX: u32 = va_fourcc(b'B', b'G', b'R', b'X');
pub const VA_FOURCC_XRGB: u32 = va_fourcc(b'X', b'R', b'G', b'B');
pub const VA_FOURCC_XBGR: u32 = va_fourcc(b'X', b'B', b'G', b'R');

pub const VA_LSB_FIRST: u32 = 1;
pub const VA_MSB_FIRST: u32 = 2;

// ---------------------------------------------------------------------------
// Surface attributes
// ---------------------------------------------------------------------------

pub type VASurfaceAttribType = c_uint;
pub const VASurfaceAttribNone: VASurfaceAttribType = 0;
pub const VASurfaceAttribPixelFormat: VASurfaceAttribType = 1;
pub const VASurfaceAttribMemoryType: VASurfaceAttribType = 6;
pub const VASurfaceAttribExternalBufferDescriptor: VASurfaceAttribType = 7;

pub const VA_SURFACE_ATTRIB_GETTABLE: u32 = 0x0000_0001;
pub const VA_SURFACE_ATTRIB_SETTABLE: u32 = 0x0000_0002;

pub type VAGenericValueType = c_uint;
pub const VAGenericValueTypeInteger: VAGenericValueType = 1;
pub const VAGenericValueTypeFloat: VAGenericValueType = 2;
pub const VAGenericValueTypePointer: VAGenericValueType = 3;

pub const VA_SURFACE_ATTRIB_MEM_TYPE_VA: u32 = 0x0000_0001;
pub const VA_SURFACE_ATTRIB_MEM_TYPE_V4L2: u32 = 0x0000_0002;
pub const VA_SURFACE_ATTRIB_MEM_TYPE_USER_PTR: u32 = 0x0000_0004;
pub const VA_SURFACE_ATTRIB_MEM_TYPE_KERNEL_DRM: u32 = 0x1000_0000;
pub const VA_SURFACE_ATTRIB_MEM_TYPE_DRM_PRIME: u32 = 0x2000_0000;

/// Tiled storage allowed for the external buffer.
pub const VA_SURFACE_EXTBUF_DESC_ENABLE_TILING: u32 = 0x0000_0001;

/// Value payload of a `VAGenericValue`.
#[repr(C)]
#[derive(Copy, Clone)]
pub union VAGenericValueUnion {
    pub i: c_int,
    pub f: c_float,
    pub p: *mut c_void,
    pub func: Option<unsafe extern "C" fn()>,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct VAGenericValue {
    pub type_: VAGenericValueType,
    pub value: VAGenericValueUnion,
}

#[repr(C)]
#[derive(Copy, Clone)]
pub struct VASurfaceAttrib {
    pub type_: VASurfaceAttribType,
    pub flags: u32,
    pub value: VAGenericValue,
}

impl VASurfaceAttrib {
    /// Settable integer attribute.
    pub fn integer(type_: VASurfaceAttribType, value: u32) -> Self {
        Self {
            type_,
            flags: VA_SURFACE_ATTRIB_SETTABLE,
            value: VAGenericValue {
                type_: VAGenericValueTypeInteger,
                value: VAGenericValueUnion { i: value as c_int },
            },
        }
    }

    /// Settable pointer attribute.
    pub fn pointer(type_: VASurfaceAttribType, value: *mut c_void) -> Self {
        Self {
            type_,
            flags: VA_SURFACE_ATTRIB_SETTABLE,
            value: VAGenericValue {
                type_: VAGenericValueTypePointer,
                value: VAGenericValueUnion { p: value },
            },
        }
    }
}

/// `VASurfaceAttribExternalBuffers`.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct VASurfaceAttribExternalBuffers {
    pub pixel_format: u32,
    pub width: u32,
    pub height: u32,
    pub data_size: u32,
    pub num_planes: u32,
    pub pitches: [u32; 4],
    pub offsets: [u32; 4],
    pub buffers: *mut usize,
    pub num_buffers: u32,
    pub flags: u32,
    pub private_data: *mut c_void,
}

impl Default for VASurfaceAttribExternalBuffers {
    fn default() -> Self {
        Self {
            pixel_format: 0,
            width: 0,
            height: 0,
            data_size: 0,
            num_planes: 0,
            pitches: [0; 4],
            offsets: [0; 4],
            buffers: std::ptr::null_mut(),
            num_buffers: 0,
            flags: 0,
            private_data: std::ptr::null_mut(),
        }
    }
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// `VAImageFormat`.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default)]
pub struct VAImageFormat {
    pub fourcc: u32,
    pub byte_order: u32,
    pub bits_per_pixel: u32,
    pub depth: u32,
    pub red_mask: u32,
    pub green_mask: u32,
    pub blue_mask: u32,
    pub alpha_mask: u32,
    pub va_reserved: [u32; 4],
}

/// `VAImage`.
#[repr(C)]
#[derive(Copy, Clone, Debug)]
pub struct VAImage {
    pub image_id: VAImageID,
    pub format: VAImageFormat,
    pub buf: VABufferID,
    pub width: u16,
    pub height: u16,
    pub data_size: u32,
    pub num_planes: u32,
    pub pitches: [u32; 3],
    pub offsets: [u32; 3],
    pub num_palette_entries: i32,
    pub entry_bytes: i32,
    pub component_order: [i8; 4],
    pub va_reserved: [u32; 4],
}

impl Default for VAImage {
    fn default() -> Self {
        Self {
            image_id: VA_INVALID_ID,
            format: VAImageFormat::default(),
            buf: VA_INVALID_ID,
            width: 0,
            height: 0,
            data_size: 0,
            num_planes: 0,
            pitches: [0; 3],
            offsets: [0; 3],
            num_palette_entries: 0,
            entry_bytes: 0,
            component_order: [0; 4],
            va_reserved: [0; 4],
        }
    }
}

// ---------------------------------------------------------------------------
// Surface status / subpicture flags
// ---------------------------------------------------------------------------

pub type VASurfaceStatus = c_uint;
pub const VASurfaceRendering: VASurfaceStatus = 1;
pub const VASurfaceDisplaying: VASurfaceStatus = 2;
pub const VASurfaceReady: VASurfaceStatus = 4;
pub const VASurfaceSkipped: VASurfaceStatus = 8;

pub const VA_SUBPICTURE_CHROMA_KEYING: u32 = 0x0001;
pub const VA_SUBPICTURE_GLOBAL_ALPHA: u32 = 0x0002;
pub const VA_SUBPICTURE_DESTINATION_IS_SCREEN_COORD: u32 = 0x0004;

// ---------------------------------------------------------------------------
// Function table
// ---------------------------------------------------------------------------

/// libva entry points used by this crate.
pub struct VaFunctionList {
    pub vaInitialize:
        unsafe extern "C" fn(dpy: VADisplay, major: *mut c_int, minor: *mut c_int) -> VAStatus,
    pub vaTerminate: unsafe extern "C" fn(dpy: VADisplay) -> VAStatus,
    pub vaErrorStr: unsafe extern "C" fn(status: VAStatus) -> *const c_char,
    pub vaQueryVendorString: unsafe extern "C" fn(dpy: VADisplay) -> *const c_char,
    pub vaCreateSurfaces: unsafe extern "C" fn(
        dpy: VADisplay,
        format: c_uint,
        width: c_uint,
        height: c_uint,
        surfaces: *mut VASurfaceID,
        num_surfaces: c_uint,
        attrib_list: *mut VASurfaceAttrib,
        num_attribs: c_uint,
    ) -> VAStatus,
    pub vaDestroySurfaces:
        unsafe extern "C" fn(dpy: VADisplay, surfaces: *mut VASurfaceID, num: c_int) -> VAStatus,
    pub vaSyncSurface: unsafe extern "C" fn(dpy: VADisplay, surface: VASurfaceID) -> VAStatus,
    pub vaQuerySurfaceStatus: unsafe extern "C" fn(
        dpy: VADisplay,
        surface: VASurfaceID,
        status: *mut VASurfaceStatus,
    ) -> VAStatus,
    pub vaDeriveImage:
        unsafe extern "C" fn(dpy: VADisplay, surface: VASurfaceID, image: *mut VAImage) -> VAStatus,
    pub vaCreateImage: unsafe extern "C" fn(
        dpy: VADisplay,
        format: *mut VAImageFormat,
        width: c_int,
        height: c_int,
        image: *mut VAImage,
    ) -> VAStatus,
    pub vaDestroyImage: unsafe extern "C" fn(dpy: VADisplay, image: VAImageID) -> VAStatus,
    pub vaGetImage: unsafe extern "C" fn(
        dpy: VADisplay,
        surface: VASurfaceID,
        x: c_int,
        y: c_int,
        width: c_uint,
        height: c_uint,
        image: VAImageID,
    ) -> VAStatus,
    pub vaPutImage: unsafe extern "C" fn(
        dpy: VADisplay,
        surface: VASurfaceID,
        image: VAImageID,
        src_x: c_int,
        src_y: c_int,
        src_width: c_uint,
        src_height: c_uint,
        dest_x: c_int,
        dest_y: c_int,
        dest_width: c_uint,
        dest_height: c_uint,
    ) -> VAStatus,
    pub vaMapBuffer:
        unsafe extern "C" fn(dpy: VADisplay, buf: VABufferID, pbuf: *mut *mut c_void) -> VAStatus,
    pub vaUnmapBuffer: unsafe extern "C" fn(dpy: VADisplay, buf: VABufferID) -> VAStatus,
    pub vaCreateSubpicture: unsafe extern "C" fn(
        dpy: VADisplay,
        image: VAImageID,
        subpicture: *mut VASubpictureID,
    ) -> VAStatus,
    pub vaDestroySubpicture:
        unsafe extern "C" fn(dpy: VADisplay, subpicture: VASubpictureID) -> VAStatus,
    pub vaSetSubpictureGlobalAlpha: unsafe extern "C" fn(
        dpy: VADisplay,
        subpicture: VASubpictureID,
        global_alpha: c_float,
    ) -> VAStatus,
    pub vaAssociateSubpicture: unsafe extern "C" fn(
        dpy: VADisplay,
        subpicture: VASubpictureID,
        target_surfaces: *mut VASurfaceID,
        num_surfaces: c_int,
        src_x: i16,
        src_y: i16,
        src_width: u16,
        src_height: u16,
        dest_x: i16,
        dest_y: i16,
        dest_width: u16,
        dest_height: u16,
        flags: u32,
    ) -> VAStatus,
    pub vaDeassociateSubpicture: unsafe extern "C" fn(
        dpy: VADisplay,
        subpicture: VASubpictureID,
        target_surfaces: *mut VASurfaceID,
        num_surfaces: c_int,
    ) -> VAStatus,
    pub vaGetDisplayDRM: unsafe extern "C" fn(fd: c_int) -> VADisplay,
}

// SAFETY: the function pointers reference libva entry points which may be
// called from any thread; calls on one display are serialized by `Display`.
unsafe impl Send for VaFunctionList {}
unsafe impl Sync for VaFunctionList {}

impl std::fmt::Debug for VaFunctionList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaFunctionList")
            .field("loaded", &true)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Dynamic library wrapper
// ---------------------------------------------------------------------------

/// Dynamically loaded libva + libva-drm with the API function table.
pub struct VaLibrary {
    /// Library handles, kept alive as long as any symbol is in use.
    _va: Library,
    _va_drm: Library,
    /// libva function pointers.
    pub api: VaFunctionList,
}

impl std::fmt::Debug for VaLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaLibrary")
            .field("loaded", &true)
            .finish()
    }
}

/// Look up one symbol and copy the function pointer out of it.
///
/// # Safety
/// `T` must match the C signature of the exported symbol `name`.
unsafe fn symbol<T: Copy>(lib: &Library, name: &'static [u8]) -> Result<T, LoadError> {
    lib.get::<T>(name).map(|sym| *sym).map_err(|e| {
        let printable = String::from_utf8_lossy(name.strip_suffix(b"\0").unwrap_or(name));
        LoadError::SymbolNotFound(format!("{printable}: {e}"))
    })
}

impl VaLibrary {
    /// Load libva from the system search path.
    pub fn load() -> Result<Self, LoadError> {
        Self::load_with(None, None)
    }

    /// Load libva, optionally from explicit paths.
    pub fn load_with(
        va_path: Option<&Path>,
        va_drm_path: Option<&Path>,
    ) -> Result<Self, LoadError> {
        let va = Self::open(va_path, Self::library_name())?;
        let va_drm = Self::open(va_drm_path, Self::drm_library_name())?;
        Self::load_functions(va, va_drm)
    }

    fn open(path: Option<&Path>, default_name: &str) -> Result<Library, LoadError> {
        match path {
            Some(path) => {
                info!(path = %path.display(), "Loading VA library from custom path");
                // SAFETY: loading a user-specified shared library. The caller
                // asserts this is a libva build.
                unsafe { Library::new(path) }.map_err(|e| {
                    LoadError::LibraryNotFound(format!("Failed to load {}: {e}", path.display()))
                })
            }
            None => {
                info!(library = %default_name, "Loading VA library");
                // SAFETY: loading the well-known system libva.
                unsafe { Library::new(default_name) }.map_err(|e| {
                    LoadError::LibraryNotFound(format!(
                        "Failed to load {default_name}: {e}. Is libva installed?"
                    ))
                })
            }
        }
    }

    fn load_functions(va: Library, va_drm: Library) -> Result<Self, LoadError> {
        // SAFETY: every lookup below names a libva entry point whose signature
        // matches the declarations in `VaFunctionList`.
        let api = unsafe {
            VaFunctionList {
                vaInitialize: symbol(&va, b"vaInitialize\0")?,
                vaTerminate: symbol(&va, b"vaTerminate\0")?,
                vaErrorStr: symbol(&va, b"vaErrorStr\0")?,
                vaQueryVendorString: symbol(&va, b"vaQueryVendorString\0")?,
                vaCreateSurfaces: symbol(&va, b"vaCreateSurfaces\0")?,
                vaDestroySurfaces: symbol(&va, b"vaDestroySurfaces\0")?,
                vaSyncSurface: symbol(&va, b"vaSyncSurface\0")?,
                vaQuerySurfaceStatus: symbol(&va, b"vaQuerySurfaceStatus\0")?,
                vaDeriveImage: symbol(&va, b"vaDeriveImage\0")?,
                vaCreateImage: symbol(&va, b"vaCreateImage\0")?,
                vaDestroyImage: symbol(&va, b"vaDestroyImage\0")?,
                vaGetImage: symbol(&va, b"vaGetImage\0")?,
                vaPutImage: symbol(&va, b"vaPutImage\0")?,
                vaMapBuffer: symbol(&va, b"vaMapBuffer\0")?,
                vaUnmapBuffer: symbol(&va, b"vaUnmapBuffer\0")?,
                vaCreateSubpicture: symbol(&va, b"vaCreateSubpicture\0")?,
                vaDestroySubpicture: symbol(&va, b"vaDestroySubpicture\0")?,
                vaSetSubpictureGlobalAlpha: symbol(&va, b"vaSetSubpictureGlobalAlpha\0")?,
                vaAssociateSubpicture: symbol(&va, b"vaAssociateSubpicture\0")?,
                vaDeassociateSubpicture: symbol(&va, b"vaDeassociateSubpicture\0")?,
                vaGetDisplayDRM: symbol(&va_drm, b"vaGetDisplayDRM\0")?,
            }
        };

        debug!("libva function table loaded");
        Ok(Self {
            _va: va,
            _va_drm: va_drm,
            api,
        })
    }

    /// Human-readable description of a status, as reported by libva.
    pub fn error_str(&self, status: VAStatus) -> String {
        // SAFETY: vaErrorStr returns a pointer to a static string for any input.
        let ptr = unsafe { (self.api.vaErrorStr)(status) };
        if ptr.is_null() {
            return va_status_name(status).to_string();
        }
        // SAFETY: non-null pointers from vaErrorStr are NUL-terminated static strings.
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }

    /// Platform-specific libva filename.
    pub fn library_name() -> &'static str {
        "libva.so.2"
    }

    /// Platform-specific libva-drm filename.
    pub fn drm_library_name() -> &'static str {
        "libva-drm.so.2"
    }
}

// ---------------------------------------------------------------------------
// Status helpers
// ---------------------------------------------------------------------------

/// Symbolic name of a VA status code.
pub fn va_status_name(status: VAStatus) -> &'static str {
    match status {
        VA_STATUS_SUCCESS => "VA_STATUS_SUCCESS",
        VA_STATUS_ERROR_OPERATION_FAILED => "VA_STATUS_ERROR_OPERATION_FAILED",
        VA_STATUS_ERROR_ALLOCATION_FAILED => "VA_STATUS_ERROR_ALLOCATION_FAILED",
        VA_STATUS_ERROR_INVALID_DISPLAY => "VA_STATUS_ERROR_INVALID_DISPLAY",
        VA_STATUS_ERROR_INVALID_CONFIG => "VA_STATUS_ERROR_INVALID_CONFIG",
        VA_STATUS_ERROR_INVALID_CONTEXT => "VA_STATUS_ERROR_INVALID_CONTEXT",
        VA_STATUS_ERROR_INVALID_SURFACE => "VA_STATUS_ERROR_INVALID_SURFACE",
        VA_STATUS_ERROR_INVALID_BUFFER => "VA_STATUS_ERROR_INVALID_BUFFER",
        VA_STATUS_ERROR_INVALID_IMAGE => "VA_STATUS_ERROR_INVALID_IMAGE",
        VA_STATUS_ERROR_INVALID_SUBPICTURE => "VA_STATUS_ERROR_INVALID_SUBPICTURE",
        VA_STATUS_ERROR_ATTR_NOT_SUPPORTED => "VA_STATUS_ERROR_ATTR_NOT_SUPPORTED",
        VA_STATUS_ERROR_MAX_NUM_EXCEEDED => "VA_STATUS_ERROR_MAX_NUM_EXCEEDED",
        VA_STATUS_ERROR_UNSUPPORTED_RT_FORMAT => "VA_STATUS_ERROR_UNSUPPORTED_RT_FORMAT",
        VA_STATUS_ERROR_SURFACE_BUSY => "VA_STATUS_ERROR_SURFACE_BUSY",
        VA_STATUS_ERROR_FLAG_NOT_SUPPORTED => "VA_STATUS_ERROR_FLAG_NOT_SUPPORTED",
        VA_STATUS_ERROR_INVALID_PARAMETER => "VA_STATUS_ERROR_INVALID_PARAMETER",
        VA_STATUS_ERROR_RESOLUTION_NOT_SUPPORTED => "VA_STATUS_ERROR_RESOLUTION_NOT_SUPPORTED",
        VA_STATUS_ERROR_UNIMPLEMENTED => "VA_STATUS_ERROR_UNIMPLEMENTED",
        VA_STATUS_ERROR_SURFACE_IN_DISPLAYING => "VA_STATUS_ERROR_SURFACE_IN_DISPLAYING",
        VA_STATUS_ERROR_INVALID_IMAGE_FORMAT => "VA_STATUS_ERROR_INVALID_IMAGE_FORMAT",
        VA_STATUS_ERROR_INVALID_VALUE => "VA_STATUS_ERROR_INVALID_VALUE",
        VA_STATUS_ERROR_HW_BUSY => "VA_STATUS_ERROR_HW_BUSY",
        VA_STATUS_ERROR_UNSUPPORTED_MEMORY_TYPE => "VA_STATUS_ERROR_UNSUPPORTED_MEMORY_TYPE",
        _ => "VA_STATUS_ERROR_UNKNOWN",
    }
}
