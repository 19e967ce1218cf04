//! libva-backed implementation of [`VaBackend`].
//!
//! Opens a DRM render node, obtains a VA display from it and initializes
//! libva. All calls go straight to the driver; serialization is the
//! caller's job (see [`crate::display::Display::lock`]).

use std::ffi::{c_int, c_uint, c_void, CStr};
use std::fs::{File, OpenOptions};
use std::os::fd::AsRawFd;

use tracing::{debug, info, warn};
use vs_common::{Rectangle, VaapiConfig};

use crate::backend::{
    ImageDescriptor, ImageFormat, SurfaceAttrib, SurfaceRequest, VaBackend, VaId,
};
use crate::error::{check_va_status, LoadError, VaError};
use crate::ffi::{self, VaLibrary, VADisplay};

/// A live libva display on a DRM render node.
pub struct NativeBackend {
    lib: VaLibrary,
    dpy: VADisplay,
    vendor: String,
    version: (i32, i32),
    /// Render node; must outlive the display.
    _drm: File,
}

// SAFETY: VADisplay is an opaque handle that libva allows to be used from any
// thread. Calls are serialized by the owning `Display`'s lock.
unsafe impl Send for NativeBackend {}
unsafe impl Sync for NativeBackend {}

impl NativeBackend {
    /// Load libva, open the configured render node and initialize a display.
    pub fn open(config: &VaapiConfig) -> Result<Self, LoadError> {
        let lib = VaLibrary::load_with(
            config.library_path.as_deref(),
            config.drm_library_path.as_deref(),
        )?;

        let drm = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.render_node)
            .map_err(|source| LoadError::RenderNode {
                path: config.render_node.display().to_string(),
                source,
            })?;

        // SAFETY: the fd is a valid open render node for the lifetime of `drm`.
        let dpy = unsafe { (lib.api.vaGetDisplayDRM)(drm.as_raw_fd()) };
        if dpy.is_null() {
            return Err(LoadError::NoDisplay(config.render_node.display().to_string()));
        }

        let mut major: c_int = 0;
        let mut minor: c_int = 0;
        // SAFETY: dpy is a fresh display handle; out-pointers are valid.
        let status = unsafe { (lib.api.vaInitialize)(dpy, &mut major, &mut minor) };
        if let Err(e) = check_va_status(status, "vaInitialize") {
            // SAFETY: terminating a display that failed to initialize is allowed.
            unsafe { (lib.api.vaTerminate)(dpy) };
            return Err(LoadError::Initialize(e));
        }

        // SAFETY: dpy is initialized; the vendor string is owned by libva.
        let vendor_ptr = unsafe { (lib.api.vaQueryVendorString)(dpy) };
        let vendor = if vendor_ptr.is_null() {
            String::from("unknown")
        } else {
            // SAFETY: non-null vendor strings are NUL-terminated.
            unsafe { CStr::from_ptr(vendor_ptr) }
                .to_string_lossy()
                .into_owned()
        };

        info!(major, minor, vendor = %vendor, "VA-API initialized");

        Ok(Self {
            lib,
            dpy,
            vendor,
            version: (major, minor),
            _drm: drm,
        })
    }

    pub fn vendor(&self) -> &str {
        &self.vendor
    }

    /// VA-API version reported by `vaInitialize`.
    pub fn version(&self) -> (i32, i32) {
        self.version
    }

    fn check(&self, status: ffi::VAStatus, operation: &'static str) -> Result<(), VaError> {
        check_va_status(status, operation)
            .map_err(|e| VaError::with_message(operation, status, self.lib.error_str(e.status)))
    }
}

impl VaBackend for NativeBackend {
    fn name(&self) -> &'static str {
        "libva"
    }

    fn create_surface(&self, request: &mut SurfaceRequest) -> Result<VaId, VaError> {
        // Raw descriptors and their buffer handle arrays must stay put until
        // vaCreateSurfaces returns.
        let mut handles: Vec<Vec<usize>> = request
            .attribs
            .iter()
            .filter_map(|a| match a {
                SurfaceAttrib::ExternalBuffers(desc) => Some(desc.buffers.clone()),
                _ => None,
            })
            .collect();

        let mut extbufs: Vec<ffi::VASurfaceAttribExternalBuffers> = request
            .attribs
            .iter()
            .filter_map(|a| match a {
                SurfaceAttrib::ExternalBuffers(desc) => Some(desc),
                _ => None,
            })
            .zip(handles.iter_mut())
            .map(|(desc, bufs)| ffi::VASurfaceAttribExternalBuffers {
                pixel_format: desc.pixel_format,
                width: desc.width,
                height: desc.height,
                data_size: desc.data_size,
                num_planes: desc.num_planes,
                pitches: desc.pitches,
                offsets: desc.offsets,
                buffers: if bufs.is_empty() {
                    std::ptr::null_mut()
                } else {
                    bufs.as_mut_ptr()
                },
                num_buffers: bufs.len() as u32,
                flags: desc.flags,
                private_data: std::ptr::null_mut(),
            })
            .collect();

        let mut ext_iter = extbufs.iter_mut();
        let mut attribs: Vec<ffi::VASurfaceAttrib> = request
            .attribs
            .iter()
            .map(|a| match a {
                SurfaceAttrib::PixelFormat(fourcc) => {
                    ffi::VASurfaceAttrib::integer(ffi::VASurfaceAttribPixelFormat, *fourcc)
                }
                SurfaceAttrib::MemoryType(mem) => {
                    ffi::VASurfaceAttrib::integer(ffi::VASurfaceAttribMemoryType, *mem)
                }
                SurfaceAttrib::ExternalBuffers(_) => ffi::VASurfaceAttrib::pointer(
                    ffi::VASurfaceAttribExternalBufferDescriptor,
                    ext_iter
                        .next()
                        .map_or(std::ptr::null_mut(), |e| e as *mut _ as *mut c_void),
                ),
            })
            .collect();

        let mut surface: ffi::VASurfaceID = ffi::VA_INVALID_SURFACE;
        // SAFETY: every pointer in `attribs` refers to `extbufs`/`handles`,
        // which are alive and unmoved for the duration of the call.
        let status = unsafe {
            (self.lib.api.vaCreateSurfaces)(
                self.dpy,
                request.rt_format,
                request.width,
                request.height,
                &mut surface,
                1,
                if attribs.is_empty() {
                    std::ptr::null_mut()
                } else {
                    attribs.as_mut_ptr()
                },
                attribs.len() as c_uint,
            )
        };
        self.check(status, "vaCreateSurfaces")?;

        // The descriptor carries the authoritative dimensions.
        if let Some(ext) = extbufs.first() {
            request.width = ext.width;
            request.height = ext.height;
        }
        let (width, height) = (request.width, request.height);
        if let Some(desc) = request.external_buffers_mut() {
            desc.width = width;
            desc.height = height;
        }
        debug!(surface, width, height, "vaCreateSurfaces");
        Ok(surface)
    }

    fn destroy_surface(&self, surface: VaId) -> Result<(), VaError> {
        let mut id = surface;
        // SAFETY: one surface id, passed by pointer as libva expects.
        let status = unsafe { (self.lib.api.vaDestroySurfaces)(self.dpy, &mut id, 1) };
        self.check(status, "vaDestroySurfaces")
    }

    fn derive_image(&self, surface: VaId) -> Result<ImageDescriptor, VaError> {
        let mut image = ffi::VAImage::default();
        // SAFETY: `image` is a valid out-parameter.
        let status = unsafe { (self.lib.api.vaDeriveImage)(self.dpy, surface, &mut image) };
        self.check(status, "vaDeriveImage")?;
        Ok(image.into())
    }

    fn create_image(
        &self,
        format: &ImageFormat,
        width: u32,
        height: u32,
    ) -> Result<ImageDescriptor, VaError> {
        let mut va_format: ffi::VAImageFormat = (*format).into();
        let mut image = ffi::VAImage::default();
        // SAFETY: both pointers are valid for the call.
        let status = unsafe {
            (self.lib.api.vaCreateImage)(
                self.dpy,
                &mut va_format,
                width as c_int,
                height as c_int,
                &mut image,
            )
        };
        self.check(status, "vaCreateImage")?;
        Ok(image.into())
    }

    fn destroy_image(&self, image: VaId) -> Result<(), VaError> {
        // SAFETY: plain id argument.
        let status = unsafe { (self.lib.api.vaDestroyImage)(self.dpy, image) };
        self.check(status, "vaDestroyImage")
    }

    fn upload_image(&self, image: &ImageDescriptor, data: &[u8]) -> Result<(), VaError> {
        let mut mapped: *mut c_void = std::ptr::null_mut();
        // SAFETY: `mapped` is a valid out-parameter.
        let status = unsafe { (self.lib.api.vaMapBuffer)(self.dpy, image.buf, &mut mapped) };
        self.check(status, "vaMapBuffer")?;

        let len = data.len().min(image.data_size as usize);
        if !mapped.is_null() {
            // SAFETY: the mapping covers `data_size` bytes and `len` never
            // exceeds it; source and mapping do not overlap.
            unsafe { std::ptr::copy_nonoverlapping(data.as_ptr(), mapped.cast::<u8>(), len) };
        }

        // SAFETY: the buffer was mapped above.
        let status = unsafe { (self.lib.api.vaUnmapBuffer)(self.dpy, image.buf) };
        self.check(status, "vaUnmapBuffer")
    }

    fn get_image(&self, surface: VaId, region: Rectangle, image: VaId) -> Result<(), VaError> {
        // SAFETY: plain value arguments.
        let status = unsafe {
            (self.lib.api.vaGetImage)(
                self.dpy,
                surface,
                region.x,
                region.y,
                region.width,
                region.height,
                image,
            )
        };
        self.check(status, "vaGetImage")
    }

    fn put_image(
        &self,
        surface: VaId,
        image: VaId,
        src: Rectangle,
        dst: Rectangle,
    ) -> Result<(), VaError> {
        // SAFETY: plain value arguments.
        let status = unsafe {
            (self.lib.api.vaPutImage)(
                self.dpy, surface, image, src.x, src.y, src.width, src.height, dst.x, dst.y,
                dst.width, dst.height,
            )
        };
        self.check(status, "vaPutImage")
    }

    fn create_subpicture(&self, image: VaId) -> Result<VaId, VaError> {
        let mut subpicture: ffi::VASubpictureID = ffi::VA_INVALID_ID;
        // SAFETY: `subpicture` is a valid out-parameter.
        let status =
            unsafe { (self.lib.api.vaCreateSubpicture)(self.dpy, image, &mut subpicture) };
        self.check(status, "vaCreateSubpicture")?;
        Ok(subpicture)
    }

    fn destroy_subpicture(&self, subpicture: VaId) -> Result<(), VaError> {
        // SAFETY: plain id argument.
        let status = unsafe { (self.lib.api.vaDestroySubpicture)(self.dpy, subpicture) };
        self.check(status, "vaDestroySubpicture")
    }

    fn set_subpicture_global_alpha(&self, subpicture: VaId, alpha: f32) -> Result<(), VaError> {
        // SAFETY: plain value arguments.
        let status =
            unsafe { (self.lib.api.vaSetSubpictureGlobalAlpha)(self.dpy, subpicture, alpha) };
        self.check(status, "vaSetSubpictureGlobalAlpha")
    }

    fn associate_subpicture(
        &self,
        subpicture: VaId,
        surface: VaId,
        src: Rectangle,
        dst: Rectangle,
        flags: u32,
    ) -> Result<(), VaError> {
        let mut target = surface;
        // SAFETY: one target surface passed by pointer.
        let status = unsafe {
            (self.lib.api.vaAssociateSubpicture)(
                self.dpy,
                subpicture,
                &mut target,
                1,
                src.x as i16,
                src.y as i16,
                src.width as u16,
                src.height as u16,
                dst.x as i16,
                dst.y as i16,
                dst.width as u16,
                dst.height as u16,
                flags,
            )
        };
        self.check(status, "vaAssociateSubpicture")
    }

    fn deassociate_subpicture(&self, subpicture: VaId, surface: VaId) -> Result<(), VaError> {
        let mut target = surface;
        // SAFETY: one target surface passed by pointer.
        let status = unsafe {
            (self.lib.api.vaDeassociateSubpicture)(self.dpy, subpicture, &mut target, 1)
        };
        self.check(status, "vaDeassociateSubpicture")
    }

    fn sync_surface(&self, surface: VaId) -> Result<(), VaError> {
        // SAFETY: plain id argument.
        let status = unsafe { (self.lib.api.vaSyncSurface)(self.dpy, surface) };
        self.check(status, "vaSyncSurface")
    }

    fn query_surface_status(&self, surface: VaId) -> Result<u32, VaError> {
        let mut status_bits: ffi::VASurfaceStatus = 0;
        // SAFETY: `status_bits` is a valid out-parameter.
        let status = unsafe {
            (self.lib.api.vaQuerySurfaceStatus)(self.dpy, surface, &mut status_bits)
        };
        self.check(status, "vaQuerySurfaceStatus")?;
        Ok(status_bits)
    }
}

impl Drop for NativeBackend {
    fn drop(&mut self) {
        // SAFETY: the display was initialized in `open` and is terminated once.
        let status = unsafe { (self.lib.api.vaTerminate)(self.dpy) };
        if let Err(e) = self.check(status, "vaTerminate") {
            warn!(error = %e, "Failed to terminate VA display");
        }
    }
}

impl std::fmt::Debug for NativeBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeBackend")
            .field("vendor", &self.vendor)
            .field("version", &self.version)
            .finish()
    }
}
