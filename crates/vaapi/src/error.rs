//! VA error types.

use thiserror::Error;
use vs_common::{ChromaType, Resolution, VideoFormat};

use crate::ffi::{self, VAStatus};

/// Coarse classification of a backend status, for callers that branch on
/// the failure cause rather than the raw code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VaErrorKind {
    OperationFailed,
    AllocationFailed,
    InvalidDisplay,
    InvalidSurface,
    InvalidImage,
    InvalidSubpicture,
    InvalidParameter,
    /// Format, RT format, attribute, flag, resolution or memory type not supported.
    Unsupported,
    SurfaceBusy,
    Unimplemented,
    Unknown,
}

/// A failed backend call: which operation, the raw status, and a message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed with VA status {status:#x} ({message})")]
pub struct VaError {
    pub operation: &'static str,
    pub status: VAStatus,
    pub message: String,
}

impl VaError {
    /// Error with the symbolic status name as its message.
    pub fn new(operation: &'static str, status: VAStatus) -> Self {
        Self {
            operation,
            status,
            message: ffi::va_status_name(status).to_string(),
        }
    }

    pub fn with_message(
        operation: &'static str,
        status: VAStatus,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            status,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> VaErrorKind {
        match self.status {
            ffi::VA_STATUS_ERROR_OPERATION_FAILED => VaErrorKind::OperationFailed,
            ffi::VA_STATUS_ERROR_ALLOCATION_FAILED => VaErrorKind::AllocationFailed,
            ffi::VA_STATUS_ERROR_INVALID_DISPLAY => VaErrorKind::InvalidDisplay,
            ffi::VA_STATUS_ERROR_INVALID_SURFACE => VaErrorKind::InvalidSurface,
            ffi::VA_STATUS_ERROR_INVALID_IMAGE | ffi::VA_STATUS_ERROR_INVALID_BUFFER => {
                VaErrorKind::InvalidImage
            }
            ffi::VA_STATUS_ERROR_INVALID_SUBPICTURE => VaErrorKind::InvalidSubpicture,
            ffi::VA_STATUS_ERROR_INVALID_PARAMETER | ffi::VA_STATUS_ERROR_INVALID_VALUE => {
                VaErrorKind::InvalidParameter
            }
            ffi::VA_STATUS_ERROR_ATTR_NOT_SUPPORTED
            | ffi::VA_STATUS_ERROR_UNSUPPORTED_RT_FORMAT
            | ffi::VA_STATUS_ERROR_FLAG_NOT_SUPPORTED
            | ffi::VA_STATUS_ERROR_RESOLUTION_NOT_SUPPORTED
            | ffi::VA_STATUS_ERROR_INVALID_IMAGE_FORMAT
            | ffi::VA_STATUS_ERROR_UNSUPPORTED_MEMORY_TYPE => VaErrorKind::Unsupported,
            ffi::VA_STATUS_ERROR_SURFACE_BUSY
            | ffi::VA_STATUS_ERROR_SURFACE_IN_DISPLAYING
            | ffi::VA_STATUS_ERROR_HW_BUSY => VaErrorKind::SurfaceBusy,
            ffi::VA_STATUS_ERROR_UNIMPLEMENTED => VaErrorKind::Unimplemented,
            _ => VaErrorKind::Unknown,
        }
    }
}

/// Check a VA status, converting anything but success into a [`VaError`].
pub fn check_va_status(status: VAStatus, operation: &'static str) -> Result<(), VaError> {
    if status == ffi::VA_STATUS_SUCCESS {
        Ok(())
    } else {
        Err(VaError::new(operation, status))
    }
}

/// Errors from surface, image and subpicture operations.
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("Unsupported pixel format: {0}")]
    UnsupportedFormat(VideoFormat),

    #[error("Unsupported chroma type: {0}")]
    UnsupportedChromaType(ChromaType),

    #[error("VA backend error: {0}")]
    Backend(#[from] VaError),

    #[error("Surface has no live backend allocation")]
    InvalidSurface,

    #[error("Image has no valid backend id")]
    InvalidImage,

    #[error("Derived image is missing its {missing} id")]
    InvalidDerivedImage { missing: &'static str },

    #[error("Image size {image} does not match surface size {surface}")]
    SizeMismatch { surface: Resolution, image: Resolution },

    #[error("Pixel data too short: expected {expected} bytes, got {actual}")]
    TruncatedData { expected: usize, actual: usize },

    #[error("Frame layout of {format} at {width}x{height} does not fit in 32-bit offsets")]
    LayoutOverflow {
        format: VideoFormat,
        width: u32,
        height: u32,
    },

    #[error("External buffer of {size} bytes exceeds the 4 GiB descriptor limit")]
    BufferTooLarge { size: usize },

    #[error("Parent context rejected overlay composition: {0}")]
    ParentContext(String),
}

impl SurfaceError {
    /// Backend error kind, if this error came from a backend call.
    pub fn va_kind(&self) -> Option<VaErrorKind> {
        match self {
            Self::Backend(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// Convenience Result type for surface operations.
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Errors raised while loading libva or opening a display.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("VA library not found: {0}")]
    LibraryNotFound(String),

    #[error("VA symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("Failed to open render node {path}: {source}")]
    RenderNode {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("vaGetDisplayDRM returned no display for {0}")]
    NoDisplay(String),

    #[error("VA initialization failed: {0}")]
    Initialize(#[source] VaError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_ok() {
        assert!(check_va_status(ffi::VA_STATUS_SUCCESS, "vaSyncSurface").is_ok());
    }

    #[test]
    fn failure_carries_operation_and_name() {
        let err = check_va_status(ffi::VA_STATUS_ERROR_INVALID_SURFACE, "vaSyncSurface")
            .unwrap_err();
        assert_eq!(err.operation, "vaSyncSurface");
        assert_eq!(err.status, ffi::VA_STATUS_ERROR_INVALID_SURFACE);
        assert_eq!(err.kind(), VaErrorKind::InvalidSurface);
        let msg = err.to_string();
        assert!(msg.contains("vaSyncSurface"));
        assert!(msg.contains("0x6"));
        assert!(msg.contains("VA_STATUS_ERROR_INVALID_SURFACE"));
    }

    #[test]
    fn kind_mapping() {
        let kind = |s| VaError::new("op", s).kind();
        assert_eq!(kind(ffi::VA_STATUS_ERROR_ALLOCATION_FAILED), VaErrorKind::AllocationFailed);
        assert_eq!(kind(ffi::VA_STATUS_ERROR_UNSUPPORTED_RT_FORMAT), VaErrorKind::Unsupported);
        assert_eq!(kind(ffi::VA_STATUS_ERROR_SURFACE_BUSY), VaErrorKind::SurfaceBusy);
        assert_eq!(kind(ffi::VA_STATUS_ERROR_UNIMPLEMENTED), VaErrorKind::Unimplemented);
        assert_eq!(kind(ffi::VA_STATUS_ERROR_UNKNOWN), VaErrorKind::Unknown);
    }

    #[test]
    fn surface_error_wraps_backend() {
        let err: SurfaceError =
            VaError::new("vaCreateSurfaces", ffi::VA_STATUS_ERROR_ALLOCATION_FAILED).into();
        assert_eq!(err.va_kind(), Some(VaErrorKind::AllocationFailed));
        assert!(err.to_string().contains("vaCreateSurfaces"));
        assert_eq!(SurfaceError::InvalidImage.va_kind(), None);
    }

    #[test]
    fn size_mismatch_display() {
        let err = SurfaceError::SizeMismatch {
            surface: Resolution::new(64, 64),
            image: Resolution::new(32, 64),
        };
        assert_eq!(err.to_string(), "Image size 32x64 does not match surface size 64x64");
    }
}
