//! Format negotiation between device-independent descriptions and backend
//! codes.
//!
//! Pure lookups. A failed lookup aborts the caller before any backend call.

use tracing::error;
use vs_common::{ChromaType, VideoFormat};

use crate::backend::ImageFormat;
use crate::buffer_proxy::BufferMemoryType;
use crate::error::{SurfaceError, SurfaceResult};
use crate::ffi;
use crate::subpicture::SubpictureFlags;
use crate::surface::SurfaceStatus;

// ---------------------------------------------------------------------------
// Pixel formats
// ---------------------------------------------------------------------------

const fn rgb(fourcc: u32, masks: [u32; 4]) -> ImageFormat {
    let depth = if masks[3] == 0 { 24 } else { 32 };
    ImageFormat::rgb32(fourcc, depth, masks)
}

/// Backend image format for a pixel format, if the backend has one.
pub fn video_format_to_va(format: VideoFormat) -> Option<ImageFormat> {
    let va = match format {
        VideoFormat::Unknown | VideoFormat::Encoded => return None,
        VideoFormat::Nv12 => ImageFormat::yuv(ffi::VA_FOURCC_NV12, 12),
        VideoFormat::Yv12 => ImageFormat::yuv(ffi::VA_FOURCC_YV12, 12),
        VideoFormat::I420 => ImageFormat::yuv(ffi::VA_FOURCC_I420, 12),
        VideoFormat::P010 => ImageFormat::yuv(ffi::VA_FOURCC_P010, 24),
        VideoFormat::Yuy2 => ImageFormat::yuv(ffi::VA_FOURCC_YUY2, 16),
        VideoFormat::Uyvy => ImageFormat::yuv(ffi::VA_FOURCC_UYVY, 16),
        VideoFormat::Ayuv => ImageFormat::yuv(ffi::VA_FOURCC_AYUV, 32),
        VideoFormat::Y444 => ImageFormat::yuv(ffi::VA_FOURCC_444P, 24),
        VideoFormat::Gray8 => ImageFormat::yuv(ffi::VA_FOURCC_Y800, 8),
        // Masks describe the little-endian 32-bit word.
        VideoFormat::Rgba => rgb(
            ffi::VA_FOURCC_RGBA,
            [0x0000_00ff, 0x0000_ff00, 0x00ff_0000, 0xff00_0000],
        ),
        VideoFormat::Bgra => rgb(
            ffi::VA_FOURCC_BGRA,
            [0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0xff00_0000],
        ),
        VideoFormat::Argb => rgb(
            ffi::VA_FOURCC_ARGB,
            [0x0000_ff00, 0x00ff_0000, 0xff00_0000, 0x0000_00ff],
        ),
        VideoFormat::Abgr => rgb(
            ffi::VA_FOURCC_ABGR,
            [0xff00_0000, 0x00ff_0000, 0x0000_ff00, 0x0000_00ff],
        ),
        VideoFormat::Rgbx => rgb(ffi::VA_FOURCC_RGBX, [0x0000_00ff, 0x0000_ff00, 0x00ff_0000, 0]),
        VideoFormat::Bgrx => rgb(ffi::VA_FOURCC_BGRX, [0x00ff_0000, 0x0000_ff00, 0x0000_00ff, 0]),
        VideoFormat::Xrgb => rgb(ffi::VA_FOURCC_XRGB, [0x0000_ff00, 0x00ff_0000, 0xff00_0000, 0]),
        VideoFormat::Xbgr => rgb(ffi::VA_FOURCC_XBGR, [0xff00_0000, 0x00ff_0000, 0x0000_ff00, 0]),
    };
    Some(va)
}

/// Pixel format of a backend image format, by fourcc.
pub fn va_to_video_format(format: &ImageFormat) -> Option<VideoFormat> {
    let video = match format.fourcc {
        ffi::VA_FOURCC_NV12 => VideoFormat::Nv12,
        ffi::VA_FOURCC_YV12 => VideoFormat::Yv12,
        ffi::VA_FOURCC_I420 => VideoFormat::I420,
        ffi::VA_FOURCC_P010 => VideoFormat::P010,
        ffi::VA_FOURCC_YUY2 => VideoFormat::Yuy2,
        ffi::VA_FOURCC_UYVY => VideoFormat::Uyvy,
        ffi::VA_FOURCC_AYUV => VideoFormat::Ayuv,
        ffi::VA_FOURCC_444P => VideoFormat::Y444,
        ffi::VA_FOURCC_Y800 => VideoFormat::Gray8,
        ffi::VA_FOURCC_RGBA => VideoFormat::Rgba,
        ffi::VA_FOURCC_BGRA => VideoFormat::Bgra,
        ffi::VA_FOURCC_ARGB => VideoFormat::Argb,
        ffi::VA_FOURCC_ABGR => VideoFormat::Abgr,
        ffi::VA_FOURCC_RGBX => VideoFormat::Rgbx,
        ffi::VA_FOURCC_BGRX => VideoFormat::Bgrx,
        ffi::VA_FOURCC_XRGB => VideoFormat::Xrgb,
        ffi::VA_FOURCC_XBGR => VideoFormat::Xbgr,
        _ => return None,
    };
    Some(video)
}

// ---------------------------------------------------------------------------
// Chroma types
// ---------------------------------------------------------------------------

/// Backend RT format for a chroma type. 4:1:0 has no backend code.
pub fn chroma_type_to_va(chroma: ChromaType) -> Option<u32> {
    let rt = match chroma {
        ChromaType::Yuv420 => ffi::VA_RT_FORMAT_YUV420,
        ChromaType::Yuv422 => ffi::VA_RT_FORMAT_YUV422,
        ChromaType::Yuv444 => ffi::VA_RT_FORMAT_YUV444,
        ChromaType::Yuv411 => ffi::VA_RT_FORMAT_YUV411,
        ChromaType::Yuv400 => ffi::VA_RT_FORMAT_YUV400,
        ChromaType::Yuv420P10 => ffi::VA_RT_FORMAT_YUV420_10,
        ChromaType::Rgb32 => ffi::VA_RT_FORMAT_RGB32,
        ChromaType::Rgb16 => ffi::VA_RT_FORMAT_RGB16,
        ChromaType::Yuv410 => return None,
    };
    Some(rt)
}

pub fn va_to_chroma_type(rt_format: u32) -> Option<ChromaType> {
    let chroma = match rt_format {
        ffi::VA_RT_FORMAT_YUV420 => ChromaType::Yuv420,
        ffi::VA_RT_FORMAT_YUV422 => ChromaType::Yuv422,
        ffi::VA_RT_FORMAT_YUV444 => ChromaType::Yuv444,
        ffi::VA_RT_FORMAT_YUV411 => ChromaType::Yuv411,
        ffi::VA_RT_FORMAT_YUV400 => ChromaType::Yuv400,
        ffi::VA_RT_FORMAT_YUV420_10 => ChromaType::Yuv420P10,
        ffi::VA_RT_FORMAT_RGB32 => ChromaType::Rgb32,
        ffi::VA_RT_FORMAT_RGB16 => ChromaType::Rgb16,
        _ => return None,
    };
    Some(chroma)
}

// ---------------------------------------------------------------------------
// Negotiation
// ---------------------------------------------------------------------------

/// Backend codes for an explicit-format allocation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct NegotiatedFormat {
    pub format: VideoFormat,
    pub image_format: ImageFormat,
    pub chroma: ChromaType,
    pub rt_format: u32,
}

/// Resolve a chroma type to its RT format or fail.
pub fn negotiate_chroma(chroma: ChromaType) -> SurfaceResult<u32> {
    chroma_type_to_va(chroma).ok_or_else(|| {
        error!(chroma = %chroma, "unsupported chroma-type");
        SurfaceError::UnsupportedChromaType(chroma)
    })
}

/// Resolve a pixel format to its backend format, chroma type and RT format.
pub fn negotiate_format(format: VideoFormat) -> SurfaceResult<NegotiatedFormat> {
    let image_format = video_format_to_va(format).ok_or_else(|| {
        error!(format = %format, "unsupported format");
        SurfaceError::UnsupportedFormat(format)
    })?;
    let chroma = format.chroma_type().ok_or_else(|| {
        error!(format = %format, "format has no chroma type");
        SurfaceError::UnsupportedFormat(format)
    })?;
    let rt_format = negotiate_chroma(chroma)?;

    Ok(NegotiatedFormat {
        format,
        image_format,
        chroma,
        rt_format,
    })
}

// ---------------------------------------------------------------------------
// Flags and status
// ---------------------------------------------------------------------------

pub fn buffer_memory_type_to_va(memory: BufferMemoryType) -> u32 {
    match memory {
        BufferMemoryType::DmaBuf => ffi::VA_SURFACE_ATTRIB_MEM_TYPE_DRM_PRIME,
        BufferMemoryType::GemBuf => ffi::VA_SURFACE_ATTRIB_MEM_TYPE_KERNEL_DRM,
        BufferMemoryType::UserPtr => ffi::VA_SURFACE_ATTRIB_MEM_TYPE_USER_PTR,
        BufferMemoryType::Va => ffi::VA_SURFACE_ATTRIB_MEM_TYPE_VA,
    }
}

pub fn subpicture_flags_to_va(flags: SubpictureFlags) -> u32 {
    let mut va = 0;
    if flags.contains(SubpictureFlags::CHROMA_KEY) {
        va |= ffi::VA_SUBPICTURE_CHROMA_KEYING;
    }
    if flags.contains(SubpictureFlags::GLOBAL_ALPHA) {
        va |= ffi::VA_SUBPICTURE_GLOBAL_ALPHA;
    }
    if flags.contains(SubpictureFlags::SCREEN_COORDS) {
        va |= ffi::VA_SUBPICTURE_DESTINATION_IS_SCREEN_COORD;
    }
    va
}

/// Translate backend surface status bits. `Ready` (and no bits) is idle.
pub fn surface_status_from_va(va: u32) -> SurfaceStatus {
    let mut status = SurfaceStatus::IDLE;
    if va & ffi::VASurfaceRendering != 0 {
        status |= SurfaceStatus::RENDERING;
    }
    if va & ffi::VASurfaceDisplaying != 0 {
        status |= SurfaceStatus::DISPLAYING;
    }
    if va & ffi::VASurfaceSkipped != 0 {
        status |= SurfaceStatus::SKIPPED;
    }
    status
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_FORMATS: [VideoFormat; 17] = [
        VideoFormat::Nv12,
        VideoFormat::Yv12,
        VideoFormat::I420,
        VideoFormat::P010,
        VideoFormat::Yuy2,
        VideoFormat::Uyvy,
        VideoFormat::Ayuv,
        VideoFormat::Y444,
        VideoFormat::Gray8,
        VideoFormat::Rgba,
        VideoFormat::Bgra,
        VideoFormat::Argb,
        VideoFormat::Abgr,
        VideoFormat::Rgbx,
        VideoFormat::Bgrx,
        VideoFormat::Xrgb,
        VideoFormat::Xbgr,
    ];

    #[test]
    fn every_concrete_format_negotiates() {
        for format in ALL_FORMATS {
            let negotiated = negotiate_format(format).unwrap();
            assert_eq!(negotiated.format, format);
            assert_eq!(Some(negotiated.chroma), format.chroma_type());
            assert_eq!(va_to_video_format(&negotiated.image_format), Some(format));
        }
    }

    #[test]
    fn opaque_formats_are_rejected() {
        for format in [VideoFormat::Unknown, VideoFormat::Encoded] {
            assert!(matches!(
                negotiate_format(format),
                Err(SurfaceError::UnsupportedFormat(f)) if f == format
            ));
        }
    }

    #[test]
    fn yuv410_has_no_rt_format() {
        assert_eq!(chroma_type_to_va(ChromaType::Yuv410), None);
        assert!(matches!(
            negotiate_chroma(ChromaType::Yuv410),
            Err(SurfaceError::UnsupportedChromaType(ChromaType::Yuv410))
        ));
    }

    #[test]
    fn rt_format_reverse_lookup() {
        assert_eq!(va_to_chroma_type(ffi::VA_RT_FORMAT_YUV420_10), Some(ChromaType::Yuv420P10));
        assert_eq!(chroma_type_to_va(ChromaType::Rgb32), Some(ffi::VA_RT_FORMAT_RGB32));
        assert_eq!(va_to_chroma_type(0x8000_0000), None);
    }

    #[test]
    fn rgb_depth_follows_alpha() {
        assert_eq!(video_format_to_va(VideoFormat::Bgra).map(|f| f.depth), Some(32));
        assert_eq!(video_format_to_va(VideoFormat::Bgrx).map(|f| f.depth), Some(24));
    }

    #[test]
    fn memory_types() {
        assert_eq!(buffer_memory_type_to_va(BufferMemoryType::DmaBuf), 0x2000_0000);
        assert_eq!(buffer_memory_type_to_va(BufferMemoryType::GemBuf), 0x1000_0000);
    }

    #[test]
    fn subpicture_flag_bits() {
        assert_eq!(subpicture_flags_to_va(SubpictureFlags::empty()), 0);
        assert_eq!(
            subpicture_flags_to_va(SubpictureFlags::GLOBAL_ALPHA | SubpictureFlags::SCREEN_COORDS),
            ffi::VA_SUBPICTURE_GLOBAL_ALPHA | ffi::VA_SUBPICTURE_DESTINATION_IS_SCREEN_COORD
        );
    }

    #[test]
    fn status_bits() {
        assert_eq!(surface_status_from_va(ffi::VASurfaceReady), SurfaceStatus::IDLE);
        assert_eq!(
            surface_status_from_va(ffi::VASurfaceRendering | ffi::VASurfaceDisplaying),
            SurfaceStatus::RENDERING | SurfaceStatus::DISPLAYING
        );
        assert!(surface_status_from_va(ffi::VASurfaceSkipped).contains(SurfaceStatus::SKIPPED));
    }
}
