//! Video pixel formats and chroma types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Device-independent pixel format of a surface or image.
///
/// `Unknown` is the transient state of a surface created without an explicit
/// format; `Encoded` is the terminal fallback when the driver cannot tell us
/// what the surface actually holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VideoFormat {
    Unknown,
    Encoded,
    /// Y plane + interleaved UV at half resolution.
    Nv12,
    /// Planar 4:2:0, V plane before U.
    Yv12,
    /// Planar 4:2:0, U plane before V.
    I420,
    /// 10-bit NV12 variant in 16-bit containers.
    P010,
    /// Packed 4:2:2, Y0 U Y1 V.
    Yuy2,
    /// Packed 4:2:2, U Y0 V Y1.
    Uyvy,
    /// Packed 4:4:4 with alpha.
    Ayuv,
    /// Planar 4:4:4.
    Y444,
    /// Luma only.
    Gray8,
    Rgba,
    Bgra,
    Argb,
    Abgr,
    Rgbx,
    Bgrx,
    Xrgb,
    Xbgr,
}

impl VideoFormat {
    /// Chroma family a surface must be allocated with to hold this format.
    ///
    /// Returns `None` for `Unknown` and `Encoded`.
    pub fn chroma_type(self) -> Option<ChromaType> {
        let chroma = match self {
            Self::Unknown | Self::Encoded => return None,
            Self::Nv12 | Self::Yv12 | Self::I420 => ChromaType::Yuv420,
            Self::P010 => ChromaType::Yuv420P10,
            Self::Yuy2 | Self::Uyvy => ChromaType::Yuv422,
            Self::Ayuv | Self::Y444 => ChromaType::Yuv444,
            Self::Gray8 => ChromaType::Yuv400,
            Self::Rgba
            | Self::Bgra
            | Self::Argb
            | Self::Abgr
            | Self::Rgbx
            | Self::Bgrx
            | Self::Xrgb
            | Self::Xbgr => ChromaType::Rgb32,
        };
        Some(chroma)
    }

    /// Number of memory planes in the default layout.
    pub fn n_planes(self) -> u32 {
        match self {
            Self::Unknown | Self::Encoded => 0,
            Self::Nv12 | Self::P010 => 2,
            Self::Yv12 | Self::I420 | Self::Y444 => 3,
            _ => 1,
        }
    }

    pub fn is_yuv(self) -> bool {
        matches!(
            self,
            Self::Nv12
                | Self::Yv12
                | Self::I420
                | Self::P010
                | Self::Yuy2
                | Self::Uyvy
                | Self::Ayuv
                | Self::Y444
                | Self::Gray8
        )
    }

    pub fn is_rgb(self) -> bool {
        self.chroma_type() == Some(ChromaType::Rgb32)
    }

    /// Short upper-case name, as used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Encoded => "ENCODED",
            Self::Nv12 => "NV12",
            Self::Yv12 => "YV12",
            Self::I420 => "I420",
            Self::P010 => "P010",
            Self::Yuy2 => "YUY2",
            Self::Uyvy => "UYVY",
            Self::Ayuv => "AYUV",
            Self::Y444 => "Y444",
            Self::Gray8 => "GRAY8",
            Self::Rgba => "RGBA",
            Self::Bgra => "BGRA",
            Self::Argb => "ARGB",
            Self::Abgr => "ABGR",
            Self::Rgbx => "RGBx",
            Self::Bgrx => "BGRx",
            Self::Xrgb => "xRGB",
            Self::Xbgr => "xBGR",
        }
    }
}

impl fmt::Display for VideoFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Subsampling / plane-layout family a surface is allocated with,
/// independent of the exact pixel format.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChromaType {
    Yuv420,
    Yuv422,
    Yuv444,
    Yuv411,
    Yuv410,
    Yuv400,
    /// 4:2:0 with 10 bits per component.
    Yuv420P10,
    Rgb32,
    Rgb16,
}

impl fmt::Display for ChromaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Yuv420 => "YUV420",
            Self::Yuv422 => "YUV422",
            Self::Yuv444 => "YUV444",
            Self::Yuv411 => "YUV411",
            Self::Yuv410 => "YUV410",
            Self::Yuv400 => "YUV400",
            Self::Yuv420P10 => "YUV420_10BPP",
            Self::Rgb32 => "RGB32",
            Self::Rgb16 => "RGB16",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chroma_families() {
        assert_eq!(VideoFormat::Nv12.chroma_type(), Some(ChromaType::Yuv420));
        assert_eq!(VideoFormat::P010.chroma_type(), Some(ChromaType::Yuv420P10));
        assert_eq!(VideoFormat::Yuy2.chroma_type(), Some(ChromaType::Yuv422));
        assert_eq!(VideoFormat::Bgrx.chroma_type(), Some(ChromaType::Rgb32));
        assert_eq!(VideoFormat::Unknown.chroma_type(), None);
        assert_eq!(VideoFormat::Encoded.chroma_type(), None);
    }

    #[test]
    fn plane_counts() {
        assert_eq!(VideoFormat::Nv12.n_planes(), 2);
        assert_eq!(VideoFormat::I420.n_planes(), 3);
        assert_eq!(VideoFormat::Rgba.n_planes(), 1);
        assert_eq!(VideoFormat::Encoded.n_planes(), 0);
    }

    #[test]
    fn yuv_and_rgb_are_disjoint() {
        assert!(VideoFormat::Nv12.is_yuv());
        assert!(!VideoFormat::Nv12.is_rgb());
        assert!(VideoFormat::Argb.is_rgb());
        assert!(!VideoFormat::Argb.is_yuv());
        assert!(!VideoFormat::Unknown.is_yuv() && !VideoFormat::Unknown.is_rgb());
    }

    #[test]
    fn display_names() {
        assert_eq!(VideoFormat::Nv12.to_string(), "NV12");
        assert_eq!(ChromaType::Yuv420P10.to_string(), "YUV420_10BPP");
    }
}
