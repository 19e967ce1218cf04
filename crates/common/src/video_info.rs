//! Video frame layout: format, dimensions, and per-plane strides/offsets.

use serde::{Deserialize, Serialize};

use crate::color::VideoFormat;
use crate::types::Resolution;

/// Maximum number of memory planes a frame layout can describe.
pub const MAX_PLANES: usize = 4;

/// Describes how a frame of a given format is laid out in memory.
///
/// [`VideoInfo::new`] fills in the default packed layout (rows padded to a
/// multiple of 4 bytes). Callers importing foreign memory override strides
/// and offsets with [`VideoInfo::with_plane`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoInfo {
    pub format: VideoFormat,
    pub width: u32,
    pub height: u32,
    pub n_planes: u32,
    pub strides: [u32; MAX_PLANES],
    pub offsets: [u32; MAX_PLANES],
    /// Total byte size of one frame.
    pub size: usize,
}

fn round_up_2(v: u32) -> Option<u32> {
    Some(v.checked_add(1)? & !1)
}

fn round_up_4(v: u32) -> Option<u32> {
    Some(v.checked_add(3)? & !3)
}

/// End of a plane starting at `offset` with `rows` rows of `stride` bytes.
fn plane_end(offset: u32, stride: u32, rows: u32) -> Option<usize> {
    (stride as usize)
        .checked_mul(rows as usize)?
        .checked_add(offset as usize)
}

impl VideoInfo {
    /// Default layout for `format` at `width` x `height`.
    ///
    /// Returns `None` when a stride or plane offset does not fit in `u32`, or
    /// the frame size does not fit in `usize`.
    pub fn new(format: VideoFormat, width: u32, height: u32) -> Option<Self> {
        let mut strides = [0u32; MAX_PLANES];
        let mut offsets = [0u32; MAX_PLANES];

        let size = match format {
            VideoFormat::Unknown | VideoFormat::Encoded => 0,
            VideoFormat::Nv12 | VideoFormat::P010 => {
                let bytes = if format == VideoFormat::P010 { 2 } else { 1 };
                let h = round_up_2(height)?;
                strides[0] = round_up_4(width.checked_mul(bytes)?)?;
                strides[1] = strides[0];
                offsets[1] = strides[0].checked_mul(h)?;
                plane_end(offsets[1], strides[1], h / 2)?
            }
            VideoFormat::I420 | VideoFormat::Yv12 => {
                let h = round_up_2(height)?;
                strides[0] = round_up_4(width)?;
                strides[1] = round_up_4(round_up_2(width)? / 2)?;
                strides[2] = strides[1];
                offsets[1] = strides[0].checked_mul(h)?;
                offsets[2] = offsets[1].checked_add(strides[1].checked_mul(h / 2)?)?;
                plane_end(offsets[2], strides[2], h / 2)?
            }
            VideoFormat::Y444 => {
                strides[0] = round_up_4(width)?;
                strides[1] = strides[0];
                strides[2] = strides[0];
                offsets[1] = strides[0].checked_mul(height)?;
                offsets[2] = offsets[1].checked_mul(2)?;
                plane_end(offsets[2], strides[2], height)?
            }
            VideoFormat::Gray8 => {
                strides[0] = round_up_4(width)?;
                plane_end(0, strides[0], height)?
            }
            VideoFormat::Yuy2 | VideoFormat::Uyvy => {
                strides[0] = round_up_4(width.checked_mul(2)?)?;
                plane_end(0, strides[0], height)?
            }
            _ => {
                strides[0] = width.checked_mul(4)?;
                plane_end(0, strides[0], height)?
            }
        };

        Some(Self {
            format,
            width,
            height,
            n_planes: format.n_planes(),
            strides,
            offsets,
            size,
        })
    }

    /// Override the stride and offset of plane `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`MAX_PLANES`].
    pub fn with_plane(mut self, index: usize, stride: u32, offset: u32) -> Self {
        assert!(index < MAX_PLANES, "plane index out of range");
        self.strides[index] = stride;
        self.offsets[index] = offset;
        self
    }

    /// Override the total frame size (e.g. when the foreign buffer is padded).
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }

    pub fn plane_stride(&self, index: usize) -> u32 {
        self.strides[index]
    }

    pub fn plane_offset(&self, index: usize) -> u32 {
        self.offsets[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nv12_default_layout() {
        let info = VideoInfo::new(VideoFormat::Nv12, 1920, 1080).unwrap();
        assert_eq!(info.n_planes, 2);
        assert_eq!(info.plane_stride(0), 1920);
        assert_eq!(info.plane_stride(1), 1920);
        assert_eq!(info.plane_offset(1), 1920 * 1080);
        assert_eq!(info.size, 1920 * 1080 + 1920 * 540);
    }

    #[test]
    fn odd_dimensions_are_padded() {
        let info = VideoInfo::new(VideoFormat::I420, 33, 17).unwrap();
        assert_eq!(info.plane_stride(0), 36);
        assert_eq!(info.plane_stride(1), 20);
        assert_eq!(info.plane_offset(1), 36 * 18);
        assert_eq!(info.plane_offset(2), 36 * 18 + 20 * 9);
        assert_eq!(info.size, 36 * 18 + 2 * 20 * 9);
    }

    #[test]
    fn packed_rgb_layout() {
        let info = VideoInfo::new(VideoFormat::Bgra, 64, 64).unwrap();
        assert_eq!(info.n_planes, 1);
        assert_eq!(info.plane_stride(0), 256);
        assert_eq!(info.size, 256 * 64);
    }

    #[test]
    fn plane_override() {
        let info = VideoInfo::new(VideoFormat::Nv12, 64, 64)
            .unwrap()
            .with_plane(0, 128, 0)
            .with_plane(1, 128, 128 * 64)
            .with_size(128 * 96);
        assert_eq!(info.plane_stride(0), 128);
        assert_eq!(info.plane_offset(1), 128 * 64);
        assert_eq!(info.size, 128 * 96);
        assert_eq!(info.resolution(), Resolution::new(64, 64));
    }

    #[test]
    #[should_panic(expected = "plane index out of range")]
    fn plane_override_out_of_range_panics() {
        let _ = VideoInfo::new(VideoFormat::Nv12, 16, 16).unwrap().with_plane(4, 0, 0);
    }

    #[test]
    fn oversized_layout_is_rejected() {
        // 50000 x 50000 fits a single plane but not three.
        assert!(VideoInfo::new(VideoFormat::Y444, 50000, 50000).is_none());
        assert!(VideoInfo::new(VideoFormat::Bgra, u32::MAX / 2, 2).is_none());
        assert!(VideoInfo::new(VideoFormat::Nv12, u32::MAX, 2).is_none());
        assert!(VideoInfo::new(VideoFormat::Gray8, 50000, 50000).is_some());
    }
}
