//! Overlay composition input: rectangles of pixels placed on a surface.

use std::sync::Arc;

use vs_common::{Rectangle, VideoFormat};

use crate::display::Display;
use crate::error::SurfaceResult;
use crate::image::Image;
use crate::subpicture::{Subpicture, SubpictureFlags};

/// One overlay: a pixel block and where to render it.
#[derive(Clone, Debug)]
pub struct OverlayRectangle {
    render: Rectangle,
    format: VideoFormat,
    width: u32,
    height: u32,
    pixels: Arc<[u8]>,
    flags: SubpictureFlags,
    global_alpha: f32,
}

impl OverlayRectangle {
    /// `pixels` holds `width` x `height` pixels of `format` in the default
    /// layout; `render` is the placement on the destination surface.
    pub fn new(
        render: Rectangle,
        format: VideoFormat,
        width: u32,
        height: u32,
        pixels: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            render,
            format,
            width,
            height,
            pixels: pixels.into(),
            flags: SubpictureFlags::empty(),
            global_alpha: 1.0,
        }
    }

    /// Render with a constant alpha multiplier.
    pub fn with_global_alpha(mut self, alpha: f32) -> Self {
        self.flags |= SubpictureFlags::GLOBAL_ALPHA;
        self.global_alpha = alpha;
        self
    }

    /// Placement on the destination surface.
    pub fn render_rectangle(&self) -> Rectangle {
        self.render
    }

    pub fn format(&self) -> VideoFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn flags(&self) -> SubpictureFlags {
        self.flags
    }

    pub fn global_alpha(&self) -> f32 {
        self.global_alpha
    }

    /// Upload the pixels into a new image and wrap it in a subpicture.
    pub fn to_subpicture(&self, display: &Display) -> SurfaceResult<Arc<Subpicture>> {
        let image = Image::new(display, self.format, self.width, self.height)?;
        image.upload(&self.pixels)?;
        Subpicture::with_global_alpha(image, self.flags, self.global_alpha)
    }
}

/// Ordered list of overlay rectangles. Order is composition order.
#[derive(Clone, Debug, Default)]
pub struct OverlayComposition {
    rectangles: Vec<OverlayRectangle>,
}

impl OverlayComposition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rectangle: OverlayRectangle) {
        self.rectangles.push(rectangle);
    }

    pub fn n_rectangles(&self) -> usize {
        self.rectangles.len()
    }

    pub fn rectangle(&self, index: usize) -> Option<&OverlayRectangle> {
        self.rectangles.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &OverlayRectangle> {
        self.rectangles.iter()
    }
}

impl From<Vec<OverlayRectangle>> for OverlayComposition {
    fn from(rectangles: Vec<OverlayRectangle>) -> Self {
        Self { rectangles }
    }
}

impl FromIterator<OverlayRectangle> for OverlayComposition {
    fn from_iter<I: IntoIterator<Item = OverlayRectangle>>(iter: I) -> Self {
        Self {
            rectangles: iter.into_iter().collect(),
        }
    }
}
