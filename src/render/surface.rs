use kurbo::{Point, Rect};

use crate::{draw::primitive::TextAlign, render::fetch::FetchedImage};

#[derive(Clone, Copy, Debug, PartialEq)]
/// Destination rect plus the view transform for one placed image.
///
/// The surface owns the cropping and transform math; the values arrive
/// untouched from the card data.
pub struct ImagePlacement {
    /// Destination rect on the canvas.
    pub rect: Rect,
    /// Horizontal pan.
    pub pan_x: f64,
    /// Vertical pan.
    pub pan_y: f64,
    /// Zoom level.
    pub zoom_level: f64,
    /// Rotation.
    pub rotate: f64,
    /// Vertical flip.
    pub flip_vert: bool,
    /// Horizontal flip.
    pub flip_horiz: bool,
}

/// Raster canvas backend the renderer paints primitives onto.
///
/// Text shaping, wrapping and image transforms live behind this trait; the
/// renderer only sequences draw calls and computes measured-extent
/// highlight rects from [`DrawingSurface::measure_text`].
pub trait DrawingSurface {
    /// Canvas width in pixels.
    fn width(&self) -> u32;

    /// Canvas height in pixels.
    fn height(&self) -> u32;

    /// Fill a rectangle with a literal color.
    fn fill_rect(&mut self, rect: Rect, color: &str);

    /// Stroke a line segment.
    fn stroke_line(&mut self, from: Point, to: Point, width: f64, color: &str);

    /// Draw one run of text at a baseline origin.
    ///
    /// `wrap_at` is the wrap width in pixels when the surface should break
    /// lines itself.
    fn fill_text(
        &mut self,
        origin: Point,
        text: &str,
        font: &str,
        color: &str,
        align: TextAlign,
        wrap_at: Option<f64>,
    );

    /// Measured advance width of `text` in `font`, in pixels.
    fn measure_text(&self, text: &str, font: &str) -> f64;

    /// Draw a fetched image under a placement transform.
    fn draw_image(&mut self, image: &FetchedImage, placement: &ImagePlacement);
}
