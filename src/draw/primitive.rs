use kurbo::{Point, Rect};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
/// A fully resolved, renderer-agnostic drawing instruction.
///
/// No further references remain: colors are literals and positions are
/// absolute canvas coordinates. A backend paints the list in order.
pub enum Primitive {
    /// Filled rectangle.
    Color(ColorPrim),
    /// Stroked line segment.
    Line(LinePrim),
    /// One run of text.
    Text(TextPrim),
    /// One placed image.
    Image(ImagePrim),
    /// A list of short text entries whose per-row layout is the renderer's.
    TextList(TextListPrim),
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Filled color block.
pub struct ColorPrim {
    /// Destination rect.
    pub rect: Rect,
    /// Literal color.
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Stroked line.
pub struct LinePrim {
    /// Start point.
    pub from: Point,
    /// End point.
    pub to: Point,
    /// Stroke width in pixels.
    pub width: f64,
    /// Literal color.
    pub color: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Horizontal text alignment relative to the origin.
pub enum TextAlign {
    /// Origin is the left edge.
    #[default]
    Left,
    /// Origin is the horizontal center.
    Center,
    /// Origin is the right edge.
    Right,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Deferred background highlight whose rect depends on measured text extent.
pub struct TextBg {
    /// Literal highlight color.
    pub color: String,
    /// Horizontal padding around the measured text.
    pub h_pad: f64,
    /// Vertical padding.
    pub v_pad: f64,
    /// Highlight height; the renderer falls back to the font size.
    pub height: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// One run of text at an absolute baseline origin.
pub struct TextPrim {
    /// Baseline origin.
    pub origin: Point,
    /// Text content.
    pub text: String,
    /// Complete font string (e.g. `"italic 20px Arial"`).
    pub font: String,
    /// Literal color.
    pub color: String,
    /// Literal prefix the renderer prepends.
    pub prefix: Option<String>,
    /// Wrap width in pixels, when the renderer should wrap.
    pub wrap_at: Option<f64>,
    /// Horizontal alignment.
    pub align: TextAlign,
    /// Measured-extent background highlight, drawn under the text.
    pub bg: Option<TextBg>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// One placed image. Pan/zoom/rotate/flip are carried untouched; the
/// cropping and transform math belongs to the rendering backend.
pub struct ImagePrim {
    /// Originating field (or placement entry) id.
    pub field_id: String,
    /// Destination rect.
    pub rect: Rect,
    /// Image URL to fetch.
    pub url: String,
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

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Filtered text entries plus the layout parameters the renderer applies.
pub struct TextListPrim {
    /// Baseline origin of the first row.
    pub origin: Point,
    /// Complete font string.
    pub font: String,
    /// Literal color.
    pub color: String,
    /// Non-empty entries in order.
    pub values: Vec<String>,
    /// Vertical distance between rows.
    pub y_incr: f64,
    /// Separator for single-block flow layout.
    pub separator: Option<String>,
    /// Wrap width in pixels.
    pub wrap_at: Option<f64>,
}

#[cfg(test)]
#[path = "../../tests/unit/draw/primitive.rs"]
mod tests;
