use std::collections::BTreeMap;

use kurbo::{Point, Rect};

use crate::{
    draw::primitive::{Primitive, TextAlign, TextListPrim, TextPrim},
    foundation::error::CardResult,
    render::fetch::{FetchedImage, ImageFetcher},
    render::surface::{DrawingSurface, ImagePlacement},
};

/// Height fallback for measured-extent highlights when the font string
/// carries no pixel size.
const FALLBACK_TEXT_HEIGHT: f64 = 16.0;

/// Paints a drawing-primitive list onto a [`DrawingSurface`].
///
/// All referenced images are fetched up front; nothing is painted until
/// every fetch has settled. A failed fetch skips that image primitive and
/// never aborts the card.
pub struct CardRenderer<'a> {
    fetcher: &'a dyn ImageFetcher,
}

impl<'a> CardRenderer<'a> {
    /// Create a renderer over an image source.
    pub fn new(fetcher: &'a dyn ImageFetcher) -> Self {
        Self { fetcher }
    }

    /// Paint the primitive list in order.
    #[tracing::instrument(skip_all, fields(primitives = primitives.len()))]
    pub fn render(
        &self,
        primitives: &[Primitive],
        surface: &mut dyn DrawingSurface,
    ) -> CardResult<()> {
        let images = self.fetch_all(primitives);

        for prim in primitives {
            match prim {
                Primitive::Color(p) => surface.fill_rect(p.rect, &p.color),
                Primitive::Line(p) => surface.stroke_line(p.from, p.to, p.width, &p.color),
                Primitive::Text(p) => draw_text(surface, p),
                Primitive::Image(p) => {
                    let Some(image) = images.get(&p.url) else {
                        continue;
                    };
                    surface.draw_image(
                        image,
                        &ImagePlacement {
                            rect: p.rect,
                            pan_x: p.pan_x,
                            pan_y: p.pan_y,
                            zoom_level: p.zoom_level,
                            rotate: p.rotate,
                            flip_vert: p.flip_vert,
                            flip_horiz: p.flip_horiz,
                        },
                    );
                }
                Primitive::TextList(p) => draw_text_list(surface, p),
            }
        }

        Ok(())
    }

    /// Fetch every unique image URL before painting starts.
    fn fetch_all(&self, primitives: &[Primitive]) -> BTreeMap<String, FetchedImage> {
        let mut images = BTreeMap::new();
        for prim in primitives {
            let Primitive::Image(p) = prim else {
                continue;
            };
            if images.contains_key(&p.url) {
                continue;
            }
            match self.fetcher.fetch(&p.url) {
                Ok(image) => {
                    images.insert(p.url.clone(), image);
                }
                Err(e) => {
                    tracing::warn!(url = %p.url, error = %e, "image fetch failed, skipping");
                }
            }
        }
        images
    }
}

fn draw_text(surface: &mut dyn DrawingSurface, prim: &TextPrim) {
    let text = match &prim.prefix {
        Some(prefix) => format!("{prefix}{}", prim.text),
        None => prim.text.clone(),
    };

    if let Some(bg) = &prim.bg {
        let measured = surface.measure_text(&text, &prim.font);
        let left = match prim.align {
            TextAlign::Left => prim.origin.x,
            TextAlign::Center => prim.origin.x - measured / 2.0,
            TextAlign::Right => prim.origin.x - measured,
        };
        let height = bg
            .height
            .or_else(|| parse_font_px(&prim.font))
            .unwrap_or(FALLBACK_TEXT_HEIGHT);
        // Origin is the text baseline; the highlight extends upward.
        surface.fill_rect(
            Rect::new(
                left - bg.h_pad,
                prim.origin.y - height - bg.v_pad,
                left + measured + bg.h_pad,
                prim.origin.y + bg.v_pad,
            ),
            &bg.color,
        );
    }

    surface.fill_text(
        prim.origin,
        &text,
        &prim.font,
        &prim.color,
        prim.align,
        prim.wrap_at,
    );
}

fn draw_text_list(surface: &mut dyn DrawingSurface, prim: &TextListPrim) {
    match &prim.separator {
        // Flow layout: one joined block, wrapped by the surface.
        Some(separator) => {
            let joined = prim.values.join(separator);
            surface.fill_text(
                prim.origin,
                &joined,
                &prim.font,
                &prim.color,
                TextAlign::Left,
                prim.wrap_at,
            );
        }
        // Row layout: one entry per row, stepping down by `y_incr`.
        None => {
            for (i, value) in prim.values.iter().enumerate() {
                let origin = Point::new(prim.origin.x, prim.origin.y + i as f64 * prim.y_incr);
                surface.fill_text(
                    origin,
                    value,
                    &prim.font,
                    &prim.color,
                    TextAlign::Left,
                    prim.wrap_at,
                );
            }
        }
    }
}

/// Pixel size from a font string, from its first `<n>px` token.
fn parse_font_px(font: &str) -> Option<f64> {
    font.split_whitespace()
        .find_map(|token| token.strip_suffix("px"))
        .and_then(|n| n.parse().ok())
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
