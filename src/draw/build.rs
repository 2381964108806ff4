use kurbo::Point;

use crate::{
    card::model::{Card, FieldAttrs},
    draw::primitive::{
        ColorPrim, ImagePrim, LinePrim, Primitive, TextAlign, TextBg, TextListPrim, TextPrim,
    },
    foundation::error::{CardError, CardResult},
    resolve::color::ColorSchemes,
    resolve::resolver::{FieldResolver, ResolvedValue},
    template::model::{
        FieldKind, FieldSpec, ImageSpec, KeyValListSpec, RowElement, Template, TextSpec,
    },
};

/// Font size used when a text field's data carries no `fontSz`.
const DEFAULT_FONT_SZ: f64 = 16.0;

/// Line color used when neither the line spec nor the field declares one.
const DEFAULT_LINE_COLOR: &str = "#000000";

/// Expands resolved field values into the flat ordered primitive list.
///
/// Two passes: first every `color-scheme` field is resolved into the scheme
/// map, then every other field is expanded in template-declared order with
/// all `$scheme.key` references replaced by literals.
pub struct DrawingDataBuilder<'a> {
    template: &'a Template,
    resolver: FieldResolver<'a>,
}

impl<'a> DrawingDataBuilder<'a> {
    /// Build a builder over the card and its template.
    pub fn new(template: &'a Template, card: &'a Card) -> Self {
        Self {
            template,
            resolver: FieldResolver::new(template, card),
        }
    }

    /// Produce the ordered drawing-primitive list for the whole card.
    ///
    /// Recomputes from current state on every call; two calls without an
    /// intervening mutation yield structurally identical lists.
    #[tracing::instrument(skip_all)]
    pub fn build(&self) -> CardResult<Vec<Primitive>> {
        let schemes = self.build_schemes();

        let mut out = Vec::new();
        for field in &self.template.fields {
            if matches!(field.kind, FieldKind::ColorScheme) {
                continue;
            }
            let value = self.resolver.resolve_field(field);
            out.extend(self.expand_field(field, &value, &schemes)?);
        }

        tracing::debug!(primitives = out.len(), "built drawing data");
        Ok(out)
    }

    /// Pass 1: resolve every `color-scheme` field into `schemeName -> colors`.
    pub fn build_schemes(&self) -> ColorSchemes {
        let mut schemes = ColorSchemes::default();
        for field in &self.template.fields {
            if !matches!(field.kind, FieldKind::ColorScheme) {
                continue;
            }
            let resolved = self.resolver.resolve_field(field);
            if let Some(colors) = resolved.as_single().colors.clone() {
                schemes.insert(field.id.clone(), colors);
            }
        }
        schemes
    }

    /// Expand one resolved field into zero or more primitives.
    pub fn expand_field(
        &self,
        field: &FieldSpec,
        value: &ResolvedValue,
        schemes: &ColorSchemes,
    ) -> CardResult<Vec<Primitive>> {
        let attrs = value.as_single();

        let mut out = match &field.kind {
            FieldKind::Color(rect) => {
                match attrs.color.as_deref().or(field.color.as_deref()) {
                    Some(color) => vec![Primitive::Color(ColorPrim {
                        rect: rect.to_rect(),
                        color: schemes.resolve(color)?,
                    })],
                    // No color resolved; nothing to paint.
                    None => Vec::new(),
                }
            }
            FieldKind::Line(line) => {
                let color = line
                    .color
                    .as_deref()
                    .or(field.color.as_deref())
                    .unwrap_or(DEFAULT_LINE_COLOR);
                vec![Primitive::Line(LinePrim {
                    from: line.geom.start(),
                    to: line.geom.end(),
                    width: line.width,
                    color: schemes.resolve(color)?,
                })]
            }
            FieldKind::Text(spec) | FieldKind::MultilineText(spec) => {
                self.text_prims(spec, field.color.as_deref(), attrs, schemes)?
            }
            FieldKind::LabeledText(spec) => {
                if self.resolver.resolved_value(&spec.label_for)?.has_text() {
                    self.text_prims(&spec.text, field.color.as_deref(), attrs, schemes)?
                } else {
                    // The labeled field is empty; suppress the label text.
                    Vec::new()
                }
            }
            FieldKind::Image(img) | FieldKind::LabeledChoiceImage(img) => {
                self.image_prims(&field.id, img, attrs, field.color.as_deref(), schemes)?
            }
            FieldKind::Icon(img) => match &attrs.url {
                Some(url) => vec![Primitive::Image(image_prim(&field.id, img, attrs, url))],
                None => Vec::new(),
            },
            FieldKind::TextIcon(spec) => {
                let mut prims = Vec::new();
                if let Some(url) = &attrs.url {
                    prims.push(Primitive::Image(image_prim(
                        &field.id, &spec.icon, attrs, url,
                    )));
                }
                let center = spec.icon.rect.center();
                prims.push(Primitive::Text(TextPrim {
                    origin: center,
                    text: attrs.text.clone().unwrap_or_default(),
                    font: resolve_font(&spec.text, attrs),
                    color: schemes.resolve(text_color(&spec.text, field.color.as_deref(), attrs))?,
                    prefix: None,
                    wrap_at: None,
                    align: TextAlign::Center,
                    bg: None,
                }));
                prims
            }
            FieldKind::MultiImage(spec) => {
                let present: Vec<&FieldAttrs> = value
                    .rows()
                    .iter()
                    .filter(|row| row.url.is_some())
                    .collect();
                if present.is_empty() {
                    Vec::new()
                } else {
                    let placements = spec.specs.get(present.len() - 1).ok_or_else(|| {
                        CardError::validation(format!(
                            "field '{}' has no placement row for {} images",
                            field.id,
                            present.len()
                        ))
                    })?;
                    placements
                        .iter()
                        .zip(present)
                        .map(|(placement, row)| {
                            let url = row.url.as_deref().unwrap_or_default();
                            Primitive::Image(image_prim(&field.id, placement, row, url))
                        })
                        .collect()
                }
            }
            FieldKind::KeyValList(spec) => {
                self.key_val_prims(field, spec, value, schemes)?
            }
            FieldKind::TextList(spec) => {
                let values: Vec<String> = value
                    .rows()
                    .iter()
                    .filter_map(|row| row.text.clone())
                    .filter(|t| !t.is_empty())
                    .collect();
                if values.is_empty() {
                    Vec::new()
                } else {
                    vec![Primitive::TextList(TextListPrim {
                        origin: Point::new(spec.text.x, spec.text.y),
                        font: resolve_font(&spec.text, attrs),
                        color: schemes
                            .resolve(text_color(&spec.text, field.color.as_deref(), attrs))?,
                        values,
                        y_incr: spec.y_incr,
                        separator: spec.separator.clone(),
                        wrap_at: spec.text.wrap_at,
                    })]
                }
            }
            FieldKind::ColorScheme => {
                return Err(CardError::unsupported_field_type(format!(
                    "field '{}' of type '{}' produces no primitives",
                    field.id,
                    field.kind.type_name()
                )));
            }
        };

        // Field label: extra text primitive when the spec declares a label
        // and the resolved value carries a label string.
        if let (Some(label_spec), Some(label)) = (&field.label, &attrs.label) {
            if !label.is_empty() {
                out.extend(self.text_prims(
                    label_spec,
                    field.color.as_deref(),
                    &FieldAttrs::with_text(label.clone()),
                    schemes,
                )?);
            }
        }

        Ok(out)
    }

    /// Text expansion shared by text fields, credits, key-val rows and labels.
    ///
    /// Emits at most two primitives: a standalone background rect (fixed-rect
    /// highlight form) followed by the text itself.
    fn text_prims(
        &self,
        spec: &TextSpec,
        field_color: Option<&str>,
        attrs: &FieldAttrs,
        schemes: &ColorSchemes,
    ) -> CardResult<Vec<Primitive>> {
        let mut out = Vec::new();
        let mut bg = None;

        if let (Some(bg_spec), Some(bg_color)) = (&spec.bg, &attrs.bg_color) {
            let color = schemes.resolve(bg_color)?;
            match bg_spec.x {
                Some(x) => {
                    // Fixed rect: the highlight does not depend on text extent.
                    let (y, width, height) =
                        match (bg_spec.y, bg_spec.width, bg_spec.height) {
                            (Some(y), Some(w), Some(h)) => (y, w, h),
                            _ => {
                                return Err(CardError::validation(
                                    "fixed text bg requires y, width and height",
                                ));
                            }
                        };
                    out.push(Primitive::Color(ColorPrim {
                        rect: kurbo::Rect::new(x, y, x + width, y + height),
                        color,
                    }));
                }
                None => {
                    // Width depends on measured text extent; defer to the renderer.
                    bg = Some(TextBg {
                        color,
                        h_pad: bg_spec.h_pad.unwrap_or(0.0),
                        v_pad: bg_spec.v_pad.unwrap_or(0.0),
                        height: bg_spec.height,
                    });
                }
            }
        }

        out.push(Primitive::Text(TextPrim {
            origin: Point::new(spec.x, spec.y),
            text: attrs.text.clone().unwrap_or_default(),
            font: resolve_font(spec, attrs),
            color: schemes.resolve(text_color(spec, field_color, attrs))?,
            prefix: spec.prefix.clone(),
            wrap_at: spec.wrap_at,
            align: spec.text_align.unwrap_or_default(),
            bg,
        }));

        Ok(out)
    }

    fn image_prims(
        &self,
        field_id: &str,
        img: &ImageSpec,
        attrs: &FieldAttrs,
        field_color: Option<&str>,
        schemes: &ColorSchemes,
    ) -> CardResult<Vec<Primitive>> {
        let mut out = Vec::new();

        if let (Some(credit_spec), Some(credit_attrs)) = (&img.credit, &attrs.credit) {
            out.extend(self.text_prims(credit_spec, field_color, credit_attrs, schemes)?);
        }

        if let Some(url) = &attrs.url {
            out.push(Primitive::Image(image_prim(field_id, img, attrs, url)));
        }

        Ok(out)
    }

    fn key_val_prims(
        &self,
        field: &FieldSpec,
        spec: &KeyValListSpec,
        value: &ResolvedValue,
        schemes: &ColorSchemes,
    ) -> CardResult<Vec<Primitive>> {
        let rows: Vec<&FieldAttrs> = value
            .rows()
            .iter()
            .filter(|row| row.has_text())
            .collect();

        let mut out = Vec::new();
        for (i, row) in rows.iter().enumerate() {
            let (dx, dy) = row_origin(field, spec, i)?;

            let color =
                schemes.resolve(spec.key_val.color.as_deref().or(field.color.as_deref()).unwrap_or(DEFAULT_LINE_COLOR))?;
            let font = spec
                .key_val
                .font
                .clone()
                .unwrap_or_else(|| format!("{}px", fmt_px(DEFAULT_FONT_SZ)));

            for (x, side) in [
                (spec.key_val.key_x, row.key.as_deref()),
                (spec.key_val.val_x, row.val.as_deref()),
            ] {
                out.push(Primitive::Text(TextPrim {
                    origin: Point::new(x + dx, spec.y + spec.key_val.y + dy),
                    text: side
                        .and_then(|s| s.text.clone())
                        .unwrap_or_default(),
                    font: font.clone(),
                    color: color.clone(),
                    prefix: None,
                    wrap_at: spec.key_val.wrap_at,
                    align: spec.key_val.text_align.unwrap_or_default(),
                    bg: None,
                }));
            }

            for element in &spec.additional_elements {
                match element {
                    RowElement::Line(line) => {
                        let geom = line.geom.shifted_y(dy);
                        let color = line
                            .color
                            .as_deref()
                            .or(field.color.as_deref())
                            .unwrap_or(DEFAULT_LINE_COLOR);
                        out.push(Primitive::Line(LinePrim {
                            from: Point::new(geom.start_x + dx, geom.start_y),
                            to: Point::new(geom.end_x + dx, geom.end_y),
                            width: line.width,
                            color: schemes.resolve(color)?,
                        }));
                    }
                    RowElement::Color(block) => {
                        let rect = block.rect.to_rect()
                            + kurbo::Vec2::new(dx, dy);
                        out.push(Primitive::Color(ColorPrim {
                            rect,
                            color: schemes.resolve(&block.color)?,
                        }));
                    }
                }
            }
        }

        Ok(out)
    }
}

/// Row offset relative to row 0: uniform single column via `yIncr`, or
/// multi-column via `colXs`/`perCol`.
fn row_origin(field: &FieldSpec, spec: &KeyValListSpec, index: usize) -> CardResult<(f64, f64)> {
    match (&spec.col_xs, spec.per_col) {
        (Some(col_xs), Some(per_col)) if per_col > 0 => {
            let col = index / per_col;
            let dx = *col_xs.get(col).ok_or_else(|| {
                CardError::validation(format!(
                    "field '{}' key-val rows exceed the column layout",
                    field.id
                ))
            })?;
            Ok((dx, (index % per_col) as f64 * spec.y_incr))
        }
        _ => Ok((0.0, index as f64 * spec.y_incr)),
    }
}

fn image_prim(field_id: &str, spec: &ImageSpec, attrs: &FieldAttrs, url: &str) -> ImagePrim {
    ImagePrim {
        field_id: spec.id.clone().unwrap_or_else(|| field_id.to_string()),
        rect: spec.rect.to_rect(),
        url: url.to_string(),
        pan_x: attrs.pan_x.unwrap_or(0.0),
        pan_y: attrs.pan_y.unwrap_or(0.0),
        zoom_level: attrs.zoom_level.unwrap_or(0.0),
        rotate: attrs.rotate.unwrap_or(0.0),
        flip_vert: attrs.flip_vert.unwrap_or(false),
        flip_horiz: attrs.flip_horiz.unwrap_or(false),
    }
}

/// Font string for a text run: data override, then the spec's complete font,
/// then `[fontStyle] <fontSz>px <fontFamily>` synthesis.
fn resolve_font(spec: &TextSpec, attrs: &FieldAttrs) -> String {
    if let Some(font) = attrs.font.as_deref().or(spec.font.as_deref()) {
        return font.to_string();
    }

    let mut parts = Vec::new();
    if let Some(style) = &spec.font_style {
        parts.push(style.clone());
    }
    parts.push(format!(
        "{}px",
        fmt_px(attrs.font_sz.unwrap_or(DEFAULT_FONT_SZ))
    ));
    if let Some(family) = &spec.font_family {
        parts.push(family.clone());
    }
    parts.join(" ")
}

fn text_color<'a>(
    spec: &'a TextSpec,
    field_color: Option<&'a str>,
    attrs: &'a FieldAttrs,
) -> &'a str {
    attrs
        .color
        .as_deref()
        .or(spec.color.as_deref())
        .or(field_color)
        .unwrap_or(DEFAULT_LINE_COLOR)
}

fn fmt_px(sz: f64) -> String {
    if sz.fract() == 0.0 {
        format!("{}", sz as i64)
    } else {
        format!("{sz}")
    }
}

#[cfg(test)]
#[path = "../../tests/unit/draw/build.rs"]
mod tests;
