use std::collections::BTreeMap;

use crate::{
    card::model::{ChoiceKey, FieldAttrs, FieldPayload},
    foundation::error::{CardError, CardResult},
    foundation::geom::{LineGeom, RectGeom},
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// An immutable card template, keyed by (name, version, locale).
///
/// A template is a pure data model that can be:
/// - built programmatically (tests do this directly)
/// - serialized/deserialized via Serde (JSON)
///
/// It declares the card canvas dimensions and an ordered list of field
/// specifications. Cards referencing the template override field values; the
/// template never changes during an edit session.
pub struct Template {
    /// Template name referenced by cards.
    pub name: String,
    /// Optional template version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Optional locale qualifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Card canvas width in pixels.
    pub width: u32,
    /// Card canvas height in pixels.
    pub height: u32,
    /// Field specifications in declared drawing order.
    pub fields: Vec<FieldSpec>,
    /// Default choice lists per field id. Card-level choices fill gaps.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub choices: BTreeMap<String, Vec<Choice>>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Specification for one named, typed region of a card template.
pub struct FieldSpec {
    /// Field identifier, unique within the template.
    pub id: String,
    /// Field type plus type-specific geometry and sub-specs.
    #[serde(flatten)]
    pub kind: FieldKind,
    /// Editor-facing name. Presence marks the field editable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_label: Option<String>,
    /// Drawn label spec. When present and the resolved value carries a label
    /// string, an extra text primitive is emitted for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<TextSpec>,
    /// Field color, literal or a `$scheme.key` reference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Default value merged below choices and card overrides.
    #[serde(default, skip_serializing_if = "Option::is_none", rename = "value")]
    pub default: Option<FieldPayload>,
    /// Array capacity for list-typed fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

impl FieldSpec {
    /// True when this field is exposed in the card editor.
    pub fn is_editable(&self) -> bool {
        self.ui_label.is_some() || self.label.is_some()
    }
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
/// Field type tag plus the geometry/sub-specs relevant to that type.
///
/// The set of types is closed: an unknown `type` string fails at
/// deserialization time rather than surfacing later during drawing.
pub enum FieldKind {
    /// Filled color block at a fixed rect.
    Color(RectGeom),
    /// Named color mapping referenced elsewhere via `$scheme.key`. Produces no
    /// primitives itself.
    ColorScheme,
    /// Straight line between fixed endpoints. Carries no per-card data.
    Line(LineSpec),
    /// Single-line text.
    Text(TextSpec),
    /// Multi-line text. Same expansion as `text`; wrapping is the renderer's.
    MultilineText(TextSpec),
    /// Text that is suppressed when the field it labels resolves empty.
    LabeledText(LabeledTextSpec),
    /// Single raster image with optional credit line.
    Image(ImageSpec),
    /// Image selected from the field's choice list.
    LabeledChoiceImage(ImageSpec),
    /// Variable-count image set with per-count placement tables.
    MultiImage(MultiImageSpec),
    /// Rows of key/value text pairs.
    KeyValList(KeyValListSpec),
    /// List of short text entries laid out by the renderer.
    TextList(TextListSpec),
    /// Icon with a centered text label.
    TextIcon(TextIconSpec),
    /// Plain icon image.
    Icon(ImageSpec),
}

impl FieldKind {
    /// Stable type name matching the serde tag.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Color(_) => "color",
            FieldKind::ColorScheme => "color-scheme",
            FieldKind::Line(_) => "line",
            FieldKind::Text(_) => "text",
            FieldKind::MultilineText(_) => "multiline-text",
            FieldKind::LabeledText(_) => "labeled-text",
            FieldKind::Image(_) => "image",
            FieldKind::LabeledChoiceImage(_) => "labeled-choice-image",
            FieldKind::MultiImage(_) => "multi-image",
            FieldKind::KeyValList(_) => "key-val-list",
            FieldKind::TextList(_) => "text-list",
            FieldKind::TextIcon(_) => "text-icon",
            FieldKind::Icon(_) => "icon",
        }
    }

    /// True for field types whose resolved value is an array.
    pub fn is_array(&self) -> bool {
        matches!(
            self,
            FieldKind::MultiImage(_) | FieldKind::KeyValList(_) | FieldKind::TextList(_)
        )
    }

    /// True for field types expanded to image primitives.
    pub fn is_image(&self) -> bool {
        matches!(
            self,
            FieldKind::Image(_)
                | FieldKind::LabeledChoiceImage(_)
                | FieldKind::MultiImage(_)
                | FieldKind::TextIcon(_)
                | FieldKind::Icon(_)
        )
    }
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
/// Line field geometry and stroke width.
pub struct LineSpec {
    /// Endpoints in canvas coordinates.
    #[serde(flatten)]
    pub geom: LineGeom,
    /// Stroke width in pixels.
    pub width: f64,
    /// Stroke color, literal or `$scheme.key`. Falls back to the field color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Text placement and styling. Also used standalone for credit lines,
/// key-val rows and field labels.
pub struct TextSpec {
    /// Baseline x coordinate.
    pub x: f64,
    /// Baseline y coordinate.
    pub y: f64,
    /// Complete font string. When absent, the font is synthesized from
    /// `fontStyle`, the data's `fontSz` and `fontFamily`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Font family for synthesized fonts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Optional font style prefix (e.g. `italic`) for synthesized fonts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    /// Text color, literal or `$scheme.key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Literal prefix prepended by the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Wrap width in pixels; wrapping itself is the renderer's job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_at: Option<f64>,
    /// Horizontal alignment relative to the baseline origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<crate::draw::primitive::TextAlign>,
    /// Background highlight spec; only drawn when the data carries `bgColor`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<BgSpec>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Background highlight behind a text field.
///
/// With a fixed `x` (and size) the highlight is a standalone color primitive.
/// With only `hPad` the rect depends on measured text extent and is deferred
/// to the renderer via a `bg` descriptor on the text primitive.
pub struct BgSpec {
    /// Fixed left edge; presence selects the standalone-rect form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Fixed top edge for the standalone-rect form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Fixed width for the standalone-rect form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Highlight height. Defaults to the font size when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Horizontal padding around measured text for the deferred form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h_pad: Option<f64>,
    /// Vertical padding for the deferred form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub v_pad: Option<f64>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// `labeled-text` spec: text plus the id of the field it labels.
pub struct LabeledTextSpec {
    /// Text placement and styling.
    #[serde(flatten)]
    pub text: TextSpec,
    /// Field id whose resolved emptiness suppresses this text.
    pub label_for: String,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
/// Image placement with optional credit line.
pub struct ImageSpec {
    /// Identifier carried into the image primitive. Defaults to the owning
    /// field id; `multi-image` placement entries set their own.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Destination rect on the canvas.
    #[serde(flatten)]
    pub rect: RectGeom,
    /// Credit text spec drawn when the data carries credit text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit: Option<TextSpec>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// `multi-image` spec: placement tables indexed by image count.
pub struct MultiImageSpec {
    /// `specs[n-1]` is the placement row used when n images are present.
    pub specs: Vec<Vec<ImageSpec>>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// `key-val-list` layout: a repeated key/value row plus row decorations.
///
/// Two coordinate conventions coexist: `keyVal` positions are row-local and
/// combine with the list's base `y`, while `additionalElements` are authored
/// in absolute canvas coordinates for row 0. Both shift by the same per-row
/// offset.
pub struct KeyValListSpec {
    /// Base y coordinate of row 0.
    pub y: f64,
    /// Vertical distance between consecutive rows.
    pub y_incr: f64,
    /// Column base x offsets for multi-column layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub col_xs: Option<Vec<f64>>,
    /// Rows per column for multi-column layout. Requires `colXs`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_col: Option<usize>,
    /// Per-row key/value text spec.
    pub key_val: KeyValRowSpec,
    /// Decorations repeated for every emitted row (e.g. separator lines),
    /// in absolute canvas coordinates at row 0.
    #[serde(default, rename = "additionalElements", skip_serializing_if = "Vec::is_empty")]
    pub additional_elements: Vec<RowElement>,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Key/value row text placement shared by all rows of a `key-val-list`.
pub struct KeyValRowSpec {
    /// Key text x coordinate (row-local).
    pub key_x: f64,
    /// Value text x coordinate (row-local).
    pub val_x: f64,
    /// Row-local baseline y offset.
    #[serde(default)]
    pub y: f64,
    /// Font string for both key and value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Text color, literal or `$scheme.key`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Wrap width forwarded to the primitives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wrap_at: Option<f64>,
    /// Alignment forwarded to the primitives.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<crate::draw::primitive::TextAlign>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
/// A decoration repeated for each emitted key-val row.
pub enum RowElement {
    /// Separator line shifted with the row.
    Line(LineSpec),
    /// Color block shifted with the row.
    Color(ColorElemSpec),
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Color block row decoration.
pub struct ColorElemSpec {
    /// Block rect at row 0; shifted with each row.
    #[serde(flatten)]
    pub rect: RectGeom,
    /// Block color, literal or `$scheme.key`.
    pub color: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// `text-list` layout parameters. Per-row layout is deferred to the renderer.
#[serde(rename_all = "camelCase")]
pub struct TextListSpec {
    /// Text placement and styling shared by all entries.
    #[serde(flatten)]
    pub text: TextSpec,
    /// Vertical distance between rows when entries are drawn one per row.
    pub y_incr: f64,
    /// Separator inserted between entries when they flow as one block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separator: Option<String>,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// `text-icon` spec: icon box plus centered label styling.
pub struct TextIconSpec {
    /// Icon placement.
    pub icon: ImageSpec,
    /// Label styling; position is derived from the icon box center.
    pub text: TextSpec,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A predefined named alternative value set for a field.
pub struct Choice {
    /// Key selecting this choice. Empty string and `0` are valid keys.
    pub choice_key: ChoiceKey,
    /// Partial value merged between the spec default and the card override.
    #[serde(default)]
    pub value: FieldAttrs,
}

impl Template {
    /// Look up a field spec by id.
    ///
    /// An unknown field id is the one lookup that is an error; missing card
    /// data for a known field never is.
    pub fn field(&self, field_id: &str) -> CardResult<&FieldSpec> {
        self.fields
            .iter()
            .find(|f| f.id == field_id)
            .ok_or_else(|| CardError::invalid_field(field_id))
    }

    /// Choice list for a field, or `None` when the template supplies none.
    pub fn choices_for(&self, field_id: &str) -> Option<&[Choice]> {
        self.choices.get(field_id).map(Vec::as_slice)
    }

    /// Validate template invariants and per-field geometry.
    pub fn validate(&self) -> CardResult<()> {
        if self.name.trim().is_empty() {
            return Err(CardError::validation("template name must be non-empty"));
        }
        if self.width == 0 || self.height == 0 {
            return Err(CardError::validation("template width/height must be > 0"));
        }

        let mut seen = std::collections::BTreeSet::new();
        for field in &self.fields {
            if field.id.trim().is_empty() {
                return Err(CardError::validation("field id must be non-empty"));
            }
            if !seen.insert(field.id.as_str()) {
                return Err(CardError::validation(format!(
                    "duplicate field id '{}'",
                    field.id
                )));
            }
            field.validate()?;
        }

        for field_id in self.choices.keys() {
            if !self.fields.iter().any(|f| &f.id == field_id) {
                return Err(CardError::validation(format!(
                    "choices reference unknown field id '{field_id}'"
                )));
            }
        }

        Ok(())
    }
}

impl FieldSpec {
    fn validate(&self) -> CardResult<()> {
        let what = format!("field '{}'", self.id);

        if self.kind.is_array() {
            match self.max {
                Some(0) => {
                    return Err(CardError::validation(format!("{what} max must be > 0")));
                }
                None => {
                    return Err(CardError::validation(format!(
                        "{what} requires max for its array type"
                    )));
                }
                Some(_) => {}
            }
        }

        match &self.kind {
            FieldKind::Color(rect) => rect.validate(&what)?,
            FieldKind::ColorScheme => {}
            FieldKind::Line(line) => {
                line.geom.validate(&what)?;
                if !line.width.is_finite() || line.width <= 0.0 {
                    return Err(CardError::validation(format!(
                        "{what} line width must be finite and > 0"
                    )));
                }
            }
            FieldKind::Text(t) | FieldKind::MultilineText(t) => t.validate(&what)?,
            FieldKind::LabeledText(lt) => {
                lt.text.validate(&what)?;
                if lt.label_for.trim().is_empty() {
                    return Err(CardError::validation(format!(
                        "{what} labelFor must be non-empty"
                    )));
                }
            }
            FieldKind::Image(img) | FieldKind::LabeledChoiceImage(img) | FieldKind::Icon(img) => {
                img.validate(&what)?;
            }
            FieldKind::MultiImage(mi) => {
                if mi.specs.is_empty() {
                    return Err(CardError::validation(format!(
                        "{what} specs table must be non-empty"
                    )));
                }
                for (i, row) in mi.specs.iter().enumerate() {
                    if row.len() != i + 1 {
                        return Err(CardError::validation(format!(
                            "{what} specs row {i} must contain {} placements",
                            i + 1
                        )));
                    }
                    for img in row {
                        img.validate(&what)?;
                    }
                }
            }
            FieldKind::KeyValList(kv) => {
                if !kv.y_incr.is_finite() {
                    return Err(CardError::validation(format!(
                        "{what} yIncr must be finite"
                    )));
                }
                if kv.per_col.is_some() && kv.col_xs.is_none() {
                    return Err(CardError::validation(format!(
                        "{what} perCol requires colXs"
                    )));
                }
                if let Some(cols) = &kv.col_xs {
                    if cols.is_empty() {
                        return Err(CardError::validation(format!(
                            "{what} colXs must be non-empty"
                        )));
                    }
                }
            }
            FieldKind::TextList(tl) => {
                tl.text.validate(&what)?;
                if !tl.y_incr.is_finite() {
                    return Err(CardError::validation(format!(
                        "{what} yIncr must be finite"
                    )));
                }
            }
            FieldKind::TextIcon(ti) => {
                ti.icon.validate(&what)?;
                ti.text.validate(&what)?;
            }
        }

        Ok(())
    }
}

impl TextSpec {
    fn validate(&self, what: &str) -> CardResult<()> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(CardError::validation(format!("{what} x/y must be finite")));
        }
        Ok(())
    }
}

impl ImageSpec {
    fn validate(&self, what: &str) -> CardResult<()> {
        self.rect.validate(what)?;
        if let Some(credit) = &self.credit {
            credit.validate(what)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/model.rs"]
mod tests;
