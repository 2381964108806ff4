use std::collections::BTreeMap;

use crate::template::model::Choice;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// A mutable card document: per-field overrides layered on a template.
///
/// Cards are plain structured data (JSON-compatible). All mutation goes
/// through [`crate::CardWrapper`]; the document itself carries no behavior
/// beyond serde.
pub struct Card {
    /// Card identifier used as the persistence key.
    pub id: String,
    /// Name of the template this card is resolved against.
    pub template_name: String,
    /// Optional template version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_version: Option<String>,
    /// Optional locale qualifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Per-field override data.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub data: BTreeMap<String, FieldData>,
    /// Per-field auxiliary data buckets addressed via `userDataKey`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub user_data: BTreeMap<String, BTreeMap<String, FieldPayload>>,
    /// Card-level choice lists; the template's lists take priority.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub choices: BTreeMap<String, Vec<Choice>>,
}

impl Card {
    /// Create an empty card referencing a template.
    pub fn new(id: impl Into<String>, template_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            template_name: template_name.into(),
            template_version: None,
            locale: None,
            data: BTreeMap::new(),
            user_data: BTreeMap::new(),
            choices: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Per-field override record.
///
/// A field has exactly one active data-source mode at a time: an explicit
/// `value`, a `choiceKey` selection, or a `userDataKey` indirection (which
/// takes priority over both when present).
pub struct FieldData {
    /// Explicit value override (highest merge precedence).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FieldPayload>,
    /// Selected choice key(s).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choice_key: Option<ChoiceKeySel>,
    /// Key into the field's `userData` bucket; bypasses `value`/`choiceKey`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data_key: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
/// A field value: a scalar attribute record or an array of them.
///
/// Singular fields carry `Single`; list-typed fields (`key-val-list`,
/// `text-list`, `multi-image`) carry `Many`.
pub enum FieldPayload {
    /// Array value for list-typed fields.
    Many(Vec<FieldAttrs>),
    /// Scalar value for singular fields.
    Single(FieldAttrs),
}

impl Default for FieldPayload {
    fn default() -> Self {
        Self::Single(FieldAttrs::default())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
/// Choice key: JSON string or integer. `""` and `0` are valid keys; only an
/// absent/null key means "unset".
pub enum ChoiceKey {
    /// Integer key.
    Num(i64),
    /// String key.
    Str(String),
}

impl std::fmt::Display for ChoiceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChoiceKey::Num(n) => write!(f, "{n}"),
            ChoiceKey::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for ChoiceKey {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<i64> for ChoiceKey {
    fn from(n: i64) -> Self {
        Self::Num(n)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
/// Choice selection: a single key or, for list-typed fields, one key per
/// index with `null` entries for unresolved slots.
pub enum ChoiceKeySel {
    /// One key per array index; `None` slots contribute nothing.
    Many(Vec<Option<ChoiceKey>>),
    /// Single key.
    One(ChoiceKey),
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase", default)]
/// The attribute record all field values resolve to.
///
/// Every attribute is optional; a missing attribute after merge means "use
/// the type-specific default", never a drawing error. `key`/`val` carry the
/// nested sides of key-val rows, `colors` the named map of `color-scheme`
/// fields.
pub struct FieldAttrs {
    /// Text content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Complete font override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,
    /// Font size in pixels for synthesized fonts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_sz: Option<f64>,
    /// Color, literal or `$scheme.key`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Background highlight color for text fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_color: Option<String>,
    /// Image URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Horizontal pan passed through to the renderer untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan_x: Option<f64>,
    /// Vertical pan passed through to the renderer untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pan_y: Option<f64>,
    /// Zoom level passed through to the renderer untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zoom_level: Option<f64>,
    /// Rotation passed through to the renderer untouched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<f64>,
    /// Vertical flip flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip_vert: Option<bool>,
    /// Horizontal flip flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flip_horiz: Option<bool>,
    /// Label string drawn when the field spec declares a label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Credit sub-record for image fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit: Option<Box<FieldAttrs>>,
    /// Key side of a key-val row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<Box<FieldAttrs>>,
    /// Value side of a key-val row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub val: Option<Box<FieldAttrs>>,
    /// Named colors carried by `color-scheme` fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<BTreeMap<String, String>>,
}

impl FieldAttrs {
    /// Attribute record with only `text` set.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// True when no attribute is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when this record carries visible text, directly or on a
    /// key/val side. Drives `labeled-text` suppression.
    pub fn has_text(&self) -> bool {
        let direct = self.text.as_deref().is_some_and(|t| !t.is_empty());
        let side = |s: &Option<Box<FieldAttrs>>| {
            s.as_deref()
                .and_then(|a| a.text.as_deref())
                .is_some_and(|t| !t.is_empty())
        };
        direct || side(&self.key) || side(&self.val)
    }

    /// Merge `self` over `base`: every attribute set on `self` wins, missing
    /// attributes fall through to `base`. `key`/`val`/`credit` sub-records
    /// merge independently per side; `colors` merges per named key.
    pub fn merged_over(&self, base: &FieldAttrs) -> FieldAttrs {
        fn merge_sub(
            over: &Option<Box<FieldAttrs>>,
            base: &Option<Box<FieldAttrs>>,
        ) -> Option<Box<FieldAttrs>> {
            match (over, base) {
                (Some(o), Some(b)) => Some(Box::new(o.merged_over(b))),
                (Some(o), None) => Some(o.clone()),
                (None, Some(b)) => Some(b.clone()),
                (None, None) => None,
            }
        }

        let colors = match (&self.colors, &base.colors) {
            (Some(over), Some(under)) => {
                let mut merged = under.clone();
                merged.extend(over.iter().map(|(k, v)| (k.clone(), v.clone())));
                Some(merged)
            }
            (Some(over), None) => Some(over.clone()),
            (None, Some(under)) => Some(under.clone()),
            (None, None) => None,
        };

        FieldAttrs {
            text: self.text.clone().or_else(|| base.text.clone()),
            font: self.font.clone().or_else(|| base.font.clone()),
            font_sz: self.font_sz.or(base.font_sz),
            color: self.color.clone().or_else(|| base.color.clone()),
            bg_color: self.bg_color.clone().or_else(|| base.bg_color.clone()),
            url: self.url.clone().or_else(|| base.url.clone()),
            pan_x: self.pan_x.or(base.pan_x),
            pan_y: self.pan_y.or(base.pan_y),
            zoom_level: self.zoom_level.or(base.zoom_level),
            rotate: self.rotate.or(base.rotate),
            flip_vert: self.flip_vert.or(base.flip_vert),
            flip_horiz: self.flip_horiz.or(base.flip_horiz),
            label: self.label.clone().or_else(|| base.label.clone()),
            credit: merge_sub(&self.credit, &base.credit),
            key: merge_sub(&self.key, &base.key),
            val: merge_sub(&self.val, &base.val),
            colors,
        }
    }

    /// Set one attribute. Returns `true` when the stored value changed.
    pub fn set(&mut self, attr: Attr) -> bool {
        fn assign<T: PartialEq>(slot: &mut Option<T>, value: T) -> bool {
            if slot.as_ref() == Some(&value) {
                return false;
            }
            *slot = Some(value);
            true
        }

        match attr {
            Attr::Text(v) => assign(&mut self.text, v),
            Attr::Font(v) => assign(&mut self.font, v),
            Attr::FontSz(v) => assign(&mut self.font_sz, v),
            Attr::Color(v) => assign(&mut self.color, v),
            Attr::BgColor(v) => assign(&mut self.bg_color, v),
            Attr::Url(v) => assign(&mut self.url, v),
            Attr::PanX(v) => assign(&mut self.pan_x, v),
            Attr::PanY(v) => assign(&mut self.pan_y, v),
            Attr::ZoomLevel(v) => assign(&mut self.zoom_level, v),
            Attr::Rotate(v) => assign(&mut self.rotate, v),
            Attr::FlipVert(v) => assign(&mut self.flip_vert, v),
            Attr::FlipHoriz(v) => assign(&mut self.flip_horiz, v),
            Attr::Label(v) => assign(&mut self.label, v),
        }
    }

    /// Read one attribute by name.
    pub fn get(&self, name: AttrName) -> Option<Attr> {
        match name {
            AttrName::Text => self.text.clone().map(Attr::Text),
            AttrName::Font => self.font.clone().map(Attr::Font),
            AttrName::FontSz => self.font_sz.map(Attr::FontSz),
            AttrName::Color => self.color.clone().map(Attr::Color),
            AttrName::BgColor => self.bg_color.clone().map(Attr::BgColor),
            AttrName::Url => self.url.clone().map(Attr::Url),
            AttrName::PanX => self.pan_x.map(Attr::PanX),
            AttrName::PanY => self.pan_y.map(Attr::PanY),
            AttrName::ZoomLevel => self.zoom_level.map(Attr::ZoomLevel),
            AttrName::Rotate => self.rotate.map(Attr::Rotate),
            AttrName::FlipVert => self.flip_vert.map(Attr::FlipVert),
            AttrName::FlipHoriz => self.flip_horiz.map(Attr::FlipHoriz),
            AttrName::Label => self.label.clone().map(Attr::Label),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
/// A single settable field attribute with its value.
pub enum Attr {
    /// Text content.
    Text(String),
    /// Complete font override.
    Font(String),
    /// Font size in pixels.
    FontSz(f64),
    /// Color value.
    Color(String),
    /// Background highlight color.
    BgColor(String),
    /// Image URL.
    Url(String),
    /// Horizontal pan.
    PanX(f64),
    /// Vertical pan.
    PanY(f64),
    /// Zoom level.
    ZoomLevel(f64),
    /// Rotation.
    Rotate(f64),
    /// Vertical flip.
    FlipVert(bool),
    /// Horizontal flip.
    FlipHoriz(bool),
    /// Label string.
    Label(String),
}

impl Attr {
    /// Name of this attribute.
    pub fn name(&self) -> AttrName {
        match self {
            Attr::Text(_) => AttrName::Text,
            Attr::Font(_) => AttrName::Font,
            Attr::FontSz(_) => AttrName::FontSz,
            Attr::Color(_) => AttrName::Color,
            Attr::BgColor(_) => AttrName::BgColor,
            Attr::Url(_) => AttrName::Url,
            Attr::PanX(_) => AttrName::PanX,
            Attr::PanY(_) => AttrName::PanY,
            Attr::ZoomLevel(_) => AttrName::ZoomLevel,
            Attr::Rotate(_) => AttrName::Rotate,
            Attr::FlipVert(_) => AttrName::FlipVert,
            Attr::FlipHoriz(_) => AttrName::FlipHoriz,
            Attr::Label(_) => AttrName::Label,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Attribute names for typed reads.
#[allow(missing_docs)]
pub enum AttrName {
    Text,
    Font,
    FontSz,
    Color,
    BgColor,
    Url,
    PanX,
    PanY,
    ZoomLevel,
    Rotate,
    FlipVert,
    FlipHoriz,
    Label,
}

#[cfg(test)]
#[path = "../../tests/unit/card/model.rs"]
mod tests;
