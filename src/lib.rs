//! Cardkit resolves user-editable card data against an immutable template
//! specification and produces a flat list of primitive drawing instructions
//! ready for a raster canvas backend.
//!
//! # Pipeline overview
//!
//! 1. **Wrap**: `Card + Template -> CardWrapper` (mutation façade with dirty tracking)
//! 2. **Resolve**: per field, merge spec default < resolved choice < card override
//!    into one canonical [`ResolvedValue`]
//! 3. **Build**: expand resolved values into ordered, fully resolved
//!    [`Primitive`] drawing instructions (colors resolved, positions absolute)
//! 4. **Render**: a [`DrawingSurface`] backend paints the primitive list;
//!    all referenced images are fetched before any primitive is drawn
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Pure resolution**: resolving and building are side-effect-free for a
//!   given card/template state; repeated calls yield identical output.
//! - **No IO in the core**: template supply, card persistence and image
//!   fetching live behind injected traits; image IO is front-loaded before
//!   painting starts.
//! - **Missing data never fails**: absent card data degrades to spec defaults;
//!   only an unknown field id or a malformed template is an error.
#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(missing_docs_in_private_items)]

mod card;
mod draw;
mod foundation;
mod render;
mod resolve;
mod template;

pub use card::model::{
    Attr, AttrName, Card, ChoiceKey, ChoiceKeySel, FieldAttrs, FieldData, FieldPayload,
};
pub use card::persist::{CardPersistence, InMemoryPersistence, JsonFilePersistence};
pub use card::wrapper::{CardWrapper, KeyOrVal};
pub use draw::build::DrawingDataBuilder;
pub use draw::primitive::{
    ColorPrim, ImagePrim, LinePrim, Primitive, TextAlign, TextBg, TextListPrim, TextPrim,
};
pub use foundation::error::{CardError, CardResult};
pub use foundation::geom::{LineGeom, RectGeom};
pub use render::fetch::{decode_image, FetchedImage, FsImageFetcher, ImageFetcher};
pub use render::renderer::CardRenderer;
pub use render::surface::{DrawingSurface, ImagePlacement};
pub use resolve::color::{parse_scheme_ref, ColorSchemes};
pub use resolve::resolver::{FieldResolver, ResolvedValue};
pub use template::model::{
    BgSpec, Choice, ColorElemSpec, FieldKind, FieldSpec, ImageSpec, KeyValListSpec, KeyValRowSpec,
    LabeledTextSpec, LineSpec, MultiImageSpec, RowElement, Template, TextIconSpec, TextListSpec,
    TextSpec,
};
pub use template::supplier::{FsTemplateSupplier, InMemoryTemplateSupplier, TemplateSupplier};
