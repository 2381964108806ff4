use std::sync::Arc;

use crate::{
    card::model::{Attr, AttrName, Card, ChoiceKey, ChoiceKeySel, FieldAttrs, FieldPayload},
    card::persist::CardPersistence,
    draw::build::DrawingDataBuilder,
    draw::primitive::Primitive,
    foundation::error::{CardError, CardResult},
    foundation::geom::RectGeom,
    resolve::resolver::{FieldResolver, ResolvedValue},
    template::model::{Choice, FieldKind, FieldSpec, Template},
    template::supplier::TemplateSupplier,
};

/// Which side of a key-val row a mutation addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyOrVal {
    /// The key side.
    Key,
    /// The value side.
    Val,
}

/// Mutable editing session over one card and its immutable template.
///
/// All card mutation goes through the wrapper, which validates field ids
/// against the template, keeps array writes within the field's `max`, and
/// tracks a dirty flag for the save cycle. Reads go through the same
/// resolution the drawing pass uses, so an editor always sees what would
/// be drawn.
pub struct CardWrapper {
    template: Arc<Template>,
    card: Card,
    dirty: bool,
}

impl CardWrapper {
    /// Open a card against the template it names, via the supplier.
    #[tracing::instrument(skip_all, fields(card_id = %card.id, template = %card.template_name))]
    pub fn open(card: Card, supplier: &dyn TemplateSupplier) -> CardResult<Self> {
        let template = supplier.template(
            &card.template_name,
            card.template_version.as_deref(),
            card.locale.as_deref(),
        )?;
        Ok(Self::from_parts(template, card))
    }

    /// Start a fresh, empty card on a template.
    pub fn create(
        card_id: impl Into<String>,
        template: Arc<Template>,
    ) -> Self {
        let mut card = Card::new(card_id, template.name.clone());
        card.template_version = template.version.clone();
        card.locale = template.locale.clone();
        Self::from_parts(template, card)
    }

    /// Wrap an already-matched card/template pair. Newly wrapped cards are
    /// clean.
    pub fn from_parts(template: Arc<Template>, card: Card) -> Self {
        Self {
            template,
            card,
            dirty: false,
        }
    }

    /// Deep copy of this editing session.
    ///
    /// The card is cloned, the template is shared, and the dirty flag is
    /// carried over unchanged.
    pub fn clone_wrapper(&self) -> CardWrapper {
        CardWrapper {
            template: Arc::clone(&self.template),
            card: self.card.clone(),
            dirty: self.dirty,
        }
    }

    /// The wrapped card document.
    pub fn card(&self) -> &Card {
        &self.card
    }

    /// The template this card resolves against.
    pub fn template(&self) -> &Template {
        &self.template
    }

    /// The card id.
    pub fn id(&self) -> &str {
        &self.card.id
    }

    /// Canvas width in pixels, from the template.
    pub fn width(&self) -> u32 {
        self.template.width
    }

    /// Canvas height in pixels, from the template.
    pub fn height(&self) -> u32 {
        self.template.height
    }

    /// True when the card has unsaved mutations.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Mark the card dirty without changing any data.
    pub fn force_dirty(&mut self) {
        self.dirty = true;
    }

    /// Fields exposed in the editor, in template order.
    pub fn editable_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.template.fields.iter().filter(|f| f.is_editable())
    }

    /// Fields expanded to image primitives, in template order.
    pub fn image_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.template.fields.iter().filter(|f| f.kind.is_image())
    }

    /// Destination rect of an image-typed field.
    ///
    /// Fails with [`CardError::InvalidField`] for non-image fields and for
    /// `multi-image` fields, whose placement depends on the image count.
    pub fn image_location(&self, field_id: &str) -> CardResult<RectGeom> {
        let field = self.template.field(field_id)?;
        match &field.kind {
            FieldKind::Image(img) | FieldKind::LabeledChoiceImage(img) | FieldKind::Icon(img) => {
                Ok(img.rect)
            }
            FieldKind::TextIcon(ti) => Ok(ti.icon.rect),
            _ => Err(CardError::invalid_field(format!(
                "field '{field_id}' has no single image location"
            ))),
        }
    }

    /// Choice list for a field: template-supplied first, then card-level.
    pub fn choices_for(&self, field_id: &str) -> Option<&[Choice]> {
        self.resolver().choices_for(field_id)
    }

    fn resolver(&self) -> FieldResolver<'_> {
        FieldResolver::new(&self.template, &self.card)
    }

    /// Canonical merged value for a field.
    pub fn resolved_value(&self, field_id: &str) -> CardResult<ResolvedValue> {
        self.resolver().resolved_value(field_id)
    }

    /// Read one resolved attribute of a scalar field.
    pub fn data_attr(&self, field_id: &str, name: AttrName) -> CardResult<Option<Attr>> {
        Ok(self.resolved_value(field_id)?.as_single().get(name))
    }

    /// Expand the card into its ordered drawing-primitive list.
    pub fn build_drawing_data(&self) -> CardResult<Vec<Primitive>> {
        DrawingDataBuilder::new(&self.template, &self.card).build()
    }

    /// Set one attribute on a scalar field's active data record.
    ///
    /// With a `userDataKey` indirection in effect the write lands in the
    /// referenced `userData` record; otherwise in the field's `value`
    /// override. Marks the card dirty even when the stored value did not
    /// change; a write is a write.
    pub fn set_data_attr(&mut self, field_id: &str, attr: Attr) -> CardResult<()> {
        self.write_scalar_attr(field_id, attr)?;
        self.dirty = true;
        Ok(())
    }

    /// Set one attribute without touching the dirty flag.
    ///
    /// Used when applying derived or imported values that should not force
    /// a save on their own.
    pub fn set_data_attr_not_dirty(&mut self, field_id: &str, attr: Attr) -> CardResult<()> {
        self.write_scalar_attr(field_id, attr)
    }

    fn write_scalar_attr(&mut self, field_id: &str, attr: Attr) -> CardResult<()> {
        let field = self.template.field(field_id)?;
        if field.kind.is_array() {
            return Err(CardError::invalid_field(format!(
                "field '{field_id}' is an array type; use set_array_attr"
            )));
        }

        // An active indirection redirects the write into the referenced
        // userData record; resolution reads the same record.
        let user_key = self
            .card
            .data
            .get(field_id)
            .and_then(|d| d.user_data_key.clone());
        let payload = match user_key {
            Some(key) => self
                .card
                .user_data
                .entry(field_id.to_string())
                .or_default()
                .entry(key)
                .or_insert_with(FieldPayload::default),
            None => self
                .card
                .data
                .entry(field_id.to_string())
                .or_default()
                .value
                .get_or_insert_with(FieldPayload::default),
        };

        let attrs = match payload {
            FieldPayload::Single(attrs) => attrs,
            FieldPayload::Many(_) => {
                return Err(CardError::invalid_field(format!(
                    "field '{field_id}' carries an array value"
                )));
            }
        };
        attrs.set(attr);
        Ok(())
    }

    /// Set one attribute on row `index` of an array field's override record.
    ///
    /// The first write allocates the full `max`-length row list with empty
    /// records; writing at or beyond the field's `max` fails.
    pub fn set_array_attr(&mut self, field_id: &str, index: usize, attr: Attr) -> CardResult<()> {
        let attrs = self.array_row_mut(field_id, index)?;
        attrs.set(attr);
        self.dirty = true;
        Ok(())
    }

    /// Set one attribute on the key or value side of a key-val row.
    pub fn set_key_val_attr(
        &mut self,
        field_id: &str,
        index: usize,
        side: KeyOrVal,
        attr: Attr,
    ) -> CardResult<()> {
        let attrs = self.array_row_mut(field_id, index)?;
        let slot = match side {
            KeyOrVal::Key => &mut attrs.key,
            KeyOrVal::Val => &mut attrs.val,
        };
        slot.get_or_insert_with(Default::default).set(attr);
        self.dirty = true;
        Ok(())
    }

    fn array_row_mut(&mut self, field_id: &str, index: usize) -> CardResult<&mut FieldAttrs> {
        let field = self.template.field(field_id)?;
        if !field.kind.is_array() {
            return Err(CardError::invalid_field(format!(
                "field '{field_id}' is not an array type"
            )));
        }
        let max = field.max.unwrap_or(0);
        if index >= max {
            return Err(CardError::validation(format!(
                "field '{field_id}' index {index} exceeds max {max}"
            )));
        }

        let data = self.card.data.entry(field_id.to_string()).or_default();
        let rows = match data
            .value
            .get_or_insert_with(|| FieldPayload::Many(Vec::new()))
        {
            FieldPayload::Many(rows) => rows,
            FieldPayload::Single(_) => {
                return Err(CardError::invalid_field(format!(
                    "field '{field_id}' carries a scalar value"
                )));
            }
        };
        if rows.len() < max {
            rows.resize_with(max, FieldAttrs::default);
        }
        Ok(&mut rows[index])
    }

    /// Select a choice for a scalar field.
    ///
    /// Selecting a choice wipes the field's explicit override and any
    /// `userDataKey` indirection; the choice becomes the only card-side
    /// contribution.
    pub fn set_choice_key(&mut self, field_id: &str, key: ChoiceKey) -> CardResult<()> {
        self.template.field(field_id)?;
        let data = self.card.data.entry(field_id.to_string()).or_default();
        data.value = None;
        data.user_data_key = None;
        data.choice_key = Some(ChoiceKeySel::One(key));
        self.dirty = true;
        Ok(())
    }

    /// Select per-index choices for an array field. `None` slots leave that
    /// index with no choice contribution. Wipes overrides like
    /// [`Self::set_choice_key`].
    pub fn set_choice_keys(
        &mut self,
        field_id: &str,
        keys: Vec<Option<ChoiceKey>>,
    ) -> CardResult<()> {
        let field = self.template.field(field_id)?;
        if !field.kind.is_array() {
            return Err(CardError::invalid_field(format!(
                "field '{field_id}' is not an array type"
            )));
        }
        if let Some(max) = field.max {
            if keys.len() > max {
                return Err(CardError::validation(format!(
                    "field '{field_id}' selection of {} exceeds max {max}",
                    keys.len()
                )));
            }
        }
        let data = self.card.data.entry(field_id.to_string()).or_default();
        data.value = None;
        data.user_data_key = None;
        data.choice_key = Some(ChoiceKeySel::Many(keys));
        self.dirty = true;
        Ok(())
    }

    /// Point a field at one of its `userData` records.
    ///
    /// Wipes the field's explicit override and choice selection first, like
    /// [`Self::set_choice_key`]; the indirection becomes the only active
    /// data source.
    pub fn set_user_data_ref(&mut self, field_id: &str, key: impl Into<String>) -> CardResult<()> {
        self.template.field(field_id)?;
        let data = self.card.data.entry(field_id.to_string()).or_default();
        data.value = None;
        data.choice_key = None;
        data.user_data_key = Some(key.into());
        self.dirty = true;
        Ok(())
    }

    /// Active `userData` record key for a field, if an indirection is set.
    pub fn user_data_ref(&self, field_id: &str) -> CardResult<Option<&str>> {
        self.template.field(field_id)?;
        Ok(self
            .card
            .data
            .get(field_id)
            .and_then(|d| d.user_data_key.as_deref()))
    }

    /// Currently selected choice key(s) for a field.
    pub fn choice_key(&self, field_id: &str) -> CardResult<Option<&ChoiceKeySel>> {
        self.template.field(field_id)?;
        Ok(self.card.data.get(field_id).and_then(|d| d.choice_key.as_ref()))
    }

    /// Write one attribute into a field's `userData` record.
    ///
    /// User data edits never touch the dirty flag; they are auxiliary
    /// payloads managed alongside the card, not card mutations.
    pub fn set_user_data_attr(
        &mut self,
        field_id: &str,
        user_key: &str,
        attr: Attr,
    ) -> CardResult<()> {
        self.template.field(field_id)?;
        let bucket = self
            .card
            .user_data
            .entry(field_id.to_string())
            .or_default();
        let payload = bucket
            .entry(user_key.to_string())
            .or_insert_with(FieldPayload::default);
        match payload {
            FieldPayload::Single(attrs) => {
                attrs.set(attr);
                Ok(())
            }
            FieldPayload::Many(_) => Err(CardError::invalid_field(format!(
                "user data '{user_key}' on field '{field_id}' carries an array value"
            ))),
        }
    }

    /// Drop all card-side data for a field, reverting it to template
    /// defaults.
    pub fn wipe_data(&mut self, field_id: &str) -> CardResult<()> {
        self.template.field(field_id)?;
        if self.card.data.remove(field_id).is_some() {
            self.dirty = true;
        }
        Ok(())
    }

    /// Persist the card and clear the dirty flag.
    ///
    /// On persistence failure the dirty flag stays set.
    #[tracing::instrument(skip_all, fields(card_id = %self.card.id))]
    pub fn save(&mut self, store: &dyn CardPersistence) -> CardResult<()> {
        store.save(&self.card)?;
        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/card/wrapper.rs"]
mod tests;
