use crate::{
    card::model::{Card, ChoiceKey, ChoiceKeySel, FieldAttrs, FieldData, FieldPayload},
    foundation::error::CardResult,
    template::model::{Choice, FieldSpec, Template},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Canonical merged value for one field: an immutable snapshot.
///
/// Singular fields resolve to `Single`, list-typed fields (`key-val-list`,
/// `text-list`, `multi-image`) to `Many`. Repeated resolution of an
/// unmutated card yields an identical snapshot.
pub enum ResolvedValue {
    /// Scalar result.
    Single(FieldAttrs),
    /// Array result, one record per index.
    Many(Vec<FieldAttrs>),
}

impl ResolvedValue {
    /// Scalar view: the record itself, or the first array element.
    pub fn as_single(&self) -> &FieldAttrs {
        static EMPTY: std::sync::OnceLock<FieldAttrs> = std::sync::OnceLock::new();
        match self {
            ResolvedValue::Single(attrs) => attrs,
            ResolvedValue::Many(rows) => rows
                .first()
                .unwrap_or_else(|| EMPTY.get_or_init(FieldAttrs::default)),
        }
    }

    /// Array view: the rows, or the scalar as a one-element slice.
    pub fn rows(&self) -> &[FieldAttrs] {
        match self {
            ResolvedValue::Single(attrs) => std::slice::from_ref(attrs),
            ResolvedValue::Many(rows) => rows,
        }
    }

    /// True when the snapshot carries visible text anywhere.
    pub fn has_text(&self) -> bool {
        self.rows().iter().any(FieldAttrs::has_text)
    }
}

/// Pure per-field value resolution over current card + template state.
///
/// Merge precedence, lowest to highest: field spec default, resolved
/// choice(s), explicit card/user data override. Missing card data never
/// fails; only an unknown field id does.
pub struct FieldResolver<'a> {
    template: &'a Template,
    card: &'a Card,
}

impl<'a> FieldResolver<'a> {
    /// Build a resolver borrowing the card and its template.
    pub fn new(template: &'a Template, card: &'a Card) -> Self {
        Self { template, card }
    }

    /// Resolve a field's canonical value by id.
    ///
    /// Fails with [`crate::CardError::InvalidField`] when `field_id` is
    /// unknown in the template.
    pub fn resolved_value(&self, field_id: &str) -> CardResult<ResolvedValue> {
        let field = self.template.field(field_id)?;
        Ok(self.resolve_field(field))
    }

    /// Resolve a field's canonical value from its spec.
    pub fn resolve_field(&self, field: &FieldSpec) -> ResolvedValue {
        let data = self
            .card
            .data
            .get(&field.id)
            .cloned()
            .unwrap_or_else(FieldData::default);

        // userDataKey indirection bypasses the field's own value/choiceKey.
        let (override_payload, choice_sel) = match &data.user_data_key {
            Some(key) => (
                self.card
                    .user_data
                    .get(&field.id)
                    .and_then(|bucket| bucket.get(key))
                    .cloned(),
                None,
            ),
            None => (data.value.clone(), data.choice_key.clone()),
        };

        if field.kind.is_array() {
            ResolvedValue::Many(self.resolve_array(field, override_payload, choice_sel))
        } else {
            ResolvedValue::Single(self.resolve_single(field, override_payload, choice_sel))
        }
    }

    fn resolve_single(
        &self,
        field: &FieldSpec,
        override_payload: Option<FieldPayload>,
        choice_sel: Option<ChoiceKeySel>,
    ) -> FieldAttrs {
        let default = match &field.default {
            Some(FieldPayload::Single(attrs)) => attrs.clone(),
            Some(FieldPayload::Many(rows)) => rows.first().cloned().unwrap_or_default(),
            None => FieldAttrs::default(),
        };

        let choice = choice_sel
            .and_then(|sel| match sel {
                ChoiceKeySel::One(key) => Some(key),
                // A scalar field with an array selection uses the first slot.
                ChoiceKeySel::Many(keys) => keys.into_iter().next().flatten(),
            })
            .and_then(|key| self.choice_value(&field.id, &key))
            .unwrap_or_default();

        let override_attrs = match override_payload {
            Some(FieldPayload::Single(attrs)) => attrs,
            Some(FieldPayload::Many(rows)) => rows.into_iter().next().unwrap_or_default(),
            None => FieldAttrs::default(),
        };

        override_attrs.merged_over(&choice.merged_over(&default))
    }

    fn resolve_array(
        &self,
        field: &FieldSpec,
        override_payload: Option<FieldPayload>,
        choice_sel: Option<ChoiceKeySel>,
    ) -> Vec<FieldAttrs> {
        let choice_rows: Vec<FieldAttrs> = match choice_sel {
            Some(ChoiceKeySel::Many(keys)) => keys
                .into_iter()
                .map(|key| {
                    key.and_then(|k| self.choice_value(&field.id, &k))
                        .unwrap_or_default()
                })
                .collect(),
            Some(ChoiceKeySel::One(key)) => {
                vec![self.choice_value(&field.id, &key).unwrap_or_default()]
            }
            None => Vec::new(),
        };

        let override_rows: Vec<FieldAttrs> = match override_payload {
            Some(FieldPayload::Many(rows)) => rows,
            Some(FieldPayload::Single(attrs)) => vec![attrs],
            None => Vec::new(),
        };

        // Output length is the maximum of both sources; indices beyond one
        // source's length merge against empty records.
        let len = choice_rows.len().max(override_rows.len());
        let empty = FieldAttrs::default();

        (0..len)
            .map(|i| {
                let default = self.default_row(field, i);
                let choice = choice_rows.get(i).unwrap_or(&empty);
                let override_attrs = override_rows.get(i).unwrap_or(&empty);
                override_attrs.merged_over(&choice.merged_over(&default))
            })
            .collect()
    }

    fn default_row(&self, field: &FieldSpec, index: usize) -> FieldAttrs {
        match &field.default {
            // A scalar default applies to every index.
            Some(FieldPayload::Single(attrs)) => attrs.clone(),
            Some(FieldPayload::Many(rows)) => rows.get(index).cloned().unwrap_or_default(),
            None => FieldAttrs::default(),
        }
    }

    /// Choice list for a field: template-supplied first, then card-level.
    ///
    /// The slice borrows from the template or card, not the resolver.
    pub fn choices_for(&self, field_id: &str) -> Option<&'a [Choice]> {
        self.template
            .choices_for(field_id)
            .or_else(|| self.card.choices.get(field_id).map(Vec::as_slice))
    }

    fn choice_value(&self, field_id: &str, key: &ChoiceKey) -> Option<FieldAttrs> {
        // A key with no matching choice contributes nothing; it is not an error.
        self.choices_for(field_id)?
            .iter()
            .find(|c| &c.choice_key == key)
            .map(|c| c.value.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/resolver.rs"]
mod tests;
