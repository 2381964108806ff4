use super::*;
use crate::foundation::error::CardError;
use crate::template::model::{FieldKind, KeyValListSpec, KeyValRowSpec, TextSpec};
use std::collections::BTreeMap;

fn text_field(id: &str, default: Option<FieldAttrs>) -> FieldSpec {
    FieldSpec {
        id: id.to_string(),
        kind: FieldKind::Text(TextSpec {
            x: 10.0,
            y: 20.0,
            ..TextSpec::default()
        }),
        ui_label: None,
        label: None,
        color: None,
        default: default.map(FieldPayload::Single),
        max: None,
    }
}

fn kv_field(id: &str, max: usize, default: Option<FieldPayload>) -> FieldSpec {
    FieldSpec {
        id: id.to_string(),
        kind: FieldKind::KeyValList(KeyValListSpec {
            y: 100.0,
            y_incr: 20.0,
            col_xs: None,
            per_col: None,
            key_val: KeyValRowSpec {
                key_x: 10.0,
                val_x: 120.0,
                ..KeyValRowSpec::default()
            },
            additional_elements: vec![],
        }),
        ui_label: None,
        label: None,
        color: None,
        default,
        max: Some(max),
    }
}

fn template(fields: Vec<FieldSpec>) -> Template {
    Template {
        name: "poster".to_string(),
        version: None,
        locale: None,
        width: 400,
        height: 600,
        fields,
        choices: BTreeMap::new(),
    }
}

fn kv_row(key: &str, val: &str) -> FieldAttrs {
    FieldAttrs {
        key: Some(Box::new(FieldAttrs::with_text(key))),
        val: Some(Box::new(FieldAttrs::with_text(val))),
        ..FieldAttrs::default()
    }
}

#[test]
fn missing_card_data_resolves_to_spec_default() {
    let default = FieldAttrs {
        text: Some("Untitled".to_string()),
        color: Some("#112233".to_string()),
        ..FieldAttrs::default()
    };
    let t = template(vec![text_field("title", Some(default))]);
    let card = Card::new("c1", "poster");

    let resolver = FieldResolver::new(&t, &card);
    let value = resolver.resolved_value("title").unwrap();
    assert_eq!(value.as_single().text.as_deref(), Some("Untitled"));
    assert_eq!(value.as_single().color.as_deref(), Some("#112233"));
}

#[test]
fn unknown_field_id_is_invalid_field() {
    let t = template(vec![]);
    let card = Card::new("c1", "poster");
    let resolver = FieldResolver::new(&t, &card);
    assert!(matches!(
        resolver.resolved_value("ghost"),
        Err(CardError::InvalidField(_))
    ));
}

#[test]
fn precedence_default_then_choice_then_override() {
    let default = FieldAttrs {
        text: Some("Default".to_string()),
        color: Some("#000001".to_string()),
        font: Some("16px Arial".to_string()),
        ..FieldAttrs::default()
    };
    let mut t = template(vec![text_field("title", Some(default))]);
    t.choices.insert(
        "title".to_string(),
        vec![Choice {
            choice_key: ChoiceKey::from("warm"),
            value: FieldAttrs {
                text: Some("Choice".to_string()),
                color: Some("#000002".to_string()),
                ..FieldAttrs::default()
            },
        }],
    );

    let mut card = Card::new("c1", "poster");
    card.data.insert(
        "title".to_string(),
        FieldData {
            value: Some(FieldPayload::Single(FieldAttrs::with_text("Override"))),
            choice_key: Some(ChoiceKeySel::One(ChoiceKey::from("warm"))),
            user_data_key: None,
        },
    );

    let resolver = FieldResolver::new(&t, &card);
    let value = resolver.resolved_value("title").unwrap();
    let attrs = value.as_single();
    // Override wins text, choice wins color, default fills the font.
    assert_eq!(attrs.text.as_deref(), Some("Override"));
    assert_eq!(attrs.color.as_deref(), Some("#000002"));
    assert_eq!(attrs.font.as_deref(), Some("16px Arial"));
}

#[test]
fn missing_choice_key_contributes_nothing() {
    let t = template(vec![text_field(
        "title",
        Some(FieldAttrs::with_text("Default")),
    )]);
    let mut card = Card::new("c1", "poster");
    card.data.insert(
        "title".to_string(),
        FieldData {
            choice_key: Some(ChoiceKeySel::One(ChoiceKey::from("ghost"))),
            ..FieldData::default()
        },
    );

    let resolver = FieldResolver::new(&t, &card);
    let value = resolver.resolved_value("title").unwrap();
    assert_eq!(value.as_single().text.as_deref(), Some("Default"));
}

#[test]
fn user_data_key_bypasses_value_and_choice() {
    let mut t = template(vec![text_field("title", None)]);
    t.choices.insert(
        "title".to_string(),
        vec![Choice {
            choice_key: ChoiceKey::from("warm"),
            value: FieldAttrs::with_text("Choice"),
        }],
    );

    let mut card = Card::new("c1", "poster");
    card.data.insert(
        "title".to_string(),
        FieldData {
            value: Some(FieldPayload::Single(FieldAttrs::with_text("Override"))),
            choice_key: Some(ChoiceKeySel::One(ChoiceKey::from("warm"))),
            user_data_key: Some("alt".to_string()),
        },
    );
    let mut bucket = BTreeMap::new();
    bucket.insert(
        "alt".to_string(),
        FieldPayload::Single(FieldAttrs::with_text("FromUserData")),
    );
    card.user_data.insert("title".to_string(), bucket);

    let resolver = FieldResolver::new(&t, &card);
    let value = resolver.resolved_value("title").unwrap();
    assert_eq!(value.as_single().text.as_deref(), Some("FromUserData"));
}

#[test]
fn dangling_user_data_key_falls_back_to_default() {
    let t = template(vec![text_field(
        "title",
        Some(FieldAttrs::with_text("Default")),
    )]);
    let mut card = Card::new("c1", "poster");
    card.data.insert(
        "title".to_string(),
        FieldData {
            value: Some(FieldPayload::Single(FieldAttrs::with_text("Override"))),
            choice_key: None,
            user_data_key: Some("missing".to_string()),
        },
    );

    let resolver = FieldResolver::new(&t, &card);
    let value = resolver.resolved_value("title").unwrap();
    // The indirection is active, so the explicit override is bypassed even
    // though the bucket entry is absent.
    assert_eq!(value.as_single().text.as_deref(), Some("Default"));
}

#[test]
fn array_length_is_max_of_choice_and_override_rows() {
    let mut t = template(vec![kv_field("stats", 6, None)]);
    t.choices.insert(
        "stats".to_string(),
        vec![
            Choice {
                choice_key: ChoiceKey::from("hp"),
                value: kv_row("HP", "10"),
            },
            Choice {
                choice_key: ChoiceKey::from("mp"),
                value: kv_row("MP", "4"),
            },
        ],
    );

    let mut card = Card::new("c1", "poster");
    card.data.insert(
        "stats".to_string(),
        FieldData {
            value: Some(FieldPayload::Many(vec![FieldAttrs {
                val: Some(Box::new(FieldAttrs::with_text("12"))),
                ..FieldAttrs::default()
            }])),
            choice_key: Some(ChoiceKeySel::Many(vec![
                Some(ChoiceKey::from("hp")),
                None,
                Some(ChoiceKey::from("mp")),
            ])),
            user_data_key: None,
        },
    );

    let resolver = FieldResolver::new(&t, &card);
    let value = resolver.resolved_value("stats").unwrap();
    let rows = value.rows();
    assert_eq!(rows.len(), 3);

    // Index 0: choice row with the value side overridden.
    assert_eq!(
        rows[0].key.as_deref().and_then(|k| k.text.as_deref()),
        Some("HP")
    );
    assert_eq!(
        rows[0].val.as_deref().and_then(|v| v.text.as_deref()),
        Some("12")
    );
    // Index 1: null slot, no contribution.
    assert!(rows[1].is_empty());
    // Index 2: choice only.
    assert_eq!(
        rows[2].key.as_deref().and_then(|k| k.text.as_deref()),
        Some("MP")
    );
}

#[test]
fn scalar_default_broadcasts_across_array_indices() {
    let default = FieldPayload::Single(FieldAttrs {
        color: Some("#555555".to_string()),
        ..FieldAttrs::default()
    });
    let t = template(vec![kv_field("stats", 6, Some(default))]);

    let mut card = Card::new("c1", "poster");
    card.data.insert(
        "stats".to_string(),
        FieldData {
            value: Some(FieldPayload::Many(vec![
                kv_row("HP", "10"),
                kv_row("MP", "4"),
            ])),
            ..FieldData::default()
        },
    );

    let resolver = FieldResolver::new(&t, &card);
    let value = resolver.resolved_value("stats").unwrap();
    for row in value.rows() {
        assert_eq!(row.color.as_deref(), Some("#555555"));
    }
}

#[test]
fn per_index_defaults_apply_by_position() {
    let default = FieldPayload::Many(vec![kv_row("HP", "10"), kv_row("MP", "4")]);
    let t = template(vec![kv_field("stats", 6, Some(default))]);
    let card = Card::new("c1", "poster");

    let resolver = FieldResolver::new(&t, &card);
    // With no card data the resolver has no row count to work from; defaults
    // alone do not expand an array field.
    let value = resolver.resolved_value("stats").unwrap();
    assert!(value.rows().is_empty());

    let mut card = Card::new("c2", "poster");
    card.data.insert(
        "stats".to_string(),
        FieldData {
            value: Some(FieldPayload::Many(vec![
                FieldAttrs::default(),
                FieldAttrs {
                    val: Some(Box::new(FieldAttrs::with_text("6"))),
                    ..FieldAttrs::default()
                },
            ])),
            ..FieldData::default()
        },
    );
    let resolver = FieldResolver::new(&t, &card);
    let value = resolver.resolved_value("stats").unwrap();
    let rows = value.rows();
    assert_eq!(
        rows[0].key.as_deref().and_then(|k| k.text.as_deref()),
        Some("HP")
    );
    assert_eq!(
        rows[1].val.as_deref().and_then(|v| v.text.as_deref()),
        Some("6")
    );
}

#[test]
fn repeated_resolution_is_identical() {
    let t = template(vec![text_field(
        "title",
        Some(FieldAttrs::with_text("Default")),
    )]);
    let card = Card::new("c1", "poster");
    let resolver = FieldResolver::new(&t, &card);
    assert_eq!(
        resolver.resolved_value("title").unwrap(),
        resolver.resolved_value("title").unwrap()
    );
}

#[test]
fn card_level_choices_fill_template_gaps() {
    let t = template(vec![text_field("title", None)]);
    let mut card = Card::new("c1", "poster");
    card.choices.insert(
        "title".to_string(),
        vec![Choice {
            choice_key: ChoiceKey::from(1),
            value: FieldAttrs::with_text("FromCard"),
        }],
    );
    card.data.insert(
        "title".to_string(),
        FieldData {
            choice_key: Some(ChoiceKeySel::One(ChoiceKey::from(1))),
            ..FieldData::default()
        },
    );

    let resolver = FieldResolver::new(&t, &card);
    let value = resolver.resolved_value("title").unwrap();
    assert_eq!(value.as_single().text.as_deref(), Some("FromCard"));
}
