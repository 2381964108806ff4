use super::*;

#[test]
fn merged_over_prefers_self_per_attribute() {
    let base = FieldAttrs {
        text: Some("base".to_string()),
        color: Some("#000000".to_string()),
        font_sz: Some(12.0),
        ..FieldAttrs::default()
    };
    let over = FieldAttrs {
        text: Some("over".to_string()),
        ..FieldAttrs::default()
    };

    let merged = over.merged_over(&base);
    assert_eq!(merged.text.as_deref(), Some("over"));
    assert_eq!(merged.color.as_deref(), Some("#000000"));
    assert_eq!(merged.font_sz, Some(12.0));
}

#[test]
fn merged_over_merges_key_val_sides_independently() {
    let base = FieldAttrs {
        key: Some(Box::new(FieldAttrs::with_text("HP"))),
        val: Some(Box::new(FieldAttrs {
            text: Some("10".to_string()),
            color: Some("#ff0000".to_string()),
            ..FieldAttrs::default()
        })),
        ..FieldAttrs::default()
    };
    let over = FieldAttrs {
        val: Some(Box::new(FieldAttrs::with_text("12"))),
        ..FieldAttrs::default()
    };

    let merged = over.merged_over(&base);
    assert_eq!(
        merged.key.as_deref().and_then(|k| k.text.as_deref()),
        Some("HP")
    );
    let val = merged.val.as_deref().unwrap();
    assert_eq!(val.text.as_deref(), Some("12"));
    assert_eq!(val.color.as_deref(), Some("#ff0000"));
}

#[test]
fn merged_over_merges_colors_per_named_key() {
    let mut base_colors = BTreeMap::new();
    base_colors.insert("primary".to_string(), "#111111".to_string());
    base_colors.insert("accent".to_string(), "#222222".to_string());
    let mut over_colors = BTreeMap::new();
    over_colors.insert("accent".to_string(), "#333333".to_string());

    let base = FieldAttrs {
        colors: Some(base_colors),
        ..FieldAttrs::default()
    };
    let over = FieldAttrs {
        colors: Some(over_colors),
        ..FieldAttrs::default()
    };

    let colors = over.merged_over(&base).colors.unwrap();
    assert_eq!(colors["primary"], "#111111");
    assert_eq!(colors["accent"], "#333333");
}

#[test]
fn set_reports_whether_the_value_changed() {
    let mut attrs = FieldAttrs::default();
    assert!(attrs.set(Attr::Text("a".to_string())));
    assert!(!attrs.set(Attr::Text("a".to_string())));
    assert!(attrs.set(Attr::Text("b".to_string())));
}

#[test]
fn get_round_trips_set() {
    let mut attrs = FieldAttrs::default();
    attrs.set(Attr::FontSz(20.0));
    assert_eq!(attrs.get(AttrName::FontSz), Some(Attr::FontSz(20.0)));
    assert_eq!(attrs.get(AttrName::Text), None);
}

#[test]
fn has_text_sees_key_val_sides() {
    assert!(!FieldAttrs::default().has_text());
    assert!(!FieldAttrs::with_text("").has_text());
    assert!(FieldAttrs::with_text("x").has_text());

    let kv = FieldAttrs {
        val: Some(Box::new(FieldAttrs::with_text("10"))),
        ..FieldAttrs::default()
    };
    assert!(kv.has_text());
}

#[test]
fn payload_array_json_parses_as_many() {
    let payload: FieldPayload =
        serde_json::from_value(serde_json::json!([{"text": "a"}, {"text": "b"}])).unwrap();
    assert!(matches!(payload, FieldPayload::Many(ref rows) if rows.len() == 2));

    let payload: FieldPayload = serde_json::from_value(serde_json::json!({"text": "a"})).unwrap();
    assert!(matches!(payload, FieldPayload::Single(_)));
}

#[test]
fn choice_key_accepts_string_and_integer() {
    let key: ChoiceKey = serde_json::from_value(serde_json::json!("fire")).unwrap();
    assert_eq!(key, ChoiceKey::from("fire"));

    let key: ChoiceKey = serde_json::from_value(serde_json::json!(0)).unwrap();
    assert_eq!(key, ChoiceKey::from(0));

    let sel: ChoiceKeySel =
        serde_json::from_value(serde_json::json!(["a", null, 2])).unwrap();
    match sel {
        ChoiceKeySel::Many(keys) => {
            assert_eq!(keys[0], Some(ChoiceKey::from("a")));
            assert_eq!(keys[1], None);
            assert_eq!(keys[2], Some(ChoiceKey::from(2)));
        }
        ChoiceKeySel::One(_) => panic!("expected a per-index selection"),
    }
}

#[test]
fn card_serde_uses_camel_case_and_skips_empty_maps() {
    let card = Card::new("c1", "poster");
    let json = serde_json::to_value(&card).unwrap();
    assert_eq!(json["templateName"], "poster");
    assert!(json.get("data").is_none());
    assert!(json.get("userData").is_none());
}

#[test]
fn field_data_serde_round_trips() {
    let data = FieldData {
        value: Some(FieldPayload::Single(FieldAttrs::with_text("hi"))),
        choice_key: Some(ChoiceKeySel::One(ChoiceKey::from("warm"))),
        user_data_key: Some("alt".to_string()),
    };
    let json = serde_json::to_string(&data).unwrap();
    let back: FieldData = serde_json::from_str(&json).unwrap();
    assert_eq!(back, data);
}
