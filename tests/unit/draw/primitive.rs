use super::*;

#[test]
fn serializes_with_kebab_case_type_tags() {
    let prim = Primitive::Color(ColorPrim {
        rect: Rect::new(0.0, 0.0, 10.0, 10.0),
        color: "#112233".to_string(),
    });
    let json = serde_json::to_value(&prim).unwrap();
    assert_eq!(json["type"], "color");
    assert_eq!(json["color"], "#112233");

    let prim = Primitive::TextList(TextListPrim {
        origin: Point::new(5.0, 6.0),
        font: "14px Arial".to_string(),
        color: "#000000".to_string(),
        values: vec!["a".to_string()],
        y_incr: 18.0,
        separator: None,
        wrap_at: None,
    });
    let json = serde_json::to_value(&prim).unwrap();
    assert_eq!(json["type"], "text-list");
}

#[test]
fn text_align_round_trips_kebab_case() {
    assert_eq!(
        serde_json::to_value(TextAlign::Center).unwrap(),
        serde_json::json!("center")
    );
    let align: TextAlign = serde_json::from_value(serde_json::json!("right")).unwrap();
    assert_eq!(align, TextAlign::Right);
    assert_eq!(TextAlign::default(), TextAlign::Left);
}
