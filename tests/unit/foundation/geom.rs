use super::*;

#[test]
fn rect_converts_to_absolute_corners() {
    let r = RectGeom {
        x: 10.0,
        y: 20.0,
        width: 30.0,
        height: 40.0,
    };
    let rect = r.to_rect();
    assert_eq!(rect.x0, 10.0);
    assert_eq!(rect.y0, 20.0);
    assert_eq!(rect.x1, 40.0);
    assert_eq!(rect.y1, 60.0);
    assert_eq!(r.center(), Point::new(25.0, 40.0));
}

#[test]
fn rect_rejects_non_finite_and_negative_size() {
    let bad = RectGeom {
        x: f64::NAN,
        ..RectGeom::default()
    };
    assert!(bad.validate("f").is_err());

    let neg = RectGeom {
        width: -1.0,
        ..RectGeom::default()
    };
    assert!(neg.validate("f").is_err());

    assert!(RectGeom::default().validate("f").is_ok());
}

#[test]
fn line_shifted_y_moves_both_endpoints() {
    let line = LineGeom {
        start_x: 1.0,
        start_y: 2.0,
        end_x: 3.0,
        end_y: 4.0,
    };
    let shifted = line.shifted_y(10.0);
    assert_eq!(shifted.start(), Point::new(1.0, 12.0));
    assert_eq!(shifted.end(), Point::new(3.0, 14.0));
}

#[test]
fn line_serde_uses_camel_case() {
    let line = LineGeom {
        start_x: 1.0,
        start_y: 2.0,
        end_x: 3.0,
        end_y: 4.0,
    };
    let json = serde_json::to_value(line).unwrap();
    assert_eq!(json["startX"], 1.0);
    assert_eq!(json["endY"], 4.0);
}
