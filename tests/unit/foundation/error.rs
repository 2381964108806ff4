use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        CardError::invalid_field("x")
            .to_string()
            .contains("invalid field:")
    );
    assert!(
        CardError::unsupported_field_type("x")
            .to_string()
            .contains("unsupported field type:")
    );
    assert!(
        CardError::template_not_found("x")
            .to_string()
            .contains("template not found:")
    );
    assert!(
        CardError::persistence("x")
            .to_string()
            .contains("persistence error:")
    );
    assert!(
        CardError::image_fetch("x")
            .to_string()
            .contains("image fetch error:")
    );
    assert!(
        CardError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        CardError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = CardError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
