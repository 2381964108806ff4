/// Convenience result type used across cardkit.
pub type CardResult<T> = Result<T, CardError>;

/// Top-level error taxonomy used by cardkit APIs.
#[derive(thiserror::Error, Debug)]
pub enum CardError {
    /// Unknown field id, or a type-checked accessor hit a field of another type.
    #[error("invalid field: {0}")]
    InvalidField(String),

    /// Drawing expansion encountered a field or row element it cannot expand.
    #[error("unsupported field type: {0}")]
    UnsupportedFieldType(String),

    /// Template supplier could not produce the requested template.
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// Card persistence failed; surfaced to the caller unmodified.
    #[error("persistence error: {0}")]
    Persistence(String),

    /// Image fetch failed. Downgraded to skip-and-continue during rendering.
    #[error("image fetch error: {0}")]
    ImageFetch(String),

    /// Inconsistent template or card data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing or deserializing documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardError {
    /// Build a [`CardError::InvalidField`] value.
    pub fn invalid_field(msg: impl Into<String>) -> Self {
        Self::InvalidField(msg.into())
    }

    /// Build a [`CardError::UnsupportedFieldType`] value.
    pub fn unsupported_field_type(msg: impl Into<String>) -> Self {
        Self::UnsupportedFieldType(msg.into())
    }

    /// Build a [`CardError::TemplateNotFound`] value.
    pub fn template_not_found(msg: impl Into<String>) -> Self {
        Self::TemplateNotFound(msg.into())
    }

    /// Build a [`CardError::Persistence`] value.
    pub fn persistence(msg: impl Into<String>) -> Self {
        Self::Persistence(msg.into())
    }

    /// Build a [`CardError::ImageFetch`] value.
    pub fn image_fetch(msg: impl Into<String>) -> Self {
        Self::ImageFetch(msg.into())
    }

    /// Build a [`CardError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`CardError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
