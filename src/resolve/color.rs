use std::collections::BTreeMap;

use crate::foundation::error::{CardError, CardResult};

/// Parse a `$scheme.key` color-scheme reference.
///
/// Returns `(scheme, key)` for references, `None` for literal colors.
pub fn parse_scheme_ref(value: &str) -> Option<(&str, &str)> {
    let rest = value.strip_prefix('$')?;
    let (scheme, key) = rest.split_once('.')?;
    Some((scheme, key))
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
/// Computed color-scheme values: `schemeName -> {key -> literalColor}`.
///
/// Built once per drawing pass from the template's `color-scheme` fields,
/// then consulted for every color placed into a primitive.
pub struct ColorSchemes {
    schemes: BTreeMap<String, BTreeMap<String, String>>,
}

impl ColorSchemes {
    /// Register a resolved scheme under its field id.
    pub fn insert(&mut self, name: impl Into<String>, colors: BTreeMap<String, String>) {
        self.schemes.insert(name.into(), colors);
    }

    /// Resolve a color value to a literal.
    ///
    /// Literal values pass through unchanged. A `$scheme.key` reference is
    /// looked up; referencing an unknown scheme or key is a template/card
    /// mismatch and fails with a validation error.
    pub fn resolve(&self, value: &str) -> CardResult<String> {
        let Some((scheme, key)) = parse_scheme_ref(value) else {
            return Ok(value.to_string());
        };

        let colors = self.schemes.get(scheme).ok_or_else(|| {
            CardError::validation(format!("unknown color scheme '{scheme}' in '{value}'"))
        })?;
        colors.get(key).cloned().ok_or_else(|| {
            CardError::validation(format!("unknown color key '{key}' in scheme '{scheme}'"))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolve/color.rs"]
mod tests;
