use std::{
    collections::BTreeMap,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use crate::{
    foundation::error::{CardError, CardResult},
    template::model::Template,
};

/// Source of immutable templates, keyed by `(name, version, locale)`.
///
/// Suppliers hand out shared templates; a template is never mutated once
/// supplied, so one instance serves any number of concurrent cards.
pub trait TemplateSupplier {
    /// Fetch the template for a key, most specific match first.
    fn template(
        &self,
        name: &str,
        version: Option<&str>,
        locale: Option<&str>,
    ) -> CardResult<Arc<Template>>;
}

fn template_key(name: &str, version: Option<&str>, locale: Option<&str>) -> String {
    let mut key = name.to_string();
    if let Some(version) = version {
        key.push('.');
        key.push_str(version);
    }
    if let Some(locale) = locale {
        key.push('.');
        key.push_str(locale);
    }
    key
}

/// Key candidates from most to least specific. A versioned, localized
/// request falls back to the versioned then the bare template.
fn key_candidates(name: &str, version: Option<&str>, locale: Option<&str>) -> Vec<String> {
    let mut candidates = Vec::new();
    if version.is_some() && locale.is_some() {
        candidates.push(template_key(name, version, locale));
    }
    if version.is_some() {
        candidates.push(template_key(name, version, None));
    }
    candidates.push(template_key(name, None, None));
    candidates
}

/// Template supplier over a preloaded map. Registration validates.
#[derive(Default)]
pub struct InMemoryTemplateSupplier {
    templates: Mutex<BTreeMap<String, Arc<Template>>>,
}

impl InMemoryTemplateSupplier {
    /// Create an empty supplier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template under its own `(name, version, locale)` key.
    pub fn register(&self, template: Template) -> CardResult<()> {
        template.validate()?;
        let key = template_key(
            &template.name,
            template.version.as_deref(),
            template.locale.as_deref(),
        );
        self.templates
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, Arc::new(template));
        Ok(())
    }
}

impl TemplateSupplier for InMemoryTemplateSupplier {
    fn template(
        &self,
        name: &str,
        version: Option<&str>,
        locale: Option<&str>,
    ) -> CardResult<Arc<Template>> {
        let templates = self.templates.lock().unwrap_or_else(|e| e.into_inner());
        for key in key_candidates(name, version, locale) {
            if let Some(template) = templates.get(&key) {
                return Ok(Arc::clone(template));
            }
        }
        Err(CardError::template_not_found(template_key(
            name, version, locale,
        )))
    }
}

/// Template supplier over a directory of `<key>.json` documents, with a
/// cache so each file is read and validated once.
pub struct FsTemplateSupplier {
    dir: PathBuf,
    cache: Mutex<BTreeMap<String, Arc<Template>>>,
}

impl FsTemplateSupplier {
    /// Create a supplier rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    fn load(&self, key: &str) -> CardResult<Option<Arc<Template>>> {
        if let Some(cached) = self
            .cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
        {
            return Ok(Some(Arc::clone(cached)));
        }

        let path = self.dir.join(format!("{key}.json"));
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CardError::persistence(format!(
                    "reading {}: {e}",
                    path.display()
                )));
            }
        };

        let template: Template = serde_json::from_slice(&bytes)
            .map_err(|e| CardError::serde(format!("template '{key}': {e}")))?;
        template.validate()?;

        tracing::debug!(template = key, "loaded template");
        let template = Arc::new(template);
        self.cache
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key.to_string(), Arc::clone(&template));
        Ok(Some(template))
    }
}

impl TemplateSupplier for FsTemplateSupplier {
    #[tracing::instrument(skip(self))]
    fn template(
        &self,
        name: &str,
        version: Option<&str>,
        locale: Option<&str>,
    ) -> CardResult<Arc<Template>> {
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return Err(CardError::template_not_found(name));
        }
        for key in key_candidates(name, version, locale) {
            if let Some(template) = self.load(&key)? {
                return Ok(template);
            }
        }
        Err(CardError::template_not_found(template_key(
            name, version, locale,
        )))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/template/supplier.rs"]
mod tests;
