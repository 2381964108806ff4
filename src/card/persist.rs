use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Mutex,
};

use crate::{
    card::model::Card,
    foundation::error::{CardError, CardResult},
};

/// Storage backend for card documents, keyed by card id.
///
/// The wrapper saves through this trait on demand; failures surface as
/// [`CardError::Persistence`] and leave the in-memory card untouched.
pub trait CardPersistence {
    /// Store a card, replacing any existing card with the same id.
    fn save(&self, card: &Card) -> CardResult<()>;

    /// Load a card by id.
    fn load(&self, card_id: &str) -> CardResult<Card>;

    /// Remove a card by id. Removing an absent id is not an error.
    fn delete(&self, card_id: &str) -> CardResult<()>;
}

/// Card store backed by a directory of `<id>.json` files.
pub struct JsonFilePersistence {
    dir: PathBuf,
}

impl JsonFilePersistence {
    /// Create a store rooted at `dir`. The directory must exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn card_path(&self, card_id: &str) -> CardResult<PathBuf> {
        // Card ids become file names; reject path separators outright.
        if card_id.is_empty() || card_id.contains(['/', '\\']) || card_id.contains("..") {
            return Err(CardError::persistence(format!(
                "card id '{card_id}' is not a valid storage key"
            )));
        }
        Ok(self.dir.join(format!("{card_id}.json")))
    }
}

impl CardPersistence for JsonFilePersistence {
    #[tracing::instrument(skip_all, fields(card_id = %card.id))]
    fn save(&self, card: &Card) -> CardResult<()> {
        let path = self.card_path(&card.id)?;
        let json = serde_json::to_vec_pretty(card)
            .map_err(|e| CardError::serde(format!("card '{}': {e}", card.id)))?;
        write_atomic(&path, &json)
            .map_err(|e| CardError::persistence(format!("writing {}: {e}", path.display())))
    }

    fn load(&self, card_id: &str) -> CardResult<Card> {
        let path = self.card_path(card_id)?;
        let bytes = std::fs::read(&path)
            .map_err(|e| CardError::persistence(format!("reading {}: {e}", path.display())))?;
        serde_json::from_slice(&bytes)
            .map_err(|e| CardError::serde(format!("card '{card_id}': {e}")))
    }

    fn delete(&self, card_id: &str) -> CardResult<()> {
        let path = self.card_path(card_id)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CardError::persistence(format!(
                "deleting {}: {e}",
                path.display()
            ))),
        }
    }
}

/// Write via a sibling temp file and rename so readers never observe a
/// partially written card.
fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}

/// In-memory card store for tests and ephemeral sessions.
#[derive(Default)]
pub struct InMemoryPersistence {
    cards: Mutex<BTreeMap<String, Card>>,
}

impl InMemoryPersistence {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored cards.
    pub fn len(&self) -> usize {
        self.cards.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// True when no cards are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CardPersistence for InMemoryPersistence {
    fn save(&self, card: &Card) -> CardResult<()> {
        self.cards
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(card.id.clone(), card.clone());
        Ok(())
    }

    fn load(&self, card_id: &str) -> CardResult<Card> {
        self.cards
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(card_id)
            .cloned()
            .ok_or_else(|| CardError::persistence(format!("no stored card '{card_id}'")))
    }

    fn delete(&self, card_id: &str) -> CardResult<()> {
        self.cards
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(card_id);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/card/persist.rs"]
mod tests;
