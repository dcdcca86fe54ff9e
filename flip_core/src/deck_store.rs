//! File-backed progress store with file locking.
//!
//! Each deck lives in one JSON file under `<data_dir>/decks/`, holding the
//! cards together with their persisted review status and next-review
//! timestamp. Reads take a shared lock; saves are written to a temp file,
//! synced, then renamed over the original so concurrent processes never
//! observe a half-written deck.
//!
//! Unlike tolerant config loading, a corrupted or unreadable deck file is
//! an error here: silently starting an empty session would look like the
//! user finished the deck.

use crate::{
    CardId, Error, ProgressStore, Result, ReviewCard, ReviewStatus,
};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// One card's persisted record inside a deck file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeckEntry {
    pub card: ReviewCard,
    #[serde(default)]
    pub chapter_id: Option<String>,
    pub status: ReviewStatus,
    #[serde(default)]
    pub next_review_at: Option<DateTime<Utc>>,
}

/// On-disk format of a deck file
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeckFile {
    pub deck_id: String,
    pub cards: Vec<DeckEntry>,
}

impl DeckFile {
    pub fn new(deck_id: &str) -> Self {
        Self {
            deck_id: deck_id.to_string(),
            cards: Vec::new(),
        }
    }

    /// Load a deck from a file with shared locking
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        file.unlock()?;
        read_result?;

        let deck: DeckFile = serde_json::from_str(&contents)
            .map_err(|e| Error::Store(format!("Corrupted deck file {:?}: {}", path, e)))?;
        tracing::debug!("Loaded deck {} ({} cards)", deck.deck_id, deck.cards.len());
        Ok(deck)
    }

    /// Save the deck atomically with exclusive locking
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent = path
            .parent()
            .ok_or_else(|| Error::Store("deck path missing parent".into()))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            serde_json::to_writer(&mut writer, self)?;
            std::io::Write::flush(&mut writer)?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved deck {} to {:?}", self.deck_id, path);
        Ok(())
    }
}

/// Progress store over a directory of deck files.
///
/// Deck files are loaded into memory on open; status writes mutate the
/// in-memory copy and immediately re-save the owning deck file.
pub struct JsonDeckStore {
    decks_dir: PathBuf,
    decks: HashMap<String, DeckFile>,
    // Which deck owns each card, for status writes
    card_index: HashMap<CardId, String>,
}

impl JsonDeckStore {
    /// Open the store rooted at a data directory, loading every
    /// `decks/*.json` file found there
    pub fn open(data_dir: &Path) -> Result<Self> {
        let decks_dir = data_dir.join("decks");
        std::fs::create_dir_all(&decks_dir)?;

        let mut decks = HashMap::new();
        let mut card_index = HashMap::new();

        for entry in std::fs::read_dir(&decks_dir)? {
            let path = entry?.path();
            if path.extension().map_or(true, |ext| ext != "json") {
                continue;
            }

            let deck = DeckFile::load(&path)?;
            for card_entry in &deck.cards {
                card_index.insert(card_entry.card.id, deck.deck_id.clone());
            }
            decks.insert(deck.deck_id.clone(), deck);
        }

        tracing::info!("Opened deck store with {} decks", decks.len());
        Ok(Self {
            decks_dir,
            decks,
            card_index,
        })
    }

    /// Create or replace a deck and persist it immediately
    pub fn put_deck(&mut self, deck: DeckFile) -> Result<()> {
        deck.save(&self.deck_path(&deck.deck_id))?;
        for entry in &deck.cards {
            self.card_index.insert(entry.card.id, deck.deck_id.clone());
        }
        self.decks.insert(deck.deck_id.clone(), deck);
        Ok(())
    }

    pub fn deck_ids(&self) -> Vec<&str> {
        self.decks.keys().map(String::as_str).collect()
    }

    pub fn get_deck(&self, deck_id: &str) -> Option<&DeckFile> {
        self.decks.get(deck_id)
    }

    fn deck_path(&self, deck_id: &str) -> PathBuf {
        self.decks_dir.join(format!("{}.json", deck_id))
    }
}

impl ProgressStore for JsonDeckStore {
    fn fetch_due_cards(&self, deck_id: &str, chapter_id: Option<&str>) -> Result<Vec<ReviewCard>> {
        let deck = self
            .decks
            .get(deck_id)
            .ok_or_else(|| Error::Store(format!("Unknown deck: {}", deck_id)))?;

        let now = Utc::now();
        Ok(deck
            .cards
            .iter()
            .filter(|entry| chapter_id.is_none() || entry.chapter_id.as_deref() == chapter_id)
            .filter(|entry| entry.status != ReviewStatus::Learned)
            .filter(|entry| entry.next_review_at.map_or(true, |at| at <= now))
            .map(|entry| entry.card.clone())
            .collect())
    }

    fn update_status(
        &mut self,
        card_id: CardId,
        status: ReviewStatus,
        next_review_at: Option<DateTime<Utc>>,
    ) -> Result<()> {
        let deck_id = self
            .card_index
            .get(&card_id)
            .cloned()
            .ok_or_else(|| Error::Store(format!("Unknown card: {}", card_id)))?;
        let path = self.deck_path(&deck_id);

        let deck = self
            .decks
            .get_mut(&deck_id)
            .ok_or_else(|| Error::Store(format!("Unknown deck: {}", deck_id)))?;
        let entry = deck
            .cards
            .iter_mut()
            .find(|entry| entry.card.id == card_id)
            .ok_or_else(|| Error::Store(format!("Card {} missing from deck", card_id)))?;

        entry.status = status;
        entry.next_review_at = next_review_at;
        deck.save(&path)
    }

    fn count_by_status(
        &self,
        deck_id: &str,
        chapter_id: Option<&str>,
        status: ReviewStatus,
    ) -> Result<usize> {
        let deck = self
            .decks
            .get(deck_id)
            .ok_or_else(|| Error::Store(format!("Unknown deck: {}", deck_id)))?;

        Ok(deck
            .cards
            .iter()
            .filter(|entry| chapter_id.is_none() || entry.chapter_id.as_deref() == chapter_id)
            .filter(|entry| entry.status == status)
            .count())
    }
}

/// File-backed favorite store: one JSON file mapping users to card ids.
///
/// Favorites are low-volume, so the whole file is rewritten per change
/// with the same atomic temp-file dance as deck saves.
pub struct JsonFavoriteStore {
    path: PathBuf,
    favorites: HashMap<crate::UserId, std::collections::HashSet<CardId>>,
}

impl JsonFavoriteStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join("favorites.json");
        let favorites = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&contents) {
                Ok(map) => map,
                Err(e) => {
                    // Losing favorites is annoying but not fatal, unlike a deck
                    tracing::warn!("Corrupted favorites file {:?}: {}. Starting empty.", path, e);
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self { path, favorites })
    }

    fn save(&self) -> Result<()> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| Error::Store("favorites path missing parent".into()))?;
        std::fs::create_dir_all(parent)?;

        let temp = NamedTempFile::new_in(parent)?;
        temp.as_file().lock_exclusive()?;
        serde_json::to_writer(temp.as_file(), &self.favorites)?;
        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;
        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}

impl crate::FavoriteStore for JsonFavoriteStore {
    fn list(&self, user_id: &crate::UserId) -> Result<std::collections::HashSet<CardId>> {
        Ok(self.favorites.get(user_id).cloned().unwrap_or_default())
    }

    fn add(&mut self, user_id: &crate::UserId, card_id: CardId) -> Result<()> {
        self.favorites
            .entry(user_id.clone())
            .or_default()
            .insert(card_id);
        self.save()
    }

    fn remove(&mut self, user_id: &crate::UserId, card_id: CardId) -> Result<()> {
        if let Some(set) = self.favorites.get_mut(user_id) {
            set.remove(&card_id);
        }
        self.save()
    }
}
