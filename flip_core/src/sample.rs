//! Built-in sample deck so the CLI works out of the box.

use crate::deck_store::{DeckEntry, DeckFile};
use crate::{CardId, ReviewCard, ReviewStatus};
use once_cell::sync::Lazy;

/// (chapter, front, back) triples for the bundled French vocabulary deck
static SAMPLE_CARDS: Lazy<Vec<(&'static str, &'static str, &'static str)>> = Lazy::new(|| {
    vec![
        ("basics", "the dog", "le chien"),
        ("basics", "the cat", "le chat"),
        ("basics", "the house", "la maison"),
        ("basics", "the water", "l'eau"),
        ("basics", "the bread", "le pain"),
        ("verbs", "to be", "être"),
        ("verbs", "to have", "avoir"),
        ("verbs", "to go", "aller"),
        ("verbs", "to want", "vouloir"),
        ("verbs", "to know", "savoir"),
    ]
});

/// Default id of the bundled deck
pub const SAMPLE_DECK_ID: &str = "french_starter";

/// Build a fresh copy of the bundled sample deck.
///
/// Card ids are generated per call; seeding twice produces two
/// independent sets of cards.
pub fn build_sample_deck() -> DeckFile {
    let cards = SAMPLE_CARDS
        .iter()
        .map(|(chapter, front, back)| DeckEntry {
            card: ReviewCard::new(
                CardId::new(),
                serde_json::json!({ "front": front, "back": back }),
            ),
            chapter_id: Some((*chapter).to_string()),
            status: ReviewStatus::New,
            next_review_at: None,
        })
        .collect();

    DeckFile {
        deck_id: SAMPLE_DECK_ID.to_string(),
        cards,
    }
}
