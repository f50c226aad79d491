//! Best-score persistence
//!
//! One integer per game key, or a JSON object mapping difficulty name to score
//! when the slot has a field. Stored values only ever go up.

use serde_json::{Map, Value};

use crate::sim::ScoreSlot;
use crate::storage::{KeyValueStore, StorageError};

/// Read the stored best for `slot`. Missing, malformed or unreachable → 0.
pub fn load_best(store: &dyn KeyValueStore, slot: ScoreSlot) -> u64 {
    match try_load(store, slot) {
        Ok(best) => best,
        Err(e) => {
            log::warn!("Best score for {} unavailable, using 0: {e}", slot.key);
            0
        }
    }
}

/// Store `score` if it beats the stored best. Returns true when it did.
pub fn record_best(store: &mut dyn KeyValueStore, slot: ScoreSlot, score: u64) -> bool {
    let best = load_best(store, slot);
    if score <= best {
        return false;
    }
    match try_store(store, slot, score) {
        Ok(()) => {
            log::info!("New best score for {}: {score}", slot.describe());
            true
        }
        Err(e) => {
            log::warn!("Failed to save best score for {}: {e}", slot.key);
            false
        }
    }
}

fn try_load(store: &dyn KeyValueStore, slot: ScoreSlot) -> Result<u64, StorageError> {
    let Some(raw) = store.get(slot.key)? else {
        return Ok(0);
    };
    match slot.field {
        None => Ok(parse_score(&raw)),
        Some(field) => {
            // Entries are read one by one; a bad neighbour does not hide this one
            let table: Map<String, Value> = serde_json::from_str(&raw)?;
            Ok(table.get(field).and_then(Value::as_u64).unwrap_or(0))
        }
    }
}

fn try_store(store: &mut dyn KeyValueStore, slot: ScoreSlot, score: u64) -> Result<(), StorageError> {
    match slot.field {
        None => store.set(slot.key, &score.to_string()),
        Some(field) => {
            // Other entries are kept as stored, even ones that are not scores
            let mut table = match store.get(slot.key)? {
                Some(raw) => serde_json::from_str::<Map<String, Value>>(&raw).unwrap_or_else(|e| {
                    log::warn!("Replacing unreadable {} table: {e}", slot.key);
                    Map::new()
                }),
                None => Map::new(),
            };
            table.insert(field.to_string(), Value::from(score));
            store.set(slot.key, &serde_json::to_string(&table)?)
        }
    }
}

/// Non-numeric values count as no score
fn parse_score(raw: &str) -> u64 {
    raw.trim().parse::<u64>().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, UnavailableStore};
    use proptest::prelude::*;

    const DINO: ScoreSlot = ScoreSlot::scalar("dinoHighScore");

    #[test]
    fn test_best_never_regresses() {
        let mut store = MemoryStore::new();
        assert_eq!(load_best(&store, DINO), 0);

        assert!(record_best(&mut store, DINO, 42));
        assert_eq!(load_best(&store, DINO), 42);

        assert!(!record_best(&mut store, DINO, 10));
        assert_eq!(load_best(&store, DINO), 42);
        assert_eq!(store.get("dinoHighScore").unwrap().as_deref(), Some("42"));
    }

    #[test]
    fn test_non_numeric_falls_back_to_zero() {
        let mut store = MemoryStore::new();
        store.set("dinoHighScore", "NaN").unwrap();
        assert_eq!(load_best(&store, DINO), 0);
        assert!(record_best(&mut store, DINO, 5));
        assert_eq!(load_best(&store, DINO), 5);
    }

    #[test]
    fn test_unavailable_storage_is_zero() {
        let mut store = UnavailableStore;
        assert_eq!(load_best(&store, DINO), 0);
        assert!(!record_best(&mut store, DINO, 100));
    }

    #[test]
    fn test_per_difficulty_table() {
        let easy = ScoreSlot::field("memoryGameBestScores", "easy");
        let hard = ScoreSlot::field("memoryGameBestScores", "hard");
        let mut store = MemoryStore::new();

        assert!(record_best(&mut store, easy, 1200));
        assert!(record_best(&mut store, hard, 2400));
        assert!(!record_best(&mut store, easy, 900));

        assert_eq!(load_best(&store, easy), 1200);
        assert_eq!(load_best(&store, hard), 2400);
        assert_eq!(load_best(&store, ScoreSlot::field("memoryGameBestScores", "medium")), 0);
    }

    #[test]
    fn test_unreadable_entry_keeps_other_difficulties() {
        let medium = ScoreSlot::field("memoryGameBestScores", "medium");
        let hard = ScoreSlot::field("memoryGameBestScores", "hard");
        let mut store = MemoryStore::new();
        // A negative score from a very long game, next to a real record
        store
            .set("memoryGameBestScores", r#"{"easy":-15,"hard":2500,"note":"x"}"#)
            .unwrap();

        assert_eq!(load_best(&store, hard), 2500);
        assert_eq!(load_best(&store, ScoreSlot::field("memoryGameBestScores", "easy")), 0);

        assert!(record_best(&mut store, medium, 100));
        assert_eq!(load_best(&store, medium), 100);
        assert_eq!(load_best(&store, hard), 2500);

        let raw = store.get("memoryGameBestScores").unwrap().unwrap();
        let table: Map<String, Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(table["easy"], Value::from(-15));
        assert_eq!(table["note"], Value::from("x"));
    }

    proptest! {
        #[test]
        fn prop_stored_best_is_running_max(scores in prop::collection::vec(0u64..10_000, 1..40)) {
            let mut store = MemoryStore::new();
            let mut prev = 0;
            for &s in &scores {
                record_best(&mut store, DINO, s);
                let now = load_best(&store, DINO);
                prop_assert!(now >= prev);
                prev = now;
            }
            prop_assert_eq!(prev, scores.iter().copied().max().unwrap_or(0));
        }
    }
}
