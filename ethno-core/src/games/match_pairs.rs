//! The match-pairs puzzle: four items, four entity slots.
//!
//! The player picks an item slot, then an entity slot; a match is scored
//! when the entity slot's owner equals the pending item's entity. Matched
//! slots leave the board, the game completes at four matches.

use crate::catalog::{Catalog, CatalogEntry};
use crate::locale::Localizer;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Board size, in pairs.
pub const PAIR_COUNT: usize = 4;

/// Which column a selection targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKind {
    Item,
    Entity,
}

/// Result of one selection step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// An item slot is now pending; pick an entity next.
    ItemPicked,
    /// Pair found, board not yet cleared.
    Matched,
    /// Wrong entity; the pending selection is cleared, no penalty.
    Mismatched,
    /// Entity picked with no pending item; state unchanged.
    NoPending,
    /// Fourth pair found, game over.
    Complete,
}

/// Mutable state of one match-pairs game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchGame {
    entries: Vec<CatalogEntry>,
    matched: BTreeSet<usize>,
    pending: Option<usize>,
}

impl MatchGame {
    /// Pick a board of four items spanning four distinct entities when the
    /// catalog allows it. With fewer than four distinct-entity items but at
    /// least four items overall, fall back to an unconstrained sample
    /// (entities may repeat — permissive by design). `None` below four
    /// items total.
    pub fn generate<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Option<Self> {
        let mut all = catalog.all_items();
        if all.len() < PAIR_COUNT {
            return None;
        }
        all.shuffle(rng);

        let mut picked: Vec<CatalogEntry> = Vec::new();
        for entry in &all {
            if !picked.iter().any(|p| p.entity == entry.entity) {
                picked.push(entry.clone());
                if picked.len() == PAIR_COUNT {
                    break;
                }
            }
        }
        if picked.len() < PAIR_COUNT {
            picked = all.into_iter().take(PAIR_COUNT).collect();
        }

        Some(Self {
            entries: picked,
            matched: BTreeSet::new(),
            pending: None,
        })
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn pending(&self) -> Option<usize> {
        self.pending
    }

    pub fn matches_found(&self) -> usize {
        self.matched.len()
    }

    pub fn is_complete(&self) -> bool {
        self.matched.len() == self.entries.len()
    }

    /// Unmatched item slots as (index, item name).
    pub fn item_slots(&self) -> Vec<(usize, &str)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.matched.contains(i))
            .map(|(i, e)| (i, e.item.name.as_str()))
            .collect()
    }

    /// Unmatched entity slots as (index, display name). Slots share index
    /// space with the items they were dealt with.
    pub fn entity_slots(&self, localizer: &Localizer) -> Vec<(usize, String)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, _)| !self.matched.contains(i))
            .map(|(i, e)| (i, localizer.display(&e.entity).to_string()))
            .collect()
    }

    /// Select an item slot. `None` for an out-of-range or already-matched
    /// index (a stale button).
    pub fn select_item(&mut self, index: usize) -> Option<SelectOutcome> {
        if index >= self.entries.len() || self.matched.contains(&index) {
            return None;
        }
        self.pending = Some(index);
        Some(SelectOutcome::ItemPicked)
    }

    /// Select an entity slot. `None` for a stale index; `NoPending` when no
    /// item has been picked yet (state unchanged).
    pub fn select_entity(&mut self, index: usize) -> Option<SelectOutcome> {
        if index >= self.entries.len() || self.matched.contains(&index) {
            return None;
        }
        let pending = match self.pending {
            Some(pending) => pending,
            None => return Some(SelectOutcome::NoPending),
        };
        if self.entries[pending].entity == self.entries[index].entity {
            self.matched.insert(pending);
            self.pending = None;
            if self.is_complete() {
                Some(SelectOutcome::Complete)
            } else {
                Some(SelectOutcome::Matched)
            }
        } else {
            self.pending = None;
            Some(SelectOutcome::Mismatched)
        }
    }
}
