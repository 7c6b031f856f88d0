//! Single-question quiz generation.
//!
//! Four question kinds sample the catalog: guess the entity, guess the
//! category, guess the dish (cuisine only), and a true/false statement.
//! Every generator returns `None` when the catalog is too small; the
//! caller surfaces that as a user-visible "not enough data" condition.

use crate::catalog::{Catalog, CatalogEntry, Category, Item};
use crate::locale::Localizer;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Answer labels for true/false questions; index 0 means "true".
pub const TRUE_LABEL: &str = "Правда";
pub const FALSE_LABEL: &str = "Ложь";

/// How many times a failed draw is retried before giving up.
const GENERATION_RETRIES: usize = 8;

/// The four question kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizKind {
    Entity,
    Category,
    Dish,
    TrueFalse,
}

/// Kinds eligible for the marathon/blitz rotation. The dish quiz stays a
/// standalone game because it leans on item photos.
const RUN_ROTATION: [QuizKind; 3] = [QuizKind::Entity, QuizKind::Category, QuizKind::TrueFalse];

/// One generated question, owned by the session until answered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuizPayload {
    /// Which entity does this item belong to?
    Entity {
        entry: CatalogEntry,
        correct: String,
        options: Vec<String>,
    },
    /// Which category does this item belong to?
    Category {
        entry: CatalogEntry,
        correct: Category,
        options: Vec<Category>,
    },
    /// What is this dish called?
    Dish {
        entity: String,
        item: Item,
        correct: String,
        options: Vec<String>,
    },
    /// Does the statement hold?
    TrueFalse {
        entry: CatalogEntry,
        claimed_entity: String,
        answer: bool,
    },
}

impl QuizPayload {
    pub fn kind(&self) -> QuizKind {
        match self {
            QuizPayload::Entity { .. } => QuizKind::Entity,
            QuizPayload::Category { .. } => QuizKind::Category,
            QuizPayload::Dish { .. } => QuizKind::Dish,
            QuizPayload::TrueFalse { .. } => QuizKind::TrueFalse,
        }
    }

    /// Question text for the transport layer.
    pub fn prompt(&self, localizer: &Localizer) -> String {
        match self {
            QuizPayload::Entity { entry, .. } => format!(
                "📂 {}: {}\n\n❓ К какой национальности относится этот элемент культуры?",
                entry.category.label(),
                entry.item.name
            ),
            QuizPayload::Category { entry, .. } => format!(
                "📌 {}\n🌍 {}\n\n❓ К какой категории относится?",
                entry.item.name,
                localizer.display(&entry.entity)
            ),
            QuizPayload::Dish { .. } => "🍲 Как называется это блюдо?".to_string(),
            QuizPayload::TrueFalse {
                entry,
                claimed_entity,
                ..
            } => format!(
                "❓ {} относится к культуре {}",
                entry.item.name,
                localizer.display(claimed_entity)
            ),
        }
    }

    /// Bounded option list, in button order.
    pub fn option_labels(&self, localizer: &Localizer) -> Vec<String> {
        match self {
            QuizPayload::Entity { options, .. } => options
                .iter()
                .map(|id| localizer.display(id).to_string())
                .collect(),
            QuizPayload::Category { options, .. } => {
                options.iter().map(|c| c.label().to_string()).collect()
            }
            QuizPayload::Dish { options, .. } => options.clone(),
            QuizPayload::TrueFalse { .. } => {
                vec![TRUE_LABEL.to_string(), FALSE_LABEL.to_string()]
            }
        }
    }

    pub fn option_count(&self) -> usize {
        match self {
            QuizPayload::Entity { options, .. } => options.len(),
            QuizPayload::Category { options, .. } => options.len(),
            QuizPayload::Dish { options, .. } => options.len(),
            QuizPayload::TrueFalse { .. } => 2,
        }
    }

    /// Check an answer by button index. `None` when the index is out of
    /// range (a stale button). True/false compares the boolean choice, the
    /// other kinds compare option values.
    pub fn is_correct(&self, option: usize) -> Option<bool> {
        match self {
            QuizPayload::Entity {
                correct, options, ..
            } => options.get(option).map(|chosen| chosen == correct),
            QuizPayload::Category {
                correct, options, ..
            } => options.get(option).map(|chosen| chosen == correct),
            QuizPayload::Dish {
                correct, options, ..
            } => options.get(option).map(|chosen| chosen == correct),
            QuizPayload::TrueFalse { answer, .. } => {
                (option < 2).then(|| (option == 0) == *answer)
            }
        }
    }

    /// Label of the correct answer, shown after a wrong guess.
    pub fn correct_label(&self, localizer: &Localizer) -> String {
        match self {
            QuizPayload::Entity { correct, .. } => localizer.display(correct).to_string(),
            QuizPayload::Category { correct, .. } => correct.label().to_string(),
            QuizPayload::Dish { correct, .. } => correct.clone(),
            QuizPayload::TrueFalse { answer, .. } => {
                if *answer { TRUE_LABEL } else { FALSE_LABEL }.to_string()
            }
        }
    }

    /// Photo to attach, as (entity, category, image). Only the dish quiz
    /// shows the item image up front; the others would give the answer
    /// away.
    pub fn photo(&self) -> Option<(&str, Category, &str)> {
        match self {
            QuizPayload::Dish { entity, item, .. } => {
                Some((entity.as_str(), Category::Cuisine, item.image.as_str()))
            }
            _ => None,
        }
    }
}

/// Build an option set around `correct`. With fewer than four distinct
/// candidates the full set is returned in natural order (no padding);
/// otherwise correct plus three distinct others, shuffled. `candidates`
/// must contain `correct`.
fn build_options<T, R>(correct: &T, candidates: &[T], rng: &mut R) -> Vec<T>
where
    T: Clone + PartialEq,
    R: Rng + ?Sized,
{
    let mut distinct: Vec<T> = Vec::new();
    for candidate in candidates {
        if !distinct.contains(candidate) {
            distinct.push(candidate.clone());
        }
    }
    if distinct.len() < 4 {
        return distinct;
    }

    let others: Vec<&T> = distinct.iter().filter(|c| *c != correct).collect();
    let mut options: Vec<T> = vec![correct.clone()];
    for pick in others.choose_multiple(rng, 3) {
        options.push((*pick).clone());
    }
    options.shuffle(rng);
    options
}

/// Guess-the-entity question over the whole catalog.
pub fn entity_quiz<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Option<QuizPayload> {
    let all = catalog.all_items();
    let entry = all.choose(rng)?.clone();
    let entities = catalog.entities();
    let options = build_options(&entry.entity, &entities, rng);
    Some(QuizPayload::Entity {
        correct: entry.entity.clone(),
        options,
        entry,
    })
}

/// Guess-the-category question over the fixed five-category set.
pub fn category_quiz<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Option<QuizPayload> {
    let all = catalog.all_items();
    let entry = all.choose(rng)?.clone();
    let options = build_options(&entry.category, &Category::ALL, rng);
    Some(QuizPayload::Category {
        correct: entry.category,
        options,
        entry,
    })
}

/// Guess-the-dish question, restricted to the cuisine category.
pub fn dish_quiz<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Option<QuizPayload> {
    let dishes = catalog.cuisine_items();
    let entry = dishes.choose(rng)?.clone();
    let names: Vec<String> = dishes.iter().map(|e| e.item.name.clone()).collect();
    let correct = entry.item.name.clone();
    let options = build_options(&correct, &names, rng);
    Some(QuizPayload::Dish {
        entity: entry.entity,
        item: entry.item,
        correct,
        options,
    })
}

/// True/false statement about an item's entity. A false statement claims
/// a different, randomly chosen entity; when no other entity exists the
/// draw is regenerated rather than forcing a vacuous statement.
pub fn true_false<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Option<QuizPayload> {
    let all = catalog.all_items();
    if all.is_empty() {
        return None;
    }
    let entities = catalog.entities();

    for _ in 0..GENERATION_RETRIES {
        let entry = all.choose(rng)?.clone();
        if rng.gen_bool(0.5) {
            return Some(QuizPayload::TrueFalse {
                claimed_entity: entry.entity.clone(),
                answer: true,
                entry,
            });
        }
        let wrong: Vec<&String> = entities.iter().filter(|e| **e != entry.entity).collect();
        if let Some(claimed) = wrong.choose(rng) {
            return Some(QuizPayload::TrueFalse {
                claimed_entity: (*claimed).clone(),
                answer: false,
                entry,
            });
        }
        // single-entity catalog made a false statement impossible; re-flip
    }
    None
}

/// One question for the marathon/blitz rotation, uniform over the three
/// eligible kinds with a bounded retry when the drawn kind cannot be
/// generated.
pub fn random_question<R: Rng + ?Sized>(catalog: &Catalog, rng: &mut R) -> Option<QuizPayload> {
    for _ in 0..RUN_ROTATION.len() {
        let kind = RUN_ROTATION[rng.gen_range(0..RUN_ROTATION.len())];
        let question = match kind {
            QuizKind::Entity => entity_quiz(catalog, rng),
            QuizKind::Category => category_quiz(catalog, rng),
            QuizKind::TrueFalse => true_false(catalog, rng),
            QuizKind::Dish => None,
        };
        if question.is_some() {
            return question;
        }
    }
    None
}
