//! Engine - the primary public API for the bot core.
//!
//! Wraps the catalog, localizer, session store, and game generators
//! behind the operations a transport layer needs: start a game, submit
//! an answer, select a match slot, browse, and search. Every error is
//! user-visible and non-fatal; the transport turns it into a message.

use crate::catalog::{Catalog, CatalogEntry, Category, Item};
use crate::games::match_pairs::{MatchGame, SelectOutcome, SlotKind};
use crate::games::quiz::{self, QuizPayload};
use crate::games::run::{Grade, RunKind, RunState};
use crate::locale::{LocaleError, Localizer};
use crate::search;
use crate::session::{ActiveGame, ChatId, SearchMode, SessionStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// At most this many entity hits are offered after a name search.
pub const ENTITY_RESULT_LIMIT: usize = 10;

/// At most this many item hits are offered after a name search.
pub const ITEM_RESULT_LIMIT: usize = 20;

/// Errors surfaced to the user. Neither aborts anything beyond the
/// request that raised it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("not enough content for this game")]
    InsufficientData,

    #[error("referenced element not found")]
    NotFound,
}

/// The five launchable games.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameKind {
    EntityQuiz,
    DishQuiz,
    Marathon,
    Blitz,
    MatchPairs,
}

/// Configuration for building an [`Engine`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Content store root.
    pub data_dir: PathBuf,

    /// TOML file with the entity display-name table.
    pub locale_file: Option<PathBuf>,

    /// Buttons per page in entity/item lists.
    pub items_per_page: usize,

    /// Fixed RNG seed, for deterministic tests.
    pub rng_seed: Option<u64>,
}

impl EngineConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            locale_file: None,
            items_per_page: 4,
            rng_seed: None,
        }
    }

    pub fn with_locale_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.locale_file = Some(path.into());
        self
    }

    pub fn with_items_per_page(mut self, count: usize) -> Self {
        self.items_per_page = count.max(1);
        self
    }

    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }
}

/// One page of a list, with wrap-around "next" past the last page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub has_prev: bool,
    pub has_next: bool,
    pub total: usize,
}

/// Result of answering a quiz question.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub correct: bool,
    /// Label of the correct answer, for the "wrong, it was X" message.
    pub correct_label: String,
    /// `None` for standalone single-question games.
    pub progress: Option<RunProgress>,
}

/// Where a marathon/blitz run goes after an answer.
#[derive(Debug, Clone, PartialEq)]
pub enum RunProgress {
    Next {
        question: QuizPayload,
        question_number: u32,
        score: u32,
        total_questions: u32,
    },
    Complete(RunSummary),
}

/// Final report of a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub kind: RunKind,
    pub score: u32,
    pub max_score: u32,
    pub correct_answers: u32,
    pub total_questions: u32,
    /// Marathon only; blitz reports the bare score.
    pub grade: Option<Grade>,
}

/// Result of one match-pairs selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOutcome {
    pub outcome: SelectOutcome,
    pub matches_found: usize,
}

/// Reply to a free-text message, depending on what the session was
/// waiting for.
#[derive(Debug, Clone, PartialEq)]
pub enum TextReply {
    /// The feedback round-trip completed; thank the user.
    FeedbackReceived,
    /// Entity-name search hits as (id, display name), best first.
    EntityMatches(Vec<(String, String)>),
    /// Item-name search hits across the catalog, deduplicated.
    ItemMatches(Vec<CatalogEntry>),
    /// Hits within one (entity, category) list as (index, name).
    ScopedMatches {
        entity: String,
        category: Category,
        hits: Vec<(usize, String)>,
    },
    /// A search ran and found nothing.
    NoMatches,
    /// The session was not waiting for text.
    Unhandled,
}

/// The bot core. One per process; sessions are keyed inside.
pub struct Engine {
    catalog: Catalog,
    localizer: Localizer,
    sessions: SessionStore,
    rng: StdRng,
    items_per_page: usize,
}

impl Engine {
    /// Build an engine from configuration, loading the locale table if
    /// one is configured.
    pub fn new(config: EngineConfig) -> Result<Self, LocaleError> {
        let localizer = match &config.locale_file {
            Some(path) => Localizer::load(path)?,
            None => Localizer::default(),
        };
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            catalog: Catalog::new(config.data_dir),
            localizer,
            sessions: SessionStore::new(),
            rng,
            items_per_page: config.items_per_page,
        })
    }

    /// Build from already-constructed parts.
    pub fn from_parts(catalog: Catalog, localizer: Localizer) -> Self {
        Self {
            catalog,
            localizer,
            sessions: SessionStore::new(),
            rng: StdRng::from_entropy(),
            items_per_page: 4,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn localizer(&self) -> &Localizer {
        &self.localizer
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    // ------------------------------------------------------------------
    // Games
    // ------------------------------------------------------------------

    /// Start a game for a conversation, replacing whatever was active.
    /// A run (marathon/blitz) is not entered when its first question
    /// cannot be generated.
    pub fn start_game(&mut self, chat: ChatId, kind: GameKind) -> Result<ActiveGame, EngineError> {
        let catalog = &self.catalog;
        let rng = &mut self.rng;
        self.sessions.with_session(chat, |session| {
            let (game, run) = match kind {
                GameKind::EntityQuiz => (
                    ActiveGame::Quiz(
                        quiz::entity_quiz(catalog, rng).ok_or(EngineError::InsufficientData)?,
                    ),
                    None,
                ),
                GameKind::DishQuiz => (
                    ActiveGame::Quiz(
                        quiz::dish_quiz(catalog, rng).ok_or(EngineError::InsufficientData)?,
                    ),
                    None,
                ),
                GameKind::Marathon => (
                    ActiveGame::Quiz(
                        quiz::random_question(catalog, rng).ok_or(EngineError::InsufficientData)?,
                    ),
                    Some(RunState::new(RunKind::Marathon)),
                ),
                GameKind::Blitz => (
                    ActiveGame::Quiz(
                        quiz::random_question(catalog, rng).ok_or(EngineError::InsufficientData)?,
                    ),
                    Some(RunState::new(RunKind::Blitz)),
                ),
                GameKind::MatchPairs => (
                    ActiveGame::Pairs(
                        MatchGame::generate(catalog, rng).ok_or(EngineError::InsufficientData)?,
                    ),
                    None,
                ),
            };
            session.run = run;
            session.game = Some(game.clone());
            Ok(game)
        })
    }

    /// Snapshot of the active game, if any.
    pub fn active_game(&self, chat: ChatId) -> Option<ActiveGame> {
        self.sessions.with_session(chat, |session| session.game.clone())
    }

    /// Snapshot of the run in progress, if any.
    pub fn run_status(&self, chat: ChatId) -> Option<RunState> {
        self.sessions.with_session(chat, |session| session.run)
    }

    /// Answer the active quiz question by button index.
    ///
    /// Standalone games end after one question. In a run the score and
    /// counter advance, and either the next question or the final summary
    /// comes back; a mid-run generation failure abandons the run.
    pub fn submit_answer(&mut self, chat: ChatId, option: usize) -> Result<AnswerOutcome, EngineError> {
        let catalog = &self.catalog;
        let localizer = &self.localizer;
        let rng = &mut self.rng;
        self.sessions.with_session(chat, |session| {
            let payload = match &session.game {
                Some(ActiveGame::Quiz(payload)) => payload,
                _ => return Err(EngineError::NotFound),
            };
            let correct = payload.is_correct(option).ok_or(EngineError::NotFound)?;
            let correct_label = payload.correct_label(localizer);

            let run = match session.run.as_mut() {
                None => {
                    session.game = None;
                    return Ok(AnswerOutcome {
                        correct,
                        correct_label,
                        progress: None,
                    });
                }
                Some(run) => run,
            };

            run.record(correct);
            if run.is_complete() {
                let summary = RunSummary {
                    kind: run.kind(),
                    score: run.score(),
                    max_score: run.max_score(),
                    correct_answers: run.correct_answers(),
                    total_questions: run.kind().total_questions(),
                    grade: (run.kind() == RunKind::Marathon)
                        .then(|| Grade::for_score(run.score(), run.max_score())),
                };
                session.run = None;
                session.game = None;
                return Ok(AnswerOutcome {
                    correct,
                    correct_label,
                    progress: Some(RunProgress::Complete(summary)),
                });
            }

            match quiz::random_question(catalog, rng) {
                Some(question) => {
                    let question_number = run.question_number();
                    let score = run.score();
                    let total_questions = run.kind().total_questions();
                    session.game = Some(ActiveGame::Quiz(question.clone()));
                    Ok(AnswerOutcome {
                        correct,
                        correct_label,
                        progress: Some(RunProgress::Next {
                            question,
                            question_number,
                            score,
                            total_questions,
                        }),
                    })
                }
                None => {
                    // the catalog shrank under us; abandon the run
                    session.run = None;
                    session.game = None;
                    Err(EngineError::InsufficientData)
                }
            }
        })
    }

    /// One selection step of the active match-pairs game.
    pub fn select_match_slot(
        &mut self,
        chat: ChatId,
        slot: SlotKind,
        index: usize,
    ) -> Result<MatchOutcome, EngineError> {
        self.sessions.with_session(chat, |session| {
            let game = match &mut session.game {
                Some(ActiveGame::Pairs(game)) => game,
                _ => return Err(EngineError::NotFound),
            };
            let outcome = match slot {
                SlotKind::Item => game.select_item(index),
                SlotKind::Entity => game.select_entity(index),
            }
            .ok_or(EngineError::NotFound)?;
            let matches_found = game.matches_found();
            if outcome == SelectOutcome::Complete {
                session.game = None;
            }
            Ok(MatchOutcome {
                outcome,
                matches_found,
            })
        })
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// All entities as (id, display name), in catalog order.
    pub fn entities(&self) -> Vec<(String, String)> {
        self.catalog
            .entities()
            .into_iter()
            .map(|id| {
                let display = self.localizer.display(&id).to_string();
                (id, display)
            })
            .collect()
    }

    /// One page of the entity list.
    pub fn entity_page(&self, page: usize) -> Page<(String, String)> {
        paginate(self.entities(), page, self.items_per_page)
    }

    /// One page of an (entity, category) item list, with absolute indices.
    pub fn item_page(&self, entity: &str, category: Category, page: usize) -> Page<(usize, Item)> {
        let items: Vec<(usize, Item)> = self
            .catalog
            .items(entity, category)
            .into_iter()
            .enumerate()
            .collect();
        paginate(items, page, self.items_per_page)
    }

    /// A single item by positional index. `NotFound` covers the
    /// stale-button case where the list shrank since rendering.
    pub fn item(&self, entity: &str, category: Category, index: usize) -> Result<Item, EngineError> {
        self.catalog
            .items(entity, category)
            .into_iter()
            .nth(index)
            .ok_or(EngineError::NotFound)
    }

    /// Toggle an entity in the conversation's multi-selection; returns
    /// the selection after the toggle.
    pub fn toggle_entity(&self, chat: ChatId, entity: &str) -> Result<Vec<String>, EngineError> {
        if !self.catalog.entities().iter().any(|e| e == entity) {
            return Err(EngineError::NotFound);
        }
        let entity = entity.to_string();
        self.sessions.with_session(chat, move |session| {
            match session.selected_entities.iter().position(|e| *e == entity) {
                Some(at) => {
                    session.selected_entities.remove(at);
                }
                None => session.selected_entities.push(entity),
            }
            Ok(session.selected_entities.clone())
        })
    }

    pub fn selected_entities(&self, chat: ChatId) -> Vec<String> {
        self.sessions
            .with_session(chat, |session| session.selected_entities.clone())
    }

    pub fn clear_selection(&self, chat: ChatId) {
        self.sessions.with_session(chat, |session| {
            session.selected_entities.clear();
            session.page = 0;
        });
    }

    /// Remember the entity-list page the conversation is on.
    pub fn set_page(&self, chat: ChatId, page: usize) {
        self.sessions.with_session(chat, |session| session.page = page);
    }

    pub fn page(&self, chat: ChatId) -> usize {
        self.sessions.with_session(chat, |session| session.page)
    }

    /// Items of one category across the current multi-selection, capped
    /// at [`ITEM_RESULT_LIMIT`].
    pub fn multi_category_items(&self, chat: ChatId, category: Category) -> Vec<CatalogEntry> {
        let selected = self.selected_entities(chat);
        let mut out = Vec::new();
        for entity in selected {
            for (index, item) in self.catalog.items(&entity, category).into_iter().enumerate() {
                out.push(CatalogEntry {
                    entity: entity.clone(),
                    category,
                    index,
                    item,
                });
                if out.len() == ITEM_RESULT_LIMIT {
                    return out;
                }
            }
        }
        out
    }

    /// Reset a conversation to the empty state (home navigation).
    pub fn reset_session(&self, chat: ChatId) {
        self.sessions.reset(chat);
    }

    /// Evict sessions idle beyond `max_idle`.
    pub fn evict_idle_sessions(&self, max_idle: Duration) -> usize {
        self.sessions.evict_idle(max_idle)
    }

    // ------------------------------------------------------------------
    // Search and free text
    // ------------------------------------------------------------------

    /// Arm the session: the next free-text message is a search query.
    pub fn begin_search(&self, chat: ChatId, mode: SearchMode) {
        self.sessions
            .with_session(chat, |session| session.search_mode = Some(mode));
    }

    /// Arm the session: the next free-text message is feedback.
    pub fn begin_feedback(&self, chat: ChatId) {
        self.sessions
            .with_session(chat, |session| session.awaiting_feedback = true);
    }

    /// Route a free-text message according to what the session awaits.
    /// Search and feedback rounds consume themselves and reset the
    /// session, mirroring the one-shot flows of the menu layer.
    pub fn handle_text(&self, chat: ChatId, text: &str) -> TextReply {
        enum Pending {
            Feedback,
            Search(SearchMode),
            Nothing,
        }
        let pending = self.sessions.with_session(chat, |session| {
            if session.awaiting_feedback {
                session.reset();
                Pending::Feedback
            } else if let Some(mode) = session.search_mode.take() {
                session.reset();
                Pending::Search(mode)
            } else {
                Pending::Nothing
            }
        });

        match pending {
            Pending::Feedback => TextReply::FeedbackReceived,
            Pending::Nothing => TextReply::Unhandled,
            Pending::Search(SearchMode::Entities) => {
                let hits = self.search_entities(text);
                if hits.is_empty() {
                    TextReply::NoMatches
                } else {
                    TextReply::EntityMatches(hits)
                }
            }
            Pending::Search(SearchMode::AllItems) => {
                let hits = self.search_items(text);
                if hits.is_empty() {
                    TextReply::NoMatches
                } else {
                    TextReply::ItemMatches(hits)
                }
            }
            Pending::Search(SearchMode::Scoped { entity, category }) => {
                let hits = self.search_scoped(&entity, category, text);
                if hits.is_empty() {
                    TextReply::NoMatches
                } else {
                    TextReply::ScopedMatches {
                        entity,
                        category,
                        hits,
                    }
                }
            }
        }
    }

    /// Fuzzy search over localized entity names; hits come back as
    /// (id, display name), best first, capped at [`ENTITY_RESULT_LIMIT`].
    pub fn search_entities(&self, query: &str) -> Vec<(String, String)> {
        let ids = self.catalog.entities();
        let displays: Vec<String> = ids
            .iter()
            .map(|id| self.localizer.display(id).to_string())
            .collect();
        let candidates: Vec<&str> = displays.iter().map(String::as_str).collect();
        let ranked = search::search(query, candidates, search::DEFAULT_THRESHOLD);

        let mut out = Vec::new();
        for display in ranked {
            // ids absent from the locale table display as themselves
            let id = self.localizer.entity_id(display).unwrap_or(display);
            if ids.iter().any(|e| e == id) {
                out.push((id.to_string(), display.to_string()));
                if out.len() == ENTITY_RESULT_LIMIT {
                    break;
                }
            }
        }
        out
    }

    /// Fuzzy search over item names across the whole catalog, ranked and
    /// deduplicated by (entity, category, name), capped at
    /// [`ITEM_RESULT_LIMIT`].
    pub fn search_items(&self, query: &str) -> Vec<CatalogEntry> {
        let all = self.catalog.all_items();
        let names: Vec<&str> = all.iter().map(|e| e.item.name.as_str()).collect();
        let ranked = search::search(query, names, search::DEFAULT_THRESHOLD);

        let mut seen: HashSet<(String, Category, String)> = HashSet::new();
        let mut out = Vec::new();
        for name in ranked {
            for entry in all.iter().filter(|e| e.item.name == name) {
                let key = (entry.entity.clone(), entry.category, entry.item.name.clone());
                if seen.insert(key) {
                    out.push(entry.clone());
                    if out.len() == ITEM_RESULT_LIMIT {
                        return out;
                    }
                }
            }
        }
        out
    }

    /// Fuzzy search within one (entity, category) list; hits come back
    /// as (index, name), capped at [`ENTITY_RESULT_LIMIT`].
    pub fn search_scoped(
        &self,
        entity: &str,
        category: Category,
        query: &str,
    ) -> Vec<(usize, String)> {
        let items = self.catalog.items(entity, category);
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        let ranked = search::search(query, names, search::DEFAULT_THRESHOLD);

        let mut out = Vec::new();
        for name in ranked {
            if let Some(index) = items.iter().position(|i| i.name == name) {
                if !out.iter().any(|(i, _)| *i == index) {
                    out.push((index, name.to_string()));
                    if out.len() == ENTITY_RESULT_LIMIT {
                        break;
                    }
                }
            }
        }
        out
    }
}

/// Slice a list into a fixed-size page. The menu layer treats a page
/// with `has_next == false` as the last one and wraps "next" to zero.
fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let total = items.len();
    let start = page * per_page;
    let page_items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(per_page)
        .collect();
    Page {
        items: page_items,
        page,
        has_prev: page > 0,
        has_next: start + per_page < total,
        total,
    }
}
