//! Ethnosphere bot core: cultural-heritage content, quizzes, and search.
//!
//! This crate provides:
//! - A read-only catalog over a directory-per-entity content store
//! - Four quiz generators plus a match-pairs puzzle
//! - Marathon/blitz run modes with scoring and grading
//! - Fuzzy name search over entities and items
//! - A keyed per-conversation session store
//!
//! # Quick Start
//!
//! ```no_run
//! use ethno_core::{Engine, EngineConfig, GameKind};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::new("regionals")
//!         .with_locale_file("nationals.toml");
//!     let mut engine = Engine::new(config)?;
//!
//!     let chat = 42;
//!     let game = engine.start_game(chat, GameKind::Marathon)?;
//!     println!("{game:?}");
//!
//!     let outcome = engine.submit_answer(chat, 0)?;
//!     println!("correct: {}", outcome.correct);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod engine;
pub mod games;
pub mod locale;
pub mod search;
pub mod session;

// Primary public API
pub use catalog::{Catalog, CatalogEntry, Category, Item};
pub use engine::{
    AnswerOutcome, Engine, EngineConfig, EngineError, GameKind, MatchOutcome, Page, RunProgress,
    RunSummary, TextReply,
};
pub use games::match_pairs::{MatchGame, SelectOutcome, SlotKind};
pub use games::quiz::{QuizKind, QuizPayload};
pub use games::run::{Grade, RunKind, RunState};
pub use locale::{LocaleError, Localizer};
pub use session::{ActiveGame, ChatId, SearchMode, Session, SessionStore};
