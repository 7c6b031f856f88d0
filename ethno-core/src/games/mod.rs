//! Quiz and mini-game generators plus run-mode state.

pub mod match_pairs;
pub mod quiz;
pub mod run;

pub use match_pairs::{MatchGame, SelectOutcome, SlotKind};
pub use quiz::{QuizKind, QuizPayload};
pub use run::{Grade, RunKind, RunState};
