//! Marathon and blitz run modes.
//!
//! The two modes share one state machine and differ only in question
//! count and points per correct answer.

use serde::{Deserialize, Serialize};

/// Multi-question run modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunKind {
    Marathon,
    Blitz,
}

impl RunKind {
    pub fn total_questions(self) -> u32 {
        match self {
            RunKind::Marathon => 10,
            RunKind::Blitz => 5,
        }
    }

    pub fn points_per_question(self) -> u32 {
        match self {
            RunKind::Marathon => 10,
            RunKind::Blitz => 20,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            RunKind::Marathon => "🏆 Культурный марафон",
            RunKind::Blitz => "⚡ Блиц-викторина",
        }
    }
}

/// Running score and question counter for one marathon/blitz run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunState {
    kind: RunKind,
    score: u32,
    answered: u32,
}

impl RunState {
    pub fn new(kind: RunKind) -> Self {
        Self {
            kind,
            score: 0,
            answered: 0,
        }
    }

    pub fn kind(self) -> RunKind {
        self.kind
    }

    pub fn score(self) -> u32 {
        self.score
    }

    pub fn answered(self) -> u32 {
        self.answered
    }

    /// 1-based number of the question currently on screen.
    pub fn question_number(self) -> u32 {
        (self.answered + 1).min(self.kind.total_questions())
    }

    pub fn max_score(self) -> u32 {
        self.kind.total_questions() * self.kind.points_per_question()
    }

    pub fn correct_answers(self) -> u32 {
        self.score / self.kind.points_per_question()
    }

    /// Record one answered question.
    pub fn record(&mut self, correct: bool) {
        self.answered += 1;
        if correct {
            self.score += self.kind.points_per_question();
        }
    }

    pub fn is_complete(self) -> bool {
        self.answered >= self.kind.total_questions()
    }
}

/// Qualitative marathon grade, banded at 80% / 60% / 40% of max score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    Excellent,
    Good,
    Fair,
    NeedsPractice,
}

impl Grade {
    pub fn for_score(score: u32, max_score: u32) -> Self {
        if score * 100 >= max_score * 80 {
            Grade::Excellent
        } else if score * 100 >= max_score * 60 {
            Grade::Good
        } else if score * 100 >= max_score * 40 {
            Grade::Fair
        } else {
            Grade::NeedsPractice
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grade::Excellent => "🏆 Отлично!",
            Grade::Good => "🥈 Хорошо!",
            Grade::Fair => "🥉 Неплохо!",
            Grade::NeedsPractice => "📚 Есть что подтянуть!",
        }
    }
}
