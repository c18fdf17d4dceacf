use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::ModelError;

//
// ─── EXERCISE KIND ─────────────────────────────────────────────────────────────
//

/// The closed set of exercises the engine can run.
///
/// Each kind has a stable string code used in composite exercise ids
/// (`"MATH-2"`) and in persisted history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExerciseKind {
    /// Memorise a shopping list, then pick the listed items from a shelf.
    Recall,
    /// Flip cards two at a time to find matching pairs.
    Memory,
    /// Catch falling rewards and dodge hazards in real time.
    Reaction,
    /// Market-themed arithmetic word problems.
    Arithmetic,
    /// Find every target glyph among look-alike distractors.
    Search,
    /// Sort a queue of items into two categories.
    Sorting,
    /// Continue a sequence.
    Pattern,
    /// Word/ink colour interference task.
    Inhibition,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 8] = [
        ExerciseKind::Reaction,
        ExerciseKind::Search,
        ExerciseKind::Memory,
        ExerciseKind::Recall,
        ExerciseKind::Arithmetic,
        ExerciseKind::Sorting,
        ExerciseKind::Pattern,
        ExerciseKind::Inhibition,
    ];

    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            ExerciseKind::Recall => "MARKET",
            ExerciseKind::Memory => "MEMORY",
            ExerciseKind::Reaction => "REACTION",
            ExerciseKind::Arithmetic => "MATH",
            ExerciseKind::Search => "SEARCH",
            ExerciseKind::Sorting => "SORTING",
            ExerciseKind::Pattern => "PATTERN",
            ExerciseKind::Inhibition => "COLOR_MATCH",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            ExerciseKind::Recall => "Shopping Recall",
            ExerciseKind::Memory => "Memory Match",
            ExerciseKind::Reaction => "Catch the Luck",
            ExerciseKind::Arithmetic => "Market Maths",
            ExerciseKind::Search => "Sharp Eyes",
            ExerciseKind::Sorting => "Sorting Task",
            ExerciseKind::Pattern => "Pattern Finding",
            ExerciseKind::Inhibition => "Colour Clash",
        }
    }

    #[must_use]
    pub fn domain(self) -> CognitiveDomain {
        match self {
            ExerciseKind::Recall => CognitiveDomain::LongTermMemory,
            ExerciseKind::Memory => CognitiveDomain::WorkingMemory,
            ExerciseKind::Reaction => CognitiveDomain::ProcessingSpeed,
            ExerciseKind::Arithmetic => CognitiveDomain::Calculation,
            ExerciseKind::Search => CognitiveDomain::Perception,
            ExerciseKind::Sorting => CognitiveDomain::ExecutiveFunction,
            ExerciseKind::Pattern => CognitiveDomain::Reasoning,
            ExerciseKind::Inhibition => CognitiveDomain::Inhibition,
        }
    }

    /// Composite id keying leaderboard lookups, e.g. `"SEARCH-3"`.
    #[must_use]
    pub fn exercise_id(self, level: u8) -> String {
        format!("{}-{level}", self.code())
    }

    /// Whether the kind is driven by frame ticks instead of submitted answers.
    #[must_use]
    pub fn is_real_time(self) -> bool {
        matches!(self, ExerciseKind::Reaction)
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ExerciseKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ExerciseKind::ALL
            .into_iter()
            .find(|kind| kind.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ModelError::UnknownExercise(wanted.to_string()))
    }
}

//
// ─── COGNITIVE DOMAIN ──────────────────────────────────────────────────────────
//

/// Cognitive ability an exercise primarily trains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CognitiveDomain {
    ProcessingSpeed,
    Attention,
    Perception,
    LongTermMemory,
    WorkingMemory,
    Calculation,
    ExecutiveFunction,
    Reasoning,
    Inhibition,
}

impl CognitiveDomain {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            CognitiveDomain::ProcessingSpeed => "processing speed",
            CognitiveDomain::Attention => "attention",
            CognitiveDomain::Perception => "perception",
            CognitiveDomain::LongTermMemory => "long-term memory",
            CognitiveDomain::WorkingMemory => "working memory",
            CognitiveDomain::Calculation => "calculation",
            CognitiveDomain::ExecutiveFunction => "executive function",
            CognitiveDomain::Reasoning => "reasoning",
            CognitiveDomain::Inhibition => "inhibition",
        }
    }
}
