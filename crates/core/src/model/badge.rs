use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::ProgressRecord;

//
// ─── BADGE IDS ─────────────────────────────────────────────────────────────────
//

/// Identifier of an achievement in the static catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BadgeId {
    #[serde(rename = "first_word")]
    FirstWord,
    #[serde(rename = "word_master_10")]
    WordMaster10,
    #[serde(rename = "word_master_50")]
    WordMaster50,
    #[serde(rename = "word_master_100")]
    WordMaster100,
    #[serde(rename = "quiz_master_5")]
    QuizMaster5,
    #[serde(rename = "quiz_master_20")]
    QuizMaster20,
    #[serde(rename = "accuracy_80")]
    Accuracy80,
    #[serde(rename = "streak_7")]
    Streak7,
    #[serde(rename = "streak_30")]
    Streak30,
    #[serde(rename = "points_500")]
    Points500,
    #[serde(rename = "points_1000")]
    Points1000,
}

impl BadgeId {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            BadgeId::FirstWord => "first_word",
            BadgeId::WordMaster10 => "word_master_10",
            BadgeId::WordMaster50 => "word_master_50",
            BadgeId::WordMaster100 => "word_master_100",
            BadgeId::QuizMaster5 => "quiz_master_5",
            BadgeId::QuizMaster20 => "quiz_master_20",
            BadgeId::Accuracy80 => "accuracy_80",
            BadgeId::Streak7 => "streak_7",
            BadgeId::Streak30 => "streak_30",
            BadgeId::Points500 => "points_500",
            BadgeId::Points1000 => "points_1000",
        }
    }

    /// Catalog entry for this id.
    #[must_use]
    pub fn badge(self) -> &'static Badge {
        // BADGES is declared in variant order.
        &BADGES[self as usize]
    }
}

impl fmt::Display for BadgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a badge id is not part of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown badge id: {0}")]
pub struct UnknownBadge(pub String);

impl FromStr for BadgeId {
    type Err = UnknownBadge;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BADGES
            .iter()
            .map(|badge| badge.id)
            .find(|id| id.as_str() == s)
            .ok_or_else(|| UnknownBadge(s.to_string()))
    }
}

//
// ─── RULES ─────────────────────────────────────────────────────────────────────
//

/// Threshold over cumulative progress that unlocks a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeRule {
    WordsLearned(u32),
    QuizzesTaken(u32),
    /// Overall accuracy of at least `percent`, once anything was answered.
    Accuracy { percent: u32 },
    Streak(u32),
    TotalPoints(u32),
}

impl BadgeRule {
    /// Pure predicate over the record.
    #[must_use]
    pub fn is_met(self, progress: &ProgressRecord) -> bool {
        let stats = &progress.stats;
        match self {
            BadgeRule::WordsLearned(n) => stats.words_learned >= n,
            BadgeRule::QuizzesTaken(n) => stats.quizzes_taken >= n,
            BadgeRule::Accuracy { percent } => {
                stats.total_answers > 0
                    && u64::from(stats.correct_answers) * 100
                        >= u64::from(stats.total_answers) * u64::from(percent)
            }
            BadgeRule::Streak(n) => progress.streak >= n,
            BadgeRule::TotalPoints(n) => progress.total_points >= n,
        }
    }
}

//
// ─── CATALOG ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Badge {
    pub id: BadgeId,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub rule: BadgeRule,
}

impl Badge {
    #[must_use]
    pub fn is_met(&self, progress: &ProgressRecord) -> bool {
        self.rule.is_met(progress)
    }
}

pub static BADGES: [Badge; 11] = [
    Badge {
        id: BadgeId::FirstWord,
        name: "First Steps",
        description: "Learn your first word",
        icon: "🌱",
        rule: BadgeRule::WordsLearned(1),
    },
    Badge {
        id: BadgeId::WordMaster10,
        name: "Word Rookie",
        description: "Master 10 words",
        icon: "📚",
        rule: BadgeRule::WordsLearned(10),
    },
    Badge {
        id: BadgeId::WordMaster50,
        name: "Word Enthusiast",
        description: "Master 50 words",
        icon: "📖",
        rule: BadgeRule::WordsLearned(50),
    },
    Badge {
        id: BadgeId::WordMaster100,
        name: "Word Master",
        description: "Master 100 words",
        icon: "🎓",
        rule: BadgeRule::WordsLearned(100),
    },
    Badge {
        id: BadgeId::QuizMaster5,
        name: "Practitioner",
        description: "Complete 5 quizzes",
        icon: "✏️",
        rule: BadgeRule::QuizzesTaken(5),
    },
    Badge {
        id: BadgeId::QuizMaster20,
        name: "Quiz Expert",
        description: "Complete 20 quizzes",
        icon: "📝",
        rule: BadgeRule::QuizzesTaken(20),
    },
    Badge {
        id: BadgeId::Accuracy80,
        name: "Sharpshooter",
        description: "Reach 80% overall accuracy",
        icon: "🎯",
        rule: BadgeRule::Accuracy { percent: 80 },
    },
    Badge {
        id: BadgeId::Streak7,
        name: "Persistent",
        description: "Study 7 days in a row",
        icon: "🔥",
        rule: BadgeRule::Streak(7),
    },
    Badge {
        id: BadgeId::Streak30,
        name: "Habit Formed",
        description: "Study 30 days in a row",
        icon: "⭐",
        rule: BadgeRule::Streak(30),
    },
    Badge {
        id: BadgeId::Points500,
        name: "Point Collector",
        description: "Earn 500 points",
        icon: "💎",
        rule: BadgeRule::TotalPoints(500),
    },
    Badge {
        id: BadgeId::Points1000,
        name: "Point Master",
        description: "Earn 1000 points",
        icon: "👑",
        rule: BadgeRule::TotalPoints(1000),
    },
];

/// Catalog entries whose rule holds for `progress`, in catalog order.
///
/// Pure: does not look at or touch `progress.badges`.
pub fn satisfied_badges(progress: &ProgressRecord) -> impl Iterator<Item = &'static Badge> + '_ {
    BADGES.iter().filter(move |badge| badge.is_met(progress))
}

/// A catalog entry paired with whether the learner holds it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeStatus {
    pub badge: &'static Badge,
    pub earned: bool,
}
