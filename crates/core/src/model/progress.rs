use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{BadgeId, Level, WordId, lenient};

//
// ─── STATS ─────────────────────────────────────────────────────────────────────
//

/// Cumulative study counters. All fields only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressStats {
    pub words_learned: u32,
    pub quizzes_taken: u32,
    pub correct_answers: u32,
    pub total_answers: u32,
}

impl ProgressStats {
    /// Overall accuracy as a whole percentage, `0` when nothing was answered.
    #[must_use]
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_answers == 0 {
            return 0;
        }
        let correct = f64::from(self.correct_answers);
        let total = f64::from(self.total_answers);
        // bounded to 0..=100 when correct <= total
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let pct = ((correct / total) * 100.0).round() as u32;
        pct
    }
}

//
// ─── PROGRESS RECORD ───────────────────────────────────────────────────────────
//

/// The learner's progress: a singleton per user/device.
///
/// This is the exact shape persisted by the local progress store. Sets are
/// ordered so the serialized form is stable across writes. Set entries that
/// do not parse (a badge id from another app version, say) are dropped on
/// load rather than failing the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub total_points: u32,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub last_study_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::word_id_set")]
    pub mastered_words: BTreeSet<WordId>,
    #[serde(default, deserialize_with = "lenient::badge_set")]
    pub badges: BTreeSet<BadgeId>,
    #[serde(default)]
    pub stats: ProgressStats,
}

impl ProgressRecord {
    #[must_use]
    pub fn has_badge(&self, id: BadgeId) -> bool {
        self.badges.contains(&id)
    }

    #[must_use]
    pub fn has_mastered(&self, id: WordId) -> bool {
        self.mastered_words.contains(&id)
    }

    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary {
            stats: self.stats,
            accuracy: self.stats.accuracy_percent(),
            level: self.level,
            total_points: self.total_points,
            streak: self.streak,
        }
    }
}

/// Read-only view used by progress screens and the CLI `stats` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    #[serde(flatten)]
    pub stats: ProgressStats,
    pub accuracy: u32,
    pub level: Level,
    pub total_points: u32,
    pub streak: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_record_serializes_to_documented_shape() {
        let json = serde_json::to_value(ProgressRecord::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "level": "A1",
                "totalPoints": 0,
                "streak": 0,
                "lastStudyDate": null,
                "masteredWords": [],
                "badges": [],
                "stats": {
                    "wordsLearned": 0,
                    "quizzesTaken": 0,
                    "correctAnswers": 0,
                    "totalAnswers": 0
                }
            })
        );
    }

    #[test]
    fn parses_partial_record_with_defaults() {
        let record: ProgressRecord =
            serde_json::from_str(r#"{"totalPoints": 40, "masteredWords": [3, 1, 3]}"#).unwrap();
        assert_eq!(record.total_points, 40);
        assert_eq!(record.mastered_words.len(), 2);
        assert_eq!(record.level, Level::A1);
        assert_eq!(record.stats, ProgressStats::default());
    }

    #[test]
    fn unknown_badge_ids_are_dropped_not_fatal() {
        let record: ProgressRecord = serde_json::from_str(
            r#"{
                "level": "B1",
                "totalPoints": 300,
                "badges": ["first_word", "legacy"],
                "masteredWords": [1, 2, "3", "x"]
            }"#,
        )
        .unwrap();
        assert_eq!(record.level, Level::B1);
        assert_eq!(record.total_points, 300);
        assert_eq!(record.badges, BTreeSet::from([BadgeId::FirstWord]));
        assert_eq!(
            record.mastered_words,
            BTreeSet::from([WordId::new(1), WordId::new(2), WordId::new(3)])
        );
    }

    #[test]
    fn accuracy_rounds_to_whole_percent() {
        let stats = ProgressStats {
            correct_answers: 2,
            total_answers: 3,
            ..ProgressStats::default()
        };
        assert_eq!(stats.accuracy_percent(), 67);
        assert_eq!(ProgressStats::default().accuracy_percent(), 0);
    }
}
