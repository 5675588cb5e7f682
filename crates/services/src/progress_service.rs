use std::sync::Arc;

use tracing::{info, warn};

use storage::ProgressStore;
use vocab_core::model::{
    BADGES, Badge, BadgeStatus, Level, ProgressRecord, ProgressSummary, WordId, satisfied_badges,
};
use vocab_core::time::Clock;

use crate::error::ProgressError;

/// Points for mastering a word.
pub const MASTERED_WORD_POINTS: u32 = 10;
/// Bonus for every streak that reaches a multiple of [`STREAK_BONUS_EVERY`].
pub const STREAK_BONUS_POINTS: u32 = 50;
pub const STREAK_BONUS_EVERY: u32 = 7;
/// Points for moving to a new level.
pub const LEVEL_UP_POINTS: u32 = 100;

//
// ─── QUIZ OUTCOME ──────────────────────────────────────────────────────────────
//

/// Result of recording a finished quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizOutcome {
    pub progress: ProgressRecord,
    pub points: u32,
}

/// `round(correct * 5 * (1 + correct / total))`; a perfect quiz earns double.
///
/// Callers must ensure `total > 0`.
#[must_use]
pub fn quiz_points(correct: u32, total: u32) -> u32 {
    let correct = f64::from(correct);
    let total = f64::from(total);
    let points = (correct * 5.0 * (1.0 + correct / total)).round();

    // Bounded by 10 * correct, which fits in u32 for any realistic quiz.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let points = points.min(f64::from(u32::MAX)) as u32;
    points
}

/// Append every newly satisfied badge to `progress.badges`.
///
/// Returns the badges that were added, in catalog order. Running it again on
/// the same record adds nothing.
pub fn check_badges(progress: &mut ProgressRecord) -> Vec<&'static Badge> {
    let earned: Vec<&'static Badge> = satisfied_badges(progress)
        .filter(|badge| !progress.has_badge(badge.id))
        .collect();
    progress.badges.extend(earned.iter().map(|badge| badge.id));
    earned
}

fn award_points(progress: &mut ProgressRecord, points: u32) {
    progress.total_points = progress.total_points.saturating_add(points);
    for badge in check_badges(progress) {
        info!(badge = %badge.id, name = badge.name, "badge earned");
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Owns the learner's progress record and every rule that mutates it.
///
/// Each mutation loads the stored record once, applies its changes in memory
/// and persists the result before returning it. A record that exists but
/// cannot be read is never overwritten by a mutation.
#[derive(Clone)]
pub struct ProgressService {
    clock: Clock,
    store: Arc<dyn ProgressStore>,
}

impl ProgressService {
    #[must_use]
    pub fn new(clock: Clock, store: Arc<dyn ProgressStore>) -> Self {
        Self { clock, store }
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    /// The stored record, or the default when nothing is stored.
    ///
    /// Unreadable or malformed records are logged and read as the default.
    #[must_use]
    pub fn get_progress(&self) -> ProgressRecord {
        match self.store.load() {
            Ok(Some(progress)) => progress,
            Ok(None) => ProgressRecord::default(),
            Err(err) => {
                warn!(error = %err, "failed to load progress, using defaults");
                ProgressRecord::default()
            }
        }
    }

    /// Replace the stored record wholesale.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be written.
    pub fn save_progress(&self, progress: &ProgressRecord) -> Result<(), ProgressError> {
        self.store.save(progress)?;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be persisted.
    pub fn add_points(&self, points: u32) -> Result<ProgressRecord, ProgressError> {
        let mut progress = self.load_for_update()?;
        award_points(&mut progress, points);
        self.persist(progress)
    }

    /// Mark a word as mastered. Mastering a word twice changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be persisted.
    pub fn mark_word_as_mastered(&self, word_id: WordId) -> Result<ProgressRecord, ProgressError> {
        let mut progress = self.load_for_update()?;
        if !progress.mastered_words.insert(word_id) {
            return Ok(progress);
        }
        progress.stats.words_learned = progress.stats.words_learned.saturating_add(1);
        award_points(&mut progress, MASTERED_WORD_POINTS);
        self.persist(progress)
    }

    /// Record a finished quiz and award points for it.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::EmptyQuiz` when `total` is zero,
    /// `ProgressError::CorrectExceedsTotal` when `correct > total` and
    /// `ProgressError::Storage` if the record cannot be persisted. Rejected
    /// calls leave the stored record untouched.
    pub fn record_quiz_result(&self, correct: u32, total: u32) -> Result<QuizOutcome, ProgressError> {
        if total == 0 {
            return Err(ProgressError::EmptyQuiz);
        }
        if correct > total {
            return Err(ProgressError::CorrectExceedsTotal { correct, total });
        }

        let mut progress = self.load_for_update()?;
        let stats = &mut progress.stats;
        stats.quizzes_taken = stats.quizzes_taken.saturating_add(1);
        stats.correct_answers = stats.correct_answers.saturating_add(correct);
        stats.total_answers = stats.total_answers.saturating_add(total);

        let points = quiz_points(correct, total);
        award_points(&mut progress, points);
        let progress = self.persist(progress)?;
        Ok(QuizOutcome { progress, points })
    }

    /// Count today towards the study streak.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be persisted.
    pub fn update_streak(&self) -> Result<ProgressRecord, ProgressError> {
        let today = self.clock.today();
        let mut progress = self.load_for_update()?;
        if progress.last_study_date == Some(today) {
            return Ok(progress);
        }

        let continues = progress.last_study_date.is_some()
            && progress.last_study_date == today.pred_opt();
        progress.streak = if continues {
            progress.streak.saturating_add(1)
        } else {
            1
        };
        progress.last_study_date = Some(today);

        if progress.streak % STREAK_BONUS_EVERY == 0 {
            award_points(&mut progress, STREAK_BONUS_POINTS);
        }
        self.persist(progress)
    }

    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the record cannot be persisted.
    pub fn level_up(&self, level: Level) -> Result<ProgressRecord, ProgressError> {
        let mut progress = self.load_for_update()?;
        progress.level = level;
        award_points(&mut progress, LEVEL_UP_POINTS);
        self.persist(progress)
    }

    /// Drop the stored record and return a fresh default.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::Storage` if the stored record cannot be removed.
    pub fn reset_progress(&self) -> Result<ProgressRecord, ProgressError> {
        self.store.clear()?;
        Ok(ProgressRecord::default())
    }

    /// Every catalog badge with whether the learner holds it.
    #[must_use]
    pub fn all_badges(&self) -> Vec<BadgeStatus> {
        let progress = self.get_progress();
        BADGES
            .iter()
            .map(|badge| BadgeStatus {
                badge,
                earned: progress.has_badge(badge.id),
            })
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> ProgressSummary {
        self.get_progress().summary()
    }

    /// Like [`Self::get_progress`], but a failed load is an error rather than
    /// the default, so a mutation cannot replace an unreadable record.
    pub(crate) fn load_for_update(&self) -> Result<ProgressRecord, ProgressError> {
        match self.store.load() {
            Ok(progress) => Ok(progress.unwrap_or_default()),
            Err(err) => {
                warn!(error = %err, "refusing to update unreadable progress");
                Err(err.into())
            }
        }
    }

    fn persist(&self, progress: ProgressRecord) -> Result<ProgressRecord, ProgressError> {
        self.store.save(&progress)?;
        Ok(progress)
    }
}
