//! Max-wins reconciliation of a local progress record with its remote copy.
//!
//! Counters only ever grow under `ProgressService`, so taking the larger of
//! two candidates never loses work from either side. A counter that was
//! legitimately decreased would be resurrected by this merge.

use crate::model::{ProgressRecord, ProgressStats, RemoteProgressRow};

/// Merge `local` with the `remote` row field by field.
///
/// - counters (`total_points`, `streak`, all stats): `max`
/// - `last_study_date`: the later of the two
/// - `level`: remote when present, else local
/// - `mastered_words`, `badges`: set union (unknown remote badges dropped)
#[must_use]
pub fn merge_progress(local: &ProgressRecord, remote: &RemoteProgressRow) -> ProgressRecord {
    let theirs = |v: Option<u32>| v.unwrap_or(0);

    let mut mastered_words = local.mastered_words.clone();
    mastered_words.extend(remote.mastered_words.iter().flatten().copied());

    let mut badges = local.badges.clone();
    badges.extend(remote.known_badges());

    ProgressRecord {
        level: remote.current_level.unwrap_or(local.level),
        total_points: local.total_points.max(theirs(remote.total_points)),
        streak: local.streak.max(theirs(remote.streak_days)),
        last_study_date: local.last_study_date.max(remote.last_study_date),
        mastered_words,
        badges,
        stats: ProgressStats {
            words_learned: local.stats.words_learned.max(theirs(remote.words_learned)),
            quizzes_taken: local.stats.quizzes_taken.max(theirs(remote.quizzes_taken)),
            correct_answers: local
                .stats
                .correct_answers
                .max(theirs(remote.correct_answers)),
            total_answers: local.stats.total_answers.max(theirs(remote.total_answers)),
        },
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::NaiveDate;
    use proptest::prelude::*;

    use super::*;
    use crate::model::{BadgeId, Level, UserId, WordId};
    use crate::time::fixed_now;

    fn row(record: &ProgressRecord) -> RemoteProgressRow {
        RemoteProgressRow::from_record(UserId::random(), record, fixed_now())
    }

    fn counters(r: &ProgressRecord) -> (u32, u32, ProgressStats, Option<NaiveDate>) {
        (r.total_points, r.streak, r.stats, r.last_study_date)
    }

    #[test]
    fn unions_sets_and_takes_max_points() {
        let local = ProgressRecord {
            total_points: 100,
            mastered_words: BTreeSet::from([WordId::new(1), WordId::new(2)]),
            ..ProgressRecord::default()
        };
        let remote = ProgressRecord {
            total_points: 150,
            mastered_words: BTreeSet::from([WordId::new(2), WordId::new(3)]),
            ..ProgressRecord::default()
        };

        let merged = merge_progress(&local, &row(&remote));
        assert_eq!(merged.total_points, 150);
        assert_eq!(
            merged.mastered_words,
            BTreeSet::from([WordId::new(1), WordId::new(2), WordId::new(3)])
        );
    }

    #[test]
    fn null_remote_level_keeps_local_level() {
        let local = ProgressRecord {
            level: Level::B2,
            ..ProgressRecord::default()
        };
        let mut remote = row(&ProgressRecord::default());
        remote.current_level = None;
        assert_eq!(merge_progress(&local, &remote).level, Level::B2);

        remote.current_level = Some(Level::A2);
        assert_eq!(merge_progress(&local, &remote).level, Level::A2);
    }

    #[test]
    fn later_study_date_wins_and_absent_is_ignored() {
        let early = NaiveDate::from_ymd_opt(2024, 1, 2);
        let late = NaiveDate::from_ymd_opt(2024, 3, 4);
        let local = ProgressRecord {
            last_study_date: late,
            ..ProgressRecord::default()
        };
        let mut remote = row(&ProgressRecord {
            last_study_date: early,
            ..ProgressRecord::default()
        });
        assert_eq!(merge_progress(&local, &remote).last_study_date, late);

        remote.last_study_date = None;
        let local_none = ProgressRecord::default();
        assert_eq!(merge_progress(&local_none, &remote).last_study_date, None);
    }

    #[test]
    fn unknown_remote_badges_are_dropped() {
        let mut remote = row(&ProgressRecord::default());
        remote.badges = Some(vec!["streak_7".into(), "retired_badge".into()]);
        let merged = merge_progress(&ProgressRecord::default(), &remote);
        assert_eq!(merged.badges, BTreeSet::from([BadgeId::Streak7]));
    }

    fn arb_record() -> impl Strategy<Value = ProgressRecord> {
        (
            0u32..5_000,
            0u32..400,
            proptest::option::of(0i64..2_000),
            proptest::collection::btree_set(0u64..50, 0..10),
            proptest::collection::btree_set(0usize..11, 0..5),
            (0u32..200, 0u32..100, 0u32..500, 0u32..500),
            0usize..4,
        )
            .prop_map(
                |(points, streak, day, words, badges, (learned, quizzes, a, b), level)| {
                    let base = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
                    ProgressRecord {
                        level: Level::ALL[level],
                        total_points: points,
                        streak,
                        last_study_date: day.map(|d| base + chrono::Duration::days(d)),
                        mastered_words: words.into_iter().map(WordId::new).collect(),
                        badges: badges
                            .into_iter()
                            .map(|i| crate::model::BADGES[i].id)
                            .collect(),
                        stats: ProgressStats {
                            words_learned: learned,
                            quizzes_taken: quizzes,
                            correct_answers: a.min(b),
                            total_answers: a.max(b),
                        },
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn merge_is_commutative_on_monotonic_fields(a in arb_record(), b in arb_record()) {
            let ab = merge_progress(&a, &row(&b));
            let ba = merge_progress(&b, &row(&a));
            prop_assert_eq!(ab.total_points, a.total_points.max(b.total_points));
            prop_assert_eq!(counters(&ab), counters(&ba));
            prop_assert_eq!(&ab.mastered_words, &ba.mastered_words);
            prop_assert_eq!(&ab.badges, &ba.badges);
        }

        #[test]
        fn merge_is_idempotent(a in arb_record(), b in arb_record()) {
            let remote = row(&b);
            let once = merge_progress(&a, &remote);
            let twice = merge_progress(&once, &remote);
            prop_assert_eq!(&once, &twice);
        }

        #[test]
        fn merge_never_shrinks_local(a in arb_record(), b in arb_record()) {
            let merged = merge_progress(&a, &row(&b));
            prop_assert!(merged.total_points >= a.total_points);
            prop_assert!(merged.stats.words_learned >= a.stats.words_learned);
            prop_assert!(merged.mastered_words.is_superset(&a.mastered_words));
            prop_assert!(merged.badges.is_superset(&a.badges));
        }
    }
}
