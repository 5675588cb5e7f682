//! Tolerant field decoders for progress data written by other app versions
//! or returned by the remote store.
//!
//! A bad entry is dropped (and logged) instead of failing the whole record.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::model::{BadgeId, Level, WordId};

#[derive(Deserialize)]
#[serde(untagged)]
enum Entry<T> {
    Value(T),
    Text(String),
    Other(#[allow(dead_code)] IgnoredAny),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum List<T> {
    Items(Vec<Entry<T>>),
    Other(#[allow(dead_code)] IgnoredAny),
}

fn entries<'de, D, T>(deserializer: D, field: &'static str) -> Result<Vec<Entry<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<List<T>>::deserialize(deserializer)? {
        Some(List::Items(items)) => items,
        Some(List::Other(_)) => {
            warn!(field, "expected a list, ignoring value");
            Vec::new()
        }
        None => Vec::new(),
    })
}

fn word_id(entry: Entry<WordId>) -> Option<WordId> {
    match entry {
        Entry::Value(id) => Some(id),
        Entry::Text(raw) => match raw.trim().parse() {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(word_id = %raw, "dropping non-numeric word id");
                None
            }
        },
        Entry::Other(_) => {
            warn!("dropping malformed word id");
            None
        }
    }
}

pub(crate) fn badge_set<'de, D>(deserializer: D) -> Result<BTreeSet<BadgeId>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut badges = BTreeSet::new();
    for entry in entries::<D, BadgeId>(deserializer, "badges")? {
        match entry {
            Entry::Value(id) => {
                badges.insert(id);
            }
            Entry::Text(raw) => warn!(badge = %raw, "dropping unknown badge id"),
            Entry::Other(_) => warn!("dropping malformed badge id"),
        }
    }
    Ok(badges)
}

pub(crate) fn word_id_set<'de, D>(deserializer: D) -> Result<BTreeSet<WordId>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(entries(deserializer, "masteredWords")?
        .into_iter()
        .filter_map(word_id)
        .collect())
}

pub(crate) fn word_id_list<'de, D>(deserializer: D) -> Result<Option<Vec<WordId>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<List<WordId>>::deserialize(deserializer)? {
        Some(List::Items(items)) => Ok(Some(items.into_iter().filter_map(word_id).collect())),
        Some(List::Other(_)) => {
            warn!(field = "mastered_words", "expected a list, ignoring value");
            Ok(None)
        }
        None => Ok(None),
    }
}

/// Strings only; unknown ids are kept so the caller can report them.
pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<List<String>>::deserialize(deserializer)? {
        Some(List::Items(items)) => Ok(Some(
            items
                .into_iter()
                .filter_map(|entry| match entry {
                    Entry::Value(raw) | Entry::Text(raw) => Some(raw),
                    Entry::Other(_) => None,
                })
                .collect(),
        )),
        Some(List::Other(_)) => {
            warn!(field = "badges", "expected a list, ignoring value");
            Ok(None)
        }
        None => Ok(None),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DateLike {
    Date(NaiveDate),
    Timestamp(DateTime<FixedOffset>),
    LocalTimestamp(NaiveDateTime),
    Other(#[allow(dead_code)] IgnoredAny),
}

/// A calendar date, or the date part of a timestamp column.
pub(crate) fn calendar_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<DateLike>::deserialize(deserializer)? {
        Some(DateLike::Date(date)) => Some(date),
        Some(DateLike::Timestamp(at)) => Some(at.date_naive()),
        Some(DateLike::LocalTimestamp(at)) => Some(at.date()),
        Some(DateLike::Other(_)) => {
            warn!(field = "last_study_date", "unreadable date, ignoring value");
            None
        }
        None => None,
    })
}

/// An instant; a timestamp without an offset is taken as UTC.
pub(crate) fn instant<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<DateLike>::deserialize(deserializer)? {
        Some(DateLike::Timestamp(at)) => Some(at.with_timezone(&Utc)),
        Some(DateLike::LocalTimestamp(at)) => Some(at.and_utc()),
        Some(DateLike::Date(_) | DateLike::Other(_)) | None => None,
    })
}

pub(crate) fn known_level<'de, D>(deserializer: D) -> Result<Option<Level>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Entry<Level>>::deserialize(deserializer)? {
        Some(Entry::Value(level)) => Some(level),
        Some(Entry::Text(raw)) => {
            warn!(level = %raw, "unknown level, ignoring value");
            None
        }
        Some(Entry::Other(_)) | None => None,
    })
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Count {
    Number(u32),
    Text(String),
    Other(#[allow(dead_code)] IgnoredAny),
}

/// A non-negative counter, also accepted as a numeric string.
pub(crate) fn count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Count>::deserialize(deserializer)? {
        Some(Count::Number(value)) => Some(value),
        Some(Count::Text(raw)) => raw.trim().parse().ok(),
        Some(Count::Other(_)) | None => None,
    })
}
