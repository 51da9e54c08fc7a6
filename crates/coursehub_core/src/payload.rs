//! crates/coursehub_core/src/payload.rs
//!
//! Raw, partially-specified shapes as they arrive from upstream sources.
//!
//! Every field is optional at every depth. `normalize` in the `progress` module is the
//! single place that turns these into a complete `ProgressView`. The `from_value`
//! constructors accept arbitrary JSON and drop whatever is malformed instead of failing,
//! so a bad upstream response degrades to "absent" rather than to an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{Difficulty, Problem, ProgressEntry, ProgressView, SampleFlags};

//=========================================================================================
// Raw progress payload
//=========================================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawByDifficulty {
    pub easy: Option<u32>,
    pub medium: Option<u32>,
    pub hard: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawStats {
    pub solved: Option<u32>,
    pub attempted: Option<u32>,
    pub bookmarked: Option<u32>,
    pub skipped: Option<u32>,
    pub by_difficulty: Option<RawByDifficulty>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProgress {
    pub solved: Option<Vec<ProgressEntry>>,
    pub attempted: Option<Vec<ProgressEntry>>,
    pub bookmarked: Option<Vec<ProgressEntry>>,
    pub skipped: Option<Vec<ProgressEntry>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProfile {
    pub ranking: Option<u32>,
    pub reputation: Option<u32>,
    pub star_rating: Option<f64>,
}

/// The best-effort input to the normalization pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressPayload {
    pub stats: Option<RawStats>,
    pub progress: Option<RawProgress>,
    pub profile: Option<RawProfile>,
    pub samples: Option<SampleFlags>,
}

impl ProgressPayload {
    /// Reads a payload out of arbitrary JSON. Never fails; unreadable parts become `None`.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        Self {
            stats: object_field(obj, &["stats"]).map(RawStats::from_object),
            progress: object_field(obj, &["progress"]).map(RawProgress::from_object),
            profile: object_field(obj, &["profile"]).map(RawProfile::from_object),
            samples: object_field(obj, &["samples"]).map(|o| SampleFlags {
                solved: bool_field(o, "solved"),
                attempted: bool_field(o, "attempted"),
                bookmarked: bool_field(o, "bookmarked"),
                skipped: bool_field(o, "skipped"),
            }),
        }
    }
}

impl RawStats {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            solved: count_field(obj, &["solved"]),
            attempted: count_field(obj, &["attempted"]),
            bookmarked: count_field(obj, &["bookmarked"]),
            skipped: count_field(obj, &["skipped"]),
            by_difficulty: object_field(obj, &["byDifficulty", "by_difficulty"]).map(|o| {
                RawByDifficulty {
                    easy: count_field(o, &["easy"]),
                    medium: count_field(o, &["medium"]),
                    hard: count_field(o, &["hard"]),
                }
            }),
        }
    }
}

impl RawProgress {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            solved: entries_field(obj, "solved"),
            attempted: entries_field(obj, "attempted"),
            bookmarked: entries_field(obj, "bookmarked"),
            skipped: entries_field(obj, "skipped"),
        }
    }
}

impl RawProfile {
    fn from_object(obj: &Map<String, Value>) -> Self {
        Self {
            ranking: count_field(obj, &["ranking"]),
            reputation: count_field(obj, &["reputation"]),
            star_rating: rating_field(obj, &["starRating", "star_rating"]),
        }
    }
}

impl From<ProgressView> for ProgressPayload {
    fn from(view: ProgressView) -> Self {
        let stats = view.stats;
        let profile = view.profile;
        Self {
            stats: Some(RawStats {
                solved: Some(stats.solved),
                attempted: Some(stats.attempted),
                bookmarked: Some(stats.bookmarked),
                skipped: Some(stats.skipped),
                by_difficulty: Some(RawByDifficulty {
                    easy: Some(stats.by_difficulty.easy),
                    medium: Some(stats.by_difficulty.medium),
                    hard: Some(stats.by_difficulty.hard),
                }),
            }),
            progress: Some(RawProgress {
                solved: Some(view.progress.solved),
                attempted: Some(view.progress.attempted),
                bookmarked: Some(view.progress.bookmarked),
                skipped: Some(view.progress.skipped),
            }),
            profile: Some(RawProfile {
                ranking: Some(profile.ranking),
                reputation: Some(profile.reputation),
                star_rating: Some(profile.star_rating),
            }),
            samples: Some(view.samples),
        }
    }
}

//=========================================================================================
// Remote judge profile
//=========================================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolvedBreakdown {
    pub easy: Option<u32>,
    pub medium: Option<u32>,
    pub hard: Option<u32>,
    pub total: Option<u32>,
}

impl SolvedBreakdown {
    /// The reported total, or the sum of whichever parts were reported.
    pub fn total_or_sum(&self) -> Option<u32> {
        self.total.or_else(|| {
            let parts = [self.easy, self.medium, self.hard];
            parts
                .iter()
                .any(Option::is_some)
                .then(|| parts.iter().flatten().sum())
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionSummary {
    pub total: Option<u32>,
    pub accepted: Option<u32>,
}

/// What a coding-judge profile API returned for a username. Any part may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JudgeProfile {
    pub solved: Option<SolvedBreakdown>,
    pub submissions: Option<SubmissionSummary>,
    pub profile: Option<RawProfile>,
}

impl JudgeProfile {
    /// Reads a judge response. Both the nested `{solved: {...}, profile: {...}}` shape and
    /// the flat `totalSolved`/`easySolved`/`ranking` shape used by public stats mirrors
    /// are understood.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let solved = match object_field(obj, &["solved"]) {
            Some(nested) => Some(SolvedBreakdown {
                easy: count_field(nested, &["easy"]),
                medium: count_field(nested, &["medium"]),
                hard: count_field(nested, &["hard"]),
                total: count_field(nested, &["total"]),
            }),
            None => {
                let flat = SolvedBreakdown {
                    easy: count_field(obj, &["easySolved"]),
                    medium: count_field(obj, &["mediumSolved"]),
                    hard: count_field(obj, &["hardSolved"]),
                    total: count_field(obj, &["totalSolved", "solvedProblem"]),
                };
                (flat != SolvedBreakdown::default()).then_some(flat)
            }
        };

        let submissions = object_field(obj, &["submissions"]).map(|o| SubmissionSummary {
            total: count_field(o, &["total"]),
            accepted: count_field(o, &["accepted"]),
        });

        let profile = match object_field(obj, &["profile"]) {
            Some(nested) => Some(RawProfile::from_object(nested)),
            None => {
                let flat = RawProfile::from_object(obj);
                (flat != RawProfile::default()).then_some(flat)
            }
        };

        Self {
            solved,
            submissions,
            profile,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.solved.is_none() && self.submissions.is_none() && self.profile.is_none()
    }
}

impl From<JudgeProfile> for ProgressPayload {
    fn from(judge: JudgeProfile) -> Self {
        let stats = judge.solved.map(|s| RawStats {
            solved: s.total_or_sum(),
            by_difficulty: Some(RawByDifficulty {
                easy: s.easy,
                medium: s.medium,
                hard: s.hard,
            }),
            ..RawStats::default()
        });
        Self {
            stats,
            progress: None,
            profile: judge.profile,
            samples: None,
        }
    }
}

//=========================================================================================
// Lenient field readers
//=========================================================================================

fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|k| obj.get(*k)).filter(|v| !v.is_null())
}

fn object_field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Map<String, Value>> {
    lookup(obj, keys).and_then(Value::as_object)
}

fn bool_field(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// A non-negative integer, given as a JSON number or a numeric string.
fn count_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<u32> {
    match lookup(obj, keys)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn rating_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<f64> {
    let rating = match lookup(obj, keys)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (rating.is_finite() && rating >= 0.0).then_some(rating)
}

/// Reads a list of progress entries, skipping any entry without a usable problem.
/// An absent key stays `None`; a present but non-array value reads as an empty list.
fn entries_field(obj: &Map<String, Value>, key: &str) -> Option<Vec<ProgressEntry>> {
    let value = lookup(obj, &[key])?;
    let entries = value
        .as_array()
        .map(|items| items.iter().filter_map(entry_from_value).collect())
        .unwrap_or_default();
    Some(entries)
}

fn entry_from_value(value: &Value) -> Option<ProgressEntry> {
    let obj = value.as_object()?;
    let problem = object_field(obj, &["problem"])?;

    let id = count_field(problem, &["id"])?;
    let title = lookup(problem, &["title"])
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_default();
    let difficulty = lookup(problem, &["difficulty"])
        .and_then(Value::as_str)
        .and_then(Difficulty::parse)?;
    let last_updated = lookup(obj, &["lastUpdated", "last_updated"])
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default();

    Some(ProgressEntry {
        problem: Problem {
            id,
            title,
            difficulty,
        },
        last_updated,
    })
}
