//! crates/coursehub_core/src/domain.rs
//!
//! Defines the pure, core data structures for the marketplace.
//! These structs are independent of any database, HTTP client or UI runtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const UNKNOWN_INSTRUCTOR: &str = "Unknown Instructor";

//=========================================================================================
// Catalog
//=========================================================================================

/// The person teaching a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub first_name: String,
    pub last_name: String,
}

/// A single rating left by a student, optionally with a written review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingAndReview {
    pub rating: f64,
    #[serde(default)]
    pub review: Option<String>,
}

/// A course as listed in a category catalog. Read-only to the query engine.
///
/// Collections that upstream records frequently omit are optional; the helper
/// methods below give every consumer the same neutral defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub tag: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub instructor: Option<Instructor>,
    #[serde(default)]
    pub rating_and_reviews: Option<Vec<RatingAndReview>>,
    #[serde(default)]
    pub students_enrolled: Option<Vec<Uuid>>,
}

impl Course {
    /// The course tags, empty when the record carries none.
    pub fn tags(&self) -> &[String] {
        self.tag.as_deref().unwrap_or(&[])
    }

    /// `"<first> <last>"`, or `None` when the record has no instructor.
    pub fn instructor_full_name(&self) -> Option<String> {
        self.instructor
            .as_ref()
            .map(|i| format!("{} {}", i.first_name, i.last_name))
    }

    /// Display name for the instructor, falling back to a neutral placeholder.
    pub fn instructor_name(&self) -> String {
        self.instructor_full_name()
            .unwrap_or_else(|| UNKNOWN_INSTRUCTOR.to_string())
    }

    pub fn review_count(&self) -> usize {
        self.rating_and_reviews.as_ref().map_or(0, Vec::len)
    }

    /// Mean rating across all reviews; 0 for a course nobody has reviewed yet.
    pub fn average_rating(&self) -> f64 {
        let reviews = self.rating_and_reviews.as_deref().unwrap_or(&[]);
        let sum: f64 = reviews.iter().map(|r| r.rating).sum();
        sum / reviews.len().max(1) as f64
    }

    pub fn enrollment_count(&self) -> usize {
        self.students_enrolled.as_ref().map_or(0, Vec::len)
    }
}

/// The category chips shown above a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryFilter {
    #[default]
    All,
    Popular,
    New,
    Beginner,
    Advanced,
}

/// The sort dropdown shown above a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOption {
    #[default]
    Relevance,
    PriceLow,
    PriceHigh,
    Rating,
}

/// User-entered catalog parameters. The three fields are independent of each other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    #[serde(default)]
    pub active_filter: CategoryFilter,
    #[serde(default)]
    pub sort_option: SortOption,
    #[serde(default)]
    pub search_query: String,
}

//=========================================================================================
// Progress
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Case-insensitive parse; anything unrecognised is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A judge problem referenced by a progress entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub id: u32,
    pub title: String,
    pub difficulty: Difficulty,
}

/// One solved/attempted/bookmarked/skipped item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    pub problem: Problem,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ByDifficulty {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl ByDifficulty {
    /// Sum of the three counters, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        self.easy.saturating_add(self.medium).saturating_add(self.hard)
    }

    /// Counts the entries of a list per difficulty.
    pub fn tally(entries: &[ProgressEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut acc, e| {
            match e.problem.difficulty {
                Difficulty::Easy => acc.easy += 1,
                Difficulty::Medium => acc.medium += 1,
                Difficulty::Hard => acc.hard += 1,
            }
            acc
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub solved: u32,
    pub attempted: u32,
    pub bookmarked: u32,
    pub skipped: u32,
    pub by_difficulty: ByDifficulty,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressLists {
    pub solved: Vec<ProgressEntry>,
    pub attempted: Vec<ProgressEntry>,
    pub bookmarked: Vec<ProgressEntry>,
    pub skipped: Vec<ProgressEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSummary {
    pub ranking: u32,
    pub reputation: u32,
    pub star_rating: f64,
}

/// Records which progress lists hold placeholder data rather than real entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleFlags {
    #[serde(default)]
    pub solved: bool,
    #[serde(default)]
    pub attempted: bool,
    #[serde(default)]
    pub bookmarked: bool,
    #[serde(default)]
    pub skipped: bool,
}

impl SampleFlags {
    pub fn any(&self) -> bool {
        self.solved || self.attempted || self.bookmarked || self.skipped
    }
}

/// The fully-populated dashboard view model. Every field is guaranteed present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressView {
    pub stats: ProgressStats,
    pub progress: ProgressLists,
    pub profile: ProfileSummary,
    pub samples: SampleFlags,
}
