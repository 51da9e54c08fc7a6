//! crates/coursehub_core/src/samples.rs
//!
//! Deterministic placeholder progress used when a learner has no recorded activity.
//!
//! Entries are drawn from fixed seed lists and stamped relative to a fixed anchor, so
//! the same request always yields byte-identical output.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::domain::{Difficulty, Problem, ProgressEntry};

const EASY_SEEDS: &[(u32, &str)] = &[
    (1, "Two Sum"),
    (9, "Palindrome Number"),
    (13, "Roman to Integer"),
    (14, "Longest Common Prefix"),
    (20, "Valid Parentheses"),
    (21, "Merge Two Sorted Lists"),
    (26, "Remove Duplicates from Sorted Array"),
    (35, "Search Insert Position"),
    (70, "Climbing Stairs"),
    (121, "Best Time to Buy and Sell Stock"),
    (141, "Linked List Cycle"),
    (206, "Reverse Linked List"),
    (217, "Contains Duplicate"),
];

const MEDIUM_SEEDS: &[(u32, &str)] = &[
    (2, "Add Two Numbers"),
    (3, "Longest Substring Without Repeating Characters"),
    (5, "Longest Palindromic Substring"),
    (11, "Container With Most Water"),
    (15, "3Sum"),
    (33, "Search in Rotated Sorted Array"),
    (46, "Permutations"),
    (53, "Maximum Subarray"),
    (56, "Merge Intervals"),
    (62, "Unique Paths"),
    (98, "Validate Binary Search Tree"),
    (200, "Number of Islands"),
];

const HARD_SEEDS: &[(u32, &str)] = &[
    (4, "Median of Two Sorted Arrays"),
    (23, "Merge k Sorted Lists"),
    (42, "Trapping Rain Water"),
    (76, "Minimum Window Substring"),
    (124, "Binary Tree Maximum Path Sum"),
    (295, "Find Median from Data Stream"),
];

/// How many entries of each difficulty a sample list holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleShape {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl SampleShape {
    pub const fn new(easy: usize, medium: usize, hard: usize) -> Self {
        Self { easy, medium, hard }
    }

    pub const fn len(&self) -> usize {
        self.easy + self.medium + self.hard
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The shapes of one complete sample data set, one per progress list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleSet {
    pub solved: SampleShape,
    pub attempted: SampleShape,
    pub bookmarked: SampleShape,
    pub skipped: SampleShape,
}

/// Used when the learner has no progress record at all.
pub const FULL_SAMPLE: SampleSet = SampleSet {
    solved: SampleShape::new(8, 5, 2),
    attempted: SampleShape::new(1, 3, 1),
    bookmarked: SampleShape::new(1, 2, 1),
    skipped: SampleShape::new(1, 1, 1),
};

/// Used to backfill individual empty lists of an existing record.
pub const BACKFILL_SAMPLE: SampleSet = SampleSet {
    solved: SampleShape::new(2, 1, 0),
    attempted: SampleShape::new(1, 1, 0),
    bookmarked: SampleShape::new(0, 1, 1),
    skipped: SampleShape::new(0, 0, 1),
};

/// Which list a sample is generated for. Each list draws from a disjoint
/// slice of the seed tables so a problem never shows up as both solved and skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleList {
    Solved,
    Attempted,
    Bookmarked,
    Skipped,
}

impl SampleList {
    fn ordinal(self) -> usize {
        match self {
            SampleList::Solved => 0,
            SampleList::Attempted => 1,
            SampleList::Bookmarked => 2,
            SampleList::Skipped => 3,
        }
    }
}

impl SampleSet {
    pub fn shape(&self, list: SampleList) -> SampleShape {
        match list {
            SampleList::Solved => self.solved,
            SampleList::Attempted => self.attempted,
            SampleList::Bookmarked => self.bookmarked,
            SampleList::Skipped => self.skipped,
        }
    }

    /// Builds the entries for one list of this set.
    ///
    /// Seeds for a list start after the seeds consumed by the lists before it, and wrap
    /// around if a table runs out.
    pub fn entries(&self, list: SampleList) -> Vec<ProgressEntry> {
        let lists = [
            SampleList::Solved,
            SampleList::Attempted,
            SampleList::Bookmarked,
            SampleList::Skipped,
        ];
        let (mut easy, mut medium, mut hard) = (0, 0, 0);
        for preceding in &lists[..list.ordinal()] {
            let shape = self.shape(*preceding);
            easy += shape.easy;
            medium += shape.medium;
            hard += shape.hard;
        }

        let shape = self.shape(list);
        let mut entries = Vec::with_capacity(shape.len());
        entries.extend(take_seeds(EASY_SEEDS, Difficulty::Easy, easy, shape.easy));
        entries.extend(take_seeds(MEDIUM_SEEDS, Difficulty::Medium, medium, shape.medium));
        entries.extend(take_seeds(HARD_SEEDS, Difficulty::Hard, hard, shape.hard));

        let base = anchor() - Duration::days(7 * list.ordinal() as i64);
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.last_updated = base - Duration::hours(6 * i as i64);
        }
        entries
    }
}

fn take_seeds(
    seeds: &'static [(u32, &'static str)],
    difficulty: Difficulty,
    skip: usize,
    count: usize,
) -> impl Iterator<Item = ProgressEntry> {
    seeds
        .iter()
        .cycle()
        .skip(skip)
        .take(count)
        .map(move |(id, title)| ProgressEntry {
            problem: Problem {
                id: *id,
                title: (*title).to_string(),
                difficulty,
            },
            last_updated: DateTime::<Utc>::default(),
        })
}

/// Fixed reference instant that sample timestamps count back from.
fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or_default()
}
