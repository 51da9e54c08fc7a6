//! crates/coursehub_core/src/progress.rs
//!
//! The progress normalization pipeline: turns a best-effort `ProgressPayload` into a
//! complete, render-safe `ProgressView`.
//!
//! The pipeline never fails. Absent parts are defaulted, and absent or empty progress
//! lists are filled from the deterministic samples in `crate::samples`. Everything that
//! is synthesized is recorded in `ProgressView::samples`, and feeding a normalized view
//! back through `normalize` returns it unchanged.

use crate::domain::{
    ByDifficulty, ProfileSummary, ProgressEntry, ProgressLists, ProgressStats, ProgressView,
    SampleFlags,
};
use crate::payload::{
    JudgeProfile, ProgressPayload, RawByDifficulty, RawProfile, RawProgress, RawStats,
};
use crate::samples::{SampleList, SampleSet, BACKFILL_SAMPLE, FULL_SAMPLE};

/// Produces a fully-populated view model from an optional raw payload.
pub fn normalize(payload: Option<ProgressPayload>) -> ProgressView {
    let payload = payload.unwrap_or_default();
    let mut samples = payload.samples.unwrap_or_default();

    // Steps 1 and 2: a stats record with a complete difficulty triple.
    let mut stats = stats_or_zero(payload.stats);

    // Steps 3 and 4: progress lists, synthesized or backfilled.
    let progress = match payload.progress {
        None => {
            let progress = synthesize(&FULL_SAMPLE);
            stats = stats_for(&progress);
            samples = SampleFlags {
                solved: true,
                attempted: true,
                bookmarked: true,
                skipped: true,
            };
            progress
        }
        Some(raw) => backfill(raw, &mut stats, &mut samples),
    };

    // Step 5: profile summary.
    let profile = profile_or_zero(payload.profile);

    ProgressView {
        stats,
        progress,
        profile,
        samples,
    }
}

/// Builds a view from a judge profile.
///
/// Judge APIs report counters but no per-problem lists, so the lists are synthesized and
/// flagged as samples while `solved` and `by_difficulty` keep the judge's numbers.
pub fn normalize_judge(judge: JudgeProfile) -> ProgressView {
    let payload = ProgressPayload::from(judge);
    let reported = payload.stats.map(|raw| stats_or_zero(Some(raw)));
    let mut view = normalize(Some(payload));
    if let Some(reported) = reported {
        view.stats.solved = reported.solved;
        view.stats.by_difficulty = reported.by_difficulty;
    }
    view
}

fn stats_or_zero(raw: Option<RawStats>) -> ProgressStats {
    let raw = raw.unwrap_or_default();
    ProgressStats {
        solved: raw.solved.unwrap_or(0),
        attempted: raw.attempted.unwrap_or(0),
        bookmarked: raw.bookmarked.unwrap_or(0),
        skipped: raw.skipped.unwrap_or(0),
        by_difficulty: difficulty_or_zero(raw.by_difficulty),
    }
}

fn difficulty_or_zero(raw: Option<RawByDifficulty>) -> ByDifficulty {
    let raw = raw.unwrap_or_default();
    ByDifficulty {
        easy: raw.easy.unwrap_or(0),
        medium: raw.medium.unwrap_or(0),
        hard: raw.hard.unwrap_or(0),
    }
}

fn profile_or_zero(raw: Option<RawProfile>) -> ProfileSummary {
    let raw = raw.unwrap_or_default();
    ProfileSummary {
        ranking: raw.ranking.unwrap_or(0),
        reputation: raw.reputation.unwrap_or(0),
        star_rating: raw.star_rating.unwrap_or(0.0),
    }
}

fn synthesize(set: &SampleSet) -> ProgressLists {
    ProgressLists {
        solved: set.entries(SampleList::Solved),
        attempted: set.entries(SampleList::Attempted),
        bookmarked: set.entries(SampleList::Bookmarked),
        skipped: set.entries(SampleList::Skipped),
    }
}

/// Counters derived entirely from a set of lists.
fn stats_for(progress: &ProgressLists) -> ProgressStats {
    ProgressStats {
        solved: count(&progress.solved),
        attempted: count(&progress.attempted),
        bookmarked: count(&progress.bookmarked),
        skipped: count(&progress.skipped),
        by_difficulty: ByDifficulty::tally(&progress.solved),
    }
}

fn count(entries: &[ProgressEntry]) -> u32 {
    u32::try_from(entries.len()).unwrap_or(u32::MAX)
}

/// Fills only the lists that are absent or empty. Lists holding real entries, and the
/// counters that describe them, are left exactly as they came in.
fn backfill(
    raw: RawProgress,
    stats: &mut ProgressStats,
    samples: &mut SampleFlags,
) -> ProgressLists {
    let mut fill = |list: Option<Vec<ProgressEntry>>, which: SampleList| -> Vec<ProgressEntry> {
        match list {
            Some(entries) if !entries.is_empty() => entries,
            _ => {
                let entries = BACKFILL_SAMPLE.entries(which);
                let n = count(&entries);
                match which {
                    SampleList::Solved => {
                        stats.solved = n;
                        stats.by_difficulty = ByDifficulty::tally(&entries);
                        samples.solved = true;
                    }
                    SampleList::Attempted => {
                        stats.attempted = n;
                        samples.attempted = true;
                    }
                    SampleList::Bookmarked => {
                        stats.bookmarked = n;
                        samples.bookmarked = true;
                    }
                    SampleList::Skipped => {
                        stats.skipped = n;
                        samples.skipped = true;
                    }
                }
                entries
            }
        }
    };

    ProgressLists {
        solved: fill(raw.solved, SampleList::Solved),
        attempted: fill(raw.attempted, SampleList::Attempted),
        bookmarked: fill(raw.bookmarked, SampleList::Bookmarked),
        skipped: fill(raw.skipped, SampleList::Skipped),
    }
}
