pub mod catalog;
pub mod domain;
pub mod payload;
pub mod ports;
pub mod progress;
pub mod samples;

pub use catalog::{query_catalog, CatalogSummary};
pub use domain::{
    ByDifficulty, CategoryFilter, Course, Difficulty, FilterState, Instructor, Problem,
    ProfileSummary, ProgressEntry, ProgressLists, ProgressStats, ProgressView, RatingAndReview,
    SampleFlags, SortOption,
};
pub use payload::{JudgeProfile, ProgressPayload};
pub use ports::{
    CourseCatalogService, JudgeProfileService, LinkedAccountStore, PortError, PortResult,
};
pub use progress::{normalize, normalize_judge};
