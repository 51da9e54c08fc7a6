//! crates/coursehub_core/src/catalog.rs
//!
//! The catalog query engine: search, category filter and sort over a course list.
//!
//! Each stage is a pure predicate or comparator over course fields, so the stages can be
//! reasoned about independently. The input slice is never modified; the caller gets a
//! fresh `Vec`. Nothing in here can fail: missing instructors, tags or reviews fall back
//! to neutral values.

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::{CategoryFilter, Course, FilterState, SortOption};

/// Tags that mark a course as suitable for newcomers.
pub const BEGINNER_TAGS: &[&str] = &["beginner", "basics", "fundamental", "introduction"];

/// Tags that mark a course as aimed at experienced learners.
pub const ADVANCED_TAGS: &[&str] = &["advanced", "expert", "professional"];

/// Runs search, category filter and sort, in that order, and returns the display list.
pub fn query_catalog(courses: Option<&[Course]>, state: &FilterState) -> Vec<Course> {
    let courses = courses.unwrap_or(&[]);
    let query = state.search_query.trim().to_lowercase();

    let mut results: Vec<Course> = courses
        .iter()
        .filter(|c| query.is_empty() || matches_search(c, &query))
        .filter(|c| passes_category(c, state.active_filter))
        .cloned()
        .collect();

    // `sort_by` is stable, so equal keys keep their relative order.
    match state.active_filter {
        CategoryFilter::Popular => results.sort_by(|a, b| b.review_count().cmp(&a.review_count())),
        CategoryFilter::New => results.sort_by(newest_first),
        CategoryFilter::All | CategoryFilter::Beginner | CategoryFilter::Advanced => {}
    }

    match state.sort_option {
        SortOption::Relevance => {}
        SortOption::PriceLow => results.sort_by(|a, b| a.price.total_cmp(&b.price)),
        SortOption::PriceHigh => results.sort_by(|a, b| b.price.total_cmp(&a.price)),
        SortOption::Rating => {
            results.sort_by(|a, b| b.average_rating().total_cmp(&a.average_rating()))
        }
    }

    results
}

/// Case-insensitive substring match against the name, the instructor's full name and
/// every tag. `query` must already be lowercased.
pub fn matches_search(course: &Course, query: &str) -> bool {
    course.name.to_lowercase().contains(query)
        || course
            .instructor_full_name()
            .is_some_and(|name| name.to_lowercase().contains(query))
        || course
            .tags()
            .iter()
            .any(|tag| tag.to_lowercase().contains(query))
}

/// Whole-tag, case-insensitive membership test against a level lexicon.
pub fn matches_level(course: &Course, lexicon: &[&str]) -> bool {
    course
        .tags()
        .iter()
        .map(|tag| tag.trim().to_lowercase())
        .any(|tag| lexicon.contains(&tag.as_str()))
}

fn passes_category(course: &Course, filter: CategoryFilter) -> bool {
    match filter {
        CategoryFilter::Beginner => matches_level(course, BEGINNER_TAGS),
        CategoryFilter::Advanced => matches_level(course, ADVANCED_TAGS),
        CategoryFilter::All | CategoryFilter::Popular | CategoryFilter::New => true,
    }
}

/// Descending by creation time; undated courses go last.
fn newest_first(a: &Course, b: &Course) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Counts shown next to a catalog listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogSummary {
    pub total: usize,
    pub returned: usize,
}

impl CatalogSummary {
    pub fn new(courses: Option<&[Course]>, results: &[Course]) -> Self {
        Self {
            total: courses.map_or(0, <[Course]>::len),
            returned: results.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Instructor, RatingAndReview};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn course(name: &str, price: f64) -> Course {
        Course {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            price,
            tag: None,
            created_at: None,
            instructor: None,
            rating_and_reviews: None,
            students_enrolled: None,
        }
    }

    fn tagged(name: &str, tags: &[&str]) -> Course {
        Course {
            tag: Some(tags.iter().map(|t| t.to_string()).collect()),
            ..course(name, 10.0)
        }
    }

    fn rated(name: &str, ratings: &[f64]) -> Course {
        Course {
            rating_and_reviews: Some(
                ratings
                    .iter()
                    .map(|r| RatingAndReview {
                        rating: *r,
                        review: None,
                    })
                    .collect(),
            ),
            ..course(name, 10.0)
        }
    }

    fn names(courses: &[Course]) -> Vec<&str> {
        courses.iter().map(|c| c.name.as_str()).collect()
    }

    fn state(filter: CategoryFilter, sort: SortOption, query: &str) -> FilterState {
        FilterState {
            active_filter: filter,
            sort_option: sort,
            search_query: query.to_string(),
        }
    }

    #[test]
    fn absent_or_empty_input_yields_empty_output() {
        let s = FilterState::default();
        assert!(query_catalog(None, &s).is_empty());
        assert!(query_catalog(Some(&[][..]), &s).is_empty());
    }

    #[test]
    fn default_state_is_identity() {
        let courses = vec![course("B", 3.0), course("A", 1.0), course("C", 2.0)];
        let out = query_catalog(Some(courses.as_slice()), &FilterState::default());
        assert_eq!(out, courses);
    }

    #[test]
    fn search_matches_instructor_full_name() {
        let mut taught = course("Data Structures", 20.0);
        taught.instructor = Some(Instructor {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        });
        let courses = vec![taught, course("Ada for Beginners", 5.0), course("Rust", 5.0)];

        let out = query_catalog(
            Some(courses.as_slice()),
            &state(CategoryFilter::All, SortOption::Relevance, "ada love"),
        );
        assert_eq!(names(&out), vec!["Data Structures"]);
    }

    #[test]
    fn search_without_instructor_does_not_panic() {
        let courses = vec![course("Go", 1.0)];
        let out = query_catalog(
            Some(courses.as_slice()),
            &state(CategoryFilter::All, SortOption::Relevance, "unknown instructor"),
        );
        assert!(out.is_empty());
    }

    #[test]
    fn whitespace_query_is_ignored() {
        let courses = vec![course("Go", 1.0), course("Rust", 2.0)];
        let out = query_catalog(
            Some(courses.as_slice()),
            &state(CategoryFilter::All, SortOption::Relevance, "   "),
        );
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn beginner_filter_uses_whole_tag_lexicon() {
        let courses = vec![
            tagged("Intro", &["Introduction"]),
            tagged("Basics", &[" BASICS "]),
            tagged("Advanced", &["Advanced"]),
            tagged("Beginnerish", &["Beginner-friendly"]),
            course("Untagged", 1.0),
        ];
        let out = query_catalog(
            Some(courses.as_slice()),
            &state(CategoryFilter::Beginner, SortOption::Relevance, ""),
        );
        assert_eq!(names(&out), vec!["Intro", "Basics"]);
    }

    #[test]
    fn popular_reorders_by_review_count_without_removing() {
        let courses = vec![
            rated("One", &[5.0]),
            course("None", 1.0),
            rated("Three", &[3.0, 4.0, 2.0]),
            rated("AlsoOne", &[1.0]),
        ];
        let out = query_catalog(
            Some(courses.as_slice()),
            &state(CategoryFilter::Popular, SortOption::Relevance, ""),
        );
        assert_eq!(names(&out), vec!["Three", "One", "AlsoOne", "None"]);
    }

    #[test]
    fn new_reorders_by_creation_time_with_undated_last() {
        let mut old = course("Old", 1.0);
        old.created_at = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).single();
        let mut fresh = course("Fresh", 1.0);
        fresh.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).single();
        let undated = course("Undated", 1.0);

        let courses = vec![undated, old, fresh];
        let out = query_catalog(
            Some(courses.as_slice()),
            &state(CategoryFilter::New, SortOption::Relevance, ""),
        );
        assert_eq!(names(&out), vec!["Fresh", "Old", "Undated"]);
    }

    #[test]
    fn price_high_sorts_descending_and_keeps_ties_in_order() {
        let courses = vec![
            course("A", 10.0),
            course("B", 99.0),
            course("C", 10.0),
            course("D", 0.0),
        ];
        let out = query_catalog(
            Some(courses.as_slice()),
            &state(CategoryFilter::All, SortOption::PriceHigh, ""),
        );
        assert_eq!(names(&out), vec!["B", "A", "C", "D"]);
    }

    #[test]
    fn rating_sort_uses_mean_and_ranks_unreviewed_last() {
        let courses = vec![
            course("Unreviewed", 1.0),
            rated("Mixed", &[5.0, 3.0]),
            rated("Perfect", &[5.0]),
            rated("Low", &[1.0, 1.0, 2.0]),
        ];
        let out = query_catalog(
            Some(courses.as_slice()),
            &state(CategoryFilter::All, SortOption::Rating, ""),
        );
        assert_eq!(names(&out), vec!["Perfect", "Mixed", "Low", "Unreviewed"]);
    }

    #[test]
    fn filter_then_sort_compose() {
        let mut cheap = tagged("Cheap Expert", &["Expert"]);
        cheap.price = 5.0;
        let mut pricey = tagged("Pricey Pro", &["professional"]);
        pricey.price = 50.0;
        let courses = vec![pricey, tagged("Intro", &["beginner"]), cheap];

        let out = query_catalog(
            Some(courses.as_slice()),
            &state(CategoryFilter::Advanced, SortOption::PriceLow, ""),
        );
        assert_eq!(names(&out), vec!["Cheap Expert", "Pricey Pro"]);
    }

    #[test]
    fn summary_counts_input_and_output() {
        let courses = vec![tagged("x", &["advanced"]), course("y", 1.0)];
        let out = query_catalog(
            Some(courses.as_slice()),
            &state(CategoryFilter::Advanced, SortOption::Relevance, ""),
        );
        assert_eq!(
            CatalogSummary::new(Some(courses.as_slice()), &out),
            CatalogSummary {
                total: 2,
                returned: 1
            }
        );
    }
}
