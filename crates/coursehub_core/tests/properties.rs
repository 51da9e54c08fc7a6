use coursehub_core::{
    normalize, query_catalog, CategoryFilter, Course, FilterState, Instructor, ProgressPayload,
    RatingAndReview, SortOption,
};
use serde_json::json;
use std::collections::HashSet;
use uuid::Uuid;

fn catalog() -> Vec<Course> {
    let raw = json!([
        {
            "id": Uuid::new_v4(),
            "name": "React.js: Building Modern User Interfaces",
            "description": "Components, hooks and state.",
            "price": 49.99,
            "tag": ["React"],
            "createdAt": "2024-02-10T09:00:00Z",
            "instructor": { "firstName": "Maya", "lastName": "Chen" },
            "ratingAndReviews": [{ "rating": 4.5 }, { "rating": 5.0 }],
            "studentsEnrolled": [Uuid::new_v4(), Uuid::new_v4()]
        },
        {
            "id": Uuid::new_v4(),
            "name": "Distributed Systems in Practice",
            "price": 120.0,
            "tag": ["Advanced Topics"],
            "instructor": { "firstName": "Sam", "lastName": "Okafor" }
        },
        {
            "id": Uuid::new_v4(),
            "name": "Kubernetes for Professionals",
            "price": 80.0,
            "tag": ["Professional", "DevOps"],
            "ratingAndReviews": [{ "rating": 3.0, "review": "Dense." }]
        },
        {
            "id": Uuid::new_v4(),
            "name": "Python Basics",
            "price": 0.0,
            "tag": ["Beginner"]
        },
        {
            "id": Uuid::new_v4(),
            "name": "Untitled Draft",
            "price": 15.0
        }
    ]);
    serde_json::from_value(raw).expect("fixture deserializes")
}

fn state(filter: CategoryFilter, sort: SortOption, query: &str) -> FilterState {
    FilterState {
        active_filter: filter,
        sort_option: sort,
        search_query: query.to_string(),
    }
}

fn priced(prices: &[f64]) -> Vec<Course> {
    prices
        .iter()
        .enumerate()
        .map(|(i, p)| Course {
            id: Uuid::new_v4(),
            name: format!("course-{i}"),
            description: String::new(),
            price: *p,
            tag: None,
            created_at: None,
            instructor: None,
            rating_and_reviews: None,
            students_enrolled: None,
        })
        .collect()
}

#[test]
fn output_is_always_a_subset_of_input() {
    let courses = catalog();
    let ids: HashSet<Uuid> = courses.iter().map(|c| c.id).collect();

    let filters = [
        CategoryFilter::All,
        CategoryFilter::Popular,
        CategoryFilter::New,
        CategoryFilter::Beginner,
        CategoryFilter::Advanced,
    ];
    let sorts = [
        SortOption::Relevance,
        SortOption::PriceLow,
        SortOption::PriceHigh,
        SortOption::Rating,
    ];

    for filter in filters {
        for sort in sorts {
            for query in ["", "react", "zzz", "o"] {
                let out = query_catalog(Some(courses.as_slice()), &state(filter, sort, query));
                let out_ids: HashSet<Uuid> = out.iter().map(|c| c.id).collect();
                assert_eq!(out_ids.len(), out.len(), "no duplicates");
                assert!(out_ids.is_subset(&ids));
            }
        }
    }
}

#[test]
fn advanced_filter_matches_whole_tags_only() {
    let out = query_catalog(
        Some(catalog().as_slice()),
        &state(CategoryFilter::Advanced, SortOption::Relevance, ""),
    );
    let names: Vec<&str> = out.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Kubernetes for Professionals"]);
}

#[test]
fn price_low_sorts_ascending_with_stable_ties() {
    let courses = priced(&[50.0, 10.0, 30.0, 10.0]);
    let out = query_catalog(
        Some(courses.as_slice()),
        &state(CategoryFilter::All, SortOption::PriceLow, ""),
    );
    let prices: Vec<f64> = out.iter().map(|c| c.price).collect();
    assert_eq!(prices, vec![10.0, 10.0, 30.0, 50.0]);
    assert_eq!(out[0].name, "course-1");
    assert_eq!(out[1].name, "course-3");
}

#[test]
fn rating_sort_places_unreviewed_below_reviewed() {
    let out = query_catalog(
        Some(catalog().as_slice()),
        &state(CategoryFilter::All, SortOption::Rating, ""),
    );
    let first_unreviewed = out.iter().position(|c| c.review_count() == 0).unwrap();
    assert!(out[..first_unreviewed].iter().all(|c| c.average_rating() > 0.0));
    assert!(out[first_unreviewed..].iter().all(|c| c.review_count() == 0));
}

#[test]
fn react_query_matches_by_name_and_by_tag() {
    let courses = catalog();
    let react = &courses[0];
    assert!(coursehub_core::catalog::matches_search(react, "react"));

    let by_tag_only = Course {
        name: "Frontend Engineering".to_string(),
        ..react.clone()
    };
    let by_name_only = Course {
        tag: None,
        ..react.clone()
    };
    let s = state(CategoryFilter::All, SortOption::Relevance, "React");
    assert_eq!(query_catalog(Some(&[by_tag_only][..]), &s).len(), 1);
    assert_eq!(query_catalog(Some(&[by_name_only][..]), &s).len(), 1);
}

#[test]
fn malformed_course_records_get_neutral_defaults() {
    let courses = catalog();
    let draft = courses.iter().find(|c| c.name == "Untitled Draft").unwrap();
    assert_eq!(draft.instructor_name(), "Unknown Instructor");
    assert_eq!(draft.average_rating(), 0.0);
    assert_eq!(draft.review_count(), 0);
    assert_eq!(draft.enrollment_count(), 0);
    assert!(draft.tags().is_empty());
}

#[test]
fn engine_does_not_mutate_input() {
    let courses = catalog();
    let before = courses.clone();
    let _ = query_catalog(
        Some(courses.as_slice()),
        &state(CategoryFilter::Popular, SortOption::PriceHigh, "o"),
    );
    assert_eq!(courses, before);
}

#[test]
fn absent_progress_is_internally_consistent() {
    let view = normalize(None);
    let by = view.stats.by_difficulty;
    assert_eq!(by.easy + by.medium + by.hard, view.stats.solved);
    assert_eq!(view.progress.solved.len() as u32, view.stats.solved);
}

#[test]
fn normalization_is_idempotent_through_json() {
    let first = normalize(Some(ProgressPayload::from_value(&json!({
        "stats": { "solved": 3 },
        "progress": { "solved": [], "attempted": null },
        "profile": { "reputation": 4 }
    }))));

    // Round-trip through the wire format the service returns.
    let wire = serde_json::to_value(&first).unwrap();
    let second = normalize(Some(ProgressPayload::from_value(&wire)));
    assert_eq!(first, second);
}

#[test]
fn instructor_branch_requires_instructor() {
    let mut course = priced(&[1.0]).remove(0);
    assert!(!coursehub_core::catalog::matches_search(&course, "maya"));
    course.instructor = Some(Instructor {
        first_name: "Maya".into(),
        last_name: "Chen".into(),
    });
    course.rating_and_reviews = Some(vec![RatingAndReview {
        rating: 4.0,
        review: None,
    }]);
    assert!(coursehub_core::catalog::matches_search(&course, "maya chen"));
}
