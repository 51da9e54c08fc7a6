//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the catalog and progress endpoints and the master
//! definition for the OpenAPI specification.

use crate::adapters::judge::is_valid_username;
use crate::loader::LoadOutcome;
use crate::web::account::{LinkRequest, LinkResponse};
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use coursehub_core::{
    normalize, query_catalog, CatalogSummary, CategoryFilter, Course, FilterState,
    ProgressPayload, ProgressView, SortOption,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        catalog_handler,
        progress_handler,
        normalize_handler,
        crate::web::account::get_link_handler,
        crate::web::account::link_handler,
        crate::web::account::unlink_handler,
    ),
    components(
        schemas(CatalogResponse, CourseListing, ProgressResponse, InFlightResponse, RawProgressBody, LinkRequest, LinkResponse)
    ),
    tags(
        (name = "CourseHub API", description = "Course catalog queries and judge progress dashboards.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

/// Query-string parameters for a catalog listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogParams {
    /// One of `all`, `popular`, `new`, `beginner`, `advanced`.
    #[param(value_type = Option<String>)]
    pub filter: Option<CategoryFilter>,
    /// One of `relevance`, `price-low`, `price-high`, `rating`.
    #[param(value_type = Option<String>)]
    pub sort: Option<SortOption>,
    /// Free-text search over course name, instructor name and tags.
    pub q: Option<String>,
}

impl From<CatalogParams> for FilterState {
    fn from(params: CatalogParams) -> Self {
        Self {
            active_filter: params.filter.unwrap_or_default(),
            sort_option: params.sort.unwrap_or_default(),
            search_query: params.q.unwrap_or_default(),
        }
    }
}

/// A course as rendered in a listing, with display defaults already applied.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseListing {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub tags: Vec<String>,
    pub instructor_name: String,
    pub average_rating: f64,
    pub review_count: usize,
    pub enrollment_count: usize,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&Course> for CourseListing {
    fn from(course: &Course) -> Self {
        Self {
            id: course.id,
            name: course.name.clone(),
            description: course.description.clone(),
            price: course.price,
            tags: course.tags().to_vec(),
            instructor_name: course.instructor_name(),
            average_rating: course.average_rating(),
            review_count: course.review_count(),
            enrollment_count: course.enrollment_count(),
            created_at: course.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogResponse {
    pub courses: Vec<CourseListing>,
    pub total: usize,
    pub returned: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressResponse {
    #[schema(value_type = Object)]
    pub view: ProgressView,
    /// The judge source that answered, absent when sample data is shown.
    pub source: Option<String>,
    /// A user-facing message when remote statistics could not be used.
    pub notice: Option<String>,
    /// True when a newer request's result was returned in place of this one.
    pub superseded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InFlightResponse {
    pub message: String,
    /// The last committed dashboard for this username, if there is one.
    #[schema(value_type = Object)]
    pub latest: Option<ProgressView>,
}

/// Any JSON document; parsed leniently by the normalization pipeline.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct RawProgressBody(pub serde_json::Value);

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List the courses of a category, searched, filtered and sorted.
#[utoipa::path(
    get,
    path = "/courses/{category}",
    params(
        ("category" = String, Path, description = "The category identifier."),
        CatalogParams
    ),
    responses(
        (status = 200, description = "The display list for the category", body = CatalogResponse),
        (status = 400, description = "Unknown filter or sort value"),
        (status = 502, description = "The course source could not be reached")
    )
)]
pub async fn catalog_handler(
    State(app_state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<CatalogResponse>, (StatusCode, String)> {
    let courses = app_state.catalog.list_courses(&category).await.map_err(|e| {
        error!("Failed to load courses for category {}: {:?}", category, e);
        (
            StatusCode::BAD_GATEWAY,
            "Failed to load courses".to_string(),
        )
    })?;

    let state = FilterState::from(params);
    let results = query_catalog(Some(&courses[..]), &state);
    let summary = CatalogSummary::new(Some(&courses[..]), &results);

    Ok(Json(CatalogResponse {
        courses: results.iter().map(CourseListing::from).collect(),
        total: summary.total,
        returned: summary.returned,
    }))
}

/// Load the progress dashboard for a judge username.
///
/// Remote failures never fail the request: the dashboard falls back to sample data
/// and carries a `notice` instead.
#[utoipa::path(
    get,
    path = "/progress/{username}",
    params(
        ("username" = String, Path, description = "The judge username.")
    ),
    responses(
        (status = 200, description = "The normalized dashboard", body = ProgressResponse),
        (status = 202, description = "A fetch for this username is already running", body = InFlightResponse),
        (status = 400, description = "Malformed username")
    )
)]
pub async fn progress_handler(
    State(app_state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Response, (StatusCode, String)> {
    if !is_valid_username(&username) {
        return Err((StatusCode::BAD_REQUEST, "Invalid username".to_string()));
    }

    // The fetch runs on its own task. If this request is dropped first, the guard
    // cancels the token and the task discards its result instead of committing it.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();
    let loader = app_state.progress_loader.clone();
    let task = {
        let username = username.clone();
        tokio::spawn(async move { loader.load(&username, &cancel).await })
    };

    let outcome = task.await.map_err(|e| {
        error!("Progress task for {} failed: {:?}", username, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to load progress".to_string(),
        )
    })?;

    let response = match outcome {
        LoadOutcome::Applied(loaded) => Json(ProgressResponse {
            view: loaded.view,
            source: loaded.source,
            notice: loaded.notice,
            superseded: false,
        })
        .into_response(),
        LoadOutcome::Stale(newer) => Json(ProgressResponse {
            view: newer.view,
            source: newer.source,
            notice: newer.notice,
            superseded: true,
        })
        .into_response(),
        LoadOutcome::InFlight => (
            StatusCode::ACCEPTED,
            Json(InFlightResponse {
                message: format!("Statistics for '{}' are already being fetched", username),
                latest: app_state.progress_loader.latest(&username).map(|l| l.view),
            }),
        )
            .into_response(),
        LoadOutcome::Discarded => {
            info!("Progress request for {} ended before the fetch finished", username);
            return Err((
                StatusCode::SERVICE_UNAVAILABLE,
                "Request cancelled".to_string(),
            ));
        }
    };
    Ok(response)
}

/// Normalize a raw progress payload into a complete dashboard view.
///
/// Accepts any JSON; malformed or missing parts are defaulted or filled with sample data.
#[utoipa::path(
    post,
    path = "/progress/normalize",
    request_body(content = RawProgressBody, description = "A raw, possibly partial progress payload."),
    responses(
        (status = 200, description = "The normalized dashboard view, shaped like `view` in ProgressResponse")
    )
)]
pub async fn normalize_handler(
    Json(RawProgressBody(body)): Json<RawProgressBody>,
) -> Json<ProgressView> {
    let payload = (!body.is_null()).then(|| ProgressPayload::from_value(&body));
    Json(normalize(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::ProgressLoader;
    use crate::web::router;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use coursehub_core::payload::JudgeProfile;
    use coursehub_core::ports::{
        CourseCatalogService, JudgeProfileService, LinkedAccountStore, PortError, PortResult,
    };
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tower::ServiceExt;

    struct FixedCatalog(Vec<Course>);

    #[async_trait]
    impl CourseCatalogService for FixedCatalog {
        async fn list_courses(&self, category_id: &str) -> PortResult<Vec<Course>> {
            match category_id {
                "web" => Ok(self.0.clone()),
                "broken" => Err(PortError::Unexpected("db down".to_string())),
                _ => Ok(Vec::new()),
            }
        }
    }

    #[derive(Default)]
    struct MemoryAccounts(Mutex<HashMap<Uuid, String>>);

    #[async_trait]
    impl LinkedAccountStore for MemoryAccounts {
        async fn get_linked_username(&self, user_id: Uuid) -> PortResult<Option<String>> {
            Ok(self.0.lock().unwrap().get(&user_id).cloned())
        }

        async fn set_linked_username(&self, user_id: Uuid, username: &str) -> PortResult<()> {
            self.0.lock().unwrap().insert(user_id, username.to_string());
            Ok(())
        }

        async fn remove_linked_username(&self, user_id: Uuid) -> PortResult<()> {
            self.0
                .lock()
                .unwrap()
                .remove(&user_id)
                .map(|_| ())
                .ok_or_else(|| PortError::NotFound(user_id.to_string()))
        }
    }

    struct OfflineJudge;

    #[async_trait]
    impl JudgeProfileService for OfflineJudge {
        fn name(&self) -> &str {
            "offline"
        }

        async fn fetch_profile(&self, _username: &str) -> PortResult<JudgeProfile> {
            Err(PortError::Unavailable("offline".to_string()))
        }
    }

    fn test_state() -> Arc<AppState> {
        let courses: Vec<Course> = serde_json::from_value(json!([
            { "id": Uuid::new_v4(), "name": "Rust Basics", "price": 30.0, "tag": ["Beginner"] },
            { "id": Uuid::new_v4(), "name": "Async Rust", "price": 90.0, "tag": ["Advanced"],
              "instructor": { "firstName": "Ferris", "lastName": "Crab" },
              "ratingAndReviews": [{ "rating": 5.0 }] },
            { "id": Uuid::new_v4(), "name": "Web APIs", "price": 10.0 }
        ]))
        .unwrap();
        Arc::new(AppState {
            catalog: Arc::new(FixedCatalog(courses)),
            accounts: Arc::new(MemoryAccounts::default()),
            progress_loader: Arc::new(ProgressLoader::new(
                Arc::new(OfflineJudge),
                Arc::new(OfflineJudge),
            )),
        })
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = router(test_state())
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn catalog_applies_filter_sort_and_search() {
        let (status, body) = get_json("/courses/web?sort=price-low").await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body["courses"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Web APIs", "Rust Basics", "Async Rust"]);

        let (_, body) = get_json("/courses/web?filter=advanced&q=ferris").await;
        assert_eq!(body["returned"], 1);
        assert_eq!(body["total"], 3);
        assert_eq!(body["courses"][0]["instructorName"], "Ferris Crab");
    }

    #[tokio::test]
    async fn catalog_listing_uses_neutral_defaults() {
        let (_, body) = get_json("/courses/web?q=web").await;
        let listing = &body["courses"][0];
        assert_eq!(listing["instructorName"], "Unknown Instructor");
        assert_eq!(listing["averageRating"], 0.0);
        assert_eq!(listing["reviewCount"], 0);
    }

    #[tokio::test]
    async fn unknown_sort_value_is_rejected() {
        let (status, _) = get_json("/courses/web?sort=cheapest").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn catalog_source_failure_is_bad_gateway() {
        let (status, _) = get_json("/courses/broken").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn offline_judge_still_renders_sample_dashboard() {
        let (status, body) = get_json("/progress/alice").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["notice"].is_string());
        assert!(body["source"].is_null());
        assert_eq!(body["view"]["stats"]["solved"], 15);
        assert_eq!(body["view"]["samples"]["solved"], true);
    }

    #[tokio::test]
    async fn malformed_username_is_rejected() {
        let (status, _) = get_json("/progress/bad%20name").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn normalize_endpoint_accepts_partial_payloads() {
        let request = Request::post("/progress/normalize")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({ "stats": { "solved": "x" }, "profile": { "ranking": 42 } }).to_string(),
            ))
            .unwrap();
        let response = router(test_state()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let view: ProgressView = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(view.profile.ranking, 42);
        assert_eq!(view.stats.solved as usize, view.progress.solved.len());
    }
}
