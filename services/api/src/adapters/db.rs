//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, the concrete implementation of the
//! `CourseCatalogService` and `LinkedAccountStore` ports from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coursehub_core::domain::{Course, Instructor, RatingAndReview};
use coursehub_core::ports::{CourseCatalogService, LinkedAccountStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the catalog and linked-account ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct CourseRecord {
    id: Uuid,
    name: String,
    description: String,
    price: f64,
    tag: Option<Vec<String>>,
    created_at: Option<DateTime<Utc>>,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl CourseRecord {
    fn to_domain(
        self,
        ratings: Option<Vec<RatingAndReview>>,
        enrolled: Option<Vec<Uuid>>,
    ) -> Course {
        let instructor = match (self.first_name, self.last_name) {
            (Some(first_name), Some(last_name)) => Some(Instructor {
                first_name,
                last_name,
            }),
            _ => None,
        };
        Course {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
            tag: self.tag,
            created_at: self.created_at,
            instructor,
            rating_and_reviews: ratings,
            students_enrolled: enrolled,
        }
    }
}

#[derive(FromRow)]
struct RatingRecord {
    course_id: Uuid,
    rating: f64,
    review: Option<String>,
}

#[derive(FromRow)]
struct EnrollmentRecord {
    course_id: Uuid,
    student_id: Uuid,
}

#[derive(FromRow)]
struct LinkedAccountRecord {
    judge_username: String,
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// `CourseCatalogService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CourseCatalogService for DbAdapter {
    async fn list_courses(&self, category_id: &str) -> PortResult<Vec<Course>> {
        let records = sqlx::query_as::<_, CourseRecord>(
            "SELECT c.id, c.name, c.description, c.price, c.tag, c.created_at, \
                    i.first_name, i.last_name \
             FROM courses c LEFT JOIN instructors i ON i.id = c.instructor_id \
             WHERE c.category_id = $1 \
             ORDER BY c.created_at ASC NULLS LAST, c.id ASC",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        if records.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();

        let ratings = sqlx::query_as::<_, RatingRecord>(
            "SELECT course_id, rating, review FROM course_ratings \
             WHERE course_id = ANY($1) ORDER BY created_at ASC",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let enrollments = sqlx::query_as::<_, EnrollmentRecord>(
            "SELECT course_id, student_id FROM enrollments WHERE course_id = ANY($1)",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let mut ratings_by_course: HashMap<Uuid, Vec<RatingAndReview>> = HashMap::new();
        for r in ratings {
            ratings_by_course
                .entry(r.course_id)
                .or_default()
                .push(RatingAndReview {
                    rating: r.rating,
                    review: r.review,
                });
        }
        let mut enrolled_by_course: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for e in enrollments {
            enrolled_by_course
                .entry(e.course_id)
                .or_default()
                .push(e.student_id);
        }

        let courses = records
            .into_iter()
            .map(|r| {
                let ratings = ratings_by_course.remove(&r.id);
                let enrolled = enrolled_by_course.remove(&r.id);
                r.to_domain(ratings, enrolled)
            })
            .collect();
        Ok(courses)
    }
}

//=========================================================================================
// `LinkedAccountStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl LinkedAccountStore for DbAdapter {
    async fn get_linked_username(&self, user_id: Uuid) -> PortResult<Option<String>> {
        let record = sqlx::query_as::<_, LinkedAccountRecord>(
            "SELECT judge_username FROM linked_accounts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.judge_username))
    }

    async fn set_linked_username(&self, user_id: Uuid, username: &str) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO linked_accounts (user_id, judge_username) VALUES ($1, $2) \
             ON CONFLICT (user_id) DO UPDATE SET judge_username = EXCLUDED.judge_username, \
             linked_at = NOW()",
        )
        .bind(user_id)
        .bind(username)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn remove_linked_username(&self, user_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM linked_accounts WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "No linked account for user {}",
                user_id
            )));
        }
        Ok(())
    }
}
