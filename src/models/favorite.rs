use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use super::course::Course;

/// A student's bookmark on a course. At most one per (student, course) pair.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Favorite {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Favorite row joined to its course.
#[derive(Serialize, Debug, Clone)]
pub struct FavoriteWithCourse {
    #[serde(flatten)]
    pub favorite: Favorite,
    pub course: Option<Course>,
}

/// Insert record; the gateway assigns id and created_at.
#[derive(Debug, Clone)]
pub struct NewFavorite {
    pub student_id: Uuid,
    pub course_id: Uuid,
}
