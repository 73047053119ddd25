use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use super::course::Course;

/// Lifecycle state of an enrollment. New rows always start in `Enrolled`;
/// `Completed` and `Dropped` are set administratively outside this API, but
/// every reader must handle all three.
#[derive(sqlx::Type, Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[sqlx(type_name = "enrollment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Enrolled,
    Completed,
    Dropped,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Enrollment {
    pub id: Uuid,
    pub student_id: Uuid,
    pub course_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
    pub status: EnrollmentStatus,
}

/// Enrollment row joined to its course.
#[derive(Serialize, Debug, Clone)]
pub struct EnrollmentWithCourse {
    #[serde(flatten)]
    pub enrollment: Enrollment,
    pub course: Option<Course>,
}

/// Insert record; the gateway assigns id, enrolled_at, and the initial
/// `enrolled` status.
#[derive(Debug, Clone)]
pub struct NewEnrollment {
    pub student_id: Uuid,
    pub course_id: Uuid,
}
