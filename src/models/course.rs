use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use super::department::Department;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub department_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Course row joined to its owning department.
#[derive(Serialize, Debug, Clone)]
pub struct CourseWithDepartment {
    #[serde(flatten)]
    pub course: Course,
    pub department: Option<Department>,
}

/// Insert record; the gateway assigns id and created_at.
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub name: String,
    pub description: String,
    pub department_id: Uuid,
}

/// Partial update; `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct CoursePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub department_id: Option<Uuid>,
}
