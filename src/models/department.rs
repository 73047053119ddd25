use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Department {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Directory view: a department together with the courses it owns.
#[derive(Serialize, Debug, Clone)]
pub struct DepartmentWithCourses {
    #[serde(flatten)]
    pub department: Department,
    pub courses: Vec<super::course::Course>,
}
