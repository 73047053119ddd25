use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

use super::department::Department;

/// A student profile. `auth_id` is the identity-provider subject and never
/// changes; `department_id` starts unset and is immutable once assigned
/// (enforced by the profile service, not the storage layer).
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Student {
    pub id: Uuid,
    pub auth_id: Uuid,
    pub name: String,
    pub email: String,
    pub department_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Student row joined to their department, when one is assigned.
#[derive(Serialize, Debug, Clone)]
pub struct StudentWithDepartment {
    #[serde(flatten)]
    pub student: Student,
    pub department: Option<Department>,
}

/// Partial update; outer `None` leaves the column unchanged. `department_id`
/// is doubled so an explicit null in a request body stays distinct from an
/// absent field: `Some(None)` is a clear request, which the profile rules
/// reject for an assigned student and the gateways never apply.
#[derive(Debug, Clone, Default)]
pub struct StudentPatch {
    pub name: Option<String>,
    pub department_id: Option<Option<Uuid>>,
}
