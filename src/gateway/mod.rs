//! Persistence gateway: the typed record-storage contract the services
//! consume. Implementations own identity generation and timestamps, and
//! enforce referential integrity plus the active-enrollment and favorite
//! uniqueness constraints, so no caller can bypass them.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::GatewayResult;
use crate::models::course::{Course, CourseWithDepartment, CoursePatch, NewCourse};
use crate::models::department::Department;
use crate::models::enrollment::{Enrollment, EnrollmentWithCourse, NewEnrollment};
use crate::models::favorite::{Favorite, FavoriteWithCourse, NewFavorite};
use crate::models::student::{Student, StudentPatch, StudentWithDepartment};

pub use memory::MemoryGateway;
pub use postgres::PgRecordGateway;

/// Filtered selects, inserts, updates, deletes, and foreign-key joins over
/// the five record tables. Every method is a single storage operation; no
/// transaction spans two of them.
///
/// List ordering: entity lists are newest-first (creation time), except
/// [`list_enrollments`] and [`enrollments_for_student`], which are in
/// creation order so callers folding over them see first-encounter order.
///
/// [`list_enrollments`]: RecordGateway::list_enrollments
/// [`enrollments_for_student`]: RecordGateway::enrollments_for_student
#[async_trait]
pub trait RecordGateway: Send + Sync {
    // departments
    async fn insert_department(&self, name: &str) -> GatewayResult<Department>;
    async fn list_departments(&self) -> GatewayResult<Vec<Department>>;
    async fn find_department(&self, id: Uuid) -> GatewayResult<Option<Department>>;
    async fn update_department(&self, id: Uuid, name: &str) -> GatewayResult<Option<Department>>;
    async fn delete_department(&self, id: Uuid) -> GatewayResult<bool>;
    async fn department_has_courses(&self, id: Uuid) -> GatewayResult<bool>;
    async fn department_has_students(&self, id: Uuid) -> GatewayResult<bool>;

    // courses
    async fn insert_course(&self, new: NewCourse) -> GatewayResult<Course>;
    async fn list_courses(&self) -> GatewayResult<Vec<Course>>;
    async fn list_courses_with_department(&self) -> GatewayResult<Vec<CourseWithDepartment>>;
    async fn courses_by_department(
        &self,
        department_id: Uuid,
    ) -> GatewayResult<Vec<CourseWithDepartment>>;
    async fn find_course(&self, id: Uuid) -> GatewayResult<Option<Course>>;
    async fn update_course(&self, id: Uuid, patch: CoursePatch) -> GatewayResult<Option<Course>>;
    async fn delete_course(&self, id: Uuid) -> GatewayResult<bool>;
    async fn course_has_enrollments(&self, id: Uuid) -> GatewayResult<bool>;
    async fn course_has_favorites(&self, id: Uuid) -> GatewayResult<bool>;

    // students; no insert here, registration happens in an external flow
    async fn list_students(&self) -> GatewayResult<Vec<Student>>;
    async fn list_students_with_department(&self) -> GatewayResult<Vec<StudentWithDepartment>>;
    async fn find_student(&self, id: Uuid) -> GatewayResult<Option<Student>>;
    async fn find_student_by_auth(&self, auth_id: Uuid) -> GatewayResult<Option<Student>>;
    async fn update_student(&self, id: Uuid, patch: StudentPatch) -> GatewayResult<Option<Student>>;
    async fn delete_student(&self, id: Uuid) -> GatewayResult<bool>;
    async fn student_has_enrollments(&self, id: Uuid) -> GatewayResult<bool>;
    async fn student_has_favorites(&self, id: Uuid) -> GatewayResult<bool>;

    // enrollments
    async fn insert_enrollment(&self, new: NewEnrollment) -> GatewayResult<Enrollment>;
    async fn enrollments_for_student(&self, student_id: Uuid) -> GatewayResult<Vec<Enrollment>>;
    async fn enrollments_with_courses(
        &self,
        student_id: Uuid,
    ) -> GatewayResult<Vec<EnrollmentWithCourse>>;
    async fn list_enrollments(&self) -> GatewayResult<Vec<Enrollment>>;

    // favorites
    async fn insert_favorite(&self, new: NewFavorite) -> GatewayResult<Favorite>;
    async fn favorites_for_student(
        &self,
        student_id: Uuid,
    ) -> GatewayResult<Vec<FavoriteWithCourse>>;
    async fn find_favorite(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> GatewayResult<Option<Favorite>>;
    async fn delete_favorite(&self, student_id: Uuid, course_id: Uuid) -> GatewayResult<bool>;
}
