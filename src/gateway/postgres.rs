//! Postgres record storage over sqlx.
//!
//! Uses the runtime query API with explicit binds, so the crate builds
//! without a live database. Constraint enforcement (foreign keys, the
//! active-enrollment partial unique index, the favorites pair index) lives in
//! the schema; violations are classified into typed gateway errors here.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::ErrorKind;
use sqlx::PgPool;
use uuid::Uuid;

use super::RecordGateway;
use crate::errors::{GatewayError, GatewayResult};
use crate::models::course::{Course, CourseWithDepartment, CoursePatch, NewCourse};
use crate::models::department::Department;
use crate::models::enrollment::{Enrollment, EnrollmentStatus, EnrollmentWithCourse, NewEnrollment};
use crate::models::favorite::{Favorite, FavoriteWithCourse, NewFavorite};
use crate::models::student::{Student, StudentPatch, StudentWithDepartment};

pub struct PgRecordGateway {
    pool: PgPool,
}

impl PgRecordGateway {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, sqlx::Error> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }
}

fn classify(err: sqlx::Error) -> GatewayError {
    if let sqlx::Error::Database(ref db) = err {
        let constraint = db.constraint().unwrap_or("").to_string();
        match db.kind() {
            ErrorKind::UniqueViolation => return GatewayError::UniqueViolation(constraint),
            ErrorKind::ForeignKeyViolation => return GatewayError::ForeignKeyViolation(constraint),
            _ => {}
        }
    }
    log::error!("database error: {}", err);
    GatewayError::Unavailable(err.to_string())
}

// Join views come back as flat rows and are folded into their nested shape.

#[derive(sqlx::FromRow)]
struct CourseDepartmentRow {
    id: Uuid,
    name: String,
    description: String,
    department_id: Uuid,
    created_at: DateTime<Utc>,
    dept_id: Option<Uuid>,
    dept_name: Option<String>,
    dept_created_at: Option<DateTime<Utc>>,
}

impl CourseDepartmentRow {
    fn into_view(self) -> CourseWithDepartment {
        let department = match (self.dept_id, self.dept_name, self.dept_created_at) {
            (Some(id), Some(name), Some(created_at)) => Some(Department {
                id,
                name,
                created_at,
            }),
            _ => None,
        };
        CourseWithDepartment {
            course: Course {
                id: self.id,
                name: self.name,
                description: self.description,
                department_id: self.department_id,
                created_at: self.created_at,
            },
            department,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StudentDepartmentRow {
    id: Uuid,
    auth_id: Uuid,
    name: String,
    email: String,
    department_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    dept_id: Option<Uuid>,
    dept_name: Option<String>,
    dept_created_at: Option<DateTime<Utc>>,
}

impl StudentDepartmentRow {
    fn into_view(self) -> StudentWithDepartment {
        let department = match (self.dept_id, self.dept_name, self.dept_created_at) {
            (Some(id), Some(name), Some(created_at)) => Some(Department {
                id,
                name,
                created_at,
            }),
            _ => None,
        };
        StudentWithDepartment {
            student: Student {
                id: self.id,
                auth_id: self.auth_id,
                name: self.name,
                email: self.email,
                department_id: self.department_id,
                created_at: self.created_at,
            },
            department,
        }
    }
}

#[derive(sqlx::FromRow)]
struct EnrollmentCourseRow {
    id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    enrolled_at: DateTime<Utc>,
    status: EnrollmentStatus,
    c_id: Option<Uuid>,
    c_name: Option<String>,
    c_description: Option<String>,
    c_department_id: Option<Uuid>,
    c_created_at: Option<DateTime<Utc>>,
}

fn joined_course(
    id: Option<Uuid>,
    name: Option<String>,
    description: Option<String>,
    department_id: Option<Uuid>,
    created_at: Option<DateTime<Utc>>,
) -> Option<Course> {
    match (id, name, description, department_id, created_at) {
        (Some(id), Some(name), Some(description), Some(department_id), Some(created_at)) => {
            Some(Course {
                id,
                name,
                description,
                department_id,
                created_at,
            })
        }
        _ => None,
    }
}

impl EnrollmentCourseRow {
    fn into_view(self) -> EnrollmentWithCourse {
        EnrollmentWithCourse {
            course: joined_course(
                self.c_id,
                self.c_name,
                self.c_description,
                self.c_department_id,
                self.c_created_at,
            ),
            enrollment: Enrollment {
                id: self.id,
                student_id: self.student_id,
                course_id: self.course_id,
                enrolled_at: self.enrolled_at,
                status: self.status,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct FavoriteCourseRow {
    id: Uuid,
    student_id: Uuid,
    course_id: Uuid,
    created_at: DateTime<Utc>,
    c_id: Option<Uuid>,
    c_name: Option<String>,
    c_description: Option<String>,
    c_department_id: Option<Uuid>,
    c_created_at: Option<DateTime<Utc>>,
}

impl FavoriteCourseRow {
    fn into_view(self) -> FavoriteWithCourse {
        FavoriteWithCourse {
            course: joined_course(
                self.c_id,
                self.c_name,
                self.c_description,
                self.c_department_id,
                self.c_created_at,
            ),
            favorite: Favorite {
                id: self.id,
                student_id: self.student_id,
                course_id: self.course_id,
                created_at: self.created_at,
            },
        }
    }
}

const COURSE_DEPARTMENT_SELECT: &str = "SELECT c.id, c.name, c.description, c.department_id, c.created_at, \
     d.id AS dept_id, d.name AS dept_name, d.created_at AS dept_created_at \
     FROM courses c LEFT JOIN departments d ON d.id = c.department_id";

#[async_trait]
impl RecordGateway for PgRecordGateway {
    async fn insert_department(&self, name: &str) -> GatewayResult<Department> {
        sqlx::query_as::<_, Department>(
            "INSERT INTO departments (id, name, created_at) VALUES ($1, $2, $3) \
             RETURNING id, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn list_departments(&self) -> GatewayResult<Vec<Department>> {
        sqlx::query_as::<_, Department>(
            "SELECT id, name, created_at FROM departments ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    async fn find_department(&self, id: Uuid) -> GatewayResult<Option<Department>> {
        sqlx::query_as::<_, Department>(
            "SELECT id, name, created_at FROM departments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn update_department(&self, id: Uuid, name: &str) -> GatewayResult<Option<Department>> {
        sqlx::query_as::<_, Department>(
            "UPDATE departments SET name = $2 WHERE id = $1 RETURNING id, name, created_at",
        )
        .bind(id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn delete_department(&self, id: Uuid) -> GatewayResult<bool> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(result.rows_affected() > 0)
    }

    async fn department_has_courses(&self, id: Uuid) -> GatewayResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM courses WHERE department_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn department_has_students(&self, id: Uuid) -> GatewayResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM students WHERE department_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn insert_course(&self, new: NewCourse) -> GatewayResult<Course> {
        sqlx::query_as::<_, Course>(
            "INSERT INTO courses (id, name, description, department_id, created_at) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, name, description, department_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new.name)
        .bind(new.description)
        .bind(new.department_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn list_courses(&self) -> GatewayResult<Vec<Course>> {
        sqlx::query_as::<_, Course>(
            "SELECT id, name, description, department_id, created_at \
             FROM courses ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    async fn list_courses_with_department(&self) -> GatewayResult<Vec<CourseWithDepartment>> {
        let rows = sqlx::query_as::<_, CourseDepartmentRow>(&format!(
            "{} ORDER BY c.created_at DESC",
            COURSE_DEPARTMENT_SELECT
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;
        Ok(rows.into_iter().map(CourseDepartmentRow::into_view).collect())
    }

    async fn courses_by_department(
        &self,
        department_id: Uuid,
    ) -> GatewayResult<Vec<CourseWithDepartment>> {
        let rows = sqlx::query_as::<_, CourseDepartmentRow>(&format!(
            "{} WHERE c.department_id = $1 ORDER BY c.created_at DESC",
            COURSE_DEPARTMENT_SELECT
        ))
        .bind(department_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;
        Ok(rows.into_iter().map(CourseDepartmentRow::into_view).collect())
    }

    async fn find_course(&self, id: Uuid) -> GatewayResult<Option<Course>> {
        sqlx::query_as::<_, Course>(
            "SELECT id, name, description, department_id, created_at FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn update_course(&self, id: Uuid, patch: CoursePatch) -> GatewayResult<Option<Course>> {
        sqlx::query_as::<_, Course>(
            "UPDATE courses SET name = COALESCE($2, name), \
             description = COALESCE($3, description), \
             department_id = COALESCE($4, department_id) \
             WHERE id = $1 \
             RETURNING id, name, description, department_id, created_at",
        )
        .bind(id)
        .bind(patch.name)
        .bind(patch.description)
        .bind(patch.department_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn delete_course(&self, id: Uuid) -> GatewayResult<bool> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(result.rows_affected() > 0)
    }

    async fn course_has_enrollments(&self, id: Uuid) -> GatewayResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE course_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn course_has_favorites(&self, id: Uuid) -> GatewayResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE course_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn list_students(&self) -> GatewayResult<Vec<Student>> {
        sqlx::query_as::<_, Student>(
            "SELECT id, auth_id, name, email, department_id, created_at \
             FROM students ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    async fn list_students_with_department(&self) -> GatewayResult<Vec<StudentWithDepartment>> {
        let rows = sqlx::query_as::<_, StudentDepartmentRow>(
            "SELECT s.id, s.auth_id, s.name, s.email, s.department_id, s.created_at, \
             d.id AS dept_id, d.name AS dept_name, d.created_at AS dept_created_at \
             FROM students s LEFT JOIN departments d ON d.id = s.department_id \
             ORDER BY s.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;
        Ok(rows.into_iter().map(StudentDepartmentRow::into_view).collect())
    }

    async fn find_student(&self, id: Uuid) -> GatewayResult<Option<Student>> {
        sqlx::query_as::<_, Student>(
            "SELECT id, auth_id, name, email, department_id, created_at \
             FROM students WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn find_student_by_auth(&self, auth_id: Uuid) -> GatewayResult<Option<Student>> {
        sqlx::query_as::<_, Student>(
            "SELECT id, auth_id, name, email, department_id, created_at \
             FROM students WHERE auth_id = $1",
        )
        .bind(auth_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn update_student(&self, id: Uuid, patch: StudentPatch) -> GatewayResult<Option<Student>> {
        sqlx::query_as::<_, Student>(
            "UPDATE students SET name = COALESCE($2, name), \
             department_id = COALESCE($3, department_id) \
             WHERE id = $1 \
             RETURNING id, auth_id, name, email, department_id, created_at",
        )
        .bind(id)
        .bind(patch.name)
        // Flattening turns a clear request into a NULL bind, which COALESCE
        // keeps as "unchanged".
        .bind(patch.department_id.flatten())
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn delete_student(&self, id: Uuid) -> GatewayResult<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(result.rows_affected() > 0)
    }

    async fn student_has_enrollments(&self, id: Uuid) -> GatewayResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM enrollments WHERE student_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn student_has_favorites(&self, id: Uuid) -> GatewayResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE student_id = $1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn insert_enrollment(&self, new: NewEnrollment) -> GatewayResult<Enrollment> {
        // Status is omitted so the schema default ('enrolled') applies.
        sqlx::query_as::<_, Enrollment>(
            "INSERT INTO enrollments (id, student_id, course_id, enrolled_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, student_id, course_id, enrolled_at, status",
        )
        .bind(Uuid::new_v4())
        .bind(new.student_id)
        .bind(new.course_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn enrollments_for_student(&self, student_id: Uuid) -> GatewayResult<Vec<Enrollment>> {
        sqlx::query_as::<_, Enrollment>(
            "SELECT id, student_id, course_id, enrolled_at, status \
             FROM enrollments WHERE student_id = $1 ORDER BY enrolled_at ASC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    async fn enrollments_with_courses(
        &self,
        student_id: Uuid,
    ) -> GatewayResult<Vec<EnrollmentWithCourse>> {
        let rows = sqlx::query_as::<_, EnrollmentCourseRow>(
            "SELECT e.id, e.student_id, e.course_id, e.enrolled_at, e.status, \
             c.id AS c_id, c.name AS c_name, c.description AS c_description, \
             c.department_id AS c_department_id, c.created_at AS c_created_at \
             FROM enrollments e LEFT JOIN courses c ON c.id = e.course_id \
             WHERE e.student_id = $1 ORDER BY e.enrolled_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;
        Ok(rows.into_iter().map(EnrollmentCourseRow::into_view).collect())
    }

    async fn list_enrollments(&self) -> GatewayResult<Vec<Enrollment>> {
        sqlx::query_as::<_, Enrollment>(
            "SELECT id, student_id, course_id, enrolled_at, status \
             FROM enrollments ORDER BY enrolled_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(classify)
    }

    async fn insert_favorite(&self, new: NewFavorite) -> GatewayResult<Favorite> {
        sqlx::query_as::<_, Favorite>(
            "INSERT INTO favorites (id, student_id, course_id, created_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, student_id, course_id, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(new.student_id)
        .bind(new.course_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(classify)
    }

    async fn favorites_for_student(
        &self,
        student_id: Uuid,
    ) -> GatewayResult<Vec<FavoriteWithCourse>> {
        let rows = sqlx::query_as::<_, FavoriteCourseRow>(
            "SELECT f.id, f.student_id, f.course_id, f.created_at, \
             c.id AS c_id, c.name AS c_name, c.description AS c_description, \
             c.department_id AS c_department_id, c.created_at AS c_created_at \
             FROM favorites f LEFT JOIN courses c ON c.id = f.course_id \
             WHERE f.student_id = $1 ORDER BY f.created_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(classify)?;
        Ok(rows.into_iter().map(FavoriteCourseRow::into_view).collect())
    }

    async fn find_favorite(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> GatewayResult<Option<Favorite>> {
        sqlx::query_as::<_, Favorite>(
            "SELECT id, student_id, course_id, created_at \
             FROM favorites WHERE student_id = $1 AND course_id = $2",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(classify)
    }

    async fn delete_favorite(&self, student_id: Uuid, course_id: Uuid) -> GatewayResult<bool> {
        let result = sqlx::query("DELETE FROM favorites WHERE student_id = $1 AND course_id = $2")
            .bind(student_id)
            .bind(course_id)
            .execute(&self.pool)
            .await
            .map_err(classify)?;
        Ok(result.rows_affected() > 0)
    }
}
