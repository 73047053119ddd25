//! In-memory record storage for development and tests.
//!
//! Mirrors the constraint semantics of the Postgres gateway (foreign keys,
//! active-enrollment and favorite uniqueness, reference-checked deletes) so
//! tests exercise the same failure paths. Not suitable for production use.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::RecordGateway;
use crate::errors::{GatewayError, GatewayResult};
use crate::models::course::{Course, CourseWithDepartment, CoursePatch, NewCourse};
use crate::models::department::Department;
use crate::models::enrollment::{Enrollment, EnrollmentStatus, EnrollmentWithCourse, NewEnrollment};
use crate::models::favorite::{Favorite, FavoriteWithCourse, NewFavorite};
use crate::models::student::{Student, StudentPatch, StudentWithDepartment};

#[derive(Default)]
struct Tables {
    departments: Vec<Department>,
    courses: Vec<Course>,
    students: Vec<Student>,
    enrollments: Vec<Enrollment>,
    favorites: Vec<Favorite>,
}

/// Lock-guarded tables. Rows are kept in insertion order, which is also
/// creation order, so newest-first reads iterate in reverse.
#[derive(Default)]
pub struct MemoryGateway {
    tables: RwLock<Tables>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> GatewayResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_| GatewayError::Unavailable("storage lock poisoned".to_string()))
    }

    fn write(&self) -> GatewayResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_| GatewayError::Unavailable("storage lock poisoned".to_string()))
    }

    /// Seeds a department row directly.
    ///
    /// Seed helpers skip constraint checks so callers can stage edge states,
    /// such as an enrollment whose course no longer resolves.
    pub fn seed_department(&self, name: &str) -> GatewayResult<Department> {
        let department = Department {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.write()?.departments.push(department.clone());
        Ok(department)
    }

    /// Seeds a course row directly.
    pub fn seed_course(
        &self,
        name: &str,
        description: &str,
        department_id: Uuid,
    ) -> GatewayResult<Course> {
        let course = Course {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: description.to_string(),
            department_id,
            created_at: Utc::now(),
        };
        self.write()?.courses.push(course.clone());
        Ok(course)
    }

    /// Seeds a student row directly. Registration is an external flow, so
    /// this is the only way a student enters the in-memory store.
    pub fn seed_student(
        &self,
        auth_id: Uuid,
        name: &str,
        email: &str,
        department_id: Option<Uuid>,
    ) -> GatewayResult<Student> {
        let student = Student {
            id: Uuid::new_v4(),
            auth_id,
            name: name.to_string(),
            email: email.to_string(),
            department_id,
            created_at: Utc::now(),
        };
        self.write()?.students.push(student.clone());
        Ok(student)
    }

    /// Seeds an enrollment row with an arbitrary status.
    pub fn seed_enrollment(
        &self,
        student_id: Uuid,
        course_id: Uuid,
        status: EnrollmentStatus,
    ) -> GatewayResult<Enrollment> {
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            student_id,
            course_id,
            enrolled_at: Utc::now(),
            status,
        };
        self.write()?.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }
}

fn department_of(tables: &Tables, id: Uuid) -> Option<Department> {
    tables.departments.iter().find(|d| d.id == id).cloned()
}

fn course_of(tables: &Tables, id: Uuid) -> Option<Course> {
    tables.courses.iter().find(|c| c.id == id).cloned()
}

#[async_trait]
impl RecordGateway for MemoryGateway {
    async fn insert_department(&self, name: &str) -> GatewayResult<Department> {
        let department = Department {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        self.write()?.departments.push(department.clone());
        Ok(department)
    }

    async fn list_departments(&self) -> GatewayResult<Vec<Department>> {
        Ok(self.read()?.departments.iter().rev().cloned().collect())
    }

    async fn find_department(&self, id: Uuid) -> GatewayResult<Option<Department>> {
        let tables = self.read()?;
        Ok(department_of(&tables, id))
    }

    async fn update_department(&self, id: Uuid, name: &str) -> GatewayResult<Option<Department>> {
        let mut tables = self.write()?;
        match tables.departments.iter_mut().find(|d| d.id == id) {
            Some(department) => {
                department.name = name.to_string();
                Ok(Some(department.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_department(&self, id: Uuid) -> GatewayResult<bool> {
        let mut tables = self.write()?;
        let Some(pos) = tables.departments.iter().position(|d| d.id == id) else {
            return Ok(false);
        };
        if tables.courses.iter().any(|c| c.department_id == id) {
            return Err(GatewayError::ForeignKeyViolation(
                "courses.department_id".to_string(),
            ));
        }
        if tables.students.iter().any(|s| s.department_id == Some(id)) {
            return Err(GatewayError::ForeignKeyViolation(
                "students.department_id".to_string(),
            ));
        }
        tables.departments.remove(pos);
        Ok(true)
    }

    async fn department_has_courses(&self, id: Uuid) -> GatewayResult<bool> {
        Ok(self.read()?.courses.iter().any(|c| c.department_id == id))
    }

    async fn department_has_students(&self, id: Uuid) -> GatewayResult<bool> {
        Ok(self
            .read()?
            .students
            .iter()
            .any(|s| s.department_id == Some(id)))
    }

    async fn insert_course(&self, new: NewCourse) -> GatewayResult<Course> {
        let mut tables = self.write()?;
        if department_of(&tables, new.department_id).is_none() {
            return Err(GatewayError::ForeignKeyViolation(
                "courses.department_id".to_string(),
            ));
        }
        let course = Course {
            id: Uuid::new_v4(),
            name: new.name,
            description: new.description,
            department_id: new.department_id,
            created_at: Utc::now(),
        };
        tables.courses.push(course.clone());
        Ok(course)
    }

    async fn list_courses(&self) -> GatewayResult<Vec<Course>> {
        Ok(self.read()?.courses.iter().rev().cloned().collect())
    }

    async fn list_courses_with_department(&self) -> GatewayResult<Vec<CourseWithDepartment>> {
        let tables = self.read()?;
        Ok(tables
            .courses
            .iter()
            .rev()
            .map(|course| CourseWithDepartment {
                department: department_of(&tables, course.department_id),
                course: course.clone(),
            })
            .collect())
    }

    async fn courses_by_department(
        &self,
        department_id: Uuid,
    ) -> GatewayResult<Vec<CourseWithDepartment>> {
        let tables = self.read()?;
        Ok(tables
            .courses
            .iter()
            .rev()
            .filter(|course| course.department_id == department_id)
            .map(|course| CourseWithDepartment {
                department: department_of(&tables, course.department_id),
                course: course.clone(),
            })
            .collect())
    }

    async fn find_course(&self, id: Uuid) -> GatewayResult<Option<Course>> {
        let tables = self.read()?;
        Ok(course_of(&tables, id))
    }

    async fn update_course(&self, id: Uuid, patch: CoursePatch) -> GatewayResult<Option<Course>> {
        let mut tables = self.write()?;
        if let Some(department_id) = patch.department_id {
            if department_of(&tables, department_id).is_none() {
                return Err(GatewayError::ForeignKeyViolation(
                    "courses.department_id".to_string(),
                ));
            }
        }
        match tables.courses.iter_mut().find(|c| c.id == id) {
            Some(course) => {
                if let Some(name) = patch.name {
                    course.name = name;
                }
                if let Some(description) = patch.description {
                    course.description = description;
                }
                if let Some(department_id) = patch.department_id {
                    course.department_id = department_id;
                }
                Ok(Some(course.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_course(&self, id: Uuid) -> GatewayResult<bool> {
        let mut tables = self.write()?;
        let Some(pos) = tables.courses.iter().position(|c| c.id == id) else {
            return Ok(false);
        };
        if tables.enrollments.iter().any(|e| e.course_id == id) {
            return Err(GatewayError::ForeignKeyViolation(
                "enrollments.course_id".to_string(),
            ));
        }
        if tables.favorites.iter().any(|f| f.course_id == id) {
            return Err(GatewayError::ForeignKeyViolation(
                "favorites.course_id".to_string(),
            ));
        }
        tables.courses.remove(pos);
        Ok(true)
    }

    async fn course_has_enrollments(&self, id: Uuid) -> GatewayResult<bool> {
        Ok(self.read()?.enrollments.iter().any(|e| e.course_id == id))
    }

    async fn course_has_favorites(&self, id: Uuid) -> GatewayResult<bool> {
        Ok(self.read()?.favorites.iter().any(|f| f.course_id == id))
    }

    async fn list_students(&self) -> GatewayResult<Vec<Student>> {
        Ok(self.read()?.students.iter().rev().cloned().collect())
    }

    async fn list_students_with_department(&self) -> GatewayResult<Vec<StudentWithDepartment>> {
        let tables = self.read()?;
        Ok(tables
            .students
            .iter()
            .rev()
            .map(|student| StudentWithDepartment {
                department: student.department_id.and_then(|id| department_of(&tables, id)),
                student: student.clone(),
            })
            .collect())
    }

    async fn find_student(&self, id: Uuid) -> GatewayResult<Option<Student>> {
        Ok(self.read()?.students.iter().find(|s| s.id == id).cloned())
    }

    async fn find_student_by_auth(&self, auth_id: Uuid) -> GatewayResult<Option<Student>> {
        Ok(self
            .read()?
            .students
            .iter()
            .find(|s| s.auth_id == auth_id)
            .cloned())
    }

    async fn update_student(&self, id: Uuid, patch: StudentPatch) -> GatewayResult<Option<Student>> {
        let mut tables = self.write()?;
        if let Some(Some(department_id)) = patch.department_id {
            if department_of(&tables, department_id).is_none() {
                return Err(GatewayError::ForeignKeyViolation(
                    "students.department_id".to_string(),
                ));
            }
        }
        match tables.students.iter_mut().find(|s| s.id == id) {
            Some(student) => {
                if let Some(name) = patch.name {
                    student.name = name;
                }
                // A clear request never reaches storage; flatten drops it.
                if let Some(department_id) = patch.department_id.flatten() {
                    student.department_id = Some(department_id);
                }
                Ok(Some(student.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_student(&self, id: Uuid) -> GatewayResult<bool> {
        let mut tables = self.write()?;
        let Some(pos) = tables.students.iter().position(|s| s.id == id) else {
            return Ok(false);
        };
        if tables.enrollments.iter().any(|e| e.student_id == id) {
            return Err(GatewayError::ForeignKeyViolation(
                "enrollments.student_id".to_string(),
            ));
        }
        if tables.favorites.iter().any(|f| f.student_id == id) {
            return Err(GatewayError::ForeignKeyViolation(
                "favorites.student_id".to_string(),
            ));
        }
        tables.students.remove(pos);
        Ok(true)
    }

    async fn student_has_enrollments(&self, id: Uuid) -> GatewayResult<bool> {
        Ok(self.read()?.enrollments.iter().any(|e| e.student_id == id))
    }

    async fn student_has_favorites(&self, id: Uuid) -> GatewayResult<bool> {
        Ok(self.read()?.favorites.iter().any(|f| f.student_id == id))
    }

    async fn insert_enrollment(&self, new: NewEnrollment) -> GatewayResult<Enrollment> {
        let mut tables = self.write()?;
        if !tables.students.iter().any(|s| s.id == new.student_id) {
            return Err(GatewayError::ForeignKeyViolation(
                "enrollments.student_id".to_string(),
            ));
        }
        if course_of(&tables, new.course_id).is_none() {
            return Err(GatewayError::ForeignKeyViolation(
                "enrollments.course_id".to_string(),
            ));
        }
        // Same rule as the partial unique index: dropped rows do not count.
        let active_exists = tables.enrollments.iter().any(|e| {
            e.student_id == new.student_id
                && e.course_id == new.course_id
                && e.status != EnrollmentStatus::Dropped
        });
        if active_exists {
            return Err(GatewayError::UniqueViolation(
                "enrollments_active_pair".to_string(),
            ));
        }
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            student_id: new.student_id,
            course_id: new.course_id,
            enrolled_at: Utc::now(),
            status: EnrollmentStatus::Enrolled,
        };
        tables.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn enrollments_for_student(&self, student_id: Uuid) -> GatewayResult<Vec<Enrollment>> {
        Ok(self
            .read()?
            .enrollments
            .iter()
            .filter(|e| e.student_id == student_id)
            .cloned()
            .collect())
    }

    async fn enrollments_with_courses(
        &self,
        student_id: Uuid,
    ) -> GatewayResult<Vec<EnrollmentWithCourse>> {
        let tables = self.read()?;
        Ok(tables
            .enrollments
            .iter()
            .rev()
            .filter(|e| e.student_id == student_id)
            .map(|enrollment| EnrollmentWithCourse {
                course: course_of(&tables, enrollment.course_id),
                enrollment: enrollment.clone(),
            })
            .collect())
    }

    async fn list_enrollments(&self) -> GatewayResult<Vec<Enrollment>> {
        Ok(self.read()?.enrollments.clone())
    }

    async fn insert_favorite(&self, new: NewFavorite) -> GatewayResult<Favorite> {
        let mut tables = self.write()?;
        if !tables.students.iter().any(|s| s.id == new.student_id) {
            return Err(GatewayError::ForeignKeyViolation(
                "favorites.student_id".to_string(),
            ));
        }
        if course_of(&tables, new.course_id).is_none() {
            return Err(GatewayError::ForeignKeyViolation(
                "favorites.course_id".to_string(),
            ));
        }
        let pair_exists = tables
            .favorites
            .iter()
            .any(|f| f.student_id == new.student_id && f.course_id == new.course_id);
        if pair_exists {
            return Err(GatewayError::UniqueViolation("favorites_pair".to_string()));
        }
        let favorite = Favorite {
            id: Uuid::new_v4(),
            student_id: new.student_id,
            course_id: new.course_id,
            created_at: Utc::now(),
        };
        tables.favorites.push(favorite.clone());
        Ok(favorite)
    }

    async fn favorites_for_student(
        &self,
        student_id: Uuid,
    ) -> GatewayResult<Vec<FavoriteWithCourse>> {
        let tables = self.read()?;
        Ok(tables
            .favorites
            .iter()
            .rev()
            .filter(|f| f.student_id == student_id)
            .map(|favorite| FavoriteWithCourse {
                course: course_of(&tables, favorite.course_id),
                favorite: favorite.clone(),
            })
            .collect())
    }

    async fn find_favorite(
        &self,
        student_id: Uuid,
        course_id: Uuid,
    ) -> GatewayResult<Option<Favorite>> {
        Ok(self
            .read()?
            .favorites
            .iter()
            .find(|f| f.student_id == student_id && f.course_id == course_id)
            .cloned())
    }

    async fn delete_favorite(&self, student_id: Uuid, course_id: Uuid) -> GatewayResult<bool> {
        let mut tables = self.write()?;
        match tables
            .favorites
            .iter()
            .position(|f| f.student_id == student_id && f.course_id == course_id)
        {
            Some(pos) => {
                tables.favorites.remove(pos);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
