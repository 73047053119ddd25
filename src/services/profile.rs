use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{AppError, GatewayError};
use crate::gateway::RecordGateway;
use crate::models::student::{Student, StudentPatch, StudentWithDepartment};

/// Profile reads and writes, including the one rule with teeth: a student's
/// department is first-write-wins. Once set it never changes, whether the
/// request comes from the student or an administrator.
pub struct ProfileService {
    gateway: Arc<dyn RecordGateway>,
}

impl ProfileService {
    pub fn new(gateway: Arc<dyn RecordGateway>) -> Self {
        Self { gateway }
    }

    async fn student_by_auth(&self, auth_id: Uuid) -> Result<Student, AppError> {
        self.gateway
            .find_student_by_auth(auth_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student profile not found".to_string()))
    }

    async fn with_department(&self, student: Student) -> Result<StudentWithDepartment, AppError> {
        let department = match student.department_id {
            Some(department_id) => self.gateway.find_department(department_id).await?,
            None => None,
        };
        Ok(StudentWithDepartment {
            student,
            department,
        })
    }

    pub async fn profile(&self, auth_id: Uuid) -> Result<StudentWithDepartment, AppError> {
        let student = self.student_by_auth(auth_id).await?;
        self.with_department(student).await
    }

    pub async fn rename(
        &self,
        auth_id: Uuid,
        name: &str,
    ) -> Result<StudentWithDepartment, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Name cannot be empty".to_string()));
        }
        let student = self.student_by_auth(auth_id).await?;
        let updated = self
            .gateway
            .update_student(
                student.id,
                StudentPatch {
                    name: Some(name.to_string()),
                    department_id: None,
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Student profile not found".to_string()))?;
        self.with_department(updated).await
    }

    /// Assigns the caller's department. Rejected outright when one is
    /// already set, even if the requested value is identical.
    pub async fn set_department(
        &self,
        auth_id: Uuid,
        department_id: Uuid,
    ) -> Result<StudentWithDepartment, AppError> {
        let student = self.student_by_auth(auth_id).await?;
        if student.department_id.is_some() {
            return Err(AppError::AlreadyAssigned(
                "Department is already set and cannot be changed".to_string(),
            ));
        }
        if self.gateway.find_department(department_id).await?.is_none() {
            return Err(AppError::NotFound("Department not found".to_string()));
        }
        let updated = self
            .gateway
            .update_student(
                student.id,
                StudentPatch {
                    name: None,
                    department_id: Some(Some(department_id)),
                },
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Student profile not found".to_string()))?;
        self.with_department(updated).await
    }

    pub async fn list_students(&self) -> Result<Vec<StudentWithDepartment>, AppError> {
        Ok(self.gateway.list_students_with_department().await?)
    }

    /// Admin-side patch. The department half goes through the same
    /// first-write-wins gate as self-service assignment.
    pub async fn update_student(
        &self,
        student_id: Uuid,
        patch: StudentPatch,
    ) -> Result<StudentWithDepartment, AppError> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("Name cannot be empty".to_string()));
            }
        }
        let student = self
            .gateway
            .find_student(student_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;
        // The gate also catches explicit nulls: clearing counts as a change.
        if patch.department_id.is_some() && student.department_id.is_some() {
            return Err(AppError::AlreadyAssigned(
                "Department is already set and cannot be changed".to_string(),
            ));
        }
        if let Some(Some(department_id)) = patch.department_id {
            if self.gateway.find_department(department_id).await?.is_none() {
                return Err(AppError::NotFound("Department not found".to_string()));
            }
        }
        let updated = self
            .gateway
            .update_student(student.id, patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Student not found".to_string()))?;
        self.with_department(updated).await
    }

    pub async fn delete_student(&self, student_id: Uuid) -> Result<(), AppError> {
        if self.gateway.find_student(student_id).await?.is_none() {
            return Err(AppError::NotFound("Student not found".to_string()));
        }
        if self.gateway.student_has_enrollments(student_id).await? {
            return Err(AppError::Conflict(
                "Student still has enrollment records".to_string(),
            ));
        }
        if self.gateway.student_has_favorites(student_id).await? {
            return Err(AppError::Conflict(
                "Student still has favorite records".to_string(),
            ));
        }
        match self.gateway.delete_student(student_id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::NotFound("Student not found".to_string())),
            Err(GatewayError::ForeignKeyViolation(_)) => Err(AppError::Conflict(
                "Student still has dependent records".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }
}
