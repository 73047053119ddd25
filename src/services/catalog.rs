use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{AppError, GatewayError};
use crate::gateway::RecordGateway;
use crate::models::course::{Course, CourseWithDepartment, CoursePatch, NewCourse};
use crate::models::department::{Department, DepartmentWithCourses};

/// Admin CRUD over courses and departments, plus the public department
/// directory. Deletes are reject-if-referenced: removing a parent row that
/// anything still points at fails with a conflict and changes nothing.
pub struct CatalogService {
    gateway: Arc<dyn RecordGateway>,
}

impl CatalogService {
    pub fn new(gateway: Arc<dyn RecordGateway>) -> Self {
        Self { gateway }
    }

    /// Every department with its course list, for the browse page.
    pub async fn department_directory(&self) -> Result<Vec<DepartmentWithCourses>, AppError> {
        let departments = self.gateway.list_departments().await?;
        let courses = self.gateway.list_courses().await?;
        Ok(departments
            .into_iter()
            .map(|department| {
                let courses = courses
                    .iter()
                    .filter(|course| course.department_id == department.id)
                    .cloned()
                    .collect();
                DepartmentWithCourses {
                    department,
                    courses,
                }
            })
            .collect())
    }

    pub async fn list_courses(&self) -> Result<Vec<CourseWithDepartment>, AppError> {
        Ok(self.gateway.list_courses_with_department().await?)
    }

    pub async fn create_course(&self, new: NewCourse) -> Result<Course, AppError> {
        if new.name.trim().is_empty() {
            return Err(AppError::Validation(
                "Course name cannot be empty".to_string(),
            ));
        }
        match self.gateway.insert_course(new).await {
            Ok(course) => Ok(course),
            Err(GatewayError::ForeignKeyViolation(_)) => {
                Err(AppError::NotFound("Department not found".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn update_course(&self, id: Uuid, patch: CoursePatch) -> Result<Course, AppError> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation(
                    "Course name cannot be empty".to_string(),
                ));
            }
        }
        match self.gateway.update_course(id, patch).await {
            Ok(Some(course)) => Ok(course),
            Ok(None) => Err(AppError::NotFound("Course not found".to_string())),
            Err(GatewayError::ForeignKeyViolation(_)) => {
                Err(AppError::NotFound("Department not found".to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    pub async fn delete_course(&self, id: Uuid) -> Result<(), AppError> {
        if self.gateway.find_course(id).await?.is_none() {
            return Err(AppError::NotFound("Course not found".to_string()));
        }
        if self.gateway.course_has_enrollments(id).await? {
            return Err(AppError::Conflict(
                "Course still has enrollment records".to_string(),
            ));
        }
        if self.gateway.course_has_favorites(id).await? {
            return Err(AppError::Conflict(
                "Course is still bookmarked by students".to_string(),
            ));
        }
        match self.gateway.delete_course(id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::NotFound("Course not found".to_string())),
            Err(GatewayError::ForeignKeyViolation(_)) => Err(AppError::Conflict(
                "Course still has dependent records".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn list_departments(&self) -> Result<Vec<Department>, AppError> {
        Ok(self.gateway.list_departments().await?)
    }

    pub async fn create_department(&self, name: &str) -> Result<Department, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "Department name cannot be empty".to_string(),
            ));
        }
        Ok(self.gateway.insert_department(name).await?)
    }

    pub async fn update_department(&self, id: Uuid, name: &str) -> Result<Department, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::Validation(
                "Department name cannot be empty".to_string(),
            ));
        }
        self.gateway
            .update_department(id, name)
            .await?
            .ok_or_else(|| AppError::NotFound("Department not found".to_string()))
    }

    pub async fn delete_department(&self, id: Uuid) -> Result<(), AppError> {
        if self.gateway.find_department(id).await?.is_none() {
            return Err(AppError::NotFound("Department not found".to_string()));
        }
        if self.gateway.department_has_courses(id).await? {
            return Err(AppError::Conflict(
                "Department still has courses".to_string(),
            ));
        }
        if self.gateway.department_has_students(id).await? {
            return Err(AppError::Conflict(
                "Department still has students".to_string(),
            ));
        }
        match self.gateway.delete_department(id).await {
            Ok(true) => Ok(()),
            Ok(false) => Err(AppError::NotFound("Department not found".to_string())),
            Err(GatewayError::ForeignKeyViolation(_)) => Err(AppError::Conflict(
                "Department still has dependent records".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::models::enrollment::EnrollmentStatus;
    use crate::models::favorite::NewFavorite;

    fn setup() -> (Arc<MemoryGateway>, CatalogService) {
        let gateway = Arc::new(MemoryGateway::new());
        let service = CatalogService::new(gateway.clone());
        (gateway, service)
    }

    #[tokio::test]
    async fn course_creation_requires_a_known_department() {
        let (_gateway, service) = setup();
        let err = service
            .create_course(NewCourse {
                name: "Algorithms".to_string(),
                description: String::new(),
                department_id: Uuid::new_v4(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn course_name_is_required_but_description_is_not() {
        let (gateway, service) = setup();
        let dept = gateway.seed_department("Computer Science").unwrap();

        let err = service
            .create_course(NewCourse {
                name: "  ".to_string(),
                description: "x".to_string(),
                department_id: dept.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let course = service
            .create_course(NewCourse {
                name: "Algorithms".to_string(),
                description: String::new(),
                department_id: dept.id,
            })
            .await
            .unwrap();
        assert_eq!(course.description, "");
    }

    #[tokio::test]
    async fn updating_an_unknown_course_is_not_found() {
        let (_gateway, service) = setup();
        let err = service
            .update_course(Uuid::new_v4(), CoursePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn course_patch_applies_only_the_given_fields() {
        let (gateway, service) = setup();
        let dept = gateway.seed_department("Computer Science").unwrap();
        let course = gateway
            .seed_course("Algorithms", "classic intro", dept.id)
            .unwrap();

        let updated = service
            .update_course(
                course.id,
                CoursePatch {
                    name: Some("Advanced Algorithms".to_string()),
                    description: None,
                    department_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Advanced Algorithms");
        assert_eq!(updated.description, "classic intro");
        assert_eq!(updated.department_id, dept.id);
    }

    #[tokio::test]
    async fn deleting_a_department_with_courses_is_rejected() {
        let (gateway, service) = setup();
        let dept = gateway.seed_department("Computer Science").unwrap();
        let course = gateway.seed_course("Algorithms", "", dept.id).unwrap();

        let err = service.delete_department(dept.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        service.delete_course(course.id).await.unwrap();
        service.delete_department(dept.id).await.unwrap();
        assert!(gateway.find_department(dept.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_a_department_with_students_is_rejected() {
        let (gateway, service) = setup();
        let dept = gateway.seed_department("Computer Science").unwrap();
        gateway
            .seed_student(Uuid::new_v4(), "Ana", "ana@uni.edu", Some(dept.id))
            .unwrap();

        let err = service.delete_department(dept.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn deleting_a_course_with_enrollments_is_rejected() {
        let (gateway, service) = setup();
        let dept = gateway.seed_department("Computer Science").unwrap();
        let student = gateway
            .seed_student(Uuid::new_v4(), "Ana", "ana@uni.edu", Some(dept.id))
            .unwrap();
        let course = gateway.seed_course("Algorithms", "", dept.id).unwrap();
        gateway
            .seed_enrollment(student.id, course.id, EnrollmentStatus::Dropped)
            .unwrap();

        let err = service.delete_course(course.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
        assert!(gateway.find_course(course.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn deleting_a_bookmarked_course_is_rejected() {
        let (gateway, service) = setup();
        let dept = gateway.seed_department("Computer Science").unwrap();
        let student = gateway
            .seed_student(Uuid::new_v4(), "Ana", "ana@uni.edu", None)
            .unwrap();
        let course = gateway.seed_course("Algorithms", "", dept.id).unwrap();
        gateway
            .insert_favorite(NewFavorite {
                student_id: student.id,
                course_id: course.id,
            })
            .await
            .unwrap();

        let err = service.delete_course(course.id).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn directory_groups_courses_under_their_department() {
        let (gateway, service) = setup();
        let cs = gateway.seed_department("Computer Science").unwrap();
        let physics = gateway.seed_department("Physics").unwrap();
        gateway.seed_course("Algorithms", "", cs.id).unwrap();
        gateway.seed_course("Databases", "", cs.id).unwrap();
        gateway.seed_course("Mechanics", "", physics.id).unwrap();

        let directory = service.department_directory().await.unwrap();
        assert_eq!(directory.len(), 2);
        // newest department first
        assert_eq!(directory[0].department.id, physics.id);
        assert_eq!(directory[0].courses.len(), 1);
        assert_eq!(directory[1].department.id, cs.id);
        assert_eq!(directory[1].courses.len(), 2);
    }

    #[tokio::test]
    async fn department_rename_round_trips() {
        let (gateway, service) = setup();
        let dept = gateway.seed_department("Histroy").unwrap();

        let renamed = service
            .update_department(dept.id, "History")
            .await
            .unwrap();
        assert_eq!(renamed.name, "History");
        assert_eq!(renamed.id, dept.id);

        let err = service
            .update_department(Uuid::new_v4(), "History")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
