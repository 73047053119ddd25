use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{AppError, GatewayError};
use crate::gateway::RecordGateway;
use crate::models::course::CourseWithDepartment;
use crate::models::enrollment::{Enrollment, EnrollmentWithCourse, NewEnrollment};
use crate::models::rules;
use crate::models::student::{Student, StudentWithDepartment};

/// Course browsing state for one student: the department-scoped catalog plus
/// the student's own enrollment rows, so the caller can flag each course as
/// enrolled or enrollable.
#[derive(Debug)]
pub struct CourseBrowse {
    pub courses: Vec<CourseWithDepartment>,
    pub enrollments: Vec<Enrollment>,
}

/// Everything the student dashboard renders, fetched in one call.
#[derive(Debug)]
pub struct DashboardData {
    pub student: StudentWithDepartment,
    pub enrollments: Vec<EnrollmentWithCourse>,
}

pub struct EnrollmentService {
    gateway: Arc<dyn RecordGateway>,
}

impl EnrollmentService {
    pub fn new(gateway: Arc<dyn RecordGateway>) -> Self {
        Self { gateway }
    }

    async fn student_by_auth(&self, auth_id: Uuid) -> Result<Student, AppError> {
        self.gateway
            .find_student_by_auth(auth_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student profile not found".to_string()))
    }

    /// Enrolls the caller in a course and returns their refreshed enrollment
    /// list. A student without a department cannot enroll in anything, and a
    /// course outside the student's department is rejected even though the
    /// browsing query never offers one.
    pub async fn enroll(
        &self,
        auth_id: Uuid,
        course_id: Uuid,
    ) -> Result<Vec<Enrollment>, AppError> {
        let student = self.student_by_auth(auth_id).await?;
        if student.department_id.is_none() {
            return Err(AppError::NotEligible(
                "Select a department before enrolling".to_string(),
            ));
        }
        let course = self
            .gateway
            .find_course(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
        if !rules::is_eligible(&student, &course) {
            return Err(AppError::NotEligible(
                "Course belongs to a different department".to_string(),
            ));
        }
        let current = self.gateway.enrollments_for_student(student.id).await?;
        if rules::is_enrolled(&current, course_id) {
            return Err(AppError::AlreadyEnrolled(
                "Already enrolled in this course".to_string(),
            ));
        }
        // The check above can race with a concurrent enroll; the storage
        // uniqueness constraint is the authority and reads the same here.
        let inserted = self
            .gateway
            .insert_enrollment(NewEnrollment {
                student_id: student.id,
                course_id,
            })
            .await;
        match inserted {
            Ok(_) => {}
            Err(GatewayError::UniqueViolation(_)) => {
                return Err(AppError::AlreadyEnrolled(
                    "Already enrolled in this course".to_string(),
                ))
            }
            Err(err) => return Err(err.into()),
        }
        Ok(self.gateway.enrollments_for_student(student.id).await?)
    }

    /// The catalog the caller may enroll in. A student with no department
    /// sees an empty catalog, not an error.
    pub async fn available_courses(&self, auth_id: Uuid) -> Result<CourseBrowse, AppError> {
        let student = self.student_by_auth(auth_id).await?;
        let courses = match student.department_id {
            Some(department_id) => self.gateway.courses_by_department(department_id).await?,
            None => Vec::new(),
        };
        let enrollments = self.gateway.enrollments_for_student(student.id).await?;
        Ok(CourseBrowse {
            courses,
            enrollments,
        })
    }

    pub async fn enrollments(&self, auth_id: Uuid) -> Result<Vec<EnrollmentWithCourse>, AppError> {
        let student = self.student_by_auth(auth_id).await?;
        Ok(self.gateway.enrollments_with_courses(student.id).await?)
    }

    pub async fn dashboard(&self, auth_id: Uuid) -> Result<DashboardData, AppError> {
        let student = self.student_by_auth(auth_id).await?;
        let department = match student.department_id {
            Some(department_id) => self.gateway.find_department(department_id).await?,
            None => None,
        };
        let enrollments = self.gateway.enrollments_with_courses(student.id).await?;
        Ok(DashboardData {
            student: StudentWithDepartment {
                student,
                department,
            },
            enrollments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::models::enrollment::EnrollmentStatus;

    fn setup() -> (Arc<MemoryGateway>, EnrollmentService) {
        let gateway = Arc::new(MemoryGateway::new());
        let service = EnrollmentService::new(gateway.clone());
        (gateway, service)
    }

    #[tokio::test]
    async fn enroll_creates_a_single_enrolled_row() {
        let (gateway, service) = setup();
        let dept = gateway.seed_department("Computer Science").unwrap();
        let auth_id = Uuid::new_v4();
        gateway
            .seed_student(auth_id, "Ana", "ana@uni.edu", Some(dept.id))
            .unwrap();
        let course = gateway.seed_course("Algorithms", "", dept.id).unwrap();

        let enrollments = service.enroll(auth_id, course.id).await.unwrap();
        assert_eq!(enrollments.len(), 1);
        assert_eq!(enrollments[0].course_id, course.id);
        assert_eq!(enrollments[0].status, EnrollmentStatus::Enrolled);
    }

    #[tokio::test]
    async fn second_enroll_for_same_course_is_rejected() {
        let (gateway, service) = setup();
        let dept = gateway.seed_department("Computer Science").unwrap();
        let auth_id = Uuid::new_v4();
        let student = gateway
            .seed_student(auth_id, "Ana", "ana@uni.edu", Some(dept.id))
            .unwrap();
        let course = gateway.seed_course("Algorithms", "", dept.id).unwrap();

        service.enroll(auth_id, course.id).await.unwrap();
        let err = service.enroll(auth_id, course.id).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyEnrolled(_)));

        let rows = gateway.enrollments_for_student(student.id).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn student_without_department_cannot_enroll() {
        let (gateway, service) = setup();
        let dept = gateway.seed_department("Computer Science").unwrap();
        let auth_id = Uuid::new_v4();
        let student = gateway
            .seed_student(auth_id, "Ben", "ben@uni.edu", None)
            .unwrap();
        let course = gateway.seed_course("Algorithms", "", dept.id).unwrap();

        let err = service.enroll(auth_id, course.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotEligible(_)));

        let rows = gateway.enrollments_for_student(student.id).await.unwrap();
        assert!(rows.is_empty());
    }

    #[tokio::test]
    async fn course_from_another_department_is_not_eligible() {
        let (gateway, service) = setup();
        let cs = gateway.seed_department("Computer Science").unwrap();
        let physics = gateway.seed_department("Physics").unwrap();
        let auth_id = Uuid::new_v4();
        gateway
            .seed_student(auth_id, "Ana", "ana@uni.edu", Some(cs.id))
            .unwrap();
        let course = gateway.seed_course("Mechanics", "", physics.id).unwrap();

        let err = service.enroll(auth_id, course.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotEligible(_)));
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let (gateway, service) = setup();
        let dept = gateway.seed_department("Computer Science").unwrap();
        let auth_id = Uuid::new_v4();
        gateway
            .seed_student(auth_id, "Ana", "ana@uni.edu", Some(dept.id))
            .unwrap();

        let err = service.enroll(auth_id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn dropped_enrollment_allows_enrolling_again() {
        let (gateway, service) = setup();
        let dept = gateway.seed_department("Computer Science").unwrap();
        let auth_id = Uuid::new_v4();
        let student = gateway
            .seed_student(auth_id, "Ana", "ana@uni.edu", Some(dept.id))
            .unwrap();
        let course = gateway.seed_course("Algorithms", "", dept.id).unwrap();
        gateway
            .seed_enrollment(student.id, course.id, EnrollmentStatus::Dropped)
            .unwrap();

        let enrollments = service.enroll(auth_id, course.id).await.unwrap();
        assert_eq!(enrollments.len(), 2);
        assert_eq!(enrollments[1].status, EnrollmentStatus::Enrolled);
    }

    #[tokio::test]
    async fn completed_enrollment_still_blocks_enrolling() {
        let (gateway, service) = setup();
        let dept = gateway.seed_department("Computer Science").unwrap();
        let auth_id = Uuid::new_v4();
        let student = gateway
            .seed_student(auth_id, "Ana", "ana@uni.edu", Some(dept.id))
            .unwrap();
        let course = gateway.seed_course("Algorithms", "", dept.id).unwrap();
        gateway
            .seed_enrollment(student.id, course.id, EnrollmentStatus::Completed)
            .unwrap();

        let err = service.enroll(auth_id, course.id).await.unwrap_err();
        assert!(matches!(err, AppError::AlreadyEnrolled(_)));
    }

    #[tokio::test]
    async fn available_courses_are_scoped_to_the_student_department() {
        let (gateway, service) = setup();
        let cs = gateway.seed_department("Computer Science").unwrap();
        let physics = gateway.seed_department("Physics").unwrap();
        let auth_id = Uuid::new_v4();
        gateway
            .seed_student(auth_id, "Ana", "ana@uni.edu", Some(cs.id))
            .unwrap();
        let algorithms = gateway.seed_course("Algorithms", "", cs.id).unwrap();
        gateway.seed_course("Mechanics", "", physics.id).unwrap();

        let browse = service.available_courses(auth_id).await.unwrap();
        assert_eq!(browse.courses.len(), 1);
        assert_eq!(browse.courses[0].course.id, algorithms.id);
    }

    #[tokio::test]
    async fn unassigned_student_sees_an_empty_catalog() {
        let (gateway, service) = setup();
        let cs = gateway.seed_department("Computer Science").unwrap();
        gateway.seed_course("Algorithms", "", cs.id).unwrap();
        let auth_id = Uuid::new_v4();
        gateway
            .seed_student(auth_id, "Ben", "ben@uni.edu", None)
            .unwrap();

        let browse = service.available_courses(auth_id).await.unwrap();
        assert!(browse.courses.is_empty());
        assert!(browse.enrollments.is_empty());
    }

    #[tokio::test]
    async fn dashboard_joins_department_and_courses() {
        let (gateway, service) = setup();
        let dept = gateway.seed_department("Computer Science").unwrap();
        let auth_id = Uuid::new_v4();
        let student = gateway
            .seed_student(auth_id, "Ana", "ana@uni.edu", Some(dept.id))
            .unwrap();
        let course = gateway.seed_course("Algorithms", "", dept.id).unwrap();
        gateway
            .seed_enrollment(student.id, course.id, EnrollmentStatus::Enrolled)
            .unwrap();

        let data = service.dashboard(auth_id).await.unwrap();
        assert_eq!(data.student.student.id, student.id);
        assert_eq!(
            data.student.department.as_ref().map(|d| d.id),
            Some(dept.id)
        );
        assert_eq!(data.enrollments.len(), 1);
        assert_eq!(
            data.enrollments[0].course.as_ref().map(|c| c.id),
            Some(course.id)
        );
    }

    #[tokio::test]
    async fn unknown_caller_gets_not_found() {
        let (_gateway, service) = setup();
        let err = service.dashboard(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
