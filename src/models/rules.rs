//! Pure domain predicates shared by the services and the handler layer.

use uuid::Uuid;

use super::course::Course;
use super::enrollment::{Enrollment, EnrollmentStatus};
use super::student::Student;

/// A course is visible and enrollable for exactly the students whose profile
/// department equals the course's department. A student without a department
/// is eligible for nothing.
pub fn is_eligible(student: &Student, course: &Course) -> bool {
    student.department_id == Some(course.department_id)
}

/// True when an active (non-dropped) enrollment for `course_id` exists.
pub fn is_enrolled(enrollments: &[Enrollment], course_id: Uuid) -> bool {
    enrollments
        .iter()
        .any(|e| e.course_id == course_id && e.status != EnrollmentStatus::Dropped)
}

/// Number of completed enrollments; the student dashboard counter.
pub fn completed_count<'a>(enrollments: impl IntoIterator<Item = &'a Enrollment>) -> usize {
    enrollments
        .into_iter()
        .filter(|e| e.status == EnrollmentStatus::Completed)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn student(department_id: Option<Uuid>) -> Student {
        Student {
            id: Uuid::new_v4(),
            auth_id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@example.edu".to_string(),
            department_id,
            created_at: Utc::now(),
        }
    }

    fn course(department_id: Uuid) -> Course {
        Course {
            id: Uuid::new_v4(),
            name: "Algorithms".to_string(),
            description: String::new(),
            department_id,
            created_at: Utc::now(),
        }
    }

    fn enrollment(course_id: Uuid, status: EnrollmentStatus) -> Enrollment {
        Enrollment {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            course_id,
            enrolled_at: Utc::now(),
            status,
        }
    }

    #[test]
    fn eligibility_requires_matching_department() {
        let dept = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(is_eligible(&student(Some(dept)), &course(dept)));
        assert!(!is_eligible(&student(Some(other)), &course(dept)));
    }

    #[test]
    fn unassigned_student_is_never_eligible() {
        let c = course(Uuid::new_v4());
        assert!(!is_eligible(&student(None), &c));
    }

    #[test]
    fn enrolled_and_completed_rows_count_as_enrolled() {
        let course_id = Uuid::new_v4();

        let active = vec![enrollment(course_id, EnrollmentStatus::Enrolled)];
        assert!(is_enrolled(&active, course_id));

        let completed = vec![enrollment(course_id, EnrollmentStatus::Completed)];
        assert!(is_enrolled(&completed, course_id));
    }

    #[test]
    fn dropped_row_does_not_count_as_enrolled() {
        let course_id = Uuid::new_v4();
        let dropped = vec![enrollment(course_id, EnrollmentStatus::Dropped)];

        assert!(!is_enrolled(&dropped, course_id));
        assert!(!is_enrolled(&dropped, Uuid::new_v4()));
    }

    #[test]
    fn completed_count_ignores_other_statuses() {
        let course_id = Uuid::new_v4();
        let rows = vec![
            enrollment(course_id, EnrollmentStatus::Enrolled),
            enrollment(Uuid::new_v4(), EnrollmentStatus::Completed),
            enrollment(Uuid::new_v4(), EnrollmentStatus::Completed),
            enrollment(Uuid::new_v4(), EnrollmentStatus::Dropped),
        ];

        assert_eq!(completed_count(&rows), 2);
    }
}
