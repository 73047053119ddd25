//! Administrative statistics. Always recomputed from the current record
//! sets; nothing here is cached or materialized.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::gateway::RecordGateway;
use crate::models::course::Course;
use crate::models::department::Department;
use crate::models::enrollment::Enrollment;
use crate::models::student::Student;

/// Group label for enrollments whose course or department link no longer
/// resolves.
pub const UNKNOWN_DEPARTMENT: &str = "Unknown";

/// One group in the enrollment distribution. `department` carries the
/// department name, matching the key the admin dashboard reads.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct DepartmentCount {
    pub department: String,
    pub count: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_students: usize,
    pub total_courses: usize,
    pub total_departments: usize,
    pub enrollments_by_department: Vec<DepartmentCount>,
}

/// Folds the raw record sets into the admin overview. Groups appear in
/// first-encounter order over the enrollment list; callers wanting another
/// order sort the result themselves.
pub fn compute_stats(
    students: &[Student],
    courses: &[Course],
    departments: &[Department],
    enrollments: &[Enrollment],
) -> Stats {
    let course_departments: HashMap<Uuid, Uuid> = courses
        .iter()
        .map(|course| (course.id, course.department_id))
        .collect();
    let department_names: HashMap<Uuid, &str> = departments
        .iter()
        .map(|department| (department.id, department.name.as_str()))
        .collect();

    let mut by_department: Vec<DepartmentCount> = Vec::new();
    for enrollment in enrollments {
        let name = course_departments
            .get(&enrollment.course_id)
            .and_then(|department_id| department_names.get(department_id))
            .copied()
            .unwrap_or(UNKNOWN_DEPARTMENT);
        match by_department
            .iter_mut()
            .find(|entry| entry.department == name)
        {
            Some(entry) => entry.count += 1,
            None => by_department.push(DepartmentCount {
                department: name.to_string(),
                count: 1,
            }),
        }
    }

    Stats {
        total_students: students.len(),
        total_courses: courses.len(),
        total_departments: departments.len(),
        enrollments_by_department: by_department,
    }
}

pub struct StatsService {
    gateway: Arc<dyn RecordGateway>,
}

impl StatsService {
    pub fn new(gateway: Arc<dyn RecordGateway>) -> Self {
        Self { gateway }
    }

    pub async fn overview(&self) -> Result<Stats, AppError> {
        let students = self.gateway.list_students().await?;
        let courses = self.gateway.list_courses().await?;
        let departments = self.gateway.list_departments().await?;
        let enrollments = self.gateway.list_enrollments().await?;
        Ok(compute_stats(
            &students,
            &courses,
            &departments,
            &enrollments,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::models::enrollment::EnrollmentStatus;
    use chrono::Utc;

    fn department(name: &str) -> Department {
        Department {
            id: Uuid::new_v4(),
            name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    fn course(department_id: Uuid) -> Course {
        Course {
            id: Uuid::new_v4(),
            name: "Course".to_string(),
            description: String::new(),
            department_id,
            created_at: Utc::now(),
        }
    }

    fn enrollment(course_id: Uuid) -> Enrollment {
        Enrollment {
            id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            course_id,
            enrolled_at: Utc::now(),
            status: EnrollmentStatus::Enrolled,
        }
    }

    #[test]
    fn totals_are_collection_sizes() {
        let cs = department("Computer Science");
        let courses = vec![course(cs.id), course(cs.id)];
        let stats = compute_stats(&[], &courses, &[cs], &[]);
        assert_eq!(stats.total_students, 0);
        assert_eq!(stats.total_courses, 2);
        assert_eq!(stats.total_departments, 1);
        assert!(stats.enrollments_by_department.is_empty());
    }

    #[test]
    fn groups_follow_first_encounter_order_with_unknown_sentinel() {
        let cs = department("Computer Science");
        let cs_course = course(cs.id);
        let orphan_course_id = Uuid::new_v4();

        let enrollments = vec![
            enrollment(cs_course.id),
            enrollment(orphan_course_id),
            enrollment(cs_course.id),
        ];
        let stats = compute_stats(&[], &[cs_course], &[cs], &enrollments);

        assert_eq!(
            stats.enrollments_by_department,
            vec![
                DepartmentCount {
                    department: "Computer Science".to_string(),
                    count: 2,
                },
                DepartmentCount {
                    department: UNKNOWN_DEPARTMENT.to_string(),
                    count: 1,
                },
            ]
        );
    }

    #[test]
    fn stats_serialize_with_the_dashboard_field_names() {
        let cs = department("Computer Science");
        let cs_course = course(cs.id);
        let enrollments = vec![enrollment(cs_course.id)];

        let stats = compute_stats(&[], &[cs_course], &[cs], &enrollments);
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(
            value["enrollmentsByDepartment"],
            serde_json::json!([{ "department": "Computer Science", "count": 1 }])
        );
        assert_eq!(value["totalCourses"], 1);
    }

    #[test]
    fn course_without_department_counts_as_unknown() {
        let cs = department("Computer Science");
        let dangling = course(Uuid::new_v4());
        let enrollments = vec![enrollment(dangling.id)];

        let stats = compute_stats(&[], &[dangling], &[cs], &enrollments);
        assert_eq!(stats.enrollments_by_department.len(), 1);
        assert_eq!(
            stats.enrollments_by_department[0].department,
            UNKNOWN_DEPARTMENT
        );
    }

    #[test]
    fn group_counts_are_input_order_invariant() {
        let cs = department("Computer Science");
        let physics = department("Physics");
        let a = course(cs.id);
        let b = course(physics.id);
        let mut enrollments = vec![enrollment(a.id), enrollment(b.id), enrollment(a.id)];

        let forward = compute_stats(&[], &[a.clone(), b.clone()], &[cs.clone(), physics.clone()], &enrollments);
        enrollments.reverse();
        let backward = compute_stats(&[], &[a, b], &[cs, physics], &enrollments);

        for stats in [&forward, &backward] {
            let cs_count = stats
                .enrollments_by_department
                .iter()
                .find(|entry| entry.department == "Computer Science")
                .map(|entry| entry.count);
            assert_eq!(cs_count, Some(2));
        }
    }

    #[tokio::test]
    async fn overview_reads_fresh_state() {
        let gateway = Arc::new(MemoryGateway::new());
        let service = StatsService::new(gateway.clone());

        let cs = gateway.seed_department("Computer Science").unwrap();
        let student = gateway
            .seed_student(Uuid::new_v4(), "Ana", "ana@uni.edu", Some(cs.id))
            .unwrap();
        let course = gateway.seed_course("Algorithms", "", cs.id).unwrap();

        let before = service.overview().await.unwrap();
        assert!(before.enrollments_by_department.is_empty());

        gateway
            .seed_enrollment(student.id, course.id, EnrollmentStatus::Enrolled)
            .unwrap();

        let after = service.overview().await.unwrap();
        assert_eq!(after.total_students, 1);
        assert_eq!(after.total_courses, 1);
        assert_eq!(after.total_departments, 1);
        assert_eq!(
            after.enrollments_by_department,
            vec![DepartmentCount {
                department: "Computer Science".to_string(),
                count: 1,
            }]
        );
    }
}
