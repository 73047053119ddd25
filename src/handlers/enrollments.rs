use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AppState;
use crate::errors::AppError;
use crate::models::enrollment::EnrollmentWithCourse;
use crate::models::rules;
use crate::models::student::StudentWithDepartment;

#[derive(Deserialize)]
pub struct EnrollmentRequest {
    course_id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardResponse {
    student: StudentWithDepartment,
    enrollments: Vec<EnrollmentWithCourse>,
    enrolled_courses: usize,
    completed_courses: usize,
}

pub async fn enroll(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<EnrollmentRequest>,
) -> Result<HttpResponse, AppError> {
    let auth_id = state.verifier.authenticate(&req)?;
    let enrollments = state.enrollment.enroll(auth_id, payload.course_id).await?;
    Ok(HttpResponse::Created().json(enrollments))
}

pub async fn get_enrollments(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let auth_id = state.verifier.authenticate(&req)?;
    let enrollments = state.enrollment.enrollments(auth_id).await?;
    Ok(HttpResponse::Ok().json(enrollments))
}

pub async fn dashboard(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let auth_id = state.verifier.authenticate(&req)?;
    let data = state.enrollment.dashboard(auth_id).await?;
    // Counts every enrollment row, dropped ones included.
    let enrolled_courses = data.enrollments.len();
    let completed_courses =
        rules::completed_count(data.enrollments.iter().map(|entry| &entry.enrollment));
    Ok(HttpResponse::Ok().json(DashboardResponse {
        student: data.student,
        enrollments: data.enrollments,
        enrolled_courses,
        completed_courses,
    }))
}
