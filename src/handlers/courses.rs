use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::errors::AppError;
use crate::models::course::{Course, CoursePatch, NewCourse};
use crate::models::department::Department;
use crate::models::rules;
use crate::services::enrollment::CourseBrowse;
use crate::utils::validation::validate_payload;

#[derive(Deserialize, Validate)]
pub struct NewCoursePayload {
    #[validate(length(min = 1, max = 150))]
    name: String,
    #[serde(default)]
    description: String,
    department_id: Uuid,
}

#[derive(Deserialize, Validate)]
pub struct CourseUpdatePayload {
    #[validate(length(min = 1, max = 150))]
    name: Option<String>,
    description: Option<String>,
    department_id: Option<Uuid>,
}

/// A catalog entry as the student browse page renders it.
#[derive(Serialize)]
struct BrowseCourse {
    #[serde(flatten)]
    course: Course,
    department: Option<Department>,
    enrolled: bool,
}

pub async fn get_available_courses(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let auth_id = state.verifier.authenticate(&req)?;
    let CourseBrowse {
        courses,
        enrollments,
    } = state.enrollment.available_courses(auth_id).await?;
    let response: Vec<BrowseCourse> = courses
        .into_iter()
        .map(|entry| BrowseCourse {
            enrolled: rules::is_enrolled(&enrollments, entry.course.id),
            course: entry.course,
            department: entry.department,
        })
        .collect();
    Ok(HttpResponse::Ok().json(response))
}

pub async fn get_courses(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.verifier.authenticate(&req)?;
    let courses = state.catalog.list_courses().await?;
    Ok(HttpResponse::Ok().json(courses))
}

pub async fn create_course(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<NewCoursePayload>,
) -> Result<HttpResponse, AppError> {
    state.verifier.authenticate(&req)?;
    validate_payload(&*payload)?;
    let payload = payload.into_inner();
    let course = state
        .catalog
        .create_course(NewCourse {
            name: payload.name,
            description: payload.description,
            department_id: payload.department_id,
        })
        .await?;
    Ok(HttpResponse::Created().json(course))
}

pub async fn update_course(
    req: HttpRequest,
    state: web::Data<AppState>,
    course_id: web::Path<Uuid>,
    payload: web::Json<CourseUpdatePayload>,
) -> Result<HttpResponse, AppError> {
    state.verifier.authenticate(&req)?;
    validate_payload(&*payload)?;
    let payload = payload.into_inner();
    let course = state
        .catalog
        .update_course(
            course_id.into_inner(),
            CoursePatch {
                name: payload.name,
                description: payload.description,
                department_id: payload.department_id,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(course))
}

pub async fn delete_course(
    req: HttpRequest,
    state: web::Data<AppState>,
    course_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.verifier.authenticate(&req)?;
    state.catalog.delete_course(course_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Course deleted successfully"
    })))
}
