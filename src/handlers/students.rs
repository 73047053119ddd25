use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::errors::AppError;
use crate::models::student::StudentPatch;
use crate::utils::validation::validate_payload;

#[derive(Deserialize, Validate)]
pub struct StudentUpdatePayload {
    #[validate(length(min = 1, max = 100))]
    name: Option<String>,
    // Doubled so `"department_id": null` is not mistaken for an absent
    // field; the profile rules treat an explicit null as a clear request.
    #[serde(default, deserialize_with = "nullable_uuid")]
    department_id: Option<Option<Uuid>>,
}

fn nullable_uuid<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Uuid>::deserialize(deserializer).map(Some)
}

pub async fn get_students(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.verifier.authenticate(&req)?;
    let students = state.profiles.list_students().await?;
    Ok(HttpResponse::Ok().json(students))
}

pub async fn update_student(
    req: HttpRequest,
    state: web::Data<AppState>,
    student_id: web::Path<Uuid>,
    payload: web::Json<StudentUpdatePayload>,
) -> Result<HttpResponse, AppError> {
    state.verifier.authenticate(&req)?;
    validate_payload(&*payload)?;
    let payload = payload.into_inner();
    let student = state
        .profiles
        .update_student(
            student_id.into_inner(),
            StudentPatch {
                name: payload.name,
                department_id: payload.department_id,
            },
        )
        .await?;
    Ok(HttpResponse::Ok().json(student))
}

pub async fn delete_student(
    req: HttpRequest,
    state: web::Data<AppState>,
    student_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.verifier.authenticate(&req)?;
    state
        .profiles
        .delete_student(student_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Student deleted successfully"
    })))
}
