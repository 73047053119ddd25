use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::errors::AppError;
use crate::utils::validation::validate_payload;

#[derive(Deserialize, Validate)]
pub struct DepartmentPayload {
    #[validate(length(min = 1, max = 100))]
    name: String,
}

pub async fn get_directory(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.verifier.authenticate(&req)?;
    let directory = state.catalog.department_directory().await?;
    Ok(HttpResponse::Ok().json(directory))
}

pub async fn get_departments(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.verifier.authenticate(&req)?;
    let departments = state.catalog.list_departments().await?;
    Ok(HttpResponse::Ok().json(departments))
}

pub async fn create_department(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<DepartmentPayload>,
) -> Result<HttpResponse, AppError> {
    state.verifier.authenticate(&req)?;
    validate_payload(&*payload)?;
    let department = state.catalog.create_department(&payload.name).await?;
    Ok(HttpResponse::Created().json(department))
}

pub async fn update_department(
    req: HttpRequest,
    state: web::Data<AppState>,
    department_id: web::Path<Uuid>,
    payload: web::Json<DepartmentPayload>,
) -> Result<HttpResponse, AppError> {
    state.verifier.authenticate(&req)?;
    validate_payload(&*payload)?;
    let department = state
        .catalog
        .update_department(department_id.into_inner(), &payload.name)
        .await?;
    Ok(HttpResponse::Ok().json(department))
}

pub async fn delete_department(
    req: HttpRequest,
    state: web::Data<AppState>,
    department_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.verifier.authenticate(&req)?;
    state
        .catalog
        .delete_department(department_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Department deleted successfully"
    })))
}
