use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use super::AppState;
use crate::errors::AppError;
use crate::utils::validation::validate_payload;

#[derive(Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(min = 1, max = 100))]
    name: String,
}

#[derive(Deserialize)]
pub struct DepartmentChoice {
    department_id: Uuid,
}

pub async fn get_profile(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let auth_id = state.verifier.authenticate(&req)?;
    let profile = state.profiles.profile(auth_id).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn update_profile(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<ProfileUpdate>,
) -> Result<HttpResponse, AppError> {
    let auth_id = state.verifier.authenticate(&req)?;
    validate_payload(&*payload)?;
    let profile = state.profiles.rename(auth_id, &payload.name).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn set_department(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<DepartmentChoice>,
) -> Result<HttpResponse, AppError> {
    let auth_id = state.verifier.authenticate(&req)?;
    let profile = state
        .profiles
        .set_department(auth_id, payload.department_id)
        .await?;
    Ok(HttpResponse::Ok().json(profile))
}
