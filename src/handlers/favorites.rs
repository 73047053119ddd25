use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::AppState;
use crate::errors::AppError;

#[derive(Deserialize)]
pub struct FavoriteRequest {
    course_id: Uuid,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FavoriteCheck {
    is_favorite: bool,
}

pub async fn get_favorites(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let auth_id = state.verifier.authenticate(&req)?;
    let favorites = state.favorites.favorites(auth_id).await?;
    Ok(HttpResponse::Ok().json(favorites))
}

pub async fn add_favorite(
    req: HttpRequest,
    state: web::Data<AppState>,
    payload: web::Json<FavoriteRequest>,
) -> Result<HttpResponse, AppError> {
    let auth_id = state.verifier.authenticate(&req)?;
    let favorite = state
        .favorites
        .add_favorite(auth_id, payload.course_id)
        .await?;
    Ok(HttpResponse::Created().json(favorite))
}

pub async fn check_favorite(
    req: HttpRequest,
    state: web::Data<AppState>,
    course_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let auth_id = state.verifier.authenticate(&req)?;
    let is_favorite = state
        .favorites
        .is_favorite(auth_id, course_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(FavoriteCheck { is_favorite }))
}

pub async fn remove_favorite(
    req: HttpRequest,
    state: web::Data<AppState>,
    course_id: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let auth_id = state.verifier.authenticate(&req)?;
    state
        .favorites
        .remove_favorite(auth_id, course_id.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Favorite removed successfully"
    })))
}
