use actix_web::{web, HttpRequest, HttpResponse};

use super::AppState;
use crate::errors::AppError;

pub async fn get_overview(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    state.verifier.authenticate(&req)?;
    let stats = state.stats.overview().await?;
    Ok(HttpResponse::Ok().json(stats))
}
