//! HTTP adapter. Handlers parse the request, verify the bearer token, call
//! one service method, and render the result; no domain rule lives here.

pub mod courses;
pub mod departments;
pub mod enrollments;
pub mod favorites;
pub mod profile;
pub mod stats;
pub mod students;

use std::sync::Arc;

use actix_web::web;

use crate::gateway::RecordGateway;
use crate::services::{
    CatalogService, EnrollmentService, FavoriteService, ProfileService, StatsService,
};
use crate::utils::auth::TokenVerifier;

/// One service set over one gateway, plus the token verifier. Built once and
/// wrapped in `web::Data` by the binary and by the integration tests.
pub struct AppState {
    pub catalog: CatalogService,
    pub enrollment: EnrollmentService,
    pub profiles: ProfileService,
    pub stats: StatsService,
    pub favorites: FavoriteService,
    pub verifier: TokenVerifier,
}

impl AppState {
    pub fn new(gateway: Arc<dyn RecordGateway>, verifier: TokenVerifier) -> Self {
        Self {
            catalog: CatalogService::new(gateway.clone()),
            enrollment: EnrollmentService::new(gateway.clone()),
            profiles: ProfileService::new(gateway.clone()),
            stats: StatsService::new(gateway.clone()),
            favorites: FavoriteService::new(gateway),
            verifier,
        }
    }
}

/// Registers every route. The admin prefix is namespacing for the management
/// console; authority checks beyond a valid token live with the identity
/// provider.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/v1/profile")
            .route(web::get().to(profile::get_profile))
            .route(web::patch().to(profile::update_profile)),
    )
    .service(
        web::resource("/v1/profile/department")
            .route(web::post().to(profile::set_department)),
    )
    .service(web::resource("/v1/dashboard").route(web::get().to(enrollments::dashboard)))
    .service(web::resource("/v1/courses").route(web::get().to(courses::get_available_courses)))
    .service(
        web::resource("/v1/enrollments")
            .route(web::get().to(enrollments::get_enrollments))
            .route(web::post().to(enrollments::enroll)),
    )
    .service(web::resource("/v1/departments").route(web::get().to(departments::get_directory)))
    .service(
        web::resource("/v1/favorites")
            .route(web::get().to(favorites::get_favorites))
            .route(web::post().to(favorites::add_favorite)),
    )
    .service(
        web::resource("/v1/favorites/{course_id}")
            .route(web::get().to(favorites::check_favorite))
            .route(web::delete().to(favorites::remove_favorite)),
    )
    .service(web::resource("/v1/admin/stats").route(web::get().to(stats::get_overview)))
    .service(web::resource("/v1/admin/students").route(web::get().to(students::get_students)))
    .service(
        web::resource("/v1/admin/students/{student_id}")
            .route(web::patch().to(students::update_student))
            .route(web::delete().to(students::delete_student)),
    )
    .service(
        web::resource("/v1/admin/courses")
            .route(web::get().to(courses::get_courses))
            .route(web::post().to(courses::create_course)),
    )
    .service(
        web::resource("/v1/admin/courses/{course_id}")
            .route(web::patch().to(courses::update_course))
            .route(web::delete().to(courses::delete_course)),
    )
    .service(
        web::resource("/v1/admin/departments")
            .route(web::get().to(departments::get_departments))
            .route(web::post().to(departments::create_department)),
    )
    .service(
        web::resource("/v1/admin/departments/{department_id}")
            .route(web::patch().to(departments::update_department))
            .route(web::delete().to(departments::delete_department)),
    );
}
