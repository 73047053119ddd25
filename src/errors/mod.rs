use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use std::fmt;

/// Service-level error taxonomy. Domain-rule violations are returned as typed
/// failures so the caller can message the user directly; `Gateway` wraps an
/// opaque storage failure and is never retried here.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    NotEligible(String),
    AlreadyEnrolled(String),
    AlreadyAssigned(String),
    Validation(String),
    Conflict(String),
    Unauthorized(String),
    Gateway(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::NotEligible(_) => "not_eligible",
            AppError::AlreadyEnrolled(_) => "already_enrolled",
            AppError::AlreadyAssigned(_) => "already_assigned",
            AppError::Validation(_) => "validation",
            AppError::Conflict(_) => "conflict",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::Gateway(_) => "gateway",
        }
    }

    fn message(&self) -> &str {
        match self {
            AppError::NotFound(msg)
            | AppError::NotEligible(msg)
            | AppError::AlreadyEnrolled(msg)
            | AppError::AlreadyAssigned(msg)
            | AppError::Validation(msg)
            | AppError::Conflict(msg)
            | AppError::Unauthorized(msg)
            | AppError::Gateway(msg) => msg,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not Found: {}", msg),
            AppError::NotEligible(msg) => write!(f, "Not Eligible: {}", msg),
            AppError::AlreadyEnrolled(msg) => write!(f, "Already Enrolled: {}", msg),
            AppError::AlreadyAssigned(msg) => write!(f, "Already Assigned: {}", msg),
            AppError::Validation(msg) => write!(f, "Validation Error: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Gateway(msg) => write!(f, "Gateway Error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let body = ErrorResponse {
            error: self.message().to_string(),
            kind: self.kind(),
        };
        match self {
            AppError::NotFound(_) => HttpResponse::NotFound().json(body),
            AppError::NotEligible(_) => HttpResponse::Forbidden().json(body),
            AppError::AlreadyEnrolled(_)
            | AppError::AlreadyAssigned(_)
            | AppError::Conflict(_) => HttpResponse::Conflict().json(body),
            AppError::Validation(_) => HttpResponse::BadRequest().json(body),
            AppError::Unauthorized(_) => HttpResponse::Unauthorized().json(body),
            AppError::Gateway(_) => HttpResponse::InternalServerError().json(body),
        }
    }
}

/// Storage-level failures reported by a [`RecordGateway`] implementation.
/// Constraint violations stay distinct so services can translate them into
/// their domain meaning; everything else is opaque.
///
/// [`RecordGateway`]: crate::gateway::RecordGateway
#[derive(Debug)]
pub enum GatewayError {
    UniqueViolation(String),
    ForeignKeyViolation(String),
    Unavailable(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::UniqueViolation(what) => write!(f, "unique violation: {}", what),
            GatewayError::ForeignKeyViolation(what) => write!(f, "foreign key violation: {}", what),
            GatewayError::Unavailable(msg) => write!(f, "storage unavailable: {}", msg),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::UniqueViolation(what) => {
                AppError::Conflict(format!("record already exists ({})", what))
            }
            GatewayError::ForeignKeyViolation(what) => {
                AppError::NotFound(format!("referenced record does not exist ({})", what))
            }
            GatewayError::Unavailable(msg) => AppError::Gateway(msg),
        }
    }
}
