use std::sync::Arc;

use uuid::Uuid;

use crate::errors::{AppError, GatewayError};
use crate::gateway::RecordGateway;
use crate::models::favorite::{Favorite, FavoriteWithCourse, NewFavorite};
use crate::models::student::Student;

/// Course bookmarks. Any course may be bookmarked regardless of department;
/// the only rule is one bookmark per (student, course) pair.
pub struct FavoriteService {
    gateway: Arc<dyn RecordGateway>,
}

impl FavoriteService {
    pub fn new(gateway: Arc<dyn RecordGateway>) -> Self {
        Self { gateway }
    }

    async fn student_by_auth(&self, auth_id: Uuid) -> Result<Student, AppError> {
        self.gateway
            .find_student_by_auth(auth_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Student profile not found".to_string()))
    }

    pub async fn favorites(&self, auth_id: Uuid) -> Result<Vec<FavoriteWithCourse>, AppError> {
        let student = self.student_by_auth(auth_id).await?;
        Ok(self.gateway.favorites_for_student(student.id).await?)
    }

    pub async fn add_favorite(
        &self,
        auth_id: Uuid,
        course_id: Uuid,
    ) -> Result<Favorite, AppError> {
        let student = self.student_by_auth(auth_id).await?;
        if self.gateway.find_course(course_id).await?.is_none() {
            return Err(AppError::NotFound("Course not found".to_string()));
        }
        if self
            .gateway
            .find_favorite(student.id, course_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "Course is already bookmarked".to_string(),
            ));
        }
        match self
            .gateway
            .insert_favorite(NewFavorite {
                student_id: student.id,
                course_id,
            })
            .await
        {
            Ok(favorite) => Ok(favorite),
            Err(GatewayError::UniqueViolation(_)) => Err(AppError::Conflict(
                "Course is already bookmarked".to_string(),
            )),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn remove_favorite(&self, auth_id: Uuid, course_id: Uuid) -> Result<(), AppError> {
        let student = self.student_by_auth(auth_id).await?;
        if self.gateway.delete_favorite(student.id, course_id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound("Favorite not found".to_string()))
        }
    }

    pub async fn is_favorite(&self, auth_id: Uuid, course_id: Uuid) -> Result<bool, AppError> {
        let student = self.student_by_auth(auth_id).await?;
        Ok(self
            .gateway
            .find_favorite(student.id, course_id)
            .await?
            .is_some())
    }
}
