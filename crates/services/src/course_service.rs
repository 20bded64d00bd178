use std::sync::Arc;

use course_core::model::{Course, CourseDraft, CourseFilters, CourseId, Page, Role};

use crate::api::CourseApi;
use crate::auth_session::AuthSession;
use crate::error::ServiceError;

/// Public catalogue plus admin course management.
#[derive(Clone)]
pub struct CourseService {
    session: AuthSession,
    api: Arc<dyn CourseApi>,
}

impl CourseService {
    #[must_use]
    pub fn new(session: AuthSession, api: Arc<dyn CourseApi>) -> Self {
        Self { session, api }
    }

    /// One page of the catalogue. No sign-in needed.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Api` if the backend call fails.
    #[tracing::instrument(skip(self))]
    pub async fn list(&self, filters: &CourseFilters) -> Result<Page<Course>, ServiceError> {
        Ok(self.api.list_courses(filters).await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Api` if the course is missing or malformed.
    #[tracing::instrument(skip(self))]
    pub async fn get(&self, id: &CourseId) -> Result<Course, ServiceError> {
        Ok(self.api.get_course(id).await?)
    }

    /// Validate and publish a new course.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for non-admins and `ServiceError::Domain`
    /// for an invalid draft, both before any request is made.
    #[tracing::instrument(skip(self, draft), fields(title = %draft.title))]
    pub async fn create(&self, draft: CourseDraft) -> Result<Course, ServiceError> {
        let session = self.session.authorize(Some(Role::Admin))?;
        let course = draft.validate()?;
        let created = self.api.create_course(session.token(), &course).await?;
        tracing::info!(course = %created.id(), "course created");
        Ok(created)
    }

    /// # Errors
    ///
    /// Same as [`CourseService::create`].
    #[tracing::instrument(skip(self, draft))]
    pub async fn update(&self, id: &CourseId, draft: CourseDraft) -> Result<Course, ServiceError> {
        let session = self.session.authorize(Some(Role::Admin))?;
        let course = draft.validate()?;
        Ok(self.api.update_course(session.token(), id, &course).await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for non-admins.
    #[tracing::instrument(skip(self))]
    pub async fn delete(&self, id: &CourseId) -> Result<(), ServiceError> {
        let session = self.session.authorize(Some(Role::Admin))?;
        self.api.delete_course(session.token(), id).await?;
        tracing::info!(course = %id, "course deleted");
        Ok(())
    }
}
