use std::sync::Arc;

use course_core::model::{
    Assignment, AssignmentDraft, AssignmentSubmission, CourseId, DashboardStats, Enrollment,
    EnrollmentAnalytics, Grade, LessonId, LessonMaterials, Quiz, QuizDraft, Role,
    SubmissionRecord,
};

use crate::api::AdminApi;
use crate::auth_session::AuthSession;
use crate::error::ServiceError;

/// Admin dashboard, analytics, lesson authoring and grading.
#[derive(Clone)]
pub struct AdminService {
    session: AuthSession,
    api: Arc<dyn AdminApi>,
}

impl AdminService {
    #[must_use]
    pub fn new(session: AuthSession, api: Arc<dyn AdminApi>) -> Self {
        Self { session, api }
    }

    /// Headline numbers. A failed backend call shows zeros instead of an error.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotSignedIn` or `ServiceError::Forbidden` only.
    #[tracing::instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ServiceError> {
        let session = self.session.authorize(Some(Role::Admin))?;
        match self.api.dashboard_stats(session.token()).await {
            Ok(stats) => Ok(stats),
            Err(err) => {
                tracing::warn!(error = %err, "dashboard stats unavailable, showing zeros");
                Ok(DashboardStats::default())
            }
        }
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for non-admins or `ServiceError::Api`.
    #[tracing::instrument(skip(self))]
    pub async fn enrollments(&self) -> Result<Vec<Enrollment>, ServiceError> {
        let session = self.session.authorize(Some(Role::Admin))?;
        Ok(self.api.all_enrollments(session.token()).await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for non-admins or `ServiceError::Api`.
    #[tracing::instrument(skip(self))]
    pub async fn submissions(&self) -> Result<Vec<SubmissionRecord>, ServiceError> {
        let session = self.session.authorize(Some(Role::Admin))?;
        Ok(self.api.all_submissions(session.token()).await?)
    }

    /// Grade one student's submission, checking the score against the
    /// assignment's maximum first.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Domain` if the score is out of range.
    #[tracing::instrument(skip(self, record, feedback), fields(assignment = %record.assignment_id))]
    pub async fn grade(
        &self,
        record: &SubmissionRecord,
        score: u32,
        feedback: Option<String>,
    ) -> Result<AssignmentSubmission, ServiceError> {
        let session = self.session.authorize(Some(Role::Admin))?;
        let grade = Grade::new(
            record.assignment_id.clone(),
            record.submission.student_id.clone(),
            score,
            record.max_score,
            feedback,
        )?;
        let graded = self.api.grade_submission(session.token(), &grade).await?;
        tracing::info!(student = %grade.student_id, score, "submission graded");
        Ok(graded)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for non-admins or `ServiceError::Api`.
    #[tracing::instrument(skip(self))]
    pub async fn enrollment_analytics(&self) -> Result<EnrollmentAnalytics, ServiceError> {
        let session = self.session.authorize(Some(Role::Admin))?;
        Ok(self.api.enrollment_analytics(session.token()).await?)
    }

    /// Everything attached to a lesson, always unlocked for admins.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for non-admins or `ServiceError::Api`.
    #[tracing::instrument(skip(self))]
    pub async fn lesson_materials(
        &self,
        course: &CourseId,
        lesson: &LessonId,
    ) -> Result<LessonMaterials, ServiceError> {
        let session = self.session.authorize(Some(Role::Admin))?;
        Ok(self
            .api
            .all_lesson_materials(session.token(), course, lesson)
            .await?)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Domain` for an invalid draft; nothing is sent then.
    #[tracing::instrument(skip(self, draft), fields(course = %draft.course_id, lesson = %draft.lesson_id))]
    pub async fn create_assignment(
        &self,
        draft: AssignmentDraft,
    ) -> Result<Assignment, ServiceError> {
        let session = self.session.authorize(Some(Role::Admin))?;
        let assignment = draft.validate()?;
        let created = self
            .api
            .create_assignment(session.token(), &assignment)
            .await?;
        tracing::info!(assignment = %created.id, "assignment created");
        Ok(created)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Domain` for an invalid draft; nothing is sent then.
    #[tracing::instrument(skip(self, draft), fields(course = %draft.course_id, lesson = %draft.lesson_id))]
    pub async fn create_quiz(&self, draft: QuizDraft) -> Result<Quiz, ServiceError> {
        let session = self.session.authorize(Some(Role::Admin))?;
        let quiz = draft.validate()?;
        let created = self.api.create_quiz(session.token(), &quiz).await?;
        tracing::info!(quiz = %created.id, questions = created.questions.len(), "quiz created");
        Ok(created)
    }
}
