//! Contracts for the REST backend.
//!
//! Services depend on these traits only; `HttpBackend` is the production
//! implementation and tests substitute fakes.

use async_trait::async_trait;

use course_core::model::{
    Assignment, AssignmentSubmission, Course, CourseFilters, CourseId, Credentials,
    DashboardStats, Enrollment, EnrollmentAnalytics, EnrollmentRequest, Grade, LessonId,
    LessonMaterials, Page, Progress, Quiz, QuizAnswers, QuizResult, RegistrationDraft,
    SubmissionRecord, User, ValidatedAssignment, ValidatedCourse, ValidatedQuiz,
    ValidatedSubmission,
};

use crate::error::ApiError;

mod http;
mod wire;

pub use http::{ApiConfig, HttpBackend};

/// Token and account returned by sign-in and registration.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub token: String,
    pub user: User,
}

impl std::fmt::Debug for AuthGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthGrant")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, ApiError>;

    async fn register(&self, draft: &RegistrationDraft) -> Result<AuthGrant, ApiError>;

    async fn logout(&self, token: &str) -> Result<(), ApiError>;

    /// Resolve the account a token belongs to.
    async fn current_user(&self, token: &str) -> Result<User, ApiError>;
}

#[async_trait]
pub trait CourseApi: Send + Sync {
    async fn list_courses(&self, filters: &CourseFilters) -> Result<Page<Course>, ApiError>;

    async fn get_course(&self, id: &CourseId) -> Result<Course, ApiError>;

    async fn create_course(&self, token: &str, course: &ValidatedCourse)
    -> Result<Course, ApiError>;

    async fn update_course(
        &self,
        token: &str,
        id: &CourseId,
        course: &ValidatedCourse,
    ) -> Result<Course, ApiError>;

    async fn delete_course(&self, token: &str, id: &CourseId) -> Result<(), ApiError>;
}

#[async_trait]
pub trait StudentApi: Send + Sync {
    async fn enroll(&self, token: &str, request: &EnrollmentRequest)
    -> Result<Enrollment, ApiError>;

    async fn enrolled_courses(&self, token: &str) -> Result<Vec<Enrollment>, ApiError>;

    /// Mark a lesson complete and return the updated progress record.
    async fn update_progress(
        &self,
        token: &str,
        course: &CourseId,
        lesson: &LessonId,
    ) -> Result<Progress, ApiError>;

    async fn lesson_materials(
        &self,
        token: &str,
        course: &CourseId,
        lesson: &LessonId,
    ) -> Result<LessonMaterials, ApiError>;

    async fn submit_assignment(
        &self,
        token: &str,
        submission: &ValidatedSubmission,
    ) -> Result<AssignmentSubmission, ApiError>;

    async fn submit_quiz(&self, token: &str, answers: &QuizAnswers)
    -> Result<QuizResult, ApiError>;
}

#[async_trait]
pub trait AdminApi: Send + Sync {
    async fn dashboard_stats(&self, token: &str) -> Result<DashboardStats, ApiError>;

    async fn all_enrollments(&self, token: &str) -> Result<Vec<Enrollment>, ApiError>;

    async fn all_submissions(&self, token: &str) -> Result<Vec<SubmissionRecord>, ApiError>;

    async fn grade_submission(
        &self,
        token: &str,
        grade: &Grade,
    ) -> Result<AssignmentSubmission, ApiError>;

    /// Every assignment and quiz of a lesson, without any student's answers.
    async fn all_lesson_materials(
        &self,
        token: &str,
        course: &CourseId,
        lesson: &LessonId,
    ) -> Result<LessonMaterials, ApiError>;

    async fn create_assignment(
        &self,
        token: &str,
        assignment: &ValidatedAssignment,
    ) -> Result<Assignment, ApiError>;

    async fn create_quiz(&self, token: &str, quiz: &ValidatedQuiz) -> Result<Quiz, ApiError>;

    async fn enrollment_analytics(&self, token: &str) -> Result<EnrollmentAnalytics, ApiError>;
}
