use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

use course_core::model::{
    Assignment, AssignmentSubmission, Course, CourseFilters, CourseId, Credentials,
    DashboardStats, Enrollment, EnrollmentAnalytics, EnrollmentRequest, Grade, LessonId,
    LessonMaterials, Page, Progress, Quiz, QuizAnswers, QuizResult, RegistrationDraft,
    SubmissionRecord, User, ValidatedAssignment, ValidatedCourse, ValidatedQuiz,
    ValidatedSubmission,
};

use super::wire;
use super::{AdminApi, AuthApi, AuthGrant, CourseApi, StudentApi};
use crate::error::{ApiError, ConfigError};

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Where the backend lives and how long to wait for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiConfig {
    pub base_url: Url,
    pub timeout: Duration,
}

impl ApiConfig {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` unless `base_url` is an absolute
    /// http(s) url.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUrl {
            value: base_url.to_owned(),
            reason,
        };
        let url = Url::parse(base_url.trim()).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        Ok(Self {
            base_url: url,
            timeout,
        })
    }

    /// Read `COURSE_API_URL` and `COURSE_API_TIMEOUT_SECS`, falling back to
    /// the local development backend.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either variable is set to an unusable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ApiConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if either variable is set to an unusable value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("COURSE_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_owned());
        let timeout = match lookup("COURSE_API_TIMEOUT_SECS").filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidTimeout(raw))?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };
        Self::new(&base_url, timeout)
    }
}

/// `reqwest` client for every backend contract.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// # Errors
    ///
    /// Returns `ConfigError::Client` if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ConfigError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// # Errors
    ///
    /// Returns `ConfigError` if the environment is misconfigured.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::new(&ApiConfig::from_env()?)
    }

    /// Append `segments` to the base url. Each segment is percent-encoded on
    /// its own, so ids can never add path levels, a query or a fragment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: &Url, token: Option<&str>) -> RequestBuilder {
        tracing::debug!(%method, path = url.path(), "backend request");
        let builder = self.client.request(method, url.clone());
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &Url,
    ) -> Result<T, ApiError> {
        let body = self.send_raw(request, url).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn send_raw(&self, request: RequestBuilder, url: &Url) -> Result<Vec<u8>, ApiError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<wire::ErrorBody>(&body)
                .ok()
                .and_then(wire::ErrorBody::into_message);
            tracing::debug!(status = status.as_u16(), path = url.path(), "backend rejected request");
            return Err(ApiError::from_status(status.as_u16(), url.path(), message));
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl AuthApi for HttpBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, ApiError> {
        let url = self.endpoint(&["auth", "login"]);
        let request = self.request(Method::POST, &url, None).json(&wire::LoginBody {
            email: &credentials.email,
            password: &credentials.password,
        });
        let res: wire::AuthResponse = self.send(request, &url).await?;
        Ok(AuthGrant {
            token: res.token,
            user: res.user.into(),
        })
    }

    async fn register(&self, draft: &RegistrationDraft) -> Result<AuthGrant, ApiError> {
        let url = self.endpoint(&["auth", "register"]);
        let request = self.request(Method::POST, &url, None).json(&wire::RegisterBody {
            name: &draft.name,
            email: &draft.email,
            password: &draft.password,
            role: draft.role,
        });
        let res: wire::AuthResponse = self.send(request, &url).await?;
        Ok(AuthGrant {
            token: res.token,
            user: res.user.into(),
        })
    }

    async fn logout(&self, token: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["auth", "logout"]);
        self.send_raw(self.request(Method::POST, &url, Some(token)), &url)
            .await?;
        Ok(())
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        let url = self.endpoint(&["auth", "me"]);
        let res: wire::MeResponse = self
            .send(self.request(Method::GET, &url, Some(token)), &url)
            .await?;
        Ok(res.user.into())
    }
}

#[async_trait]
impl CourseApi for HttpBackend {
    async fn list_courses(&self, filters: &CourseFilters) -> Result<Page<Course>, ApiError> {
        let url = self.endpoint(&["api", "courses"]);
        let request = self
            .request(Method::GET, &url, None)
            .query(&filters.query_pairs());
        let page: wire::CoursePageDto = self.send(request, &url).await?;
        Ok(page.try_into()?)
    }

    async fn get_course(&self, id: &CourseId) -> Result<Course, ApiError> {
        let url = self.endpoint(&["api", "courses", id.as_str()]);
        let res: wire::CourseEnvelope = self
            .send(self.request(Method::GET, &url, None), &url)
            .await?;
        Ok(res.course.try_into()?)
    }

    async fn create_course(
        &self,
        token: &str,
        course: &ValidatedCourse,
    ) -> Result<Course, ApiError> {
        let url = self.endpoint(&["api", "courses", "admin", "create"]);
        let request = self
            .request(Method::POST, &url, Some(token))
            .json(&wire::CourseBody::new(course));
        let res: wire::CourseEnvelope = self.send(request, &url).await?;
        Ok(res.course.try_into()?)
    }

    async fn update_course(
        &self,
        token: &str,
        id: &CourseId,
        course: &ValidatedCourse,
    ) -> Result<Course, ApiError> {
        let url = self.endpoint(&["api", "courses", "admin", id.as_str()]);
        let request = self
            .request(Method::PUT, &url, Some(token))
            .json(&wire::CourseBody::new(course));
        let res: wire::CourseEnvelope = self.send(request, &url).await?;
        Ok(res.course.try_into()?)
    }

    async fn delete_course(&self, token: &str, id: &CourseId) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "courses", "admin", id.as_str()]);
        self.send_raw(self.request(Method::DELETE, &url, Some(token)), &url)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl StudentApi for HttpBackend {
    async fn enroll(
        &self,
        token: &str,
        request: &EnrollmentRequest,
    ) -> Result<Enrollment, ApiError> {
        let url = self.endpoint(&["api", "enroll"]);
        let req = self
            .request(Method::POST, &url, Some(token))
            .json(&wire::EnrollBody {
                course_id: &request.course_id,
                batch_id: &request.batch_id,
            });
        let res: wire::EnrollmentEnvelope = self.send(req, &url).await?;
        Ok(res.enrollment.try_into()?)
    }

    async fn enrolled_courses(&self, token: &str) -> Result<Vec<Enrollment>, ApiError> {
        let url = self.endpoint(&["api", "student", "courses"]);
        let res: wire::StudentCoursesEnvelope = self
            .send(self.request(Method::GET, &url, Some(token)), &url)
            .await?;
        Ok(wire::enrollments(res.courses)?)
    }

    async fn update_progress(
        &self,
        token: &str,
        course: &CourseId,
        lesson: &LessonId,
    ) -> Result<Progress, ApiError> {
        let url = self.endpoint(&["api", "progress"]);
        let request = self
            .request(Method::POST, &url, Some(token))
            .json(&wire::ProgressBody {
                course_id: course,
                lesson_id: lesson,
            });
        let res: wire::ProgressEnvelope = self.send(request, &url).await?;
        Ok(res.progress.into())
    }

    async fn lesson_materials(
        &self,
        token: &str,
        course: &CourseId,
        lesson: &LessonId,
    ) -> Result<LessonMaterials, ApiError> {
        let url = self.endpoint(&[
            "api",
            "courses",
            course.as_str(),
            "lessons",
            lesson.as_str(),
            "materials",
        ]);
        let payload: wire::MaterialsPayload = self
            .send(self.request(Method::GET, &url, Some(token)), &url)
            .await?;
        payload.into_materials()
    }

    async fn submit_assignment(
        &self,
        token: &str,
        submission: &ValidatedSubmission,
    ) -> Result<AssignmentSubmission, ApiError> {
        let url = self.endpoint(&["api", "assignments"]);
        let request = self
            .request(Method::POST, &url, Some(token))
            .json(&wire::SubmissionBody {
                assignment_id: &submission.assignment_id,
                submission_text: submission.text.as_deref(),
                submission_link: submission.link.as_ref().map(Url::as_str),
            });
        let res: wire::SubmissionEnvelope = self.send(request, &url).await?;
        Ok(res.submission.try_into()?)
    }

    async fn submit_quiz(
        &self,
        token: &str,
        answers: &QuizAnswers,
    ) -> Result<QuizResult, ApiError> {
        let url = self.endpoint(&["api", "quiz", "submit"]);
        let request = self
            .request(Method::POST, &url, Some(token))
            .json(&wire::QuizBody::new(answers));
        let res: wire::QuizResultDto = self.send(request, &url).await?;
        Ok(res.try_into()?)
    }
}

#[async_trait]
impl AdminApi for HttpBackend {
    async fn dashboard_stats(&self, token: &str) -> Result<DashboardStats, ApiError> {
        let url = self.endpoint(&["admin", "stats"]);
        let stats: wire::StatsDto = self
            .send(self.request(Method::GET, &url, Some(token)), &url)
            .await?;
        Ok(stats.into())
    }

    async fn all_enrollments(&self, token: &str) -> Result<Vec<Enrollment>, ApiError> {
        let url = self.endpoint(&["api", "admin", "enrollments"]);
        let res: wire::AdminEnrollmentsEnvelope = self
            .send(self.request(Method::GET, &url, Some(token)), &url)
            .await?;
        Ok(wire::enrollments(res.enrollments)?)
    }

    async fn all_submissions(&self, token: &str) -> Result<Vec<SubmissionRecord>, ApiError> {
        let url = self.endpoint(&["api", "admin", "submissions"]);
        let res: wire::SubmissionsEnvelope = self
            .send(self.request(Method::GET, &url, Some(token)), &url)
            .await?;
        Ok(res.into_records()?)
    }

    async fn grade_submission(
        &self,
        token: &str,
        grade: &Grade,
    ) -> Result<AssignmentSubmission, ApiError> {
        let url = self.endpoint(&[
            "api",
            "admin",
            "assignments",
            grade.assignment_id.as_str(),
            "grade",
        ]);
        let request = self
            .request(Method::PUT, &url, Some(token))
            .json(&wire::GradeBody {
                student_id: &grade.student_id,
                score: grade.score,
                feedback: grade.feedback.as_deref(),
            });
        let res: wire::SubmissionEnvelope = self.send(request, &url).await?;
        Ok(res.submission.try_into()?)
    }

    async fn all_lesson_materials(
        &self,
        token: &str,
        course: &CourseId,
        lesson: &LessonId,
    ) -> Result<LessonMaterials, ApiError> {
        let url = self.endpoint(&[
            "api",
            "admin",
            "courses",
            course.as_str(),
            "lessons",
            lesson.as_str(),
            "materials",
        ]);
        let payload: wire::MaterialsPayload = self
            .send(self.request(Method::GET, &url, Some(token)), &url)
            .await?;
        payload.into_materials()
    }

    async fn create_assignment(
        &self,
        token: &str,
        assignment: &ValidatedAssignment,
    ) -> Result<Assignment, ApiError> {
        let url = self.endpoint(&["api", "admin", "assignments"]);
        let request = self
            .request(Method::POST, &url, Some(token))
            .json(&wire::AssignmentBody::new(assignment));
        let res: wire::AssignmentEnvelope = self.send(request, &url).await?;
        Ok(res.try_into()?)
    }

    async fn create_quiz(&self, token: &str, quiz: &ValidatedQuiz) -> Result<Quiz, ApiError> {
        let url = self.endpoint(&["api", "admin", "quizzes"]);
        let request = self
            .request(Method::POST, &url, Some(token))
            .json(&wire::NewQuizBody::new(quiz));
        let res: wire::QuizEnvelope = self.send(request, &url).await?;
        Ok(res.try_into()?)
    }

    async fn enrollment_analytics(&self, token: &str) -> Result<EnrollmentAnalytics, ApiError> {
        let url = self.endpoint(&["api", "admin", "analytics", "enrollments"]);
        let res: wire::AnalyticsDto = self
            .send(self.request(Method::GET, &url, Some(token)), &url)
            .await?;
        res.try_into()
    }
}
