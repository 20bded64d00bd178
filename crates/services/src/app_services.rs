use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::admin_service::AdminService;
use crate::api::{AdminApi, ApiConfig, AuthApi, CourseApi, HttpBackend, StudentApi};
use crate::auth_session::AuthSession;
use crate::course_service::CourseService;
use crate::error::AppServicesError;
use crate::learning_service::LearningService;

/// Assembles app-facing services around one shared session.
#[derive(Clone)]
pub struct AppServices {
    session: AuthSession,
    courses: Arc<CourseService>,
    learning: Arc<LearningService>,
    admin: Arc<AdminService>,
}

impl AppServices {
    /// Build services talking to the HTTP backend, with credentials in `SQLite`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or the HTTP client
    /// setup fails.
    pub async fn new_sqlite(
        db_url: &str,
        config: &ApiConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let backend = Arc::new(HttpBackend::new(config)?);
        Ok(Self::with_backend(&storage, backend, clock))
    }

    /// Wire services over any backend implementing every contract.
    #[must_use]
    pub fn with_backend<B>(storage: &Storage, backend: Arc<B>, clock: Clock) -> Self
    where
        B: AuthApi + CourseApi + StudentApi + AdminApi + 'static,
    {
        let auth: Arc<dyn AuthApi> = backend.clone();
        let course_api: Arc<dyn CourseApi> = backend.clone();
        let student_api: Arc<dyn StudentApi> = backend.clone();
        let admin_api: Arc<dyn AdminApi> = backend;

        let session = AuthSession::new(auth, Arc::clone(&storage.credentials), clock);
        let courses = Arc::new(CourseService::new(session.clone(), Arc::clone(&course_api)));
        let learning = Arc::new(LearningService::new(
            session.clone(),
            course_api,
            student_api,
            clock,
        ));
        let admin = Arc::new(AdminService::new(session.clone(), admin_api));

        Self {
            session,
            courses,
            learning,
            admin,
        }
    }

    #[must_use]
    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    #[must_use]
    pub fn courses(&self) -> Arc<CourseService> {
        Arc::clone(&self.courses)
    }

    #[must_use]
    pub fn learning(&self) -> Arc<LearningService> {
        Arc::clone(&self.learning)
    }

    #[must_use]
    pub fn admin(&self) -> Arc<AdminService> {
        Arc::clone(&self.admin)
    }
}
