#![forbid(unsafe_code)]

pub mod admin_service;
pub mod api;
pub mod app_services;
pub mod auth_session;
pub mod course_service;
pub mod error;
pub mod learning_service;
pub mod sequencer;

pub use course_core::Clock;

pub use admin_service::AdminService;
pub use api::{AdminApi, ApiConfig, AuthApi, AuthGrant, CourseApi, HttpBackend, StudentApi};
pub use app_services::AppServices;
pub use auth_session::{AuthSession, AuthState, Session};
pub use course_service::CourseService;
pub use error::{ApiError, AppServicesError, ConfigError, ErrorKind, ServiceError, SessionError};
pub use learning_service::{Classroom, LearningService, LessonView};
pub use sequencer::{LatestOnly, Ticket};
