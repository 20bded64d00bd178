pub mod catalog;
mod course;
mod enrollment;
mod ids;
mod material;
mod progress;
mod user;

pub use ids::{BatchId, CourseId, EnrollmentId, LessonId, MaterialId, ParseIdError, UserId};

pub use catalog::{
    CourseFilters, DailyEnrollments, DashboardStats, EnrollmentAnalytics, Page, PageMeta,
    SortOrder,
};
pub use course::{Batch, Course, CourseDraft, CourseError, CourseMeta, Lesson, ValidatedCourse};
pub use enrollment::{
    CourseRef, Enrollment, EnrollmentError, EnrollmentRequest, EnrollmentStatus, find_for_course,
};
pub use material::{
    Assignment, AssignmentDraft, AssignmentSubmission, Grade, LessonMaterials, Material,
    MaterialError, MaterialKind, QuestionDraft, Quiz, QuizAnswers, QuizAttempt, QuizDraft,
    QuizQuestion, QuizResult, SubmissionDraft, SubmissionRecord, SubmissionStatus,
    ValidatedAssignment, ValidatedQuiz, ValidatedSubmission,
};
pub use progress::{Progress, ProgressError};
pub use user::{Credentials, MIN_PASSWORD_LEN, RegistrationDraft, Role, User, UserError};
