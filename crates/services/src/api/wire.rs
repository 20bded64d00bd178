//! JSON shapes exchanged with the backend and their conversion into the
//! domain model. Everything coming off the wire is validated here.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use url::Url;

use course_core::model::{
    Assignment, AssignmentSubmission, Batch, BatchId, Course, CourseDraft, CourseId, CourseMeta,
    CourseRef, DailyEnrollments, DashboardStats, Enrollment, EnrollmentAnalytics, EnrollmentId,
    EnrollmentStatus, Lesson, LessonId, LessonMaterials, Material, MaterialError, MaterialId,
    MaterialKind, Page, PageMeta, Progress, Quiz, QuizAttempt, QuizQuestion, QuizResult, Role,
    SubmissionRecord, User, UserId, ValidatedAssignment, ValidatedCourse, ValidatedQuiz,
};

use crate::error::ApiError;

//
// ─── ERROR BODY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

impl ErrorBody {
    pub(crate) fn into_message(self) -> Option<String> {
        self.message.or(self.error).filter(|m| !m.trim().is_empty())
    }
}

//
// ─── USERS ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct UserDto {
    #[serde(alias = "_id")]
    id: UserId,
    name: String,
    email: String,
    role: Role,
}

impl From<UserDto> for User {
    fn from(dto: UserDto) -> Self {
        User::new(dto.id, dto.name, dto.email, dto.role)
    }
}

#[derive(Deserialize)]
pub(crate) struct AuthResponse {
    pub(crate) token: String,
    pub(crate) user: UserDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MeResponse {
    pub(crate) user: UserDto,
}

#[derive(Serialize)]
pub(crate) struct LoginBody<'a> {
    pub(crate) email: &'a str,
    pub(crate) password: &'a str,
}

#[derive(Serialize)]
pub(crate) struct RegisterBody<'a> {
    pub(crate) name: &'a str,
    pub(crate) email: &'a str,
    pub(crate) password: &'a str,
    pub(crate) role: Role,
}

//
// ─── COURSES ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InstructorDto {
    Name(String),
    User { name: String },
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LessonDto {
    lesson_id: LessonId,
    title: String,
    duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
}

impl LessonDto {
    fn from_lesson(lesson: &Lesson) -> Self {
        Self {
            lesson_id: lesson.id().clone(),
            title: lesson.title().to_owned(),
            duration: lesson.duration_minutes(),
            video_url: lesson.video_url().map(Url::to_string),
            description: lesson.description().map(str::to_owned),
        }
    }

    fn into_lesson(self) -> Result<Lesson, course_core::Error> {
        Ok(Lesson::new(
            self.lesson_id,
            self.title,
            self.duration,
            self.video_url.as_deref(),
            self.description,
        )?)
    }
}

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BatchDto {
    batch_id: BatchId,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    capacity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enrolled_count: Option<u32>,
}

impl BatchDto {
    fn from_batch(batch: &Batch) -> Self {
        Self {
            batch_id: batch.id().clone(),
            start_date: batch.start_date(),
            end_date: batch.end_date(),
            capacity: batch.capacity(),
            enrolled_count: batch.enrolled_count(),
        }
    }

    fn into_batch(self) -> Result<Batch, course_core::Error> {
        Ok(Batch::new(
            self.batch_id,
            self.start_date,
            self.end_date,
            self.capacity,
            self.enrolled_count,
        )?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseDto {
    #[serde(rename = "_id", alias = "id")]
    id: CourseId,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    instructor: Option<InstructorDto>,
    price: f64,
    #[serde(default)]
    category: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    syllabus: Vec<LessonDto>,
    #[serde(default)]
    batches: Vec<BatchDto>,
    #[serde(default)]
    enrollment_count: u32,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<CourseDto> for Course {
    type Error = course_core::Error;

    fn try_from(dto: CourseDto) -> Result<Self, Self::Error> {
        let syllabus = dto
            .syllabus
            .into_iter()
            .map(LessonDto::into_lesson)
            .collect::<Result<Vec<_>, _>>()?;
        let batches = dto
            .batches
            .into_iter()
            .map(BatchDto::into_batch)
            .collect::<Result<Vec<_>, _>>()?;
        let instructor = dto.instructor.map(|i| match i {
            InstructorDto::Name(name) | InstructorDto::User { name } => name,
        });
        let validated = CourseDraft {
            title: dto.title,
            description: dto.description,
            instructor,
            price: dto.price,
            category: dto.category,
            tags: dto.tags,
            syllabus,
            batches,
        }
        .validate()?;
        Ok(validated.assign_id(
            dto.id,
            CourseMeta {
                enrollment_count: dto.enrollment_count,
                created_at: dto.created_at,
                updated_at: dto.updated_at,
            },
        ))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CourseEnvelope {
    pub(crate) course: CourseDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageMetaDto {
    total: u64,
    page: u32,
    limit: u32,
    total_pages: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CoursePageDto {
    data: Vec<CourseDto>,
    meta: PageMetaDto,
}

impl TryFrom<CoursePageDto> for Page<Course> {
    type Error = course_core::Error;

    fn try_from(dto: CoursePageDto) -> Result<Self, Self::Error> {
        let items = dto
            .data
            .into_iter()
            .map(Course::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page {
            items,
            meta: PageMeta {
                total: dto.meta.total,
                page: dto.meta.page,
                limit: dto.meta.limit,
                total_pages: dto.meta.total_pages,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct CourseBody<'a> {
    title: &'a str,
    description: &'a str,
    price: f64,
    category: &'a str,
    tags: Vec<&'a str>,
    syllabus: Vec<LessonDto>,
    batches: Vec<BatchDto>,
}

impl<'a> CourseBody<'a> {
    pub(crate) fn new(course: &'a ValidatedCourse) -> Self {
        Self {
            title: &course.title,
            description: &course.description,
            price: course.price,
            category: &course.category,
            tags: course.tags.iter().map(String::as_str).collect(),
            syllabus: course.syllabus.iter().map(LessonDto::from_lesson).collect(),
            batches: course.batches.iter().map(BatchDto::from_batch).collect(),
        }
    }
}

//
// ─── ENROLLMENT & PROGRESS ─────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProgressDto {
    course_id: CourseId,
    #[serde(default)]
    completed_lesson_ids: Vec<LessonId>,
    #[serde(default)]
    total_lessons: u32,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<ProgressDto> for Progress {
    fn from(dto: ProgressDto) -> Self {
        Progress::from_parts(
            dto.course_id,
            dto.completed_lesson_ids,
            dto.total_lessons,
            dto.updated_at,
        )
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressEnvelope {
    pub(crate) progress: ProgressDto,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ProgressBody<'a> {
    pub(crate) course_id: &'a CourseId,
    pub(crate) lesson_id: &'a LessonId,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CourseRefDto {
    Id(CourseId),
    Embedded(Box<CourseDto>),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrollmentDto {
    #[serde(rename = "_id", alias = "id")]
    id: EnrollmentId,
    course_id: CourseRefDto,
    student_id: UserId,
    batch_id: BatchId,
    enrolled_at: DateTime<Utc>,
    status: EnrollmentStatus,
    #[serde(default)]
    progress: Option<ProgressDto>,
}

impl TryFrom<EnrollmentDto> for Enrollment {
    type Error = course_core::Error;

    fn try_from(dto: EnrollmentDto) -> Result<Self, Self::Error> {
        let course = match dto.course_id {
            CourseRefDto::Id(id) => CourseRef::Id(id),
            CourseRefDto::Embedded(course) => CourseRef::Embedded(Box::new((*course).try_into()?)),
        };
        Ok(Enrollment {
            id: dto.id,
            course,
            student_id: dto.student_id,
            batch_id: dto.batch_id,
            enrolled_at: dto.enrolled_at,
            status: dto.status,
            progress: dto.progress.map(Progress::from),
        })
    }
}

pub(crate) fn enrollments(dtos: Vec<EnrollmentDto>) -> Result<Vec<Enrollment>, course_core::Error> {
    dtos.into_iter().map(Enrollment::try_from).collect()
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnrollmentEnvelope {
    pub(crate) enrollment: EnrollmentDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StudentCoursesEnvelope {
    pub(crate) courses: Vec<EnrollmentDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AdminEnrollmentsEnvelope {
    pub(crate) enrollments: Vec<EnrollmentDto>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrollBody<'a> {
    pub(crate) course_id: &'a CourseId,
    pub(crate) batch_id: &'a BatchId,
}

//
// ─── MATERIALS ─────────────────────────────────────────────────────────────────
//

fn default_max_score() -> u32 {
    100
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmissionDto {
    student_id: UserId,
    #[serde(default)]
    submission_text: Option<String>,
    #[serde(default)]
    submission_link: Option<String>,
    submitted_at: DateTime<Utc>,
    #[serde(default, alias = "grade")]
    score: Option<u32>,
    #[serde(default)]
    feedback: Option<String>,
}

impl TryFrom<SubmissionDto> for AssignmentSubmission {
    type Error = course_core::Error;

    fn try_from(dto: SubmissionDto) -> Result<Self, Self::Error> {
        let link = match dto.submission_link.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => {
                Some(Url::parse(raw).map_err(|_| MaterialError::InvalidLink(raw.to_owned()))?)
            }
            _ => None,
        };
        Ok(AssignmentSubmission {
            student_id: dto.student_id,
            text: dto.submission_text.filter(|t| !t.trim().is_empty()),
            link,
            submitted_at: dto.submitted_at,
            grade: dto.score,
            feedback: dto.feedback.filter(|f| !f.trim().is_empty()),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionEnvelope {
    pub(crate) submission: SubmissionDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssignmentDto {
    #[serde(rename = "_id", alias = "id")]
    id: MaterialId,
    course_id: CourseId,
    #[serde(default)]
    lesson_id: Option<LessonId>,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    #[serde(default = "default_max_score")]
    max_score: u32,
    #[serde(default)]
    student_submission: Option<SubmissionDto>,
}

impl TryFrom<AssignmentDto> for Assignment {
    type Error = course_core::Error;

    fn try_from(dto: AssignmentDto) -> Result<Self, Self::Error> {
        if dto.title.trim().is_empty() {
            return Err(MaterialError::EmptyTitle.into());
        }
        if dto.max_score == 0 {
            return Err(MaterialError::InvalidMaxScore.into());
        }
        Ok(Assignment {
            id: dto.id,
            course_id: dto.course_id,
            lesson_id: dto.lesson_id,
            title: dto.title.trim().to_owned(),
            description: dto.description,
            due_date: dto.due_date,
            max_score: dto.max_score,
            submission: dto
                .student_submission
                .map(AssignmentSubmission::try_from)
                .transpose()?,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDto {
    question: String,
    options: Vec<String>,
    correct_answer: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AttemptDto {
    student_id: UserId,
    /// `-1` marks an unanswered question.
    answers: Vec<i64>,
    #[serde(default)]
    score: Option<u32>,
    attempted_at: DateTime<Utc>,
    #[serde(default)]
    time_taken: Option<u32>,
}

impl From<AttemptDto> for QuizAttempt {
    fn from(dto: AttemptDto) -> Self {
        QuizAttempt {
            student_id: dto.student_id,
            answers: dto
                .answers
                .into_iter()
                .map(|a| usize::try_from(a).ok())
                .collect(),
            score: dto
                .score
                .map(|s| u8::try_from(s.min(100)).unwrap_or(100)),
            attempted_at: dto.attempted_at,
            time_taken_secs: dto.time_taken,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuizDto {
    #[serde(rename = "_id", alias = "id")]
    id: MaterialId,
    course_id: CourseId,
    #[serde(default)]
    lesson_id: Option<LessonId>,
    title: String,
    #[serde(default)]
    description: Option<String>,
    questions: Vec<QuestionDto>,
    passing_score: u32,
    #[serde(default)]
    time_limit: Option<u32>,
    #[serde(default)]
    attempts: Vec<AttemptDto>,
}

impl TryFrom<QuizDto> for Quiz {
    type Error = course_core::Error;

    fn try_from(dto: QuizDto) -> Result<Self, Self::Error> {
        if dto.title.trim().is_empty() {
            return Err(MaterialError::EmptyTitle.into());
        }
        if dto.questions.is_empty() {
            return Err(MaterialError::NoQuestions.into());
        }
        let questions = dto
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, q)| QuizQuestion::new(index, q.question, q.options, q.correct_answer))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Quiz {
            id: dto.id,
            course_id: dto.course_id,
            lesson_id: dto.lesson_id,
            title: dto.title.trim().to_owned(),
            description: dto.description.filter(|d| !d.trim().is_empty()),
            questions,
            passing_score: Quiz::passing_score_from(dto.passing_score)?,
            time_limit_minutes: dto.time_limit,
            attempts: dto.attempts.into_iter().map(QuizAttempt::from).collect(),
        })
    }
}

/// Lesson materials arrive either grouped (`{assignments, quizzes}`) or as a
/// flat list tagged with `kind`. Anything else is rejected.
#[derive(Debug, Deserialize)]
pub(crate) struct MaterialsPayload {
    #[serde(default)]
    assignments: Option<Vec<AssignmentDto>>,
    #[serde(default)]
    quizzes: Option<Vec<QuizDto>>,
    #[serde(default)]
    materials: Option<Vec<serde_json::Value>>,
}

impl MaterialsPayload {
    pub(crate) fn into_materials(self) -> Result<LessonMaterials, ApiError> {
        if self.assignments.is_none() && self.quizzes.is_none() && self.materials.is_none() {
            return Err(ApiError::Decode(serde_json::Error::custom(
                "expected `assignments`/`quizzes` or `materials`",
            )));
        }

        let mut out = LessonMaterials::default();
        for dto in self.assignments.unwrap_or_default() {
            out.assignments.push(dto.try_into()?);
        }
        for dto in self.quizzes.unwrap_or_default() {
            out.quizzes.push(dto.try_into()?);
        }
        for value in self.materials.unwrap_or_default() {
            match tagged_material(value)? {
                Material::Assignment(a) => out.assignments.push(a),
                Material::Quiz(q) => out.quizzes.push(q),
            }
        }
        Ok(out)
    }
}

fn tagged_material(value: serde_json::Value) -> Result<Material, ApiError> {
    let kind = value
        .get("kind")
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| serde_json::Error::custom("material is missing `kind`"))?;
    let material = match MaterialKind::parse(kind).map_err(course_core::Error::from)? {
        MaterialKind::Assignment => {
            let dto: AssignmentDto = serde_json::from_value(value)?;
            Material::Assignment(dto.try_into()?)
        }
        MaterialKind::Quiz => {
            let dto: QuizDto = serde_json::from_value(value)?;
            Material::Quiz(dto.try_into()?)
        }
    };
    Ok(material)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SubmissionBody<'a> {
    pub(crate) assignment_id: &'a MaterialId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) submission_text: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) submission_link: Option<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuizBody<'a> {
    pub(crate) quiz_id: &'a MaterialId,
    pub(crate) answers: Vec<i64>,
    pub(crate) time_taken: u32,
}

impl<'a> QuizBody<'a> {
    pub(crate) fn new(answers: &'a course_core::model::QuizAnswers) -> Self {
        Self {
            quiz_id: &answers.quiz_id,
            answers: answers
                .answers
                .iter()
                .map(|a| a.and_then(|i| i64::try_from(i).ok()).unwrap_or(-1))
                .collect(),
            time_taken: answers.time_taken_secs,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct QuizResultDto {
    attempt: AttemptDto,
    passed: bool,
    passing_score: u32,
}

impl TryFrom<QuizResultDto> for QuizResult {
    type Error = course_core::Error;

    fn try_from(dto: QuizResultDto) -> Result<Self, Self::Error> {
        Ok(QuizResult {
            attempt: dto.attempt.into(),
            passed: dto.passed,
            passing_score: Quiz::passing_score_from(dto.passing_score)?,
        })
    }
}

//
// ─── ADMIN ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StatsDto {
    #[serde(default)]
    total_courses: u64,
    #[serde(default)]
    total_students: u64,
    #[serde(default)]
    total_enrollments: u64,
    #[serde(default)]
    total_assignments: u64,
}

impl From<StatsDto> for DashboardStats {
    fn from(dto: StatsDto) -> Self {
        DashboardStats {
            total_courses: dto.total_courses,
            total_students: dto.total_students,
            total_enrollments: dto.total_enrollments,
            total_assignments: dto.total_assignments,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionRecordDto {
    assignment_id: MaterialId,
    #[serde(default)]
    assignment_title: String,
    course_id: CourseId,
    #[serde(default = "default_max_score")]
    max_score: u32,
    submission: SubmissionDto,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmissionsEnvelope {
    submissions: Vec<SubmissionRecordDto>,
}

impl SubmissionsEnvelope {
    pub(crate) fn into_records(self) -> Result<Vec<SubmissionRecord>, course_core::Error> {
        self.submissions
            .into_iter()
            .map(|dto| {
                Ok(SubmissionRecord {
                    assignment_id: dto.assignment_id,
                    assignment_title: dto.assignment_title,
                    course_id: dto.course_id,
                    max_score: dto.max_score,
                    submission: dto.submission.try_into()?,
                })
            })
            .collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GradeBody<'a> {
    pub(crate) student_id: &'a UserId,
    pub(crate) score: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) feedback: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignmentEnvelope {
    assignment: AssignmentDto,
}

impl TryFrom<AssignmentEnvelope> for Assignment {
    type Error = course_core::Error;

    fn try_from(envelope: AssignmentEnvelope) -> Result<Self, Self::Error> {
        envelope.assignment.try_into()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuizEnvelope {
    quiz: QuizDto,
}

impl TryFrom<QuizEnvelope> for Quiz {
    type Error = course_core::Error;

    fn try_from(envelope: QuizEnvelope) -> Result<Self, Self::Error> {
        envelope.quiz.try_into()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AssignmentBody<'a> {
    course_id: &'a CourseId,
    lesson_id: &'a LessonId,
    title: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    due_date: Option<DateTime<Utc>>,
    max_score: u32,
}

impl<'a> AssignmentBody<'a> {
    pub(crate) fn new(assignment: &'a ValidatedAssignment) -> Self {
        Self {
            course_id: &assignment.course_id,
            lesson_id: &assignment.lesson_id,
            title: &assignment.title,
            description: &assignment.description,
            due_date: assignment.due_date,
            max_score: assignment.max_score,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QuestionBody<'a> {
    question: &'a str,
    options: &'a [String],
    correct_answer: usize,
}

/// Questions go out in the same shape lesson materials come back in.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewQuizBody<'a> {
    course_id: &'a CourseId,
    lesson_id: &'a LessonId,
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    passing_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_limit: Option<u32>,
    questions: Vec<QuestionBody<'a>>,
}

impl<'a> NewQuizBody<'a> {
    pub(crate) fn new(quiz: &'a ValidatedQuiz) -> Self {
        Self {
            course_id: &quiz.course_id,
            lesson_id: &quiz.lesson_id,
            title: &quiz.title,
            description: quiz.description.as_deref(),
            passing_score: quiz.passing_score,
            time_limit: quiz.time_limit_minutes,
            questions: quiz
                .questions
                .iter()
                .map(|q| QuestionBody {
                    question: q.prompt(),
                    options: q.options(),
                    correct_answer: q.correct_option(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DayDto {
    date: String,
    #[serde(default)]
    count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyticsSummaryDto {
    #[serde(default)]
    total_enrollments: Option<u64>,
    #[serde(default)]
    average_per_day: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyticsDto {
    #[serde(default)]
    data: Vec<DayDto>,
    #[serde(default)]
    summary: Option<AnalyticsSummaryDto>,
}

/// Days arrive as plain dates or as midnight timestamps.
fn parse_day(raw: &str) -> Result<NaiveDate, serde_json::Error> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|ts| ts.with_timezone(&Utc).date_naive())
        })
        .ok_or_else(|| serde_json::Error::custom(format!("invalid analytics date {raw:?}")))
}

impl TryFrom<AnalyticsDto> for EnrollmentAnalytics {
    type Error = ApiError;

    fn try_from(dto: AnalyticsDto) -> Result<Self, Self::Error> {
        let days = dto
            .data
            .into_iter()
            .map(|d| {
                Ok(DailyEnrollments {
                    date: parse_day(&d.date)?,
                    count: d.count,
                })
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        let mut analytics = EnrollmentAnalytics::from_days(days);
        // The backend may count enrollments outside the returned days.
        if let Some(summary) = dto.summary {
            if let Some(total) = summary.total_enrollments {
                analytics.total_enrollments = total;
            }
            if let Some(average) = summary.average_per_day.filter(|a| a.is_finite()) {
                analytics.average_per_day = average;
            }
        }
        Ok(analytics)
    }
}
