use std::sync::Arc;

use course_core::model::{
    AssignmentSubmission, BatchId, Course, CourseId, Enrollment, EnrollmentRequest, Lesson,
    LessonId, LessonMaterials, Progress, ProgressError, Quiz, QuizAnswers, QuizResult, Role,
    SubmissionDraft, find_for_course,
};
use course_core::tracker::{self, LessonRow, MaterialAccess, ProgressSummary};

use crate::Clock;
use crate::api::{CourseApi, StudentApi};
use crate::auth_session::AuthSession;
use crate::error::ServiceError;
use crate::sequencer::LatestOnly;

//
// ─── VIEWS ─────────────────────────────────────────────────────────────────────
//

/// Everything the lesson player needs for one enrolled course.
///
/// Derived figures are computed on access from `course` and `progress`.
#[derive(Debug, Clone, PartialEq)]
pub struct Classroom {
    pub course: Course,
    pub enrollment: Enrollment,
    pub progress: Progress,
    pub current: Option<LessonId>,
}

impl Classroom {
    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary::from_course(&self.course, self.progress.completed_lesson_ids())
    }

    #[must_use]
    pub fn overview(&self) -> Vec<LessonRow> {
        tracker::syllabus_overview(
            self.course.syllabus(),
            self.progress.completed_lesson_ids(),
            self.current.as_ref().map(LessonId::as_str),
        )
    }

    #[must_use]
    pub fn current_lesson(&self) -> Option<&Lesson> {
        self.current
            .as_ref()
            .and_then(|id| self.course.lesson(id.as_str()))
    }

    #[must_use]
    pub fn next_lesson(&self) -> Option<&Lesson> {
        let current = self.current.as_ref()?;
        tracker::next_lesson(self.course.syllabus(), current.as_str())
    }

    #[must_use]
    pub fn previous_lesson(&self) -> Option<&Lesson> {
        let current = self.current.as_ref()?;
        tracker::previous_lesson(self.course.syllabus(), current.as_str())
    }

    #[must_use]
    pub fn is_unlocked(&self, lesson: &Lesson) -> bool {
        tracker::is_lesson_unlocked(lesson, self.progress.completed_lesson_ids())
    }
}

/// Materials of one lesson together with whether the student may open them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonView {
    pub lesson_id: LessonId,
    pub access: MaterialAccess,
    materials: LessonMaterials,
}

impl LessonView {
    /// The materials, once the lesson is complete.
    #[must_use]
    pub fn visible_materials(&self) -> Option<&LessonMaterials> {
        match self.access {
            MaterialAccess::Unlocked => Some(&self.materials),
            MaterialAccess::Locked { .. } | MaterialAccess::Empty => None,
        }
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Student-side enrollment, progress and coursework.
#[derive(Clone)]
pub struct LearningService {
    session: AuthSession,
    courses: Arc<dyn CourseApi>,
    student: Arc<dyn StudentApi>,
    clock: Clock,
    classroom_fetches: LatestOnly,
    material_fetches: LatestOnly,
}

impl LearningService {
    #[must_use]
    pub fn new(
        session: AuthSession,
        courses: Arc<dyn CourseApi>,
        student: Arc<dyn StudentApi>,
        clock: Clock,
    ) -> Self {
        Self {
            session,
            courses,
            student,
            clock,
            classroom_fetches: LatestOnly::new(),
            material_fetches: LatestOnly::new(),
        }
    }

    /// Join a batch after checking it exists, has seats and has not ended.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Forbidden` for non-students and
    /// `ServiceError::Domain` when the batch cannot be joined.
    #[tracing::instrument(skip(self))]
    pub async fn enroll(
        &self,
        course_id: &CourseId,
        batch_id: &BatchId,
    ) -> Result<Enrollment, ServiceError> {
        let session = self.session.authorize(Some(Role::Student))?;
        let course = self.courses.get_course(course_id).await?;
        let request = EnrollmentRequest::for_batch(&course, batch_id, self.clock.now())?;
        let enrollment = self.student.enroll(session.token(), &request).await?;
        tracing::info!(course = %course_id, batch = %batch_id, "enrolled");
        Ok(enrollment)
    }

    /// # Errors
    ///
    /// Returns `ServiceError::NotSignedIn` or `ServiceError::Api`.
    #[tracing::instrument(skip(self))]
    pub async fn enrolled_courses(&self) -> Result<Vec<Enrollment>, ServiceError> {
        let session = self.session.authorize(None)?;
        Ok(self.student.enrolled_courses(session.token()).await?)
    }

    /// Record a lesson as completed and return the course progress.
    ///
    /// The lesson must be in the syllabus. The returned record is reconciled
    /// with the syllabus and always contains the lesson, even when the
    /// backend answers with a record that predates the update.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Domain` for a lesson outside the syllabus.
    #[tracing::instrument(skip(self))]
    pub async fn mark_lesson_complete(
        &self,
        course_id: &CourseId,
        lesson_id: &LessonId,
    ) -> Result<Progress, ServiceError> {
        let session = self.session.authorize(Some(Role::Student))?;
        let course = self.courses.get_course(course_id).await?;
        if !course.has_lesson(lesson_id.as_str()) {
            return Err(ProgressError::UnknownLesson(lesson_id.clone()).into());
        }
        let progress = self
            .student
            .update_progress(session.token(), course_id, lesson_id)
            .await?;
        let mut progress = reconcile(progress, &course)?;
        if progress.mark_complete(&course, lesson_id, self.clock.now())? {
            tracing::debug!(lesson = %lesson_id, "backend progress lagged, lesson added locally");
        }
        tracing::info!(
            course = %course_id,
            lesson = %lesson_id,
            percentage = progress.percentage(),
            "lesson completed"
        );
        Ok(progress)
    }

    /// Load the lesson player for an enrolled course.
    ///
    /// Without `lesson` the player opens at the first incomplete lesson.
    /// Returns `Ok(None)` when a newer classroom fetch was started meanwhile.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::NotEnrolled` if the student has no enrollment
    /// for the course.
    #[tracing::instrument(skip(self))]
    pub async fn classroom(
        &self,
        course_id: &CourseId,
        lesson: Option<&LessonId>,
    ) -> Result<Option<Classroom>, ServiceError> {
        let ticket = self.classroom_fetches.issue();
        let session = self.session.authorize(None)?;

        let course = self.courses.get_course(course_id).await?;
        let enrollments = self.student.enrolled_courses(session.token()).await?;
        let enrollment = find_for_course(&enrollments, course_id.as_str())
            .cloned()
            .ok_or_else(|| ServiceError::NotEnrolled(course_id.clone()))?;

        let progress = match enrollment.progress.clone() {
            Some(progress) => reconcile(progress, &course)?,
            None => Progress::start(&course),
        };

        let current = match lesson {
            Some(id) if course.has_lesson(id.as_str()) => Some(id.clone()),
            Some(id) => return Err(ProgressError::UnknownLesson(id.clone()).into()),
            None => tracker::first_incomplete_lesson(
                course.syllabus(),
                progress.completed_lesson_ids(),
            )
            .or_else(|| course.syllabus().first())
            .map(|l| l.id().clone()),
        };

        let classroom = Classroom {
            course,
            enrollment,
            progress,
            current,
        };
        Ok(self.classroom_fetches.accept(ticket, classroom))
    }

    /// Fetch the materials of a lesson and decide whether they are unlocked.
    ///
    /// Returns `Ok(None)` when a newer materials fetch was started meanwhile.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Domain` for a lesson outside the syllabus.
    #[tracing::instrument(skip(self, classroom), fields(course = %classroom.course.id()))]
    pub async fn lesson_materials(
        &self,
        classroom: &Classroom,
        lesson_id: &LessonId,
    ) -> Result<Option<LessonView>, ServiceError> {
        let ticket = self.material_fetches.issue();
        let session = self.session.authorize(None)?;
        let lesson = classroom
            .course
            .lesson(lesson_id.as_str())
            .ok_or_else(|| ProgressError::UnknownLesson(lesson_id.clone()))?;

        let materials = self
            .student
            .lesson_materials(session.token(), classroom.course.id(), lesson_id)
            .await?;
        let access = tracker::material_access(
            lesson,
            classroom.progress.completed_lesson_ids(),
            &materials,
        );
        let view = LessonView {
            lesson_id: lesson_id.clone(),
            access,
            materials,
        };
        Ok(self.material_fetches.accept(ticket, view))
    }

    /// # Errors
    ///
    /// Returns `ServiceError::Domain` for an empty submission or a bad link.
    #[tracing::instrument(skip(self, draft), fields(assignment = %draft.assignment_id))]
    pub async fn submit_assignment(
        &self,
        draft: SubmissionDraft,
    ) -> Result<AssignmentSubmission, ServiceError> {
        let session = self.session.authorize(Some(Role::Student))?;
        let submission = draft.validate()?;
        let stored = self
            .student
            .submit_assignment(session.token(), &submission)
            .await?;
        tracing::info!("assignment submitted");
        Ok(stored)
    }

    /// One answer per question is required; `None` skips a question.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Domain` if the answers do not fit the quiz.
    #[tracing::instrument(skip(self, quiz, answers), fields(quiz = %quiz.id))]
    pub async fn submit_quiz(
        &self,
        quiz: &Quiz,
        answers: Vec<Option<usize>>,
        time_taken_secs: u32,
    ) -> Result<QuizResult, ServiceError> {
        let session = self.session.authorize(Some(Role::Student))?;
        let answers = QuizAnswers::for_quiz(quiz, answers, time_taken_secs)?;
        let result = self.student.submit_quiz(session.token(), &answers).await?;
        tracing::info!(
            score = ?result.attempt.score,
            passed = result.passed,
            "quiz submitted"
        );
        Ok(result)
    }
}

fn reconcile(progress: Progress, course: &Course) -> Result<Progress, ServiceError> {
    let (progress, dropped) = progress.reconcile(course)?;
    if !dropped.is_empty() {
        tracing::warn!(
            course = %course.id(),
            dropped = ?dropped,
            "progress referenced lessons outside the syllabus"
        );
    }
    Ok(progress)
}
