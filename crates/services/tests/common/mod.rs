#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;
use course_core::model::{
    Assignment, AssignmentSubmission, Batch, BatchId, Course, CourseDraft, CourseFilters,
    CourseId, CourseMeta, CourseRef, Credentials, DailyEnrollments, DashboardStats, Enrollment,
    EnrollmentAnalytics, EnrollmentId, EnrollmentRequest, EnrollmentStatus, Grade, Lesson,
    LessonId, LessonMaterials, MaterialId, Page, PageMeta, Progress, Quiz, QuizAnswers,
    QuizAttempt, QuizResult, RegistrationDraft, Role, SubmissionRecord, User, UserId,
    ValidatedAssignment, ValidatedCourse, ValidatedQuiz, ValidatedSubmission,
};
use course_core::time::{fixed_clock, fixed_now};
use services::{AdminApi, ApiError, AppServices, AuthApi, AuthGrant, CourseApi, StudentApi};
use storage::repository::{InMemoryRepository, Storage};

pub const STUDENT_TOKEN: &str = "student-token";
pub const ADMIN_TOKEN: &str = "admin-token";

pub fn student() -> User {
    User::new(UserId::new("s1").unwrap(), "Sam", "sam@example.com", Role::Student)
}

pub fn admin() -> User {
    User::new(UserId::new("a1").unwrap(), "Ada", "ada@example.com", Role::Admin)
}

pub fn lesson_id(id: &str) -> LessonId {
    LessonId::new(id).unwrap()
}

/// Four ten-minute lessons, one open batch and one full batch.
pub fn course(id: &str) -> Course {
    let now = fixed_now();
    let syllabus = (1..=4)
        .map(|n| {
            Lesson::new(lesson_id(&format!("l{n}")), format!("Lesson {n}"), 10, None, None)
                .unwrap()
        })
        .collect();
    let batches = vec![
        Batch::new(
            BatchId::new("open").unwrap(),
            now + ChronoDuration::days(1),
            now + ChronoDuration::days(60),
            20,
            Some(3),
        )
        .unwrap(),
        Batch::new(
            BatchId::new("full").unwrap(),
            now + ChronoDuration::days(1),
            now + ChronoDuration::days(60),
            2,
            Some(2),
        )
        .unwrap(),
    ];
    CourseDraft {
        title: format!("Course {id}"),
        description: "A course".into(),
        instructor: Some("Ferris".into()),
        price: 10.0,
        category: "programming".into(),
        tags: vec!["rust".into()],
        syllabus,
        batches,
    }
    .validate()
    .unwrap()
    .assign_id(CourseId::new(id).unwrap(), CourseMeta::default())
}

/// In-memory stand-in for the REST backend.
#[derive(Default)]
pub struct FakeBackend {
    pub courses: Mutex<HashMap<String, Course>>,
    pub enrollments: Mutex<Vec<Enrollment>>,
    pub materials: Mutex<HashMap<(String, String), LessonMaterials>>,
    pub submissions: Mutex<Vec<SubmissionRecord>>,
    pub stats: Mutex<Option<DashboardStats>>,
    /// Lesson ids the backend wrongly reports as complete on progress updates.
    pub phantom_completed: Mutex<Vec<LessonId>>,
    /// Progress updates are stored but answered with the record from before.
    pub lagging_progress: Mutex<bool>,
    /// Delays applied to successive `enrolled_courses` calls.
    pub enrollment_delays: Mutex<Vec<Duration>>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn with_course(course: Course) -> Self {
        let backend = Self::default();
        backend
            .courses
            .lock()
            .unwrap()
            .insert(course.id().to_string(), course);
        backend
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }

    fn user_for(&self, token: &str) -> Result<User, ApiError> {
        match token {
            STUDENT_TOKEN => Ok(student()),
            ADMIN_TOKEN => Ok(admin()),
            _ => Err(ApiError::from_status(401, "/auth/me", Some("invalid token".into()))),
        }
    }

    fn lesson_entry(&self, course: &CourseId, lesson: &LessonId) -> LessonMaterials {
        self.materials
            .lock()
            .unwrap()
            .get(&(course.to_string(), lesson.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    fn course(&self, id: &CourseId) -> Result<Course, ApiError> {
        self.courses
            .lock()
            .unwrap()
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| ApiError::from_status(404, &format!("/api/courses/{id}"), None))
    }
}

#[async_trait]
impl AuthApi for FakeBackend {
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, ApiError> {
        self.record("login");
        let (token, user) = match credentials.email.as_str() {
            "sam@example.com" => (STUDENT_TOKEN, student()),
            "ada@example.com" => (ADMIN_TOKEN, admin()),
            _ => return Err(ApiError::from_status(401, "/auth/login", None)),
        };
        Ok(AuthGrant {
            token: token.into(),
            user,
        })
    }

    async fn register(&self, draft: &RegistrationDraft) -> Result<AuthGrant, ApiError> {
        self.record("register");
        Ok(AuthGrant {
            token: STUDENT_TOKEN.into(),
            user: User::new(UserId::new("s2").unwrap(), &draft.name, &draft.email, draft.role),
        })
    }

    async fn logout(&self, _token: &str) -> Result<(), ApiError> {
        self.record("logout");
        Ok(())
    }

    async fn current_user(&self, token: &str) -> Result<User, ApiError> {
        self.record("me");
        self.user_for(token)
    }
}

#[async_trait]
impl CourseApi for FakeBackend {
    async fn list_courses(&self, filters: &CourseFilters) -> Result<Page<Course>, ApiError> {
        self.record("list_courses");
        let mut items: Vec<Course> = self.courses.lock().unwrap().values().cloned().collect();
        if let Some(search) = &filters.search {
            items.retain(|c| c.title().contains(search.as_str()));
        }
        items.sort_by(|a, b| a.id().cmp(b.id()));
        let total = items.len() as u64;
        Ok(Page {
            items,
            meta: PageMeta {
                total,
                page: 1,
                limit: 10,
                total_pages: 1,
            },
        })
    }

    async fn get_course(&self, id: &CourseId) -> Result<Course, ApiError> {
        self.record(format!("get_course {id}"));
        self.course(id)
    }

    async fn create_course(
        &self,
        token: &str,
        course: &ValidatedCourse,
    ) -> Result<Course, ApiError> {
        self.record("create_course");
        self.user_for(token)?;
        let created = course
            .clone()
            .assign_id(CourseId::new("new").unwrap(), CourseMeta::default());
        self.courses
            .lock()
            .unwrap()
            .insert("new".into(), created.clone());
        Ok(created)
    }

    async fn update_course(
        &self,
        token: &str,
        id: &CourseId,
        course: &ValidatedCourse,
    ) -> Result<Course, ApiError> {
        self.record("update_course");
        self.user_for(token)?;
        let existing = self.course(id)?;
        Ok(course.clone().assign_id(id.clone(), existing.meta()))
    }

    async fn delete_course(&self, token: &str, id: &CourseId) -> Result<(), ApiError> {
        self.record("delete_course");
        self.user_for(token)?;
        self.courses.lock().unwrap().remove(id.as_str());
        Ok(())
    }
}

#[async_trait]
impl StudentApi for FakeBackend {
    async fn enroll(
        &self,
        token: &str,
        request: &EnrollmentRequest,
    ) -> Result<Enrollment, ApiError> {
        self.record("enroll");
        let user = self.user_for(token)?;
        let course = self.course(&request.course_id)?;
        let enrollment = Enrollment {
            id: EnrollmentId::new(format!("e-{}", request.course_id)).unwrap(),
            course: CourseRef::Id(request.course_id.clone()),
            student_id: user.id,
            batch_id: request.batch_id.clone(),
            enrolled_at: fixed_now(),
            status: EnrollmentStatus::Active,
            progress: Some(Progress::start(&course)),
        };
        self.enrollments.lock().unwrap().push(enrollment.clone());
        Ok(enrollment)
    }

    async fn enrolled_courses(&self, token: &str) -> Result<Vec<Enrollment>, ApiError> {
        self.record("enrolled_courses");
        self.user_for(token)?;
        let delay = {
            let mut delays = self.enrollment_delays.lock().unwrap();
            if delays.is_empty() {
                None
            } else {
                Some(delays.remove(0))
            }
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.enrollments.lock().unwrap().clone())
    }

    async fn update_progress(
        &self,
        token: &str,
        course: &CourseId,
        lesson: &LessonId,
    ) -> Result<Progress, ApiError> {
        self.record(format!("update_progress {lesson}"));
        self.user_for(token)?;
        let full = self.course(course)?;
        let mut enrollments = self.enrollments.lock().unwrap();
        let enrollment = enrollments
            .iter_mut()
            .find(|e| e.course_id() == course)
            .ok_or_else(|| ApiError::from_status(404, "/api/progress", None))?;
        let previous = enrollment
            .progress
            .clone()
            .unwrap_or_else(|| Progress::start(&full));
        let completed = previous
            .completed_lesson_ids()
            .iter()
            .cloned()
            .chain(std::iter::once(lesson.clone()))
            .collect::<Vec<_>>();
        let stored = Progress::from_parts(
            course.clone(),
            completed.clone(),
            full.total_lessons(),
            Some(fixed_now()),
        );
        enrollment.progress = Some(stored);
        if *self.lagging_progress.lock().unwrap() {
            return Ok(previous);
        }
        let phantom = self.phantom_completed.lock().unwrap().clone();
        Ok(Progress::from_parts(
            course.clone(),
            completed.into_iter().chain(phantom),
            full.total_lessons() + 1,
            Some(fixed_now()),
        ))
    }

    async fn lesson_materials(
        &self,
        token: &str,
        course: &CourseId,
        lesson: &LessonId,
    ) -> Result<LessonMaterials, ApiError> {
        self.record(format!("lesson_materials {lesson}"));
        self.user_for(token)?;
        Ok(self.lesson_entry(course, lesson))
    }

    async fn submit_assignment(
        &self,
        token: &str,
        submission: &ValidatedSubmission,
    ) -> Result<AssignmentSubmission, ApiError> {
        self.record("submit_assignment");
        let user = self.user_for(token)?;
        Ok(AssignmentSubmission {
            student_id: user.id,
            text: submission.text.clone(),
            link: submission.link.clone(),
            submitted_at: fixed_now(),
            grade: None,
            feedback: None,
        })
    }

    async fn submit_quiz(
        &self,
        token: &str,
        answers: &QuizAnswers,
    ) -> Result<QuizResult, ApiError> {
        self.record("submit_quiz");
        let user = self.user_for(token)?;
        let answered = answers.answers.iter().filter(|a| a.is_some()).count();
        let total = answers.answers.len().max(1);
        let score = u8::try_from(answered * 100 / total).unwrap_or(100);
        Ok(QuizResult {
            attempt: QuizAttempt {
                student_id: user.id,
                answers: answers.answers.clone(),
                score: Some(score),
                attempted_at: fixed_now(),
                time_taken_secs: Some(answers.time_taken_secs),
            },
            passed: score >= 70,
            passing_score: 70,
        })
    }
}

#[async_trait]
impl AdminApi for FakeBackend {
    async fn dashboard_stats(&self, token: &str) -> Result<DashboardStats, ApiError> {
        self.record("dashboard_stats");
        self.user_for(token)?;
        self.stats
            .lock()
            .unwrap()
            .ok_or_else(|| ApiError::from_status(500, "/admin/stats", None))
    }

    async fn all_enrollments(&self, token: &str) -> Result<Vec<Enrollment>, ApiError> {
        self.record("all_enrollments");
        self.user_for(token)?;
        Ok(self.enrollments.lock().unwrap().clone())
    }

    async fn all_submissions(&self, token: &str) -> Result<Vec<SubmissionRecord>, ApiError> {
        self.record("all_submissions");
        self.user_for(token)?;
        Ok(self.submissions.lock().unwrap().clone())
    }

    async fn grade_submission(
        &self,
        token: &str,
        grade: &Grade,
    ) -> Result<AssignmentSubmission, ApiError> {
        self.record("grade_submission");
        self.user_for(token)?;
        let mut submissions = self.submissions.lock().unwrap();
        let record = submissions
            .iter_mut()
            .find(|r| r.assignment_id == grade.assignment_id)
            .ok_or_else(|| ApiError::from_status(404, "/api/admin/assignments", None))?;
        record.submission.grade = Some(grade.score);
        record.submission.feedback = grade.feedback.clone();
        Ok(record.submission.clone())
    }

    async fn all_lesson_materials(
        &self,
        token: &str,
        course: &CourseId,
        lesson: &LessonId,
    ) -> Result<LessonMaterials, ApiError> {
        self.record(format!("all_lesson_materials {lesson}"));
        self.user_for(token)?;
        Ok(self.lesson_entry(course, lesson))
    }

    async fn create_assignment(
        &self,
        token: &str,
        assignment: &ValidatedAssignment,
    ) -> Result<Assignment, ApiError> {
        self.record("create_assignment");
        self.user_for(token)?;
        let mut materials = self.materials.lock().unwrap();
        let entry = materials
            .entry((assignment.course_id.to_string(), assignment.lesson_id.to_string()))
            .or_default();
        let created = Assignment {
            id: MaterialId::new(format!("a{}", entry.assignments.len() + 1)).unwrap(),
            course_id: assignment.course_id.clone(),
            lesson_id: Some(assignment.lesson_id.clone()),
            title: assignment.title.clone(),
            description: assignment.description.clone(),
            due_date: assignment.due_date,
            max_score: assignment.max_score,
            submission: None,
        };
        entry.assignments.push(created.clone());
        Ok(created)
    }

    async fn create_quiz(&self, token: &str, quiz: &ValidatedQuiz) -> Result<Quiz, ApiError> {
        self.record("create_quiz");
        self.user_for(token)?;
        let mut materials = self.materials.lock().unwrap();
        let entry = materials
            .entry((quiz.course_id.to_string(), quiz.lesson_id.to_string()))
            .or_default();
        let created = Quiz {
            id: MaterialId::new(format!("q{}", entry.quizzes.len() + 1)).unwrap(),
            course_id: quiz.course_id.clone(),
            lesson_id: Some(quiz.lesson_id.clone()),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            questions: quiz.questions.clone(),
            passing_score: quiz.passing_score,
            time_limit_minutes: quiz.time_limit_minutes,
            attempts: Vec::new(),
        };
        entry.quizzes.push(created.clone());
        Ok(created)
    }

    /// Daily counts derived from the stored enrollments.
    async fn enrollment_analytics(&self, token: &str) -> Result<EnrollmentAnalytics, ApiError> {
        self.record("enrollment_analytics");
        self.user_for(token)?;
        let mut per_day: HashMap<_, u64> = HashMap::new();
        for enrollment in self.enrollments.lock().unwrap().iter() {
            *per_day.entry(enrollment.enrolled_at.date_naive()).or_default() += 1;
        }
        Ok(EnrollmentAnalytics::from_days(
            per_day
                .into_iter()
                .map(|(date, count)| DailyEnrollments { date, count })
                .collect(),
        ))
    }
}

pub struct Harness {
    pub backend: Arc<FakeBackend>,
    pub credentials: InMemoryRepository,
    pub services: AppServices,
}

pub fn harness(backend: FakeBackend) -> Harness {
    let backend = Arc::new(backend);
    let credentials = InMemoryRepository::new();
    let storage = Storage {
        credentials: Arc::new(credentials.clone()),
    };
    let services = AppServices::with_backend(&storage, Arc::clone(&backend), fixed_clock());
    Harness {
        backend,
        credentials,
        services,
    }
}
