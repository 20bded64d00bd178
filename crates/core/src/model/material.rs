use chrono::{DateTime, Utc};
use thiserror::Error;
use url::Url;

use crate::model::ids::{CourseId, LessonId, MaterialId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MaterialError {
    #[error("unrecognized material kind: {0}")]
    UnknownKind(String),

    #[error("material title cannot be empty")]
    EmptyTitle,

    #[error("assignment max score must be > 0")]
    InvalidMaxScore,

    #[error("a submission needs text or a link")]
    EmptySubmission,

    #[error("submission link is not a valid url: {0}")]
    InvalidLink(String),

    #[error("question {index} needs at least two options and a valid correct answer")]
    InvalidQuestion { index: usize },

    #[error("quiz must contain at least one question")]
    NoQuestions,

    #[error("passing score must be between 0 and 100, got {0}")]
    InvalidPassingScore(u32),

    #[error("expected {expected} answers, got {got}")]
    AnswerCountMismatch { expected: usize, got: usize },

    #[error("question {question} has no option {option}")]
    AnswerOutOfRange { question: usize, option: usize },

    #[error("score {score} is outside 0..={max}")]
    InvalidScore { score: u32, max: u32 },
}

//
// ─── MATERIAL ──────────────────────────────────────────────────────────────────
//

/// Work attached to a lesson. Every material is exactly one of these kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Material {
    Assignment(Assignment),
    Quiz(Quiz),
}

impl Material {
    #[must_use]
    pub fn id(&self) -> &MaterialId {
        match self {
            Material::Assignment(a) => &a.id,
            Material::Quiz(q) => &q.id,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Material::Assignment(a) => &a.title,
            Material::Quiz(q) => &q.title,
        }
    }

    #[must_use]
    pub fn kind(&self) -> MaterialKind {
        match self {
            Material::Assignment(_) => MaterialKind::Assignment,
            Material::Quiz(_) => MaterialKind::Quiz,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MaterialKind {
    Assignment,
    Quiz,
}

impl MaterialKind {
    /// Parse the wire discriminator.
    ///
    /// # Errors
    ///
    /// Returns `MaterialError::UnknownKind` for anything but `assignment` / `quiz`.
    pub fn parse(raw: &str) -> Result<Self, MaterialError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "assignment" => Ok(MaterialKind::Assignment),
            "quiz" => Ok(MaterialKind::Quiz),
            other => Err(MaterialError::UnknownKind(other.to_owned())),
        }
    }
}

/// Materials of one lesson, split by kind as the backend delivers them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LessonMaterials {
    pub assignments: Vec<Assignment>,
    pub quizzes: Vec<Quiz>,
}

impl LessonMaterials {
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len() + self.quizzes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All materials, assignments first.
    #[must_use]
    pub fn into_materials(self) -> Vec<Material> {
        self.assignments
            .into_iter()
            .map(Material::Assignment)
            .chain(self.quizzes.into_iter().map(Material::Quiz))
            .collect()
    }
}

impl FromIterator<Material> for LessonMaterials {
    fn from_iter<I: IntoIterator<Item = Material>>(iter: I) -> Self {
        let mut out = LessonMaterials::default();
        for material in iter {
            match material {
                Material::Assignment(a) => out.assignments.push(a),
                Material::Quiz(q) => out.quizzes.push(q),
            }
        }
        out
    }
}

//
// ─── ASSIGNMENT ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub id: MaterialId,
    pub course_id: CourseId,
    pub lesson_id: Option<LessonId>,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub max_score: u32,
    /// The signed-in student's own submission, if any.
    pub submission: Option<AssignmentSubmission>,
}

impl Assignment {
    #[must_use]
    pub fn status(&self) -> SubmissionStatus {
        match &self.submission {
            None => SubmissionStatus::NotSubmitted,
            Some(AssignmentSubmission {
                grade: Some(score), ..
            }) => SubmissionStatus::Graded {
                score: *score,
                max: self.max_score,
            },
            Some(_) => SubmissionStatus::PendingReview,
        }
    }

    #[must_use]
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.submission.is_none() && self.due_date.is_some_and(|due| now > due)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentSubmission {
    pub student_id: UserId,
    pub text: Option<String>,
    pub link: Option<Url>,
    pub submitted_at: DateTime<Utc>,
    pub grade: Option<u32>,
    pub feedback: Option<String>,
}

impl AssignmentSubmission {
    #[must_use]
    pub fn is_graded(&self) -> bool {
        self.grade.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    NotSubmitted,
    PendingReview,
    Graded { score: u32, max: u32 },
}

/// One submission as listed for review, with the assignment it answers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub assignment_id: MaterialId,
    pub assignment_title: String,
    pub course_id: CourseId,
    pub max_score: u32,
    pub submission: AssignmentSubmission,
}

impl SubmissionRecord {
    #[must_use]
    pub fn status(&self) -> SubmissionStatus {
        match self.submission.grade {
            Some(score) => SubmissionStatus::Graded {
                score,
                max: self.max_score,
            },
            None => SubmissionStatus::PendingReview,
        }
    }
}

/// A student's answer to an assignment, before it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionDraft {
    pub assignment_id: MaterialId,
    pub text: Option<String>,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub assignment_id: MaterialId,
    pub text: Option<String>,
    pub link: Option<Url>,
}

impl SubmissionDraft {
    /// # Errors
    ///
    /// Returns `MaterialError` if both text and link are blank, or the link
    /// does not parse as a url.
    pub fn validate(self) -> Result<ValidatedSubmission, MaterialError> {
        let text = self
            .text
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty());
        let link = match self.link.as_deref().map(str::trim).filter(|l| !l.is_empty()) {
            Some(raw) => Some(Url::parse(raw).map_err(|_| MaterialError::InvalidLink(raw.to_owned()))?),
            None => None,
        };
        if text.is_none() && link.is_none() {
            return Err(MaterialError::EmptySubmission);
        }
        Ok(ValidatedSubmission {
            assignment_id: self.assignment_id,
            text,
            link,
        })
    }
}

/// An admin's grade for one student's submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    pub assignment_id: MaterialId,
    pub student_id: UserId,
    pub score: u32,
    pub feedback: Option<String>,
}

impl Grade {
    /// # Errors
    ///
    /// Returns `MaterialError::InvalidScore` if the score exceeds `max_score`.
    pub fn new(
        assignment_id: MaterialId,
        student_id: UserId,
        score: u32,
        max_score: u32,
        feedback: Option<String>,
    ) -> Result<Self, MaterialError> {
        if score > max_score {
            return Err(MaterialError::InvalidScore {
                score,
                max: max_score,
            });
        }
        Ok(Self {
            assignment_id,
            student_id,
            score,
            feedback: feedback
                .map(|f| f.trim().to_owned())
                .filter(|f| !f.is_empty()),
        })
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    prompt: String,
    options: Vec<String>,
    correct_option: usize,
}

impl QuizQuestion {
    /// `index` is only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns `MaterialError::InvalidQuestion` for fewer than two options or a
    /// correct answer outside the option list.
    pub fn new(
        index: usize,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_option: usize,
    ) -> Result<Self, MaterialError> {
        if options.len() < 2 || correct_option >= options.len() {
            return Err(MaterialError::InvalidQuestion { index });
        }
        Ok(Self {
            prompt: prompt.into(),
            options,
            correct_option,
        })
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_option(&self) -> usize {
        self.correct_option
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    pub id: MaterialId,
    pub course_id: CourseId,
    pub lesson_id: Option<LessonId>,
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<QuizQuestion>,
    /// Percentage needed to pass.
    pub passing_score: u8,
    pub time_limit_minutes: Option<u32>,
    pub attempts: Vec<QuizAttempt>,
}

impl Quiz {
    /// Convert a raw passing score, rejecting values above 100.
    ///
    /// # Errors
    ///
    /// Returns `MaterialError::InvalidPassingScore`.
    pub fn passing_score_from(raw: u32) -> Result<u8, MaterialError> {
        u8::try_from(raw)
            .ok()
            .filter(|score| *score <= 100)
            .ok_or(MaterialError::InvalidPassingScore(raw))
    }

    #[must_use]
    pub fn best_attempt(&self) -> Option<&QuizAttempt> {
        self.attempts
            .iter()
            .filter(|a| a.score.is_some())
            .max_by_key(|a| a.score)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAttempt {
    pub student_id: UserId,
    /// One entry per question; `None` when the question was skipped.
    pub answers: Vec<Option<usize>>,
    /// Percentage, once the backend has scored the attempt.
    pub score: Option<u8>,
    pub attempted_at: DateTime<Utc>,
    pub time_taken_secs: Option<u32>,
}

impl QuizAttempt {
    #[must_use]
    pub fn is_graded(&self) -> bool {
        self.score.is_some()
    }

    #[must_use]
    pub fn passed(&self, passing_score: u8) -> bool {
        self.score.is_some_and(|score| score >= passing_score)
    }
}

/// Answers ready to be submitted for a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizAnswers {
    pub quiz_id: MaterialId,
    pub answers: Vec<Option<usize>>,
    pub time_taken_secs: u32,
}

impl QuizAnswers {
    /// # Errors
    ///
    /// Returns `MaterialError` if the answer count differs from the question
    /// count or an answer names an option the question does not have.
    pub fn for_quiz(
        quiz: &Quiz,
        answers: Vec<Option<usize>>,
        time_taken_secs: u32,
    ) -> Result<Self, MaterialError> {
        if answers.len() != quiz.questions.len() {
            return Err(MaterialError::AnswerCountMismatch {
                expected: quiz.questions.len(),
                got: answers.len(),
            });
        }
        for (question, (answer, q)) in answers.iter().zip(&quiz.questions).enumerate() {
            if let Some(option) = answer.filter(|option| *option >= q.options().len()) {
                return Err(MaterialError::AnswerOutOfRange { question, option });
            }
        }
        Ok(Self {
            quiz_id: quiz.id.clone(),
            answers,
            time_taken_secs,
        })
    }
}

/// Outcome the backend reports after scoring a quiz submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizResult {
    pub attempt: QuizAttempt,
    pub passed: bool,
    pub passing_score: u8,
}

//
// ─── AUTHORING ─────────────────────────────────────────────────────────────────
//

/// A new assignment for a lesson, as filled in by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentDraft {
    pub course_id: CourseId,
    pub lesson_id: LessonId,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub max_score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAssignment {
    pub course_id: CourseId,
    pub lesson_id: LessonId,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub max_score: u32,
}

impl AssignmentDraft {
    /// # Errors
    ///
    /// Returns `MaterialError` for a blank title or a zero max score.
    pub fn validate(self) -> Result<ValidatedAssignment, MaterialError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(MaterialError::EmptyTitle);
        }
        if self.max_score == 0 {
            return Err(MaterialError::InvalidMaxScore);
        }
        Ok(ValidatedAssignment {
            course_id: self.course_id,
            lesson_id: self.lesson_id,
            title,
            description: self.description.trim().to_owned(),
            due_date: self.due_date,
            max_score: self.max_score,
        })
    }
}

/// One question of a [`QuizDraft`]. `correct_option` is zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_option: usize,
}

/// A new quiz for a lesson, as filled in by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizDraft {
    pub course_id: CourseId,
    pub lesson_id: LessonId,
    pub title: String,
    pub description: Option<String>,
    pub passing_score: u32,
    pub time_limit_minutes: Option<u32>,
    pub questions: Vec<QuestionDraft>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedQuiz {
    pub course_id: CourseId,
    pub lesson_id: LessonId,
    pub title: String,
    pub description: Option<String>,
    pub passing_score: u8,
    pub time_limit_minutes: Option<u32>,
    pub questions: Vec<QuizQuestion>,
}

impl QuizDraft {
    /// Blank prompts and blank options make a question invalid.
    ///
    /// # Errors
    ///
    /// Returns `MaterialError` for a blank title, no questions, an invalid
    /// question, or a passing score above 100.
    pub fn validate(self) -> Result<ValidatedQuiz, MaterialError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(MaterialError::EmptyTitle);
        }
        if self.questions.is_empty() {
            return Err(MaterialError::NoQuestions);
        }
        let passing_score = Quiz::passing_score_from(self.passing_score)?;
        let questions = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(index, q)| {
                let prompt = q.prompt.trim().to_owned();
                let options: Vec<String> = q.options.iter().map(|o| o.trim().to_owned()).collect();
                if prompt.is_empty() || options.iter().any(String::is_empty) {
                    return Err(MaterialError::InvalidQuestion { index });
                }
                QuizQuestion::new(index, prompt, options, q.correct_option)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ValidatedQuiz {
            course_id: self.course_id,
            lesson_id: self.lesson_id,
            title,
            description: self
                .description
                .map(|d| d.trim().to_owned())
                .filter(|d| !d.is_empty()),
            passing_score,
            time_limit_minutes: self.time_limit_minutes.filter(|m| *m > 0),
            questions,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn mid(id: &str) -> MaterialId {
        MaterialId::new(id).unwrap()
    }

    fn assignment(submission: Option<AssignmentSubmission>) -> Assignment {
        Assignment {
            id: mid("a1"),
            course_id: CourseId::new("c1").unwrap(),
            lesson_id: Some(LessonId::new("l1").unwrap()),
            title: "Write a parser".into(),
            description: String::new(),
            due_date: Some(fixed_now()),
            max_score: 100,
            submission,
        }
    }

    fn submission(grade: Option<u32>) -> AssignmentSubmission {
        AssignmentSubmission {
            student_id: UserId::new("s1").unwrap(),
            text: Some("done".into()),
            link: None,
            submitted_at: fixed_now(),
            grade,
            feedback: None,
        }
    }

    fn quiz() -> Quiz {
        Quiz {
            id: mid("q1"),
            course_id: CourseId::new("c1").unwrap(),
            lesson_id: None,
            title: "Borrowing".into(),
            description: None,
            questions: vec![
                QuizQuestion::new(0, "Q1", vec!["a".into(), "b".into()], 1).unwrap(),
                QuizQuestion::new(1, "Q2", vec!["a".into(), "b".into(), "c".into()], 0).unwrap(),
            ],
            passing_score: 60,
            time_limit_minutes: Some(10),
            attempts: Vec::new(),
        }
    }

    #[test]
    fn kind_parsing_rejects_unknown_shapes() {
        assert_eq!(MaterialKind::parse("Quiz").unwrap(), MaterialKind::Quiz);
        assert_eq!(
            MaterialKind::parse("video").unwrap_err(),
            MaterialError::UnknownKind("video".into())
        );
    }

    #[test]
    fn assignment_status_follows_submission_and_grade() {
        assert_eq!(assignment(None).status(), SubmissionStatus::NotSubmitted);
        assert_eq!(
            assignment(Some(submission(None))).status(),
            SubmissionStatus::PendingReview
        );
        assert_eq!(
            assignment(Some(submission(Some(80)))).status(),
            SubmissionStatus::Graded { score: 80, max: 100 }
        );
        assert!(submission(Some(0)).is_graded());
    }

    #[test]
    fn overdue_only_without_submission() {
        let later = fixed_now() + Duration::hours(1);
        assert!(assignment(None).is_overdue(later));
        assert!(!assignment(Some(submission(None))).is_overdue(later));
        assert!(!assignment(None).is_overdue(fixed_now()));
    }

    #[test]
    fn submission_needs_text_or_link() {
        let draft = SubmissionDraft {
            assignment_id: mid("a1"),
            text: Some("   ".into()),
            link: None,
        };
        assert_eq!(draft.validate().unwrap_err(), MaterialError::EmptySubmission);

        let draft = SubmissionDraft {
            assignment_id: mid("a1"),
            text: None,
            link: Some("github.com/me/repo".into()),
        };
        assert!(matches!(
            draft.validate().unwrap_err(),
            MaterialError::InvalidLink(_)
        ));

        let ok = SubmissionDraft {
            assignment_id: mid("a1"),
            text: None,
            link: Some("https://github.com/me/repo".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.link.unwrap().host_str(), Some("github.com"));
    }

    #[test]
    fn grade_is_bounded_by_max_score() {
        let err = Grade::new(mid("a1"), UserId::new("s1").unwrap(), 101, 100, None).unwrap_err();
        assert_eq!(err, MaterialError::InvalidScore { score: 101, max: 100 });
        let grade = Grade::new(mid("a1"), UserId::new("s1").unwrap(), 90, 100, Some(" ".into()))
            .unwrap();
        assert_eq!(grade.feedback, None);
    }

    #[test]
    fn question_requires_valid_correct_option() {
        assert_eq!(
            QuizQuestion::new(3, "Q", vec!["only".into()], 0).unwrap_err(),
            MaterialError::InvalidQuestion { index: 3 }
        );
        assert!(QuizQuestion::new(0, "Q", vec!["a".into(), "b".into()], 2).is_err());
    }

    #[test]
    fn answers_must_match_questions() {
        let quiz = quiz();
        assert_eq!(
            QuizAnswers::for_quiz(&quiz, vec![Some(0)], 30).unwrap_err(),
            MaterialError::AnswerCountMismatch {
                expected: 2,
                got: 1
            }
        );
        assert_eq!(
            QuizAnswers::for_quiz(&quiz, vec![Some(0), Some(3)], 30).unwrap_err(),
            MaterialError::AnswerOutOfRange {
                question: 1,
                option: 3
            }
        );
        let ok = QuizAnswers::for_quiz(&quiz, vec![None, Some(2)], 30).unwrap();
        assert_eq!(ok.answers, vec![None, Some(2)]);
    }

    #[test]
    fn attempt_pass_and_best() {
        let mut quiz = quiz();
        let attempt = |score| QuizAttempt {
            student_id: UserId::new("s1").unwrap(),
            answers: vec![Some(1), Some(0)],
            score,
            attempted_at: fixed_now(),
            time_taken_secs: None,
        };
        quiz.attempts = vec![attempt(Some(40)), attempt(None), attempt(Some(75))];
        let best = quiz.best_attempt().unwrap();
        assert_eq!(best.score, Some(75));
        assert!(best.passed(quiz.passing_score));
        assert!(!attempt(None).passed(0));
    }

    #[test]
    fn passing_score_range() {
        assert_eq!(Quiz::passing_score_from(70).unwrap(), 70);
        assert_eq!(
            Quiz::passing_score_from(150).unwrap_err(),
            MaterialError::InvalidPassingScore(150)
        );
    }

    #[test]
    fn lesson_materials_collects_by_kind() {
        let materials: LessonMaterials = vec![
            Material::Quiz(quiz()),
            Material::Assignment(assignment(None)),
        ]
        .into_iter()
        .collect();
        assert_eq!(materials.assignments.len(), 1);
        assert_eq!(materials.quizzes.len(), 1);
        let kinds: Vec<_> = materials
            .into_materials()
            .iter()
            .map(Material::kind)
            .collect();
        assert_eq!(kinds, vec![MaterialKind::Assignment, MaterialKind::Quiz]);
    }

    fn quiz_draft(questions: Vec<QuestionDraft>) -> QuizDraft {
        QuizDraft {
            course_id: CourseId::new("c1").unwrap(),
            lesson_id: LessonId::new("l1").unwrap(),
            title: " Ownership check ".into(),
            description: Some("  ".into()),
            passing_score: 70,
            time_limit_minutes: Some(0),
            questions,
        }
    }

    fn question(options: &[&str], correct: usize) -> QuestionDraft {
        QuestionDraft {
            prompt: "Who owns the value?".into(),
            options: options.iter().map(|o| (*o).to_owned()).collect(),
            correct_option: correct,
        }
    }

    #[test]
    fn assignment_draft_needs_title_and_score() {
        let draft = AssignmentDraft {
            course_id: CourseId::new("c1").unwrap(),
            lesson_id: LessonId::new("l1").unwrap(),
            title: "  Build a CLI ".into(),
            description: " Use clap ".into(),
            due_date: None,
            max_score: 0,
        };
        assert_eq!(
            draft.clone().validate().unwrap_err(),
            MaterialError::InvalidMaxScore
        );
        let blank = AssignmentDraft {
            title: "   ".into(),
            max_score: 10,
            ..draft.clone()
        };
        assert_eq!(blank.validate().unwrap_err(), MaterialError::EmptyTitle);

        let ok = AssignmentDraft {
            max_score: 10,
            ..draft
        }
        .validate()
        .unwrap();
        assert_eq!(ok.title, "Build a CLI");
        assert_eq!(ok.description, "Use clap");
    }

    #[test]
    fn quiz_draft_validates_every_question() {
        assert_eq!(
            quiz_draft(Vec::new()).validate().unwrap_err(),
            MaterialError::NoQuestions
        );
        assert_eq!(
            quiz_draft(vec![question(&["a", "b"], 0), question(&["a", " "], 0)])
                .validate()
                .unwrap_err(),
            MaterialError::InvalidQuestion { index: 1 }
        );
        assert_eq!(
            quiz_draft(vec![question(&["a", "b"], 2)]).validate().unwrap_err(),
            MaterialError::InvalidQuestion { index: 0 }
        );

        let mut too_strict = quiz_draft(vec![question(&["a", "b"], 1)]);
        too_strict.passing_score = 101;
        assert_eq!(
            too_strict.validate().unwrap_err(),
            MaterialError::InvalidPassingScore(101)
        );

        let ok = quiz_draft(vec![question(&[" a ", "b", "c"], 1)])
            .validate()
            .unwrap();
        assert_eq!(ok.title, "Ownership check");
        assert_eq!(ok.description, None);
        assert_eq!(ok.time_limit_minutes, None);
        assert_eq!(ok.questions[0].options()[0], "a");
        assert_eq!(ok.passing_score, 70);
    }
}
