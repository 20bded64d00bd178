use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;
use url::Url;

use crate::model::ids::{BatchId, CourseId, LessonId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course title cannot be empty")]
    EmptyTitle,

    #[error("course price must be a non-negative number")]
    InvalidPrice,

    #[error("lesson {0} has an empty title")]
    EmptyLessonTitle(LessonId),

    #[error("lesson {0} must last at least one minute")]
    InvalidLessonDuration(LessonId),

    #[error("lesson {lesson} has an invalid video url: {reason}")]
    InvalidVideoUrl { lesson: LessonId, reason: String },

    #[error("lesson {0} appears more than once in the syllabus")]
    DuplicateLesson(LessonId),

    #[error("batch {0} appears more than once")]
    DuplicateBatch(BatchId),

    #[error("batch {0} ends before it starts")]
    InvalidBatchDates(BatchId),

    #[error("batch {0} capacity must be > 0")]
    InvalidBatchCapacity(BatchId),

    #[error("batch {0} has more enrollments than seats")]
    BatchOverCapacity(BatchId),
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// One entry of a course syllabus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    duration_minutes: u32,
    video_url: Option<Url>,
    description: Option<String>,
}

impl Lesson {
    /// Creates a lesson.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` if the title is blank, the duration is zero, or the
    /// video url does not parse.
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        duration_minutes: u32,
        video_url: Option<&str>,
        description: Option<String>,
    ) -> Result<Self, CourseError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(CourseError::EmptyLessonTitle(id));
        }
        if duration_minutes == 0 {
            return Err(CourseError::InvalidLessonDuration(id));
        }
        let video_url = match video_url.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => Some(Url::parse(raw).map_err(|err| CourseError::InvalidVideoUrl {
                lesson: id.clone(),
                reason: err.to_string(),
            })?),
            None => None,
        };
        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            duration_minutes,
            video_url,
            description,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    #[must_use]
    pub fn video_url(&self) -> Option<&Url> {
        self.video_url.as_ref()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

//
// ─── BATCH ─────────────────────────────────────────────────────────────────────
//

/// A scheduled cohort of a course with its own seat limit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batch {
    id: BatchId,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    capacity: u32,
    enrolled_count: Option<u32>,
}

impl Batch {
    /// Creates a batch.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` if the dates are inverted, the capacity is zero,
    /// or the enrolled count exceeds the capacity.
    pub fn new(
        id: BatchId,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
        capacity: u32,
        enrolled_count: Option<u32>,
    ) -> Result<Self, CourseError> {
        if start_date > end_date {
            return Err(CourseError::InvalidBatchDates(id));
        }
        if capacity == 0 {
            return Err(CourseError::InvalidBatchCapacity(id));
        }
        if enrolled_count.is_some_and(|count| count > capacity) {
            return Err(CourseError::BatchOverCapacity(id));
        }
        Ok(Self {
            id,
            start_date,
            end_date,
            capacity,
            enrolled_count,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &BatchId {
        &self.id
    }

    #[must_use]
    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    #[must_use]
    pub fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    #[must_use]
    pub fn enrolled_count(&self) -> Option<u32> {
        self.enrolled_count
    }

    /// Remaining seats, when the backend reports an enrolled count.
    #[must_use]
    pub fn seats_left(&self) -> Option<u32> {
        self.enrolled_count
            .map(|count| self.capacity.saturating_sub(count))
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.seats_left() == Some(0)
    }

    #[must_use]
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        now > self.end_date
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Editable shape of a course, as filled in by an administrator or decoded
/// from the backend before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub instructor: Option<String>,
    pub price: f64,
    pub category: String,
    pub tags: Vec<String>,
    pub syllabus: Vec<Lesson>,
    pub batches: Vec<Batch>,
}

impl CourseDraft {
    /// Validate course-level invariants.
    ///
    /// # Errors
    ///
    /// Returns `CourseError` for a blank title, an invalid price, or duplicate
    /// lesson/batch ids.
    pub fn validate(self) -> Result<ValidatedCourse, CourseError> {
        let title = self.title.trim().to_owned();
        if title.is_empty() {
            return Err(CourseError::EmptyTitle);
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(CourseError::InvalidPrice);
        }

        let mut seen_lessons = HashSet::with_capacity(self.syllabus.len());
        for lesson in &self.syllabus {
            if !seen_lessons.insert(lesson.id()) {
                return Err(CourseError::DuplicateLesson(lesson.id().clone()));
            }
        }
        let mut seen_batches = HashSet::with_capacity(self.batches.len());
        for batch in &self.batches {
            if !seen_batches.insert(batch.id()) {
                return Err(CourseError::DuplicateBatch(batch.id().clone()));
            }
        }

        let tags = self
            .tags
            .into_iter()
            .map(|tag| tag.trim().to_owned())
            .filter(|tag| !tag.is_empty())
            .collect();

        Ok(ValidatedCourse {
            title,
            description: self.description.trim().to_owned(),
            instructor: self
                .instructor
                .map(|name| name.trim().to_owned())
                .filter(|name| !name.is_empty()),
            price: self.price,
            category: self.category.trim().to_owned(),
            tags,
            syllabus: self.syllabus,
            batches: self.batches,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedCourse {
    pub title: String,
    pub description: String,
    pub instructor: Option<String>,
    pub price: f64,
    pub category: String,
    pub tags: BTreeSet<String>,
    pub syllabus: Vec<Lesson>,
    pub batches: Vec<Batch>,
}

/// Server-owned bookkeeping that accompanies a persisted course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CourseMeta {
    pub enrollment_count: u32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ValidatedCourse {
    #[must_use]
    pub fn assign_id(self, id: CourseId, meta: CourseMeta) -> Course {
        Course {
            id,
            title: self.title,
            description: self.description,
            instructor: self.instructor,
            price: self.price,
            category: self.category,
            tags: self.tags,
            syllabus: self.syllabus,
            batches: self.batches,
            meta,
        }
    }
}

/// A published course. Read-only on the client except through admin edits.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    id: CourseId,
    title: String,
    description: String,
    instructor: Option<String>,
    price: f64,
    category: String,
    tags: BTreeSet<String>,
    syllabus: Vec<Lesson>,
    batches: Vec<Batch>,
    meta: CourseMeta,
}

impl Course {
    // Accessors
    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn instructor(&self) -> Option<&str> {
        self.instructor.as_deref()
    }

    #[must_use]
    pub fn price(&self) -> f64 {
        self.price
    }

    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Lessons in pedagogical order.
    #[must_use]
    pub fn syllabus(&self) -> &[Lesson] {
        &self.syllabus
    }

    #[must_use]
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    #[must_use]
    pub fn meta(&self) -> CourseMeta {
        self.meta
    }

    #[must_use]
    pub fn lesson(&self, id: &str) -> Option<&Lesson> {
        self.syllabus.iter().find(|lesson| lesson.id().as_str() == id)
    }

    #[must_use]
    pub fn has_lesson(&self, id: &str) -> bool {
        self.lesson(id).is_some()
    }

    #[must_use]
    pub fn batch(&self, id: &str) -> Option<&Batch> {
        self.batches.iter().find(|batch| batch.id().as_str() == id)
    }

    #[must_use]
    pub fn total_lessons(&self) -> u32 {
        u32::try_from(self.syllabus.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn total_minutes(&self) -> u32 {
        self.syllabus
            .iter()
            .fold(0u32, |acc, lesson| acc.saturating_add(lesson.duration_minutes()))
    }

    /// Editable copy for the admin edit flow.
    #[must_use]
    pub fn to_draft(&self) -> CourseDraft {
        CourseDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            instructor: self.instructor.clone(),
            price: self.price,
            category: self.category.clone(),
            tags: self.tags.iter().cloned().collect(),
            syllabus: self.syllabus.clone(),
            batches: self.batches.clone(),
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
