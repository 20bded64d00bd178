use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::course::Course;
use crate::model::ids::{BatchId, CourseId, EnrollmentId, UserId};
use crate::model::progress::Progress;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EnrollmentError {
    #[error("course {course} has no batch {batch}")]
    UnknownBatch { course: CourseId, batch: BatchId },

    #[error("batch {0} is full")]
    BatchFull(BatchId),

    #[error("batch {0} has already ended")]
    BatchEnded(BatchId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Dropped,
}

/// The backend either returns a bare course id or the populated course.
#[derive(Debug, Clone, PartialEq)]
pub enum CourseRef {
    Id(CourseId),
    Embedded(Box<Course>),
}

impl CourseRef {
    #[must_use]
    pub fn id(&self) -> &CourseId {
        match self {
            CourseRef::Id(id) => id,
            CourseRef::Embedded(course) => course.id(),
        }
    }

    #[must_use]
    pub fn course(&self) -> Option<&Course> {
        match self {
            CourseRef::Id(_) => None,
            CourseRef::Embedded(course) => Some(course),
        }
    }
}

/// A student's place in one batch of one course.
#[derive(Debug, Clone, PartialEq)]
pub struct Enrollment {
    pub id: EnrollmentId,
    pub course: CourseRef,
    pub student_id: UserId,
    pub batch_id: BatchId,
    pub enrolled_at: DateTime<Utc>,
    pub status: EnrollmentStatus,
    pub progress: Option<Progress>,
}

impl Enrollment {
    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        self.course.id()
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == EnrollmentStatus::Active
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.progress.as_ref().map_or(0, Progress::percentage)
    }
}

/// Picks the enrollment for a course out of a student's enrollment list.
#[must_use]
pub fn find_for_course<'a>(enrollments: &'a [Enrollment], course: &str) -> Option<&'a Enrollment> {
    enrollments
        .iter()
        .find(|enrollment| enrollment.course_id().as_str() == course)
}

/// Request body for joining a batch, checked against the course first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentRequest {
    pub course_id: CourseId,
    pub batch_id: BatchId,
}

impl EnrollmentRequest {
    /// Build a request for a batch of `course`.
    ///
    /// # Errors
    ///
    /// Returns `EnrollmentError` if the batch does not exist, has no seats left,
    /// or has already ended.
    pub fn for_batch(
        course: &Course,
        batch_id: &BatchId,
        now: DateTime<Utc>,
    ) -> Result<Self, EnrollmentError> {
        let batch = course
            .batch(batch_id.as_str())
            .ok_or_else(|| EnrollmentError::UnknownBatch {
                course: course.id().clone(),
                batch: batch_id.clone(),
            })?;
        if batch.is_full() {
            return Err(EnrollmentError::BatchFull(batch_id.clone()));
        }
        if batch.has_ended(now) {
            return Err(EnrollmentError::BatchEnded(batch_id.clone()));
        }
        Ok(Self {
            course_id: course.id().clone(),
            batch_id: batch_id.clone(),
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
