use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::model::course::Course;
use crate::model::ids::{CourseId, LessonId};
use crate::tracker;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("lesson {0} is not part of the course syllabus")]
    UnknownLesson(LessonId),

    #[error("progress belongs to course {found}, expected {expected}")]
    CourseMismatch { expected: CourseId, found: CourseId },
}

/// Completion state of one student within one course.
///
/// Completed lessons only ever accumulate; marking the same lesson twice is a
/// no-op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    course_id: CourseId,
    completed: BTreeSet<LessonId>,
    total_lessons: u32,
    updated_at: Option<DateTime<Utc>>,
}

impl Progress {
    /// Empty progress for a freshly enrolled student.
    #[must_use]
    pub fn start(course: &Course) -> Self {
        Self {
            course_id: course.id().clone(),
            completed: BTreeSet::new(),
            total_lessons: course.total_lessons(),
            updated_at: None,
        }
    }

    /// Progress as reported by the backend, not yet checked against a syllabus.
    #[must_use]
    pub fn from_parts(
        course_id: CourseId,
        completed: impl IntoIterator<Item = LessonId>,
        total_lessons: u32,
        updated_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            course_id,
            completed: completed.into_iter().collect(),
            total_lessons,
            updated_at,
        }
    }

    /// Align this record with the course it belongs to.
    ///
    /// Lesson ids that are no longer in the syllabus are dropped and returned,
    /// and the lesson total is taken from the syllabus.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::CourseMismatch` if the record belongs to another course.
    pub fn reconcile(mut self, course: &Course) -> Result<(Self, Vec<LessonId>), ProgressError> {
        if &self.course_id != course.id() {
            return Err(ProgressError::CourseMismatch {
                expected: course.id().clone(),
                found: self.course_id,
            });
        }
        let (kept, dropped): (BTreeSet<_>, BTreeSet<_>) = std::mem::take(&mut self.completed)
            .into_iter()
            .partition(|id| course.has_lesson(id.as_str()));
        self.completed = kept;
        self.total_lessons = course.total_lessons();
        Ok((self, dropped.into_iter().collect()))
    }

    /// Record a lesson as completed.
    ///
    /// Returns `true` if the lesson was newly added, `false` if it was already
    /// complete.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError` if the lesson is not in this course's syllabus.
    pub fn mark_complete(
        &mut self,
        course: &Course,
        lesson: &LessonId,
        at: DateTime<Utc>,
    ) -> Result<bool, ProgressError> {
        if &self.course_id != course.id() {
            return Err(ProgressError::CourseMismatch {
                expected: course.id().clone(),
                found: self.course_id.clone(),
            });
        }
        if !course.has_lesson(lesson.as_str()) {
            return Err(ProgressError::UnknownLesson(lesson.clone()));
        }
        self.total_lessons = course.total_lessons();
        let added = self.completed.insert(lesson.clone());
        if added {
            self.updated_at = Some(at);
        }
        Ok(added)
    }

    // Accessors
    #[must_use]
    pub fn course_id(&self) -> &CourseId {
        &self.course_id
    }

    #[must_use]
    pub fn completed_lesson_ids(&self) -> &BTreeSet<LessonId> {
        &self.completed
    }

    #[must_use]
    pub fn is_lesson_complete(&self, lesson: &str) -> bool {
        self.completed.contains(lesson)
    }

    #[must_use]
    pub fn lessons_completed(&self) -> u32 {
        u32::try_from(self.completed.len()).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn total_lessons(&self) -> u32 {
        self.total_lessons
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        tracker::compute_percentage(self.total_lessons, self.lessons_completed())
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::course::{CourseDraft, CourseMeta, Lesson};
    use crate::time::fixed_now;

    fn course(id: &str, lessons: &[&str]) -> Course {
        CourseDraft {
            title: "Course".into(),
            description: String::new(),
            instructor: None,
            price: 0.0,
            category: "general".into(),
            tags: Vec::new(),
            syllabus: lessons
                .iter()
                .map(|l| Lesson::new(LessonId::new(*l).unwrap(), *l, 5, None, None).unwrap())
                .collect(),
            batches: Vec::new(),
        }
        .validate()
        .unwrap()
        .assign_id(CourseId::new(id).unwrap(), CourseMeta::default())
    }

    fn lid(id: &str) -> LessonId {
        LessonId::new(id).unwrap()
    }

    #[test]
    fn four_lesson_course_half_done() {
        let course = course("c1", &["lesson1", "lesson2", "lesson3", "lesson4"]);
        let mut progress = Progress::start(&course);
        progress.mark_complete(&course, &lid("lesson2"), fixed_now()).unwrap();
        progress.mark_complete(&course, &lid("lesson3"), fixed_now()).unwrap();

        assert_eq!(progress.lessons_completed(), 2);
        assert_eq!(progress.total_lessons(), 4);
        assert_eq!(progress.percentage(), 50);
        assert!(!progress.is_lesson_complete("lesson1"));
        assert!(progress.is_lesson_complete("lesson2"));
    }

    #[test]
    fn marking_twice_is_idempotent() {
        let course = course("c1", &["a", "b", "c"]);
        let mut progress = Progress::start(&course);
        assert!(progress.mark_complete(&course, &lid("a"), fixed_now()).unwrap());
        assert!(!progress.mark_complete(&course, &lid("a"), fixed_now()).unwrap());
        assert_eq!(progress.lessons_completed(), 1);
        assert_eq!(progress.percentage(), 33);
    }

    #[test]
    fn unknown_lesson_is_rejected() {
        let course = course("c1", &["a"]);
        let mut progress = Progress::start(&course);
        let err = progress
            .mark_complete(&course, &lid("zzz"), fixed_now())
            .unwrap_err();
        assert_eq!(err, ProgressError::UnknownLesson(lid("zzz")));
        assert_eq!(progress.lessons_completed(), 0);
        assert_eq!(progress.updated_at(), None);
    }

    #[test]
    fn out_of_order_completion_is_allowed() {
        let course = course("c1", &["a", "b", "c"]);
        let mut progress = Progress::start(&course);
        progress.mark_complete(&course, &lid("c"), fixed_now()).unwrap();
        assert!(progress.is_lesson_complete("c"));
        assert!(!progress.is_lesson_complete("a"));
    }

    #[test]
    fn reconcile_drops_unknown_ids_and_refreshes_total() {
        let course = course("c1", &["a", "b"]);
        let raw = Progress::from_parts(
            CourseId::new("c1").unwrap(),
            vec![lid("a"), lid("gone")],
            7,
            None,
        );
        let (progress, dropped) = raw.reconcile(&course).unwrap();
        assert_eq!(dropped, vec![lid("gone")]);
        assert_eq!(progress.total_lessons(), 2);
        assert_eq!(progress.percentage(), 50);
    }

    #[test]
    fn reconcile_rejects_other_course() {
        let course = course("c1", &["a"]);
        let raw = Progress::from_parts(CourseId::new("c2").unwrap(), Vec::new(), 1, None);
        assert!(matches!(
            raw.reconcile(&course),
            Err(ProgressError::CourseMismatch { .. })
        ));
    }
}
