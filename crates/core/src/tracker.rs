//! Derived lesson state: completion percentage, material unlocking and
//! syllabus navigation.
//!
//! Everything here is a pure function over a syllabus and a set of completed
//! lesson ids. Malformed input (empty syllabus, unknown ids, counts larger
//! than the syllabus) degrades to safe defaults instead of failing: 0 %,
//! locked, no next lesson.
//!
//! Each lesson gates only its own materials. There is no prerequisite chain
//! between lessons, so completing lesson 3 before lesson 1 is allowed.

use std::borrow::Borrow;
use std::collections::BTreeSet;

use crate::model::{Course, Lesson, LessonId, LessonMaterials};

//
// ─── PERCENTAGE ────────────────────────────────────────────────────────────────
//

/// Completion percentage, rounded half-up to a whole number.
///
/// Returns 0 when `total_lessons` is 0. `completed_count` is clamped to
/// `total_lessons`, so the result is always within `0..=100`.
#[must_use]
pub fn compute_percentage(total_lessons: u32, completed_count: u32) -> u8 {
    if total_lessons == 0 {
        return 0;
    }
    let completed = u64::from(completed_count.min(total_lessons));
    let total = u64::from(total_lessons);
    // round(100 * c / t) == floor((200 * c + t) / (2 * t))
    let rounded = (200 * completed + total) / (2 * total);
    u8::try_from(rounded).unwrap_or(100)
}

//
// ─── UNLOCKING ─────────────────────────────────────────────────────────────────
//

/// Materials of a lesson unlock once that same lesson is marked complete.
#[must_use]
pub fn is_lesson_unlocked<S>(lesson: &Lesson, completed: &BTreeSet<S>) -> bool
where
    S: Borrow<str> + Ord,
{
    completed.contains(lesson.id().as_str())
}

/// What a student sees in the materials panel of a lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialAccess {
    /// The lesson has materials but is not complete yet.
    Locked { pending: usize },
    /// The lesson is complete and has materials.
    Unlocked,
    /// The lesson is complete and has no materials.
    Empty,
}

#[must_use]
pub fn material_access<S>(
    lesson: &Lesson,
    completed: &BTreeSet<S>,
    materials: &LessonMaterials,
) -> MaterialAccess
where
    S: Borrow<str> + Ord,
{
    if !is_lesson_unlocked(lesson, completed) {
        return MaterialAccess::Locked {
            pending: materials.len(),
        };
    }
    if materials.is_empty() {
        MaterialAccess::Empty
    } else {
        MaterialAccess::Unlocked
    }
}

//
// ─── NAVIGATION ────────────────────────────────────────────────────────────────
//

/// The lesson right after `current`, or `None` when `current` is the last
/// lesson or is not in the syllabus.
#[must_use]
pub fn next_lesson<'a>(syllabus: &'a [Lesson], current: &str) -> Option<&'a Lesson> {
    let index = position(syllabus, current)?;
    syllabus.get(index + 1)
}

#[must_use]
pub fn previous_lesson<'a>(syllabus: &'a [Lesson], current: &str) -> Option<&'a Lesson> {
    let index = position(syllabus, current)?;
    index.checked_sub(1).and_then(|prev| syllabus.get(prev))
}

/// Where a student resumes: the first lesson in syllabus order that is not
/// complete yet.
#[must_use]
pub fn first_incomplete_lesson<'a, S>(
    syllabus: &'a [Lesson],
    completed: &BTreeSet<S>,
) -> Option<&'a Lesson>
where
    S: Borrow<str> + Ord,
{
    syllabus
        .iter()
        .find(|lesson| !is_lesson_unlocked(lesson, completed))
}

fn position(syllabus: &[Lesson], lesson: &str) -> Option<usize> {
    syllabus
        .iter()
        .position(|candidate| candidate.id().as_str() == lesson)
}

//
// ─── OVERVIEW ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonState {
    Completed,
    Current,
    Pending,
}

/// One row of the syllabus sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonRow {
    /// 1-based position in the syllabus.
    pub number: usize,
    pub lesson_id: LessonId,
    pub title: String,
    pub duration_minutes: u32,
    pub state: LessonState,
}

/// Completed wins over current: the lesson being viewed still shows its
/// check mark once done.
#[must_use]
pub fn syllabus_overview<S>(
    syllabus: &[Lesson],
    completed: &BTreeSet<S>,
    current: Option<&str>,
) -> Vec<LessonRow>
where
    S: Borrow<str> + Ord,
{
    syllabus
        .iter()
        .enumerate()
        .map(|(index, lesson)| {
            let state = if is_lesson_unlocked(lesson, completed) {
                LessonState::Completed
            } else if current == Some(lesson.id().as_str()) {
                LessonState::Current
            } else {
                LessonState::Pending
            };
            LessonRow {
                number: index + 1,
                lesson_id: lesson.id().clone(),
                title: lesson.title().to_owned(),
                duration_minutes: lesson.duration_minutes(),
                state,
            }
        })
        .collect()
}

/// Aggregate numbers for a progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSummary {
    pub lessons_completed: u32,
    pub total_lessons: u32,
    pub percentage: u8,
    pub total_minutes: u32,
    pub remaining_minutes: u32,
}

impl ProgressSummary {
    /// Only ids that appear in the syllabus are counted.
    #[must_use]
    pub fn from_course<S>(course: &Course, completed: &BTreeSet<S>) -> Self
    where
        S: Borrow<str> + Ord,
    {
        let mut lessons_completed = 0u32;
        let mut remaining_minutes = 0u32;
        for lesson in course.syllabus() {
            if is_lesson_unlocked(lesson, completed) {
                lessons_completed = lessons_completed.saturating_add(1);
            } else {
                remaining_minutes = remaining_minutes.saturating_add(lesson.duration_minutes());
            }
        }
        let total_lessons = course.total_lessons();
        Self {
            lessons_completed,
            total_lessons,
            percentage: compute_percentage(total_lessons, lessons_completed),
            total_minutes: course.total_minutes(),
            remaining_minutes,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.total_lessons > 0 && self.lessons_completed >= self.total_lessons
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CourseDraft, CourseId, CourseMeta, LessonMaterials, Quiz};

    fn lesson(id: &str, minutes: u32) -> Lesson {
        Lesson::new(LessonId::new(id).unwrap(), id, minutes, None, None).unwrap()
    }

    fn syllabus(ids: &[&str]) -> Vec<Lesson> {
        ids.iter().map(|id| lesson(id, 10)).collect()
    }

    fn done(ids: &[&str]) -> BTreeSet<LessonId> {
        ids.iter().map(|id| LessonId::new(*id).unwrap()).collect()
    }

    fn course(lessons: Vec<Lesson>) -> Course {
        CourseDraft {
            title: "Course".into(),
            description: String::new(),
            instructor: None,
            price: 0.0,
            category: "general".into(),
            tags: Vec::new(),
            syllabus: lessons,
            batches: Vec::new(),
        }
        .validate()
        .unwrap()
        .assign_id(CourseId::new("c1").unwrap(), CourseMeta::default())
    }

    #[test]
    fn percentage_of_empty_course_is_zero() {
        assert_eq!(compute_percentage(0, 0), 0);
        assert_eq!(compute_percentage(0, 7), 0);
    }

    #[test]
    fn percentage_known_values() {
        assert_eq!(compute_percentage(10, 10), 100);
        assert_eq!(compute_percentage(3, 1), 33);
        assert_eq!(compute_percentage(3, 2), 67);
        assert_eq!(compute_percentage(4, 2), 50);
        // exact halves round up
        assert_eq!(compute_percentage(8, 1), 13);
        assert_eq!(compute_percentage(200, 1), 1);
    }

    #[test]
    fn percentage_clamps_overcount() {
        assert_eq!(compute_percentage(4, 9), 100);
        assert_eq!(compute_percentage(u32::MAX, u32::MAX), 100);
    }

    #[test]
    fn percentage_is_bounded_and_monotonic() {
        for total in 0..=60u32 {
            let mut last = 0u8;
            for completed in 0..=total {
                let pct = compute_percentage(total, completed);
                assert!(pct <= 100);
                assert!(pct >= last, "total={total} completed={completed}");
                last = pct;
            }
            if total > 0 {
                assert_eq!(compute_percentage(total, total), 100);
            }
        }
    }

    #[test]
    fn unlock_follows_completion_set() {
        let l1 = lesson("l1", 5);
        let mut completed = done(&[]);
        assert!(!is_lesson_unlocked(&l1, &completed));

        completed.insert(LessonId::new("l1").unwrap());
        assert!(is_lesson_unlocked(&l1, &completed));

        completed.insert(LessonId::new("l1").unwrap());
        assert_eq!(completed.len(), 1);
    }

    #[test]
    fn unlock_accepts_plain_string_sets() {
        let completed: BTreeSet<String> = ["l1".to_owned()].into_iter().collect();
        assert!(is_lesson_unlocked(&lesson("l1", 5), &completed));
        assert!(!is_lesson_unlocked(&lesson("l2", 5), &completed));
    }

    #[test]
    fn next_lesson_walks_the_syllabus() {
        let s = syllabus(&["l0", "l1", "l2"]);
        assert_eq!(next_lesson(&s, "l0").map(|l| l.id().as_str()), Some("l1"));
        assert_eq!(next_lesson(&s, "l1").map(|l| l.id().as_str()), Some("l2"));
        assert!(next_lesson(&s, "l2").is_none());
        assert!(next_lesson(&s, "missing").is_none());
        assert!(next_lesson(&[], "l0").is_none());
    }

    #[test]
    fn previous_lesson_walks_back() {
        let s = syllabus(&["l0", "l1"]);
        assert_eq!(previous_lesson(&s, "l1").map(|l| l.id().as_str()), Some("l0"));
        assert!(previous_lesson(&s, "l0").is_none());
    }

    #[test]
    fn first_incomplete_skips_done_lessons() {
        let s = syllabus(&["l0", "l1", "l2"]);
        let first = first_incomplete_lesson(&s, &done(&["l0", "l2"]));
        assert_eq!(first.map(|l| l.id().as_str()), Some("l1"));
        assert!(first_incomplete_lesson(&s, &done(&["l0", "l1", "l2"])).is_none());
    }

    #[test]
    fn four_lesson_scenario() {
        let course = course(syllabus(&["lesson1", "lesson2", "lesson3", "lesson4"]));
        let completed = done(&["lesson2", "lesson3"]);

        let summary = ProgressSummary::from_course(&course, &completed);
        assert_eq!(summary.percentage, 50);
        assert_eq!(summary.lessons_completed, 2);
        assert_eq!(summary.remaining_minutes, 20);
        assert!(!summary.is_finished());

        let materials = LessonMaterials::default();
        let lesson1 = course.lesson("lesson1").unwrap();
        let lesson2 = course.lesson("lesson2").unwrap();
        assert!(!is_lesson_unlocked(lesson1, &completed));
        assert!(is_lesson_unlocked(lesson2, &completed));
        assert_eq!(
            material_access(lesson1, &completed, &materials),
            MaterialAccess::Locked { pending: 0 }
        );
        assert_eq!(
            material_access(lesson2, &completed, &materials),
            MaterialAccess::Empty
        );
    }

    #[test]
    fn summary_ignores_ids_outside_syllabus() {
        let course = course(syllabus(&["a", "b"]));
        let summary = ProgressSummary::from_course(&course, &done(&["a", "ghost", "phantom"]));
        assert_eq!(summary.lessons_completed, 1);
        assert_eq!(summary.percentage, 50);
    }

    #[test]
    fn empty_syllabus_defaults() {
        let course = course(Vec::new());
        let summary = ProgressSummary::from_course(&course, &done(&["x"]));
        assert_eq!(summary, ProgressSummary::default());
        assert!(syllabus_overview(course.syllabus(), &done(&[]), None).is_empty());
    }

    #[test]
    fn material_access_unlocked_with_materials() {
        let l = lesson("l1", 5);
        let materials = LessonMaterials {
            assignments: Vec::new(),
            quizzes: vec![Quiz {
                id: crate::model::MaterialId::new("q1").unwrap(),
                course_id: CourseId::new("c1").unwrap(),
                lesson_id: None,
                title: "Quiz".into(),
                description: None,
                questions: Vec::new(),
                passing_score: 50,
                time_limit_minutes: None,
                attempts: Vec::new(),
            }],
        };
        assert_eq!(
            material_access(&l, &done(&[]), &materials),
            MaterialAccess::Locked { pending: 1 }
        );
        assert_eq!(
            material_access(&l, &done(&["l1"]), &materials),
            MaterialAccess::Unlocked
        );
    }

    #[test]
    fn overview_marks_states() {
        let s = syllabus(&["l0", "l1", "l2"]);
        let rows = syllabus_overview(&s, &done(&["l0"]), Some("l1"));
        let states: Vec<_> = rows.iter().map(|r| r.state).collect();
        assert_eq!(
            states,
            vec![
                LessonState::Completed,
                LessonState::Current,
                LessonState::Pending
            ]
        );
        assert_eq!(rows[2].number, 3);

        let rows = syllabus_overview(&s, &done(&["l0"]), Some("l0"));
        assert_eq!(rows[0].state, LessonState::Completed);
    }
}
