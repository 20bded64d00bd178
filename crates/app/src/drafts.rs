//! JSON files an administrator fills in for courses and quizzes.

use std::path::Path;

use anyhow::Context;
use chrono::{DateTime, Utc};
use course_core::model::{
    Batch, BatchId, CourseDraft, CourseError, CourseId, Lesson, LessonId, QuestionDraft,
    QuizDraft,
};
use serde::Deserialize;
use serde::de::DeserializeOwned;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LessonFile {
    lesson_id: LessonId,
    title: String,
    duration: u32,
    #[serde(default)]
    video_url: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchFile {
    batch_id: BatchId,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    capacity: u32,
}

/// Course fields in the same camelCase shape the backend uses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct CourseFile {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    instructor: Option<String>,
    price: f64,
    #[serde(default)]
    category: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    syllabus: Vec<LessonFile>,
    #[serde(default)]
    batches: Vec<BatchFile>,
}

impl CourseFile {
    pub(crate) fn into_draft(self) -> Result<CourseDraft, CourseError> {
        let syllabus = self
            .syllabus
            .into_iter()
            .map(|l| {
                Lesson::new(
                    l.lesson_id,
                    l.title,
                    l.duration,
                    l.video_url.as_deref(),
                    l.description,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;
        let batches = self
            .batches
            .into_iter()
            .map(|b| Batch::new(b.batch_id, b.start_date, b.end_date, b.capacity, None))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CourseDraft {
            title: self.title,
            description: self.description,
            instructor: self.instructor,
            price: self.price,
            category: self.category,
            tags: self.tags,
            syllabus,
            batches,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionFile {
    question: String,
    options: Vec<String>,
    correct_answer: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct QuizFile {
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_passing_score")]
    passing_score: u32,
    #[serde(default)]
    time_limit: Option<u32>,
    questions: Vec<QuestionFile>,
}

fn default_passing_score() -> u32 {
    70
}

impl QuizFile {
    pub(crate) fn into_draft(self, course_id: CourseId, lesson_id: LessonId) -> QuizDraft {
        QuizDraft {
            course_id,
            lesson_id,
            title: self.title,
            description: self.description,
            passing_score: self.passing_score,
            time_limit_minutes: self.time_limit,
            questions: self
                .questions
                .into_iter()
                .map(|q| QuestionDraft {
                    prompt: q.question,
                    options: q.options,
                    correct_option: q.correct_answer,
                })
                .collect(),
        }
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}
