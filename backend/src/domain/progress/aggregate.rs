//! Derived progress state for dashboards and the "continue watching" card.

use std::collections::HashSet;

use serde::Serialize;
use utoipa::ToSchema;

use super::ProgressRecord;
use crate::domain::{CourseStructure, LessonPosition};

/// Completion of a single module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    /// Position of the module within the course.
    pub module_index: u32,
    /// Module heading.
    pub title: String,
    /// Distinct completed lessons in this module.
    pub completed_lessons: usize,
    /// Lessons in this module.
    pub total_lessons: usize,
    /// True only when every lesson in the module is complete.
    pub completed: bool,
}

/// Why a lesson was recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum ResumeReason {
    /// Most recently touched lesson that is still incomplete.
    LastTouched,
    /// First lesson in course order the learner has never touched.
    FirstUntouched,
    /// Everything is complete; start again from the top.
    Rewatch,
}

/// Lesson recommended on the "continue watching" card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumeLesson {
    /// Lesson address.
    pub position: LessonPosition,
    /// Title of the containing module.
    pub module_title: String,
    /// Title of the lesson.
    pub lesson_title: String,
    /// Player identifier for the lesson video.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    /// Which rule selected the lesson.
    pub reason: ResumeReason,
}

/// Aggregate progress for one enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    /// `round(100 * completed_lessons / total_lessons)`, 0 for empty courses.
    pub overall_percent: u8,
    /// Distinct completed lessons that exist in the course.
    pub completed_lessons: usize,
    /// Lessons in the course structure.
    pub total_lessons: usize,
    /// Number of fully completed modules.
    pub completed_modules: usize,
    /// Per-module breakdown in course order.
    pub modules: Vec<ModuleProgress>,
    /// Recommended lesson; absent only for a course without lessons.
    pub resume_lesson: Option<ResumeLesson>,
}

/// Compute aggregate progress from raw records and the course structure.
///
/// Totals come from `course`, never from the records. Records pointing at
/// positions the course does not contain are ignored, and each position is
/// counted at most once.
///
/// # Examples
/// ```
/// use academy::domain::{CourseId, CourseStructure, Lesson, Module, aggregate};
///
/// let course = CourseStructure {
///     id: CourseId::random(),
///     slug: "intro".into(),
///     title: "Intro".into(),
///     description: String::new(),
///     modules: vec![Module {
///         title: "Basics".into(),
///         lessons: vec![Lesson { title: "Hello".into(), video_id: None }],
///     }],
/// };
/// let summary = aggregate(&[], &course);
/// assert_eq!(summary.overall_percent, 0);
/// assert_eq!(summary.resume_lesson.map(|l| l.lesson_title), Some("Hello".into()));
/// ```
pub fn aggregate(records: &[ProgressRecord], course: &CourseStructure) -> ProgressSummary {
    let completed: HashSet<LessonPosition> = records
        .iter()
        .filter(|record| record.completed && course.contains(record.position))
        .map(|record| record.position)
        .collect();

    let modules: Vec<ModuleProgress> = course
        .modules
        .iter()
        .zip(0_u32..)
        .map(|(module, module_index)| {
            let completed_lessons = completed
                .iter()
                .filter(|position| position.module_index == module_index)
                .count();
            let total_lessons = module.lessons.len();
            ModuleProgress {
                module_index,
                title: module.title.clone(),
                completed_lessons,
                total_lessons,
                completed: completed_lessons == total_lessons,
            }
        })
        .collect();

    let total_lessons = course.total_lessons();
    ProgressSummary {
        overall_percent: rounded_percent(completed.len(), total_lessons),
        completed_lessons: completed.len(),
        total_lessons,
        completed_modules: modules.iter().filter(|module| module.completed).count(),
        modules,
        resume_lesson: resume_lesson(records, course),
    }
}

/// Half-up rounding of `100 * part / whole` in integer arithmetic.
fn rounded_percent(part: usize, whole: usize) -> u8 {
    let Ok(whole) = u64::try_from(whole) else {
        return 0;
    };
    if whole == 0 {
        return 0;
    }
    let part = u64::try_from(part).map_or(whole, |value| value.min(whole));
    let rounded = part
        .saturating_mul(200)
        .saturating_add(whole)
        .checked_div(whole.saturating_mul(2))
        .unwrap_or(0);
    u8::try_from(rounded).unwrap_or(100)
}

fn resume_lesson(records: &[ProgressRecord], course: &CourseStructure) -> Option<ResumeLesson> {
    let (position, reason) = select_resume_position(records, course)?;
    let (module, lesson) = course.lesson(position)?;
    Some(ResumeLesson {
        position,
        module_title: module.title.clone(),
        lesson_title: lesson.title.clone(),
        video_id: lesson.video_id.clone(),
        reason,
    })
}

fn select_resume_position(
    records: &[ProgressRecord],
    course: &CourseStructure,
) -> Option<(LessonPosition, ResumeReason)> {
    // Equal timestamps resolve to whichever record the iterator yields last.
    let last_touched = records
        .iter()
        .filter(|record| !record.completed && course.contains(record.position))
        .max_by_key(|record| record.updated_at);
    if let Some(record) = last_touched {
        return Some((record.position, ResumeReason::LastTouched));
    }

    let touched: HashSet<LessonPosition> = records.iter().map(|record| record.position).collect();
    let mut positions = course.positions();
    let first = positions.next()?;
    if !touched.contains(&first) {
        return Some((first, ResumeReason::FirstUntouched));
    }
    positions
        .find(|position| !touched.contains(position))
        .map(|position| (position, ResumeReason::FirstUntouched))
        .or(Some((first, ResumeReason::Rewatch)))
}

#[cfg(test)]
#[path = "aggregate_tests.rs"]
mod aggregate_tests;
