//! Course catalogue read model.
//!
//! A course is an ordered list of modules, each an ordered list of lessons.
//! Lessons are addressed positionally by a zero-based
//! `(module_index, lesson_index)` pair. Reordering lessons therefore changes
//! what an existing progress record refers to; callers must treat the
//! structure as append-only once learners have progress against it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Stable course identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(Uuid);

impl CourseId {
    /// Wrap an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for CourseId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Zero-based address of a lesson within a course.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub struct LessonPosition {
    /// Index of the module within the course.
    pub module_index: u32,
    /// Index of the lesson within its module.
    pub lesson_index: u32,
}

impl LessonPosition {
    /// The first lesson of any course.
    pub const FIRST: Self = Self::new(0, 0);

    /// Build a position from its indices.
    pub const fn new(module_index: u32, lesson_index: u32) -> Self {
        Self {
            module_index,
            lesson_index,
        }
    }
}

impl fmt::Display for LessonPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.module_index, self.lesson_index)
    }
}

/// A single lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// Title shown in the player and on the dashboard.
    pub title: String,
    /// Identifier understood by the embedded third-party video player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
}

/// An ordered group of lessons.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Module heading.
    pub title: String,
    /// Lessons in playback order.
    pub lessons: Vec<Lesson>,
}

/// Full structure of one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseStructure {
    /// Course identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: CourseId,
    /// URL-friendly unique name.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Marketing blurb.
    #[serde(default)]
    pub description: String,
    /// Modules in order.
    pub modules: Vec<Module>,
}

impl CourseStructure {
    /// Number of lessons across all modules.
    pub fn total_lessons(&self) -> usize {
        self.modules.iter().map(|module| module.lessons.len()).sum()
    }

    /// Module at `module_index`, if present.
    pub fn module(&self, module_index: u32) -> Option<&Module> {
        usize::try_from(module_index)
            .ok()
            .and_then(|idx| self.modules.get(idx))
    }

    /// Resolve a position to its module and lesson.
    pub fn lesson(&self, position: LessonPosition) -> Option<(&Module, &Lesson)> {
        let module = self.module(position.module_index)?;
        let lesson = usize::try_from(position.lesson_index)
            .ok()
            .and_then(|idx| module.lessons.get(idx))?;
        Some((module, lesson))
    }

    /// Whether `position` addresses an existing lesson.
    pub fn contains(&self, position: LessonPosition) -> bool {
        self.lesson(position).is_some()
    }

    /// Every lesson position in module-then-lesson order.
    pub fn positions(&self) -> impl Iterator<Item = LessonPosition> + '_ {
        self.modules
            .iter()
            .zip(0_u32..)
            .flat_map(|(module, module_index)| {
                (0_u32..)
                    .take(module.lessons.len())
                    .map(move |lesson_index| LessonPosition::new(module_index, lesson_index))
            })
    }

    /// Catalogue listing entry for this course.
    pub fn summary(&self) -> CourseSummary {
        CourseSummary {
            id: self.id,
            slug: self.slug.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            module_count: self.modules.len(),
            lesson_count: self.total_lessons(),
        }
    }
}

/// Catalogue listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    /// Course identifier.
    #[schema(value_type = String, format = Uuid)]
    pub id: CourseId,
    /// URL-friendly unique name.
    pub slug: String,
    /// Display title.
    pub title: String,
    /// Marketing blurb.
    pub description: String,
    /// Number of modules.
    pub module_count: usize,
    /// Number of lessons across all modules.
    pub lesson_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::course_with_module_sizes;
    use rstest::rstest;

    #[rstest]
    fn positions_follow_module_then_lesson_order() {
        let course = course_with_module_sizes(&[2, 0, 1]);
        let positions: Vec<_> = course.positions().collect();
        assert_eq!(
            positions,
            vec![
                LessonPosition::new(0, 0),
                LessonPosition::new(0, 1),
                LessonPosition::new(2, 0),
            ]
        );
    }

    #[rstest]
    #[case(LessonPosition::new(0, 1), true)]
    #[case(LessonPosition::new(0, 2), false)]
    #[case(LessonPosition::new(3, 0), false)]
    fn contains_checks_both_indices(#[case] position: LessonPosition, #[case] expected: bool) {
        let course = course_with_module_sizes(&[2, 0, 1]);
        assert_eq!(course.contains(position), expected);
    }

    #[rstest]
    fn summary_counts_modules_and_lessons() {
        let course = course_with_module_sizes(&[15, 10, 10, 12, 19]);
        let summary = course.summary();
        assert_eq!(summary.module_count, 5);
        assert_eq!(summary.lesson_count, 66);
    }

    #[rstest]
    fn lesson_resolves_titles() {
        let course = course_with_module_sizes(&[3]);
        let (module, lesson) = course
            .lesson(LessonPosition::new(0, 2))
            .expect("lesson exists");
        assert_eq!(module.title, "Module 1");
        assert_eq!(lesson.title, "Lesson 1.3");
    }
}
