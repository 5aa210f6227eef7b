//! Course structure builders.

use uuid::Uuid;

use crate::domain::{CourseId, CourseStructure, Lesson, Module};

/// Build a course whose modules hold the given lesson counts.
///
/// Titles follow `Module {m}` / `Lesson {m}.{l}` (one-based) and every lesson
/// has a `vid-{m}-{l}` video id (zero-based).
pub fn course_with_module_sizes(sizes: &[usize]) -> CourseStructure {
    let modules = sizes
        .iter()
        .enumerate()
        .map(|(m, size)| Module {
            title: format!("Module {}", m + 1),
            lessons: (0..*size)
                .map(|l| Lesson {
                    title: format!("Lesson {}.{}", m + 1, l + 1),
                    video_id: Some(format!("vid-{m}-{l}")),
                })
                .collect(),
        })
        .collect();
    CourseStructure {
        id: CourseId::from_uuid(Uuid::from_u128(0x5eed)),
        slug: "rust-foundations".to_owned(),
        title: "Rust Foundations".to_owned(),
        description: "Ownership, traits and async from first principles.".to_owned(),
        modules,
    }
}
