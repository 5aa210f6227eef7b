//! Test utilities shared by unit tests (in `src/`) and integration tests
//! (in `tests/`). Compiled only for tests or with the `test-support` feature.

pub mod clock;
pub mod course;

pub use clock::MutableClock;
pub use course::course_with_module_sizes;
