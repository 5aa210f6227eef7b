//! Unit coverage for lesson comment rules.

use std::sync::Arc;

use mockable::Clock;
use rstest::{fixture, rstest};

use super::*;
use crate::domain::ports::{MockCourseRepository, MockLessonCommentRepository, MockUserRepository};
use crate::domain::{
    AuthenticatedUser, DisplayName, ErrorCode, LessonPosition, Role, User,
};
use crate::test_support::{MutableClock, course_with_module_sizes};

type Service =
    LessonCommentService<MockLessonCommentRepository, MockCourseRepository, MockUserRepository>;

struct Mocks {
    comments: MockLessonCommentRepository,
    courses: MockCourseRepository,
    users: MockUserRepository,
    clock: Arc<MutableClock>,
}

impl Mocks {
    fn build(self) -> Service {
        LessonCommentService::new(
            Arc::new(self.comments),
            Arc::new(self.courses),
            Arc::new(self.users),
            self.clock,
        )
    }
}

#[fixture]
fn mocks() -> Mocks {
    let mut courses = MockCourseRepository::new();
    courses
        .expect_find_course()
        .returning(|_| Ok(Some(course_with_module_sizes(&[2]))));
    Mocks {
        comments: MockLessonCommentRepository::new(),
        courses,
        users: MockUserRepository::new(),
        clock: Arc::new(MutableClock::at_epoch()),
    }
}

fn user(role: Role) -> User {
    User::new(
        UserId::random(),
        "grace",
        DisplayName::new("Grace Hopper").expect("valid name"),
        role,
    )
}

fn lesson(lesson_index: u32) -> LessonRef {
    LessonRef {
        course_id: course_with_module_sizes(&[]).id,
        position: LessonPosition::new(0, lesson_index),
    }
}

fn question_on(lesson: LessonRef, author: &User, at: chrono::DateTime<chrono::Utc>) -> LessonComment {
    LessonComment {
        id: CommentId::random(),
        course_id: lesson.course_id,
        position: lesson.position,
        author: CommentAuthor {
            user_id: author.id().clone(),
            display_name: author.display_name().clone(),
            role: author.role(),
        },
        parent_id: None,
        body: CommentBody::new("What does `?` desugar to?").expect("valid body"),
        created_at: at,
    }
}

fn post(author: &User, lesson: LessonRef, body: &str, parent_id: Option<CommentId>) -> PostCommentRequest {
    PostCommentRequest {
        author: AuthenticatedUser::new(author.id().clone(), author.role()),
        lesson,
        body: body.to_owned(),
        parent_id,
    }
}

#[rstest]
#[tokio::test]
async fn students_can_ask_questions(mut mocks: Mocks) {
    let student = user(Role::Student);
    let found = student.clone();
    let now = mocks.clock.utc();
    mocks
        .users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(found)));
    mocks.comments.expect_insert().times(1).return_once(|_| Ok(()));

    let comment = mocks
        .build()
        .post_comment(post(&student, lesson(1), "  Why Box here?  ", None))
        .await
        .expect("question posted");

    assert_eq!(comment.body.as_ref(), "Why Box here?");
    assert_eq!(comment.author.display_name.as_ref(), "Grace Hopper");
    assert_eq!(comment.created_at, now);
    assert!(comment.parent_id.is_none());
}

#[rstest]
#[tokio::test]
async fn students_cannot_reply(mut mocks: Mocks) {
    mocks.comments.expect_insert().never();
    let error = mocks
        .build()
        .post_comment(post(&user(Role::Student), lesson(0), "me too", Some(CommentId::random())))
        .await
        .expect_err("reply is forbidden");
    assert_eq!(error.code(), ErrorCode::Forbidden);
}

#[rstest]
#[tokio::test]
async fn admins_reply_to_questions_on_the_same_lesson(mut mocks: Mocks) {
    let admin = user(Role::Admin);
    let found = admin.clone();
    let question = question_on(lesson(0), &user(Role::Student), mocks.clock.utc());
    let parent_id = question.id;
    mocks
        .comments
        .expect_find()
        .return_once(move |_| Ok(Some(question)));
    mocks
        .users
        .expect_find_by_id()
        .return_once(move |_| Ok(Some(found)));
    mocks
        .comments
        .expect_insert()
        .withf(move |reply| reply.parent_id == Some(parent_id))
        .times(1)
        .return_once(|_| Ok(()));

    let reply = mocks
        .build()
        .post_comment(post(&admin, lesson(0), "It calls From::from on the error.", Some(parent_id)))
        .await
        .expect("reply posted");
    assert_eq!(reply.author.role, Role::Admin);
}

#[rstest]
#[tokio::test]
async fn replies_to_another_lessons_thread_are_not_found(mut mocks: Mocks) {
    let question = question_on(lesson(1), &user(Role::Student), mocks.clock.utc());
    let parent_id = question.id;
    mocks
        .comments
        .expect_find()
        .return_once(move |_| Ok(Some(question)));
    mocks.comments.expect_insert().never();

    let error = mocks
        .build()
        .post_comment(post(&user(Role::Admin), lesson(0), "answer", Some(parent_id)))
        .await
        .expect_err("parent belongs to another lesson");
    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[case("   ")]
#[case("")]
#[tokio::test]
async fn blank_bodies_are_invalid(mocks: Mocks, #[case] body: &str) {
    let error = mocks
        .build()
        .post_comment(post(&user(Role::Student), lesson(0), body, None))
        .await
        .expect_err("blank body rejected");
    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn listing_an_unknown_lesson_is_not_found(mut mocks: Mocks) {
    mocks.comments.expect_list_for_lesson().never();
    let error = mocks
        .build()
        .list_comments(lesson(5))
        .await
        .expect_err("lesson (0, 5) does not exist");
    assert_eq!(error.code(), ErrorCode::NotFound);
}
