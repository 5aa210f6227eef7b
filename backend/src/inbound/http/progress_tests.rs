//! Tests for lesson progress HTTP handlers.

use super::*;
use crate::domain::ports::{ProgressView, UpdateProgressResponse};
use crate::domain::{EnrollmentId, Error, ErrorCode, aggregate};
use crate::inbound::http::test_utils::{TestPorts, VALID_TOKEN, student, with_bearer};
use crate::test_support::course_with_module_sizes;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test};
use chrono::TimeZone;
use rstest::rstest;
use serde_json::{Value, json};

fn at(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).single().expect("valid timestamp")
}

fn completed(position: LessonPosition) -> ProgressRecord {
    ProgressRecord {
        enrollment_id: EnrollmentId::random(),
        position,
        completed: true,
        completed_at: Some(at(60)),
        updated_at: at(60),
    }
}

async fn call(
    ports: TestPorts,
    request: actix_test::TestRequest,
) -> (StatusCode, Option<String>, Value) {
    let app = actix_test::init_service(
        App::new().app_data(web::Data::new(ports.into_state())).service(
            web::scope("/api/v1")
                .service(get_progress_summary)
                .service(get_progress)
                .service(update_progress),
        ),
    )
    .await;
    let response = actix_test::call_service(&app, request.to_request()).await;
    let status = response.status();
    let cache = response
        .headers()
        .get(crate::inbound::http::cache_control::X_CACHE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    (status, cache, actix_test::read_body_json(response).await)
}

fn full_body(course_id: CourseId) -> Value {
    json!({
        "courseId": course_id.to_string(),
        "moduleIndex": 0,
        "lessonIndex": 1,
        "completed": true,
    })
}

#[rstest]
#[case::course_id("courseId")]
#[case::module_index("moduleIndex")]
#[case::lesson_index("lessonIndex")]
#[case::completed("completed")]
#[actix_web::test]
async fn each_missing_write_field_is_reported(#[case] field: &str) {
    let mut body = full_body(CourseId::random());
    body.as_object_mut().expect("object body").remove(field);
    let mut ports = TestPorts::authenticated(student());
    ports.progress_command.expect_update_progress().never();

    let (status, _, payload) = call(
        ports,
        with_bearer(actix_test::TestRequest::post().uri("/api/v1/progress")).set_json(body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(payload["code"], "invalid_request");
    assert_eq!(payload["details"]["field"], field);
    assert_eq!(payload["details"]["code"], "missing_field");
}

#[rstest]
fn the_first_missing_field_wins() {
    let err = ValidatedUpdate::try_from(UpdateProgressBody {
        module_index: Some(1),
        ..UpdateProgressBody::default()
    })
    .err()
    .expect("courseId missing");

    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert_eq!(err.details().map(|d| &d["field"]), Some(&json!("courseId")));
}

#[actix_web::test]
async fn writes_return_the_full_updated_list() {
    let user = student();
    let user_id = user.user_id.clone();
    let course_id = CourseId::random();
    let mut ports = TestPorts::authenticated(user);
    ports
        .progress_command
        .expect_update_progress()
        .withf(move |request| {
            request.user_id == user_id
                && request.course_id == course_id
                && request.position == LessonPosition::new(0, 1)
                && request.completed
        })
        .times(1)
        .return_once(|_| {
            Ok(UpdateProgressResponse {
                records: vec![
                    completed(LessonPosition::new(0, 0)),
                    completed(LessonPosition::new(0, 1)),
                ],
                enrollment: EnrollmentOutcome::Existing,
            })
        });

    let (status, _, payload) = call(
        ports,
        with_bearer(actix_test::TestRequest::post().uri("/api/v1/progress"))
            .set_json(full_body(course_id)),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let progress = payload["progress"].as_array().expect("progress array");
    assert_eq!(progress.len(), 2);
    assert_eq!(progress[1]["lessonIndex"], 1);
    assert_eq!(progress[1]["completedAt"], "1970-01-01T00:01:00Z");
}

#[actix_web::test]
async fn writes_require_a_bearer_token() {
    let mut ports = TestPorts::authenticated(student());
    ports.progress_command.expect_update_progress().never();

    let (status, _, _) = call(
        ports,
        actix_test::TestRequest::post()
            .uri("/api/v1/progress")
            .set_json(full_body(CourseId::random())),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[rstest]
#[case::hit(CacheStatus::Hit, EnrollmentOutcome::Existing, "HIT", "hit", "existing")]
#[case::miss(CacheStatus::Miss, EnrollmentOutcome::Created, "MISS", "miss", "created")]
#[actix_web::test]
async fn reads_report_cache_status_and_enrollment(
    #[case] cache_status: CacheStatus,
    #[case] enrollment: EnrollmentOutcome,
    #[case] header: &str,
    #[case] body_status: &str,
    #[case] body_enrollment: &str,
) {
    let course_id = CourseId::random();
    let mut ports = TestPorts::authenticated(student());
    ports
        .progress
        .expect_get_progress()
        .withf(move |request| request.course_id == course_id)
        .return_once(move |_| {
            Ok(ProgressView {
                records: Vec::new(),
                cache_status,
                enrollment,
            })
        });
    let uri = format!("/api/v1/courses/{course_id}/progress");

    let (status, cache, payload) =
        call(ports, with_bearer(actix_test::TestRequest::get().uri(&uri))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache.as_deref(), Some(header));
    assert_eq!(payload["cacheStatus"], body_status);
    assert_eq!(payload["enrollment"], body_enrollment);
    assert_eq!(payload["progress"], json!([]));
}

#[actix_web::test]
async fn store_failures_are_redacted() {
    let mut ports = TestPorts::authenticated(student());
    ports
        .progress
        .expect_get_progress()
        .return_once(|_| Err(Error::internal("progress repository unavailable: db down")));
    let uri = format!("/api/v1/courses/{}/progress", CourseId::random());

    let (status, cache, payload) =
        call(ports, with_bearer(actix_test::TestRequest::get().uri(&uri))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(cache.is_none());
    assert_eq!(payload["message"], "Internal server error");
}

#[actix_web::test]
async fn unknown_courses_are_not_found() {
    let mut ports = TestPorts::authenticated(student());
    ports
        .progress
        .expect_get_progress()
        .return_once(|_| Err(Error::not_found("course not found")));
    let uri = format!("/api/v1/courses/{}/progress", CourseId::random());

    let (status, _, payload) = call(ports, with_bearer(actix_test::TestRequest::get().uri(&uri))).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(payload["code"], "not_found");
}

#[actix_web::test]
async fn summary_serialises_resume_lesson() {
    let course = course_with_module_sizes(&[3, 2]);
    let records = vec![
        completed(LessonPosition::new(0, 0)),
        completed(LessonPosition::new(0, 1)),
    ];
    let summary = aggregate(&records, &course);
    let mut ports = TestPorts::authenticated(student());
    ports
        .progress
        .expect_get_summary()
        .return_once(move |_| Ok(summary));
    let uri = format!("/api/v1/courses/{}/progress/summary", course.id);

    let (status, _, payload) = call(
        ports,
        actix_test::TestRequest::get()
            .uri(&uri)
            .insert_header(("Authorization", format!("Bearer {VALID_TOKEN}"))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(payload["overallPercent"], 40);
    assert_eq!(payload["totalLessons"], 5);
    assert_eq!(
        payload["resumeLesson"]["position"],
        json!({"moduleIndex": 0, "lessonIndex": 2})
    );
    assert_eq!(payload["resumeLesson"]["reason"], "firstUntouched");
}

#[rstest]
fn progress_response_wire_shape() {
    let response = ProgressResponse {
        progress: progress_bodies(vec![completed(LessonPosition::new(0, 1))]),
        cache_status: CacheStatusBody::Hit,
        enrollment: EnrollmentOutcome::Existing,
    };

    insta::assert_json_snapshot!(response, @r#"
    {
      "progress": [
        {
          "moduleIndex": 0,
          "lessonIndex": 1,
          "completed": true,
          "completedAt": "1970-01-01T00:01:00Z",
          "updatedAt": "1970-01-01T00:01:00Z"
        }
      ],
      "cacheStatus": "hit",
      "enrollment": "existing"
    }
    "#);
}
