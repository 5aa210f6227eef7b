//! Course catalogue read endpoints.
//!
//! ```text
//! GET /api/v1/courses
//! GET /api/v1/courses/{courseId}
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{CourseId, CourseStructure, CourseSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::BearerAuth;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid};

/// Parse the `{courseId}` path segment.
pub(crate) fn course_id_from_path(raw: &str) -> ApiResult<CourseId> {
    parse_uuid(raw, FieldName::new("courseId")).map(CourseId::from_uuid)
}

/// Response payload for `GET /api/v1/courses`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseListResponse {
    /// Courses ordered by title.
    pub courses: Vec<CourseSummary>,
}

/// List every course with module and lesson counts.
#[utoipa::path(
    get,
    path = "/api/v1/courses",
    responses(
        (status = 200, description = "Course list", body = CourseListResponse),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "listCourses",
    security(("BearerToken" = []))
)]
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<HttpState>,
    _auth: BearerAuth,
) -> ApiResult<web::Json<CourseListResponse>> {
    let courses = state.catalogue.list_courses().await?;
    Ok(web::Json(CourseListResponse { courses }))
}

/// Fetch the module and lesson structure of one course.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{courseId}",
    params(("courseId" = String, Path, description = "Course identifier", format = Uuid)),
    responses(
        (status = 200, description = "Course structure", body = CourseStructure),
        (status = 400, description = "Malformed course id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown course", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["catalogue"],
    operation_id = "getCourse",
    security(("BearerToken" = []))
)]
#[get("/courses/{course_id}")]
pub async fn get_course(
    state: web::Data<HttpState>,
    _auth: BearerAuth,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let course_id = course_id_from_path(&path)?;
    let course = state.catalogue.get_course(course_id).await?;
    Ok(HttpResponse::Ok().json(course))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Error, Lesson, Module};
    use crate::inbound::http::test_utils::{TestPorts, student, with_bearer};
    use actix_web::http::StatusCode;
    use actix_web::{App, test as actix_test};
    use serde_json::Value;

    fn intro_course() -> CourseStructure {
        CourseStructure {
            id: CourseId::random(),
            slug: "rust-intro".to_owned(),
            title: "Rust from zero".to_owned(),
            description: String::new(),
            modules: vec![Module {
                title: "Ownership".to_owned(),
                lessons: vec![Lesson {
                    title: "Moves".to_owned(),
                    video_id: Some("vid-1".to_owned()),
                }],
            }],
        }
    }

    async fn call(ports: TestPorts, request: actix_test::TestRequest) -> (StatusCode, Value) {
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(ports.into_state()))
                .service(web::scope("/api/v1").service(list_courses).service(get_course)),
        )
        .await;
        let response = actix_test::call_service(&app, request.to_request()).await;
        let status = response.status();
        (status, actix_test::read_body_json(response).await)
    }

    #[actix_web::test]
    async fn lists_course_summaries() {
        let course = intro_course();
        let summary = course.summary();
        let mut ports = TestPorts::authenticated(student());
        ports
            .catalogue
            .expect_list_courses()
            .return_once(move || Ok(vec![summary]));

        let (status, body) =
            call(ports, with_bearer(actix_test::TestRequest::get().uri("/api/v1/courses"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["courses"][0]["slug"], "rust-intro");
        assert_eq!(body["courses"][0]["lessonCount"], 1);
    }

    #[actix_web::test]
    async fn course_lookup_requires_a_bearer_token() {
        let ports = TestPorts::authenticated(student());

        let (status, body) = call(ports, actix_test::TestRequest::get().uri("/api/v1/courses")).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "unauthorized");
    }

    #[actix_web::test]
    async fn unknown_courses_are_not_found() {
        let mut ports = TestPorts::authenticated(student());
        ports
            .catalogue
            .expect_get_course()
            .return_once(|_| Err(Error::not_found("course not found")));
        let uri = format!("/api/v1/courses/{}", CourseId::random());

        let (status, body) = call(ports, with_bearer(actix_test::TestRequest::get().uri(&uri))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }

    #[actix_web::test]
    async fn malformed_course_ids_are_rejected() {
        let ports = TestPorts::authenticated(student());

        let (status, body) = call(
            ports,
            with_bearer(actix_test::TestRequest::get().uri("/api/v1/courses/not-a-uuid")),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["details"]["field"], "courseId");
    }

    #[actix_web::test]
    async fn course_structure_is_returned_in_camel_case() {
        let course = intro_course();
        let id = course.id;
        let mut ports = TestPorts::authenticated(student());
        ports
            .catalogue
            .expect_get_course()
            .withf(move |requested| *requested == id)
            .return_once(move |_| Ok(course));
        let uri = format!("/api/v1/courses/{id}");

        let (status, body) = call(ports, with_bearer(actix_test::TestRequest::get().uri(&uri))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["modules"][0]["lessons"][0]["videoId"], "vid-1");
    }
}
