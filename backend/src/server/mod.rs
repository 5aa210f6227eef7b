//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::{AppSettings, ServerConfig};

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use academy::Trace;
#[cfg(debug_assertions)]
use academy::doc::ApiDoc;
use academy::inbound::http::catalogue::{get_course, list_courses};
use academy::inbound::http::comments::{list_comments, post_comment};
use academy::inbound::http::error::{json_error_handler, path_error_handler};
use academy::inbound::http::health::{HealthState, live, ready};
use academy::inbound::http::progress::{get_progress, get_progress_summary, update_progress};
use academy::inbound::http::state::HttpState;
use academy::inbound::http::users::login;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
    } = deps;

    let api = web::scope("/api/v1")
        .service(login)
        .service(list_courses)
        .service(get_progress_summary)
        .service(get_progress)
        .service(get_course)
        .service(update_progress)
        .service(list_comments)
        .service(post_comment);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server from the resolved configuration.
///
/// Seeds the store when a seed document is configured, wires the adapters
/// selected by the presence of a database pool, binds the socket and marks
/// the process ready.
///
/// # Errors
/// Propagates [`std::io::Error`] when seeding, binding the socket or starting
/// the server fails.
pub async fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let (http_state, storage) = build_http_state(&config).await?;
    let health_state = web::Data::new(HealthState::new(storage));
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use academy::domain::ports::FixtureProgressCache;
    use academy::domain::{
        AuthService, CatalogueSeeder, CatalogueService, LessonCommentService, ProgressService,
        SeedDocument,
    };
    use academy::inbound::http::health::StorageMode;
    use academy::outbound::memory::{
        InMemoryAccessTokenRepository, InMemoryCourseRepository, InMemoryLessonCommentRepository,
        InMemoryProgressRepository, InMemoryUserRepository,
    };
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use mockable::DefaultClock;
    use serde_json::{Value, json};

    const SEED: &str = r#"{
        "courses": [{
            "slug": "rust-foundations",
            "title": "Rust Foundations",
            "modules": [{"title": "Ownership", "lessons": [{"title": "Moves"}, {"title": "Borrows"}]}]
        }],
        "users": [{"username": "ada", "displayName": "Ada Lovelace", "role": "student", "password": "engine"}]
    }"#;

    async fn seeded_state() -> HttpState {
        let clock = Arc::new(DefaultClock);
        let users = Arc::new(InMemoryUserRepository::new());
        let courses = Arc::new(InMemoryCourseRepository::new());
        CatalogueSeeder::new(courses.clone(), users.clone())
            .apply(&SeedDocument::from_json(SEED).expect("seed parses"))
            .await
            .expect("seed applies");
        let auth = Arc::new(AuthService::new(
            users.clone(),
            Arc::new(InMemoryAccessTokenRepository::new()),
            clock.clone(),
            chrono::Duration::hours(1),
        ));
        let progress = Arc::new(ProgressService::new(
            Arc::new(InMemoryProgressRepository::new()),
            courses.clone(),
            Arc::new(FixtureProgressCache),
            clock.clone(),
        ));
        let comments = Arc::new(LessonCommentService::new(
            Arc::new(InMemoryLessonCommentRepository::new()),
            courses.clone(),
            users,
            clock,
        ));
        HttpState {
            login: auth.clone(),
            tokens: auth,
            catalogue: Arc::new(CatalogueService::new(courses)),
            progress: progress.clone(),
            progress_command: progress,
            comments: comments.clone(),
            comments_command: comments,
        }
    }

    #[actix_web::test]
    async fn login_then_write_then_read_round_trip() {
        let app = actix_test::init_service(build_app(AppDependencies {
            health_state: web::Data::new(HealthState::new(StorageMode::Memory)),
            http_state: web::Data::new(seeded_state().await),
        }))
        .await;

        let login_response: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .set_json(json!({"username": "ada", "password": "engine"}))
                .to_request(),
        )
        .await;
        let bearer = format!(
            "Bearer {}",
            login_response["token"].as_str().expect("token string")
        );

        let courses: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/courses")
                .insert_header(("Authorization", bearer.clone()))
                .to_request(),
        )
        .await;
        let course_id = courses["courses"][0]["id"].as_str().expect("course id").to_owned();

        let write = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/progress")
                .insert_header(("Authorization", bearer.clone()))
                .set_json(json!({
                    "courseId": course_id,
                    "moduleIndex": 0,
                    "lessonIndex": 0,
                    "completed": true,
                }))
                .to_request(),
        )
        .await;
        assert_eq!(write.status(), StatusCode::OK);

        let summary: Value = actix_test::call_and_read_body_json(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/api/v1/courses/{course_id}/progress/summary"))
                .insert_header(("Authorization", bearer))
                .to_request(),
        )
        .await;
        assert_eq!(summary["overallPercent"], 50);
        assert_eq!(
            summary["resumeLesson"]["position"],
            json!({"moduleIndex": 0, "lessonIndex": 1})
        );
    }

    #[actix_web::test]
    async fn malformed_json_bodies_get_the_error_envelope() {
        let app = actix_test::init_service(build_app(AppDependencies {
            health_state: web::Data::new(HealthState::new(StorageMode::Memory)),
            http_state: web::Data::new(seeded_state().await),
        }))
        .await;

        let response = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/api/v1/login")
                .insert_header(("Content-Type", "application/json"))
                .set_payload("{not json")
                .to_request(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().contains_key("trace-id"));
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["code"], "malformed_body");
    }
}
