//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint from the inbound layer together
//! with the bearer-token security scheme. Response DTOs are collected from the
//! path annotations; the error envelope is registered explicitly through
//! [`ErrorSchema`] because the domain error type is not annotated for utoipa.
//!
//! The document backs Swagger UI in debug builds and is exported with
//! `cargo run --bin openapi-dump`.

use crate::inbound::http::health::{HealthBody, StorageMode};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the security scheme referenced by authenticated paths.
pub const BEARER_SCHEME: &str = "BearerToken";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .description(Some("Opaque token issued by POST /api/v1/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Academy backend API",
        description = "Course catalogue, lesson progress, resume points and lesson comments.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::login,
        crate::inbound::http::catalogue::list_courses,
        crate::inbound::http::catalogue::get_course,
        crate::inbound::http::progress::get_progress,
        crate::inbound::http::progress::get_progress_summary,
        crate::inbound::http::progress::update_progress,
        crate::inbound::http::comments::list_comments,
        crate::inbound::http::comments::post_comment,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(ErrorSchema, ErrorCodeSchema, HealthBody, StorageMode)),
    tags(
        (name = "auth", description = "Token issuance"),
        (name = "catalogue", description = "Course structure lookups"),
        (name = "progress", description = "Lesson completion and resume points"),
        (name = "comments", description = "Per-lesson questions and answers"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
