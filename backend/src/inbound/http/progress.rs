//! Lesson progress endpoints.
//!
//! ```text
//! GET  /api/v1/courses/{courseId}/progress
//! GET  /api/v1/courses/{courseId}/progress/summary
//! POST /api/v1/progress {"courseId":"…","moduleIndex":0,"lessonIndex":2,"completed":true}
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{CacheStatus, ProgressRequest, UpdateProgressRequest};
use crate::domain::{CourseId, EnrollmentOutcome, LessonPosition, ProgressRecord, ProgressSummary};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::BearerAuth;
use crate::inbound::http::cache_control::{private_no_store_header, x_cache_header};
use crate::inbound::http::catalogue::course_id_from_path;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid, require};

/// Wire shape of one progress record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecordBody {
    pub module_index: u32,
    pub lesson_index: u32,
    pub completed: bool,
    /// Set while the lesson is complete, cleared when it is unmarked.
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProgressRecord> for ProgressRecordBody {
    fn from(record: ProgressRecord) -> Self {
        Self {
            module_index: record.position.module_index,
            lesson_index: record.position.lesson_index,
            completed: record.completed,
            completed_at: record.completed_at,
            updated_at: record.updated_at,
        }
    }
}

fn progress_bodies(records: Vec<ProgressRecord>) -> Vec<ProgressRecordBody> {
    records.into_iter().map(ProgressRecordBody::from).collect()
}

/// Cache provenance reported in the body alongside `X-Cache`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatusBody {
    Hit,
    Miss,
}

impl From<CacheStatus> for CacheStatusBody {
    fn from(status: CacheStatus) -> Self {
        match status {
            CacheStatus::Hit => Self::Hit,
            CacheStatus::Miss => Self::Miss,
        }
    }
}

/// Response payload for `GET /api/v1/courses/{courseId}/progress`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressResponse {
    /// Every record of the caller's enrollment, ordered by position.
    pub progress: Vec<ProgressRecordBody>,
    pub cache_status: CacheStatusBody,
    /// `created` when this read enrolled the caller.
    pub enrollment: EnrollmentOutcome,
}

/// Request body for `POST /api/v1/progress`.
///
/// Fields are optional on the wire so a missing one is reported by name
/// instead of as a generic deserialisation failure.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressBody {
    #[schema(format = Uuid)]
    pub course_id: Option<String>,
    pub module_index: Option<u32>,
    pub lesson_index: Option<u32>,
    pub completed: Option<bool>,
}

/// Fields checked in wire order; the first absent one is reported.
struct ValidatedUpdate {
    course_id: CourseId,
    position: LessonPosition,
    completed: bool,
}

impl TryFrom<UpdateProgressBody> for ValidatedUpdate {
    type Error = crate::domain::Error;

    fn try_from(body: UpdateProgressBody) -> Result<Self, Self::Error> {
        let course_field = FieldName::new("courseId");
        let raw_course = require(body.course_id, course_field)?;
        let module_index = require(body.module_index, FieldName::new("moduleIndex"))?;
        let lesson_index = require(body.lesson_index, FieldName::new("lessonIndex"))?;
        let completed = require(body.completed, FieldName::new("completed"))?;
        let course_id = CourseId::from_uuid(parse_uuid(&raw_course, course_field)?);
        Ok(Self {
            course_id,
            position: LessonPosition::new(module_index, lesson_index),
            completed,
        })
    }
}

/// Response payload for `POST /api/v1/progress`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProgressResponseBody {
    /// The full updated record list for the enrollment.
    pub progress: Vec<ProgressRecordBody>,
}

/// Read the caller's progress for a course, enrolling them on first read.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{courseId}/progress",
    params(("courseId" = String, Path, description = "Course identifier", format = Uuid)),
    responses(
        (
            status = 200,
            description = "Progress records",
            headers(("X-Cache" = String, description = "HIT when served from the progress cache, MISS otherwise")),
            body = ProgressResponse
        ),
        (status = 400, description = "Malformed course id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown course", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "getProgress",
    security(("BearerToken" = []))
)]
#[get("/courses/{course_id}/progress")]
pub async fn get_progress(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let course_id = course_id_from_path(&path)?;
    let view = state
        .progress
        .get_progress(ProgressRequest {
            user_id: auth.into_user().user_id,
            course_id,
        })
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .insert_header(x_cache_header(view.cache_status))
        .json(ProgressResponse {
            progress: progress_bodies(view.records),
            cache_status: view.cache_status.into(),
            enrollment: view.enrollment,
        }))
}

/// Dashboard summary: overall percentage, module completion and resume lesson.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{courseId}/progress/summary",
    params(("courseId" = String, Path, description = "Course identifier", format = Uuid)),
    responses(
        (status = 200, description = "Progress summary", body = ProgressSummary),
        (status = 400, description = "Malformed course id", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown course", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "getProgressSummary",
    security(("BearerToken" = []))
)]
#[get("/courses/{course_id}/progress/summary")]
pub async fn get_progress_summary(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let course_id = course_id_from_path(&path)?;
    let summary = state
        .progress
        .get_summary(ProgressRequest {
            user_id: auth.into_user().user_id,
            course_id,
        })
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(summary))
}

/// Mark one lesson complete or incomplete.
#[utoipa::path(
    post,
    path = "/api/v1/progress",
    request_body = UpdateProgressBody,
    responses(
        (status = 200, description = "Updated progress list", body = UpdateProgressResponseBody),
        (status = 400, description = "Missing field or lesson outside the course", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown course", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["progress"],
    operation_id = "updateProgress",
    security(("BearerToken" = []))
)]
#[post("/progress")]
pub async fn update_progress(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    payload: web::Json<UpdateProgressBody>,
) -> ApiResult<HttpResponse> {
    let ValidatedUpdate {
        course_id,
        position,
        completed,
    } = ValidatedUpdate::try_from(payload.into_inner())?;
    let updated = state
        .progress_command
        .update_progress(UpdateProgressRequest {
            user_id: auth.into_user().user_id,
            course_id,
            position,
            completed,
        })
        .await?;
    Ok(HttpResponse::Ok()
        .insert_header(private_no_store_header())
        .json(UpdateProgressResponseBody {
            progress: progress_bodies(updated.records),
        }))
}

#[cfg(test)]
#[path = "progress_tests.rs"]
mod tests;
