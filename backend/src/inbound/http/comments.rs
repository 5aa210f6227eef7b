//! Lesson Q&A endpoints.
//!
//! ```text
//! GET  /api/v1/courses/{courseId}/modules/{moduleIndex}/lessons/{lessonIndex}/comments
//! POST /api/v1/courses/{courseId}/modules/{moduleIndex}/lessons/{lessonIndex}/comments
//!      {"body":"Why does this move?","parentId":null}
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{LessonRef, PostCommentRequest};
use crate::domain::{CommentId, LessonComment, LessonPosition, Role};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::BearerAuth;
use crate::inbound::http::catalogue::course_id_from_path;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_uuid, require};

/// Path segments addressing one lesson.
#[derive(Debug, Deserialize)]
pub struct LessonPath {
    course_id: String,
    module_index: u32,
    lesson_index: u32,
}

impl LessonPath {
    fn parse(&self) -> ApiResult<LessonRef> {
        Ok(LessonRef {
            course_id: course_id_from_path(&self.course_id)?,
            position: LessonPosition::new(self.module_index, self.lesson_index),
        })
    }
}

/// Author block embedded in each comment.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthorBody {
    #[schema(format = Uuid)]
    pub user_id: String,
    pub display_name: String,
    pub role: Role,
}

/// Wire shape of a question or reply.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponseBody {
    #[schema(format = Uuid)]
    pub id: String,
    pub module_index: u32,
    pub lesson_index: u32,
    pub author: CommentAuthorBody,
    /// Question being answered; absent for top-level questions.
    #[schema(format = Uuid)]
    pub parent_id: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<LessonComment> for CommentResponseBody {
    fn from(comment: LessonComment) -> Self {
        Self {
            id: comment.id.to_string(),
            module_index: comment.position.module_index,
            lesson_index: comment.position.lesson_index,
            author: CommentAuthorBody {
                user_id: comment.author.user_id.to_string(),
                display_name: comment.author.display_name.into(),
                role: comment.author.role,
            },
            parent_id: comment.parent_id.map(|id| id.to_string()),
            body: comment.body.into(),
            created_at: comment.created_at,
        }
    }
}

/// Response payload for the comment listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommentListResponse {
    /// Oldest first.
    pub comments: Vec<CommentResponseBody>,
}

/// Request body for posting a question or reply.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PostCommentBody {
    pub body: Option<String>,
    /// Set to answer an existing question (admins only).
    #[schema(format = Uuid)]
    pub parent_id: Option<String>,
}

/// List the questions and replies on a lesson.
#[utoipa::path(
    get,
    path = "/api/v1/courses/{courseId}/modules/{moduleIndex}/lessons/{lessonIndex}/comments",
    params(
        ("courseId" = String, Path, description = "Course identifier", format = Uuid),
        ("moduleIndex" = u32, Path, description = "Zero-based module index"),
        ("lessonIndex" = u32, Path, description = "Zero-based lesson index")
    ),
    responses(
        (status = 200, description = "Lesson thread", body = CommentListResponse),
        (status = 400, description = "Malformed path", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 404, description = "Unknown course or lesson", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "listLessonComments",
    security(("BearerToken" = []))
)]
#[get("/courses/{course_id}/modules/{module_index}/lessons/{lesson_index}/comments")]
pub async fn list_comments(
    state: web::Data<HttpState>,
    _auth: BearerAuth,
    path: web::Path<LessonPath>,
) -> ApiResult<web::Json<CommentListResponse>> {
    let lesson = path.parse()?;
    let comments = state.comments.list_comments(lesson).await?;
    Ok(web::Json(CommentListResponse {
        comments: comments.into_iter().map(CommentResponseBody::from).collect(),
    }))
}

/// Ask a question on a lesson, or answer one as an admin.
#[utoipa::path(
    post,
    path = "/api/v1/courses/{courseId}/modules/{moduleIndex}/lessons/{lessonIndex}/comments",
    params(
        ("courseId" = String, Path, description = "Course identifier", format = Uuid),
        ("moduleIndex" = u32, Path, description = "Zero-based module index"),
        ("lessonIndex" = u32, Path, description = "Zero-based lesson index")
    ),
    request_body = PostCommentBody,
    responses(
        (status = 201, description = "Comment created", body = CommentResponseBody),
        (status = 400, description = "Missing or invalid body", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Only admins may reply", body = ErrorSchema),
        (status = 404, description = "Unknown lesson or parent", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["comments"],
    operation_id = "postLessonComment",
    security(("BearerToken" = []))
)]
#[post("/courses/{course_id}/modules/{module_index}/lessons/{lesson_index}/comments")]
pub async fn post_comment(
    state: web::Data<HttpState>,
    auth: BearerAuth,
    path: web::Path<LessonPath>,
    payload: web::Json<PostCommentBody>,
) -> ApiResult<HttpResponse> {
    let lesson = path.parse()?;
    let PostCommentBody { body, parent_id } = payload.into_inner();
    let body = require(body, FieldName::new("body"))?;
    let parent_id = parent_id
        .map(|raw| parse_uuid(&raw, FieldName::new("parentId")).map(CommentId::from_uuid))
        .transpose()?;
    let comment = state
        .comments_command
        .post_comment(PostCommentRequest {
            author: auth.into_user(),
            lesson,
            body,
            parent_id,
        })
        .await?;
    Ok(HttpResponse::Created().json(CommentResponseBody::from(comment)))
}
