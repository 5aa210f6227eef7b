//! Bearer authentication for HTTP handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by resolving the
//! `Authorization` header into an authenticated user here.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::{AuthenticatedUser, Error};
use crate::inbound::http::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Extracts the raw token from an `Authorization: Bearer <token>` header.
fn bearer_token(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("login required"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("authorization header is not valid text"))?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("authorization header must carry a bearer token"))?;
    Ok(token.to_owned())
}

/// Authenticated caller resolved from a bearer token.
///
/// Missing, malformed, unknown and expired tokens all reject the request with
/// `401 Unauthorized` before the handler body runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerAuth(AuthenticatedUser);

impl BearerAuth {
    /// The caller's identity and role.
    pub fn user(&self) -> &AuthenticatedUser {
        &self.0
    }

    /// Consume the extractor, yielding the caller.
    pub fn into_user(self) -> AuthenticatedUser {
        self.0
    }
}

impl FromRequest for BearerAuth {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = bearer_token(req);
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        Box::pin(async move {
            let state =
                state.ok_or_else(|| Error::internal("HTTP state is not registered with the app"))?;
            let token = token?;
            match state.tokens.verify(&token).await? {
                Some(user) => Ok(Self(user)),
                None => {
                    debug!("rejected unknown or expired bearer token");
                    Err(Error::unauthorized("invalid or expired token").into())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::inbound::http::test_utils::{TestPorts, VALID_TOKEN, student};
    use actix_web::http::StatusCode;
    use actix_web::{App, HttpResponse, test as actix_test};
    use rstest::rstest;
    use serde_json::Value;

    async fn whoami(auth: BearerAuth) -> HttpResponse {
        HttpResponse::Ok().body(auth.user().user_id.to_string())
    }

    #[actix_web::test]
    async fn valid_tokens_resolve_the_caller() {
        let user = student();
        let expected = user.user_id.to_string();
        let state = TestPorts::authenticated(user).into_state();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let request = actix_test::TestRequest::get()
            .uri("/whoami")
            .insert_header((AUTHORIZATION, format!("Bearer {VALID_TOKEN}")))
            .to_request();
        let response = actix_test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(actix_test::read_body(response).await, expected);
    }

    #[rstest]
    #[case::missing(None)]
    #[case::wrong_scheme(Some("Basic YWRhOnB3"))]
    #[case::empty(Some("Bearer   "))]
    #[case::unknown(Some("Bearer stale-token"))]
    #[actix_web::test]
    async fn bad_credentials_are_unauthorised(#[case] header: Option<&'static str>) {
        let state = TestPorts::authenticated(student()).into_state();
        let app = actix_test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let mut request = actix_test::TestRequest::get().uri("/whoami");
        if let Some(value) = header {
            request = request.insert_header((AUTHORIZATION, value));
        }
        let response = actix_test::call_service(&app, request.to_request()).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body: Value = actix_test::read_body_json(response).await;
        assert_eq!(body["code"], "unauthorized");
    }

    #[test]
    fn bearer_token_trims_surrounding_space() {
        let req = actix_test::TestRequest::get()
            .insert_header((AUTHORIZATION, "Bearer  abc "))
            .to_http_request();
        assert_eq!(bearer_token(&req).ok().as_deref(), Some("abc"));
    }

    #[test]
    fn missing_header_reports_login_required() {
        let req = actix_test::TestRequest::get().to_http_request();
        let error = bearer_token(&req).expect_err("no header");
        assert_eq!(error.code(), ErrorCode::Unauthorized);
        assert_eq!(error.message(), "login required");
    }
}
