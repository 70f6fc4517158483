//! Dynamic request body binding.
//!
//! Ordinary body extraction deserializes into a type fixed at compile time.
//! Here the concrete record type is decided per request, from the `entity`
//! path parameter, after route matching but before the body is consumed. The
//! binder is an explicit two-phase pipeline stage: resolve the target type,
//! then deserialize and validate the payload against it, all before the
//! handler runs.

use crate::dispatch::DynRecord;
use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use std::collections::HashMap;

/// A request body bound to the record type named in the URL.
pub struct BoundRecord {
    /// Registered entity name the body was deserialized against.
    pub entity: &'static str,
    pub record: DynRecord,
}

/// Extractor for an optional entity body: an empty body short-circuits to
/// `None` without attempting deserialization. Malformed JSON and validation
/// failures still reject the request.
pub struct MaybeEntityBody(pub Option<BoundRecord>);

/// Extractor for a required entity body.
pub struct EntityBody(pub BoundRecord);

#[async_trait]
impl FromRequest<AppState> for MaybeEntityBody {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(&mut parts, state)
            .await
            .map_err(|_| AppError::BadRequest("missing entity path parameter".to_string()))?;
        let name = params
            .get("entity")
            .ok_or_else(|| AppError::BadRequest("missing entity path parameter".to_string()))?;
        // Resolve the concrete type before touching the body.
        let entry = state.registry.resolve(name)?;

        let req = Request::from_parts(parts, body);
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| AppError::MalformedBody(e.to_string()))?;
        if bytes.is_empty() {
            return Ok(MaybeEntityBody(None));
        }

        let record = entry.parse(&bytes)?;
        let violations = entry.validate(&record);
        if !violations.is_empty() {
            return Err(AppError::Validation(violations));
        }
        Ok(MaybeEntityBody(Some(BoundRecord {
            entity: entry.meta.name,
            record,
        })))
    }
}

#[async_trait]
impl FromRequest<AppState> for EntityBody {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        match MaybeEntityBody::from_request(req, state).await? {
            MaybeEntityBody(Some(bound)) => Ok(EntityBody(bound)),
            MaybeEntityBody(None) => {
                Err(AppError::MalformedBody("request body is required".to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{test_state, Note};
    use axum::body::Body;
    use axum::http::{Request as HttpRequest, StatusCode};
    use axum::routing::post;
    use axum::Router;
    use tower::ServiceExt;

    // The binder reads path parameters planted by the router, so it is
    // exercised through a minimal Router rather than called directly.
    async fn bound(body: EntityBody) -> String {
        let note = body.0.record.downcast::<Note>().expect("note body");
        format!("{}:{}", body.0.entity, note.description.unwrap_or_default())
    }

    async fn maybe_bound(body: MaybeEntityBody) -> String {
        match body.0 {
            Some(b) => format!("some:{}", b.entity),
            None => "none".to_string(),
        }
    }

    fn router() -> Router {
        Router::new()
            .route("/web/:entity", post(bound))
            .route("/maybe/:entity", post(maybe_bound))
            .with_state(test_state())
    }

    fn post_req(uri: &str, body: &str) -> HttpRequest<Body> {
        HttpRequest::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_string(resp: axum::response::Response) -> String {
        use http_body_util::BodyExt;
        let bytes = resp.into_body().collect().await.expect("body").to_bytes();
        String::from_utf8(bytes.to_vec()).expect("utf8")
    }

    #[tokio::test]
    async fn binds_body_against_resolved_type() {
        let resp = router()
            .oneshot(post_req("/web/note", r#"{"description":"hi"}"#))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "note:hi");
    }

    #[tokio::test]
    async fn unknown_entity_rejects_before_body_parse() {
        let resp = router()
            .oneshot(post_req("/web/ghost", "this is not even json"))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert!(body_string(resp).await.contains("unknown_entity"));
    }

    #[tokio::test]
    async fn malformed_json_is_a_client_error() {
        let resp = router()
            .oneshot(post_req("/web/note", r#"{"description":"#))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(resp).await.contains("malformed_body"));
    }

    #[tokio::test]
    async fn validation_violations_reject_before_the_handler() {
        let long = "x".repeat(300);
        let body = format!(r#"{{"description":"{}"}}"#, long);
        let resp = router()
            .oneshot(post_req("/web/note", &body))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_string(resp).await;
        assert!(body.contains("validation_error"));
        assert!(body.contains("description"));
    }

    #[tokio::test]
    async fn empty_body_short_circuits_optional_binding() {
        let resp = router()
            .oneshot(post_req("/maybe/note", ""))
            .await
            .expect("response");
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_string(resp).await, "none");
    }

    #[tokio::test]
    async fn empty_body_rejects_required_binding() {
        let resp = router().oneshot(post_req("/web/note", "")).await.expect("response");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(resp).await.contains("required"));
    }
}
