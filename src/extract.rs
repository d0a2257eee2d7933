//! Request extractors whose rejections render through [`ApiError`].
//!
//! axum's own `Json`, `Form`, `Query` and `Path` reject with plain-text
//! bodies and a mix of 400/415/422. These wrappers keep the same parsing and
//! turn every rejection into a 422 with the usual JSON error body.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

pub struct ValidForm<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidForm<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

pub struct ValidPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
        routing::{get, post},
        Router,
    };
    use serde::Deserialize;
    use tower::ServiceExt;
    use uuid::Uuid;

    #[derive(Deserialize)]
    struct Page {
        limit: i64,
    }

    #[derive(Deserialize)]
    struct Named {
        name: String,
    }

    fn router() -> Router {
        Router::new()
            .route(
                "/items/:id",
                get(|ValidPath(id): ValidPath<Uuid>| async move { id.to_string() }),
            )
            .route(
                "/items",
                get(|ValidQuery(p): ValidQuery<Page>| async move { p.limit.to_string() })
                    .post(|ValidJson(n): ValidJson<Named>| async move { n.name }),
            )
            .route(
                "/form",
                post(|ValidForm(n): ValidForm<Named>| async move { n.name }),
            )
    }

    async fn send(req: Request<Body>) -> Response {
        router().oneshot(req).await.expect("infallible")
    }

    async fn assert_validation_error(resp: Response) {
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let body: serde_json::Value = serde_json::from_slice(&bytes).expect("json body");
        assert_eq!(body["error"]["code"], 422);
        assert!(body["error"]["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[tokio::test]
    async fn bad_path_segment_is_a_validation_error() {
        let req = Request::get("/items/123").body(Body::empty()).unwrap();
        assert_validation_error(send(req).await).await;
    }

    #[tokio::test]
    async fn non_numeric_query_value_is_a_validation_error() {
        let req = Request::get("/items?limit=abc").body(Body::empty()).unwrap();
        assert_validation_error(send(req).await).await;
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let req = Request::post("/items")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"name\": "))
            .unwrap();
        assert_validation_error(send(req).await).await;
    }

    #[tokio::test]
    async fn json_without_content_type_is_a_validation_error() {
        let req = Request::post("/items")
            .body(Body::from("{\"name\": \"x\"}"))
            .unwrap();
        assert_validation_error(send(req).await).await;
    }

    #[tokio::test]
    async fn form_missing_field_is_a_validation_error() {
        let req = Request::post("/form")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("other=1"))
            .unwrap();
        assert_validation_error(send(req).await).await;
    }

    #[tokio::test]
    async fn well_formed_input_passes_through() {
        let id = Uuid::new_v4();
        let resp = send(Request::get(format!("/items/{id}")).body(Body::empty()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = send(Request::get("/items?limit=5").body(Body::empty()).unwrap()).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
