use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::convert::Infallible;
use tirebook_core::context::RequestContext;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Extracts a [`RequestContext`] stamped with the local clock.
///
/// A valid UUID in `x-request-id` is reused as the request id.
pub struct Ctx(pub RequestContext);

#[async_trait]
impl<S> FromRequestParts<S> for Ctx
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let mut ctx = RequestContext::from_local_clock();
        if let Some(id) = parts
            .headers
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v).ok())
        {
            ctx.request_id = id;
        }
        Ok(Ctx(ctx))
    }
}
