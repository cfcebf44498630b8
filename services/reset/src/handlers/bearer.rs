//! `Authorization: Bearer` extractor for the reset token.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};

/// Bearer value from the request, if any. Missing or malformed headers yield
/// an empty token, which the use case rejects like any other bad token.
#[derive(Debug, Clone, Default)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    // Extract synchronously and return a 'static future. An `async fn` here
    // captures the `parts` lifetime and clashes with axum-core 0.5 (E0195).
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().trim().to_owned())
            .unwrap_or_default();
        async move { Ok(Self(token)) }
    }
}
