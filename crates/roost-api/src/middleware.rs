use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

/// Bearer token pulled from the Authorization header. The core validates
/// it; a missing or malformed header simply yields a token the core cannot
/// resolve, so the failure surfaces with the usual invalid-token error.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or_default();
        Ok(BearerToken(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn extract(req: axum::http::Request<()>) -> String {
        let (mut parts, _) = req.into_parts();
        let BearerToken(token) = BearerToken::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        token
    }

    #[tokio::test]
    async fn strips_bearer_prefix() {
        let req = axum::http::Request::builder()
            .header("authorization", "Bearer abc.def.ghi")
            .body(())
            .unwrap();
        assert_eq!(extract(req).await, "abc.def.ghi");
    }

    #[tokio::test]
    async fn missing_or_malformed_header_yields_empty_token() {
        let req = axum::http::Request::builder().body(()).unwrap();
        assert_eq!(extract(req).await, "");

        let req = axum::http::Request::builder()
            .header("authorization", "Basic dXNlcg==")
            .body(())
            .unwrap();
        assert_eq!(extract(req).await, "");
    }
}
