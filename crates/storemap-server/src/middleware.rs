use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// Longest caller-supplied id that is passed through unchanged.
const MAX_REQUEST_ID_LEN: usize = 64;

/// Correlation id for one request, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Caller id if it is short and made of token characters, else a fresh one.
fn pick_request_id(incoming: Option<&HeaderValue>) -> String {
    incoming
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_REQUEST_ID_LEN
                && id
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.'))
        })
        .map_or_else(|| Uuid::new_v4().to_string(), ToOwned::to_owned)
}

/// Tags every request with a [`RequestId`] and echoes it in the response.
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = pick_request_id(req.headers().get(&REQUEST_ID_HEADER));
    tracing::debug!(request_id = %id, path = %req.uri().path(), "request");
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        res.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_well_formed_caller_id() {
        let value = HeaderValue::from_static("abc-123_x.y");
        assert_eq!(pick_request_id(Some(&value)), "abc-123_x.y");
    }

    #[test]
    fn replaces_missing_or_odd_ids() {
        let generated = pick_request_id(None);
        assert!(Uuid::parse_str(&generated).is_ok());

        let spaced = HeaderValue::from_static("has space");
        assert!(Uuid::parse_str(&pick_request_id(Some(&spaced))).is_ok());

        let long = HeaderValue::from_str(&"a".repeat(MAX_REQUEST_ID_LEN + 1)).unwrap();
        assert!(Uuid::parse_str(&pick_request_id(Some(&long))).is_ok());
    }
}
