use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the server saw, sent back as JSON.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    /// Lower-cased names. Repeated headers are joined with `", "`.
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Echo {
    fn capture(method: &Method, uri: &Uri, headers: &HeaderMap, body: &[u8]) -> Self {
        let mut collected: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in headers {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            collected
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        Self {
            method: method.as_str().to_string(),
            path: uri.path().to_string(),
            query: uri.query().map(str::to_string),
            headers: collected,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

/// `café` in ISO-8859-1.
pub const LATIN1_GREETING: &[u8] = &[0x63, 0x61, 0x66, 0xE9];

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/status/{code}", any(status))
        .route("/latin1", get(latin1))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let echo = Echo::capture(&method, &uri, &headers, &body);
    tracing::debug!(method = %echo.method, path = %echo.path, "echo");
    Json(echo)
}

/// Reply with the requested status and no body.
async fn status(Path(code): Path<u16>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST)
}

async fn latin1() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=iso-8859-1")],
        LATIN1_GREETING,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_joins_repeated_headers() {
        let mut headers = HeaderMap::new();
        headers.append("x-tag", "a".parse().unwrap());
        headers.append("x-tag", "b".parse().unwrap());
        headers.insert(header::ACCEPT, "*/*".parse().unwrap());

        let uri: Uri = "/echo/items?page=2".parse().unwrap();
        let echo = Echo::capture(&Method::PATCH, &uri, &headers, b"x=1");

        assert_eq!(echo.method, "PATCH");
        assert_eq!(echo.path, "/echo/items");
        assert_eq!(echo.query.as_deref(), Some("page=2"));
        assert_eq!(echo.headers["x-tag"], "a, b");
        assert_eq!(echo.headers["accept"], "*/*");
        assert_eq!(echo.body, "x=1");
    }

    #[test]
    fn echo_serializes_without_query_as_null() {
        let echo = Echo::capture(&Method::GET, &"/echo".parse().unwrap(), &HeaderMap::new(), b"");
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["query"], serde_json::Value::Null);
        assert_eq!(json["body"], "");
    }
}
