//! Request handlers: log what came in, answer with a fixed line.

use std::fmt::Write as _;

use axum::Router;
use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::IntoResponse;
use tracing::debug;

pub const GET_REPLY: &str = "GET request received";
pub const POST_REPLY: &str = "POST request received";

/// Every path goes to the same handler.
pub fn app() -> Router {
    Router::new().fallback(echo)
}

async fn echo(method: Method, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let reply = match method {
        Method::GET => GET_REPLY,
        Method::POST => POST_REPLY,
        _ => {
            return (StatusCode::METHOD_NOT_ALLOWED, [(header::ALLOW, "GET, POST")]).into_response();
        }
    };
    let body = (method == Method::POST).then_some(body.as_ref());
    print!("{}", render_request_log(&headers, body));
    debug!(%method, "replied");
    (StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], reply).into_response()
}

/// Headers, then for a POST the body length and the body itself.
pub fn render_request_log(headers: &HeaderMap, body: Option<&[u8]>) -> String {
    let mut out = String::from("Request Headers:\n");
    for (name, value) in headers {
        let _ = writeln!(out, "{}: {}", name, String::from_utf8_lossy(value.as_bytes()));
    }
    if let Some(body) = body {
        let _ = writeln!(out, "Request Body(len={}):", body.len());
        let _ = writeln!(out, "{}", String::from_utf8_lossy(body));
    }
    out
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    use super::*;

    async fn serve() -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app()).await.expect("serve");
        });
        addr
    }

    async fn exchange(addr: std::net::SocketAddr, request: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.expect("connect");
        stream.write_all(request.as_bytes()).await.expect("write");
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.expect("read");
        String::from_utf8(response).expect("utf8")
    }

    #[test]
    fn log_lists_headers_and_post_body() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost"));
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let log = render_request_log(&headers, Some(b"{\"a\":1}"));

        assert_eq!(
            log,
            "Request Headers:\nhost: localhost\ncontent-type: application/json\nRequest Body(len=7):\n{\"a\":1}\n"
        );
        assert!(!render_request_log(&headers, None).contains("Request Body"));
    }

    #[tokio::test]
    async fn post_is_acknowledged() {
        let addr = serve().await;
        let response = exchange(
            addr,
            "POST /chat HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: 7\r\nConnection: close\r\n\r\n{\"a\":1}",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
        assert!(response.contains("content-type: text/plain"), "{response}");
        assert!(response.ends_with(POST_REPLY), "{response}");
    }

    #[tokio::test]
    async fn get_on_any_path_is_acknowledged() {
        let addr = serve().await;
        let response = exchange(
            addr,
            "GET /any/path?q=1 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 200 OK\r\n"), "{response}");
        assert!(response.ends_with(GET_REPLY), "{response}");
    }

    #[tokio::test]
    async fn other_methods_are_rejected() {
        let addr = serve().await;
        let response = exchange(
            addr,
            "DELETE / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        )
        .await;
        assert!(response.starts_with("HTTP/1.1 405"), "{response}");
    }
}
