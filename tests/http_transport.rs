//! The reqwest transport against a minimal local HTTP server.

use document_throttle::{Document, DocumentSubmitter, Product, SignaturePlacement, SubmitError};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request as seen on the wire: lowercased head, raw body.
struct CapturedRequest {
    head: String,
    body: String,
}

fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Accept one connection, capture the request, answer with `status` and `body`.
async fn serve_once(
    status: &'static str,
    body: &'static str,
) -> (SocketAddr, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        let (head_len, content_length) = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before request head");
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = header_end(&buf) {
                let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .map(|value| value.trim().parse::<usize>().unwrap())
                    .unwrap_or(0);
                break (end, length);
            }
        };

        let body_start = head_len + 4;
        while buf.len() < body_start + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before request body");
            buf.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;

        CapturedRequest {
            head: String::from_utf8_lossy(&buf[..head_len]).to_lowercase(),
            body: String::from_utf8_lossy(&buf[body_start..body_start + content_length])
                .into_owned(),
        }
    });

    (addr, handle)
}

fn document() -> Document {
    Document {
        doc_id: Some("12345".to_string()),
        doc_status: Some("ACTIVE".to_string()),
        import_request: true,
        ..Document::default()
    }
    .with_product(Product {
        uit_code: Some("uit".to_string()),
        tnved_code: Some("tnved".to_string()),
        ..Product::default()
    })
}

#[tokio::test]
async fn test_posts_json_with_signature_header() {
    let (addr, server) = serve_once("200 OK", "").await;

    let submitter = DocumentSubmitter::builder()
        .with_endpoint(format!("http://{}/api/v3/lk/documents/create", addr))
        .with_signature_placement(SignaturePlacement::Header("Signature".to_string()))
        .with_auto_replenish(false)
        .build()
        .unwrap();

    let doc = document();
    submitter.submit(&doc, "signature_value").await.unwrap();

    let request = server.await.unwrap();
    assert!(request
        .head
        .starts_with("post /api/v3/lk/documents/create http/1.1"));
    assert!(request.head.contains("content-type: application/json"));
    assert!(request.head.contains("signature: signature_value"));
    assert_eq!(Document::from_json(&request.body).unwrap(), doc);
    assert_eq!(submitter.metrics().submissions_accepted(), 1);
}

#[tokio::test]
async fn test_signature_omitted_by_default() {
    let (addr, server) = serve_once("200 OK", "").await;

    let submitter = DocumentSubmitter::builder()
        .with_endpoint(format!("http://{}/documents", addr))
        .with_auto_replenish(false)
        .build()
        .unwrap();

    submitter.submit(&document(), "signature_value").await.unwrap();

    let request = server.await.unwrap();
    assert!(!request.head.contains("signature_value"));
    assert!(!request.body.contains("signature_value"));
}

#[tokio::test]
async fn test_server_error_becomes_rejection() {
    let (addr, server) = serve_once("500 Internal Server Error", "quota exceeded").await;

    let submitter = DocumentSubmitter::builder()
        .with_endpoint(format!("http://{}/documents", addr))
        .with_capacity(10)
        .with_auto_replenish(false)
        .build()
        .unwrap();

    let result = submitter.submit(&document(), "sig").await;
    server.await.unwrap();

    assert_eq!(
        result,
        Err(SubmitError::Rejected {
            status: 500,
            body: "quota exceeded".to_string(),
        })
    );
    assert_eq!(submitter.gate().available(), 9);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    // Bind and drop to get a port with nothing listening on it.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let submitter = DocumentSubmitter::builder()
        .with_endpoint(format!("http://{}/documents", addr))
        .with_auto_replenish(false)
        .build()
        .unwrap();

    let result = submitter.submit(&document(), "sig").await;
    assert!(matches!(result, Err(SubmitError::Transport(_))));
    assert_eq!(submitter.metrics().transport_failures(), 1);
}
