use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Query, State};
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use cs_client::{CsClient, CsConfig, CsError, UploadRequest};
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone)]
struct ReceivedPart {
    name: Option<String>,
    file_name: Option<String>,
    data: Vec<u8>,
}

#[derive(Debug, Default)]
struct Received {
    query: HashMap<String, String>,
    content_type: String,
    parts: Vec<ReceivedPart>,
}

type Shared = Arc<Mutex<Received>>;

async fn upload_handler(
    State(received): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Json<Value> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(String::from);
        let file_name = field.file_name().map(String::from);
        let data = field.bytes().await.unwrap().to_vec();
        parts.push(ReceivedPart { name, file_name, data });
    }

    let mut guard = received.lock().unwrap();
    guard.query = query;
    guard.content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    guard.parts = parts;

    Json(json!({ "media_id": "m-42", "type": "image", "created_at": 1700000000 }))
}

/// 起一个解析 multipart 的假微信服务
async fn start_multipart_server() -> (String, Shared) {
    let received: Shared = Arc::new(Mutex::new(Received::default()));
    let app = Router::new()
        .route("/cgi-bin/media/upload", post(upload_handler))
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), received)
}

#[tokio::test]
async fn upload_body_has_single_media_part_with_exact_bytes() {
    let (base, received) = start_multipart_server().await;

    // 包含 CRLF、"--" 和所有字节值，确认边界处理不破坏内容
    let mut image = b"\x89PNG\r\n\x1a\n--boundary\r\n".to_vec();
    image.extend(0u8..=255);

    let client = CsClient::new(CsConfig::with_api_base(base)).unwrap();
    let resp = client
        .upload_temp_media(&UploadRequest::new("tok-up", image.clone()))
        .await
        .unwrap();
    assert_eq!(resp.media_id, "m-42");

    let got = received.lock().unwrap();
    assert_eq!(got.query.get("access_token").map(String::as_str), Some("tok-up"));
    assert_eq!(got.query.get("type").map(String::as_str), Some("image"));
    assert!(got.content_type.starts_with("multipart/form-data; boundary="), "{}", got.content_type);

    assert_eq!(got.parts.len(), 1);
    let part = &got.parts[0];
    assert_eq!(part.name.as_deref(), Some("media"));
    assert_eq!(part.file_name.as_deref(), Some("temp.png"));
    assert_eq!(part.data, image);
}

#[tokio::test]
async fn upload_success_returns_response_unmodified() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/media/upload"))
        .and(query_param("access_token", "tok"))
        .and(query_param("type", "image"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "media_id": "abc123",
            "type": "image",
            "created_at": 1234567890
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = CsClient::new(CsConfig::with_api_base(server.uri())).unwrap();
    let resp = client
        .upload_temp_media(&UploadRequest::new("tok", vec![1, 2, 3]))
        .await
        .unwrap();

    assert_eq!(resp.media_id, "abc123");
    assert_eq!(resp.media_type, "image");
    assert_eq!(resp.created_at, 1234567890);
    assert!(resp.status.is_ok());
}

#[tokio::test]
async fn upload_remote_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/cgi-bin/media/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errcode": 40004,
            "errmsg": "invalid media type"
        })))
        .mount(&server)
        .await;

    let client = CsClient::new(CsConfig::with_api_base(server.uri())).unwrap();
    let err = client
        .upload_temp_media(&UploadRequest::new("tok", b"not an image".to_vec()))
        .await
        .unwrap_err();

    match err {
        CsError::Api { code, message } => {
            assert_eq!(code, 40004);
            assert_eq!(message, "invalid media type");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn upload_empty_body_is_decode_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let client = CsClient::new(CsConfig::with_api_base(server.uri())).unwrap();
    let err = client
        .upload_temp_media(&UploadRequest::new("tok", vec![0]))
        .await
        .unwrap_err();
    assert!(matches!(err, CsError::Decode(_)), "{err:?}");
}
