use parallel::{
    ChatMessage, ChatRequest, Client, Error, ExtractRequest, SearchRequest, TaskRunRequest,
    DEFAULT_BETA_TAG,
};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-api-key";

fn client_for(server: &MockServer) -> Client {
    Client::builder(API_KEY)
        .base_url(format!("{}/v1beta", server.uri()))
        .build()
        .unwrap()
}

#[tokio::test]
async fn search_decodes_response_and_sends_api_key_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/search"))
        .and(header("x-api-key", API_KEY))
        .and(header("parallel-beta", DEFAULT_BETA_TAG))
        .and(header("content-type", "application/json"))
        .and(body_partial_json(json!({
            "objective": "test objective",
            "search_queries": ["rust sdk"],
            "max_results": 3,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "search_id": "test-search-id",
            "results": [{"url": "https://example.com", "title": "Test Title", "excerpts": ["one"]}],
            "usage": [{"name": "sku_search", "count": 1}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client_for(&server)
        .search(SearchRequest {
            objective: "test objective".into(),
            search_queries: vec!["rust sdk".into()],
            max_results: 3,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(resp.search_id, "test-search-id");
    assert_eq!(resp.results.len(), 1);
    assert_eq!(resp.results[0].title, "Test Title");
    assert_eq!(resp.results[0].excerpts, vec!["one"]);
}

#[tokio::test]
async fn extract_decodes_results_and_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/extract"))
        .and(header("x-api-key", API_KEY))
        .and(header("parallel-beta", DEFAULT_BETA_TAG))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "extract_id": "test-extract-id",
            "results": [{"url": "https://example.com", "title": "Test Extract Title"}],
            "errors": [{"message": "fetch failed for https://broken.example"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client_for(&server)
        .extract(ExtractRequest {
            urls: vec!["https://example.com".into(), "https://broken.example".into()],
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(resp.extract_id, "test-extract-id");
    assert_eq!(resp.results[0].title, "Test Extract Title");
    assert!(resp.results[0].full_content.is_empty());
    assert_eq!(resp.errors[0].message, "fetch failed for https://broken.example");
}

#[tokio::test]
async fn run_task_returns_server_assigned_run_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/tasks/runs"))
        .and(header("x-api-key", API_KEY))
        .and(header("parallel-beta", DEFAULT_BETA_TAG))
        .and(body_partial_json(json!({"input": "test input", "processor": "base"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": {
                "run_id": "test-run-id",
                "status": "running",
                "created_at": "2025-10-10T09:30:00Z"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client_for(&server)
        .run_task(TaskRunRequest {
            input: "test input".into(),
            processor: "base".into(),
        })
        .await
        .unwrap();

    assert_eq!(resp.run_id(), "test-run-id");
    assert_eq!(resp.output.status, "running");
    assert!(resp.output.created_at.is_some());
    assert!(resp.output.completed_at.is_none());
}

#[tokio::test]
async fn get_task_uses_run_id_path_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1beta/tasks/runs/test-run-id"))
        .and(header("x-api-key", API_KEY))
        .and(header("parallel-beta", DEFAULT_BETA_TAG))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "run_id": "test-run-id",
            "status": "completed",
            "is_active": false,
            "output": {"answer": 42}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client_for(&server).get_task("test-run-id").await.unwrap();

    assert_eq!(resp.run_id, "test-run-id");
    assert_eq!(resp.status, "completed");
    assert_eq!(resp.output["answer"], 42);

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].url.path().ends_with("/tasks/runs/test-run-id"));
    assert!(requests[0].headers.get("content-type").is_none());
    assert!(requests[0].body.is_empty());
}

#[tokio::test]
async fn chat_uses_bearer_auth_and_round_trips_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/chat/completions"))
        .and(header("authorization", "Bearer test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "test-chat-id",
            "object": "chat.completion",
            "model": "test-model",
            "created": 1760000000,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Hello!"},
                "finish_reason": "stop"
            }],
            "usage": {"total_tokens": 12}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let request = ChatRequest {
        model: "test-model".into(),
        messages: vec![ChatMessage::user("Hi")],
        ..Default::default()
    };
    let resp = client_for(&server).chat(request.clone()).await.unwrap();

    assert_eq!(resp.id, "test-chat-id");
    assert_eq!(resp.created, 1760000000);
    assert_eq!(resp.choices[0].message, ChatMessage::new("assistant", "Hello!"));
    assert_eq!(resp.usage.unwrap()["total_tokens"], 12);

    let requests = server.received_requests().await.unwrap();
    let sent: ChatRequest = requests[0].body_json().unwrap();
    assert_eq!(sent, request);
    assert!(requests[0].headers.get("x-api-key").is_none());
    assert!(requests[0].headers.get("parallel-beta").is_none());
}

#[tokio::test]
async fn non_success_status_formats_api_error_for_every_operation() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .expect(5)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let expected = "API error: 401 Unauthorized — invalid api key";

    let errors = vec![
        client.search(SearchRequest::default()).await.unwrap_err(),
        client.extract(ExtractRequest::default()).await.unwrap_err(),
        client.run_task(TaskRunRequest::default()).await.unwrap_err(),
        client.get_task("test-run-id").await.unwrap_err(),
        client.chat(ChatRequest::default()).await.unwrap_err(),
    ];

    for err in errors {
        assert_eq!(err.to_string(), expected);
        assert!(matches!(err, Error::Api { .. }));
        assert_eq!(err.status().map(|s| s.as_u16()), Some(401));
    }
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .search(SearchRequest::default())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Decode(_)));
    assert!(!err.is_transport());
}

#[tokio::test]
async fn unreachable_host_is_a_transport_failure() {
    let client = Client::builder(API_KEY)
        .base_url("http://127.0.0.1:1/v1beta")
        .build()
        .unwrap();

    let err = client.get_task("test-run-id").await.unwrap_err();
    assert!(err.is_transport(), "unexpected error: {err}");
}

#[tokio::test]
async fn requests_carry_sdk_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"run_id": "r"})))
        .mount(&server)
        .await;

    let client = Client::builder(API_KEY)
        .base_url(format!("{}/v1beta", server.uri()))
        .user_agent_suffix("tests/1.0")
        .build()
        .unwrap();
    client.get_task("r").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let ua = requests[0].headers.get("user-agent").unwrap().to_str().unwrap();
    assert!(ua.starts_with("Parallel-SDK-Rust/"));
    assert!(ua.ends_with("tests/1.0"));
}

#[tokio::test]
async fn shared_client_serves_concurrent_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"search_id": "s"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1beta/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c"})))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let other = client.clone();
    let (search, chat) = tokio::join!(
        client.search(SearchRequest::default()),
        tokio::spawn(async move { other.chat(ChatRequest::default()).await }),
    );

    assert_eq!(search.unwrap().search_id, "s");
    assert_eq!(chat.unwrap().unwrap().id, "c");
}

#[tokio::test]
async fn null_fields_decode_as_empty_values() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/extract"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "extract_id": "test-extract-id",
            "results": [{
                "url": "https://example.com",
                "title": null,
                "excerpts": null,
                "full_content": null
            }],
            "errors": null
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/tasks/runs/test-run-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "run_id": "test-run-id",
            "status": "running",
            "is_active": null,
            "processor": null,
            "taskgroup_id": null
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let resp = client
        .extract(ExtractRequest {
            urls: vec!["https://example.com".into()],
            excerpts: true,
            full_content: false,
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(resp.extract_id, "test-extract-id");
    assert_eq!(resp.results[0].url, "https://example.com");
    assert!(resp.results[0].title.is_empty());
    assert!(resp.results[0].excerpts.is_empty());
    assert!(resp.results[0].full_content.is_empty());
    assert!(resp.errors.is_empty());

    let task = client.get_task("test-run-id").await.unwrap();
    assert!(!task.is_active);
    assert!(task.processor.is_empty());
    assert!(task.task_group_id.is_none());
}

#[tokio::test]
async fn get_task_encodes_run_id_as_one_segment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"run_id": "run/1?x=2"})))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client_for(&server).get_task("run/1?x=2").await.unwrap();
    assert_eq!(resp.run_id, "run/1?x=2");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.path(), "/v1beta/tasks/runs/run%2F1%3Fx=2");
    assert!(requests[0].url.query().is_none());
}

#[tokio::test]
async fn empty_run_id_is_rejected_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client_for(&server).get_task("").await.unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

/// Serve one connection that announces a 100-byte body and then hangs up.
async fn truncated_body_server(status_line: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let response = format!("{status_line}\r\nContent-Length: 100\r\n\r\npartial");
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
    });
    format!("http://{}/v1beta", addr)
}

#[tokio::test]
async fn truncated_error_body_keeps_the_status() {
    let base_url = truncated_body_server("HTTP/1.1 503 Service Unavailable").await;
    let client = Client::builder(API_KEY).base_url(base_url).build().unwrap();

    let err = client.get_task("test-run-id").await.unwrap_err();

    assert!(matches!(err, Error::Body { .. }), "unexpected error: {err}");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(503));
    assert!(err.to_string().starts_with("read response body (503 Service Unavailable)"));
    assert!(err.is_transport());
}

#[tokio::test]
async fn truncated_success_body_keeps_the_status() {
    let base_url = truncated_body_server("HTTP/1.1 200 OK").await;
    let client = Client::builder(API_KEY).base_url(base_url).build().unwrap();

    let err = client.get_task("test-run-id").await.unwrap_err();

    assert!(matches!(err, Error::Body { .. }), "unexpected error: {err}");
    assert_eq!(err.status().map(|s| s.as_u16()), Some(200));
}
