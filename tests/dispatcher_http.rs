//! HTTP tests for the OpenAI dispatcher against a mocked server.
//!
//! The dispatcher blocks on its own runtime, so the mock server is started
//! on a separate runtime and the dispatcher is called from the plain test
//! thread.

use std::time::Duration;

use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use codeassist::{
    CodeAssistant, Dispatcher, OpenAiDispatcher, PromptRequest, RefactorStyle, RemoteCallError,
};

// ============= Helper Functions =============

fn chat_response(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn start_server(rt: &Runtime, response: ResponseTemplate) -> MockServer {
    rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(response)
            .mount(&server)
            .await;
        server
    })
}

fn dispatcher_for(server: &MockServer) -> OpenAiDispatcher {
    OpenAiDispatcher::new("sk-test", "gpt-4").with_api_base(format!("{}/v1", server.uri()))
}

// ============= Tests =============

#[test]
fn test_successful_completion() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        ResponseTemplate::new(200).set_body_json(chat_response("It adds two numbers.")),
    );
    let dispatcher = dispatcher_for(&server);

    let text = dispatcher
        .dispatch(&PromptRequest::explain("def add(a, b): return a + b"))
        .expect("request should succeed");
    assert_eq!(text, "It adds two numbers.");

    let requests = rt.block_on(server.received_requests()).unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "gpt-4");
    assert_eq!(body["max_tokens"], 500);
    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(body["messages"][0]["content"], "You are a patient coding instructor.");
    assert_eq!(body["messages"][1]["role"], "user");
    assert!(body["messages"][1]["content"]
        .as_str()
        .unwrap()
        .contains("def add(a, b): return a + b"));
    let temperature = body["temperature"].as_f64().unwrap();
    assert!((temperature - 0.6).abs() < 1e-6);
}

#[test]
fn test_rate_limited() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt, ResponseTemplate::new(429));

    let err = dispatcher_for(&server)
        .dispatch(&PromptRequest::document("x = 1"))
        .unwrap_err();
    assert!(matches!(err, RemoteCallError::RateLimited));
}

#[test]
fn test_auth_failure_carries_status_and_body() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        ResponseTemplate::new(401).set_body_string(r#"{"error":{"message":"Incorrect API key"}}"#),
    );

    let err = dispatcher_for(&server)
        .dispatch(&PromptRequest::document("x = 1"))
        .unwrap_err();
    assert!(err.is_auth());
    match err {
        RemoteCallError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Incorrect API key"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[test]
fn test_malformed_body_is_invalid_response() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt, ResponseTemplate::new(200).set_body_string("<html>"));

    let err = dispatcher_for(&server)
        .dispatch(&PromptRequest::explain("x"))
        .unwrap_err();
    assert!(matches!(err, RemoteCallError::InvalidResponse(_)));
}

#[test]
fn test_no_choices_is_empty_response() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })),
    );

    let err = dispatcher_for(&server)
        .dispatch(&PromptRequest::explain("x"))
        .unwrap_err();
    assert!(matches!(err, RemoteCallError::EmptyResponse));
}

#[test]
fn test_slow_server_times_out() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        ResponseTemplate::new(200)
            .set_body_json(chat_response("late"))
            .set_delay(Duration::from_millis(500)),
    );

    let err = dispatcher_for(&server)
        .with_timeout(Duration::from_millis(50))
        .dispatch(&PromptRequest::explain("x"))
        .unwrap_err();
    assert!(matches!(err, RemoteCallError::Timeout), "got {:?}", err);
}

#[test]
fn test_unreachable_server_is_network_error() {
    let dispatcher = OpenAiDispatcher::new("sk-test", "gpt-4").with_api_base("http://127.0.0.1:1/v1");
    let err = dispatcher.dispatch(&PromptRequest::explain("x")).unwrap_err();
    assert!(matches!(err, RemoteCallError::Network(_)), "got {:?}", err);
}

#[test]
fn test_assistant_over_http_falls_back() {
    let rt = Runtime::new().unwrap();
    let server = start_server(&rt, ResponseTemplate::new(500).set_body_string("boom"));
    let assistant = CodeAssistant::with_dispatcher(dispatcher_for(&server));

    let code = "def calc(x,y,z):\n    return (x+y)*z\n";
    assert_eq!(assistant.refactor(code, RefactorStyle::CleanCode), code);
    assert_eq!(assistant.explain(code), "");

    let reports = assistant.analyze("try:\n    x = 1\nexcept:\n    pass");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].line_number, 3);
}

#[test]
fn test_assistant_over_http_refactor() {
    let rt = Runtime::new().unwrap();
    let server = start_server(
        &rt,
        ResponseTemplate::new(200)
            .set_body_json(chat_response("```python\ndef calc(x, y, z):\n    return (x + y) * z\n```")),
    );
    let assistant = CodeAssistant::with_dispatcher(dispatcher_for(&server));

    let refactored = assistant.refactor("def calc(x,y,z): return (x+y)*z", RefactorStyle::CleanCode);
    assert_eq!(refactored, "def calc(x, y, z):\n    return (x + y) * z");
}

// ============= Calls from async code =============

#[tokio::test]
async fn test_total_forms_inside_async_runtime() {
    let dispatcher = OpenAiDispatcher::new("sk-test", "gpt-4").with_api_base("http://127.0.0.1:1/v1");
    let assistant = CodeAssistant::with_dispatcher(dispatcher);

    assert_eq!(assistant.explain("x"), "");
    assert_eq!(assistant.document("x"), "");
    assert!(assistant.complete("def f():", 2).is_empty());
    assert_eq!(assistant.refactor("x = 1", RefactorStyle::CleanCode), "x = 1");

    let reports = assistant.analyze("try:\n    x = 1\nexcept:\n    pass");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].line_number, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_dispatch_inside_async_runtime_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_response("from async")))
        .mount(&server)
        .await;

    let assistant = CodeAssistant::with_dispatcher(dispatcher_for(&server));
    assert_eq!(assistant.explain("x"), "from async");
    assert_eq!(assistant.try_explain("x").unwrap(), "from async");
}
