//! HTTP-level tests for both providers and the router.
//!
//! Each test stands up a mock server and checks the request shape and the
//! status-to-error mapping.

use lectern_llm::{
    ChatCompletionConfig, ChatCompletionProvider, ChatMessage, LlmError, LlmProvider,
    MessagesConfig, MessagesProvider, ModelCall, RoutedProvider,
};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_ok(content: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

fn messages_ok(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "msg_1",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "stop_reason": "end_turn"
    })
}

#[tokio::test]
async fn test_chat_completion_success_sends_bearer_and_system() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer ghp_test"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o",
            "messages": [
                { "role": "system", "content": "sys" },
                { "role": "user", "content": "hello" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_ok("analysis text")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = ChatCompletionProvider::new(mock_server.uri(), "ghp_test");
    let reply = provider
        .complete(&ModelCall::new("gpt-4o", "sys", "hello"))
        .await
        .unwrap();
    assert_eq!(reply, "analysis text");
}

#[tokio::test]
async fn test_chat_completion_status_mapping() {
    let cases: Vec<(u16, fn(&LlmError) -> bool)> = vec![
        (413, |e| matches!(e, LlmError::OversizePayload)),
        (401, |e| matches!(e, LlmError::Unauthorized(_))),
        (429, |e| matches!(e, LlmError::RateLimited(_))),
        (500, |e| matches!(e, LlmError::Transport(_))),
    ];

    for (status, check) in cases {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
            .mount(&mock_server)
            .await;

        let provider = ChatCompletionProvider::new(mock_server.uri(), "t");
        let err = provider
            .complete(&ModelCall::new("gpt-4o", "s", "u"))
            .await
            .unwrap_err();
        assert!(check(&err), "HTTP {} mapped to {:?}", status, err);
    }
}

#[tokio::test]
async fn test_chat_completion_unauthorized_names_credential() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let provider = ChatCompletionProvider::new(mock_server.uri(), "bad");
    match provider.complete(&ModelCall::new("gpt-4o", "s", "u")).await {
        Err(LlmError::Unauthorized(msg)) => assert!(msg.contains("chat_completion.token")),
        other => panic!("Expected Unauthorized, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_completion_malformed_body_is_transport() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "choices": [] })))
        .mount(&mock_server)
        .await;

    let provider = ChatCompletionProvider::new(mock_server.uri(), "t");
    let err = provider
        .complete(&ModelCall::new("gpt-4o", "s", "u"))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::Transport(_)));
}

#[tokio::test]
async fn test_chat_completion_timeout_is_transport() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_ok("late"))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let provider = ChatCompletionProvider::new(mock_server.uri(), "t");
    let call = ModelCall::new("gpt-4o", "s", "u").with_timeout(Duration::from_millis(200));
    match provider.complete(&call).await {
        Err(LlmError::Transport(msg)) => assert!(msg.contains("timed out")),
        other => panic!("Expected Transport timeout, got {:?}", other),
    }
}

#[tokio::test]
async fn test_messages_success_sends_key_and_version() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "sk-ant-test"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(serde_json::json!({
            "model": "claude-sonnet-4-6",
            "system": "sys",
            "messages": [{ "role": "user", "content": "hello" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_ok("claude says hi")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let provider = MessagesProvider::new(mock_server.uri(), "sk-ant-test");
    let reply = provider
        .complete(&ModelCall::new("claude-sonnet-4-6", "sys", "hello"))
        .await
        .unwrap();
    assert_eq!(reply, "claude says hi");
}

#[tokio::test]
async fn test_messages_oversize_and_rate_limit() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(413))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let provider = MessagesProvider::new(mock_server.uri(), "k");
    let call = ModelCall::new("claude-haiku-4-5", "s", "u");
    assert_eq!(provider.complete(&call).await, Err(LlmError::OversizePayload));
    assert!(matches!(
        provider.complete(&call).await,
        Err(LlmError::RateLimited(_))
    ));
}

#[tokio::test]
async fn test_messages_missing_key_makes_no_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_ok("x")))
        .expect(0)
        .mount(&mock_server)
        .await;

    let provider = MessagesProvider::new(mock_server.uri(), "");
    let err = provider
        .complete(&ModelCall::new("claude-haiku-4-5", "s", "u"))
        .await
        .unwrap_err();
    assert!(matches!(err, LlmError::Configuration(_)));
}

#[tokio::test]
async fn test_router_dispatches_on_model_prefix() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_ok("from chat")))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(messages_ok("from messages")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let chat = ChatCompletionConfig {
        token: "t".to_string(),
        endpoint: mock_server.uri(),
        ..Default::default()
    };
    let messages = MessagesConfig {
        api_key: "k".to_string(),
        endpoint: mock_server.uri(),
        ..Default::default()
    };
    let router = RoutedProvider::new(&chat, &messages);

    let a = router
        .complete(&ModelCall::new("gpt-4o-mini", "s", "u"))
        .await
        .unwrap();
    let b = router
        .complete(&ModelCall::conversation(
            "claude-haiku-4-5",
            "s",
            vec![ChatMessage::user("u")],
        ))
        .await
        .unwrap();

    assert_eq!(a, "from chat");
    assert_eq!(b, "from messages");
}
