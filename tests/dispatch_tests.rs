// Tests for notification dispatch against mock Mailgun/Slack endpoints

use panxpan_reporter::config::{Config, EmailSettings, NotifyConfig, RunVars};
use panxpan_reporter::notify::{ChannelState, Delivery, DispatchError, Dispatcher};
use panxpan_reporter::state::{ResultAccumulator, RunSummary, TestOutcome};
use wiremock::matchers::{basic_auth, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn summary() -> RunSummary {
    let acc = ResultAccumulator::new();
    acc.record_outcome(TestOutcome::passed("A", 1000));
    acc.record_outcome(TestOutcome::failed("B", "boom", 4000));
    acc.record_outcome(TestOutcome::skipped("C"));
    acc.finalize(5000)
}

fn email_config(server: &MockServer) -> NotifyConfig {
    NotifyConfig {
        email_enabled: true,
        email: EmailSettings {
            api_key: Some("key-test".to_string()),
            domain: Some("mg.panxpan.com".to_string()),
            recipient: Some("qa@panxpan.com".to_string()),
            from: None,
            api_base: Some(server.uri()),
        },
        ..NotifyConfig::default()
    }
}

fn chat_config(server: &MockServer) -> NotifyConfig {
    NotifyConfig {
        chat_enabled: true,
        chat_webhook_url: Some(format!("{}/services/T000/B000/XXXX", server.uri())),
        run: RunVars {
            repository: Some("panxpan/e2e-tests".to_string()),
            run_id: Some("42".to_string()),
            server_url: Some("https://github.com".to_string()),
        },
        ..NotifyConfig::default()
    }
}

#[tokio::test]
async fn test_email_disabled_makes_no_request() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let notify = NotifyConfig {
        email_enabled: false,
        ..email_config(&server)
    };
    let config = Config::default();
    let dispatcher = Dispatcher::new(&notify, &config).unwrap();

    // Act
    let result = dispatcher.dispatch_email(&summary()).await;

    // Assert
    assert!(matches!(result, Ok(Delivery::Disabled)));
}

#[tokio::test]
async fn test_email_missing_recipient_is_config_error() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let mut notify = email_config(&server);
    notify.email.recipient = None;
    let config = Config::default();
    let dispatcher = Dispatcher::new(&notify, &config).unwrap();

    // Act
    let result = dispatcher.dispatch_email(&summary()).await;

    // Assert
    match result {
        Err(DispatchError::Config { reason, .. }) => assert!(reason.contains("EMAIL_TO")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_email_sent_to_mailgun() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v3/mg.panxpan.com/messages"))
        .and(basic_auth("api", "key-test"))
        .and(body_string_contains("to=qa%40panxpan.com"))
        .and(body_string_contains(
            "subject=PanXpan+E2E+Test+Results+-+FAILED+%281%2F3+passed%29",
        ))
        .and(body_string_contains("html=%3C%21DOCTYPE+html%3E"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "<20260101.1@mg.panxpan.com>",
            "message": "Queued. Thank you."
        })))
        .expect(1)
        .mount(&server)
        .await;
    let notify = email_config(&server);
    let config = Config::default();
    let dispatcher = Dispatcher::new(&notify, &config).unwrap();

    // Act
    let result = dispatcher.dispatch_email(&summary()).await;

    // Assert
    assert!(matches!(result, Ok(Delivery::Sent)), "{:?}", result);
}

#[tokio::test]
async fn test_email_auth_failure_is_delivery_error() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Forbidden"))
        .expect(1)
        .mount(&server)
        .await;
    let notify = email_config(&server);
    let config = Config::default();
    let dispatcher = Dispatcher::new(&notify, &config).unwrap();

    // Act
    let result = dispatcher.dispatch_email(&summary()).await;

    // Assert
    match result {
        Err(DispatchError::Delivery { status, reason, .. }) => {
            assert_eq!(status, Some(401));
            assert!(reason.contains("Forbidden"));
        }
        other => panic!("expected delivery error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_chat_posts_blocks() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/services/T000/B000/XXXX"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;
    let notify = chat_config(&server);
    let config = Config::default();
    let dispatcher = Dispatcher::new(&notify, &config).unwrap();

    // Act
    let result = dispatcher.dispatch_chat(&summary()).await;

    // Assert
    assert!(matches!(result, Ok(Delivery::Sent)), "{:?}", result);
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body["text"].as_str().unwrap().contains("FAILED"));
    let blocks = body["blocks"].as_array().unwrap();
    let actions = blocks.last().unwrap();
    assert_eq!(actions["type"], "actions");
    assert_eq!(
        actions["elements"][0]["url"],
        "https://github.com/panxpan/e2e-tests/actions/runs/42"
    );
}

#[tokio::test]
async fn test_chat_non_2xx_is_failure() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no_service"))
        .mount(&server)
        .await;
    let notify = chat_config(&server);
    let config = Config::default();
    let dispatcher = Dispatcher::new(&notify, &config).unwrap();

    // Act
    let result = dispatcher.dispatch_chat(&summary()).await;

    // Assert
    let err = result.unwrap_err();
    assert!(!err.is_config());
    assert!(err.to_string().contains("no_service"));
}

#[tokio::test]
async fn test_chat_missing_webhook_is_config_error() {
    let notify = NotifyConfig {
        chat_enabled: true,
        ..NotifyConfig::default()
    };
    let config = Config::default();
    let dispatcher = Dispatcher::new(&notify, &config).unwrap();

    let err = dispatcher.dispatch_chat(&summary()).await.unwrap_err();
    assert!(err.is_config());
}

#[tokio::test]
async fn test_dispatch_all_channels_are_independent() {
    // Arrange: Mailgun rejects, Slack accepts
    let mailgun = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mailgun)
        .await;
    let slack = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&slack)
        .await;
    let notify = NotifyConfig {
        email_enabled: true,
        email: email_config(&mailgun).email,
        ..chat_config(&slack)
    };
    let config = Config::default();
    let dispatcher = Dispatcher::new(&notify, &config).unwrap();

    // Act
    let report = dispatcher.dispatch_all(&summary()).await;

    // Assert
    assert_eq!(report.email, ChannelState::Failed);
    assert_eq!(report.chat, ChannelState::Sent);
}

#[tokio::test]
async fn test_dispatch_all_disabled_and_misconfigured() {
    let notify = NotifyConfig {
        email_enabled: true,
        chat_enabled: false,
        ..NotifyConfig::default()
    };
    let config = Config::default();
    let dispatcher = Dispatcher::new(&notify, &config).unwrap();

    let report = dispatcher.dispatch_all(&summary()).await;

    assert_eq!(report.email, ChannelState::SkippedMisconfigured);
    assert_eq!(report.chat, ChannelState::SkippedDisabled);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_delivery_error() {
    // Nothing listens on port 9 (discard) on the test host
    let notify = NotifyConfig {
        chat_enabled: true,
        chat_webhook_url: Some("http://127.0.0.1:9/hook".to_string()),
        ..NotifyConfig::default()
    };
    let mut config = Config::default();
    config.delivery.timeout = 2;
    let dispatcher = Dispatcher::new(&notify, &config).unwrap();

    let err = dispatcher.dispatch_chat(&summary()).await.unwrap_err();
    assert!(matches!(err, DispatchError::Delivery { status: None, .. }));
}
