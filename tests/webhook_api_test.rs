//! Webhook API Integration Tests

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::Weekday;
use metrics_exporter_prometheus::PrometheusBuilder;
use ringline::application::notification::{NotificationDispatcher, NotificationSettings};
use ringline::config::{Config, DeliveryMode};
use ringline::domain::business_hours::BusinessHours;
use ringline::domain::call::Destination;
use ringline::domain::routing::{CallRouter, Prompts, RoutingPlan, VoicemailSettings};
use ringline::infrastructure::email::SendGridTransport;
use ringline::infrastructure::provider::{HttpRecordingFetcher, RetryPolicy};
use ringline::interface::api::{build_router, AppState};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceExt; // For `oneshot`
use wiremock::matchers::{header as header_is, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ALL_WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Open around the clock, or never
fn hours(open: bool) -> BusinessHours {
    let hours = BusinessHours::new(chrono_tz::UTC, 0, 24).unwrap();
    if open {
        hours.with_days(ALL_WEEK.to_vec())
    } else {
        hours.with_days(Vec::new())
    }
}

fn call_router(open: bool) -> CallRouter {
    let plan = RoutingPlan {
        primary: vec![
            Destination::parse("sip:desk1@acme.sip.example.com", 20, "1").unwrap(),
            Destination::parse("sip:desk2@acme.sip.example.com", 20, "1").unwrap(),
        ],
        secondary: Some(Destination::parse("617-555-0199", 15, "1").unwrap()),
        outbound_timeout_seconds: 30,
        caller_id: Some("+16175550100".to_string()),
        default_country_code: "1".to_string(),
    };
    let hours = hours(open);
    let prompts = Prompts::for_business("Acme Fence", &hours);
    CallRouter::new(hours, plan, VoicemailSettings::default(), prompts)
}

fn settings() -> NotificationSettings {
    NotificationSettings {
        sender: Some("voicemail@acme.example".to_string()),
        sender_name: Some("Acme Voicemail".to_string()),
        recipients: vec!["owner@acme.example".to_string()],
        time_zone: chrono_tz::America::New_York,
    }
}

/// App whose email transport has no API key, so notifications never leave the process
fn app(open: bool) -> Router {
    let http = reqwest::Client::new();
    let fetcher = Arc::new(HttpRecordingFetcher::new(
        http.clone(),
        None,
        "http://127.0.0.1:9",
        "mp3",
        RetryPolicy::default(),
    ));
    let transport = Arc::new(SendGridTransport::new(http, None, None));
    let dispatcher = Arc::new(NotificationDispatcher::new(fetcher, transport, settings()));

    build_app(Config::default(), call_router(open), dispatcher)
}

fn build_app(config: Config, router: CallRouter, dispatcher: Arc<NotificationDispatcher>) -> Router {
    let state = AppState {
        config: Arc::new(config),
        router: Arc::new(router),
        dispatcher,
    };
    let prometheus_handle = PrometheusBuilder::new().build_recorder().handle();
    build_router(state, prometheus_handle)
}

fn form(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn twiml(app: Router, request: Request<Body>) -> String {
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/xml"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_voice_open_rings_primary_group() {
    let xml = twiml(
        app(true),
        form(
            "/webhook/voice",
            "CallSid=CA0001&From=%2B15085550123&To=%2B16175550100&Direction=inbound",
        ),
    )
    .await;

    assert!(xml.contains("<Say>Thank you for calling Acme Fence. Connecting you now.</Say>"));
    assert!(xml.contains(
        r#"<Dial timeout="20" callerId="+16175550100" action="/webhook/dial-status" method="POST">"#
    ));
    assert!(xml.contains("<Sip>sip:desk1@acme.sip.example.com</Sip>"));
    assert!(xml.contains("<Sip>sip:desk2@acme.sip.example.com</Sip>"));
    assert!(!xml.contains("<Record"));
}

#[tokio::test]
async fn test_voice_closed_goes_to_voicemail() {
    let xml = twiml(
        app(false),
        form(
            "/webhook/voice",
            "CallSid=CA0002&From=%2B15085550123&To=%2B16175550100",
        ),
    )
    .await;

    assert!(xml.contains("Our office hours are"));
    assert!(xml.contains(r#"action="/webhook/recording""#));
    assert!(xml.contains(r#"recordingStatusCallback="/webhook/recording-status""#));
    assert!(xml.contains("<Hangup/>"));
    assert!(!xml.contains("<Dial"));
}

#[tokio::test]
async fn test_voice_without_form_body_still_answers() {
    let request = Request::builder()
        .method("POST")
        .uri("/webhook/voice")
        .body(Body::empty())
        .unwrap();

    let xml = twiml(app(false), request).await;
    assert!(xml.contains("<Record"));
}

#[tokio::test]
async fn test_primary_no_answer_rings_secondary() {
    let xml = twiml(
        app(true),
        form(
            "/webhook/dial-status",
            "CallSid=CA0001&DialCallStatus=no-answer&DialCallDuration=0",
        ),
    )
    .await;

    assert!(xml.contains(
        r#"<Dial timeout="15" callerId="+16175550100" action="/webhook/mobile-dial-status" method="POST">"#
    ));
    assert!(xml.contains("<Number>+16175550199</Number>"));
    assert!(xml.contains(r#"<Pause length="1"/>"#));
    assert!(!xml.contains("<Sip>"));
}

#[tokio::test]
async fn test_primary_answered_is_terminal() {
    let xml = twiml(
        app(true),
        form(
            "/webhook/dial-status",
            "CallSid=CA0001&DialCallStatus=answered&DialCallDuration=42",
        ),
    )
    .await;

    assert!(xml.contains("<Hangup/>"));
    assert!(!xml.contains("<Dial"));
    assert!(!xml.contains("<Record"));
}

#[tokio::test]
async fn test_unknown_dial_status_falls_back() {
    let xml = twiml(
        app(true),
        form("/webhook/dial-status", "CallSid=CA0001&DialCallStatus=exploded"),
    )
    .await;

    assert!(xml.contains("/webhook/mobile-dial-status"));
}

#[tokio::test]
async fn test_secondary_busy_goes_to_voicemail() {
    let xml = twiml(
        app(true),
        form(
            "/webhook/mobile-dial-status",
            "CallSid=CA0001&DialCallStatus=busy&DialCallDuration=0",
        ),
    )
    .await;

    assert!(xml.contains("no one is available to take your call"));
    assert!(xml.contains("<Record"));
    assert!(!xml.contains("<Dial"));
}

#[tokio::test]
async fn test_secondary_answered_is_terminal() {
    let xml = twiml(
        app(true),
        form(
            "/webhook/mobile-dial-status",
            "CallSid=CA0001&DialCallStatus=completed&DialCallDuration=65",
        ),
    )
    .await;

    assert!(!xml.contains("<Dial"));
    assert!(!xml.contains("<Record"));
}

#[tokio::test]
async fn test_outbound_ten_digits_gets_country_code() {
    let xml = twiml(app(true), form("/webhook/outbound", "To=5551234567")).await;

    assert!(xml.contains(r#"<Dial timeout="30" callerId="+16175550100">"#));
    assert!(xml.contains("<Number>+15551234567</Number>"));
}

#[tokio::test]
async fn test_outbound_eleven_digits_gets_marker_only() {
    let xml = twiml(app(true), form("/webhook/outbound", "To=15551234567")).await;

    assert!(xml.contains("<Number>+15551234567</Number>"));
}

#[tokio::test]
async fn test_outbound_sip_wrapper_is_stripped() {
    let xml = twiml(
        app(true),
        form("/webhook/outbound", "To=sip%3A5551234567%40acme.sip.example.com"),
    )
    .await;

    assert!(xml.contains("<Number>+15551234567</Number>"));
}

#[tokio::test]
async fn test_outbound_invalid_destination_hangs_up() {
    let xml = twiml(app(true), form("/webhook/outbound", "To=abc")).await;

    assert!(xml.contains("is not valid"));
    assert!(xml.contains("<Hangup/>"));
    assert!(!xml.contains("<Dial"));
}

#[tokio::test]
async fn test_recording_without_credentials_still_thanks_caller() {
    let xml = twiml(
        app(true),
        form(
            "/webhook/recording",
            "CallSid=CA0001&From=%2B15085550123&RecordingSid=RE0001&RecordingDuration=9",
        ),
    )
    .await;

    assert!(xml.contains("<Say>Thank you for your message. Goodbye.</Say>"));
    assert!(xml.contains("<Hangup/>"));
}

/// Provider serves RE0001 as audio right away
async fn mount_recording(provider: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/Recordings/RE0001.mp3"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "audio/mpeg")
                .set_body_bytes(b"ID3 voicemail".to_vec()),
        )
        .expect(1)
        .mount(provider)
        .await;
}

/// App that fetches from `provider` and emails through `sendgrid`
fn voicemail_app(config: Config, provider: &MockServer, sendgrid: &MockServer) -> Router {
    let http = reqwest::Client::new();
    let fetcher = Arc::new(HttpRecordingFetcher::new(
        http.clone(),
        None,
        provider.uri(),
        "mp3",
        RetryPolicy {
            max_attempts: 5,
            delay: Duration::from_millis(10),
        },
    ));
    let transport = Arc::new(SendGridTransport::new(
        http,
        Some("SG.test-key".to_string()),
        Some(sendgrid.uri().as_str()),
    ));
    let dispatcher = Arc::new(NotificationDispatcher::new(fetcher, transport, settings()));
    build_app(config, call_router(true), dispatcher)
}

fn recording_form(provider: &MockServer) -> Request<Body> {
    let body = format!(
        "CallSid=CA0001&From=%2B15085550123&RecordingSid=RE0001&RecordingDuration=9&RecordingUrl={}%2FRecordings%2FRE0001",
        provider.uri().replace(':', "%3A").replace('/', "%2F")
    );
    form("/webhook/recording", &body)
}

/// Poll until `server` has seen `count` requests or `limit` passes
async fn received_within(server: &MockServer, count: usize, limit: Duration) -> usize {
    let started = Instant::now();
    loop {
        let seen = server.received_requests().await.map_or(0, |r| r.len());
        if seen >= count || started.elapsed() >= limit {
            return seen;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
}

const SLOW_SEND: Duration = Duration::from_secs(5);

async fn mount_slow_send(sendgrid: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .respond_with(
            ResponseTemplate::new(202)
                .insert_header("x-message-id", "sg-slow")
                .set_delay(SLOW_SEND),
        )
        .mount(sendgrid)
        .await;
}

#[tokio::test]
async fn test_recording_emails_voicemail() {
    let provider = MockServer::start().await;
    let sendgrid = MockServer::start().await;

    mount_recording(&provider).await;
    Mock::given(method("POST"))
        .and(path("/v3/mail/send"))
        .and(header_is("authorization", "Bearer SG.test-key"))
        .respond_with(ResponseTemplate::new(202).insert_header("x-message-id", "sg-msg-1"))
        .expect(1)
        .mount(&sendgrid)
        .await;

    let app = voicemail_app(Config::default(), &provider, &sendgrid);
    let xml = twiml(app, recording_form(&provider)).await;

    assert!(xml.contains("Thank you for your message"));
    // Both mock servers verify their expectations on drop
}

#[tokio::test]
async fn test_recording_detached_answers_before_email_finishes() {
    let provider = MockServer::start().await;
    let sendgrid = MockServer::start().await;
    mount_recording(&provider).await;
    mount_slow_send(&sendgrid).await;

    let mut config = Config::default();
    config.notification.delivery = DeliveryMode::Detach;
    let app = voicemail_app(config, &provider, &sendgrid);

    let started = Instant::now();
    let xml = twiml(app, recording_form(&provider)).await;
    let answered_in = started.elapsed();

    assert!(xml.contains("<Say>Thank you for your message. Goodbye.</Say>"));
    assert!(answered_in < Duration::from_secs(2), "took {:?}", answered_in);

    // The detached task still reaches the email API
    assert_eq!(received_within(&sendgrid, 1, Duration::from_secs(3)).await, 1);
}

#[tokio::test]
async fn test_recording_await_gives_up_after_timeout() {
    let provider = MockServer::start().await;
    let sendgrid = MockServer::start().await;
    mount_recording(&provider).await;
    mount_slow_send(&sendgrid).await;

    let mut config = Config::default();
    config.notification.delivery = DeliveryMode::Await;
    config.notification.await_timeout_secs = 1;
    let app = voicemail_app(config, &provider, &sendgrid);

    let started = Instant::now();
    let xml = twiml(app, recording_form(&provider)).await;
    let answered_in = started.elapsed();

    assert!(xml.contains("<Say>Thank you for your message. Goodbye.</Say>"));
    assert!(answered_in >= Duration::from_millis(900), "took {:?}", answered_in);
    assert!(answered_in < SLOW_SEND - Duration::from_secs(1), "took {:?}", answered_in);

    // Timing out only stops the wait, the send is already in flight
    assert_eq!(received_within(&sendgrid, 1, Duration::from_secs(3)).await, 1);
}

#[tokio::test]
async fn test_recording_status_is_bare_ack() {
    let response = app(true)
        .oneshot(form(
            "/webhook/recording-status",
            "CallSid=CA0001&RecordingSid=RE0001&RecordingStatus=completed",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_health_reports_missing_credentials() {
    let response = app(true)
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(json["status"], "degraded");
    assert_eq!(json["open_now"], true);
    assert_eq!(json["provider_credentials"], false);
    assert_eq!(json["transport_credentials"], false);
    assert!(json["missing"]
        .as_array()
        .unwrap()
        .iter()
        .any(|item| item == "email API key"));
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let response = app(true)
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
