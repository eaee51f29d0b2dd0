use form_gatekeeper::infrastructure::mocks::{MockCaptureLayer, MockClock, RecordingDelivery};
use form_gatekeeper::{FormController, Gatekeeper, SimulatedDelivery, SubmissionAttempt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

fn attempt() -> SubmissionAttempt {
    SubmissionAttempt::from_pairs([
        ("name", "Jean Dupont"),
        ("email", "jean@example.com"),
        ("message", "Bonjour, je souhaite un devis."),
    ])
}

fn gatekeeper(clock: &MockClock) -> Gatekeeper {
    Gatekeeper::builder()
        .with_clock(Arc::new(clock.clone()))
        .build()
        .unwrap()
}

#[test]
fn test_honeypot_logged_as_warning() {
    let capture = MockCaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let clock = MockClock::new(Instant::now());

    tracing::subscriber::with_default(subscriber, || {
        let mut gatekeeper = gatekeeper(&clock);
        gatekeeper.start();
        clock.advance(Duration::from_secs(5));
        let _ = gatekeeper.submit(&attempt().with_honeypot("http://bot.example"));
    });

    let warnings = capture.at_level(Level::WARN);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "bot detected via honeypot");
    assert_eq!(warnings[0].field("stage"), Some("honeypot"));
}

#[test]
fn test_spam_rule_logged() {
    let capture = MockCaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let clock = MockClock::new(Instant::now());

    tracing::subscriber::with_default(subscriber, || {
        let mut gatekeeper = gatekeeper(&clock);
        gatekeeper.start();
        clock.advance(Duration::from_secs(5));
        let _ = gatekeeper.submit(&attempt().with_field("message", "[url=http://x]click[/url]"));
    });

    let warnings = capture.at_level(Level::WARN);
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "message flagged as spam");
    assert_eq!(warnings[0].field("rule"), Some("bbcode"));
}

#[test]
fn test_field_values_never_logged() {
    let capture = MockCaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let clock = MockClock::new(Instant::now());

    tracing::subscriber::with_default(subscriber, || {
        let mut form = FormController::new(gatekeeper(&clock), SimulatedDelivery::new());
        form.init();
        clock.advance(Duration::from_secs(5));
        assert!(form.submit(&attempt()).is_success());
    });

    let events = capture.get_captured();
    assert!(events
        .iter()
        .any(|e| e.message == "simulated delivery of contact form"));
    for event in &events {
        let rendered = format!("{} {:?}", event.message, event.fields);
        assert!(!rendered.contains("jean@example.com"), "leaked: {}", rendered);
        assert!(!rendered.contains("Jean Dupont"), "leaked: {}", rendered);
    }
}

#[test]
fn test_delivery_failure_logged_as_error() {
    let capture = MockCaptureLayer::new();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    let clock = MockClock::new(Instant::now());

    tracing::subscriber::with_default(subscriber, || {
        let mut form = FormController::new(gatekeeper(&clock), RecordingDelivery::failing());
        form.init();
        clock.advance(Duration::from_secs(5));
        assert!(!form.submit(&attempt()).is_success());
    });

    let errors = capture.at_level(Level::ERROR);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "failed to deliver contact form");
    assert!(capture
        .at_level(Level::INFO)
        .iter()
        .all(|e| e.message != "submission recorded"));
}
