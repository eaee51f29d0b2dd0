//! Contact form walkthrough.
//!
//! Drives a `FormController` through the cases the page handles: a bot
//! filling the honeypot, an impatient submit, invalid fields, spam, a good
//! submission and finally the rate limit.
//!
//! Run with `RUST_LOG=form_gatekeeper=debug cargo run --example contact_form`
//! to see every decision.

use form_gatekeeper::{
    CsrfGuard, Feedback, FormController, Gatekeeper, MemorySessionStore, SimulatedDelivery,
    SubmissionAttempt, CSRF_FIELD, HONEYPOT_FIELD,
};
use std::thread;
use std::time::Duration;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Short fill time so the walkthrough doesn't drag
    let min_fill = Duration::from_millis(500);
    let gatekeeper = Gatekeeper::builder()
        .with_min_fill_time(min_fill)
        .with_max_submissions(2)
        .build()?;
    let csrf = CsrfGuard::new(MemorySessionStore::new());
    let token = csrf.generate();

    let mut form = FormController::new(gatekeeper, SimulatedDelivery::new());
    form.init();

    println!("=== Contact Form Example ===\n");

    let good = |message: &str| {
        SubmissionAttempt::from_pairs([
            ("name", "Ada Lovelace"),
            ("email", "Ada@Example.com"),
            ("phone", "+33 6 12 34 56 78"),
            ("service", "web"),
            ("message", message),
            (CSRF_FIELD, token.as_str()),
        ])
    };

    println!("Live validation of the email field:");
    let feedback = form.validate_field("email", "ada@");
    println!("  ada@ -> {:?}\n", feedback.error);

    println!("Submitting immediately:");
    show(&form.submit(&good("Bonjour, je voudrais un devis.")));

    thread::sleep(min_fill);

    println!("Bot filling the honeypot:");
    show(&form.submit(
        &good("Bonjour, je voudrais un devis.").with_field(HONEYPOT_FIELD, "http://spam.example"),
    ));

    println!("Invalid fields:");
    show(&form.submit(&SubmissionAttempt::from_pairs([
        ("name", "A"),
        ("email", "not-an-email"),
        ("message", "short"),
    ])));

    println!("Spam message:");
    show(&form.submit(&good("Buy cheap viagra now, limited offer!")));

    println!("Valid submissions:");
    for i in 1..=2 {
        let feedback = form.submit(&good("Bonjour, je voudrais un devis pour un site."));
        show(&feedback);
        if i == 1 {
            thread::sleep(min_fill);
        }
    }

    thread::sleep(min_fill);
    println!("One more than the window allows:");
    show(&form.submit(&good("Bonjour, encore une question.")));

    println!("CSRF token still valid: {}", csrf.validate(&token));

    let snapshot = form.gatekeeper().metrics().snapshot();
    println!("\n=== Metrics ===");
    println!("Committed: {}", snapshot.committed);
    println!("Rejected: {}", snapshot.total_rejected());
    println!("  of which bots: {}", snapshot.bot_rejections());
    println!("Rejection rate: {:.1}%", snapshot.rejection_rate() * 100.0);

    Ok(())
}

fn show(feedback: &Feedback) {
    println!("  [{:?}] {}", feedback.toast.kind, feedback.toast.message);
    for (field, error) in &feedback.field_errors {
        println!("    {}: {}", field, error);
    }
    println!();
}
