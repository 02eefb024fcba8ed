//! Contact form intake.
//!
//! Untrusted input is validated and normalized here, persisted, and
//! optionally relayed to an external webhook. The relay is fire-and-forget;
//! only validation and storage decide the response.

use std::sync::LazyLock;

use axum::http::HeaderMap;
use regex::Regex;

use crate::prelude::*;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub fn add_routes(router: AppRouter) -> AppRouter {
    router.public_routes(|r| r.route("/contact", post(contact_form)))
}

#[derive(Debug, serde::Deserialize)]
struct ContactForm {
    name: Option<String>,
    email: Option<String>,
    subject: Option<String>,
    message: Option<String>,
}

#[derive(serde::Serialize)]
struct ContactResponse {
    success: bool,
    message: &'static str,
    id: String,
}

async fn contact_form(
    State(state): State<SharedAppState>, headers: HeaderMap, Json(form): Json<ContactForm>,
) -> AppResult<Json<ContactResponse>> {
    let new = validate(form, &headers)?;

    let submission = Submission::create(&state.db, new).await?;
    state.relay.spawn_forward(&submission);

    Ok(Json(ContactResponse {
        success: true,
        message: "Thank you for your message! I'll get back to you soon.",
        id: submission.id,
    }))
}

/// Check and normalize an inbound form: all fields required and trimmed,
/// email lower-cased and shaped like `local@domain.tld`.
fn validate(form: ContactForm, headers: &HeaderMap) -> AppResult<NewSubmission> {
    let fields = (
        trimmed(form.name),
        trimmed(form.email),
        trimmed(form.subject),
        trimmed(form.message),
    );
    let (Some(name), Some(email), Some(subject), Some(message)) = fields else {
        return Err(AppError::Validation("All fields are required".into()));
    };

    let email = email.to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err(AppError::Validation("Invalid email address".into()));
    }

    Ok(NewSubmission {
        name,
        email,
        subject,
        message,
        ip_address: client_ip(headers),
        user_agent: user_agent(headers),
    })
}

fn trimmed(field: Option<String>) -> Option<String> {
    field.map(|f| f.trim().to_string()).filter(|f| !f.is_empty())
}

/// Best-effort client address: first entry of `x-forwarded-for`, if any.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}
