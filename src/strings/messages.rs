//! # Messages
//!
//! Constant strings and format functions for everything the user reads.
//! Keeping them in one place keeps the wording consistent and the engine
//! tests readable.

// Step prompts
pub const WELCOME: &str = "👋 Let's build an HTTP request.\n\nAuthorization?";
pub const TOKEN_PROMPT: &str = "🔑 Send the bearer token";
pub const TOKEN_EMPTY: &str = "🔑 The token cannot be empty. Send the bearer token";
pub const METHOD_PROMPT: &str = "Choose a method:";
pub const URL_PROMPT: &str = "🌐 Send the URL";
pub const BODY_PROMPT: &str = "📦 Send the JSON body";

// Validation errors. The failed field is re-asked; everything already
// captured stays.
pub const URL_INVALID: &str = "❌ Invalid URL\nSend an absolute http(s) URL, or /start to begin again";
pub const JSON_INVALID: &str = "❌ Invalid JSON\nTry again, or /start to begin again";

/// Reply to an event that does not fit the current step.
pub const FOLLOW_STEP: &str =
    "🤔 I wasn't expecting that here. Follow the current step, or send /start to begin again.";

// Execution epilogue
pub const REPEATING: &str = "🔁 Repeating the last request…";
pub const WHAT_NEXT: &str = "What next?";

// Button labels
pub const LABEL_AUTH_BEARER: &str = "🔐 Bearer token";
pub const LABEL_AUTH_NONE: &str = "🔓 No auth";
pub const LABEL_METHOD_GET: &str = "🌐 GET";
pub const LABEL_METHOD_POST: &str = "📦 POST";
pub const LABEL_REPEAT: &str = "🔁 Repeat last request";
pub const LABEL_RESTART: &str = "🆕 New request";

/// Appended to a response body that was cut at the cap.
pub const TRUNCATION_MARKER: &str = "… [truncated]";

pub fn result_response(status: u16, body: &str, truncated: bool) -> String {
    let mut text = format!("✅ Status: {status}\n\n{body}");
    if truncated {
        text.push_str(TRUNCATION_MARKER);
    }
    text
}

pub fn result_failed(reason: &str) -> String {
    format!("❌ Request failed:\n{reason}")
}
