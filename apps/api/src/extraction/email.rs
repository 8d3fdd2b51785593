use std::sync::OnceLock;

use regex::Regex;

const EMAIL_PATTERN: &str = r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}";

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(EMAIL_PATTERN).expect("email pattern is a valid regex"))
}

/// Returns the first email-like token in `text`, if any.
pub fn find_email(text: &str) -> Option<String> {
    email_regex().find(text).map(|m| m.as_str().to_string())
}
