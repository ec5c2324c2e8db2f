//! Detection of template placeholder values
//!
//! Config templates ship strings like `your-youtube-api-key` or
//! `https://your-backend-api.com`. These parse fine but are never real
//! values, so validation treats them as unset.

use regex::Regex;
use std::sync::OnceLock;

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^(your[-_ ].*|<.*>|changeme|change[-_]me|replace[-_]?me|x{3,})$")
            .unwrap_or_else(|e| panic!("placeholder pattern is invalid: {e}"))
    })
}

/// Check if a value is a template placeholder rather than a real credential
pub fn is_placeholder(value: &str) -> bool {
    placeholder_pattern().is_match(value.trim())
}

/// Check if a host name is a template placeholder (`your-backend-api.com`)
pub fn is_placeholder_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    host.starts_with("your-") || host.starts_with("your_") || host.contains(".your-")
}
