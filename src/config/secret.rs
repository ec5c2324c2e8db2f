//! Secret values that never print themselves
//!
//! API keys are wrapped in [`SecretValue`] as soon as they are read. The
//! wrapper masks itself in `Debug` and `Display` and wipes its buffer on drop.

use crate::utils::placeholder::is_placeholder;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use zeroize::Zeroizing;

/// Text shown in place of a configured secret
pub const MASK: &str = "********";

/// Text shown for an empty secret
pub const NOT_SET: &str = "<not set>";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct SecretValue(Zeroizing<String>);

impl SecretValue {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Borrow the raw value. Only hand this to the client that sends it.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// A secret counts as configured when it is non-blank and not a template placeholder
    pub fn is_configured(&self) -> bool {
        !self.is_empty() && !is_placeholder(self.expose())
    }

    /// Display form used by tables and logs
    pub fn masked(&self) -> &'static str {
        if self.is_empty() {
            NOT_SET
        } else {
            MASK
        }
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretValue({})", self.masked())
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.masked())
    }
}

impl From<&str> for SecretValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SecretValue {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Serialize for SecretValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_and_display_are_masked() {
        let secret = SecretValue::new("sk-or-v1-abcdef");
        assert_eq!(format!("{secret:?}"), "SecretValue(********)");
        assert_eq!(secret.to_string(), MASK);
        assert!(!format!("{secret:?}").contains("abcdef"));
    }

    #[test]
    fn test_empty_secret_reports_not_set() {
        let secret = SecretValue::empty();
        assert!(secret.is_empty());
        assert!(!secret.is_configured());
        assert_eq!(secret.to_string(), NOT_SET);
    }

    #[test]
    fn test_placeholder_is_not_configured() {
        assert!(!SecretValue::new("your-youtube-api-key").is_configured());
        assert!(!SecretValue::new("   ").is_configured());
        assert!(SecretValue::new("AIzaSyExample123").is_configured());
    }

    #[test]
    fn test_serde_passes_raw_value() {
        let secret = SecretValue::new("abc");
        let json = serde_json::to_string(&secret).unwrap();
        assert_eq!(json, "\"abc\"");
        let back: SecretValue = serde_json::from_str(&json).unwrap();
        assert_eq!(back, secret);
    }
}
