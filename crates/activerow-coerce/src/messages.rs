//! Error-code message resolution.
//!
//! The engine reports symbolic [`ErrorCode`]s only. Turning a code into
//! user-facing text is a separate, swappable concern: hosts register their
//! own [`MessageResolver`] to localize or rebrand wording without touching
//! the validation path. [`DefaultMessages`] ships plain English.

use activerow_core::{ErrorCode, ValidationError};

/// Swappable symbolic-code -> message lookup.
pub trait MessageResolver: Send + Sync {
    /// Human-readable text for one code.
    fn message(&self, code: ErrorCode) -> String;
}

/// Built-in English messages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMessages;

impl MessageResolver for DefaultMessages {
    fn message(&self, code: ErrorCode) -> String {
        match code {
            ErrorCode::NullNotAllowed => "value must not be null",
            ErrorCode::NotBoolean => "value is not a boolean",
            ErrorCode::NotInteger => "value is not an integer",
            ErrorCode::NotFloat => "value is not a number",
            ErrorCode::NotString => "value is not text",
            ErrorCode::NotDate => "value is not a date",
            ErrorCode::NotTime => "value is not a time",
            ErrorCode::NotTimestamp => "value is not a timestamp",
            ErrorCode::NotTimezoneOffset => "value is not a timezone offset",
            ErrorCode::NotUnixTimestamp => "value is not a unix timestamp",
            ErrorCode::NotIpv4Address => "value is not an IPv4 address",
            ErrorCode::NotEmail => "value is not an email address",
            ErrorCode::NotJson => "value is not valid JSON",
            ErrorCode::NotBinary => "value is not binary data",
            ErrorCode::NotInAllowedSet => "value is not in the allowed set",
        }
        .to_string()
    }
}

/// Render every failure in a validation error as `column: message` lines.
#[must_use]
pub fn describe(error: &ValidationError, resolver: &dyn MessageResolver) -> Vec<String> {
    error
        .errors
        .iter()
        .flat_map(|field| {
            field
                .codes
                .iter()
                .map(|code| format!("{}: {}", field.column, resolver.message(*code)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_messages_cover_codes() {
        let resolver = DefaultMessages;
        assert!(resolver.message(ErrorCode::NotEmail).contains("email"));
        assert!(resolver.message(ErrorCode::NotIpv4Address).contains("IPv4"));
    }

    #[test]
    fn test_describe_joins_column_and_message() {
        let error = ValidationError::single("contact", vec![ErrorCode::NotEmail]);
        let lines = describe(&error, &DefaultMessages);
        assert_eq!(lines, vec!["contact: value is not an email address"]);
    }

    #[test]
    fn test_custom_resolver_swaps_wording() {
        struct Terse;
        impl MessageResolver for Terse {
            fn message(&self, code: ErrorCode) -> String {
                code.code().to_string()
            }
        }
        let error = ValidationError::single("ip", vec![ErrorCode::NotIpv4Address]);
        assert_eq!(describe(&error, &Terse), vec!["ip: not_ipv4_address"]);
    }
}
