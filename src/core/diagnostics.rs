//! Uniform formatting for failures that end up in the log.
//!
//! Whatever shape a failure has (a structured error with a source chain, or a
//! panic payload of any type), these helpers turn it into a single diagnostic
//! string and never panic themselves.

use std::any::Any;
use std::error::Error as StdError;

/// Format a structured error: message, then every `source()` in the chain.
pub fn describe_failure(message: &str, error: &(dyn StdError + 'static)) -> String {
    let mut out = format!("{message}\n{error}");
    let mut source = error.source();
    while let Some(cause) = source {
        out.push_str("\ncaused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

/// Format a panic payload recovered from `catch_unwind`.
///
/// String payloads (what `panic!` produces) are printed as-is, JSON values
/// raised through `std::panic::panic_any` are pretty-printed, anything else is
/// reported by kind only.
pub fn describe_panic(message: &str, payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        return format!("{message}\npanic: {text}");
    }
    if let Some(text) = payload.downcast_ref::<String>() {
        return format!("{message}\npanic: {text}");
    }
    if let Some(value) = payload.downcast_ref::<serde_json::Value>() {
        return match serde_json::to_string_pretty(value) {
            Ok(json) => format!("{message}\nUnknown Error Object:\n{json}"),
            Err(err) => format!("{message}\nUnserializable error object: {err}"),
        };
    }
    format!("{message}\nUnknown Error Type: unknown payload type")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ModwalkError;
    use std::io;

    #[test]
    fn structured_error_includes_source_chain() {
        let err = ModwalkError::io(
            "Failed to list folder",
            io::Error::new(io::ErrorKind::PermissionDenied, "access denied"),
        );
        let text = describe_failure("Failed to read directory. Directory path: /srv", &err);
        assert!(text.starts_with("Failed to read directory. Directory path: /srv\n"));
        assert!(text.contains("I/O error: Failed to list folder"));
        assert!(text.contains("caused by: access denied"));
    }

    #[test]
    fn json_payload_is_pretty_printed() {
        let payload: Box<dyn Any + Send> = Box::new(serde_json::json!({ "code": 7 }));
        let text = describe_panic("Loader rejected module", payload.as_ref());
        assert!(text.contains("Unknown Error Object:"));
        assert!(text.contains("\"code\": 7"));
    }

    #[test]
    fn panic_payloads_are_stringified() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert!(describe_panic("callback", payload.as_ref()).ends_with("panic: boom"));

        let payload: Box<dyn Any + Send> = Box::new(String::from("owned boom"));
        assert!(describe_panic("callback", payload.as_ref()).ends_with("panic: owned boom"));

        let payload: Box<dyn Any + Send> = Box::new(42_u8);
        assert!(describe_panic("callback", payload.as_ref()).contains("unknown payload type"));
    }
}
