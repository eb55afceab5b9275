//! Normalization of raw listing text before structured parsing.
//!
//! Reasoning models may prepend a `<think>...</think>` block and chat models
//! like to wrap JSON in a code fence. [`sanitize_listing`] removes both and
//! trims; [`parse_listing`] turns the result into a [`Listing`] or a
//! [`FormatError`]. Neither function touches the network.

use crate::error::FormatError;
use crate::types::Listing;

const THINK_OPEN: &str = "<think>";
const THINK_CLOSE: &str = "</think>";
const FENCE: &str = "```";

/// Strip leading reasoning blocks and surrounding code fences, then trim.
///
/// Runs to a fixed point, so `sanitize_listing(sanitize_listing(s)) ==
/// sanitize_listing(s)` for every input.
pub fn sanitize_listing(raw: &str) -> String {
    let mut current = raw.trim();
    loop {
        let next = strip_fences(strip_reasoning(current)).trim();
        if next == current {
            return next.to_string();
        }
        current = next;
    }
}

/// Remove one leading `<think>...</think>` block, contents included.
///
/// An unterminated block is left alone; the parse step then reports it.
fn strip_reasoning(text: &str) -> &str {
    let Some(rest) = text.trim_start().strip_prefix(THINK_OPEN) else {
        return text;
    };
    match rest.find(THINK_CLOSE) {
        Some(end) => rest[end + THINK_CLOSE.len()..].trim_start(),
        None => text,
    }
}

/// Remove a leading fence (with optional language tag) and a trailing fence.
fn strip_fences(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix(FENCE) {
        // Optional language tag: ```json
        text = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    }
    text.trim().strip_suffix(FENCE).unwrap_or(text).trim()
}

/// Parse sanitized text into a listing with non-empty `title` and `description`.
pub fn parse_listing(text: &str) -> Result<Listing, FormatError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let object = value.as_object().ok_or(FormatError::NotObject)?;
    let title = required_field(object, "title")?;
    let description = required_field(object, "description")?;
    Ok(Listing { title, description })
}

fn required_field(
    object: &serde_json::Map<String, serde_json::Value>,
    key: &'static str,
) -> Result<String, FormatError> {
    let value = object
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or(FormatError::MissingField(key))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(FormatError::EmptyField(key));
    }
    Ok(value.to_string())
}

/// Sanitize then parse, returning the sanitized text alongside the listing.
pub fn sanitize_and_parse(raw: &str) -> (String, Result<Listing, FormatError>) {
    let cleaned = sanitize_listing(raw);
    let parsed = parse_listing(&cleaned);
    (cleaned, parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn red_bike() -> Listing {
        Listing {
            title: "Red Bike".to_string(),
            description: "A used red bicycle.".to_string(),
        }
    }

    #[test]
    fn test_reasoning_and_fence_are_removed() {
        let raw = "<think>ignore</think>```json\n{\"title\":\"Red Bike\",\"description\":\"A used red bicycle.\"}\n```";
        let (cleaned, parsed) = sanitize_and_parse(raw);
        assert!(cleaned.starts_with('{'));
        assert!(cleaned.ends_with('}'));
        assert_eq!(parsed.unwrap(), red_bike());
    }

    #[test]
    fn test_bare_json_is_untouched() {
        let raw = r#"{"title":"Red Bike","description":"A used red bicycle."}"#;
        assert_eq!(sanitize_listing(raw), raw);
        assert_eq!(parse_listing(&sanitize_listing(raw)).unwrap(), red_bike());
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let inputs = [
            "<think>a</think>```json\n{\"title\":\"x\"}\n```",
            "```\n{}\n```",
            "<think>\nmulti\nline\n</think>\n\n{\"a\":1}",
            "<think>a</think><think>b</think>```json\n```json\n{}\n```\n```",
            "<think>unterminated {\"title\":\"x\"}",
            "   plain text   ",
            "```",
            "",
        ];
        for input in inputs {
            let once = sanitize_listing(input);
            let twice = sanitize_listing(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_multiline_reasoning_block() {
        let raw = "<think>\nThe user wants JSON.\nI'll write {\"title\": \"wrong\"}.\n</think>\n\n{\"title\":\"Lamp\",\"description\":\"Brass desk lamp.\"}";
        let listing = parse_listing(&sanitize_listing(raw)).unwrap();
        assert_eq!(listing.title, "Lamp");
    }

    #[test]
    fn test_fence_without_language_tag() {
        let raw = "```\n{\"title\":\"Lamp\",\"description\":\"Brass desk lamp.\"}\n```";
        assert_eq!(parse_listing(&sanitize_listing(raw)).unwrap().title, "Lamp");
    }

    #[test]
    fn test_fence_on_single_line() {
        let raw = "```json {\"title\":\"Lamp\",\"description\":\"Brass.\"}```";
        assert_eq!(parse_listing(&sanitize_listing(raw)).unwrap().title, "Lamp");

        let tight = "```json{\"title\":\"Lamp\",\"description\":\"Brass.\"}```";
        assert_eq!(parse_listing(&sanitize_listing(tight)).unwrap().title, "Lamp");
    }

    #[test]
    fn test_prose_is_format_error() {
        let raw = "Sure, here's your listing: a great red bike for sale!";
        let err = parse_listing(&sanitize_listing(raw)).unwrap_err();
        assert!(matches!(err, FormatError::NotJson(_)));
    }

    #[test]
    fn test_unterminated_reasoning_is_format_error() {
        let raw = "<think>still thinking {\"title\":\"x\",\"description\":\"y\"}";
        assert!(parse_listing(&sanitize_listing(raw)).is_err());
    }

    #[test]
    fn test_non_object_json_is_format_error() {
        assert!(matches!(
            parse_listing("[\"title\", \"description\"]"),
            Err(FormatError::NotObject)
        ));
    }

    #[test]
    fn test_missing_keys_are_format_errors() {
        assert!(matches!(
            parse_listing(r#"{"description":"d"}"#),
            Err(FormatError::MissingField("title"))
        ));
        assert!(matches!(
            parse_listing(r#"{"title":"t"}"#),
            Err(FormatError::MissingField("description"))
        ));
        assert!(matches!(
            parse_listing(r#"{"title":7,"description":"d"}"#),
            Err(FormatError::MissingField("title"))
        ));
    }

    #[test]
    fn test_blank_values_are_format_errors() {
        assert!(matches!(
            parse_listing(r#"{"title":"  ","description":"d"}"#),
            Err(FormatError::EmptyField("title"))
        ));
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let listing =
            parse_listing(r#"{"title":"T","description":"D","price":"$40"}"#).unwrap();
        assert_eq!(listing.title, "T");
        assert_eq!(listing.description, "D");
    }

    #[test]
    fn test_embedded_quotes_and_commas_survive() {
        let raw = r#"{"title":"Chair, oak","description":"Seat is 18\" high, sturdy."}"#;
        let listing = parse_listing(raw).unwrap();
        assert_eq!(listing.description, "Seat is 18\" high, sturdy.");
    }
}
