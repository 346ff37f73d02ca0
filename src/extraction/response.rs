use regex::Regex;
use std::sync::OnceLock;

static FENCED_JSON: OnceLock<Regex> = OnceLock::new();

fn fenced_json() -> &'static Regex {
    FENCED_JSON.get_or_init(|| Regex::new(r"(?s)```json(.*?)```").expect("valid fence pattern"))
}

/// Pull the payload out of the first ```json fenced block in a model
/// response, trimmed of surrounding whitespace.
///
/// Models that ignore the fencing instruction get their raw text passed
/// through unchanged — downstream consumers treat unparseable payloads as
/// their own error case.
pub fn unwrap_fenced_json(response: &str) -> String {
    match fenced_json().captures(response).and_then(|c| c.get(1)) {
        Some(payload) => payload.as_str().trim().to_string(),
        None => response.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_fenced_block_with_surrounding_commentary() {
        let response = "Here is the data you asked for:\n```json\n{\"a\":1}\n```\nLet me know!";
        assert_eq!(unwrap_fenced_json(response), r#"{"a":1}"#);
    }

    #[test]
    fn unwraps_inline_fence() {
        assert_eq!(unwrap_fenced_json(r#"```json {"a":1} ```"#), r#"{"a":1}"#);
    }

    #[test]
    fn takes_the_first_block_when_several_exist() {
        let response = "```json\n{\"first\":true}\n```\nand also\n```json\n{\"second\":true}\n```";
        assert_eq!(unwrap_fenced_json(response), r#"{"first":true}"#);
    }

    #[test]
    fn no_fence_returns_input_unchanged() {
        let response = r#"{"a":1}"#;
        assert_eq!(unwrap_fenced_json(response), response);
        assert_eq!(unwrap_fenced_json("plain prose"), "plain prose");
    }

    #[test]
    fn unlabelled_fence_is_not_unwrapped() {
        let response = "```\n{\"a\":1}\n```";
        assert_eq!(unwrap_fenced_json(response), response);
    }

    #[test]
    fn multiline_payload_survives_with_inner_whitespace() {
        let response = "```json\n{\n  \"a\": 1,\n  \"b\": 2\n}\n```";
        assert_eq!(unwrap_fenced_json(response), "{\n  \"a\": 1,\n  \"b\": 2\n}");
    }
}
