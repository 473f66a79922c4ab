use serde_json::Value;
use tracing::warn;

/// Message type tag the agent uses for a plain reply
pub const INFORM_MESSAGE_TYPE: &str = "Inform";

/// Extract the reply text from an agent response.
///
/// Returns the `message` of the first `Inform` entry with non-blank text.
/// Anything else falls back to the pretty-printed payload, so the caller
/// always has something to display.
pub fn format_response(response: &Value) -> String {
    if let Some(text) = inform_text(response) {
        return text.to_string();
    }

    warn!("Agent response has no Inform message, displaying raw payload");
    serde_json::to_string_pretty(response).unwrap_or_else(|_| response.to_string())
}

fn inform_text(response: &Value) -> Option<&str> {
    response
        .get("messages")?
        .as_array()?
        .iter()
        .filter(|entry| entry.get("type").and_then(Value::as_str) == Some(INFORM_MESSAGE_TYPE))
        .filter_map(|entry| entry.get("message").and_then(Value::as_str))
        .map(str::trim)
        .find(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn returns_first_inform_message() {
        let response = json!({
            "messages": [
                { "type": "Progress", "message": "Thinking..." },
                { "type": "Inform", "message": "Hello" },
                { "type": "Inform", "message": "Second" }
            ]
        });
        assert_eq!(format_response(&response), "Hello");
    }

    #[test]
    fn skips_blank_inform_entries() {
        let response = json!({
            "messages": [
                { "type": "Inform", "message": "   " },
                { "type": "Inform", "message": " We are open 9-5. \n" }
            ]
        });
        assert_eq!(format_response(&response), "We are open 9-5.");
    }

    #[test]
    fn falls_back_to_pretty_json_without_inform() {
        let response = json!({
            "messages": [{ "type": "Escalate", "message": "Transferring" }]
        });
        let text = format_response(&response);
        let reparsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(reparsed, response);
        assert!(text.contains('\n'));
    }

    #[test]
    fn malformed_payloads_still_render() {
        for response in [
            json!({}),
            json!({ "messages": "not a list" }),
            json!({ "messages": [] }),
            json!([1, 2, 3]),
            json!(null),
        ] {
            let text = format_response(&response);
            assert!(!text.is_empty());
            assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), response);
        }
    }
}
