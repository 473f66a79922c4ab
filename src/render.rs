//! Server-rendered HTML for the chat page and its message bubbles.
//!
//! The page posts the form with htmx and appends the returned fragment to
//! the chat container, so `/chat` only ever renders bubbles.

use crate::config::REQUIRED_VARS;

const BOOTSTRAP_CSS: &str = "https://cdn.jsdelivr.net/npm/bootstrap@5.3.0/dist/css/bootstrap.min.css";
const HTMX_JS: &str = "https://unpkg.com/htmx.org@1.9.12";

const USER_STYLE: &str =
    "background-color: #0d6efd; color: white; margin-left: 20%; border-radius: 8px;";
const AGENT_STYLE: &str =
    "background-color: #d1e7dd; color: #0f5132; margin-right: 20%; border-radius: 8px;";
const ERROR_STYLE: &str =
    "background-color: #f8d7da; color: #842029; margin-right: 20%; border-radius: 8px;";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="{BOOTSTRAP_CSS}">
<script src="{HTMX_JS}"></script>
</head>
<body>
<main class="container">
<h1>{title}</h1>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

/// Chat page for one conversation
pub fn chat_page(conversation_id: &str) -> String {
    let body = format!(
        r##"<div class="d-flex flex-column">
<div id="chat-container" class="mb-4 p-3 rounded" style="height: 500px; overflow-y: auto; background-color: #f8f9fa; border: 1px solid #dee2e6;"></div>
<form id="chat-form" method="post" action="/chat" hx-post="/chat" hx-target="#chat-container" hx-swap="beforeend" hx-on::after-request="document.querySelector('#message').value = ''" class="border-top pt-3">
<input type="hidden" name="conversation_id" value="{conversation_id}">
<div class="mb-2">
<textarea id="message" name="message" class="form-control" rows="3" placeholder="Type your message and press Send..." style="resize: vertical;"></textarea>
</div>
<button type="submit" class="btn btn-primary w-100">Send Message</button>
</form>
</div>"##,
        conversation_id = escape_html(conversation_id),
    );
    layout("Agentforce AI Agent Chat", &body)
}

/// Instructions shown instead of the chat when credentials are missing
pub fn configuration_required_page(missing: &[String]) -> String {
    let items: String = REQUIRED_VARS
        .iter()
        .map(|name| {
            let status = if missing.iter().any(|m| m == name) {
                "missing"
            } else {
                "set"
            };
            format!(
                "<li><code>{}</code> - {} ({})</li>\n",
                name,
                describe_variable(name),
                status
            )
        })
        .collect();

    let body = format!(
        r#"<div class="alert alert-warning">
<p style="font-size: 1.5em; font-weight: bold;">Configuration Required</p>
<p>Please set the following environment variables:</p>
<ul>
{items}</ul>
<p>Create a <code>.env</code> file in the working directory with these values and restart the server.</p>
</div>"#
    );
    layout("Agentforce API Client - Configuration Required", &body)
}

fn describe_variable(name: &str) -> &'static str {
    match name {
        "SALESFORCE_INSTANCE_URL" => "Your Salesforce org domain",
        "SALESFORCE_CLIENT_ID" => "Connected app client ID",
        "SALESFORCE_CLIENT_SECRET" => "Connected app client secret",
        "SALESFORCE_AGENT_ID" => "Agent ID",
        _ => "",
    }
}

fn bubble(class: &str, style: &str, text: &str) -> String {
    format!(
        r#"<div class="{class}" style="{style}"><p class="mb-0" style="white-space: pre-wrap;">{}</p></div>"#,
        escape_html(text)
    )
}

pub fn user_bubble(text: &str) -> String {
    bubble("mb-2 p-2 rounded user-message", USER_STYLE, text)
}

pub fn agent_bubble(text: &str) -> String {
    bubble("mb-2 p-3 rounded agent-message", AGENT_STYLE, text)
}

pub fn error_bubble(text: &str) -> String {
    bubble(
        "mb-2 p-2 rounded error-message",
        ERROR_STYLE,
        &format!("Error: {}", text),
    )
}

/// User message followed by the agent reply
pub fn exchange(user_text: &str, agent_text: &str) -> String {
    format!(
        r#"<div class="chat-exchange">{}{}</div>"#,
        user_bubble(user_text),
        agent_bubble(agent_text)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x")</script> & 'y'"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt; &amp; &#x27;y&#x27;"
        );
    }

    #[test]
    fn exchange_has_user_then_agent_bubble() {
        let html = exchange("What are your business hours?", "We are open 9-5.");
        let user = html.find("What are your business hours?").unwrap();
        let agent = html.find("We are open 9-5.").unwrap();
        assert!(user < agent);
        assert!(html.contains("user-message"));
        assert!(html.contains("agent-message"));
        assert!(!html.contains("error-message"));
    }

    #[test]
    fn bubbles_escape_agent_text() {
        let html = agent_bubble("<b>bold</b>");
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn chat_page_embeds_conversation_id() {
        let html = chat_page("5f0c6a43-6a1e-4a8f-9a9b-0d3c2b1a0e9f");
        assert!(html.contains(
            r#"name="conversation_id" value="5f0c6a43-6a1e-4a8f-9a9b-0d3c2b1a0e9f""#
        ));
        assert!(html.contains(r#"hx-post="/chat""#));
        assert!(html.contains(r#"name="message""#));
    }

    #[test]
    fn configuration_page_marks_missing_variables() {
        let html = configuration_required_page(&["SALESFORCE_AGENT_ID".to_string()]);
        assert!(html.contains("Configuration Required"));
        assert!(html.contains("<code>SALESFORCE_AGENT_ID</code> - Agent ID (missing)"));
        assert!(html.contains("<code>SALESFORCE_CLIENT_ID</code> - Connected app client ID (set)"));
    }
}
