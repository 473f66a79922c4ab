//! Mock Salesforce endpoints shared by the unit tests

use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::agentforce::AgentforceClient;
use crate::config::{AgentforceConfig, Secret};

pub const CLIENT_ID: &str = "test-client-id";
pub const CLIENT_SECRET: &str = "super-secret-value";
pub const ACCESS_TOKEN: &str = "00Dxx0000000001-access-token";
pub const AGENT_ID: &str = "0XxAg0000000001";
pub const FULL_SCOPE: &str = "sfap_api chatbot_api api";

pub fn test_config(instance_url: &str) -> AgentforceConfig {
    AgentforceConfig {
        instance_url: instance_url.to_string(),
        client_id: CLIENT_ID.to_string(),
        client_secret: Secret::new(CLIENT_SECRET),
        agent_id: AGENT_ID.to_string(),
    }
}

pub fn test_client(server: &MockServer) -> AgentforceClient {
    AgentforceClient::new(test_config(&server.uri()), Duration::from_secs(5)).unwrap()
}

pub fn token_body(server: &MockServer, scope: &str) -> Value {
    json!({
        "access_token": ACCESS_TOKEN,
        "api_instance_url": server.uri(),
        "instance_url": server.uri(),
        "token_type": "Bearer",
        "scope": scope
    })
}

pub async fn mount_token(server: &MockServer, scope: &str) {
    Mock::given(method("POST"))
        .and(path("/services/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(server, scope)))
        .mount(server)
        .await;
}

pub async fn mount_session(server: &MockServer, session_id: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/einstein/ai-agent/v1/agents/{AGENT_ID}/sessions")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sessionId": session_id,
            "_links": {},
            "messages": []
        })))
        .mount(server)
        .await;
}

pub async fn mount_reply(server: &MockServer, session_id: &str, reply: Value) {
    Mock::given(method("POST"))
        .and(path(format!(
            "/einstein/ai-agent/v1/sessions/{session_id}/messages"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply))
        .mount(server)
        .await;
}
