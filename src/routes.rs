use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::handlers::handle_chat_message;
use crate::render;
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/chat", post(chat))
        .route("/api/health", get(health_check))
}

/// Full application with tracing, ready to serve
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(create_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn home(State(state): State<AppState>) -> Html<String> {
    if state.client.is_none() {
        return Html(render::configuration_required_page(&state.missing_config));
    }
    Html(render::chat_page(&state.register_conversation()))
}

#[derive(Debug, Deserialize)]
struct ChatForm {
    #[serde(default)]
    message: String,
    #[serde(default)]
    conversation_id: Option<String>,
}

async fn chat(State(state): State<AppState>, Form(form): Form<ChatForm>) -> Html<String> {
    let outcome =
        handle_chat_message(&state, form.conversation_id.as_deref(), &form.message).await;
    Html(outcome.render())
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "configured": state.client.is_some(),
        "conversations": state.conversation_count()
    }))
}
