use anyhow::Result;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use agentforce_chat::agentforce::AgentforceClient;
use agentforce_chat::config::{AgentforceConfig, ServerConfig};
use agentforce_chat::error::AgentforceError;
use agentforce_chat::routes;
use agentforce_chat::state::{AppState, RegistryLimits};

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine, the variables may come from the environment
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("agentforce_chat=debug,tower_http=debug")),
        )
        .init();

    if let Ok(path) = dotenv {
        info!("Loaded environment from {}", path.display());
    }

    let server_config = ServerConfig::from_env()?;

    let app_state = match AgentforceConfig::from_env() {
        Ok(config) => {
            let client = AgentforceClient::new(config, server_config.request_timeout())?;
            AppState::new(client).with_limits(RegistryLimits {
                max_conversations: server_config.max_conversations,
                idle_timeout: server_config.conversation_idle_timeout(),
            })
        }
        Err(AgentforceError::Configuration { missing }) => {
            warn!(
                "Salesforce credentials incomplete, chat disabled. Missing: {}",
                missing.join(", ")
            );
            AppState::unconfigured(missing)
        }
        Err(e) => {
            error!("Failed to load Salesforce configuration: {}", e);
            return Err(e.into());
        }
    };

    let app = routes::app(app_state);

    let listener =
        tokio::net::TcpListener::bind((server_config.host.as_str(), server_config.port)).await?;
    info!("Starting server on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
