//! Parley application binary - composition root.
//!
//! Ties together the Parley crates into a single executable:
//! 1. Parse CLI arguments and load configuration (TOML + env overrides)
//! 2. Choose the reply resolver (completion provider or echo fallback)
//! 3. Build the voice bridge if a speech key is configured
//! 4. Start the axum HTTP server with the embedded frontend

mod cli;

use clap::Parser;

use parley_api::AppState;
use parley_core::ParleyConfig;

use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config: file, then env overrides, then CLI flags.
    let config_file = args.resolve_config_path();
    let mut config = ParleyConfig::load_or_default(&config_file);
    config.apply_process_env();
    if let Some(port) = args.port {
        config.server.port = port;
    }

    // Tracing.
    let log_level = args.resolve_log_level(&config.server.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    tracing::info!("Starting Parley v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    if config.completion.is_configured() {
        tracing::info!(model = %config.completion.model, "Chat replies via completion provider");
    } else {
        tracing::info!("Chat replies via echo fallback (no completion credential)");
    }
    if config.speech.is_configured() {
        tracing::info!(voice = %config.speech.voice_id, "Voice bridge enabled");
    } else {
        tracing::info!("Voice bridge disabled (no speech credential)");
    }

    let port = config.server.port;
    let state = AppState::from_config(config);

    tracing::info!("Chat UI at http://127.0.0.1:{}/ui", port);

    parley_api::start_server(state).await?;

    Ok(())
}
