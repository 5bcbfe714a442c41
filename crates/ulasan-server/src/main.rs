mod api;
mod middleware;

use tracing_subscriber::EnvFilter;
use ulasan_sentiment::Lexicon;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = ulasan_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let lexicon_file = match &config.lexicon_path {
        Some(path) => ulasan_core::load_lexicon(path)?,
        None => ulasan_core::builtin_lexicon()?,
    };
    let lexicon = Lexicon::from(lexicon_file);
    tokio::fs::create_dir_all(&config.data_dir).await?;

    let auth = AuthState::from_env(matches!(config.env, ulasan_core::Environment::Development))?;
    let bind_addr = config.bind_addr;
    let state = AppState::from_config(config, lexicon)?;
    tracing::info!(
        env = %state.config.env,
        storage = state.store.backend_name(),
        data_dir = %state.config.data_dir.display(),
        "starting ulasan-server"
    );
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
