use bottle_registry::{
    admins::services::ensure_admin, app, config::AppConfig, state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "bottle_registry=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = AppConfig::from_env()?;
    let state = AppState::init(config.clone()).await?;

    if let Some(seed) = &config.admin_seed {
        if ensure_admin(&state, seed).await? {
            tracing::info!(email = %seed.email, "seeded admin account");
        }
    }

    let app = app::build_app(state);
    app::serve(app, &config).await
}
