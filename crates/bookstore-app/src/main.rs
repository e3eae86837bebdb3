use bookstore_hex::application::Services;
use bookstore_hex::config::Config;
use bookstore_hex::inbound::http::{HttpServer, HttpServerConfig};
use bookstore_repo::{build_repo, Repo};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for DATABASE_URL / SERVER_PORT / ADMIN_EMAIL when present.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()))
        .init();

    let config = Config::from_env()?;
    let repo: Repo = build_repo(config.database_url.as_deref()).await?;
    tracing::info!(backend = repo.backend(), "storage ready");
    let services = Services::new(repo);

    if let Some(email) = config.admin_email.as_deref() {
        let admin = services.users.ensure_admin(email).await?;
        tracing::info!(admin_id = %admin.id, "admin callers use this id in the x-user-id header");
    }

    let server_cfg = HttpServerConfig {
        port: config.server_port.clone(),
    };

    let http = HttpServer::new(services, server_cfg).await?;
    http.run().await
}
