use std::net::SocketAddr;
use std::sync::Arc;

use common::media::filesystem::FilesystemMediaStore;
use tracing::{Level, info, warn};

use server::config::AppConfig;
use server::mailer::Mailer;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;

    let db = server::database::init_db(&config.database.url).await?;

    let media = FilesystemMediaStore::new(
        config.storage.media_dir.clone().into(),
        config.storage.max_upload_size,
    )
    .await?;

    let mailer = Mailer::from_config(&config.mail)?;
    if mailer.is_none() {
        warn!("outbound email is disabled; contact messages will be stored without acknowledgement");
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    let state = AppState {
        db,
        media: Arc::new(media),
        mailer: mailer.map(Arc::new),
        config,
    };
    let app = server::build_router(state);

    info!("portfolio server listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
