use std::sync::Arc;

use anyhow::Context as _;
use clap::Parser as _;
use post_stats::config::Backend;
use post_stats::fixtures::Fixture;
use post_stats::{in_memory, mongo, Conductor, Config, Services, Session};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

async fn async_main(config: Config) -> anyhow::Result<()> {
    let services = build_services(&config).await?;

    let session = Arc::new(Session::new(config.user_id.clone(), services.user_current.clone()));
    match session.refresh().await {
        Ok(u) => tracing::info!("acting as {} (@{})", u.name, u.username),
        // widgets start unsaved until a refresh succeeds
        Err(e) => tracing::warn!("cannot fetch current user: {}", e),
    }

    Conductor::new(services, session)
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
}

async fn build_services(config: &Config) -> anyhow::Result<Services> {
    match config.backend {
        Backend::Memory => {
            let backend = in_memory();
            if let Some(path) = &config.fixture {
                let fixture = Fixture::from_path(path)
                    .with_context(|| format!("cannot load fixture `{}`", path.display()))?;
                backend.load(fixture).await?;
            }

            Ok(backend.services())
        },
        Backend::Mongo => {
            let uri = config.mongo_uri.as_deref().unwrap_or_default();

            mongo(uri, &config.database, &config.collections).await
        },
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    if let Err(e) = config.validate() {
        return eprintln!("{}", e);
    }

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(r) => r,
        Err(e) => return eprintln!("{}", e),
    };

    if let Err(e) = rt.block_on(async_main(config)) {
        eprintln!("{:#}", e);
        std::process::exit(1);
    }
}
