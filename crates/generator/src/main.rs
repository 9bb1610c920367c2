use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use generator::config::Settings;
use generator::generator::Generator;
use generator::render::HandlebarsRenderer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "generator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting docker-gen");

    let settings = Settings::load().map_err(|e| {
        error!(error = %e, "failed to load configuration");
        e
    })?;
    info!(
        endpoint = %settings.docker_endpoint,
        all = settings.all,
        configs = settings.configs.configs.len(),
        "loaded configuration"
    );

    let renderer = Arc::new(HandlebarsRenderer::new());
    let gen = Generator::new(settings, renderer).await.map_err(|e| {
        error!(error = %e, "failed to initialize generator");
        e
    })?;

    gen.generate().await?;

    info!("docker-gen shut down cleanly");
    Ok(())
}
