use ticket_qr_gateway::{adapters::HttpUpstream, config::Config, server::Server, telemetry};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    telemetry::init_tracing();

    let config = Config::load()?;
    tracing::info!("Loaded configuration: {:?}", config);

    if config.upstream.api_base.is_none() || config.upstream.access_token.is_none() {
        tracing::warn!("Upstream API base or access token missing, proxies will answer 500");
    }

    let upstream = HttpUpstream::new(&config.upstream)?;
    let server = Server::new(config, upstream).await?;
    server.run().await
}
