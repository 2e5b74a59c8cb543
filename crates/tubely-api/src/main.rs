use anyhow::Result;
use tubely_api::{setup, telemetry};
use tubely_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    telemetry::init_telemetry(config.is_production());

    let (_state, app) = setup::initialize_app(config.clone()).await?;
    setup::server::start_server(&config, app).await
}
