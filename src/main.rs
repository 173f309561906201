use anyhow::Context;
use recipe_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load recipe-api settings")?;
    recipe_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        address = %settings.bind_address(),
        "recipe-api bootstrap starting"
    );

    recipe_api::run(settings).await
}
