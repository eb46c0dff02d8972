use slugscope_app::error::AppError;
use slugscope_app::fixture::Fixture;
use slugscope_app::runner::run;
use slugscope_core::config::load_config;
use slugscope_service::token::RandomTokenSource;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping info");
    }

    let fixture_path = config
        .fixture
        .path
        .as_deref()
        .ok_or(AppError::MissingFixture)?;
    let fixture = Fixture::from_path(fixture_path)?;
    let index = fixture.index();

    tracing::info!(
        path = %fixture_path,
        stores = fixture.stores.len(),
        records = fixture.paths.len(),
        requests = fixture.requests.len(),
        "Fixture loaded"
    );

    for resolution in run(&config.resolver, &fixture, &index, RandomTokenSource)? {
        println!("{}", serde_json::to_string(&resolution)?);
    }

    Ok(())
}
