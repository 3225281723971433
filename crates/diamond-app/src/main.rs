// Era study entry point.
//
// Startup sequence:
// 1. Initialize tracing (stderr, so stdout carries only the report)
// 2. Load config, copying defaults on first run
// 3. Load every dataset concurrently and wait for all of them
// 4. Aggregate, rank and build the report
// 5. Write the report as JSON to stdout

mod datasets;
mod report;

use std::io::Write;

use anyhow::Context;
use diamond_core::config;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;
    info!("Era study starting up");

    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: study={}, {} eras, {} leaderboards, {} trends",
        config.study_name,
        config.eras.spans().len(),
        config.leaderboards.len(),
        config.trends.len()
    );

    let dataset = datasets::load_dataset(&config.data_paths)
        .await
        .context("failed to load datasets")?;

    let report = report::build_report(&config, &dataset);

    let mut stdout = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report).context("failed to write report")?;
    writeln!(stdout)?;

    info!("Report written");
    Ok(())
}

fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("diamond=info,diamond_core=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
