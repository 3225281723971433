// Concurrent dataset loading. Each CSV is parsed on the blocking pool and
// aggregation starts only after every load has finished.

use std::path::Path;

use anyhow::Context;
use diamond_core::config::DataPaths;
use diamond_core::loader::{self, Dataset, LoadError};
use tracing::info;

async fn load_blocking<T, F>(path: String, load: F) -> anyhow::Result<Vec<T>>
where
    T: Send + 'static,
    F: FnOnce(&Path) -> Result<Vec<T>, LoadError> + Send + 'static,
{
    let rows = tokio::task::spawn_blocking(move || load(Path::new(&path)))
        .await
        .context("dataset loader task failed")??;
    Ok(rows)
}

/// Load every configured dataset concurrently. Any failure fails the whole
/// load; the optional teams file yields no rows when it is not configured.
pub async fn load_dataset(paths: &DataPaths) -> anyhow::Result<Dataset> {
    let teams = paths.teams.clone();
    let (batting, pitching, bios, teams) = tokio::try_join!(
        load_blocking(paths.batting.clone(), loader::load_batting),
        load_blocking(paths.pitching.clone(), loader::load_pitching),
        load_blocking(paths.people.clone(), loader::load_bios),
        async move {
            match teams {
                Some(path) => load_blocking(path, loader::load_teams).await,
                None => Ok(Vec::new()),
            }
        },
    )?;

    info!(
        "Loaded {} batting rows, {} pitching rows, {} players, {} team seasons",
        batting.len(),
        pitching.len(),
        bios.len(),
        teams.len()
    );

    Ok(Dataset {
        batting,
        pitching,
        bios,
        teams,
    })
}
