// Dataset loading from Lahman-format CSV files.
//
// Batting.csv / Pitching.csv hold one row per player-team-season (stint),
// Master.csv (or People.csv) holds names, Teams.csv maps (year, team) to a
// league. Counting cells that are empty or non-numeric read as 0; rows without
// a player id are skipped with a warning. Extra columns are ignored.

use crate::config::DataPaths;
use crate::lines::{BattingLine, PitchingLine, PlayerBio, TeamSeason};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("validation error: {0}")]
    Validation(String),
}

/// Every dataset one study run needs, loaded together.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub batting: Vec<BattingLine>,
    pub pitching: Vec<PitchingLine>,
    pub bios: Vec<PlayerBio>,
    pub teams: Vec<TeamSeason>,
}

// ---------------------------------------------------------------------------
// Raw CSV serde structs (private), Lahman column names
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawBatting {
    playerID: String,
    yearID: i32,
    #[serde(default)]
    teamID: String,
    #[serde(default)]
    lgID: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    AB: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    R: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    H: Option<u32>,
    #[serde(rename = "2B", default, deserialize_with = "csv::invalid_option")]
    doubles: Option<u32>,
    #[serde(rename = "3B", default, deserialize_with = "csv::invalid_option")]
    triples: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    HR: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    BB: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    SO: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    HBP: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    SF: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawPitching {
    playerID: String,
    yearID: i32,
    #[serde(default)]
    teamID: String,
    #[serde(default)]
    lgID: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    G: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    GS: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    IPouts: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    ER: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    HR: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    BB: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    SO: Option<u32>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    HBP: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawPerson {
    playerID: String,
    #[serde(default)]
    nameFirst: Option<String>,
    #[serde(default)]
    nameLast: Option<String>,
    #[serde(default)]
    nameGiven: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(non_snake_case)]
struct RawTeam {
    yearID: i32,
    teamID: String,
    lgID: String,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn count(value: Option<u32>) -> u32 {
    value.unwrap_or(0)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Deserialize every row, skipping (and logging) rows that fail to parse and
/// rows that `convert` rejects. Header and I/O failures are fatal.
fn read_rows<R, Raw, T, F>(rdr: R, what: &str, mut convert: F) -> Result<Vec<T>, csv::Error>
where
    R: Read,
    Raw: for<'de> Deserialize<'de>,
    F: FnMut(Raw) -> Option<T>,
{
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    // Surface a missing/broken header before iterating.
    reader.headers()?;

    let mut rows = Vec::new();
    for result in reader.deserialize::<Raw>() {
        match result {
            Ok(raw) => {
                if let Some(row) = convert(raw) {
                    rows.push(row);
                }
            }
            Err(e) if e.is_io_error() => return Err(e),
            Err(e) => warn!("skipping malformed {} row: {}", what, e),
        }
    }
    Ok(rows)
}

// ---------------------------------------------------------------------------
// Reader-based loaders
// ---------------------------------------------------------------------------

pub fn load_batting_from_reader<R: Read>(rdr: R) -> Result<Vec<BattingLine>, csv::Error> {
    read_rows(rdr, "batting", |raw: RawBatting| {
        if raw.playerID.is_empty() {
            warn!("skipping batting row for {} without playerID", raw.yearID);
            return None;
        }
        Some(BattingLine {
            player_id: raw.playerID,
            year: raw.yearID,
            team_id: raw.teamID,
            league_id: non_empty(raw.lgID),
            ab: count(raw.AB),
            h: count(raw.H),
            bb: count(raw.BB),
            so: count(raw.SO),
            hbp: count(raw.HBP),
            sf: count(raw.SF),
            doubles: count(raw.doubles),
            triples: count(raw.triples),
            hr: count(raw.HR),
            r: count(raw.R),
        })
    })
}

pub fn load_pitching_from_reader<R: Read>(rdr: R) -> Result<Vec<PitchingLine>, csv::Error> {
    read_rows(rdr, "pitching", |raw: RawPitching| {
        if raw.playerID.is_empty() {
            warn!("skipping pitching row for {} without playerID", raw.yearID);
            return None;
        }
        Some(PitchingLine {
            player_id: raw.playerID,
            year: raw.yearID,
            team_id: raw.teamID,
            league_id: non_empty(raw.lgID),
            ip_outs: count(raw.IPouts),
            so: count(raw.SO),
            bb: count(raw.BB),
            hbp: count(raw.HBP),
            hr: count(raw.HR),
            er: count(raw.ER),
            g: count(raw.G),
            gs: count(raw.GS),
        })
    })
}

pub fn load_bios_from_reader<R: Read>(rdr: R) -> Result<Vec<PlayerBio>, csv::Error> {
    read_rows(rdr, "people", |raw: RawPerson| {
        if raw.playerID.is_empty() {
            warn!("skipping people row without playerID");
            return None;
        }
        Some(PlayerBio {
            player_id: raw.playerID,
            name_first: raw.nameFirst,
            name_last: raw.nameLast,
            name_given: raw.nameGiven,
        })
    })
}

pub fn load_teams_from_reader<R: Read>(rdr: R) -> Result<Vec<TeamSeason>, csv::Error> {
    read_rows(rdr, "teams", |raw: RawTeam| {
        if raw.teamID.is_empty() || raw.lgID.is_empty() {
            warn!("skipping teams row for {} without teamID/lgID", raw.yearID);
            return None;
        }
        Some(TeamSeason {
            year: raw.yearID,
            team_id: raw.teamID,
            league_id: raw.lgID,
        })
    })
}

// ---------------------------------------------------------------------------
// Public path-based loaders
// ---------------------------------------------------------------------------

fn load_path<T>(
    path: &Path,
    from_reader: fn(std::fs::File) -> Result<Vec<T>, csv::Error>,
) -> Result<Vec<T>, LoadError> {
    let file = std::fs::File::open(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    let rows = from_reader(file).map_err(|e| LoadError::Csv {
        path: path.display().to_string(),
        source: e,
    })?;
    info!("loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Load batting lines from a CSV file. Errors if no valid row was read.
pub fn load_batting(path: &Path) -> Result<Vec<BattingLine>, LoadError> {
    let rows = load_path(path, load_batting_from_reader)?;
    if rows.is_empty() {
        return Err(LoadError::Validation(format!(
            "batting CSV {} produced zero valid rows",
            path.display()
        )));
    }
    Ok(rows)
}

/// Load pitching lines from a CSV file. Errors if no valid row was read.
pub fn load_pitching(path: &Path) -> Result<Vec<PitchingLine>, LoadError> {
    let rows = load_path(path, load_pitching_from_reader)?;
    if rows.is_empty() {
        return Err(LoadError::Validation(format!(
            "pitching CSV {} produced zero valid rows",
            path.display()
        )));
    }
    Ok(rows)
}

pub fn load_bios(path: &Path) -> Result<Vec<PlayerBio>, LoadError> {
    load_path(path, load_bios_from_reader)
}

pub fn load_teams(path: &Path) -> Result<Vec<TeamSeason>, LoadError> {
    load_path(path, load_teams_from_reader)
}

/// Load every dataset sequentially from explicit paths. The teams file is
/// optional.
pub fn load_all_from_paths(paths: &DataPaths) -> Result<Dataset, LoadError> {
    let batting = load_batting(Path::new(&paths.batting))?;
    let pitching = load_pitching(Path::new(&paths.pitching))?;
    let bios = load_bios(Path::new(&paths.people))?;
    let teams = match &paths.teams {
        Some(teams) => load_teams(Path::new(teams))?,
        None => Vec::new(),
    };

    Ok(Dataset {
        batting,
        pitching,
        bios,
        teams,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
