// Configuration loading and parsing (study.toml).

use crate::aggregate::Granularity;
use crate::era::{EraSpan, EraTable};
use crate::ranking::{Qualifier, RankQuery, Role, SortMetric, SortOrder};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

const STUDY_FILE: &str = "study.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

fn invalid(field: impl Into<String>, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub study_name: String,
    pub eras: EraTable,
    pub data_paths: DataPaths,
    pub leaderboards: Vec<LeaderboardConfig>,
    pub trends: Vec<TrendConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub batting: String,
    pub pitching: String,
    pub people: String,
    /// Optional (year, team) -> league table.
    #[serde(default)]
    pub teams: Option<String>,
}

/// A validated leaderboard: ranked entities per scope of `granularity`.
#[derive(Debug, Clone, PartialEq)]
pub struct LeaderboardConfig {
    pub name: String,
    pub role: Role,
    pub granularity: Granularity,
    pub query: RankQuery,
    /// Inclusive season range; `None` takes every loaded season.
    pub years: Option<(i32, i32)>,
}

/// A league-wide metric series over the scopes of `granularity`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrendConfig {
    pub name: String,
    pub role: Role,
    pub granularity: Granularity,
    #[serde(default)]
    pub years: Option<(i32, i32)>,
}

// ---------------------------------------------------------------------------
// study.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire study.toml file.
#[derive(Debug, Clone, Deserialize)]
struct StudyFile {
    study: StudySection,
    eras: Vec<EraSpan>,
    data_paths: DataPaths,
    #[serde(default)]
    leaderboards: Vec<RawLeaderboard>,
    #[serde(default)]
    trends: Vec<TrendConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct StudySection {
    name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct RawLeaderboard {
    name: String,
    role: Role,
    granularity: Granularity,
    metric: SortMetric,
    #[serde(default)]
    order: Option<SortOrder>,
    limit: usize,
    #[serde(default)]
    min_pa: Option<u64>,
    #[serde(default)]
    min_ab: Option<u64>,
    #[serde(default)]
    min_ip: Option<f64>,
    #[serde(default)]
    years: Option<(i32, i32)>,
}

fn check_years(field: String, years: Option<(i32, i32)>) -> Result<(), ConfigError> {
    match years {
        Some((start, end)) if start > end => {
            Err(invalid(field, format!("start {start} is after end {end}")))
        }
        _ => Ok(()),
    }
}

impl RawLeaderboard {
    fn into_config(self, index: usize) -> Result<LeaderboardConfig, ConfigError> {
        let field = |name: &str| format!("leaderboards[{index}].{name}");

        if self.name.trim().is_empty() {
            return Err(invalid(field("name"), "must not be empty"));
        }
        if self.limit == 0 {
            return Err(invalid(field("limit"), "must be > 0"));
        }
        check_years(field("years"), self.years)?;
        if self.metric.role() != self.role {
            return Err(invalid(
                field("metric"),
                format!("{:?} is not a {:?} metric", self.metric, self.role),
            ));
        }

        let mut qualifiers = Vec::new();
        if let Some(min) = self.min_pa {
            qualifiers.push(("min_pa", Qualifier::MinPlateAppearances(min)));
        }
        if let Some(min) = self.min_ab {
            qualifiers.push(("min_ab", Qualifier::MinAtBats(min)));
        }
        if let Some(min) = self.min_ip {
            if !min.is_finite() || min < 0.0 {
                return Err(invalid(field("min_ip"), format!("must be >= 0, got {min}")));
            }
            qualifiers.push(("min_ip", Qualifier::MinInningsPitched(min)));
        }
        if qualifiers.len() > 1 {
            return Err(invalid(
                field("min_*"),
                "at most one of min_pa, min_ab, min_ip may be set",
            ));
        }
        let qualifier = match qualifiers.pop() {
            Some((name, qualifier)) => {
                if qualifier.role() != Some(self.role) {
                    return Err(invalid(
                        field(name),
                        format!("does not apply to {:?}", self.role),
                    ));
                }
                qualifier
            }
            None => Qualifier::None,
        };

        let mut query = RankQuery::new(self.metric, self.limit, qualifier);
        if let Some(order) = self.order {
            query = query.with_order(order);
        }

        Ok(LeaderboardConfig {
            name: self.name,
            role: self.role,
            granularity: self.granularity,
            query,
            years: self.years,
        })
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/study.toml` relative to
/// `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` for that.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let study_path = base_dir.join("config").join(STUDY_FILE);
    let text = read_file(&study_path)?;
    parse_config(&text, &study_path)
}

/// Parse and validate study.toml contents. `path` is only used in errors.
pub fn parse_config(text: &str, path: &Path) -> Result<Config, ConfigError> {
    let file: StudyFile = toml::from_str(text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;

    if file.study.name.trim().is_empty() {
        return Err(invalid("study.name", "must not be empty"));
    }

    let eras = EraTable::new(file.eras).map_err(|e| invalid("eras", e.to_string()))?;

    let leaderboards = file
        .leaderboards
        .into_iter()
        .enumerate()
        .map(|(i, raw)| raw.into_config(i))
        .collect::<Result<Vec<_>, _>>()?;

    for (i, trend) in file.trends.iter().enumerate() {
        let field = |name: &str| format!("trends[{i}].{name}");
        if trend.name.trim().is_empty() {
            return Err(invalid(field("name"), "must not be empty"));
        }
        // A team series would need one league-wide entity per team.
        if trend.granularity == Granularity::Team {
            return Err(invalid(field("granularity"), "team trends are not supported"));
        }
        check_years(field("years"), trend.years)?;
    }

    Ok(Config {
        study_name: file.study.name,
        eras,
        data_paths: file.data_paths,
        leaderboards,
        trends: file.trends,
    })
}

/// Copy `defaults/study.toml` to `config/study.toml` unless a study file is
/// already in place. Returns the path written, if any.
pub fn ensure_study_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(STUDY_FILE);
    if target.exists() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(STUDY_FILE);
    let copy_error = |what: &str, path: &Path, e: std::io::Error| {
        ConfigError::DefaultsCopyError {
            message: format!("failed to {what} {}: {e}", path.display()),
        }
    };

    let mut defaults = std::fs::File::open(&source).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigError::DefaultsCopyError {
                message: format!(
                    "no config/{STUDY_FILE} and no defaults/{STUDY_FILE} under {}",
                    base_dir.display()
                ),
            }
        } else {
            copy_error("open", &source, e)
        }
    })?;

    if let Some(config_dir) = target.parent() {
        std::fs::create_dir_all(config_dir).map_err(|e| copy_error("create", config_dir, e))?;
    }

    // create_new keeps a file written concurrently by someone else.
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(dest) => dest,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(None),
        Err(e) => return Err(copy_error("create", &target, e)),
    };
    std::io::copy(&mut defaults, &mut dest).map_err(|e| copy_error("write", &target, e))?;

    info!("copied {} to {}", source.display(), target.display());
    Ok(Some(target))
}

/// Loads config relative to the current working directory, copying default
/// files first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_study_file(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Workspace root, where `defaults/` lives.
    fn project_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
    }

    fn default_study_text() -> String {
        fs::read_to_string(project_root().join("defaults/study.toml"))
            .expect("defaults/study.toml should exist")
    }

    fn parse(text: &str) -> Result<Config, ConfigError> {
        parse_config(text, Path::new("study.toml"))
    }

    fn expect_field(err: ConfigError, expected: &str) {
        match err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    const MINIMAL: &str = r#"
[study]
name = "Test"

[[eras]]
key = "a"
label = "A"
start = 1970
end = 1979

[data_paths]
batting = "b.csv"
pitching = "p.csv"
people = "m.csv"
"#;

    #[test]
    fn load_default_study() {
        let config = parse(&default_study_text()).expect("defaults should be valid");

        assert_eq!(config.study_name, "Baseball Eras 1970-2015");
        assert_eq!(config.eras.window(), (1970, 2015));
        assert_eq!(config.eras.spans().len(), 3);
        assert_eq!(config.eras.era_for(1993).map(|e| e.key.as_str()), Some("steroid"));
        assert_eq!(config.data_paths.batting, "datasets/Batting.csv");
        assert_eq!(config.data_paths.teams.as_deref(), Some("datasets/Teams.csv"));

        let hitters = &config.leaderboards[0];
        assert_eq!(hitters.name, "top-hitters");
        assert_eq!(hitters.role, Role::Hitters);
        assert_eq!(hitters.granularity, Granularity::Era);
        assert_eq!(hitters.query.metric, SortMetric::Ops);
        assert_eq!(hitters.query.order, SortOrder::Descending);
        assert_eq!(hitters.query.limit, 25);
        assert_eq!(hitters.query.qualifier, Qualifier::MinPlateAppearances(300));

        let pitchers = &config.leaderboards[1];
        assert_eq!(pitchers.query.metric, SortMetric::KBb);
        assert_eq!(pitchers.query.qualifier, Qualifier::MinInningsPitched(300.0));

        let season_pitchers = &config.leaderboards[3];
        assert_eq!(season_pitchers.query.order, SortOrder::Ascending);

        assert_eq!(config.trends.len(), 3);
        assert_eq!(config.trends[0].granularity, Granularity::Year);
        assert_eq!(config.trends[1].granularity, Granularity::Decade);
        assert_eq!(config.trends[1].years, Some((1950, 2010)));
        assert_eq!(config.leaderboards[0].years, None);
    }

    #[test]
    fn minimal_study_has_no_boards() {
        let config = parse(MINIMAL).unwrap();
        assert!(config.leaderboards.is_empty());
        assert!(config.trends.is_empty());
        assert!(config.data_paths.teams.is_none());
    }

    #[test]
    fn explicit_order_overrides_default() {
        let text = format!(
            "{MINIMAL}
[[leaderboards]]
name = \"worst-era\"
role = \"pitchers\"
granularity = \"era\"
metric = \"era\"
order = \"descending\"
limit = 5
"
        );
        let config = parse(&text).unwrap();
        assert_eq!(config.leaderboards[0].query.order, SortOrder::Descending);
        assert_eq!(config.leaderboards[0].query.qualifier, Qualifier::None);
    }

    #[test]
    fn rejects_metric_for_wrong_role() {
        let text = format!(
            "{MINIMAL}
[[leaderboards]]
name = \"x\"
role = \"hitters\"
granularity = \"era\"
metric = \"fip\"
limit = 5
"
        );
        expect_field(parse(&text).unwrap_err(), "leaderboards[0].metric");
    }

    #[test]
    fn rejects_qualifier_for_wrong_role() {
        let text = format!(
            "{MINIMAL}
[[leaderboards]]
name = \"x\"
role = \"pitchers\"
granularity = \"era\"
metric = \"fip\"
limit = 5
min_pa = 300
"
        );
        expect_field(parse(&text).unwrap_err(), "leaderboards[0].min_pa");
    }

    #[test]
    fn rejects_two_qualifiers() {
        let text = format!(
            "{MINIMAL}
[[leaderboards]]
name = \"x\"
role = \"hitters\"
granularity = \"year\"
metric = \"ops\"
limit = 5
min_pa = 300
min_ab = 400
"
        );
        expect_field(parse(&text).unwrap_err(), "leaderboards[0].min_*");
    }

    #[test]
    fn rejects_zero_limit() {
        let text = format!(
            "{MINIMAL}
[[leaderboards]]
name = \"x\"
role = \"hitters\"
granularity = \"year\"
metric = \"ops\"
limit = 0
"
        );
        expect_field(parse(&text).unwrap_err(), "leaderboards[0].limit");
    }

    #[test]
    fn rejects_negative_innings() {
        let text = format!(
            "{MINIMAL}
[[leaderboards]]
name = \"x\"
role = \"pitchers\"
granularity = \"year\"
metric = \"era\"
limit = 3
min_ip = -1.0
"
        );
        expect_field(parse(&text).unwrap_err(), "leaderboards[0].min_ip");
    }

    #[test]
    fn year_windows_for_boards_and_trends() {
        let text = format!(
            "{MINIMAL}
[[leaderboards]]
name = \"fifties\"
role = \"hitters\"
granularity = \"year\"
metric = \"avg\"
limit = 5
years = [1950, 1959]

[[trends]]
name = \"by-decade\"
role = \"pitchers\"
granularity = \"decade\"
years = [1950, 2010]

[[trends]]
name = \"by-league\"
role = \"hitters\"
granularity = \"league\"
"
        );
        let config = parse(&text).unwrap();
        assert_eq!(config.leaderboards[0].years, Some((1950, 1959)));
        assert_eq!(config.trends[0].years, Some((1950, 2010)));
        assert_eq!(config.trends[1].years, None);
    }

    #[test]
    fn rejects_inverted_year_window() {
        let text = format!(
            "{MINIMAL}
[[trends]]
name = \"x\"
role = \"hitters\"
granularity = \"decade\"
years = [2010, 1950]
"
        );
        expect_field(parse(&text).unwrap_err(), "trends[0].years");

        let text = format!(
            "{MINIMAL}
[[leaderboards]]
name = \"x\"
role = \"hitters\"
granularity = \"year\"
metric = \"ops\"
limit = 5
years = [2000, 1999]
"
        );
        expect_field(parse(&text).unwrap_err(), "leaderboards[0].years");
    }

    #[test]
    fn rejects_team_trend() {
        let text = format!(
            "{MINIMAL}
[[trends]]
name = \"by-team\"
role = \"hitters\"
granularity = \"team\"
"
        );
        expect_field(parse(&text).unwrap_err(), "trends[0].granularity");
    }

    #[test]
    fn rejects_gapped_eras() {
        let text = default_study_text().replace("start = 1993", "start = 1994");
        expect_field(parse(&text).unwrap_err(), "eras");
    }

    #[test]
    fn rejects_empty_study_name() {
        let text = MINIMAL.replace("name = \"Test\"", "name = \"  \"");
        expect_field(parse(&text).unwrap_err(), "study.name");
    }

    #[test]
    fn parse_error_for_unknown_metric() {
        let text = format!(
            "{MINIMAL}
[[leaderboards]]
name = \"x\"
role = \"hitters\"
granularity = \"era\"
metric = \"war\"
limit = 5
"
        );
        assert!(matches!(parse(&text).unwrap_err(), ConfigError::ParseError { .. }));
    }

    #[test]
    fn file_not_found_for_missing_study_toml() {
        let tmp = std::env::temp_dir().join("diamond_config_test_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with("study.toml")),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = std::env::temp_dir().join("diamond_config_test_invalid");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config/study.toml"), "this is not valid [[[ toml").unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with("study.toml")),
            other => panic!("expected ParseError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn study_file_copied_once() {
        let tmp = std::env::temp_dir().join("diamond_config_test_ensure");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults/study.toml"), default_study_text()).unwrap();

        let copied = ensure_study_file(&tmp).expect("should copy defaults");
        assert_eq!(copied, Some(tmp.join("config/study.toml")));

        // Customized copy survives a second pass.
        fs::write(tmp.join("config/study.toml"), "# custom\n").unwrap();
        assert_eq!(ensure_study_file(&tmp).unwrap(), None);
        assert_eq!(
            fs::read_to_string(tmp.join("config/study.toml")).unwrap(),
            "# custom\n"
        );

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn existing_study_file_needs_no_defaults() {
        let tmp = std::env::temp_dir().join("diamond_config_test_no_defaults");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config/study.toml"), MINIMAL).unwrap();

        assert_eq!(ensure_study_file(&tmp).unwrap(), None);
        assert_eq!(load_config_from(&tmp).unwrap().study_name, "Test");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn study_file_errors_when_nothing_to_copy() {
        let tmp = std::env::temp_dir().join("diamond_config_test_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match ensure_study_file(&tmp).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("no defaults/study.toml"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }
        assert!(!tmp.join("config").exists());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn loads_copied_defaults_from_disk() {
        let tmp = std::env::temp_dir().join("diamond_config_test_roundtrip");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("defaults")).unwrap();
        fs::write(tmp.join("defaults/study.toml"), default_study_text()).unwrap();

        ensure_study_file(&tmp).unwrap();
        let config = load_config_from(&tmp).expect("copied defaults should load");
        assert_eq!(config.leaderboards.len(), 4);

        let _ = fs::remove_dir_all(&tmp);
    }
}
