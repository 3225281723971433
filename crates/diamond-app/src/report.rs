// Report assembly: every configured leaderboard for every scope of its
// granularity, plus every configured trend series.

use diamond_core::aggregate::{
    aggregate, AggregationContext, AggregationPlan, EntityMode, Granularity, Scope,
};
use diamond_core::config::{Config, LeaderboardConfig, TrendConfig};
use diamond_core::era::{EraSpan, EraTable};
use diamond_core::lines::{CountingStats, SeasonLine};
use diamond_core::loader::Dataset;
use diamond_core::metrics::{HitterMetrics, PitcherMetrics};
use diamond_core::names::{LeagueBook, NameBook};
use diamond_core::ranking::{
    series, top_n, RankQuery, Ranked, RankedMetrics, Role, SortMetric, SortOrder, TrendPoint,
};
use serde::Serialize;
use tracing::{debug, info};

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct Report {
    pub study: String,
    pub window: (i32, i32),
    pub eras: Vec<EraSpan>,
    pub leaderboards: Vec<LeaderboardReport>,
    pub trends: Vec<TrendReport>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardReport {
    pub name: String,
    pub role: Role,
    pub granularity: Granularity,
    pub metric: SortMetric,
    pub order: SortOrder,
    pub limit: usize,
    pub years: Option<(i32, i32)>,
    pub scopes: Boards,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Boards {
    Hitters(Vec<ScopeBoard<HitterMetrics>>),
    Pitchers(Vec<ScopeBoard<PitcherMetrics>>),
}

impl Boards {
    pub fn len(&self) -> usize {
        match self {
            Boards::Hitters(boards) => boards.len(),
            Boards::Pitchers(boards) => boards.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ranked entities of one scope. `entries` is empty when nobody qualifies.
#[derive(Debug, Serialize)]
pub struct ScopeBoard<M> {
    pub scope: Scope,
    pub label: String,
    pub entries: Vec<Ranked<M>>,
}

#[derive(Debug, Serialize)]
pub struct TrendReport {
    pub name: String,
    pub role: Role,
    pub granularity: Granularity,
    pub years: Option<(i32, i32)>,
    pub points: Series,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Series {
    Hitters(Vec<TrendPoint<HitterMetrics>>),
    Pitchers(Vec<TrendPoint<PitcherMetrics>>),
}

// ---------------------------------------------------------------------------
// Scope helpers
// ---------------------------------------------------------------------------

/// Human label for a scope: era labels come from the table.
pub fn scope_label(scope: &Scope, eras: &EraTable) -> String {
    match scope {
        Scope::All => {
            let (first, last) = eras.window();
            format!("All Eras ({first}-{last})")
        }
        Scope::Era(key) => eras
            .get(key)
            .map(|span| span.label.clone())
            .unwrap_or_else(|| scope.to_string()),
        other => other.to_string(),
    }
}

/// Scopes reported for a granularity. Era views always list "all" and every
/// era in table order, even when a scope received no rows; other views list
/// the populated scopes in sorted order.
fn report_scopes<T: CountingStats>(
    granularity: Granularity,
    eras: &EraTable,
    ctx: &AggregationContext<T>,
) -> Vec<Scope> {
    match granularity {
        Granularity::Era => std::iter::once(Scope::All)
            .chain(eras.spans().iter().map(|span| Scope::Era(span.key.clone())))
            .collect(),
        _ => ctx.scopes(),
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

/// Lookups shared by every aggregation pass of one report.
struct Lookups {
    names: NameBook,
    leagues: LeagueBook,
}

fn leaderboard<L>(
    lines: &[L],
    board: &LeaderboardConfig,
    eras: &EraTable,
    lookups: &Lookups,
) -> Vec<ScopeBoard<<L::Totals as CountingStats>::Metrics>>
where
    L: SeasonLine,
    <L::Totals as CountingStats>::Metrics: RankedMetrics,
{
    let plan = AggregationPlan::new(eras, board.granularity, EntityMode::Player)
        .with_years(board.years);
    let ctx = aggregate(lines, &plan, &lookups.names, &lookups.leagues);
    ranked_scopes(&ctx, board.granularity, &board.query, eras)
}

fn ranked_scopes<T>(
    ctx: &AggregationContext<T>,
    granularity: Granularity,
    query: &RankQuery,
    eras: &EraTable,
) -> Vec<ScopeBoard<T::Metrics>>
where
    T: CountingStats,
    T::Metrics: RankedMetrics,
{
    report_scopes(granularity, eras, ctx)
        .into_iter()
        .map(|scope| {
            let entries = top_n(ctx, &scope, query);
            if entries.is_empty() {
                debug!("no qualifying entities for {}", scope);
            }
            ScopeBoard {
                label: scope_label(&scope, eras),
                scope,
                entries,
            }
        })
        .collect()
}

fn trend<L: SeasonLine>(
    lines: &[L],
    trend: &TrendConfig,
    eras: &EraTable,
    lookups: &Lookups,
) -> Vec<TrendPoint<<L::Totals as CountingStats>::Metrics>> {
    let plan = AggregationPlan::new(eras, trend.granularity, EntityMode::League)
        .with_years(trend.years);
    let ctx = aggregate(lines, &plan, &lookups.names, &lookups.leagues);
    let mut points = series(&ctx, &report_scopes(trend.granularity, eras, &ctx));
    for point in &mut points {
        point.label = scope_label(&point.scope, eras);
    }
    points
}

/// Build the full report for `config` over a completely loaded dataset.
pub fn build_report(config: &Config, data: &Dataset) -> Report {
    let eras = &config.eras;
    let lookups = Lookups {
        names: NameBook::from_bios(&data.bios),
        leagues: LeagueBook::from_team_seasons(&data.teams),
    };
    info!(
        "lookups: {} player names, {} team seasons",
        lookups.names.len(),
        lookups.leagues.len()
    );
    if lookups.leagues.is_empty() {
        info!("no team seasons loaded, leagues come from the season rows");
    }

    let leaderboards: Vec<LeaderboardReport> = config
        .leaderboards
        .iter()
        .map(|board| {
            let scopes = match board.role {
                Role::Hitters => Boards::Hitters(leaderboard(&data.batting, board, eras, &lookups)),
                Role::Pitchers => {
                    Boards::Pitchers(leaderboard(&data.pitching, board, eras, &lookups))
                }
            };
            if scopes.is_empty() {
                info!("leaderboard '{}': no scopes received data", board.name);
            } else {
                info!("leaderboard '{}': {} scopes", board.name, scopes.len());
            }
            LeaderboardReport {
                name: board.name.clone(),
                role: board.role,
                granularity: board.granularity,
                metric: board.query.metric,
                order: board.query.order,
                limit: board.query.limit,
                years: board.years,
                scopes,
            }
        })
        .collect();

    let trends = config
        .trends
        .iter()
        .map(|t| {
            let points = match t.role {
                Role::Hitters => Series::Hitters(trend(&data.batting, t, eras, &lookups)),
                Role::Pitchers => Series::Pitchers(trend(&data.pitching, t, eras, &lookups)),
            };
            TrendReport {
                name: t.name.clone(),
                role: t.role,
                granularity: t.granularity,
                years: t.years,
                points,
            }
        })
        .collect();

    Report {
        study: config.study_name.clone(),
        window: eras.window(),
        eras: eras.spans().to_vec(),
        leaderboards,
        trends,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
