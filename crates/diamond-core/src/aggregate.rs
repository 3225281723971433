// Per-entity aggregation: folds season rows into running totals keyed by
// scope (all / era / year / decade / team / league) and entity.
//
// One generic fold serves every granularity; the plan's scope extractor is the
// only thing that changes between an era leaderboard and a per-year league
// trend line.

use crate::era::EraTable;
use crate::lines::{CountingStats, SeasonLine};
use crate::names::{LeagueBook, NameBook};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Display name of the single entity in league-wide aggregation.
pub const LEAGUE_ENTITY_NAME: &str = "League";

// ---------------------------------------------------------------------------
// Scopes
// ---------------------------------------------------------------------------

/// A bucket that season rows are accumulated into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum Scope {
    /// The whole study window.
    All,
    Era(String),
    Year(i32),
    /// First year of the decade, e.g. 1990 for 1990–1999.
    Decade(i32),
    Team(String),
    League(String),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => write!(f, "all"),
            Scope::Era(key) => write!(f, "era:{key}"),
            Scope::Year(year) => write!(f, "{year}"),
            Scope::Decade(start) => write!(f, "{start}s"),
            Scope::Team(team) => write!(f, "team:{team}"),
            Scope::League(league) => write!(f, "league:{league}"),
        }
    }
}

/// First year of the decade containing `year`.
pub fn decade_of(year: i32) -> i32 {
    year - year.rem_euclid(10)
}

/// How rows are bucketed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// The "all" bucket plus the row's era.
    Era,
    Year,
    Decade,
    Team,
    League,
}

/// Who a row is credited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityMode {
    /// One record per player per scope.
    Player,
    /// A single league-wide record per scope.
    League,
}

#[derive(Debug, Clone, Copy)]
pub struct AggregationPlan<'a> {
    pub eras: &'a EraTable,
    pub granularity: Granularity,
    pub entity: EntityMode,
    /// Inclusive year range a row must fall in. `None` admits every year.
    pub years: Option<(i32, i32)>,
}

impl<'a> AggregationPlan<'a> {
    pub fn new(eras: &'a EraTable, granularity: Granularity, entity: EntityMode) -> Self {
        Self {
            eras,
            granularity,
            entity,
            years: None,
        }
    }

    /// Restrict the plan to seasons `start..=end`.
    pub fn with_years(mut self, years: Option<(i32, i32)>) -> Self {
        self.years = years;
        self
    }

    /// Scopes a row contributes to.
    ///
    /// Era plans only see rows inside the era table. Year, decade, team and
    /// league plans bucket every row within `years`. Rows whose league cannot
    /// be resolved land nowhere.
    pub fn scopes_for<L: SeasonLine>(&self, line: &L, leagues: &LeagueBook) -> Vec<Scope> {
        let year = line.year();
        if let Some((start, end)) = self.years {
            if year < start || year > end {
                return Vec::new();
            }
        }

        match self.granularity {
            Granularity::Era => match self.eras.era_for(year) {
                Some(era) => vec![Scope::All, Scope::Era(era.key.clone())],
                None => Vec::new(),
            },
            Granularity::Year => vec![Scope::Year(year)],
            Granularity::Decade => vec![Scope::Decade(decade_of(year))],
            Granularity::Team => vec![Scope::Team(line.team_id().to_string())],
            Granularity::League => leagues
                .league_for(year, line.team_id())
                .or_else(|| line.league_id())
                .filter(|league| !league.is_empty())
                .map(|league| vec![Scope::League(league.to_string())])
                .unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Running totals for one entity within one scope.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRecord<T> {
    /// Player id, or `None` for the league-wide entity.
    pub identity: Option<String>,
    pub name: String,
    pub totals: T,
}

/// Records of one scope in first-contribution order.
#[derive(Debug, Clone)]
struct ScopeTable<T> {
    records: Vec<AggregateRecord<T>>,
    index: HashMap<Option<String>, usize>,
}

impl<T> Default for ScopeTable<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

/// All aggregates produced by one load pass.
#[derive(Debug, Clone)]
pub struct AggregationContext<T> {
    tables: HashMap<Scope, ScopeTable<T>>,
    pub rows_accumulated: usize,
    pub rows_skipped: usize,
}

impl<T> Default for AggregationContext<T> {
    fn default() -> Self {
        Self {
            tables: HashMap::new(),
            rows_accumulated: 0,
            rows_skipped: 0,
        }
    }
}

impl<T: CountingStats> AggregationContext<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one row's counting fields to the record for `(scope, identity)`,
    /// creating it on first contribution. `name` is only called on creation.
    pub fn accumulate<F>(&mut self, scope: Scope, identity: Option<&str>, name: F, fields: &T)
    where
        F: FnOnce() -> String,
    {
        let table = self.tables.entry(scope).or_default();
        let key = identity.map(str::to_string);
        let slot = match table.index.get(&key) {
            Some(&slot) => slot,
            None => {
                let slot = table.records.len();
                table.records.push(AggregateRecord {
                    identity: key.clone(),
                    name: name(),
                    totals: T::default(),
                });
                table.index.insert(key, slot);
                slot
            }
        };
        table.records[slot].totals.merge(fields);
    }

    /// Records of `scope` in first-contribution order; empty if the scope
    /// never received a row.
    pub fn records(&self, scope: &Scope) -> &[AggregateRecord<T>] {
        self.tables
            .get(scope)
            .map(|table| table.records.as_slice())
            .unwrap_or(&[])
    }

    pub fn get(&self, scope: &Scope, identity: Option<&str>) -> Option<&AggregateRecord<T>> {
        let table = self.tables.get(scope)?;
        let slot = table.index.get(&identity.map(str::to_string))?;
        table.records.get(*slot)
    }

    /// Every populated scope, sorted.
    pub fn scopes(&self) -> Vec<Scope> {
        let mut scopes: Vec<Scope> = self.tables.keys().cloned().collect();
        scopes.sort();
        scopes
    }

    pub fn contains_scope(&self, scope: &Scope) -> bool {
        self.tables.contains_key(scope)
    }
}

// ---------------------------------------------------------------------------
// Fold
// ---------------------------------------------------------------------------

/// Fold season rows into a fresh context according to `plan`.
pub fn aggregate<L: SeasonLine>(
    lines: &[L],
    plan: &AggregationPlan<'_>,
    names: &NameBook,
    leagues: &LeagueBook,
) -> AggregationContext<L::Totals> {
    let mut ctx = AggregationContext::new();

    for line in lines {
        let scopes = plan.scopes_for(line, leagues);
        if scopes.is_empty() {
            debug!(
                "row {} {} {} not bucketed for {:?}",
                line.player_id(),
                line.year(),
                line.team_id(),
                plan.granularity
            );
            ctx.rows_skipped += 1;
            continue;
        }

        let identity = match plan.entity {
            EntityMode::Player => Some(line.player_id()),
            EntityMode::League => None,
        };
        let totals = line.totals();
        for scope in scopes {
            ctx.accumulate(
                scope,
                identity,
                || match identity {
                    Some(id) => names.name_for(id).to_string(),
                    None => LEAGUE_ENTITY_NAME.to_string(),
                },
                &totals,
            );
        }
        ctx.rows_accumulated += 1;
    }

    info!(
        "aggregated {} rows into {} scopes ({:?}/{:?}, {} skipped)",
        ctx.rows_accumulated,
        ctx.tables.len(),
        plan.granularity,
        plan.entity,
        ctx.rows_skipped
    );
    ctx
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
