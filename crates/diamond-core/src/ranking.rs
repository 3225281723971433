// Ranking and selection: qualify, drop undefined values, sort, truncate.

use crate::aggregate::{AggregationContext, Scope};
use crate::lines::CountingStats;
use crate::metrics::{HitterMetrics, PitcherMetrics};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Hitters,
    Pitchers,
}

/// A derived metric that leaderboards can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMetric {
    Avg,
    Obp,
    Slg,
    Ops,
    HrRate,
    SoRate,
    BbRate,
    Era,
    Fip,
    KBb,
    #[serde(rename = "k_per_9")]
    KPer9,
}

impl SortMetric {
    pub fn role(self) -> Role {
        match self {
            SortMetric::Avg
            | SortMetric::Obp
            | SortMetric::Slg
            | SortMetric::Ops
            | SortMetric::HrRate
            | SortMetric::SoRate
            | SortMetric::BbRate => Role::Hitters,
            SortMetric::Era | SortMetric::Fip | SortMetric::KBb | SortMetric::KPer9 => {
                Role::Pitchers
            }
        }
    }

    /// Run prevention and hitter strikeouts are better when lower.
    pub fn higher_is_better(self) -> bool {
        !matches!(self, SortMetric::Era | SortMetric::Fip | SortMetric::SoRate)
    }

    pub fn default_order(self) -> SortOrder {
        if self.higher_is_better() {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Descending,
    Ascending,
}

/// Minimum playing time an entity needs to be ranked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Qualifier {
    None,
    MinPlateAppearances(u64),
    MinAtBats(u64),
    MinInningsPitched(f64),
}

impl Qualifier {
    pub fn role(&self) -> Option<Role> {
        match self {
            Qualifier::None => None,
            Qualifier::MinPlateAppearances(_) | Qualifier::MinAtBats(_) => Some(Role::Hitters),
            Qualifier::MinInningsPitched(_) => Some(Role::Pitchers),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankQuery {
    pub metric: SortMetric,
    pub order: SortOrder,
    pub limit: usize,
    pub qualifier: Qualifier,
}

impl RankQuery {
    /// Query sorted in the metric's natural order.
    pub fn new(metric: SortMetric, limit: usize, qualifier: Qualifier) -> Self {
        Self {
            metric,
            order: metric.default_order(),
            limit,
            qualifier,
        }
    }

    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<M> {
    pub identity: Option<String>,
    pub name: String,
    /// Value of the sort metric.
    pub value: f64,
    pub metrics: M,
}

/// League-wide metrics for one scope of a trend series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint<M> {
    pub scope: Scope,
    pub label: String,
    pub metrics: M,
}

// ---------------------------------------------------------------------------
// Metric access
// ---------------------------------------------------------------------------

/// Derived metrics that can be filtered and sorted.
pub trait RankedMetrics {
    /// Value of `metric`, `None` when undefined or not applicable to the role.
    fn value(&self, metric: SortMetric) -> Option<f64>;

    fn qualifies(&self, qualifier: &Qualifier) -> bool;
}

impl RankedMetrics for HitterMetrics {
    fn value(&self, metric: SortMetric) -> Option<f64> {
        match metric {
            SortMetric::Avg => self.avg,
            SortMetric::Obp => self.obp,
            SortMetric::Slg => self.slg,
            SortMetric::Ops => self.ops,
            SortMetric::HrRate => self.hr_rate,
            SortMetric::SoRate => self.so_rate,
            SortMetric::BbRate => self.bb_rate,
            SortMetric::Era | SortMetric::Fip | SortMetric::KBb | SortMetric::KPer9 => None,
        }
    }

    fn qualifies(&self, qualifier: &Qualifier) -> bool {
        match *qualifier {
            Qualifier::None => true,
            Qualifier::MinPlateAppearances(min) => self.pa >= min,
            Qualifier::MinAtBats(min) => self.ab >= min,
            Qualifier::MinInningsPitched(_) => false,
        }
    }
}

impl RankedMetrics for PitcherMetrics {
    fn value(&self, metric: SortMetric) -> Option<f64> {
        match metric {
            SortMetric::Era => self.era,
            SortMetric::Fip => self.fip,
            SortMetric::KBb => self.k_bb,
            SortMetric::KPer9 => self.k_per_9,
            _ => None,
        }
    }

    fn qualifies(&self, qualifier: &Qualifier) -> bool {
        match *qualifier {
            Qualifier::None => true,
            Qualifier::MinInningsPitched(min) => self.ip >= min,
            Qualifier::MinPlateAppearances(_) | Qualifier::MinAtBats(_) => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Top `query.limit` qualified entities of `scope` by `query.metric`.
///
/// Entities whose sort value is undefined are excluded before sorting. The
/// sort is stable, so ties keep first-accumulation order. Truncation happens
/// last.
pub fn top_n<T>(
    ctx: &AggregationContext<T>,
    scope: &Scope,
    query: &RankQuery,
) -> Vec<Ranked<T::Metrics>>
where
    T: CountingStats,
    T::Metrics: RankedMetrics,
{
    let mut ranked: Vec<Ranked<T::Metrics>> = ctx
        .records(scope)
        .iter()
        .filter_map(|record| {
            let metrics = record.totals.metrics();
            if !metrics.qualifies(&query.qualifier) {
                return None;
            }
            let value = metrics.value(query.metric).filter(|v| v.is_finite())?;
            Some(Ranked {
                identity: record.identity.clone(),
                name: record.name.clone(),
                value,
                metrics,
            })
        })
        .collect();

    match query.order {
        SortOrder::Descending => ranked.sort_by(|a, b| b.value.total_cmp(&a.value)),
        SortOrder::Ascending => ranked.sort_by(|a, b| a.value.total_cmp(&b.value)),
    }
    ranked.truncate(query.limit);
    ranked
}

/// League-wide metrics for each of `scopes` that received data, in the given
/// order.
pub fn series<T: CountingStats>(
    ctx: &AggregationContext<T>,
    scopes: &[Scope],
) -> Vec<TrendPoint<T::Metrics>> {
    scopes
        .iter()
        .filter_map(|scope| {
            let record = ctx.get(scope, None)?;
            Some(TrendPoint {
                scope: scope.clone(),
                label: scope.to_string(),
                metrics: record.totals.metrics(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
