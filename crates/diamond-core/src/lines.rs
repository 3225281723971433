// Season records and the running totals they fold into.
//
// One `BattingLine` / `PitchingLine` is a single player-team-year record as
// delivered by the loader. Counting fields that were absent upstream are
// already 0 here.

use crate::metrics::{HitterMetrics, PitcherMetrics};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Counting totals that can be summed field by field.
///
/// `merge` must be commutative and associative: folding the same rows in any
/// order yields identical totals.
pub trait CountingStats: Default + Clone + PartialEq + std::fmt::Debug {
    type Metrics;

    fn merge(&mut self, other: &Self);

    fn metrics(&self) -> Self::Metrics;
}

/// A per-season row that contributes counting totals to aggregates.
pub trait SeasonLine {
    type Totals: CountingStats;

    fn player_id(&self) -> &str;
    fn year(&self) -> i32;
    fn team_id(&self) -> &str;
    fn league_id(&self) -> Option<&str>;
    fn totals(&self) -> Self::Totals;
}

// ---------------------------------------------------------------------------
// Season rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BattingLine {
    pub player_id: String,
    pub year: i32,
    pub team_id: String,
    pub league_id: Option<String>,
    pub ab: u32,
    pub h: u32,
    pub bb: u32,
    pub so: u32,
    pub hbp: u32,
    pub sf: u32,
    pub doubles: u32,
    pub triples: u32,
    pub hr: u32,
    pub r: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PitchingLine {
    pub player_id: String,
    pub year: i32,
    pub team_id: String,
    pub league_id: Option<String>,
    /// Outs recorded (thirds of an inning).
    pub ip_outs: u32,
    pub so: u32,
    pub bb: u32,
    pub hbp: u32,
    /// Home runs allowed.
    pub hr: u32,
    pub er: u32,
    pub g: u32,
    pub gs: u32,
}

/// Biographical name fields for one player.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerBio {
    pub player_id: String,
    pub name_first: Option<String>,
    pub name_last: Option<String>,
    pub name_given: Option<String>,
}

/// League membership of a team in one season.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamSeason {
    pub year: i32,
    pub team_id: String,
    pub league_id: String,
}

// ---------------------------------------------------------------------------
// Running totals
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BattingTotals {
    pub ab: u64,
    pub h: u64,
    pub bb: u64,
    pub so: u64,
    pub hbp: u64,
    pub sf: u64,
    pub doubles: u64,
    pub triples: u64,
    pub hr: u64,
    pub r: u64,
}

impl BattingTotals {
    /// Plate appearances: AB + BB + HBP + SF.
    pub fn plate_appearances(&self) -> u64 {
        self.ab + self.bb + self.hbp + self.sf
    }
}

impl CountingStats for BattingTotals {
    type Metrics = HitterMetrics;

    fn merge(&mut self, other: &Self) {
        self.ab += other.ab;
        self.h += other.h;
        self.bb += other.bb;
        self.so += other.so;
        self.hbp += other.hbp;
        self.sf += other.sf;
        self.doubles += other.doubles;
        self.triples += other.triples;
        self.hr += other.hr;
        self.r += other.r;
    }

    fn metrics(&self) -> HitterMetrics {
        HitterMetrics::from_totals(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PitchingTotals {
    pub ip_outs: u64,
    pub so: u64,
    pub bb: u64,
    pub hbp: u64,
    pub hr: u64,
    pub er: u64,
    pub g: u64,
    pub gs: u64,
}

impl PitchingTotals {
    /// Innings pitched: outs / 3.
    pub fn innings_pitched(&self) -> f64 {
        self.ip_outs as f64 / 3.0
    }
}

impl CountingStats for PitchingTotals {
    type Metrics = PitcherMetrics;

    fn merge(&mut self, other: &Self) {
        self.ip_outs += other.ip_outs;
        self.so += other.so;
        self.bb += other.bb;
        self.hbp += other.hbp;
        self.hr += other.hr;
        self.er += other.er;
        self.g += other.g;
        self.gs += other.gs;
    }

    fn metrics(&self) -> PitcherMetrics {
        PitcherMetrics::from_totals(self)
    }
}

// ---------------------------------------------------------------------------
// SeasonLine impls
// ---------------------------------------------------------------------------

impl SeasonLine for BattingLine {
    type Totals = BattingTotals;

    fn player_id(&self) -> &str {
        &self.player_id
    }

    fn year(&self) -> i32 {
        self.year
    }

    fn team_id(&self) -> &str {
        &self.team_id
    }

    fn league_id(&self) -> Option<&str> {
        self.league_id.as_deref()
    }

    fn totals(&self) -> BattingTotals {
        BattingTotals {
            ab: self.ab.into(),
            h: self.h.into(),
            bb: self.bb.into(),
            so: self.so.into(),
            hbp: self.hbp.into(),
            sf: self.sf.into(),
            doubles: self.doubles.into(),
            triples: self.triples.into(),
            hr: self.hr.into(),
            r: self.r.into(),
        }
    }
}

impl SeasonLine for PitchingLine {
    type Totals = PitchingTotals;

    fn player_id(&self) -> &str {
        &self.player_id
    }

    fn year(&self) -> i32 {
        self.year
    }

    fn team_id(&self) -> &str {
        &self.team_id
    }

    fn league_id(&self) -> Option<&str> {
        self.league_id.as_deref()
    }

    fn totals(&self) -> PitchingTotals {
        PitchingTotals {
            ip_outs: self.ip_outs.into(),
            so: self.so.into(),
            bb: self.bb.into(),
            hbp: self.hbp.into(),
            hr: self.hr.into(),
            er: self.er.into(),
            g: self.g.into(),
            gs: self.gs.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
