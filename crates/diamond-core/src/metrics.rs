// Derived rate statistics for hitters and pitchers.
//
// Every rate is an `Option<f64>`: `None` when its denominator is not positive
// or the result is not finite. Composite metrics are `None` whenever any
// operand is.

use crate::lines::{BattingTotals, PitchingTotals};
use serde::Serialize;

/// League-calibration constant added to the FIP numerator/IP term.
pub const FIP_CONSTANT: f64 = 3.1;

/// `numerator / denominator`, or `None` for a non-positive denominator or a
/// non-finite result.
pub fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator.is_nan() || denominator <= 0.0 {
        return None;
    }
    let value = numerator / denominator;
    value.is_finite().then_some(value)
}

// ---------------------------------------------------------------------------
// Hitters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HitterMetrics {
    pub pa: u64,
    pub ab: u64,
    pub singles: u64,
    pub total_bases: u64,
    pub avg: Option<f64>,
    pub obp: Option<f64>,
    pub slg: Option<f64>,
    pub ops: Option<f64>,
    pub hr_rate: Option<f64>,
    pub so_rate: Option<f64>,
    pub bb_rate: Option<f64>,
}

impl HitterMetrics {
    pub fn from_totals(t: &BattingTotals) -> Self {
        let pa = t.plate_appearances();
        let ab = t.ab as f64;
        let pa_f = pa as f64;

        // Inconsistent source rows can push extra-base hits above H.
        let singles = t.h.saturating_sub(t.doubles + t.triples + t.hr);
        let total_bases = singles + 2 * t.doubles + 3 * t.triples + 4 * t.hr;

        let avg = ratio(t.h as f64, ab);
        let slg = ratio(total_bases as f64, ab);
        let obp = ratio((t.h + t.bb + t.hbp) as f64, pa_f);
        let ops = obp.zip(slg).map(|(o, s)| o + s).filter(|v| v.is_finite());

        Self {
            pa,
            ab: t.ab,
            singles,
            total_bases,
            avg,
            obp,
            slg,
            ops,
            hr_rate: ratio(t.hr as f64, pa_f),
            so_rate: ratio(t.so as f64, pa_f),
            bb_rate: ratio(t.bb as f64, pa_f),
        }
    }
}

// ---------------------------------------------------------------------------
// Pitchers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PitcherMetrics {
    pub ip: f64,
    pub so: u64,
    pub bb: u64,
    pub g: u64,
    pub gs: u64,
    pub era: Option<f64>,
    pub fip: Option<f64>,
    pub k_bb: Option<f64>,
    pub k_per_9: Option<f64>,
}

impl PitcherMetrics {
    pub fn from_totals(t: &PitchingTotals) -> Self {
        let ip = t.innings_pitched();

        let era = ratio(9.0 * t.er as f64, ip);
        let fip_core = 13.0 * t.hr as f64 + 3.0 * (t.bb + t.hbp) as f64 - 2.0 * t.so as f64;
        let fip = ratio(fip_core, ip).map(|v| v + FIP_CONSTANT);
        let k_per_9 = ratio(9.0 * t.so as f64, ip);

        // No walks at all: report raw strikeouts rather than an infinite ratio.
        let k_bb = if t.bb > 0 {
            ratio(t.so as f64, t.bb as f64)
        } else {
            Some(t.so as f64)
        };

        Self {
            ip,
            so: t.so,
            bb: t.bb,
            g: t.g,
            gs: t.gs,
            era,
            fip,
            k_bb,
            k_per_9,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    fn sample_hitter() -> BattingTotals {
        BattingTotals {
            ab: 500,
            h: 150,
            bb: 50,
            so: 100,
            hbp: 5,
            sf: 5,
            doubles: 30,
            triples: 5,
            hr: 20,
            r: 90,
        }
    }

    fn sample_pitcher() -> PitchingTotals {
        PitchingTotals {
            ip_outs: 600,
            so: 180,
            bb: 50,
            hbp: 5,
            hr: 20,
            er: 70,
            g: 32,
            gs: 32,
        }
    }

    // -- ratio guard --

    #[test]
    fn ratio_rejects_non_positive_denominators() {
        assert_eq!(ratio(1.0, 0.0), None);
        assert_eq!(ratio(1.0, -3.0), None);
        assert_eq!(ratio(1.0, f64::NAN), None);
        assert_eq!(ratio(f64::INFINITY, 2.0), None);
        assert_eq!(ratio(3.0, 2.0), Some(1.5));
    }

    // -- hitters --

    #[test]
    fn ops_worked_example() {
        let m = HitterMetrics::from_totals(&sample_hitter());
        assert_eq!(m.singles, 95);
        assert_eq!(m.total_bases, 250);
        assert_eq!(m.pa, 560);
        assert!(approx_eq(m.slg.unwrap(), 0.5, 1e-12));
        assert!(approx_eq(m.obp.unwrap(), 205.0 / 560.0, 1e-12));
        assert!(approx_eq(m.ops.unwrap(), 0.5 + 205.0 / 560.0, 1e-12));
        assert!(approx_eq(m.obp.unwrap(), 0.366_07, 1e-5));
        assert!(approx_eq(m.ops.unwrap(), 0.866_07, 1e-5));
        assert!(approx_eq(m.avg.unwrap(), 0.3, 1e-12));
    }

    #[test]
    fn rates_use_plate_appearances() {
        let m = HitterMetrics::from_totals(&sample_hitter());
        assert!(approx_eq(m.hr_rate.unwrap(), 20.0 / 560.0, 1e-12));
        assert!(approx_eq(m.so_rate.unwrap(), 100.0 / 560.0, 1e-12));
        assert!(approx_eq(m.bb_rate.unwrap(), 50.0 / 560.0, 1e-12));
    }

    #[test]
    fn zero_at_bats_leaves_avg_and_slg_undefined() {
        let t = BattingTotals {
            bb: 3,
            hbp: 1,
            ..Default::default()
        };
        let m = HitterMetrics::from_totals(&t);
        assert_eq!(m.avg, None);
        assert_eq!(m.slg, None);
        // PA is still 4, so OBP is defined but OPS is not.
        assert!(approx_eq(m.obp.unwrap(), 1.0, 1e-12));
        assert_eq!(m.ops, None);
    }

    #[test]
    fn empty_totals_leave_every_rate_undefined() {
        let m = HitterMetrics::from_totals(&BattingTotals::default());
        assert_eq!(m.pa, 0);
        assert_eq!(m.obp, None);
        assert_eq!(m.hr_rate, None);
        assert_eq!(m.so_rate, None);
        assert_eq!(m.bb_rate, None);
        assert_eq!(m.ops, None);
    }

    #[test]
    fn singles_clamped_at_zero() {
        let t = BattingTotals {
            ab: 10,
            h: 2,
            doubles: 2,
            hr: 1,
            ..Default::default()
        };
        let m = HitterMetrics::from_totals(&t);
        assert_eq!(m.singles, 0);
        assert_eq!(m.total_bases, 2 * 2 + 4);
    }

    // -- pitchers --

    #[test]
    fn fip_worked_example() {
        let m = PitcherMetrics::from_totals(&sample_pitcher());
        assert!(approx_eq(m.ip, 200.0, 1e-12));
        assert!(approx_eq(m.fip.unwrap(), 3.425, 1e-12));
    }

    #[test]
    fn era_and_k_per_9() {
        let m = PitcherMetrics::from_totals(&sample_pitcher());
        assert!(approx_eq(m.era.unwrap(), 9.0 * 70.0 / 200.0, 1e-12));
        assert!(approx_eq(m.k_per_9.unwrap(), 9.0 * 180.0 / 200.0, 1e-12));
        assert!(approx_eq(m.k_bb.unwrap(), 3.6, 1e-12));
    }

    #[test]
    fn k_bb_without_walks_is_raw_strikeouts() {
        let t = PitchingTotals {
            ip_outs: 30,
            so: 5,
            ..Default::default()
        };
        let m = PitcherMetrics::from_totals(&t);
        assert_eq!(m.k_bb, Some(5.0));
    }

    #[test]
    fn zero_innings_leaves_rates_undefined() {
        let t = PitchingTotals {
            so: 2,
            bb: 1,
            er: 3,
            g: 1,
            ..Default::default()
        };
        let m = PitcherMetrics::from_totals(&t);
        assert_eq!(m.era, None);
        assert_eq!(m.fip, None);
        assert_eq!(m.k_per_9, None);
        assert_eq!(m.k_bb, Some(2.0));
    }
}
