//! MT7: fast-correction degradation factors (DO-229D A.4.4.5, Table A-17
//! in some editions / A.4.5.1 here).

use crate::bits::BitReader;

/// Number of indexed degradation-factor entries (one per PRN-mask slot, 3).
pub const FACTOR_SLOTS: usize = 51;

/// One PRN's fast-correction degradation factors, looked up from its 4-bit
/// indicator via [`degradation_factor`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DegradationFactor {
    /// `a_i`, the fast-correction degradation rate, m/s^2.
    pub a: f64,
    /// `I_fc1`, max time between fast corrections before degradation applies
    /// in the "fast" regime, seconds.
    pub i_fc1: u16,
    /// `I_fc2`, as above for the "slow" regime, seconds.
    pub i_fc2: u16,
    /// Maximum permitted update interval, seconds.
    pub max_update: u16,
}

/// Degradation factor table, DO-229D A.4.5.1, indexed by the 4-bit field
/// broadcast per PRN in MT7.
#[must_use]
pub fn degradation_factor(aii: u8) -> DegradationFactor {
    let (a, i_fc1, i_fc2, max_update) = match aii {
        0 => (0.0, 180, 120, 60),
        1 => (0.000_05, 180, 120, 60),
        2 => (0.000_09, 153, 102, 51),
        3 => (0.000_12, 135, 90, 45),
        4 => (0.000_15, 135, 90, 45),
        5 => (0.000_20, 117, 78, 39),
        6 => (0.000_30, 99, 66, 33),
        7 => (0.000_45, 81, 54, 27),
        8 => (0.000_60, 63, 42, 21),
        9 => (0.000_90, 45, 30, 15),
        10 => (0.001_50, 45, 30, 15),
        11 => (0.002_10, 27, 18, 9),
        12 => (0.002_70, 27, 18, 9),
        13 => (0.003_30, 27, 18, 9),
        14 => (0.004_60, 18, 12, 6),
        _ => (0.005_80, 18, 12, 6),
    };
    DegradationFactor { a, i_fc1, i_fc2, max_update }
}

/// Decoded MT7: system latency plus one degradation factor per mask slot.
#[derive(Debug, Clone, PartialEq)]
pub struct FastDegradation {
    /// System latency `t_lat`, seconds.
    pub t_lat: f64,
    pub factors: Vec<DegradationFactor>,
}

pub(crate) fn decode(r: &BitReader) -> FastDegradation {
    let t_lat = r.unsigned(14, 17) as f64;

    let mut factors = Vec::with_capacity(FACTOR_SLOTS);
    for i in 0..FACTOR_SLOTS {
        let start = 22 + 4 * i;
        if start + 3 >= r.len() {
            break;
        }
        let aii = r.unsigned(start, start + 3) as u8;
        factors.push(degradation_factor(aii));
    }

    FastDegradation { t_lat, factors }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degradation_table_endpoints() {
        assert_eq!(degradation_factor(0).a, 0.0);
        assert!((degradation_factor(13).a - 0.003_30).abs() < 1e-9);
        assert!((degradation_factor(15).a - 0.005_80).abs() < 1e-9);
    }
}
