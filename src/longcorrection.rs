//! Long-term orbit/clock correction binding and degradation (4.9), DO-229D
//! A.4.5.1.3, grounded on the source's long-correction module.
//!
//! Binding a PRN's long-term delta means scanning every MT24/MT25 record
//! for the one whose PRN matches and whose IODE matches the satellite's own
//! broadcast ephemeris IODE (3, "a stale IODE never applies"); the source
//! does this as a PRN-mask-indexed double loop; [`bind`] does it as a single
//! filter over whatever records the caller collected.

use crate::sbas::LongTermRecord;
use crate::satellite::LongTermDelta;

/// Picks the long-term record for `prn` whose IODE matches `iode`, if any.
/// When more than one record matches (should not happen in a consistent
/// broadcast), the first one found is used.
#[must_use]
pub fn bind(records: &[LongTermRecord], prn: u8, iode: u16) -> Option<LongTermDelta> {
    records
        .iter()
        .find(|r| r.prn == prn && r.iode == iode)
        .map(|r| LongTermDelta {
            iode: r.iode,
            d_pos: r.d_pos,
            d_vel: r.d_vel,
            d_af0: r.d_af0,
            d_af1: r.d_af1,
            t0: r.t0,
        })
}

/// Long-term correction degradation parameter, DO-229D A.4.5.1.3.
///
/// `record_tow` is the time of week the binding message (MT24/MT25) carrying
/// this delta was received; `velocity_code` is `0` for the rate-free record
/// shape, `1` for the rate-carrying shape (any other value degrades to zero,
/// matching the source's `else` fallthrough for a velocity code that is
/// neither 0 nor 1).
#[must_use]
pub fn epsilon_long_term(
    now: f64,
    record_tow: f64,
    velocity_code: u8,
    t0: f64,
    c_ltc_v0: f64,
    i_ltc_v0: f64,
    c_ltc_v1: f64,
    i_ltc_v1: f64,
    c_ltc_lsb: f64,
) -> f64 {
    match velocity_code {
        0 => c_ltc_v0 * ((now - record_tow) / i_ltc_v0).floor(),
        1 => {
            if t0 < now && now < t0 + i_ltc_v1 {
                0.0
            } else {
                let overrun = (t0 - now).max(now - t0 - i_ltc_v1).max(0.0);
                c_ltc_lsb + c_ltc_v1 * overrun
            }
        }
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn record(prn: u8, iode: u16) -> LongTermRecord {
        LongTermRecord { prn, iode, velocity_code: 0, d_pos: Vector3::zeros(), d_vel: Vector3::zeros(), d_af0: 0.0, d_af1: 0.0, t0: 0.0 }
    }

    #[test]
    fn binds_matching_prn_and_iode() {
        let records = [record(3, 10), record(3, 11), record(7, 10)];
        let bound = bind(&records, 3, 11).unwrap();
        assert_eq!(bound.iode, 11);
    }

    #[test]
    fn stale_iode_does_not_bind() {
        let records = [record(3, 10)];
        assert!(bind(&records, 3, 99).is_none());
    }

    #[test]
    fn velocity_1_inside_validity_window_has_zero_degradation() {
        let eps = epsilon_long_term(100.0, 0.0, 1, 50.0, 0.0, 1.0, 0.002, 100.0, 0.5);
        assert_eq!(eps, 0.0);
    }

    #[test]
    fn velocity_1_past_validity_window_degrades() {
        let eps = epsilon_long_term(300.0, 0.0, 1, 50.0, 0.0, 1.0, 0.002, 100.0, 0.5);
        assert!(eps > 0.0);
    }

    #[test]
    fn velocity_0_grows_with_elapsed_time() {
        let early = epsilon_long_term(100.0, 0.0, 0, 0.0, 0.002, 60.0, 0.0, 1.0, 0.5);
        let late = epsilon_long_term(1000.0, 0.0, 0, 0.0, 0.002, 60.0, 0.0, 1.0, 0.5);
        assert!(late >= early);
    }
}
