//! Fast pseudorange correction extrapolation and its model variance (4.9),
//! DO-229D A.4.4.3/A.4.5.1, grounded on the source's fast-correction module.
//!
//! PRN-to-slot binding (which MT2-5/MT6/MT24 block a satellite's correction
//! lives in) is the engine's job (6); this module only implements the
//! formulas once the current/previous PRC, UDRE and IODF values for one
//! satellite have been resolved.

/// UDRE accuracy, squared, or the special "not monitored"/"don't use"
/// statuses DO-229D table A-6 encodes as 14/15.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UdreStatus {
    Monitored(f64),
    NotMonitored,
    DontUse,
}

/// UDRE-indicator-indexed accuracy table, DO-229D table A-6.
#[must_use]
pub fn udre_accuracy(udrei: u8) -> UdreStatus {
    let acc = match udrei {
        0 => 0.0520,
        1 => 0.0924,
        2 => 0.1444,
        3 => 0.2830,
        4 => 0.4678,
        5 => 0.8315,
        6 => 1.2992,
        7 => 1.8709,
        8 => 2.5465,
        9 => 3.3260,
        10 => 5.1968,
        11 => 20.7870,
        12 => 230.9661,
        13 => 2078.695,
        14 => return UdreStatus::NotMonitored,
        _ => return UdreStatus::DontUse,
    };
    UdreStatus::Monitored(acc)
}

/// Degradation parameter for the fast correction itself, DO-229D A.4.5.1.1.
/// `a` is MT7's per-satellite degradation factor, `tu` the fast correction's
/// time of applicability, `tlat` MT7's system latency.
#[must_use]
pub fn epsilon_fast_correction(a: f64, t: f64, tu: f64, tlat: f64) -> f64 {
    let dt = t - tu + tlat;
    a * dt * dt / 2.0
}

/// Degradation parameter for the range-rate correction, DO-229D A.4.5.1.2.
/// `iodf0`/`iodf1` are the current/previous fast-correction IODFs; `3` is
/// the wildcard value that always matches.
#[must_use]
pub fn epsilon_range_rate_correction(a: f64, t: f64, ifc: f64, brrc: f64, iodf0: u8, iodf1: u8, t0: f64, t1: f64) -> f64 {
    if iodf0 != 3 && iodf1 != 3 {
        if (i32::from(iodf0) - i32::from(iodf1)).rem_euclid(3) == 1 {
            return 0.0;
        }
        if (t0 - t1).abs() > f64::EPSILON {
            (a * ifc / 4.0 + brrc / (t0 - t1)) * (t - t0)
        } else {
            a * ifc / 4.0
        }
    } else {
        let gap = ((t0 - t1) - ifc / 2.0).abs();
        if gap == 0.0 {
            return 0.0;
        }
        if (t0 - t1).abs() > f64::EPSILON {
            (a * gap / 2.0 + brrc / (t0 - t1)) * (t - t0)
        } else {
            a * gap / 2.0
        }
    }
}

/// Range rate correction (m/s), the slope between the current and previous
/// PRC once both are available (4.9 step 2).
#[must_use]
pub fn range_rate_correction(prc0: f64, prc1: f64, t0: f64, t1: f64, udrei1_available: bool) -> f64 {
    if udrei1_available && t0 - 1.0 > t1 && prc1 != 0.0 {
        (prc0 - prc1) / (t0 - t1)
    } else {
        0.0
    }
}

/// All the per-satellite pieces needed to extrapolate the fast correction
/// and combine its model variance (4.9).
#[derive(Debug, Clone, Copy)]
pub struct FastCorrectionInputs {
    pub prc0: f64,
    pub prc1: f64,
    pub t0: f64,
    pub t1: f64,
    pub udrei0: u8,
    pub udrei1_available: bool,
    pub iodf0: u8,
    pub iodf1: u8,
    /// MT7's per-satellite degradation factor (`a`), `None` if MT7/MT10 are
    /// both stale (falls back to the cruder sigma bound below).
    pub degradation_a: Option<f64>,
    pub ifc: f64,
    pub tlat: f64,
    pub brrc: f64,
    pub eps_ltc: f64,
    pub eps_er: f64,
    pub rss_udre: bool,
    /// Receiver time of week, seconds.
    pub now: f64,
}

/// Result of extrapolating one satellite's fast correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FastCorrection {
    pub delay: f64,
    pub range_rate: f64,
    pub variance: f64,
    pub usable: bool,
}

/// Extrapolates the pseudorange fast correction and its model variance for
/// one satellite (4.9). `udre` resolves to [`UdreStatus::DontUse`] or a
/// UDREI of 14 without R&D override both mark the satellite unusable.
#[must_use]
pub fn compute(udre: UdreStatus, inputs: FastCorrectionInputs) -> FastCorrection {
    let sigma_udre2 = match udre {
        UdreStatus::Monitored(v) => v,
        UdreStatus::NotMonitored | UdreStatus::DontUse => {
            return FastCorrection { delay: 0.0, range_rate: 0.0, variance: 0.0, usable: false };
        }
    };
    if inputs.udrei0 >= 14 {
        return FastCorrection { delay: 0.0, range_rate: 0.0, variance: 0.0, usable: false };
    }

    let Some(a) = inputs.degradation_a else {
        // DO-229D J.2.2: no active MT7/MT10, use the cruder bound.
        let sigma = (sigma_udre2.sqrt() + 8.0).powi(2);
        return FastCorrection { delay: inputs.prc0, range_rate: 0.0, variance: sigma, usable: true };
    };

    let rrc = if a != 0.0 {
        range_rate_correction(inputs.prc0, inputs.prc1, inputs.t0, inputs.t1, inputs.udrei1_available)
    } else {
        0.0
    };
    let eps_rrc = if rrc != 0.0 {
        epsilon_range_rate_correction(a, inputs.now, inputs.ifc, inputs.brrc, inputs.iodf0, inputs.iodf1, inputs.t0, inputs.t1)
    } else {
        0.0
    };

    let delay = inputs.prc0 + rrc * (inputs.now - inputs.t0);
    let eps_fc = epsilon_fast_correction(a, inputs.now, inputs.t0, inputs.tlat);

    let variance = if inputs.rss_udre {
        sigma_udre2 + eps_fc * eps_fc + eps_rrc * eps_rrc + inputs.eps_ltc * inputs.eps_ltc + inputs.eps_er * inputs.eps_er
    } else {
        let sum = sigma_udre2.sqrt() + eps_fc + eps_rrc + inputs.eps_ltc + inputs.eps_er;
        sum * sum
    };

    FastCorrection { delay, range_rate: rrc * (inputs.now - inputs.t0), variance, usable: true }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn udre_table_boundaries() {
        assert_eq!(udre_accuracy(14), UdreStatus::NotMonitored);
        assert_eq!(udre_accuracy(15), UdreStatus::DontUse);
        assert_eq!(udre_accuracy(0), UdreStatus::Monitored(0.0520));
    }

    #[test]
    fn udrei_14_marks_satellite_unusable() {
        let inputs = FastCorrectionInputs {
            prc0: 1.0, prc1: 0.0, t0: 100.0, t1: 0.0, udrei0: 14, udrei1_available: false,
            iodf0: 0, iodf1: 0, degradation_a: Some(0.0), ifc: 0.0, tlat: 0.0, brrc: 0.0,
            eps_ltc: 0.0, eps_er: 0.0, rss_udre: false, now: 100.0,
        };
        let result = compute(UdreStatus::Monitored(1.0), inputs);
        assert!(!result.usable);
    }

    #[test]
    fn no_degradation_data_falls_back_to_cruder_bound() {
        let inputs = FastCorrectionInputs {
            prc0: 2.0, prc1: 0.0, t0: 100.0, t1: 0.0, udrei0: 0, udrei1_available: false,
            iodf0: 0, iodf1: 0, degradation_a: None, ifc: 0.0, tlat: 0.0, brrc: 0.0,
            eps_ltc: 0.0, eps_er: 0.0, rss_udre: false, now: 100.0,
        };
        let result = compute(UdreStatus::Monitored(1.0), inputs);
        assert!(result.usable);
        assert!((result.variance - (1.0_f64.sqrt() + 8.0).powi(2)).abs() < 1e-9);
        assert_eq!(result.delay, 2.0);
    }

    #[test]
    fn rss_and_linear_combination_differ() {
        let base = FastCorrectionInputs {
            prc0: 1.0, prc1: 0.5, t0: 100.0, t1: 94.0, udrei0: 0, udrei1_available: true,
            iodf0: 0, iodf1: 0, degradation_a: Some(0.002), ifc: 120.0, tlat: 10.0, brrc: 0.01,
            eps_ltc: 0.1, eps_er: 0.05, rss_udre: false, now: 106.0,
        };
        let linear = compute(UdreStatus::Monitored(1.0), base);
        let rss = compute(UdreStatus::Monitored(1.0), FastCorrectionInputs { rss_udre: true, ..base });
        assert!((linear.variance - rss.variance).abs() > 1e-9);
    }

    #[test]
    fn wildcard_iodf_never_zeroes_eps_rrc_by_the_gap_rule() {
        let eps = epsilon_range_rate_correction(0.001, 100.0, 120.0, 0.02, 3, 3, 100.0, 94.0);
        assert!(eps.is_finite());
    }
}
