//! Satellite channel state and position computation (3 "Satellite record", 4.6).

use nalgebra::Vector3;

use crate::coords::ECEF;
use crate::ephemeris::Ephemeris;
use crate::time::{wrap_half_week, GM_EARTH, OMEGA_EARTH};

/// Which constellation a channel's PRN belongs to.
#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Hash,
    strum::AsRefStr,
    strum::Display,
    strum::EnumIter,
    strum::FromRepr,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Constellation {
    /// GPS, navigation message LNAV.
    Gps,
    /// SBAS geostationary, ranging via MT9.
    Sbas,
}

/// How heavily a channel's pseudorange has been corrected, and whether it
/// feeds the solver at all.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum UseState {
    /// Excluded from this cycle's solution.
    #[default]
    Unused,
    /// Contributing its raw (uncorrected) pseudorange.
    Raw,
    /// Contributing a fully SBAS-corrected pseudorange.
    SbasCorrected,
}

/// Why a channel is [`UseState::Unused`], for diagnostics (state machine in 4.10).
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExclusionReason {
    /// Elevation below the 10 degree mask angle.
    LowElevation,
    /// PRN absent from the MT1 mask.
    NotInMask,
    /// Excluded by the RAIM worst-residual screen.
    Raim,
    /// UDREI 14 (unmonitored, no R&D override) or 15 (don't use).
    Udrei,
    /// A correction component's variance exceeded the usability floor.
    DegradedVariance,
}

/// SBAS long-term orbit/clock delta applied to a GPS satellite (3, 4.9).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct LongTermDelta {
    /// IODE this delta is bound to.
    pub iode: u16,
    /// Position delta, ECEF meters.
    pub d_pos: Vector3<f64>,
    /// Position delta rate, m/s (velocity-1 schema only).
    pub d_vel: Vector3<f64>,
    /// Clock bias delta, seconds.
    pub d_af0: f64,
    /// Clock drift delta, s/s (velocity-1 schema only).
    pub d_af1: f64,
    /// Reference time the delta and its rates are taken relative to.
    pub t0: f64,
}

/// One satellite's working state for a single positioning cycle (3).
#[derive(Debug, Clone)]
pub struct SatelliteChannel {
    pub prn: u8,
    pub constellation: Constellation,

    /// Receiver time of week at measurement, seconds.
    pub tow: f64,
    /// Raw pseudorange, meters.
    pub pseudorange: f64,
    /// Corrected pseudorange, meters (iono+tropo+fast applied).
    pub pseudorange_corrected: f64,
    /// Carrier-to-noise density, dBHz.
    pub cn0: f64,

    pub ephemeris: Option<Ephemeris>,
    pub long_term: Option<LongTermDelta>,

    /// ECEF position at transmit time, after Earth-rotation compensation.
    pub position: ECEF,
    /// SV clock correction (includes relativistic and SBAS terms), seconds.
    pub clock_correction: f64,
    /// Transmit time `t_rx - PR/c`, seconds of week, updated each iteration.
    pub transmit_time: f64,

    /// Azimuth, radians.
    pub az: f64,
    /// Elevation, radians.
    pub el: f64,

    /// Fast-correction PRC, meters.
    pub prc: f64,
    /// Fast-correction range rate, m/s.
    pub rrc: f64,
    /// UDRE indicator (0-15).
    pub udrei: u8,
    pub fast_set: bool,
    pub long_set: bool,

    pub iono_delay: f64,
    pub sigma_uire2: f64,
    pub tropo_delay: f64,
    pub sigma_tropo2: f64,

    pub eps_fc: f64,
    pub eps_rrc: f64,
    pub eps_ltc: f64,
    pub eps_er: f64,
    pub sigma_flt2: f64,
    /// Total measurement variance fed to the weight matrix.
    pub sigma2: f64,

    pub use_state: UseState,
    pub exclusion: Option<ExclusionReason>,
}

impl SatelliteChannel {
    /// A freshly measured, not-yet-corrected channel.
    #[must_use]
    pub fn new(prn: u8, constellation: Constellation, tow: f64, pseudorange: f64, cn0: f64) -> Self {
        SatelliteChannel {
            prn,
            constellation,
            tow,
            pseudorange,
            pseudorange_corrected: pseudorange,
            cn0,
            ephemeris: None,
            long_term: None,
            position: ECEF::default(),
            clock_correction: 0.0,
            transmit_time: tow,
            az: 0.0,
            el: 0.0,
            prc: 0.0,
            rrc: 0.0,
            udrei: 0,
            fast_set: false,
            long_set: false,
            iono_delay: 0.0,
            sigma_uire2: 0.0,
            tropo_delay: 0.0,
            sigma_tropo2: 0.0,
            eps_fc: 0.0,
            eps_rrc: 0.0,
            eps_ltc: 0.0,
            eps_er: 0.0,
            sigma_flt2: 0.0,
            sigma2: 1.0,
            use_state: UseState::Unused,
            exclusion: None,
        }
    }
}

/// Result of propagating a GPS satellite's Keplerian ephemeris (4.6).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GpsPosition {
    pub ecef: Vector3<f64>,
    /// SV clock correction, including the relativistic term, excluding t_gd
    /// offset applied by the caller if it wants it separately.
    pub clock_correction: f64,
}

/// Propagate a GPS ephemeris to transmit time `t` (seconds of week), 4.6
/// steps 1-6. `egnos_delta` carries the SBAS clock delta `(daf0, daf1, t0)`
/// applied at step 1 when present, and the long-term position delta/rate
/// applied at step 6.
#[must_use]
pub fn compute_gps_position(
    eph: &Ephemeris,
    t_rx: f64,
    egnos_clock: Option<(f64, f64, f64)>,
    long_term: Option<&LongTermDelta>,
) -> GpsPosition {
    const F_CONST: f64 = -4.442_807_633e-10;

    let mut t = t_rx;
    let mut clock_correction =
        eph.a_f0 + eph.a_f1 * wrap_half_week(t - eph.t_oc) + eph.a_f2 * wrap_half_week(t - eph.t_oc).powi(2)
            - eph.t_gd;

    if let Some((daf0, daf1, t0)) = egnos_clock {
        clock_correction += daf0 + daf1 * (t - t0);
    }

    t -= clock_correction;
    let t_k = wrap_half_week(t - eph.t_oe);

    let a = eph.sqrt_a * eph.sqrt_a;
    let n = (GM_EARTH / (a * a * a)).sqrt() + eph.delta_n;
    let m_k = eph.m0 + n * t_k;

    let mut e_k = m_k;
    for _ in 0..10 {
        e_k = m_k + eph.e * e_k.sin();
    }

    let nu_k = ((1.0 - eph.e * eph.e).sqrt() * e_k.sin()).atan2(e_k.cos() - eph.e);
    let phi_k = nu_k + eph.omega;

    let du_k = eph.c_uc * (2.0 * phi_k).cos() + eph.c_us * (2.0 * phi_k).sin();
    let dr_k = eph.c_rc * (2.0 * phi_k).cos() + eph.c_rs * (2.0 * phi_k).sin();
    let di_k = eph.c_ic * (2.0 * phi_k).cos() + eph.c_is * (2.0 * phi_k).sin();

    let u_k = phi_k + du_k;
    let r_k = a * (1.0 - eph.e * e_k.cos()) + dr_k;
    let i_k = eph.i0 + di_k + eph.i_dot * t_k;

    let x_p = r_k * u_k.cos();
    let y_p = r_k * u_k.sin();

    let omega_k = eph.omega0 + (eph.omega_dot - OMEGA_EARTH) * t_k - OMEGA_EARTH * eph.t_oe;

    let mut pos = Vector3::new(
        x_p * omega_k.cos() - y_p * i_k.cos() * omega_k.sin(),
        x_p * omega_k.sin() + y_p * i_k.cos() * omega_k.cos(),
        y_p * i_k.sin(),
    );

    clock_correction += F_CONST * eph.e * eph.sqrt_a * e_k.sin();

    if let Some(delta) = long_term {
        let dt = t - delta.t0;
        pos += delta.d_pos + delta.d_vel * dt;
    }

    GpsPosition {
        ecef: pos,
        clock_correction,
    }
}

/// Propagate a geostationary SBAS satellite's MT9 position/velocity/
/// acceleration polynomial to time `tk` relative to `t0` (4.6, "Geostationary
/// SBAS satellites").
///
/// The source computes the `1/2` coefficient of the acceleration term as
/// integer division, silently truncating it to zero; this implementation
/// applies the correct `0.5` coefficient per 9's open question (a).
#[must_use]
pub fn compute_geo_position(
    t0: f64,
    pos0: Vector3<f64>,
    vel0: Vector3<f64>,
    accel0: Vector3<f64>,
    tk: f64,
) -> Vector3<f64> {
    let dt = tk - t0;
    pos0 + vel0 * dt + accel0 * (0.5 * dt * dt)
}

/// Rotate an ECEF position by the Earth-rotation angle accumulated during
/// signal travel time (4.6 step 7), compensating for the SV position being
/// computed in an Earth-fixed frame that itself rotated during transit.
#[must_use]
pub fn earth_rotation_correction(pos: Vector3<f64>, travel_time: f64) -> Vector3<f64> {
    let angle = OMEGA_EARTH * travel_time;
    let (sin_a, cos_a) = angle.sin_cos();
    Vector3::new(
        cos_a * pos.x + sin_a * pos.y,
        -sin_a * pos.x + cos_a * pos.y,
        pos.z,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ephemeris() -> Ephemeris {
        Ephemeris {
            prn: 1,
            week_number: 2048,
            t_oc: 0.0,
            a_f0: 0.0,
            a_f1: 0.0,
            a_f2: 0.0,
            t_gd: 0.0,
            iodc: 0,
            t_oe: 0.0,
            sqrt_a: 5153.6,
            e: 0.01,
            m0: 0.5,
            delta_n: 0.0,
            omega: 0.3,
            omega0: 1.0,
            i0: 0.96,
            i_dot: 0.0,
            omega_dot: 0.0,
            c_uc: 0.0,
            c_us: 0.0,
            c_rc: 0.0,
            c_rs: 0.0,
            c_ic: 0.0,
            c_is: 0.0,
            iode_subframe2: 1,
            iode_subframe3: 1,
        }
    }

    #[test]
    fn gps_position_within_orbit_radius_bounds() {
        let eph = sample_ephemeris();
        let result = compute_gps_position(&eph, 0.0, None, None);
        let r = result.ecef.norm();
        assert!((5.0e6..=3.0e7).contains(&r), "radius {r} out of GPS orbit bounds");
    }

    #[test]
    fn earth_rotation_correction_is_a_pure_rotation() {
        let pos = Vector3::new(20_000_000.0, 1_000_000.0, 500_000.0);
        let rotated = earth_rotation_correction(pos, 0.072);
        assert!((rotated.norm() - pos.norm()).abs() < 1e-6);
    }

    #[test]
    fn geo_position_uses_correct_half_coefficient() {
        let pos0 = Vector3::new(4.2e7, 0.0, 0.0);
        let vel0 = Vector3::zeros();
        let accel0 = Vector3::new(2.0, 0.0, 0.0);
        let pos = compute_geo_position(0.0, pos0, vel0, accel0, 10.0);
        // 0.5 * 2.0 * 10^2 = 100, not the truncated-to-zero source behavior.
        assert!((pos.x - (4.2e7 + 100.0)).abs() < 1e-6);
    }
}
