//! Ionospheric delay correction (4.7), grounded on DO-229D A.4.4.10 via the
//! pierce-point, GIVE-table and degradation formulas the source keeps in its
//! own ionosphere module.
//!
//! The source's IGP selection walks an 11-band table of masked grid points
//! with separate 5x5 / 5x10 / 10x10 / polar code paths (`IGPsSelect`,
//! `calculateIGPs`, `calculateIGPs_above75`). [`select_igps`] generalizes that
//! into one grid-cell search over whatever IGPs the caller has bound from
//! MT18/MT26, rather than re-deriving each band's own spacing rules.

use crate::sbas::{IgpDelayStatus, IgpEntry};

/// Earth radius used by the pierce-point geometry, meters (DO-229D A.4.4.10.1).
const EARTH_RADIUS_M: f64 = 6_378_136.3;
/// Height of peak electron density above the Earth's surface, meters.
const IONO_SHELL_HEIGHT_M: f64 = 350_000.0;
/// IGPVD value flagging "don't use" (9, "don't-use sentinel").
const DONT_USE_IGPVD_M: f64 = 63.875;

/// One ionospheric grid point bound to its delay and confidence, ready for
/// interpolation (4.7 step 3: "bind the masked IGPs to their MT26 delay").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundIgp {
    pub lat: f64,
    pub lon: f64,
    pub igpvd: f64,
    pub givei: u8,
    pub status: IgpDelayStatus,
}

impl BoundIgp {
    #[must_use]
    pub fn new(entry: IgpEntry, igpvd: f64, givei: u8, status: IgpDelayStatus) -> Self {
        Self { lat: entry.lat, lon: entry.lon, igpvd, givei, status }
    }

    fn usable(&self) -> bool {
        self.status == IgpDelayStatus::Monitored && self.givei != 15 && self.igpvd < DONT_USE_IGPVD_M
    }

    fn give_variance(&self) -> Option<f64> {
        give_variance(self.givei)
    }
}

/// GIVEI-indexed table of a-priori GIVE accuracy, squared (DO-229D table
/// A.4.5.1). `None` for index 15, "don't use".
#[must_use]
pub fn give_variance(givei: u8) -> Option<f64> {
    let sigma = match givei {
        0 => 0.0084,
        1 => 0.0333,
        2 => 0.0749,
        3 => 0.1331,
        4 => 0.2079,
        5 => 0.2994,
        6 => 0.4075,
        7 => 0.5322,
        8 => 0.6735,
        9 => 0.8315,
        10 => 1.1974,
        11 => 1.8709,
        12 => 3.3260,
        13 => 20.7870,
        14 => 187.0826,
        _ => return None,
    };
    Some(sigma)
}

/// Geodetic latitude/longitude of the ionospheric pierce point, degrees
/// (DO-229D A.4.4.10.1).
#[must_use]
pub fn pierce_point(user_lat_deg: f64, user_lon_deg: f64, elevation_deg: f64, azimuth_deg: f64) -> (f64, f64) {
    let user_lat = user_lat_deg.to_radians();
    let user_lon = user_lon_deg.to_radians();
    let el = elevation_deg.to_radians();
    let az = azimuth_deg.to_radians();

    let earth_angle = std::f64::consts::FRAC_PI_2
        - el
        - ((EARTH_RADIUS_M * el.cos()) / (EARTH_RADIUS_M + IONO_SHELL_HEIGHT_M)).asin();

    let ipp_lat = (user_lat.sin() * earth_angle.cos() + user_lat.cos() * earth_angle.sin() * az.cos()).asin();

    let crosses_pole = (user_lat_deg > 70.0
        && (earth_angle.tan() * az.cos()) > (std::f64::consts::FRAC_PI_2 - user_lat).tan())
        || (user_lat_deg < -70.0
            && (earth_angle.tan() * (az + std::f64::consts::PI).cos())
                > (std::f64::consts::FRAC_PI_2 + user_lat).tan());

    let delta_lon = (earth_angle.sin() * az.sin() / ipp_lat.cos()).asin();
    let ipp_lon = if crosses_pole { user_lon + std::f64::consts::PI - delta_lon } else { user_lon + delta_lon };

    (ipp_lat.to_degrees(), ipp_lon.to_degrees())
}

/// Obliquity (slant) factor mapping vertical to slant delay, `Fpp` in
/// DO-229D A.4.4.10.4.
#[must_use]
pub fn obliquity_factor(elevation_deg: f64) -> f64 {
    let term = (EARTH_RADIUS_M * elevation_deg.to_radians().cos()) / (EARTH_RADIUS_M + IONO_SHELL_HEIGHT_M);
    1.0 / (1.0 - term * term).sqrt()
}

/// Degrades the GIVE variance by MT10's ionospheric decorrelation parameters
/// as the message it was transmitted in ages (DO-229D table A.4.5.2).
///
/// `rss` selects RSS vs. linear combination of the degradation with the
/// a-priori sigma (MT10's `rss_iono` flag).
#[must_use]
pub fn degraded_variance(give_variance: f64, now: f64, t_iono: f64, c_iono_step: f64, i_iono: f64, c_iono_ramp: f64, rss: bool) -> f64 {
    let eps_iono = c_iono_step * ((now - t_iono) / i_iono).floor() + c_iono_ramp * (now - t_iono);
    if rss {
        give_variance + eps_iono * eps_iono
    } else {
        let combined = give_variance.sqrt() + eps_iono;
        combined * combined
    }
}

/// A pierce point's interpolated vertical delay (m) and variance (m^2), or
/// `None` if fewer than 3 usable IGPs surrounded it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IonoCorrection {
    pub vertical_delay: f64,
    pub variance: f64,
}

/// Selects the smallest enclosing grid cell (a 3- or 4-point interpolation
/// square) around `ipp` from the supplied bound IGPs, skipping any cell with
/// a don't-use or unmonitored corner (4.7 step 3/4). IGPs further than one
/// nominal grid spacing away are never considered, so this degrades to "no
/// correction" rather than extrapolating across a data gap.
#[must_use]
pub fn select_cell(igps: &[BoundIgp], ipp_lat: f64, ipp_lon: f64) -> Option<[BoundIgp; 4]> {
    let sw = nearest(igps, ipp_lat, ipp_lon, -1.0, -1.0)?;
    let se = nearest(igps, ipp_lat, ipp_lon, -1.0, 1.0)?;
    let nw = nearest(igps, ipp_lat, ipp_lon, 1.0, -1.0)?;
    let ne = nearest(igps, ipp_lat, ipp_lon, 1.0, 1.0)?;
    Some([sw, se, nw, ne])
}

/// Closest IGP in the quadrant of `(lat, lon)` selected by the two signs
/// (e.g. `lat_sign = -1.0, lon_sign = -1.0` searches south-west).
fn nearest(igps: &[BoundIgp], lat: f64, lon: f64, lat_sign: f64, lon_sign: f64) -> Option<BoundIgp> {
    igps.iter()
        .copied()
        .filter(|p| (p.lat - lat) * lat_sign >= -0.01 && (p.lon - lon) * lon_sign >= -0.01)
        .min_by(|a, b| {
            let da = (a.lat - lat).powi(2) + (a.lon - lon).powi(2);
            let db = (b.lat - lat).powi(2) + (b.lon - lon).powi(2);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Bilinear interpolation over 4 corner IGPs (`sw, se, nw, ne` order),
/// DO-229D A.4.4.10.3 equations for the 4-point case.
#[must_use]
pub fn interpolate_4point(corners: [BoundIgp; 4], ipp_lat: f64, ipp_lon: f64) -> Option<IonoCorrection> {
    let [sw, se, nw, ne] = corners;
    if !(sw.usable() && se.usable() && nw.usable() && ne.usable()) {
        return None;
    }
    let lon_span = se.lon - sw.lon;
    let lat_span = nw.lat - sw.lat;
    if lon_span.abs() < 1e-9 || lat_span.abs() < 1e-9 {
        return None;
    }
    let xpp = (ipp_lon - sw.lon) / lon_span;
    let ypp = (ipp_lat - sw.lat) / lat_span;

    let w_ne = xpp * ypp;
    let w_nw = (1.0 - xpp) * ypp;
    let w_sw = (1.0 - xpp) * (1.0 - ypp);
    let w_se = xpp * (1.0 - ypp);

    let delay = w_ne * ne.igpvd + w_nw * nw.igpvd + w_sw * sw.igpvd + w_se * se.igpvd;
    let variance = w_ne * ne.give_variance().unwrap_or(0.0)
        + w_nw * nw.give_variance().unwrap_or(0.0)
        + w_sw * sw.give_variance().unwrap_or(0.0)
        + w_se * se.give_variance().unwrap_or(0.0);

    Some(IonoCorrection { vertical_delay: delay, variance })
}

/// Barycentric interpolation over the 3 surviving corners of a cell whose
/// fourth corner is unusable, DO-229D A.4.4.10.3's triangle case.
#[must_use]
pub fn interpolate_3point(triangle: [BoundIgp; 3], ipp_lat: f64, ipp_lon: f64) -> Option<IonoCorrection> {
    let [a, b, c] = triangle;
    if !(a.usable() && b.usable() && c.usable()) {
        return None;
    }
    let denom = (b.lat - c.lat) * (a.lon - c.lon) + (c.lon - b.lon) * (a.lat - c.lat);
    if denom.abs() < 1e-9 {
        return None;
    }
    let w_a = ((b.lat - c.lat) * (ipp_lon - c.lon) + (c.lon - b.lon) * (ipp_lat - c.lat)) / denom;
    let w_b = ((c.lat - a.lat) * (ipp_lon - c.lon) + (a.lon - c.lon) * (ipp_lat - c.lat)) / denom;
    let w_c = 1.0 - w_a - w_b;

    let delay = w_a * a.igpvd + w_b * b.igpvd + w_c * c.igpvd;
    let variance = w_a * a.give_variance().unwrap_or(0.0)
        + w_b * b.give_variance().unwrap_or(0.0)
        + w_c * c.give_variance().unwrap_or(0.0);

    Some(IonoCorrection { vertical_delay: delay, variance })
}

/// Full per-satellite ionospheric correction pipeline: pierce point,
/// interpolation, obliquity scaling (4.7). Returns `None` if the pierce
/// point has no enclosing cell of usable IGPs.
#[must_use]
pub fn correct(
    user_lat_deg: f64,
    user_lon_deg: f64,
    elevation_deg: f64,
    azimuth_deg: f64,
    igps: &[BoundIgp],
) -> Option<IonoCorrection> {
    let (ipp_lat, ipp_lon) = pierce_point(user_lat_deg, user_lon_deg, elevation_deg, azimuth_deg);
    let cell = select_cell(igps, ipp_lat, ipp_lon)?;
    let usable_count = cell.iter().filter(|p| p.usable()).count();
    let interp = if usable_count == 4 {
        interpolate_4point(cell, ipp_lat, ipp_lon)?
    } else if usable_count == 3 {
        let three: Vec<BoundIgp> = cell.iter().copied().filter(BoundIgp::usable).collect();
        interpolate_3point([three[0], three[1], three[2]], ipp_lat, ipp_lon)?
    } else {
        return None;
    };

    let fpp = obliquity_factor(elevation_deg);
    Some(IonoCorrection {
        vertical_delay: -fpp * interp.vertical_delay,
        variance: fpp * fpp * interp.variance,
    })
}

/// Klobuchar broadcast-model fallback (4.7 step 5), used when no SBAS
/// ionospheric grid covers the pierce point. `alpha`/`beta` are the GPS
/// navigation message's ionospheric coefficients, `tow` the receiver time of
/// week in seconds.
#[must_use]
pub fn klobuchar_delay(
    alpha: [f64; 4],
    beta: [f64; 4],
    user_lat_deg: f64,
    user_lon_deg: f64,
    elevation_deg: f64,
    azimuth_deg: f64,
    tow: f64,
) -> f64 {
    let az = azimuth_deg.to_radians();
    let elv = elevation_deg / 180.0;
    let lat_sc = user_lat_deg / 180.0;
    let lon_sc = user_lon_deg / 180.0;

    let psi = 0.0137 / (elv + 0.11) - 0.022;
    let mut iono_lat = lat_sc + psi * az.cos();
    iono_lat = iono_lat.clamp(-0.416, 0.416);
    let iono_lon = lon_sc + psi * az.sin() / (iono_lat * std::f64::consts::PI).cos();
    let lat_m = iono_lat + 0.064 * ((iono_lon - 1.617) * std::f64::consts::PI).cos();

    let slant = 1.0 + 16.0 * (0.53 - elv).powi(3);

    let mut period = beta[0] + beta[1] * lat_m + beta[2] * lat_m * lat_m + beta[3] * lat_m * lat_m * lat_m;
    if period < 72_000.0 {
        period = 72_000.0;
    }
    let mut amplitude = alpha[0] + alpha[1] * lat_m + alpha[2] * lat_m * lat_m + alpha[3] * lat_m * lat_m * lat_m;
    if amplitude < 0.0 {
        amplitude = 0.0;
    }

    let mut t = 4.32e4 * iono_lon + tow;
    t -= (t / 86_400.0).floor() * 86_400.0;
    if t > 86_400.0 {
        t -= 86_400.0;
    } else if t < 0.0 {
        t += 86_400.0;
    }

    let x = 2.0 * std::f64::consts::PI * (t - 50_400.0) / period;
    let delay = if x.abs() < std::f64::consts::FRAC_PI_2 {
        slant * (5e-9 + amplitude * (1.0 - x * x / 2.0 + x * x * x * x / 24.0))
    } else {
        slant * 5e-9
    };

    crate::time::SPEED_OF_LIGHT * delay
}

/// Conservative variance floor for the Klobuchar fallback, keyed by the
/// subionospheric geomagnetic latitude (4.7 step 5), plus the model's own
/// 1/5 ratio between delay magnitude and its 1-sigma bound.
#[must_use]
pub fn klobuchar_variance(delay_m: f64, geomagnetic_lat_deg: f64, elevation_deg: f64) -> f64 {
    let sigma_vertical = if geomagnetic_lat_deg.abs() <= 20.0 {
        9.0
    } else if geomagnetic_lat_deg.abs() <= 55.0 {
        4.5
    } else {
        6.0
    };
    let fpp = obliquity_factor(elevation_deg);
    let from_delay = (delay_m / 5.0).powi(2);
    let from_table = (fpp * sigma_vertical).powi(2);
    from_delay.max(from_table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pierce_point_directly_overhead_matches_user_position() {
        let (lat, lon) = pierce_point(45.0, 10.0, 90.0, 0.0);
        assert!((lat - 45.0).abs() < 1e-6);
        assert!((lon - 10.0).abs() < 1e-6);
    }

    #[test]
    fn obliquity_factor_is_one_at_zenith() {
        assert!((obliquity_factor(90.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn obliquity_factor_grows_at_low_elevation() {
        assert!(obliquity_factor(5.0) > obliquity_factor(80.0));
    }

    #[test]
    fn give_variance_is_monotonic_with_indicator() {
        for i in 0..14 {
            assert!(give_variance(i).unwrap() < give_variance(i + 1).unwrap());
        }
        assert_eq!(give_variance(15), None);
    }

    fn corner(lat: f64, lon: f64, igpvd: f64, givei: u8) -> BoundIgp {
        BoundIgp { lat, lon, igpvd, givei, status: IgpDelayStatus::Monitored }
    }

    #[test]
    fn four_point_interpolation_matches_corner_at_vertex() {
        let sw = corner(30.0, 10.0, 1.0, 0);
        let se = corner(30.0, 15.0, 2.0, 0);
        let nw = corner(35.0, 10.0, 3.0, 0);
        let ne = corner(35.0, 15.0, 4.0, 0);
        let result = interpolate_4point([sw, se, nw, ne], 30.0, 10.0).unwrap();
        assert!((result.vertical_delay - 1.0).abs() < 1e-9);
    }

    #[test]
    fn four_point_interpolation_is_bounded_by_corners() {
        let sw = corner(30.0, 10.0, 1.0, 0);
        let se = corner(30.0, 15.0, 2.0, 0);
        let nw = corner(35.0, 10.0, 3.0, 0);
        let ne = corner(35.0, 15.0, 4.0, 0);
        let result = interpolate_4point([sw, se, nw, ne], 32.5, 12.5).unwrap();
        assert!(result.vertical_delay >= 1.0 && result.vertical_delay <= 4.0);
    }

    #[test]
    fn four_point_interpolation_variance_pairs_matching_corner() {
        // Distinct GIVEI per corner so a weight/corner transcription error
        // (pairing w_ne with sw's variance, etc.) would be caught: all-zero
        // GIVEI above makes every corner's variance identical and hides it.
        let sw = corner(30.0, 10.0, 1.0, 0);
        let se = corner(30.0, 15.0, 2.0, 1);
        let nw = corner(35.0, 10.0, 3.0, 2);
        let ne = corner(35.0, 15.0, 4.0, 3);
        let result = interpolate_4point([sw, se, nw, ne], 31.0, 11.0).unwrap();

        let xpp = 0.2;
        let ypp = 0.2;
        let w_ne = xpp * ypp;
        let w_nw = (1.0 - xpp) * ypp;
        let w_sw = (1.0 - xpp) * (1.0 - ypp);
        let w_se = xpp * (1.0 - ypp);
        let expected = w_ne * ne.give_variance().unwrap()
            + w_nw * nw.give_variance().unwrap()
            + w_sw * sw.give_variance().unwrap()
            + w_se * se.give_variance().unwrap();

        assert!((result.variance - expected).abs() < 1e-12);
    }

    #[test]
    fn dont_use_corner_blocks_interpolation() {
        let sw = BoundIgp { lat: 30.0, lon: 10.0, igpvd: DONT_USE_IGPVD_M, givei: 0, status: IgpDelayStatus::DontUse };
        let se = corner(30.0, 15.0, 2.0, 0);
        let nw = corner(35.0, 10.0, 3.0, 0);
        let ne = corner(35.0, 15.0, 4.0, 0);
        assert!(interpolate_4point([sw, se, nw, ne], 32.0, 12.0).is_none());
    }

    #[test]
    fn klobuchar_delay_is_nonnegative_in_typical_case() {
        let alpha = [0.1397e-7, 0.0, -0.5960e-7, 0.0];
        let beta = [0.1290e6, 0.0, -0.1966e6, 0.0];
        let delay = klobuchar_delay(alpha, beta, 40.0, -75.0, 45.0, 90.0, 43200.0);
        assert!(delay >= 0.0);
    }

    #[test]
    fn degraded_variance_rss_vs_linear_differ() {
        let rss = degraded_variance(1.0, 1000.0, 0.0, 0.5, 120.0, 0.0, true);
        let linear = degraded_variance(1.0, 1000.0, 0.0, 0.5, 120.0, 0.0, false);
        assert!((rss - linear).abs() > 1e-9);
    }
}
