// Adapted from swift-nav-swiftnav-rs `math.rs`.
//! Small numeric helpers shared by the coordinate and geometry modules.

use nalgebra::Matrix3;

use crate::coords::LLHRadians;

/// `const`-evaluable square root via Newton's method, used to derive the
/// WGS84/GRS80 eccentricity from flattening at compile time.
#[must_use]
pub(crate) const fn compile_time_sqrt(x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    let mut guess = x;
    // A fixed iteration count converges to f64 precision for the range of
    // eccentricity-squared values (~0.006) this is used with.
    let mut i = 0;
    while i < 64 {
        guess = 0.5 * (guess + x / guess);
        i += 1;
    }
    guess
}

/// Rotation matrix from ECEF into the local North-East-Down frame at the
/// given geodetic reference point.
#[must_use]
pub(crate) fn ecef2ned_matrix(llh: LLHRadians) -> Matrix3<f64> {
    let (sin_lat, cos_lat) = llh.latitude().sin_cos();
    let (sin_lon, cos_lon) = llh.longitude().sin_cos();

    Matrix3::new(
        -sin_lat * cos_lon,
        -sin_lat * sin_lon,
        cos_lat,
        -sin_lon,
        cos_lon,
        0.0,
        -cos_lat * cos_lon,
        -cos_lat * sin_lon,
        -sin_lat,
    )
}

/// Normalize an azimuth angle (radians) into `[0, 2*pi)`.
#[must_use]
pub(crate) fn normalize_azimuth(az: f64) -> f64 {
    let two_pi = std::f64::consts::TAU;
    let wrapped = az % two_pi;
    if wrapped < 0.0 {
        wrapped + two_pi
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sqrt_matches_std() {
        for x in [0.25, 1.0, 2.0, 6.694_379_990_13e-3_f64] {
            let a = compile_time_sqrt(x);
            let b = x.sqrt();
            assert!((a - b).abs() < 1e-12, "{a} vs {b}");
        }
    }

    #[test]
    fn azimuth_wraps() {
        use std::f64::consts::TAU;
        assert!((normalize_azimuth(-0.1) - (TAU - 0.1)).abs() < 1e-12);
        assert!((normalize_azimuth(TAU + 0.1) - 0.1).abs() < 1e-12);
    }
}
