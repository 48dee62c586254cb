// Adapted from swift-nav-swiftnav-rs `coords/mod.rs`.
//! Coordinates and conversions (4.3).
//!
//! Four coordinate types are defined:
//!  * [`LLHDegrees`]/[`LLHRadians`] - geodetic coordinates (latitude, longitude, height)
//!  * [`ECEF`] - Cartesian coordinates, Earth Centered, Earth Fixed
//!  * [`NED`] - local direction coordinates, North East Down
//!  * [`AzimuthElevation`] - relative direction coordinates, azimuth and elevation
//!
//! # Geodetic to Cartesian
//!
//! $$X = (N(\phi) + h) \cos{\phi}\cos{\lambda}, \quad
//!   Y = (N(\phi) + h) \cos{\phi}\sin{\lambda}, \quad
//!   Z = \left[(1-e^2)N(\phi) + h\right] \sin{\phi}$$
//!
//! where the radius of curvature $N(\phi) = a / \sqrt{1 - e^2 \sin^2\phi}$.
//!
//! # Cartesian to Geodetic
//!
//! There is no closed-form solution; this crate uses the classic Bowring
//! iteration, which converges to the tolerances required by 4.3
//! (`|delta_lat| < 1e-9 rad`, `|delta_h| < 1e-9 * a`) in well under the 5
//! allotted steps for any latitude.

mod ecef;
mod ellipsoid;
mod llh;
mod ned;

pub use ecef::ECEF;
pub use ellipsoid::{Ellipsoid, WGS84};
pub use llh::{LLHDegrees, LLHRadians};
pub use ned::NED;

use nalgebra::Vector2;

use crate::math::normalize_azimuth;

/// WGS84 local horizontal coordinates: azimuth and elevation, in radians.
///
/// Azimuth ranges over `[0, 2*pi)`: north is `0`, east is `pi/2`. Elevation
/// ranges over `[-pi/2, pi/2]`: straight up is `pi/2`.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct AzimuthElevation(Vector2<f64>);

impl AzimuthElevation {
    /// Create an [`AzimuthElevation`] from the given azimuth and elevation, in radians.
    #[must_use]
    pub fn new(az: f64, el: f64) -> AzimuthElevation {
        AzimuthElevation(Vector2::new(az, el))
    }

    /// Get the azimuth component, in `[0, 2*pi)` radians.
    #[must_use]
    pub fn az(&self) -> f64 {
        self.0[0]
    }

    /// Get the elevation component, in radians.
    #[must_use]
    pub fn el(&self) -> f64 {
        self.0[1]
    }
}

/// Iterative ECEF to geodetic conversion (4.3), generic over the ellipsoid.
///
/// Uses Bowring's method: each iteration refines latitude from an updated
/// radius of curvature and ellipsoidal height.
#[must_use]
pub(crate) fn ecef2llh<E: Ellipsoid>(ecef: &ECEF) -> LLHRadians {
    let x = ecef.x();
    let y = ecef.y();
    let z = ecef.z();

    let p = (x * x + y * y).sqrt();
    let lon = y.atan2(x);

    if p < 1e-12 {
        // On the polar axis; longitude is undefined, latitude is +/-90deg.
        let lat = std::f64::consts::FRAC_PI_2.copysign(z);
        let height = z.abs() - E::B;
        return LLHRadians::new(lat, 0.0, height);
    }

    let mut lat = (z / (p * (1.0 - E::E2))).atan();
    let mut height = 0.0;

    for _ in 0..10 {
        let sin_lat = lat.sin();
        let n = E::A / (1.0 - E::E2 * sin_lat * sin_lat).sqrt();
        height = p / lat.cos() - n;
        let new_lat = (z / (p * (1.0 - E::E2 * n / (n + height)))).atan();

        let converged = (new_lat - lat).abs() < 1e-12;
        lat = new_lat;
        if converged {
            break;
        }
    }

    LLHRadians::new(lat, lon, height)
}

/// Convert a NED relative-position vector into azimuth/elevation (4.3):
/// `elevation = atan2(U, sqrt(E^2 + N^2))`, `azimuth = atan2(E, N)` normalized
/// to `[0, 2*pi)`.
#[must_use]
pub(crate) fn ned_to_azel(ned: NED) -> AzimuthElevation {
    let (n, e, u) = (ned.n(), ned.e(), -ned.d());
    let az = normalize_azimuth(e.atan2(n));
    let el = u.atan2((e * e + n * n).sqrt());
    AzimuthElevation::new(az, el)
}

#[cfg(test)]
mod tests {
    use super::*;

    const D2R: f64 = std::f64::consts::PI / 180.0;

    #[test]
    fn azel_of_overhead_point() {
        let user = LLHRadians::new(48.0 * D2R, 11.0 * D2R, 0.0).to_ecef();
        let overhead = LLHRadians::new(48.0 * D2R, 11.0 * D2R, 20_000_000.0).to_ecef();
        let azel = user.azel_of(&overhead);
        assert!((azel.el() - std::f64::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn azel_due_north() {
        let user = LLHRadians::new(0.0, 0.0, 0.0).to_ecef();
        let north = LLHRadians::new(1.0 * D2R, 0.0, 0.0).to_ecef();
        let azel = user.azel_of(&north);
        assert!(azel.az().abs() < 1e-3, "az = {}", azel.az());
        assert!(azel.el() < 0.0);
    }
}
