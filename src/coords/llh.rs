// Adapted from swift-nav-swiftnav-rs `coords/llh.rs`.
use super::{Ellipsoid, ECEF, WGS84};
use nalgebra::Vector3;

/// WGS84 geodetic coordinates (Latitude, Longitude, Height), angles in degrees.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct LLHDegrees(Vector3<f64>);

impl LLHDegrees {
    /// Create an [`LLHDegrees`] from latitude, longitude (degrees) and height (m).
    #[must_use]
    pub fn new(lat: f64, lon: f64, height: f64) -> Self {
        Self(Vector3::new(lat, lon, height))
    }

    /// Get the latitude component, in degrees.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.0.x
    }

    /// Get the longitude component, in degrees.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.0.y
    }

    /// Get the height component, in meters above the WGS84 ellipsoid.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.0.z
    }

    /// Convert to [`LLHRadians`]; the position doesn't change, only the
    /// representation of the angular components.
    #[must_use]
    pub fn to_radians(&self) -> LLHRadians {
        LLHRadians::new(self.0.x.to_radians(), self.0.y.to_radians(), self.0.z)
    }

    /// Convert to [`ECEF`] using the [`WGS84`] ellipsoid.
    #[must_use]
    pub fn to_ecef(&self) -> ECEF {
        self.to_radians().to_ecef()
    }
}

impl From<[f64; 3]> for LLHDegrees {
    fn from(array: [f64; 3]) -> Self {
        Self::new(array[0], array[1], array[2])
    }
}

impl From<LLHRadians> for LLHDegrees {
    fn from(rad: LLHRadians) -> Self {
        rad.to_degrees()
    }
}

impl From<ECEF> for LLHDegrees {
    fn from(ecef: ECEF) -> Self {
        ecef.to_llh().to_degrees()
    }
}

/// WGS84 geodetic coordinates (Latitude, Longitude, Height), angles in radians.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct LLHRadians(Vector3<f64>);

impl LLHRadians {
    /// Create an [`LLHRadians`] from latitude, longitude (radians) and height (m).
    #[must_use]
    pub fn new(lat: f64, lon: f64, height: f64) -> Self {
        Self(Vector3::new(lat, lon, height))
    }

    /// Create an [`LLHRadians`] from an array: `[lat, lon, height]`.
    #[must_use]
    pub const fn from_array(array: &[f64; 3]) -> Self {
        Self(Vector3::new(array[0], array[1], array[2]))
    }

    /// Get the latitude component, in radians.
    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.0.x
    }

    /// Get the longitude component, in radians.
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.0.y
    }

    /// Get the height component, in meters above the WGS84 ellipsoid.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.0.z
    }

    /// Convert to [`LLHDegrees`]; the position doesn't change, only the
    /// representation of the angular components.
    #[must_use]
    pub fn to_degrees(&self) -> LLHDegrees {
        LLHDegrees::new(self.0.x.to_degrees(), self.0.y.to_degrees(), self.0.z)
    }

    /// Convert a geodetic position to [`ECEF`] using the [`WGS84`] ellipsoid (4.3).
    #[must_use]
    pub fn to_ecef(&self) -> ECEF {
        let sin_lat = self.latitude().sin();
        let n = WGS84::A / (1.0 - WGS84::E2 * sin_lat * sin_lat).sqrt();

        let x = (n + self.height()) * self.latitude().cos() * self.longitude().cos();
        let y = (n + self.height()) * self.latitude().cos() * self.longitude().sin();
        let z = ((1.0 - WGS84::E2) * n + self.height()) * sin_lat;

        ECEF::new(x, y, z)
    }
}

impl From<[f64; 3]> for LLHRadians {
    fn from(array: [f64; 3]) -> Self {
        Self::new(array[0], array[1], array[2])
    }
}

impl From<LLHDegrees> for LLHRadians {
    fn from(deg: LLHDegrees) -> Self {
        deg.to_radians()
    }
}

impl From<ECEF> for LLHRadians {
    fn from(ecef: ECEF) -> Self {
        ecef.to_llh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const D2R: f64 = std::f64::consts::PI / 180.0;
    const MAX_DIST_ERROR_M: f64 = 1e-6;
    const MAX_ANGLE_ERROR_RAD: f64 = 1e-7 * D2R;

    const EARTH_A: f64 = 6_378_137.0;
    const EARTH_B: f64 = 6_356_752.314_245_179;

    #[test]
    fn llh2ecef_equator_and_poles() {
        let cases: [(LLHRadians, ECEF); 6] = [
            (LLHRadians::new(0.0, 0.0, 0.0), ECEF::new(EARTH_A, 0.0, 0.0)),
            (
                LLHRadians::new(0.0, std::f64::consts::PI, 0.0),
                ECEF::new(-EARTH_A, 0.0, 0.0),
            ),
            (
                LLHRadians::new(0.0, std::f64::consts::FRAC_PI_2, 0.0),
                ECEF::new(0.0, EARTH_A, 0.0),
            ),
            (
                LLHRadians::new(std::f64::consts::FRAC_PI_2, 0.0, 0.0),
                ECEF::new(0.0, 0.0, EARTH_B),
            ),
            (
                LLHRadians::new(-std::f64::consts::FRAC_PI_2, 0.0, 0.0),
                ECEF::new(0.0, 0.0, -EARTH_B),
            ),
            (
                LLHRadians::new(0.0, 0.0, 22.0),
                ECEF::new(EARTH_A + 22.0, 0.0, 0.0),
            ),
        ];

        for (llh, expected) in cases {
            let ecef = llh.to_ecef();
            assert!((ecef.x() - expected.x()).abs() < MAX_DIST_ERROR_M);
            assert!((ecef.y() - expected.y()).abs() < MAX_DIST_ERROR_M);
            assert!((ecef.z() - expected.z()).abs() < MAX_DIST_ERROR_M);
        }
    }

    #[test]
    fn round_trip_geodetic() {
        // Round-trip invariant from 8: geodetic -> ECEF -> geodetic within
        // 1e-9 rad / 1e-6 m for |lat| < pi/2.
        let cases = [
            (48.0 * D2R, 11.0 * D2R, 500.0),
            (-33.9 * D2R, 151.2 * D2R, 30.0),
            (0.0, 0.0, 0.0),
            (89.9 * D2R, 45.0 * D2R, 1000.0),
        ];
        for (lat, lon, h) in cases {
            let llh = LLHRadians::new(lat, lon, h);
            let round_trip = llh.to_ecef().to_llh();
            assert!((round_trip.latitude() - lat).abs() < 1e-9);
            assert!((round_trip.longitude() - lon).abs() < 1e-9);
            assert!((round_trip.height() - h).abs() < 1e-6);
        }
    }

    proptest::proptest! {
        #[test]
        fn round_trip_geodetic_proptest(
            lat in -1.55_f64..1.55_f64,
            lon in -std::f64::consts::PI..std::f64::consts::PI,
            h in -1000.0_f64..50_000.0_f64,
        ) {
            let llh = LLHRadians::new(lat, lon, h);
            let round_trip = llh.to_ecef().to_llh();
            proptest::prop_assert!((round_trip.latitude() - lat).abs() < 1e-9);
            proptest::prop_assert!((round_trip.longitude() - lon).abs() < 1e-9);
            proptest::prop_assert!((round_trip.height() - h).abs() < 1e-6);
        }
    }
}
