// Adapted from swift-nav-swiftnav-rs `coords/ecef.rs`.
use nalgebra::{ArrayStorage, Vector3};
use std::ops::{Add, AddAssign, Mul, MulAssign, Sub, SubAssign};

use super::{AzimuthElevation, Ellipsoid, LLHRadians, NED, WGS84};

/// WGS84 Earth Centered, Earth Fixed (ECEF) Cartesian coordinates (X, Y, Z), in meters.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct ECEF(Vector3<f64>);

impl ECEF {
    /// Create an [`ECEF`] object from the given X, Y, Z components.
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> ECEF {
        ECEF(Vector3::new(x, y, z))
    }

    /// Create an [`ECEF`] object from an array: `[x, y, z]`.
    #[must_use]
    pub const fn from_array(array: &[f64; 3]) -> ECEF {
        ECEF(Vector3::from_array_storage(ArrayStorage([*array; 1])))
    }

    #[must_use]
    pub(crate) fn from_vector3(vector: Vector3<f64>) -> ECEF {
        ECEF(vector)
    }

    #[must_use]
    pub(crate) fn as_vector_ref(&self) -> &Vector3<f64> {
        &self.0
    }

    /// Get the X component.
    #[must_use]
    pub fn x(&self) -> f64 {
        self.0[0]
    }

    /// Get the Y component.
    #[must_use]
    pub fn y(&self) -> f64 {
        self.0[1]
    }

    /// Get the Z component.
    #[must_use]
    pub fn z(&self) -> f64 {
        self.0[2]
    }

    /// Euclidean distance between two points, in meters.
    #[must_use]
    pub fn distance(&self, other: &ECEF) -> f64 {
        (self.0 - other.0).norm()
    }

    /// Convert an [`ECEF`] position into geodetic [`LLHRadians`], using the
    /// closed-form iterative method of 4.3.
    #[must_use]
    pub fn to_llh(&self) -> LLHRadians {
        super::ecef2llh::<WGS84>(self)
    }

    /// Determine the [`AzimuthElevation`] of `point` as seen from `self`,
    /// which is treated as the observer's position.
    #[must_use]
    pub fn azel_of(&self, point: &ECEF) -> AzimuthElevation {
        let delta = *point - *self;
        let ned = delta.ned_vector_at(self);
        super::ned_to_azel(ned)
    }

    /// Rotate a vector (e.g. a velocity, or a position delta) from ECEF into
    /// local NED coordinates, at the given reference point.
    #[must_use]
    pub fn ned_vector_at(&self, reference: &ECEF) -> NED {
        let m = crate::math::ecef2ned_matrix(reference.to_llh());
        NED::from(m * self.0)
    }
}

impl From<LLHRadians> for ECEF {
    fn from(value: LLHRadians) -> Self {
        value.to_ecef()
    }
}

impl Add for ECEF {
    type Output = ECEF;
    fn add(self, rhs: ECEF) -> ECEF {
        ECEF(self.0 + rhs.0)
    }
}

impl AddAssign for ECEF {
    fn add_assign(&mut self, rhs: ECEF) {
        self.0 += rhs.0;
    }
}

impl Sub for ECEF {
    type Output = ECEF;
    fn sub(self, rhs: ECEF) -> ECEF {
        ECEF(self.0 - rhs.0)
    }
}

impl SubAssign for ECEF {
    fn sub_assign(&mut self, rhs: ECEF) {
        self.0 -= rhs.0;
    }
}

impl Mul<ECEF> for f64 {
    type Output = ECEF;
    fn mul(self, rhs: ECEF) -> ECEF {
        ECEF(self * rhs.0)
    }
}

impl MulAssign<f64> for ECEF {
    fn mul_assign(&mut self, rhs: f64) {
        self.0 *= rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecef_ops() {
        let a = ECEF::new(1.0, 2.0, 3.0);
        let b = ECEF::new(4.0, 5.0, 6.0);

        let result = a + b;
        assert_eq!(5.0, result.x());
        assert_eq!(7.0, result.y());
        assert_eq!(9.0, result.z());

        let result = a - b;
        assert_eq!(-3.0, result.x());
        assert_eq!(-3.0, result.y());
        assert_eq!(-3.0, result.z());

        let result = 2.0 * a;
        assert_eq!(2.0, result.x());
        assert_eq!(4.0, result.y());
        assert_eq!(6.0, result.z());
    }
}
