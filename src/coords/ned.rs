// Adapted from swift-nav-swiftnav-rs `coords/ned.rs`.
use nalgebra::Vector3;

use crate::{coords::ECEF, math};

/// Local North-East-Down reference frame coordinates, in meters.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Default)]
pub struct NED(Vector3<f64>);

impl NED {
    /// Create a [`NED`] from the given north, east, down components.
    #[must_use]
    pub fn new(n: f64, e: f64, d: f64) -> NED {
        NED(Vector3::new(n, e, d))
    }

    /// Get the north component.
    #[must_use]
    pub fn n(&self) -> f64 {
        self.0.x
    }

    /// Get the east component.
    #[must_use]
    pub fn e(&self) -> f64 {
        self.0.y
    }

    /// Get the down component.
    #[must_use]
    pub fn d(&self) -> f64 {
        self.0.z
    }

    /// Rotate a local [`NED`] vector into an [`ECEF`] vector, at a given
    /// reference point. This is the inverse of [`ECEF::ned_vector_at`].
    #[must_use]
    pub fn ecef_vector_at(&self, reference: &ECEF) -> ECEF {
        let m = math::ecef2ned_matrix(reference.to_llh());
        ECEF::from_vector3(m.transpose() * self.0)
    }
}

impl From<Vector3<f64>> for NED {
    fn from(vector: Vector3<f64>) -> Self {
        Self(vector)
    }
}

impl From<(f64, f64, f64)> for NED {
    fn from((n, e, d): (f64, f64, f64)) -> Self {
        Self::new(n, e, d)
    }
}
