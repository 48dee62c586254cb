//! Small fixed-size linear algebra (4.2).
//!
//! Solver-side matrices are at most 19x4 (one row per visible satellite
//! channel, four unknowns: x, y, z, clock bias). `nalgebra`'s dynamically
//! sized matrices already provide well-tested, allocation-light determinant,
//! inverse, transpose and multiply for that size range, so this module adds
//! only the domain-specific primitive the corpus doesn't: the Lorentz inner
//! product used by the Bancroft method (4.10).
//!
//! No pivoting is performed; per 4.2 the problem sizes here are small and
//! well-conditioned at user-geometry scales, and a singular normal matrix
//! simply surfaces as a degenerate DOP (4.10 failure semantics) rather than
//! a numerical error.

use nalgebra::{Matrix4, Vector4};

/// Minkowski/Lorentz inner product used by the Bancroft closed-form solver:
/// `<a, b> = a0*b0 + a1*b1 + a2*b2 - a3*b3`.
#[must_use]
pub fn lorentz_product(a: Vector4<f64>, b: Vector4<f64>) -> f64 {
    a.x * b.x + a.y * b.y + a.z * b.z - a.w * b.w
}

/// Invert a 4x4 normal matrix (`H^T W H`), returning `None` when singular.
///
/// A singular normal matrix arises from degenerate satellite geometry
/// (fewer independent directions than unknowns); callers treat `None` as a
/// geometry failure per 4.10/7.
#[must_use]
pub fn invert_4x4(m: &Matrix4<f64>) -> Option<Matrix4<f64>> {
    m.try_inverse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lorentz_product_matches_definition() {
        let a = Vector4::new(1.0, 2.0, 3.0, 4.0);
        let b = Vector4::new(5.0, 6.0, 7.0, 8.0);
        let expected = 1.0 * 5.0 + 2.0 * 6.0 + 3.0 * 7.0 - 4.0 * 8.0;
        assert!((lorentz_product(a, b) - expected).abs() < 1e-12);
    }

    #[test]
    fn invert_identity() {
        let identity = Matrix4::identity();
        let inv = invert_4x4(&identity).unwrap();
        assert_eq!(inv, identity);
    }

    #[test]
    fn invert_singular_returns_none() {
        let singular = Matrix4::zeros();
        assert!(invert_4x4(&singular).is_none());
    }
}
