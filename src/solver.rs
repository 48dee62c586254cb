//! Positioning solver (4.10): Bancroft initial estimate, iterative weighted
//! least squares, DOP/HPL/VPL, and the optional RAIM / 2D-altitude-hold /
//! best-DOP-exclusion modes.
//!
//! The outer per-cycle loop that recomputes satellite positions and SBAS
//! corrections at each iteration is the orchestration layer's job (4.11);
//! this module is the numerical core it drives: given a snapshot of
//! corrected pseudoranges, satellite positions, az/el and variances for the
//! current estimate, it produces one linearized update, the DOPs, and
//! (when weighted) the protection levels.

use nalgebra::{DMatrix, DVector, Matrix4, Vector3, Vector4};

use crate::coords::{Ellipsoid, WGS84};
use crate::error::SolverError;
use crate::matrix::{invert_4x4, lorentz_product};
use crate::time::{OMEGA_EARTH, SPEED_OF_LIGHT};

/// One channel's contribution to a linearized position update: its ECEF
/// position, corrected pseudorange (already iono/tropo/fast/long applied,
/// or raw when SBAS is disabled), az/el as seen from the current estimate,
/// and the measurement variance feeding its weight.
#[derive(Debug, Clone, Copy)]
pub struct GeometryRow {
    pub position: Vector3<f64>,
    pub pseudorange_corrected: f64,
    /// SV clock correction, seconds (already includes relativistic/SBAS
    /// terms); applied as `+ c * clock_correction` to the residual.
    pub clock_correction: f64,
    /// Azimuth, radians.
    pub az: f64,
    /// Elevation, radians.
    pub el: f64,
    /// Measurement variance (`sigma2`) when weighted by variance, or a
    /// directly-usable weight (e.g. C/N0) when `weight_is_variance` is
    /// false (4.10 step 2, "or C/N0 when SBAS off").
    pub weight_term: f64,
    pub weight_is_variance: bool,
}

impl GeometryRow {
    fn weight(&self) -> f64 {
        if self.weight_is_variance {
            1.0 / self.weight_term
        } else {
            self.weight_term
        }
    }
}

/// Dilution of precision, the diagonal of the unweighted `(HᵀH)⁻¹` expressed
/// in the ENU frame (4.10 step 3).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dop {
    pub hdop: f64,
    pub vdop: f64,
    pub pdop: f64,
    pub tdop: f64,
    pub gdop: f64,
}

fn dop_from_enu_normal_inverse(d: &Matrix4<f64>) -> Dop {
    Dop {
        hdop: (d[(0, 0)] + d[(1, 1)]).sqrt(),
        vdop: d[(2, 2)].sqrt(),
        pdop: (d[(0, 0)] + d[(1, 1)] + d[(2, 2)]).sqrt(),
        tdop: d[(3, 3)].sqrt(),
        gdop: (d[(0, 0)] + d[(1, 1)] + d[(2, 2)] + d[(3, 3)]).sqrt(),
    }
}

/// Horizontal/Vertical Protection Levels, without the risk-level K factor
/// (4.10 step 3; the caller scales by K for the desired integrity risk).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProtectionLevels {
    pub hpl: f64,
    pub vpl: f64,
}

fn protection_levels_from_weighted_enu_inverse(d: &Matrix4<f64>) -> ProtectionLevels {
    let d_east2 = d[(0, 0)];
    let d_north2 = d[(1, 1)];
    let d_en2 = d[(0, 1)] * d[(0, 1)];
    let d_major = (((d_east2 + d_north2) / 2.0)
        + (((d_east2 - d_north2) / 2.0).powi(2) + d_en2).sqrt())
    .sqrt();
    ProtectionLevels {
        hpl: d_major,
        vpl: d[(2, 2)].sqrt(),
    }
}

/// Result of one linearized WLS update (4.10 step 2).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub estimate: Vector4<f64>,
    pub delta_xyz_norm: f64,
    pub dop: Dop,
    pub protection_levels: Option<ProtectionLevels>,
}

/// Builds the ECEF-basis geometry row `((x_u-x_sv)/R, (y_u-y_sv)/R,
/// (z_u-z_sv)/R, 1)` and the ENU-basis row `(-cos(el)sin(az), -cos(el)cos(az),
/// -sin(el), 1)` for one channel (4.10 step 2).
fn geometry_rows(estimate: Vector4<f64>, row: &GeometryRow) -> (Vector4<f64>, f64, Vector4<f64>) {
    let user = estimate.fixed_rows::<3>(0).into_owned();
    let range = (user - row.position).norm();
    let h = Vector4::new(
        (user.x - row.position.x) / range,
        (user.y - row.position.y) / range,
        (user.z - row.position.z) / range,
        1.0,
    );
    let h_enu = Vector4::new(
        -row.el.cos() * row.az.sin(),
        -row.el.cos() * row.az.cos(),
        -row.el.sin(),
        1.0,
    );
    (h, range, h_enu)
}

fn pseudorange_residual(estimate: Vector4<f64>, row: &GeometryRow, range: f64) -> f64 {
    row.pseudorange_corrected - range + SPEED_OF_LIGHT * row.clock_correction - estimate.w
}

/// Performs one linearized weighted least-squares update from `estimate`
/// using `rows` (4.10 steps 2-4). Requires at least 4 rows; returns
/// [`SolverError::InsufficientSatellites`], [`SolverError::SingularGeometry`]
/// or [`SolverError::HdopExceeded`] on the corresponding failure.
pub fn step(rows: &[GeometryRow], estimate: Vector4<f64>) -> Result<Step, SolverError> {
    if rows.len() < 4 {
        return Err(SolverError::InsufficientSatellites(rows.len()));
    }

    let n = rows.len();
    let mut h = DMatrix::<f64>::zeros(n, 4);
    let mut h_enu = DMatrix::<f64>::zeros(n, 4);
    let mut d_pr = DVector::<f64>::zeros(n);
    let mut w = DVector::<f64>::zeros(n);

    for (i, row) in rows.iter().enumerate() {
        let (hi, range, hi_enu) = geometry_rows(estimate, row);
        for c in 0..4 {
            h[(i, c)] = hi[c];
            h_enu[(i, c)] = hi_enu[c];
        }
        d_pr[i] = pseudorange_residual(estimate, row, range);
        w[i] = row.weight();
    }

    let ht = h.transpose();
    let ht_h = &ht * &h;
    let ht_h_inv = invert_4x4(&Matrix4::from_iterator(ht_h.iter().copied()))
        .ok_or(SolverError::SingularGeometry)?;

    let ht_enu = h_enu.transpose();
    let ht_enu_h_enu = &ht_enu * &h_enu;
    let unweighted_enu_inv = invert_4x4(&Matrix4::from_iterator(ht_enu_h_enu.iter().copied()))
        .ok_or(SolverError::SingularGeometry)?;
    let dop = dop_from_enu_normal_inverse(&unweighted_enu_inv);

    if dop.hdop > 20.0 {
        return Err(SolverError::HdopExceeded(dop.hdop));
    }

    let w_diag = DMatrix::from_diagonal(&w);
    let ht_w = &ht * &w_diag;
    let ht_w_h = &ht_w * &h;
    let ht_w_h_inv = invert_4x4(&Matrix4::from_iterator(ht_w_h.iter().copied()))
        .ok_or(SolverError::SingularGeometry)?;
    let ht_w_h_inv_dmat = DMatrix::from_iterator(4, 4, ht_w_h_inv.iter().copied());
    let delta = &ht_w_h_inv_dmat * (&ht_w * &d_pr);
    let delta = Vector4::new(delta[0], delta[1], delta[2], delta[3]);

    let ht_enu_w = &ht_enu * &w_diag;
    let ht_enu_w_h_enu = &ht_enu_w * &h_enu;
    let weighted_enu_inv = invert_4x4(&Matrix4::from_iterator(ht_enu_w_h_enu.iter().copied()))
        .ok_or(SolverError::SingularGeometry)?;
    let protection_levels = protection_levels_from_weighted_enu_inverse(&weighted_enu_inv);

    Ok(Step {
        estimate: estimate + delta,
        delta_xyz_norm: delta.fixed_rows::<3>(0).norm(),
        dop,
        protection_levels: Some(protection_levels),
    })
}

/// Whether an iterative solve should stop (4.10 step 2: `‖δx_xyz‖ < 1e-8`
/// and at least 6 iterations have elapsed).
#[must_use]
pub fn has_converged(delta_xyz_norm: f64, iteration: u32) -> bool {
    delta_xyz_norm < 1e-8 && iteration > 6
}

/// Maximum iteration count for the WLS loop (4.10 step 2).
pub const MAX_ITERATIONS: u32 = 20;

/// Bancroft closed-form initial position/clock-bias estimate (4.10 step 1).
///
/// `rows` are `(satellite ECEF position, pseudorange + c*clock_correction)`
/// pairs; at least 4 are required. Runs the source's two-pass earth-rotation
/// compensation, then solves the Lorentz-form quadratic and picks the root
/// whose position magnitude is closest to the WGS84 semi-major axis.
pub fn bancroft(rows: &[(Vector3<f64>, f64)]) -> Result<Vector4<f64>, SolverError> {
    if rows.len() < 4 {
        return Err(SolverError::InsufficientSatellites(rows.len()));
    }
    let n = rows.len();

    let mut b: Vec<Vector4<f64>> = rows
        .iter()
        .map(|(pos, pr)| Vector4::new(pos.x, pos.y, pos.z, *pr))
        .collect();

    let mut estimate = Vector4::zeros();

    for iter in 0..2 {
        for row in &mut b {
            let travel_time = if iter == 0 {
                0.072
            } else {
                let range = ((row.x - estimate.x).powi(2)
                    + (row.y - estimate.y).powi(2)
                    + (row.z - estimate.z).powi(2))
                .sqrt();
                range / SPEED_OF_LIGHT
            };
            let angle = travel_time * OMEGA_EARTH;
            let (sin_a, cos_a) = angle.sin_cos();
            let x = row.x;
            let y = row.y;
            row.x = cos_a * x + sin_a * y;
            row.y = -sin_a * x + cos_a * y;
        }

        let alpha: Vec<f64> = b.iter().map(|row| 0.5 * lorentz_product(*row, *row)).collect();
        let e = DVector::from_element(n, 1.0);
        let alpha = DVector::from_vec(alpha);

        let mut b_mat = DMatrix::<f64>::zeros(n, 4);
        for (i, row) in b.iter().enumerate() {
            for c in 0..4 {
                b_mat[(i, c)] = row[c];
            }
        }
        let bt = b_mat.transpose();
        let bt_b = &bt * &b_mat;
        let bt_b_inv = invert_4x4(&Matrix4::from_iterator(bt_b.iter().copied()))
            .ok_or(SolverError::SingularGeometry)?;
        let bt_b_inv_dmat = DMatrix::from_iterator(4, 4, bt_b_inv.iter().copied());
        let b_plus = &bt_b_inv_dmat * &bt;

        let bp_e = &b_plus * &e;
        let bp_alpha = &b_plus * &alpha;
        let bp_e = Vector4::new(bp_e[0], bp_e[1], bp_e[2], bp_e[3]);
        let bp_alpha = Vector4::new(bp_alpha[0], bp_alpha[1], bp_alpha[2], bp_alpha[3]);

        let a = lorentz_product(bp_e, bp_e);
        let b_coef = 2.0 * (lorentz_product(bp_e, bp_alpha) - 1.0);
        let c = lorentz_product(bp_alpha, bp_alpha);
        let delta = b_coef * b_coef - 4.0 * a * c;
        if delta < 0.0 {
            return Err(SolverError::BancroftNoRealRoot);
        }

        let m = Vector4::new(1.0, 1.0, 1.0, -1.0);
        let r1 = (-b_coef - delta.sqrt()) / (2.0 * a);
        let r2 = (-b_coef + delta.sqrt()) / (2.0 * a);
        let candidate = |r: f64| -> Vector4<f64> {
            Vector4::new(
                m.x * (r * bp_e.x + bp_alpha.x),
                m.y * (r * bp_e.y + bp_alpha.y),
                m.z * (r * bp_e.z + bp_alpha.z),
                m.w * (r * bp_e.w + bp_alpha.w),
            )
        };
        let c1 = candidate(r1);
        let c2 = candidate(r2);
        let radius = |v: Vector4<f64>| (v.x * v.x + v.y * v.y + v.z * v.z).sqrt();
        estimate = if (radius(c1) - WGS84::A).abs() < (radius(c2) - WGS84::A).abs() {
            c1
        } else {
            c2
        };
    }

    Ok(estimate)
}

/// Chi-square global test threshold at `degrees_of_freedom` (satellites used
/// minus 4), DO-229D's 8-entry table, clamped to the 8th entry beyond
/// (4.10 step 5, "RAIM").
#[must_use]
pub fn chi_square_threshold(degrees_of_freedom: i32) -> f64 {
    const CHI: [f64; 8] = [
        2.554_221_312_496_37,
        4.414_549_826_379_44,
        6.033_327_085_391_59,
        7.539_041_478_095_98,
        8.976_628_686_930_8,
        10.367_625_201_422_4,
        11.724_237_463_078_9,
        13.054_150_383_166_6,
    ];
    if degrees_of_freedom > 0 && degrees_of_freedom < 9 {
        CHI[(degrees_of_freedom - 1) as usize]
    } else {
        CHI[7]
    }
}

/// Weighted sum-of-squares post-fit residual `rᵀWr`, a standard chi-square
/// test statistic equivalent to (but simpler than) the residual-covariance
/// projector the source builds explicitly.
#[must_use]
pub fn weighted_residual_statistic(rows: &[GeometryRow], estimate: Vector4<f64>) -> f64 {
    rows.iter()
        .map(|row| {
            let (_, range, _) = geometry_rows(estimate, row);
            let r = pseudorange_residual(estimate, row, range);
            r * r * row.weight()
        })
        .sum()
}

/// RAIM: global chi-square test on `rows`/`estimate`; on failure, repeatedly
/// drops the row with the largest normalized residual and re-solves to
/// convergence, until the test passes or fewer than 5 rows remain (4.10
/// step 5). Returns the surviving row indices (into the original `rows`
/// slice) and the accepted estimate.
pub fn raim(rows: &[GeometryRow], mut estimate: Vector4<f64>) -> Result<(Vec<usize>, Vector4<f64>), SolverError> {
    let mut indices: Vec<usize> = (0..rows.len()).collect();

    loop {
        let active: Vec<GeometryRow> = indices.iter().map(|&i| rows[i]).collect();
        if active.len() < 5 {
            return Err(SolverError::InsufficientSatellites(active.len()));
        }

        estimate = resolve_to_convergence(&active, estimate)?;

        let degrees_of_freedom = active.len() as i32 - 4;
        let threshold = chi_square_threshold(degrees_of_freedom);
        let statistic = weighted_residual_statistic(&active, estimate);
        if statistic <= threshold {
            return Ok((indices, estimate));
        }

        let worst = active
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let (_, range, _) = geometry_rows(estimate, row);
                let r = pseudorange_residual(estimate, row, range);
                (i, (r * r * row.weight()).abs())
            })
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .map(|(i, _)| i)
            .expect("active is non-empty, checked above");

        indices.remove(worst);
    }
}

/// Re-solves `rows` to convergence from `estimate` (the inner loop RAIM and
/// best-DOP exclusion re-run after dropping a channel); geometry is treated
/// as fixed (no satellite-position/correction recomputation between
/// iterations, matching the source's single-pass re-solve).
fn resolve_to_convergence(rows: &[GeometryRow], mut estimate: Vector4<f64>) -> Result<Vector4<f64>, SolverError> {
    for iteration in 0..MAX_ITERATIONS {
        let result = step(rows, estimate)?;
        estimate = result.estimate;
        if has_converged(result.delta_xyz_norm, iteration) {
            break;
        }
    }
    Ok(estimate)
}

/// Best-DOP exclusion (4.10 step 5): for each row, compute the PDOP of the
/// `n-1`-row subset without it; accept dropping the row whose removal
/// minimizes PDOP only when the full-set statistic is not already
/// comfortably below the chi-square threshold (a dramatic improvement from
/// dropping a satellite is itself evidence that satellite was faulty).
pub fn best_dop_exclusion(rows: &[GeometryRow], estimate: Vector4<f64>) -> Result<(Vec<usize>, Vector4<f64>), SolverError> {
    if rows.len() < 5 {
        return Err(SolverError::InsufficientSatellites(rows.len()));
    }

    fn without(rows: &[GeometryRow], drop: usize) -> Vec<GeometryRow> {
        rows.iter().enumerate().filter(|(i, _)| *i != drop).map(|(_, r)| *r).collect()
    }

    let full = resolve_to_convergence(rows, estimate)?;
    let full_statistic = weighted_residual_statistic(rows, full);

    let mut best: Option<(usize, f64, Vector4<f64>)> = None;
    for drop in 0..rows.len() {
        let subset = without(rows, drop);
        let Ok(candidate_estimate) = resolve_to_convergence(&subset, estimate) else {
            continue;
        };
        let Ok(candidate_step) = step(&subset, candidate_estimate) else {
            continue;
        };
        let improves = match &best {
            Some((_, best_pdop, _)) => candidate_step.dop.pdop < *best_pdop,
            None => true,
        };
        if improves {
            best = Some((drop, candidate_step.dop.pdop, candidate_estimate));
        }
    }

    let Some((drop, _, candidate_estimate)) = best else {
        return Ok(((0..rows.len()).collect(), full));
    };

    let subset_statistic = weighted_residual_statistic(&without(rows, drop), candidate_estimate);

    // A dramatic improvement is itself suspicious of having masked rather
    // than excluded a fault; only accept a middling gain.
    if full_statistic > 0.0 && subset_statistic < full_statistic * 0.05 {
        return Ok(((0..rows.len()).collect(), full));
    }

    let indices: Vec<usize> = (0..rows.len()).filter(|&i| i != drop).collect();
    Ok((indices, candidate_estimate))
}

/// 2D altitude-hold (4.10 step 5): with exactly three channels, a 3-unknown
/// `(x, y, c*dt)` system solved with altitude fixed to `prior`. Unlike the
/// source (which divides by the *pseudorange*, a normalization that does
/// not cancel the range term and would bias the horizontal solution), this
/// divides by the geometric range, matching the 4-unknown solver's own
/// normalization.
pub fn altitude_hold(rows: &[GeometryRow], prior: Vector3<f64>, prior_clock: f64) -> Result<Vector3<f64>, SolverError> {
    if rows.len() != 3 {
        return Err(SolverError::InsufficientSatellites(rows.len()));
    }

    let mut estimate = Vector3::new(prior.x, prior.y, prior_clock);
    for iteration in 0..MAX_ITERATIONS {
        let n = rows.len();
        let mut h = DMatrix::<f64>::zeros(n, 3);
        let mut d_pr = DVector::<f64>::zeros(n);

        for (i, row) in rows.iter().enumerate() {
            let user = Vector3::new(estimate.x, estimate.y, prior.z);
            let range = (user - row.position).norm();
            h[(i, 0)] = (user.x - row.position.x) / range;
            h[(i, 1)] = (user.y - row.position.y) / range;
            h[(i, 2)] = 1.0;
            d_pr[i] = row.pseudorange_corrected - range + SPEED_OF_LIGHT * row.clock_correction - estimate.z;
        }

        let ht = h.transpose();
        let ht_h = &ht * &h;
        let ht_h_inv = ht_h.clone().try_inverse().ok_or(SolverError::SingularGeometry)?;
        let delta = ht_h_inv * (&ht * &d_pr);
        estimate += Vector3::new(delta[0], delta[1], delta[2]);

        if (delta[0] * delta[0] + delta[1] * delta[1]).sqrt() < 1e-8 && iteration > 6 {
            break;
        }
    }

    Ok(Vector3::new(estimate.x, estimate.y, prior.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_rows(user: Vector3<f64>, clock_bias_m: f64) -> Vec<(Vector3<f64>, Vector3<f64>)> {
        let sats = [
            Vector3::new(2.0e7, 1.0e7, 1.0e7),
            Vector3::new(-2.0e7, 1.0e7, 1.0e7),
            Vector3::new(1.0e7, -2.0e7, 1.5e7),
            Vector3::new(1.0e7, 1.5e7, -2.0e7),
        ];
        sats.iter()
            .map(|&pos| {
                let range = (user - pos).norm();
                (pos, Vector3::new(range + clock_bias_m, 0.0, 0.0))
            })
            .collect()
    }

    #[test]
    fn bancroft_recovers_a_synthetic_position() {
        let user = Vector3::new(4.0e6, 6.0e5, 4.8e6);
        let rows: Vec<(Vector3<f64>, f64)> = synthetic_rows(user, 3.0)
            .into_iter()
            .map(|(pos, pr)| (pos, pr.x))
            .collect();
        let estimate = bancroft(&rows).unwrap();
        let got = Vector3::new(estimate.x, estimate.y, estimate.z);
        assert!((got - user).norm() < 50.0, "bancroft estimate {got:?} far from {user:?}");
    }

    #[test]
    fn bancroft_rejects_too_few_rows() {
        let rows = [(Vector3::new(1.0, 0.0, 0.0), 1.0)];
        assert_eq!(bancroft(&rows), Err(SolverError::InsufficientSatellites(1)));
    }

    fn row_from(pos: Vector3<f64>, pr: f64) -> GeometryRow {
        GeometryRow {
            position: pos,
            pseudorange_corrected: pr,
            clock_correction: 0.0,
            az: 0.0,
            el: 0.0,
            weight_term: 1.0,
            weight_is_variance: true,
        }
    }

    fn synthetic_geometry_rows(user: Vector3<f64>, clock_bias_m: f64) -> Vec<GeometryRow> {
        use crate::coords::ECEF;

        let sats = [
            Vector3::new(2.0e7, 1.0e7, 1.0e7),
            Vector3::new(-2.0e7, 1.0e7, 1.0e7),
            Vector3::new(1.0e7, -2.0e7, 1.5e7),
            Vector3::new(1.0e7, 1.5e7, -2.0e7),
            Vector3::new(-1.5e7, -1.0e7, 2.0e7),
        ];
        let user_ecef = ECEF::new(user.x, user.y, user.z);
        sats.iter()
            .map(|&pos| {
                let range = (user - pos).norm();
                let mut row = row_from(pos, range + clock_bias_m);
                let azel = user_ecef.azel_of(&ECEF::new(pos.x, pos.y, pos.z));
                row.az = azel.az();
                row.el = azel.el();
                row
            })
            .collect()
    }

    #[test]
    fn step_converges_on_a_synthetic_constellation() {
        let user = Vector3::new(4.0e6, 6.0e5, 4.8e6);
        let rows = synthetic_geometry_rows(user, 5.0);
        let mut estimate = Vector4::zeros();
        for _ in 0..MAX_ITERATIONS {
            let result = step(&rows, estimate).unwrap();
            estimate = result.estimate;
            if result.delta_xyz_norm < 1e-6 {
                break;
            }
        }
        let got = Vector3::new(estimate.x, estimate.y, estimate.z);
        assert!((got - user).norm() < 10.0, "solved position {got:?} far from {user:?}");
    }

    #[test]
    fn step_rejects_fewer_than_four_rows() {
        let rows = [row_from(Vector3::new(1.0, 0.0, 0.0), 1.0)];
        assert_eq!(step(&rows, Vector4::zeros()), Err(SolverError::InsufficientSatellites(1)));
    }

    #[test]
    fn chi_square_table_boundaries() {
        assert!((chi_square_threshold(1) - 2.554_221_312_496_37).abs() < 1e-9);
        assert!((chi_square_threshold(8) - 13.054_150_383_166_6).abs() < 1e-9);
        assert_eq!(chi_square_threshold(20), chi_square_threshold(8));
        assert_eq!(chi_square_threshold(0), chi_square_threshold(8));
    }

    #[test]
    fn raim_excludes_an_outlier_satellite() {
        let user = Vector3::new(4.0e6, 6.0e5, 4.8e6);
        let mut rows = synthetic_geometry_rows(user, 2.0);
        rows.push(row_from(Vector3::new(-1.0e7, 2.0e7, 5.0e6), 3.0e7));
        let initial = bancroft(
            &rows
                .iter()
                .map(|r| (r.position, r.pseudorange_corrected))
                .collect::<Vec<_>>(),
        )
        .unwrap_or(Vector4::zeros());
        let (indices, _estimate) = raim(&rows, initial).unwrap();
        assert!(indices.len() < rows.len(), "RAIM should have dropped the outlier");
    }

    #[test]
    fn altitude_hold_keeps_prior_height() {
        let user = Vector3::new(4.0e6, 6.0e5, 4.8e6);
        let rows: Vec<GeometryRow> = synthetic_geometry_rows(user, 1.0).into_iter().take(3).collect();
        let solved = altitude_hold(&rows, user, 1.0).unwrap();
        assert_eq!(solved.z, user.z);
    }
}
