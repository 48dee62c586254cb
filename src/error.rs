//! Internal error types (7, "Error handling design").
//!
//! Per 6/7 the two public engine entry points are infallible: every
//! precondition failure degrades to a zeroed or partial result record rather
//! than propagating an error. [`SolverError`] exists for the internal
//! plumbing that legitimately can fail (a singular normal matrix, a Bancroft
//! discriminant with no real root) so that those sites are as explicit as
//! the teacher's error enums, even though the engine-level API swallows them.

use thiserror::Error;

/// A failure internal to the positioning solver (4.10).
#[derive(Debug, Copy, Clone, PartialEq, Error)]
pub enum SolverError {
    /// Fewer than four usable satellite channels remained after corrections
    /// and exclusions.
    #[error("insufficient satellites: {0} usable, need at least 4")]
    InsufficientSatellites(usize),
    /// The normal matrix `H^T W H` (or `H^T H`) was singular.
    #[error("singular normal matrix, degenerate satellite geometry")]
    SingularGeometry,
    /// HDOP exceeded the rejection threshold of 20 (4.10, step 4).
    #[error("HDOP {0} exceeds rejection threshold")]
    HdopExceeded(f64),
    /// Bancroft's quadratic had no real root.
    #[error("Bancroft discriminant negative, no real root")]
    BancroftNoRealRoot,
}
