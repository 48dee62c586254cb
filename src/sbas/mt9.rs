//! MT9: GEO navigation message (DO-229D A.4.4.11).

use nalgebra::Vector3;

use crate::bits::BitReader;

const TWO_POW_M31: f64 = 4.656_612_873_077_392_6e-10;
const TWO_POW_M40: f64 = 9.094_947_017_729_282_4e-13;

/// Decoded MT9: the geostationary SBAS satellite's own navigation
/// polynomial (4.6, "Geostationary SBAS satellites").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoNavigation {
    pub tow: f64,
    /// Reference time, seconds of week.
    pub t0: f64,
    pub ura: u8,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub acceleration: Vector3<f64>,
    pub a_f0: f64,
    pub a_f1: f64,
}

pub(crate) fn decode(r: &BitReader, tow: f64) -> GeoNavigation {
    let t0 = r.unsigned_scaled(22, 34, 16.0);
    let ura = r.unsigned(35, 38) as u8;

    let position = Vector3::new(
        r.signed_scaled(39, 68, 0.08),
        r.signed_scaled(69, 98, 0.08),
        r.signed_scaled(99, 123, 0.4),
    );
    let velocity = Vector3::new(
        r.signed_scaled(124, 140, 0.000_625),
        r.signed_scaled(141, 157, 0.000_625),
        r.signed_scaled(158, 175, 0.004),
    );
    let acceleration = Vector3::new(
        r.signed_scaled(176, 185, 0.000_012_5),
        r.signed_scaled(186, 195, 0.000_012_5),
        r.signed_scaled(196, 205, 0.000_062_5),
    );
    let a_f0 = r.signed_scaled(206, 217, TWO_POW_M31);
    let a_f1 = r.signed_scaled(218, 225, TWO_POW_M40);

    GeoNavigation {
        tow,
        t0,
        ura,
        position,
        velocity,
        acceleration,
        a_f0,
        a_f1,
    }
}
