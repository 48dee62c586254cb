//! MT17: GEO almanacs (DO-229D A.4.4.12).

use nalgebra::Vector3;

use crate::bits::BitReader;

/// One geostationary satellite's almanac record.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GeoAlmanac {
    pub data_id: u8,
    pub prn: u8,
    pub ranging: bool,
    pub corrections: bool,
    pub integrity: bool,
    pub service_provider_id: u8,
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
}

/// Decoded MT17: up to three almanac records sharing a single almanac
/// reference time.
///
/// DO-229D gives MT17 exactly one `t0` field (bits 215-225) for the whole
/// message, not one per record; all three records below share it.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoAlmanacs {
    pub records: Vec<GeoAlmanac>,
    /// Shared almanac reference time, seconds of week.
    pub t0: f64,
}

pub(crate) fn decode(r: &BitReader) -> GeoAlmanacs {
    let t0 = r.unsigned_scaled(215, 225, 64.0);

    let mut records = Vec::with_capacity(3);
    for i in 0..3 {
        let shift = 67 * i;
        let data_id = r.unsigned(14 + shift, 15 + shift) as u8;
        let prn = r.unsigned(16 + shift, 23 + shift) as u8;
        let ranging = r.flag(24 + shift);
        let corrections = r.flag(25 + shift);
        let integrity = r.flag(26 + shift);
        let service_provider_id = r.unsigned(28 + shift, 31 + shift) as u8;

        let x = r.signed_scaled(32 + shift, 46 + shift, 2600.0);
        let y = r.signed_scaled(47 + shift, 61 + shift, 2600.0);
        let z = r.signed_scaled(62 + shift, 70 + shift, 26_000.0);
        let dx = r.signed_scaled(71 + shift, 73 + shift, 10.0);
        let dy = r.signed_scaled(74 + shift, 76 + shift, 10.0);
        let dz = r.signed_scaled(77 + shift, 80 + shift, 60.0);

        records.push(GeoAlmanac {
            data_id,
            prn,
            ranging,
            corrections,
            integrity,
            service_provider_id,
            position: Vector3::new(x, y, z),
            velocity: Vector3::new(dx, dy, dz),
        });
    }

    GeoAlmanacs { records, t0 }
}
