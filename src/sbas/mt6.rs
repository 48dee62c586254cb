//! MT6: integrity information (DO-229D A.4.4.4).

use crate::bits::BitReader;

/// Maximum PRN slots carried by MT6's UDREI table (3: "4 IODFs + 51
/// UDREIs").
pub const UDREI_SLOTS: usize = 51;

/// Integrity data: one IODF per fast-correction block plus a fresh UDREI per
/// masked PRN, superseding the MT2-5/MT24 UDREI when its IODF matches (4.9).
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrityInfo {
    pub tow: f64,
    /// IODF for fast blocks 0..3, in order (IODF2..IODF5 in DO-229D naming).
    pub iodf: [u8; 4],
    pub udrei: Vec<u8>,
}

pub(crate) fn decode(r: &BitReader, tow: f64) -> IntegrityInfo {
    let mut iodf = [0u8; 4];
    for (i, slot) in iodf.iter_mut().enumerate() {
        *slot = r.unsigned(14 + 2 * i, 15 + 2 * i) as u8;
    }

    let mut udrei = Vec::with_capacity(UDREI_SLOTS);
    for i in 0..UDREI_SLOTS {
        let start = 22 + 4 * i;
        if start + 3 >= r.len() {
            break;
        }
        udrei.push(r.unsigned(start, start + 3) as u8);
    }

    IntegrityInfo { tow, iodf, udrei }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbas::test_support::set_field;

    #[test]
    fn decode_iodf_quad() {
        let mut bytes = [0u8; 32];
        set_field(&mut bytes, 14, 15, 1);
        set_field(&mut bytes, 16, 17, 2);
        set_field(&mut bytes, 18, 19, 3);
        set_field(&mut bytes, 20, 21, 0);
        let r = BitReader::new(&bytes, crate::sbas::PAYLOAD_BITS);
        let info = decode(&r, 0.0);
        assert_eq!(info.iodf, [1, 2, 3, 0]);
    }
}
