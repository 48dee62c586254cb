//! MT2-5: fast corrections (DO-229D A.4.4.3/A.4.4.4).

use crate::bits::BitReader;

/// One fast-correction block: 13 PRC/UDREI slots for the fast block whose id
/// is `message_type - 2` (3, "MT2-5: fast corrections").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FastCorrections {
    pub tow: f64,
    /// Block id, `0..=3` (message type minus 2).
    pub block_id: u8,
    pub iodf: u8,
    /// Pseudorange corrections, meters, 0.125 m LSB.
    pub prc: [f64; 13],
    pub udrei: [u8; 13],
}

pub(crate) fn decode(r: &BitReader, tow: f64) -> FastCorrections {
    let message_type = r.unsigned(8, 13) as u8;
    let iodf = r.unsigned(14, 15) as u8;

    let mut prc = [0.0; 13];
    let mut udrei = [0u8; 13];
    for i in 0..13 {
        prc[i] = r.signed_scaled(18 + 12 * i, 29 + 12 * i, 0.125);
        udrei[i] = r.unsigned(174 + 4 * i, 177 + 4 * i) as u8;
    }

    FastCorrections {
        tow,
        block_id: message_type.saturating_sub(2),
        iodf,
        prc,
        udrei,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbas::test_support::set_field;

    #[test]
    fn decode_prc_sequence() {
        // Scenario 2: signed 12-bit slots (+8, -8, +128, -128, 0, ...).
        let mut bytes = [0u8; 32];
        set_field(&mut bytes, 8, 13, 2);
        let raw: [u64; 4] = [8, 0xFF8, 128, 0xF80];
        for (i, &v) in raw.iter().enumerate() {
            set_field(&mut bytes, 18 + 12 * i, 29 + 12 * i, v);
        }
        let r = BitReader::new(&bytes, crate::sbas::PAYLOAD_BITS);
        let fc = decode(&r, 100.0);
        assert_eq!(fc.block_id, 0);
        let expected = [1.0, -1.0, 16.0, -16.0, 0.0];
        for (got, want) in fc.prc.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-9);
        }
    }
}
