//! MT24: mixed fast and long-term corrections (DO-229D A.4.4.8).

use crate::bits::BitReader;
use crate::sbas::{decode_long_term_record, LongTermRecord};

/// MT24's fast-correction half: six PRC/UDREI slots plus the block id they
/// belong to (4.5: "MT24 decodes the fast half plus one long-term record").
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MixedFastBlock {
    pub block_id: u8,
    pub prc: [f64; 6],
    pub udrei: [u8; 6],
}

/// Decoded MT24.
#[derive(Debug, Clone, PartialEq)]
pub struct MixedCorrections {
    pub tow: f64,
    /// Present only when the fast-correction half was requested at decode
    /// time (the source's `fast` parameter); absent otherwise.
    pub fast: Option<MixedFastBlock>,
    /// One record with velocity code 1, or two compact records with
    /// velocity code 0 (4.5).
    pub long_term: Vec<LongTermRecord>,
}

pub(crate) fn decode(r: &BitReader, tow: f64) -> MixedCorrections {
    decode_with_fast(r, tow, true)
}

pub(crate) fn decode_with_fast(r: &BitReader, tow: f64, want_fast: bool) -> MixedCorrections {
    let fast = if want_fast {
        let mut prc = [0.0; 6];
        let mut udrei = [0u8; 6];
        for i in 0..6 {
            prc[i] = r.signed_scaled(14 + 12 * i, 25 + 12 * i, 0.125);
            udrei[i] = r.unsigned(86 + 4 * i, 89 + 4 * i) as u8;
        }
        let block_id = r.unsigned(112, 113) as u8;
        Some(MixedFastBlock { block_id, prc, udrei })
    } else {
        None
    };

    let velocity_code = r.unsigned(120, 120) as u8;
    let long_term = if velocity_code == 0 {
        vec![
            decode_long_term_record(r, 121, 0, tow),
            decode_long_term_record(r, 172, 0, tow),
        ]
    } else {
        vec![decode_long_term_record(r, 121, 1, tow)]
    };

    MixedCorrections { tow, fast, long_term }
}
