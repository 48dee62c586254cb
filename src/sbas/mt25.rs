//! MT25: long-term corrections (DO-229D A.4.4.7).

use crate::bits::BitReader;
use crate::sbas::{decode_long_term_record, LongTermRecord};

/// Decoded MT25: four long-term records in two half-messages (offsets 0 and
/// 106), sharing a single velocity code for the whole message (4.5): code 0
/// packs two compact records per half, code 1 packs one record with rates.
#[derive(Debug, Clone, PartialEq)]
pub struct LongTermCorrections {
    pub tow: f64,
    pub records: Vec<LongTermRecord>,
}

pub(crate) fn decode(r: &BitReader, tow: f64) -> LongTermCorrections {
    let velocity_code = r.unsigned(14, 14) as u8;
    let mut records = Vec::with_capacity(4);

    for half in 0..2 {
        let offset = if half == 0 { 0 } else { 106 };
        if velocity_code == 0 {
            records.push(decode_long_term_record(r, offset + 15, 0, tow));
            records.push(decode_long_term_record(r, offset + 66, 0, tow));
        } else {
            records.push(decode_long_term_record(r, offset + 15, 1, tow));
        }
    }

    LongTermCorrections { tow, records }
}
