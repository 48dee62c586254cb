//! SBAS MOPS message decoding (4.5).
//!
//! Every message is a 250-bit payload with a common header (type at bits
//! 8-13) and a type-specific tail (9, "Message tables as tagged variants").
//! [`decode`] reads the type and dispatches to the matching submodule decoder,
//! returning a tagged [`SbasMessage`] rather than the single do-everything
//! struct the source keeps all 26 message types in.
//!
//! Payloads shorter than 250 bits, or a type field that matches none of the
//! handled types, decode to [`SbasMessage::Unknown`] rather than an error
//! (4.1, "message absent").

mod mt1;
mod mt10;
mod mt12;
mod mt17;
mod mt18;
mod mt2_5;
mod mt24;
mod mt25;
mod mt26;
mod mt6;
mod mt7;
mod mt9;

pub use mt1::PrnMask;
pub use mt10::DegradationParameters;
pub use mt12::NetworkTime;
pub use mt17::{GeoAlmanac, GeoAlmanacs};
pub use mt18::{IgpEntry, IgpMask};
pub use mt2_5::FastCorrections;
pub use mt24::MixedCorrections;
pub use mt25::LongTermCorrections;
pub use mt26::{IgpDelayStatus, IonoCorrections};
pub use mt6::IntegrityInfo;
pub use mt7::FastDegradation;
pub use mt9::GeoNavigation;

use crate::bits::BitReader;

/// Total length of an SBAS MOPS payload, in bits, excluding preamble/CRC
/// (6, "SBAS payload format": stripped by the upstream receiver).
pub const PAYLOAD_BITS: usize = 250;

const TWO_POW_M11: f64 = 4.882_812_5e-4;
const TWO_POW_M31: f64 = 4.656_612_873_077_392_6e-10;
const TWO_POW_M39: f64 = 1.818_989_403_545_856_5e-12;

/// A long-term orbit/clock delta, shared shape between MT24 and MT25 (3,
/// "SBAS message record"). `velocity_code` selects which fields are valid:
/// `0` carries no rates, `1` carries `d_vel`/`d_af1`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LongTermRecord {
    pub prn: u8,
    pub iode: u16,
    pub velocity_code: u8,
    /// Position delta, ECEF meters.
    pub d_pos: nalgebra::Vector3<f64>,
    /// Position delta rate, m/s (velocity code 1 only).
    pub d_vel: nalgebra::Vector3<f64>,
    /// Clock bias delta, seconds.
    pub d_af0: f64,
    /// Clock drift delta, s/s (velocity code 1 only).
    pub d_af1: f64,
    /// Reference time the delta (and rate, if present) is relative to,
    /// seconds of week. Velocity-code-0 records carry no `t0`; the caller
    /// substitutes the message's own time-of-week.
    pub t0: f64,
}

/// One decoded SBAS message, tagged by type (9, "Message tables as tagged
/// variants"). Consumers pattern-match; there is no shared payload field
/// because each type's tail has a different shape.
#[derive(Debug, Clone, PartialEq)]
pub enum SbasMessage {
    Mt1(PrnMask),
    Mt2To5(FastCorrections),
    Mt6(IntegrityInfo),
    Mt7(FastDegradation),
    Mt9(GeoNavigation),
    Mt10(DegradationParameters),
    Mt12(NetworkTime),
    Mt17(GeoAlmanacs),
    Mt18(IgpMask),
    Mt24(MixedCorrections),
    Mt25(LongTermCorrections),
    Mt26(IonoCorrections),
    /// Payload too short, or a type this engine does not consume.
    Unknown { message_type: u8 },
}

/// Decode one SBAS payload.
///
/// `tow` is the receiver-stamped time-of-week of the payload (6: "the
/// implementation prepends a 12-character decimal TOW stamp" — the caller
/// has already separated that stamp from the 250-bit payload by the time it
/// reaches here). `payload` must be at least [`PAYLOAD_BITS`] bits, packed
/// MSB-first.
#[must_use]
pub fn decode(tow: f64, payload: &[u8]) -> SbasMessage {
    if payload.len() * 8 < PAYLOAD_BITS {
        return SbasMessage::Unknown { message_type: 0 };
    }
    let r = BitReader::new(payload, PAYLOAD_BITS);
    let message_type = r.unsigned(8, 13) as u8;

    match message_type {
        1 => SbasMessage::Mt1(mt1::decode(&r)),
        2..=5 => SbasMessage::Mt2To5(mt2_5::decode(&r, tow)),
        6 => SbasMessage::Mt6(mt6::decode(&r, tow)),
        7 => SbasMessage::Mt7(mt7::decode(&r)),
        9 => SbasMessage::Mt9(mt9::decode(&r, tow)),
        10 => SbasMessage::Mt10(mt10::decode(&r, tow)),
        12 => SbasMessage::Mt12(mt12::decode(&r)),
        17 => SbasMessage::Mt17(mt17::decode(&r)),
        18 => SbasMessage::Mt18(mt18::decode(&r)),
        24 => SbasMessage::Mt24(mt24::decode(&r, tow)),
        25 => SbasMessage::Mt25(mt25::decode(&r, tow)),
        26 => SbasMessage::Mt26(mt26::decode(&r)),
        other => SbasMessage::Unknown { message_type: other },
    }
}

/// Shared two's-complement decode of one of MT24/MT25's long-term records at
/// bit offset `base` (4.5, "MT24 decodes ... whose schema depends on a
/// velocity-code bit"). `base` is the bit immediately after the PRN mask
/// position; velocity code has already been read by the caller.
fn decode_long_term_record(r: &BitReader, base: usize, velocity_code: u8, t0_default: f64) -> LongTermRecord {
    let prn = r.unsigned(base, base + 5) as u8;
    let iode = r.unsigned(base + 6, base + 13) as u16;

    if velocity_code == 0 {
        let dx = r.signed_scaled(base + 14, base + 22, 0.125);
        let dy = r.signed_scaled(base + 23, base + 31, 0.125);
        let dz = r.signed_scaled(base + 32, base + 40, 0.125);
        let daf0 = r.signed_scaled(base + 41, base + 50, TWO_POW_M31);
        LongTermRecord {
            prn,
            iode,
            velocity_code,
            d_pos: nalgebra::Vector3::new(dx, dy, dz),
            d_vel: nalgebra::Vector3::zeros(),
            d_af0: daf0,
            d_af1: 0.0,
            t0: t0_default,
        }
    } else {
        let dx = r.signed_scaled(base + 14, base + 24, 0.125);
        let dy = r.signed_scaled(base + 25, base + 35, 0.125);
        let dz = r.signed_scaled(base + 36, base + 46, 0.125);
        let daf0 = r.signed_scaled(base + 47, base + 57, TWO_POW_M31);
        let ddx = r.signed_scaled(base + 58, base + 65, TWO_POW_M11);
        let ddy = r.signed_scaled(base + 66, base + 73, TWO_POW_M11);
        let ddz = r.signed_scaled(base + 74, base + 81, TWO_POW_M11);
        let daf1 = r.signed_scaled(base + 82, base + 89, TWO_POW_M39);
        let t0 = r.unsigned_scaled(base + 90, base + 102, 16.0);
        LongTermRecord {
            prn,
            iode,
            velocity_code,
            d_pos: nalgebra::Vector3::new(dx, dy, dz),
            d_vel: nalgebra::Vector3::new(ddx, ddy, ddz),
            d_af0: daf0,
            d_af1: daf1,
            t0,
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    pub(crate) fn set_field(bytes: &mut [u8], start: usize, end: usize, value: u64) {
        let width = end - start + 1;
        for i in 0..width {
            let bit = (value >> (width - 1 - i)) & 1;
            let idx = start + i;
            let byte = idx / 8;
            let shift = 7 - (idx % 8);
            if bit == 1 {
                bytes[byte] |= 1 << shift;
            } else {
                bytes[byte] &= !(1 << shift);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::set_field;
    use super::*;

    #[test]
    fn short_payload_is_unknown() {
        let bytes = [0u8; 4];
        assert_eq!(decode(0.0, &bytes), SbasMessage::Unknown { message_type: 0 });
    }

    #[test]
    fn unhandled_type_is_unknown() {
        let mut bytes = [0u8; 32];
        set_field(&mut bytes, 8, 13, 63);
        assert_eq!(decode(0.0, &bytes), SbasMessage::Unknown { message_type: 63 });
    }
}
