//! GPS LNAV ephemeris decoding (4.4) and storage.
//!
//! Subframes 1, 2 and 3 of the GPS legacy navigation message carry a
//! satellite's clock polynomial and Keplerian orbital elements. Field
//! offsets and scale factors below follow IS-GPS-200E Figures 20-1/20-2;
//! each subframe is addressed independently as its own 300-bit string,
//! matching the upstream receiver's convention of delivering one subframe
//! per 300-bit payload with parity already stripped/verified.

use crate::bits::BitReader;

const TWO_POW_M5: f64 = 0.031_25;
const TWO_POW_M19: f64 = 1.907_348_632_812_5e-6;
const TWO_POW_M29: f64 = 1.862_645_149_230_957e-9;
const TWO_POW_M31: f64 = 4.656_612_873_077_392_6e-10;
const TWO_POW_M33: f64 = 1.164_153_218_269_348_1e-10;
const TWO_POW_M43: f64 = 1.136_868_377_216_160_3e-13;
const TWO_POW_M55: f64 = 2.775_557_561_562_891_4e-17;

/// GPS clock and Keplerian orbital parameters for a single satellite (4.4,
/// data model "Satellite record: ephemeris").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ephemeris {
    /// PRN of the satellite this ephemeris belongs to.
    pub prn: u8,
    /// Receiver-disambiguated GPS week number (modulo-1024 plus 1024, per 4.4).
    pub week_number: i32,
    /// Clock data reference time, seconds of week.
    pub t_oc: f64,
    /// Clock bias, seconds.
    pub a_f0: f64,
    /// Clock drift, s/s.
    pub a_f1: f64,
    /// Clock drift rate, s/s^2.
    pub a_f2: f64,
    /// Group delay differential, seconds.
    pub t_gd: f64,
    /// Issue of Data, Clock.
    pub iodc: u16,

    /// Ephemeris reference time, seconds of week.
    pub t_oe: f64,
    /// Square root of the semi-major axis, sqrt(m).
    pub sqrt_a: f64,
    /// Eccentricity.
    pub e: f64,
    /// Mean anomaly at reference time, radians.
    pub m0: f64,
    /// Mean motion difference from computed value, radians/s.
    pub delta_n: f64,
    /// Argument of perigee, radians.
    pub omega: f64,
    /// Longitude of ascending node at weekly epoch, radians.
    pub omega0: f64,
    /// Inclination angle at reference time, radians.
    pub i0: f64,
    /// Rate of inclination angle, radians/s.
    pub i_dot: f64,
    /// Rate of right ascension, radians/s.
    pub omega_dot: f64,
    /// Cosine harmonic correction to argument of latitude, radians.
    pub c_uc: f64,
    /// Sine harmonic correction to argument of latitude, radians.
    pub c_us: f64,
    /// Cosine harmonic correction to orbit radius, meters.
    pub c_rc: f64,
    /// Sine harmonic correction to orbit radius, meters.
    pub c_rs: f64,
    /// Cosine harmonic correction to inclination, radians.
    pub c_ic: f64,
    /// Sine harmonic correction to inclination, radians.
    pub c_is: f64,
    /// Issue of Data, Ephemeris, as decoded from subframe 2.
    pub iode_subframe2: u16,
    /// Issue of Data, Ephemeris, as decoded from subframe 3.
    ///
    /// IODE is redundantly present in subframes 2 and 3; per 4.4 a mismatch
    /// between the two is not treated as fatal here, the caller may compare
    /// them if it cares.
    pub iode_subframe3: u16,
}

impl Ephemeris {
    /// The IODE used to bind SBAS long-term corrections (4.9, invariant in
    /// 3): subframe 3's copy, matching the source decoder's precedence.
    #[must_use]
    pub fn iode(&self) -> u16 {
        self.iode_subframe3
    }

    /// Decode subframes 1, 2 and 3 (each exactly 300 bits, parity already
    /// stripped/verified by the upstream receiver) into an [`Ephemeris`].
    ///
    /// `reference_week` is used to disambiguate the broadcast modulo-1024
    /// week number (4.4).
    #[must_use]
    pub fn decode(
        prn: u8,
        subframe1: &[u8],
        subframe2: &[u8],
        subframe3: &[u8],
        reference_week: i32,
    ) -> Ephemeris {
        let s1 = BitReader::new(subframe1, 300);
        let s2 = BitReader::new(subframe2, 300);
        let s3 = BitReader::new(subframe3, 300);

        let broadcast_week = s1.unsigned(60, 69) as i32;
        let week_number = crate::time::GpsTime::resolve_week_number(
            (broadcast_week + 1024) % 1024,
            reference_week,
        );

        let iodc_msb = s1.unsigned(82, 83);
        let iodc_lsb = s1.unsigned(210, 217);
        let iodc = ((iodc_msb << 8) | iodc_lsb) as u16;

        let t_gd = s1.signed_scaled(196, 203, TWO_POW_M31);
        let t_oc = s1.unsigned_scaled(218, 233, 16.0);
        let a_f2 = s1.signed_scaled(240, 247, TWO_POW_M55);
        let a_f1 = s1.signed_scaled(248, 263, TWO_POW_M43);
        let a_f0 = s1.signed_scaled(270, 291, TWO_POW_M31);

        let iode_subframe2 = s2.unsigned(60, 67) as u16;
        let c_rs = s2.signed_scaled(68, 83, TWO_POW_M5);
        let delta_n = s2.signed_scaled(90, 105, TWO_POW_M43) * std::f64::consts::PI;
        let m0 = s2.signed_concat(&[(106, 113), (120, 143)], 32) as f64 * TWO_POW_M31
            * std::f64::consts::PI;
        let c_uc = s2.signed_scaled(150, 165, TWO_POW_M29);
        let e = s2.unsigned_concat(&[(166, 173), (180, 203)]) as f64 * TWO_POW_M33;
        let c_us = s2.signed_scaled(210, 225, TWO_POW_M29);
        let sqrt_a = s2.unsigned_concat(&[(226, 233), (240, 263)]) as f64 * TWO_POW_M19;
        let t_oe = s2.unsigned_scaled(270, 285, 16.0);

        let c_ic = s3.signed_scaled(60, 75, TWO_POW_M29);
        let omega0 = s3.signed_concat(&[(76, 83), (90, 113)], 32) as f64 * TWO_POW_M31
            * std::f64::consts::PI;
        let c_is = s3.signed_scaled(120, 135, TWO_POW_M29);
        let i0 = s3.signed_concat(&[(136, 143), (150, 173)], 32) as f64 * TWO_POW_M31
            * std::f64::consts::PI;
        let c_rc = s3.signed_scaled(180, 195, TWO_POW_M5);
        let omega = s3.signed_concat(&[(196, 203), (210, 233)], 32) as f64 * TWO_POW_M31
            * std::f64::consts::PI;
        let omega_dot = s3.signed_scaled(240, 263, TWO_POW_M43) * std::f64::consts::PI;
        let iode_subframe3 = s3.unsigned(270, 277) as u16;
        let i_dot = s3.signed_scaled(278, 291, TWO_POW_M43) * std::f64::consts::PI;

        Ephemeris {
            prn,
            week_number,
            t_oc,
            a_f0,
            a_f1,
            a_f2,
            t_gd,
            iodc,
            t_oe,
            sqrt_a,
            e,
            m0,
            delta_n,
            omega,
            omega0,
            i0,
            i_dot,
            omega_dot,
            c_uc,
            c_us,
            c_rc,
            c_rs,
            c_ic,
            c_is,
            iode_subframe2,
            iode_subframe3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_field(bytes: &mut [u8], start: usize, end: usize, value: u64) {
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

    #[test]
    fn decode_week_number_and_clock() {
        let mut subfr1 = vec![0u8; 38]; // 300 bits -> 38 bytes
        set_field(&mut subfr1, 60, 69, 500); // week number mod 1024
        set_field(&mut subfr1, 218, 233, 10); // t_oc raw -> * 16 = 160
        set_field(&mut subfr1, 196, 203, 0xFF); // t_gd raw -1 (8-bit two's complement)

        let subfr2 = vec![0u8; 38];
        let subfr3 = vec![0u8; 38];

        let eph = Ephemeris::decode(5, &subfr1, &subfr2, &subfr3, 1524 /* wn with epoch 1024 */);
        assert_eq!(eph.week_number, 1024 + 500);
        assert!((eph.t_oc - 160.0).abs() < 1e-9);
        assert!((eph.t_gd - (-1.0 * TWO_POW_M31)).abs() < 1e-20);
    }

    #[test]
    fn decode_msb_lsb_concat_field() {
        // e (eccentricity) spans bits 166-173 (msb, 8 bits) and 180-203 (lsb, 24 bits)
        let mut subfr2 = vec![0u8; 38];
        set_field(&mut subfr2, 166, 173, 0x01); // msb = 1
        set_field(&mut subfr2, 180, 203, 0x000002); // lsb = 2
        let subfr1 = vec![0u8; 38];
        let subfr3 = vec![0u8; 38];
        let eph = Ephemeris::decode(1, &subfr1, &subfr2, &subfr3, 1024);
        let expected_raw = (1u64 << 24) | 2u64;
        assert!((eph.e - expected_raw as f64 * TWO_POW_M33).abs() < 1e-15);
    }
}
