//! MT12: SBAS network time (DO-229D A.4.4.15).

use crate::bits::BitReader;

const TWO_POW_M50: f64 = 8.881_784_197_001_252e-16;
const TWO_POW_M30: f64 = 9.313_225_746_154_785e-10;

/// SBAS Network Time parameters: the polynomial that relates SBAS Network
/// Time to UTC, plus the GPS time-of-week/week it was referenced to (9,
/// "Time model": applied once at transmit-time computation).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NetworkTime {
    pub tow: f64,
    pub a1snt: f64,
    pub a0snt: f64,
    /// UTC reference time of day, seconds.
    pub t0t: f64,
    pub wnt: u16,
    /// Current leap seconds.
    pub dtls: i8,
    /// Week number of leap-second update.
    pub wnlsf: u16,
    /// Day number of leap-second update.
    pub dn: u16,
    /// Leap seconds after update.
    pub dtlsf: i8,
    pub utc_id: u8,
    pub gps_tow: u32,
    pub gps_week: u16,
}

pub(crate) fn decode(r: &BitReader) -> NetworkTime {
    let a1snt = r.signed_scaled(14, 37, TWO_POW_M50);
    let a0snt = r.signed_scaled(38, 69, TWO_POW_M30);
    let t0t = r.unsigned_scaled(70, 77, 4096.0);
    let wnt = r.unsigned(78, 85) as u16;
    let dtls = r.signed(86, 93) as i8;
    let wnlsf = r.unsigned(94, 101) as u16;
    let dn = r.unsigned(102, 109) as u16;
    let dtlsf = r.signed(110, 117) as i8;
    let utc_id = r.unsigned(118, 120) as u8;
    let gps_tow = r.unsigned(121, 140) as u32;
    let gps_week = r.unsigned(141, 150) as u16;

    NetworkTime {
        tow: gps_tow as f64,
        a1snt,
        a0snt,
        t0t,
        wnt,
        dtls,
        wnlsf,
        dn,
        dtlsf,
        utc_id,
        gps_tow,
        gps_week,
    }
}
