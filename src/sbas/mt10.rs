//! MT10: degradation parameters (DO-229D A.4.4.6).

use crate::bits::BitReader;

/// Degradation parameters applied across fast/long-term/iono corrections
/// (4.9, 4.7).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DegradationParameters {
    pub tow: f64,
    pub b_rrc: f64,
    pub c_ltc_lsb: f64,
    pub c_ltc_v1: f64,
    pub i_ltc_v1: u16,
    pub c_ltc_v0: f64,
    pub i_ltc_v0: u16,
    pub c_geo_lsb: f64,
    pub c_geo_v: f64,
    pub i_geo: u16,
    pub c_er: f64,
    pub c_iono_step: f64,
    pub i_iono: u16,
    pub c_iono_ramp: f64,
    pub rss_udre: bool,
    pub rss_iono: bool,
}

pub(crate) fn decode(r: &BitReader, tow: f64) -> DegradationParameters {
    let b_rrc = r.unsigned_scaled(14, 23, 0.002);
    let c_ltc_lsb = r.unsigned_scaled(24, 33, 0.002);
    let c_ltc_v1 = r.unsigned_scaled(34, 43, 0.000_05);
    let i_ltc_v1 = r.unsigned(44, 52) as u16;
    let c_ltc_v0 = r.unsigned_scaled(53, 62, 0.002);
    let i_ltc_v0 = match r.unsigned(63, 71) as u16 {
        0 => 1,
        other => other,
    };
    let c_geo_lsb = r.unsigned_scaled(72, 81, 0.000_5);
    let c_geo_v = r.unsigned_scaled(82, 91, 0.000_05);
    let i_geo = r.unsigned(92, 100) as u16;
    let c_er = r.unsigned_scaled(101, 106, 0.5);
    let c_iono_step = r.unsigned_scaled(107, 116, 0.001);
    let i_iono = match r.unsigned(117, 125) as u16 {
        0 => 1,
        other => other,
    };
    let c_iono_ramp = r.unsigned_scaled(126, 135, 0.000_005);
    let rss_udre = r.flag(136);
    let rss_iono = r.flag(137);

    DegradationParameters {
        tow,
        b_rrc,
        c_ltc_lsb,
        c_ltc_v1,
        i_ltc_v1,
        c_ltc_v0,
        i_ltc_v0,
        c_geo_lsb,
        c_geo_v,
        i_geo,
        c_er,
        c_iono_step,
        i_iono,
        c_iono_ramp,
        rss_udre,
        rss_iono,
    }
}
