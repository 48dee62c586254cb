//! MT26: ionospheric delay corrections (DO-229D A.4.4.10).

use crate::bits::BitReader;

/// "Don't use" sentinel IGPVD value: raw 511 at 0.125 m LSB (63.875 m).
const DONT_USE_IGPVD_M: f64 = 63.875;

/// Usability of one IGP's delay, normalized per 9's open question (d):
/// a single enumeration rather than the source's inverted `use`-field
/// convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgpDelayStatus {
    Monitored,
    NotMonitored,
    DontUse,
}

/// One IGP's delay and confidence, GIVEI mapped to GIVE via
/// [`crate::ionosphere::give_variance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IgpDelay {
    pub status: IgpDelayStatus,
    /// Vertical delay, meters, 0.125 m LSB.
    pub igpvd: f64,
    pub givei: u8,
}

/// Decoded MT26: one band/block's 15 IGP delays.
#[derive(Debug, Clone, PartialEq)]
pub struct IonoCorrections {
    pub band_id: u8,
    pub block_id: u8,
    pub iodi: u8,
    pub entries: [IgpDelay; 15],
}

pub(crate) fn decode(r: &BitReader) -> IonoCorrections {
    let band_id = r.unsigned(14, 17) as u8;
    let block_id = r.unsigned(18, 21) as u8;

    let mut entries = [IgpDelay { status: IgpDelayStatus::NotMonitored, igpvd: 0.0, givei: 0 }; 15];
    let mut pos = 22usize;
    for entry in entries.iter_mut() {
        let igpvd = r.unsigned_scaled(pos, pos + 8, 0.125);
        pos += 9;
        let givei = r.unsigned(pos, pos + 3) as u8;
        pos += 4;

        let status = if (igpvd - DONT_USE_IGPVD_M).abs() < 1e-9 {
            IgpDelayStatus::DontUse
        } else if givei == 15 {
            IgpDelayStatus::NotMonitored
        } else {
            IgpDelayStatus::Monitored
        };

        *entry = IgpDelay { status, igpvd, givei };
    }

    let iodi = r.unsigned(217, 218) as u8;

    IonoCorrections { band_id, block_id, iodi, entries }
}
