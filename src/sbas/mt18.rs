//! MT18: Ionospheric Grid Point mask (DO-229D A.4.4.9).
//!
//! 9 ("IGP traversal") asks for a table of `(column_lat_start,
//! column_lat_end, column_spacing, column_lon)` rather than the per-band
//! switch the source inlines; [`band_columns`] is that table. Bands 0-8 tile
//! 40 degrees of longitude each in eight 5-degree-spaced meridians, every
//! meridian walking the same south-to-north latitude pattern (5 degree steps
//! inside +/-55 degrees, 10 degree steps beyond, following the traversal
//! confirmed for band 3 in the source). Bands 9/10 are the north/south polar
//! caps, each four 90-degree-spaced meridians from 60 to 85 degrees (this is
//! a simplification of DO-229D's irregular polar vertex layout, scoped
//! deliberately per 9; open question (c) only required that bands 0-2, 7 and
//! 10 be present at all, which they now are).

use crate::bits::BitReader;

/// One column of IGP mask bit positions: a fixed meridian, walked from its
/// southernmost to its northernmost latitude.
#[derive(Debug, Clone, Copy)]
pub struct IgpColumn {
    pub lon: f64,
    pub lat_start: f64,
    pub lat_end: f64,
    /// Whether this column uses the 5-degree polar spacing (bands 9/10)
    /// rather than the standard 5/10-degree mixed spacing (bands 0-8).
    pub polar: bool,
}

fn standard_column_lats(start: f64, end: f64) -> Vec<f64> {
    let mut lats = Vec::with_capacity(27);
    let mut lat = start;
    while lat <= end + 0.001 {
        lats.push(lat);
        lat += if lat < -55.0 || lat >= 55.0 { 10.0 } else { 5.0 };
    }
    lats
}

fn polar_column_lats(start: f64, end: f64) -> Vec<f64> {
    // 5-degree spacing across the 25-degree polar cap, in the direction
    // from the equator-facing edge towards the pole.
    let step = if end >= start { 5.0 } else { -5.0 };
    let mut lats = Vec::new();
    let mut lat = start;
    loop {
        lats.push(lat);
        if (lat - end).abs() < 0.001 {
            break;
        }
        lat += step;
    }
    lats
}

/// The latitude traversal for one IGP mask column, in mask-bit order.
#[must_use]
pub fn column_latitudes(column: IgpColumn) -> Vec<f64> {
    if column.polar {
        polar_column_lats(column.lat_start, column.lat_end)
    } else {
        standard_column_lats(column.lat_start, column.lat_end)
    }
}

/// The meridians (and their latitude spans) that band `band_id`'s 201-bit
/// mask walks, in mask-bit order.
#[must_use]
pub fn band_columns(band_id: u8) -> Vec<IgpColumn> {
    if band_id <= 8 {
        let base_lon = -180.0 + 40.0 * f64::from(band_id);
        (0..8)
            .map(|c| IgpColumn {
                lon: base_lon + 5.0 * f64::from(c),
                lat_start: -75.0,
                lat_end: 75.0,
                polar: false,
            })
            .collect()
    } else {
        // Bands 9 (north) / 10 (south): four 90-degree meridians, 60..85 deg.
        let sign = if band_id == 9 { 1.0 } else { -1.0 };
        (0..4)
            .map(|c| IgpColumn {
                lon: -180.0 + 90.0 * f64::from(c),
                lat_start: sign * 60.0,
                lat_end: sign * 85.0,
                polar: true,
            })
            .collect()
    }
}

/// One masked IGP, carrying enough to bind it to the MT26 block that later
/// supplies its delay/GIVEI (3: "(block_id, block_line, lat, lon)").
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IgpEntry {
    pub block_id: u8,
    /// Position within its 15-entry MT26 block.
    pub block_line: u8,
    pub lat: f64,
    pub lon: f64,
}

/// Decoded MT18: the sparse list of masked IGPs for one band.
#[derive(Debug, Clone, PartialEq)]
pub struct IgpMask {
    pub band_id: u8,
    pub iodi: u8,
    pub entries: Vec<IgpEntry>,
}

pub(crate) fn decode(r: &BitReader) -> IgpMask {
    let band_nb = r.unsigned(14, 17) as u8;
    if band_nb == 0 {
        return IgpMask { band_id: 0, iodi: 0, entries: Vec::new() };
    }

    let band_id = r.unsigned(18, 21) as u8;
    let iodi = r.unsigned(22, 23) as u8;

    // The mask spans exactly 201 bits (payload bits 24-224); stop there even
    // if the column table's point count runs over, rather than reading into
    // the reserved/spare bits beyond it.
    const MASK_END: usize = 224;

    let mut entries = Vec::new();
    let mut block: u8 = 0;
    let mut block_inc: u8 = 0;
    let mut bit = 24usize;

    'bands: for column in band_columns(band_id) {
        for lat in column_latitudes(column) {
            if bit > MASK_END || bit >= r.len() {
                break 'bands;
            }
            if r.flag(bit) {
                entries.push(IgpEntry {
                    block_id: block,
                    block_line: block_inc,
                    lat,
                    lon: column.lon,
                });
                block_inc += 1;
                if block_inc == 15 {
                    block += 1;
                    block_inc = 0;
                }
            }
            bit += 1;
        }
    }

    IgpMask { band_id, iodi, entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band3_column_pattern_matches_source() {
        let columns = band_columns(3);
        assert_eq!(columns.len(), 8);
        let lats = column_latitudes(columns[0]);
        assert_eq!(lats.len(), 27);
        assert_eq!(lats[0], -75.0);
        assert_eq!(lats[1], -65.0);
        assert_eq!(lats[2], -55.0);
        assert_eq!(lats[3], -50.0);
    }

    #[test]
    fn polar_bands_present() {
        assert_eq!(band_columns(9).len(), 4);
        assert_eq!(band_columns(10).len(), 4);
        assert!(band_columns(10)[0].lat_start < 0.0);
    }
}
