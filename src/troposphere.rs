//! Tropospheric delay correction (4.8), the RTCA DO-229D A.4.2.4 seasonal
//! meteorological model, grounded on the source's troposphere module.

/// Meteorological constants, DO-229D table A-10.
const K1: f64 = 77.604;
const K2: f64 = 382_000.0;
const RD: f64 = 287.054;
const GM: f64 = 9.784;
const G: f64 = 9.806_65;

/// Reference latitudes of the seasonal meteorological table, degrees.
const LATITUDES: [f64; 5] = [15.0, 30.0, 45.0, 60.0, 75.0];

/// Average meteorological parameters at each reference latitude.
const P0: [f64; 5] = [1013.25, 1017.25, 1015.75, 1011.75, 1013.00];
const T0: [f64; 5] = [299.65, 294.15, 283.15, 272.15, 263.65];
const E0: [f64; 5] = [26.31, 21.79, 11.66, 6.78, 4.11];
const B0: [f64; 5] = [6.30e-3, 6.05e-3, 5.58e-3, 5.39e-3, 4.53e-3];
const L0: [f64; 5] = [2.77, 3.15, 2.57, 1.81, 1.55];

/// Seasonal variation amplitude of each parameter.
const DP0: [f64; 5] = [0.0, -3.75, -2.25, -1.75, -0.50];
const DT0: [f64; 5] = [0.0, 7.00, 11.00, 15.00, 14.50];
const DE0: [f64; 5] = [0.0, 8.85, 7.24, 5.36, 3.39];
const DB0: [f64; 5] = [0.0, 0.25e-3, 0.32e-3, 0.81e-3, 0.62e-3];
const DL0: [f64; 5] = [0.0, 0.33, 0.46, 0.74, 0.30];

fn interpolate(lat: f64, lat_a: f64, lat_b: f64, value_a: f64, value_b: f64) -> f64 {
    value_a + (value_b - value_a) * (lat - lat_a) / (lat_b - lat_a)
}

struct MeteoParameters {
    pressure: f64,
    temperature: f64,
    vapor_pressure: f64,
    temperature_lapse: f64,
    water_vapor_lapse: f64,
}

/// Average value and seasonal-variation amplitude at `lat_abs`, DO-229D
/// table A-10, before the cosine phase (eq. A-8) is applied.
fn meteo_average_and_seasonal(lat_abs: f64) -> (MeteoParameters, MeteoParameters) {
    if lat_abs > 15.0 && lat_abs < 75.0 {
        let j = (lat_abs / 15.0) as usize - 1;
        let lo = LATITUDES[j];
        let hi = LATITUDES[j + 1];
        let average = MeteoParameters {
            pressure: interpolate(lat_abs, lo, hi, P0[j], P0[j + 1]),
            temperature: interpolate(lat_abs, lo, hi, T0[j], T0[j + 1]),
            vapor_pressure: interpolate(lat_abs, lo, hi, E0[j], E0[j + 1]),
            temperature_lapse: interpolate(lat_abs, lo, hi, B0[j], B0[j + 1]),
            water_vapor_lapse: interpolate(lat_abs, lo, hi, L0[j], L0[j + 1]),
        };
        let seasonal = MeteoParameters {
            pressure: interpolate(lat_abs, lo, hi, DP0[j], DP0[j + 1]),
            temperature: interpolate(lat_abs, lo, hi, DT0[j], DT0[j + 1]),
            vapor_pressure: interpolate(lat_abs, lo, hi, DE0[j], DE0[j + 1]),
            temperature_lapse: interpolate(lat_abs, lo, hi, DB0[j], DB0[j + 1]),
            water_vapor_lapse: interpolate(lat_abs, lo, hi, DL0[j], DL0[j + 1]),
        };
        (average, seasonal)
    } else {
        let j = if lat_abs <= 15.0 { 0 } else { 4 };
        (
            MeteoParameters {
                pressure: P0[j],
                temperature: T0[j],
                vapor_pressure: E0[j],
                temperature_lapse: B0[j],
                water_vapor_lapse: L0[j],
            },
            MeteoParameters {
                pressure: DP0[j],
                temperature: DT0[j],
                vapor_pressure: DE0[j],
                temperature_lapse: DB0[j],
                water_vapor_lapse: DL0[j],
            },
        )
    }
}

fn meteo_at(lat_abs: f64, lat_deg: f64, day_of_year: f64) -> MeteoParameters {
    let (average, seasonal) = meteo_average_and_seasonal(lat_abs);
    let d_min = if lat_deg > 0.0 { 28.0 } else { 211.0 };
    let phase = (2.0 * std::f64::consts::PI * (day_of_year - d_min) / 365.25).cos();
    MeteoParameters {
        pressure: average.pressure - seasonal.pressure * phase,
        temperature: average.temperature - seasonal.temperature * phase,
        vapor_pressure: average.vapor_pressure - seasonal.vapor_pressure * phase,
        temperature_lapse: average.temperature_lapse - seasonal.temperature_lapse * phase,
        water_vapor_lapse: average.water_vapor_lapse - seasonal.water_vapor_lapse * phase,
    }
}

/// Day of year (1-based, DO-229D's own Gregorian-free week/TOW derivation)
/// from GPS week number and time of week.
#[must_use]
pub fn day_of_year(week_number: u16, tow: f64) -> f64 {
    let days_since_epoch = f64::from(week_number) * 7.0;
    let day_in_year = days_since_epoch - (days_since_epoch / 365.25).floor() * 365.25;
    (day_in_year + (tow / 86_400.0).floor() + 6.0).floor()
}

/// Mapping function m(elevation), DO-229D eq. A-11, with the low-elevation
/// ramp for 2 <= el < 4 degrees and zero below 2 degrees.
#[must_use]
pub fn mapping_function(elevation_deg: f64) -> f64 {
    if elevation_deg < 2.0 {
        return 0.0;
    }
    let sin_el = elevation_deg.to_radians().sin();
    let base = 1.001 / (0.002_001 + sin_el * sin_el).sqrt();
    if elevation_deg >= 4.0 {
        base
    } else {
        let ramp = (4.0 - elevation_deg).max(0.0);
        base * (1.0 + 0.015 * ramp * ramp)
    }
}

/// Tropospheric delay (m) and model variance (m^2) for one satellite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TropoCorrection {
    pub delay: f64,
    pub variance: f64,
}

/// Fixed per-elevation variance coefficient, DO-229D's empirical zenith
/// accuracy (`err_TVE`).
const SIGMA_TVE: f64 = 0.12;

/// Computes the tropospheric delay at `elevation_deg` for a user at
/// `lat_deg`/`height_m` above the ellipsoid (4.8). `week_number`/`tow` date
/// the correction for the seasonal model's phase.
#[must_use]
pub fn correct(lat_deg: f64, height_m: f64, elevation_deg: f64, week_number: u16, tow: f64) -> TropoCorrection {
    if elevation_deg < 2.0 {
        return TropoCorrection { delay: 0.0, variance: 0.0 };
    }

    let meteo = meteo_at(lat_deg.abs(), lat_deg, day_of_year(week_number, tow));

    let base = 1.0 - (meteo.temperature_lapse * height_m) / meteo.temperature;
    if base <= 0.0 {
        return TropoCorrection { delay: 0.0, variance: 0.0 };
    }

    let zhyd = (1e-6 * K1 * RD * meteo.pressure) / GM;
    let power_hyd = G / (RD * meteo.temperature_lapse);
    let dhyd = base.powf(power_hyd) * zhyd;

    let zwet = (1e-6 * K2 * RD) / (GM * (meteo.water_vapor_lapse + 1.0) - meteo.temperature_lapse * RD)
        * (meteo.vapor_pressure / meteo.temperature);
    let power_wet = ((meteo.water_vapor_lapse + 1.0) * G) / (RD * meteo.temperature_lapse) - 1.0;
    let dwet = base.powf(power_wet) * zwet;

    let m = mapping_function(elevation_deg);
    TropoCorrection {
        delay: -(dhyd + dwet) * m,
        variance: (SIGMA_TVE * m).powi(2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_function_is_zero_below_two_degrees() {
        assert_eq!(mapping_function(1.0), 0.0);
    }

    #[test]
    fn mapping_function_ramps_between_two_and_four_degrees() {
        assert!(mapping_function(2.0) > 0.0);
        assert!(mapping_function(3.0) > mapping_function(4.0));
    }

    #[test]
    fn mapping_function_grows_at_low_elevation() {
        assert!(mapping_function(5.0) > mapping_function(85.0));
    }

    #[test]
    fn correction_below_two_degrees_is_zero() {
        let result = correct(45.0, 0.0, 1.0, 2000, 0.0);
        assert_eq!(result.delay, 0.0);
        assert_eq!(result.variance, 0.0);
    }

    #[test]
    fn correction_at_sea_level_temperate_latitude_is_small_negative() {
        let result = correct(45.0, 0.0, 90.0, 2000, 0.0);
        assert!(result.delay < 0.0);
        assert!(result.delay.abs() < 3.0);
        assert!(result.variance > 0.0);
    }

    #[test]
    fn day_of_year_stays_within_year_bounds() {
        let d = day_of_year(2000, 0.0);
        assert!(d >= 0.0 && d <= 372.0);
    }
}
