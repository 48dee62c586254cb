//! Positioning engine orchestration (4.11).
//!
//! This is the layer between decoded SBAS messages / raw measurements and the
//! numerical solver (4.10): [`EgnosCorrections`] accumulates the broadcast
//! state (PRN mask, fast/long-term corrections, iono grid, degradation
//! parameters) message by message; [`solve_with_sbas`]/[`solve_gps_only`]
//! bind each channel's correction, recompute satellite geometry every
//! iteration, and drive the solver through convergence plus whichever of
//! RAIM / best-DOP exclusion / 2D altitude-hold applies.

use std::collections::HashMap;

use nalgebra::{Vector3, Vector4};

use crate::coords::{LLHDegrees, ECEF};
use crate::fastcorrection::{self, FastCorrectionInputs, UdreStatus};
use crate::ionosphere::{self, BoundIgp};
use crate::longcorrection;
use crate::sbas::{
    DegradationParameters, FastDegradation, GeoAlmanacs, GeoNavigation, IgpMask, IntegrityInfo,
    IonoCorrections, LongTermRecord, NetworkTime, PrnMask, SbasMessage,
};
use crate::satellite::{
    compute_geo_position, compute_gps_position, earth_rotation_correction, Constellation,
    ExclusionReason, LongTermDelta, SatelliteChannel, UseState,
};
use crate::solver::{self, Dop, GeometryRow, ProtectionLevels, Step};
use crate::time::SPEED_OF_LIGHT;
use crate::troposphere;

/// Debug-level trace, compiled out entirely unless the `log` feature pulls
/// in the `log` crate.
macro_rules! trace_exclusion {
    ($($arg:tt)*) => {
        #[cfg(feature = "log")]
        log::debug!($($arg)*);
    };
}

/// Default elevation mask angle, degrees, below which a channel is excluded
/// from the solution (4.10).
const ELEVATION_MASK_DEG: f64 = 10.0;

/// Nominal receiver noise term folded into every SBAS-corrected channel's
/// variance, meters^2 (DO-229D A.4.5.1, `sigma_air` noise floor).
const SIGMA_NOISE2: f64 = 0.36 * 0.36;

/// Standard airborne multipath model, DO-229D A.4.5.1.4.
#[must_use]
fn sigma_multipath2(elevation_deg: f64) -> f64 {
    let m = 0.13 + 0.53 * (-elevation_deg / 10.0).exp();
    m * m
}

/// Tunable knobs for one positioning cycle (4.11).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub elevation_mask_deg: f64,
    /// Apply iono/tropo/fast/long-term corrections and weight by variance.
    /// When false, channels solve on raw pseudoranges weighted by C/N0 (4.10
    /// step 2, "or C/N0 when SBAS off").
    pub sbas_enabled: bool,
    pub raim_enabled: bool,
    /// Only tried when RAIM is disabled or declines to exclude anything.
    pub best_dop_exclusion_enabled: bool,
    /// Falls back to a fixed-altitude 3-satellite solve when exactly three
    /// channels remain usable.
    pub altitude_hold_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            elevation_mask_deg: ELEVATION_MASK_DEG,
            sbas_enabled: true,
            raim_enabled: true,
            best_dop_exclusion_enabled: true,
            altitude_hold_enabled: true,
        }
    }
}

/// Which solving path produced a [`Fix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixMode {
    WeightedLeastSquares,
    Raim,
    BestDopExclusion,
    AltitudeHold,
}

/// A completed position solution (4.10/4.11).
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub ecef: ECEF,
    pub llh: LLHDegrees,
    pub clock_bias_m: f64,
    pub dop: Dop,
    pub protection_levels: Option<ProtectionLevels>,
    pub satellites_used: Vec<u8>,
    pub iterations: u32,
    pub mode: FixMode,
}

/// One PRN-mask slot's fast-correction history: the current broadcast value
/// plus whatever preceded it, needed for the range-rate extrapolation (4.9).
#[derive(Debug, Clone, Copy, Default)]
struct FastSlot {
    prc: f64,
    udrei: u8,
    tow: f64,
}

/// One of the four 13-slot fast-correction blocks a PRN-mask position maps
/// into (mask positions 1-13 -> block 0, 14-26 -> block 1, and so on; 4.9).
#[derive(Debug, Clone, Default)]
struct FastBlock {
    iodf: u8,
    current: [FastSlot; 13],
    previous: [FastSlot; 13],
}

impl FastBlock {
    fn update_full(&mut self, tow: f64, iodf: u8, prc: [f64; 13], udrei: [u8; 13]) {
        self.previous = self.current;
        self.iodf = iodf;
        for i in 0..13 {
            self.current[i] = FastSlot { prc: prc[i], udrei: udrei[i], tow };
        }
    }

    /// MT24's fast-correction half carries only 6 slots with no explicit
    /// starting offset in the decoded message; this binds them to the first
    /// six slots of the block they name, a deliberate simplification of the
    /// broadcast schedule's rotating slot assignment.
    fn update_partial(&mut self, tow: f64, prc: &[f64], udrei: &[u8]) {
        for (slot, (&p, &u)) in prc.iter().zip(udrei.iter()).enumerate() {
            if slot >= 13 {
                break;
            }
            self.previous[slot] = self.current[slot];
            self.current[slot] = FastSlot { prc: p, udrei: u, tow };
        }
    }
}

/// Accumulated SBAS broadcast state, built up message by message via
/// [`EgnosCorrections::ingest`] (4.11).
#[derive(Debug, Clone, Default)]
pub struct EgnosCorrections {
    mask: PrnMask,
    fast_blocks: [FastBlock; 4],
    integrity: Option<IntegrityInfo>,
    degradation: Option<FastDegradation>,
    params: Option<DegradationParameters>,
    long_term: Vec<(f64, LongTermRecord)>,
    igp_masks: HashMap<u8, IgpMask>,
    igp_delays: HashMap<(u8, u8), IonoCorrections>,
    geo_nav: HashMap<u8, GeoNavigation>,
    geo_almanacs: Option<GeoAlmanacs>,
    network_time: Option<NetworkTime>,
}

impl EgnosCorrections {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one decoded SBAS message into the accumulated state. `prn` is
    /// the geostationary satellite that transmitted it, needed only for MT9
    /// (the GEO's own navigation message carries no PRN field of its own).
    pub fn ingest(&mut self, prn: u8, message: &SbasMessage) {
        match message {
            SbasMessage::Mt1(mask) => self.mask = mask.clone(),
            SbasMessage::Mt2To5(fc) => {
                let block = &mut self.fast_blocks[usize::from(fc.block_id.min(3))];
                block.update_full(fc.tow, fc.iodf, fc.prc, fc.udrei);
            }
            SbasMessage::Mt6(info) => self.integrity = Some(info.clone()),
            SbasMessage::Mt7(fd) => self.degradation = Some(fd.clone()),
            SbasMessage::Mt9(nav) => {
                self.geo_nav.insert(prn, *nav);
            }
            SbasMessage::Mt10(dp) => self.params = Some(*dp),
            SbasMessage::Mt12(nt) => self.network_time = Some(*nt),
            SbasMessage::Mt17(almanacs) => self.geo_almanacs = Some(almanacs.clone()),
            SbasMessage::Mt18(mask) => {
                self.igp_masks.insert(mask.band_id, mask.clone());
            }
            SbasMessage::Mt24(mc) => {
                if let Some(fast) = &mc.fast {
                    let block = &mut self.fast_blocks[usize::from(fast.block_id.min(3))];
                    block.update_partial(mc.tow, &fast.prc, &fast.udrei);
                }
                for record in &mc.long_term {
                    self.long_term.push((mc.tow, *record));
                }
            }
            SbasMessage::Mt25(lc) => {
                for record in &lc.records {
                    self.long_term.push((lc.tow, *record));
                }
            }
            SbasMessage::Mt26(ic) => {
                self.igp_delays.insert((ic.band_id, ic.block_id), ic.clone());
            }
            SbasMessage::Unknown { .. } => {}
        }
    }

    #[must_use]
    pub fn mask(&self) -> &PrnMask {
        &self.mask
    }

    fn geo_nav(&self, prn: u8) -> Option<GeoNavigation> {
        self.geo_nav.get(&prn).copied()
    }

    /// Binds a mask position to its fast-correction inputs (4.9). PRN-mask
    /// positions 1-13 live in block 0, 14-26 in block 1, and so on; a
    /// position past the fourth block (beyond MT2-5's reach) returns `None`
    /// so the caller falls back to whatever MT24 supplied, or excludes the
    /// channel.
    fn fast_correction_inputs(&self, prn_pos: usize, now: f64) -> Option<(UdreStatus, FastCorrectionInputs)> {
        let block_idx = prn_pos / 13;
        let slot = prn_pos % 13;
        if block_idx >= 4 {
            return None;
        }
        let block = &self.fast_blocks[block_idx];
        let current = block.current[slot];
        if current.tow <= 0.0 && current.prc == 0.0 && current.udrei == 0 {
            return None;
        }
        let previous = block.previous[slot];

        let mut udrei0 = current.udrei;
        // MT6 supersedes the block's own UDREI when it is fresher and its
        // IODF matches the block's (4.9, "a fresher integrity message wins").
        if let Some(info) = &self.integrity {
            if info.tow >= current.tow && info.iodf[block_idx] == block.iodf {
                if let Some(&fresh) = info.udrei.get(prn_pos) {
                    udrei0 = fresh;
                }
            }
        }

        let factor = self.degradation.as_ref().and_then(|fd| fd.factors.get(prn_pos).copied());
        let degradation_a = factor.map(|f| f.a);
        let ifc = factor.map_or(0.0, |f| f64::from(f.i_fc1));
        let tlat = self.degradation.as_ref().map_or(0.0, |fd| fd.t_lat);
        let brrc = self.params.as_ref().map_or(0.0, |p| p.b_rrc);
        let rss_udre = self.params.as_ref().is_some_and(|p| p.rss_udre);

        let inputs = FastCorrectionInputs {
            prc0: current.prc,
            prc1: previous.prc,
            t0: current.tow,
            t1: previous.tow,
            udrei0,
            udrei1_available: previous.tow > 0.0,
            iodf0: block.iodf,
            iodf1: block.iodf,
            degradation_a,
            ifc,
            tlat,
            brrc,
            eps_ltc: 0.0,
            eps_er: 0.0,
            rss_udre,
            now,
        };

        Some((fastcorrection::udre_accuracy(udrei0), inputs))
    }

    /// The most recently received long-term record matching `prn`/`iode`,
    /// with the time of week of the message that carried it (3, "a stale
    /// IODE never applies"; [`longcorrection::bind`] does the same match
    /// over a plain slice when the arrival time is not needed).
    fn long_term_for(&self, prn: u8, iode: u16) -> Option<(f64, LongTermRecord)> {
        self.long_term
            .iter()
            .filter(|(_, r)| r.prn == prn && r.iode == iode)
            .max_by(|a, b| a.0.partial_cmp(&b.0).unwrap())
            .copied()
    }

    /// Binds every masked IGP to its MT26 delay, skipping any whose block's
    /// IODI does not match the mask's own (4.5, "a stale iono block never
    /// applies").
    #[must_use]
    pub fn bound_igps(&self) -> Vec<BoundIgp> {
        let mut out = Vec::new();
        for mask in self.igp_masks.values() {
            for entry in &mask.entries {
                let Some(ic) = self.igp_delays.get(&(mask.band_id, entry.block_id)) else {
                    continue;
                };
                if ic.iodi != mask.iodi {
                    continue;
                }
                let Some(delay) = ic.entries.get(usize::from(entry.block_line)) else {
                    continue;
                };
                out.push(BoundIgp::new(*entry, delay.igpvd, delay.givei, delay.status));
            }
        }
        out
    }
}

/// The satellite's raw ECEF position at transmit time (before Earth-rotation
/// compensation) and its clock correction, from ephemeris (GPS) or MT9 (SBAS
/// GEO) propagation (4.6).
fn raw_position(
    channel: &SatelliteChannel,
    corrections: &EgnosCorrections,
    long_term: Option<LongTermDelta>,
) -> Option<(Vector3<f64>, f64)> {
    let transmit_time = channel.tow - channel.pseudorange / SPEED_OF_LIGHT;
    match channel.constellation {
        Constellation::Gps => {
            let eph = channel.ephemeris.as_ref()?;
            let egnos_clock = long_term.map(|d| (d.d_af0, d.d_af1, d.t0));
            let result = compute_gps_position(eph, transmit_time, egnos_clock, long_term.as_ref());
            Some((result.ecef, result.clock_correction))
        }
        Constellation::Sbas => {
            let nav = corrections.geo_nav(channel.prn)?;
            let pos = compute_geo_position(nav.t0, nav.position, nav.velocity, nav.acceleration, transmit_time);
            let clock_correction = nav.a_f0 + nav.a_f1 * (transmit_time - nav.t0);
            Some((pos, clock_correction))
        }
    }
}

/// Updates `channel`'s geometry (position, az/el, clock correction) and, when
/// it passes the elevation mask, its SBAS corrections and combined variance
/// (4.7-4.9). Leaves `channel.use_state` at [`UseState::SbasCorrected`] only
/// when every correction bound successfully.
#[allow(clippy::too_many_arguments)]
fn prepare_channel(
    channel: &mut SatelliteChannel,
    corrections: &EgnosCorrections,
    prior_ecef: Vector3<f64>,
    lat_deg: f64,
    lon_deg: f64,
    height_m: f64,
    week_number: u16,
    now: f64,
    bound_igps: &[BoundIgp],
    elevation_mask_deg: f64,
    klobuchar: Option<([f64; 4], [f64; 4])>,
) {
    channel.use_state = UseState::Unused;
    channel.exclusion = None;

    let Some(prn_pos) = corrections.mask().position_of(channel.prn) else {
        trace_exclusion!("prn {} not in MT1 mask, no fast correction applied", channel.prn);
        channel.exclusion = Some(ExclusionReason::NotInMask);
        return;
    };

    let long_term_record = channel
        .ephemeris
        .as_ref()
        .and_then(|eph| corrections.long_term_for(channel.prn, eph.iode()));
    channel.long_term = long_term_record.map(|(_, r)| LongTermDelta {
        iode: r.iode,
        d_pos: r.d_pos,
        d_vel: r.d_vel,
        d_af0: r.d_af0,
        d_af1: r.d_af1,
        t0: r.t0,
    });

    let Some((raw_pos, clock_correction)) = raw_position(channel, corrections, channel.long_term) else {
        // No ephemeris, or no MT9 for a GEO PRN not yet broadcasting one.
        channel.exclusion = Some(ExclusionReason::DegradedVariance);
        return;
    };

    let travel_time = (prior_ecef - raw_pos).norm() / SPEED_OF_LIGHT;
    let rotated = earth_rotation_correction(raw_pos, travel_time);
    let user_ecef = ECEF::new(prior_ecef.x, prior_ecef.y, prior_ecef.z);
    let sat_ecef = ECEF::new(rotated.x, rotated.y, rotated.z);
    let azel = user_ecef.azel_of(&sat_ecef);

    channel.position = sat_ecef;
    channel.clock_correction = clock_correction;
    channel.transmit_time = channel.tow - channel.pseudorange / SPEED_OF_LIGHT;
    channel.az = azel.az();
    channel.el = azel.el();

    let elevation_deg = azel.el().to_degrees();
    if elevation_deg < elevation_mask_deg {
        channel.exclusion = Some(ExclusionReason::LowElevation);
        return;
    }

    let Some((udre, mut inputs)) = corrections.fast_correction_inputs(prn_pos, now) else {
        trace_exclusion!("prn {} has no populated fast-correction slot", channel.prn);
        channel.exclusion = Some(ExclusionReason::Udrei);
        return;
    };

    let eps_ltc = match (long_term_record, corrections.params) {
        (Some((record_tow, r)), Some(p)) => longcorrection::epsilon_long_term(
            now,
            record_tow,
            r.velocity_code,
            r.t0,
            p.c_ltc_v0,
            f64::from(p.i_ltc_v0),
            p.c_ltc_v1,
            f64::from(p.i_ltc_v1),
            p.c_ltc_lsb,
        ),
        _ => 0.0,
    };
    let eps_er = match (channel.constellation, corrections.params) {
        (Constellation::Sbas, Some(p)) => p.c_er,
        _ => 0.0,
    };
    inputs.eps_ltc = eps_ltc;
    inputs.eps_er = eps_er;

    let fast = fastcorrection::compute(udre, inputs);
    if !fast.usable {
        channel.exclusion = Some(ExclusionReason::Udrei);
        return;
    }

    let tropo = troposphere::correct(lat_deg, height_m, elevation_deg, week_number, channel.tow);
    let iono = match ionosphere::correct(lat_deg, lon_deg, elevation_deg, azel.az().to_degrees(), bound_igps) {
        Some(iono) => iono,
        None => {
            // No SBAS ionospheric grid covers this pierce point; fall back to
            // the broadcast Klobuchar model when alpha/beta are available,
            // per 4.7 step 5. No fallback at all drops the satellite.
            let Some((alpha, beta)) = klobuchar else {
                channel.exclusion = Some(ExclusionReason::DegradedVariance);
                return;
            };
            let az_deg = azel.az().to_degrees();
            let delay = ionosphere::klobuchar_delay(alpha, beta, lat_deg, lon_deg, elevation_deg, az_deg, channel.tow);
            let variance = ionosphere::klobuchar_variance(delay, lat_deg, elevation_deg);
            ionosphere::IonoCorrection { vertical_delay: -delay, variance }
        }
    };

    channel.prc = fast.delay;
    channel.rrc = fast.range_rate;
    channel.udrei = udre_indicator(udre);
    channel.fast_set = true;
    channel.long_set = long_term_record.is_some();
    channel.eps_fc = 0.0;
    channel.eps_rrc = 0.0;
    channel.eps_ltc = eps_ltc;
    channel.eps_er = eps_er;
    channel.sigma_flt2 = fast.variance;
    channel.tropo_delay = tropo.delay;
    channel.sigma_tropo2 = tropo.variance;
    channel.iono_delay = iono.vertical_delay;
    channel.sigma_uire2 = iono.variance;

    channel.pseudorange_corrected = channel.pseudorange + fast.delay + tropo.delay + iono.vertical_delay;
    channel.sigma2 = fast.variance + tropo.variance + iono.variance + SIGMA_NOISE2 + sigma_multipath2(elevation_deg);
    channel.use_state = UseState::SbasCorrected;
}

fn udre_indicator(status: UdreStatus) -> u8 {
    match status {
        UdreStatus::Monitored(_) => 0,
        UdreStatus::NotMonitored => 14,
        UdreStatus::DontUse => 15,
    }
}

fn row_for(channel: &SatelliteChannel) -> GeometryRow {
    let (weight_term, weight_is_variance) = match channel.use_state {
        UseState::SbasCorrected => (channel.sigma2, true),
        UseState::Raw => (10f64.powf(channel.cn0 / 10.0), false),
        UseState::Unused => (1.0, true),
    };
    GeometryRow {
        position: Vector3::new(channel.position.x(), channel.position.y(), channel.position.z()),
        pseudorange_corrected: channel.pseudorange_corrected,
        clock_correction: channel.clock_correction,
        az: channel.az,
        el: channel.el,
        weight_term,
        weight_is_variance,
    }
}

/// Runs the convergence loop and optional RAIM / best-DOP / altitude-hold
/// stage over whichever channels [`prepare_channel`] (or the GPS-only path)
/// left marked as used (4.10).
fn run_solver(channels: &mut [SatelliteChannel], prior_ecef: Vector3<f64>, config: &EngineConfig) -> Option<Fix> {
    let active: Vec<usize> = channels
        .iter()
        .enumerate()
        .filter(|(_, c)| c.use_state != UseState::Unused)
        .map(|(i, _)| i)
        .collect();

    if active.len() < 3 {
        return None;
    }

    let rows: Vec<GeometryRow> = active.iter().map(|&i| row_for(&channels[i])).collect();

    if rows.len() == 3 {
        if !config.altitude_hold_enabled {
            return None;
        }
        let solved = solver::altitude_hold(&rows, prior_ecef, 0.0).ok()?;
        let fix_ecef = ECEF::new(solved.x, solved.y, solved.z);
        return Some(Fix {
            ecef: fix_ecef,
            llh: fix_ecef.to_llh().to_degrees(),
            clock_bias_m: 0.0,
            dop: Dop { hdop: 0.0, vdop: 0.0, pdop: 0.0, tdop: 0.0, gdop: 0.0 },
            protection_levels: None,
            satellites_used: active.iter().map(|&i| channels[i].prn).collect(),
            iterations: solver::MAX_ITERATIONS,
            mode: FixMode::AltitudeHold,
        });
    }

    if rows.len() < 4 {
        return None;
    }

    let bancroft_rows: Vec<(Vector3<f64>, f64)> = rows
        .iter()
        .map(|r| (r.position, r.pseudorange_corrected + SPEED_OF_LIGHT * r.clock_correction))
        .collect();
    let mut estimate = solver::bancroft(&bancroft_rows).unwrap_or_else(|_| Vector4::zeros());

    let mut iterations = 0u32;
    let mut converged_step: Option<Step> = None;
    for iteration in 0..solver::MAX_ITERATIONS {
        let step = solver::step(&rows, estimate).ok()?;
        estimate = step.estimate;
        iterations = iteration + 1;
        let stop = solver::has_converged(step.delta_xyz_norm, iteration);
        converged_step = Some(step);
        if stop {
            break;
        }
    }
    converged_step?;

    let (mode, used_indices, final_estimate) = if config.raim_enabled && rows.len() >= 5 {
        match solver::raim(&rows, estimate) {
            Ok((kept, est)) => (FixMode::Raim, kept, est),
            Err(_) => (FixMode::WeightedLeastSquares, (0..rows.len()).collect(), estimate),
        }
    } else if config.best_dop_exclusion_enabled && rows.len() >= 5 {
        match solver::best_dop_exclusion(&rows, estimate) {
            Ok((kept, est)) => (FixMode::BestDopExclusion, kept, est),
            Err(_) => (FixMode::WeightedLeastSquares, (0..rows.len()).collect(), estimate),
        }
    } else {
        (FixMode::WeightedLeastSquares, (0..rows.len()).collect(), estimate)
    };

    for (j, &i) in active.iter().enumerate() {
        if !used_indices.contains(&j) {
            trace_exclusion!("prn {} excluded by {:?} after {} iterations", channels[i].prn, mode, iterations);
            channels[i].use_state = UseState::Unused;
            channels[i].exclusion = Some(ExclusionReason::Raim);
        }
    }

    let kept_rows: Vec<GeometryRow> = used_indices.iter().map(|&j| rows[j]).collect();
    let final_step = solver::step(&kept_rows, final_estimate).ok()?;

    let fix_ecef = ECEF::new(final_step.estimate.x, final_step.estimate.y, final_step.estimate.z);
    Some(Fix {
        ecef: fix_ecef,
        llh: fix_ecef.to_llh().to_degrees(),
        clock_bias_m: final_step.estimate.w,
        dop: final_step.dop,
        protection_levels: final_step.protection_levels,
        satellites_used: used_indices.iter().map(|&j| channels[active[j]].prn).collect(),
        iterations,
        mode,
    })
}

/// Full SBAS-corrected positioning cycle (4.11): binds every channel's fast,
/// long-term and ionospheric corrections against `corrections`, combines
/// tropospheric and multipath terms, then solves.
///
/// `prior_llh` seeds the Earth-rotation compensation and elevation mask for
/// this cycle (an SBAS receiver always has a last-known or coarse starting
/// position); `now` is the receiver time of week used to extrapolate fast
/// corrections. `klobuchar` is the GPS navigation message's broadcast
/// alpha/beta pair, used for pierce points the ionospheric grid doesn't
/// cover (4.7 step 5); `None` drops those satellites instead.
#[allow(clippy::too_many_arguments)]
pub fn solve_with_sbas(
    channels: &mut [SatelliteChannel],
    corrections: &EgnosCorrections,
    prior_llh: LLHDegrees,
    week_number: u16,
    now: f64,
    config: &EngineConfig,
    klobuchar: Option<([f64; 4], [f64; 4])>,
) -> Option<Fix> {
    let prior_radians = prior_llh.to_radians();
    let prior_point = prior_radians.to_ecef();
    let prior_ecef = Vector3::new(prior_point.x(), prior_point.y(), prior_point.z());
    let bound_igps = corrections.bound_igps();

    for channel in channels.iter_mut() {
        prepare_channel(
            channel,
            corrections,
            prior_ecef,
            prior_radians.latitude().to_degrees(),
            prior_radians.longitude().to_degrees(),
            prior_radians.height(),
            week_number,
            now,
            &bound_igps,
            config.elevation_mask_deg,
            klobuchar,
        );
    }

    run_solver(channels, prior_ecef, config)
}

/// GPS-only positioning cycle: no SBAS corrections, channels weighted by
/// C/N0 rather than variance (4.10 step 2).
pub fn solve_gps_only(channels: &mut [SatelliteChannel], prior_llh: LLHDegrees, config: &EngineConfig) -> Option<Fix> {
    let prior_point = prior_llh.to_radians().to_ecef();
    let prior_ecef = Vector3::new(prior_point.x(), prior_point.y(), prior_point.z());

    for channel in channels.iter_mut() {
        channel.use_state = UseState::Unused;
        channel.exclusion = None;

        let Some(eph) = channel.ephemeris else { continue };
        let transmit_time = channel.tow - channel.pseudorange / SPEED_OF_LIGHT;
        let result = compute_gps_position(&eph, transmit_time, None, None);

        let travel_time = (prior_ecef - result.ecef).norm() / SPEED_OF_LIGHT;
        let rotated = earth_rotation_correction(result.ecef, travel_time);
        let user_ecef = ECEF::new(prior_ecef.x, prior_ecef.y, prior_ecef.z);
        let sat_ecef = ECEF::new(rotated.x, rotated.y, rotated.z);
        let azel = user_ecef.azel_of(&sat_ecef);

        if azel.el().to_degrees() < config.elevation_mask_deg {
            channel.exclusion = Some(ExclusionReason::LowElevation);
            continue;
        }

        channel.position = sat_ecef;
        channel.clock_correction = result.clock_correction;
        channel.transmit_time = transmit_time;
        channel.az = azel.az();
        channel.el = azel.el();
        channel.pseudorange_corrected = channel.pseudorange;
        channel.use_state = UseState::Raw;
    }

    run_solver(channels, prior_ecef, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbas::{FastCorrections, IgpDelay, IgpDelayStatus, IgpEntry};

    #[test]
    fn fast_correction_binds_to_mask_position_slot() {
        let mut corrections = EgnosCorrections::new();
        corrections.ingest(0, &SbasMessage::Mt1(PrnMask { prns: vec![5, 9] }));
        let mut prc = [0.0; 13];
        prc[1] = 4.0; // mask position of PRN 9 is index 1 within block 0
        corrections.ingest(
            0,
            &SbasMessage::Mt2To5(FastCorrections { tow: 10.0, block_id: 0, iodf: 2, prc, udrei: [0; 13] }),
        );

        let prn_pos = corrections.mask().position_of(9).unwrap();
        let (_, inputs) = corrections.fast_correction_inputs(prn_pos, 10.0).unwrap();
        assert_eq!(inputs.prc0, 4.0);
        assert_eq!(inputs.iodf0, 2);
    }

    #[test]
    fn prn_beyond_fourth_fast_block_has_no_binding() {
        let mut corrections = EgnosCorrections::new();
        let prns: Vec<u8> = (1..=60).collect();
        corrections.ingest(0, &SbasMessage::Mt1(PrnMask { prns }));
        let prn_pos = corrections.mask().position_of(60).unwrap();
        assert!(corrections.fast_correction_inputs(prn_pos, 0.0).is_none());
    }

    #[test]
    fn bound_igps_joins_mask_and_delay_on_matching_iodi() {
        let mut corrections = EgnosCorrections::new();
        let entry = IgpEntry { block_id: 2, block_line: 3, lat: 20.0, lon: 40.0 };
        corrections.ingest(
            0,
            &SbasMessage::Mt18(IgpMask { band_id: 1, iodi: 1, entries: vec![entry] }),
        );
        let mut entries = [IgpDelay { status: IgpDelayStatus::NotMonitored, igpvd: 0.0, givei: 0 }; 15];
        entries[3] = IgpDelay { status: IgpDelayStatus::Monitored, igpvd: 2.0, givei: 5 };
        corrections.ingest(
            0,
            &SbasMessage::Mt26(IonoCorrections { band_id: 1, block_id: 2, iodi: 1, entries }),
        );

        let bound = corrections.bound_igps();
        assert_eq!(bound.len(), 1);
        assert_eq!(bound[0].lat, 20.0);
        assert_eq!(bound[0].igpvd, 2.0);
    }

    #[test]
    fn stale_iodi_does_not_bind_an_igp() {
        let mut corrections = EgnosCorrections::new();
        let entry = IgpEntry { block_id: 0, block_line: 0, lat: 10.0, lon: 10.0 };
        corrections.ingest(0, &SbasMessage::Mt18(IgpMask { band_id: 0, iodi: 2, entries: vec![entry] }));
        let entries = [IgpDelay { status: IgpDelayStatus::Monitored, igpvd: 1.0, givei: 0 }; 15];
        corrections.ingest(0, &SbasMessage::Mt26(IonoCorrections { band_id: 0, block_id: 0, iodi: 1, entries }));

        assert!(corrections.bound_igps().is_empty());
    }

    #[test]
    fn run_solver_converges_on_synthetic_constellation() {
        let user = Vector3::new(4.0e6, 6.0e5, 4.8e6);
        let sats = [
            Vector3::new(2.0e7, 1.0e7, 1.0e7),
            Vector3::new(-2.0e7, 1.0e7, 1.0e7),
            Vector3::new(1.0e7, -2.0e7, 1.5e7),
            Vector3::new(1.0e7, 1.5e7, -2.0e7),
            Vector3::new(-1.5e7, -1.0e7, 2.0e7),
        ];
        let user_ecef = ECEF::new(user.x, user.y, user.z);

        let mut channels: Vec<SatelliteChannel> = sats
            .iter()
            .enumerate()
            .map(|(i, &pos)| {
                let range = (user - pos).norm();
                let mut channel = SatelliteChannel::new(i as u8 + 1, Constellation::Gps, 100.0, range + 2.0, 45.0);
                let azel = user_ecef.azel_of(&ECEF::new(pos.x, pos.y, pos.z));
                channel.position = ECEF::new(pos.x, pos.y, pos.z);
                channel.az = azel.az();
                channel.el = azel.el();
                channel.pseudorange_corrected = range + 2.0;
                channel.sigma2 = 1.0;
                channel.use_state = UseState::SbasCorrected;
                channel
            })
            .collect();

        let fix = run_solver(&mut channels, user, &EngineConfig::default()).unwrap();
        let got = Vector3::new(fix.ecef.x(), fix.ecef.y(), fix.ecef.z());
        assert!((got - user).norm() < 50.0, "solved {got:?} far from {user:?}");
    }

    #[test]
    fn run_solver_rejects_two_channels() {
        let mut channels = vec![
            SatelliteChannel::new(1, Constellation::Gps, 0.0, 2.0e7, 45.0),
            SatelliteChannel::new(2, Constellation::Gps, 0.0, 2.0e7, 45.0),
        ];
        for channel in &mut channels {
            channel.use_state = UseState::SbasCorrected;
        }
        assert!(run_solver(&mut channels, Vector3::zeros(), &EngineConfig::default()).is_none());
    }
}
