//! Link partner transmit tap sweep
//!
//! When training starts from PRESET the partner's taps sit at their
//! maximums, so each tap can be swept down to its minimum while the PRBS
//! error counter is sampled at every setting. At minimum the samples are
//! searched for the best setting and the tap is incremented back up to
//! it. Taps are calibrated in a fixed order: main, then post, then pre.
//! After the pre tap lands on its optimum the receiver DFE is calibrated
//! and the local receiver reports ready to the partner.
//!
//! One coefficient-update signal is transmitted per engine call, paced
//! by the partner's receiver calibration requests.

use super::{LtStatus, Phy10GBaseKr, LT_SOFTWARE_WAIT_TIMER_MS};
use crate::config::TxEqTap;
use crate::register::{lt, Field, PhyRegisterBus};
use crate::time::{elapsed_ms, TimeSource};
use crate::xcvr::Xcvr;

/// PRBS error samples retained per tap sweep
pub const PRBS_SAMPLE_CAPACITY: usize = 64;

/// Status report received from the link partner for one tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum CoeffStatus {
    /// No update applied since the last request
    NotUpdated = 0,
    /// Requested update applied
    Updated = 1,
    /// Tap at its minimum limit
    Min = 2,
    /// Tap at its maximum limit
    Max = 3,
}

impl CoeffStatus {
    /// Decode the 2-bit status report field
    pub const fn from_raw(raw: u32) -> Self {
        match raw & 0x3 {
            0 => CoeffStatus::NotUpdated,
            1 => CoeffStatus::Updated,
            2 => CoeffStatus::Min,
            _ => CoeffStatus::Max,
        }
    }
}

/// Sweep phase for one tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapCalState {
    /// Stepping the tap from maximum down to minimum, sampling PRBS
    Sweeping,
    /// Incrementing the tap back up to its optimal setting
    Optimising,
}

/// Coefficient signal transmitted to the link partner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum TapSignal {
    Increment,
    Decrement,
    Hold,
}

/// Per-tap sweep bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CoeffUpdate {
    /// Coefficient updates issued for this tap
    pub count: u32,
    /// Increment requests issued
    pub increments: u32,
    /// Decrement requests issued
    pub decrements: u32,
    /// Current sweep phase
    pub cal_state: TapCalState,
    /// Increments needed from minimum to the optimal setting
    pub optimal_index: u32,
    /// Increments issued so far while optimising
    pub optimal_count: u32,
}

impl CoeffUpdate {
    const fn new() -> Self {
        Self {
            count: 0,
            increments: 0,
            decrements: 0,
            cal_state: TapCalState::Sweeping,
            optimal_index: 0,
            optimal_count: 0,
        }
    }
}

/// PRBS error sample buffer, one entry per visited tap setting
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PrbsSamples {
    buf: [u32; PRBS_SAMPLE_CAPACITY],
    len: usize,
}

impl PrbsSamples {
    const fn new() -> Self {
        Self { buf: [0; PRBS_SAMPLE_CAPACITY], len: 0 }
    }

    /// Record a sample; saturates when the buffer is full
    pub fn push(&mut self, sample: u32) {
        if self.len < PRBS_SAMPLE_CAPACITY {
            self.buf[self.len] = sample;
            self.len += 1;
        }
    }

    /// Recorded samples, oldest first
    pub fn as_slice(&self) -> &[u32] {
        &self.buf[..self.len]
    }

    /// Number of recorded samples
    pub fn len(&self) -> usize {
        self.len
    }

    /// No samples recorded yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Discard all samples
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

/// Link partner tap sweep engine state
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TapSweep {
    /// Tap currently being calibrated
    pub active: TxEqTap,
    /// Main cursor bookkeeping
    pub main: CoeffUpdate,
    /// Post cursor bookkeeping
    pub post: CoeffUpdate,
    /// Pre cursor bookkeeping
    pub pre: CoeffUpdate,
    /// PRBS samples for the tap currently sweeping
    pub samples: PrbsSamples,
}

impl TapSweep {
    pub(crate) const fn new() -> Self {
        Self {
            active: TxEqTap::Main,
            main: CoeffUpdate::new(),
            post: CoeffUpdate::new(),
            pre: CoeffUpdate::new(),
            samples: PrbsSamples::new(),
        }
    }

    /// Bookkeeping for `tap`
    pub const fn coeff(&self, tap: TxEqTap) -> &CoeffUpdate {
        match tap {
            TxEqTap::Main => &self.main,
            TxEqTap::Post => &self.post,
            TxEqTap::Pre => &self.pre,
        }
    }

    pub(crate) const fn coeff_mut(&mut self, tap: TxEqTap) -> &mut CoeffUpdate {
        match tap {
            TxEqTap::Main => &mut self.main,
            TxEqTap::Post => &mut self.post,
            TxEqTap::Pre => &mut self.pre,
        }
    }
}

/// Received status report field for `tap`
const fn report_field(tap: TxEqTap) -> Field {
    match tap {
        TxEqTap::Main => lt::RCVD_COEFF_MAIN_VALUE,
        TxEqTap::Post => lt::RCVD_COEFF_POST_VALUE,
        TxEqTap::Pre => lt::RCVD_COEFF_PRE_VALUE,
    }
}

/// Increments from minimum to the optimal tap setting
///
/// Samples were recorded while decrementing from maximum to minimum, so
/// the best index is reversed into an increment count. Minimum error
/// wins; among equal errors the sample closest to the midpoint wins,
/// then the leftmost.
pub fn optimal_tap_index(samples: &[u32]) -> u32 {
    if samples.is_empty() {
        return 0;
    }

    let midpoint = samples.len() / 2;

    let mut min_error = samples[0];
    let mut min_index = 0usize;
    for (i, &error) in samples.iter().enumerate() {
        if error < min_error {
            min_error = error;
            min_index = i;
        }
    }

    let mut min_distance = midpoint;
    for (i, &error) in samples.iter().enumerate() {
        if error == min_error {
            let distance = midpoint.abs_diff(i);
            if distance < min_distance {
                min_distance = distance;
                min_index = i;
            }
            if distance == 0 {
                break;
            }
        }
    }

    (samples.len() - min_index) as u32
}

impl<B, X, T> Phy10GBaseKr<B, X, T>
where
    B: PhyRegisterBus,
    X: Xcvr,
    T: TimeSource,
{
    /// One sweep engine call, transmitting exactly one coefficient
    /// signal unless the engine is finishing up
    pub(crate) fn sweep_step(&mut self) {
        let tap = self.lt.sweep.active;

        if self.lt.sweep.coeff(tap).cal_state == TapCalState::Optimising {
            let coeff = self.lt.sweep.coeff(tap);
            if coeff.optimal_count == coeff.optimal_index {
                self.advance_sweep(tap);
            } else {
                Self::send_tap_signal(&mut self.regs, tap, TapSignal::Increment);
                self.lt.sweep.coeff_mut(tap).optimal_count += 1;
            }
            return;
        }

        let report = CoeffStatus::from_raw(self.regs.field(report_field(tap)));
        match report {
            CoeffStatus::Max | CoeffStatus::Updated => {
                self.record_prbs_sample();
                Self::send_tap_signal(&mut self.regs, tap, TapSignal::Decrement);
                let coeff = self.lt.sweep.coeff_mut(tap);
                coeff.count += 1;
                coeff.decrements += 1;
            }

            CoeffStatus::NotUpdated => {
                Self::send_tap_signal(&mut self.regs, tap, TapSignal::Hold);
                self.lt.sweep.coeff_mut(tap).count += 1;
            }

            CoeffStatus::Min => {
                self.record_prbs_sample();
                let optimal = optimal_tap_index(self.lt.sweep.samples.as_slice());
                self.lt.sweep.coeff_mut(tap).optimal_index = optimal;

                if optimal == 0 {
                    self.advance_sweep(tap);
                } else {
                    Self::send_tap_signal(&mut self.regs, tap, TapSignal::Increment);
                    let coeff = self.lt.sweep.coeff_mut(tap);
                    coeff.cal_state = TapCalState::Optimising;
                    coeff.optimal_count += 1;
                }
            }
        }
    }

    /// The active tap reached its optimum: move on or finish
    fn advance_sweep(&mut self, tap: TxEqTap) {
        match tap {
            TxEqTap::Main => self.begin_next_tap(TxEqTap::Post),
            TxEqTap::Post => self.begin_next_tap(TxEqTap::Pre),
            TxEqTap::Pre => self.finish_sweep(),
        }
    }

    fn begin_next_tap(&mut self, next: TxEqTap) {
        Self::send_tap_signal(&mut self.regs, next, TapSignal::Increment);
        let coeff = self.lt.sweep.coeff_mut(next);
        coeff.count += 1;
        coeff.increments += 1;
        self.lt.sweep.active = next;
        self.lt.sweep.samples.clear();
    }

    /// All three taps calibrated: run DFE calibration, reset the receive
    /// path, then report the local receiver ready
    fn finish_sweep(&mut self) {
        self.xcvr.start_dfe_cal();
        while !self.xcvr.dfe_cal_done() {
            let status = self.regs.read(lt::STATUS);
            let elapsed = elapsed_ms(self.lt.timer_start_ms, self.clock.now_ms());
            if lt::STATUS_TRAINING_FAIL.is_set(status) || elapsed > LT_SOFTWARE_WAIT_TIMER_MS {
                self.lt.status = LtStatus::Failure;
                break;
            }
        }
        self.xcvr.reset_rx();

        if self.lt.status != LtStatus::Failure {
            self.lock_local_receiver();
            self.lt.sweep.samples.clear();
        }
    }

    fn record_prbs_sample(&mut self) {
        let errors = self.regs.read(lt::PRBS_ERR_WRD);
        self.lt.sweep.samples.push(errors);
    }

    /// Transmit one coefficient-update signal for one tap
    fn send_tap_signal(regs: &mut B, tap: TxEqTap, signal: TapSignal) {
        let field = match (tap, signal) {
            (TxEqTap::Main, TapSignal::Increment) => lt::TX_COEFF_MAIN_INC,
            (TxEqTap::Main, TapSignal::Decrement) => lt::TX_COEFF_MAIN_DEC,
            (TxEqTap::Main, TapSignal::Hold) => lt::TX_COEFF_MAIN_HOLD,
            (TxEqTap::Post, TapSignal::Increment) => lt::TX_COEFF_POST_INC,
            (TxEqTap::Post, TapSignal::Decrement) => lt::TX_COEFF_POST_DEC,
            (TxEqTap::Post, TapSignal::Hold) => lt::TX_COEFF_POST_HOLD,
            (TxEqTap::Pre, TapSignal::Increment) => lt::TX_COEFF_PRE_INC,
            (TxEqTap::Pre, TapSignal::Decrement) => lt::TX_COEFF_PRE_DEC,
            (TxEqTap::Pre, TapSignal::Hold) => lt::TX_COEFF_PRE_HOLD,
        };
        regs.write(lt::TX_COEFF_CFG, field.mask);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::PhyConfig;
    use crate::testing::{FakeClock, MockPhyRegs, MockXcvr};
    use std::vec::Vec;

    // ==========================================================================
    // Optimal Index Search
    // ==========================================================================

    #[test]
    fn single_sample_needs_one_increment() {
        assert_eq!(optimal_tap_index(&[5]), 1);
    }

    #[test]
    fn minimum_error_wins() {
        // best sample at index 3 of 5, two increments from minimum
        assert_eq!(optimal_tap_index(&[9, 7, 5, 1, 8]), 2);
    }

    #[test]
    fn ties_break_toward_midpoint() {
        assert_eq!(optimal_tap_index(&[9, 4, 4]), 2);
        // equal minimum everywhere lands on the midpoint
        assert_eq!(optimal_tap_index(&[1, 1, 1]), 2);
        assert_eq!(optimal_tap_index(&[2, 2, 2, 2, 2]), 3);
    }

    #[test]
    fn equidistant_ties_break_leftmost() {
        // minimum at indices 1 and 3, both one step from the midpoint
        assert_eq!(optimal_tap_index(&[3, 1, 7, 1, 9]), 4);
    }

    #[test]
    fn result_is_never_zero_for_nonempty_input() {
        assert!(optimal_tap_index(&[0]) > 0);
        assert!(optimal_tap_index(&[7, 7, 7, 7]) > 0);
    }

    // ==========================================================================
    // Sweep Engine
    // ==========================================================================

    struct Harness {
        phy: Phy10GBaseKr<MockPhyRegs, MockXcvr, FakeClock>,
        regs: MockPhyRegs,
        xcvr: MockXcvr,
        clock: FakeClock,
    }

    fn harness() -> Harness {
        let regs = MockPhyRegs::new();
        let xcvr = MockXcvr::new();
        let clock = FakeClock::new();
        let phy = Phy10GBaseKr::new(regs.clone(), xcvr.clone(), clock.clone(), PhyConfig::new())
            .unwrap();
        Harness { phy, regs, xcvr, clock }
    }

    impl Harness {
        /// Present a status report and PRBS count, then run the engine
        fn report(&mut self, tap: TxEqTap, status: CoeffStatus, prbs: u32) {
            self.regs.set_bits(report_field(tap), status as u32);
            self.regs.set(lt::PRBS_ERR_WRD, prbs);
            self.regs.clear_writes();
            self.phy.sweep_step();
        }

        fn coeff_signals(&self) -> Vec<u32> {
            self.regs
                .writes()
                .iter()
                .filter(|(reg, _)| *reg == lt::TX_COEFF_CFG)
                .map(|(_, value)| *value)
                .collect()
        }
    }

    #[test]
    fn max_report_records_sample_and_decrements() {
        let mut h = harness();
        h.report(TxEqTap::Main, CoeffStatus::Max, 9);

        assert_eq!(h.coeff_signals(), std::vec![lt::TX_COEFF_MAIN_DEC.mask]);
        assert_eq!(h.phy.lt().sweep.samples.as_slice(), &[9]);
        assert_eq!(h.phy.lt().sweep.main.decrements, 1);
        assert_eq!(h.phy.lt().sweep.main.count, 1);
    }

    #[test]
    fn not_updated_report_holds_without_sampling() {
        let mut h = harness();
        h.report(TxEqTap::Main, CoeffStatus::NotUpdated, 9);

        assert_eq!(h.coeff_signals(), std::vec![lt::TX_COEFF_MAIN_HOLD.mask]);
        assert!(h.phy.lt().sweep.samples.is_empty());
        assert_eq!(h.phy.lt().sweep.main.count, 1);
        assert_eq!(h.phy.lt().sweep.main.decrements, 0);
    }

    #[test]
    fn main_sweep_optimises_then_hands_over_to_post() {
        let mut h = harness();

        h.report(TxEqTap::Main, CoeffStatus::Max, 9);
        h.report(TxEqTap::Main, CoeffStatus::Updated, 4);
        h.report(TxEqTap::Main, CoeffStatus::Min, 4);

        // samples [9, 4, 4]: two increments back from minimum
        assert_eq!(h.phy.lt().sweep.main.optimal_index, 2);
        assert_eq!(h.phy.lt().sweep.main.cal_state, TapCalState::Optimising);
        assert_eq!(h.phy.lt().sweep.main.optimal_count, 1);
        assert_eq!(h.coeff_signals(), std::vec![lt::TX_COEFF_MAIN_INC.mask]);

        h.report(TxEqTap::Main, CoeffStatus::Updated, 0);
        assert_eq!(h.phy.lt().sweep.main.optimal_count, 2);

        // optimum reached: the post tap sweep starts with an increment
        h.report(TxEqTap::Main, CoeffStatus::Updated, 0);
        assert_eq!(h.coeff_signals(), std::vec![lt::TX_COEFF_POST_INC.mask]);
        assert_eq!(h.phy.lt().sweep.active, TxEqTap::Post);
        assert_eq!(h.phy.lt().sweep.post.increments, 1);
        assert!(h.phy.lt().sweep.samples.is_empty());
    }

    #[test]
    fn one_signal_per_engine_call() {
        let mut h = harness();
        let reports = [
            CoeffStatus::Max,
            CoeffStatus::NotUpdated,
            CoeffStatus::Updated,
            CoeffStatus::Updated,
            CoeffStatus::Min,
        ];
        for (i, report) in reports.into_iter().enumerate() {
            h.report(TxEqTap::Main, report, i as u32);
            assert_eq!(h.coeff_signals().len(), 1);
        }
    }

    #[test]
    fn optimal_count_never_exceeds_optimal_index() {
        let mut h = harness();
        h.report(TxEqTap::Main, CoeffStatus::Max, 9);
        h.report(TxEqTap::Main, CoeffStatus::Updated, 1);
        h.report(TxEqTap::Main, CoeffStatus::Updated, 5);
        h.report(TxEqTap::Main, CoeffStatus::Min, 7);

        while h.phy.lt().sweep.active == TxEqTap::Main {
            let main = h.phy.lt().sweep.main;
            assert!(main.optimal_count <= main.optimal_index);
            h.report(TxEqTap::Main, CoeffStatus::Updated, 0);
        }
        assert_eq!(h.phy.lt().sweep.main.optimal_count, h.phy.lt().sweep.main.optimal_index);
    }

    #[test]
    fn pre_tap_completion_calibrates_dfe_and_locks_receiver() {
        let mut h = harness();
        h.phy.lt.sweep.active = TxEqTap::Pre;
        h.phy.lt.sweep.pre.cal_state = TapCalState::Optimising;
        // optimal_count == optimal_index == 0: optimum already reached

        h.phy.sweep_step();

        assert_eq!(h.xcvr.dfe_cal_calls(), 1);
        assert_eq!(h.xcvr.rx_reset_calls(), 1);
        assert!(h.phy.lt().local_rcvr_locked);
        assert_eq!(h.phy.lt().rcvr_lock_count, 1);
        assert_eq!(h.regs.get(lt::LOCAL_RCVR_LOCK), 1);
    }

    #[test]
    fn dfe_timeout_fails_training_without_locking() {
        let mut h = harness();
        h.phy.lt.sweep.active = TxEqTap::Pre;
        h.phy.lt.sweep.pre.cal_state = TapCalState::Optimising;
        h.xcvr.set_dfe_polls(u32::MAX);
        h.clock.set_auto_tick(100);

        h.phy.sweep_step();

        assert_eq!(h.phy.lt().status, LtStatus::Failure);
        assert!(!h.phy.lt().local_rcvr_locked);
        assert_eq!(h.regs.get(lt::LOCAL_RCVR_LOCK), 0);
        // the receive path is still reset after a timed-out calibration
        assert_eq!(h.xcvr.rx_reset_calls(), 1);
    }

    #[test]
    fn prbs_samples_saturate_at_capacity() {
        let mut samples = PrbsSamples::new();
        for i in 0..(PRBS_SAMPLE_CAPACITY as u32 + 8) {
            samples.push(i);
        }
        assert_eq!(samples.len(), PRBS_SAMPLE_CAPACITY);
        assert_eq!(samples.as_slice()[PRBS_SAMPLE_CAPACITY - 1], 63);
    }
}
