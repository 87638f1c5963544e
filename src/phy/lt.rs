//! Clause 72 link-training sub-machine
//!
//! The hardware runs the training frame protocol; this module arms it
//! with the configured initial request and then services the three
//! events it raises: coefficient updates for the local transmitter,
//! receiver calibration requests (which drive the link partner tap
//! sweep) and signal detect. Training is bounded by the hardware
//! max-wait timer and a 500 ms software timer running from the end of
//! auto-negotiation.

use super::{ApiState, Phy10GBaseKr, TapSweep, LT_SOFTWARE_WAIT_TIMER_MS};
use crate::config::LtInitialRequest;
use crate::register::{lt, tx_ctrl, PhyRegisterBus};
use crate::time::{elapsed_ms, TimeSource};
use crate::xcvr::Xcvr;

/// Hardware training state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum LtState {
    /// IDLE
    Idle = 0,
    /// INITIALIZE
    Initialize = 1,
    /// TRAIN_LOCAL
    TrainLocal = 2,
    /// SEND_TRAINING
    SendTraining = 3,
    /// FAILURE
    Failure = 4,
    /// SEND_DATA
    SendData = 5,
    /// TRAIN_REMOTE
    TrainRemote = 6,
    /// LINK_READY
    LinkReady = 7,
}

impl LtState {
    /// Decode the 3-bit hardware training state field
    pub const fn from_raw(raw: u32) -> Self {
        match raw & 0x7 {
            0 => LtState::Idle,
            1 => LtState::Initialize,
            2 => LtState::TrainLocal,
            3 => LtState::SendTraining,
            4 => LtState::Failure,
            5 => LtState::SendData,
            6 => LtState::TrainRemote,
            _ => LtState::LinkReady,
        }
    }
}

/// Link-training outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LtStatus {
    /// Training still running
    Incomplete,
    /// Signal detect seen, data path active
    Complete,
    /// Hardware fail bit or software timeout
    Failure,
}

/// Link-training observables
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkTraining {
    /// Last sampled hardware training state
    pub state: LtState,
    pub(crate) api_state: ApiState,
    /// Outcome of the current training run
    pub status: LtStatus,

    pub(crate) timer_start_ms: u32,

    /// Training failures since construction
    pub fail_count: u32,
    /// Training completions since construction
    pub complete_count: u32,
    /// Coefficient updates applied to the local transmitter this run
    pub tx_eq_count: u32,
    /// Receiver calibration requests serviced this run
    pub rx_cal_count: u32,
    /// Signal detect events this run
    pub signal_detect_count: u32,
    /// Local receiver lock events this run
    pub rcvr_lock_count: u32,
    /// Sub-machine polls this run
    pub cycle_count: u32,

    /// Local receiver trained and reported ready to the partner
    pub local_rcvr_locked: bool,

    /// Link partner tap sweep engine state
    pub sweep: TapSweep,
}

impl LinkTraining {
    pub(crate) fn new() -> Self {
        Self {
            state: LtState::Idle,
            api_state: ApiState::Init,
            status: LtStatus::Incomplete,
            timer_start_ms: 0,
            fail_count: 0,
            complete_count: 0,
            tx_eq_count: 0,
            rx_cal_count: 0,
            signal_detect_count: 0,
            rcvr_lock_count: 0,
            cycle_count: 0,
            local_rcvr_locked: false,
            sweep: TapSweep::new(),
        }
    }

    /// Clear per-run state; cumulative fail/complete counters survive
    pub(crate) fn reset_preserving_counters(&mut self) {
        let fail_count = self.fail_count;
        let complete_count = self.complete_count;
        *self = Self::new();
        self.fail_count = fail_count;
        self.complete_count = complete_count;
    }
}

impl<B, X, T> Phy10GBaseKr<B, X, T>
where
    B: PhyRegisterBus,
    X: Xcvr,
    T: TimeSource,
{
    /// One link-training poll
    pub(crate) fn lt_step(&mut self) {
        self.lt.state = LtState::from_raw(self.regs.field(lt::TRAINING_SM));

        match self.lt.api_state {
            ApiState::Init => {
                let request = match self.config.initial_request {
                    LtInitialRequest::Preset => lt::CTRL_PRESET.mask,
                    LtInitialRequest::Initialize => lt::CTRL_INIT.mask,
                };
                self.regs
                    .write(lt::CTRL, lt::CTRL_RESTART_EN.mask | request);
                self.lt.api_state = ApiState::StatusUpdate;
            }

            ApiState::StatusUpdate => self.lt_status_update(),
        }

        self.lt.cycle_count += 1;
    }

    fn lt_status_update(&mut self) {
        let status = self.regs.read(lt::STATUS);
        let elapsed = elapsed_ms(self.lt.timer_start_ms, self.clock.now_ms());

        if lt::STATUS_TRAINING_FAIL.is_set(status) || elapsed > LT_SOFTWARE_WAIT_TIMER_MS {
            self.lt.fail_count += 1;
            self.lt.status = LtStatus::Failure;

            // stop the hardware restarting itself when the software
            // timer raised the failure
            self.regs.set_field(lt::CTRL_RESTART_EN, 0);
            return;
        }

        if lt::STATUS_REQ_TX_EQUAL.is_set(status) {
            self.apply_coeff_update();
        }

        if lt::STATUS_REQ_RX_CAL.is_set(status) && !self.lt.local_rcvr_locked {
            // acknowledge the request in the transmitted status report
            self.regs.set_field(lt::STATUS_RX_CAL_DONE, 1);
            self.regs.set_field(lt::STATUS_RX_CAL_DONE, 0);

            self.lt.rx_cal_count += 1;

            match self.config.initial_request {
                LtInitialRequest::Preset => self.sweep_step(),
                LtInitialRequest::Initialize => self.lock_local_receiver(),
            }
        }

        if lt::STATUS_SIGNAL_DETECT.is_set(status) {
            self.lt.complete_count += 1;

            self.regs.set_field(
                tx_ctrl::CTRL_PMA_DATA,
                tx_ctrl::PmaDataSelect::Data.value(),
            );

            self.lt.signal_detect_count += 1;
            self.lt.status = LtStatus::Complete;
        }
    }

    /// Apply a received coefficient update to the local transmitter
    ///
    /// PRESET and INITIALIZE select the configured tables; otherwise the
    /// hardware-computed new tap values are used. Post and pre settings
    /// are register-coded relative to their maximum limit.
    fn apply_coeff_update(&mut self) {
        self.lt.tx_eq_count += 1;

        let rcvd = self.regs.field(lt::RCVD_COEFF_NEW);

        let (main, post, pre) = if rcvd & (lt::RCVD_COEFF_INITIALIZE | lt::RCVD_COEFF_PRESET) != 0 {
            if rcvd & lt::RCVD_COEFF_PRESET != 0 {
                (
                    self.config.main.preset,
                    self.config.post.preset as i32 - self.config.post.max as i32,
                    self.config.pre.preset as i32 - self.config.pre.max as i32,
                )
            } else {
                (
                    self.config.main.initialize,
                    self.config.post.initialize as i32 - self.config.post.max as i32,
                    self.config.pre.initialize as i32 - self.config.pre.max as i32,
                )
            }
        } else {
            let main = self.regs.read(lt::TX_NEW_MAIN_TAP) & lt::TX_NEW_TAP_MASK;
            let post = (self.regs.read(lt::TX_NEW_POST_TAP) & lt::TX_NEW_TAP_MASK) as i32
                - self.config.post.max as i32;
            let pre = (self.regs.read(lt::TX_NEW_PRE_TAP) & lt::TX_NEW_TAP_MASK) as i32
                - self.config.pre.max as i32;
            (main, post, pre)
        };

        self.xcvr.apply_tx_taps(main, post, pre);

        // report all taps updated in the transmitted status report
        self.regs.write(
            lt::TX_EQUAL,
            lt::TX_EQUAL_PRE_DONE.mask
                | lt::TX_EQUAL_POST_DONE.mask
                | lt::TX_EQUAL_MAIN_DONE.mask
                | lt::TX_EQUAL_DONE.mask,
        );
    }

    /// Report local receiver ready to the link partner
    pub(crate) fn lock_local_receiver(&mut self) {
        self.lt.local_rcvr_locked = true;
        self.lt.rcvr_lock_count += 1;
        self.regs.set_field(lt::LOCAL_RCVR_LOCKED, 1);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::config::{PhyConfig, TapConfig};
    use crate::testing::{FakeClock, MockPhyRegs, MockXcvr};

    struct Harness {
        phy: Phy10GBaseKr<MockPhyRegs, MockXcvr, FakeClock>,
        regs: MockPhyRegs,
        xcvr: MockXcvr,
    }

    fn harness(config: PhyConfig) -> Harness {
        let regs = MockPhyRegs::new();
        let xcvr = MockXcvr::new();
        let phy = Phy10GBaseKr::new(regs.clone(), xcvr.clone(), FakeClock::new(), config).unwrap();
        Harness { phy, regs, xcvr }
    }

    #[test]
    fn init_poll_arms_preset_request() {
        let mut h = harness(PhyConfig::new());
        h.phy.lt_step();

        let ctrl = h.regs.get(lt::CTRL);
        assert!(lt::CTRL_RESTART_EN.is_set(ctrl));
        assert!(lt::CTRL_PRESET.is_set(ctrl));
        assert!(!lt::CTRL_INIT.is_set(ctrl));
        assert_eq!(h.phy.lt().cycle_count, 1);
    }

    #[test]
    fn preset_update_applies_configured_preset_taps() {
        let mut h = harness(PhyConfig::new());
        h.phy.lt_step();

        h.regs.set_bits(lt::STATUS_REQ_TX_EQUAL, 1);
        h.regs.set_bits(lt::RCVD_COEFF_NEW, lt::RCVD_COEFF_PRESET);
        h.phy.lt_step();

        // preset post/pre sit at their max, coded as zero offset
        assert_eq!(h.xcvr.applied_taps(), std::vec![(41, 0, 0)]);
        assert_eq!(h.phy.lt().tx_eq_count, 1);
        let done = h.regs.get(lt::TX_EQUAL);
        assert!(lt::TX_EQUAL_DONE.is_set(done));
        assert!(lt::TX_EQUAL_PRE_DONE.is_set(done));
    }

    #[test]
    fn new_coefficient_values_are_offset_by_max_limit() {
        let config = PhyConfig::new()
            .with_post_tap(TapConfig::new(16, 0))
            .with_pre_tap(TapConfig::new(5, 0));
        let mut h = harness(config);
        h.phy.lt_step();

        h.regs.set_bits(lt::STATUS_REQ_TX_EQUAL, 1);
        h.regs.set(lt::TX_NEW_MAIN_TAP, 30);
        h.regs.set(lt::TX_NEW_POST_TAP, 10);
        h.regs.set(lt::TX_NEW_PRE_TAP, 2);
        // coefficient word carries neither PRESET nor INITIALIZE
        h.regs.set_bits(lt::RCVD_COEFF_NEW, 0x3F);
        h.phy.lt_step();

        assert_eq!(h.xcvr.applied_taps(), std::vec![(30, -6, -3)]);
    }

    #[test]
    fn rx_cal_request_is_acknowledged_with_a_pulse() {
        let config = PhyConfig::new().with_initial_request(LtInitialRequest::Initialize);
        let mut h = harness(config);
        h.phy.lt_step();
        h.regs.clear_writes();

        h.regs.set_bits(lt::STATUS_REQ_RX_CAL, 1);
        h.phy.lt_step();

        let pulses: std::vec::Vec<u32> = h
            .regs
            .writes()
            .iter()
            .filter(|(reg, _)| *reg == lt::STATUS)
            .map(|(_, value)| lt::STATUS_RX_CAL_DONE.get(*value))
            .collect();
        assert_eq!(pulses, std::vec![1, 0]);
        assert_eq!(h.phy.lt().rx_cal_count, 1);
    }

    #[test]
    fn rx_cal_ignored_once_receiver_locked() {
        let config = PhyConfig::new().with_initial_request(LtInitialRequest::Initialize);
        let mut h = harness(config);
        h.phy.lt_step();

        h.regs.set_bits(lt::STATUS_REQ_RX_CAL, 1);
        h.phy.lt_step();
        assert_eq!(h.phy.lt().rx_cal_count, 1);
        assert!(h.phy.lt().local_rcvr_locked);

        h.phy.lt_step();
        assert_eq!(h.phy.lt().rx_cal_count, 1);
        assert_eq!(h.phy.lt().rcvr_lock_count, 1);
    }

    #[test]
    fn failure_disables_hardware_restart() {
        let mut h = harness(PhyConfig::new());
        h.phy.lt_step();

        h.regs.set_bits(lt::STATUS_TRAINING_FAIL, 1);
        h.phy.lt_step();

        assert_eq!(h.phy.lt().status, LtStatus::Failure);
        assert_eq!(h.phy.lt().fail_count, 1);
        assert!(!lt::CTRL_RESTART_EN.is_set(h.regs.get(lt::CTRL)));
    }

    #[test]
    fn hardware_state_is_sampled_every_poll() {
        let mut h = harness(PhyConfig::new());
        h.regs.set_bits(lt::TRAINING_SM, LtState::SendTraining as u32);
        h.phy.lt_step();
        assert_eq!(h.phy.lt().state, LtState::SendTraining);

        h.regs.set(lt::TRAINING_SM_STATUS, LtState::LinkReady as u32);
        h.phy.lt_step();
        assert_eq!(h.phy.lt().state, LtState::LinkReady);
    }

    #[test]
    fn signal_detect_completes_and_selects_data_path() {
        let mut h = harness(PhyConfig::new());
        h.phy.lt_step();

        h.regs.set_bits(lt::STATUS_SIGNAL_DETECT, 1);
        h.phy.lt_step();

        assert_eq!(h.phy.lt().status, LtStatus::Complete);
        assert_eq!(h.phy.lt().signal_detect_count, 1);
        assert_eq!(
            tx_ctrl::CTRL_PMA_DATA.get(h.regs.get(tx_ctrl::CTRL)),
            tx_ctrl::PmaDataSelect::Data.value()
        );
    }
}
