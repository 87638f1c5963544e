//! 10GBASE-KR PHY driver core
//!
//! [`Phy10GBaseKr`] owns the register bus, the transceiver and the time
//! source, and drives the backplane bring-up sequence as a polled state
//! machine: configure the serdes for auto-negotiation, run Clause 73
//! arbitration, reconfigure and calibrate the serdes for 10.3125 Gbps,
//! run Clause 72 link training, then monitor the established link. Any
//! failure drops the machine back to the start of the sequence, so the
//! caller only ever polls [`Phy10GBaseKr::step`] and inspects the
//! returned [`LinkStatus`].

mod an;
mod lt;
mod sweep;

pub use an::{AnState, AnStatus, AutoNegotiation, FEC_ABILITY_BIT, FEC_REQUESTED_BIT};
pub use lt::{LinkTraining, LtState, LtStatus};
pub use sweep::{CoeffStatus, CoeffUpdate, PrbsSamples, TapCalState, TapSweep, PRBS_SAMPLE_CAPACITY};

use crate::config::PhyConfig;
use crate::error::Result;
use crate::register::{lt as lt_regs, tx_ctrl, PhyRegisterBus};
use crate::time::{elapsed_ms, TimeSource};
use crate::xcvr::Xcvr;

/// Hardware max-wait timer terminal count, 500 ms of line clock
pub const MAX_WAIT_TIMER_500MS: u32 = 161_000_000;

/// Software bound on each link-training phase, in milliseconds
pub const LT_SOFTWARE_WAIT_TIMER_MS: u32 = 500;

/// Clause 73 link-fail-inhibit timer, in milliseconds
pub const AN_LINK_FAIL_INHIBIT_TIMER_MS: u32 = 500;

// =============================================================================
// State and Status Types
// =============================================================================

/// Top-level bring-up state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhyState {
    /// Configure the serdes for DME page exchange
    AnSerdesConfig,
    /// Clause 73 arbitration in hardware
    AnArbitration,
    /// Reconfigure and calibrate the serdes for training
    LtSerdesConfig,
    /// Clause 72 training handshake
    LtTraining,
    /// Link up, monitor for loss of lock
    LinkEstablishedCheck,
}

/// Status reported after each [`Phy10GBaseKr::step`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum LinkStatus {
    /// Link trained and data path active
    LinkEstablished = 0,
    /// Serdes being configured for auto-negotiation
    AnSerdesConfiguration = 1,
    /// Waiting on Clause 73 arbitration
    AnInProgress = 2,
    /// Arbitration reached AN_GOOD_CHECK
    AnComplete = 3,
    /// Serdes being configured for link training
    LtSerdesConfiguration = 4,
    /// Serdes calibration timed out, restarting from auto-negotiation
    LtSerdesCalFailure = 5,
    /// Serdes locked and calibrated at the training data rate
    LtSerdesCalComplete = 6,
    /// Clause 72 handshake in progress
    LtInProgress = 7,
    /// Training failed, restarting from auto-negotiation
    LtFailure = 8,
    /// Receiver lost lock after training, restarting from auto-negotiation
    LinkBroken = 9,
}

/// Shared Init/StatusUpdate phase marker for the AN and LT sub-machines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub(crate) enum ApiState {
    Init,
    StatusUpdate,
}

/// PHY IP version readback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IpVersion {
    /// Major version
    pub major: u32,
    /// Minor version
    pub minor: u32,
    /// Sub version
    pub sub: u32,
}

// =============================================================================
// Driver Instance
// =============================================================================

/// 10GBASE-KR PHY driver instance
///
/// Generic over the register bus, the serdes transceiver and the time
/// source so the same state machines run on hardware and under host
/// tests.
#[derive(Debug)]
pub struct Phy10GBaseKr<B, X, T> {
    pub(crate) regs: B,
    pub(crate) xcvr: X,
    pub(crate) clock: T,
    pub(crate) config: PhyConfig,

    state: PhyState,
    status: LinkStatus,

    pub(crate) fec_configured: bool,
    pub(crate) fec_negotiated: bool,

    pub(crate) an: AutoNegotiation,
    pub(crate) lt: LinkTraining,
}

impl<B, X, T> Phy10GBaseKr<B, X, T>
where
    B: PhyRegisterBus,
    X: Xcvr,
    T: TimeSource,
{
    /// Create and reset a driver instance
    ///
    /// Validates `config`, reads the hardware build's FEC capability,
    /// programs the tap tables and initialises the transceiver. Fails
    /// only on invalid tap tables; an FEC request on a build without
    /// FEC logic is accepted and the advertisement is forced clear
    /// instead.
    pub fn new(regs: B, xcvr: X, clock: T, config: PhyConfig) -> Result<Self> {
        let mut phy = Self {
            regs,
            xcvr,
            clock,
            config,
            state: PhyState::AnSerdesConfig,
            status: LinkStatus::AnSerdesConfiguration,
            fec_configured: false,
            fec_negotiated: false,
            an: AutoNegotiation::new(),
            lt: LinkTraining::new(),
        };

        phy.config.validate()?;
        phy.fec_configured = phy.regs.field(tx_ctrl::CORE_CFG_FEC_PRESENT) != 0;

        phy.reset();
        phy.xcvr.init();

        Ok(phy)
    }

    /// Advance the bring-up state machine by one poll
    ///
    /// Non-blocking apart from the serdes calibration and DFE phases,
    /// which spin bounded by [`LT_SOFTWARE_WAIT_TIMER_MS`]. Call
    /// repeatedly; on any failure the machine restarts the sequence on
    /// the next call.
    pub fn step(&mut self) -> LinkStatus {
        match self.state {
            PhyState::AnSerdesConfig => {
                self.status = LinkStatus::AnSerdesConfiguration;
                self.reset();
                self.regs
                    .set_field(tx_ctrl::CTRL_XCVR_LOS, tx_ctrl::XCVR_LOS_LOCK_TO_REF);
                self.xcvr.auto_neg_data_rate();
                self.state = PhyState::AnArbitration;
            }

            PhyState::AnArbitration => {
                self.status = LinkStatus::AnInProgress;
                self.an_step();
                if self.an.status == AnStatus::Complete {
                    self.status = LinkStatus::AnComplete;
                    self.state = PhyState::LtSerdesConfig;
                }
            }

            PhyState::LtSerdesConfig => {
                self.status = LinkStatus::LtSerdesConfiguration;
                if self.lt_serdes_config() {
                    self.status = LinkStatus::LtSerdesCalComplete;
                    self.state = PhyState::LtTraining;
                } else {
                    self.status = LinkStatus::LtSerdesCalFailure;
                    self.state = PhyState::AnSerdesConfig;
                }
            }

            PhyState::LtTraining => {
                self.status = LinkStatus::LtInProgress;
                self.lt_step();
                if self.lt.status == LtStatus::Failure {
                    self.state = PhyState::AnSerdesConfig;
                    self.status = LinkStatus::LtFailure;
                } else if self.lt.status == LtStatus::Complete {
                    self.state = PhyState::LinkEstablishedCheck;
                    self.status = LinkStatus::LinkEstablished;
                }
            }

            PhyState::LinkEstablishedCheck => {
                if self.xcvr.cdr_locked() {
                    self.status = LinkStatus::LinkEstablished;
                } else {
                    self.state = PhyState::AnSerdesConfig;
                    self.status = LinkStatus::LinkBroken;
                }
            }
        }
        self.status
    }

    /// Reconfigure the core to its starting conditions
    ///
    /// Programs tap tables, clears handshake state and resets the AN and
    /// LT sub-machines. Cumulative fail/complete counters survive so a
    /// caller can observe restarts across link drops.
    fn reset(&mut self) {
        self.regs.set_field(
            tx_ctrl::CTRL_PMA_DATA,
            tx_ctrl::PmaDataSelect::AutoNegotiation.value(),
        );

        self.regs.set_field(tx_ctrl::CTRL_TX_RESET, 1);
        self.regs.set_field(tx_ctrl::CTRL_RX_RESET, 1);

        // resets clear the datapath select
        self.regs.set_field(
            tx_ctrl::CTRL_PMA_DATA,
            tx_ctrl::PmaDataSelect::AutoNegotiation.value(),
        );

        self.regs.write(lt_regs::MAX_MAIN_TAP, self.config.main.max);
        self.regs.write(lt_regs::MIN_MAIN_TAP, self.config.main.min);
        self.regs.write(lt_regs::MAX_POST_TAP, self.config.post.max);
        self.regs.write(lt_regs::MIN_POST_TAP, self.config.post.min);
        self.regs.write(lt_regs::MAX_PRE_TAP, self.config.pre.max);
        self.regs.write(lt_regs::MIN_PRE_TAP, self.config.pre.min);

        self.regs
            .write(lt_regs::PRESET_MAIN_TAP, self.config.main.preset);
        self.regs
            .write(lt_regs::PRESET_POST_TAP, self.config.post.preset);
        self.regs
            .write(lt_regs::PRESET_PRE_TAP, self.config.pre.preset);

        self.regs
            .write(lt_regs::INIT_MAIN_TAP, self.config.main.initialize);
        self.regs
            .write(lt_regs::INIT_POST_TAP, self.config.post.initialize);
        self.regs
            .write(lt_regs::INIT_PRE_TAP, self.config.pre.initialize);

        self.lt.reset_preserving_counters();
        self.an.reset();

        self.regs.set_field(lt_regs::LOCAL_RCVR_LOCKED, 0);
    }

    /// Reconfigure and calibrate the serdes at the training data rate
    ///
    /// Returns false if the receiver fails to lock or CTLE calibration
    /// fails to complete inside the training window.
    fn lt_serdes_config(&mut self) -> bool {
        self.regs
            .set_field(tx_ctrl::CTRL_XCVR_LOS, tx_ctrl::XCVR_LOS_LOCK_TO_DATA);
        self.xcvr.link_training_data_rate();

        while !self.xcvr.cdr_locked() {
            if self.training_window_expired() {
                return false;
            }
        }

        self.xcvr.start_ctle_cal();
        while !self.xcvr.ctle_cal_done() {
            if self.training_window_expired() {
                return false;
            }
        }

        true
    }

    /// Hardware training failure or software training window elapsed
    fn training_window_expired(&mut self) -> bool {
        let elapsed = elapsed_ms(self.lt.timer_start_ms, self.clock.now_ms());
        elapsed >= LT_SOFTWARE_WAIT_TIMER_MS || self.regs.field(lt_regs::STATUS_TRAINING_FAIL) == 1
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Status reported by the last [`step`](Self::step) call
    pub fn status(&self) -> LinkStatus {
        self.status
    }

    /// Current bring-up state
    pub fn state(&self) -> PhyState {
        self.state
    }

    /// Link trained and carrying data
    pub fn link_established(&self) -> bool {
        self.status == LinkStatus::LinkEstablished
    }

    /// FEC negotiated with the link partner in the last completed
    /// auto-negotiation
    pub fn fec_negotiated(&self) -> bool {
        self.fec_negotiated
    }

    /// FEC logic present in this hardware build
    pub fn fec_configured(&self) -> bool {
        self.fec_configured
    }

    /// Auto-negotiation observables
    pub fn an(&self) -> &AutoNegotiation {
        &self.an
    }

    /// Link-training observables
    pub fn lt(&self) -> &LinkTraining {
        &self.lt
    }

    /// Active configuration
    pub fn config(&self) -> &PhyConfig {
        &self.config
    }

    /// Read the PHY IP version from hardware
    pub fn ip_version(&mut self) -> IpVersion {
        IpVersion {
            major: self.regs.field(tx_ctrl::IP_VERSION_MAJOR),
            minor: self.regs.field(tx_ctrl::IP_VERSION_MINOR),
            sub: self.regs.field(tx_ctrl::IP_VERSION_SUB),
        }
    }

    /// Release the register bus, transceiver and clock
    pub fn release(self) -> (B, X, T) {
        (self.regs, self.xcvr, self.clock)
    }
}

// =============================================================================
// Integration Tests
// =============================================================================
