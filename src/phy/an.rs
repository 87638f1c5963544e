//! Clause 73 auto-negotiation sub-machine
//!
//! Arbitration itself runs in hardware; this module arms it, watches the
//! arbitration state for AN_GOOD_CHECK, snapshots both devices' ability
//! words and resolves FEC. There is deliberately no software timeout
//! here: the hardware link-fail-inhibit timer restarts arbitration on
//! its own until a partner responds.

use super::{ApiState, Phy10GBaseKr, AN_LINK_FAIL_INHIBIT_TIMER_MS, MAX_WAIT_TIMER_500MS};
use crate::register::{an, lt, tx_ctrl, PhyRegisterBus};
use crate::time::TimeSource;
use crate::xcvr::Xcvr;

/// FEC ability bit within the 48-bit ability vector
pub const FEC_ABILITY_BIT: u32 = 46;
/// FEC requested bit within the 48-bit ability vector
pub const FEC_REQUESTED_BIT: u32 = 47;

/// Clause 73 arbitration state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum AnState {
    /// AUTO_NEG_ENABLE
    AutoNegEnable = 0x0,
    /// TRANSMIT_DISABLE
    TransmitDisable = 0x1,
    /// ABILITY_DETECT
    AbilityDetect = 0x2,
    /// ACKNOWLEDGE_DETECT
    AcknowledgeDetect = 0x3,
    /// COMPLETE_ACKNOWLEDGE
    CompleteAcknowledge = 0x4,
    /// AN_GOOD_CHECK, negotiation resolved
    AnGoodCheck = 0x5,
    /// AN_GOOD
    AnGood = 0x6,
    /// NEXT_PAGE_WAIT
    NextPageWait = 0x7,
    /// NEXT_PAGE_WAIT_TX_IDLE
    NextPageWaitTxIdle = 0x8,
    /// LINK_STATUS_CHECK
    LinkStatusCheck = 0x9,
    /// PARALLEL_DETECTION_FAULT
    ParallelDetectionFault = 0xA,
}

impl AnState {
    /// Decode the arbitration state field, `None` for reserved values
    pub const fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0x0 => Some(AnState::AutoNegEnable),
            0x1 => Some(AnState::TransmitDisable),
            0x2 => Some(AnState::AbilityDetect),
            0x3 => Some(AnState::AcknowledgeDetect),
            0x4 => Some(AnState::CompleteAcknowledge),
            0x5 => Some(AnState::AnGoodCheck),
            0x6 => Some(AnState::AnGood),
            0x7 => Some(AnState::NextPageWait),
            0x8 => Some(AnState::NextPageWaitTxIdle),
            0x9 => Some(AnState::LinkStatusCheck),
            0xA => Some(AnState::ParallelDetectionFault),
            _ => None,
        }
    }
}

/// Auto-negotiation outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnStatus {
    /// Arbitration still running
    Incomplete,
    /// Arbitration reached AN_GOOD_CHECK
    Complete,
}

/// Auto-negotiation observables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AutoNegotiation {
    /// Last sampled arbitration state
    pub state: Option<AnState>,
    pub(crate) api_state: ApiState,
    /// Completed negotiations since construction
    pub complete_count: u32,
    /// Outcome of the current negotiation
    pub status: AnStatus,
    /// Local 48-bit ability vector, snapshot when arbitration was armed
    pub adv_ability: u64,
    /// Link partner's 48-bit base-page ability vector
    pub lp_bp_adv_ability: u64,
}

impl AutoNegotiation {
    pub(crate) fn new() -> Self {
        Self {
            state: None,
            api_state: ApiState::Init,
            complete_count: 0,
            status: AnStatus::Incomplete,
            adv_ability: 0,
            lp_bp_adv_ability: 0,
        }
    }

    pub(crate) fn reset(&mut self) {
        self.api_state = ApiState::Init;
        self.status = AnStatus::Incomplete;
    }
}

impl<B, X, T> Phy10GBaseKr<B, X, T>
where
    B: PhyRegisterBus,
    X: Xcvr,
    T: TimeSource,
{
    /// One auto-negotiation poll: arm the hardware, then watch for
    /// AN_GOOD_CHECK
    pub(crate) fn an_step(&mut self) {
        match self.an.api_state {
            ApiState::Init => {
                self.regs.set_field(an::CONTROL_RESET, 1);

                self.fec_negotiated = false;

                let mut adv3 = self.regs.read(an::MR_ADV_CAPABILITY_3);
                if self.fec_configured {
                    adv3 = an::ADV_FEC_ABILITY.set(adv3, 1);
                    if self.config.fec_request {
                        adv3 = an::ADV_FEC_REQUESTED.set(adv3, 1);
                    }
                } else {
                    adv3 &= !(an::ADV_FEC_ABILITY.mask | an::ADV_FEC_REQUESTED.mask);
                }
                self.regs.write(an::MR_ADV_CAPABILITY_3, adv3);

                self.regs.set_field(an::CONTROL_ENABLE, 1);
                self.regs.set_field(an::CONTROL_RESTART, 1);

                self.regs.set_field(
                    tx_ctrl::CTRL_PMA_DATA,
                    tx_ctrl::PmaDataSelect::AutoNegotiation.value(),
                );

                self.regs
                    .write(an::LINK_FAIL_INHIBIT_TIMER, AN_LINK_FAIL_INHIBIT_TIMER_MS);

                self.an.adv_ability = self.read_ability(
                    an::MR_ADV_CAPABILITY_1,
                    an::MR_ADV_CAPABILITY_2,
                    an::MR_ADV_CAPABILITY_3,
                );

                self.an.status = AnStatus::Incomplete;
                self.an.api_state = ApiState::StatusUpdate;
            }

            ApiState::StatusUpdate => {
                let raw = self.regs.field(an::STATUS_STATE);
                self.an.state = AnState::from_raw(raw);

                if raw == an::STATE_GOOD_CHECK {
                    self.an.complete_count += 1;
                    self.an.status = AnStatus::Complete;

                    self.an.lp_bp_adv_ability = self.read_ability(
                        an::MR_LP_BASE_PG_CAPABILITY_1,
                        an::MR_LP_BASE_PG_CAPABILITY_2,
                        an::MR_LP_BASE_PG_CAPABILITY_3,
                    );

                    // hand the datapath to the training block before the
                    // partner starts sending training frames
                    self.regs.write(lt::MAX_WAIT_TIMER, MAX_WAIT_TIMER_500MS);
                    self.regs.set_field(
                        tx_ctrl::CTRL_PMA_DATA,
                        tx_ctrl::PmaDataSelect::LinkTraining.value(),
                    );

                    self.resolve_fec();

                    self.lt.timer_start_ms = self.clock.now_ms();
                }
            }
        }
    }

    fn read_ability(
        &mut self,
        low: crate::register::Register,
        mid: crate::register::Register,
        high: crate::register::Register,
    ) -> u64 {
        u64::from(self.regs.read(low))
            | (u64::from(self.regs.read(mid)) << 16)
            | (u64::from(self.regs.read(high)) << 32)
    }

    /// FEC runs when both devices advertise the ability and at least one
    /// requests it
    fn resolve_fec(&mut self) {
        let ability = 1u64 << FEC_ABILITY_BIT;
        let requested = 1u64 << FEC_REQUESTED_BIT;

        if self.fec_configured
            && (self.an.lp_bp_adv_ability & ability) != 0
            && ((self.an.adv_ability & requested) != 0
                || (self.an.lp_bp_adv_ability & requested) != 0)
        {
            self.fec_negotiated = true;
        }
    }
}
