//! Transmit-path control register block
//!
//! Datapath source select, transceiver LOS mode, soft resets, IP version
//! readback and the core hardware configuration word.

use super::{Block, Field, Register};

const fn reg(offset: usize) -> Register {
    Register::new(Block::TxCtrl, offset)
}

/// Transmit-path control
pub const CTRL: Register = reg(0x0 << 2);
/// PCS transmit datapath source
pub const CTRL_PMA_DATA: Field = Field::new(CTRL, 0x3 << 0, 0);
/// Transceiver loss-of-signal mode (1 = lock to reference)
pub const CTRL_XCVR_LOS: Field = Field::new(CTRL, 1 << 4, 4);
/// Transmit-path soft reset (self-clearing)
pub const CTRL_TX_RESET: Field = Field::new(CTRL, 1 << 5, 5);
/// Receive-path soft reset (self-clearing)
pub const CTRL_RX_RESET: Field = Field::new(CTRL, 1 << 6, 6);

/// IP version readback
pub const IP_VERSION: Register = reg(0x1 << 2);
/// Major version
pub const IP_VERSION_MAJOR: Field = Field::new(IP_VERSION, 0xFFFF << 16, 16);
/// Minor version
pub const IP_VERSION_MINOR: Field = Field::new(IP_VERSION, 0xFF << 8, 8);
/// Sub version
pub const IP_VERSION_SUB: Field = Field::new(IP_VERSION, 0xFF, 0);

/// Core hardware configuration word
pub const CORE_CFG: Register = reg(0x2 << 2);
/// FEC logic present in this hardware build
pub const CORE_CFG_FEC_PRESENT: Field = Field::new(CORE_CFG, 1 << 8, 8);

/// PCS transmit datapath source values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PmaDataSelect {
    /// Mission-mode data from the MAC
    Data = 0,
    /// Clause 73 DME pages
    AutoNegotiation = 2,
    /// Clause 72 training frames
    LinkTraining = 3,
}

impl PmaDataSelect {
    /// Register encoding of this datapath source
    pub const fn value(self) -> u32 {
        self as u32
    }
}

/// Transceiver LOS mode: lock receiver CDR to local reference clock
pub const XCVR_LOS_LOCK_TO_REF: u32 = 1;
/// Transceiver LOS mode: lock receiver CDR to incoming data
pub const XCVR_LOS_LOCK_TO_DATA: u32 = 0;
