//! Clause 72 link-training register block
//!
//! Training control, the tap limit/preset/initialize tables the hardware
//! serves to the link partner, the received coefficient-update decode, the
//! transmit coefficient-update signalling bits and the PRBS error counter.

use super::{Block, Field, Register};

const fn reg(offset: usize) -> Register {
    Register::new(Block::Lt, offset)
}

/// Link-training control
pub const CTRL: Register = reg(0x0 << 2);
/// Enable training restart on link failure
pub const CTRL_RESTART_EN: Field = Field::new(CTRL, 1 << 0, 0);
/// Transmit a PRESET request in the first coefficient update
pub const CTRL_PRESET: Field = Field::new(CTRL, 1 << 2, 2);
/// Transmit an INITIALIZE request in the first coefficient update
pub const CTRL_INIT: Field = Field::new(CTRL, 1 << 3, 3);

/// Hardware max-wait timer terminal count
pub const MAX_WAIT_TIMER: Register = reg(0x1 << 2);

/// Local tap value applied on a received PRESET, main cursor
pub const PRESET_MAIN_TAP: Register = reg(0x3 << 2);
/// Local tap value applied on a received PRESET, post cursor
pub const PRESET_POST_TAP: Register = reg(0x4 << 2);
/// Local tap value applied on a received PRESET, pre cursor
pub const PRESET_PRE_TAP: Register = reg(0x5 << 2);

/// Local tap value applied on a received INITIALIZE, main cursor
pub const INIT_MAIN_TAP: Register = reg(0x6 << 2);
/// Local tap value applied on a received INITIALIZE, post cursor
pub const INIT_POST_TAP: Register = reg(0x7 << 2);
/// Local tap value applied on a received INITIALIZE, pre cursor
pub const INIT_PRE_TAP: Register = reg(0x8 << 2);

/// Main tap upper limit
pub const MAX_MAIN_TAP: Register = reg(0x9 << 2);
/// Main tap lower limit
pub const MIN_MAIN_TAP: Register = reg(0xA << 2);
/// Post tap upper limit
pub const MAX_POST_TAP: Register = reg(0xB << 2);
/// Post tap lower limit
pub const MIN_POST_TAP: Register = reg(0xC << 2);
/// Pre tap upper limit
pub const MAX_PRE_TAP: Register = reg(0xD << 2);
/// Pre tap lower limit
pub const MIN_PRE_TAP: Register = reg(0xE << 2);

/// Local transmit equalization done handshake
pub const TX_EQUAL: Register = reg(0xF << 2);
/// All requested tap updates applied
pub const TX_EQUAL_DONE: Field = Field::new(TX_EQUAL, 1 << 0, 0);
/// Main tap update applied
pub const TX_EQUAL_MAIN_DONE: Field = Field::new(TX_EQUAL, 1 << 1, 1);
/// Post tap update applied
pub const TX_EQUAL_POST_DONE: Field = Field::new(TX_EQUAL, 1 << 2, 2);
/// Pre tap update applied
pub const TX_EQUAL_PRE_DONE: Field = Field::new(TX_EQUAL, 1 << 3, 3);

/// Local receiver ready handshake
pub const LOCAL_RCVR_LOCK: Register = reg(0x10 << 2);
/// Local receiver trained and locked
pub const LOCAL_RCVR_LOCKED: Field = Field::new(LOCAL_RCVR_LOCK, 1 << 0, 0);

/// Requested new main tap value from the last coefficient update
pub const TX_NEW_MAIN_TAP: Register = reg(0x11 << 2);
/// Requested new post tap value from the last coefficient update
pub const TX_NEW_POST_TAP: Register = reg(0x12 << 2);
/// Requested new pre tap value from the last coefficient update
pub const TX_NEW_PRE_TAP: Register = reg(0x13 << 2);
/// New-tap registers carry an 8-bit value
pub const TX_NEW_TAP_MASK: u32 = 0xFF;

/// Hardware training state machine status
pub const TRAINING_SM_STATUS: Register = reg(0x14 << 2);
/// Current hardware training state
pub const TRAINING_SM: Field = Field::new(TRAINING_SM_STATUS, 0x7, 0);

/// Received coefficient-update decode
pub const RCVD_COEFF_STATUS: Register = reg(0x16 << 2);
/// Raw received coefficient-update word
pub const RCVD_COEFF_NEW: Field = Field::new(RCVD_COEFF_STATUS, 0xFFFF << 16, 16);
/// Received update request for the pre cursor
pub const RCVD_COEFF_PRE_VALUE: Field = Field::new(RCVD_COEFF_STATUS, 0x3 << 0, 0);
/// Received update request for the main cursor
pub const RCVD_COEFF_MAIN_VALUE: Field = Field::new(RCVD_COEFF_STATUS, 0x3 << 2, 2);
/// Received update request for the post cursor
pub const RCVD_COEFF_POST_VALUE: Field = Field::new(RCVD_COEFF_STATUS, 0x3 << 4, 4);

/// INITIALIZE bit within the raw coefficient-update word
pub const RCVD_COEFF_INITIALIZE: u32 = 1 << 12;
/// PRESET bit within the raw coefficient-update word
pub const RCVD_COEFF_PRESET: u32 = 1 << 13;

/// Transmit coefficient-update signalling
pub const TX_COEFF_CFG: Register = reg(0x18 << 2);
/// Request the link partner increment its main tap
pub const TX_COEFF_MAIN_INC: Field = Field::new(TX_COEFF_CFG, 1 << 0, 0);
/// Request the link partner decrement its main tap
pub const TX_COEFF_MAIN_DEC: Field = Field::new(TX_COEFF_CFG, 1 << 1, 1);
/// Hold the link partner's main tap
pub const TX_COEFF_MAIN_HOLD: Field = Field::new(TX_COEFF_CFG, 1 << 2, 2);
/// Request the link partner increment its post tap
pub const TX_COEFF_POST_INC: Field = Field::new(TX_COEFF_CFG, 1 << 4, 4);
/// Request the link partner decrement its post tap
pub const TX_COEFF_POST_DEC: Field = Field::new(TX_COEFF_CFG, 1 << 5, 5);
/// Hold the link partner's post tap
pub const TX_COEFF_POST_HOLD: Field = Field::new(TX_COEFF_CFG, 1 << 6, 6);
/// Request the link partner increment its pre tap
pub const TX_COEFF_PRE_INC: Field = Field::new(TX_COEFF_CFG, 1 << 8, 8);
/// Request the link partner decrement its pre tap
pub const TX_COEFF_PRE_DEC: Field = Field::new(TX_COEFF_CFG, 1 << 9, 9);
/// Hold the link partner's pre tap
pub const TX_COEFF_PRE_HOLD: Field = Field::new(TX_COEFF_CFG, 1 << 10, 10);

/// PRBS error word, accumulated bit errors since last read
pub const PRBS_ERR_WRD: Register = reg(0x1F << 2);

/// Link-training status
pub const STATUS: Register = reg(0x26 << 2);
/// Arbitration reached AN_GOOD_CHECK
pub const STATUS_AN_GOOD_CHECK: Field = Field::new(STATUS, 1 << 0, 0);
/// Training frame lock achieved
pub const STATUS_FRAME_LOCK: Field = Field::new(STATUS, 1 << 1, 1);
/// Hardware requests receiver calibration
pub const STATUS_REQ_RX_CAL: Field = Field::new(STATUS, 1 << 2, 2);
/// Hardware max-wait timer expired
pub const STATUS_TRAINING_FAIL: Field = Field::new(STATUS, 1 << 3, 3);
/// Both receivers trained, link partner signals ready
pub const STATUS_SIGNAL_DETECT: Field = Field::new(STATUS, 1 << 4, 4);
/// A coefficient update arrived for the local transmitter
pub const STATUS_REQ_TX_EQUAL: Field = Field::new(STATUS, 1 << 5, 5);
/// Receiver calibration complete acknowledge
pub const STATUS_RX_CAL_DONE: Field = Field::new(STATUS, 1 << 6, 6);
