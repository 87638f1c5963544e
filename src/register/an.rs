//! Clause 73 auto-negotiation register block
//!
//! Control, arbitration status, the link-fail-inhibit timer and the
//! advertised/link-partner base-page ability words. Ability bits 0..47
//! are spread across three 16-bit capability registers, low word first.

use super::{Block, Field, Register};

const fn reg(offset: usize) -> Register {
    Register::new(Block::An, offset)
}

/// Auto-negotiation control
pub const CONTROL: Register = reg(0x0 << 2);
/// Restart auto-negotiation (self-clearing)
pub const CONTROL_RESTART: Field = Field::new(CONTROL, 1 << 9, 9);
/// Enable the auto-negotiation function
pub const CONTROL_ENABLE: Field = Field::new(CONTROL, 1 << 12, 12);
/// Reset the auto-negotiation function (self-clearing)
pub const CONTROL_RESET: Field = Field::new(CONTROL, 1 << 15, 15);

/// Auto-negotiation status
pub const STATUS: Register = reg(0x1 << 2);
/// Current arbitration state machine state
pub const STATUS_STATE: Field = Field::new(STATUS, 0xF << 12, 12);

/// Link-fail-inhibit timer, in milliseconds
pub const LINK_FAIL_INHIBIT_TIMER: Register = reg(0xD << 2);

/// Advertised ability bits 15:0
pub const MR_ADV_CAPABILITY_1: Register = reg(0x10 << 2);
/// Advertised ability bits 31:16
pub const MR_ADV_CAPABILITY_2: Register = reg(0x11 << 2);
/// Advertised ability bits 47:32
pub const MR_ADV_CAPABILITY_3: Register = reg(0x12 << 2);

/// FEC ability, ability bit 46, within capability word 3
pub const ADV_FEC_ABILITY: Field = Field::new(MR_ADV_CAPABILITY_3, 1 << 14, 14);
/// FEC requested, ability bit 47, within capability word 3
pub const ADV_FEC_REQUESTED: Field = Field::new(MR_ADV_CAPABILITY_3, 1 << 15, 15);

/// Link partner base-page ability bits 15:0
pub const MR_LP_BASE_PG_CAPABILITY_1: Register = reg(0x13 << 2);
/// Link partner base-page ability bits 31:16
pub const MR_LP_BASE_PG_CAPABILITY_2: Register = reg(0x14 << 2);
/// Link partner base-page ability bits 47:32
pub const MR_LP_BASE_PG_CAPABILITY_3: Register = reg(0x15 << 2);

/// Link partner FEC ability, ability bit 46
pub const LP_FEC_ABILITY: Field = Field::new(MR_LP_BASE_PG_CAPABILITY_3, 1 << 14, 14);
/// Link partner FEC requested, ability bit 47
pub const LP_FEC_REQUESTED: Field = Field::new(MR_LP_BASE_PG_CAPABILITY_3, 1 << 15, 15);

/// Arbitration state AN_GOOD_CHECK, negotiation resolved
pub const STATE_GOOD_CHECK: u32 = 0x5;
