//! Receive-path status register block

use super::{Block, Field, Register};

/// Receive-path status
pub const STATUS: Register = Register::new(Block::RxStatus, 0x0);
/// Clause 49 PCS block lock (both bits set when locked)
pub const STATUS_BLOCK_LOCK: Field = Field::new(STATUS, 0x3 << 0, 0);

/// Value of [`STATUS_BLOCK_LOCK`] when the receive PCS is locked
pub const BLOCK_LOCK_LOCKED: u32 = 0x3;
