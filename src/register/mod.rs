//! Memory-mapped register definitions for the 10GBASE-KR PHY IP
//!
//! The IP exposes four register blocks inside one memory window:
//! auto-negotiation (Clause 73), link training (Clause 72), transmit-path
//! control, and receive-path status. This module provides type-safe access
//! to them: a [`Register`] names a 32-bit register by block and offset, a
//! [`Field`] names a bitfield inside a register by mask and shift, and the
//! [`PhyRegisterBus`] trait carries the actual access so that the protocol
//! state machines never manipulate raw addresses or masks directly.
//!
//! [`MmioPhyRegs`] is the hardware implementation; all of its accesses are
//! volatile to ensure proper hardware interaction. Tests substitute a mock
//! bus implementing the same trait.

pub mod an;
pub mod lt;
pub mod rx_status;
pub mod tx_ctrl;

/// Auto-negotiation block offset from the IP base address
pub const AN_BLOCK_OFFSET: usize = 0x0 << 8;

/// Link-training block offset from the IP base address
pub const LT_BLOCK_OFFSET: usize = 0x4 << 8;

/// Transmit-path control block offset from the IP base address
pub const TX_CTRL_BLOCK_OFFSET: usize = 0x8 << 8;

/// Receive-path status block offset from the IP base address
pub const RX_STATUS_BLOCK_OFFSET: usize = 0x9 << 8;

/// The four register blocks exposed by the PHY IP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Block {
    /// Clause 73 auto-negotiation control/status/ability
    An,
    /// Clause 72 link-training control/status/tap registers
    Lt,
    /// Transmit-path control (datapath select, LOS mode, soft reset)
    TxCtrl,
    /// Receive-path status (block lock)
    RxStatus,
}

impl Block {
    /// Byte offset of this block from the IP base address
    pub const fn offset(self) -> usize {
        match self {
            Block::An => AN_BLOCK_OFFSET,
            Block::Lt => LT_BLOCK_OFFSET,
            Block::TxCtrl => TX_CTRL_BLOCK_OFFSET,
            Block::RxStatus => RX_STATUS_BLOCK_OFFSET,
        }
    }
}

/// One 32-bit register, named by block and byte offset within the block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register {
    /// Register block this register belongs to
    pub block: Block,
    /// Byte offset within the block
    pub offset: usize,
}

impl Register {
    /// Create a register descriptor
    pub const fn new(block: Block, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// One named bitfield within a register: positioned mask plus shift
///
/// Replaces raw offset/mask/shift triples so callers get one `get`/`set`
/// per named field instead of open-coded mask arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Field {
    /// Register this field lives in
    pub reg: Register,
    /// Positioned mask (already shifted into place)
    pub mask: u32,
    /// Bit position of the field's LSB
    pub shift: u32,
}

impl Field {
    /// Create a field descriptor
    pub const fn new(reg: Register, mask: u32, shift: u32) -> Self {
        Self { reg, mask, shift }
    }

    /// Extract this field from a raw register value
    pub const fn get(self, raw: u32) -> u32 {
        (raw & self.mask) >> self.shift
    }

    /// Insert `value` into `raw` at this field's position
    pub const fn set(self, raw: u32, value: u32) -> u32 {
        (raw & !self.mask) | ((value << self.shift) & self.mask)
    }

    /// Test this field against a raw register value (non-zero = set)
    pub const fn is_set(self, raw: u32) -> bool {
        raw & self.mask != 0
    }
}

// =============================================================================
// Register Bus Trait
// =============================================================================

/// Trait for PHY register access
///
/// This trait can be implemented by different backends, allowing the
/// protocol state machines to run against memory-mapped hardware or a
/// mock register file in host tests.
pub trait PhyRegisterBus {
    /// Read a 32-bit register
    fn read(&mut self, reg: Register) -> u32;

    /// Write a 32-bit register
    fn write(&mut self, reg: Register, value: u32);

    /// Read one named field
    fn field(&mut self, f: Field) -> u32 {
        f.get(self.read(f.reg))
    }

    /// Read-modify-write one named field
    fn set_field(&mut self, f: Field, value: u32) {
        let raw = self.read(f.reg);
        self.write(f.reg, f.set(raw, value));
    }
}

// =============================================================================
// MMIO Implementation
// =============================================================================

/// Volatile MMIO register bus over the PHY IP's base address
///
/// The base address is captured once at construction and treated as an
/// opaque handle thereafter; the rest of the driver only ever names
/// registers through [`Register`] descriptors.
#[derive(Debug)]
pub struct MmioPhyRegs {
    base: usize,
}

impl MmioPhyRegs {
    /// Create a register bus for the PHY IP mapped at `base`
    ///
    /// # Safety
    ///
    /// `base` must be the physical base address of a 10GBASE-KR PHY IP
    /// register window, mapped, aligned, and not concurrently driven by
    /// any other bus master or driver instance.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    const fn addr(&self, reg: Register) -> usize {
        self.base + reg.block.offset() + reg.offset
    }
}

impl PhyRegisterBus for MmioPhyRegs {
    #[inline(always)]
    fn read(&mut self, reg: Register) -> u32 {
        // SAFETY: construction guarantees the window is mapped and aligned
        unsafe { core::ptr::read_volatile(self.addr(reg) as *const u32) }
    }

    #[inline(always)]
    fn write(&mut self, reg: Register, value: u32) {
        // SAFETY: construction guarantees the window is mapped and aligned
        unsafe { core::ptr::write_volatile(self.addr(reg) as *mut u32, value) }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
