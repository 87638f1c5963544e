//! Test doubles for host-side unit tests
//!
//! The driver owns its register bus, transceiver and clock, so each mock
//! hands out cheap clones sharing interior state. Tests keep one clone to
//! poke registers, flip transceiver conditions and move time between
//! driver polls.

extern crate std;

use core::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::vec::Vec;

use crate::register::{Field, PhyRegisterBus, Register};
use crate::time::TimeSource;
use crate::xcvr::Xcvr;

// =============================================================================
// Mock Register Bus
// =============================================================================

#[derive(Debug, Default)]
struct RegState {
    values: HashMap<Register, u32>,
    writes: Vec<(Register, u32)>,
}

/// In-memory register file with a write log
///
/// Reads of untouched registers return zero. Test-side pokes through
/// [`set`](MockPhyRegs::set) and [`set_bits`](MockPhyRegs::set_bits)
/// bypass the write log; only driver writes are recorded.
#[derive(Debug, Clone, Default)]
pub(crate) struct MockPhyRegs {
    state: Rc<RefCell<RegState>>,
}

impl MockPhyRegs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Poke a raw register value from the test side
    pub(crate) fn set(&self, reg: Register, value: u32) {
        self.state.borrow_mut().values.insert(reg, value);
    }

    /// Poke one field from the test side
    pub(crate) fn set_bits(&self, field: Field, value: u32) {
        let mut state = self.state.borrow_mut();
        let raw = state.values.get(&field.reg).copied().unwrap_or(0);
        state.values.insert(field.reg, field.set(raw, value));
    }

    /// Current raw value of a register
    pub(crate) fn get(&self, reg: Register) -> u32 {
        self.state.borrow().values.get(&reg).copied().unwrap_or(0)
    }

    /// Driver writes in order, oldest first
    pub(crate) fn writes(&self) -> Vec<(Register, u32)> {
        self.state.borrow().writes.clone()
    }

    /// Forget recorded driver writes
    pub(crate) fn clear_writes(&self) {
        self.state.borrow_mut().writes.clear();
    }
}

impl PhyRegisterBus for MockPhyRegs {
    fn read(&mut self, reg: Register) -> u32 {
        self.state.borrow().values.get(&reg).copied().unwrap_or(0)
    }

    fn write(&mut self, reg: Register, value: u32) {
        let mut state = self.state.borrow_mut();
        state.values.insert(reg, value);
        state.writes.push((reg, value));
    }
}

// =============================================================================
// Mock Transceiver
// =============================================================================

#[derive(Debug)]
struct XcvrState {
    cdr_locked: bool,
    ctle_polls_remaining: u32,
    dfe_polls_remaining: u32,
    init_calls: u32,
    auto_neg_rate_calls: u32,
    lt_rate_calls: u32,
    ctle_cal_calls: u32,
    dfe_cal_calls: u32,
    rx_reset_calls: u32,
    applied_taps: Vec<(u32, i32, i32)>,
}

impl Default for XcvrState {
    fn default() -> Self {
        Self {
            cdr_locked: true,
            ctle_polls_remaining: 0,
            dfe_polls_remaining: 0,
            init_calls: 0,
            auto_neg_rate_calls: 0,
            lt_rate_calls: 0,
            ctle_cal_calls: 0,
            dfe_cal_calls: 0,
            rx_reset_calls: 0,
            applied_taps: Vec::new(),
        }
    }
}

/// Scriptable transceiver: locked and instantly calibrated by default
#[derive(Debug, Clone, Default)]
pub(crate) struct MockXcvr {
    state: Rc<RefCell<XcvrState>>,
}

impl MockXcvr {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn set_cdr_locked(&self, locked: bool) {
        self.state.borrow_mut().cdr_locked = locked;
    }

    /// CTLE calibration reports busy for the next `polls` status checks
    #[allow(dead_code)]
    pub(crate) fn set_ctle_polls(&self, polls: u32) {
        self.state.borrow_mut().ctle_polls_remaining = polls;
    }

    /// DFE calibration reports busy for the next `polls` status checks
    pub(crate) fn set_dfe_polls(&self, polls: u32) {
        self.state.borrow_mut().dfe_polls_remaining = polls;
    }

    pub(crate) fn init_calls(&self) -> u32 {
        self.state.borrow().init_calls
    }

    pub(crate) fn auto_neg_rate_calls(&self) -> u32 {
        self.state.borrow().auto_neg_rate_calls
    }

    pub(crate) fn lt_rate_calls(&self) -> u32 {
        self.state.borrow().lt_rate_calls
    }

    pub(crate) fn dfe_cal_calls(&self) -> u32 {
        self.state.borrow().dfe_cal_calls
    }

    pub(crate) fn rx_reset_calls(&self) -> u32 {
        self.state.borrow().rx_reset_calls
    }

    /// Tap updates applied to the local transmitter, in order
    pub(crate) fn applied_taps(&self) -> Vec<(u32, i32, i32)> {
        self.state.borrow().applied_taps.clone()
    }
}

impl Xcvr for MockXcvr {
    fn init(&mut self) {
        self.state.borrow_mut().init_calls += 1;
    }

    fn auto_neg_data_rate(&mut self) {
        self.state.borrow_mut().auto_neg_rate_calls += 1;
    }

    fn link_training_data_rate(&mut self) {
        self.state.borrow_mut().lt_rate_calls += 1;
    }

    fn cdr_locked(&mut self) -> bool {
        self.state.borrow().cdr_locked
    }

    fn start_ctle_cal(&mut self) {
        self.state.borrow_mut().ctle_cal_calls += 1;
    }

    fn ctle_cal_done(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.ctle_polls_remaining > 0 {
            state.ctle_polls_remaining -= 1;
            false
        } else {
            true
        }
    }

    fn start_dfe_cal(&mut self) {
        self.state.borrow_mut().dfe_cal_calls += 1;
    }

    fn dfe_cal_done(&mut self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.dfe_polls_remaining > 0 {
            state.dfe_polls_remaining -= 1;
            false
        } else {
            true
        }
    }

    fn reset_rx(&mut self) {
        self.state.borrow_mut().rx_reset_calls += 1;
    }

    fn apply_tx_taps(&mut self, main: u32, post: i32, pre: i32) {
        self.state.borrow_mut().applied_taps.push((main, post, pre));
    }
}

// =============================================================================
// Fake Clock
// =============================================================================

/// Manually advanced clock
///
/// `auto_tick` makes every reading advance time, which lets the driver's
/// bounded spin loops run to their timeout in tests.
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeClock {
    state: Rc<Cell<(u32, u32)>>,
}

impl FakeClock {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn advance(&self, ms: u32) {
        let (now, tick) = self.state.get();
        self.state.set((now.wrapping_add(ms), tick));
    }

    pub(crate) fn set_auto_tick(&self, ms: u32) {
        let (now, _) = self.state.get();
        self.state.set((now, ms));
    }
}

impl TimeSource for FakeClock {
    fn now_ms(&mut self) -> u32 {
        let (now, tick) = self.state.get();
        self.state.set((now.wrapping_add(tick), tick));
        now
    }
}
