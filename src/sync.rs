//! ISR-safe sharing for a statically allocated driver instance
//!
//! [`SharedPhy`] wraps a driver in `critical_section::Mutex` + `RefCell`
//! so that a periodic timer interrupt can poll the bring-up state machine
//! while main-line code inspects link status. The critical section
//! implementation comes from the target's HAL crate.
//!
//! Unlike the driver itself, the wrapper starts empty: construction talks
//! to hardware and cannot run in a `static` initializer. Install the
//! instance with [`SharedPhy::init`] once the hardware is up.
//!
//! ```ignore
//! static PHY: SharedPhy<MmioPhyRegs, BoardXcvr, SysTick> = SharedPhy::new();
//!
//! fn main() {
//!     let phy = Phy10GBaseKr::new(regs, xcvr, clock, PhyConfig::new()).unwrap();
//!     PHY.init(phy);
//!
//!     loop {
//!         if PHY.with(|phy| phy.link_established()) == Some(true) {
//!             break;
//!         }
//!     }
//! }
//!
//! #[interrupt]
//! fn TIMER0() {
//!     PHY.with(|phy| phy.step());
//! }
//! ```

use core::cell::RefCell;

use critical_section::Mutex;

use crate::phy::Phy10GBaseKr;
use crate::register::PhyRegisterBus;
use crate::time::TimeSource;
use crate::xcvr::Xcvr;

/// ISR-safe wrapper around a driver instance
pub struct SharedPhy<B, X, T> {
    inner: Mutex<RefCell<Option<Phy10GBaseKr<B, X, T>>>>,
}

impl<B, X, T> SharedPhy<B, X, T>
where
    B: PhyRegisterBus,
    X: Xcvr,
    T: TimeSource,
{
    /// Create an empty wrapper, suitable for static initialization
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Install a driver instance, returning the previous one if any
    pub fn init(&self, phy: Phy10GBaseKr<B, X, T>) -> Option<Phy10GBaseKr<B, X, T>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(phy))
    }

    /// Run `f` with exclusive access to the driver inside a critical
    /// section
    ///
    /// Returns `None` if no instance has been installed yet.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Phy10GBaseKr<B, X, T>) -> R,
    {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).as_mut().map(f))
    }

    /// Remove and return the installed driver instance
    pub fn take(&self) -> Option<Phy10GBaseKr<B, X, T>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }
}

impl<B, X, T> Default for SharedPhy<B, X, T>
where
    B: PhyRegisterBus,
    X: Xcvr,
    T: TimeSource,
{
    fn default() -> Self {
        Self::new()
    }
}
