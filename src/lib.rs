//! 10GBASE-KR Backplane PHY Driver
//!
//! A `no_std`, `no_alloc` Rust driver for a 10GBASE-KR backplane Ethernet
//! PHY IP block, implementing the software half of IEEE 802.3 Clause 73
//! auto-negotiation and Clause 72 link training.
//!
//! # Architecture
//!
//! The driver is organized into three layers:
//!
//! 1. **Protocol Layer** ([`phy`]): the polled bring-up state machine,
//!    the Clause 73 and Clause 72 sub-machines and the link partner tap
//!    sweep engine
//! 2. **Register Layer** ([`register`]): typed registers and bitfields
//!    for the IP's four blocks, behind the [`PhyRegisterBus`] trait
//! 3. **Board Layer** ([`xcvr`], [`time`]): traits the board support
//!    code implements for the serdes transceiver and a millisecond clock
//!
//! # Bring-up Sequence
//!
//! Poll [`Phy10GBaseKr::step`] from a timer or main loop. Each call
//! advances the sequence: serdes configuration, DME page exchange,
//! serdes calibration at 10.3125 Gbps, training-frame tap calibration,
//! then link monitoring. Failures restart the sequence automatically;
//! the returned [`LinkStatus`] says where the machine is.
//!
//! # Features
//!
//! - `defmt`: defmt formatting for status and error types
//! - `critical-section`: ISR-safe [`sync::SharedPhy`] wrapper
//!
//! # Example
//!
//! ```ignore
//! use ph_10gbasekr_phy::{LinkStatus, MmioPhyRegs, Phy10GBaseKr, PhyConfig};
//!
//! // SAFETY: PHY IP register window mapped at this address
//! let regs = unsafe { MmioPhyRegs::new(0x4000_0000) };
//!
//! let config = PhyConfig::new().with_fec_request(true);
//! let mut phy = Phy10GBaseKr::new(regs, board_xcvr, systick, config)?;
//!
//! loop {
//!     match phy.step() {
//!         LinkStatus::LinkEstablished => break,
//!         status => log_status(status),
//!     }
//! }
//! ```

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; configuration is in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::similar_names,
    clippy::must_use_candidate,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_lossless,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports
)]

// =============================================================================
// Modules
// =============================================================================

pub mod config;
pub mod error;
pub mod phy;
pub mod register;
pub mod time;
pub mod xcvr;

#[cfg(any(feature = "critical-section", test))]
pub mod sync;

#[cfg(test)]
pub(crate) mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{LtInitialRequest, PhyConfig, TapConfig, TxEqTap};
pub use error::{ConfigError, Result};
pub use phy::{
    AnState, AnStatus, AutoNegotiation, CoeffStatus, CoeffUpdate, IpVersion, LinkStatus,
    LinkTraining, LtState, LtStatus, Phy10GBaseKr, PhyState, PrbsSamples, TapCalState, TapSweep,
};
pub use register::{MmioPhyRegs, PhyRegisterBus};
pub use time::TimeSource;
pub use xcvr::Xcvr;

/// Driver version, from the crate manifest
pub const DRIVER_VERSION: &str = env!("CARGO_PKG_VERSION");
