//! Driver configuration
//!
//! [`PhyConfig`] gathers everything programmed into the hardware at reset:
//! the transmit equalizer tap tables served to the link partner, the
//! initial Clause 72 request (PRESET or INITIALIZE) and whether FEC is
//! advertised. Defaults match a mainstream backplane channel; use the
//! `with_*` builders to adjust for a specific board.

use crate::error::{ConfigError, Result};

/// Main (c(0)) cursor upper limit
pub const MAIN_TAP_MAX: u32 = 41;
/// Main (c(0)) cursor lower limit
pub const MAIN_TAP_MIN: u32 = 26;
/// Post (c(+1)) cursor upper limit
pub const POST_TAP_MAX: u32 = 16;
/// Post (c(+1)) cursor lower limit
pub const POST_TAP_MIN: u32 = 0;
/// Pre (c(-1)) cursor upper limit
pub const PRE_TAP_MAX: u32 = 5;
/// Pre (c(-1)) cursor lower limit
pub const PRE_TAP_MIN: u32 = 0;

/// Transmit equalizer tap selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TxEqTap {
    /// Main cursor, c(0)
    Main,
    /// Post cursor, c(+1)
    Post,
    /// Pre cursor, c(-1)
    Pre,
}

/// Initial Clause 72 request transmitted to the link partner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LtInitialRequest {
    /// Request PRESET: partner starts at maximum taps, then sweep
    #[default]
    Preset,
    /// Request INITIALIZE: partner starts at its initialize taps
    Initialize,
}

/// Limit and starting-point table for one transmit equalizer tap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TapConfig {
    /// Upper limit reported to the link partner
    pub max: u32,
    /// Lower limit reported to the link partner
    pub min: u32,
    /// Value applied when the partner requests PRESET
    pub preset: u32,
    /// Value applied when the partner requests INITIALIZE
    pub initialize: u32,
}

impl TapConfig {
    /// Create a tap table with preset at `max` and initialize at `min`
    pub const fn new(max: u32, min: u32) -> Self {
        Self { max, min, preset: max, initialize: min }
    }

    /// Override the PRESET value
    pub const fn with_preset(mut self, preset: u32) -> Self {
        self.preset = preset;
        self
    }

    /// Override the INITIALIZE value
    pub const fn with_initialize(mut self, initialize: u32) -> Self {
        self.initialize = initialize;
        self
    }

    fn validate(&self, tap: TxEqTap) -> Result<()> {
        if self.max < self.min {
            return Err(ConfigError::TapLimitsInverted(tap));
        }
        if self.preset > self.max || self.preset < self.min {
            return Err(ConfigError::PresetOutOfRange(tap));
        }
        if self.initialize > self.max || self.initialize < self.min {
            return Err(ConfigError::InitializeOutOfRange(tap));
        }
        Ok(())
    }
}

/// PHY driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhyConfig {
    /// Main cursor table
    pub main: TapConfig,
    /// Post cursor table
    pub post: TapConfig,
    /// Pre cursor table
    pub pre: TapConfig,
    /// Initial request sent in the first coefficient update
    pub initial_request: LtInitialRequest,
    /// Advertise FEC ability and request its use
    pub fec_request: bool,
}

impl Default for PhyConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PhyConfig {
    /// Default configuration: full-range tap tables, PRESET, no FEC
    pub const fn new() -> Self {
        Self {
            main: TapConfig::new(MAIN_TAP_MAX, MAIN_TAP_MIN),
            post: TapConfig::new(POST_TAP_MAX, POST_TAP_MIN),
            pre: TapConfig::new(PRE_TAP_MAX, PRE_TAP_MIN),
            initial_request: LtInitialRequest::Preset,
            fec_request: false,
        }
    }

    /// Replace the main cursor table
    pub const fn with_main_tap(mut self, tap: TapConfig) -> Self {
        self.main = tap;
        self
    }

    /// Replace the post cursor table
    pub const fn with_post_tap(mut self, tap: TapConfig) -> Self {
        self.post = tap;
        self
    }

    /// Replace the pre cursor table
    pub const fn with_pre_tap(mut self, tap: TapConfig) -> Self {
        self.pre = tap;
        self
    }

    /// Set the initial Clause 72 request
    pub const fn with_initial_request(mut self, request: LtInitialRequest) -> Self {
        self.initial_request = request;
        self
    }

    /// Advertise and request FEC
    pub const fn with_fec_request(mut self, request: bool) -> Self {
        self.fec_request = request;
        self
    }

    /// Tap table for `tap`
    pub const fn tap(&self, tap: TxEqTap) -> &TapConfig {
        match tap {
            TxEqTap::Main => &self.main,
            TxEqTap::Post => &self.post,
            TxEqTap::Pre => &self.pre,
        }
    }

    /// Validate the tap tables
    ///
    /// The FEC request flag needs no validation: on a hardware build
    /// without FEC logic the advertisement bits are forced clear
    /// instead.
    pub fn validate(&self) -> Result<()> {
        self.main.validate(TxEqTap::Main)?;
        self.post.validate(TxEqTap::Post)?;
        self.pre.validate(TxEqTap::Pre)?;
        Ok(())
    }
}
