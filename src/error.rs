//! Driver error types

use crate::config::TxEqTap;

/// Result type for driver operations
pub type Result<T> = core::result::Result<T, ConfigError>;

/// Configuration rejected at driver construction
///
/// Everything after construction is reported through link status
/// regressions rather than errors: a training timeout or a dropped link
/// restarts the bring-up sequence, it does not fail an API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// A tap's maximum limit is below its minimum limit
    TapLimitsInverted(TxEqTap),
    /// A tap's preset value falls outside its limits
    PresetOutOfRange(TxEqTap),
    /// A tap's initialize value falls outside its limits
    InitializeOutOfRange(TxEqTap),
}

impl ConfigError {
    /// Static description of the error
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::TapLimitsInverted(_) => "tap maximum limit below minimum limit",
            ConfigError::PresetOutOfRange(_) => "tap preset value outside configured limits",
            ConfigError::InitializeOutOfRange(_) => "tap initialize value outside configured limits",
        }
    }
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let (ConfigError::TapLimitsInverted(tap)
        | ConfigError::PresetOutOfRange(tap)
        | ConfigError::InitializeOutOfRange(tap)) = self;
        write!(f, "{} ({:?} tap)", self.as_str(), tap)
    }
}

impl core::error::Error for ConfigError {}
