//! Transceiver abstraction
//!
//! The PHY IP drives the protocol but the serdes itself belongs to the
//! FPGA transceiver block. This trait is the seam between the two: the
//! driver asks for data-rate changes, calibration and tap updates, and
//! the board support code maps those onto the actual transceiver.
//!
//! Calibration methods are split into a start call and a completion
//! poll so the driver can bound every calibration with its own timeout
//! instead of blocking inside the transceiver layer.

/// Serdes transceiver operations required by the PHY driver
pub trait Xcvr {
    /// One-time transceiver bring-up
    fn init(&mut self);

    /// Configure the lane for Clause 73 DME page exchange
    fn auto_neg_data_rate(&mut self);

    /// Configure the lane for 10.3125 Gbps training and mission data
    fn link_training_data_rate(&mut self);

    /// Receiver CDR locked to incoming data
    fn cdr_locked(&mut self) -> bool;

    /// Start continuous-time linear equalizer calibration
    fn start_ctle_cal(&mut self);

    /// CTLE calibration complete
    fn ctle_cal_done(&mut self) -> bool;

    /// Start decision feedback equalizer calibration
    fn start_dfe_cal(&mut self);

    /// DFE calibration complete
    fn dfe_cal_done(&mut self) -> bool;

    /// Reset the receiver PCS datapath
    ///
    /// Issued after every DFE calibration attempt, completed or timed
    /// out, so the receiver restarts cleanly on the calibrated settings.
    fn reset_rx(&mut self);

    /// Apply a local transmit equalizer update
    ///
    /// `main` is an absolute setting; `post` and `pre` are signed
    /// coefficients (zero or negative for this IP's tap ranges).
    fn apply_tx_taps(&mut self, main: u32, post: i32, pre: i32);
}
