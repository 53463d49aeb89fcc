//! Success/failure indicator lines.
//!
//! Any [`OutputPin`] can drive an indicator: GPIO pins on the board, or
//! logging pins when running without hardware.

use std::time::Duration;

use embedded_hal::digital::OutputPin;

/// How long an indicator stays high for one pulse.
pub const PULSE_DURATION: Duration = Duration::from_secs(1);

/// The two indicator lines.
///
/// Both lines are driven low when this value is released or dropped, so the
/// outputs end in a safe state on every exit path.
pub struct Indicators<P: OutputPin> {
    success: P,
    failure: P,
}

impl<P: OutputPin> Indicators<P> {
    /// Take ownership of the lines and drive both low.
    pub fn new(success: P, failure: P) -> Self {
        let mut indicators = Self { success, failure };
        indicators.release();
        indicators
    }

    /// Drive the success line (or the failure line) high for [`PULSE_DURATION`].
    ///
    /// Exactly one line is touched per call.
    pub async fn pulse(&mut self, success: bool) {
        let (name, pin) = if success {
            ("success", &mut self.success)
        } else {
            ("failure", &mut self.failure)
        };

        if let Err(e) = pin.set_high() {
            log::error!("Failed to raise {name} indicator: {e:?}");
        }
        tokio::time::sleep(PULSE_DURATION).await;
        if let Err(e) = pin.set_low() {
            log::error!("Failed to lower {name} indicator: {e:?}");
        }
    }

    /// Drive both lines low.
    pub fn release(&mut self) {
        if let Err(e) = self.success.set_low() {
            log::error!("Failed to release success indicator: {e:?}");
        }
        if let Err(e) = self.failure.set_low() {
            log::error!("Failed to release failure indicator: {e:?}");
        }
        log::debug!("Indicator outputs released");
    }
}

impl<P: OutputPin> Drop for Indicators<P> {
    fn drop(&mut self) {
        self.release();
    }
}
