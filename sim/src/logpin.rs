use std::convert::Infallible;

use embedded_hal::digital::{ErrorType, OutputPin};

/// An indicator line that prints its level changes instead of driving hardware.
pub struct LogPin {
    name: &'static str,
    high: bool,
}

impl LogPin {
    pub fn new(name: &'static str) -> Self {
        Self { name, high: false }
    }

    fn set(&mut self, high: bool) {
        if self.high != high {
            log::info!("{} LED {}", self.name, if high { "on" } else { "off" });
        }
        self.high = high;
    }
}

impl ErrorType for LogPin {
    type Error = Infallible;
}

impl OutputPin for LogPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.set(true);
        Ok(())
    }
}

#[test]
fn test_log_pin_tracks_level() {
    let mut pin = LogPin::new("green");
    pin.set_high().unwrap();
    assert!(pin.high);
    pin.set_low().unwrap();
    assert!(!pin.high);
}
