use std::time::{Duration, Instant};

use heat_alert_common::model::Reading;
use heat_alert_common::sensor::{decode_frame, frame_from_pulses, FRAME_BITS};
use heat_alert_common::{SensorError, SensorModel, SensorReader};
use rppal::gpio::{Gpio, IoPin, Level, Mode, Bias};

/// DHT11/DHT22 on a single GPIO line, bit-banged from user space.
pub struct Dht {
    pin: IoPin,
    model: SensorModel,
    last_read: Option<Instant>,
}

impl Dht {
    // Limits in microseconds, with some slack for scheduling jitter
    const RESPONSE_TIMEOUT_US: u32 = 100;
    const BIT_LOW_TIMEOUT_US: u32 = 80;
    const BIT_HIGH_TIMEOUT_US: u32 = 100;

    pub fn new(gpio: &Gpio, bcm_pin: u8, model: SensorModel) -> Result<Self, rppal::gpio::Error> {
        let mut pin = gpio.get(bcm_pin)?.into_io(Mode::Input);
        pin.set_bias(Bias::PullUp);

        Ok(Self {
            pin,
            model,
            last_read: None,
        })
    }

    /// Microseconds the line stays at `level`, or a timeout after `max_wait_us`.
    fn level_duration(&self, level: Level, max_wait_us: u32) -> Result<u32, SensorError> {
        let start = Instant::now();
        let limit = Duration::from_micros(max_wait_us.into());

        while self.pin.read() == level {
            if start.elapsed() > limit {
                return Err(SensorError::Timeout);
            }
            std::hint::spin_loop();
        }

        Ok(start.elapsed().as_micros() as u32)
    }

    fn transmit(&mut self) -> Result<[u8; 5], SensorError> {
        // pull down to wake the sensor up
        self.pin.set_mode(Mode::Output);
        self.pin.set_low();
        spin(self.model.start_signal());

        // release and listen
        self.pin.set_high();
        spin(Duration::from_micros(30));
        self.pin.set_mode(Mode::Input);

        // == the sensor answers with 80 us low, then 80 us high ====
        self.level_duration(Level::High, Self::RESPONSE_TIMEOUT_US)?;
        self.level_duration(Level::Low, Self::RESPONSE_TIMEOUT_US)?;
        self.level_duration(Level::High, Self::RESPONSE_TIMEOUT_US)?;

        // == 40 data bits, each a ~50 us low followed by a coded high ====
        let mut high_widths = [0u32; FRAME_BITS];
        for width in high_widths.iter_mut() {
            self.level_duration(Level::Low, Self::BIT_LOW_TIMEOUT_US)?;
            *width = self.level_duration(Level::High, Self::BIT_HIGH_TIMEOUT_US)?;
        }

        Ok(frame_from_pulses(&high_widths))
    }

    /// Wait until the sensor is ready for another transmission.
    fn respect_min_interval(&self) {
        if let Some(last_read) = self.last_read {
            let elapsed = last_read.elapsed();
            let min_interval = self.model.min_read_interval();
            if elapsed < min_interval {
                std::thread::sleep(min_interval - elapsed);
            }
        }
    }
}

impl SensorReader for Dht {
    fn read(&mut self) -> Result<Reading, SensorError> {
        self.respect_min_interval();

        let frame = self.transmit();
        self.pin.set_mode(Mode::Input);
        self.last_read = Some(Instant::now());

        let frame = frame?;
        log::debug!("{} frame: {:02x?}", self.model, frame);
        decode_frame(self.model, frame)
    }
}

/// Busy-wait; `thread::sleep` is far too coarse for the handshake.
fn spin(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}
