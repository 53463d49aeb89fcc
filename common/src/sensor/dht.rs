//! Hardware independent part of the DHT11/DHT22 single-wire protocol.
//!
//! After the start handshake the sensor sends 40 bits. Every bit starts with
//! a ~50 us low phase followed by a high phase whose length encodes the value:
//! ~26 us for `0`, ~70 us for `1`. The five resulting bytes are humidity,
//! temperature and a checksum.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use heat_alert_model::Reading;

use super::SensorError;

/// Number of data bits in one transmission.
pub const FRAME_BITS: usize = 40;

/// High phases longer than this are a `1`.
const ONE_THRESHOLD_US: u32 = 40;

/// Supported sensor variants. They share the wire protocol but not the data layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SensorModel {
    #[default]
    Dht11,
    Dht22,
}

impl SensorModel {
    /// How long the host holds the line low to wake the sensor up.
    pub const fn start_signal(self) -> Duration {
        match self {
            SensorModel::Dht11 => Duration::from_millis(18),
            SensorModel::Dht22 => Duration::from_micros(1100),
        }
    }

    /// Minimum time between two reads the sensor tolerates.
    pub const fn min_read_interval(self) -> Duration {
        match self {
            SensorModel::Dht11 => Duration::from_secs(1),
            SensorModel::Dht22 => Duration::from_secs(2),
        }
    }
}

impl fmt::Display for SensorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorModel::Dht11 => f.write_str("DHT11"),
            SensorModel::Dht22 => f.write_str("DHT22"),
        }
    }
}

impl FromStr for SensorModel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dht11" => Ok(SensorModel::Dht11),
            "dht22" | "am2302" => Ok(SensorModel::Dht22),
            other => Err(format!("unknown sensor model {other:?}, expected dht11 or dht22")),
        }
    }
}

/// Pack the measured high-phase widths (microseconds) into the five frame bytes.
pub fn frame_from_pulses(high_widths_us: &[u32; FRAME_BITS]) -> [u8; 5] {
    let mut frame = [0u8; 5];

    for (index, width) in high_widths_us.iter().enumerate() {
        if *width > ONE_THRESHOLD_US {
            frame[index / 8] |= 1 << (7 - index % 8);
        }
    }

    frame
}

/// Verify the checksum and turn a raw frame into a [`Reading`].
pub fn decode_frame(model: SensorModel, frame: [u8; 5]) -> Result<Reading, SensorError> {
    // Checksum is the sum of the data bytes masked to 8 bits
    let expected = frame[..4]
        .iter()
        .fold(0u8, |sum, byte| sum.wrapping_add(*byte));
    if expected != frame[4] {
        return Err(SensorError::ChecksumMismatch {
            expected,
            actual: frame[4],
        });
    }

    let (temperature, humidity) = match model {
        SensorModel::Dht11 => {
            let humidity = frame[0] as f32 + frame[1] as f32 / 10.0;
            let mut temperature = frame[2] as f32 + (frame[3] & 0x0F) as f32 / 10.0;
            if frame[3] & 0x80 != 0 {
                temperature = -temperature;
            }
            (temperature, humidity)
        }
        SensorModel::Dht22 => {
            let humidity = u16::from_be_bytes([frame[0], frame[1]]) as f32 / 10.0;
            let mut temperature = u16::from_be_bytes([frame[2] & 0x7F, frame[3]]) as f32 / 10.0;
            if frame[2] & 0x80 != 0 {
                temperature = -temperature;
            }
            (temperature, humidity)
        }
    };

    Ok(Reading::new(temperature, humidity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn with_checksum(data: [u8; 4]) -> [u8; 5] {
        let sum = data.iter().fold(0u8, |sum, byte| sum.wrapping_add(*byte));
        [data[0], data[1], data[2], data[3], sum]
    }

    #[test]
    fn dht11_frame() {
        let reading = decode_frame(SensorModel::Dht11, with_checksum([45, 0, 35, 0])).unwrap();
        assert_eq!(reading, Reading::new(35.0, 45.0));
    }

    #[test]
    fn dht11_negative_fraction() {
        let reading = decode_frame(SensorModel::Dht11, with_checksum([60, 0, 2, 0x85])).unwrap();
        assert_eq!(reading.temperature_celsius, Some(-2.5));
    }

    #[test]
    fn dht22_frame() {
        // 65.2 % and 35.1 C
        let reading =
            decode_frame(SensorModel::Dht22, with_checksum([0x02, 0x8C, 0x01, 0x5F])).unwrap();
        assert_eq!(reading.humidity_percent, Some(65.2));
        assert_eq!(reading.temperature_celsius, Some(35.1));
    }

    #[test]
    fn dht22_negative() {
        // -10.1 C
        let reading =
            decode_frame(SensorModel::Dht22, with_checksum([0x01, 0x90, 0x80, 0x65])).unwrap();
        assert_eq!(reading.temperature_celsius, Some(-10.1));
    }

    #[test]
    fn checksum_wraps_around() {
        let frame = with_checksum([200, 100, 30, 0]);
        assert_eq!(frame[4], 74);
        assert!(decode_frame(SensorModel::Dht11, frame).is_ok());
    }

    #[test]
    fn bad_checksum_is_rejected() {
        let result = decode_frame(SensorModel::Dht11, [45, 0, 35, 0, 81]);
        assert_matches!(
            result,
            Err(SensorError::ChecksumMismatch {
                expected: 80,
                actual: 81
            })
        );
    }

    #[test]
    fn pulses_are_packed_msb_first() {
        let mut widths = [26u32; FRAME_BITS];
        // 0b1000_0001 in the first byte, 0b0000_0001 in the last
        widths[0] = 70;
        widths[7] = 70;
        widths[39] = 70;

        assert_eq!(frame_from_pulses(&widths), [0x81, 0, 0, 0, 0x01]);
    }

    #[test]
    fn model_names() {
        assert_eq!("DHT22".parse::<SensorModel>(), Ok(SensorModel::Dht22));
        assert_eq!("am2302".parse::<SensorModel>(), Ok(SensorModel::Dht22));
        assert_eq!("dht11".parse::<SensorModel>(), Ok(SensorModel::Dht11));
        assert!("bme680".parse::<SensorModel>().is_err());
    }
}
