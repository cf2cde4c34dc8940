//! Device status snapshot and the frame-driven state machine that fills it.

use serde::Serialize;

use crate::codec::{Frame, MessageType, FIELD_SEPARATOR};
use crate::error::{GrowcubeError, Result};

/// Number of sensor/outlet channels on the device
pub const CHANNEL_COUNT: usize = 4;

/// START_READINGS content for a normal burst
const START_READINGS_NORMAL: &str = "0@0";

/// START_READINGS content when the tank is low
const START_READINGS_LOW_WATER: &str = "1@1";

/// Expected OK content
const OK_CONTENT: &str = "1";

/// What [`Status::apply`] did with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The frame changed status
    Updated,
    /// The frame carries nothing to track; status untouched
    Ignored,
}

/// Consolidated device status.
///
/// `refreshed` is reset at the start of every readings burst.
/// `sensor_disconnected` and `outlet_locked` are sticky for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    /// Firmware version
    pub version: String,
    /// Device id
    pub device_id: String,
    /// Ambient temperature
    pub temperature: u32,
    /// Ambient humidity
    pub humidity: u32,
    /// Soil moisture per channel
    pub moistures: [u32; CHANNEL_COUNT],
    /// Channels reported in the current burst
    pub refreshed: [bool; CHANNEL_COUNT],
    /// Channels whose sensor was reported unplugged
    pub sensor_disconnected: [bool; CHANNEL_COUNT],
    /// Channels whose outlet was reported locked
    pub outlet_locked: [bool; CHANNEL_COUNT],
    /// Whether the tank has enough water
    pub has_water: bool,
    /// Session stopped after the handshake
    pub connect_only: bool,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            version: String::new(),
            device_id: String::new(),
            temperature: 0,
            humidity: 0,
            moistures: [0; CHANNEL_COUNT],
            refreshed: [false; CHANNEL_COUNT],
            sensor_disconnected: [false; CHANNEL_COUNT],
            outlet_locked: [false; CHANNEL_COUNT],
            has_water: true,
            connect_only: false,
        }
    }
}

impl Status {
    /// Fresh status for a session.
    pub fn new(connect_only: bool) -> Self {
        Self {
            connect_only,
            ..Default::default()
        }
    }

    /// True once every channel has reported in the current burst.
    pub fn is_refresh_complete(&self) -> bool {
        self.refreshed.iter().all(|r| *r)
    }

    /// Number of channels reported in the current burst.
    pub fn refreshed_count(&self) -> usize {
        self.refreshed.iter().filter(|r| **r).count()
    }

    /// Apply one frame.
    ///
    /// Unknown or untracked types never fail. A tracked type with malformed
    /// content is a [`GrowcubeError::Validation`].
    pub fn apply(&mut self, frame: &Frame) -> Result<Applied> {
        match frame.message_type() {
            MessageType::Version => self.handle_version(frame),
            MessageType::StartReadings => self.handle_start_readings(frame),
            MessageType::SensorReading => self.handle_sensor_reading(frame),
            MessageType::SensorDisconnected => {
                let channel = parse_channel(frame.content(), frame)?;
                self.sensor_disconnected[channel] = true;
                Ok(Applied::Updated)
            },
            MessageType::OutletLocked => {
                let channel = parse_channel(frame.content(), frame)?;
                self.outlet_locked[channel] = true;
                Ok(Applied::Updated)
            },
            MessageType::Ok => {
                if frame.content() != OK_CONTENT {
                    tracing::warn!("OK frame with unexpected content: {:?}", frame.content());
                }
                Ok(Applied::Ignored)
            },
            MessageType::Unknown => {
                tracing::warn!("Unrecognized frame type {}: {}", frame.code(), frame);
                Ok(Applied::Ignored)
            },
            other => {
                tracing::debug!("Ignoring {} frame: {:?}", other, frame.content());
                Ok(Applied::Ignored)
            },
        }
    }

    fn handle_version(&mut self, frame: &Frame) -> Result<Applied> {
        match frame.content().split_once(FIELD_SEPARATOR) {
            Some((version, id)) => {
                self.version = version.to_string();
                self.device_id = id.to_string();
            },
            None => {
                tracing::warn!("VERSION frame without device id: {:?}", frame.content());
                self.version = frame.content().to_string();
                self.device_id.clear();
            },
        }
        Ok(Applied::Updated)
    }

    fn handle_start_readings(&mut self, frame: &Frame) -> Result<Applied> {
        let low_water = match frame.content() {
            START_READINGS_NORMAL => false,
            START_READINGS_LOW_WATER => true,
            other => {
                return Err(GrowcubeError::Validation(format!(
                    "START_READINGS content must be 0@0 or 1@1, got {other:?}"
                )))
            },
        };

        self.refreshed = [false; CHANNEL_COUNT];
        self.moistures = [0; CHANNEL_COUNT];
        if low_water {
            self.has_water = false;
        }
        Ok(Applied::Updated)
    }

    fn handle_sensor_reading(&mut self, frame: &Frame) -> Result<Applied> {
        let fields = frame.fields();
        if fields.len() != 4 {
            return Err(GrowcubeError::Validation(format!(
                "SENSOR_READING expects 4 fields, got {}: {:?}",
                fields.len(),
                frame.content()
            )));
        }

        let channel = parse_channel(fields[0], frame)?;
        let reading = parse_number(fields[1], frame)?;
        let humidity = parse_number(fields[2], frame)?;
        let temperature = parse_number(fields[3], frame)?;

        self.humidity = humidity;
        self.temperature = temperature;
        self.moistures[channel] = reading;
        self.refreshed[channel] = true;
        Ok(Applied::Updated)
    }
}

fn parse_number(field: &str, frame: &Frame) -> Result<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GrowcubeError::Validation(format!(
            "{} field {:?} is not a number: {:?}",
            frame.message_type(),
            field,
            frame.content()
        )));
    }
    field.parse().map_err(|_| {
        GrowcubeError::Validation(format!(
            "{} field {:?} out of range",
            frame.message_type(),
            field
        ))
    })
}

fn parse_channel(field: &str, frame: &Frame) -> Result<usize> {
    let channel = parse_number(field, frame)? as usize;
    if channel >= CHANNEL_COUNT {
        return Err(GrowcubeError::Validation(format!(
            "{} channel {} out of range",
            frame.message_type(),
            channel
        )));
    }
    Ok(channel)
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "GrowCube Version: {}, Id: {}, Refresh Complete: {}, Temperature: {}, Humidity: {}, Has Water: {}",
            self.version,
            self.device_id,
            self.is_refresh_complete(),
            self.temperature,
            self.humidity,
            self.has_water
        )?;
        for channel in 0..CHANNEL_COUNT {
            writeln!(
                f,
                " - Sensor {} - Refreshed: {}, Reading: {}, Disconnected: {}, Outlet Locked: {}",
                channel,
                self.refreshed[channel],
                self.moistures[channel],
                self.sensor_disconnected[channel],
                self.outlet_locked[channel]
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(ty: MessageType, content: &str) -> Frame {
        Frame::new(ty.code(), content)
    }

    fn reading(channel: u32, moisture: u32) -> Frame {
        frame(
            MessageType::SensorReading,
            &format!("{channel}@{moisture}@60@25"),
        )
    }

    fn assert_validation(result: Result<Applied>) {
        match result {
            Err(GrowcubeError::Validation(_)) => {},
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_fresh_status_is_incomplete() {
        let status = Status::new(false);
        assert!(!status.is_refresh_complete());
        assert_eq!(status.refreshed_count(), 0);
        assert!(status.has_water);
    }

    #[test]
    fn test_version() {
        let mut status = Status::default();
        status.apply(&frame(MessageType::Version, "1.0.0@ab12")).unwrap();
        assert_eq!(status.version, "1.0.0");
        assert_eq!(status.device_id, "ab12");
    }

    #[test]
    fn test_version_without_id() {
        let mut status = Status::default();
        status.apply(&frame(MessageType::Version, "3.6")).unwrap();
        assert_eq!(status.version, "3.6");
        assert_eq!(status.device_id, "");
    }

    #[test]
    fn test_sensor_reading() {
        let mut status = Status::default();
        let applied = status
            .apply(&frame(MessageType::SensorReading, "2@55@60@25"))
            .unwrap();

        assert_eq!(applied, Applied::Updated);
        assert_eq!(status.moistures[2], 55);
        assert_eq!(status.humidity, 60);
        assert_eq!(status.temperature, 25);
        assert!(status.refreshed[2]);
        assert_eq!(status.refreshed_count(), 1);
    }

    #[test]
    fn test_complete_iff_all_channels_refreshed() {
        let mut status = Status::default();
        for channel in 0..3 {
            status.apply(&reading(channel, 10 + channel)).unwrap();
            assert!(!status.is_refresh_complete());
        }
        status.apply(&reading(3, 13)).unwrap();
        assert!(status.is_refresh_complete());
        assert_eq!(status.moistures, [10, 11, 12, 13]);
    }

    #[test]
    fn test_start_readings_resets_cycle() {
        let mut status = Status::default();
        for channel in 0..4 {
            status.apply(&reading(channel, 40)).unwrap();
        }
        assert!(status.is_refresh_complete());

        status.apply(&frame(MessageType::StartReadings, "0@0")).unwrap();
        assert_eq!(status.refreshed, [false; CHANNEL_COUNT]);
        assert_eq!(status.moistures, [0; CHANNEL_COUNT]);
        assert!(status.has_water);
        assert!(!status.is_refresh_complete());
    }

    #[test]
    fn test_start_readings_low_water() {
        let mut status = Status::default();
        status.apply(&frame(MessageType::StartReadings, "1@1")).unwrap();
        assert!(!status.has_water);

        // a later normal burst does not restore it
        status.apply(&frame(MessageType::StartReadings, "0@0")).unwrap();
        assert!(!status.has_water);
    }

    #[test]
    fn test_start_readings_bad_content() {
        let mut status = Status::default();
        for content in ["", "0", "1@0", "0@0@0", "2@2"] {
            assert_validation(status.apply(&frame(MessageType::StartReadings, content)));
        }
    }

    #[test]
    fn test_sticky_flags_survive_new_cycle() {
        let mut status = Status::default();
        let disconnected = frame(MessageType::SensorDisconnected, "1");
        status.apply(&disconnected).unwrap();
        status.apply(&disconnected).unwrap();
        status.apply(&frame(MessageType::OutletLocked, "3")).unwrap();
        assert_eq!(status.sensor_disconnected, [false, true, false, false]);

        status.apply(&frame(MessageType::StartReadings, "0@0")).unwrap();
        assert!(status.sensor_disconnected[1]);
        assert!(status.outlet_locked[3]);
    }

    #[test]
    fn test_bad_channel() {
        let mut status = Status::default();
        assert_validation(status.apply(&frame(MessageType::SensorDisconnected, "4")));
        assert_validation(status.apply(&frame(MessageType::OutletLocked, "x")));
        assert_validation(status.apply(&frame(MessageType::SensorReading, "7@1@1@1")));
    }

    #[test]
    fn test_bad_sensor_reading() {
        let mut status = Status::default();
        for content in ["1@2@3", "1@2@3@4@5", "1@a@3@4", "1@@3@4", "", "1@2@3@99999999999"] {
            assert_validation(status.apply(&frame(MessageType::SensorReading, content)));
        }
        assert_eq!(status, Status::default());
    }

    #[test]
    fn test_unknown_types_are_ignored() {
        let mut status = Status::default();
        for channel in 0..4 {
            status.apply(&reading(channel, 1)).unwrap();
        }
        let before = status.clone();

        for code in [0, 99, 533, 22, 26, 27] {
            let applied = status.apply(&Frame::new(code, "whatever")).unwrap();
            assert_eq!(applied, Applied::Ignored);
        }
        assert_eq!(status, before);
        assert!(status.is_refresh_complete());
    }

    #[test]
    fn test_ok_changes_nothing() {
        let mut status = Status::default();
        for content in ["1", "0"] {
            assert_eq!(
                status.apply(&frame(MessageType::Ok, content)).unwrap(),
                Applied::Ignored
            );
        }
        assert_eq!(status, Status::default());
    }

    #[test]
    fn test_display_lists_channels() {
        let text = Status::default().to_string();
        assert!(text.contains("Refresh Complete: false"));
        assert!(text.contains(" - Sensor 3 - "));
    }
}
