//! Frame type codes used by the GrowCube wire protocol.

/// Frame types known to the client.
///
/// Codes below 40 are device responses, codes 43..=49 are client requests.
/// Any code not listed decodes to [`MessageType::Unknown`], which maps back
/// to code 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Unrecognized type code
    Unknown,

    // Responses
    /// Generic acknowledgement, content `"1"`
    Ok,
    /// Per-channel moisture plus device-wide humidity and temperature
    SensorReading,
    /// One historical reading
    HistoryEntry,
    /// A watering event notification
    WateringEvent,
    /// Firmware version and device id
    Version,
    /// Pump switched on
    WaterOn,
    /// Pump switched off
    WaterOff,
    /// Moisture sensor unplugged
    SensorDisconnected,
    /// Start of a readings burst
    StartReadings,
    /// Outlet locked
    OutletLocked,

    // Requests
    /// Ask the device to report current readings
    RequestReadings,
    /// Handshake carrying the client's local time
    Hello,
    /// Delete request, paired with [`MessageType::DeleteConfirm`]
    DeleteRequest,
    /// Delete confirmation
    DeleteConfirm,
    /// Manual water control
    WaterControl,
    /// Request sensor history
    SensorHistoryRequest,
    /// Channel settings
    ChannelSettings,
}

impl MessageType {
    /// Map a wire code to its type. Unlisted codes become `Unknown`.
    pub fn from_code(code: u16) -> Self {
        match code {
            20 => Self::Ok,
            21 => Self::SensorReading,
            22 => Self::HistoryEntry,
            23 => Self::WateringEvent,
            24 => Self::Version,
            26 => Self::WaterOn,
            27 => Self::WaterOff,
            30 => Self::SensorDisconnected,
            33 => Self::StartReadings,
            34 => Self::OutletLocked,
            43 => Self::RequestReadings,
            44 => Self::Hello,
            45 => Self::DeleteRequest,
            46 => Self::DeleteConfirm,
            47 => Self::WaterControl,
            48 => Self::SensorHistoryRequest,
            49 => Self::ChannelSettings,
            _ => Self::Unknown,
        }
    }

    /// Wire code for this type.
    pub fn code(self) -> u16 {
        match self {
            Self::Unknown => 0,
            Self::Ok => 20,
            Self::SensorReading => 21,
            Self::HistoryEntry => 22,
            Self::WateringEvent => 23,
            Self::Version => 24,
            Self::WaterOn => 26,
            Self::WaterOff => 27,
            Self::SensorDisconnected => 30,
            Self::StartReadings => 33,
            Self::OutletLocked => 34,
            Self::RequestReadings => 43,
            Self::Hello => 44,
            Self::DeleteRequest => 45,
            Self::DeleteConfirm => 46,
            Self::WaterControl => 47,
            Self::SensorHistoryRequest => 48,
            Self::ChannelSettings => 49,
        }
    }

    /// Human-readable name for log output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::Ok => "OK",
            Self::SensorReading => "SENSOR_READING",
            Self::HistoryEntry => "HISTORY_ENTRY",
            Self::WateringEvent => "WATERING_EVENT",
            Self::Version => "VERSION",
            Self::WaterOn => "WATER_ON",
            Self::WaterOff => "WATER_OFF",
            Self::SensorDisconnected => "SENSOR_DISCONNECTED",
            Self::StartReadings => "START_READINGS",
            Self::OutletLocked => "OUTLET_LOCKED",
            Self::RequestReadings => "REQUEST_READINGS",
            Self::Hello => "HELLO",
            Self::DeleteRequest => "DELETE_REQUEST",
            Self::DeleteConfirm => "DELETE_CONFIRM",
            Self::WaterControl => "WATER_CONTROL",
            Self::SensorHistoryRequest => "SENSOR_HISTORY_REQUEST",
            Self::ChannelSettings => "CHANNEL_SETTINGS",
        }
    }

    /// Whether the client sends this type (as opposed to the device).
    pub fn is_request(self) -> bool {
        matches!(self.code(), 43..=49)
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Whether `code` belongs to the short, delimiter-less frame family.
pub fn is_short_code(code: u16) -> bool {
    (500..=599).contains(&code)
}

/// Whether a frame with `code` carries a length section and content.
///
/// Short frames (codes 500..=599) are type-only.
pub fn expects_content(code: u16) -> bool {
    !is_short_code(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_mapping_is_symmetric() {
        for code in 0..=600u16 {
            let ty = MessageType::from_code(code);
            if ty != MessageType::Unknown {
                assert_eq!(ty.code(), code);
            }
        }
    }

    #[test]
    fn test_unknown_maps_to_zero() {
        assert_eq!(MessageType::from_code(99), MessageType::Unknown);
        assert_eq!(MessageType::from_code(533), MessageType::Unknown);
        assert_eq!(MessageType::Unknown.code(), 0);
    }

    #[test]
    fn test_requests() {
        assert!(MessageType::Hello.is_request());
        assert!(MessageType::RequestReadings.is_request());
        assert!(!MessageType::Version.is_request());
        assert!(!MessageType::Unknown.is_request());
    }

    #[test]
    fn test_expects_content() {
        assert!(expects_content(24));
        assert!(expects_content(0));
        assert!(!expects_content(500));
        assert!(!expects_content(533));
        assert!(!expects_content(599));
        assert!(expects_content(600));
    }
}
