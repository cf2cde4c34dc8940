//! GrowCube frame encoding and decoding.
//!
//! # Wire Format
//!
//! ```text
//! Standard: ele[a]<type>#<content_length>#<content>#
//! Short:    ele5<2 digits>                  (6 bytes, no delimiter)
//! ```
//!
//! Outbound frames always use the `elea` prefix. Inbound frames may use
//! either prefix. There is no escaping, so content never contains `#`.

use chrono::{DateTime, TimeZone};

use super::message_type::MessageType;
use crate::error::{GrowcubeError, Result};

/// Prefix every type token starts with
pub const TYPE_PREFIX: &str = "ele";

/// Prefix used for outbound frames
pub const REQUEST_PREFIX: &str = "elea";

/// Prefix that marks a short frame
pub const SHORT_FRAME_PREFIX: &[u8] = b"ele5";

/// Total size of a short frame
pub const SHORT_FRAME_LEN: usize = 6;

/// Section delimiter
pub const DELIMITER: u8 = b'#';

/// Field separator inside content
pub const FIELD_SEPARATOR: char = '@';

/// Largest content length accepted from the device
pub const MAX_CONTENT_LENGTH: usize = 1024;

/// One protocol message.
///
/// The content length is always measured from the content, so it cannot
/// disagree with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    code: u16,
    content: String,
}

impl Frame {
    /// Create a frame from a type code and content.
    pub fn new(code: u16, content: impl Into<String>) -> Self {
        Self {
            code,
            content: content.into(),
        }
    }

    /// Create a content-less frame.
    pub fn empty(code: u16) -> Self {
        Self::new(code, String::new())
    }

    /// HELLO frame carrying `now` as `YYYY@MM@DD@HH@MM@SS`.
    pub fn hello<Tz: TimeZone>(now: &DateTime<Tz>) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        Self::new(
            MessageType::Hello.code(),
            now.format("%Y@%m@%d@%H@%M@%S").to_string(),
        )
    }

    /// Request for a fresh set of sensor readings.
    pub fn request_readings() -> Self {
        Self::new(MessageType::RequestReadings.code(), "1")
    }

    /// Raw type code.
    pub fn code(&self) -> u16 {
        self.code
    }

    /// Type code mapped onto the known vocabulary.
    pub fn message_type(&self) -> MessageType {
        MessageType::from_code(self.code)
    }

    /// Frame content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Byte length of the content.
    pub fn content_length(&self) -> usize {
        self.content.len()
    }

    /// Content split on `@`. Empty content has no fields.
    pub fn fields(&self) -> Vec<&str> {
        if self.content.is_empty() {
            return Vec::new();
        }
        self.content.split(FIELD_SEPARATOR).collect()
    }

    /// Encode for the wire.
    pub fn to_wire(&self) -> Vec<u8> {
        encode(self.code, &self.content)
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}({}) [{}] {:?}",
            self.message_type(),
            self.code,
            self.content_length(),
            self.content
        )
    }
}

/// Encode a standard frame: `elea<type>#<len>#<content>#`.
pub fn encode(code: u16, content: &str) -> Vec<u8> {
    debug_assert!(
        !content.contains('#'),
        "frame content must not contain the delimiter"
    );
    format!("{REQUEST_PREFIX}{code}#{}#{content}#", content.len()).into_bytes()
}

/// Decode one frame already delimited by the transport.
///
/// Accepts either a 6-byte short frame (`ele5XX`) or a standard frame with
/// its sections separated by `#`. A single trailing `#` is optional.
pub fn decode(bytes: &[u8]) -> Result<Frame> {
    if is_short_frame(bytes) {
        let text = as_text(bytes)?;
        let code = parse_type_token(text)?;
        return Ok(Frame::empty(code));
    }

    let text = as_text(bytes)?;
    let body = text.strip_suffix('#').unwrap_or(text);
    let sections: Vec<&str> = body.split('#').collect();
    if sections.len() != 3 {
        return Err(GrowcubeError::FrameFormat(format!(
            "expected 3 sections, found {} in {:?}",
            sections.len(),
            text
        )));
    }

    let code = parse_type_token(sections[0])?;
    let declared = parse_content_length(sections[1])?;
    let content = sections[2];
    if content.len() != declared {
        return Err(GrowcubeError::FrameFormat(format!(
            "declared content length {} but content is {} bytes: {:?}",
            declared,
            content.len(),
            content
        )));
    }

    Ok(Frame::new(code, content))
}

/// Whether `bytes` is exactly a short frame (`ele5` plus two bytes).
pub fn is_short_frame(bytes: &[u8]) -> bool {
    bytes.len() == SHORT_FRAME_LEN && bytes.starts_with(SHORT_FRAME_PREFIX)
}

/// Parse a type token of the form `ele[a]<digits>`.
pub fn parse_type_token(token: &str) -> Result<u16> {
    let digits = token
        .strip_prefix(TYPE_PREFIX)
        .map(|rest| rest.strip_prefix('a').unwrap_or(rest))
        .ok_or_else(|| {
            GrowcubeError::FrameFormat(format!("type token does not start with 'ele': {token:?}"))
        })?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GrowcubeError::FrameFormat(format!(
            "type token is not ele[a]<digits>: {token:?}"
        )));
    }

    digits
        .parse()
        .map_err(|_| GrowcubeError::FrameFormat(format!("type code out of range: {token:?}")))
}

/// Parse a content-length token. Must be all digits and within
/// [`MAX_CONTENT_LENGTH`].
pub fn parse_content_length(token: &str) -> Result<usize> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(GrowcubeError::FrameFormat(format!(
            "content length is not a decimal number: {token:?}"
        )));
    }

    let length: usize = token
        .parse()
        .map_err(|_| GrowcubeError::FrameFormat(format!("content length too large: {token}")))?;

    if length > MAX_CONTENT_LENGTH {
        return Err(GrowcubeError::FrameFormat(format!(
            "content length {length} exceeds maximum {MAX_CONTENT_LENGTH}"
        )));
    }

    Ok(length)
}

fn as_text(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes)
        .map_err(|e| GrowcubeError::FrameFormat(format!("frame is not valid text: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};
    use proptest::prelude::*;

    #[test]
    fn test_encode_hello_literal() {
        let wire = encode(44, "2023@09@05@11@53@30");
        assert_eq!(wire, b"elea44#19#2023@09@05@11@53@30#");
    }

    #[test]
    fn test_hello_builder_formats_timestamp() {
        let tz = FixedOffset::east_opt(0).unwrap();
        let now = tz.with_ymd_and_hms(2023, 9, 5, 11, 53, 30).unwrap();
        let frame = Frame::hello(&now);

        assert_eq!(frame.message_type(), MessageType::Hello);
        assert_eq!(frame.content(), "2023@09@05@11@53@30");
        assert_eq!(frame.to_wire(), encode(44, "2023@09@05@11@53@30"));
    }

    #[test]
    fn test_request_readings_wire() {
        assert_eq!(Frame::request_readings().to_wire(), b"elea43#1#1#");
    }

    #[test]
    fn test_decode_standard_frame() {
        let frame = decode(b"ele24#10#1.0.0@ab12#").unwrap();
        assert_eq!(frame.code(), 24);
        assert_eq!(frame.message_type(), MessageType::Version);
        assert_eq!(frame.content(), "1.0.0@ab12");
        assert_eq!(frame.content_length(), 10);
        assert_eq!(frame.fields(), vec!["1.0.0", "ab12"]);
    }

    #[test]
    fn test_decode_request_prefix() {
        let frame = decode(b"elea21#10#2@55@60@25#").unwrap();
        assert_eq!(frame.message_type(), MessageType::SensorReading);
        assert_eq!(frame.content(), "2@55@60@25");
    }

    #[test]
    fn test_decode_without_trailing_delimiter() {
        let frame = decode(b"ele20#1#1").unwrap();
        assert_eq!(frame.message_type(), MessageType::Ok);
        assert_eq!(frame.content(), "1");
    }

    #[test]
    fn test_decode_short_frame() {
        let frame = decode(b"ele533").unwrap();
        assert_eq!(frame.code(), 533);
        assert_eq!(frame.content(), "");
        assert_eq!(frame.message_type(), MessageType::Unknown);
    }

    #[test]
    fn test_decode_short_frame_non_digits() {
        let err = decode(b"ele5xy").unwrap_err();
        assert!(matches!(err, GrowcubeError::FrameFormat(_)));
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        for wire in [&b"ele24#9#1.0.0@ab12#"[..], b"ele24#11#1.0.0@ab12#"] {
            let err = decode(wire).unwrap_err();
            assert!(matches!(err, GrowcubeError::FrameFormat(_)), "{err}");
        }
    }

    #[test]
    fn test_bad_type_token() {
        for wire in [
            &b"xyz24#1#1#"[..],
            b"ele#1#1#",
            b"elea#1#1#",
            b"eleb24#1#1#",
            b"ele2a4#1#1#",
            b"ele99999999#1#1#",
        ] {
            let err = decode(wire).unwrap_err();
            assert!(matches!(err, GrowcubeError::FrameFormat(_)), "{err}");
        }
    }

    #[test]
    fn test_bad_length_token() {
        for wire in [&b"ele24#x#1#"[..], b"ele24##1#", b"ele24#-1#1#"] {
            let err = decode(wire).unwrap_err();
            assert!(matches!(err, GrowcubeError::FrameFormat(_)), "{err}");
        }
    }

    #[test]
    fn test_oversized_length_rejected() {
        let err = parse_content_length("100000").unwrap_err();
        assert!(matches!(err, GrowcubeError::FrameFormat(_)));
    }

    #[test]
    fn test_wrong_section_count() {
        assert!(decode(b"ele24#1#").is_err());
        assert!(decode(b"ele24#3#a#b#").is_err());
        assert!(decode(b"").is_err());
    }

    #[test]
    fn test_empty_content_fields() {
        let frame = Frame::empty(20);
        assert!(frame.fields().is_empty());
        assert_eq!(frame.content_length(), 0);
        assert_eq!(decode(&frame.to_wire()).unwrap(), frame);
    }

    proptest! {
        #[test]
        fn prop_decode_inverts_encode(code in any::<u16>(), content in "[a-zA-Z0-9@.: _-]{0,64}") {
            let frame = decode(&encode(code, &content)).unwrap();
            prop_assert_eq!(frame.code(), code);
            prop_assert_eq!(frame.content(), content.as_str());
        }
    }
}
