//! Frame codec for the GrowCube wire protocol.
//!
//! The device speaks an ASCII, `#`-delimited grammar over TCP. This module
//! turns bytes that the transport has already cut at frame boundaries into
//! typed [`Frame`] values, and frames into bytes.
//!
//! # Frame Families
//!
//! | Family   | Wire Format                          | Codes     |
//! |----------|--------------------------------------|-----------|
//! | Standard | `ele[a]<type>#<len>#<content>#`      | all other |
//! | Short    | `ele5<2 digits>` (no `#`, no content)| 500..=599 |
//!
//! # Usage
//!
//! ```rust
//! use growcube::codec::{decode, encode, MessageType};
//!
//! let wire = encode(44, "2023@09@05@11@53@30");
//! assert_eq!(wire, b"elea44#19#2023@09@05@11@53@30#");
//!
//! let frame = decode(b"ele24#10#1.0.0@ab12#").unwrap();
//! assert_eq!(frame.message_type(), MessageType::Version);
//! ```

mod frame;
mod message_type;

pub use frame::{
    decode, encode, is_short_frame, parse_content_length, parse_type_token, Frame, DELIMITER,
    FIELD_SEPARATOR, MAX_CONTENT_LENGTH, REQUEST_PREFIX, SHORT_FRAME_LEN, SHORT_FRAME_PREFIX,
    TYPE_PREFIX,
};
pub use message_type::{expects_content, is_short_code, MessageType};
