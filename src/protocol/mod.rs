//! GrowCube status protocol.
//!
//! # Message Flow
//!
//! ```text
//! Client                              Device
//!    |                                  |
//!    |------ HELLO (local time) ------->|
//!    |<----- VERSION (version@id) ------|
//!    |                                  |
//!    |------ REQUEST_READINGS --------->|   (skipped in connect-only mode)
//!    |<----- START_READINGS ------------|
//!    |<----- SENSOR_READING x4 ---------|   any order, interleaved with
//!    |<----- ... other frames ... ------|   frames the client ignores
//! ```
//!
//! ## State Machine
//!
//! | State             | Description                         | Next                          |
//! |-------------------|-------------------------------------|-------------------------------|
//! | `Connecting`      | Opening the socket                  | → Handshaking, Done           |
//! | `Handshaking`     | HELLO sent, waiting for VERSION     | → ConnectOnlyDone, Refreshing |
//! | `ConnectOnlyDone` | Connectivity check finished         | → Done                        |
//! | `Refreshing`      | Collecting channel readings         | → Done                        |
//! | `Done`            | Connection closed                   | (terminal)                    |
//!
//! A timeout in any state ends the session with a partial [`StatusReport`]
//! whose outcome is [`Outcome::TimedOut`].

mod session;
mod status;

pub use session::{get_status, Outcome, Session, SessionState, StatusReport};
pub use status::{Applied, Status, CHANNEL_COUNT};
